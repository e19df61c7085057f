//! Pipeline driver for the `spicy` CLI.
//!
//! One [`Compilation`] owns everything derived from a single `.spc` file:
//! the source buffer, the parse, the check result, and the diagnostic bag
//! all phases feed into. The driver functions return process exit codes:
//! 0 success, 1 diagnostics or runtime failure, 2 I/O error, 3 internal
//! error (mapped in `main`).

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Instant;

use spy_common::diag::DiagnosticBag;
use spy_common::source::SourceText;
use spy_typeck::diagnostics::render_report;
use spy_typeck::CheckResult;

pub const EXIT_OK: i32 = 0;
pub const EXIT_DIAGNOSTICS: i32 = 1;
pub const EXIT_IO: i32 = 2;
pub const EXIT_INTERNAL: i32 = 3;

/// What to do after the front half of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Emit {
    #[default]
    Run,
    Check,
}

#[derive(Debug, Default)]
pub struct Options {
    /// Add labelled source frames beneath each one-line diagnostic.
    pub verbose: bool,
    /// Stop after the modifier checker.
    pub check_only: bool,
    pub emit: Emit,
}

/// Everything owned for one compilation of one source file.
pub struct Compilation {
    pub file_name: String,
    pub source: SourceText,
    pub parse: spy_parser::Parse,
    /// `None` when the pipeline terminated early (nothing parsed).
    pub check: Option<CheckResult>,
    pub bag: DiagnosticBag,
}

fn trace_enabled() -> bool {
    std::env::var("SPICY_TRACE").map(|v| v == "1").unwrap_or(false)
}

macro_rules! trace {
    ($($arg:tt)*) => {
        if trace_enabled() {
            eprintln!("[spicy] {}", format!($($arg)*));
        }
    };
}

impl Compilation {
    /// Lex, parse, and check `text`, accumulating all diagnostics.
    ///
    /// The pipeline stops after parsing only when the file has zero valid
    /// top-level declarations or statements.
    pub fn compile(file_name: &str, text: &str) -> Compilation {
        let started = Instant::now();
        let source = SourceText::new(text);

        let parse = spy_parser::parse(source.text());
        trace!("parsed {} in {:?}", file_name, started.elapsed());

        let mut bag = DiagnosticBag::new();
        bag.extend(parse.lex_errors().iter().map(|e| e.to_diagnostic()));
        bag.extend(parse.errors().iter().map(|e| e.to_diagnostic()));

        let check = if parse.source_file().is_empty() {
            trace!("no top-level declarations; stopping after parse");
            None
        } else {
            let check_started = Instant::now();
            let check = spy_typeck::check(&parse);
            trace!("checked {} in {:?}", file_name, check_started.elapsed());
            bag.extend(check.diagnostics.iter().cloned());
            Some(check)
        };

        bag.sort_by_span();
        Compilation {
            file_name: file_name.to_string(),
            source,
            parse,
            check,
            bag,
        }
    }

    /// Print every diagnostic to `err_out`: the one-line form always, a
    /// labelled frame when `verbose`.
    pub fn report(&self, verbose: bool, err_out: &mut dyn Write) -> std::io::Result<()> {
        let index = self.source.line_index();
        for diag in self.bag.iter() {
            writeln!(err_out, "{}", diag.render_line(&self.file_name, index))?;
            if verbose {
                let frame = render_report(diag, self.source.text(), &self.file_name);
                write!(err_out, "{frame}")?;
            }
        }
        if self.bag.overflowed() {
            writeln!(err_out, "note: diagnostic limit reached; further output suppressed")?;
        }
        Ok(())
    }
}

/// Compile and (unless checking only) execute `text`, writing program
/// output to `out` and diagnostics to `err_out`. Returns the exit code.
pub fn run_source(
    file_name: &str,
    text: &str,
    opts: &Options,
    out: &mut dyn Write,
    err_out: &mut dyn Write,
) -> i32 {
    let compilation = Compilation::compile(file_name, text);
    if compilation.report(opts.verbose, err_out).is_err() {
        return EXIT_IO;
    }
    if compilation.bag.has_errors() {
        return EXIT_DIAGNOSTICS;
    }
    if opts.check_only || opts.emit == Emit::Check {
        return EXIT_OK;
    }
    let Some(check) = &compilation.check else {
        return EXIT_OK; // empty file: nothing to execute
    };

    let run_started = Instant::now();
    let result = spy_interp::run(&compilation.parse, check, out);
    trace!("executed {} in {:?}", file_name, run_started.elapsed());

    match result {
        Ok(()) => EXIT_OK,
        Err(e) => {
            let diag = e.to_diagnostic();
            let index = compilation.source.line_index();
            let _ = writeln!(err_out, "{}", diag.render_line(file_name, index));
            if opts.verbose {
                let frame = render_report(&diag, compilation.source.text(), file_name);
                let _ = write!(err_out, "{frame}");
            }
            EXIT_DIAGNOSTICS
        }
    }
}

/// CLI entry: read `path`, honoring `-o` redirection of program output.
pub fn run_file(path: &Path, opts: &Options, output: Option<&Path>) -> i32 {
    let source = match SourceText::read(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: failed to read '{}': {e}", path.display());
            return EXIT_IO;
        }
    };
    let file_name = path.display().to_string();
    let mut err_out = std::io::stderr();

    match output {
        Some(out_path) => {
            // The output handle is scoped to this call and closed on every
            // path out of it.
            let mut file = match File::create(out_path) {
                Ok(f) => f,
                Err(e) => {
                    eprintln!("error: failed to create '{}': {e}", out_path.display());
                    return EXIT_IO;
                }
            };
            run_source(&file_name, source.text(), opts, &mut file, &mut err_out)
        }
        None => {
            let mut stdout = std::io::stdout();
            run_source(&file_name, source.text(), opts, &mut stdout, &mut err_out)
        }
    }
}
