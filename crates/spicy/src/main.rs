//! The Spy compiler CLI.
//!
//! ```text
//! spicy <input.spc> [-v|--verbose] [-o <output>] [--check-only] [--emit=run|check]
//! ```
//!
//! Exit codes: 0 success; 1 parse/check/runtime errors; 2 I/O error;
//! 3 internal error. `SPICY_TRACE=1` prints phase timings to stderr.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};

use spicy::{Emit, Options, EXIT_INTERNAL};

#[derive(Parser)]
#[command(name = "spicy", version, about = "The Spy compiler and runner")]
struct Cli {
    /// Path to the input .spc file
    input: PathBuf,

    /// Add labelled source frames beneath each diagnostic
    #[arg(short, long)]
    verbose: bool,

    /// Redirect program output to a file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Stop after the modifier checker, without executing
    #[arg(long)]
    check_only: bool,

    /// Pipeline stage to run through
    #[arg(long, value_enum, default_value = "run")]
    emit: EmitArg,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EmitArg {
    Run,
    Check,
}

fn main() {
    let cli = Cli::parse();
    let opts = Options {
        verbose: cli.verbose,
        check_only: cli.check_only,
        emit: match cli.emit {
            EmitArg::Run => Emit::Run,
            EmitArg::Check => Emit::Check,
        },
    };

    // A panic anywhere in the pipeline is an internal error, not a crash.
    let code = catch_unwind(AssertUnwindSafe(|| {
        spicy::run_file(&cli.input, &opts, cli.output.as_deref())
    }))
    .unwrap_or_else(|_| {
        eprintln!("error: internal compiler error");
        EXIT_INTERNAL
    });
    process::exit(code);
}
