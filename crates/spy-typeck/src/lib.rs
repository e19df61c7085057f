//! Semantic analysis for Spy: symbol collection, inheritance linking, and
//! the modifier checker.
//!
//! `check` runs the three passes in order over one parsed file:
//!
//! 1. **Collector** registers every top-level declaration (names only), so
//!    mutually referring declarations resolve regardless of source order.
//! 2. **Linker** resolves `extends`/`implements` edges, rejects cycles and
//!    cross-species references, and precomputes the MRO, override table,
//!    interface closure, and still-abstract set of every class.
//! 3. **Modifier checker** enforces the abstract/final/static/interface/
//!    constructor discipline and flow-insensitive name resolution.
//!
//! The result carries the immutable type graph (which the interpreter uses
//! for dispatch) and a span-ordered diagnostic list. Checking is pure:
//! running it twice over the same parse yields identical diagnostics.

mod check;
mod collect;
pub mod diagnostics;
pub mod error;
pub mod graph;
mod link;
pub mod symbols;
pub mod ty;

use spy_common::diag::Diagnostic;
use spy_common::span::Span;
use spy_parser::ast::item::FnDef;
use spy_parser::Parse;

use crate::error::CheckError;
use crate::graph::TypeGraph;
use crate::symbols::SymbolTable;

/// Everything semantic analysis learned about one source file.
#[derive(Debug)]
pub struct CheckResult {
    pub graph: TypeGraph,
    pub symbols: SymbolTable,
    /// Free functions in declaration order.
    pub functions: Vec<(String, FnDef)>,
    /// All collected errors, in emission order.
    pub errors: Vec<CheckError>,
    /// Diagnostics converted from `errors`, sorted by span start.
    pub diagnostics: Vec<Diagnostic>,
    /// Underscore-prefixed names, recorded but never diagnosed.
    pub internal_names: Vec<(String, Span)>,
}

impl CheckResult {
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == spy_common::diag::Severity::Error)
    }

    pub fn function(&self, name: &str) -> Option<&FnDef> {
        self.functions
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, f)| f)
    }

    /// Machine-readable diagnostics, one JSON object per line.
    pub fn diagnostics_json(&self) -> String {
        self.diagnostics
            .iter()
            .map(|d| serde_json::to_string(d).expect("diagnostics serialize cleanly"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Run declaration collection, inheritance linking, and the modifier
/// checker over a parsed file.
pub fn check(parse: &Parse) -> CheckResult {
    let mut errors: Vec<CheckError> = Vec::new();

    let collected = collect::collect(parse, &mut errors);
    let mut graph: TypeGraph = collected.graph;
    let symbols: SymbolTable = collected.symbols;
    let functions = collected.functions;

    link::link(&mut graph, &mut errors);

    let mut internal_names = Vec::new();
    check::run(
        parse,
        &graph,
        &symbols,
        &functions,
        &mut errors,
        &mut internal_names,
    );

    let mut diagnostics: Vec<Diagnostic> = errors.iter().map(CheckError::to_diagnostic).collect();
    diagnostics.sort_by_key(|d| d.span.start);

    CheckResult {
        graph,
        symbols,
        functions,
        errors,
        diagnostics,
        internal_names,
    }
}
