//! Semantic error types for resolution, inheritance, and modifier checks.
//!
//! Every variant carries the spans it needs for a precise report, converts
//! to a [`Diagnostic`] with a stable code, and prints a terse one-line
//! message through `Display`.

use std::fmt;

use spy_common::diag::{Diagnostic, Severity};
use spy_common::span::Span;

use crate::ty::Signature;

/// A semantic error (or warning) from the collector, linker, or checker.
#[derive(Debug, Clone)]
pub enum CheckError {
    // ── Resolution ──────────────────────────────────────────────────────
    /// A name in `extends`/`implements` does not resolve to any declaration.
    UnresolvedBase { name: String, span: Span },
    /// Two declarations with the same name in one scope.
    DuplicateDeclaration {
        name: String,
        span: Span,
        previous: Span,
    },
    /// A name used in a body resolves to nothing.
    UndefinedName { name: String, span: Span },

    // ── Inheritance ─────────────────────────────────────────────────────
    /// The combined extends/implements relation has a cycle.
    InheritanceCycle { path: Vec<String>, span: Span },
    /// A class extends something that is not a class.
    ExtendsNonClass {
        class: String,
        base: String,
        span: Span,
    },
    /// An interface extends something that is not an interface.
    ExtendsNonInterface {
        interface: String,
        base: String,
        span: Span,
    },
    /// An `implements` target is not an interface.
    ImplementsNonInterface {
        class: String,
        base: String,
        span: Span,
    },
    /// A class extends a class declared `final`.
    ExtendsFinalClass {
        class: String,
        base: String,
        span: Span,
        base_span: Span,
    },

    // ── Abstract discipline ─────────────────────────────────────────────
    /// A constructor call targets an `abstract class`.
    AbstractInstantiation { class: String, span: Span },
    /// A concrete class whose still-abstract set is not empty.
    ConcreteClassHasAbstractMembers {
        class: String,
        missing: Vec<String>,
        span: Span,
        /// (origin description, origin span) per missing method.
        origins: Vec<(String, Span)>,
    },
    /// An `abstract` method with a body.
    AbstractMethodHasBody { method: String, span: Span },
    /// An `abstract` method in a class not declared `abstract`.
    AbstractMethodOutsideAbstractClass {
        method: String,
        class: String,
        span: Span,
    },

    // ── Final discipline ────────────────────────────────────────────────
    /// A declaration marked both `abstract` and `final`.
    AbstractAndFinal { name: String, span: Span },
    /// A method redefines a `final` method of an ancestor.
    OverrideOfFinalMethod {
        method: String,
        class: String,
        base: String,
        span: Span,
        base_span: Span,
    },
    /// An override whose signature does not match the overridden/required one.
    OverrideSignatureMismatch {
        method: String,
        expected: Signature,
        found: Signature,
        /// Where the requirement comes from, e.g. "interface `I`".
        origin: String,
        span: Span,
        required_span: Span,
    },

    // ── Static discipline ───────────────────────────────────────────────
    /// A `static` member marked `abstract`, or a static member declared in
    /// an interface (interface methods are implicitly abstract).
    StaticCannotBeAbstract { name: String, span: Span },
    /// A static member body references `self` or `super`, or declares a
    /// `self` parameter.
    StaticUsesSelf {
        method: String,
        keyword: &'static str,
        span: Span,
    },

    // ── Interface discipline ────────────────────────────────────────────
    /// An interface method declared with a body.
    InterfaceHasBody {
        interface: String,
        method: String,
        span: Span,
    },
    /// A field declared inside an interface.
    InterfaceHasField {
        interface: String,
        field: String,
        span: Span,
    },

    // ── Constructor discipline ──────────────────────────────────────────
    /// A constructor marked `static`, `abstract`, or `final`.
    ConstructorHasModifier {
        class: String,
        modifier: &'static str,
        span: Span,
    },
    /// A constructor that does not call `super(...)` first although the
    /// parent chain has a constructor. Warning when the parent constructor
    /// takes no arguments, error otherwise.
    MissingSuperInit {
        class: String,
        parent: String,
        span: Span,
        parent_takes_args: bool,
    },
}

impl CheckError {
    /// Stable diagnostic code.
    pub fn code(&self) -> &'static str {
        match self {
            CheckError::UnresolvedBase { .. } => "UnresolvedBase",
            CheckError::DuplicateDeclaration { .. } => "DuplicateDeclaration",
            CheckError::UndefinedName { .. } => "UndefinedName",
            CheckError::InheritanceCycle { .. } => "InheritanceCycle",
            CheckError::ExtendsNonClass { .. } => "ExtendsNonClass",
            CheckError::ExtendsNonInterface { .. } => "ExtendsNonInterface",
            CheckError::ImplementsNonInterface { .. } => "ImplementsNonInterface",
            CheckError::ExtendsFinalClass { .. } => "ExtendsFinalClass",
            CheckError::AbstractInstantiation { .. } => "AbstractInstantiation",
            CheckError::ConcreteClassHasAbstractMembers { .. } => {
                "ConcreteClassHasAbstractMembers"
            }
            CheckError::AbstractMethodHasBody { .. } => "AbstractMethodHasBody",
            CheckError::AbstractMethodOutsideAbstractClass { .. } => {
                "AbstractMethodOutsideAbstractClass"
            }
            CheckError::AbstractAndFinal { .. } => "AbstractAndFinal",
            CheckError::OverrideOfFinalMethod { .. } => "OverrideOfFinalMethod",
            CheckError::OverrideSignatureMismatch { .. } => "OverrideSignatureMismatch",
            CheckError::StaticCannotBeAbstract { .. } => "StaticCannotBeAbstract",
            CheckError::StaticUsesSelf { .. } => "StaticUsesSelf",
            CheckError::InterfaceHasBody { .. } => "InterfaceHasBody",
            CheckError::InterfaceHasField { .. } => "InterfaceHasField",
            CheckError::ConstructorHasModifier { .. } => "ConstructorHasModifier",
            CheckError::MissingSuperInit { .. } => "MissingSuperInit",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            CheckError::MissingSuperInit {
                parent_takes_args, ..
            } if !parent_takes_args => Severity::Warning,
            _ => Severity::Error,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            CheckError::UnresolvedBase { span, .. }
            | CheckError::DuplicateDeclaration { span, .. }
            | CheckError::UndefinedName { span, .. }
            | CheckError::InheritanceCycle { span, .. }
            | CheckError::ExtendsNonClass { span, .. }
            | CheckError::ExtendsNonInterface { span, .. }
            | CheckError::ImplementsNonInterface { span, .. }
            | CheckError::ExtendsFinalClass { span, .. }
            | CheckError::AbstractInstantiation { span, .. }
            | CheckError::ConcreteClassHasAbstractMembers { span, .. }
            | CheckError::AbstractMethodHasBody { span, .. }
            | CheckError::AbstractMethodOutsideAbstractClass { span, .. }
            | CheckError::AbstractAndFinal { span, .. }
            | CheckError::OverrideOfFinalMethod { span, .. }
            | CheckError::OverrideSignatureMismatch { span, .. }
            | CheckError::StaticCannotBeAbstract { span, .. }
            | CheckError::StaticUsesSelf { span, .. }
            | CheckError::InterfaceHasBody { span, .. }
            | CheckError::InterfaceHasField { span, .. }
            | CheckError::ConstructorHasModifier { span, .. }
            | CheckError::MissingSuperInit { span, .. } => *span,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let mut diag = Diagnostic::new(self.severity(), self.code(), self.span(), self.to_string());
        match self {
            CheckError::DuplicateDeclaration { previous, .. } => {
                diag = diag.with_note("previously declared here", Some(*previous));
            }
            CheckError::ExtendsFinalClass {
                base, base_span, ..
            } => {
                diag = diag.with_note(format!("`{base}` declared final here"), Some(*base_span));
            }
            CheckError::OverrideOfFinalMethod {
                base, base_span, ..
            } => {
                diag = diag.with_note(
                    format!("declared final in `{base}` here"),
                    Some(*base_span),
                );
            }
            CheckError::OverrideSignatureMismatch {
                origin,
                required_span,
                ..
            } => {
                diag = diag.with_note(format!("required by {origin} here"), Some(*required_span));
            }
            CheckError::ConcreteClassHasAbstractMembers { origins, .. } => {
                for (what, span) in origins {
                    diag = diag.with_note(what.clone(), Some(*span));
                }
            }
            _ => {}
        }
        diag
    }
}

impl fmt::Display for CheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckError::UnresolvedBase { name, .. } => {
                write!(f, "unknown base type `{name}`")
            }
            CheckError::DuplicateDeclaration { name, .. } => {
                write!(f, "duplicate declaration of `{name}`")
            }
            CheckError::UndefinedName { name, .. } => {
                write!(f, "undefined name `{name}`")
            }
            CheckError::InheritanceCycle { path, .. } => {
                write!(f, "inheritance cycle: {}", path.join(" -> "))
            }
            CheckError::ExtendsNonClass { class, base, .. } => {
                write!(f, "class `{class}` extends `{base}`, which is not a class")
            }
            CheckError::ExtendsNonInterface {
                interface, base, ..
            } => {
                write!(
                    f,
                    "interface `{interface}` extends `{base}`, which is not an interface"
                )
            }
            CheckError::ImplementsNonInterface { class, base, .. } => {
                write!(
                    f,
                    "class `{class}` implements `{base}`, which is not an interface"
                )
            }
            CheckError::ExtendsFinalClass { class, base, .. } => {
                write!(f, "class `{class}` extends final class `{base}`")
            }
            CheckError::AbstractInstantiation { class, .. } => {
                write!(f, "cannot instantiate abstract class `{class}`")
            }
            CheckError::ConcreteClassHasAbstractMembers { class, missing, .. } => {
                write!(
                    f,
                    "concrete class `{class}` is missing implementations for: {}",
                    missing.join(", ")
                )
            }
            CheckError::AbstractMethodHasBody { method, .. } => {
                write!(f, "abstract method `{method}` must not have a body")
            }
            CheckError::AbstractMethodOutsideAbstractClass { method, class, .. } => {
                write!(
                    f,
                    "abstract method `{method}` declared in `{class}`, which is not an abstract class"
                )
            }
            CheckError::AbstractAndFinal { name, .. } => {
                write!(f, "`{name}` cannot be both abstract and final")
            }
            CheckError::OverrideOfFinalMethod {
                method, class, base, ..
            } => {
                write!(
                    f,
                    "`{class}.{method}` overrides final method `{base}.{method}`"
                )
            }
            CheckError::OverrideSignatureMismatch {
                method,
                expected,
                found,
                origin,
                ..
            } => {
                write!(
                    f,
                    "`{method}` does not match the signature from {origin}: expected `{expected}`, found `{found}`"
                )
            }
            CheckError::StaticCannotBeAbstract { name, .. } => {
                write!(f, "static member `{name}` cannot be abstract")
            }
            CheckError::StaticUsesSelf {
                method, keyword, ..
            } => {
                write!(f, "static member `{method}` references `{keyword}`")
            }
            CheckError::InterfaceHasBody {
                interface, method, ..
            } => {
                write!(
                    f,
                    "interface `{interface}` declares `{method}` with a body; interfaces contain signatures only"
                )
            }
            CheckError::InterfaceHasField {
                interface, field, ..
            } => {
                write!(
                    f,
                    "interface `{interface}` declares field `{field}`; interfaces carry no state"
                )
            }
            CheckError::ConstructorHasModifier {
                class, modifier, ..
            } => {
                write!(f, "constructor of `{class}` cannot be `{modifier}`")
            }
            CheckError::MissingSuperInit { class, parent, .. } => {
                write!(
                    f,
                    "constructor of `{class}` does not call `super(...)` before using the `{parent}` base"
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        let err = CheckError::ExtendsFinalClass {
            class: "G".into(),
            base: "F".into(),
            span: Span::new(0, 1),
            base_span: Span::new(2, 3),
        };
        assert_eq!(err.code(), "ExtendsFinalClass");
        assert_eq!(err.severity(), Severity::Error);
    }

    #[test]
    fn missing_super_init_severity_depends_on_parent_arity() {
        let warn = CheckError::MissingSuperInit {
            class: "C".into(),
            parent: "P".into(),
            span: Span::new(0, 1),
            parent_takes_args: false,
        };
        assert_eq!(warn.severity(), Severity::Warning);

        let err = CheckError::MissingSuperInit {
            class: "C".into(),
            parent: "P".into(),
            span: Span::new(0, 1),
            parent_takes_args: true,
        };
        assert_eq!(err.severity(), Severity::Error);
    }

    #[test]
    fn diagnostic_carries_notes() {
        let err = CheckError::DuplicateDeclaration {
            name: "A".into(),
            span: Span::new(10, 11),
            previous: Span::new(2, 3),
        };
        let diag = err.to_diagnostic();
        assert_eq!(diag.code, "DuplicateDeclaration");
        assert_eq!(diag.notes.len(), 1);
        assert_eq!(diag.notes[0].span, Some(Span::new(2, 3)));
    }
}
