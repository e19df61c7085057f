//! Method signatures for the Spy nominal type system.
//!
//! Spy types are names: two annotations denote the same type exactly when
//! they are spelled the same. A missing annotation is a wildcard that is
//! compatible with anything, so unannotated code never trips the override
//! checks.

use std::fmt;

use serde::Serialize;

/// One declared parameter: its name and optional type annotation.
///
/// The implicit receiver is never part of a signature; an explicit leading
/// `self` parameter is stripped when the signature is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParamSig {
    pub name: String,
    pub ty: Option<String>,
}

/// A method signature: ordered parameter types and a return type.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Signature {
    pub params: Vec<ParamSig>,
    pub return_ty: Option<String>,
}

impl Signature {
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Whether this signature can satisfy `required`.
    ///
    /// Same arity, pairwise-identical parameter type names, identical
    /// return type name; `None` on either side matches anything.
    pub fn compatible_with(&self, required: &Signature) -> bool {
        self.params.len() == required.params.len()
            && self
                .params
                .iter()
                .zip(&required.params)
                .all(|(a, b)| ty_matches(&a.ty, &b.ty))
            && ty_matches(&self.return_ty, &required.return_ty)
    }
}

fn ty_matches(a: &Option<String>, b: &Option<String>) -> bool {
    match (a, b) {
        (Some(x), Some(y)) => x == y,
        _ => true,
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, p) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match &p.ty {
                Some(ty) => write!(f, "{}: {}", p.name, ty)?,
                None => write!(f, "{}", p.name)?,
            }
        }
        write!(f, ")")?;
        if let Some(ret) = &self.return_ty {
            write!(f, " -> {ret}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sig(params: &[(&str, Option<&str>)], ret: Option<&str>) -> Signature {
        Signature {
            params: params
                .iter()
                .map(|(n, t)| ParamSig {
                    name: n.to_string(),
                    ty: t.map(str::to_string),
                })
                .collect(),
            return_ty: ret.map(str::to_string),
        }
    }

    #[test]
    fn identical_signatures_are_compatible() {
        let a = sig(&[("x", Some("int"))], Some("int"));
        let b = sig(&[("y", Some("int"))], Some("int"));
        // Parameter names do not participate in compatibility.
        assert!(a.compatible_with(&b));
    }

    #[test]
    fn return_type_mismatch() {
        let found = sig(&[], Some("str"));
        let required = sig(&[], Some("int"));
        assert!(!found.compatible_with(&required));
    }

    #[test]
    fn arity_mismatch() {
        let found = sig(&[("x", Some("int"))], None);
        let required = sig(&[], None);
        assert!(!found.compatible_with(&required));
    }

    #[test]
    fn missing_annotation_is_a_wildcard() {
        let found = sig(&[("x", None)], None);
        let required = sig(&[("x", Some("int"))], Some("int"));
        assert!(found.compatible_with(&required));
    }

    #[test]
    fn display_form() {
        let s = sig(&[("x", Some("int")), ("y", None)], Some("float"));
        assert_eq!(s.to_string(), "(x: int, y) -> float");
    }
}
