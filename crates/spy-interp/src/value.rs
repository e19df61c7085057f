//! Runtime values for the Spy evaluator.
//!
//! Values are cheap to clone: compound data sits behind `Rc`, with
//! `RefCell` where the language allows in-place mutation (lists, dicts,
//! object attribute bags). Dicts are insertion-ordered pairs with
//! value-equality key lookup, which is all the example programs need.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use spy_parser::ast::item::FnDef;
use spy_typeck::graph::{MemberRef, TypeId};

use crate::error::RuntimeErrorKind;

#[derive(Debug, Clone)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Rc<String>),
    List(Rc<RefCell<Vec<Value>>>),
    Tuple(Rc<Vec<Value>>),
    Dict(Rc<RefCell<Vec<(Value, Value)>>>),
    /// `range(start, stop, step)`; step is never zero.
    Range(i64, i64, i64),
    /// A class or interface as a first-class runtime type.
    Type(TypeId),
    Object(Rc<Instance>),
    Function(Rc<FunctionVal>),
    BoundMethod(Rc<BoundMethod>),
    Builtin(Builtin),
    Module(&'static str),
    Exception(Rc<ExceptionVal>),
}

/// One object: its class descriptor and a mutable attribute bag.
#[derive(Debug)]
pub struct Instance {
    pub class: TypeId,
    pub attrs: RefCell<FxHashMap<String, Value>>,
}

#[derive(Debug)]
pub struct FunctionVal {
    pub name: String,
    pub def: FnDef,
}

/// A method picked by dispatch, bound to its receiver.
///
/// The member reference names the exact declaration to run; `super.m(...)`
/// binds an ancestor's declaration directly, with no re-dispatch.
#[derive(Debug)]
pub struct BoundMethod {
    pub recv: Value,
    pub member: MemberRef,
}

/// A built-in function, optionally bound to a receiver (`"x".lower`).
#[derive(Debug, Clone)]
pub struct Builtin {
    pub name: &'static str,
    pub recv: Option<Box<Value>>,
}

#[derive(Debug)]
pub struct ExceptionVal {
    pub kind: RuntimeErrorKind,
    pub message: String,
}

impl Value {
    pub fn str(s: impl Into<String>) -> Value {
        Value::Str(Rc::new(s.into()))
    }

    pub fn list(items: Vec<Value>) -> Value {
        Value::List(Rc::new(RefCell::new(items)))
    }

    pub fn builtin(name: &'static str) -> Value {
        Value::Builtin(Builtin { name, recv: None })
    }

    pub fn bound_builtin(name: &'static str, recv: Value) -> Value {
        Value::Builtin(Builtin {
            name,
            recv: Some(Box::new(recv)),
        })
    }

    /// The user-facing type name, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "None",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::List(_) => "list",
            Value::Tuple(_) => "tuple",
            Value::Dict(_) => "dict",
            Value::Range(..) => "range",
            Value::Type(_) => "type",
            Value::Object(_) => "object",
            Value::Function(_) => "function",
            Value::BoundMethod(_) => "method",
            Value::Builtin(_) => "builtin",
            Value::Module(_) => "module",
            Value::Exception(_) => "exception",
        }
    }

    pub fn truthy(&self) -> bool {
        match self {
            Value::None => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::List(l) => !l.borrow().is_empty(),
            Value::Tuple(t) => !t.is_empty(),
            Value::Dict(d) => !d.borrow().is_empty(),
            Value::Range(start, stop, step) => {
                if *step > 0 {
                    start < stop
                } else {
                    start > stop
                }
            }
            _ => true,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }
}

/// Deep value equality, Python-flavored: ints and floats compare across
/// kinds, containers compare element-wise, objects by identity.
pub fn value_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::None, Value::None) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Int(x), Value::Int(y)) => x == y,
        (Value::Float(x), Value::Float(y)) => x == y,
        (Value::Int(x), Value::Float(y)) | (Value::Float(y), Value::Int(x)) => *x as f64 == *y,
        (Value::Str(x), Value::Str(y)) => x == y,
        (Value::List(x), Value::List(y)) => {
            let (x, y) = (x.borrow(), y.borrow());
            x.len() == y.len() && x.iter().zip(y.iter()).all(|(a, b)| value_eq(a, b))
        }
        (Value::Tuple(x), Value::Tuple(y)) => {
            x.len() == y.len() && x.iter().zip(y.iter()).all(|(a, b)| value_eq(a, b))
        }
        (Value::Dict(x), Value::Dict(y)) => {
            let (x, y) = (x.borrow(), y.borrow());
            x.len() == y.len()
                && x.iter().all(|(k, v)| {
                    y.iter()
                        .any(|(k2, v2)| value_eq(k, k2) && value_eq(v, v2))
                })
        }
        (Value::Range(a1, b1, c1), Value::Range(a2, b2, c2)) => {
            a1 == a2 && b1 == b2 && c1 == c2
        }
        (Value::Type(x), Value::Type(y)) => x == y,
        (Value::Object(x), Value::Object(y)) => Rc::ptr_eq(x, y),
        _ => false,
    }
}

/// Identity (`is`): pointer identity for heap values, plain equality for
/// immutable scalars.
pub fn value_is(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::List(x), Value::List(y)) => Rc::ptr_eq(x, y),
        (Value::Dict(x), Value::Dict(y)) => Rc::ptr_eq(x, y),
        (Value::Tuple(x), Value::Tuple(y)) => Rc::ptr_eq(x, y),
        (Value::Object(x), Value::Object(y)) => Rc::ptr_eq(x, y),
        (Value::Str(x), Value::Str(y)) => Rc::ptr_eq(x, y) || x == y,
        _ => value_eq(a, b),
    }
}

/// Python-style float display: integral floats keep one fractional digit.
pub fn format_float(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e16 {
        format!("{f:.1}")
    } else {
        format!("{f}")
    }
}
