//! Built-in functions and bound methods of the runtime.
//!
//! Free built-ins resolve by name when nothing else in scope matches;
//! method built-ins are produced by attribute access on strings, lists,
//! and dicts with the receiver already bound.

use std::io::Write;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use spy_typeck::graph::TypeDecl;

use crate::error::{RuntimeError, RuntimeErrorKind};
use crate::interp::{as_int, err, range_values, Interp, RResult};
use crate::value::{value_eq, ExceptionVal, Value};

/// Names usable without declaration.
const FREE_BUILTINS: &[&str] = &[
    "print",
    "len",
    "range",
    "sum",
    "hasattr",
    "isinstance",
    "str",
    "int",
    "float",
    "bool",
    "abs",
    "min",
    "max",
    "ValueError",
    "TypeError",
    "NotImplementedError",
];

/// Resolve a free name to a built-in, if it is one.
pub(crate) fn lookup(name: &str) -> Option<Value> {
    FREE_BUILTINS
        .iter()
        .copied()
        .find(|n| *n == name)
        .map(Value::builtin)
}

/// Map a method name to its interned static spelling.
pub(crate) fn intern_method(name: &str) -> &'static str {
    match name {
        "lower" => "lower",
        "upper" => "upper",
        "strip" => "strip",
        "split" => "split",
        "append" => "append",
        "remove" => "remove",
        "copy" => "copy",
        "pop" => "pop",
        "keys" => "keys",
        "values" => "values",
        "items" => "items",
        "get" => "get",
        _ => "unknown",
    }
}

fn arity(name: &str, args: &[Value], expected: usize) -> RResult<()> {
    if args.len() != expected {
        return Err(err(
            RuntimeErrorKind::TypeError,
            format!(
                "{name}() takes {expected} argument(s) but {} were given",
                args.len()
            ),
        ));
    }
    Ok(())
}

/// Invoke a built-in. `recv` is present for method forms.
pub(crate) fn call(
    interp: &mut Interp<'_>,
    name: &str,
    recv: Option<Value>,
    args: Vec<Value>,
) -> RResult<Value> {
    match recv {
        Some(receiver) => call_method(interp, name, receiver, args),
        None => call_free(interp, name, args),
    }
}

fn call_free(interp: &mut Interp<'_>, name: &str, args: Vec<Value>) -> RResult<Value> {
    match name {
        "print" => {
            let rendered: Vec<String> = args.iter().map(|v| interp.str_form(v)).collect();
            writeln!(interp.out, "{}", rendered.join(" ")).map_err(|e| {
                RuntimeError::new(RuntimeErrorKind::ValueError, format!("write failed: {e}"))
            })?;
            Ok(Value::None)
        }
        "len" => {
            arity(name, &args, 1)?;
            let n = match &args[0] {
                Value::Str(s) => s.chars().count(),
                Value::List(l) => l.borrow().len(),
                Value::Tuple(t) => t.len(),
                Value::Dict(d) => d.borrow().len(),
                Value::Range(start, stop, step) => range_values(*start, *stop, *step).count(),
                other => {
                    return Err(err(
                        RuntimeErrorKind::TypeError,
                        format!("`{}` has no length", other.type_name()),
                    ))
                }
            };
            Ok(Value::Int(n as i64))
        }
        "range" => {
            if args.is_empty() || args.len() > 3 {
                return Err(err(
                    RuntimeErrorKind::TypeError,
                    format!("range() takes 1 to 3 arguments but {} were given", args.len()),
                ));
            }
            let ints: Vec<i64> = args.iter().map(as_int).collect::<RResult<_>>()?;
            let (start, stop, step) = match ints.as_slice() {
                [stop] => (0, *stop, 1),
                [start, stop] => (*start, *stop, 1),
                [start, stop, step] => (*start, *stop, *step),
                _ => unreachable!("length checked above"),
            };
            if step == 0 {
                return Err(err(RuntimeErrorKind::ValueError, "range() step must not be zero"));
            }
            Ok(Value::Range(start, stop, step))
        }
        "sum" => {
            arity(name, &args, 1)?;
            let items = interp.iterate(&args[0])?;
            let mut int_total: i64 = 0;
            let mut float_total: f64 = 0.0;
            let mut is_float = false;
            for item in items {
                match item {
                    Value::Int(i) => {
                        int_total += i;
                        float_total += i as f64;
                    }
                    Value::Float(f) => {
                        is_float = true;
                        float_total += f;
                    }
                    other => {
                        return Err(err(
                            RuntimeErrorKind::TypeError,
                            format!("sum() cannot add `{}`", other.type_name()),
                        ))
                    }
                }
            }
            if is_float {
                Ok(Value::Float(float_total))
            } else {
                Ok(Value::Int(int_total))
            }
        }
        "hasattr" => {
            arity(name, &args, 2)?;
            let Value::Str(attr) = &args[1] else {
                return Err(err(
                    RuntimeErrorKind::TypeError,
                    "hasattr() attribute name must be a string",
                ));
            };
            Ok(Value::Bool(interp.get_attr(&args[0], attr).is_ok()))
        }
        "isinstance" => {
            arity(name, &args, 2)?;
            is_instance(interp, &args[0], &args[1])
        }
        "str" => {
            arity(name, &args, 1)?;
            Ok(Value::str(interp.str_form(&args[0])))
        }
        "int" => {
            arity(name, &args, 1)?;
            match &args[0] {
                Value::Int(i) => Ok(Value::Int(*i)),
                Value::Float(f) => Ok(Value::Int(*f as i64)),
                Value::Bool(b) => Ok(Value::Int(*b as i64)),
                Value::Str(s) => s.trim().parse::<i64>().map(Value::Int).map_err(|_| {
                    err(
                        RuntimeErrorKind::ValueError,
                        format!("invalid literal for int(): '{s}'"),
                    )
                }),
                other => Err(err(
                    RuntimeErrorKind::TypeError,
                    format!("int() argument must be a number or string, not `{}`", other.type_name()),
                )),
            }
        }
        "float" => {
            arity(name, &args, 1)?;
            match &args[0] {
                Value::Int(i) => Ok(Value::Float(*i as f64)),
                Value::Float(f) => Ok(Value::Float(*f)),
                Value::Bool(b) => Ok(Value::Float(*b as i64 as f64)),
                Value::Str(s) => s.trim().parse::<f64>().map(Value::Float).map_err(|_| {
                    err(
                        RuntimeErrorKind::ValueError,
                        format!("invalid literal for float(): '{s}'"),
                    )
                }),
                other => Err(err(
                    RuntimeErrorKind::TypeError,
                    format!("float() argument must be a number or string, not `{}`", other.type_name()),
                )),
            }
        }
        "bool" => {
            arity(name, &args, 1)?;
            Ok(Value::Bool(args[0].truthy()))
        }
        "abs" => {
            arity(name, &args, 1)?;
            match &args[0] {
                Value::Int(i) => Ok(Value::Int(i.abs())),
                Value::Float(f) => Ok(Value::Float(f.abs())),
                other => Err(err(
                    RuntimeErrorKind::TypeError,
                    format!("bad operand type for abs(): `{}`", other.type_name()),
                )),
            }
        }
        "min" | "max" => min_max(interp, name, args),
        "ValueError" => Ok(make_exception(RuntimeErrorKind::ValueError, interp, args)),
        "TypeError" => Ok(make_exception(RuntimeErrorKind::TypeError, interp, args)),
        "NotImplementedError" => Ok(make_exception(
            RuntimeErrorKind::NotImplementedError,
            interp,
            args,
        )),
        "time.time" => {
            arity("time", &args, 0)?;
            let now = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map_err(|e| err(RuntimeErrorKind::ValueError, format!("clock error: {e}")))?;
            Ok(Value::Float(now.as_secs_f64()))
        }
        other => Err(err(
            RuntimeErrorKind::TypeError,
            format!("unknown built-in `{other}`"),
        )),
    }
}

fn make_exception(kind: RuntimeErrorKind, interp: &Interp<'_>, args: Vec<Value>) -> Value {
    let message = args
        .first()
        .map(|v| interp.str_form(v))
        .unwrap_or_default();
    Value::Exception(Rc::new(ExceptionVal { kind, message }))
}

fn min_max(interp: &Interp<'_>, name: &str, args: Vec<Value>) -> RResult<Value> {
    let items = if args.len() == 1 {
        interp.iterate(&args[0])?
    } else {
        args
    };
    if items.is_empty() {
        return Err(err(
            RuntimeErrorKind::ValueError,
            format!("{name}() of an empty sequence"),
        ));
    }
    let mut best = items[0].clone();
    for item in &items[1..] {
        let (a, b) = match (item.as_f64(), best.as_f64()) {
            (Some(a), Some(b)) => (a, b),
            _ => {
                return Err(err(
                    RuntimeErrorKind::TypeError,
                    format!("{name}() arguments must be numbers"),
                ))
            }
        };
        let better = if name == "min" { a < b } else { a > b };
        if better {
            best = item.clone();
        }
    }
    Ok(best)
}

fn is_instance(interp: &Interp<'_>, value: &Value, ty: &Value) -> RResult<Value> {
    match ty {
        Value::Type(id) => {
            let Value::Object(obj) = value else {
                return Ok(Value::Bool(false));
            };
            let result = match interp.graph.get(*id) {
                TypeDecl::Class(_) => interp.graph.is_subclass(obj.class, *id),
                // Interfaces are first-class runtime types; conformance is a
                // precomputed closure probe.
                TypeDecl::Interface(_) => interp.graph.implements(obj.class, *id),
            };
            Ok(Value::Bool(result))
        }
        Value::Builtin(b) => {
            let matches = match b.name {
                "str" => matches!(value, Value::Str(_)),
                "int" => matches!(value, Value::Int(_)),
                "float" => matches!(value, Value::Float(_)),
                "bool" => matches!(value, Value::Bool(_)),
                _ => false,
            };
            Ok(Value::Bool(matches))
        }
        other => Err(err(
            RuntimeErrorKind::TypeError,
            format!("isinstance() second argument must be a type, not `{}`", other.type_name()),
        )),
    }
}

// ── Method Built-ins ─────────────────────────────────────────────────────

fn call_method(
    interp: &mut Interp<'_>,
    name: &str,
    receiver: Value,
    args: Vec<Value>,
) -> RResult<Value> {
    match (&receiver, name) {
        (Value::Str(s), "lower") => {
            arity(name, &args, 0)?;
            Ok(Value::str(s.to_lowercase()))
        }
        (Value::Str(s), "upper") => {
            arity(name, &args, 0)?;
            Ok(Value::str(s.to_uppercase()))
        }
        (Value::Str(s), "strip") => {
            arity(name, &args, 0)?;
            Ok(Value::str(s.trim().to_string()))
        }
        (Value::Str(s), "split") => match args.as_slice() {
            [] => Ok(Value::list(
                s.split_whitespace().map(Value::str).collect(),
            )),
            [Value::Str(sep)] => Ok(Value::list(
                s.split(sep.as_str()).map(Value::str).collect(),
            )),
            _ => Err(err(
                RuntimeErrorKind::TypeError,
                "split() takes at most one string separator",
            )),
        },
        (Value::List(l), "append") => {
            arity(name, &args, 1)?;
            l.borrow_mut().push(args[0].clone());
            Ok(Value::None)
        }
        (Value::List(l), "remove") => {
            arity(name, &args, 1)?;
            let mut list = l.borrow_mut();
            match list.iter().position(|v| value_eq(v, &args[0])) {
                Some(i) => {
                    list.remove(i);
                    Ok(Value::None)
                }
                None => Err(err(
                    RuntimeErrorKind::ValueError,
                    "list.remove(x): x not in list",
                )),
            }
        }
        (Value::List(l), "copy") => {
            arity(name, &args, 0)?;
            Ok(Value::list(l.borrow().clone()))
        }
        (Value::List(l), "pop") => {
            let mut list = l.borrow_mut();
            let index = match args.as_slice() {
                [] => list.len().checked_sub(1),
                [v] => {
                    let i = as_int(v)?;
                    let adjusted = if i < 0 { i + list.len() as i64 } else { i };
                    (adjusted >= 0 && (adjusted as usize) < list.len())
                        .then_some(adjusted as usize)
                }
                _ => {
                    return Err(err(
                        RuntimeErrorKind::TypeError,
                        "pop() takes at most one argument",
                    ))
                }
            };
            match index {
                Some(i) => Ok(list.remove(i)),
                None => Err(err(RuntimeErrorKind::IndexError, "pop from empty list")),
            }
        }
        (Value::Dict(d), "keys") => {
            arity(name, &args, 0)?;
            Ok(Value::list(d.borrow().iter().map(|(k, _)| k.clone()).collect()))
        }
        (Value::Dict(d), "values") => {
            arity(name, &args, 0)?;
            Ok(Value::list(d.borrow().iter().map(|(_, v)| v.clone()).collect()))
        }
        (Value::Dict(d), "items") => {
            arity(name, &args, 0)?;
            Ok(Value::list(
                d.borrow()
                    .iter()
                    .map(|(k, v)| Value::Tuple(Rc::new(vec![k.clone(), v.clone()])))
                    .collect(),
            ))
        }
        (Value::Dict(d), "get") => {
            let (key, default) = match args.as_slice() {
                [k] => (k.clone(), Value::None),
                [k, d] => (k.clone(), d.clone()),
                _ => {
                    return Err(err(
                        RuntimeErrorKind::TypeError,
                        "get() takes one or two arguments",
                    ))
                }
            };
            let found = d
                .borrow()
                .iter()
                .find(|(k, _)| value_eq(k, &key))
                .map(|(_, v)| v.clone());
            Ok(found.unwrap_or(default))
        }
        (recv, method) => Err(err(
            RuntimeErrorKind::AttributeError,
            format!("`{}` object has no method `{method}`", recv.type_name()),
        )),
    }
}
