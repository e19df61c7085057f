//! The tree-walking evaluator.
//!
//! Consumes a checked program: the typed AST plus the type graph with its
//! precomputed MRO and override tables. Dynamic dispatch is a table lookup;
//! `super(...)` and `super.m(...)` index the ancestor chain of the method's
//! owner class directly. Static members live in per-class tables created at
//! startup, instance attributes in per-object bags.

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use spy_parser::ast::expr::{
    BinaryOp, DictEntry, Expr, FStringPart, Literal, LiteralKind, UnaryOp,
};
use spy_parser::ast::item::FnDef;
use spy_parser::ast::stmt::{AssignOp, Block, Stmt};
use spy_parser::ast::AstNode;
use spy_parser::Parse;
use spy_typeck::graph::{MemberKind, MemberRef, TypeDecl, TypeGraph, TypeId};
use spy_typeck::CheckResult;

use crate::builtins;
use crate::error::{RuntimeError, RuntimeErrorKind};
use crate::value::{format_float, value_eq, value_is, Builtin, BoundMethod, FunctionVal, Instance, Value};

pub(crate) type RResult<T> = Result<T, RuntimeError>;

pub(crate) fn err(kind: RuntimeErrorKind, message: impl Into<String>) -> RuntimeError {
    RuntimeError::new(kind, message)
}

/// Run a checked program: initialize class descriptors and globals, then
/// execute the top-level statements in source order.
pub fn run(parse: &Parse, check: &CheckResult, out: &mut dyn Write) -> Result<(), RuntimeError> {
    let mut interp = Interp::new(&check.graph, out);

    // Type declarations and free functions become globals first, so that
    // top-level code may refer to anything declared later in the file.
    for id in check.graph.ids() {
        let name = check.graph.name_of(id).to_string();
        interp.globals.insert(name, Value::Type(id));
    }
    for (name, def) in &check.functions {
        interp.globals.insert(
            name.clone(),
            Value::Function(Rc::new(FunctionVal {
                name: name.clone(),
                def: def.clone(),
            })),
        );
    }

    interp.init_statics()?;

    let file = parse.source_file();
    let mut frame = Frame::global();
    for stmt in file.stmts() {
        if let Flow::Return(_) = interp.exec_stmt(&stmt, &mut frame)? {
            break; // a stray top-level return just stops execution
        }
    }
    Ok(())
}

/// What a statement did with control flow.
pub(crate) enum Flow {
    Normal,
    Return(Value),
}

/// One activation record.
pub(crate) struct Frame {
    locals: FxHashMap<String, Value>,
    receiver: Option<Value>,
    /// The class that declares the currently executing method; anchors
    /// `super` dispatch.
    owner: Option<TypeId>,
    is_global: bool,
}

impl Frame {
    pub(crate) fn global() -> Frame {
        Frame {
            locals: FxHashMap::default(),
            receiver: None,
            owner: None,
            is_global: true,
        }
    }

    fn call(receiver: Option<Value>, owner: Option<TypeId>) -> Frame {
        Frame {
            locals: FxHashMap::default(),
            receiver,
            owner,
            is_global: false,
        }
    }
}

pub struct Interp<'a> {
    pub(crate) graph: &'a TypeGraph,
    pub(crate) globals: FxHashMap<String, Value>,
    pub(crate) statics: FxHashMap<TypeId, FxHashMap<String, Value>>,
    pub(crate) out: &'a mut dyn Write,
}

impl<'a> Interp<'a> {
    pub fn new(graph: &'a TypeGraph, out: &'a mut dyn Write) -> Self {
        Self {
            graph,
            globals: FxHashMap::default(),
            statics: FxHashMap::default(),
            out,
        }
    }

    /// Evaluate static field initializers, in declaration order, into the
    /// per-class static tables.
    fn init_statics(&mut self) -> RResult<()> {
        for id in self.graph.ids() {
            let Some(class) = self.graph.class(id) else {
                continue;
            };
            let inits: Vec<(String, Expr)> = class
                .members
                .iter()
                .filter(|m| m.kind == MemberKind::StaticField)
                .filter_map(|m| {
                    m.field
                        .as_ref()
                        .and_then(|f| f.initializer())
                        .map(|init| (m.name.clone(), init))
                })
                .collect();
            let mut frame = Frame::global();
            for (name, init) in inits {
                let value = self.eval_expr(&init, &mut frame)?;
                self.statics.entry(id).or_default().insert(name, value);
            }
        }
        Ok(())
    }

    // ── Statements ───────────────────────────────────────────────────────

    pub(crate) fn exec_block(&mut self, block: &Block, frame: &mut Frame) -> RResult<Flow> {
        for stmt in block.stmts() {
            if let Flow::Return(v) = self.exec_stmt(&stmt, frame)? {
                return Ok(Flow::Return(v));
            }
        }
        Ok(Flow::Normal)
    }

    pub(crate) fn exec_stmt(&mut self, stmt: &Stmt, frame: &mut Frame) -> RResult<Flow> {
        match stmt {
            Stmt::Expr(s) => {
                if let Some(expr) = s.expr() {
                    self.eval_expr(&expr, frame)?;
                }
                Ok(Flow::Normal)
            }
            Stmt::Assign(s) => {
                let target = s
                    .target()
                    .ok_or_else(|| err(RuntimeErrorKind::TypeError, "malformed assignment"))?;
                let rhs = s
                    .value()
                    .ok_or_else(|| err(RuntimeErrorKind::TypeError, "malformed assignment"))?;
                let value = match s.op() {
                    AssignOp::Assign => self.eval_expr(&rhs, frame)?,
                    aug => {
                        let current = self.eval_expr(&target, frame)?;
                        let operand = self.eval_expr(&rhs, frame)?;
                        let op = match aug {
                            AssignOp::Add => BinaryOp::Add,
                            AssignOp::Sub => BinaryOp::Sub,
                            AssignOp::Mul => BinaryOp::Mul,
                            AssignOp::Div => BinaryOp::Div,
                            AssignOp::Assign => unreachable!("handled above"),
                        };
                        self.binary_op(op, current, operand)?
                    }
                };
                self.assign_target(&target, value, frame)?;
                Ok(Flow::Normal)
            }
            Stmt::Return(s) => {
                let value = match s.value() {
                    Some(expr) => self.eval_expr(&expr, frame)?,
                    None => Value::None,
                };
                Ok(Flow::Return(value))
            }
            Stmt::If(s) => {
                let cond = s
                    .condition()
                    .ok_or_else(|| err(RuntimeErrorKind::TypeError, "malformed if"))?;
                if self.eval_expr(&cond, frame)?.truthy() {
                    if let Some(block) = s.then_block() {
                        return self.exec_block(&block, frame);
                    }
                    return Ok(Flow::Normal);
                }
                for branch in s.elif_branches() {
                    let cond = branch
                        .condition()
                        .ok_or_else(|| err(RuntimeErrorKind::TypeError, "malformed elif"))?;
                    if self.eval_expr(&cond, frame)?.truthy() {
                        if let Some(block) = branch.block() {
                            return self.exec_block(&block, frame);
                        }
                        return Ok(Flow::Normal);
                    }
                }
                if let Some(branch) = s.else_branch() {
                    if let Some(block) = branch.block() {
                        return self.exec_block(&block, frame);
                    }
                }
                Ok(Flow::Normal)
            }
            Stmt::For(s) => {
                let binding = s
                    .binding()
                    .ok_or_else(|| err(RuntimeErrorKind::TypeError, "malformed for"))?
                    .text();
                let iterable = s
                    .iterable()
                    .ok_or_else(|| err(RuntimeErrorKind::TypeError, "malformed for"))?;
                let iterable = self.eval_expr(&iterable, frame)?;
                let items = self.iterate(&iterable)?;
                let Some(body) = s.body() else {
                    return Ok(Flow::Normal);
                };
                for item in items {
                    self.set_name(&binding, item, frame);
                    if let Flow::Return(v) = self.exec_block(&body, frame)? {
                        return Ok(Flow::Return(v));
                    }
                }
                Ok(Flow::Normal)
            }
            Stmt::While(s) => {
                let cond = s
                    .condition()
                    .ok_or_else(|| err(RuntimeErrorKind::TypeError, "malformed while"))?;
                let Some(body) = s.body() else {
                    return Ok(Flow::Normal);
                };
                while self.eval_expr(&cond, frame)?.truthy() {
                    if let Flow::Return(v) = self.exec_block(&body, frame)? {
                        return Ok(Flow::Return(v));
                    }
                }
                Ok(Flow::Normal)
            }
            Stmt::Pass(_) => Ok(Flow::Normal),
            Stmt::Raise(s) => {
                let value = s
                    .value()
                    .ok_or_else(|| err(RuntimeErrorKind::TypeError, "malformed raise"))?;
                let span = value.span();
                let value = self.eval_expr(&value, frame)?;
                match value {
                    Value::Exception(exc) => Err(RuntimeError::new(exc.kind, exc.message.clone())
                        .with_span(span)),
                    other => Err(err(
                        RuntimeErrorKind::TypeError,
                        format!("can only raise exception values, not `{}`", other.type_name()),
                    )
                    .with_span(span)),
                }
            }
            Stmt::Import(s) => {
                let Some(module) = s.module() else {
                    return Ok(Flow::Normal);
                };
                let module_name = module.text();
                if module_name != "time" {
                    return Err(err(
                        RuntimeErrorKind::ValueError,
                        format!("no module named `{module_name}`"),
                    )
                    .with_span(s.span()));
                }
                if s.is_from() {
                    for imported in s.imported() {
                        let name = imported.text();
                        if name != "time" {
                            return Err(err(
                                RuntimeErrorKind::ValueError,
                                format!("module `time` has no member `{name}`"),
                            )
                            .with_span(s.span()));
                        }
                        self.set_name(&name, Value::builtin("time.time"), frame);
                    }
                } else {
                    self.set_name(&module_name, Value::Module("time"), frame);
                }
                Ok(Flow::Normal)
            }
        }
    }

    // ── Names and Assignment ─────────────────────────────────────────────

    pub(crate) fn set_name(&mut self, name: &str, value: Value, frame: &mut Frame) {
        if frame.is_global {
            self.globals.insert(name.to_string(), value);
        } else {
            frame.locals.insert(name.to_string(), value);
        }
    }

    fn get_name(&self, name: &str, frame: &Frame) -> RResult<Value> {
        if let Some(v) = frame.locals.get(name) {
            return Ok(v.clone());
        }
        if let Some(v) = self.globals.get(name) {
            return Ok(v.clone());
        }
        if let Some(v) = builtins::lookup(name) {
            return Ok(v);
        }
        Err(err(
            RuntimeErrorKind::TypeError,
            format!("undefined name `{name}`"),
        ))
    }

    fn assign_target(&mut self, target: &Expr, value: Value, frame: &mut Frame) -> RResult<()> {
        match target {
            Expr::NameRef(name) => {
                self.set_name(&name.text(), value, frame);
                Ok(())
            }
            Expr::Field(fa) => {
                let receiver = fa
                    .receiver()
                    .ok_or_else(|| err(RuntimeErrorKind::TypeError, "malformed attribute"))?;
                let name = fa
                    .name()
                    .ok_or_else(|| err(RuntimeErrorKind::TypeError, "malformed attribute"))?;
                let receiver = self.eval_expr(&receiver, frame)?;
                self.set_attr(&receiver, &name, value)
            }
            Expr::Index(ix) => {
                let receiver = ix
                    .receiver()
                    .ok_or_else(|| err(RuntimeErrorKind::TypeError, "malformed index"))?;
                let index = ix
                    .index()
                    .ok_or_else(|| err(RuntimeErrorKind::TypeError, "cannot assign to a slice"))?;
                let receiver = self.eval_expr(&receiver, frame)?;
                let index = self.eval_expr(&index, frame)?;
                self.index_set(&receiver, index, value)
            }
            _ => Err(err(
                RuntimeErrorKind::TypeError,
                "invalid assignment target",
            )),
        }
    }

    fn set_attr(&mut self, receiver: &Value, name: &str, value: Value) -> RResult<()> {
        match receiver {
            Value::Object(obj) => {
                obj.attrs.borrow_mut().insert(name.to_string(), value);
                Ok(())
            }
            Value::Type(id) => {
                // Assign through the class that declares the static, falling
                // back to the named class itself.
                let target = self
                    .graph
                    .class(*id)
                    .map(|c| {
                        c.mro
                            .iter()
                            .copied()
                            .find(|cid| {
                                self.statics
                                    .get(cid)
                                    .is_some_and(|table| table.contains_key(name))
                            })
                            .unwrap_or(*id)
                    })
                    .unwrap_or(*id);
                self.statics
                    .entry(target)
                    .or_default()
                    .insert(name.to_string(), value);
                Ok(())
            }
            other => Err(err(
                RuntimeErrorKind::AttributeError,
                format!("cannot set attribute `{name}` on `{}`", other.type_name()),
            )),
        }
    }

    fn index_set(&mut self, receiver: &Value, index: Value, value: Value) -> RResult<()> {
        match receiver {
            Value::List(list) => {
                let mut list = list.borrow_mut();
                let i = normalize_index(&index, list.len())?;
                list[i] = value;
                Ok(())
            }
            Value::Dict(dict) => {
                let mut dict = dict.borrow_mut();
                if let Some(slot) = dict.iter_mut().find(|(k, _)| value_eq(k, &index)) {
                    slot.1 = value;
                } else {
                    dict.push((index, value));
                }
                Ok(())
            }
            other => Err(err(
                RuntimeErrorKind::TypeError,
                format!("`{}` does not support item assignment", other.type_name()),
            )),
        }
    }

    // ── Expressions ──────────────────────────────────────────────────────

    pub(crate) fn eval_expr(&mut self, expr: &Expr, frame: &mut Frame) -> RResult<Value> {
        let span = expr.span();
        self.eval_expr_inner(expr, frame).map_err(|e| e.or_span(span))
    }

    fn eval_expr_inner(&mut self, expr: &Expr, frame: &mut Frame) -> RResult<Value> {
        match expr {
            Expr::Literal(lit) => self.eval_literal(lit),
            Expr::FString(f) => {
                let mut out = String::new();
                for part in f.parts() {
                    match part {
                        FStringPart::Text(token) => {
                            out.push_str(&unescape_fstring_text(token.text()));
                        }
                        FStringPart::Interp(interp) => {
                            let inner = interp.expr().ok_or_else(|| {
                                err(RuntimeErrorKind::ValueError, "empty interpolation")
                            })?;
                            let value = self.eval_expr(&inner, frame)?;
                            out.push_str(&self.format_value(&value, interp.format_spec())?);
                        }
                    }
                }
                Ok(Value::str(out))
            }
            Expr::NameRef(name) => self.get_name(&name.text(), frame),
            Expr::SelfExpr(_) => frame
                .receiver
                .clone()
                .ok_or_else(|| err(RuntimeErrorKind::TypeError, "`self` used outside a method")),
            Expr::SuperExpr(_) => Err(err(
                RuntimeErrorKind::TypeError,
                "`super` must be called or accessed",
            )),
            Expr::List(list) => {
                let mut items = Vec::new();
                for e in list.elements() {
                    items.push(self.eval_expr(&e, frame)?);
                }
                Ok(Value::list(items))
            }
            Expr::Tuple(tuple) => {
                let mut items = Vec::new();
                for e in tuple.elements() {
                    items.push(self.eval_expr(&e, frame)?);
                }
                Ok(Value::Tuple(Rc::new(items)))
            }
            Expr::Dict(dict) => {
                let mut pairs = Vec::new();
                for entry in dict.entries() {
                    let (k, v) = self.eval_dict_entry(&entry, frame)?;
                    if let Some(slot) = pairs.iter_mut().find(|(pk, _)| value_eq(pk, &k)) {
                        slot.1 = v;
                    } else {
                        pairs.push((k, v));
                    }
                }
                Ok(Value::Dict(Rc::new(RefCell::new(pairs))))
            }
            Expr::Paren(p) => {
                let inner = p
                    .inner()
                    .ok_or_else(|| err(RuntimeErrorKind::TypeError, "empty parentheses"))?;
                self.eval_expr(&inner, frame)
            }
            Expr::Unary(u) => {
                let operand = u
                    .operand()
                    .ok_or_else(|| err(RuntimeErrorKind::TypeError, "malformed unary"))?;
                let value = self.eval_expr(&operand, frame)?;
                match u.op() {
                    Some(UnaryOp::Neg) => match value {
                        Value::Int(i) => Ok(Value::Int(-i)),
                        Value::Float(f) => Ok(Value::Float(-f)),
                        other => Err(err(
                            RuntimeErrorKind::TypeError,
                            format!("bad operand type for unary -: `{}`", other.type_name()),
                        )),
                    },
                    Some(UnaryOp::Not) => Ok(Value::Bool(!value.truthy())),
                    None => Err(err(RuntimeErrorKind::TypeError, "malformed unary")),
                }
            }
            Expr::Binary(b) => {
                let op = b
                    .op()
                    .ok_or_else(|| err(RuntimeErrorKind::TypeError, "malformed operator"))?;
                let lhs_expr = b
                    .lhs()
                    .ok_or_else(|| err(RuntimeErrorKind::TypeError, "missing left operand"))?;
                let rhs_expr = b
                    .rhs()
                    .ok_or_else(|| err(RuntimeErrorKind::TypeError, "missing right operand"))?;

                // Short-circuit forms return an operand, Python-style.
                if op == BinaryOp::And {
                    let lhs = self.eval_expr(&lhs_expr, frame)?;
                    if !lhs.truthy() {
                        return Ok(lhs);
                    }
                    return self.eval_expr(&rhs_expr, frame);
                }
                if op == BinaryOp::Or {
                    let lhs = self.eval_expr(&lhs_expr, frame)?;
                    if lhs.truthy() {
                        return Ok(lhs);
                    }
                    return self.eval_expr(&rhs_expr, frame);
                }

                let lhs = self.eval_expr(&lhs_expr, frame)?;
                let rhs = self.eval_expr(&rhs_expr, frame)?;
                self.binary_op(op, lhs, rhs)
            }
            Expr::Call(call) => self.eval_call(call, frame),
            Expr::Field(fa) => {
                let receiver = fa
                    .receiver()
                    .ok_or_else(|| err(RuntimeErrorKind::TypeError, "malformed attribute"))?;
                let name = fa
                    .name()
                    .ok_or_else(|| err(RuntimeErrorKind::TypeError, "malformed attribute"))?;
                if matches!(receiver, Expr::SuperExpr(_)) {
                    return self.super_method(&name, frame);
                }
                let receiver = self.eval_expr(&receiver, frame)?;
                self.get_attr(&receiver, &name)
            }
            Expr::Index(ix) => {
                let receiver = ix
                    .receiver()
                    .ok_or_else(|| err(RuntimeErrorKind::TypeError, "malformed index"))?;
                let receiver = self.eval_expr(&receiver, frame)?;
                if let Some(slice) = ix.slice() {
                    let start = match slice.start() {
                        Some(e) => Some(as_int(&self.eval_expr(&e, frame)?)?),
                        None => None,
                    };
                    let end = match slice.end() {
                        Some(e) => Some(as_int(&self.eval_expr(&e, frame)?)?),
                        None => None,
                    };
                    self.slice_value(&receiver, start, end)
                } else {
                    let index = ix
                        .index()
                        .ok_or_else(|| err(RuntimeErrorKind::TypeError, "malformed index"))?;
                    let index = self.eval_expr(&index, frame)?;
                    self.index_value(&receiver, &index)
                }
            }
        }
    }

    fn eval_dict_entry(&mut self, entry: &DictEntry, frame: &mut Frame) -> RResult<(Value, Value)> {
        let key = entry
            .key()
            .ok_or_else(|| err(RuntimeErrorKind::TypeError, "malformed dict entry"))?;
        let value = entry
            .value()
            .ok_or_else(|| err(RuntimeErrorKind::TypeError, "malformed dict entry"))?;
        let key = self.eval_expr(&key, frame)?;
        let value = self.eval_expr(&value, frame)?;
        Ok((key, value))
    }

    fn eval_literal(&self, lit: &Literal) -> RResult<Value> {
        let text = lit.text();
        match lit.kind() {
            Some(LiteralKind::Int) => text.parse::<i64>().map(Value::Int).map_err(|_| {
                err(
                    RuntimeErrorKind::ValueError,
                    format!("integer literal out of range: {text}"),
                )
            }),
            Some(LiteralKind::Float) => text.parse::<f64>().map(Value::Float).map_err(|_| {
                err(
                    RuntimeErrorKind::ValueError,
                    format!("invalid float literal: {text}"),
                )
            }),
            Some(LiteralKind::Str) => Ok(Value::str(unescape_string(&text))),
            Some(LiteralKind::True) => Ok(Value::Bool(true)),
            Some(LiteralKind::False) => Ok(Value::Bool(false)),
            Some(LiteralKind::NoneLit) => Ok(Value::None),
            None => Err(err(RuntimeErrorKind::ValueError, "malformed literal")),
        }
    }

    // ── Operators ────────────────────────────────────────────────────────

    pub(crate) fn binary_op(&mut self, op: BinaryOp, lhs: Value, rhs: Value) -> RResult<Value> {
        use BinaryOp::*;
        match op {
            Eq => return Ok(Value::Bool(value_eq(&lhs, &rhs))),
            Ne => return Ok(Value::Bool(!value_eq(&lhs, &rhs))),
            Is => return Ok(Value::Bool(value_is(&lhs, &rhs))),
            IsNot => return Ok(Value::Bool(!value_is(&lhs, &rhs))),
            In => return Ok(Value::Bool(self.contains(&rhs, &lhs)?)),
            NotIn => return Ok(Value::Bool(!self.contains(&rhs, &lhs)?)),
            Lt | Le | Gt | Ge => return self.compare(op, &lhs, &rhs),
            _ => {}
        }

        match (op, &lhs, &rhs) {
            // String and sequence operators first.
            (Add, Value::Str(a), Value::Str(b)) => Ok(Value::str(format!("{a}{b}"))),
            (Add, Value::List(a), Value::List(b)) => {
                let mut items = a.borrow().clone();
                items.extend(b.borrow().iter().cloned());
                Ok(Value::list(items))
            }
            (Mul, Value::Str(s), Value::Int(n)) | (Mul, Value::Int(n), Value::Str(s)) => {
                Ok(Value::str(s.repeat((*n).max(0) as usize)))
            }
            (Mul, Value::List(l), Value::Int(n)) => {
                let items = l.borrow();
                let mut out = Vec::new();
                for _ in 0..(*n).max(0) {
                    out.extend(items.iter().cloned());
                }
                Ok(Value::list(out))
            }

            (Add, Value::Int(a), Value::Int(b)) => Ok(Value::Int(a + b)),
            (Sub, Value::Int(a), Value::Int(b)) => Ok(Value::Int(a - b)),
            (Mul, Value::Int(a), Value::Int(b)) => Ok(Value::Int(a * b)),
            (Mod, Value::Int(a), Value::Int(b)) => {
                if *b == 0 {
                    Err(err(RuntimeErrorKind::ZeroDivision, "modulo by zero"))
                } else {
                    Ok(Value::Int(a.rem_euclid(*b)))
                }
            }
            (Pow, Value::Int(a), Value::Int(b)) if *b >= 0 => {
                match u32::try_from(*b).ok().and_then(|e| a.checked_pow(e)) {
                    Some(v) => Ok(Value::Int(v)),
                    None => Ok(Value::Float((*a as f64).powf(*b as f64))),
                }
            }

            // Mixed numeric arithmetic promotes to float; `/` always does.
            (Div, a, b) if a.is_numeric() && b.is_numeric() => {
                let (x, y) = (a.as_f64().unwrap(), b.as_f64().unwrap());
                if y == 0.0 {
                    Err(err(RuntimeErrorKind::ZeroDivision, "division by zero"))
                } else {
                    Ok(Value::Float(x / y))
                }
            }
            (Add | Sub | Mul | Mod | Pow, a, b) if a.is_numeric() && b.is_numeric() => {
                let (x, y) = (a.as_f64().unwrap(), b.as_f64().unwrap());
                match op {
                    Add => Ok(Value::Float(x + y)),
                    Sub => Ok(Value::Float(x - y)),
                    Mul => Ok(Value::Float(x * y)),
                    Mod => {
                        if y == 0.0 {
                            Err(err(RuntimeErrorKind::ZeroDivision, "modulo by zero"))
                        } else {
                            Ok(Value::Float(x.rem_euclid(y)))
                        }
                    }
                    Pow => Ok(Value::Float(x.powf(y))),
                    _ => unreachable!(),
                }
            }

            _ => Err(err(
                RuntimeErrorKind::TypeError,
                format!(
                    "unsupported operand types for {}: `{}` and `{}`",
                    op.symbol(),
                    lhs.type_name(),
                    rhs.type_name()
                ),
            )),
        }
    }

    fn compare(&self, op: BinaryOp, lhs: &Value, rhs: &Value) -> RResult<Value> {
        let ordering = match (lhs, rhs) {
            (Value::Str(a), Value::Str(b)) => a.cmp(b),
            (a, b) if a.is_numeric() && b.is_numeric() => {
                let (x, y) = (a.as_f64().unwrap(), b.as_f64().unwrap());
                match x.partial_cmp(&y) {
                    Some(o) => o,
                    None => {
                        return Err(err(
                            RuntimeErrorKind::ValueError,
                            "cannot order NaN values",
                        ))
                    }
                }
            }
            _ => {
                return Err(err(
                    RuntimeErrorKind::TypeError,
                    format!(
                        "`{}` not supported between `{}` and `{}`",
                        op.symbol(),
                        lhs.type_name(),
                        rhs.type_name()
                    ),
                ))
            }
        };
        let result = match op {
            BinaryOp::Lt => ordering.is_lt(),
            BinaryOp::Le => ordering.is_le(),
            BinaryOp::Gt => ordering.is_gt(),
            BinaryOp::Ge => ordering.is_ge(),
            _ => unreachable!("compare only handles ordering operators"),
        };
        Ok(Value::Bool(result))
    }

    fn contains(&self, container: &Value, needle: &Value) -> RResult<bool> {
        match container {
            Value::List(l) => Ok(l.borrow().iter().any(|v| value_eq(v, needle))),
            Value::Tuple(t) => Ok(t.iter().any(|v| value_eq(v, needle))),
            Value::Dict(d) => Ok(d.borrow().iter().any(|(k, _)| value_eq(k, needle))),
            Value::Str(s) => match needle {
                Value::Str(sub) => Ok(s.contains(sub.as_str())),
                other => Err(err(
                    RuntimeErrorKind::TypeError,
                    format!("cannot search for `{}` in a string", other.type_name()),
                )),
            },
            Value::Range(start, stop, step) => match needle {
                Value::Int(i) => Ok(range_values(*start, *stop, *step).any(|v| v == *i)),
                _ => Ok(false),
            },
            other => Err(err(
                RuntimeErrorKind::TypeError,
                format!("`{}` is not a container", other.type_name()),
            )),
        }
    }

    // ── Calls ────────────────────────────────────────────────────────────

    fn eval_call(
        &mut self,
        call: &spy_parser::ast::expr::CallExpr,
        frame: &mut Frame,
    ) -> RResult<Value> {
        let callee = call
            .callee()
            .ok_or_else(|| err(RuntimeErrorKind::TypeError, "malformed call"))?;

        let mut args = Vec::new();
        for arg in call.args() {
            args.push(self.eval_expr(&arg, frame)?);
        }

        // `super(...)` and `super.m(...)` dispatch through the owner class.
        match &callee {
            Expr::SuperExpr(_) => return self.super_init(args, frame),
            Expr::Field(fa) => {
                if matches!(fa.receiver(), Some(Expr::SuperExpr(_))) {
                    let name = fa
                        .name()
                        .ok_or_else(|| err(RuntimeErrorKind::TypeError, "malformed attribute"))?;
                    let bound = self.super_method(&name, frame)?;
                    return self.call_value(bound, args);
                }
            }
            _ => {}
        }

        let callee = self.eval_expr(&callee, frame)?;
        self.call_value(callee, args)
    }

    pub(crate) fn call_value(&mut self, callee: Value, args: Vec<Value>) -> RResult<Value> {
        match callee {
            Value::Type(id) => self.instantiate(id, args),
            Value::Function(func) => self.call_function(&func.name, &func.def, args),
            Value::BoundMethod(bound) => self.call_method(&bound, args),
            Value::Builtin(Builtin { name, recv }) => {
                builtins::call(self, name, recv.map(|b| *b), args)
            }
            other => Err(err(
                RuntimeErrorKind::TypeError,
                format!("`{}` is not callable", other.type_name()),
            )),
        }
    }

    fn call_function(&mut self, name: &str, def: &FnDef, args: Vec<Value>) -> RResult<Value> {
        let params: Vec<String> = def
            .param_list()
            .map(|list| list.params().filter_map(|p| p.name_text()).collect())
            .unwrap_or_default();
        if params.len() != args.len() {
            return Err(err(
                RuntimeErrorKind::TypeError,
                format!(
                    "{name}() takes {} argument(s) but {} were given",
                    params.len(),
                    args.len()
                ),
            ));
        }
        let mut frame = Frame::call(None, None);
        for (param, arg) in params.into_iter().zip(args) {
            frame.locals.insert(param, arg);
        }
        let Some(body) = def.body() else {
            return Ok(Value::None);
        };
        match self.exec_block(&body, &mut frame)? {
            Flow::Return(v) => Ok(v),
            Flow::Normal => Ok(Value::None),
        }
    }

    fn call_method(&mut self, bound: &BoundMethod, args: Vec<Value>) -> RResult<Value> {
        let member = self.graph.member(bound.member).clone();
        let Some(method) = &member.method else {
            return Err(err(
                RuntimeErrorKind::TypeError,
                format!("`{}` is not callable", member.name),
            ));
        };

        let receiver = match &bound.recv {
            Value::Type(_) => None, // static call through the class name
            other => Some(other.clone()),
        };

        // Bind parameters, letting an explicit leading `self` soak up the
        // receiver rather than a positional argument.
        let params: Vec<(String, bool)> = method
            .param_list()
            .map(|list| {
                list.params()
                    .map(|p| (p.name_text().unwrap_or_default(), p.is_self()))
                    .collect()
            })
            .unwrap_or_default();
        let positional: Vec<&(String, bool)> = params
            .iter()
            .enumerate()
            .filter(|(i, (_, is_self))| !(*i == 0 && *is_self))
            .map(|(_, p)| p)
            .collect();

        if positional.len() != args.len() {
            return Err(err(
                RuntimeErrorKind::TypeError,
                format!(
                    "{}() takes {} argument(s) but {} were given",
                    member.name,
                    positional.len(),
                    args.len()
                ),
            ));
        }

        let mut frame = Frame::call(receiver, Some(bound.member.owner));
        for ((param, _), arg) in positional.into_iter().zip(args) {
            frame.locals.insert(param.clone(), arg);
        }

        let Some(body) = method.body() else {
            return Err(err(
                RuntimeErrorKind::NotImplementedError,
                format!("`{}` has no body", member.name),
            ));
        };
        match self.exec_block(&body, &mut frame)? {
            Flow::Return(v) => Ok(v),
            Flow::Normal => Ok(Value::None),
        }
    }

    fn instantiate(&mut self, id: TypeId, args: Vec<Value>) -> RResult<Value> {
        let class = match self.graph.get(id) {
            TypeDecl::Class(c) => c,
            TypeDecl::Interface(i) => {
                return Err(err(
                    RuntimeErrorKind::TypeError,
                    format!("cannot instantiate interface `{}`", i.name),
                ))
            }
        };
        if class.is_abstract {
            // The checker rejects this statically; the guard keeps the
            // runtime honest when executing unchecked trees.
            return Err(err(
                RuntimeErrorKind::TypeError,
                format!("cannot instantiate abstract class `{}`", class.name),
            ));
        }
        let class_name = class.name.clone();
        let mro = class.mro.clone();

        let instance = Rc::new(Instance {
            class: id,
            attrs: RefCell::new(FxHashMap::default()),
        });

        // Field defaults, base classes first so derived defaults win.
        for &ancestor in mro.iter().rev() {
            let Some(info) = self.graph.class(ancestor) else {
                continue;
            };
            let inits: Vec<(String, Expr)> = info
                .members
                .iter()
                .filter(|m| m.kind == MemberKind::Field)
                .filter_map(|m| {
                    m.field
                        .as_ref()
                        .and_then(|f| f.initializer())
                        .map(|init| (m.name.clone(), init))
                })
                .collect();
            let mut frame = Frame::global();
            for (name, init) in inits {
                let value = self.eval_expr(&init, &mut frame)?;
                instance.attrs.borrow_mut().insert(name, value);
            }
        }

        let object = Value::Object(instance);
        match self.graph.constructor_of(id) {
            Some(ctor) => {
                self.call_method(
                    &BoundMethod {
                        recv: object.clone(),
                        member: ctor,
                    },
                    args,
                )?;
            }
            None => {
                if !args.is_empty() {
                    return Err(err(
                        RuntimeErrorKind::TypeError,
                        format!("{class_name}() takes 0 arguments but {} were given", args.len()),
                    ));
                }
            }
        }
        Ok(object)
    }

    // ── Super ────────────────────────────────────────────────────────────

    fn super_ancestor(&self, frame: &Frame) -> RResult<TypeId> {
        let owner = frame
            .owner
            .ok_or_else(|| err(RuntimeErrorKind::TypeError, "`super` used outside a method"))?;
        self.graph
            .class(owner)
            .and_then(|c| c.parent)
            .ok_or_else(|| {
                err(
                    RuntimeErrorKind::TypeError,
                    format!("`{}` has no base class", self.graph.name_of(owner)),
                )
            })
    }

    /// `super(args)`: invoke the parent chain's constructor on `self`.
    fn super_init(&mut self, args: Vec<Value>, frame: &mut Frame) -> RResult<Value> {
        let parent = self.super_ancestor(frame)?;
        let receiver = frame
            .receiver
            .clone()
            .ok_or_else(|| err(RuntimeErrorKind::TypeError, "`super` requires a receiver"))?;
        match self.graph.constructor_of(parent) {
            Some(ctor) => self.call_method(
                &BoundMethod {
                    recv: receiver,
                    member: ctor,
                },
                args,
            ),
            None => {
                if args.is_empty() {
                    Ok(Value::None)
                } else {
                    Err(err(
                        RuntimeErrorKind::TypeError,
                        format!(
                            "`{}` has no constructor taking arguments",
                            self.graph.name_of(parent)
                        ),
                    ))
                }
            }
        }
    }

    /// `super.m`: the ancestor implementation of `m`, bound to `self`.
    /// Resolved through the *owner* class's parent, so the target is fixed
    /// at the declaration site, not the instance's dynamic class.
    fn super_method(&mut self, name: &str, frame: &mut Frame) -> RResult<Value> {
        let parent = self.super_ancestor(frame)?;
        let receiver = frame
            .receiver
            .clone()
            .ok_or_else(|| err(RuntimeErrorKind::TypeError, "`super` requires a receiver"))?;
        let member = self.graph.method_on(parent, name).ok_or_else(|| {
            err(
                RuntimeErrorKind::AttributeError,
                format!(
                    "`{}` has no method `{name}`",
                    self.graph.name_of(parent)
                ),
            )
        })?;
        Ok(Value::BoundMethod(Rc::new(BoundMethod {
            recv: receiver,
            member,
        })))
    }

    // ── Attribute Access ─────────────────────────────────────────────────

    pub(crate) fn get_attr(&mut self, receiver: &Value, name: &str) -> RResult<Value> {
        match receiver {
            Value::Object(obj) => {
                if let Some(v) = obj.attrs.borrow().get(name) {
                    return Ok(v.clone());
                }
                if let Some(member) = self.graph.method_on(obj.class, name) {
                    return Ok(Value::BoundMethod(Rc::new(BoundMethod {
                        recv: receiver.clone(),
                        member,
                    })));
                }
                Err(err(
                    RuntimeErrorKind::AttributeError,
                    format!(
                        "`{}` object has no attribute `{name}`",
                        self.graph.name_of(obj.class)
                    ),
                ))
            }
            Value::Type(id) => self.get_static(*id, name),
            Value::Module("time") => match name {
                "time" => Ok(Value::builtin("time.time")),
                other => Err(err(
                    RuntimeErrorKind::AttributeError,
                    format!("module `time` has no attribute `{other}`"),
                )),
            },
            Value::Str(_) => match name {
                "lower" | "upper" | "strip" | "split" => {
                    Ok(Value::bound_builtin(builtins::intern_method(name), receiver.clone()))
                }
                other => Err(err(
                    RuntimeErrorKind::AttributeError,
                    format!("`str` object has no attribute `{other}`"),
                )),
            },
            Value::List(_) => match name {
                "append" | "remove" | "copy" | "pop" => {
                    Ok(Value::bound_builtin(builtins::intern_method(name), receiver.clone()))
                }
                other => Err(err(
                    RuntimeErrorKind::AttributeError,
                    format!("`list` object has no attribute `{other}`"),
                )),
            },
            Value::Dict(_) => match name {
                "keys" | "values" | "items" | "get" => {
                    Ok(Value::bound_builtin(builtins::intern_method(name), receiver.clone()))
                }
                other => Err(err(
                    RuntimeErrorKind::AttributeError,
                    format!("`dict` object has no attribute `{other}`"),
                )),
            },
            other => Err(err(
                RuntimeErrorKind::AttributeError,
                format!("`{}` object has no attribute `{name}`", other.type_name()),
            )),
        }
    }

    /// `ClassName.member`: static fields and static methods, with
    /// subclass-name shadowing along the MRO.
    fn get_static(&self, id: TypeId, name: &str) -> RResult<Value> {
        let mro: Vec<TypeId> = match self.graph.class(id) {
            Some(c) => c.mro.clone(),
            None => {
                return Err(err(
                    RuntimeErrorKind::AttributeError,
                    format!("interface `{}` has no static members", self.graph.name_of(id)),
                ))
            }
        };
        for cid in &mro {
            if let Some(v) = self.statics.get(cid).and_then(|t| t.get(name)) {
                return Ok(v.clone());
            }
            let Some(info) = self.graph.class(*cid) else {
                continue;
            };
            if let Some((index, _)) = info
                .members
                .iter()
                .enumerate()
                .find(|(_, m)| m.name == name && m.kind == MemberKind::StaticMethod)
            {
                return Ok(Value::BoundMethod(Rc::new(BoundMethod {
                    recv: Value::Type(*cid),
                    member: MemberRef { owner: *cid, index },
                })));
            }
        }
        Err(err(
            RuntimeErrorKind::AttributeError,
            format!(
                "class `{}` has no static member `{name}`",
                self.graph.name_of(id)
            ),
        ))
    }

    // ── Indexing and Slicing ─────────────────────────────────────────────

    fn index_value(&self, receiver: &Value, index: &Value) -> RResult<Value> {
        match receiver {
            Value::List(l) => {
                let l = l.borrow();
                let i = normalize_index(index, l.len())?;
                Ok(l[i].clone())
            }
            Value::Tuple(t) => {
                let i = normalize_index(index, t.len())?;
                Ok(t[i].clone())
            }
            Value::Str(s) => {
                let chars: Vec<char> = s.chars().collect();
                let i = normalize_index(index, chars.len())?;
                Ok(Value::str(chars[i].to_string()))
            }
            Value::Dict(d) => {
                let d = d.borrow();
                d.iter()
                    .find(|(k, _)| value_eq(k, index))
                    .map(|(_, v)| v.clone())
                    .ok_or_else(|| {
                        err(
                            RuntimeErrorKind::IndexError,
                            format!("dict key not found: {}", self.repr_form(index)),
                        )
                    })
            }
            other => Err(err(
                RuntimeErrorKind::TypeError,
                format!("`{}` is not subscriptable", other.type_name()),
            )),
        }
    }

    fn slice_value(
        &self,
        receiver: &Value,
        start: Option<i64>,
        end: Option<i64>,
    ) -> RResult<Value> {
        match receiver {
            Value::List(l) => {
                let l = l.borrow();
                let (a, b) = clamp_slice(start, end, l.len());
                Ok(Value::list(l[a..b].to_vec()))
            }
            Value::Tuple(t) => {
                let (a, b) = clamp_slice(start, end, t.len());
                Ok(Value::Tuple(Rc::new(t[a..b].to_vec())))
            }
            Value::Str(s) => {
                let chars: Vec<char> = s.chars().collect();
                let (a, b) = clamp_slice(start, end, chars.len());
                Ok(Value::str(chars[a..b].iter().collect::<String>()))
            }
            other => Err(err(
                RuntimeErrorKind::TypeError,
                format!("`{}` cannot be sliced", other.type_name()),
            )),
        }
    }

    // ── Iteration ────────────────────────────────────────────────────────

    /// Snapshot the items of an iterable. Mutating the source during the
    /// loop does not affect the iteration.
    pub(crate) fn iterate(&self, value: &Value) -> RResult<Vec<Value>> {
        match value {
            Value::List(l) => Ok(l.borrow().clone()),
            Value::Tuple(t) => Ok(t.as_ref().clone()),
            Value::Dict(d) => Ok(d.borrow().iter().map(|(k, _)| k.clone()).collect()),
            Value::Str(s) => Ok(s.chars().map(|c| Value::str(c.to_string())).collect()),
            Value::Range(start, stop, step) => {
                Ok(range_values(*start, *stop, *step).map(Value::Int).collect())
            }
            other => Err(err(
                RuntimeErrorKind::TypeError,
                format!("`{}` is not iterable", other.type_name()),
            )),
        }
    }

    // ── Display ──────────────────────────────────────────────────────────

    /// `str(...)`-form: what `print` writes.
    pub(crate) fn str_form(&self, value: &Value) -> String {
        match value {
            Value::None => "None".to_string(),
            Value::Bool(true) => "True".to_string(),
            Value::Bool(false) => "False".to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => format_float(*f),
            Value::Str(s) => s.as_ref().clone(),
            Value::Exception(e) => e.message.clone(),
            other => self.repr_form(other),
        }
    }

    /// `repr(...)`-form: what containers show for their elements.
    pub(crate) fn repr_form(&self, value: &Value) -> String {
        match value {
            Value::Str(s) => format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'")),
            Value::List(l) => {
                let items: Vec<String> = l.borrow().iter().map(|v| self.repr_form(v)).collect();
                format!("[{}]", items.join(", "))
            }
            Value::Tuple(t) => {
                let items: Vec<String> = t.iter().map(|v| self.repr_form(v)).collect();
                if items.len() == 1 {
                    format!("({},)", items[0])
                } else {
                    format!("({})", items.join(", "))
                }
            }
            Value::Dict(d) => {
                let items: Vec<String> = d
                    .borrow()
                    .iter()
                    .map(|(k, v)| format!("{}: {}", self.repr_form(k), self.repr_form(v)))
                    .collect();
                format!("{{{}}}", items.join(", "))
            }
            Value::Range(start, stop, step) => {
                if *step == 1 {
                    format!("range({start}, {stop})")
                } else {
                    format!("range({start}, {stop}, {step})")
                }
            }
            Value::Type(id) => match self.graph.get(*id) {
                TypeDecl::Class(c) => format!("<class '{}'>", c.name),
                TypeDecl::Interface(i) => format!("<interface '{}'>", i.name),
            },
            Value::Object(obj) => format!("<{} object>", self.graph.name_of(obj.class)),
            Value::Function(f) => format!("<function {}>", f.name),
            Value::BoundMethod(b) => {
                let member = self.graph.member(b.member);
                format!("<bound method {}>", member.name)
            }
            Value::Builtin(b) => format!("<built-in function {}>", b.name),
            Value::Module(m) => format!("<module '{m}'>"),
            Value::Exception(e) => format!("{}('{}')", e.kind.code(), e.message),
            other => self.str_form(other),
        }
    }

    /// Apply an f-string format spec: `.Nf` fixed-point, `.N%` percentage,
    /// or bare.
    pub(crate) fn format_value(&self, value: &Value, spec: Option<String>) -> RResult<String> {
        let Some(spec) = spec.filter(|s| !s.is_empty()) else {
            return Ok(self.str_form(value));
        };
        let parsed = spec
            .strip_prefix('.')
            .and_then(|rest| {
                let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
                let suffix = &rest[digits.len()..];
                digits.parse::<usize>().ok().map(|n| (n, suffix.to_string()))
            });
        let Some((precision, suffix)) = parsed else {
            return Err(err(
                RuntimeErrorKind::ValueError,
                format!("unsupported format spec `{spec}`"),
            ));
        };
        let number = value.as_f64().ok_or_else(|| {
            err(
                RuntimeErrorKind::TypeError,
                format!("cannot format `{}` with `{spec}`", value.type_name()),
            )
        })?;
        match suffix.as_str() {
            "f" => Ok(format!("{number:.precision$}")),
            "%" => Ok(format!("{:.precision$}%", number * 100.0)),
            _ => Err(err(
                RuntimeErrorKind::ValueError,
                format!("unsupported format spec `{spec}`"),
            )),
        }
    }
}

// ── Free Helpers ─────────────────────────────────────────────────────────

pub(crate) fn as_int(value: &Value) -> RResult<i64> {
    match value {
        Value::Int(i) => Ok(*i),
        Value::Bool(b) => Ok(*b as i64),
        other => Err(err(
            RuntimeErrorKind::TypeError,
            format!("expected an integer, got `{}`", other.type_name()),
        )),
    }
}

/// Resolve a (possibly negative) index against `len`, or IndexError.
fn normalize_index(index: &Value, len: usize) -> RResult<usize> {
    let i = as_int(index)?;
    let adjusted = if i < 0 { i + len as i64 } else { i };
    if adjusted < 0 || adjusted as usize >= len {
        return Err(err(RuntimeErrorKind::IndexError, "index out of range"));
    }
    Ok(adjusted as usize)
}

/// Python slice clamping: negative indices count from the end, and the
/// bounds clamp into `[0, len]`.
fn clamp_slice(start: Option<i64>, end: Option<i64>, len: usize) -> (usize, usize) {
    let clamp = |i: i64| -> usize {
        if i < 0 {
            (i + len as i64).max(0) as usize
        } else {
            (i as usize).min(len)
        }
    };
    let a = clamp(start.unwrap_or(0));
    let b = clamp(end.unwrap_or(len as i64));
    (a, b.max(a))
}

pub(crate) fn range_values(start: i64, stop: i64, step: i64) -> impl Iterator<Item = i64> {
    let mut current = start;
    std::iter::from_fn(move || {
        let done = if step > 0 { current >= stop } else { current <= stop };
        if done {
            None
        } else {
            let v = current;
            current += step;
            Some(v)
        }
    })
}

// ── String Unescaping ────────────────────────────────────────────────────

/// Strip quotes and process escapes in an ordinary string literal's text.
pub(crate) fn unescape_string(raw: &str) -> String {
    let inner = raw
        .strip_prefix(['"', '\''])
        .unwrap_or(raw);
    let inner = inner.strip_suffix(['"', '\'']).unwrap_or(inner);
    process_escapes(inner, false)
}

/// Process escapes and doubled braces in f-string text chunks.
pub(crate) fn unescape_fstring_text(raw: &str) -> String {
    process_escapes(raw, true)
}

fn process_escapes(s: &str, braces: bool) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('r') => out.push('\r'),
                Some('\\') => out.push('\\'),
                Some('\'') => out.push('\''),
                Some('"') => out.push('"'),
                Some('0') => out.push('\0'),
                Some(other) => {
                    // Unknown escapes stay as written.
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            },
            '{' if braces && chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if braces && chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            other => out.push(other),
        }
    }
    out
}
