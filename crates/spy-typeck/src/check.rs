//! The modifier checker.
//!
//! Runs after the linker, consumes the type graph read-only, and emits
//! diagnostics only; the AST is never mutated. Rules on independent classes
//! never block each other, and holes left by unresolved bases are skipped.

use rustc_hash::FxHashSet;

use spy_common::span::Span;
use spy_parser::ast::expr::Expr;
use spy_parser::ast::item::FnDef;
use spy_parser::ast::stmt::Stmt;
use spy_parser::ast::AstNode;
use spy_parser::cst::SyntaxNode;
use spy_parser::syntax_kind::SyntaxKind;
use spy_parser::Parse;

use crate::error::CheckError;
use crate::graph::{ClassInfo, MemberInfo, MemberKind, TypeGraph};
use crate::symbols::SymbolTable;

/// Names that resolve without declaration.
pub(crate) const BUILTINS: &[&str] = &[
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

pub(crate) fn run(
    parse: &Parse,
    graph: &TypeGraph,
    _symbols: &SymbolTable,
    functions: &[(String, FnDef)],
    errors: &mut Vec<CheckError>,
    internals: &mut Vec<(String, Span)>,
) {
    check_interfaces(graph, errors, internals);
    for class in graph.classes() {
        check_class(graph, class, errors, internals);
    }
    check_instantiations(parse, graph, errors);
    check_names(parse, graph, functions, errors);
    for (name, func) in functions {
        if let Some(n) = func.name() {
            record_internal(name, n.span(), internals);
        }
    }
}

fn span_of_node(node: &SyntaxNode) -> Span {
    let range = node.text_range();
    Span::new(range.start().into(), range.end().into())
}

fn record_internal(name: &str, span: Span, internals: &mut Vec<(String, Span)>) {
    if name.starts_with('_') && name != "__init__" {
        internals.push((name.to_string(), span));
    }
}

// ── Interface Discipline ─────────────────────────────────────────────────

fn check_interfaces(
    graph: &TypeGraph,
    errors: &mut Vec<CheckError>,
    internals: &mut Vec<(String, Span)>,
) {
    for iface in graph.interfaces() {
        record_internal(&iface.name, iface.span, internals);
        for member in &iface.members {
            record_internal(&member.name, member.span, internals);
            match member.kind {
                MemberKind::Field | MemberKind::StaticField => {
                    errors.push(CheckError::InterfaceHasField {
                        interface: iface.name.clone(),
                        field: member.name.clone(),
                        span: member.span,
                    });
                }
                _ => {
                    if member.has_body {
                        errors.push(CheckError::InterfaceHasBody {
                            interface: iface.name.clone(),
                            method: member.name.clone(),
                            span: member.span,
                        });
                    }
                    if member.is_static {
                        // Interface methods are implicitly abstract; no
                        // interface can require a static member.
                        errors.push(CheckError::StaticCannotBeAbstract {
                            name: member.name.clone(),
                            span: member.span,
                        });
                    }
                }
            }
        }
    }
}

// ── Per-Class Rules ──────────────────────────────────────────────────────

fn check_class(
    graph: &TypeGraph,
    class: &ClassInfo,
    errors: &mut Vec<CheckError>,
    internals: &mut Vec<(String, Span)>,
) {
    record_internal(&class.name, class.span, internals);

    if class.is_abstract && class.is_final {
        errors.push(CheckError::AbstractAndFinal {
            name: class.name.clone(),
            span: class.span,
        });
    }

    for member in &class.members {
        record_internal(&member.name, member.span, internals);
        check_member_modifiers(class, member, errors);
        check_override(graph, class, member, errors);
    }

    check_interface_conformance(graph, class, errors);

    // Rule 1b: a concrete class must have an empty still-abstract set.
    if !class.is_abstract && !class.still_abstract.is_empty() {
        let missing: Vec<String> = class.still_abstract.iter().map(|sa| sa.name.clone()).collect();
        let origins: Vec<(String, Span)> = class
            .still_abstract
            .iter()
            .map(|sa| (sa.origin.clone(), sa.origin_span))
            .collect();
        errors.push(CheckError::ConcreteClassHasAbstractMembers {
            class: class.name.clone(),
            missing,
            span: class.span,
            origins,
        });
    }

    check_super_init(graph, class, errors);
}

fn check_member_modifiers(class: &ClassInfo, member: &MemberInfo, errors: &mut Vec<CheckError>) {
    if member.kind == MemberKind::Constructor {
        for (flag, modifier) in [
            (member.is_static, "static"),
            (member.is_abstract, "abstract"),
            (member.is_final, "final"),
        ] {
            if flag {
                errors.push(CheckError::ConstructorHasModifier {
                    class: class.name.clone(),
                    modifier,
                    span: member.span,
                });
            }
        }
        return;
    }

    if member.is_abstract && member.is_final {
        errors.push(CheckError::AbstractAndFinal {
            name: member.name.clone(),
            span: member.span,
        });
    }
    if member.is_static && member.is_abstract {
        errors.push(CheckError::StaticCannotBeAbstract {
            name: member.name.clone(),
            span: member.span,
        });
    }
    if member.is_abstract && member.has_body {
        errors.push(CheckError::AbstractMethodHasBody {
            method: member.name.clone(),
            span: member.span,
        });
    }
    if member.is_abstract && !member.is_static && !class.is_abstract {
        errors.push(CheckError::AbstractMethodOutsideAbstractClass {
            method: member.name.clone(),
            class: class.name.clone(),
            span: member.span,
        });
    }

    if member.is_static {
        check_static_receiver_use(member, errors);
    }
}

/// Rule 3a: a static member has no implicit receiver.
fn check_static_receiver_use(member: &MemberInfo, errors: &mut Vec<CheckError>) {
    let Some(method) = &member.method else {
        return;
    };
    if let Some(params) = method.param_list() {
        if params.params().next().is_some_and(|p| p.is_self()) {
            errors.push(CheckError::StaticUsesSelf {
                method: member.name.clone(),
                keyword: "self",
                span: member.span,
            });
        }
    }
    let Some(body) = method.body() else {
        return;
    };
    for node in body.syntax().descendants() {
        let keyword = match node.kind() {
            SyntaxKind::SELF_EXPR => "self",
            SyntaxKind::SUPER_EXPR => "super",
            _ => continue,
        };
        errors.push(CheckError::StaticUsesSelf {
            method: member.name.clone(),
            keyword,
            span: span_of_node(&node),
        });
    }
}

/// Rules 2b and the ancestor half of override-signature preservation.
/// Constructors and statics are exempt: constructors routinely change
/// arity, statics only shadow by name.
fn check_override(
    graph: &TypeGraph,
    class: &ClassInfo,
    member: &MemberInfo,
    errors: &mut Vec<CheckError>,
) {
    if member.kind != MemberKind::Method {
        return;
    }
    for &ancestor in class.mro.iter().skip(1) {
        let Some(info) = graph.class(ancestor) else {
            continue;
        };
        let Some(overridden) = info
            .members
            .iter()
            .find(|m| m.name == member.name && m.kind == MemberKind::Method)
        else {
            continue;
        };
        if overridden.is_final {
            errors.push(CheckError::OverrideOfFinalMethod {
                method: member.name.clone(),
                class: class.name.clone(),
                base: info.name.clone(),
                span: member.span,
                base_span: overridden.span,
            });
        } else if !member.signature.compatible_with(&overridden.signature) {
            errors.push(CheckError::OverrideSignatureMismatch {
                method: member.name.clone(),
                expected: overridden.signature.clone(),
                found: member.signature.clone(),
                origin: format!("class `{}`", info.name),
                span: member.span,
                required_span: overridden.span,
            });
        }
        // Only the nearest declaring ancestor matters; a final method
        // further up is reported on the class that first redefined it.
        break;
    }
}

/// Rule 4b: implemented methods must match the interface signatures.
/// Reported on the class that owns the implementation.
fn check_interface_conformance(graph: &TypeGraph, class: &ClassInfo, errors: &mut Vec<CheckError>) {
    for &iface_id in &class.iface_closure {
        let Some(iface) = graph.interface(iface_id) else {
            continue;
        };
        for req in iface.requirements() {
            let Some(mref) = class.override_table.get(&req.name) else {
                continue; // missing: already in the still-abstract set
            };
            if mref.owner != class.id {
                continue; // reported on the owning class
            }
            let implementation = graph.member(*mref);
            if !implementation.signature.compatible_with(&req.signature) {
                errors.push(CheckError::OverrideSignatureMismatch {
                    method: req.name.clone(),
                    expected: req.signature.clone(),
                    found: implementation.signature.clone(),
                    origin: format!("interface `{}`", iface.name),
                    span: implementation.span,
                    required_span: req.span,
                });
            }
        }
    }
}

/// Rule 5a: a constructor under a constructor-bearing parent must call
/// `super(...)` as its first executable statement.
fn check_super_init(graph: &TypeGraph, class: &ClassInfo, errors: &mut Vec<CheckError>) {
    let Some(ctor) = class
        .members
        .iter()
        .find(|m| m.kind == MemberKind::Constructor && m.has_body)
    else {
        return;
    };
    let Some(parent) = class.parent else {
        return;
    };
    let Some(parent_ctor_ref) = graph.constructor_of(parent) else {
        return; // trivial parent: no constructor anywhere on its chain
    };
    if first_stmt_is_super_call(ctor) {
        return;
    }
    let parent_ctor = graph.member(parent_ctor_ref);
    errors.push(CheckError::MissingSuperInit {
        class: class.name.clone(),
        parent: graph.name_of(parent).to_string(),
        span: ctor.span,
        parent_takes_args: parent_ctor.signature.arity() > 0,
    });
}

fn first_stmt_is_super_call(ctor: &MemberInfo) -> bool {
    let Some(method) = &ctor.method else {
        return false;
    };
    let Some(body) = method.body() else {
        return false;
    };
    let Some(first) = body.stmts().next() else {
        return false;
    };
    let Stmt::Expr(expr_stmt) = first else {
        return false;
    };
    let Some(Expr::Call(call)) = expr_stmt.expr() else {
        return false;
    };
    matches!(call.callee(), Some(Expr::SuperExpr(_)))
}

// ── Abstract Instantiation ───────────────────────────────────────────────

/// Rule 1c: `C(...)` where `C` names an abstract class.
fn check_instantiations(parse: &Parse, graph: &TypeGraph, errors: &mut Vec<CheckError>) {
    for node in parse.syntax().descendants() {
        if node.kind() != SyntaxKind::CALL_EXPR {
            continue;
        }
        let Some(Expr::Call(call)) = Expr::cast(node.clone()) else {
            continue;
        };
        let Some(Expr::NameRef(name_ref)) = call.callee() else {
            continue;
        };
        let Some(id) = graph.resolve(&name_ref.text()) else {
            continue;
        };
        let Some(class) = graph.class(id) else {
            continue;
        };
        if class.is_abstract {
            errors.push(CheckError::AbstractInstantiation {
                class: class.name.clone(),
                span: span_of_node(&node),
            });
        }
    }
}

// ── Name Resolution ──────────────────────────────────────────────────────

/// Flow-insensitive undefined-name detection over every body in the file.
fn check_names(
    parse: &Parse,
    graph: &TypeGraph,
    functions: &[(String, FnDef)],
    errors: &mut Vec<CheckError>,
) {
    let mut globals: FxHashSet<String> = BUILTINS.iter().map(|s| s.to_string()).collect();
    for id in graph.ids() {
        globals.insert(graph.name_of(id).to_string());
    }
    for (name, _) in functions {
        globals.insert(name.clone());
    }

    let file = parse.source_file();
    for stmt in file.stmts() {
        collect_bindings(stmt.syntax(), &mut globals);
    }

    // Top-level statements see only globals.
    let empty = FxHashSet::default();
    for stmt in file.stmts() {
        resolve_names_in(stmt.syntax(), &empty, &globals, errors);
    }

    // Free functions: parameters plus anything assigned in the body.
    for (_, func) in functions {
        let mut locals = FxHashSet::default();
        if let Some(params) = func.param_list() {
            for p in params.params() {
                if let Some(name) = p.name_text() {
                    locals.insert(name);
                }
            }
        }
        if let Some(body) = func.body() {
            collect_bindings(body.syntax(), &mut locals);
            resolve_names_in(body.syntax(), &locals, &globals, errors);
        }
    }

    // Methods and field initializers.
    for class in graph.classes() {
        for member in &class.members {
            if let Some(method) = &member.method {
                let mut locals = FxHashSet::default();
                if let Some(params) = method.param_list() {
                    for p in params.params() {
                        if let Some(name) = p.name_text() {
                            locals.insert(name);
                        }
                    }
                }
                if let Some(body) = method.body() {
                    collect_bindings(body.syntax(), &mut locals);
                    resolve_names_in(body.syntax(), &locals, &globals, errors);
                }
            }
            if let Some(field) = &member.field {
                if let Some(init) = field.initializer() {
                    resolve_names_in(init.syntax(), &empty, &globals, errors);
                }
            }
        }
    }
}

/// Record every name a subtree assigns: plain assignment targets, loop
/// variables, and imported names.
fn collect_bindings(root: &SyntaxNode, names: &mut FxHashSet<String>) {
    for node in root.descendants() {
        match node.kind() {
            SyntaxKind::ASSIGN_STMT => {
                if let Some(Stmt::Assign(assign)) = Stmt::cast(node.clone()) {
                    if let Some(Expr::NameRef(target)) = assign.target() {
                        names.insert(target.text());
                    }
                }
            }
            SyntaxKind::FOR_STMT => {
                if let Some(Stmt::For(for_stmt)) = Stmt::cast(node.clone()) {
                    if let Some(binding) = for_stmt.binding() {
                        names.insert(binding.text());
                    }
                }
            }
            SyntaxKind::IMPORT_STMT => {
                if let Some(Stmt::Import(import)) = Stmt::cast(node.clone()) {
                    if let Some(module) = import.module() {
                        names.insert(module.text());
                    }
                    for imported in import.imported() {
                        names.insert(imported.text());
                    }
                }
            }
            _ => {}
        }
    }
}

fn resolve_names_in(
    root: &SyntaxNode,
    locals: &FxHashSet<String>,
    globals: &FxHashSet<String>,
    errors: &mut Vec<CheckError>,
) {
    for node in root.descendants() {
        if node.kind() != SyntaxKind::NAME_REF {
            continue;
        }
        // Import statements mention module names, not value names.
        if node
            .parent()
            .is_some_and(|p| p.kind() == SyntaxKind::IMPORT_STMT)
        {
            continue;
        }
        let Some(name_ref) = spy_parser::ast::item::NameRef::cast(node.clone()) else {
            continue;
        };
        let text = name_ref.text();
        if locals.contains(&text) || globals.contains(&text) {
            continue;
        }
        errors.push(CheckError::UndefinedName {
            name: text,
            span: span_of_node(&node),
        });
    }
}
