//! Declaration collector: the first AST walk.
//!
//! Registers every top-level interface, class, and function into the symbol
//! table and the type graph without resolving anything, so that mutually
//! referring declarations work regardless of source order. Duplicate names
//! are reported here and the first declaration wins.

use rustc_hash::FxHashMap;

use spy_common::span::Span;
use spy_parser::ast::item::{
    ClassDef, ClassMember, FieldDef, FnDef, InterfaceDef, Item, MethodDef, MethodSig, ParamList,
};
use spy_parser::ast::AstNode;
use spy_parser::Parse;

use crate::error::CheckError;
use crate::graph::{ClassInfo, InterfaceInfo, MemberInfo, MemberKind, TypeGraph, TypeId};
use crate::symbols::{Symbol, SymbolKind, SymbolTable};
use crate::ty::{ParamSig, Signature};

/// Output of the collection walk.
pub(crate) struct Collected {
    pub graph: TypeGraph,
    pub symbols: SymbolTable,
    /// Free functions in declaration order.
    pub functions: Vec<(String, FnDef)>,
}

pub(crate) fn collect(parse: &Parse, errors: &mut Vec<CheckError>) -> Collected {
    let mut graph = TypeGraph::new();
    let mut symbols = SymbolTable::new();
    let mut functions: Vec<(String, FnDef)> = Vec::new();

    let file = parse.source_file();
    for item in file.items() {
        match item {
            Item::Interface(iface) => collect_interface(iface, &mut graph, &mut symbols, errors),
            Item::Class(class) => collect_class(class, &mut graph, &mut symbols, errors),
            Item::Fn(func) => collect_fn(func, &mut functions, &mut symbols, errors),
        }
    }

    Collected {
        graph,
        symbols,
        functions,
    }
}

fn declare(
    symbols: &mut SymbolTable,
    name: &str,
    kind: SymbolKind,
    span: Span,
    errors: &mut Vec<CheckError>,
) -> bool {
    if let Some(previous) = symbols.declare(Symbol {
        name: name.to_string(),
        kind,
        span,
    }) {
        errors.push(CheckError::DuplicateDeclaration {
            name: name.to_string(),
            span,
            previous: previous.span,
        });
        return false;
    }
    true
}

// ── Interfaces ───────────────────────────────────────────────────────────

fn collect_interface(
    iface: InterfaceDef,
    graph: &mut TypeGraph,
    symbols: &mut SymbolTable,
    errors: &mut Vec<CheckError>,
) {
    let Some(name_node) = iface.name() else {
        return; // the parser already reported the malformed declaration
    };
    let name = name_node.text();
    let span = name_node.span();
    if !declare(symbols, &name, SymbolKind::Interface, span, errors) {
        return;
    }

    let mut members = Vec::new();
    let mut seen: FxHashMap<String, Span> = FxHashMap::default();

    // Requirements (`def f(...) -> T;`) and any illegal bodied methods or
    // fields the parser kept for us to diagnose later.
    for sig in iface.method_sigs() {
        if let Some(m) = member_from_sig(&sig) {
            push_member(m, &mut members, &mut seen, errors);
        }
    }
    for def in iface.method_defs() {
        if let Some(m) = member_from_method(&def) {
            push_member(m, &mut members, &mut seen, errors);
        }
    }
    for field in iface.field_defs() {
        if let Some(m) = member_from_field(&field) {
            push_member(m, &mut members, &mut seen, errors);
        }
    }

    graph.add_interface(InterfaceInfo {
        id: TypeId(0), // assigned by add_interface
        name,
        span,
        extends: Vec::new(),
        members,
        ast: iface,
    });
}

// ── Classes ──────────────────────────────────────────────────────────────

fn collect_class(
    class: ClassDef,
    graph: &mut TypeGraph,
    symbols: &mut SymbolTable,
    errors: &mut Vec<CheckError>,
) {
    let Some(name_node) = class.name() else {
        return;
    };
    let name = name_node.text();
    let span = name_node.span();
    if !declare(symbols, &name, SymbolKind::Class, span, errors) {
        return;
    }

    let mut members = Vec::new();
    let mut seen: FxHashMap<String, Span> = FxHashMap::default();

    for member in class.members() {
        let info = match member {
            ClassMember::Method(m) => member_from_method(&m),
            ClassMember::Field(fd) => member_from_field(&fd),
        };
        if let Some(m) = info {
            push_member(m, &mut members, &mut seen, errors);
        }
    }

    let is_abstract = class.is_abstract();
    let is_final = class.is_final();
    graph.add_class(ClassInfo {
        id: TypeId(0), // assigned by add_class
        name,
        span,
        is_abstract,
        is_final,
        parent: None,
        parent_span: None,
        interfaces: Vec::new(),
        members,
        mro: Vec::new(),
        override_table: FxHashMap::default(),
        iface_closure: Vec::new(),
        still_abstract: Vec::new(),
        ast: class,
    });
}

fn collect_fn(
    func: FnDef,
    functions: &mut Vec<(String, FnDef)>,
    symbols: &mut SymbolTable,
    errors: &mut Vec<CheckError>,
) {
    let Some(name_node) = func.name() else {
        return;
    };
    let name = name_node.text();
    if !declare(symbols, &name, SymbolKind::Function, name_node.span(), errors) {
        return;
    }
    functions.push((name, func));
}

// ── Member construction ──────────────────────────────────────────────────

fn push_member(
    member: MemberInfo,
    members: &mut Vec<MemberInfo>,
    seen: &mut FxHashMap<String, Span>,
    errors: &mut Vec<CheckError>,
) {
    if let Some(previous) = seen.get(&member.name) {
        errors.push(CheckError::DuplicateDeclaration {
            name: member.name.clone(),
            span: member.span,
            previous: *previous,
        });
        return;
    }
    seen.insert(member.name.clone(), member.span);
    members.push(member);
}

fn member_from_sig(sig: &MethodSig) -> Option<MemberInfo> {
    let name_node = sig.name()?;
    Some(MemberInfo {
        name: name_node.text(),
        kind: MemberKind::Method,
        is_abstract: true, // interface requirements are implicitly abstract
        is_final: false,
        is_static: sig.is_static(),
        has_body: false,
        signature: signature_of(sig.param_list(), sig.return_type().and_then(|t| t.type_name())),
        span: name_node.span(),
        method: None,
        field: None,
    })
}

fn member_from_method(def: &MethodDef) -> Option<MemberInfo> {
    let name_node = def.name()?;
    let name = name_node.text();
    let is_static = def.is_static();
    let kind = if name == "__init__" {
        MemberKind::Constructor
    } else if is_static {
        MemberKind::StaticMethod
    } else {
        MemberKind::Method
    };
    Some(MemberInfo {
        name,
        kind,
        is_abstract: def.is_abstract(),
        is_final: def.is_final(),
        is_static,
        has_body: def.body().is_some(),
        signature: signature_of(def.param_list(), def.return_type().and_then(|t| t.type_name())),
        span: name_node.span(),
        method: Some(def.clone()),
        field: None,
    })
}

fn member_from_field(field: &FieldDef) -> Option<MemberInfo> {
    let name_node = field.name()?;
    let is_static = field.is_static();
    Some(MemberInfo {
        name: name_node.text(),
        kind: if is_static {
            MemberKind::StaticField
        } else {
            MemberKind::Field
        },
        is_abstract: false,
        is_final: false,
        is_static,
        has_body: false,
        signature: Signature::default(),
        span: name_node.span(),
        method: None,
        field: Some(field.clone()),
    })
}

/// Build a signature from a parameter list, stripping a leading explicit
/// `self` (the receiver is implicit in Spy signatures).
fn signature_of(params: Option<ParamList>, return_ty: Option<String>) -> Signature {
    let mut out = Vec::new();
    if let Some(list) = params {
        for (i, p) in list.params().enumerate() {
            if i == 0 && p.is_self() {
                continue;
            }
            out.push(ParamSig {
                name: p.name_text().unwrap_or_default(),
                ty: p.type_annotation().and_then(|t| t.type_name()),
            });
        }
    }
    Signature {
        params: out,
        return_ty,
    }
}
