//! Inheritance linker: the second phase.
//!
//! Resolves `extends`/`implements` name references into type-graph edges,
//! rejects cross-species references, detects cycles across the combined
//! relation, and precomputes what dispatch and the modifier checker need:
//! the MRO, the override table, the interface closure, and the
//! still-abstract set of every class. Unresolved bases leave holes that
//! later passes skip.

use std::collections::BTreeMap;

use rustc_hash::{FxHashMap, FxHashSet};

use spy_parser::ast::AstNode;

use crate::error::CheckError;
use crate::graph::{
    topological_sort, MemberRef, StillAbstract, TypeDecl, TypeGraph, TypeId,
};

pub(crate) fn link(graph: &mut TypeGraph, errors: &mut Vec<CheckError>) {
    resolve_bases(graph, errors);
    detect_cycles(graph, errors);
    let ids: Vec<TypeId> = graph.ids().collect();
    for id in ids {
        if graph.class(id).is_some() {
            link_class(graph, id);
        }
    }
}

// ── Base Resolution ──────────────────────────────────────────────────────

fn resolve_bases(graph: &mut TypeGraph, errors: &mut Vec<CheckError>) {
    let ids: Vec<TypeId> = graph.ids().collect();
    for id in ids {
        match graph.get(id) {
            TypeDecl::Class(_) => resolve_class_bases(graph, id, errors),
            TypeDecl::Interface(_) => resolve_interface_bases(graph, id, errors),
        }
    }
}

fn resolve_class_bases(graph: &mut TypeGraph, id: TypeId, errors: &mut Vec<CheckError>) {
    let class = graph.class(id).expect("id is a class");
    let class_name = class.name.clone();
    let ast = class.ast.clone();

    let mut parent = None;
    let mut parent_span = None;
    if let Some(base_ref) = ast.extends_clause().and_then(|c| c.base()) {
        let base_name = base_ref.text();
        let span = base_ref.span();
        parent_span = Some(span);
        match graph.resolve(&base_name) {
            None => errors.push(CheckError::UnresolvedBase {
                name: base_name,
                span,
            }),
            Some(base_id) => match graph.get(base_id) {
                TypeDecl::Interface(_) => errors.push(CheckError::ExtendsNonClass {
                    class: class_name.clone(),
                    base: base_name,
                    span,
                }),
                TypeDecl::Class(base) => {
                    if base.is_final {
                        errors.push(CheckError::ExtendsFinalClass {
                            class: class_name.clone(),
                            base: base_name,
                            span,
                            base_span: base.span,
                        });
                    }
                    // Link even a final base so downstream checks keep going.
                    parent = Some(base_id);
                }
            },
        }
    }

    let mut interfaces = Vec::new();
    if let Some(clause) = ast.implements_clause() {
        for name_ref in clause.names() {
            let base_name = name_ref.text();
            let span = name_ref.span();
            match graph.resolve(&base_name) {
                None => errors.push(CheckError::UnresolvedBase {
                    name: base_name,
                    span,
                }),
                Some(base_id) => match graph.get(base_id) {
                    TypeDecl::Class(_) => errors.push(CheckError::ImplementsNonInterface {
                        class: class_name.clone(),
                        base: base_name,
                        span,
                    }),
                    TypeDecl::Interface(_) => {
                        if !interfaces.contains(&base_id) {
                            interfaces.push(base_id);
                        }
                    }
                },
            }
        }
    }

    let class = graph.class_mut(id).expect("id is a class");
    class.parent = parent;
    class.parent_span = parent_span;
    class.interfaces = interfaces;
}

fn resolve_interface_bases(graph: &mut TypeGraph, id: TypeId, errors: &mut Vec<CheckError>) {
    let iface = graph.interface(id).expect("id is an interface");
    let iface_name = iface.name.clone();
    let ast = iface.ast.clone();

    let mut extends = Vec::new();
    if let Some(clause) = ast.extends_clause() {
        for name_ref in clause.names() {
            let base_name = name_ref.text();
            let span = name_ref.span();
            match graph.resolve(&base_name) {
                None => errors.push(CheckError::UnresolvedBase {
                    name: base_name,
                    span,
                }),
                Some(base_id) => match graph.get(base_id) {
                    TypeDecl::Class(_) => errors.push(CheckError::ExtendsNonInterface {
                        interface: iface_name.clone(),
                        base: base_name,
                        span,
                    }),
                    TypeDecl::Interface(_) => {
                        if !extends.contains(&base_id) && base_id != id {
                            extends.push(base_id);
                        } else if base_id == id {
                            // A self-loop is the smallest inheritance cycle.
                            errors.push(CheckError::InheritanceCycle {
                                path: vec![iface_name.clone(), iface_name.clone()],
                                span,
                            });
                        }
                    }
                },
            }
        }
    }

    graph.interface_mut(id).expect("id is an interface").extends = extends;
}

// ── Cycle Detection ──────────────────────────────────────────────────────

fn detect_cycles(graph: &mut TypeGraph, errors: &mut Vec<CheckError>) {
    if let Err(cycle) = topological_sort(graph) {
        let span = cycle
            .cycle_path
            .first()
            .and_then(|name| graph.resolve(name))
            .map(|id| graph.span_of(id))
            .unwrap_or(spy_common::span::Span::point(0));
        errors.push(CheckError::InheritanceCycle {
            path: cycle.cycle_path,
            span,
        });
    }
}

// ── Per-Class Linking ────────────────────────────────────────────────────

fn link_class(graph: &mut TypeGraph, id: TypeId) {
    let mro = compute_mro(graph, id);
    let override_table = compute_override_table(graph, &mro);
    let iface_closure = compute_iface_closure(graph, &mro);
    let still_abstract = compute_still_abstract(graph, &mro, &override_table, &iface_closure);

    let class = graph.class_mut(id).expect("id is a class");
    class.mro = mro;
    class.override_table = override_table;
    class.iface_closure = iface_closure;
    class.still_abstract = still_abstract;
}

/// Single-parent linearization: the class itself, then its ancestors.
/// A visited set guards against cyclic parent chains, which have already
/// been reported.
fn compute_mro(graph: &TypeGraph, id: TypeId) -> Vec<TypeId> {
    let mut mro = Vec::new();
    let mut seen = FxHashSet::default();
    let mut current = Some(id);
    while let Some(c) = current {
        if !seen.insert(c) {
            break;
        }
        mro.push(c);
        current = graph.class(c).and_then(|info| info.parent);
    }
    mro
}

/// For each method name on the chain, the most-derived concrete declaration.
/// Walks the MRO root-first so derived declarations overwrite base ones.
/// Static members stay out: they do not join dynamic dispatch.
fn compute_override_table(graph: &TypeGraph, mro: &[TypeId]) -> FxHashMap<String, MemberRef> {
    let mut table = FxHashMap::default();
    for &ancestor in mro.iter().rev() {
        let Some(info) = graph.class(ancestor) else {
            continue;
        };
        for (index, member) in info.members.iter().enumerate() {
            if member.kind.is_callable() && !member.is_static && member.has_body {
                table.insert(
                    member.name.clone(),
                    MemberRef {
                        owner: ancestor,
                        index,
                    },
                );
            }
        }
    }
    table
}

/// All interfaces the class must satisfy: the `implements` lists of every
/// class on the MRO, closed over interface `extends`.
fn compute_iface_closure(graph: &TypeGraph, mro: &[TypeId]) -> Vec<TypeId> {
    let mut closure = Vec::new();
    let mut seen = FxHashSet::default();
    let mut queue: Vec<TypeId> = Vec::new();

    for &ancestor in mro {
        if let Some(info) = graph.class(ancestor) {
            queue.extend(info.interfaces.iter().copied());
        }
    }
    while let Some(iface) = queue.pop() {
        if !seen.insert(iface) {
            continue;
        }
        closure.push(iface);
        if let Some(info) = graph.interface(iface) {
            queue.extend(info.extends.iter().copied());
        }
    }
    closure
}

/// Methods the class still lacks a concrete implementation for: `abstract`
/// declarations anywhere on the chain plus interface requirements, minus
/// whatever the override table satisfies. Sorted by name for stable output.
fn compute_still_abstract(
    graph: &TypeGraph,
    mro: &[TypeId],
    override_table: &FxHashMap<String, MemberRef>,
    iface_closure: &[TypeId],
) -> Vec<StillAbstract> {
    let mut pending: BTreeMap<String, StillAbstract> = BTreeMap::new();

    for &ancestor in mro {
        let Some(info) = graph.class(ancestor) else {
            continue;
        };
        for member in &info.members {
            if member.is_abstract && member.kind.is_callable() && !member.is_static {
                pending.entry(member.name.clone()).or_insert(StillAbstract {
                    name: member.name.clone(),
                    signature: member.signature.clone(),
                    origin: format!("declared abstract in `{}`", info.name),
                    origin_span: member.span,
                });
            }
        }
    }

    for &iface in iface_closure {
        let Some(info) = graph.interface(iface) else {
            continue;
        };
        for req in info.requirements() {
            pending.entry(req.name.clone()).or_insert(StillAbstract {
                name: req.name.clone(),
                signature: req.signature.clone(),
                origin: format!("required by interface `{}`", info.name),
                origin_span: req.span,
            });
        }
    }

    pending
        .into_values()
        .filter(|sa| !override_table.contains_key(&sa.name))
        .collect()
}
