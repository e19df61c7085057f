//! The type graph: classes, interfaces, and their inheritance relations.
//!
//! Declarations are stored in an arena addressed by [`TypeId`], in source
//! order. The linker fills in resolved `extends`/`implements` edges, the
//! per-class MRO, override tables, the interface closure, and the
//! still-abstract set; after linking the graph is immutable.

use std::collections::VecDeque;
use std::fmt;

use rustc_hash::FxHashMap;

use spy_common::span::Span;
use spy_parser::ast::item::{ClassDef, FieldDef, InterfaceDef, MethodDef};

use crate::ty::Signature;

/// A unique identifier for a class or interface within one compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeId(pub u32);

/// A named type declaration.
#[derive(Debug)]
pub enum TypeDecl {
    Class(ClassInfo),
    Interface(InterfaceInfo),
}

/// What a class member is, after modifier analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Method,
    StaticMethod,
    Constructor,
    Field,
    StaticField,
}

impl MemberKind {
    pub fn is_callable(self) -> bool {
        matches!(
            self,
            MemberKind::Method | MemberKind::StaticMethod | MemberKind::Constructor
        )
    }

    pub fn is_static(self) -> bool {
        matches!(self, MemberKind::StaticMethod | MemberKind::StaticField)
    }
}

/// One member of a class or interface body.
#[derive(Debug, Clone)]
pub struct MemberInfo {
    pub name: String,
    pub kind: MemberKind,
    /// Declared modifier flags, straight from the source.
    pub is_abstract: bool,
    pub is_final: bool,
    pub is_static: bool,
    pub has_body: bool,
    pub signature: Signature,
    /// Span of the member name (falls back to the whole declaration).
    pub span: Span,
    /// The method AST, when this member is a `def`.
    pub method: Option<MethodDef>,
    /// The field AST, when this member is a field declaration.
    pub field: Option<FieldDef>,
}

/// A member addressed by its owning type and index into its member list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberRef {
    pub owner: TypeId,
    pub index: usize,
}

/// A method a class still lacks a concrete implementation for.
#[derive(Debug, Clone)]
pub struct StillAbstract {
    pub name: String,
    pub signature: Signature,
    /// Where the requirement came from, e.g. "declared abstract in `A`".
    pub origin: String,
    pub origin_span: Span,
}

#[derive(Debug)]
pub struct ClassInfo {
    pub id: TypeId,
    pub name: String,
    /// Span of the class name, the anchor for class-level diagnostics.
    pub span: Span,
    pub is_abstract: bool,
    pub is_final: bool,
    /// Resolved single parent; `None` for root classes and unresolved bases.
    pub parent: Option<TypeId>,
    /// Span of the `extends` target name, when present in source.
    pub parent_span: Option<Span>,
    /// Directly implemented interfaces, resolved.
    pub interfaces: Vec<TypeId>,
    pub members: Vec<MemberInfo>,
    /// Linearized ancestors, this class first. Filled by the linker.
    pub mro: Vec<TypeId>,
    /// Most-derived concrete declaration per method name. Filled by the linker.
    pub override_table: FxHashMap<String, MemberRef>,
    /// All interfaces this class must satisfy: direct, inherited, and via
    /// interface `extends`, deduplicated in discovery order.
    pub iface_closure: Vec<TypeId>,
    /// Sorted by method name. Filled by the linker.
    pub still_abstract: Vec<StillAbstract>,
    pub ast: ClassDef,
}

#[derive(Debug)]
pub struct InterfaceInfo {
    pub id: TypeId,
    pub name: String,
    pub span: Span,
    /// Resolved base interfaces.
    pub extends: Vec<TypeId>,
    /// Declared members: requirements, plus any illegal bodies/fields the
    /// parser accepted for the checker to report.
    pub members: Vec<MemberInfo>,
    pub ast: InterfaceDef,
}

impl InterfaceInfo {
    /// The instance-method requirements this interface itself declares.
    pub fn requirements(&self) -> impl Iterator<Item = &MemberInfo> {
        self.members
            .iter()
            .filter(|m| m.kind.is_callable() && !m.is_static)
    }
}

/// Error returned when the combined inheritance relation has a cycle.
#[derive(Debug, Clone)]
pub struct CycleError {
    /// The type names forming the cycle, e.g. `["A", "B", "A"]`.
    pub cycle_path: Vec<String>,
}

impl fmt::Display for CycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.cycle_path.join(" -> "))
    }
}

/// The directed graph of classes, interfaces, and inheritance edges.
#[derive(Debug, Default)]
pub struct TypeGraph {
    decls: Vec<TypeDecl>,
    name_to_id: FxHashMap<String, TypeId>,
}

impl TypeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_class(&mut self, mut info: ClassInfo) -> TypeId {
        let id = TypeId(self.decls.len() as u32);
        info.id = id;
        self.name_to_id.insert(info.name.clone(), id);
        self.decls.push(TypeDecl::Class(info));
        id
    }

    pub fn add_interface(&mut self, mut info: InterfaceInfo) -> TypeId {
        let id = TypeId(self.decls.len() as u32);
        info.id = id;
        self.name_to_id.insert(info.name.clone(), id);
        self.decls.push(TypeDecl::Interface(info));
        id
    }

    /// Look up a declared type by name.
    pub fn resolve(&self, name: &str) -> Option<TypeId> {
        self.name_to_id.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    pub fn get(&self, id: TypeId) -> &TypeDecl {
        &self.decls[id.0 as usize]
    }

    pub fn ids(&self) -> impl Iterator<Item = TypeId> {
        (0..self.decls.len()).map(|i| TypeId(i as u32))
    }

    pub fn class(&self, id: TypeId) -> Option<&ClassInfo> {
        match self.get(id) {
            TypeDecl::Class(c) => Some(c),
            TypeDecl::Interface(_) => None,
        }
    }

    pub(crate) fn class_mut(&mut self, id: TypeId) -> Option<&mut ClassInfo> {
        match &mut self.decls[id.0 as usize] {
            TypeDecl::Class(c) => Some(c),
            TypeDecl::Interface(_) => None,
        }
    }

    pub fn interface(&self, id: TypeId) -> Option<&InterfaceInfo> {
        match self.get(id) {
            TypeDecl::Class(_) => None,
            TypeDecl::Interface(i) => Some(i),
        }
    }

    pub(crate) fn interface_mut(&mut self, id: TypeId) -> Option<&mut InterfaceInfo> {
        match &mut self.decls[id.0 as usize] {
            TypeDecl::Class(_) => None,
            TypeDecl::Interface(i) => Some(i),
        }
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassInfo> {
        self.decls.iter().filter_map(|d| match d {
            TypeDecl::Class(c) => Some(c),
            TypeDecl::Interface(_) => None,
        })
    }

    pub fn interfaces(&self) -> impl Iterator<Item = &InterfaceInfo> {
        self.decls.iter().filter_map(|d| match d {
            TypeDecl::Class(_) => None,
            TypeDecl::Interface(i) => Some(i),
        })
    }

    pub fn name_of(&self, id: TypeId) -> &str {
        match self.get(id) {
            TypeDecl::Class(c) => &c.name,
            TypeDecl::Interface(i) => &i.name,
        }
    }

    pub fn span_of(&self, id: TypeId) -> Span {
        match self.get(id) {
            TypeDecl::Class(c) => c.span,
            TypeDecl::Interface(i) => i.span,
        }
    }

    /// The base edges of `id`: parent + implemented interfaces for a class,
    /// extended interfaces for an interface.
    pub fn bases(&self, id: TypeId) -> Vec<TypeId> {
        match self.get(id) {
            TypeDecl::Class(c) => c
                .parent
                .into_iter()
                .chain(c.interfaces.iter().copied())
                .collect(),
            TypeDecl::Interface(i) => i.extends.clone(),
        }
    }

    pub fn member(&self, mref: MemberRef) -> &MemberInfo {
        match self.get(mref.owner) {
            TypeDecl::Class(c) => &c.members[mref.index],
            TypeDecl::Interface(i) => &i.members[mref.index],
        }
    }

    /// Resolve a method through `class`'s override table.
    pub fn method_on(&self, class: TypeId, name: &str) -> Option<MemberRef> {
        self.class(class)?.override_table.get(name).copied()
    }

    /// The effective constructor for instances of `class`, if any ancestor
    /// declares one.
    pub fn constructor_of(&self, class: TypeId) -> Option<MemberRef> {
        self.method_on(class, "__init__")
    }

    /// Whether `sub` is `ancestor` or a descendant of it.
    pub fn is_subclass(&self, sub: TypeId, ancestor: TypeId) -> bool {
        self.class(sub)
            .map(|c| c.mro.contains(&ancestor))
            .unwrap_or(false)
    }

    /// Whether instances of `class` satisfy `iface`. O(closure) set probe
    /// against the precomputed interface closure.
    pub fn implements(&self, class: TypeId, iface: TypeId) -> bool {
        self.class(class)
            .map(|c| c.iface_closure.contains(&iface))
            .unwrap_or(false)
    }
}

/// Topological sort of the combined inheritance relation (class `extends`,
/// interface `extends`, and `implements`) using Kahn's algorithm.
///
/// Returns declarations in dependency order, roots first, with alphabetical
/// tie-breaking for determinism. Returns `Err(CycleError)` carrying a
/// concrete cycle path if the relation is cyclic.
pub fn topological_sort(graph: &TypeGraph) -> Result<Vec<TypeId>, CycleError> {
    let n = graph.len();
    // in_degree[i] = number of unprocessed bases of declaration i.
    let mut in_degree: Vec<u32> = graph
        .ids()
        .map(|id| graph.bases(id).len() as u32)
        .collect();

    let mut ready: Vec<TypeId> = graph.ids().filter(|id| in_degree[id.0 as usize] == 0).collect();
    ready.sort_by(|a, b| graph.name_of(*a).cmp(graph.name_of(*b)));

    let mut queue = VecDeque::from(ready);
    let mut order = Vec::with_capacity(n);

    while let Some(id) = queue.pop_front() {
        order.push(id);
        let mut newly_ready = Vec::new();
        for other in graph.ids() {
            let i = other.0 as usize;
            if in_degree[i] > 0 && graph.bases(other).contains(&id) {
                in_degree[i] -= 1;
                if in_degree[i] == 0 {
                    newly_ready.push(other);
                }
            }
        }
        newly_ready.sort_by(|a, b| graph.name_of(*a).cmp(graph.name_of(*b)));
        queue.extend(newly_ready);
    }

    if order.len() == n {
        Ok(order)
    } else {
        Err(CycleError {
            cycle_path: extract_cycle_path(graph, &in_degree),
        })
    }
}

/// Extract a cycle path from declarations that remain unprocessed
/// (in_degree > 0), following base edges until a name repeats.
fn extract_cycle_path(graph: &TypeGraph, in_degree: &[u32]) -> Vec<String> {
    let start = match graph.ids().find(|id| in_degree[id.0 as usize] > 0) {
        Some(id) => id,
        None => return Vec::new(),
    };

    let mut path: Vec<String> = Vec::new();
    let mut visited = vec![false; graph.len()];
    let mut current = start;

    loop {
        if visited[current.0 as usize] {
            // Found the cycle start; trim the path to the cycle portion.
            let cycle_start_name = graph.name_of(current);
            let cycle_begin = path
                .iter()
                .position(|name| name == cycle_start_name)
                .unwrap_or(0);
            let mut cycle: Vec<String> = path[cycle_begin..].to_vec();
            cycle.push(cycle_start_name.to_string());
            return cycle;
        }

        visited[current.0 as usize] = true;
        path.push(graph.name_of(current).to_string());

        let next = graph
            .bases(current)
            .into_iter()
            .find(|dep| in_degree[dep.0 as usize] > 0);

        match next {
            Some(dep) => current = dep,
            None => {
                // Should not happen while in_degree > 0, but stay safe.
                return path;
            }
        }
    }
}
