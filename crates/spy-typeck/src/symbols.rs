//! The top-level symbol table.
//!
//! Maps names to symbols for the file scope: type declarations, free
//! functions, and top-level bindings. Narrower scopes (class members,
//! parameters, locals) are handled where they are checked; only the file
//! scope outlives a single pass.

use rustc_hash::FxHashMap;

use spy_common::span::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Interface,
    Class,
    Function,
}

#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub span: Span,
}

#[derive(Debug, Default)]
pub struct SymbolTable {
    by_name: FxHashMap<String, Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a symbol. Returns the previously declared symbol if the name
    /// is already taken in this scope (the caller reports the duplicate and
    /// keeps the first declaration).
    pub fn declare(&mut self, sym: Symbol) -> Option<Symbol> {
        if let Some(existing) = self.by_name.get(&sym.name) {
            return Some(existing.clone());
        }
        self.by_name.insert(sym.name.clone(), sym);
        None
    }

    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.by_name.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declare_and_lookup() {
        let mut table = SymbolTable::new();
        assert!(table
            .declare(Symbol {
                name: "Shape".into(),
                kind: SymbolKind::Class,
                span: Span::new(6, 11),
            })
            .is_none());
        assert_eq!(table.lookup("Shape").unwrap().kind, SymbolKind::Class);
        assert!(table.lookup("Circle").is_none());
    }

    #[test]
    fn duplicate_returns_first_declaration() {
        let mut table = SymbolTable::new();
        table.declare(Symbol {
            name: "f".into(),
            kind: SymbolKind::Function,
            span: Span::new(4, 5),
        });
        let previous = table
            .declare(Symbol {
                name: "f".into(),
                kind: SymbolKind::Class,
                span: Span::new(20, 21),
            })
            .expect("duplicate detected");
        assert_eq!(previous.span, Span::new(4, 5));
        // The first declaration wins.
        assert_eq!(table.lookup("f").unwrap().kind, SymbolKind::Function);
    }
}
