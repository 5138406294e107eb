//! Scope tables
//!
//! A scope maps identifier names to declaration nodes and points at its
//! enclosing scope. Lookup walks outward; the distinguished global scope
//! terminates the chain. Names bound at the global scope have no single
//! declaration node — scripts share one global namespace, so globals are
//! identified by name alone.

use rustc_hash::FxHashMap;

use crate::features::parsing::ast::NodeId;

/// Scope discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// the single scope terminating every lookup chain
    Global,
    /// captures `this`, `arguments`, parameters, `var` and hoisted
    /// function declarations
    Function,
    /// captures `let`/`const` bindings and class declarations
    Block,
    /// captures the exception binding
    Catch,
}

/// Index of a scope in the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(pub u32);

/// What a name is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingTarget {
    /// local binding with a declaration node
    Decl(NodeId),
    /// name living in the global namespace
    Global,
}

#[derive(Debug)]
struct Scope {
    kind: ScopeKind,
    parent: Option<ScopeId>,
    bindings: FxHashMap<String, BindingTarget>,
}

/// All scopes of the program, rooted at one global scope
#[derive(Debug)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeTree {
    /// Create a tree containing only the global scope
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope {
                kind: ScopeKind::Global,
                parent: None,
                bindings: FxHashMap::default(),
            }],
        }
    }

    pub const GLOBAL: ScopeId = ScopeId(0);

    /// Open a child scope
    pub fn push(&mut self, kind: ScopeKind, parent: ScopeId) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope {
            kind,
            parent: Some(parent),
            bindings: FxHashMap::default(),
        });
        id
    }

    pub fn kind(&self, id: ScopeId) -> ScopeKind {
        self.scopes[id.0 as usize].kind
    }

    /// Bind `name` in `scope`; the first binding wins
    ///
    /// Returns false when the name was already bound there.
    pub fn declare(&mut self, scope: ScopeId, name: &str, target: BindingTarget) -> bool {
        let bindings = &mut self.scopes[scope.0 as usize].bindings;
        if bindings.contains_key(name) {
            return false;
        }
        bindings.insert(name.to_string(), target);
        true
    }

    /// Declare a name in the global namespace
    pub fn declare_global(&mut self, name: &str) {
        self.scopes[0]
            .bindings
            .insert(name.to_string(), BindingTarget::Global);
    }

    /// Resolve `name` starting from `scope`, walking outward on miss
    ///
    /// `None` means the name is unbound everywhere; callers treat that the
    /// same as a global, since undeclared reads and writes land on the
    /// global object.
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<BindingTarget> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let s = &self.scopes[id.0 as usize];
            if let Some(target) = s.bindings.get(name) {
                return Some(*target);
            }
            current = s.parent;
        }
        None
    }

    /// Nearest enclosing function (or global) scope
    pub fn enclosing_function(&self, scope: ScopeId) -> ScopeId {
        let mut current = scope;
        loop {
            let s = &self.scopes[current.0 as usize];
            match s.kind {
                ScopeKind::Function | ScopeKind::Global => return current,
                _ => current = s.parent.expect("non-global scope has a parent"),
            }
        }
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_walks_outward() {
        let mut tree = ScopeTree::new();
        let f = tree.push(ScopeKind::Function, ScopeTree::GLOBAL);
        let b = tree.push(ScopeKind::Block, f);
        tree.declare(f, "x", BindingTarget::Decl(NodeId(7)));

        assert_eq!(tree.lookup(b, "x"), Some(BindingTarget::Decl(NodeId(7))));
        assert_eq!(tree.lookup(b, "y"), None);
    }

    #[test]
    fn test_shadowing() {
        let mut tree = ScopeTree::new();
        let f = tree.push(ScopeKind::Function, ScopeTree::GLOBAL);
        let b = tree.push(ScopeKind::Block, f);
        tree.declare(f, "x", BindingTarget::Decl(NodeId(1)));
        tree.declare(b, "x", BindingTarget::Decl(NodeId(2)));

        assert_eq!(tree.lookup(b, "x"), Some(BindingTarget::Decl(NodeId(2))));
        assert_eq!(tree.lookup(f, "x"), Some(BindingTarget::Decl(NodeId(1))));
    }

    #[test]
    fn test_first_binding_wins() {
        let mut tree = ScopeTree::new();
        let b = tree.push(ScopeKind::Block, ScopeTree::GLOBAL);
        assert!(tree.declare(b, "x", BindingTarget::Decl(NodeId(1))));
        assert!(!tree.declare(b, "x", BindingTarget::Decl(NodeId(2))));
        assert_eq!(tree.lookup(b, "x"), Some(BindingTarget::Decl(NodeId(1))));
    }

    #[test]
    fn test_global_membership() {
        let mut tree = ScopeTree::new();
        tree.declare_global("setTimeout");
        let f = tree.push(ScopeKind::Function, ScopeTree::GLOBAL);
        assert_eq!(tree.lookup(f, "setTimeout"), Some(BindingTarget::Global));
    }

    #[test]
    fn test_enclosing_function() {
        let mut tree = ScopeTree::new();
        let f = tree.push(ScopeKind::Function, ScopeTree::GLOBAL);
        let b = tree.push(ScopeKind::Block, f);
        let c = tree.push(ScopeKind::Catch, b);
        assert_eq!(tree.enclosing_function(c), f);
        assert_eq!(tree.enclosing_function(ScopeTree::GLOBAL), ScopeTree::GLOBAL);
    }
}
