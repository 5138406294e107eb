//! Flow-graph vertices
//!
//! Identity is structural: interning the same discriminant twice yields
//! the same vertex. `Prop` deliberately keys on the property name alone.

use crate::features::parsing::ast::{FileId, NodeId};

/// Index of an interned vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId(pub u32);

impl VertexId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Flow-graph vertex variants
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Vertex {
    /// local/parameter binding, keyed by declaration node
    Var(NodeId),
    /// global variable, keyed by name
    Glob(String),
    /// any `.name` access — field-based conflation
    Prop(String),
    /// the function value itself
    Func(NodeId),
    /// the callee slot of a call-site
    Callee(NodeId),
    /// i-th argument position of a call-site
    Arg(NodeId, u32),
    /// the return-value slot at a call-site
    Res(NodeId),
    /// values returned from a function
    Ret(NodeId),
    /// a generic computed expression value
    Expr(NodeId),
    /// a module's export value (default export / `module.exports`)
    Module(FileId),
    /// a modeled built-in
    Native(String),
    /// sink/source for values outside the model
    Unknown,
}

impl Vertex {
    pub fn prop(name: impl Into<String>) -> Self {
        Vertex::Prop(name.into())
    }

    pub fn glob(name: impl Into<String>) -> Self {
        Vertex::Glob(name.into())
    }

    pub fn native(name: impl Into<String>) -> Self {
        Vertex::Native(name.into())
    }
}
