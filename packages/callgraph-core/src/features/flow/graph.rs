//! Flow-graph storage
//!
//! Directed graph over interned vertices. Adjacency lists preserve
//! insertion order and edges are deduplicated, so iteration order — and
//! therefore every downstream output — is a pure function of the input.

use rustc_hash::{FxHashMap, FxHashSet};

use super::vertex::{Vertex, VertexId};

/// Flow graph with interned vertices and insertion-ordered adjacency
#[derive(Debug, Default)]
pub struct FlowGraph {
    verts: Vec<Vertex>,
    index: FxHashMap<Vertex, VertexId>,
    succ: Vec<Vec<VertexId>>,
    edge_set: FxHashSet<(VertexId, VertexId)>,
}

impl FlowGraph {
    pub fn new() -> Self {
        let mut graph = Self::default();
        // Unknown exists from the start so escape queries always have a
        // vertex to test against
        graph.vertex(Vertex::Unknown);
        graph
    }

    /// Intern a vertex, returning its id
    pub fn vertex(&mut self, v: Vertex) -> VertexId {
        if let Some(&id) = self.index.get(&v) {
            return id;
        }
        let id = VertexId(self.verts.len() as u32);
        self.index.insert(v.clone(), id);
        self.verts.push(v);
        self.succ.push(Vec::new());
        id
    }

    /// Look up a vertex without interning it
    pub fn find(&self, v: &Vertex) -> Option<VertexId> {
        self.index.get(v).copied()
    }

    /// The pre-interned Unknown vertex
    pub fn unknown(&self) -> VertexId {
        VertexId(0)
    }

    #[inline]
    pub fn data(&self, id: VertexId) -> &Vertex {
        &self.verts[id.index()]
    }

    #[inline]
    pub fn succ(&self, id: VertexId) -> &[VertexId] {
        &self.succ[id.index()]
    }

    /// Add an edge between vertices, interning as needed
    ///
    /// Returns true when the edge is new (for fix-point loops).
    pub fn add_edge(&mut self, from: Vertex, to: Vertex) -> bool {
        let from = self.vertex(from);
        let to = self.vertex(to);
        self.add_edge_ids(from, to)
    }

    /// Add an edge between already-interned vertices
    pub fn add_edge_ids(&mut self, from: VertexId, to: VertexId) -> bool {
        if !self.edge_set.insert((from, to)) {
            return false;
        }
        self.succ[from.index()].push(to);
        true
    }

    pub fn vertex_count(&self) -> usize {
        self.verts.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_set.len()
    }

    /// All vertices in interning order
    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &Vertex)> {
        self.verts
            .iter()
            .enumerate()
            .map(|(i, v)| (VertexId(i as u32), v))
    }

    /// All edges, grouped by source in interning order
    pub fn edges(&self) -> impl Iterator<Item = (VertexId, VertexId)> + '_ {
        self.succ.iter().enumerate().flat_map(|(i, targets)| {
            targets
                .iter()
                .map(move |&t| (VertexId(i as u32), t))
        })
    }
}

impl std::fmt::Display for FlowGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "FlowGraph {{")?;
        writeln!(f, "  vertices: {}", self.vertex_count())?;
        writeln!(f, "  edges: {}", self.edge_count())?;
        writeln!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::parsing::ast::NodeId;

    #[test]
    fn test_vertex_interning() {
        let mut g = FlowGraph::new();
        let a = g.vertex(Vertex::prop("f"));
        let b = g.vertex(Vertex::prop("f"));
        let c = g.vertex(Vertex::prop("g"));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_edge_dedup() {
        let mut g = FlowGraph::new();
        assert!(g.add_edge(Vertex::prop("a"), Vertex::prop("b")));
        assert!(!g.add_edge(Vertex::prop("a"), Vertex::prop("b")));
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn test_adjacency_preserves_insertion_order() {
        let mut g = FlowGraph::new();
        let src = g.vertex(Vertex::Expr(NodeId(0)));
        let t1 = g.vertex(Vertex::prop("one"));
        let t2 = g.vertex(Vertex::prop("two"));
        let t3 = g.vertex(Vertex::prop("three"));
        g.add_edge_ids(src, t2);
        g.add_edge_ids(src, t1);
        g.add_edge_ids(src, t3);
        assert_eq!(g.succ(src), &[t2, t1, t3]);
    }

    #[test]
    fn test_unknown_is_preinterned() {
        let g = FlowGraph::new();
        assert_eq!(g.data(g.unknown()), &Vertex::Unknown);
    }
}
