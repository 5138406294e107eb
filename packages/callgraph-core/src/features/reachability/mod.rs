//! Reachability engine
//!
//! Depth-first transitive closure over the flow graph. Closures are
//! memoized per source vertex; the cache must be invalidated whenever the
//! graph grows between fix-point rounds. Cycles are handled by the
//! ordinary visited set — the flow graph is cyclic as soon as recursion
//! or mutually-referencing properties appear.
//!
//! An engine may designate an absorbing sink: the sink still appears in
//! closures (so escape queries work), but its out-edges are not followed.
//! Target enumeration uses this so that values which escaped into the
//! sink do not resurface as concrete targets elsewhere. Querying from the
//! sink itself still follows its edges.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::features::flow::{FlowGraph, VertexId};

/// Memoizing transitive-closure engine
#[derive(Debug, Default)]
pub struct Reachability {
    memo: FxHashMap<VertexId, FxHashSet<VertexId>>,
    absorbing: Option<VertexId>,
}

impl Reachability {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine that treats `sink` as absorbing
    pub fn absorbing(sink: VertexId) -> Self {
        Self {
            memo: FxHashMap::default(),
            absorbing: Some(sink),
        }
    }

    /// Reflexive-transitive closure from `src`
    pub fn closure(&mut self, graph: &FlowGraph, src: VertexId) -> &FxHashSet<VertexId> {
        if !self.memo.contains_key(&src) {
            let mut visited = FxHashSet::default();
            let mut stack = vec![src];
            while let Some(v) = stack.pop() {
                if !visited.insert(v) {
                    continue;
                }
                if self.absorbing == Some(v) && v != src {
                    continue;
                }
                for &next in graph.succ(v) {
                    if !visited.contains(&next) {
                        stack.push(next);
                    }
                }
            }
            self.memo.insert(src, visited);
        }
        &self.memo[&src]
    }

    /// Whether `dst` is reachable from `src`
    pub fn reaches(&mut self, graph: &FlowGraph, src: VertexId, dst: VertexId) -> bool {
        self.closure(graph, src).contains(&dst)
    }

    /// Drop all memoized closures; required after the graph is extended
    pub fn invalidate(&mut self) {
        self.memo.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::flow::Vertex;

    #[test]
    fn test_closure_follows_chains() {
        let mut g = FlowGraph::new();
        let a = g.vertex(Vertex::prop("a"));
        let b = g.vertex(Vertex::prop("b"));
        let c = g.vertex(Vertex::prop("c"));
        g.add_edge_ids(a, b);
        g.add_edge_ids(b, c);

        let mut reach = Reachability::new();
        assert!(reach.reaches(&g, a, c));
        assert!(!reach.reaches(&g, c, a));
    }

    #[test]
    fn test_cycles_terminate() {
        let mut g = FlowGraph::new();
        let a = g.vertex(Vertex::prop("a"));
        let b = g.vertex(Vertex::prop("b"));
        g.add_edge_ids(a, b);
        g.add_edge_ids(b, a);

        let mut reach = Reachability::new();
        assert!(reach.reaches(&g, a, b));
        assert!(reach.reaches(&g, b, a));
        assert!(reach.reaches(&g, a, a));
    }

    #[test]
    fn test_invalidate_sees_new_edges() {
        let mut g = FlowGraph::new();
        let a = g.vertex(Vertex::prop("a"));
        let b = g.vertex(Vertex::prop("b"));

        let mut reach = Reachability::new();
        assert!(!reach.reaches(&g, a, b));

        g.add_edge_ids(a, b);
        // stale until invalidated
        assert!(!reach.reaches(&g, a, b));
        reach.invalidate();
        assert!(reach.reaches(&g, a, b));
    }

    #[test]
    fn test_absorbing_sink_is_not_expanded() {
        let mut g = FlowGraph::new();
        let a = g.vertex(Vertex::prop("a"));
        let sink = g.unknown();
        let b = g.vertex(Vertex::prop("b"));
        g.add_edge_ids(a, sink);
        g.add_edge_ids(sink, b);

        let mut reach = Reachability::absorbing(sink);
        // the sink itself is reached, what lies behind it is not
        assert!(reach.reaches(&g, a, sink));
        assert!(!reach.reaches(&g, a, b));
        // querying from the sink still follows its edges
        assert!(reach.reaches(&g, sink, b));
    }
}
