//! Call-graph extraction
//!
//! After the strategy saturates the flow graph: every `Func(f)` reaching
//! a `Callee(c)` contributes an edge `c → f`, every `Native(n)` reaching
//! it contributes `c → native(n)`. Functions reaching `Unknown` escape;
//! call-sites reachable from `Unknown` are flagged.
//!
//! Ordering is deterministic: edges follow the call registry, targets
//! follow the function registry (then the native table).

use rustc_hash::{FxHashMap, FxHashSet};

use crate::context::AnalysisCtx;
use crate::features::flow::{FlowGraph, Vertex};
use crate::features::natives;
use crate::features::parsing::ast::NodeId;
use crate::features::reachability::Reachability;

/// A possible target of a call-site
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallTarget {
    Function(NodeId),
    Native(String),
}

/// One call-graph edge
#[derive(Debug, Clone)]
pub struct CallEdge {
    pub call: NodeId,
    pub target: CallTarget,
}

/// Extraction result
#[derive(Debug, Default)]
pub struct CallGraph {
    pub edges: Vec<CallEdge>,
    /// functions whose value can reach Unknown
    pub escaping: Vec<NodeId>,
    /// call-sites whose callee slot is reachable from Unknown
    pub unknown_sites: Vec<NodeId>,
}

impl CallGraph {
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

/// Read the call graph off the saturated flow graph
pub fn extract(ctx: &AnalysisCtx, graph: &FlowGraph) -> CallGraph {
    // Unknown is absorbing here: a function that escapes into the sink is
    // flagged, but its identity must not resurface at the call-sites the
    // sink feeds (the pessimistic strategies wire it into every opaque
    // parameter)
    let mut reach = Reachability::absorbing(graph.unknown());
    let mut per_call: FxHashMap<NodeId, Vec<CallTarget>> = FxHashMap::default();
    let mut escaping = Vec::new();
    let unknown_v = graph.unknown();

    for &f in &ctx.functions {
        let Some(func_v) = graph.find(&Vertex::Func(f)) else {
            continue;
        };
        let closure = reach.closure(graph, func_v);
        if closure.contains(&unknown_v) {
            escaping.push(f);
        }
        let mut sites: Vec<(u32, NodeId)> = closure
            .iter()
            .filter_map(|&v| match graph.data(v) {
                Vertex::Callee(c) => Some((v.0, *c)),
                _ => None,
            })
            .collect();
        sites.sort_unstable_by_key(|&(v, _)| v);
        for (_, call) in sites {
            per_call
                .entry(call)
                .or_default()
                .push(CallTarget::Function(f));
        }
    }

    for entry in natives::NATIVES {
        let Some(native_v) = graph.find(&Vertex::native(entry.name)) else {
            continue;
        };
        let closure = reach.closure(graph, native_v);
        let mut sites: Vec<(u32, NodeId)> = closure
            .iter()
            .filter_map(|&v| match graph.data(v) {
                Vertex::Callee(c) => Some((v.0, *c)),
                _ => None,
            })
            .collect();
        sites.sort_unstable_by_key(|&(v, _)| v);
        for (_, call) in sites {
            per_call
                .entry(call)
                .or_default()
                .push(CallTarget::Native(entry.name.to_string()));
        }
    }

    let unknown_closure: FxHashSet<NodeId> = reach
        .closure(graph, unknown_v)
        .iter()
        .filter_map(|&v| match graph.data(v) {
            Vertex::Callee(c) => Some(*c),
            _ => None,
        })
        .collect();

    let mut edges = Vec::new();
    let mut unknown_sites = Vec::new();
    for &call in &ctx.calls {
        if let Some(targets) = per_call.remove(&call) {
            for target in targets {
                edges.push(CallEdge { call, target });
            }
        }
        if unknown_closure.contains(&call) {
            unknown_sites.push(call);
        }
    }

    CallGraph {
        edges,
        escaping,
        unknown_sites,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::binding::bind;
    use crate::features::decorate::{decorate, label_of};
    use crate::features::flow::build_flow;
    use crate::features::natives;
    use crate::features::strategy;
    use crate::pipeline::config::Strategy;

    fn call_graph(source: &str, strategy_kind: Strategy) -> (AnalysisCtx, CallGraph) {
        let mut ctx = AnalysisCtx::new();
        let file = ctx.add_file("test.js".to_string());
        let program = crate::features::parsing::parser::parse_file(
            source,
            "test.js",
            file,
            &mut ctx.ast,
            &mut ctx.diagnostics,
        )
        .expect("parses");
        ctx.files[0].program = Some(program);
        decorate(&mut ctx);
        bind(&mut ctx);
        let mut graph = FlowGraph::new();
        natives::seed(&mut graph);
        build_flow(&ctx, &mut graph);
        crate::features::modules::link_modules(&mut ctx, &mut graph);
        natives::wire_callsites(&mut ctx, &mut graph);
        strategy::apply(&ctx, &mut graph, strategy_kind);
        let cg = extract(&ctx, &graph);
        (ctx, cg)
    }

    fn labeled_edges(ctx: &AnalysisCtx, cg: &CallGraph) -> Vec<(String, String)> {
        cg.edges
            .iter()
            .map(|e| {
                let source = label_of(ctx, ctx.decorations.enclosing(e.call));
                let target = match &e.target {
                    CallTarget::Function(f) => label_of(ctx, Some(*f)),
                    CallTarget::Native(n) => format!("native({})", n),
                };
                (source, target)
            })
            .collect()
    }

    #[test]
    fn test_iife_edge_under_oneshot() {
        let (ctx, cg) =
            call_graph("function f() {} const g = () => {}; (function() {})();", Strategy::OneShot);
        let edges = labeled_edges(&ctx, &cg);
        assert_eq!(
            edges,
            vec![("global".to_string(), "global:anon[1]".to_string())]
        );
    }

    #[test]
    fn test_timer_callback_under_demand() {
        let (ctx, cg) = call_graph("setTimeout(function() {}, 10);", Strategy::Demand);
        let edges = labeled_edges(&ctx, &cg);
        assert!(edges.contains(&("global".to_string(), "clb(setTimeout)".to_string())));
        assert!(edges.contains(&("global".to_string(), "native(setTimeout)".to_string())));
    }

    #[test]
    fn test_local_higher_order_under_demand() {
        let source = "function processData(a, b) { a(); b(); } processData(function() {}, () => {});";
        let (ctx, cg) = call_graph(source, Strategy::Demand);
        let edges = labeled_edges(&ctx, &cg);
        assert!(edges.contains(&("global".to_string(), "processData".to_string())));
        assert!(edges.contains(&("processData".to_string(), "clb(processData)[1]".to_string())));
        assert!(edges.contains(&("processData".to_string(), "clb(processData)[2]".to_string())));
    }

    #[test]
    fn test_no_callback_edges_under_none() {
        let source = "function processData(a, b) { a(); b(); } processData(function() {}, () => {});";
        let (ctx, cg) = call_graph(source, Strategy::None);
        let edges = labeled_edges(&ctx, &cg);
        assert!(!edges
            .iter()
            .any(|(_, t)| t.starts_with("clb(processData)")));
    }

    #[test]
    fn test_strategy_monotonicity() {
        let source = r#"
            function wrap(h) { return h; }
            var fn = wrap(function inner() {});
            fn();
            (function() {})();
        "#;
        let (ctx_none, none) = call_graph(source, Strategy::None);
        let (ctx_one, one) = call_graph(source, Strategy::OneShot);
        let (ctx_demand, demand) = call_graph(source, Strategy::Demand);

        let none_edges = labeled_edges(&ctx_none, &none);
        let one_edges = labeled_edges(&ctx_one, &one);
        let demand_edges = labeled_edges(&ctx_demand, &demand);

        for e in &none_edges {
            assert!(one_edges.contains(e), "NONE edge {:?} missing in ONESHOT", e);
        }
        for e in &one_edges {
            assert!(
                demand_edges.contains(e),
                "ONESHOT edge {:?} missing in DEMAND",
                e
            );
        }
        // DEMAND resolves the wrapped call that the others cannot
        assert!(demand_edges.contains(&("global".to_string(), "inner".to_string())));
    }

    #[test]
    fn test_field_based_conflation() {
        // the same property name on two different receivers conflates
        let source = r#"
            var a = {}, b = {};
            a.run = function first() {};
            b.run = function second() {};
            a.run();
        "#;
        let (ctx, cg) = call_graph(source, Strategy::Demand);
        let edges = labeled_edges(&ctx, &cg);
        assert!(edges.contains(&("global".to_string(), "first".to_string())));
        assert!(edges.contains(&("global".to_string(), "second".to_string())));
    }

    #[test]
    fn test_sequential_combinator() {
        let source = r#"
            function caller() { Step(a, b, c); }
            function a() {}
            function b() {}
            function c() {}
        "#;
        let (ctx, cg) = call_graph(source, Strategy::Demand);
        let edges = labeled_edges(&ctx, &cg);
        assert!(edges.contains(&("caller".to_string(), "a".to_string())));
        assert!(edges.contains(&("a".to_string(), "b".to_string())));
        assert!(edges.contains(&("b".to_string(), "c".to_string())));
    }

    #[test]
    fn test_unknown_sink_absorbs_function_identities() {
        // inner escapes through outer's opaque return; caller's parameter
        // is fed by Unknown under the pessimistic strategies. The sink
        // must not forward inner's identity into cb's call-site.
        let source = r#"
            function outer() { return function inner() {}; }
            function caller(cb) { cb(); }
        "#;
        for strategy in [Strategy::None, Strategy::OneShot, Strategy::Demand] {
            let (ctx, cg) = call_graph(source, strategy);
            let edges = labeled_edges(&ctx, &cg);
            assert!(
                !edges.contains(&("caller".to_string(), "inner".to_string())),
                "escaped identity resurfaced at cb() under {:?}",
                strategy
            );
        }

        let (ctx, cg) = call_graph(source, Strategy::OneShot);
        // inner still escapes, and cb's call-site is still unknown
        let inner = ctx.functions[1];
        assert!(cg.escaping.contains(&inner));
        assert_eq!(cg.unknown_sites, ctx.calls);
    }

    #[test]
    fn test_escaping_via_excess_argument() {
        // f is passed where the callee declares no parameter, so its value
        // flows into the Unknown sink
        let (ctx, cg) = call_graph("function f() {} (function() {})(f);", Strategy::OneShot);
        assert!(cg.escaping.contains(&ctx.functions[0]));
    }

    #[test]
    fn test_unknown_callsite_via_unresolved_import() {
        let mut ctx = AnalysisCtx::new();
        let file = ctx.add_file("main.js".to_string());
        let program = crate::features::parsing::parser::parse_file(
            "import {h} from \"missing\"; h();",
            "main.js",
            file,
            &mut ctx.ast,
            &mut ctx.diagnostics,
        )
        .unwrap();
        ctx.files[0].program = Some(program);
        decorate(&mut ctx);
        bind(&mut ctx);
        let mut graph = FlowGraph::new();
        natives::seed(&mut graph);
        build_flow(&ctx, &mut graph);
        crate::features::modules::link_modules(&mut ctx, &mut graph);
        natives::wire_callsites(&mut ctx, &mut graph);
        strategy::apply(&ctx, &mut graph, Strategy::OneShot);
        let cg = extract(&ctx, &graph);

        assert!(ctx.diagnostics.warning_count() >= 1);
        assert_eq!(cg.unknown_sites, ctx.calls);
    }

    #[test]
    fn test_module_wiring() {
        let mut ctx = AnalysisCtx::new();
        let m = ctx.add_file("m.js".to_string());
        let pm = crate::features::parsing::parser::parse_file(
            "export function k() {}",
            "m.js",
            m,
            &mut ctx.ast,
            &mut ctx.diagnostics,
        )
        .unwrap();
        ctx.files[0].program = Some(pm);
        let main = ctx.add_file("main.js".to_string());
        let pmain = crate::features::parsing::parser::parse_file(
            "import {k} from \"./m\"; k();",
            "main.js",
            main,
            &mut ctx.ast,
            &mut ctx.diagnostics,
        )
        .unwrap();
        ctx.files[1].program = Some(pmain);

        decorate(&mut ctx);
        bind(&mut ctx);
        let mut graph = FlowGraph::new();
        natives::seed(&mut graph);
        build_flow(&ctx, &mut graph);
        crate::features::modules::link_modules(&mut ctx, &mut graph);
        natives::wire_callsites(&mut ctx, &mut graph);
        strategy::apply(&ctx, &mut graph, Strategy::Demand);
        let cg = extract(&ctx, &graph);

        let edge = cg
            .edges
            .iter()
            .find(|e| matches!(e.target, CallTarget::Function(_)))
            .expect("cross-module edge");
        assert_eq!(ctx.path_of(edge.call), "main.js");
        match edge.target {
            CallTarget::Function(f) => assert_eq!(ctx.path_of(f), "m.js"),
            _ => unreachable!(),
        }
    }
}
