//! Demand-driven fix-point strategy
//!
//! Repeatedly computes reachability on the current flow graph and, for
//! every `(Func(f), Callee(c))` pair present in the closure, materializes
//! the argument and return edges for that pair. Iterates until no new
//! edge is added; only pairs the closure already connects are realized.

use tracing::debug;

use super::{connect_call, ArgBinding};
use crate::context::AnalysisCtx;
use crate::features::flow::{FlowGraph, Vertex};
use crate::features::parsing::ast::NodeId;
use crate::features::reachability::Reachability;

pub fn apply_demand(ctx: &AnalysisCtx, graph: &mut FlowGraph) {
    // same absorption rule as extraction: pairs connected only through the
    // Unknown sink are not realized
    let mut reach = Reachability::absorbing(graph.unknown());
    let mut rounds = 0usize;
    loop {
        rounds += 1;
        let mut changed = false;

        for &f in &ctx.functions {
            let Some(func_v) = graph.find(&Vertex::Func(f)) else {
                continue;
            };
            // call-sites this function value reaches right now; sorted by
            // vertex id (interning order) for deterministic edge insertion
            let mut sites: Vec<(u32, NodeId)> = reach
                .closure(graph, func_v)
                .iter()
                .filter_map(|&v| match graph.data(v) {
                    Vertex::Callee(c) => Some((v.0, *c)),
                    _ => None,
                })
                .collect();
            sites.sort_unstable_by_key(|&(v, _)| v);

            for (_, call) in sites {
                changed |= connect_call(ctx, graph, call, f, ArgBinding::Direct);
            }
        }

        if !changed {
            debug!(rounds, "demand-driven fix-point converged");
            break;
        }
        reach.invalidate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::binding::bind;
    use crate::features::decorate::decorate;
    use crate::features::flow::build_flow;
    use crate::features::natives;
    use crate::features::parsing::parser::parse_file;

    fn analyzed(source: &str) -> (AnalysisCtx, FlowGraph) {
        let mut ctx = AnalysisCtx::new();
        let file = ctx.add_file("test.js".to_string());
        let program = parse_file(
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
        natives::wire_callsites(&mut ctx, &mut graph);
        apply_demand(&ctx, &mut graph);
        (ctx, graph)
    }

    fn param_of(ctx: &AnalysisCtx, f: NodeId, i: usize) -> NodeId {
        match ctx.ast.kind(f) {
            crate::features::parsing::ast::NodeKind::Function { params, .. } => params[i],
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_direct_call_connects_params() {
        let (ctx, g) = analyzed("function f(x) { return x; } var r = f(42);");
        let f = ctx.functions[0];
        let call = ctx.calls[0];
        let param = param_of(&ctx, f, 0);

        let arg = g.find(&Vertex::Arg(call, 0)).unwrap();
        let var = g.find(&Vertex::Var(param)).unwrap();
        assert!(g.succ(arg).contains(&var));

        let ret = g.find(&Vertex::Ret(f)).unwrap();
        let res = g.find(&Vertex::Res(call)).unwrap();
        assert!(g.succ(ret).contains(&res));
    }

    #[test]
    fn test_higher_order_fixpoint() {
        // `apply2` hands its argument on; the inner call only becomes
        // visible after the first round connects h -> f
        let source = "function apply2(h) { h(); } function g() {} apply2(g);";
        let (ctx, graph) = analyzed(source);
        let g_fn = ctx.functions[1];
        // the inner call-site `h()` is the first call in pre-order
        let inner_call = ctx.calls[0];

        let mut reach = Reachability::new();
        let func_v = graph.find(&Vertex::Func(g_fn)).unwrap();
        let callee = graph.find(&Vertex::Callee(inner_call)).unwrap();
        assert!(reach.reaches(&graph, func_v, callee));
    }

    #[test]
    fn test_callback_through_native() {
        let (ctx, graph) = analyzed("setTimeout(function() {}, 10);");
        let cb = ctx.functions[0];
        let call = ctx.calls[0];

        let mut reach = Reachability::new();
        let func_v = graph.find(&Vertex::Func(cb)).unwrap();
        let callee = graph.find(&Vertex::Callee(call)).unwrap();
        assert!(reach.reaches(&graph, func_v, callee));
    }
}
