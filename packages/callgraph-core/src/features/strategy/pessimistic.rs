//! Pessimistic strategies (NONE and ONESHOT)
//!
//! Under NONE every function boundary is opaque: parameters come from
//! `Unknown`, returns escape to `Unknown`. ONESHOT recognizes one-shot
//! closures — function literals invoked at their lexical position,
//! including `.call`/`.apply` forms — and wires those pairs directly.

use rustc_hash::FxHashSet;

use super::{connect_call, ArgBinding};
use crate::context::AnalysisCtx;
use crate::features::flow::{FlowGraph, Vertex};
use crate::features::parsing::ast::{MemberProp, NodeId, NodeKind};

/// Apply NONE (`one_shot = false`) or ONESHOT (`one_shot = true`)
pub fn apply_pessimistic(ctx: &AnalysisCtx, graph: &mut FlowGraph, one_shot: bool) {
    let mut one_shot_fns: FxHashSet<NodeId> = FxHashSet::default();

    if one_shot {
        for &call in &ctx.calls {
            let Some((function, binding)) = one_shot_callee(ctx, call) else {
                continue;
            };
            connect_call(ctx, graph, call, function, binding);
            one_shot_fns.insert(function);
        }
    }

    // every other function's boundary is opaque
    for &f in &ctx.functions {
        if one_shot_fns.contains(&f) {
            continue;
        }
        let params = match ctx.ast.kind(f) {
            NodeKind::Function { params, .. } => params.clone(),
            _ => continue,
        };
        for param in params {
            graph.add_edge(Vertex::Unknown, Vertex::Var(param));
        }
        graph.add_edge(Vertex::Ret(f), Vertex::Unknown);
    }
}

/// Detect a one-shot closure at `call`
///
/// `(function(){})()`, `(function(){}).call(t, …)` and
/// `(function(){}).apply(t, a)` all count; the literal must be the callee
/// itself.
fn one_shot_callee(ctx: &AnalysisCtx, call: NodeId) -> Option<(NodeId, ArgBinding)> {
    let NodeKind::Call { callee, is_new, .. } = ctx.ast.kind(call) else {
        return None;
    };
    if *is_new {
        return None;
    }
    let callee = *callee;
    if ctx.ast.is_function(callee) {
        return Some((callee, ArgBinding::Direct));
    }
    if let NodeKind::Member {
        object,
        property: MemberProp::Static(name),
    } = ctx.ast.kind(callee)
    {
        if ctx.ast.is_function(*object) {
            match name.as_str() {
                "call" => return Some((*object, ArgBinding::Shifted)),
                "apply" => return Some((*object, ArgBinding::Opaque)),
                _ => {}
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::binding::bind;
    use crate::features::decorate::decorate;
    use crate::features::flow::build_flow;
    use crate::features::parsing::parser::parse_file;

    fn analyzed(source: &str, one_shot: bool) -> (AnalysisCtx, FlowGraph) {
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
        build_flow(&ctx, &mut graph);
        apply_pessimistic(&ctx, &mut graph, one_shot);
        (ctx, graph)
    }

    fn has_edge(g: &FlowGraph, from: &Vertex, to: &Vertex) -> bool {
        match (g.find(from), g.find(to)) {
            (Some(f), Some(t)) => g.succ(f).contains(&t),
            _ => false,
        }
    }

    #[test]
    fn test_none_feeds_params_from_unknown() {
        let (ctx, g) = analyzed("function f(x) { return x; }", false);
        let f = ctx.functions[0];
        let param = match ctx.ast.kind(f) {
            NodeKind::Function { params, .. } => params[0],
            _ => unreachable!(),
        };
        assert!(has_edge(&g, &Vertex::Unknown, &Vertex::Var(param)));
        assert!(has_edge(&g, &Vertex::Ret(f), &Vertex::Unknown));
    }

    #[test]
    fn test_oneshot_wires_iife_directly() {
        let (ctx, g) = analyzed("(function(x) { return x; })(42);", true);
        let call = ctx.calls[0];
        let f = ctx.functions[0];
        let param = match ctx.ast.kind(f) {
            NodeKind::Function { params, .. } => params[0],
            _ => unreachable!(),
        };
        assert!(has_edge(&g, &Vertex::Arg(call, 0), &Vertex::Var(param)));
        assert!(has_edge(&g, &Vertex::Ret(f), &Vertex::Res(call)));
        // one-shot closures keep a transparent boundary
        assert!(!has_edge(&g, &Vertex::Unknown, &Vertex::Var(param)));
    }

    #[test]
    fn test_oneshot_call_form_shifts_receiver() {
        let (ctx, g) = analyzed("(function(x) {}).call(self, 42);", true);
        let call = ctx.calls[0];
        let f = ctx.functions[0];
        let param = match ctx.ast.kind(f) {
            NodeKind::Function { params, .. } => params[0],
            _ => unreachable!(),
        };
        assert!(has_edge(&g, &Vertex::Arg(call, 1), &Vertex::Var(param)));
        let this_decl = ctx.bindings.this_decls[&f];
        assert!(has_edge(&g, &Vertex::Arg(call, 0), &Vertex::Var(this_decl)));
    }

    #[test]
    fn test_oneshot_apply_form_is_opaque() {
        let (ctx, g) = analyzed("(function(x) {}).apply(self, args);", true);
        let f = ctx.functions[0];
        let param = match ctx.ast.kind(f) {
            NodeKind::Function { params, .. } => params[0],
            _ => unreachable!(),
        };
        assert!(has_edge(&g, &Vertex::Unknown, &Vertex::Var(param)));
    }
}
