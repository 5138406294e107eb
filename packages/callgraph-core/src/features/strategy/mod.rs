//! Inter-procedural strategies
//!
//! How argument→parameter and return→result edges get added:
//! - `NONE`: no inter-procedural edges; parameters are fed by `Unknown`
//!   and returns escape
//! - `ONESHOT` (default): additionally wires immediately-invoked function
//!   literals directly
//! - `DEMAND`: fix-point that realizes edges for every `(function,
//!   call-site)` pair already connected in the transitive closure

mod demand;
mod pessimistic;

pub use demand::apply_demand;
pub use pessimistic::apply_pessimistic;

use crate::context::AnalysisCtx;
use crate::features::flow::{FlowGraph, Vertex};
use crate::features::parsing::ast::{NodeId, NodeKind};
use crate::pipeline::config::Strategy;

/// Apply the configured strategy to the flow graph
pub fn apply(ctx: &AnalysisCtx, graph: &mut FlowGraph, strategy: Strategy) {
    match strategy {
        Strategy::None => apply_pessimistic(ctx, graph, false),
        Strategy::OneShot => apply_pessimistic(ctx, graph, true),
        Strategy::Demand => apply_demand(ctx, graph),
    }
}

/// Argument-to-parameter shift at a call-site
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ArgBinding {
    /// `f(a, b)` — map by index
    Direct,
    /// `f.call(t, a, b)` — the receiver occupies slot 0
    Shifted,
    /// `f.apply(t, args)` — argument array is opaque
    Opaque,
}

/// Connect one `(call-site, function)` pair
///
/// Arguments map by index up to `min(args, params)`; spread arguments and
/// rest parameters degrade to `Unknown`; excess arguments flow to the
/// `Unknown` sink. Returns true when any edge was new.
pub(crate) fn connect_call(
    ctx: &AnalysisCtx,
    graph: &mut FlowGraph,
    call: NodeId,
    function: NodeId,
    binding: ArgBinding,
) -> bool {
    let ast = &ctx.ast;
    let (args, params) = match (ast.kind(call), ast.kind(function)) {
        (NodeKind::Call { args, .. }, NodeKind::Function { params, .. }) => {
            (args.clone(), params.clone())
        }
        _ => return false,
    };

    let mut changed = false;
    let shift = match binding {
        ArgBinding::Shifted => 1usize,
        _ => 0,
    };

    // the receiver of a `.call` form binds `this`
    if binding != ArgBinding::Direct && !args.is_empty() {
        if let Some(&this_decl) = ctx.bindings.this_decls.get(&function) {
            changed |= graph.add_edge(Vertex::Arg(call, 0), Vertex::Var(this_decl));
        }
    }

    for (i, &param) in params.iter().enumerate() {
        let target = Vertex::Var(param);
        if matches!(ast.kind(param), NodeKind::RestPattern { .. }) {
            changed |= graph.add_edge(Vertex::Unknown, target);
            continue;
        }
        match binding {
            ArgBinding::Opaque => {
                changed |= graph.add_edge(Vertex::Unknown, target);
            }
            _ => match args.get(i + shift) {
                Some(&arg) if matches!(ast.kind(arg), NodeKind::Spread { .. }) => {
                    changed |= graph.add_edge(Vertex::Unknown, target);
                }
                Some(_) => {
                    changed |=
                        graph.add_edge(Vertex::Arg(call, (i + shift) as u32), target);
                }
                None => {}
            },
        }
    }

    // excess arguments escape
    if binding == ArgBinding::Direct {
        for i in params.len()..args.len() {
            changed |= graph.add_edge(Vertex::Arg(call, i as u32), Vertex::Unknown);
        }
    }

    changed |= graph.add_edge(Vertex::Ret(function), Vertex::Res(call));
    changed
}
