//! Native model
//!
//! A fixed table of modeled built-ins. Seeding adds `Native(n) → Prop(n)`
//! (and `→ Glob(n)` for global functions) so any `.n` or `n(...)`
//! call-site can see the native as a target. Callback-accepting natives
//! additionally get their callback argument slots wired into the
//! call-site's callee slot, which makes the extractor treat the callback
//! as invoked there.
//!
//! The `Step` sequential-flow combinator is modeled with synthesized
//! pseudo call-sites chaining each function argument into the next.

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

use crate::context::AnalysisCtx;
use crate::features::binding::Resolution;
use crate::features::flow::{FlowGraph, Vertex};
use crate::features::parsing::ast::{MemberProp, NodeId, NodeKind};

/// One modeled built-in
#[derive(Debug, Clone, Copy)]
pub struct NativeEntry {
    pub name: &'static str,
    /// argument positions carrying callbacks the native invokes
    pub callbacks: &'static [u32],
    /// reachable as a bare global (`setTimeout(...)`) rather than only as
    /// a method (`.forEach(...)`)
    pub global: bool,
}

/// Name of the sequential-flow combinator
pub const SEQUENTIAL_COMBINATOR: &str = "Step";

/// The native table; order is the extraction order for native targets
pub static NATIVES: &[NativeEntry] = &[
    // array iteration
    NativeEntry { name: "forEach", callbacks: &[0], global: false },
    NativeEntry { name: "map", callbacks: &[0], global: false },
    NativeEntry { name: "filter", callbacks: &[0], global: false },
    NativeEntry { name: "reduce", callbacks: &[0], global: false },
    NativeEntry { name: "reduceRight", callbacks: &[0], global: false },
    NativeEntry { name: "every", callbacks: &[0], global: false },
    NativeEntry { name: "some", callbacks: &[0], global: false },
    NativeEntry { name: "find", callbacks: &[0], global: false },
    NativeEntry { name: "findIndex", callbacks: &[0], global: false },
    NativeEntry { name: "flatMap", callbacks: &[0], global: false },
    NativeEntry { name: "sort", callbacks: &[0], global: false },
    // string
    NativeEntry { name: "replace", callbacks: &[1], global: false },
    // promises
    NativeEntry { name: "then", callbacks: &[0, 1], global: false },
    NativeEntry { name: "catch", callbacks: &[0], global: false },
    NativeEntry { name: "finally", callbacks: &[0], global: false },
    // reflective invocation carriers; arguments are not modeled here, the
    // one-shot strategy handles the immediately-invoked forms
    NativeEntry { name: "call", callbacks: &[], global: false },
    NativeEntry { name: "apply", callbacks: &[], global: false },
    NativeEntry { name: "bind", callbacks: &[], global: false },
    // events
    NativeEntry { name: "addEventListener", callbacks: &[1], global: false },
    NativeEntry { name: "on", callbacks: &[1], global: false },
    NativeEntry { name: "once", callbacks: &[1], global: false },
    // timer registrars and task queues
    NativeEntry { name: "setTimeout", callbacks: &[0], global: true },
    NativeEntry { name: "setInterval", callbacks: &[0], global: true },
    NativeEntry { name: "setImmediate", callbacks: &[0], global: true },
    NativeEntry { name: "queueMicrotask", callbacks: &[0], global: true },
    NativeEntry { name: "requestAnimationFrame", callbacks: &[0], global: true },
    // sequential-flow combinator; wiring is special-cased below
    NativeEntry { name: SEQUENTIAL_COMBINATOR, callbacks: &[], global: true },
];

static BY_NAME: Lazy<FxHashMap<&'static str, &'static NativeEntry>> = Lazy::new(|| {
    NATIVES.iter().map(|entry| (entry.name, entry)).collect()
});

pub fn lookup(name: &str) -> Option<&'static NativeEntry> {
    BY_NAME.get(name).copied()
}

/// Seed the flow graph with the native model
pub fn seed(graph: &mut FlowGraph) {
    for entry in NATIVES {
        graph.add_edge(Vertex::native(entry.name), Vertex::prop(entry.name));
        if entry.global {
            graph.add_edge(Vertex::native(entry.name), Vertex::glob(entry.name));
        }
    }
}

/// Wire callback positions and the sequential combinator at call-sites
///
/// Appends pseudo call-sites to the call registry; runs after the
/// intraprocedural builder so function values are already in the graph.
pub fn wire_callsites(ctx: &mut AnalysisCtx, graph: &mut FlowGraph) {
    let real_calls = ctx.calls.clone();
    for call in real_calls {
        let (callee, args, is_new) = match ctx.ast.kind(call) {
            NodeKind::Call {
                callee,
                args,
                is_new,
            } => (*callee, args.clone(), *is_new),
            _ => continue,
        };
        if is_new {
            continue;
        }
        let Some(entry) = native_entry_for_callee(ctx, callee) else {
            continue;
        };

        if entry.name == SEQUENTIAL_COMBINATOR {
            wire_sequential(ctx, graph, call, &args);
            continue;
        }

        for &pos in entry.callbacks {
            let Some(&arg) = args.get(pos as usize) else {
                continue;
            };
            if matches!(ctx.ast.kind(arg), NodeKind::Spread { .. }) {
                continue;
            }
            // values in the callback slot count as invoked at this site
            graph.add_edge(Vertex::Arg(call, pos), Vertex::Callee(call));
        }
    }
}

/// Match a call-site's callee against the native table
///
/// Method-style natives match any `.name` callee (field-based, receiver
/// ignored); global natives additionally match bare identifiers that
/// resolve to the global namespace.
fn native_entry_for_callee(ctx: &AnalysisCtx, callee: NodeId) -> Option<&'static NativeEntry> {
    match ctx.ast.kind(callee) {
        NodeKind::Identifier { name } => {
            let entry = lookup(name)?;
            if !entry.global {
                return None;
            }
            match ctx.bindings.resolve(callee) {
                Some(Resolution::Global(_)) | None => Some(entry),
                Some(Resolution::Local(_)) => None,
            }
        }
        NodeKind::Member {
            property: MemberProp::Static(name),
            ..
        } => lookup(name),
        _ => None,
    }
}

/// Model `Step(f1, f2, …, fn)`: each function is invoked after the
/// previous one, at a pseudo call-site attributed to the previous function
fn wire_sequential(ctx: &mut AnalysisCtx, graph: &mut FlowGraph, call: NodeId, args: &[NodeId]) {
    let Some(&first) = args.first() else {
        return;
    };
    // the first function is a target of the combinator call itself
    graph.add_edge(Vertex::Expr(first), Vertex::Callee(call));

    for window in args.windows(2) {
        let (prev, next) = (window[0], window[1]);
        let pseudo = ctx.ast.alloc_synthetic(
            NodeKind::Call {
                callee: next,
                args: vec![],
                is_new: false,
            },
            next,
        );
        ctx.calls.push(pseudo);
        graph.add_edge(Vertex::Expr(next), Vertex::Callee(pseudo));

        match resolve_to_function(ctx, graph, prev) {
            Some(prev_fn) => {
                ctx.decorations.enclosing_fn.insert(pseudo, prev_fn);
                graph.add_edge(Vertex::Ret(prev_fn), Vertex::Callee(pseudo));
            }
            None => {
                if let Some(enclosing) = ctx.decorations.enclosing(call) {
                    ctx.decorations.enclosing_fn.insert(pseudo, enclosing);
                }
            }
        }
    }
}

/// Statically resolve an argument expression to a function node
///
/// Function literals resolve to themselves; identifiers resolve through
/// their binding when exactly that binding receives a function value.
fn resolve_to_function(
    ctx: &AnalysisCtx,
    graph: &FlowGraph,
    node: NodeId,
) -> Option<NodeId> {
    if ctx.ast.is_function(node) {
        return Some(node);
    }
    let target = match ctx.ast.kind(node) {
        NodeKind::Identifier { .. } => match ctx.bindings.resolve(node)? {
            Resolution::Local(decl) => Vertex::Var(*decl),
            Resolution::Global(name) => Vertex::Glob(name.clone()),
        },
        _ => return None,
    };
    let target = graph.find(&target)?;
    ctx.functions
        .iter()
        .copied()
        .find(|&f| match graph.find(&Vertex::Func(f)) {
            Some(v) => graph.succ(v).contains(&target),
            None => false,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_lookup() {
        assert!(lookup("forEach").is_some());
        assert!(lookup("setTimeout").unwrap().global);
        assert!(!lookup("then").unwrap().global);
        assert_eq!(lookup("then").unwrap().callbacks, &[0, 1]);
        assert!(lookup("definitelyNotANative").is_none());
    }

    #[test]
    fn test_seed_edges() {
        let mut g = FlowGraph::new();
        seed(&mut g);
        let native = g.find(&Vertex::native("forEach")).unwrap();
        let prop = g.find(&Vertex::prop("forEach")).unwrap();
        assert!(g.succ(native).contains(&prop));
        // globals additionally reach their name
        let st = g.find(&Vertex::native("setTimeout")).unwrap();
        let glob = g.find(&Vertex::glob("setTimeout")).unwrap();
        assert!(g.succ(st).contains(&glob));
    }
}
