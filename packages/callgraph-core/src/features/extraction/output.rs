//! Output rendering
//!
//! Serializes the extracted call graph in the configured projection:
//! - `static`: function targets only, caller positions widened to the
//!   enclosing function's range
//! - `nativecalls`: only edges into native targets, attributing each
//!   functional argument as the callee
//! - `acg`: raw `source-pos -> target-pos` strings
//!
//! Native endpoints use the `Native` sentinel file and null positions.

use serde::Serialize;
use serde_json::Value;

use super::extractor::{CallGraph, CallTarget};
use crate::context::AnalysisCtx;
use crate::features::decorate::label_of;
use crate::features::flow::{FlowGraph, Vertex};
use crate::features::parsing::ast::{NodeId, NodeKind};
use crate::pipeline::config::AnalyzerKind;
use crate::shared::models::Location;

#[derive(Debug, Clone, Serialize)]
pub struct PositionOut {
    pub row: Option<u32>,
    pub column: Option<u32>,
}

impl PositionOut {
    fn at(loc: Location) -> Self {
        Self {
            row: Some(loc.line),
            column: Some(loc.column),
        }
    }

    fn null() -> Self {
        Self {
            row: None,
            column: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RangeOut {
    pub start: Option<u32>,
    pub end: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EndpointOut {
    pub label: String,
    pub file: String,
    pub start: PositionOut,
    pub end: PositionOut,
    pub range: RangeOut,
}

#[derive(Debug, Clone, Serialize)]
pub struct EdgeOut {
    pub source: EndpointOut,
    pub target: EndpointOut,
}

/// Render the call graph under the chosen projection
pub fn render(ctx: &AnalysisCtx, cg: &CallGraph, kind: AnalyzerKind) -> Value {
    match kind {
        AnalyzerKind::Static => {
            let edges: Vec<EdgeOut> = cg
                .edges
                .iter()
                .filter_map(|e| match &e.target {
                    CallTarget::Function(f) => {
                        Some(EdgeOut {
                            source: caller_endpoint(ctx, e.call),
                            target: node_endpoint(ctx, label_of(ctx, Some(*f)), *f),
                        })
                    }
                    CallTarget::Native(_) => None,
                })
                .collect();
            serde_json::to_value(edges).unwrap_or(Value::Null)
        }
        AnalyzerKind::NativeCalls => {
            let mut edges = Vec::new();
            for e in &cg.edges {
                let CallTarget::Native(name) = &e.target else {
                    continue;
                };
                let target = native_endpoint(name);
                let fn_args = functional_args(ctx, e.call);
                if fn_args.is_empty() {
                    edges.push(EdgeOut {
                        source: node_endpoint(
                            ctx,
                            label_of(ctx, ctx.decorations.enclosing(e.call)),
                            e.call,
                        ),
                        target,
                    });
                } else {
                    for arg in fn_args {
                        edges.push(EdgeOut {
                            source: node_endpoint(ctx, label_of(ctx, Some(arg)), arg),
                            target: target.clone(),
                        });
                    }
                }
            }
            serde_json::to_value(edges).unwrap_or(Value::Null)
        }
        AnalyzerKind::Acg => {
            let lines: Vec<String> = cg
                .edges
                .iter()
                .map(|e| {
                    let target = match &e.target {
                        CallTarget::Function(f) => position_of(ctx, *f),
                        CallTarget::Native(name) => format!("Native({})", name),
                    };
                    format!("{} -> {}", position_of(ctx, e.call), target)
                })
                .collect();
            serde_json::to_value(lines).unwrap_or(Value::Null)
        }
    }
}

/// Caller endpoint whose range is the enclosing function's range
fn caller_endpoint(ctx: &AnalysisCtx, call: NodeId) -> EndpointOut {
    let label = label_of(ctx, ctx.decorations.enclosing(call));
    let range_node = match ctx.decorations.enclosing(call) {
        Some(f) => f,
        // toplevel: the whole file
        None => ctx
            .files
            .get(ctx.ast.file(call).0 as usize)
            .and_then(|f| f.program)
            .unwrap_or(call),
    };
    let mut endpoint = node_endpoint(ctx, label, range_node);
    endpoint.file = ctx.path_of(call).to_string();
    endpoint
}

fn node_endpoint(ctx: &AnalysisCtx, label: String, node: NodeId) -> EndpointOut {
    let span = ctx.ast.span(node);
    let range = ctx.ast.range(node);
    EndpointOut {
        label,
        file: ctx.path_of(node).to_string(),
        start: PositionOut::at(span.start()),
        end: PositionOut::at(span.end()),
        range: RangeOut {
            start: Some(range.start),
            end: Some(range.end),
        },
    }
}

fn native_endpoint(name: &str) -> EndpointOut {
    EndpointOut {
        label: name.to_string(),
        file: "Native".to_string(),
        start: PositionOut::null(),
        end: PositionOut::null(),
        range: RangeOut {
            start: None,
            end: None,
        },
    }
}

fn functional_args(ctx: &AnalysisCtx, call: NodeId) -> Vec<NodeId> {
    match ctx.ast.kind(call) {
        NodeKind::Call { args, .. } => args
            .iter()
            .copied()
            .filter(|&a| ctx.ast.is_function(a))
            .collect(),
        _ => Vec::new(),
    }
}

fn position_of(ctx: &AnalysisCtx, node: NodeId) -> String {
    let start = ctx.ast.span(node).start();
    format!("{}@{}:{}", ctx.path_of(node), start.line, start.column)
}

// ── Flow-graph dump ──────────────────────────────────────────────────────

/// Deterministic text listing of every flow edge, for debugging
pub fn dump_flow_graph(ctx: &AnalysisCtx, graph: &FlowGraph) -> String {
    let mut out = String::new();
    for (from, to) in graph.edges() {
        out.push_str(&pretty_vertex(ctx, graph.data(from)));
        out.push_str(" -> ");
        out.push_str(&pretty_vertex(ctx, graph.data(to)));
        out.push('\n');
    }
    out
}

fn pretty_vertex(ctx: &AnalysisCtx, v: &Vertex) -> String {
    match v {
        Vertex::Var(d) => {
            let name = ctx.ast.ident_name(*d).unwrap_or("?");
            format!("Var({}@{})", name, position_of(ctx, *d))
        }
        Vertex::Glob(name) => format!("Glob({})", name),
        Vertex::Prop(name) => format!("Prop({})", name),
        Vertex::Func(f) => format!("Func({})", label_of(ctx, Some(*f))),
        Vertex::Callee(c) => format!("Callee({})", position_of(ctx, *c)),
        Vertex::Arg(c, i) => format!("Arg({}, {})", position_of(ctx, *c), i),
        Vertex::Res(c) => format!("Res({})", position_of(ctx, *c)),
        Vertex::Ret(f) => format!("Ret({})", label_of(ctx, Some(*f))),
        Vertex::Expr(n) => format!("Expr({})", position_of(ctx, *n)),
        Vertex::Module(m) => format!("Module({})", ctx.file_path(*m)),
        Vertex::Native(name) => format!("Native({})", name),
        Vertex::Unknown => "Unknown".to_string(),
    }
}
