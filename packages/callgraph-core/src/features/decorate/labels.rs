//! Label rendering
//!
//! Produces the human-readable identity of every function:
//! - declared or parent-supplied names verbatim,
//! - `clb(C)` / `clb(C)[i]` for call-argument functions,
//! - `parent:anon[i]` for free anonymous functions, rooted at `global`.
//!
//! Labels are pure once decoration finishes and are memoized in the
//! decoration side table.

use crate::context::AnalysisCtx;
use crate::features::parsing::ast::{Ast, MemberProp, NodeId, NodeKind};

/// Render the callee description used inside `clb(...)` labels
///
/// Identifiers yield their name; member chains yield `a.b.c` with computed
/// segments as `[computed]` and non-identifier bases as `unknown`. Other
/// callee shapes are not renderable.
pub fn render_callee(ast: &Ast, callee: NodeId) -> Option<String> {
    match ast.kind(callee) {
        NodeKind::Identifier { name } => Some(name.clone()),
        NodeKind::Member { object, property } => {
            let base = render_base(ast, *object);
            let prop = match property {
                MemberProp::Static(name) => name.clone(),
                MemberProp::Computed(_) => "[computed]".to_string(),
            };
            Some(format!("{}.{}", base, prop))
        }
        _ => None,
    }
}

fn render_base(ast: &Ast, object: NodeId) -> String {
    match ast.kind(object) {
        NodeKind::Identifier { name } => name.clone(),
        NodeKind::This => "this".to_string(),
        NodeKind::Member { object, property } => {
            let base = render_base(ast, *object);
            let prop = match property {
                MemberProp::Static(name) => name.clone(),
                MemberProp::Computed(_) => "[computed]".to_string(),
            };
            format!("{}.{}", base, prop)
        }
        _ => "unknown".to_string(),
    }
}

/// Label of a function node, `"global"` for toplevel code
pub fn label_of(ctx: &AnalysisCtx, function: Option<NodeId>) -> String {
    match function {
        Some(f) => ctx
            .decorations
            .labels
            .get(&f)
            .cloned()
            .unwrap_or_else(|| "global".to_string()),
        None => "global".to_string(),
    }
}

/// Fill the label memo for every registered function
pub(super) fn compute_labels(ctx: &mut AnalysisCtx) {
    // registry order is pre-order, so enclosing functions are labeled
    // before the functions nested in them
    let functions = ctx.functions.clone();
    for f in functions {
        let label = render_label(ctx, f);
        ctx.decorations.labels.insert(f, label);
    }
}

fn render_label(ctx: &AnalysisCtx, f: NodeId) -> String {
    if let Some(name) = ctx.decorations.fn_name.get(&f) {
        return name.clone();
    }
    if let Some(cb) = ctx.decorations.callback.get(&f) {
        let callee = match ctx.ast.kind(cb.call) {
            NodeKind::Call { callee, .. } => Some(*callee),
            _ => None,
        };
        if let Some(rendered) = callee.and_then(|c| render_callee(&ctx.ast, c)) {
            return if cb.fn_args_total == 1 {
                format!("clb({})", rendered)
            } else {
                format!("clb({})[{}]", rendered, cb.fn_position)
            };
        }
    }
    let index = ctx.decorations.anon_index.get(&f).copied().unwrap_or(1);
    let parent = ctx.decorations.enclosing(f);
    let parent_label = match parent {
        Some(p) => ctx
            .decorations
            .labels
            .get(&p)
            .cloned()
            .unwrap_or_else(|| "global".to_string()),
        None => "global".to_string(),
    };
    format!("{}:anon[{}]", parent_label, index)
}
