//! Module linker
//!
//! Connects module boundaries in the flow graph:
//! - ES modules: named imports/exports meet in the `Prop` pool, default
//!   exports and namespace imports go through the per-file `Module` vertex
//! - CommonJS: `require("m")` reads `Module(m)`; `module.exports = e`
//!   writes it; `exports.p = e` is an ordinary property write already
//!   handled by the intraprocedural builder
//! - AMD: `define(deps, factory)` invokes the factory with the resolved
//!   module values as arguments

use std::collections::BTreeMap;

use crate::context::AnalysisCtx;
use crate::features::binding::Resolution;
use crate::features::flow::{FlowGraph, Vertex};
use crate::features::modules::resolver::resolve_specifier;
use crate::features::parsing::ast::{
    walk, Ast, FileId, ImportKind, MemberProp, NodeId, NodeKind,
};

/// Wire every module-level import and export
pub fn link_modules(ctx: &mut AnalysisCtx, graph: &mut FlowGraph) {
    let files: Vec<(FileId, NodeId)> = ctx
        .files
        .iter()
        .enumerate()
        .filter_map(|(i, f)| f.program.map(|p| (FileId(i as u32), p)))
        .collect();

    for &(file, program) in &files {
        link_esm(ctx, graph, file, program);
        link_commonjs_and_amd(ctx, graph, file, program);
    }
}

fn link_esm(ctx: &mut AnalysisCtx, graph: &mut FlowGraph, file: FileId, program: NodeId) {
    let body = match ctx.ast.kind(program) {
        NodeKind::Program { body } => body.clone(),
        _ => return,
    };

    for stmt in body {
        match ctx.ast.kind(stmt).clone() {
            NodeKind::Import { specifiers, source } => {
                let resolved = resolve_specifier(ctx, file, &source);
                if resolved.is_none() {
                    warn_unresolved(ctx, file, &source);
                }
                for spec in specifiers {
                    let (kind, local) = match ctx.ast.kind(spec) {
                        NodeKind::ImportSpec { kind, local } => (kind.clone(), *local),
                        _ => continue,
                    };
                    let target = Vertex::Var(local);
                    match (&resolved, kind) {
                        (Some(m), ImportKind::Default) | (Some(m), ImportKind::Namespace) => {
                            graph.add_edge(Vertex::Module(*m), target);
                        }
                        (Some(_), ImportKind::Named { imported }) => {
                            graph.add_edge(Vertex::Prop(imported), target);
                        }
                        (None, _) => {
                            graph.add_edge(Vertex::Unknown, target);
                        }
                    }
                }
            }
            NodeKind::ExportNamed {
                declaration,
                specifiers,
                source,
            } => {
                if let Some(decl) = declaration {
                    for (name, leaf) in declared_names(&ctx.ast, decl) {
                        let from = decl_vertex(ctx, leaf);
                        graph.add_edge(from, Vertex::Prop(name));
                    }
                }
                for (local, exported) in specifiers {
                    let from = match (&source, ctx.bindings.resolve(local)) {
                        // re-export: the value lives in the source module's
                        // property pool
                        (Some(_), _) => Vertex::Prop(
                            ctx.ast.ident_name(local).unwrap_or_default().to_string(),
                        ),
                        (None, Some(Resolution::Local(decl))) => Vertex::Var(*decl),
                        (None, Some(Resolution::Global(name))) => Vertex::Glob(name.clone()),
                        (None, None) => Vertex::Unknown,
                    };
                    graph.add_edge(from, Vertex::Prop(exported));
                }
                if let Some(s) = source {
                    if resolve_specifier(ctx, file, &s).is_none() {
                        warn_unresolved(ctx, file, &s);
                    }
                }
            }
            NodeKind::ExportDefault { declaration } => {
                graph.add_edge(Vertex::Expr(declaration), Vertex::Module(file));
            }
            _ => {}
        }
    }
}

fn link_commonjs_and_amd(
    ctx: &mut AnalysisCtx,
    graph: &mut FlowGraph,
    file: FileId,
    program: NodeId,
) {
    // `module.exports = e` assignments anywhere in the file
    let mut export_assigns = Vec::new();
    walk(&ctx.ast, program, &mut |id| {
        if let NodeKind::Assign { target, value, .. } = ctx.ast.kind(id) {
            if is_module_exports(ctx, *target) {
                export_assigns.push(*value);
            }
        }
    });
    for value in export_assigns {
        graph.add_edge(Vertex::Expr(value), Vertex::Module(file));
    }

    // require()/define() call-sites of this file
    let calls: Vec<NodeId> = ctx
        .calls
        .iter()
        .copied()
        .filter(|&c| ctx.ast.file(c) == file)
        .collect();

    for call in calls {
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
        match global_callee_name(ctx, callee) {
            Some("require") => link_require(ctx, graph, file, call, &args),
            Some("define") => link_define(ctx, graph, file, call, &args),
            _ => {}
        }
    }
}

/// `const x = require("m")` — the call result is the module's export value
fn link_require(
    ctx: &mut AnalysisCtx,
    graph: &mut FlowGraph,
    file: FileId,
    call: NodeId,
    args: &[NodeId],
) {
    match args {
        [single] => {
            let Some(spec) = string_value(&ctx.ast, *single) else {
                return;
            };
            match resolve_specifier(ctx, file, &spec) {
                Some(m) => {
                    graph.add_edge(Vertex::Module(m), Vertex::Res(call));
                }
                None => {
                    warn_unresolved(ctx, file, &spec);
                    graph.add_edge(Vertex::Unknown, Vertex::Res(call));
                }
            }
        }
        // AMD-style `require([deps], callback)`
        [deps, factory] if ctx.ast.is_function(*factory) => {
            wire_factory(ctx, graph, file, call, *deps, *factory, false);
        }
        _ => {}
    }
}

/// `define(name?, deps?, factory)` — the factory runs with the resolved
/// modules as arguments and its return value becomes this module's export
fn link_define(
    ctx: &mut AnalysisCtx,
    graph: &mut FlowGraph,
    file: FileId,
    call: NodeId,
    args: &[NodeId],
) {
    let Some(&last) = args.last() else { return };
    if ctx.ast.is_function(last) {
        let deps = args
            .iter()
            .rev()
            .skip(1)
            .find(|&&a| matches!(ctx.ast.kind(a), NodeKind::ArrayLit { .. }))
            .copied();
        match deps {
            Some(deps) => wire_factory(ctx, graph, file, call, deps, last, true),
            None => {
                graph.add_edge(Vertex::Expr(last), Vertex::Callee(call));
                graph.add_edge(Vertex::Ret(last), Vertex::Module(file));
            }
        }
    } else {
        // `define({...})` exports the object directly
        graph.add_edge(Vertex::Expr(last), Vertex::Module(file));
    }
}

fn wire_factory(
    ctx: &mut AnalysisCtx,
    graph: &mut FlowGraph,
    file: FileId,
    call: NodeId,
    deps: NodeId,
    factory: NodeId,
    exports: bool,
) {
    // the factory is invoked at the define/require site
    graph.add_edge(Vertex::Expr(factory), Vertex::Callee(call));
    if exports {
        graph.add_edge(Vertex::Ret(factory), Vertex::Module(file));
    }

    let params = match ctx.ast.kind(factory) {
        NodeKind::Function { params, .. } => params.clone(),
        _ => return,
    };
    let elements = match ctx.ast.kind(deps) {
        NodeKind::ArrayLit { elements } => elements.clone(),
        _ => return,
    };
    for (i, dep) in elements.iter().enumerate() {
        let Some(&param) = params.get(i) else { break };
        let target = Vertex::Var(param);
        match string_value(&ctx.ast, *dep).and_then(|s| {
            let resolved = resolve_specifier(ctx, file, &s);
            if resolved.is_none() {
                warn_unresolved(ctx, file, &s);
            }
            resolved
        }) {
            Some(m) => {
                graph.add_edge(Vertex::Module(m), target);
            }
            None => {
                graph.add_edge(Vertex::Unknown, target);
            }
        }
    }
}

/// AMD/RequireJS dependency graph: file → resolved dependency list
///
/// Unresolvable specifiers are reported verbatim.
pub fn amd_dependency_graph(ctx: &AnalysisCtx) -> BTreeMap<String, Vec<String>> {
    let mut out: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (i, f) in ctx.files.iter().enumerate() {
        let file = FileId(i as u32);
        let Some(program) = f.program else { continue };
        let mut deps = Vec::new();
        walk(&ctx.ast, program, &mut |id| {
            let NodeKind::Call { callee, args, is_new } = ctx.ast.kind(id) else {
                return;
            };
            if *is_new {
                return;
            }
            if !matches!(global_callee_name(ctx, *callee), Some("define") | Some("require")) {
                return;
            }
            for &arg in args {
                if let NodeKind::ArrayLit { elements } = ctx.ast.kind(arg) {
                    for &el in elements {
                        if let Some(spec) = string_value(&ctx.ast, el) {
                            let rendered = match resolve_specifier(ctx, file, &spec) {
                                Some(m) => ctx.file_path(m).to_string(),
                                None => spec,
                            };
                            deps.push(rendered);
                        }
                    }
                }
            }
        });
        out.insert(f.path.clone(), deps);
    }
    out
}

// ── helpers ──────────────────────────────────────────────────────────────

fn warn_unresolved(ctx: &mut AnalysisCtx, file: FileId, spec: &str) {
    let path = ctx.file_path(file).to_string();
    ctx.diagnostics
        .warn(format!("unresolved module specifier '{}' in {}", spec, path));
}

fn string_value(ast: &Ast, node: NodeId) -> Option<String> {
    match ast.kind(node) {
        NodeKind::Literal {
            string_value: Some(s),
        } => Some(s.clone()),
        _ => None,
    }
}

fn global_callee_name<'a>(ctx: &'a AnalysisCtx, callee: NodeId) -> Option<&'a str> {
    let name = ctx.ast.ident_name(callee)?;
    match ctx.bindings.resolve(callee) {
        Some(Resolution::Global(_)) | None => Some(name),
        Some(Resolution::Local(_)) => None,
    }
}

fn decl_vertex(ctx: &AnalysisCtx, leaf: NodeId) -> Vertex {
    match ctx.bindings.decl_target(leaf) {
        Resolution::Local(node) => Vertex::Var(node),
        Resolution::Global(name) => Vertex::Glob(name),
    }
}

/// Declared `(exported name, declaration leaf)` pairs of an exported
/// declaration statement
fn declared_names(ast: &Ast, decl: NodeId) -> Vec<(String, NodeId)> {
    let mut out = Vec::new();
    match ast.kind(decl) {
        NodeKind::Function {
            name: Some(name), ..
        }
        | NodeKind::Class {
            name: Some(name), ..
        } => {
            if let Some(n) = ast.ident_name(*name) {
                out.push((n.to_string(), *name));
            }
        }
        NodeKind::VarDecl { declarators, .. } => {
            for &d in declarators {
                if let NodeKind::Declarator { pattern, .. } = ast.kind(d) {
                    collect_leaves(ast, *pattern, &mut out);
                }
            }
        }
        _ => {}
    }
    out
}

fn collect_leaves(ast: &Ast, pattern: NodeId, out: &mut Vec<(String, NodeId)>) {
    match ast.kind(pattern) {
        NodeKind::Identifier { name } => out.push((name.clone(), pattern)),
        NodeKind::ObjectPattern { props } => {
            for &p in props {
                match ast.kind(p) {
                    NodeKind::PatternProp { value, .. } => collect_leaves(ast, *value, out),
                    NodeKind::RestPattern { argument } => collect_leaves(ast, *argument, out),
                    _ => {}
                }
            }
        }
        NodeKind::ArrayPattern { elements } => {
            for &el in elements {
                collect_leaves(ast, el, out);
            }
        }
        NodeKind::AssignPattern { target, .. } => collect_leaves(ast, *target, out),
        NodeKind::RestPattern { argument } => collect_leaves(ast, *argument, out),
        _ => {}
    }
}

fn is_module_exports(ctx: &AnalysisCtx, target: NodeId) -> bool {
    let NodeKind::Member { object, property } = ctx.ast.kind(target) else {
        return false;
    };
    if !matches!(property, MemberProp::Static(p) if p == "exports") {
        return false;
    }
    match ctx.ast.ident_name(*object) {
        Some("module") => matches!(
            ctx.bindings.resolve(*object),
            Some(Resolution::Global(_)) | None
        ),
        _ => false,
    }
}
