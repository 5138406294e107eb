//! Intraprocedural edge construction
//!
//! Structural recursion over the decorated, bound AST. Every expression
//! node owns an `Expr` vertex; the rules below connect reads, writes,
//! property accesses, calls and returns. Inter-procedural edges are the
//! strategies' job; parameters behave as ordinary variables here.
//!
//! Untracked constructs (computed properties, reflection) contribute no
//! edges: the analysis is deliberately unsound there.

use super::graph::FlowGraph;
use super::vertex::{Vertex, VertexId};
use crate::context::AnalysisCtx;
use crate::features::binding::Resolution;
use crate::features::parsing::ast::{
    Ast, FunctionFlavor, MemberProp, MethodKind, NodeId, NodeKind, PropKey,
};

/// Populate `graph` with intraprocedural flow edges for every parsed file
pub fn build_flow(ctx: &AnalysisCtx, graph: &mut FlowGraph) {
    let mut builder = FlowBuilder { ctx, g: graph };
    let programs: Vec<NodeId> = ctx.files.iter().filter_map(|f| f.program).collect();
    for program in programs {
        if let NodeKind::Program { body } = ctx.ast.kind(program) {
            for &stmt in body {
                builder.visit_stmt(stmt, None);
            }
        }
    }
}

struct FlowBuilder<'a> {
    ctx: &'a AnalysisCtx,
    g: &'a mut FlowGraph,
}

impl<'a> FlowBuilder<'a> {
    fn ast(&self) -> &'a Ast {
        &self.ctx.ast
    }

    /// Vertex a resolved identifier reads from / writes to
    fn resolution_vertex(&mut self, use_node: NodeId) -> Vertex {
        match self.ctx.bindings.resolve(use_node) {
            Some(Resolution::Local(decl)) => Vertex::Var(*decl),
            Some(Resolution::Global(name)) => Vertex::Glob(name.clone()),
            None => Vertex::Unknown,
        }
    }

    /// Vertex a declaration leaf binds into
    fn decl_vertex(&self, decl: NodeId) -> Vertex {
        match self.ctx.bindings.decl_target(decl) {
            Resolution::Local(node) => Vertex::Var(node),
            Resolution::Global(name) => Vertex::Glob(name),
        }
    }

    // ── Statements ───────────────────────────────────────────────────────

    fn visit_stmt(&mut self, id: NodeId, current_fn: Option<NodeId>) {
        let ast = self.ast();
        match ast.kind(id) {
            NodeKind::ExprStmt { expr } => {
                let expr = *expr;
                self.visit_expr(expr, current_fn);
            }
            NodeKind::Block { body } => {
                for &stmt in body.clone().iter() {
                    self.visit_stmt(stmt, current_fn);
                }
            }
            NodeKind::VarDecl { declarators, .. } => {
                for &d in declarators.clone().iter() {
                    let (pattern, init) = match ast.kind(d) {
                        NodeKind::Declarator { pattern, init } => (*pattern, *init),
                        _ => continue,
                    };
                    let source = init.map(|init| self.visit_expr(init, current_fn));
                    self.destructure_decl(source, pattern, current_fn);
                }
            }
            NodeKind::Function { .. } => {
                self.visit_expr(id, current_fn);
            }
            NodeKind::Class { .. } => {
                self.visit_expr(id, current_fn);
            }
            NodeKind::Return { argument } => {
                let argument = *argument;
                if let Some(arg) = argument {
                    let v = self.visit_expr(arg, current_fn);
                    if let Some(f) = current_fn {
                        let ret = self.g.vertex(Vertex::Ret(f));
                        self.g.add_edge_ids(v, ret);
                    }
                }
            }
            NodeKind::If {
                test,
                consequent,
                alternate,
            } => {
                let (test, consequent, alternate) = (*test, *consequent, *alternate);
                self.visit_expr(test, current_fn);
                self.visit_stmt(consequent, current_fn);
                if let Some(alt) = alternate {
                    self.visit_stmt(alt, current_fn);
                }
            }
            NodeKind::For {
                init,
                test,
                update,
                body,
            } => {
                let (init, test, update, body) = (*init, *test, *update, *body);
                if let Some(init) = init {
                    self.visit_stmt_or_expr(init, current_fn);
                }
                if let Some(test) = test {
                    self.visit_expr(test, current_fn);
                }
                if let Some(update) = update {
                    self.visit_expr(update, current_fn);
                }
                self.visit_stmt(body, current_fn);
            }
            NodeKind::ForIn {
                left,
                decl_kind,
                right,
                body,
                ..
            } => {
                let (left, decl_kind, right, body) = (*left, *decl_kind, *right, *body);
                let source = self.visit_expr(right, current_fn);
                if decl_kind.is_some() {
                    self.destructure_decl(Some(source), left, current_fn);
                } else {
                    self.destructure_assign(source, left, current_fn);
                }
                self.visit_stmt(body, current_fn);
            }
            NodeKind::While { test, body } => {
                let (test, body) = (*test, *body);
                self.visit_expr(test, current_fn);
                self.visit_stmt(body, current_fn);
            }
            NodeKind::DoWhile { body, test } => {
                let (body, test) = (*body, *test);
                self.visit_stmt(body, current_fn);
                self.visit_expr(test, current_fn);
            }
            NodeKind::Try {
                block,
                handler,
                finalizer,
            } => {
                let (block, handler, finalizer) = (*block, *handler, *finalizer);
                self.visit_stmt(block, current_fn);
                if let Some(h) = handler {
                    self.visit_stmt(h, current_fn);
                }
                if let Some(f) = finalizer {
                    self.visit_stmt(f, current_fn);
                }
            }
            NodeKind::Catch { param, body } => {
                let (param, body) = (*param, *body);
                if let Some(p) = param {
                    // thrown values are outside the model
                    let unknown = self.g.unknown();
                    self.destructure_decl(Some(unknown), p, current_fn);
                }
                self.visit_stmt(body, current_fn);
            }
            NodeKind::Switch {
                discriminant,
                cases,
            } => {
                let (discriminant, cases) = (*discriminant, cases.clone());
                self.visit_expr(discriminant, current_fn);
                for case in cases {
                    if let NodeKind::SwitchCase { test, body } = ast.kind(case) {
                        let (test, body) = (*test, body.clone());
                        if let Some(t) = test {
                            self.visit_expr(t, current_fn);
                        }
                        for stmt in body {
                            self.visit_stmt(stmt, current_fn);
                        }
                    }
                }
            }
            NodeKind::Labeled { body } => {
                let body = *body;
                self.visit_stmt(body, current_fn);
            }
            NodeKind::Throw { argument } => {
                let argument = *argument;
                self.visit_expr(argument, current_fn);
            }
            NodeKind::Import { .. } => {
                // wired by the module linker
            }
            NodeKind::ExportNamed { declaration, .. } => {
                let declaration = *declaration;
                if let Some(d) = declaration {
                    self.visit_stmt(d, current_fn);
                }
            }
            NodeKind::ExportDefault { declaration } => {
                let declaration = *declaration;
                self.visit_stmt_or_expr(declaration, current_fn);
            }
            _ => {
                for child in ast.children(id) {
                    self.visit_stmt_or_expr(child, current_fn);
                }
            }
        }
    }

    fn visit_stmt_or_expr(&mut self, id: NodeId, current_fn: Option<NodeId>) {
        if is_statement(self.ast().kind(id)) {
            self.visit_stmt(id, current_fn);
        } else {
            self.visit_expr(id, current_fn);
        }
    }

    // ── Expressions ──────────────────────────────────────────────────────

    /// Visit an expression, returning its `Expr` vertex
    fn visit_expr(&mut self, id: NodeId, current_fn: Option<NodeId>) -> VertexId {
        let ast = self.ast();
        let expr = self.g.vertex(Vertex::Expr(id));
        match ast.kind(id) {
            NodeKind::Identifier { .. } => {
                let source = self.resolution_vertex(id);
                let source = self.g.vertex(source);
                self.g.add_edge_ids(source, expr);
            }
            NodeKind::This => {
                if let Some(f) = current_fn {
                    if let Some(&this_decl) = self.ctx.bindings.this_decls.get(&f) {
                        let v = self.g.vertex(Vertex::Var(this_decl));
                        self.g.add_edge_ids(v, expr);
                    }
                }
            }
            NodeKind::Super | NodeKind::Literal { .. } => {}
            NodeKind::TemplateLit { parts } => {
                for &part in parts.clone().iter() {
                    let v = self.visit_expr(part, current_fn);
                    self.g.add_edge_ids(v, expr);
                }
            }
            NodeKind::TaggedTemplate { tag, quasi } => {
                let (tag, quasi) = (*tag, *quasi);
                self.visit_expr(tag, current_fn);
                self.visit_expr(quasi, current_fn);
            }
            NodeKind::ArrayLit { elements } => {
                for &el in elements.clone().iter() {
                    let v = self.visit_expr(el, current_fn);
                    self.g.add_edge_ids(v, expr);
                }
            }
            NodeKind::ObjectLit { props } => {
                for &prop in props.clone().iter() {
                    match ast.kind(prop) {
                        NodeKind::Property { key, value } => {
                            let value = *value;
                            let key = key.clone();
                            let v = self.visit_expr(value, current_fn);
                            match key {
                                PropKey::Ident(name) | PropKey::Literal(name) => {
                                    let p = self.g.vertex(Vertex::Prop(name));
                                    self.g.add_edge_ids(v, p);
                                }
                                PropKey::Computed(k) => {
                                    self.visit_expr(k, current_fn);
                                }
                            }
                        }
                        NodeKind::Spread { argument } => {
                            let argument = *argument;
                            self.visit_expr(argument, current_fn);
                        }
                        _ => {
                            self.visit_expr(prop, current_fn);
                        }
                    }
                }
            }
            NodeKind::Spread { argument } => {
                let argument = *argument;
                let v = self.visit_expr(argument, current_fn);
                self.g.add_edge_ids(v, expr);
            }
            NodeKind::Function { .. } => {
                self.visit_function(id);
            }
            NodeKind::Class { .. } => {
                self.visit_class(id, current_fn);
            }
            NodeKind::Member { object, property } => {
                let (object, property) = (*object, property.clone());
                self.visit_expr(object, current_fn);
                match property {
                    MemberProp::Static(name) => {
                        let p = self.g.vertex(Vertex::Prop(name));
                        self.g.add_edge_ids(p, expr);
                    }
                    MemberProp::Computed(index) => {
                        // dynamic lookup, untracked
                        self.visit_expr(index, current_fn);
                    }
                }
            }
            NodeKind::Call {
                callee,
                args,
                is_new,
            } => {
                let (callee, args, is_new) = (*callee, args.clone(), *is_new);
                let callee_v = self.visit_expr(callee, current_fn);
                let callee_slot = self.g.vertex(Vertex::Callee(id));
                self.g.add_edge_ids(callee_v, callee_slot);
                for (i, &arg) in args.iter().enumerate() {
                    let v = self.visit_expr(arg, current_fn);
                    let slot = self.g.vertex(Vertex::Arg(id, i as u32));
                    self.g.add_edge_ids(v, slot);
                }
                let res = self.g.vertex(Vertex::Res(id));
                self.g.add_edge_ids(res, expr);
                if is_new {
                    // instances approximate their constructors
                    self.g.add_edge_ids(callee_v, expr);
                }
            }
            NodeKind::Assign { target, value, .. } => {
                let (target, value) = (*target, *value);
                let v = self.visit_expr(value, current_fn);
                self.assign_into(v, target, current_fn);
                // assignment evaluates to its right-hand side
                self.g.add_edge_ids(v, expr);
            }
            NodeKind::Conditional {
                test,
                consequent,
                alternate,
            } => {
                let (test, consequent, alternate) = (*test, *consequent, *alternate);
                self.visit_expr(test, current_fn);
                let c = self.visit_expr(consequent, current_fn);
                let a = self.visit_expr(alternate, current_fn);
                self.g.add_edge_ids(c, expr);
                self.g.add_edge_ids(a, expr);
            }
            NodeKind::Binary {
                left,
                right,
                logical,
            } => {
                let (left, right, logical) = (*left, *right, *logical);
                let l = self.visit_expr(left, current_fn);
                let r = self.visit_expr(right, current_fn);
                if logical {
                    self.g.add_edge_ids(l, expr);
                    self.g.add_edge_ids(r, expr);
                }
            }
            NodeKind::Unary { argument } | NodeKind::Update { argument } => {
                let argument = *argument;
                self.visit_expr(argument, current_fn);
            }
            NodeKind::Sequence { expressions } => {
                for &e in expressions.clone().iter() {
                    let v = self.visit_expr(e, current_fn);
                    self.g.add_edge_ids(v, expr);
                }
            }
            NodeKind::Await { argument } => {
                let argument = *argument;
                let v = self.visit_expr(argument, current_fn);
                self.g.add_edge_ids(v, expr);
            }
            NodeKind::Yield { argument } => {
                let argument = *argument;
                if let Some(a) = argument {
                    self.visit_expr(a, current_fn);
                }
            }
            NodeKind::Other { children } => {
                for &child in children.clone().iter() {
                    let v = self.visit_expr(child, current_fn);
                    self.g.add_edge_ids(v, expr);
                }
            }
            _ => {
                for child in ast.children(id) {
                    self.visit_stmt_or_expr(child, current_fn);
                }
            }
        }
        expr
    }

    /// Function-value edges plus body traversal for one function literal
    fn visit_function(&mut self, f: NodeId) {
        let ast = self.ast();
        let (name, params, body, flavor) = match ast.kind(f) {
            NodeKind::Function {
                name,
                params,
                body,
                flavor,
            } => (*name, params.clone(), *body, *flavor),
            _ => return,
        };

        let func = self.g.vertex(Vertex::Func(f));
        let expr = self.g.vertex(Vertex::Expr(f));
        self.g.add_edge_ids(func, expr);

        // declarations additionally flow into their name binding
        if flavor == FunctionFlavor::Declaration {
            if let Some(name) = name {
                let target = self.decl_vertex(name);
                let target = self.g.vertex(target);
                self.g.add_edge_ids(func, target);
            }
        } else if let Some(name) = name {
            // named function expressions can reach themselves by name
            let target = self.g.vertex(Vertex::Var(name));
            self.g.add_edge_ids(func, target);
        }

        // non-identifier parameters destructure from their pattern root,
        // which is also the vertex inter-procedural argument edges target
        for param in &params {
            if ast.ident_name(*param).is_none() {
                let root = self.g.vertex(Vertex::Var(*param));
                self.destructure_decl(Some(root), *param, Some(f));
            }
        }

        match flavor {
            FunctionFlavor::Arrow {
                expression_body: true,
            } => {
                let v = self.visit_expr(body, Some(f));
                let ret = self.g.vertex(Vertex::Ret(f));
                self.g.add_edge_ids(v, ret);
            }
            _ => self.visit_stmt(body, Some(f)),
        }
    }

    /// Class rules: methods land in the property pool, the constructor
    /// doubles as the class value
    fn visit_class(&mut self, class: NodeId, current_fn: Option<NodeId>) {
        let ast = self.ast();
        let (name, superclass, members, is_declaration) = match ast.kind(class) {
            NodeKind::Class {
                name,
                superclass,
                members,
                is_declaration,
            } => (*name, *superclass, members.clone(), *is_declaration),
            _ => return,
        };

        if let Some(s) = superclass {
            self.visit_expr(s, current_fn);
        }

        let class_expr = self.g.vertex(Vertex::Expr(class));
        for member in members {
            match ast.kind(member) {
                NodeKind::MethodDef { key, value, kind, .. } => {
                    let (key, value, kind) = (key.clone(), *value, *kind);
                    self.visit_function(value);
                    let func = self.g.vertex(Vertex::Func(value));
                    if let Some(prop_name) = key.name() {
                        let p = self.g.vertex(Vertex::prop(prop_name));
                        self.g.add_edge_ids(func, p);
                    } else if let PropKey::Computed(k) = key {
                        self.visit_expr(k, current_fn);
                    }
                    if kind == MethodKind::Constructor {
                        self.g.add_edge_ids(func, class_expr);
                        if is_declaration {
                            if let Some(name) = name {
                                let target = self.decl_vertex(name);
                                let target = self.g.vertex(target);
                                self.g.add_edge_ids(func, target);
                            }
                        }
                    }
                }
                NodeKind::FieldDef { key, value } => {
                    let (key, value) = (key.clone(), *value);
                    if let Some(v) = value {
                        let vx = self.visit_expr(v, current_fn);
                        if let Some(prop_name) = key.name() {
                            let p = self.g.vertex(Vertex::prop(prop_name));
                            self.g.add_edge_ids(vx, p);
                        }
                    }
                    if let PropKey::Computed(k) = key {
                        self.visit_expr(k, current_fn);
                    }
                }
                _ => {}
            }
        }
    }

    /// Variable write or property write for one assignment target
    fn assign_into(&mut self, source: VertexId, target: NodeId, current_fn: Option<NodeId>) {
        let ast = self.ast();
        match ast.kind(target) {
            NodeKind::Identifier { .. } => {
                let t = self.resolution_vertex(target);
                let t = self.g.vertex(t);
                self.g.add_edge_ids(source, t);
            }
            NodeKind::Member { object, property } => {
                let (object, property) = (*object, property.clone());
                self.visit_expr(object, current_fn);
                match property {
                    MemberProp::Static(name) => {
                        // the receiver is evaluated but not linked: the
                        // field-based abstraction discards its identity
                        let p = self.g.vertex(Vertex::Prop(name));
                        self.g.add_edge_ids(source, p);
                    }
                    MemberProp::Computed(index) => {
                        self.visit_expr(index, current_fn);
                    }
                }
            }
            NodeKind::ObjectPattern { .. } | NodeKind::ArrayPattern { .. } => {
                self.destructure_assign(source, target, current_fn);
            }
            _ => {
                self.visit_expr(target, current_fn);
            }
        }
    }

    /// Expand a declaration pattern: object properties are field-based
    /// reads, array elements take the whole source value
    fn destructure_decl(&mut self, source: Option<VertexId>, pattern: NodeId, current_fn: Option<NodeId>) {
        let ast = self.ast();
        match ast.kind(pattern) {
            NodeKind::Identifier { .. } => {
                let t = self.decl_vertex(pattern);
                let t = self.g.vertex(t);
                if let Some(source) = source {
                    self.g.add_edge_ids(source, t);
                }
            }
            NodeKind::ObjectPattern { props } => {
                for &p in props.clone().iter() {
                    match ast.kind(p) {
                        NodeKind::PatternProp { key, value } => {
                            let (key, value) = (key.clone(), *value);
                            match key {
                                PropKey::Ident(name) | PropKey::Literal(name) => {
                                    let prop = self.g.vertex(Vertex::Prop(name));
                                    self.destructure_decl(Some(prop), value, current_fn);
                                }
                                PropKey::Computed(k) => {
                                    self.visit_expr(k, current_fn);
                                    let unknown = self.g.unknown();
                                    self.destructure_decl(Some(unknown), value, current_fn);
                                }
                            }
                        }
                        NodeKind::RestPattern { argument } => {
                            let argument = *argument;
                            self.destructure_decl(source, argument, current_fn);
                        }
                        _ => {}
                    }
                }
            }
            NodeKind::ArrayPattern { elements } => {
                for &el in elements.clone().iter() {
                    self.destructure_decl(source, el, current_fn);
                }
            }
            NodeKind::AssignPattern { target, default } => {
                let (target, default) = (*target, *default);
                let d = self.visit_expr(default, current_fn);
                self.destructure_decl(Some(d), target, current_fn);
                self.destructure_decl(source, target, current_fn);
            }
            NodeKind::RestPattern { argument } => {
                let argument = *argument;
                self.destructure_decl(source, argument, current_fn);
            }
            _ => {}
        }
    }

    /// Expand an assignment-destructuring target; leaves are resolved uses
    /// or property writes
    fn destructure_assign(&mut self, source: VertexId, pattern: NodeId, current_fn: Option<NodeId>) {
        let ast = self.ast();
        match ast.kind(pattern) {
            NodeKind::ObjectPattern { props } => {
                for &p in props.clone().iter() {
                    match ast.kind(p) {
                        NodeKind::PatternProp { key, value } => {
                            let (key, value) = (key.clone(), *value);
                            match key {
                                PropKey::Ident(name) | PropKey::Literal(name) => {
                                    let prop = self.g.vertex(Vertex::Prop(name));
                                    self.destructure_assign(prop, value, current_fn);
                                }
                                PropKey::Computed(k) => {
                                    self.visit_expr(k, current_fn);
                                    let unknown = self.g.unknown();
                                    self.destructure_assign(unknown, value, current_fn);
                                }
                            }
                        }
                        NodeKind::RestPattern { argument } => {
                            let argument = *argument;
                            self.destructure_assign(source, argument, current_fn);
                        }
                        _ => {}
                    }
                }
            }
            NodeKind::ArrayPattern { elements } => {
                for &el in elements.clone().iter() {
                    self.destructure_assign(source, el, current_fn);
                }
            }
            NodeKind::AssignPattern { target, default } => {
                let (target, default) = (*target, *default);
                let d = self.visit_expr(default, current_fn);
                self.destructure_assign(d, target, current_fn);
                self.destructure_assign(source, target, current_fn);
            }
            NodeKind::RestPattern { argument } => {
                let argument = *argument;
                self.destructure_assign(source, argument, current_fn);
            }
            _ => self.assign_into(source, pattern, current_fn),
        }
    }
}

fn is_statement(kind: &NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::ExprStmt { .. }
            | NodeKind::Block { .. }
            | NodeKind::VarDecl { .. }
            | NodeKind::Return { .. }
            | NodeKind::If { .. }
            | NodeKind::For { .. }
            | NodeKind::ForIn { .. }
            | NodeKind::While { .. }
            | NodeKind::DoWhile { .. }
            | NodeKind::Try { .. }
            | NodeKind::Catch { .. }
            | NodeKind::Switch { .. }
            | NodeKind::SwitchCase { .. }
            | NodeKind::Labeled { .. }
            | NodeKind::Throw { .. }
            | NodeKind::Import { .. }
            | NodeKind::ExportNamed { .. }
            | NodeKind::ExportDefault { .. }
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::binding::bind;
    use crate::features::decorate::decorate;
    use crate::features::parsing::parser::parse_file;

    fn flow(source: &str) -> (AnalysisCtx, FlowGraph) {
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
        (ctx, graph)
    }

    fn has_edge(g: &FlowGraph, from: &Vertex, to: &Vertex) -> bool {
        match (g.find(from), g.find(to)) {
            (Some(f), Some(t)) => g.succ(f).contains(&t),
            _ => false,
        }
    }

    #[test]
    fn test_function_declaration_flows_into_binding() {
        let (ctx, g) = flow("function f() {}");
        let f = ctx.functions[0];
        assert!(has_edge(&g, &Vertex::Func(f), &Vertex::Expr(f)));
        // toplevel declarations are globals
        assert!(has_edge(&g, &Vertex::Func(f), &Vertex::glob("f")));
    }

    #[test]
    fn test_property_write_is_field_based() {
        let (_, g) = flow("var o = {}; o.handler = function() {};");
        // some expression flows into Prop(handler)
        let prop = g.find(&Vertex::prop("handler")).expect("prop vertex");
        let incoming: Vec<_> = g
            .edges()
            .filter(|(_, t)| *t == prop)
            .collect();
        assert!(!incoming.is_empty());
    }

    #[test]
    fn test_property_read_conflates_by_name() {
        let (_, g) = flow("var x = a.run; var y = b.run;");
        let prop = g.find(&Vertex::prop("run")).expect("prop vertex");
        // both member expressions read from the same Prop vertex
        let outgoing = g.succ(prop);
        assert_eq!(outgoing.len(), 2);
    }

    #[test]
    fn test_call_edges() {
        let (ctx, g) = flow("function f() {} f(1);");
        let call = ctx.calls[0];
        let f = ctx.functions[0];
        // Func(f) -> Glob(f) -> Expr(callee) -> Callee(call)
        assert!(has_edge(&g, &Vertex::Func(f), &Vertex::glob("f")));
        let callee_slot = g.find(&Vertex::Callee(call)).expect("callee slot");
        let reaches_callee = g.edges().any(|(_, t)| t == callee_slot);
        assert!(reaches_callee);
        assert!(g.find(&Vertex::Arg(call, 0)).is_some());
        assert!(has_edge(&g, &Vertex::Res(call), &Vertex::Expr(call)));
    }

    #[test]
    fn test_return_flows_into_ret() {
        let (ctx, g) = flow("function f() { return g; } var g = 1;");
        let f = ctx.functions[0];
        let ret = g.find(&Vertex::Ret(f)).expect("ret vertex");
        assert!(g.edges().any(|(_, t)| t == ret));
    }

    #[test]
    fn test_arrow_expression_body_returns() {
        let (ctx, g) = flow("const id = x => x;");
        let f = ctx.functions[0];
        assert!(g.find(&Vertex::Ret(f)).is_some());
    }

    #[test]
    fn test_object_literal_property_flow() {
        let (ctx, g) = flow("var o = {run: function() {}};");
        let f = ctx.functions[0];
        // Func -> Expr(fn) -> Prop(run)
        assert!(has_edge(&g, &Vertex::Expr(f), &Vertex::prop("run")));
    }

    #[test]
    fn test_new_approximates_instance_by_constructor() {
        let (ctx, g) = flow("function C() {} var x = new C();");
        let call = ctx.calls[0];
        let callee = match ctx.ast.kind(call) {
            NodeKind::Call { callee, .. } => *callee,
            _ => unreachable!(),
        };
        assert!(has_edge(&g, &Vertex::Expr(callee), &Vertex::Expr(call)));
    }

    #[test]
    fn test_class_methods_in_prop_pool() {
        let (ctx, g) = flow("class C { constructor() {} run() {} } new C();");
        let ctor = ctx.functions[0];
        let run = ctx.functions[1];
        assert!(has_edge(&g, &Vertex::Func(ctor), &Vertex::prop("constructor")));
        assert!(has_edge(&g, &Vertex::Func(run), &Vertex::prop("run")));
    }

    #[test]
    fn test_destructuring_declaration_reads_props() {
        let (_, g) = flow("var {cb} = handlers; cb();");
        let prop = g.find(&Vertex::prop("cb")).expect("prop vertex");
        // Prop(cb) flows into the declared variable
        assert!(!g.succ(prop).is_empty());
    }

    #[test]
    fn test_logical_operands_flow_to_outer() {
        let (_, g) = flow("var f = a || b;");
        // both operand Expr vertices flow into the binary Expr
        let edges: Vec<_> = g.edges().collect();
        assert!(edges.len() > 2);
    }

    #[test]
    fn test_computed_member_untracked() {
        let (_, g) = flow("var x = obj[key];");
        // no Prop vertex for a computed access
        assert!(g.find(&Vertex::prop("key")).is_none());
    }
}
