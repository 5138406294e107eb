//! Lexical binding pass
//!
//! For each scope opener a fresh scope is populated by hoisting, then a
//! resolution walk attaches every identifier use to its declaration node
//! or marks it as a global reference. Toplevel `var` and function
//! declarations land in the shared global namespace (script semantics);
//! `let`/`const`/`class` and import bindings stay file-local.

use rustc_hash::FxHashMap;

use super::scope::{BindingTarget, ScopeId, ScopeKind, ScopeTree};
use crate::context::AnalysisCtx;
use crate::features::parsing::ast::{Ast, DeclKind, NodeId, NodeKind, PropKey};
use crate::shared::models::Diagnostics;

/// Outcome of resolving one identifier use
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// bound to a declaration node
    Local(NodeId),
    /// global (declared at toplevel, or undeclared anywhere)
    Global(String),
}

/// Side tables written by the binder
#[derive(Debug, Default)]
pub struct Bindings {
    /// identifier use node → resolution
    pub resolutions: FxHashMap<NodeId, Resolution>,
    /// declaration leaf node → where the binding actually lives; toplevel
    /// `var`/function declarations map to the global namespace
    pub decl_targets: FxHashMap<NodeId, Resolution>,
    /// function node → synthetic `this` declaration
    pub this_decls: FxHashMap<NodeId, NodeId>,
    /// function node → synthetic `arguments` declaration
    pub arguments_decls: FxHashMap<NodeId, NodeId>,
}

impl Bindings {
    pub fn resolve(&self, use_node: NodeId) -> Option<&Resolution> {
        self.resolutions.get(&use_node)
    }

    /// Binding target of a declaration leaf
    pub fn decl_target(&self, decl: NodeId) -> Resolution {
        self.decl_targets
            .get(&decl)
            .cloned()
            .unwrap_or(Resolution::Local(decl))
    }
}

/// Run the binding pass over every parsed file
pub fn bind(ctx: &mut AnalysisCtx) {
    // synthetic `this`/`arguments` declarations, one pair per function
    let functions = ctx.functions.clone();
    for f in functions {
        let this_decl = ctx.ast.alloc_synthetic(
            NodeKind::Identifier {
                name: "this".to_string(),
            },
            f,
        );
        let args_decl = ctx.ast.alloc_synthetic(
            NodeKind::Identifier {
                name: "arguments".to_string(),
            },
            f,
        );
        ctx.bindings.this_decls.insert(f, this_decl);
        ctx.bindings.arguments_decls.insert(f, args_decl);
    }

    let AnalysisCtx {
        ast,
        files,
        bindings,
        diagnostics,
        ..
    } = ctx;

    let mut scopes = ScopeTree::new();
    let mut binder = Binder {
        ast,
        bindings,
        diags: diagnostics,
        scopes: &mut scopes,
    };

    let programs: Vec<NodeId> = files.iter().filter_map(|f| f.program).collect();
    // first pass: toplevel var/function hoisting into the shared global
    // namespace, so cross-file references resolve regardless of file order
    for &program in &programs {
        binder.hoist_program_globals(program);
    }
    for &program in &programs {
        binder.bind_program(program);
    }
}

struct Binder<'a> {
    ast: &'a Ast,
    bindings: &'a mut Bindings,
    diags: &'a mut Diagnostics,
    scopes: &'a mut ScopeTree,
}

impl<'a> Binder<'a> {
    // ── Hoisting ─────────────────────────────────────────────────────────

    fn hoist_program_globals(&mut self, program: NodeId) {
        let ast = self.ast;
        let body = match ast.kind(program) {
            NodeKind::Program { body } => body.clone(),
            _ => return,
        };
        let mut leaves = Vec::new();
        for stmt in body {
            self.collect_var_leaves(stmt, &mut leaves);
        }
        for (name, node) in leaves {
            self.scopes.declare_global(&name);
            self.bindings
                .decl_targets
                .insert(node, Resolution::Global(name));
        }
    }

    /// Collect var-scoped declaration leaves (`var` declarators, function
    /// declaration names) without crossing into nested functions
    fn collect_var_leaves(&self, node: NodeId, out: &mut Vec<(String, NodeId)>) {
        let ast = self.ast;
        match ast.kind(node) {
            NodeKind::Function { .. } | NodeKind::Class { .. } => {
                // function declarations contribute their own name; their
                // bodies hoist separately
                if let NodeKind::Function {
                    name: Some(name),
                    flavor: crate::features::parsing::ast::FunctionFlavor::Declaration,
                    ..
                } = ast.kind(node)
                {
                    if let Some(n) = ast.ident_name(*name) {
                        out.push((n.to_string(), *name));
                    }
                }
            }
            NodeKind::VarDecl {
                kind: DeclKind::Var,
                declarators,
            } => {
                for &d in declarators {
                    if let NodeKind::Declarator { pattern, .. } = ast.kind(d) {
                        collect_pattern_leaves(ast, *pattern, out);
                    }
                }
            }
            NodeKind::ForIn {
                left,
                decl_kind: Some(DeclKind::Var),
                ..
            } => {
                collect_pattern_leaves(ast, *left, out);
                for child in ast.children(node) {
                    if child != *left {
                        self.collect_var_leaves(child, out);
                    }
                }
                return;
            }
            NodeKind::ExportNamed {
                declaration: Some(d),
                ..
            }
            | NodeKind::ExportDefault { declaration: d } => {
                self.collect_var_leaves(*d, out);
                return;
            }
            _ => {}
        }
        if !matches!(ast.kind(node), NodeKind::Function { .. }) {
            for child in ast.children(node) {
                self.collect_var_leaves(child, out);
            }
        }
    }

    /// Hoist var-scoped declarations of a function body into `scope`,
    /// binding names to their declaration nodes
    fn hoist_var_decls(&mut self, node: NodeId, scope: ScopeId) {
        let ast = self.ast;
        match ast.kind(node) {
            NodeKind::Function { name, flavor, .. } => {
                if let (
                    Some(name),
                    crate::features::parsing::ast::FunctionFlavor::Declaration,
                ) = (name, flavor)
                {
                    let name = *name;
                    if let Some(n) = ast.ident_name(name) {
                        self.scopes.declare(scope, n, BindingTarget::Decl(name));
                    }
                }
                // do not descend into the nested function body
            }
            NodeKind::VarDecl {
                kind: DeclKind::Var,
                declarators,
            } => {
                for &d in declarators.clone().iter() {
                    if let NodeKind::Declarator { pattern, .. } = ast.kind(d) {
                        self.declare_pattern(*pattern, scope, false);
                    }
                }
            }
            NodeKind::ForIn {
                left,
                decl_kind: Some(DeclKind::Var),
                right,
                body,
                ..
            } => {
                let (left, right, body) = (*left, *right, *body);
                self.declare_pattern(left, scope, false);
                self.hoist_var_decls(right, scope);
                self.hoist_var_decls(body, scope);
            }
            _ => {
                if !matches!(ast.kind(node), NodeKind::Function { .. }) {
                    for child in ast.children(node) {
                        self.hoist_var_decls(child, scope);
                    }
                }
            }
        }
    }

    /// Hoist lexical (`let`/`const`/`class`) declarations of the immediate
    /// statement list into `scope`
    fn hoist_lexical(&mut self, stmts: &[NodeId], scope: ScopeId) {
        let ast = self.ast;
        for &stmt in stmts {
            match ast.kind(stmt) {
                NodeKind::VarDecl {
                    kind: DeclKind::Let | DeclKind::Const,
                    declarators,
                } => {
                    for &d in declarators.clone().iter() {
                        if let NodeKind::Declarator { pattern, .. } = ast.kind(d) {
                            self.declare_pattern(*pattern, scope, true);
                        }
                    }
                }
                NodeKind::Class {
                    name: Some(name),
                    is_declaration: true,
                    ..
                } => {
                    let name = *name;
                    if let Some(n) = ast.ident_name(name) {
                        if !self.scopes.declare(scope, n, BindingTarget::Decl(name)) {
                            self.diags
                                .warn(format!("duplicate declaration of '{}'", n));
                        }
                    }
                }
                NodeKind::Import { specifiers, .. } => {
                    for &spec in specifiers.clone().iter() {
                        if let NodeKind::ImportSpec { local, .. } = ast.kind(spec) {
                            let local = *local;
                            if let Some(n) = ast.ident_name(local) {
                                self.scopes.declare(scope, n, BindingTarget::Decl(local));
                            }
                        }
                    }
                }
                NodeKind::ExportNamed {
                    declaration: Some(d),
                    ..
                }
                | NodeKind::ExportDefault { declaration: d } => {
                    self.hoist_lexical(&[*d], scope);
                }
                _ => {}
            }
        }
    }

    /// Declare every leaf identifier of a binding pattern
    fn declare_pattern(&mut self, pattern: NodeId, scope: ScopeId, warn_duplicates: bool) {
        let ast = self.ast;
        match ast.kind(pattern) {
            NodeKind::Identifier { name } => {
                let name = name.clone();
                if !self
                    .scopes
                    .declare(scope, &name, BindingTarget::Decl(pattern))
                    && warn_duplicates
                {
                    self.diags
                        .warn(format!("duplicate declaration of '{}'", name));
                }
            }
            NodeKind::ObjectPattern { props } => {
                for &p in props.clone().iter() {
                    match ast.kind(p) {
                        NodeKind::PatternProp { value, .. } => {
                            self.declare_pattern(*value, scope, warn_duplicates)
                        }
                        NodeKind::RestPattern { argument } => {
                            self.declare_pattern(*argument, scope, warn_duplicates)
                        }
                        _ => {}
                    }
                }
            }
            NodeKind::ArrayPattern { elements } => {
                for &el in elements.clone().iter() {
                    self.declare_pattern(el, scope, warn_duplicates);
                }
            }
            NodeKind::AssignPattern { target, .. } => {
                self.declare_pattern(*target, scope, warn_duplicates)
            }
            NodeKind::RestPattern { argument } => {
                self.declare_pattern(*argument, scope, warn_duplicates)
            }
            _ => {}
        }
    }

    // ── Resolution walk ──────────────────────────────────────────────────

    fn bind_program(&mut self, program: NodeId) {
        let body = match self.ast.kind(program) {
            NodeKind::Program { body } => body.clone(),
            _ => return,
        };
        // file-local scope for lexical bindings and imports; var/function
        // hoisting already went to the global namespace
        let module_scope = self.scopes.push(ScopeKind::Block, ScopeTree::GLOBAL);
        self.hoist_lexical(&body, module_scope);
        for stmt in body {
            self.walk(stmt, module_scope);
        }
    }

    fn walk(&mut self, id: NodeId, scope: ScopeId) {
        let ast = self.ast;
        match ast.kind(id) {
            NodeKind::Identifier { name } => {
                let name = name.clone();
                let resolution = match self.scopes.lookup(scope, &name) {
                    Some(BindingTarget::Decl(decl)) => Resolution::Local(decl),
                    Some(BindingTarget::Global) | None => Resolution::Global(name),
                };
                self.bindings.resolutions.insert(id, resolution);
            }
            NodeKind::Function { params, body, .. } => {
                let params = params.clone();
                let body = *body;
                self.bind_function(id, &params, body, scope);
            }
            NodeKind::Block { body } => {
                let body = body.clone();
                let block = self.scopes.push(ScopeKind::Block, scope);
                self.hoist_lexical(&body, block);
                for stmt in body {
                    self.walk(stmt, block);
                }
            }
            NodeKind::VarDecl { declarators, .. } => {
                for &d in declarators.clone().iter() {
                    let (pattern, init) = match ast.kind(d) {
                        NodeKind::Declarator { pattern, init } => (*pattern, *init),
                        _ => continue,
                    };
                    self.walk_pattern_defaults(pattern, scope);
                    if let Some(init) = init {
                        self.walk(init, scope);
                    }
                }
            }
            NodeKind::Assign { target, value, .. } => {
                let (target, value) = (*target, *value);
                match ast.kind(target) {
                    // assignment destructuring targets are uses
                    NodeKind::ObjectPattern { .. } | NodeKind::ArrayPattern { .. } => {
                        self.walk_assign_pattern(target, scope)
                    }
                    _ => self.walk(target, scope),
                }
                self.walk(value, scope);
            }
            NodeKind::For {
                init,
                test,
                update,
                body,
            } => {
                let (init, test, update, body) = (*init, *test, *update, *body);
                let for_scope = self.scopes.push(ScopeKind::Block, scope);
                if let Some(init) = init {
                    self.hoist_lexical(&[init], for_scope);
                    self.walk(init, for_scope);
                }
                if let Some(test) = test {
                    self.walk(test, for_scope);
                }
                if let Some(update) = update {
                    self.walk(update, for_scope);
                }
                self.walk(body, for_scope);
            }
            NodeKind::ForIn {
                left,
                decl_kind,
                right,
                body,
                ..
            } => {
                let (left, decl_kind, right, body) = (*left, *decl_kind, *right, *body);
                let for_scope = self.scopes.push(ScopeKind::Block, scope);
                match decl_kind {
                    Some(DeclKind::Let) | Some(DeclKind::Const) => {
                        self.declare_pattern(left, for_scope, true);
                        self.walk_pattern_defaults(left, for_scope);
                    }
                    Some(DeclKind::Var) => {
                        // already hoisted into the function scope
                        self.walk_pattern_defaults(left, for_scope);
                    }
                    None => self.walk_assign_pattern(left, for_scope),
                }
                self.walk(right, for_scope);
                self.walk(body, for_scope);
            }
            NodeKind::Catch { param, body } => {
                let (param, body) = (*param, *body);
                let catch_scope = self.scopes.push(ScopeKind::Catch, scope);
                if let Some(param) = param {
                    self.declare_pattern(param, catch_scope, false);
                    self.walk_pattern_defaults(param, catch_scope);
                }
                self.walk(body, catch_scope);
            }
            NodeKind::Switch {
                discriminant,
                cases,
            } => {
                let (discriminant, cases) = (*discriminant, cases.clone());
                self.walk(discriminant, scope);
                // one block scope spans all cases
                let switch_scope = self.scopes.push(ScopeKind::Block, scope);
                for &case in &cases {
                    if let NodeKind::SwitchCase { body, .. } = ast.kind(case) {
                        self.hoist_lexical(&body.clone(), switch_scope);
                    }
                }
                for case in cases {
                    if let NodeKind::SwitchCase { test, body } = ast.kind(case) {
                        let (test, body) = (*test, body.clone());
                        if let Some(test) = test {
                            self.walk(test, switch_scope);
                        }
                        for stmt in body {
                            self.walk(stmt, switch_scope);
                        }
                    }
                }
            }
            NodeKind::Class {
                superclass,
                members,
                ..
            } => {
                let (superclass, members) = (*superclass, members.clone());
                if let Some(s) = superclass {
                    self.walk(s, scope);
                }
                for member in members {
                    match ast.kind(member) {
                        NodeKind::MethodDef { key, value, .. }
                        | NodeKind::Property { key, value } => {
                            let value = *value;
                            if let PropKey::Computed(k) = key {
                                let k = *k;
                                self.walk(k, scope);
                            }
                            self.walk(value, scope);
                        }
                        NodeKind::FieldDef { key, value } => {
                            let value = *value;
                            if let PropKey::Computed(k) = key {
                                let k = *k;
                                self.walk(k, scope);
                            }
                            if let Some(v) = value {
                                self.walk(v, scope);
                            }
                        }
                        _ => {}
                    }
                }
            }
            NodeKind::Import { .. } => {
                // import locals are declarations, nothing to resolve
            }
            NodeKind::ExportNamed {
                declaration,
                specifiers,
                ..
            } => {
                let (declaration, specifiers) = (*declaration, specifiers.clone());
                if let Some(d) = declaration {
                    self.walk(d, scope);
                }
                for (local, _) in specifiers {
                    self.walk(local, scope);
                }
            }
            _ => {
                for child in ast.children(id) {
                    self.walk(child, scope);
                }
            }
        }
    }

    fn bind_function(&mut self, f: NodeId, params: &[NodeId], body: NodeId, outer: ScopeId) {
        let ast = self.ast;
        let fn_scope = self.scopes.push(ScopeKind::Function, outer);

        // named function expressions can call themselves by name
        if let NodeKind::Function {
            name: Some(name),
            flavor: crate::features::parsing::ast::FunctionFlavor::Expression,
            ..
        } = ast.kind(f)
        {
            let name = *name;
            if let Some(n) = ast.ident_name(name) {
                self.scopes.declare(fn_scope, n, BindingTarget::Decl(name));
            }
        }

        if let Some(&this_decl) = self.bindings.this_decls.get(&f) {
            self.scopes
                .declare(fn_scope, "this", BindingTarget::Decl(this_decl));
        }
        if let Some(&args_decl) = self.bindings.arguments_decls.get(&f) {
            self.scopes
                .declare(fn_scope, "arguments", BindingTarget::Decl(args_decl));
        }
        for &param in params {
            self.declare_pattern(param, fn_scope, false);
        }
        self.hoist_var_decls(body, fn_scope);
        for &param in params {
            self.walk_pattern_defaults(param, fn_scope);
        }

        match ast.kind(body) {
            NodeKind::Block { body } => {
                let stmts = body.clone();
                self.hoist_lexical(&stmts, fn_scope);
                for stmt in stmts {
                    self.walk(stmt, fn_scope);
                }
            }
            _ => self.walk(body, fn_scope),
        }
    }

    /// Resolve default values and computed keys inside a binding pattern
    fn walk_pattern_defaults(&mut self, pattern: NodeId, scope: ScopeId) {
        let ast = self.ast;
        match ast.kind(pattern) {
            NodeKind::AssignPattern { target, default } => {
                let (target, default) = (*target, *default);
                self.walk(default, scope);
                self.walk_pattern_defaults(target, scope);
            }
            NodeKind::ObjectPattern { props } => {
                for &p in props.clone().iter() {
                    match ast.kind(p) {
                        NodeKind::PatternProp { key, value } => {
                            let value = *value;
                            if let PropKey::Computed(k) = key {
                                let k = *k;
                                self.walk(k, scope);
                            }
                            self.walk_pattern_defaults(value, scope);
                        }
                        NodeKind::RestPattern { argument } => {
                            self.walk_pattern_defaults(*argument, scope)
                        }
                        _ => {}
                    }
                }
            }
            NodeKind::ArrayPattern { elements } => {
                for &el in elements.clone().iter() {
                    self.walk_pattern_defaults(el, scope);
                }
            }
            NodeKind::RestPattern { argument } => self.walk_pattern_defaults(*argument, scope),
            _ => {}
        }
    }

    /// Resolve identifiers of an assignment-destructuring target as uses
    fn walk_assign_pattern(&mut self, pattern: NodeId, scope: ScopeId) {
        let ast = self.ast;
        match ast.kind(pattern) {
            NodeKind::Identifier { .. } => self.walk(pattern, scope),
            NodeKind::ObjectPattern { props } => {
                for &p in props.clone().iter() {
                    match ast.kind(p) {
                        NodeKind::PatternProp { key, value } => {
                            let value = *value;
                            if let PropKey::Computed(k) = key {
                                let k = *k;
                                self.walk(k, scope);
                            }
                            self.walk_assign_pattern(value, scope);
                        }
                        NodeKind::RestPattern { argument } => {
                            self.walk_assign_pattern(*argument, scope)
                        }
                        _ => {}
                    }
                }
            }
            NodeKind::ArrayPattern { elements } => {
                for &el in elements.clone().iter() {
                    self.walk_assign_pattern(el, scope);
                }
            }
            NodeKind::AssignPattern { target, default } => {
                let (target, default) = (*target, *default);
                self.walk(default, scope);
                self.walk_assign_pattern(target, scope);
            }
            NodeKind::RestPattern { argument } => self.walk_assign_pattern(*argument, scope),
            _ => self.walk(pattern, scope),
        }
    }
}

fn collect_pattern_leaves(ast: &Ast, pattern: NodeId, out: &mut Vec<(String, NodeId)>) {
    match ast.kind(pattern) {
        NodeKind::Identifier { name } => out.push((name.clone(), pattern)),
        NodeKind::ObjectPattern { props } => {
            for &p in props {
                match ast.kind(p) {
                    NodeKind::PatternProp { value, .. } => {
                        collect_pattern_leaves(ast, *value, out)
                    }
                    NodeKind::RestPattern { argument } => {
                        collect_pattern_leaves(ast, *argument, out)
                    }
                    _ => {}
                }
            }
        }
        NodeKind::ArrayPattern { elements } => {
            for &el in elements {
                collect_pattern_leaves(ast, el, out);
            }
        }
        NodeKind::AssignPattern { target, .. } => collect_pattern_leaves(ast, *target, out),
        NodeKind::RestPattern { argument } => collect_pattern_leaves(ast, *argument, out),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::decorate::decorate;
    use crate::features::parsing::ast::walk as walk_ast;
    use crate::features::parsing::parser::parse_file;

    fn bound(source: &str) -> AnalysisCtx {
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
        ctx
    }

    /// resolution of the identifier use named `name`
    fn resolution_of(ctx: &AnalysisCtx, name: &str) -> Vec<Resolution> {
        let mut out = Vec::new();
        for file in &ctx.files {
            if let Some(program) = file.program {
                walk_ast(&ctx.ast, program, &mut |id| {
                    if ctx.ast.ident_name(id) == Some(name) {
                        if let Some(r) = ctx.bindings.resolve(id) {
                            out.push(r.clone());
                        }
                    }
                });
            }
        }
        out
    }

    #[test]
    fn test_parameter_resolves_locally() {
        let ctx = bound("function f(x) { return x; }");
        let res = resolution_of(&ctx, "x");
        assert_eq!(res.len(), 1);
        assert!(matches!(res[0], Resolution::Local(_)));
    }

    #[test]
    fn test_toplevel_var_is_global() {
        let ctx = bound("var x = 1; x;");
        let res = resolution_of(&ctx, "x");
        assert!(res.iter().all(|r| *r == Resolution::Global("x".to_string())));
    }

    #[test]
    fn test_toplevel_const_is_local() {
        let ctx = bound("const x = 1; x;");
        let res = resolution_of(&ctx, "x");
        assert_eq!(res.len(), 1);
        assert!(matches!(res[0], Resolution::Local(_)));
    }

    #[test]
    fn test_undeclared_is_global() {
        let ctx = bound("frobnicate();");
        let res = resolution_of(&ctx, "frobnicate");
        assert_eq!(res, vec![Resolution::Global("frobnicate".to_string())]);
    }

    #[test]
    fn test_let_shadowing_in_block() {
        let ctx = bound("function f() { let x = 1; { let x = 2; x; } }");
        let res = resolution_of(&ctx, "x");
        // two uses resolved: the two initial walks don't resolve decl
        // nodes, only the read; the read resolves to the inner decl
        assert_eq!(res.len(), 1);
        assert!(matches!(res[0], Resolution::Local(_)));
    }

    #[test]
    fn test_duplicate_let_warns_first_wins() {
        let ctx = bound("function f() { let x = 1; let x = 2; }");
        assert!(ctx.diagnostics.warning_count() >= 1);
    }

    #[test]
    fn test_catch_binding() {
        let ctx = bound("try {} catch (e) { e; }");
        let res = resolution_of(&ctx, "e");
        assert_eq!(res.len(), 1);
        assert!(matches!(res[0], Resolution::Local(_)));
    }

    #[test]
    fn test_var_hoisted_from_nested_block() {
        let ctx = bound("function f() { if (c) { var y = 1; } return y; }");
        let res = resolution_of(&ctx, "y");
        assert_eq!(res.len(), 1);
        assert!(matches!(res[0], Resolution::Local(_)));
    }

    #[test]
    fn test_arguments_resolves_to_synthetic_decl() {
        let ctx = bound("function f() { return arguments; }");
        let res = resolution_of(&ctx, "arguments");
        assert_eq!(res.len(), 1);
        let f = ctx.functions[0];
        let expected = ctx.bindings.arguments_decls[&f];
        assert_eq!(res[0], Resolution::Local(expected));
    }

    #[test]
    fn test_named_function_expression_self_reference() {
        let ctx = bound("var g = function rec() { return rec; };");
        let res = resolution_of(&ctx, "rec");
        assert_eq!(res.len(), 1);
        assert!(matches!(res[0], Resolution::Local(_)));
    }

    #[test]
    fn test_destructuring_param_binding() {
        let ctx = bound("function f({a, b: c}) { return c; }");
        let res = resolution_of(&ctx, "c");
        assert_eq!(res.len(), 1);
        assert!(matches!(res[0], Resolution::Local(_)));
    }

    #[test]
    fn test_cross_file_global_function() {
        let mut ctx = AnalysisCtx::new();
        let f1 = ctx.add_file("a.js".to_string());
        let p1 = parse_file(
            "function shared() {}",
            "a.js",
            f1,
            &mut ctx.ast,
            &mut ctx.diagnostics,
        )
        .unwrap();
        ctx.files[0].program = Some(p1);
        let f2 = ctx.add_file("b.js".to_string());
        let p2 = parse_file("shared();", "b.js", f2, &mut ctx.ast, &mut ctx.diagnostics).unwrap();
        ctx.files[1].program = Some(p2);
        decorate(&mut ctx);
        bind(&mut ctx);

        let res = resolution_of(&ctx, "shared");
        assert!(res
            .iter()
            .any(|r| *r == Resolution::Global("shared".to_string())));
    }
}
