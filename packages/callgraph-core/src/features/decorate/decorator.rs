//! AST decoration pass
//!
//! Walks each file's program in pre-order, so registry order is a pure
//! function of the input file list. All attributes are write-once: nothing
//! here mutates after the pass completes.

use rustc_hash::FxHashMap;

use super::labels;
use crate::context::AnalysisCtx;
use crate::features::parsing::ast::{Ast, NodeId, NodeKind, PropKey};
use crate::shared::models::Diagnostics;

/// Context of a function passed directly as a call argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallbackCtx {
    /// the call or construction site
    pub call: NodeId,
    /// 0-based argument index
    pub arg_index: u32,
    /// number of function-typed arguments in the call
    pub fn_args_total: u32,
    /// 1-based position among function-typed arguments
    pub fn_position: u32,
}

/// Side tables written by the decorator
#[derive(Debug, Default)]
pub struct Decorations {
    /// function/call node → enclosing function node; absent means toplevel
    pub enclosing_fn: FxHashMap<NodeId, NodeId>,
    /// declared or synthesized function name
    pub fn_name: FxHashMap<NodeId, String>,
    /// callback classification for call-argument functions
    pub callback: FxHashMap<NodeId, CallbackCtx>,
    /// 1-based free-anonymous index, per enclosing function
    pub anon_index: FxHashMap<NodeId, u32>,
    /// memoized labels, filled by [`labels`] after the walk
    pub labels: FxHashMap<NodeId, String>,
}

impl Decorations {
    /// Enclosing function of a node, when it is not toplevel
    pub fn enclosing(&self, node: NodeId) -> Option<NodeId> {
        self.enclosing_fn.get(&node).copied()
    }
}

/// Naming context supplied by the parent construct
#[derive(Debug, Clone)]
enum NameHint {
    None,
    /// `x = fn`, `var x = fn`, `{x: fn}`, method `x`
    Name(String),
    /// direct argument of a call; totals precomputed by the call visit
    CallArg(CallbackCtx),
}

/// Run the decoration pass over every parsed file
pub fn decorate(ctx: &mut AnalysisCtx) {
    let AnalysisCtx {
        ast,
        files,
        functions,
        calls,
        decorations,
        diagnostics,
        ..
    } = ctx;

    let programs: Vec<NodeId> = files.iter().filter_map(|f| f.program).collect();
    let mut walker = Decorator {
        ast,
        functions,
        calls,
        dec: decorations,
        diags: diagnostics,
        anon_counters: FxHashMap::default(),
        toplevel_anon: 0,
    };
    for program in programs {
        // toplevel counter restarts per file so anonymous indices stay
        // stable when unrelated files are added or removed
        walker.toplevel_anon = 0;
        walker.visit(program, None, NameHint::None);
    }

    labels::compute_labels(ctx);
}

struct Decorator<'a> {
    ast: &'a Ast,
    functions: &'a mut Vec<NodeId>,
    calls: &'a mut Vec<NodeId>,
    dec: &'a mut Decorations,
    diags: &'a mut Diagnostics,
    /// free-anonymous counters keyed by enclosing function
    anon_counters: FxHashMap<NodeId, u32>,
    /// toplevel counter; fresh per file so indices stay stable when other
    /// files are added or removed
    toplevel_anon: u32,
}

impl<'a> Decorator<'a> {
    fn visit(&mut self, id: NodeId, enclosing: Option<NodeId>, hint: NameHint) {
        let ast = self.ast;
        match ast.kind(id) {
            NodeKind::Function { name, params, body, .. } => {
                let name = *name;
                let params = params.clone();
                let body = *body;
                self.enter_function(id, enclosing, name, hint);
                for param in params {
                    self.visit(param, Some(id), NameHint::None);
                }
                self.visit(body, Some(id), NameHint::None);
            }
            NodeKind::Call { callee, args, .. } => {
                let callee = *callee;
                let args = args.clone();
                self.calls.push(id);
                if let Some(f) = enclosing {
                    self.dec.enclosing_fn.insert(id, f);
                }
                self.visit(callee, enclosing, NameHint::None);

                let fn_args_total = args.iter().filter(|a| ast.is_function(**a)).count() as u32;
                let mut fn_position = 0u32;
                for (index, arg) in args.into_iter().enumerate() {
                    if ast.is_function(arg) {
                        fn_position += 1;
                        self.visit(
                            arg,
                            enclosing,
                            NameHint::CallArg(CallbackCtx {
                                call: id,
                                arg_index: index as u32,
                                fn_args_total,
                                fn_position,
                            }),
                        );
                    } else {
                        self.visit(arg, enclosing, NameHint::None);
                    }
                }
            }
            NodeKind::Assign { target, value, .. } => {
                let target = *target;
                let value = *value;
                self.visit(target, enclosing, NameHint::None);
                let hint = self.name_of_assign_target(target);
                self.visit(value, enclosing, hint);
            }
            NodeKind::Declarator { pattern, init } => {
                let pattern = *pattern;
                let init = *init;
                self.visit(pattern, enclosing, NameHint::None);
                if let Some(init) = init {
                    let hint = match ast.ident_name(pattern) {
                        Some(name) => NameHint::Name(name.to_string()),
                        None => NameHint::None,
                    };
                    self.visit(init, enclosing, hint);
                }
            }
            NodeKind::Property { key, value } => {
                let value = *value;
                let hint = self.name_of_prop_key(key, value);
                if let PropKey::Computed(k) = key {
                    let k = *k;
                    self.visit(k, enclosing, NameHint::None);
                }
                self.visit(value, enclosing, hint);
            }
            NodeKind::MethodDef { key, value, .. } => {
                let value = *value;
                let hint = self.name_of_prop_key(key, value);
                if let PropKey::Computed(k) = key {
                    let k = *k;
                    self.visit(k, enclosing, NameHint::None);
                }
                self.visit(value, enclosing, hint);
            }
            NodeKind::FieldDef {
                key,
                value: Some(value),
            } => {
                let value = *value;
                let hint = self.name_of_prop_key(key, value);
                if let PropKey::Computed(k) = key {
                    let k = *k;
                    self.visit(k, enclosing, NameHint::None);
                }
                self.visit(value, enclosing, hint);
            }
            _ => {
                for child in ast.children(id) {
                    self.visit(child, enclosing, NameHint::None);
                }
            }
        }
    }

    fn enter_function(
        &mut self,
        id: NodeId,
        enclosing: Option<NodeId>,
        declared: Option<NodeId>,
        hint: NameHint,
    ) {
        self.functions.push(id);
        if let Some(f) = enclosing {
            self.dec.enclosing_fn.insert(id, f);
        }

        // naming pipeline: declared name, then parent-supplied name,
        // then callback, then free-anonymous index
        if let Some(name_node) = declared {
            if let Some(name) = self.ast.ident_name(name_node) {
                self.dec.fn_name.insert(id, name.to_string());
                return;
            }
        }
        match hint {
            NameHint::Name(name) => {
                self.dec.fn_name.insert(id, name);
            }
            NameHint::CallArg(cb) => {
                self.dec.callback.insert(id, cb);
                let renderable = {
                    let callee = match self.ast.kind(cb.call) {
                        NodeKind::Call { callee, .. } => *callee,
                        _ => id,
                    };
                    labels::render_callee(self.ast, callee).is_some()
                };
                if !renderable {
                    self.assign_anon_index(id, enclosing);
                }
            }
            NameHint::None => {
                self.assign_anon_index(id, enclosing);
            }
        }
    }

    fn assign_anon_index(&mut self, id: NodeId, enclosing: Option<NodeId>) {
        let index = match enclosing {
            Some(f) => {
                let counter = self.anon_counters.entry(f).or_insert(0);
                *counter += 1;
                *counter
            }
            None => {
                self.toplevel_anon += 1;
                self.toplevel_anon
            }
        };
        self.dec.anon_index.insert(id, index);
    }

    fn name_of_assign_target(&self, target: NodeId) -> NameHint {
        match self.ast.kind(target) {
            NodeKind::Identifier { name } => NameHint::Name(name.clone()),
            NodeKind::Member { property, .. } => match property {
                crate::features::parsing::ast::MemberProp::Static(name) => {
                    NameHint::Name(name.clone())
                }
                _ => NameHint::None,
            },
            _ => NameHint::None,
        }
    }

    fn name_of_prop_key(&mut self, key: &PropKey, value: NodeId) -> NameHint {
        match key.name() {
            Some(name) => NameHint::Name(name.to_string()),
            None => {
                if self.ast.is_function(value) {
                    let msg = match key {
                        PropKey::Computed(_) => "computed method key, function stays anonymous",
                        _ => "non-identifier method key, function stays anonymous",
                    };
                    self.diags.warn(msg);
                }
                NameHint::None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::parsing::parser::parse_file;

    fn decorated(source: &str) -> AnalysisCtx {
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
        ctx
    }

    #[test]
    fn test_registries_in_preorder() {
        let ctx = decorated("function a() { b(); } function b() { function c() {} }");
        assert_eq!(ctx.functions.len(), 3);
        assert_eq!(ctx.calls.len(), 1);
        let names: Vec<_> = ctx
            .functions
            .iter()
            .map(|f| ctx.decorations.fn_name.get(f).cloned().unwrap())
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_declarator_names_function() {
        let ctx = decorated("const g = () => {};");
        assert_eq!(ctx.functions.len(), 1);
        assert_eq!(
            ctx.decorations.fn_name.get(&ctx.functions[0]).map(|s| s.as_str()),
            Some("g")
        );
    }

    #[test]
    fn test_member_assignment_names_function() {
        let ctx = decorated("exports.handler = function() {};");
        assert_eq!(
            ctx.decorations.fn_name.get(&ctx.functions[0]).map(|s| s.as_str()),
            Some("handler")
        );
    }

    #[test]
    fn test_callback_classification() {
        let ctx = decorated("registry(function() {}, 1, () => {});");
        assert_eq!(ctx.functions.len(), 2);
        let first = ctx.decorations.callback.get(&ctx.functions[0]).unwrap();
        let second = ctx.decorations.callback.get(&ctx.functions[1]).unwrap();
        assert_eq!(first.arg_index, 0);
        assert_eq!(first.fn_args_total, 2);
        assert_eq!(first.fn_position, 1);
        assert_eq!(second.arg_index, 2);
        assert_eq!(second.fn_position, 2);
    }

    #[test]
    fn test_anon_indices_contiguous() {
        let ctx = decorated("(function() {})(); (function() {})(); var x = [function() {}];");
        // two IIFEs and one array element: all free anonymous at toplevel
        let indices: Vec<u32> = ctx
            .functions
            .iter()
            .filter_map(|f| ctx.decorations.anon_index.get(f).copied())
            .collect();
        assert_eq!(indices, vec![1, 2, 3]);
    }

    #[test]
    fn test_computed_method_key_warns() {
        let ctx = decorated("var o = {[k()]: function() {}};");
        assert!(ctx.diagnostics.warning_count() >= 1);
        assert!(ctx.decorations.anon_index.contains_key(&ctx.functions[0]));
    }

    #[test]
    fn test_method_definition_named_by_key() {
        let ctx = decorated("var o = {run: function() {}}; class C { go() {} }");
        let names: Vec<_> = ctx
            .functions
            .iter()
            .map(|f| ctx.decorations.fn_name.get(f).cloned().unwrap())
            .collect();
        assert_eq!(names, vec!["run", "go"]);
    }
}
