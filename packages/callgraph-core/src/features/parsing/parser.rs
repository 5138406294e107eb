//! Tree-sitter JavaScript parser
//!
//! This is where the tree-sitter dependency lives. The raw CST is lowered
//! into the ESTree-shaped arena of [`super::ast`]; everything downstream is
//! independent of the grammar.
//!
//! Lowering is best-effort: constructs without dedicated flow rules become
//! [`NodeKind::Other`] with their children preserved as sub-expressions.

use tree_sitter::{Node as TsNode, Parser as TsParser, Tree};

use super::ast::{
    Ast, DeclKind, FileId, FunctionFlavor, ImportKind, MemberProp, MethodKind, NodeId, NodeKind,
    PropKey,
};
use crate::errors::{CallgraphError, Result};
use crate::shared::models::{ByteRange, Diagnostics, Span};

/// Parse JavaScript source into a tree-sitter CST
///
/// Safe to call from rayon workers; lowering happens separately so that
/// arena insertion order stays equal to the file-list order.
pub fn parse_syntax(source: &str) -> Option<Tree> {
    let mut parser = TsParser::new();
    let language = tree_sitter_javascript::LANGUAGE;
    parser
        .set_language(&language.into())
        .expect("JavaScript grammar is ABI-compatible");
    parser.parse(source, None)
}

/// Lower a parsed CST into the arena, returning the file's `Program` node
///
/// A CST containing syntax errors is rejected: the caller drops the file
/// and analysis continues with the rest of the input.
pub fn lower_tree(
    tree: &Tree,
    source: &str,
    path: &str,
    file: FileId,
    ast: &mut Ast,
    diags: &mut Diagnostics,
) -> Result<NodeId> {
    let root = tree.root_node();
    if root.has_error() {
        diags.warn_at(
            format!("failed to parse {}: syntax error", path),
            path,
            span_of(&first_error(root).unwrap_or(root)),
        );
        return Err(CallgraphError::parse(format!("syntax error in {}", path)));
    }

    let mut lowering = Lowering { source, file, ast };
    Ok(lowering.lower_program(root))
}

/// Parse and lower in one step
pub fn parse_file(
    source: &str,
    path: &str,
    file: FileId,
    ast: &mut Ast,
    diags: &mut Diagnostics,
) -> Result<NodeId> {
    let tree = parse_syntax(source)
        .ok_or_else(|| CallgraphError::parse(format!("parser returned no tree for {}", path)))?;
    lower_tree(&tree, source, path, file, ast, diags)
}

fn first_error(root: TsNode) -> Option<TsNode> {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            return Some(node);
        }
        for i in (0..node.child_count()).rev() {
            if let Some(child) = node.child(i) {
                if child.has_error() {
                    stack.push(child);
                }
            }
        }
    }
    None
}

fn span_of(node: &TsNode) -> Span {
    Span::new(
        node.start_position().row as u32 + 1,
        node.start_position().column as u32,
        node.end_position().row as u32 + 1,
        node.end_position().column as u32,
    )
}

fn range_of(node: &TsNode) -> ByteRange {
    ByteRange::new(node.start_byte() as u32, node.end_byte() as u32)
}

fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

struct Lowering<'a> {
    source: &'a str,
    file: FileId,
    ast: &'a mut Ast,
}

impl<'a> Lowering<'a> {
    fn text(&self, node: &TsNode) -> &'a str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    fn alloc(&mut self, kind: NodeKind, node: &TsNode) -> NodeId {
        self.ast.alloc(kind, span_of(node), range_of(node), self.file)
    }

    fn named_children<'t>(&self, node: &TsNode<'t>) -> Vec<TsNode<'t>> {
        let mut cursor = node.walk();
        let kids: Vec<TsNode<'t>> = node.named_children(&mut cursor).collect();
        kids.into_iter()
            .filter(|c| c.kind() != "comment" && c.kind() != "hash_bang_line")
            .collect()
    }

    fn has_token(&self, node: &TsNode, token: &str) -> bool {
        for i in 0..node.child_count() {
            if let Some(child) = node.child(i) {
                if child.kind() == token {
                    return true;
                }
            }
        }
        false
    }

    /// Decoded contents of a `string` node (quotes removed)
    fn string_value(&self, node: &TsNode) -> String {
        let mut out = String::new();
        for child in self.named_children(node) {
            match child.kind() {
                "string_fragment" => out.push_str(self.text(&child)),
                "escape_sequence" => {
                    let raw = self.text(&child);
                    match raw {
                        "\\n" => out.push('\n'),
                        "\\t" => out.push('\t'),
                        "\\\\" => out.push('\\'),
                        "\\'" => out.push('\''),
                        "\\\"" => out.push('"'),
                        other => out.push_str(other.trim_start_matches('\\')),
                    }
                }
                _ => {}
            }
        }
        out
    }

    // ── Program ──────────────────────────────────────────────────────────

    fn lower_program(&mut self, root: TsNode) -> NodeId {
        let body: Vec<NodeId> = self
            .named_children(&root)
            .into_iter()
            .map(|stmt| self.lower_stmt(&stmt))
            .collect();
        self.alloc(NodeKind::Program { body }, &root)
    }

    // ── Statements ───────────────────────────────────────────────────────

    fn lower_stmt(&mut self, node: &TsNode) -> NodeId {
        match node.kind() {
            "function_declaration" | "generator_function_declaration" => {
                self.lower_function(node, FunctionFlavor::Declaration)
            }
            "class_declaration" => self.lower_class(node, true),
            "variable_declaration" => self.lower_var_decl(node, DeclKind::Var),
            "lexical_declaration" => {
                let kind = if node.child(0).map(|c| c.kind()) == Some("const") {
                    DeclKind::Const
                } else {
                    DeclKind::Let
                };
                self.lower_var_decl(node, kind)
            }
            "expression_statement" => {
                let expr = match self.named_children(node).first() {
                    Some(inner) => self.lower_expr(inner),
                    None => self.alloc(NodeKind::Other { children: vec![] }, node),
                };
                self.alloc(NodeKind::ExprStmt { expr }, node)
            }
            "statement_block" => {
                let body = self
                    .named_children(node)
                    .into_iter()
                    .map(|s| self.lower_stmt(&s))
                    .collect();
                self.alloc(NodeKind::Block { body }, node)
            }
            "return_statement" => {
                let argument = self
                    .named_children(node)
                    .first()
                    .map(|e| self.lower_expr(e));
                self.alloc(NodeKind::Return { argument }, node)
            }
            "if_statement" => {
                let test = self.lower_field_expr(node, "condition");
                let consequent = self.lower_field_stmt(node, "consequence");
                let alternate = node
                    .child_by_field_name("alternative")
                    .map(|alt| match self.named_children(&alt).first() {
                        Some(stmt) => self.lower_stmt(stmt),
                        None => self.alloc(NodeKind::Other { children: vec![] }, &alt),
                    });
                self.alloc(
                    NodeKind::If {
                        test,
                        consequent,
                        alternate,
                    },
                    node,
                )
            }
            "for_statement" => {
                let init = node.child_by_field_name("initializer").and_then(|n| {
                    match n.kind() {
                        "empty_statement" => None,
                        "expression_statement" => {
                            self.named_children(&n).first().map(|e| self.lower_expr(e))
                        }
                        _ => Some(self.lower_stmt(&n)),
                    }
                });
                let test = node.child_by_field_name("condition").and_then(|n| {
                    match n.kind() {
                        "empty_statement" => None,
                        "expression_statement" => {
                            self.named_children(&n).first().map(|e| self.lower_expr(e))
                        }
                        _ => Some(self.lower_expr(&n)),
                    }
                });
                let update = node
                    .child_by_field_name("increment")
                    .map(|n| self.lower_expr(&n));
                let body = self.lower_field_stmt(node, "body");
                self.alloc(
                    NodeKind::For {
                        init,
                        test,
                        update,
                        body,
                    },
                    node,
                )
            }
            "for_in_statement" => {
                let decl_kind = node.child_by_field_name("kind").map(|k| {
                    match self.text(&k) {
                        "var" => DeclKind::Var,
                        "const" => DeclKind::Const,
                        _ => DeclKind::Let,
                    }
                });
                let left = match node.child_by_field_name("left") {
                    Some(l) if decl_kind.is_some() => self.lower_pattern(&l),
                    Some(l) => self.lower_expr(&l),
                    None => self.alloc(NodeKind::Other { children: vec![] }, node),
                };
                let right = self.lower_field_expr(node, "right");
                let body = self.lower_field_stmt(node, "body");
                let is_of = node
                    .child_by_field_name("operator")
                    .map(|op| self.text(&op) == "of")
                    .unwrap_or(false);
                self.alloc(
                    NodeKind::ForIn {
                        left,
                        decl_kind,
                        right,
                        body,
                        is_of,
                    },
                    node,
                )
            }
            "while_statement" => {
                let test = self.lower_field_expr(node, "condition");
                let body = self.lower_field_stmt(node, "body");
                self.alloc(NodeKind::While { test, body }, node)
            }
            "do_statement" => {
                let body = self.lower_field_stmt(node, "body");
                let test = self.lower_field_expr(node, "condition");
                self.alloc(NodeKind::DoWhile { body, test }, node)
            }
            "try_statement" => {
                let block = self.lower_field_stmt(node, "body");
                let handler = node
                    .child_by_field_name("handler")
                    .map(|h| self.lower_catch(&h));
                let finalizer = node.child_by_field_name("finalizer").and_then(|f| {
                    self.named_children(&f).first().map(|b| self.lower_stmt(b))
                });
                self.alloc(
                    NodeKind::Try {
                        block,
                        handler,
                        finalizer,
                    },
                    node,
                )
            }
            "switch_statement" => {
                let discriminant = self.lower_field_expr(node, "value");
                let mut cases = Vec::new();
                if let Some(body) = node.child_by_field_name("body") {
                    for case in self.named_children(&body) {
                        match case.kind() {
                            "switch_case" | "switch_default" => {
                                let test = case
                                    .child_by_field_name("value")
                                    .map(|v| self.lower_expr(&v));
                                let stmts = self
                                    .named_children(&case)
                                    .into_iter()
                                    .filter(|c| {
                                        Some(c.id())
                                            != case.child_by_field_name("value").map(|v| v.id())
                                    })
                                    .map(|s| self.lower_stmt(&s))
                                    .collect();
                                cases.push(self.alloc(
                                    NodeKind::SwitchCase { test, body: stmts },
                                    &case,
                                ));
                            }
                            _ => {}
                        }
                    }
                }
                self.alloc(
                    NodeKind::Switch {
                        discriminant,
                        cases,
                    },
                    node,
                )
            }
            "labeled_statement" => {
                let body = self.lower_field_stmt(node, "body");
                self.alloc(NodeKind::Labeled { body }, node)
            }
            "throw_statement" => {
                let argument = match self.named_children(node).first() {
                    Some(e) => self.lower_expr(e),
                    None => self.alloc(NodeKind::Other { children: vec![] }, node),
                };
                self.alloc(NodeKind::Throw { argument }, node)
            }
            "break_statement" | "continue_statement" | "empty_statement"
            | "debugger_statement" => self.alloc(NodeKind::Other { children: vec![] }, node),
            "import_statement" => self.lower_import(node),
            "export_statement" => self.lower_export(node),
            _ => self.lower_expr(node),
        }
    }

    fn lower_field_stmt(&mut self, node: &TsNode, field: &str) -> NodeId {
        match node.child_by_field_name(field) {
            Some(child) => self.lower_stmt(&child),
            None => self.alloc(NodeKind::Other { children: vec![] }, node),
        }
    }

    fn lower_field_expr(&mut self, node: &TsNode, field: &str) -> NodeId {
        match node.child_by_field_name(field) {
            Some(child) => self.lower_expr(&child),
            None => self.alloc(NodeKind::Other { children: vec![] }, node),
        }
    }

    fn lower_catch(&mut self, node: &TsNode) -> NodeId {
        let param = node
            .child_by_field_name("parameter")
            .map(|p| self.lower_pattern(&p));
        let body = self.lower_field_stmt(node, "body");
        self.alloc(NodeKind::Catch { param, body }, node)
    }

    fn lower_var_decl(&mut self, node: &TsNode, kind: DeclKind) -> NodeId {
        let declarators = self
            .named_children(node)
            .into_iter()
            .filter(|c| c.kind() == "variable_declarator")
            .map(|decl| {
                let pattern = match decl.child_by_field_name("name") {
                    Some(p) => self.lower_pattern(&p),
                    None => self.alloc(NodeKind::Other { children: vec![] }, &decl),
                };
                let init = decl
                    .child_by_field_name("value")
                    .map(|v| self.lower_expr(&v));
                self.alloc(NodeKind::Declarator { pattern, init }, &decl)
            })
            .collect();
        self.alloc(NodeKind::VarDecl { kind, declarators }, node)
    }

    // ── Functions and classes ────────────────────────────────────────────

    fn lower_function(&mut self, node: &TsNode, flavor: FunctionFlavor) -> NodeId {
        let name = node.child_by_field_name("name").map(|n| {
            let name = self.text(&n).to_string();
            self.alloc(NodeKind::Identifier { name }, &n)
        });
        let params = self.lower_params(node);
        let body = self.lower_field_stmt(node, "body");
        self.alloc(
            NodeKind::Function {
                name,
                params,
                body,
                flavor,
            },
            node,
        )
    }

    fn lower_arrow(&mut self, node: &TsNode) -> NodeId {
        let params = if let Some(single) = node.child_by_field_name("parameter") {
            vec![self.lower_pattern(&single)]
        } else {
            self.lower_params(node)
        };
        let (body, expression_body) = match node.child_by_field_name("body") {
            Some(b) if b.kind() == "statement_block" => (self.lower_stmt(&b), false),
            Some(b) => (self.lower_expr(&b), true),
            None => (
                self.alloc(NodeKind::Other { children: vec![] }, node),
                false,
            ),
        };
        self.alloc(
            NodeKind::Function {
                name: None,
                params,
                body,
                flavor: FunctionFlavor::Arrow { expression_body },
            },
            node,
        )
    }

    fn lower_params(&mut self, node: &TsNode) -> Vec<NodeId> {
        match node.child_by_field_name("parameters") {
            Some(params) => self
                .named_children(&params)
                .into_iter()
                .map(|p| self.lower_pattern(&p))
                .collect(),
            None => vec![],
        }
    }

    fn lower_class(&mut self, node: &TsNode, is_declaration: bool) -> NodeId {
        let name = node.child_by_field_name("name").map(|n| {
            let name = self.text(&n).to_string();
            self.alloc(NodeKind::Identifier { name }, &n)
        });
        let superclass = node
            .child_by_field_name("class_heritage")
            .or_else(|| {
                // grammar exposes `extends X` as a class_heritage child
                let mut found = None;
                for i in 0..node.child_count() {
                    if let Some(c) = node.child(i) {
                        if c.kind() == "class_heritage" {
                            found = Some(c);
                        }
                    }
                }
                found
            })
            .and_then(|h| self.named_children(&h).first().map(|e| self.lower_expr(e)));

        let mut members = Vec::new();
        if let Some(body) = node.child_by_field_name("body") {
            for member in self.named_children(&body) {
                match member.kind() {
                    "method_definition" => {
                        let is_static = self.has_token(&member, "static");
                        let key = self.lower_method_key(&member);
                        let value = self.lower_method_value(&member);
                        let kind = if self.has_token(&member, "get") {
                            MethodKind::Getter
                        } else if self.has_token(&member, "set") {
                            MethodKind::Setter
                        } else if !is_static && key.name() == Some("constructor") {
                            MethodKind::Constructor
                        } else {
                            MethodKind::Method
                        };
                        members.push(self.alloc(
                            NodeKind::MethodDef {
                                key,
                                value,
                                kind,
                                is_static,
                            },
                            &member,
                        ));
                    }
                    "field_definition" => {
                        let key = match member.child_by_field_name("property") {
                            Some(k) => self.lower_prop_key(&k),
                            None => PropKey::Computed(
                                self.alloc(NodeKind::Other { children: vec![] }, &member),
                            ),
                        };
                        let value = member
                            .child_by_field_name("value")
                            .map(|v| self.lower_expr(&v));
                        members
                            .push(self.alloc(NodeKind::FieldDef { key, value }, &member));
                    }
                    _ => {}
                }
            }
        }
        self.alloc(
            NodeKind::Class {
                name,
                superclass,
                members,
                is_declaration,
            },
            node,
        )
    }

    fn lower_method_key(&mut self, member: &TsNode) -> PropKey {
        match member.child_by_field_name("name") {
            Some(k) => self.lower_prop_key(&k),
            None => PropKey::Computed(self.alloc(NodeKind::Other { children: vec![] }, member)),
        }
    }

    fn lower_method_value(&mut self, member: &TsNode) -> NodeId {
        let params = self.lower_params(member);
        let body = self.lower_field_stmt(member, "body");
        self.alloc(
            NodeKind::Function {
                name: None,
                params,
                body,
                flavor: FunctionFlavor::Method,
            },
            member,
        )
    }

    fn lower_prop_key(&mut self, key: &TsNode) -> PropKey {
        match key.kind() {
            "property_identifier" | "shorthand_property_identifier"
            | "private_property_identifier" | "identifier" => {
                PropKey::Ident(self.text(key).to_string())
            }
            "string" => {
                let value = self.string_value(key);
                if is_valid_identifier(&value) {
                    PropKey::Ident(value)
                } else {
                    PropKey::Literal(value)
                }
            }
            "number" => PropKey::Literal(self.text(key).to_string()),
            "computed_property_name" => {
                let expr = match self.named_children(key).first() {
                    Some(e) => self.lower_expr(e),
                    None => self.alloc(NodeKind::Other { children: vec![] }, key),
                };
                PropKey::Computed(expr)
            }
            _ => {
                let expr = self.lower_expr(key);
                PropKey::Computed(expr)
            }
        }
    }

    // ── Expressions ──────────────────────────────────────────────────────

    fn lower_expr(&mut self, node: &TsNode) -> NodeId {
        match node.kind() {
            "identifier" | "statement_identifier" => {
                let name = self.text(node).to_string();
                self.alloc(NodeKind::Identifier { name }, node)
            }
            "this" => self.alloc(NodeKind::This, node),
            "super" => self.alloc(NodeKind::Super, node),
            "number" | "regex" | "true" | "false" | "null" | "undefined" => {
                self.alloc(NodeKind::Literal { string_value: None }, node)
            }
            "string" => {
                let value = self.string_value(node);
                self.alloc(
                    NodeKind::Literal {
                        string_value: Some(value),
                    },
                    node,
                )
            }
            "template_string" => {
                let parts = self
                    .named_children(node)
                    .into_iter()
                    .filter(|c| c.kind() == "template_substitution")
                    .filter_map(|sub| {
                        let inner = self.named_children(&sub).first().cloned();
                        inner.map(|e| self.lower_expr(&e))
                    })
                    .collect();
                self.alloc(NodeKind::TemplateLit { parts }, node)
            }
            "function_expression" | "function" | "generator_function" => {
                self.lower_function(node, FunctionFlavor::Expression)
            }
            "arrow_function" => self.lower_arrow(node),
            "class" => self.lower_class(node, false),
            "call_expression" => self.lower_call(node, false),
            "new_expression" => self.lower_call(node, true),
            "member_expression" => {
                let object = self.lower_field_expr(node, "object");
                let property = match node.child_by_field_name("property") {
                    Some(p) => MemberProp::Static(self.text(&p).to_string()),
                    None => MemberProp::Computed(
                        self.alloc(NodeKind::Other { children: vec![] }, node),
                    ),
                };
                self.alloc(NodeKind::Member { object, property }, node)
            }
            "subscript_expression" => {
                let object = self.lower_field_expr(node, "object");
                let index = self.lower_field_expr(node, "index");
                self.alloc(
                    NodeKind::Member {
                        object,
                        property: MemberProp::Computed(index),
                    },
                    node,
                )
            }
            "assignment_expression" | "augmented_assignment_expression" => {
                let compound = node.kind() == "augmented_assignment_expression";
                let target = match node.child_by_field_name("left") {
                    Some(l) if matches!(l.kind(), "object_pattern" | "array_pattern") => {
                        self.lower_pattern(&l)
                    }
                    Some(l) => self.lower_expr(&l),
                    None => self.alloc(NodeKind::Other { children: vec![] }, node),
                };
                let value = self.lower_field_expr(node, "right");
                self.alloc(
                    NodeKind::Assign {
                        target,
                        value,
                        compound,
                    },
                    node,
                )
            }
            "ternary_expression" => {
                let test = self.lower_field_expr(node, "condition");
                let consequent = self.lower_field_expr(node, "consequence");
                let alternate = self.lower_field_expr(node, "alternative");
                self.alloc(
                    NodeKind::Conditional {
                        test,
                        consequent,
                        alternate,
                    },
                    node,
                )
            }
            "binary_expression" => {
                let logical = node
                    .child_by_field_name("operator")
                    .map(|op| matches!(self.text(&op), "&&" | "||" | "??"))
                    .unwrap_or(false);
                let left = self.lower_field_expr(node, "left");
                let right = self.lower_field_expr(node, "right");
                self.alloc(
                    NodeKind::Binary {
                        left,
                        right,
                        logical,
                    },
                    node,
                )
            }
            "unary_expression" => {
                let argument = self.lower_field_expr(node, "argument");
                self.alloc(NodeKind::Unary { argument }, node)
            }
            "update_expression" => {
                let argument = self.lower_field_expr(node, "argument");
                self.alloc(NodeKind::Update { argument }, node)
            }
            "sequence_expression" => {
                let expressions = self
                    .named_children(node)
                    .into_iter()
                    .map(|e| self.lower_expr(&e))
                    .collect();
                self.alloc(NodeKind::Sequence { expressions }, node)
            }
            "parenthesized_expression" => match self.named_children(node).first() {
                Some(inner) => self.lower_expr(inner),
                None => self.alloc(NodeKind::Other { children: vec![] }, node),
            },
            "object" => {
                let props = self
                    .named_children(node)
                    .into_iter()
                    .map(|prop| self.lower_object_member(&prop))
                    .collect();
                self.alloc(NodeKind::ObjectLit { props }, node)
            }
            "array" => {
                let elements = self
                    .named_children(node)
                    .into_iter()
                    .map(|el| match el.kind() {
                        "spread_element" => {
                            let argument = match self.named_children(&el).first() {
                                Some(a) => self.lower_expr(a),
                                None => self.alloc(NodeKind::Other { children: vec![] }, &el),
                            };
                            self.alloc(NodeKind::Spread { argument }, &el)
                        }
                        _ => self.lower_expr(&el),
                    })
                    .collect();
                self.alloc(NodeKind::ArrayLit { elements }, node)
            }
            "spread_element" => {
                let argument = match self.named_children(node).first() {
                    Some(a) => self.lower_expr(a),
                    None => self.alloc(NodeKind::Other { children: vec![] }, node),
                };
                self.alloc(NodeKind::Spread { argument }, node)
            }
            "await_expression" => {
                let argument = match self.named_children(node).first() {
                    Some(a) => self.lower_expr(a),
                    None => self.alloc(NodeKind::Other { children: vec![] }, node),
                };
                self.alloc(NodeKind::Await { argument }, node)
            }
            "yield_expression" => {
                let argument = self.named_children(node).first().map(|a| self.lower_expr(a));
                self.alloc(NodeKind::Yield { argument }, node)
            }
            "statement_block" => self.lower_stmt(node),
            _ => {
                let children = self
                    .named_children(node)
                    .into_iter()
                    .map(|c| self.lower_expr(&c))
                    .collect();
                self.alloc(NodeKind::Other { children }, node)
            }
        }
    }

    fn lower_call(&mut self, node: &TsNode, is_new: bool) -> NodeId {
        // tagged templates parse as a call whose arguments slot is the
        // template itself; they are not call-sites for the analysis
        if let Some(template) = node.child_by_field_name("arguments") {
            if template.kind() == "template_string" {
                let tag = self.lower_field_expr(node, "function");
                let quasi = self.lower_expr(&template);
                return self.alloc(NodeKind::TaggedTemplate { tag, quasi }, node);
            }
        }

        let callee_field = if is_new { "constructor" } else { "function" };
        let callee = self.lower_field_expr(node, callee_field);
        let args = match node.child_by_field_name("arguments") {
            Some(args_node) if args_node.kind() == "arguments" => self
                .named_children(&args_node)
                .into_iter()
                .map(|arg| match arg.kind() {
                    "spread_element" => {
                        let argument = match self.named_children(&arg).first() {
                            Some(a) => self.lower_expr(a),
                            None => self.alloc(NodeKind::Other { children: vec![] }, &arg),
                        };
                        self.alloc(NodeKind::Spread { argument }, &arg)
                    }
                    _ => self.lower_expr(&arg),
                })
                .collect(),
            _ => vec![],
        };
        self.alloc(
            NodeKind::Call {
                callee,
                args,
                is_new,
            },
            node,
        )
    }

    fn lower_object_member(&mut self, prop: &TsNode) -> NodeId {
        match prop.kind() {
            "pair" => {
                let key = match prop.child_by_field_name("key") {
                    Some(k) => self.lower_prop_key(&k),
                    None => PropKey::Computed(
                        self.alloc(NodeKind::Other { children: vec![] }, prop),
                    ),
                };
                let value = self.lower_field_expr(prop, "value");
                self.alloc(NodeKind::Property { key, value }, prop)
            }
            "shorthand_property_identifier" => {
                let name = self.text(prop).to_string();
                let value = self.alloc(NodeKind::Identifier { name: name.clone() }, prop);
                self.alloc(
                    NodeKind::Property {
                        key: PropKey::Ident(name),
                        value,
                    },
                    prop,
                )
            }
            "method_definition" => {
                let key = self.lower_method_key(prop);
                let value = self.lower_method_value(prop);
                self.alloc(NodeKind::Property { key, value }, prop)
            }
            "spread_element" => {
                let argument = match self.named_children(prop).first() {
                    Some(a) => self.lower_expr(a),
                    None => self.alloc(NodeKind::Other { children: vec![] }, prop),
                };
                self.alloc(NodeKind::Spread { argument }, prop)
            }
            _ => self.lower_expr(prop),
        }
    }

    // ── Patterns ─────────────────────────────────────────────────────────

    fn lower_pattern(&mut self, node: &TsNode) -> NodeId {
        match node.kind() {
            "identifier" | "shorthand_property_identifier_pattern" => {
                let name = self.text(node).to_string();
                self.alloc(NodeKind::Identifier { name }, node)
            }
            "object_pattern" => {
                let props = self
                    .named_children(node)
                    .into_iter()
                    .map(|prop| self.lower_pattern_member(&prop))
                    .collect();
                self.alloc(NodeKind::ObjectPattern { props }, node)
            }
            "array_pattern" => {
                let elements = self
                    .named_children(node)
                    .into_iter()
                    .map(|el| self.lower_pattern(&el))
                    .collect();
                self.alloc(NodeKind::ArrayPattern { elements }, node)
            }
            "assignment_pattern" => {
                let target = match node.child_by_field_name("left") {
                    Some(l) => self.lower_pattern(&l),
                    None => self.alloc(NodeKind::Other { children: vec![] }, node),
                };
                let default = self.lower_field_expr(node, "right");
                self.alloc(NodeKind::AssignPattern { target, default }, node)
            }
            "rest_pattern" => {
                let argument = match self.named_children(node).first() {
                    Some(a) => self.lower_pattern(a),
                    None => self.alloc(NodeKind::Other { children: vec![] }, node),
                };
                self.alloc(NodeKind::RestPattern { argument }, node)
            }
            _ => self.lower_expr(node),
        }
    }

    fn lower_pattern_member(&mut self, prop: &TsNode) -> NodeId {
        match prop.kind() {
            "pair_pattern" => {
                let key = match prop.child_by_field_name("key") {
                    Some(k) => self.lower_prop_key(&k),
                    None => PropKey::Computed(
                        self.alloc(NodeKind::Other { children: vec![] }, prop),
                    ),
                };
                let value = match prop.child_by_field_name("value") {
                    Some(v) => self.lower_pattern(&v),
                    None => self.alloc(NodeKind::Other { children: vec![] }, prop),
                };
                self.alloc(NodeKind::PatternProp { key, value }, prop)
            }
            "shorthand_property_identifier_pattern" => {
                let name = self.text(prop).to_string();
                let value = self.alloc(NodeKind::Identifier { name: name.clone() }, prop);
                self.alloc(
                    NodeKind::PatternProp {
                        key: PropKey::Ident(name),
                        value,
                    },
                    prop,
                )
            }
            "object_assignment_pattern" => {
                let left = prop.child_by_field_name("left");
                let key = left
                    .as_ref()
                    .map(|l| PropKey::Ident(self.text(l).to_string()))
                    .unwrap_or_else(|| {
                        PropKey::Computed(
                            self.alloc(NodeKind::Other { children: vec![] }, prop),
                        )
                    });
                let target = match left {
                    Some(l) => self.lower_pattern(&l),
                    None => self.alloc(NodeKind::Other { children: vec![] }, prop),
                };
                let default = self.lower_field_expr(prop, "right");
                let value = self.alloc(NodeKind::AssignPattern { target, default }, prop);
                self.alloc(NodeKind::PatternProp { key, value }, prop)
            }
            "rest_pattern" => self.lower_pattern(prop),
            _ => self.lower_pattern(prop),
        }
    }

    // ── Modules ──────────────────────────────────────────────────────────

    fn lower_import(&mut self, node: &TsNode) -> NodeId {
        let source = node
            .child_by_field_name("source")
            .map(|s| self.string_value(&s))
            .unwrap_or_default();

        let mut specifiers = Vec::new();
        for clause in self.named_children(node) {
            if clause.kind() != "import_clause" {
                continue;
            }
            for spec in self.named_children(&clause) {
                match spec.kind() {
                    "identifier" => {
                        let name = self.text(&spec).to_string();
                        let local = self.alloc(NodeKind::Identifier { name }, &spec);
                        specifiers.push(self.alloc(
                            NodeKind::ImportSpec {
                                kind: ImportKind::Default,
                                local,
                            },
                            &spec,
                        ));
                    }
                    "namespace_import" => {
                        if let Some(id) = self.named_children(&spec).first().cloned() {
                            let name = self.text(&id).to_string();
                            let local = self.alloc(NodeKind::Identifier { name }, &id);
                            specifiers.push(self.alloc(
                                NodeKind::ImportSpec {
                                    kind: ImportKind::Namespace,
                                    local,
                                },
                                &spec,
                            ));
                        }
                    }
                    "named_imports" => {
                        for named in self.named_children(&spec) {
                            if named.kind() != "import_specifier" {
                                continue;
                            }
                            let imported_node = named.child_by_field_name("name");
                            let imported = imported_node
                                .as_ref()
                                .map(|n| self.text(n).to_string())
                                .unwrap_or_default();
                            let local_node =
                                named.child_by_field_name("alias").or(imported_node);
                            if let Some(l) = local_node {
                                let name = self.text(&l).to_string();
                                let local = self.alloc(NodeKind::Identifier { name }, &l);
                                specifiers.push(self.alloc(
                                    NodeKind::ImportSpec {
                                        kind: ImportKind::Named { imported },
                                        local,
                                    },
                                    &named,
                                ));
                            }
                        }
                    }
                    _ => {}
                }
            }
        }
        self.alloc(NodeKind::Import { specifiers, source }, node)
    }

    fn lower_export(&mut self, node: &TsNode) -> NodeId {
        let source = node
            .child_by_field_name("source")
            .map(|s| self.string_value(&s));

        if self.has_token(node, "default") {
            let declaration = if let Some(decl) = node.child_by_field_name("declaration") {
                self.lower_stmt(&decl)
            } else if let Some(value) = node.child_by_field_name("value") {
                self.lower_expr(&value)
            } else {
                self.alloc(NodeKind::Other { children: vec![] }, node)
            };
            return self.alloc(NodeKind::ExportDefault { declaration }, node);
        }

        let declaration = node
            .child_by_field_name("declaration")
            .map(|d| self.lower_stmt(&d));

        let mut specifiers = Vec::new();
        for clause in self.named_children(node) {
            if clause.kind() != "export_clause" {
                continue;
            }
            for spec in self.named_children(&clause) {
                if spec.kind() != "export_specifier" {
                    continue;
                }
                let name_node = spec.child_by_field_name("name");
                let exported = spec
                    .child_by_field_name("alias")
                    .or(name_node)
                    .map(|n| self.text(&n).to_string())
                    .unwrap_or_default();
                if let Some(n) = name_node {
                    let name = self.text(&n).to_string();
                    let local = self.alloc(NodeKind::Identifier { name }, &n);
                    specifiers.push((local, exported));
                }
            }
        }
        self.alloc(
            NodeKind::ExportNamed {
                declaration,
                specifiers,
                source,
            },
            node,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> (Ast, NodeId) {
        let mut ast = Ast::new();
        let mut diags = Diagnostics::new();
        let program =
            parse_file(source, "test.js", FileId(0), &mut ast, &mut diags).expect("parses");
        (ast, program)
    }

    fn find_functions(ast: &Ast, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        super::super::ast::walk(ast, root, &mut |id| {
            if ast.is_function(id) {
                out.push(id);
            }
        });
        out
    }

    #[test]
    fn test_parse_function_declaration() {
        let (ast, program) = parse("function foo(a, b) { return a; }");
        let funcs = find_functions(&ast, program);
        assert_eq!(funcs.len(), 1);
        match ast.kind(funcs[0]) {
            NodeKind::Function { name, params, .. } => {
                assert_eq!(ast.ident_name(name.unwrap()), Some("foo"));
                assert_eq!(params.len(), 2);
            }
            other => panic!("expected function, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_arrow_expression_body() {
        let (ast, program) = parse("const f = x => x + 1;");
        let funcs = find_functions(&ast, program);
        assert_eq!(funcs.len(), 1);
        match ast.kind(funcs[0]) {
            NodeKind::Function { flavor, params, .. } => {
                assert_eq!(
                    *flavor,
                    FunctionFlavor::Arrow {
                        expression_body: true
                    }
                );
                assert_eq!(params.len(), 1);
            }
            other => panic!("expected arrow, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_iife_unwraps_parens() {
        let (ast, program) = parse("(function() {})();");
        // find the call and check its callee is the function itself
        let mut found = false;
        super::super::ast::walk(&ast, program, &mut |id| {
            if let NodeKind::Call { callee, .. } = ast.kind(id) {
                assert!(ast.is_function(*callee));
                found = true;
            }
        });
        assert!(found);
    }

    #[test]
    fn test_parse_member_expression() {
        let (ast, program) = parse("a.b.c(1);");
        let mut props = Vec::new();
        super::super::ast::walk(&ast, program, &mut |id| {
            if let NodeKind::Member { property, .. } = ast.kind(id) {
                if let MemberProp::Static(name) = property {
                    props.push(name.clone());
                }
            }
        });
        props.sort();
        assert_eq!(props, vec!["b".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_parse_import_named() {
        let (ast, program) = parse(r#"import {k as local} from "./m";"#);
        let mut seen = false;
        super::super::ast::walk(&ast, program, &mut |id| {
            if let NodeKind::Import { specifiers, source } = ast.kind(id) {
                assert_eq!(source, "./m");
                assert_eq!(specifiers.len(), 1);
                match ast.kind(specifiers[0]) {
                    NodeKind::ImportSpec {
                        kind: ImportKind::Named { imported },
                        local,
                    } => {
                        assert_eq!(imported, "k");
                        assert_eq!(ast.ident_name(*local), Some("local"));
                    }
                    other => panic!("unexpected specifier {:?}", other),
                }
                seen = true;
            }
        });
        assert!(seen);
    }

    #[test]
    fn test_parse_export_default_expression() {
        let (ast, program) = parse("export default function() {};");
        let mut seen = false;
        super::super::ast::walk(&ast, program, &mut |id| {
            if let NodeKind::ExportDefault { declaration } = ast.kind(id) {
                assert!(ast.is_function(*declaration));
                seen = true;
            }
        });
        assert!(seen);
    }

    #[test]
    fn test_parse_class_methods() {
        let (ast, program) = parse("class C { constructor(x) {} run() {} }");
        let mut kinds = Vec::new();
        super::super::ast::walk(&ast, program, &mut |id| {
            if let NodeKind::MethodDef { kind, .. } = ast.kind(id) {
                kinds.push(*kind);
            }
        });
        assert_eq!(kinds, vec![MethodKind::Constructor, MethodKind::Method]);
    }

    #[test]
    fn test_parse_error_is_rejected() {
        let mut ast = Ast::new();
        let mut diags = Diagnostics::new();
        let result = parse_file("function ( {", "bad.js", FileId(0), &mut ast, &mut diags);
        assert!(result.is_err());
        assert_eq!(diags.warning_count(), 1);
    }

    #[test]
    fn test_parse_destructuring_params() {
        let (ast, program) = parse("function f({a, b = 1}, [c]) {}");
        let funcs = find_functions(&ast, program);
        match ast.kind(funcs[0]) {
            NodeKind::Function { params, .. } => {
                assert_eq!(params.len(), 2);
                assert!(matches!(ast.kind(params[0]), NodeKind::ObjectPattern { .. }));
                assert!(matches!(ast.kind(params[1]), NodeKind::ArrayPattern { .. }));
            }
            _ => unreachable!(),
        }
    }
}
