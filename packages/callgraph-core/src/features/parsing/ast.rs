//! Owned, arena-backed AST
//!
//! The parser lowers tree-sitter CSTs into this ESTree-shaped arena. Nodes
//! are addressed by `NodeId`; all downstream passes key their side tables
//! on it. The arena is append-only: synthetic nodes (pseudo call-sites,
//! `this`/`arguments` declarations) are minted by later passes without
//! disturbing existing ids.

use crate::shared::models::{ByteRange, Span};

/// Index of a source file in the analysis context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(pub u32);

/// Index of a node in the AST arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// How a function literal appears in the source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionFlavor {
    /// `function f() {}` statement
    Declaration,
    /// `function () {}` / named function expression
    Expression,
    /// `() => {}`; `expression_body` marks a braceless implicit return
    Arrow { expression_body: bool },
    /// class or object-literal method body
    Method,
}

/// `var` / `let` / `const`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Var,
    Let,
    Const,
}

/// Non-computed vs computed member access
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberProp {
    /// `obj.name`
    Static(String),
    /// `obj[expr]` — untracked by the field-based abstraction
    Computed(NodeId),
}

/// Property key in object literals, patterns, classes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropKey {
    /// identifier key, or a literal key that is a valid identifier
    Ident(String),
    /// string/number literal key that is not a valid identifier
    Literal(String),
    /// `[expr]:` — untracked
    Computed(NodeId),
}

impl PropKey {
    /// Property name usable by the field-based abstraction, if any
    pub fn name(&self) -> Option<&str> {
        match self {
            PropKey::Ident(s) | PropKey::Literal(s) => Some(s.as_str()),
            PropKey::Computed(_) => None,
        }
    }
}

/// Kind of an import binding
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportKind {
    /// `import x from "m"`
    Default,
    /// `import * as x from "m"`
    Namespace,
    /// `import {name} from "m"` / `import {name as x} from "m"`
    Named { imported: String },
}

/// Method role inside a class body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    Constructor,
    Method,
    Getter,
    Setter,
}

/// ESTree-shaped node payload
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// One per file; body in source order
    Program { body: Vec<NodeId> },

    // ── Functions and classes ────────────────────────────────────────────
    Function {
        /// declared name (identifier node), if any
        name: Option<NodeId>,
        /// parameter pattern roots
        params: Vec<NodeId>,
        /// statement block, or the body expression for expression arrows
        body: NodeId,
        flavor: FunctionFlavor,
    },
    Class {
        name: Option<NodeId>,
        superclass: Option<NodeId>,
        /// `MethodDef` and `FieldDef` members
        members: Vec<NodeId>,
        /// true for `class C {}` statements
        is_declaration: bool,
    },
    MethodDef {
        key: PropKey,
        /// the method function node
        value: NodeId,
        kind: MethodKind,
        is_static: bool,
    },
    FieldDef {
        key: PropKey,
        value: Option<NodeId>,
    },

    // ── Expressions ──────────────────────────────────────────────────────
    Identifier { name: String },
    This,
    Super,
    Literal {
        /// string literal contents, when the literal is a string
        string_value: Option<String>,
    },
    TemplateLit { parts: Vec<NodeId> },
    TaggedTemplate { tag: NodeId, quasi: NodeId },
    ArrayLit { elements: Vec<NodeId> },
    ObjectLit { props: Vec<NodeId> },
    /// object-literal property (`k: v`, shorthand, or a method)
    Property {
        key: PropKey,
        value: NodeId,
    },
    Spread { argument: NodeId },
    Member {
        object: NodeId,
        property: MemberProp,
    },
    Call {
        callee: NodeId,
        args: Vec<NodeId>,
        is_new: bool,
    },
    Assign {
        target: NodeId,
        value: NodeId,
        /// `+=` and friends; treated as plain assignment for flow
        compound: bool,
    },
    Conditional {
        test: NodeId,
        consequent: NodeId,
        alternate: NodeId,
    },
    /// binary and relational operators; `logical` marks `&&`/`||`/`??`,
    /// whose value is one of the operands
    Binary {
        left: NodeId,
        right: NodeId,
        logical: bool,
    },
    Unary { argument: NodeId },
    Update { argument: NodeId },
    Sequence { expressions: Vec<NodeId> },
    Await { argument: NodeId },
    Yield { argument: Option<NodeId> },

    // ── Patterns ─────────────────────────────────────────────────────────
    ObjectPattern { props: Vec<NodeId> },
    /// object-pattern property (`{k: target}`, shorthand)
    PatternProp {
        key: PropKey,
        value: NodeId,
    },
    ArrayPattern { elements: Vec<NodeId> },
    /// `target = default` inside a pattern or parameter list
    AssignPattern {
        target: NodeId,
        default: NodeId,
    },
    RestPattern { argument: NodeId },

    // ── Statements ───────────────────────────────────────────────────────
    ExprStmt { expr: NodeId },
    Block { body: Vec<NodeId> },
    VarDecl {
        kind: DeclKind,
        declarators: Vec<NodeId>,
    },
    Declarator {
        pattern: NodeId,
        init: Option<NodeId>,
    },
    Return { argument: Option<NodeId> },
    If {
        test: NodeId,
        consequent: NodeId,
        alternate: Option<NodeId>,
    },
    For {
        init: Option<NodeId>,
        test: Option<NodeId>,
        update: Option<NodeId>,
        body: NodeId,
    },
    ForIn {
        /// declaration or assignment target
        left: NodeId,
        /// present when `left` is a fresh `var`/`let`/`const` binding
        decl_kind: Option<DeclKind>,
        right: NodeId,
        body: NodeId,
        is_of: bool,
    },
    While { test: NodeId, body: NodeId },
    DoWhile { body: NodeId, test: NodeId },
    Try {
        block: NodeId,
        handler: Option<NodeId>,
        finalizer: Option<NodeId>,
    },
    Catch {
        param: Option<NodeId>,
        body: NodeId,
    },
    Switch {
        discriminant: NodeId,
        cases: Vec<NodeId>,
    },
    SwitchCase {
        test: Option<NodeId>,
        body: Vec<NodeId>,
    },
    Labeled { body: NodeId },
    Throw { argument: NodeId },

    // ── Modules ──────────────────────────────────────────────────────────
    Import {
        specifiers: Vec<NodeId>,
        source: String,
    },
    /// one imported binding; `local` is the identifier declaration node
    ImportSpec {
        kind: ImportKind,
        local: NodeId,
    },
    ExportNamed {
        /// `export function f() {}` / `export const x = …`
        declaration: Option<NodeId>,
        /// `(local identifier use, exported name)` pairs
        specifiers: Vec<(NodeId, String)>,
        /// re-export source module, if any
        source: Option<String>,
    },
    ExportDefault { declaration: NodeId },

    // ── Fallback ─────────────────────────────────────────────────────────
    /// construct without dedicated flow rules; children are evaluated as
    /// sub-expressions
    Other { children: Vec<NodeId> },
}

/// One AST node: payload plus source attribution
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
    pub range: ByteRange,
    pub file: FileId,
}

/// Append-only node arena for the whole program
#[derive(Debug, Default)]
pub struct Ast {
    nodes: Vec<Node>,
}

impl Ast {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a node, returning its id
    pub fn alloc(&mut self, kind: NodeKind, span: Span, range: ByteRange, file: FileId) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind,
            span,
            range,
            file,
        });
        id
    }

    /// Mint a synthetic node carrying another node's source attribution
    pub fn alloc_synthetic(&mut self, kind: NodeKind, like: NodeId) -> NodeId {
        let (span, range, file) = {
            let n = self.node(like);
            (n.span, n.range, n.file)
        };
        self.alloc(kind, span, range, file)
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    #[inline]
    pub fn span(&self, id: NodeId) -> Span {
        self.nodes[id.index()].span
    }

    #[inline]
    pub fn range(&self, id: NodeId) -> ByteRange {
        self.nodes[id.index()].range
    }

    #[inline]
    pub fn file(&self, id: NodeId) -> FileId {
        self.nodes[id.index()].file
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Identifier name, when `id` is an identifier node
    pub fn ident_name(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Identifier { name } => Some(name.as_str()),
            _ => None,
        }
    }

    /// True for function literals of any flavor
    pub fn is_function(&self, id: NodeId) -> bool {
        matches!(self.kind(id), NodeKind::Function { .. })
    }

    /// Direct children in source order, for generic pre-order walks
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        match self.kind(id) {
            NodeKind::Program { body } | NodeKind::Block { body } => out.extend(body),
            NodeKind::Function { name, params, body, .. } => {
                out.extend(name.iter());
                out.extend(params);
                out.push(*body);
            }
            NodeKind::Class {
                name,
                superclass,
                members,
                ..
            } => {
                out.extend(name.iter());
                out.extend(superclass.iter());
                out.extend(members);
            }
            NodeKind::MethodDef { key, value, .. } => {
                if let PropKey::Computed(k) = key {
                    out.push(*k);
                }
                out.push(*value);
            }
            NodeKind::FieldDef { key, value } => {
                if let PropKey::Computed(k) = key {
                    out.push(*k);
                }
                out.extend(value.iter());
            }
            NodeKind::Identifier { .. }
            | NodeKind::This
            | NodeKind::Super
            | NodeKind::Literal { .. } => {}
            NodeKind::TemplateLit { parts } => out.extend(parts),
            NodeKind::TaggedTemplate { tag, quasi } => {
                out.push(*tag);
                out.push(*quasi);
            }
            NodeKind::ArrayLit { elements } | NodeKind::ArrayPattern { elements } => {
                out.extend(elements)
            }
            NodeKind::ObjectLit { props } | NodeKind::ObjectPattern { props } => out.extend(props),
            NodeKind::Property { key, value } | NodeKind::PatternProp { key, value } => {
                if let PropKey::Computed(k) = key {
                    out.push(*k);
                }
                out.push(*value);
            }
            NodeKind::Spread { argument }
            | NodeKind::RestPattern { argument }
            | NodeKind::Unary { argument }
            | NodeKind::Update { argument }
            | NodeKind::Await { argument }
            | NodeKind::Throw { argument } => out.push(*argument),
            NodeKind::Member { object, property } => {
                out.push(*object);
                if let MemberProp::Computed(p) = property {
                    out.push(*p);
                }
            }
            NodeKind::Call { callee, args, .. } => {
                out.push(*callee);
                out.extend(args);
            }
            NodeKind::Assign { target, value, .. } => {
                out.push(*target);
                out.push(*value);
            }
            NodeKind::Conditional {
                test,
                consequent,
                alternate,
            } => {
                out.push(*test);
                out.push(*consequent);
                out.push(*alternate);
            }
            NodeKind::Binary { left, right, .. } => {
                out.push(*left);
                out.push(*right);
            }
            NodeKind::Sequence { expressions } => out.extend(expressions),
            NodeKind::Yield { argument } => out.extend(argument.iter()),
            NodeKind::AssignPattern { target, default } => {
                out.push(*target);
                out.push(*default);
            }
            NodeKind::ExprStmt { expr } => out.push(*expr),
            NodeKind::VarDecl { declarators, .. } => out.extend(declarators),
            NodeKind::Declarator { pattern, init } => {
                out.push(*pattern);
                out.extend(init.iter());
            }
            NodeKind::Return { argument } => out.extend(argument.iter()),
            NodeKind::If {
                test,
                consequent,
                alternate,
            } => {
                out.push(*test);
                out.push(*consequent);
                out.extend(alternate.iter());
            }
            NodeKind::For {
                init,
                test,
                update,
                body,
            } => {
                out.extend(init.iter());
                out.extend(test.iter());
                out.extend(update.iter());
                out.push(*body);
            }
            NodeKind::ForIn {
                left, right, body, ..
            } => {
                out.push(*left);
                out.push(*right);
                out.push(*body);
            }
            NodeKind::While { test, body } => {
                out.push(*test);
                out.push(*body);
            }
            NodeKind::DoWhile { body, test } => {
                out.push(*body);
                out.push(*test);
            }
            NodeKind::Try {
                block,
                handler,
                finalizer,
            } => {
                out.push(*block);
                out.extend(handler.iter());
                out.extend(finalizer.iter());
            }
            NodeKind::Catch { param, body } => {
                out.extend(param.iter());
                out.push(*body);
            }
            NodeKind::Switch {
                discriminant,
                cases,
            } => {
                out.push(*discriminant);
                out.extend(cases);
            }
            NodeKind::SwitchCase { test, body } => {
                out.extend(test.iter());
                out.extend(body);
            }
            NodeKind::Labeled { body } => out.push(*body),
            NodeKind::Import { specifiers, .. } => out.extend(specifiers),
            NodeKind::ImportSpec { local, .. } => out.push(*local),
            NodeKind::ExportNamed {
                declaration,
                specifiers,
                ..
            } => {
                out.extend(declaration.iter());
                out.extend(specifiers.iter().map(|(local, _)| *local));
            }
            NodeKind::ExportDefault { declaration } => out.push(*declaration),
            NodeKind::Other { children } => out.extend(children),
        }
        out
    }
}

/// Pre-order walk from `root`, calling `f` on every node
pub fn walk(ast: &Ast, root: NodeId, f: &mut impl FnMut(NodeId)) {
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        f(id);
        let mut kids = ast.children(id);
        kids.reverse();
        stack.extend(kids);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dummy(ast: &mut Ast, kind: NodeKind) -> NodeId {
        ast.alloc(kind, Span::zero(), ByteRange::zero(), FileId(0))
    }

    #[test]
    fn test_arena_identity() {
        let mut ast = Ast::new();
        let a = dummy(&mut ast, NodeKind::Identifier { name: "a".into() });
        let b = dummy(&mut ast, NodeKind::Identifier { name: "b".into() });
        assert_ne!(a, b);
        assert_eq!(ast.ident_name(a), Some("a"));
        assert_eq!(ast.ident_name(b), Some("b"));
    }

    #[test]
    fn test_walk_preorder() {
        let mut ast = Ast::new();
        let x = dummy(&mut ast, NodeKind::Identifier { name: "x".into() });
        let one = dummy(&mut ast, NodeKind::Literal { string_value: None });
        let decl = dummy(
            &mut ast,
            NodeKind::Declarator {
                pattern: x,
                init: Some(one),
            },
        );
        let var = dummy(
            &mut ast,
            NodeKind::VarDecl {
                kind: DeclKind::Var,
                declarators: vec![decl],
            },
        );
        let program = dummy(&mut ast, NodeKind::Program { body: vec![var] });

        let mut order = Vec::new();
        walk(&ast, program, &mut |id| order.push(id));
        assert_eq!(order, vec![program, var, decl, x, one]);
    }

    #[test]
    fn test_synthetic_keeps_attribution() {
        let mut ast = Ast::new();
        let base = ast.alloc(
            NodeKind::This,
            Span::new(3, 1, 3, 5),
            ByteRange::new(10, 14),
            FileId(2),
        );
        let synth = ast.alloc_synthetic(
            NodeKind::Identifier {
                name: "this".into(),
            },
            base,
        );
        assert_eq!(ast.span(synth), ast.span(base));
        assert_eq!(ast.file(synth), FileId(2));
    }
}
