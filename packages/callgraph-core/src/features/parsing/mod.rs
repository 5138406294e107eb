//! Parsing feature
//!
//! Preprocessing, the tree-sitter JavaScript parser, and the owned AST
//! arena all downstream passes operate on.

pub mod ast;
pub mod parser;
pub mod preprocess;

pub use ast::{Ast, FileId, NodeId, NodeKind};
pub use parser::{lower_tree, parse_file, parse_syntax};
pub use preprocess::preprocess;
