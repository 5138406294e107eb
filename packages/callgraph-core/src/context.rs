//! Analysis context
//!
//! Owned state threaded through every phase: the node arena, the source
//! file table, the function/call registries, and the side tables written
//! by the decorator and binder. Nothing here is a process-wide singleton;
//! embedders may run several analyses side by side.

use rustc_hash::FxHashMap;

use crate::features::binding::Bindings;
use crate::features::decorate::Decorations;
use crate::features::parsing::ast::{Ast, FileId, NodeId};
use crate::shared::models::Diagnostics;

/// One analyzed source file
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// normalized path used in output and module resolution
    pub path: String,
    /// the file's `Program` node; `None` when parsing failed
    pub program: Option<NodeId>,
}

/// Whole-program analysis state
#[derive(Debug, Default)]
pub struct AnalysisCtx {
    pub ast: Ast,
    pub files: Vec<SourceFile>,
    /// every function node, AST pre-order across files
    pub functions: Vec<NodeId>,
    /// every call/new site, AST pre-order across files; pseudo call-sites
    /// synthesized by the native model are appended after all real sites
    pub calls: Vec<NodeId>,
    pub decorations: Decorations,
    pub bindings: Bindings,
    pub diagnostics: Diagnostics,
    path_index: FxHashMap<String, FileId>,
}

impl AnalysisCtx {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a file, returning its id
    pub fn add_file(&mut self, path: String) -> FileId {
        let id = FileId(self.files.len() as u32);
        self.path_index.insert(path.clone(), id);
        self.files.push(SourceFile {
            path,
            program: None,
        });
        id
    }

    pub fn file(&self, id: FileId) -> &SourceFile {
        &self.files[id.0 as usize]
    }

    pub fn file_path(&self, id: FileId) -> &str {
        &self.files[id.0 as usize].path
    }

    /// Look up a file by its normalized path
    pub fn file_by_path(&self, path: &str) -> Option<FileId> {
        self.path_index.get(path).copied()
    }

    /// Path of the file containing `node`
    pub fn path_of(&self, node: NodeId) -> &str {
        self.file_path(self.ast.file(node))
    }
}
