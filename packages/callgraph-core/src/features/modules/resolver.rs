//! Module specifier resolution
//!
//! Resolves specifiers against the analyzed file set with the usual
//! relative/absolute/index conventions. Resolution is purely lexical —
//! files may come from a virtual file system in tests, so nothing here
//! touches the disk.

use crate::context::AnalysisCtx;
use crate::features::parsing::ast::FileId;

/// Candidate suffixes tried in order for extensionless specifiers
const CANDIDATE_SUFFIXES: &[&str] = &["", ".js", ".mjs", ".cjs", ".vue", "/index.js"];

/// Lexically normalize a path: collapse `.`, `..` and repeated separators
pub fn normalize_path(path: &str) -> String {
    let absolute = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();
    for comp in path.split('/') {
        match comp {
            "" | "." => {}
            ".." => {
                if matches!(parts.last(), Some(&"..")) || parts.is_empty() {
                    if !absolute {
                        parts.push("..");
                    }
                } else {
                    parts.pop();
                }
            }
            other => parts.push(other),
        }
    }
    let joined = parts.join("/");
    if absolute {
        format!("/{}", joined)
    } else {
        joined
    }
}

/// Resolve `spec` from `from` against the analyzed files
///
/// Bare specifiers (npm packages) are never resolved here; the caller
/// treats them as external.
pub fn resolve_specifier(ctx: &AnalysisCtx, from: FileId, spec: &str) -> Option<FileId> {
    if spec.is_empty() {
        return None;
    }
    let base = if spec.starts_with('/') {
        spec.to_string()
    } else if spec.starts_with('.') {
        let from_path = ctx.file_path(from);
        let dir = match from_path.rfind('/') {
            Some(idx) => &from_path[..idx],
            None => "",
        };
        if dir.is_empty() {
            spec.to_string()
        } else {
            format!("{}/{}", dir, spec)
        }
    } else {
        return None;
    };

    let base = normalize_path(&base);
    for suffix in CANDIDATE_SUFFIXES {
        let candidate = format!("{}{}", base, suffix);
        if let Some(id) = ctx.file_by_path(&candidate) {
            return Some(id);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize_path("src/./a/../b.js"), "src/b.js");
        assert_eq!(normalize_path("./m.js"), "m.js");
        assert_eq!(normalize_path("/abs//x/./y.js"), "/abs/x/y.js");
        assert_eq!(normalize_path("../up.js"), "../up.js");
    }

    #[test]
    fn test_resolution_conventions() {
        let mut ctx = AnalysisCtx::new();
        let main = ctx.add_file("src/main.js".to_string());
        let util = ctx.add_file("src/util.js".to_string());
        let pkg = ctx.add_file("src/lib/index.js".to_string());

        assert_eq!(resolve_specifier(&ctx, main, "./util"), Some(util));
        assert_eq!(resolve_specifier(&ctx, main, "./util.js"), Some(util));
        assert_eq!(resolve_specifier(&ctx, main, "./lib"), Some(pkg));
        assert_eq!(resolve_specifier(&ctx, main, "./missing"), None);
        // bare specifiers are external
        assert_eq!(resolve_specifier(&ctx, main, "lodash"), None);
    }

    #[test]
    fn test_parent_relative_resolution() {
        let mut ctx = AnalysisCtx::new();
        let deep = ctx.add_file("src/app/deep.js".to_string());
        let shared = ctx.add_file("src/shared.js".to_string());
        assert_eq!(resolve_specifier(&ctx, deep, "../shared"), Some(shared));
    }
}
