//! Module linking feature
//!
//! Wires exports of one file to imports of another: ES modules, CommonJS
//! `require`/`module.exports`, and AMD `define`. Unresolved specifiers
//! warn and connect the importer to `Unknown`.

mod linker;
mod resolver;

pub use linker::{amd_dependency_graph, link_modules};
pub use resolver::{normalize_path, resolve_specifier};
