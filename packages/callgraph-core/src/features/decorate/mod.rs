//! Decoration feature
//!
//! First pass over the lowered AST: registers every function and call-site
//! on the analysis context, records enclosing functions, names anonymous
//! functions from their syntactic context, and renders stable labels.

mod decorator;
mod labels;

pub use decorator::{decorate, CallbackCtx, Decorations};
pub use labels::{label_of, render_callee};
