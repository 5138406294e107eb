//! Binding feature
//!
//! Second pass: builds nested scope tables, hoists declarations, and
//! resolves every identifier use to its declaration site or to a global
//! name.

mod binder;
mod scope;

pub use binder::{bind, Bindings, Resolution};
pub use scope::{BindingTarget, ScopeId, ScopeKind, ScopeTree};
