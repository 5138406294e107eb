//! Common models shared across features

mod diagnostics;
mod span;

pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use span::{ByteRange, Location, Span};
