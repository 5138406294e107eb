//! Diagnostic accumulation
//!
//! The core never aborts analysis on recoverable problems: parse failures,
//! unsupported constructs and unresolved module specifiers are collected
//! here while analysis proceeds with partial information.

use super::span::Span;
use serde::Serialize;
use tracing::warn;

/// Diagnostic severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    Warning,
    Error,
}

/// A single diagnostic message with optional source attribution
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub file: Option<String>,
    pub span: Option<Span>,
}

/// Accumulating diagnostic sink
///
/// Every diagnostic is also forwarded to the `tracing` subscriber so that
/// embedders see problems as they happen.
#[derive(Debug, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.push(Severity::Warning, message.into(), None, None);
    }

    pub fn warn_at(&mut self, message: impl Into<String>, file: impl Into<String>, span: Span) {
        self.push(Severity::Warning, message.into(), Some(file.into()), Some(span));
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Severity::Error, message.into(), None, None);
    }

    fn push(&mut self, severity: Severity, message: String, file: Option<String>, span: Option<Span>) {
        match (&severity, &file) {
            (Severity::Warning, Some(f)) => warn!(file = f.as_str(), "{}", message),
            (Severity::Warning, None) => warn!("{}", message),
            (Severity::Error, Some(f)) => tracing::error!(file = f.as_str(), "{}", message),
            (Severity::Error, None) => tracing::error!("{}", message),
        }
        self.items.push(Diagnostic {
            severity,
            message,
            file,
            span,
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn warning_count(&self) -> usize {
        self.items
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostics_accumulate() {
        let mut diags = Diagnostics::new();
        diags.warn("first");
        diags.warn_at("second", "a.js", Span::new(1, 0, 1, 5));
        assert_eq!(diags.len(), 2);
        assert_eq!(diags.warning_count(), 2);
        assert_eq!(diags.iter().nth(1).unwrap().file.as_deref(), Some("a.js"));
    }
}
