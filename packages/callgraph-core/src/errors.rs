//! Error types for callgraph-core
//!
//! Provides unified error handling across the crate.

use thiserror::Error;

/// Main error type for call-graph analysis operations
#[derive(Debug, Error)]
pub enum CallgraphError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Analysis error
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Configuration error (unknown strategy, bad filter rule, ...)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Output serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CallgraphError {
    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        CallgraphError::Parse(msg.into())
    }

    /// Create an analysis error
    pub fn analysis(msg: impl Into<String>) -> Self {
        CallgraphError::Analysis(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        CallgraphError::Config(msg.into())
    }
}

/// Result type alias for call-graph operations
pub type Result<T> = std::result::Result<T, CallgraphError>;
