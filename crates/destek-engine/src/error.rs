//! Engine error types.
//!
//! The resolution hot path is infallible; errors can only occur while the
//! engine is being assembled (parsing the knowledge base, compiling rule
//! patterns). All of those surfaces return [`EngineError`].

/// Unified error type for the Destek engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A rule pattern supplied to the router failed to compile.
    #[error("invalid rule pattern `{pattern}`: {reason}")]
    InvalidRule { pattern: String, reason: String },

    /// The knowledge-base JSON could not be parsed.
    #[error("knowledge base parse error: {0}")]
    KnowledgeBase(#[from] serde_json::Error),
}

/// Convenience alias used throughout the engine crate.
pub type Result<T> = std::result::Result<T, EngineError>;
