//! Typed errors raised by the intelligence engine.
//!
//! The engine is a library, so failures are a `thiserror` enum callers can
//! match on. The binary wraps them in `anyhow` at the edges.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    /// A document yielded no usable text. Fatal for that document only.
    #[error("malformed document {document}: {reason}")]
    MalformedDocument { document: String, reason: String },

    /// Persona and job-to-be-done tokenized to zero terms.
    #[error("persona and job-to-be-done contain no usable terms")]
    EmptyQuery,

    /// No section in the corpus scored above zero.
    #[error("no section across {documents} documents is relevant to the query")]
    InsufficientContent { documents: usize },

    #[error("expected between {min} and {max} documents, found {found}")]
    CorpusSize { found: usize, min: usize, max: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl EngineError {
    pub fn malformed(document: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedDocument {
            document: document.into(),
            reason: reason.into(),
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
