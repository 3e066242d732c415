//! Error types for the editor core.

use crate::document::DocumentId;
use std::path::PathBuf;
use thiserror::Error;

/// Errors reported by a document store implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store holds no document with this id.
    #[error("document not found: {0}")]
    NotFound(DocumentId),

    /// The store could not be reached or refused the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Writing the documents to durable storage failed.
    #[error("failed to persist documents: {message}")]
    Persist { message: String },
}

/// Errors surfaced by the editor core.
#[derive(Debug, Error)]
pub enum LudditeError {
    /// Input rejected at the point of the offending operation.
    #[error("{message}")]
    Validation {
        message: String,
        suggestion: String,
    },

    /// A store operation (fetch, commit, delete, create) failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The requested document is not part of the current outline.
    #[error("document not found: {0}")]
    NotFound(DocumentId),

    /// The configuration file could not be parsed.
    #[error("invalid configuration {path}: {message}")]
    Config { path: PathBuf, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl LudditeError {
    /// The error raised when a document is created without a title.
    pub fn missing_title() -> Self {
        Self::Validation {
            message: "Post requires a title".to_string(),
            suggestion: "Provide a title, even if it won't show up when published. \
                         It's useful for the sidebar."
                .to_string(),
        }
    }

    /// Returns true for failures coming from the document store.
    pub fn is_store_failure(&self) -> bool {
        matches!(self, Self::Store(_))
    }
}

/// Result alias used throughout the core.
pub type Result<T> = std::result::Result<T, LudditeError>;
