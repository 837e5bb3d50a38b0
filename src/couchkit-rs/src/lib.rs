//! couchkit Client Library
//!
//! HTTP client for CouchDB-style document databases.

mod client;
mod context;

pub use client::CouchDbClient;
pub use context::{DatabaseContext, DELETE_CONFIRMATION};
pub use couchkit_core::{Config, DbInfo, Response};

#[derive(Debug, thiserror::Error)]
pub enum CouchError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    #[error("Illegal argument: {0}")]
    IllegalArgument(String),

    #[error("No document found: {reason}")]
    NoDocument { reason: String },

    #[error("Document conflict: {reason}")]
    Conflict { reason: String },

    #[error("Server error: {status} - {message}")]
    Server { status: u16, message: String },

    #[error("Invalid response from server")]
    InvalidResponse,
}

impl CouchError {
    pub(crate) fn illegal(message: impl Into<String>) -> Self {
        CouchError::IllegalArgument(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, CouchError::NoDocument { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, CouchError::Conflict { .. })
    }
}

pub type Result<T> = std::result::Result<T, CouchError>;

/// Reject empty arguments before anything goes over the wire
pub(crate) fn assert_not_empty(value: &str, what: &str) -> Result<()> {
    if value.is_empty() {
        return Err(CouchError::illegal(format!("{} may not be empty", what)));
    }
    Ok(())
}
