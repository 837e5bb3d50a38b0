//! couchkit Core Library
//!
//! Shared building blocks for the couchkit client:
//! - Client configuration
//! - Wire models for CouchDB responses
//! - Database and document URI construction

pub mod config;
pub mod models;
pub mod uri;

// Re-export commonly used types
pub use config::Config;
pub use models::*;
pub use uri::UriBuilder;
