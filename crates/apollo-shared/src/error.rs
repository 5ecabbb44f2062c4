//! Error types for Apollo.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApolloError {
    #[error("Remote fetch failed: {0}")]
    Fetch(String),

    #[error("Failed to load resource {path}: {reason}")]
    Resource { path: String, reason: String },

    #[error("Cache IO error: {0}")]
    Cache(#[from] std::io::Error),
}
