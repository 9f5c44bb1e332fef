//! Error types for the catalog client

use thiserror::Error;

/// Catalog client errors
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The catalog API answered with a non-success status
    #[error("Catalog API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The request never produced a response
    #[error("Network error: {0}")]
    Network(String),

    /// Failed to parse API response
    #[error("Failed to parse API response: {0}")]
    Parse(String),

    /// No API key configured
    #[error("Catalog is not configured: {0}")]
    NotConfigured(String),
}

/// Result type for catalog operations
pub type Result<T> = std::result::Result<T, CatalogError>;

impl From<bridge_traits::error::BridgeError> for CatalogError {
    fn from(error: bridge_traits::error::BridgeError) -> Self {
        CatalogError::Network(error.to_string())
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(error: serde_json::Error) -> Self {
        CatalogError::Parse(error.to_string())
    }
}
