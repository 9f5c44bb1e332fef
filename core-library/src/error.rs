use bridge_traits::error::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),

    #[error("Corrupt offline record {id}: {message}")]
    Corrupt { id: String, message: String },

    #[error("Invalid input: {field} - {message}")]
    InvalidInput { field: String, message: String },

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LibraryError>;
