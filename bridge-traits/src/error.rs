use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    /// The host does not provide this capability, or the method is missing
    /// from the host object.
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    pub fn not_available(capability: impl Into<String>) -> Self {
        Self::NotAvailable(capability.into())
    }

    pub fn is_not_available(&self) -> bool {
        matches!(self, Self::NotAvailable(_))
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
