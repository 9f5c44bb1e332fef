use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Capability missing: {capability} - {message}")]
    CapabilityMissing { capability: String, message: String },

    #[error("Logging setup failed: {0}")]
    Logging(String),

    /// A default desktop bridge could not be opened.
    #[error("Default bridge unavailable: {0}")]
    DefaultBridge(String),
}

impl Error {
    /// Name of the missing host capability, if that is what failed.
    pub fn missing_capability(&self) -> Option<&str> {
        match self {
            Error::CapabilityMissing { capability, .. } => Some(capability),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
