use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Service initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Capability missing: {capability} - {message}")]
    CapabilityMissing { capability: String, message: String },

    #[error("No track is loaded")]
    NoCurrentTrack,

    #[error("Runtime error: {0}")]
    Runtime(#[from] core_runtime::Error),

    #[error("Playback error: {0}")]
    Playback(#[from] core_playback::PlaybackError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] core_catalog::CatalogError),

    #[error("Library error: {0}")]
    Library(#[from] core_library::LibraryError),
}

impl ServiceError {
    pub(crate) fn feature_disabled(capability: &str, flag: &str) -> Self {
        ServiceError::CapabilityMissing {
            capability: capability.to_string(),
            message: format!("enable it with CoreConfigBuilder::{}(true)", flag),
        }
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;
