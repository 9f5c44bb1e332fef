//! # Playback Error Types
//!
//! Errors raised by the player store, the share flow and the engine adapter.

use std::time::Duration;

use bridge_traits::error::BridgeError;
use thiserror::Error;

/// Errors that can occur during playback operations.
#[derive(Error, Debug)]
pub enum PlaybackError {
    // ========================================================================
    // Engine Errors
    // ========================================================================
    /// The engine bootstrap resource could not be loaded.
    #[error("Media engine unavailable: {0}")]
    EngineUnavailable(String),

    /// The engine bootstrap did not finish in time.
    #[error("Media engine did not load within {0:?}")]
    EngineLoadTimeout(Duration),

    /// The host failed to build a player instance.
    #[error("Failed to construct media engine: {0}")]
    EngineConstruction(String),

    // ========================================================================
    // Share Errors
    // ========================================================================
    /// Neither a share sheet nor a clipboard is present.
    #[error("No share target available")]
    ShareUnavailable,

    /// The share sheet and the clipboard fallback both failed.
    #[error("Share failed: {0}")]
    ShareFailed(String),

    // ========================================================================
    // Generic Errors
    // ========================================================================
    /// Error surfaced by a host bridge.
    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),

    /// Internal error (should not occur in normal operation).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PlaybackError {
    /// Returns `true` if a later mount may succeed where this one failed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PlaybackError::EngineUnavailable(_) | PlaybackError::EngineLoadTimeout(_)
        )
    }

    /// Returns `true` if the error came out of the share flow.
    pub fn is_share_error(&self) -> bool {
        matches!(
            self,
            PlaybackError::ShareUnavailable | PlaybackError::ShareFailed(_)
        )
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(PlaybackError::EngineLoadTimeout(Duration::from_secs(15)).is_transient());
        assert!(PlaybackError::EngineUnavailable("script blocked".into()).is_transient());
        assert!(!PlaybackError::ShareUnavailable.is_transient());
    }

    #[test]
    fn test_share_classification() {
        assert!(PlaybackError::ShareFailed("dismissed".into()).is_share_error());
        assert!(!PlaybackError::Internal("x".into()).is_share_error());
    }

    #[test]
    fn test_bridge_error_conversion() {
        let err: PlaybackError = BridgeError::OperationFailed("boom".into()).into();
        assert!(matches!(err, PlaybackError::Bridge(_)));
        assert!(err.to_string().contains("boom"));
    }
}
