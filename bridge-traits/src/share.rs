//! Native share sheet and clipboard.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharePayload {
    pub title: String,
    pub text: String,
    pub url: String,
}

/// Platform share sheet.
#[async_trait]
pub trait ShareSheet: Send + Sync {
    /// Whether the platform offers a share sheet at all. Hosts without one
    /// return `false` so callers can go straight to the clipboard.
    fn is_available(&self) -> bool {
        true
    }

    /// Presents the payload. A dismissed sheet is an error.
    async fn share(&self, payload: &SharePayload) -> Result<()>;
}

#[async_trait]
pub trait Clipboard: Send + Sync {
    async fn write_text(&self, text: &str) -> Result<()>;
}
