//! Desktop implementations of the host bridges.
//!
//! - [`ReqwestHttpClient`] backs catalog requests with reqwest and a retry loop.
//! - [`SqliteRecordStore`] persists offline records in a local SQLite file.
//!
//! The engine host, share sheet and clipboard are supplied by the embedding
//! shell (webview or browser), so there is no desktop default for them.

mod http;
mod records;

pub use http::ReqwestHttpClient;
pub use records::{default_database_path, SqliteRecordStore};
