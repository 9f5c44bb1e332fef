//! Key-value record persistence.

use async_trait::async_trait;

use crate::error::Result;

/// Minimal key-value store for small JSON records.
///
/// Values are opaque strings; callers own the encoding. The offline library
/// keys records by external media id.
///
/// ```ignore
/// use bridge_traits::storage::RecordStore;
///
/// async fn remember(store: &dyn RecordStore) -> Result<()> {
///     store.put("dQw4w9WgXcQ", r#"{"title":"..."}"#).await?;
///     assert!(store.contains("dQw4w9WgXcQ").await?);
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert or replace the record stored under `key`.
    async fn put(&self, key: &str, value: &str) -> Result<()>;

    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Returns `true` when a record was removed.
    async fn delete(&self, key: &str) -> Result<bool>;

    /// Every `(key, value)` pair currently stored, in no particular order.
    async fn list_all(&self) -> Result<Vec<(String, String)>>;

    async fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get(key).await?.is_some())
    }
}
