//! Offline library backed by the host's [`RecordStore`].
//!
//! Only metadata is kept; nothing is downloaded.

use std::sync::Arc;

use bridge_traits::storage::RecordStore;
use bridge_traits::time::Clock;
use core_runtime::events::{CoreEvent, EventBus, LibraryEvent};
use tracing::{debug, info, warn};

use crate::error::{LibraryError, Result};
use crate::models::{OfflineEntry, OfflineRecord};

pub struct OfflineLibrary {
    store: Arc<dyn RecordStore>,
    clock: Arc<dyn Clock>,
    events: Option<EventBus>,
}

impl OfflineLibrary {
    pub fn new(store: Arc<dyn RecordStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            events: None,
        }
    }

    pub fn with_event_bus(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    /// Saves or overwrites an entry, stamping it with the current time.
    pub async fn save(&self, entry: OfflineEntry) -> Result<OfflineRecord> {
        entry
            .validate()
            .map_err(|message| LibraryError::InvalidInput {
                field: "entry".to_string(),
                message,
            })?;

        let record = OfflineRecord {
            entry,
            added_at: self.clock.now(),
        };
        let value = serde_json::to_string(&record)?;
        self.store.put(record.id(), &value).await?;

        info!(media_id = %record.id(), "Saved for offline");
        self.emit(LibraryEvent::OfflineSaved {
            media_id: record.entry.id.clone(),
            title: record.entry.title.clone(),
        });
        Ok(record)
    }

    /// Returns whether an entry was removed.
    pub async fn remove(&self, id: &str) -> Result<bool> {
        let removed = self.store.delete(id).await?;
        if removed {
            info!(media_id = %id, "Removed from offline library");
            self.emit(LibraryEvent::OfflineRemoved {
                media_id: id.to_string(),
            });
        }
        Ok(removed)
    }

    pub async fn get(&self, id: &str) -> Result<Option<OfflineRecord>> {
        let Some(value) = self.store.get(id).await? else {
            return Ok(None);
        };
        serde_json::from_str(&value)
            .map(Some)
            .map_err(|e| LibraryError::Corrupt {
                id: id.to_string(),
                message: e.to_string(),
            })
    }

    pub async fn is_offline(&self, id: &str) -> Result<bool> {
        Ok(self.store.contains(id).await?)
    }

    /// All readable records, newest first. Corrupt records are skipped.
    pub async fn list(&self) -> Result<Vec<OfflineRecord>> {
        let mut records: Vec<OfflineRecord> = self
            .store
            .list_all()
            .await?
            .into_iter()
            .filter_map(|(key, value)| match serde_json::from_str(&value) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(key = %key, error = %e, "Skipping corrupt offline record");
                    None
                }
            })
            .collect();

        records.sort_by(|a, b| b.added_at.cmp(&a.added_at));
        debug!(count = records.len(), "Listed offline library");
        Ok(records)
    }

    /// Saves the entry when absent, removes it when present. Returns the new
    /// membership.
    pub async fn toggle(&self, entry: OfflineEntry) -> Result<bool> {
        if self.is_offline(&entry.id).await? {
            self.remove(&entry.id).await?;
            Ok(false)
        } else {
            self.save(entry).await?;
            Ok(true)
        }
    }

    fn emit(&self, event: LibraryEvent) {
        if let Some(bus) = &self.events {
            let _ = bus.emit(CoreEvent::Library(event));
        }
    }
}
