use std::sync::Arc;

use async_trait::async_trait;
use bridge_desktop::SqliteRecordStore;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::{BridgeError, Clock, ManualClock, RecordStore};
use chrono::{Duration, TimeZone, Utc};
use core_library::{LibraryError, OfflineEntry, OfflineLibrary};
use core_runtime::events::{CoreEvent, EventBus, LibraryEvent};
use mockall::mock;

// ============================================================================
// Fixtures
// ============================================================================

fn entry(id: &str) -> OfflineEntry {
    OfflineEntry {
        id: id.to_string(),
        title: format!("Song {}", id),
        artist: "Band".to_string(),
        thumbnail: format!("https://img/{}.jpg", id),
        duration: "3:33".to_string(),
    }
}

async fn library() -> (OfflineLibrary, Arc<ManualClock>, Arc<SqliteRecordStore>) {
    let store = Arc::new(SqliteRecordStore::in_memory().await.unwrap());
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
    ));
    let library = OfflineLibrary::new(store.clone(), clock.clone());
    (library, clock, store)
}

mock! {
    Store {}

    #[async_trait]
    impl RecordStore for Store {
        async fn put(&self, key: &str, value: &str) -> BridgeResult<()>;
        async fn get(&self, key: &str) -> BridgeResult<Option<String>>;
        async fn delete(&self, key: &str) -> BridgeResult<bool>;
        async fn list_all(&self) -> BridgeResult<Vec<(String, String)>>;
    }
}

// ============================================================================
// Save / Get / Remove
// ============================================================================

#[tokio::test]
async fn test_save_stamps_added_at() {
    let (library, clock, _) = library().await;

    let record = library.save(entry("a")).await.unwrap();
    assert_eq!(record.added_at, clock.now());

    let stored = library.get("a").await.unwrap().unwrap();
    assert_eq!(stored, record);
    assert!(library.is_offline("a").await.unwrap());
}

#[tokio::test]
async fn test_save_overwrites_existing_entry() {
    let (library, clock, _) = library().await;

    library.save(entry("a")).await.unwrap();
    clock.advance(Duration::minutes(5));

    let mut renamed = entry("a");
    renamed.title = "Renamed".to_string();
    library.save(renamed).await.unwrap();

    let records = library.list().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].entry.title, "Renamed");
    assert_eq!(records[0].added_at, clock.now());
}

#[tokio::test]
async fn test_save_rejects_blank_id() {
    let (library, _, _) = library().await;

    let result = library.save(entry("  ")).await;
    assert!(matches!(result, Err(LibraryError::InvalidInput { .. })));
    assert!(library.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_remove_reports_whether_present() {
    let (library, _, _) = library().await;

    library.save(entry("a")).await.unwrap();
    assert!(library.remove("a").await.unwrap());
    assert!(!library.remove("a").await.unwrap());
    assert!(library.get("a").await.unwrap().is_none());
}

#[tokio::test]
async fn test_get_corrupt_record_is_an_error() {
    let (library, _, store) = library().await;

    store.put("broken", "not json").await.unwrap();

    let result = library.get("broken").await;
    assert!(matches!(result, Err(LibraryError::Corrupt { ref id, .. }) if id == "broken"));
}

// ============================================================================
// Listing
// ============================================================================

#[tokio::test]
async fn test_list_is_newest_first() {
    let (library, clock, _) = library().await;

    library.save(entry("first")).await.unwrap();
    clock.advance(Duration::seconds(30));
    library.save(entry("second")).await.unwrap();
    clock.advance(Duration::seconds(30));
    library.save(entry("third")).await.unwrap();

    let ids: Vec<String> = library
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|record| record.entry.id)
        .collect();
    assert_eq!(ids, vec!["third", "second", "first"]);
}

#[tokio::test]
async fn test_list_skips_corrupt_records() {
    let (library, _, store) = library().await;

    library.save(entry("good")).await.unwrap();
    store.put("bad", "{\"id\": 42}").await.unwrap();

    let records = library.list().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id(), "good");
}

// ============================================================================
// Toggle
// ============================================================================

#[tokio::test]
async fn test_toggle_adds_then_removes() {
    let (library, _, _) = library().await;

    assert!(library.toggle(entry("a")).await.unwrap());
    assert!(library.is_offline("a").await.unwrap());

    assert!(!library.toggle(entry("a")).await.unwrap());
    assert!(!library.is_offline("a").await.unwrap());
}

#[tokio::test]
async fn test_events_are_emitted() {
    let (library, _, _) = library().await;
    let bus = EventBus::new(16);
    let mut events = bus.subscribe();
    let library = library.with_event_bus(bus);

    library.toggle(entry("a")).await.unwrap();
    library.toggle(entry("a")).await.unwrap();

    match events.try_recv().unwrap() {
        CoreEvent::Library(LibraryEvent::OfflineSaved { media_id, title }) => {
            assert_eq!(media_id, "a");
            assert_eq!(title, "Song a");
        }
        other => panic!("unexpected event: {:?}", other),
    }
    assert!(matches!(
        events.try_recv().unwrap(),
        CoreEvent::Library(LibraryEvent::OfflineRemoved { .. })
    ));
}

// ============================================================================
// Store Failures
// ============================================================================

#[tokio::test]
async fn test_store_failure_propagates() {
    let mut store = MockStore::new();
    store
        .expect_put()
        .times(1)
        .returning(|_, _| Err(BridgeError::DatabaseError("disk full".to_string())));

    let clock = Arc::new(ManualClock::new(Utc::now()));
    let library = OfflineLibrary::new(Arc::new(store), clock);

    let result = library.save(entry("a")).await;
    assert!(matches!(result, Err(LibraryError::Bridge(_))));
}

#[tokio::test]
async fn test_contains_does_not_deserialize() {
    let mut store = MockStore::new();
    store
        .expect_get()
        .withf(|key| key == "a")
        .times(1)
        .returning(|_| Ok(Some("garbage".to_string())));

    let clock = Arc::new(ManualClock::new(Utc::now()));
    let library = OfflineLibrary::new(Arc::new(store), clock);

    assert!(library.is_offline("a").await.unwrap());
}
