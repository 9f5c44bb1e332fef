//! Driver timing tests on a paused clock.

mod common;

use std::sync::Arc;
use std::time::Duration;

use bridge_traits::media::{EngineSignal, EngineState};
use common::{track, FakeHost};
use core_async::sync::mpsc;
use core_playback::{mount, AdapterEvent, AdapterSettings, EngineBootstrap, PlayerStore};
use core_runtime::config::PlaybackSettings;
use tokio::time::{sleep, timeout, Instant};

// ============================================================================
// Helpers
// ============================================================================

fn settings() -> AdapterSettings {
    AdapterSettings {
        poll_interval: Duration::from_millis(500),
        seek_tolerance_secs: 1.0,
        load_timeout: Some(Duration::from_secs(15)),
    }
}

fn store() -> PlayerStore {
    PlayerStore::new(&PlaybackSettings::default().with_default_audio_only(false))
}

async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..1000 {
        if condition() {
            return;
        }
        sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached");
}

async fn next_event<F>(rx: &mut mpsc::UnboundedReceiver<AdapterEvent>, mut wanted: F) -> AdapterEvent
where
    F: FnMut(&AdapterEvent) -> bool,
{
    loop {
        let event = rx.recv().await.expect("adapter event channel closed");
        if wanted(&event) {
            return event;
        }
    }
}

fn is_time_update(event: &AdapterEvent) -> bool {
    matches!(event, AdapterEvent::TimeUpdate { .. })
}

// ============================================================================
// Polling
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_polls_every_interval_while_playing() {
    let host = Arc::new(FakeHost::new());
    let bootstrap = Arc::new(EngineBootstrap::new(host.clone()));
    let store = store();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = mount(bootstrap, store.subscribe(), tx, settings());

    store.play_track(track("a"));
    wait_until(|| !host.engines().is_empty()).await;
    host.signal(EngineSignal::Ready);
    next_event(&mut rx, |e| *e == AdapterEvent::Ready).await;

    let engine = host.last_engine().unwrap();
    engine.set_time(3.0);
    let mut stamps = Vec::new();
    for _ in 0..3 {
        next_event(&mut rx, is_time_update).await;
        stamps.push(Instant::now());
    }
    for pair in stamps.windows(2) {
        assert_eq!(pair[1] - pair[0], Duration::from_millis(500));
    }

    // Paused by the engine: polling stops.
    engine.set_state(EngineState::Paused);
    host.signal(EngineSignal::StateChange(2));
    next_event(&mut rx, |e| *e == AdapterEvent::Pause).await;
    let quiet = timeout(Duration::from_secs(2), next_event(&mut rx, is_time_update)).await;
    assert!(quiet.is_err());

    handle.unmount().await;
}

#[tokio::test(start_paused = true)]
async fn test_store_commands_reach_engine() {
    let host = Arc::new(FakeHost::new());
    let bootstrap = Arc::new(EngineBootstrap::new(host.clone()));
    let store = store();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = mount(bootstrap, store.subscribe(), tx, settings());

    store.play_track(track("a"));
    store.pause_track();
    wait_until(|| !host.engines().is_empty()).await;
    host.signal(EngineSignal::Ready);
    next_event(&mut rx, |e| *e == AdapterEvent::Ready).await;
    let engine = host.last_engine().unwrap();
    assert!(!host.last_options().unwrap().autoplay);

    store.toggle_play();
    next_event(&mut rx, |e| *e == AdapterEvent::Play).await;
    assert_eq!(engine.count("playVideo"), 1);

    store.set_volume(250);
    wait_until(|| engine.log.lock().unwrap().volume == Some(100)).await;

    store.play_track(track("b"));
    wait_until(|| engine.count("loadVideoById") == 1).await;
    assert_eq!(engine.log.lock().unwrap().loaded.as_deref(), Some("vid-b"));

    handle.unmount().await;
    assert!(engine.log.lock().unwrap().destroyed);
}

#[tokio::test(start_paused = true)]
async fn test_toggle_twice_sends_at_most_one_of_each() {
    let host = Arc::new(FakeHost::new());
    let bootstrap = Arc::new(EngineBootstrap::new(host.clone()));
    let store = store();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = mount(bootstrap, store.subscribe(), tx, settings());

    store.play_track(track("a"));
    wait_until(|| !host.engines().is_empty()).await;
    host.signal(EngineSignal::Ready);
    next_event(&mut rx, |e| *e == AdapterEvent::Ready).await;
    let engine = host.last_engine().unwrap();

    store.toggle_play();
    store.toggle_play();
    sleep(Duration::from_secs(2)).await;

    assert!(store.snapshot().is_playing);
    assert!(engine.count("playVideo") <= 1);
    assert!(engine.count("pauseVideo") <= 1);
    assert_eq!(engine.log.lock().unwrap().state, EngineState::Playing.code());

    handle.unmount().await;
}

#[tokio::test(start_paused = true)]
async fn test_rebuilds_engine_without_in_place_load() {
    let host = Arc::new(FakeHost::new().without_in_place_load());
    let bootstrap = Arc::new(EngineBootstrap::new(host.clone()));
    let store = store();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = mount(bootstrap, store.subscribe(), tx, settings());

    store.play_track(track("a"));
    wait_until(|| !host.engines().is_empty()).await;
    host.signal(EngineSignal::Ready);
    next_event(&mut rx, |e| *e == AdapterEvent::Ready).await;

    store.play_track(track("b"));
    wait_until(|| host.engines().len() == 2).await;

    assert!(host.engines()[0].log.lock().unwrap().destroyed);
    assert_eq!(host.last_options().unwrap().media_id, "vid-b");
    handle.unmount().await;
}

// ============================================================================
// Bootstrap
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_waits_for_playable_track() {
    let host = Arc::new(FakeHost::new());
    let bootstrap = Arc::new(EngineBootstrap::new(host.clone()));
    let store = store();
    let (tx, _rx) = mpsc::unbounded_channel();
    let handle = mount(bootstrap, store.subscribe(), tx, settings());

    sleep(Duration::from_secs(5)).await;
    assert_eq!(host.load_calls(), 0);

    store.play_track(track("a"));
    wait_until(|| host.load_calls() == 1).await;
    handle.unmount().await;
}

#[tokio::test(start_paused = true)]
async fn test_bootstrap_timeout_fails_adapter() {
    let host = Arc::new(FakeHost::new().with_load_delay(Duration::from_secs(20)));
    let bootstrap = Arc::new(EngineBootstrap::new(host.clone()));
    let store = store();
    store.play_track(track("a"));

    let started = Instant::now();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = mount(bootstrap.clone(), store.subscribe(), tx, settings());

    let event = next_event(&mut rx, |e| matches!(e, AdapterEvent::Failed(_))).await;
    assert!(started.elapsed() >= Duration::from_secs(15));
    assert!(matches!(event, AdapterEvent::Failed(reason) if reason.contains("15s")));
    assert!(host.engines().is_empty());
    handle.unmount().await;

    // The request kept running; a later mount reuses it.
    sleep(Duration::from_secs(10)).await;
    let (tx, _rx) = mpsc::unbounded_channel();
    let handle = mount(bootstrap, store.subscribe(), tx, settings());
    wait_until(|| !host.engines().is_empty()).await;
    assert_eq!(host.load_calls(), 1);
    handle.unmount().await;
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_mounts_share_bootstrap() {
    let host = Arc::new(FakeHost::new().with_load_delay(Duration::from_secs(1)));
    let bootstrap = Arc::new(EngineBootstrap::new(host.clone()));

    let (first, second) = tokio::join!(bootstrap.ensure_loaded(), bootstrap.ensure_loaded());

    assert!(first.is_ok());
    assert!(second.is_ok());
    assert_eq!(host.load_calls(), 1);
    assert!(bootstrap.is_loaded());
}

#[tokio::test(start_paused = true)]
async fn test_failed_bootstrap_is_retried() {
    let host = Arc::new(FakeHost::new().failing(1));
    let bootstrap = EngineBootstrap::new(host.clone());

    let err = bootstrap.ensure_loaded().await.unwrap_err();
    assert!(err.is_transient());
    assert!(!bootstrap.is_loaded());

    bootstrap.ensure_loaded().await.unwrap();
    assert_eq!(host.load_calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_unmount_stops_everything() {
    let host = Arc::new(FakeHost::new());
    let bootstrap = Arc::new(EngineBootstrap::new(host.clone()));
    let store = store();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = mount(bootstrap, store.subscribe(), tx, settings());

    store.play_track(track("a"));
    wait_until(|| !host.engines().is_empty()).await;
    host.signal(EngineSignal::Ready);
    next_event(&mut rx, |e| *e == AdapterEvent::Ready).await;

    handle.unmount().await;
    let engine = host.last_engine().unwrap();
    assert_eq!(engine.count("destroy"), 1);

    // The adapter and its sender are gone, so the channel drains and closes.
    let drained = timeout(Duration::from_secs(1), async {
        while rx.recv().await.is_some() {}
    })
    .await;
    assert!(drained.is_ok());
}
