//! Core service façade.
//!
//! Wires a validated [`CoreConfig`] into the playback store, the engine
//! adapter task, the transport controller and the optional catalog and
//! offline library. Desktop hosts enable the `desktop-shims` feature so
//! missing HTTP and storage bridges are filled with the `bridge-desktop`
//! implementations.
//!
//! ```ignore
//! let config = CoreConfig::builder()
//!     .engine_host(host)
//!     .catalog(CatalogSettings::default().with_api_key(key))
//!     .enable_catalog(true)
//!     .build()?;
//!
//! let service = PlayerService::new(config)?;
//! service.start().await;
//! let tracks = service.search_tracks("daft punk").await?;
//! service.store().play_track(tracks[0].clone());
//! ```

pub mod error;
pub mod transport;

pub use error::{Result, ServiceError};
pub use transport::{format_time, SeekMode, TransportController, DEFAULT_UNMUTE_VOLUME};

use std::sync::Arc;

use core_async::sync::mpsc;
use core_async::task::{self, JoinHandle};
use core_catalog::{CatalogClient, TrackCatalog};
use core_library::{OfflineEntry, OfflineLibrary};
use core_playback::{
    mount, AdapterEvent, AdapterHandle, AdapterSettings, EngineBootstrap, PlayerStore,
    ShareOutcome, ShareService, Track,
};
use core_runtime::config::CoreConfig;
use core_runtime::events::{CatalogEvent, CoreEvent, EngineEvent, EventBus};
use parking_lot::Mutex;
use tracing::{debug, error, info, instrument, warn};

struct Running {
    adapter: AdapterHandle,
    pump: JoinHandle<()>,
}

/// Primary façade exposed to host applications.
pub struct PlayerService {
    config: CoreConfig,
    events: EventBus,
    store: Arc<PlayerStore>,
    transport: Arc<TransportController>,
    bootstrap: Arc<EngineBootstrap>,
    catalog: Option<Arc<dyn TrackCatalog>>,
    offline: Option<Arc<OfflineLibrary>>,
    running: Mutex<Option<Running>>,
}

impl PlayerService {
    /// Builds every component the configuration enables. Nothing runs until
    /// [`start`](Self::start).
    pub fn new(config: CoreConfig) -> Result<Self> {
        config.validate()?;

        let events = EventBus::new(config.event_buffer_size);

        let mut share = ShareService::new(config.playback.video_host.clone());
        if let Some(sheet) = &config.share_sheet {
            share = share.with_share_sheet(sheet.clone());
        }
        if let Some(clipboard) = &config.clipboard {
            share = share.with_clipboard(clipboard.clone());
        }

        let store = Arc::new(
            PlayerStore::new(&config.playback)
                .with_share_service(share)
                .with_event_bus(events.clone()),
        );
        let transport = Arc::new(TransportController::new(store.clone()));
        let bootstrap = Arc::new(EngineBootstrap::new(config.engine_host.clone()));

        let catalog = if config.features.enable_catalog {
            let http = config.http_client.clone().ok_or_else(|| {
                ServiceError::feature_disabled("HttpClient", "enable_catalog")
            })?;
            let client = CatalogClient::new(http, config.catalog.clone())?;
            Some(Arc::new(client) as Arc<dyn TrackCatalog>)
        } else {
            None
        };

        let offline = match (&config.record_store, config.features.enable_offline_library) {
            (Some(records), true) => Some(Arc::new(
                OfflineLibrary::new(records.clone(), config.clock.clone())
                    .with_event_bus(events.clone()),
            )),
            _ => None,
        };

        info!(
            catalog = catalog.is_some(),
            offline = offline.is_some(),
            "Player service created"
        );

        Ok(Self {
            config,
            events,
            store,
            transport,
            bootstrap,
            catalog,
            offline,
            running: Mutex::new(None),
        })
    }

    pub fn store(&self) -> &Arc<PlayerStore> {
        &self.store
    }

    pub fn transport(&self) -> &Arc<TransportController> {
        &self.transport
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn offline_library(&self) -> Result<Arc<OfflineLibrary>> {
        self.offline
            .clone()
            .ok_or_else(|| ServiceError::feature_disabled("OfflineLibrary", "enable_offline_library"))
    }

    pub fn catalog(&self) -> Result<Arc<dyn TrackCatalog>> {
        self.catalog
            .clone()
            .ok_or_else(|| ServiceError::feature_disabled("Catalog", "enable_catalog"))
    }

    pub fn is_running(&self) -> bool {
        self.running.lock().is_some()
    }

    /// Mounts the engine adapter and the event pump. A second call while
    /// running does nothing.
    pub async fn start(&self) {
        let mut running = self.running.lock();
        if running.is_some() {
            debug!("Player service already started");
            return;
        }

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let adapter = mount(
            self.bootstrap.clone(),
            self.store.subscribe(),
            event_tx,
            AdapterSettings::from(&self.config.playback),
        );
        let pump = task::spawn(pump_events(
            event_rx,
            self.store.clone(),
            self.transport.clone(),
            self.events.clone(),
        ));

        *running = Some(Running { adapter, pump });
        info!("Player service started");
    }

    /// Unmounts the adapter and waits for the pump to drain.
    pub async fn shutdown(&self) {
        let Some(running) = self.running.lock().take() else {
            return;
        };

        running.adapter.unmount().await;
        if let Err(e) = running.pump.await {
            warn!(error = %e, "Event pump ended abnormally");
        }
        info!("Player service stopped");
    }

    /// Searches the catalog and returns display-ready tracks.
    #[instrument(skip(self))]
    pub async fn search_tracks(&self, query: &str) -> Result<Vec<Track>> {
        let catalog = self.catalog()?;
        match catalog.resolve(query).await {
            Ok(hits) => {
                let tracks: Vec<Track> = hits.into_iter().map(Track::from).collect();
                let _ = self.events.emit(CoreEvent::Catalog(CatalogEvent::SearchCompleted {
                    query: query.to_string(),
                    results: tracks.len(),
                }));
                Ok(tracks)
            }
            Err(e) => {
                let _ = self.events.emit(CoreEvent::Catalog(CatalogEvent::SearchFailed {
                    query: query.to_string(),
                    message: e.to_string(),
                }));
                Err(e.into())
            }
        }
    }

    /// Saves or removes the current track. Returns the new membership.
    pub async fn toggle_offline_current(&self) -> Result<bool> {
        let library = self.offline_library()?;
        let track = self
            .store
            .snapshot()
            .current_track
            .ok_or(ServiceError::NoCurrentTrack)?;
        Ok(library.toggle(OfflineEntry::from(&track)).await?)
    }

    pub async fn share_current(&self) -> Result<ShareOutcome> {
        Ok(self.store.share_track().await?)
    }
}

impl Drop for PlayerService {
    fn drop(&mut self) {
        if let Some(running) = self.running.get_mut().take() {
            running.pump.abort();
        }
    }
}

/// Routes adapter reports into the store and onto the event bus. Ends when
/// the adapter task drops its sender.
async fn pump_events(
    mut rx: mpsc::UnboundedReceiver<AdapterEvent>,
    store: Arc<PlayerStore>,
    transport: Arc<TransportController>,
    events: EventBus,
) {
    while let Some(event) = rx.recv().await {
        match event {
            AdapterEvent::TimeUpdate { media_id, seconds } => {
                transport.on_engine_time(&media_id, seconds)
            }
            AdapterEvent::DurationChange { media_id, seconds } => {
                transport.on_engine_duration(&media_id, seconds)
            }
            AdapterEvent::End => store.complete_track(),
            AdapterEvent::Ready => {
                let media_id = store
                    .snapshot()
                    .current_track
                    .map(|track| track.external_media_id)
                    .unwrap_or_default();
                let _ = events.emit(CoreEvent::Engine(EngineEvent::Ready { media_id }));
            }
            AdapterEvent::Failed(message) => {
                error!(message = %message, "Media engine failed");
                let _ = events.emit(CoreEvent::Engine(EngineEvent::Failed { message }));
            }
            AdapterEvent::Play => debug!("Engine started playing"),
            AdapterEvent::Pause => debug!("Engine paused"),
        }
    }
    debug!("Event pump finished");
}
