//! # Core Configuration
//!
//! Builder for [`CoreConfig`], the single object handed to the service
//! façade. Every collaborator the core talks to is injected here; nothing is
//! looked up globally.
//!
//! ## Required bridges
//!
//! - `EngineHost`: loads the embeddable player and constructs instances
//!
//! ## Optional bridges
//!
//! - `HttpClient`: required when the catalog is enabled (desktop default: reqwest)
//! - `RecordStore`: required when the offline library is enabled (desktop default: SQLite)
//! - `ShareSheet`, `Clipboard`: sharing degrades to an error when both are absent
//! - `Clock`: defaults to the system clock
//!
//! `build()` fails fast with [`Error::CapabilityMissing`] when a required
//! bridge is absent, before any task is spawned:
//!
//! ```should_panic
//! use core_runtime::config::CoreConfig;
//!
//! CoreConfig::builder()
//!     .build()
//!     .expect("fails: no EngineHost");
//! ```
//!
//! ```ignore
//! use core_runtime::config::{CatalogSettings, CoreConfig};
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .engine_host(Arc::new(MyIframeHost::new()))
//!     .clipboard(Arc::new(MyClipboard))
//!     .catalog(CatalogSettings::default().with_api_key(std::env::var("CATALOG_KEY")?))
//!     .enable_catalog(true)
//!     .build()?;
//! ```

use crate::error::{Error, Result};
use bridge_traits::{
    Clipboard, Clock, EngineHost, HttpClient, RecordStore, ShareSheet, SystemClock,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;
pub const DEFAULT_SEEK_TOLERANCE_SECS: f64 = 1.0;
pub const DEFAULT_VOLUME: i32 = 80;
pub const DEFAULT_ENGINE_LOAD_TIMEOUT_MS: u64 = 15_000;
pub const DEFAULT_VIDEO_HOST: &str = "www.youtube.com";
pub const DEFAULT_CATALOG_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";
pub const DEFAULT_CATALOG_MAX_RESULTS: u32 = 20;

const MAX_POLL_INTERVAL_MS: u64 = 10_000;

/// Timing and defaults for the store and the engine adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSettings {
    /// Position polling period while the engine reports playing.
    pub poll_interval_ms: u64,
    /// Drift, in seconds, tolerated before the adapter forces a seek.
    pub seek_tolerance_secs: f64,
    pub default_volume: i32,
    pub default_audio_only: bool,
    /// Bound on the bootstrap load. `None` waits forever.
    pub engine_load_timeout_ms: Option<u64>,
    /// Host used in share links: `https://<host>/watch?v=<id>`.
    pub video_host: String,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            seek_tolerance_secs: DEFAULT_SEEK_TOLERANCE_SECS,
            default_volume: DEFAULT_VOLUME,
            default_audio_only: true,
            engine_load_timeout_ms: Some(DEFAULT_ENGINE_LOAD_TIMEOUT_MS),
            video_host: DEFAULT_VIDEO_HOST.to_string(),
        }
    }
}

impl PlaybackSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn engine_load_timeout(&self) -> Option<Duration> {
        self.engine_load_timeout_ms.map(Duration::from_millis)
    }

    pub fn with_poll_interval_ms(mut self, ms: u64) -> Self {
        self.poll_interval_ms = ms;
        self
    }

    pub fn with_seek_tolerance_secs(mut self, secs: f64) -> Self {
        self.seek_tolerance_secs = secs;
        self
    }

    pub fn with_default_volume(mut self, volume: i32) -> Self {
        self.default_volume = volume;
        self
    }

    pub fn with_default_audio_only(mut self, audio_only: bool) -> Self {
        self.default_audio_only = audio_only;
        self
    }

    pub fn with_engine_load_timeout_ms(mut self, timeout: Option<u64>) -> Self {
        self.engine_load_timeout_ms = timeout;
        self
    }

    pub fn with_video_host(mut self, host: impl Into<String>) -> Self {
        self.video_host = host.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 || self.poll_interval_ms > MAX_POLL_INTERVAL_MS {
            return Err(Error::Config(format!(
                "Poll interval must be between 1 and {} ms",
                MAX_POLL_INTERVAL_MS
            )));
        }

        if !self.seek_tolerance_secs.is_finite() || self.seek_tolerance_secs < 0.0 {
            return Err(Error::Config(
                "Seek tolerance must be a non-negative number of seconds".to_string(),
            ));
        }

        if !(0..=100).contains(&self.default_volume) {
            return Err(Error::Config(
                "Default volume must be within 0..=100".to_string(),
            ));
        }

        if self.engine_load_timeout_ms == Some(0) {
            return Err(Error::Config(
                "Engine load timeout must be greater than 0 ms; use None to wait forever"
                    .to_string(),
            ));
        }

        if self.video_host.trim().is_empty() {
            return Err(Error::Config("Video host cannot be empty".to_string()));
        }

        Ok(())
    }
}

/// Catalog endpoint settings.
///
/// The API key must come from the host's configuration (environment,
/// secure settings). It is never compiled in.
#[derive(Clone, PartialEq, Eq)]
pub struct CatalogSettings {
    pub base_url: String,
    pub api_key: Option<String>,
    pub max_results: u32,
    pub request_timeout_ms: u64,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_CATALOG_BASE_URL.to_string(),
            api_key: None,
            max_results: DEFAULT_CATALOG_MAX_RESULTS,
            request_timeout_ms: 10_000,
        }
    }
}

impl std::fmt::Debug for CatalogSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogSettings")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("max_results", &self.max_results)
            .field("request_timeout_ms", &self.request_timeout_ms)
            .finish()
    }
}

impl CatalogSettings {
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("https://") || self.base_url.starts_with("http://")) {
            return Err(Error::Config(
                "Catalog base URL must be an http(s) URL".to_string(),
            ));
        }

        if self.max_results == 0 || self.max_results > 50 {
            return Err(Error::Config(
                "Catalog max results must be within 1..=50".to_string(),
            ));
        }

        if self.request_timeout_ms == 0 {
            return Err(Error::Config(
                "Catalog request timeout must be greater than 0 ms".to_string(),
            ));
        }

        Ok(())
    }
}

/// Optional subsystems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeatureFlags {
    /// Catalog search (requires `HttpClient` and an API key)
    pub enable_catalog: bool,
    /// Offline metadata library (requires `RecordStore`)
    pub enable_offline_library: bool,
}

#[derive(Clone)]
pub struct CoreConfig {
    /// SQLite file backing the default record store.
    pub database_path: Option<PathBuf>,
    pub engine_host: Arc<dyn EngineHost>,
    pub http_client: Option<Arc<dyn HttpClient>>,
    pub record_store: Option<Arc<dyn RecordStore>>,
    pub share_sheet: Option<Arc<dyn ShareSheet>>,
    pub clipboard: Option<Arc<dyn Clipboard>>,
    pub clock: Arc<dyn Clock>,
    pub playback: PlaybackSettings,
    pub catalog: CatalogSettings,
    pub features: FeatureFlags,
    pub event_buffer_size: usize,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("database_path", &self.database_path)
            .field("engine_host", &"EngineHost { ... }")
            .field("http_client", &self.http_client.as_ref().map(|_| "HttpClient { ... }"))
            .field("record_store", &self.record_store.as_ref().map(|_| "RecordStore { ... }"))
            .field("share_sheet", &self.share_sheet.as_ref().map(|_| "ShareSheet { ... }"))
            .field("clipboard", &self.clipboard.as_ref().map(|_| "Clipboard { ... }"))
            .field("playback", &self.playback)
            .field("catalog", &self.catalog)
            .field("features", &self.features)
            .field("event_buffer_size", &self.event_buffer_size)
            .finish()
    }
}

impl CoreConfig {
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Checks settings ranges and that enabled features have what they need.
    pub fn validate(&self) -> Result<()> {
        self.playback.validate()?;

        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        if self.features.enable_catalog {
            self.catalog.validate()?;

            if self.http_client.is_none() {
                return Err(http_client_missing_error());
            }

            match &self.catalog.api_key {
                Some(key) if !key.trim().is_empty() => {}
                _ => {
                    return Err(Error::Config(
                        "Catalog enabled but no API key configured. \
                         Supply one with CatalogSettings::with_api_key or disable the catalog."
                            .to_string(),
                    ))
                }
            }
        }

        if self.features.enable_offline_library && self.record_store.is_none() {
            return Err(record_store_missing_error());
        }

        Ok(())
    }
}

fn engine_host_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "EngineHost".to_string(),
        message: "An EngineHost is required to load and drive the embedded media player. \
                 Web: inject the iframe-API host. Desktop/mobile: inject the webview host."
            .to_string(),
    }
}

fn http_client_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "HttpClient".to_string(),
        message: "Catalog search needs an HttpClient. \
                 Desktop: enable the 'desktop-shims' feature to use ReqwestHttpClient. \
                 Other hosts: inject a platform client or disable the catalog."
            .to_string(),
    }
}

fn record_store_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "RecordStore".to_string(),
        message: "The offline library needs a RecordStore. \
                 Desktop: enable the 'desktop-shims' feature to use SqliteRecordStore. \
                 Web: inject a localStorage/IndexedDB store."
            .to_string(),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_http_client() -> Result<Arc<dyn HttpClient>> {
    let client = bridge_desktop::ReqwestHttpClient::new()
        .map_err(|e| Error::DefaultBridge(format!("Failed to create default HttpClient: {}", e)))?;
    Ok(Arc::new(client))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_http_client() -> Result<Arc<dyn HttpClient>> {
    Err(http_client_missing_error())
}

/// Opens the SQLite record store on a dedicated thread so `build()` works
/// both inside and outside a tokio runtime.
#[cfg(feature = "desktop-shims")]
fn provide_default_record_store(database_path: PathBuf) -> Result<Arc<dyn RecordStore>> {
    use bridge_desktop::SqliteRecordStore;
    use core_async::runtime::Builder;

    let open = move || -> Result<SqliteRecordStore> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| {
                Error::DefaultBridge(format!(
                    "Failed to create runtime for default RecordStore: {}",
                    e
                ))
            })?;

        runtime
            .block_on(SqliteRecordStore::new(&database_path))
            .map_err(|e| Error::DefaultBridge(format!("Failed to open default RecordStore: {}", e)))
    };

    let store = std::thread::spawn(open).join().map_err(|_| {
        Error::DefaultBridge("Thread opening the default RecordStore panicked".to_string())
    })??;

    Ok(Arc::new(store))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_record_store(_database_path: PathBuf) -> Result<Arc<dyn RecordStore>> {
    Err(record_store_missing_error())
}

#[cfg(feature = "desktop-shims")]
fn default_database_path() -> Option<PathBuf> {
    Some(bridge_desktop::default_database_path())
}

#[cfg(not(feature = "desktop-shims"))]
fn default_database_path() -> Option<PathBuf> {
    None
}

#[derive(Default)]
pub struct CoreConfigBuilder {
    database_path: Option<PathBuf>,
    engine_host: Option<Arc<dyn EngineHost>>,
    http_client: Option<Arc<dyn HttpClient>>,
    record_store: Option<Arc<dyn RecordStore>>,
    share_sheet: Option<Arc<dyn ShareSheet>>,
    clipboard: Option<Arc<dyn Clipboard>>,
    clock: Option<Arc<dyn Clock>>,
    playback: Option<PlaybackSettings>,
    catalog: Option<CatalogSettings>,
    features: FeatureFlags,
    event_buffer_size: Option<usize>,
}

impl CoreConfigBuilder {
    pub fn database_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.database_path = Some(path.into());
        self
    }

    pub fn engine_host(mut self, host: Arc<dyn EngineHost>) -> Self {
        self.engine_host = Some(host);
        self
    }

    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn record_store(mut self, store: Arc<dyn RecordStore>) -> Self {
        self.record_store = Some(store);
        self
    }

    pub fn share_sheet(mut self, sheet: Arc<dyn ShareSheet>) -> Self {
        self.share_sheet = Some(sheet);
        self
    }

    pub fn clipboard(mut self, clipboard: Arc<dyn Clipboard>) -> Self {
        self.clipboard = Some(clipboard);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn playback(mut self, settings: PlaybackSettings) -> Self {
        self.playback = Some(settings);
        self
    }

    pub fn catalog(mut self, settings: CatalogSettings) -> Self {
        self.catalog = Some(settings);
        self
    }

    pub fn enable_catalog(mut self, enable: bool) -> Self {
        self.features.enable_catalog = enable;
        self
    }

    pub fn enable_offline_library(mut self, enable: bool) -> Self {
        self.features.enable_offline_library = enable;
        self
    }

    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    /// Builds and validates the configuration.
    ///
    /// With the `desktop-shims` feature, an enabled feature whose bridge was
    /// not injected gets the desktop implementation.
    ///
    /// # Errors
    ///
    /// - [`Error::CapabilityMissing`] when the engine host, or a bridge an
    ///   enabled feature needs, is absent
    /// - [`Error::Config`] when a setting is out of range
    pub fn build(self) -> Result<CoreConfig> {
        let engine_host = self.engine_host.ok_or_else(engine_host_missing_error)?;
        let database_path = self.database_path.or_else(default_database_path);

        let http_client = match self.http_client {
            Some(client) => Some(client),
            None if self.features.enable_catalog => Some(provide_default_http_client()?),
            None => None,
        };

        let record_store = match self.record_store {
            Some(store) => Some(store),
            None if self.features.enable_offline_library => {
                let path = database_path.clone().ok_or_else(record_store_missing_error)?;
                Some(provide_default_record_store(path)?)
            }
            None => None,
        };

        let config = CoreConfig {
            database_path,
            engine_host,
            http_client,
            record_store,
            share_sheet: self.share_sheet,
            clipboard: self.clipboard,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            playback: self.playback.unwrap_or_default(),
            catalog: self.catalog.unwrap_or_default(),
            features: self.features,
            event_buffer_size: self
                .event_buffer_size
                .unwrap_or(crate::events::DEFAULT_EVENT_BUFFER_SIZE),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::{
        BridgeError, EngineOptions, HttpRequest, HttpResponse, MediaEngine, SignalSender,
    };

    struct StubHost;

    #[async_trait]
    impl EngineHost for StubHost {
        async fn load_engine(&self) -> BridgeResult<()> {
            Ok(())
        }

        fn is_engine_available(&self) -> bool {
            true
        }

        fn create_engine(
            &self,
            _options: EngineOptions,
            _signals: SignalSender,
        ) -> BridgeResult<Box<dyn MediaEngine>> {
            Err(BridgeError::not_available("player"))
        }
    }

    struct StubHttp;

    #[async_trait]
    impl HttpClient for StubHttp {
        async fn execute(&self, _request: HttpRequest) -> BridgeResult<HttpResponse> {
            Err(BridgeError::not_available("network"))
        }
    }

    struct StubStore;

    #[async_trait]
    impl RecordStore for StubStore {
        async fn put(&self, _key: &str, _value: &str) -> BridgeResult<()> {
            Ok(())
        }

        async fn get(&self, _key: &str) -> BridgeResult<Option<String>> {
            Ok(None)
        }

        async fn delete(&self, _key: &str) -> BridgeResult<bool> {
            Ok(false)
        }

        async fn list_all(&self) -> BridgeResult<Vec<(String, String)>> {
            Ok(Vec::new())
        }
    }

    fn base() -> CoreConfigBuilder {
        CoreConfig::builder().engine_host(Arc::new(StubHost))
    }

    #[test]
    fn test_missing_engine_host_is_capability_error() {
        let err = CoreConfig::builder().build().unwrap_err();
        assert_eq!(err.missing_capability(), Some("EngineHost"));
    }

    #[test]
    fn test_defaults() {
        let config = base().build().unwrap();

        assert_eq!(config.playback.poll_interval(), Duration::from_millis(500));
        assert_eq!(config.playback.seek_tolerance_secs, 1.0);
        assert_eq!(config.playback.default_volume, 80);
        assert!(config.playback.default_audio_only);
        assert_eq!(
            config.playback.engine_load_timeout(),
            Some(Duration::from_secs(15))
        );
        assert_eq!(config.playback.video_host, "www.youtube.com");
        assert_eq!(config.catalog.max_results, 20);
        assert_eq!(config.features, FeatureFlags::default());
        assert!(config.http_client.is_none());
        assert!(config.record_store.is_none());
    }

    #[test]
    fn test_invalid_playback_settings_rejected() {
        let cases = [
            PlaybackSettings::default().with_poll_interval_ms(0),
            PlaybackSettings::default().with_poll_interval_ms(60_000),
            PlaybackSettings::default().with_seek_tolerance_secs(f64::NAN),
            PlaybackSettings::default().with_seek_tolerance_secs(-0.5),
            PlaybackSettings::default().with_default_volume(101),
            PlaybackSettings::default().with_engine_load_timeout_ms(Some(0)),
            PlaybackSettings::default().with_video_host("  "),
        ];

        for settings in cases {
            let result = base().playback(settings.clone()).build();
            assert!(
                matches!(result, Err(Error::Config(_))),
                "expected rejection for {:?}",
                settings
            );
        }
    }

    #[test]
    fn test_load_timeout_can_be_disabled() {
        let config = base()
            .playback(PlaybackSettings::default().with_engine_load_timeout_ms(None))
            .build()
            .unwrap();
        assert_eq!(config.playback.engine_load_timeout(), None);
    }

    #[test]
    fn test_catalog_requires_api_key() {
        let result = base()
            .http_client(Arc::new(StubHttp))
            .enable_catalog(true)
            .build();
        assert!(matches!(result, Err(Error::Config(_))));

        let config = base()
            .http_client(Arc::new(StubHttp))
            .catalog(CatalogSettings::default().with_api_key("k"))
            .enable_catalog(true)
            .build()
            .unwrap();
        assert!(config.features.enable_catalog);
    }

    #[test]
    fn test_catalog_settings_validation() {
        assert!(CatalogSettings::default().with_max_results(0).validate().is_err());
        assert!(CatalogSettings::default().with_max_results(51).validate().is_err());
        assert!(CatalogSettings::default()
            .with_base_url("ftp://catalog")
            .validate()
            .is_err());
        assert!(CatalogSettings::default().validate().is_ok());
    }

    #[test]
    fn test_api_key_not_in_debug_output() {
        let settings = CatalogSettings::default().with_api_key("super-secret");
        let rendered = format!("{:?}", settings);
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn test_offline_library_with_injected_store() {
        let config = base()
            .record_store(Arc::new(StubStore))
            .enable_offline_library(true)
            .build()
            .unwrap();
        assert!(config.record_store.is_some());
    }

    #[cfg(not(feature = "desktop-shims"))]
    #[test]
    fn test_offline_library_without_store_fails() {
        let err = base().enable_offline_library(true).build().unwrap_err();
        assert!(matches!(
            err,
            Error::CapabilityMissing { ref capability, .. } if capability == "RecordStore"
        ));
    }

    #[cfg(not(feature = "desktop-shims"))]
    #[test]
    fn test_catalog_without_http_client_fails() {
        let err = base()
            .catalog(CatalogSettings::default().with_api_key("k"))
            .enable_catalog(true)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            Error::CapabilityMissing { ref capability, .. } if capability == "HttpClient"
        ));
    }

    #[cfg(feature = "desktop-shims")]
    #[test]
    fn test_desktop_shims_provide_record_store() {
        let dir = std::env::temp_dir().join(format!(
            "tunestream-config-{}",
            std::process::id()
        ));
        let config = base()
            .database_path(dir.join("library.db"))
            .enable_offline_library(true)
            .build()
            .unwrap();

        assert!(config.record_store.is_some());
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_zero_event_buffer_rejected() {
        assert!(matches!(
            base().event_buffer_size(0).build(),
            Err(Error::Config(_))
        ));
    }
}
