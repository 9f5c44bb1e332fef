//! Process-wide memo for the engine bootstrap.
//!
//! The bootstrap resource is requested at most once per successful load.
//! Concurrent mounts share one in-flight request, and a mount that gives up
//! waiting does not cancel it. A failed load is forgotten so the next mount
//! retries.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bridge_traits::media::EngineHost;
use core_async::task;
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::error::{PlaybackError, Result};

type LoadOutcome = std::result::Result<(), String>;
type SharedLoad = Shared<BoxFuture<'static, LoadOutcome>>;

pub struct EngineBootstrap {
    host: Arc<dyn EngineHost>,
    inflight: Mutex<Option<SharedLoad>>,
    loaded: AtomicBool,
}

impl EngineBootstrap {
    pub fn new(host: Arc<dyn EngineHost>) -> Self {
        Self {
            host,
            inflight: Mutex::new(None),
            loaded: AtomicBool::new(false),
        }
    }

    pub fn host(&self) -> &Arc<dyn EngineHost> {
        &self.host
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::Acquire) || self.host.is_engine_available()
    }

    /// Resolves once the engine global is registered.
    pub async fn ensure_loaded(&self) -> Result<()> {
        if self.is_loaded() {
            return Ok(());
        }

        let load = self.shared_load();
        match load.clone().await {
            Ok(()) if self.host.is_engine_available() => {
                self.loaded.store(true, Ordering::Release);
                Ok(())
            }
            Ok(()) => {
                self.forget(&load);
                Err(PlaybackError::EngineUnavailable(
                    "bootstrap finished without registering the engine".to_string(),
                ))
            }
            Err(message) => {
                self.forget(&load);
                Err(PlaybackError::EngineUnavailable(message))
            }
        }
    }

    fn shared_load(&self) -> SharedLoad {
        let mut slot = self.inflight.lock();
        if let Some(load) = slot.as_ref() {
            debug!("Joining in-flight engine bootstrap");
            return load.clone();
        }

        debug!("Requesting engine bootstrap");
        let host = Arc::clone(&self.host);
        // Spawned so that a caller timing out does not abort the request.
        let handle = task::spawn(async move { host.load_engine().await.map_err(|e| e.to_string()) });
        let load = async move {
            match handle.await {
                Ok(outcome) => outcome,
                Err(e) => Err(format!("bootstrap task aborted: {}", e)),
            }
        }
        .boxed()
        .shared();

        *slot = Some(load.clone());
        load
    }

    fn forget(&self, load: &SharedLoad) {
        let mut slot = self.inflight.lock();
        if slot.as_ref().is_some_and(|current| current.ptr_eq(load)) {
            warn!("Engine bootstrap failed, next mount will retry");
            *slot = None;
        }
    }
}

impl std::fmt::Debug for EngineBootstrap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineBootstrap")
            .field("loaded", &self.is_loaded())
            .field("inflight", &self.inflight.lock().is_some())
            .finish()
    }
}
