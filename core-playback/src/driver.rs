//! Runs a [`PlayerAdapter`] as a background task.
//!
//! The task waits for the first playable track, bootstraps the engine (with
//! the configured timeout), constructs the instance and then multiplexes
//! engine signals, store snapshots and the poll ticker until unmounted.

use std::sync::Arc;

use bridge_traits::media::EngineSignal;
use core_async::sync::{mpsc, watch, CancellationToken};
use core_async::task::{self, JoinHandle};
use core_async::time;
use tracing::{debug, warn};

use crate::adapter::{AdapterEvent, AdapterSettings, PlayerAdapter, ReconcileOutcome};
use crate::bootstrap::EngineBootstrap;
use crate::error::{PlaybackError, Result};
use crate::types::{DesiredPlayback, PlaybackSnapshot};

type SignalChannel = (
    mpsc::UnboundedSender<EngineSignal>,
    mpsc::UnboundedReceiver<EngineSignal>,
);

/// Handle to a mounted adapter task. Dropping it unmounts without waiting.
#[derive(Debug)]
pub struct AdapterHandle {
    cancel: CancellationToken,
    join: Option<JoinHandle<()>>,
}

impl AdapterHandle {
    /// Stops polling, destroys the engine and waits for the task to exit.
    pub async fn unmount(mut self) {
        self.cancel.cancel();
        if let Some(join) = self.join.take() {
            if let Err(e) = join.await {
                warn!(error = %e, "Adapter task ended abnormally");
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.join.as_ref().map_or(true, |join| join.is_finished())
    }
}

impl Drop for AdapterHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Mounts an adapter that follows `snapshots` and reports on `events`.
pub fn mount(
    bootstrap: Arc<EngineBootstrap>,
    snapshots: watch::Receiver<PlaybackSnapshot>,
    events: mpsc::UnboundedSender<AdapterEvent>,
    settings: AdapterSettings,
) -> AdapterHandle {
    let cancel = CancellationToken::new();
    let driver = AdapterDriver {
        adapter: PlayerAdapter::new(settings, events),
        bootstrap,
        snapshots,
    };
    let join = task::spawn(driver.run(cancel.clone()));
    AdapterHandle {
        cancel,
        join: Some(join),
    }
}

struct AdapterDriver {
    adapter: PlayerAdapter,
    bootstrap: Arc<EngineBootstrap>,
    snapshots: watch::Receiver<PlaybackSnapshot>,
}

impl AdapterDriver {
    async fn run(mut self, cancel: CancellationToken) {
        if let Some(channel) = self.start(&cancel).await {
            self.follow(&cancel, channel).await;
        } else {
            // Failed adapters stay inert until unmounted.
            cancel.cancelled().await;
        }
        self.adapter.destroy();
    }

    /// Waits for a track, loads the engine and constructs it.
    async fn start(&mut self, cancel: &CancellationToken) -> Option<SignalChannel> {
        let media_id = loop {
            if let Some(media_id) = self.snapshots.borrow_and_update().desired().media_id {
                break media_id;
            }
            core_async::select! {
                _ = cancel.cancelled() => return None,
                changed = self.snapshots.changed() => {
                    changed.ok()?;
                }
            }
        };

        self.adapter.begin_loading(&media_id);
        let outcome = core_async::select! {
            _ = cancel.cancelled() => return None,
            outcome = self.load_engine() => outcome,
        };
        if let Err(e) = outcome {
            self.adapter.fail(e.to_string());
            return None;
        }
        self.adapter.engine_loaded();

        let (signal_tx, signal_rx) = mpsc::unbounded_channel();
        let desired = self.snapshots.borrow_and_update().desired();
        let host = Arc::clone(self.bootstrap.host());
        if !self.adapter.construct(host.as_ref(), &desired, signal_tx.clone()) {
            return None;
        }
        Some((signal_tx, signal_rx))
    }

    async fn load_engine(&self) -> Result<()> {
        match self.adapter.settings().load_timeout {
            Some(limit) => time::timeout(limit, self.bootstrap.ensure_loaded())
                .await
                .map_err(|_| PlaybackError::EngineLoadTimeout(limit))?,
            None => self.bootstrap.ensure_loaded().await,
        }
    }

    async fn follow(
        &mut self,
        cancel: &CancellationToken,
        mut channel: SignalChannel,
    ) {
        let mut ticker = time::periodic(self.adapter.settings().poll_interval);
        let mut was_polling = self.adapter.is_polling();

        loop {
            let outcome = core_async::select! {
                biased;
                _ = cancel.cancelled() => break,
                Some(signal) = channel.1.recv() => {
                    let desired = self.snapshots.borrow().desired();
                    self.adapter.handle_signal(signal, &desired)
                }
                changed = self.snapshots.changed() => {
                    if changed.is_err() {
                        debug!("Player store dropped, stopping adapter");
                        break;
                    }
                    let desired = self.snapshots.borrow_and_update().desired();
                    self.adapter.reconcile(&desired)
                }
                _ = ticker.tick(), if self.adapter.is_polling() => {
                    self.adapter.poll();
                    ReconcileOutcome::Skipped
                }
            };

            if outcome == ReconcileOutcome::RebuildRequired {
                let desired = self.snapshots.borrow().desired();
                channel = self.rebuild(&desired);
            }

            let polling = self.adapter.is_polling();
            if polling && !was_polling {
                ticker.reset();
            }
            was_polling = polling;
        }
    }

    /// Rebuilds on a fresh signal channel so stale callbacks from the old
    /// instance are dropped.
    fn rebuild(&mut self, desired: &DesiredPlayback) -> SignalChannel {
        let (signal_tx, signal_rx) = mpsc::unbounded_channel();
        let host = Arc::clone(self.bootstrap.host());
        self.adapter.rebuild(host.as_ref(), desired, signal_tx.clone());
        (signal_tx, signal_rx)
    }
}
