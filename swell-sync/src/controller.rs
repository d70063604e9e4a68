//! SyncController: keeps the mirror converged with the remote store
//!
//! 1. Visible full resync on start, before anything else
//! 2. Subscribe to the store's change feed
//! 3. Every change notification → silent resync (queued notifications coalesced)
//! 4. Channel status transitions → mirror realtime status
//! 5. Re-subscribe with exponential backoff when the feed ends, then catch up
//!    with a silent resync once subscribed again

use std::sync::Arc;
use std::time::Duration;

use shared::RealtimeStatus;
use swell_gateway::{ChangeFeed, ChannelStatus, FeedMessage};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::SyncConfig;
use crate::engine::{SyncEngine, SyncMode};

/// Why a feed session ended
enum SessionEnd {
    Shutdown,
    Lost { subscribed: bool },
}

pub struct SyncController {
    engine: Arc<SyncEngine>,
    shutdown: CancellationToken,
    reconnect_initial: Duration,
    reconnect_max: Duration,
    /// The mirror may have missed changes since it was last resynced
    needs_catch_up: bool,
}

impl SyncController {
    pub fn new(engine: Arc<SyncEngine>, config: &SyncConfig) -> Self {
        Self {
            engine,
            shutdown: CancellationToken::new(),
            reconnect_initial: config.reconnect_initial(),
            reconnect_max: config.reconnect_max(),
            needs_catch_up: false,
        }
    }

    /// Start the controller on the current runtime
    pub fn spawn(self) -> SyncHandle {
        let shutdown = self.shutdown.clone();
        let task = tokio::spawn(self.run());
        SyncHandle {
            shutdown,
            task: Some(task),
        }
    }

    async fn run(mut self) {
        tracing::info!("SyncController started");

        if let Err(e) = self.engine.refresh().await {
            tracing::warn!("Initial resync failed: {}", e);
            self.needs_catch_up = true;
        }

        let mut reconnect_delay = self.reconnect_initial;

        loop {
            if self.shutdown.is_cancelled() {
                break;
            }

            self.engine.set_realtime_status(RealtimeStatus::Connecting);
            let subscription = self.engine.gateway().subscribe().await;
            match subscription {
                Ok(feed) => match self.run_feed_session(feed).await {
                    SessionEnd::Shutdown => break,
                    SessionEnd::Lost { subscribed } => {
                        if subscribed {
                            reconnect_delay = self.reconnect_initial;
                        }
                        tracing::warn!(
                            delay_secs = reconnect_delay.as_secs(),
                            "Change feed lost, reconnecting"
                        );
                    }
                },
                Err(e) => {
                    tracing::warn!(
                        delay_secs = reconnect_delay.as_secs(),
                        "Change feed subscription failed: {}",
                        e
                    );
                }
            }
            self.engine.set_realtime_status(RealtimeStatus::Error);
            self.needs_catch_up = true;

            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = tokio::time::sleep(reconnect_delay) => {}
            }
            reconnect_delay = (reconnect_delay * 2).min(self.reconnect_max);
        }

        tracing::info!("SyncController stopped");
    }

    /// Consume one feed until it ends or the controller shuts down
    async fn run_feed_session(&mut self, mut feed: ChangeFeed) -> SessionEnd {
        let mut subscribed = false;

        loop {
            let msg = tokio::select! {
                _ = self.shutdown.cancelled() => {
                    feed.close();
                    return SessionEnd::Shutdown;
                }
                msg = feed.recv() => msg,
            };

            match msg {
                Some(FeedMessage::Status(status)) => {
                    if !self.on_status(status, &mut subscribed).await {
                        return SessionEnd::Lost { subscribed };
                    }
                }
                Some(FeedMessage::Change(event)) => {
                    let mut coalesced = 1usize;
                    let mut alive = true;
                    while let Some(queued) = feed.try_recv() {
                        match queued {
                            FeedMessage::Change(_) => coalesced += 1,
                            FeedMessage::Status(status) => {
                                alive &= self.apply_status(status, &mut subscribed);
                            }
                        }
                    }

                    tracing::debug!(
                        collection = %event.collection,
                        kind = ?event.kind,
                        coalesced,
                        "Remote change, resyncing"
                    );
                    match self.engine.resync(SyncMode::Silent).await {
                        Ok(()) => self.needs_catch_up = false,
                        Err(e) => {
                            tracing::warn!("Change-triggered resync failed: {}", e);
                            self.needs_catch_up = true;
                        }
                    }

                    if !alive {
                        return SessionEnd::Lost { subscribed };
                    }
                }
                None => return SessionEnd::Lost { subscribed },
            }
        }
    }

    /// Handle a status message; returns false when the channel is done
    async fn on_status(&mut self, status: ChannelStatus, subscribed: &mut bool) -> bool {
        let alive = self.apply_status(status, subscribed);

        if status == ChannelStatus::Subscribed && self.needs_catch_up {
            tracing::info!("Change feed subscribed, catching up");
            match self.engine.resync(SyncMode::Silent).await {
                Ok(()) => self.needs_catch_up = false,
                Err(e) => tracing::warn!("Catch-up resync failed: {}", e),
            }
        }
        alive
    }

    fn apply_status(&self, status: ChannelStatus, subscribed: &mut bool) -> bool {
        tracing::debug!(status = ?status, "Change feed status");
        self.engine.set_realtime_status(status.realtime_status());

        match status {
            ChannelStatus::Subscribed => {
                *subscribed = true;
                true
            }
            ChannelStatus::Connecting => true,
            ChannelStatus::ChannelError | ChannelStatus::TimedOut | ChannelStatus::Closed => false,
        }
    }
}

/// Owner handle of a running controller
///
/// Dropping the handle stops the controller without waiting for it.
#[derive(Debug)]
pub struct SyncHandle {
    shutdown: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl SyncHandle {
    /// Stop the controller and wait until its feed is torn down
    pub async fn shutdown(mut self) {
        self.shutdown.cancel();
        if let Some(task) = self.task.take()
            && let Err(e) = task.await
        {
            tracing::warn!("SyncController task failed: {}", e);
        }
    }
}

impl Drop for SyncHandle {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
