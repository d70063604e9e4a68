//! Debounced syncing indicator
//!
//! Raised when a visible sync starts; lowered only after every in-flight
//! sync has finished and the clear delay has elapsed without a new one
//! starting.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use crate::mirror::LocalMirror;

#[derive(Debug, Default)]
struct IndicatorState {
    in_flight: usize,
    pending_clear: Option<CancellationToken>,
}

#[derive(Debug, Clone)]
pub(crate) struct SyncIndicator {
    mirror: LocalMirror,
    delay: Duration,
    state: Arc<Mutex<IndicatorState>>,
}

impl SyncIndicator {
    pub(crate) fn new(mirror: LocalMirror, delay: Duration) -> Self {
        Self {
            mirror,
            delay,
            state: Arc::new(Mutex::new(IndicatorState::default())),
        }
    }

    /// Raise the indicator until the returned guard is dropped
    pub(crate) fn begin(&self) -> IndicatorGuard {
        let mut state = self.state.lock();
        state.in_flight += 1;
        if let Some(token) = state.pending_clear.take() {
            token.cancel();
        }
        self.mirror.update(|s| s.is_syncing = true);
        drop(state);

        IndicatorGuard {
            indicator: self.clone(),
        }
    }

    fn finish(&self) {
        let mut state = self.state.lock();
        state.in_flight = state.in_flight.saturating_sub(1);
        if state.in_flight > 0 {
            return;
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            // No runtime left to run the timer on
            self.mirror.update(|s| s.is_syncing = false);
            return;
        };

        let token = CancellationToken::new();
        if let Some(previous) = state.pending_clear.replace(token.clone()) {
            previous.cancel();
        }
        drop(state);

        let indicator = self.clone();
        runtime.spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(indicator.delay) => indicator.clear_if_idle(&token),
            }
        });
    }

    fn clear_if_idle(&self, token: &CancellationToken) {
        let mut state = self.state.lock();
        if token.is_cancelled() || state.in_flight > 0 {
            return;
        }
        state.pending_clear = None;
        self.mirror.update(|s| s.is_syncing = false);
    }
}

/// Keeps the indicator raised while alive
#[derive(Debug)]
pub(crate) struct IndicatorGuard {
    indicator: SyncIndicator,
}

impl Drop for IndicatorGuard {
    fn drop(&mut self) {
        self.indicator.finish();
    }
}
