use std::{future::Future, pin::Pin, time::Duration};

use futures::{FutureExt, future::Shared};
use tokio::{
    sync::Mutex,
    time::{Instant, sleep},
};

use crate::{config, types::RateLimitQuota};

type SharedWait = Shared<Pin<Box<dyn Future<Output = ()> + Send>>>;

/// Tuning knobs for the rate governor.
///
/// `window` is the rolling quota window of the catalog service, `buffer` the
/// number of requests kept in reserve before throttling kicks in, and
/// `initial_limit` the assumed quota before the first server report arrives.
#[derive(Debug, Clone)]
pub struct RateGovernorConfig {
    pub window: Duration,
    pub buffer: u32,
    pub initial_limit: u32,
}

impl Default for RateGovernorConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(60),
            buffer: 3,
            initial_limit: 60,
        }
    }
}

impl RateGovernorConfig {
    pub fn from_env() -> Self {
        Self {
            window: config::rate_limit_window(),
            buffer: config::rate_limit_buffer(),
            initial_limit: config::rate_limit_initial(),
        }
    }
}

/// Observable snapshot of the governor for diagnostics and tests.
#[derive(Debug, Clone)]
pub struct RateGovernorStats {
    pub limit: u32,
    pub used: u32,
    pub remaining: u32,
    pub in_flight: u32,
    pub throttled: bool,
    pub waits_started: u64,
}

struct GovernorState {
    limit: u32,
    used: u32,
    remaining: u32,
    in_flight: u32,
    last_updated: Instant,
    pending_wait: Option<SharedWait>,
    waits_started: u64,
}

/// Client-side mirror of the catalog service's request quota.
///
/// The service reports its moving-window quota via response headers; this
/// governor tracks the latest report, counts requests that are in flight but
/// not yet reflected in the server counters, and makes callers wait out the
/// remainder of the window once the buffer would be breached.
///
/// The component is advisory only: it never fails, and a wait is bounded by
/// one quota window. Callers throttled during the same window all await a
/// single shared timer and unblock together.
pub struct RateGovernor {
    config: RateGovernorConfig,
    state: Mutex<GovernorState>,
}

impl RateGovernor {
    pub fn new(config: RateGovernorConfig) -> Self {
        let state = GovernorState {
            limit: config.initial_limit,
            used: 0,
            remaining: config.initial_limit,
            in_flight: 0,
            last_updated: Instant::now(),
            pending_wait: None,
            waits_started: 0,
        };

        Self {
            config,
            state: Mutex::new(state),
        }
    }

    /// Overwrites the mirrored quota fields present in the report and stamps
    /// the update time. Absent fields leave the prior values untouched.
    pub async fn update_from_quota(&self, quota: &RateLimitQuota) {
        let mut state = self.state.lock().await;
        if let Some(limit) = quota.limit {
            state.limit = limit;
        }
        if let Some(used) = quota.used {
            state.used = used;
        }
        if let Some(remaining) = quota.remaining {
            state.remaining = remaining;
        }
        state.last_updated = Instant::now();
    }

    /// Returns whether the next request would eat into the safety buffer.
    ///
    /// A quota report older than one window is considered stale: the mirror
    /// is reset to a full window first and the answer is `false`.
    pub async fn should_throttle(&self) -> bool {
        let mut state = self.state.lock().await;
        self.check_throttle(&mut state)
    }

    /// Waits out the remainder of the current quota window if throttled,
    /// otherwise returns immediately.
    ///
    /// The first throttled caller starts one timer for the remainder of the
    /// window; every caller arriving while it is pending awaits that same
    /// timer. A new timer can only be started after the previous one has
    /// resolved.
    pub async fn wait_if_needed(&self) {
        let wait = {
            let mut state = self.state.lock().await;
            if !self.check_throttle(&mut state) {
                return;
            }

            match &state.pending_wait {
                Some(wait) => wait.clone(),
                None => {
                    let elapsed = Instant::now().duration_since(state.last_updated);
                    let delay = self.config.window.saturating_sub(elapsed);
                    let timer: Pin<Box<dyn Future<Output = ()> + Send>> =
                        Box::pin(sleep(delay));
                    let wait = timer.shared();
                    state.pending_wait = Some(wait.clone());
                    state.waits_started += 1;
                    wait
                }
            }
        };

        wait.clone().await;

        // clear the slot only if it still holds the wait we awaited, a late
        // waker must not drop a newer timer
        let mut state = self.state.lock().await;
        if let Some(pending) = &state.pending_wait {
            if pending.ptr_eq(&wait) {
                state.pending_wait = None;
            }
        }
    }

    /// Counts a dispatched request against the buffer until
    /// [`finish_request`](Self::finish_request) is called.
    pub async fn start_request(&self) {
        self.state.lock().await.in_flight += 1;
    }

    pub async fn finish_request(&self) {
        let mut state = self.state.lock().await;
        state.in_flight = state.in_flight.saturating_sub(1);
    }

    pub async fn stats(&self) -> RateGovernorStats {
        let mut state = self.state.lock().await;
        let throttled = self.check_throttle(&mut state);
        RateGovernorStats {
            limit: state.limit,
            used: state.used,
            remaining: state.remaining,
            in_flight: state.in_flight,
            throttled,
            waits_started: state.waits_started,
        }
    }

    fn check_throttle(&self, state: &mut GovernorState) -> bool {
        let elapsed = Instant::now().duration_since(state.last_updated);
        if elapsed >= self.config.window {
            // stale report, assume a fresh window
            state.remaining = state.limit;
            state.used = 0;
            state.in_flight = 0;
            return false;
        }

        // in_flight may legitimately exceed remaining, keep the math signed
        (state.remaining as i64 - state.in_flight as i64) < self.config.buffer as i64
    }
}
