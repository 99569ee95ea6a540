//! Background watcher for a submitted top-up request.
//!
//! After a card-transfer top-up is submitted, an admin reviews the receipt.
//! The watcher polls the user's top-up requests until one is approved, none
//! is pending any more, the time cap is reached or the watch is cancelled.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at, sleep_until};
use tracing::{debug, info, instrument, warn};
use tsmarket_core::RequestStatus;

use crate::api::ApiClient;
use crate::config::ClientConfig;
use crate::models::TopupRequest;

/// How recent an approval must be to count as the one being watched.
pub const DEFAULT_APPROVAL_WINDOW: Duration = Duration::from_secs(600);

/// Shortest interval a watch polls at; shorter settings are raised to it.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Polling cadence and limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchConfig {
    pub poll_interval: Duration,
    /// Give up after this long.
    pub max_duration: Duration,
    /// Approved requests older than this are ignored.
    pub approval_window: Duration,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(30),
            max_duration: Duration::from_secs(600),
            approval_window: DEFAULT_APPROVAL_WINDOW,
        }
    }
}

impl WatchConfig {
    /// This config with `poll_interval` raised to [`MIN_POLL_INTERVAL`].
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            poll_interval: self.poll_interval.max(MIN_POLL_INTERVAL),
            ..self
        }
    }
}

impl From<&ClientConfig> for WatchConfig {
    fn from(config: &ClientConfig) -> Self {
        Self {
            poll_interval: config.topup_poll_interval,
            max_duration: config.topup_watch_duration,
            approval_window: DEFAULT_APPROVAL_WINDOW,
        }
    }
}

/// What one poll of the request list means.
#[derive(Debug, Clone, PartialEq)]
pub enum PollVerdict {
    /// A request was approved within the approval window.
    Approved(TopupRequest),
    /// Something is still waiting for review.
    Pending,
    /// Nothing is waiting for review and nothing was recently approved.
    NoPending,
}

/// How a watch ended.
#[derive(Debug, Clone, PartialEq)]
pub enum WatchOutcome {
    Approved(TopupRequest),
    NoPending,
    TimedOut,
    Cancelled,
}

/// Classify a listing of the user's top-up requests.
#[must_use]
pub fn assess(requests: &[TopupRequest], now: DateTime<Utc>, window: Duration) -> PollVerdict {
    let window = TimeDelta::from_std(window).unwrap_or(TimeDelta::MAX);

    let approved = requests.iter().find(|r| {
        r.status == RequestStatus::Approved
            && r.created_at.is_some_and(|created| now - created <= window)
    });
    if let Some(request) = approved {
        return PollVerdict::Approved(request.clone());
    }

    if requests.iter().any(|r| r.status == RequestStatus::Pending) {
        PollVerdict::Pending
    } else {
        PollVerdict::NoPending
    }
}

/// Handle to a running watch. Dropping the handle cancels the watch.
#[derive(Debug)]
pub struct TopupWatch {
    handle: Option<JoinHandle<WatchOutcome>>,
    cancel: Option<oneshot::Sender<()>>,
}

impl TopupWatch {
    /// Start watching on the current tokio runtime.
    #[must_use]
    pub fn spawn(client: ApiClient, config: WatchConfig) -> Self {
        let (cancel, cancelled) = oneshot::channel();
        let handle = tokio::spawn(run(client, config.normalized(), cancelled));
        Self {
            handle: Some(handle),
            cancel: Some(cancel),
        }
    }

    /// Stop polling. [`Self::wait`] then returns [`WatchOutcome::Cancelled`]
    /// unless the watch had already finished.
    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            // The task may already be gone.
            let _ = cancel.send(());
        }
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Wait for the watch to end.
    ///
    /// # Panics
    ///
    /// Re-raises a panic from the watch task.
    pub async fn wait(mut self) -> WatchOutcome {
        let Some(handle) = self.handle.take() else {
            return WatchOutcome::Cancelled;
        };
        match handle.await {
            Ok(outcome) => outcome,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => {
                warn!(error = %e, "Top-up watch task was aborted");
                WatchOutcome::Cancelled
            }
        }
    }
}

impl Drop for TopupWatch {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[instrument(skip_all, fields(poll_secs = config.poll_interval.as_secs()))]
async fn run(
    client: ApiClient,
    config: WatchConfig,
    mut cancelled: oneshot::Receiver<()>,
) -> WatchOutcome {
    let start = Instant::now();
    let deadline = sleep_until(start + config.max_duration);
    tokio::pin!(deadline);

    let mut ticker = interval_at(start + config.poll_interval, config.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!("Watching top-up requests");
    loop {
        tokio::select! {
            biased;
            _ = &mut cancelled => {
                info!("Top-up watch cancelled");
                return WatchOutcome::Cancelled;
            }
            () = &mut deadline => {
                info!("Top-up watch timed out");
                return WatchOutcome::TimedOut;
            }
            _ = ticker.tick() => {}
        }

        let polled = tokio::select! {
            biased;
            _ = &mut cancelled => {
                info!("Top-up watch cancelled");
                return WatchOutcome::Cancelled;
            }
            polled = client.topup_requests() => polled,
        };

        match polled {
            Ok(requests) => match assess(&requests, Utc::now(), config.approval_window) {
                PollVerdict::Approved(request) => {
                    info!(request_id = %request.request_id, amount = %request.amount, "Top-up approved");
                    return WatchOutcome::Approved(request);
                }
                PollVerdict::NoPending => {
                    info!("No pending top-up requests left");
                    return WatchOutcome::NoPending;
                }
                PollVerdict::Pending => debug!(requests = requests.len(), "Top-up still pending"),
            },
            Err(e) => warn!(error = %e, "Top-up poll failed, will retry"),
        }
    }
}
