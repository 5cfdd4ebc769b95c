//! Poll loop: fetches status changes, maps them to messages and delivers them
//!
//! The loop owns the cursor. One iteration is `Fetching → (Mapping →
//! Notifying)? → Sleeping`; fetch and mapping failures take the short retry
//! sleep after a best-effort alert to the chat. Nothing in an iteration can
//! end the loop, only the cancellation token does.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::config::PollingConfig;
use crate::cursor::{Cursor, CursorStore};
use crate::error::ReviewNotifierError;
use crate::fetcher::{FetchResponse, StatusFetcher};
use crate::notifier::Notifier;
use crate::status::{map_status, StatusRecord};

/// Which of the two sleeps follows an iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SleepKind {
    Normal,
    Short,
}

/// Position of the loop in its state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Fetching,
    Mapping,
    Notifying,
    Sleeping(SleepKind),
}

/// Result of a single iteration
#[derive(Debug)]
pub enum PollOutcome {
    /// The response held no records
    NoChanges,
    /// The latest record was delivered
    Notified,
    /// Fetch or mapping failed; an alert was attempted
    Failed(ReviewNotifierError),
    /// The status message itself could not be delivered
    DeliveryFailed(ReviewNotifierError),
}

impl PollOutcome {
    pub fn sleep_kind(&self) -> SleepKind {
        match self {
            PollOutcome::NoChanges | PollOutcome::Notified => SleepKind::Normal,
            PollOutcome::Failed(_) | PollOutcome::DeliveryFailed(_) => SleepKind::Short,
        }
    }
}

#[derive(Debug)]
pub struct PollLoop {
    fetcher: Arc<dyn StatusFetcher>,
    notifier: Notifier,
    store: Arc<dyn CursorStore>,
    cursor: Cursor,
    interval: Duration,
    retry_interval: Duration,
    state: LoopState,
    cancel: CancellationToken,
}

impl PollLoop {
    pub fn new(
        fetcher: Arc<dyn StatusFetcher>,
        notifier: Notifier,
        store: Arc<dyn CursorStore>,
        polling: &PollingConfig,
        cancel: CancellationToken,
    ) -> Self {
        let cursor = store.load();
        Self {
            fetcher,
            notifier,
            store,
            cursor,
            interval: polling.interval,
            retry_interval: polling.retry_interval,
            state: LoopState::Idle,
            cancel,
        }
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn sleep_duration(&self, kind: SleepKind) -> Duration {
        match kind {
            SleepKind::Normal => self.interval,
            SleepKind::Short => self.retry_interval,
        }
    }

    /// Run iterations until the cancellation token is triggered
    pub async fn run(&mut self) {
        tracing::debug!("Poll loop started at cursor {}", self.cursor);

        while !self.cancel.is_cancelled() {
            let outcome = self.poll_once().await;
            let kind = outcome.sleep_kind();
            self.transition(LoopState::Sleeping(kind));

            let duration = self.sleep_duration(kind);
            tokio::select! {
                _ = tokio::time::sleep(duration) => {}
                _ = self.cancel.cancelled() => break,
            }
        }

        self.transition(LoopState::Idle);
        tracing::debug!("Poll loop cancelled at cursor {}", self.cursor);
    }

    /// One Fetch → Map → Notify pass. Never returns an error to the caller.
    pub async fn poll_once(&mut self) -> PollOutcome {
        self.transition(LoopState::Fetching);
        let response = match self.fetcher.fetch(self.cursor).await {
            Ok(response) => response,
            Err(e) => return self.fail(e).await,
        };

        let Some(entry) = response.latest() else {
            self.advance_cursor(&response);
            return PollOutcome::NoChanges;
        };

        self.transition(LoopState::Mapping);
        let mapped = StatusRecord::from_value(entry).and_then(|record| map_status(&record));
        let message = match mapped {
            Ok(message) => message,
            Err(e) => return self.fail(e.into()).await,
        };

        self.transition(LoopState::Notifying);
        if let Err(e) = self.notifier.notify(&message).await {
            // No alert here: it would go through the same failing channel.
            tracing::error!("Failed to deliver status update: {}", e);
            return PollOutcome::DeliveryFailed(e);
        }

        self.advance_cursor(&response);
        PollOutcome::Notified
    }

    async fn fail(&self, error: ReviewNotifierError) -> PollOutcome {
        let message = format!("Bot faced an error: {}.", error);
        tracing::error!("{}", message);

        if let Err(e) = self.notifier.notify(&message).await {
            tracing::error!("Failed to send error alert: {}", e);
        }
        PollOutcome::Failed(error)
    }

    fn advance_cursor(&mut self, response: &FetchResponse) {
        if let Some(current_date) = response.current_date {
            tracing::debug!("Cursor {} -> {}", self.cursor, current_date);
            self.cursor = current_date;
            self.store.save(current_date);
        }
    }

    fn transition(&mut self, next: LoopState) {
        tracing::debug!("{:?} -> {:?}", self.state, next);
        self.state = next;
    }
}
