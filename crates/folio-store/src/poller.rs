//! Interval-gated refresh of the message inbox.
//!
//! The time of the last successful fetch is kept in a small JSON file so the
//! interval holds across restarts: a poller started two minutes after the
//! previous one fetched waits out the remaining three.

use chrono::{DateTime, Utc};
use folio_common::error::{FolioError, FolioResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::messages::MessagesContext;

/// Refresh interval of the inbox.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// How early a tick may land and still count as due. Ticks fire one interval
/// apart, but the recorded wall-clock time drifts by the wake-up latency.
pub const TICK_TOLERANCE: Duration = Duration::from_secs(5);

#[derive(Debug, Serialize, Deserialize)]
struct GateFile {
    last_fetched_at: DateTime<Utc>,
}

/// Persisted "last fetched" timestamp plus the interval it gates.
#[derive(Debug, Clone)]
pub struct PollGate {
    path: PathBuf,
    interval: Duration,
}

impl PollGate {
    pub fn new(path: impl Into<PathBuf>, interval: Duration) -> Self {
        Self { path: path.into(), interval }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Last recorded fetch. A missing or unreadable file counts as never.
    pub async fn last_fetched(&self) -> Option<DateTime<Utc>> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "cannot read poll state");
                return None;
            }
        };
        match serde_json::from_slice::<GateFile>(&raw) {
            Ok(file) => Some(file.last_fetched_at),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "ignoring corrupt poll state");
                None
            }
        }
    }

    pub async fn is_due(&self, now: DateTime<Utc>) -> bool {
        match self.last_fetched().await {
            None => true,
            Some(last) => (now - last)
                .to_std()
                .is_ok_and(|elapsed| elapsed + TICK_TOLERANCE >= self.interval),
        }
    }

    pub async fn record(&self, now: DateTime<Utc>) -> FolioResult<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir).await.map_err(io_error)?;
        }
        let body = serde_json::to_vec_pretty(&GateFile { last_fetched_at: now })
            .map_err(|e| FolioError::Internal(e.into()))?;
        tokio::fs::write(&self.path, body).await.map_err(io_error)
    }
}

fn io_error(e: std::io::Error) -> FolioError {
    FolioError::Internal(anyhow::Error::new(e).context("cannot write poll state"))
}

/// Background task that refreshes [`MessagesContext`] whenever the gate
/// says the interval has passed.
pub struct MessagePoller {
    messages: Arc<MessagesContext>,
    gate: PollGate,
}

impl MessagePoller {
    pub fn new(messages: Arc<MessagesContext>, gate: PollGate) -> Self {
        Self { messages, gate }
    }

    /// Fetch if due. Returns whether a fetch happened. A failed fetch does
    /// not advance the gate, so the next tick tries again.
    pub async fn poll_once(&self, now: DateTime<Utc>) -> FolioResult<bool> {
        if !self.gate.is_due(now).await {
            return Ok(false);
        }
        let items = self.messages.fetch_all().await?;
        self.gate.record(now).await?;
        let unread = self.messages.unread_count().await;
        tracing::debug!(count = items.len(), unread, "inbox refreshed");
        Ok(true)
    }

    /// Tick every interval until `cancel` fires. The first tick is immediate.
    pub async fn run(self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.gate.interval());
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("message poller stopped");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.poll_once(Utc::now()).await {
                        tracing::warn!(error = %e, "message poll failed");
                    }
                }
            }
        }
    }
}
