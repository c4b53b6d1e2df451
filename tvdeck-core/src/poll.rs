// Polling a bookmarks file for changes

use crate::error::Result;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;
/// Shortest interval a config file may ask for.
pub const MIN_POLL_INTERVAL_MS: u64 = 100;

/// 32-bit polynomial rolling hash (`h * 31 + byte`, wrapping).
pub fn content_hash(bytes: &[u8]) -> u32 {
    bytes
        .iter()
        .fold(0u32, |hash, &byte| hash.wrapping_mul(31).wrapping_add(byte as u32))
}

/// The file being watched and the hash of what was last seen in it.
#[derive(Debug, Clone)]
pub struct PollState {
    source: PathBuf,
    last_hash: Option<u32>,
}

impl PollState {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            last_hash: None,
        }
    }

    /// Start from content that is already on screen.
    pub fn with_baseline(mut self, content: &[u8]) -> Self {
        self.last_hash = Some(content_hash(content));
        self
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Record `content` and report whether it differs from the last check.
    pub fn observe(&mut self, content: &[u8]) -> bool {
        let hash = content_hash(content);
        if self.last_hash == Some(hash) {
            return false;
        }
        self.last_hash = Some(hash);
        true
    }
}

/// Receives the new content whenever the watched file changes.
pub trait ChangeHandler: Send + Sync + 'static {
    fn on_change(&self, content: String) -> impl Future<Output = Result<usize>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollTick {
    Unchanged,
    Redrawn(usize),
    /// The file could not be read; the previous render stays.
    ReadFailed,
    /// The content changed but the handler rejected it.
    Rejected,
}

pub struct PollTarget<H> {
    state: PollState,
    handler: Arc<H>,
}

impl<H: ChangeHandler> PollTarget<H> {
    pub fn new(state: PollState, handler: Arc<H>) -> Self {
        Self { state, handler }
    }

    /// One check: re-read the file and hand it over if it changed. Failures
    /// are logged and swallowed.
    pub async fn tick_once(&mut self) -> PollTick {
        let bytes = match tokio::fs::read(self.state.source()).await {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!("Poll read of {} failed: {}", self.state.source().display(), e);
                return PollTick::ReadFailed;
            }
        };

        if !self.state.observe(&bytes) {
            return PollTick::Unchanged;
        }

        info!("{} changed, redrawing", self.state.source().display());
        let content = String::from_utf8_lossy(&bytes).into_owned();
        match self.handler.on_change(content).await {
            Ok(count) => PollTick::Redrawn(count),
            Err(e) => {
                debug!("Ignoring changed content: {}", e);
                PollTick::Rejected
            }
        }
    }
}

/// Owner of the single active poll task.
pub struct Poller {
    interval: Duration,
    task: Option<JoinHandle<()>>,
}

impl Poller {
    /// A zero interval is raised to one millisecond; the timer rejects zero.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
            task: None,
        }
    }

    /// Stop any running poll, then start polling `target`.
    pub fn replace<H: ChangeHandler>(&mut self, mut target: PollTarget<H>) {
        self.stop();

        let interval = self.interval;
        info!(
            "Polling {} every {}ms",
            target.state.source().display(),
            interval.as_millis()
        );

        self.task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                target.tick_once().await;
            }
        }));
    }

    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            debug!("Stopping previous poll task");
            task.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Default for Poller {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_POLL_INTERVAL_MS))
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop();
    }
}
