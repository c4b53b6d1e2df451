// Tests for change polling

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::Mutex;
use tvdeck_core::error::{DeckError, Result};
use tvdeck_core::{
    ChangeHandler, Deck, DeckRefresher, PollState, PollTarget, PollTick, Poller, SAMPLE_DOCUMENT,
};
use tvdeck_icons::{Candidate, IconBackend, IconResolver, ProbeOutcome, ResolverSettings};
use url::Url;

/// Counts every change it is handed; rejects content containing "reject".
#[derive(Default)]
struct CountingHandler {
    changes: AtomicUsize,
}

impl CountingHandler {
    fn changes(&self) -> usize {
        self.changes.load(Ordering::SeqCst)
    }
}

impl ChangeHandler for CountingHandler {
    async fn on_change(&self, content: String) -> Result<usize> {
        if content.contains("reject") {
            return Err(DeckError::Parse("rejected".to_string()));
        }
        Ok(self.changes.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

struct NoImages;

impl IconBackend for NoImages {
    async fn lookup_title_logo(&self, _title: &str) -> Option<Url> {
        None
    }

    async fn attempt(&self, _candidate: &Candidate) -> ProbeOutcome {
        ProbeOutcome::Failed
    }
}

fn write(dir: &TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("Bookmarks");
    std::fs::write(&path, content).unwrap();
    path
}

// ============================================================================
// Single Tick Tests
// ============================================================================

#[tokio::test]
async fn test_unchanged_content_never_redraws() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "{\"roots\": {}}");
    let handler = Arc::new(CountingHandler::default());
    let state = PollState::new(&path).with_baseline(b"{\"roots\": {}}");
    let mut target = PollTarget::new(state, handler.clone());

    for _ in 0..5 {
        assert_eq!(target.tick_once().await, PollTick::Unchanged);
    }
    assert_eq!(handler.changes(), 0);
}

#[tokio::test]
async fn test_one_byte_change_redraws_once() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "{\"roots\": {}}");
    let handler = Arc::new(CountingHandler::default());
    let state = PollState::new(&path).with_baseline(b"{\"roots\": {}}");
    let mut target = PollTarget::new(state, handler.clone());

    write(&dir, "{\"roots\": {} }");

    assert_eq!(target.tick_once().await, PollTick::Redrawn(1));
    assert_eq!(target.tick_once().await, PollTick::Unchanged);
    assert_eq!(target.tick_once().await, PollTick::Unchanged);
    assert_eq!(handler.changes(), 1);
}

#[tokio::test]
async fn test_rejected_change_is_not_retried() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "ok");
    let handler = Arc::new(CountingHandler::default());
    let mut target = PollTarget::new(PollState::new(&path).with_baseline(b"ok"), handler.clone());

    write(&dir, "reject me");

    assert_eq!(target.tick_once().await, PollTick::Rejected);
    assert_eq!(target.tick_once().await, PollTick::Unchanged);
    assert_eq!(handler.changes(), 0);
}

#[tokio::test]
async fn test_missing_file_is_swallowed() {
    let dir = TempDir::new().unwrap();
    let handler = Arc::new(CountingHandler::default());
    let state = PollState::new(dir.path().join("gone"));
    let mut target = PollTarget::new(state, handler.clone());

    assert_eq!(target.tick_once().await, PollTick::ReadFailed);
    assert_eq!(handler.changes(), 0);
}

// ============================================================================
// Deck Refresh Tests
// ============================================================================

#[tokio::test]
async fn test_broken_update_keeps_previous_render() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, SAMPLE_DOCUMENT);
    let output = dir.path().join("deck.html");

    let settings = ResolverSettings {
        network: false,
        ..ResolverSettings::default()
    };
    let mut deck = Deck::new(IconResolver::new(NoImages).with_settings(settings)).with_output(&output);
    deck.load_sample().await.unwrap();
    let before = deck.page().clone();

    let deck = Arc::new(Mutex::new(deck));
    let handler = Arc::new(DeckRefresher::new(deck.clone()));
    let state = PollState::new(&path).with_baseline(SAMPLE_DOCUMENT.as_bytes());
    let mut target = PollTarget::new(state, handler);

    write(&dir, "{\"roots\": ");
    assert_eq!(target.tick_once().await, PollTick::Rejected);
    assert_eq!(deck.lock().await.page(), &before);
    assert!(!output.exists());

    let updated = SAMPLE_DOCUMENT.replace("Stream 3", "Stream Three");
    write(&dir, &updated);
    assert_eq!(target.tick_once().await, PollTick::Redrawn(3));

    let deck = deck.lock().await;
    assert_eq!(deck.page().grid.cards()[2].title, "Stream Three");
    assert!(deck.page().status.to_string().starts_with("Auto-updated at "));
    assert!(output.exists());
}

// ============================================================================
// Poller Tests
// ============================================================================

#[tokio::test]
async fn test_replace_supersedes_previous_target() {
    let first_dir = TempDir::new().unwrap();
    let second_dir = TempDir::new().unwrap();
    let first_path = write(&first_dir, "first");
    let second_path = write(&second_dir, "second");

    let first = Arc::new(CountingHandler::default());
    let second = Arc::new(CountingHandler::default());

    let mut poller = Poller::new(Duration::from_millis(20));
    poller.replace(PollTarget::new(
        PollState::new(&first_path).with_baseline(b"first"),
        first.clone(),
    ));
    assert!(poller.is_running());

    // No baseline: the first tick of the new target counts as a change.
    poller.replace(PollTarget::new(PollState::new(&second_path), second.clone()));
    write(&first_dir, "first, edited");

    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(first.changes(), 0);
    assert_eq!(second.changes(), 1);
    assert!(poller.is_running());

    poller.stop();
    assert!(!poller.is_running());
}

#[tokio::test]
async fn test_zero_interval_keeps_polling() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "zero");
    let handler = Arc::new(CountingHandler::default());

    let mut poller = Poller::new(Duration::ZERO);
    poller.replace(PollTarget::new(PollState::new(&path), handler.clone()));

    tokio::time::sleep(Duration::from_millis(200)).await;

    assert!(poller.is_running());
    assert_eq!(handler.changes(), 1);
    poller.stop();
}
