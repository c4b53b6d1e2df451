// Tests for the parse -> extract -> render pipeline

use scraper::{Html, Selector};
use std::sync::Mutex;
use tempfile::TempDir;
use tvdeck_core::{Deck, DeckError, Status, render_html};
use tvdeck_icons::{
    Candidate, IconBackend, IconCatalog, IconResolver, ProbeOutcome,
    ResolverSettings,
};
use url::Url;

/// Backend where only the listed hrefs load; records every request.
#[derive(Default)]
struct StubBackend {
    loads: Vec<String>,
    calls: Mutex<Vec<String>>,
}

impl IconBackend for StubBackend {
    async fn lookup_title_logo(&self, title: &str) -> Option<Url> {
        self.calls.lock().unwrap().push(format!("logo:{}", title));
        None
    }

    async fn attempt(&self, candidate: &Candidate) -> ProbeOutcome {
        self.calls.lock().unwrap().push(candidate.href().to_string());
        if self.loads.iter().any(|href| href == candidate.href()) {
            ProbeOutcome::Loaded(Some((64, 64)))
        } else {
            ProbeOutcome::Failed
        }
    }
}

fn offline_deck(backend: StubBackend) -> Deck<StubBackend> {
    let settings = ResolverSettings {
        network: false,
        ..ResolverSettings::default()
    };
    Deck::new(IconResolver::new(backend).with_settings(settings))
}

fn count(html: &str, selector: &str) -> usize {
    let document = Html::parse_document(html);
    let selector = Selector::parse(selector).unwrap();
    document.select(&selector).count()
}

const SINGLE_STREAM: &str = r#"{"roots":{"bookmark_bar":{"children":[
    {"name":"TV","type":"folder","children":[
        {"name":"Stream 1","type":"url","url":"https://example.com"}
    ]}
]}}}"#;

// ============================================================================
// Pipeline Tests
// ============================================================================

#[tokio::test]
async fn test_single_stream_renders_one_card() {
    let mut deck = offline_deck(StubBackend::default());

    let rendered = deck.load_text(SINGLE_STREAM).await.unwrap();
    assert_eq!(rendered, 1);

    let html = deck.to_html();
    let document = Html::parse_document(&html);
    let card_selector = Selector::parse("article.card").unwrap();
    let cards: Vec<_> = document.select(&card_selector).collect();
    assert_eq!(cards.len(), 1);

    let link_selector = Selector::parse("a").unwrap();
    let link = cards[0].select(&link_selector).next().unwrap();
    assert_eq!(link.value().attr("href"), Some("https://example.com"));
    assert_eq!(link.value().attr("target"), Some("_blank"));
    assert_eq!(link.value().attr("rel"), Some("noreferrer"));

    let title_selector = Selector::parse("h3").unwrap();
    let title = cards[0].select(&title_selector).next().unwrap();
    assert_eq!(title.text().collect::<String>(), "Stream 1");

    assert_eq!(
        deck.page().status,
        Status::Showing {
            count: 1,
            folder: "TV".to_string()
        }
    );
}

#[tokio::test]
async fn test_missing_folder_clears_grid_and_reports_not_found() {
    let mut deck = offline_deck(StubBackend::default());
    deck.load_text(SINGLE_STREAM).await.unwrap();
    assert_eq!(deck.page().grid.len(), 1);

    let other = r#"{"roots":{"bookmark_bar":{"children":[
        {"name":"News","type":"folder","children":[]}
    ]}}}"#;
    let result = deck.load_text(other).await;

    assert!(matches!(result, Err(DeckError::FolderNotFound(_))));
    assert!(deck.page().grid.is_empty());
    assert_eq!(deck.page().status.to_string(), "Folder 'TV' not found.");

    let html = deck.to_html();
    assert_eq!(count(&html, "article.card"), 0);
    assert_eq!(count(&html, "#status.is-error"), 1);
    assert_eq!(count(&html, ".grid__empty"), 0);
}

#[tokio::test]
async fn test_empty_folder_reports_no_links() {
    let mut deck = offline_deck(StubBackend::default());
    let empty = r#"{"roots":{"other":{"children":[
        {"name":"TV","type":"folder","children":[
            {"name":"Nothing here","type":"folder","children":[]}
        ]}
    ]}}}"#;

    let rendered = deck.load_text(empty).await.unwrap();

    assert_eq!(rendered, 0);
    assert_eq!(deck.page().status.to_string(), "No links found in the TV folder.");
    assert!(!deck.page().status.is_error());

    let html = deck.to_html();
    assert_eq!(count(&html, "article.card"), 0);
    assert_eq!(count(&html, ".grid__empty"), 1);
}

#[tokio::test]
async fn test_invalid_json_reports_parse_failure() {
    let mut deck = offline_deck(StubBackend::default());
    deck.load_sample().await.unwrap();

    let result = deck.load_text("not json at all").await;

    assert!(matches!(result, Err(DeckError::Parse(_))));
    assert_eq!(deck.page().status, Status::ParseFailed);
    assert!(deck.page().grid.is_empty());
}

#[tokio::test]
async fn test_custom_folder_name() {
    let mut deck = offline_deck(StubBackend::default()).with_folder_name("News");
    let text = r#"{"roots":{"synced":{"children":[
        {"name":"News","type":"folder","children":[
            {"name":"Daily","type":"url","url":"https://daily.test"}
        ]}
    ]}}}"#;

    assert_eq!(deck.load_text(text).await.unwrap(), 1);
    assert_eq!(deck.folder_name(), "News");
}

#[tokio::test]
async fn test_sample_renders_three_cards() {
    let mut deck = offline_deck(StubBackend::default());

    assert_eq!(deck.load_sample().await.unwrap(), 3);
    assert_eq!(count(&deck.to_html(), "article.card[draggable=\"true\"]"), 3);
}

#[tokio::test]
async fn test_long_title_truncated_in_card() {
    let mut deck = offline_deck(StubBackend::default());
    let title = "A".repeat(41);
    let text = format!(
        r#"{{"roots":{{"bookmark_bar":{{"children":[
            {{"name":"TV","type":"folder","children":[
                {{"name":"{}","type":"url","url":"https://long.test"}}
            ]}}
        ]}}}}}}"#,
        title
    );

    deck.load_text(&text).await.unwrap();

    let html = deck.to_html();
    let document = Html::parse_document(&html);
    let selector = Selector::parse("article.card h3").unwrap();
    let heading = document.select(&selector).next().unwrap();
    assert_eq!(
        heading.text().collect::<String>(),
        format!("{}...", "A".repeat(37))
    );
    assert_eq!(heading.value().attr("title"), Some(title.as_str()));
}

// ============================================================================
// Icon Tests
// ============================================================================

#[tokio::test]
async fn test_known_icon_used_before_network() {
    let backend = StubBackend {
        loads: vec!["icons/netflix.jpg".to_string()],
        ..Default::default()
    };
    let resolver = IconResolver::new(backend).with_catalog(IconCatalog::new(["netflix"]));
    let mut deck = Deck::new(resolver);
    let text = r#"{"roots":{"bookmark_bar":{"children":[
        {"name":"TV","type":"folder","children":[
            {"name":"Netflix Series","type":"url","url":"https://www.netflix.com/"}
        ]}
    ]}}}"#;

    deck.load_text(text).await.unwrap();

    let card = &deck.page().grid.cards()[0];
    assert_eq!(card.icon.src(), "icons/netflix.jpg");
    let calls = deck.resolver().backend().calls.lock().unwrap().clone();
    assert_eq!(calls, vec!["icons/netflix.png", "icons/netflix.jpg"]);
}

#[tokio::test]
async fn test_all_candidates_failing_shows_default_image() {
    let mut deck = Deck::new(IconResolver::new(StubBackend::default()));

    deck.load_text(SINGLE_STREAM).await.unwrap();

    let html = deck.to_html();
    let document = Html::parse_document(&html);
    let selector = Selector::parse("img.card__icon").unwrap();
    let img = document.select(&selector).next().unwrap();
    let src = img.value().attr("src").unwrap();
    assert!(src.starts_with("data:image/svg+xml;base64,"));
    assert_eq!(img.value().attr("loading"), Some("lazy"));

    let calls = deck.resolver().backend().calls.lock().unwrap().clone();
    assert!(calls.iter().any(|c| c == "logo:Stream 1"));
    assert!(calls.iter().any(|c| c.contains("favicons?domain=example.com")));
}

// ============================================================================
// File and Output Tests
// ============================================================================

#[tokio::test]
async fn test_load_file_and_write_output() {
    let temp_dir = TempDir::new().unwrap();
    let source = temp_dir.path().join("Bookmarks");
    let output = temp_dir.path().join("deck.html");
    std::fs::write(&source, SINGLE_STREAM).unwrap();

    let mut deck = offline_deck(StubBackend::default()).with_output(&output);
    assert_eq!(deck.load_file(&source).await.unwrap(), 1);
    deck.write().unwrap();

    let written = std::fs::read_to_string(&output).unwrap();
    assert_eq!(count(&written, "article.card"), 1);
    assert!(!written.contains("http-equiv=\"refresh\""));
}

#[tokio::test]
async fn test_unreadable_file_reports_parse_failure() {
    let temp_dir = TempDir::new().unwrap();
    let mut deck = offline_deck(StubBackend::default());

    let result = deck.load_file(&temp_dir.path().join("missing")).await;

    assert!(matches!(result, Err(DeckError::Io(_))));
    assert_eq!(deck.page().status, Status::ParseFailed);
}

#[tokio::test]
async fn test_idle_hint_names_expected_path() {
    let mut deck = offline_deck(StubBackend::default());
    deck.show_idle_hint("~/.config/google-chrome/Default/Bookmarks");

    let html = render_html(deck.page(), None);
    assert!(html.contains("Select the Bookmarks file from: ~/.config/google-chrome/Default/Bookmarks"));
}

#[tokio::test]
async fn test_auto_refresh_adds_meta_refresh() {
    let deck = offline_deck(StubBackend::default()).with_auto_refresh(2);
    assert!(deck.to_html().contains("<meta http-equiv=\"refresh\" content=\"2\">"));
}

// ============================================================================
// Refresh Tests
// ============================================================================

#[tokio::test]
async fn test_refresh_failure_keeps_page() {
    let mut deck = offline_deck(StubBackend::default());
    deck.load_sample().await.unwrap();
    let before = deck.page().clone();

    assert!(deck.refresh("{broken").await.is_err());
    assert!(deck.refresh(r#"{"roots":{}}"#).await.is_err());

    assert_eq!(deck.page(), &before);
}

#[tokio::test]
async fn test_refresh_sets_auto_updated_status() {
    let mut deck = offline_deck(StubBackend::default());
    deck.load_sample().await.unwrap();

    let count = deck.refresh(SINGLE_STREAM).await.unwrap();

    assert_eq!(count, 1);
    assert_eq!(deck.page().grid.len(), 1);
    match &deck.page().status {
        Status::AutoUpdated { count, at } => {
            assert_eq!(*count, 1);
            assert_eq!(at.len(), 8);
        }
        other => panic!("unexpected status {:?}", other),
    }
}

#[tokio::test]
async fn test_refresh_to_empty_folder_keeps_empty_message() {
    let mut deck = offline_deck(StubBackend::default());
    deck.load_sample().await.unwrap();
    let emptied = r#"{"roots":{"bookmark_bar":{"children":[
        {"name":"TV","type":"folder","children":[]}
    ]}}}"#;

    let count = deck.refresh(emptied).await.unwrap();

    assert_eq!(count, 0);
    assert!(deck.page().grid.is_empty());
    assert!(matches!(deck.page().status, Status::AutoUpdated { count: 0, .. }));

    let html = deck.to_html();
    let document = Html::parse_document(&html);
    let selector = Selector::parse(".grid__empty").unwrap();
    let notices: Vec<String> = document
        .select(&selector)
        .map(|p| p.text().collect())
        .collect();
    assert_eq!(notices, vec!["No links found in the TV folder."]);
}
