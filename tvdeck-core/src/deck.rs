// The page state and the parse -> extract -> render pipeline

use crate::bookmarks::{
    BookmarkDocument, DEFAULT_FOLDER, SAMPLE_DOCUMENT, find_named_folder, flatten_links,
    parse_document,
};
use crate::error::{DeckError, Result};
use crate::poll::ChangeHandler;
use crate::render::{Page, render_html, render_links, save_page};
use crate::status::Status;
use chrono::Local;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};
use tvdeck_icons::{IconBackend, IconResolver};

pub struct Deck<B> {
    resolver: IconResolver<B>,
    folder_name: String,
    page: Page,
    output: Option<PathBuf>,
    refresh_secs: Option<u64>,
}

impl<B: IconBackend> Deck<B> {
    pub fn new(resolver: IconResolver<B>) -> Self {
        Self {
            resolver,
            folder_name: DEFAULT_FOLDER.to_string(),
            page: Page::new(Status::Reading),
            output: None,
            refresh_secs: None,
        }
    }

    pub fn with_folder_name(mut self, folder_name: impl Into<String>) -> Self {
        self.folder_name = folder_name.into();
        self
    }

    /// Where `write` puts the rendered page.
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    /// Have the rendered page reload itself every `secs` seconds.
    pub fn with_auto_refresh(mut self, secs: u64) -> Self {
        self.refresh_secs = Some(secs);
        self
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn resolver(&self) -> &IconResolver<B> {
        &self.resolver
    }

    pub fn folder_name(&self) -> &str {
        &self.folder_name
    }

    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }

    pub fn show_idle_hint(&mut self, expected_path: &str) {
        self.page.clear();
        self.page.status = Status::Idle {
            expected_path: expected_path.to_string(),
        };
    }

    /// Run the full pipeline on freshly read text. Parse and folder errors
    /// clear the grid and are reflected in the status line.
    pub async fn load_text(&mut self, text: &str) -> Result<usize> {
        self.page.status = Status::Reading;

        let document = match parse_document(text) {
            Ok(document) => document,
            Err(e) => {
                warn!("Could not parse bookmarks: {}", e);
                self.page.status = Status::ParseFailed;
                self.page.clear();
                return Err(e);
            }
        };

        match self.render_document(&document).await {
            Ok(count) => Ok(count),
            Err(e) => {
                self.page.status = Status::FolderNotFound {
                    folder: self.folder_name.clone(),
                };
                self.page.clear();
                Err(e)
            }
        }
    }

    /// Read a bookmarks file and load it. An unreadable file is reported like
    /// unparsable content.
    pub async fn load_file(&mut self, path: &Path) -> Result<usize> {
        info!("Reading bookmarks from {}", path.display());
        self.page.status = Status::Reading;

        match tokio::fs::read(path).await {
            Ok(bytes) => self.load_text(&String::from_utf8_lossy(&bytes)).await,
            Err(e) => {
                warn!("Could not read {}: {}", path.display(), e);
                self.show_unreadable();
                Err(DeckError::Io(e))
            }
        }
    }

    /// Report a bookmarks file that exists but could not be read.
    pub fn show_unreadable(&mut self) {
        self.page.status = Status::ParseFailed;
        self.page.clear();
    }

    pub async fn load_sample(&mut self) -> Result<usize> {
        self.load_text(SAMPLE_DOCUMENT).await
    }

    /// Redraw from changed content seen by the poller. On any error the
    /// page is left exactly as it was.
    pub async fn refresh(&mut self, text: &str) -> Result<usize> {
        let document = parse_document(text)?;
        let folder = find_named_folder(&document, &self.folder_name)
            .ok_or_else(|| DeckError::FolderNotFound(self.folder_name.clone()))?;
        let links = flatten_links(folder);

        let mut page = Page::new(Status::Reading);
        let count = render_links(&mut page, &links, &self.resolver, &self.folder_name).await;
        page.status = Status::AutoUpdated {
            count,
            at: Local::now().format("%H:%M:%S").to_string(),
        };
        self.page = page;
        Ok(count)
    }

    async fn render_document(&mut self, document: &BookmarkDocument) -> Result<usize> {
        let folder = find_named_folder(document, &self.folder_name)
            .ok_or_else(|| DeckError::FolderNotFound(self.folder_name.clone()))?;
        let links = flatten_links(folder);

        Ok(render_links(&mut self.page, &links, &self.resolver, &self.folder_name).await)
    }

    pub fn to_html(&self) -> String {
        render_html(&self.page, self.refresh_secs)
    }

    /// Write the rendered page to the configured output, if any.
    pub fn write(&self) -> Result<()> {
        if let Some(output) = &self.output {
            save_page(&self.to_html(), output)?;
            info!("Wrote {}", output.display());
        }
        Ok(())
    }
}

/// Poll handler redrawing a shared deck and rewriting its output.
pub struct DeckRefresher<B> {
    deck: Arc<Mutex<Deck<B>>>,
}

impl<B> DeckRefresher<B> {
    pub fn new(deck: Arc<Mutex<Deck<B>>>) -> Self {
        Self { deck }
    }
}

impl<B: IconBackend + 'static> ChangeHandler for DeckRefresher<B> {
    async fn on_change(&self, content: String) -> Result<usize> {
        let mut deck = self.deck.lock().await;
        let count = deck.refresh(&content).await?;
        deck.write()?;
        Ok(count)
    }
}
