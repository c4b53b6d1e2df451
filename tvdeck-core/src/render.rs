// Card grid model and HTML rendering

use crate::bookmarks::LinkEntry;
use crate::status::Status;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::info;
use tvdeck_icons::{IconBackend, IconResolution, IconResolver};

pub const MAX_TITLE_CHARS: usize = 40;
const TRUNCATED_TITLE_CHARS: usize = 37;
const UNTITLED: &str = "Untitled";

/// Milliseconds between the entry animations of consecutive cards.
const CARD_ANIMATION_STEP_MS: usize = 40;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    /// Title as displayed, truncated.
    pub title: String,
    pub full_title: String,
    pub url: String,
    pub icon: IconResolution,
}

impl Card {
    pub fn new(entry: &LinkEntry, icon: IconResolution) -> Self {
        Self {
            title: display_title(&entry.title),
            full_title: entry.title.clone(),
            url: entry.url.clone(),
            icon,
        }
    }
}

/// Titles over 40 characters keep their first 37 plus `...`.
pub fn display_title(raw: &str) -> String {
    if raw.is_empty() {
        return UNTITLED.to_string();
    }

    if raw.chars().count() > MAX_TITLE_CHARS {
        let head: String = raw.chars().take(TRUNCATED_TITLE_CHARS).collect();
        format!("{}...", head)
    } else {
        raw.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Before,
    After,
}

/// Cards in display order. Reordering only touches this order; the next
/// render starts over from the link list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grid {
    cards: Vec<Card>,
}

impl Grid {
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn clear(&mut self) {
        self.cards.clear();
    }

    pub fn push(&mut self, card: Card) {
        self.cards.push(card);
    }

    /// Pick up the card at `from` and drop it before or after the card
    /// currently at `target`. Returns false when nothing moved.
    pub fn move_card(&mut self, from: usize, target: usize, placement: Placement) -> bool {
        if from == target || from >= self.cards.len() || target >= self.cards.len() {
            return false;
        }

        let card = self.cards.remove(from);
        let target = if target > from { target - 1 } else { target };
        let index = match placement {
            Placement::Before => target,
            Placement::After => target + 1,
        };
        self.cards.insert(index, card);
        true
    }
}

/// What the user sees: the status line, the grid, and the message shown in
/// place of an empty grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub status: Status,
    pub grid: Grid,
    pub empty_notice: Option<String>,
}

impl Page {
    pub fn new(status: Status) -> Self {
        Self {
            status,
            grid: Grid::default(),
            empty_notice: None,
        }
    }

    /// Drop the cards and any empty-grid message.
    pub fn clear(&mut self) {
        self.grid.clear();
        self.empty_notice = None;
    }
}

/// Replace the grid with one card per link, icons resolved concurrently.
pub async fn render_links<B: IconBackend>(
    page: &mut Page,
    links: &[LinkEntry],
    resolver: &IconResolver<B>,
    folder: &str,
) -> usize {
    page.clear();

    if links.is_empty() {
        let status = Status::NoLinks {
            folder: folder.to_string(),
        };
        page.empty_notice = Some(status.to_string());
        page.status = status;
        return 0;
    }

    let pairs: Vec<(&str, &str)> = links
        .iter()
        .map(|l| (l.title.as_str(), l.url.as_str()))
        .collect();
    let icons = resolver.resolve_all(&pairs).await;

    for (entry, icon) in links.iter().zip(icons) {
        page.grid.push(Card::new(entry, icon));
    }

    info!("Rendered {} cards from {}", links.len(), folder);
    page.status = Status::Showing {
        count: links.len(),
        folder: folder.to_string(),
    };
    links.len()
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

const PAGE_STYLE: &str = r#"
body { font-family: system-ui, sans-serif; background: #111418; color: #e8eaed; margin: 0; padding: 2rem; }
#status { color: #9aa0a6; margin-bottom: 1.5rem; }
#status.is-error { color: #f28b82; }
#linksGrid { display: grid; grid-template-columns: repeat(auto-fill, minmax(180px, 1fr)); gap: 1rem; }
.card { background: #1f2329; border-radius: 12px; padding: 1rem; animation: rise 300ms ease both; cursor: grab; }
.card.is-dragging { opacity: 0.4; }
.card__header { display: flex; align-items: center; gap: 0.75rem; }
.card__header h3 { font-size: 0.95rem; margin: 0; }
.card__icon { width: 48px; height: 48px; object-fit: contain; }
.grid__empty { color: #9aa0a6; }
@keyframes rise { from { opacity: 0; transform: translateY(8px); } to { opacity: 1; transform: none; } }
"#;

// Client-side drag reorder of the cards; order is not saved anywhere.
const REORDER_SCRIPT: &str = r#"
const grid = document.getElementById("linksGrid");
let dragged = null;
grid.addEventListener("dragstart", (event) => {
  dragged = event.target.closest(".card");
  if (dragged) dragged.classList.add("is-dragging");
});
grid.addEventListener("dragend", () => {
  if (dragged) dragged.classList.remove("is-dragging");
  dragged = null;
});
grid.addEventListener("dragover", (event) => {
  event.preventDefault();
  const target = event.target.closest(".card");
  if (!dragged || !target || target === dragged) return;
  const box = target.getBoundingClientRect();
  const after = event.clientX > box.left + box.width / 2;
  target.parentNode.insertBefore(dragged, after ? target.nextSibling : target);
});
"#;

/// Render the whole page. `refresh_secs` adds a meta refresh so an open
/// browser tab picks up redraws.
pub fn render_html(page: &Page, refresh_secs: Option<u64>) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    if let Some(secs) = refresh_secs {
        html.push_str(&format!("<meta http-equiv=\"refresh\" content=\"{}\">\n", secs));
    }
    html.push_str("<title>tvdeck</title>\n");
    html.push_str(&format!("<style>{}</style>\n", PAGE_STYLE));
    html.push_str("</head>\n<body>\n");

    let status_class = if page.status.is_error() { " class=\"is-error\"" } else { "" };
    html.push_str(&format!(
        "<p id=\"status\"{}>{}</p>\n",
        status_class,
        escape_html(&page.status.to_string())
    ));

    html.push_str("<section id=\"linksGrid\">\n");
    if page.grid.is_empty() {
        if let Some(notice) = &page.empty_notice {
            html.push_str(&format!(
                "<p class=\"grid__empty\">{}</p>\n",
                escape_html(notice)
            ));
        }
    } else {
        for (index, card) in page.grid.cards().iter().enumerate() {
            html.push_str(&render_card(index, card));
        }
    }
    html.push_str("</section>\n");

    html.push_str(&format!("<script>{}</script>\n", REORDER_SCRIPT));
    html.push_str("</body>\n</html>\n");
    html
}

fn render_card(index: usize, card: &Card) -> String {
    let url = escape_html(&card.url);
    format!(
        concat!(
            "<article class=\"card\" draggable=\"true\" data-index=\"{index}\" ",
            "style=\"animation-delay: {delay}ms\">\n",
            "  <div class=\"card__header\">\n",
            "    <a href=\"{url}\" target=\"_blank\" rel=\"noreferrer\" title=\"{url}\">",
            "<img class=\"card__icon\" alt=\"\" loading=\"lazy\" src=\"{src}\"></a>\n",
            "    <h3 title=\"{full_title}\">{title}</h3>\n",
            "  </div>\n",
            "</article>\n"
        ),
        index = index,
        delay = index * CARD_ANIMATION_STEP_MS,
        url = url,
        src = escape_html(&card.icon.page_src()),
        full_title = escape_html(&card.full_title),
        title = escape_html(&card.title),
    )
}

pub fn save_page(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}
