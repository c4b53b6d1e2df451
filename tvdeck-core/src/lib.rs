pub mod bookmarks;
pub mod config;
pub mod deck;
pub mod error;
pub mod poll;
pub mod render;
pub mod status;

pub use bookmarks::{
    BookmarkDocument, BookmarkNode, DEFAULT_FOLDER, Folder, Link, LinkEntry, SAMPLE_DOCUMENT,
    extract_folder_links, find_named_folder, flatten_links, parse_document,
};
pub use config::DeckConfig;
pub use deck::{Deck, DeckRefresher};
pub use error::DeckError;
pub use poll::{
    ChangeHandler, MIN_POLL_INTERVAL_MS, PollState, PollTarget, PollTick, Poller, content_hash,
};
pub use render::{Card, Grid, Page, Placement, display_title, render_html, render_links};
pub use status::Status;
