#[path = "handlers.rs"]
pub mod handlers;

pub use handlers::{
    DeckOptions, build_deck, default_bookmarks_path, expand_path, load_bookmarks, load_catalog,
    write_icon_list,
};
