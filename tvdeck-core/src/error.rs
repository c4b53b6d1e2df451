use thiserror::Error;
use tvdeck_icons::IconError;

#[derive(Error, Debug)]
pub enum DeckError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Folder not found: {0}")]
    FolderNotFound(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Icon error: {0}")]
    Icon(#[from] IconError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DeckError>;
