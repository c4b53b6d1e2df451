use serde::Serialize;
use std::fmt;

/// The page's status line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Status {
    Idle { expected_path: String },
    Reading,
    ParseFailed,
    FolderNotFound { folder: String },
    NoLinks { folder: String },
    Showing { count: usize, folder: String },
    AutoUpdated { count: usize, at: String },
}

impl Status {
    pub fn is_error(&self) -> bool {
        matches!(self, Status::ParseFailed | Status::FolderNotFound { .. })
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Idle { expected_path } => {
                write!(f, "Select the Bookmarks file from: {}", expected_path)
            }
            Status::Reading => write!(f, "Reading file..."),
            Status::ParseFailed => write!(f, "Could not read the file. Check that it is JSON."),
            Status::FolderNotFound { folder } => write!(f, "Folder '{}' not found.", folder),
            Status::NoLinks { folder } => write!(f, "No links found in the {} folder.", folder),
            Status::Showing { count, folder } => write!(f, "Showing {} links from {}.", count, folder),
            Status::AutoUpdated { count, at } => write!(f, "Auto-updated at {} ({} links).", at, count),
        }
    }
}
