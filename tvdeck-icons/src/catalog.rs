// Catalog of locally available icon identifiers

use crate::error::{IconError, Result};
use reqwest::Client;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, info};

/// File extensions tried for every local icon identifier, in order.
pub const ICON_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "svg", "ico", "webp"];

/// Identifiers (lower-cased file stems) of the icons available in the local
/// icon directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IconCatalog {
    names: Vec<String>,
}

impl IconCatalog {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names
                .into_iter()
                .map(|name| name.into().trim().to_lowercase())
                .filter(|name| !name.is_empty())
                .collect(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a JSON array of identifiers.
    pub fn from_json(json: &str) -> Result<Self> {
        let names: Vec<String> = serde_json::from_str(json)?;
        Ok(Self::new(names))
    }

    /// Load the catalog from a static asset, either a local file or an
    /// http(s) URL serving the JSON list.
    pub async fn load(source: &str, client: &Client) -> Result<Self> {
        let json = if source.starts_with("http://") || source.starts_with("https://") {
            debug!("Fetching icon catalog from {}", source);
            let response = client.get(source).send().await?;
            if !response.status().is_success() {
                return Err(IconError::Status(response.status().as_u16()));
            }
            response.text().await?
        } else {
            debug!("Reading icon catalog from {}", source);
            tokio::fs::read_to_string(source).await?
        };

        let catalog = Self::from_json(&json)
            .map_err(|e| IconError::CatalogError(format!("{}: {}", source, e)))?;
        info!("Loaded {} icon identifiers from {}", catalog.len(), source);
        Ok(catalog)
    }

    /// Build the catalog by scanning an icon directory. The directory is
    /// created when it does not exist yet.
    pub async fn scan_dir(dir: &Path) -> Result<Self> {
        if !tokio::fs::try_exists(dir).await? {
            info!("Icon directory {} does not exist, creating it", dir.display());
            tokio::fs::create_dir_all(dir).await?;
        }

        let mut names = BTreeSet::new();
        let mut entries = tokio::fs::read_dir(dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
                continue;
            };
            if !ICON_EXTENSIONS.contains(&ext.to_lowercase().as_str()) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.insert(stem.to_lowercase());
            }
        }

        Ok(Self {
            names: names.into_iter().collect(),
        })
    }

    /// Swap in a freshly loaded catalog, dropping the previous list first.
    pub fn replace(&mut self, other: IconCatalog) {
        self.names.clear();
        self.names = other.names;
    }

    /// First identifier contained in the (already normalised) title.
    pub fn find_in(&self, normalized_title: &str) -> Option<&str> {
        self.names
            .iter()
            .find(|name| normalized_title.contains(name.as_str()))
            .map(String::as_str)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.names)?)
    }
}
