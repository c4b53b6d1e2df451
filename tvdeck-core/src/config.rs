// Deck configuration, optionally loaded from a JSON file

use crate::bookmarks::DEFAULT_FOLDER;
use crate::error::{DeckError, Result};
use crate::poll::{DEFAULT_POLL_INTERVAL_MS, MIN_POLL_INTERVAL_MS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tvdeck_icons::{
    DEFAULT_ICON, DEFAULT_LOGO_ENDPOINT, FaviconProvider, HttpBackend, ResolverSettings,
};
use url::Url;

/// Every field has a default, so a config file only lists what it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeckConfig {
    pub folder_name: String,
    pub icons_dir: PathBuf,
    /// JSON list of icon identifiers (path or URL). Unset means scanning
    /// `icons_dir`.
    pub icon_catalog: Option<String>,
    pub default_icon: String,
    pub favicon_providers: Vec<FaviconProvider>,
    pub favicon_size: u32,
    pub excluded_hosts: Vec<String>,
    /// Logo-by-name lookup endpoint. `null` disables the lookup.
    pub logo_endpoint: Option<String>,
    pub offline: bool,
    pub poll_interval_ms: u64,
    pub request_timeout_secs: u64,
}

impl Default for DeckConfig {
    fn default() -> Self {
        let settings = ResolverSettings::default();
        Self {
            folder_name: DEFAULT_FOLDER.to_string(),
            icons_dir: settings.icons_dir,
            icon_catalog: None,
            default_icon: DEFAULT_ICON.to_string(),
            favicon_providers: settings.favicon_providers,
            favicon_size: settings.favicon_size,
            excluded_hosts: settings.excluded_hosts,
            logo_endpoint: Some(DEFAULT_LOGO_ENDPOINT.to_string()),
            offline: false,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            request_timeout_secs: 10,
        }
    }
}

impl DeckConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| DeckError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms < MIN_POLL_INTERVAL_MS {
            return Err(DeckError::Config(format!(
                "poll_interval_ms must be at least {}, got {}",
                MIN_POLL_INTERVAL_MS, self.poll_interval_ms
            )));
        }
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| DeckError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    pub fn resolver_settings(&self) -> ResolverSettings {
        ResolverSettings {
            icons_dir: self.icons_dir.clone(),
            default_icon: self.default_icon.clone(),
            favicon_providers: self.favicon_providers.clone(),
            favicon_size: self.favicon_size,
            excluded_hosts: self.excluded_hosts.clone(),
            network: !self.offline,
        }
    }

    pub fn backend(&self) -> Result<HttpBackend> {
        let logo_endpoint = match &self.logo_endpoint {
            Some(raw) => Some(
                Url::parse(raw).map_err(|e| DeckError::Config(format!("logo_endpoint {}: {}", raw, e)))?,
            ),
            None => None,
        };

        Ok(HttpBackend::with_timeout(self.request_timeout_secs)?.with_logo_endpoint(logo_endpoint))
    }
}
