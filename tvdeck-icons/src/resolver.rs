use crate::candidates::{FaviconProvider, favicon_candidates, local_candidates};
use crate::catalog::IconCatalog;
use crate::machine::{IconMachine, IconPlan, IconResolution, Step};
use crate::probe::IconBackend;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use futures::future::join_all;
use std::path::PathBuf;
use tracing::{debug, info};

/// Image shown when every candidate fails. This name stands for the
/// built-in placeholder; any other configured value is a path or URL.
pub const DEFAULT_ICON: &str = "youtube-play.png";

const DEFAULT_ICON_SVG: &[u8] = include_bytes!("../assets/youtube-play.svg");

/// The built-in placeholder as a `data:` URI, so pages need no asset files.
pub fn builtin_default_icon() -> String {
    format!("data:image/svg+xml;base64,{}", STANDARD.encode(DEFAULT_ICON_SVG))
}

#[derive(Debug, Clone)]
pub struct ResolverSettings {
    pub icons_dir: PathBuf,
    pub default_icon: String,
    pub favicon_providers: Vec<FaviconProvider>,
    pub favicon_size: u32,
    pub excluded_hosts: Vec<String>,
    /// When false only local candidates are tried.
    pub network: bool,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            icons_dir: PathBuf::from("icons"),
            default_icon: DEFAULT_ICON.to_string(),
            favicon_providers: FaviconProvider::defaults(),
            favicon_size: 128,
            excluded_hosts: vec!["localhost".to_string(), "127.0.0.1".to_string()],
            network: true,
        }
    }
}

pub struct IconResolver<B> {
    backend: B,
    catalog: IconCatalog,
    settings: ResolverSettings,
}

impl<B: IconBackend> IconResolver<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            catalog: IconCatalog::empty(),
            settings: ResolverSettings::default(),
        }
    }

    pub fn with_catalog(mut self, catalog: IconCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_settings(mut self, settings: ResolverSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn catalog(&self) -> &IconCatalog {
        &self.catalog
    }

    pub fn replace_catalog(&mut self, catalog: IconCatalog) {
        self.catalog.replace(catalog);
    }

    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Build the ordered candidate plan for one link.
    pub fn plan(&self, title: &str, url: &str) -> IconPlan {
        let favicons = if self.settings.network {
            favicon_candidates(
                url,
                &self.settings.favicon_providers,
                &self.settings.excluded_hosts,
                self.settings.favicon_size,
            )
        } else {
            Vec::new()
        };

        IconPlan {
            title: title.to_string(),
            local: local_candidates(title, &self.catalog, &self.settings.icons_dir),
            title_logo: self.settings.network && !title.trim().is_empty(),
            favicons,
            default_src: self.settings.default_icon.clone(),
        }
    }

    /// Walk the fallback chain for one link until an image settles or the
    /// default is reached. Attempts are strictly sequential.
    pub async fn resolve(&self, title: &str, url: &str) -> IconResolution {
        let mut machine = IconMachine::new(self.plan(title, url));

        loop {
            match machine.next_step() {
                Step::Attempt(candidate) => {
                    let outcome = self.backend.attempt(&candidate).await;
                    machine.report(outcome);
                }
                Step::LookupTitleLogo(query) => {
                    let logo = self.backend.lookup_title_logo(&query).await;
                    machine.report_title_logo(logo);
                }
                Step::Settled(resolution) => {
                    debug!(
                        "Resolved icon for '{}' after {} attempt(s): {}",
                        title,
                        machine.attempted().len(),
                        resolution.src()
                    );
                    return resolution;
                }
            }
        }
    }

    /// Resolve every link concurrently. Results come back in input order.
    pub async fn resolve_all(&self, links: &[(&str, &str)]) -> Vec<IconResolution> {
        let pending: Vec<_> = links
            .iter()
            .map(|(title, url)| self.resolve(title, url))
            .collect();
        let resolutions = join_all(pending).await;

        let defaults = resolutions.iter().filter(|r| r.is_default()).count();
        info!(
            "Resolved {} icon(s), {} fell back to the default image",
            resolutions.len(),
            defaults
        );
        resolutions
    }
}
