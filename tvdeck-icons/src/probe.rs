use crate::candidates::Candidate;
use crate::error::{IconError, Result};
use crate::machine::ProbeOutcome;
use image::ImageReader;
use reqwest::Client;
use serde::Deserialize;
use std::future::Future;
use std::io::Cursor;
use std::path::Path;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Default logo-by-company-name lookup (Clearbit autocomplete compatible).
pub const DEFAULT_LOGO_ENDPOINT: &str = "https://autocomplete.clearbit.com/v1/companies/suggest";

/// The IO side of icon resolution: fetch one candidate and report whether it
/// produced an image, and look up a logo by company name.
pub trait IconBackend: Send + Sync {
    fn lookup_title_logo(&self, title: &str) -> impl Future<Output = Option<Url>> + Send;

    fn attempt(&self, candidate: &Candidate) -> impl Future<Output = ProbeOutcome> + Send;
}

#[derive(Debug, Deserialize)]
struct LogoSuggestion {
    #[serde(default)]
    logo: Option<String>,
}

/// Backend that reads local candidates from disk and remote ones over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    logo_endpoint: Option<Url>,
}

impl HttpBackend {
    pub fn new() -> Result<Self> {
        Self::with_timeout(10)
    }

    pub fn with_timeout(timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("tvdeck/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.div_ceil(2)))
            .pool_idle_timeout(Duration::from_secs(90))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        let logo_endpoint = Url::parse(DEFAULT_LOGO_ENDPOINT)
            .map_err(|e| IconError::InvalidUrl(format!("{}: {}", DEFAULT_LOGO_ENDPOINT, e)))?;

        Ok(Self {
            client,
            logo_endpoint: Some(logo_endpoint),
        })
    }

    pub fn with_logo_endpoint(mut self, endpoint: Option<Url>) -> Self {
        self.logo_endpoint = endpoint;
        self
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    async fn fetch_logo(&self, endpoint: &Url, title: &str) -> Result<Option<Url>> {
        let mut url = endpoint.clone();
        url.query_pairs_mut().append_pair("query", title);

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(IconError::Status(response.status().as_u16()));
        }

        let suggestions: Vec<LogoSuggestion> = response.json().await?;
        Ok(suggestions
            .into_iter()
            .filter_map(|s| s.logo)
            .filter(|logo| !logo.trim().is_empty())
            .find_map(|logo| Url::parse(&logo).ok()))
    }

    async fn fetch_remote(&self, url: &Url) -> Result<ProbeOutcome> {
        let response = self.client.get(url.clone()).send().await?;
        if !response.status().is_success() {
            return Err(IconError::Status(response.status().as_u16()));
        }

        let is_svg = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.contains("image/svg"))
            .unwrap_or(false);
        let body = response.bytes().await?;

        decode_outcome(&body, is_svg)
    }

    async fn read_local(path: &Path) -> Result<ProbeOutcome> {
        let bytes = tokio::fs::read(path).await?;
        let is_svg = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("svg"))
            .unwrap_or(false);

        decode_outcome(&bytes, is_svg)
    }
}

impl IconBackend for HttpBackend {
    async fn lookup_title_logo(&self, title: &str) -> Option<Url> {
        let endpoint = self.logo_endpoint.as_ref()?;
        match self.fetch_logo(endpoint, title).await {
            Ok(logo) => logo,
            Err(e) => {
                debug!("Logo lookup for '{}' failed: {}", title, e);
                None
            }
        }
    }

    async fn attempt(&self, candidate: &Candidate) -> ProbeOutcome {
        let result = match candidate {
            Candidate::Local { path, .. } => Self::read_local(path).await,
            Candidate::Remote(url) => self.fetch_remote(url).await,
        };

        result.unwrap_or_else(|e| {
            debug!("Icon candidate {} failed: {}", candidate, e);
            ProbeOutcome::Failed
        })
    }
}

/// Decode just enough of the image to know its pixel dimensions.
pub fn decode_outcome(bytes: &[u8], svg_hint: bool) -> Result<ProbeOutcome> {
    if svg_hint || looks_like_svg(bytes) {
        return Ok(ProbeOutcome::Loaded(None));
    }

    let (width, height) = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .into_dimensions()?;
    Ok(ProbeOutcome::Loaded(Some((width, height))))
}

fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(256)];
    let head = String::from_utf8_lossy(head);
    let head = head.trim_start();
    head.starts_with("<svg") || (head.starts_with("<?xml") && head.contains("<svg"))
}
