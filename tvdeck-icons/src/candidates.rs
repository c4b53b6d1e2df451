// Candidate icon sources derived from a link's title and URL

use crate::catalog::{ICON_EXTENSIONS, IconCatalog};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

/// One image source attempted as a card's icon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidate {
    /// A file in the local icon directory. `href` is what the page links to.
    Local { path: PathBuf, href: String },
    Remote(Url),
}

impl Candidate {
    pub fn local(icons_dir: &Path, file_name: &str) -> Self {
        let path = icons_dir.join(file_name);
        let href = path.to_string_lossy().replace('\\', "/");
        Candidate::Local { path, href }
    }

    /// The value used as the image `src` once this candidate is settled on.
    pub fn href(&self) -> &str {
        match self {
            Candidate::Local { href, .. } => href,
            Candidate::Remote(url) => url.as_str(),
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, Candidate::Remote(_))
    }

    /// The image address to put in a page written anywhere on disk: local
    /// files become absolute `file://` URLs.
    pub fn page_src(&self) -> String {
        match self {
            Candidate::Local { path, .. } => local_file_url(path),
            Candidate::Remote(url) => url.to_string(),
        }
    }
}

/// Absolute `file://` URL for `path`, resolved against the working
/// directory. Falls back to the path itself.
pub fn local_file_url(path: &Path) -> String {
    std::path::absolute(path)
        .ok()
        .and_then(|absolute| Url::from_file_path(absolute).ok())
        .map(String::from)
        .unwrap_or_else(|| path.to_string_lossy().replace('\\', "/"))
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.href())
    }
}

/// A favicon-by-hostname service. `template` holds `{host}` and `{size}`
/// placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FaviconProvider {
    pub template: String,
}

impl FaviconProvider {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn url_for(&self, host: &str, size: u32) -> Option<Url> {
        let raw = self
            .template
            .replace("{host}", host)
            .replace("{size}", &size.to_string());
        Url::parse(&raw).ok()
    }

    pub fn defaults() -> Vec<FaviconProvider> {
        vec![
            FaviconProvider::new("https://www.google.com/s2/favicons?domain={host}&sz={size}"),
            FaviconProvider::new("https://favicone.com/{host}?s={size}"),
        ]
    }
}

/// Lower-case the title and strip diacritics from Latin letters.
pub fn normalize_title(title: &str) -> String {
    title.to_lowercase().chars().map(fold_accent).collect()
}

/// Alphanumeric-only form of the normalised title.
pub fn slugify(title: &str) -> String {
    normalize_title(title)
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

fn fold_accent(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => 'a',
        'ç' | 'ć' | 'č' => 'c',
        'ď' => 'd',
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ė' | 'ę' | 'ě' => 'e',
        'ì' | 'í' | 'î' | 'ï' | 'ī' | 'į' => 'i',
        'ł' => 'l',
        'ñ' | 'ń' | 'ň' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ő' => 'o',
        'ř' => 'r',
        'ś' | 'š' | 'ş' => 's',
        'ť' => 't',
        'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' | 'ű' => 'u',
        'ý' | 'ÿ' => 'y',
        'ź' | 'ż' | 'ž' => 'z',
        other => other,
    }
}

/// Local file candidates: the first catalog identifier found in the title,
/// otherwise the title's slug, each tried with every icon extension.
pub fn local_candidates(title: &str, catalog: &IconCatalog, icons_dir: &Path) -> Vec<Candidate> {
    let normalized = normalize_title(title);
    let stem = match catalog.find_in(&normalized) {
        Some(name) => name.to_string(),
        None => slugify(title),
    };

    if stem.is_empty() {
        return Vec::new();
    }

    ICON_EXTENSIONS
        .iter()
        .map(|ext| Candidate::local(icons_dir, &format!("{}.{}", stem, ext)))
        .collect()
}

/// Favicon candidates for the link's host, one per provider. Empty when the
/// URL cannot be parsed, has no host, or the host is excluded.
pub fn favicon_candidates(
    link_url: &str,
    providers: &[FaviconProvider],
    excluded_hosts: &[String],
    size: u32,
) -> Vec<Candidate> {
    let Ok(parsed) = Url::parse(link_url) else {
        return Vec::new();
    };
    let Some(host) = parsed.host_str() else {
        return Vec::new();
    };
    if is_excluded_host(host, excluded_hosts) {
        return Vec::new();
    }

    providers
        .iter()
        .filter_map(|provider| provider.url_for(host, size))
        .map(Candidate::Remote)
        .collect()
}

/// True when `host` is one of the excluded domains or a subdomain of one.
pub fn is_excluded_host(host: &str, excluded_hosts: &[String]) -> bool {
    let host = host.to_lowercase();
    excluded_hosts.iter().any(|domain| {
        let domain = domain.to_lowercase();
        host == domain || host.ends_with(&format!(".{}", domain))
    })
}
