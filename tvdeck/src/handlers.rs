use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use tvdeck_core::{Deck, DeckConfig, DeckRefresher, PollState, PollTarget, Poller, Status};
use tvdeck_icons::{HttpBackend, IconBackend, IconCatalog, IconResolver};

#[cfg(target_os = "windows")]
const DEFAULT_BOOKMARKS_PATH: &str =
    r"${LOCALAPPDATA}\Google\Chrome\User Data\Default\Bookmarks";
#[cfg(target_os = "macos")]
const DEFAULT_BOOKMARKS_PATH: &str =
    "~/Library/Application Support/Google/Chrome/Default/Bookmarks";
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
const DEFAULT_BOOKMARKS_PATH: &str = "~/.config/google-chrome/Default/Bookmarks";

const DEFAULT_OUTPUT: &str = "tvdeck.html";
const DEFAULT_ICON_LIST: &str = "icons-list.json";

/// Where the browser keeps its bookmarks on this platform, unexpanded.
pub fn default_bookmarks_path() -> &'static str {
    DEFAULT_BOOKMARKS_PATH
}

/// Expand `~` and environment variables. If a variable is unset only the
/// tilde is expanded.
pub fn expand_path(raw: &str) -> PathBuf {
    match shellexpand::full(raw) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(_) => PathBuf::from(shellexpand::tilde(raw).as_ref()),
    }
}

/// `RUST_LOG` wins; otherwise `info`, or `warn` with `--quiet`.
pub fn init_tracing(quiet: bool) {
    let default_level = if quiet { "warn" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // A second init (tests) is harmless.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// Command-line overrides for the deck configuration.
#[derive(Debug, Clone, Default)]
pub struct DeckOptions {
    pub config: Option<PathBuf>,
    pub folder: Option<String>,
    pub icons_dir: Option<PathBuf>,
    pub catalog: Option<String>,
    pub offline: bool,
}

impl DeckOptions {
    pub fn from_matches(args: &ArgMatches) -> Self {
        Self {
            config: args.get_one::<String>("config").map(|p| expand_path(p)),
            folder: args.get_one::<String>("folder").cloned(),
            icons_dir: args.get_one::<String>("icons-dir").map(|p| expand_path(p)),
            catalog: args.get_one::<String>("catalog").cloned(),
            offline: args.get_flag("offline"),
        }
    }

    /// The config file (or defaults) with command-line values on top.
    pub fn resolve_config(&self) -> Result<DeckConfig> {
        let mut config = match &self.config {
            Some(path) => DeckConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => DeckConfig::default(),
        };

        if let Some(folder) = &self.folder {
            config.folder_name = folder.clone();
        }
        if let Some(icons_dir) = &self.icons_dir {
            config.icons_dir = icons_dir.clone();
        }
        if let Some(catalog) = &self.catalog {
            config.icon_catalog = Some(catalog.clone());
        }
        if self.offline {
            config.offline = true;
        }

        Ok(config)
    }
}

fn catalog_source(source: &str) -> String {
    if source.starts_with("http://") || source.starts_with("https://") {
        source.to_string()
    } else {
        expand_path(source).to_string_lossy().into_owned()
    }
}

/// Load the configured icon catalog, or scan the icon directory. A missing
/// or broken catalog only means titles are matched by slug.
pub async fn load_catalog(config: &DeckConfig, backend: &HttpBackend) -> IconCatalog {
    let loaded = match &config.icon_catalog {
        Some(source) => IconCatalog::load(&catalog_source(source), backend.client()).await,
        None if !config.icons_dir.is_dir() => {
            debug!("No icon directory at {}", config.icons_dir.display());
            return IconCatalog::empty();
        }
        None => IconCatalog::scan_dir(&config.icons_dir).await,
    };

    match loaded {
        Ok(catalog) => {
            info!("Icon catalog has {} name(s)", catalog.len());
            catalog
        }
        Err(e) => {
            warn!("Icon catalog unavailable, matching titles by slug only: {}", e);
            IconCatalog::empty()
        }
    }
}

pub async fn build_deck(config: &DeckConfig, output: &Path) -> Result<Deck<HttpBackend>> {
    let backend = config
        .backend()
        .context("Failed to set up the icon client")?;
    let catalog = load_catalog(config, &backend).await;
    let resolver = IconResolver::new(backend)
        .with_catalog(catalog)
        .with_settings(config.resolver_settings());

    Ok(Deck::new(resolver)
        .with_folder_name(config.folder_name.clone())
        .with_output(output))
}

/// Load the bookmarks at `path` into the deck, or show where they were
/// expected when there is no such file. Returns the bytes that were shown.
pub async fn load_bookmarks<B: IconBackend>(
    deck: &mut Deck<B>,
    shown_path: &str,
    path: &Path,
) -> Option<Vec<u8>> {
    if !path.exists() {
        debug!("No bookmarks file at {}", path.display());
        deck.show_idle_hint(shown_path);
        return None;
    }

    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!("Could not read {}: {}", path.display(), e);
            deck.show_unreadable();
            return None;
        }
    };

    let spinner = spinner("Resolving icons...");
    if let Err(e) = deck.load_text(&String::from_utf8_lossy(&bytes)).await {
        debug!("Bookmarks not rendered: {}", e);
    }
    spinner.finish_and_clear();

    Some(bytes)
}

fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(message.to_string());
    spinner
}

pub fn print_status(status: &Status) {
    let line = status.to_string();
    if status.is_error() {
        eprintln!("{} {}", "✗".red().bold(), line.red());
    } else {
        println!("{} {}", "✓".green().bold(), line.bright_white());
    }
}

fn print_written(output: &Path) {
    println!("  {} {}", "→".bright_blue(), output.display().to_string().cyan());
}

fn output_path(args: &ArgMatches, default: &str) -> PathBuf {
    args.get_one::<PathBuf>("output")
        .cloned()
        .unwrap_or_else(|| PathBuf::from(default))
}

fn bookmarks_path(args: &ArgMatches) -> (String, PathBuf) {
    let raw = args
        .get_one::<String>("PATH")
        .map(String::as_str)
        .unwrap_or(DEFAULT_BOOKMARKS_PATH);
    (raw.to_string(), expand_path(raw))
}

pub async fn handle_render(args: &ArgMatches) -> Result<()> {
    let config = DeckOptions::from_matches(args).resolve_config()?;
    let output = output_path(args, DEFAULT_OUTPUT);
    let (shown_path, path) = bookmarks_path(args);

    let mut deck = build_deck(&config, &output).await?;
    load_bookmarks(&mut deck, &shown_path, &path).await;
    deck.write()
        .with_context(|| format!("Failed to write {}", output.display()))?;

    print_status(&deck.page().status);
    print_written(&output);
    Ok(())
}

pub async fn handle_watch(args: &ArgMatches) -> Result<()> {
    let config = DeckOptions::from_matches(args).resolve_config()?;
    let output = output_path(args, DEFAULT_OUTPUT);
    let (shown_path, path) = bookmarks_path(args);
    let interval_ms = args
        .get_one::<u64>("interval")
        .copied()
        .unwrap_or(config.poll_interval_ms);

    let mut deck = build_deck(&config, &output)
        .await?
        .with_auto_refresh((interval_ms / 1000).max(1));
    let baseline = load_bookmarks(&mut deck, &shown_path, &path).await;
    deck.write()
        .with_context(|| format!("Failed to write {}", output.display()))?;
    print_status(&deck.page().status);
    print_written(&output);

    // Without a baseline the first successful read counts as a change.
    let mut state = PollState::new(&path);
    if let Some(bytes) = &baseline {
        state = state.with_baseline(bytes);
    }

    let deck = Arc::new(Mutex::new(deck));
    let mut poller = Poller::new(Duration::from_millis(interval_ms));
    poller.replace(PollTarget::new(
        state,
        Arc::new(DeckRefresher::new(deck.clone())),
    ));

    println!(
        "{} Watching {} every {}ms, Ctrl-C to stop",
        "⟳".bright_blue().bold(),
        path.display(),
        interval_ms
    );
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;

    poller.stop();
    info!("Stopped watching {}", path.display());
    Ok(())
}

pub async fn handle_sample(args: &ArgMatches) -> Result<()> {
    let config = DeckOptions::from_matches(args).resolve_config()?;
    let output = output_path(args, DEFAULT_OUTPUT);

    let mut deck = build_deck(&config, &output).await?;
    let spinner = spinner("Resolving icons...");
    let rendered = deck.load_sample().await;
    spinner.finish_and_clear();
    rendered.context("Built-in sample did not render")?;

    deck.write()
        .with_context(|| format!("Failed to write {}", output.display()))?;
    print_status(&deck.page().status);
    print_written(&output);
    Ok(())
}

/// Scan `dir` (creating it when missing) and write its sorted icon names
/// to `output` as a JSON list.
pub async fn write_icon_list(dir: &Path, output: &Path) -> Result<IconCatalog> {
    let catalog = IconCatalog::scan_dir(dir)
        .await
        .with_context(|| format!("Failed to scan {}", dir.display()))?;
    let json = catalog.to_json_pretty()?;
    tokio::fs::write(output, json)
        .await
        .with_context(|| format!("Failed to write {}", output.display()))?;
    Ok(catalog)
}

pub async fn handle_icons(args: &ArgMatches) -> Result<()> {
    let dir = expand_path(
        args.get_one::<String>("DIR")
            .map(String::as_str)
            .unwrap_or("icons"),
    );
    let output = output_path(args, DEFAULT_ICON_LIST);

    let catalog = write_icon_list(&dir, &output).await?;

    println!(
        "{} Wrote {} with {} icon name(s)",
        "✓".green().bold(),
        output.display(),
        catalog.len()
    );
    if !catalog.is_empty() {
        println!("  {}", catalog.names().join(", ").dimmed());
    }
    Ok(())
}
