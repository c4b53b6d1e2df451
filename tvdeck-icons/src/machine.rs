// Per-card icon fallback state machine
//
// The machine performs no IO. A driver asks for the next step, carries it
// out, and reports the outcome back.

use crate::candidates::{Candidate, local_file_url};
use crate::resolver::{DEFAULT_ICON, builtin_default_icon};
use std::collections::VecDeque;
use std::path::Path;
use tracing::debug;
use url::Url;

/// Images at or below this size in both dimensions are treated as generic
/// placeholder icons.
pub const SOFT_FAILURE_MAX_SIDE: u32 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveState {
    TryLocal,
    TryTitleLogo,
    TryFavicon,
    Default,
}

/// Result of attempting one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The image decoded. `None` dimensions mean a vector image.
    Loaded(Option<(u32, u32)>),
    Failed,
}

impl ProbeOutcome {
    /// Loaded and not suspiciously small.
    pub fn is_usable(&self) -> bool {
        match self {
            ProbeOutcome::Loaded(Some((width, height))) => {
                !(*width <= SOFT_FAILURE_MAX_SIDE && *height <= SOFT_FAILURE_MAX_SIDE)
            }
            ProbeOutcome::Loaded(None) => true,
            ProbeOutcome::Failed => false,
        }
    }
}

/// What the driver has to do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Attempt(Candidate),
    LookupTitleLogo(String),
    Settled(IconResolution),
}

/// Where a card's icon ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IconResolution {
    Found {
        candidate: Candidate,
        state: ResolveState,
    },
    Default(String),
}

impl IconResolution {
    pub fn src(&self) -> &str {
        match self {
            IconResolution::Found { candidate, .. } => candidate.href(),
            IconResolution::Default(src) => src,
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, IconResolution::Default(_))
    }

    /// The `src` to write into a page. Local files become `file://` URLs and
    /// the built-in default becomes a `data:` URI.
    pub fn page_src(&self) -> String {
        match self {
            IconResolution::Found { candidate, .. } => candidate.page_src(),
            IconResolution::Default(src) if src == DEFAULT_ICON => builtin_default_icon(),
            IconResolution::Default(src) => match Url::parse(src) {
                Ok(url) if url.scheme().len() > 1 => src.clone(),
                _ => local_file_url(Path::new(src)),
            },
        }
    }
}

/// Ordered candidates for one card.
#[derive(Debug, Clone, Default)]
pub struct IconPlan {
    pub title: String,
    pub local: Vec<Candidate>,
    /// `false` skips the title-logo lookup entirely.
    pub title_logo: bool,
    pub favicons: Vec<Candidate>,
    pub default_src: String,
}

#[derive(Debug)]
pub struct IconMachine {
    state: ResolveState,
    title: String,
    local: VecDeque<Candidate>,
    title_logo_pending: bool,
    title_logo: Option<Candidate>,
    favicons: VecDeque<Candidate>,
    default_src: String,
    in_flight: Option<Candidate>,
    lookup_in_flight: bool,
    settled: Option<IconResolution>,
    attempted: Vec<Candidate>,
}

impl IconMachine {
    pub fn new(plan: IconPlan) -> Self {
        Self {
            state: ResolveState::TryLocal,
            title: plan.title,
            local: plan.local.into(),
            title_logo_pending: plan.title_logo,
            title_logo: None,
            favicons: plan.favicons.into(),
            default_src: plan.default_src,
            in_flight: None,
            lookup_in_flight: false,
            settled: None,
            attempted: Vec::new(),
        }
    }

    pub fn state(&self) -> ResolveState {
        self.state
    }

    /// Every candidate handed out so far, in order.
    pub fn attempted(&self) -> &[Candidate] {
        &self.attempted
    }

    /// Advance to the next step. While an attempt or lookup is in flight
    /// the same step is returned again.
    pub fn next_step(&mut self) -> Step {
        if let Some(resolution) = &self.settled {
            return Step::Settled(resolution.clone());
        }
        if let Some(candidate) = &self.in_flight {
            return Step::Attempt(candidate.clone());
        }
        if self.lookup_in_flight {
            return Step::LookupTitleLogo(self.title.clone());
        }

        loop {
            match self.state {
                ResolveState::TryLocal => {
                    if let Some(candidate) = self.local.pop_front() {
                        return self.start_attempt(candidate);
                    }
                    self.enter(ResolveState::TryTitleLogo);
                }
                ResolveState::TryTitleLogo => {
                    if self.title_logo_pending {
                        self.title_logo_pending = false;
                        self.lookup_in_flight = true;
                        return Step::LookupTitleLogo(self.title.clone());
                    }
                    if let Some(candidate) = self.title_logo.take() {
                        return self.start_attempt(candidate);
                    }
                    self.enter(ResolveState::TryFavicon);
                }
                ResolveState::TryFavicon => {
                    if let Some(candidate) = self.favicons.pop_front() {
                        return self.start_attempt(candidate);
                    }
                    self.enter(ResolveState::Default);
                }
                ResolveState::Default => {
                    let resolution = IconResolution::Default(self.default_src.clone());
                    self.settled = Some(resolution.clone());
                    return Step::Settled(resolution);
                }
            }
        }
    }

    /// Report the result of the logo-by-name lookup.
    pub fn report_title_logo(&mut self, logo: Option<Url>) {
        if !self.lookup_in_flight {
            return;
        }
        self.lookup_in_flight = false;
        self.title_logo = logo.map(Candidate::Remote);
    }

    /// Report the outcome of the in-flight attempt. Outcomes that arrive
    /// with nothing in flight are ignored.
    pub fn report(&mut self, outcome: ProbeOutcome) {
        let Some(candidate) = self.in_flight.take() else {
            return;
        };

        if outcome.is_usable() {
            debug!("Icon settled on {}", candidate);
            self.settled = Some(IconResolution::Found {
                candidate,
                state: self.state,
            });
        } else {
            debug!("Icon candidate {} rejected ({:?})", candidate, outcome);
        }
    }

    fn start_attempt(&mut self, candidate: Candidate) -> Step {
        self.attempted.push(candidate.clone());
        self.in_flight = Some(candidate.clone());
        Step::Attempt(candidate)
    }

    fn enter(&mut self, state: ResolveState) {
        debug!("Icon resolution for '{}': {:?} -> {:?}", self.title, self.state, state);
        self.state = state;
    }
}
