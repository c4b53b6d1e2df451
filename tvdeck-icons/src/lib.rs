pub mod candidates;
pub mod catalog;
pub mod error;
pub mod machine;
pub mod probe;
pub mod resolver;

pub use candidates::{Candidate, FaviconProvider, local_file_url};
pub use catalog::{ICON_EXTENSIONS, IconCatalog};
pub use error::IconError;
pub use machine::{IconMachine, IconPlan, IconResolution, ProbeOutcome, ResolveState, Step};
pub use probe::{DEFAULT_LOGO_ENDPOINT, HttpBackend, IconBackend};
pub use resolver::{DEFAULT_ICON, IconResolver, ResolverSettings, builtin_default_icon};
