use std::fmt;
use std::sync::Arc;

/// A monitored endpoint, identified by its absolute URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target(Arc<str>);

impl Target {
    pub fn new(url: impl Into<String>) -> Self {
        Self(Arc::from(url.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Target {
    fn from(url: &str) -> Self {
        Self::new(url)
    }
}

/// The endpoints watched by the service. Fixed for the lifetime of the process.
pub const DEFAULT_TARGETS: &[&str] = &[
    "https://httpstat.us/526",
    "https://www.netrentacar.de/",
    "https://httpstat.us/500",
    "https://httpstat.us/495",
];

pub fn default_targets() -> Vec<Target> {
    DEFAULT_TARGETS.iter().copied().map(Target::from).collect()
}
