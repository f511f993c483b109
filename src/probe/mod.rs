pub mod target;

use async_trait::async_trait;

pub use target::{DEFAULT_TARGETS, Target, default_targets};

/// A single measurement against one target.
///
/// Implementations never fail: transport problems are captured in `Output`,
/// so one unreachable target cannot abort a round for the others.
#[async_trait]
pub trait Probe: Send + Sync + 'static {
    type Output: Send + 'static;

    async fn probe(&self, target: &Target) -> Self::Output;
}
