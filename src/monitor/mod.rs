pub mod round;
pub mod scheduler;

pub use round::{PipelineStatus, RoundRunner, RoundSummary, TargetOutcome, TargetReport};
pub use scheduler::{Scheduler, SchedulerState};
