use std::time::Duration;

use tokio::time::sleep;

use super::round::RoundRunner;
use crate::cert_probe::CertificateInfo;
use crate::http_probe::prelude::*;
use crate::probe::{Probe, Target};
use crate::shutdown::CancellationSignal;

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running { rounds: u64 },
}

/// Runs rounds back to back with a fixed pause between them.
///
/// The first round starts immediately. The pause is measured from the end of
/// a round, so rounds never overlap and the cadence is `interval + round time`.
pub struct Scheduler<H, C> {
    runner: RoundRunner<H, C>,
    interval: Duration,
    state: SchedulerState,
}

impl<H, C> Scheduler<H, C>
where
    H: Probe<Output = ProbeResult>,
    C: Probe<Output = CertificateInfo>,
{
    pub fn new(runner: RoundRunner<H, C>, interval: Duration) -> Self {
        Self {
            runner,
            interval,
            state: SchedulerState::Idle,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Runs until `cancel` fires and returns the number of rounds run.
    pub async fn run(&mut self, targets: &[Target], cancel: &CancellationSignal) -> u64 {
        log::info!(
            "Monitoring {} targets every {}s",
            targets.len(),
            self.interval.as_secs()
        );

        let mut rounds = match self.state {
            SchedulerState::Idle => 0,
            SchedulerState::Running { rounds } => rounds,
        };

        while !cancel.is_cancelled() {
            self.state = SchedulerState::Running { rounds };
            log::debug!("Starting round {}", rounds + 1);
            self.runner.run_round(targets, cancel).await;
            rounds += 1;
            self.state = SchedulerState::Running { rounds };

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = sleep(self.interval) => {}
            }
        }

        log::info!("Scheduler stopped after {rounds} rounds");
        rounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::AlertPolicy;
    use crate::shutdown;
    use crate::test_support::doubles::{RecordingNotifier, Scripted, ScriptedCert, ScriptedHttp};
    use std::sync::Arc;

    const TARGET: &str = "https://a.example";

    fn scheduler(http: Arc<ScriptedHttp>) -> Scheduler<ScriptedHttp, ScriptedCert> {
        let runner = RoundRunner::new(
            http,
            Arc::new(ScriptedCert::new()),
            Arc::new(RecordingNotifier::new()),
            AlertPolicy::default(),
        );
        Scheduler::new(runner, DEFAULT_INTERVAL)
    }

    fn targets() -> Vec<Target> {
        vec![Target::new(TARGET)]
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_round_runs_immediately() {
        let http = Arc::new(ScriptedHttp::new());
        let mut scheduler = scheduler(http.clone());
        let (trigger, cancel) = shutdown::channel();

        let task = tokio::spawn(async move {
            let rounds = scheduler.run(&targets(), &cancel).await;
            (rounds, scheduler.state())
        });
        sleep(Duration::from_secs(1)).await;
        assert_eq!(http.calls(TARGET), 1);

        trigger.trigger();
        let (rounds, state) = task.await.unwrap();
        assert_eq!(rounds, 1);
        assert_eq!(state, SchedulerState::Running { rounds: 1 });
    }

    #[tokio::test(start_paused = true)]
    async fn test_rounds_repeat_on_interval() {
        let http = Arc::new(ScriptedHttp::new());
        let mut scheduler = scheduler(http.clone());
        let (trigger, cancel) = shutdown::channel();

        let task = tokio::spawn(async move { scheduler.run(&targets(), &cancel).await });
        sleep(Duration::from_secs(12 * 60)).await;
        trigger.trigger();

        assert_eq!(task.await.unwrap(), 3);
        assert_eq!(http.calls(TARGET), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_counts_from_round_completion() {
        // Each round takes a minute, so rounds start at 0m and 6m, not 0m, 5m and 10m.
        let http = Arc::new(ScriptedHttp::new().on(
            TARGET,
            Scripted::Status { code: 200, latency_millis: 10 },
            Duration::from_secs(60),
        ));
        let mut scheduler = scheduler(http.clone());
        let (trigger, cancel) = shutdown::channel();

        let task = tokio::spawn(async move { scheduler.run(&targets(), &cancel).await });
        sleep(Duration::from_secs(11 * 60 + 30)).await;
        trigger.trigger();

        assert_eq!(task.await.unwrap(), 2);
        assert_eq!(http.calls(TARGET), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_before_start_runs_nothing() {
        let http = Arc::new(ScriptedHttp::new());
        let mut scheduler = scheduler(http.clone());
        let (trigger, cancel) = shutdown::channel();
        trigger.trigger();

        assert_eq!(scheduler.run(&targets(), &cancel).await, 0);
        assert_eq!(scheduler.state(), SchedulerState::Idle);
        assert_eq!(http.calls(TARGET), 0);
    }
}
