use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Semaphore;
use tokio::time::Instant;

use crate::cert_probe::CertificateInfo;
use crate::evaluator::{Alert, AlertPolicy, evaluate};
use crate::http_probe::prelude::*;
use crate::notifier::Notifier;
use crate::probe::{Probe, Target};
use crate::shutdown::CancellationSignal;

pub const DEFAULT_MAX_CONCURRENT_PROBES: usize = 16;
pub const DEFAULT_PIPELINE_TIMEOUT: Duration = Duration::from_secs(60);

fn to_fixed_width(input: &str, width: usize) -> String {
    use unicode_truncate::UnicodeTruncateStr;

    let (truncated, _) = input.unicode_truncate(width);
    format!("{:<width$}", truncated, width = width)
}

/// Everything one target's pipeline produced in a round.
#[derive(Debug, Clone)]
pub struct TargetReport {
    pub http: ProbeResult,
    pub certificate: CertificateInfo,
    pub alerts: Vec<Alert>,
    pub notify_failures: usize,
}

#[derive(Debug, Clone)]
pub enum PipelineStatus {
    Completed(TargetReport),
    Cancelled,
    TimedOut,
    Panicked(String),
}

#[derive(Debug, Clone)]
pub struct TargetOutcome {
    pub target: Target,
    pub status: PipelineStatus,
}

/// One outcome per target, in target order.
#[derive(Debug, Clone, Default)]
pub struct RoundSummary {
    pub outcomes: Vec<TargetOutcome>,
}

impl RoundSummary {
    pub fn reports(&self) -> impl Iterator<Item = &TargetReport> {
        self.outcomes.iter().filter_map(|outcome| match &outcome.status {
            PipelineStatus::Completed(report) => Some(report),
            _ => None,
        })
    }

    pub fn alert_messages(&self) -> Vec<&str> {
        self.reports()
            .flat_map(|report| report.alerts.iter().map(|alert| alert.message.as_str()))
            .collect()
    }

    pub fn notify_failures(&self) -> usize {
        self.reports().map(|report| report.notify_failures).sum()
    }
}

/// The work done for a single target: probe, evaluate, notify.
struct Pipeline<H, C> {
    http: Arc<H>,
    certificate: Arc<C>,
    notifier: Arc<dyn Notifier>,
    policy: AlertPolicy,
    label: String,
}

impl<H, C> Pipeline<H, C>
where
    H: Probe<Output = ProbeResult>,
    C: Probe<Output = CertificateInfo>,
{
    async fn run(self, target: Target) -> TargetReport {
        let (http, certificate) = tokio::join!(
            self.http.probe(&target),
            self.certificate.probe(&target)
        );

        let now = Utc::now();
        let alerts = evaluate(&http, &certificate, &self.policy, now);
        let label = &self.label;

        if let Some(error) = certificate.error() {
            log::warn!("[{label}] Error checking SSL certificate: {error}");
        }
        if alerts.is_empty() {
            log::info!(
                "[{label}] ✅ Status: {:?}, Elapsed: {}ms, Cert: {}",
                http.status_code(),
                http.latency_millis().unwrap_or_default(),
                certificate
                    .expires_at()
                    .map(|at| format!("{}d", (at - now).num_days()))
                    .unwrap_or_else(|| "N/A".to_string())
            );
        }

        let mut notify_failures = 0;
        for alert in &alerts {
            log::log!(alert.severity.log_level(), "[{label}] ❌ {alert}");
            if let Err(e) = self.notifier.notify(&alert.message).await {
                notify_failures += 1;
                log::error!(
                    "[{label}] Failed to send {} notification: {}",
                    self.notifier.name(),
                    report(&e)
                );
            }
        }

        TargetReport {
            http,
            certificate,
            alerts,
            notify_failures,
        }
    }
}

/// Runs one round: every target's pipeline concurrently, then waits for all of them.
pub struct RoundRunner<H, C> {
    http: Arc<H>,
    certificate: Arc<C>,
    notifier: Arc<dyn Notifier>,
    policy: AlertPolicy,
    max_concurrency: usize,
    pipeline_timeout: Duration,
}

impl<H, C> RoundRunner<H, C>
where
    H: Probe<Output = ProbeResult>,
    C: Probe<Output = CertificateInfo>,
{
    pub fn new(http: Arc<H>, certificate: Arc<C>, notifier: Arc<dyn Notifier>, policy: AlertPolicy) -> Self {
        Self {
            http,
            certificate,
            notifier,
            policy,
            max_concurrency: DEFAULT_MAX_CONCURRENT_PROBES,
            pipeline_timeout: DEFAULT_PIPELINE_TIMEOUT,
        }
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    pub fn with_pipeline_timeout(mut self, pipeline_timeout: Duration) -> Self {
        self.pipeline_timeout = pipeline_timeout;
        self
    }

    pub async fn run_round(&self, targets: &[Target], cancel: &CancellationSignal) -> RoundSummary {
        let started = Instant::now();
        let width = targets.iter().map(|t| t.as_str().len()).max().unwrap_or(10);
        let limiter = Arc::new(Semaphore::new(self.max_concurrency));
        let mut handles = Vec::with_capacity(targets.len());

        for target in targets {
            let pipeline = Pipeline {
                http: self.http.clone(),
                certificate: self.certificate.clone(),
                notifier: self.notifier.clone(),
                policy: self.policy,
                label: to_fixed_width(target.as_str(), width),
            };
            let limiter = limiter.clone();
            let cancel = cancel.clone();
            let pipeline_timeout = self.pipeline_timeout;
            let owned_target = target.clone();

            let handle = tokio::spawn(async move {
                let admitted = async move {
                    // The semaphore is never closed, so acquiring only waits.
                    let _permit = limiter.acquire_owned().await;
                    tokio::time::timeout(pipeline_timeout, pipeline.run(owned_target)).await
                };

                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => PipelineStatus::Cancelled,
                    outcome = admitted => match outcome {
                        Ok(report) => PipelineStatus::Completed(report),
                        Err(_) => PipelineStatus::TimedOut,
                    },
                }
            });

            handles.push((target.clone(), handle));
        }

        let mut outcomes = Vec::with_capacity(handles.len());
        for (target, handle) in handles {
            let status = match handle.await {
                Ok(status) => status,
                Err(e) => {
                    log::error!("Pipeline for {target} failed: {e}");
                    PipelineStatus::Panicked(e.to_string())
                }
            };
            match &status {
                PipelineStatus::TimedOut => {
                    log::error!("Pipeline for {target} exceeded {:?}", self.pipeline_timeout)
                }
                PipelineStatus::Cancelled => log::info!("Pipeline for {target} cancelled"),
                _ => {}
            }
            outcomes.push(TargetOutcome { target, status });
        }

        let summary = RoundSummary { outcomes };
        log::info!(
            "Round finished in {:.2}s: {}/{} targets checked, {} alerts, {} failed notifications",
            started.elapsed().as_secs_f64(),
            summary.reports().count(),
            targets.len(),
            summary.alert_messages().len(),
            summary.notify_failures()
        );
        summary
    }
}
