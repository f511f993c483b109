pub mod alert;
pub mod policy;

use chrono::{DateTime, Utc};

pub use alert::{Alert, AlertKind, Severity};
pub use policy::{AlertPolicy, AlertThresholds};

use crate::cert_probe::CertificateInfo;
use crate::http_probe::prelude::*;

/// Applies the alert policy to one target's probe results.
///
/// Each rule is checked on its own, so a single target can produce several
/// alerts in one round. Alerts come back in rule order: down, slow, certificate.
/// `now` is passed in so the result depends only on the arguments.
pub fn evaluate(
    result: &ProbeResult,
    cert: &CertificateInfo,
    policy: &AlertPolicy,
    now: DateTime<Utc>,
) -> Vec<Alert> {
    let thresholds = &policy.thresholds;
    let target = &result.target;
    let mut alerts = Vec::new();

    match &result.outcome {
        HttpOutcome::Failed { error } => {
            alerts.push(Alert::new(
                AlertKind::Down,
                format!("Website {target} is down! Error: {error}"),
            ));
        }
        HttpOutcome::Response {
            status_code,
            latency_millis,
        } => {
            if *status_code != thresholds.healthy_status_code {
                alerts.push(Alert::new(
                    AlertKind::Down,
                    format!("Website {target} is down! Status Code: {status_code}"),
                ));
            }
            if *latency_millis > thresholds.slow_response_millis {
                alerts.push(Alert::new(
                    AlertKind::Slow,
                    format!("Website {target} is slow. Response time: {latency_millis} ms"),
                ));
            }
        }
    }

    match &cert.expires_at {
        Ok(expires_at) => {
            let days_remaining = (*expires_at - now).num_days();
            if days_remaining < thresholds.cert_expiry_warning_days {
                alerts.push(Alert::new(
                    AlertKind::CertificateExpiring,
                    format!(
                        "Website {} SSL certificate will expire in {} days on {}.",
                        cert.target,
                        days_remaining,
                        expires_at.format("%Y-%m-%d")
                    ),
                ));
            }
        }
        Err(error) if policy.alert_on_certificate_error => {
            alerts.push(Alert::new(
                AlertKind::CertificateUnavailable,
                format!("Website {} SSL certificate check failed: {error}", cert.target),
            ));
        }
        Err(_) => {}
    }

    alerts
}
