use std::time::Duration;

use serde::Deserialize;

use crate::evaluator::{AlertPolicy, AlertThresholds};

/// Tunables for the monitoring loop, read from the YAML config file.
/// Every field is optional; a missing file means all defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MonitorConfig {
    /// Pause between the end of one round and the start of the next.
    pub polling_interval_seconds: u64,

    /// Timeout for each HTTP request.
    pub request_timeout_seconds: u64,

    /// Timeout for connecting to a host and reading its certificate.
    pub tls_timeout_seconds: u64,

    /// Upper bound for one target's whole pipeline within a round.
    pub pipeline_timeout_seconds: u64,

    /// How many targets are checked at the same time.
    pub max_concurrent_probes: usize,

    /// Alert when a certificate cannot be retrieved at all, instead of only logging it.
    pub alert_on_certificate_error: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            polling_interval_seconds: 300,
            request_timeout_seconds: 10,
            tls_timeout_seconds: 10,
            pipeline_timeout_seconds: 60,
            max_concurrent_probes: 16,
            alert_on_certificate_error: false,
        }
    }
}

impl MonitorConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml)
    }

    pub fn polling_interval(&self) -> Duration {
        Duration::from_secs(self.polling_interval_seconds)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn tls_timeout(&self) -> Duration {
        Duration::from_secs(self.tls_timeout_seconds)
    }

    pub fn pipeline_timeout(&self) -> Duration {
        Duration::from_secs(self.pipeline_timeout_seconds)
    }

    pub fn alert_policy(&self) -> AlertPolicy {
        AlertPolicy::new(AlertThresholds::default(), self.alert_on_certificate_error)
    }
}
