/// Process-wide alert thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertThresholds {
    pub slow_response_millis: u64,
    pub cert_expiry_warning_days: i64,
    pub healthy_status_code: u16,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            slow_response_millis: 3000,
            cert_expiry_warning_days: 30,
            healthy_status_code: 200,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AlertPolicy {
    pub thresholds: AlertThresholds,

    /// When set, a failed certificate retrieval raises an alert instead of only being logged.
    pub alert_on_certificate_error: bool,
}

impl AlertPolicy {
    pub fn new(thresholds: AlertThresholds, alert_on_certificate_error: bool) -> Self {
        Self {
            thresholds,
            alert_on_certificate_error,
        }
    }
}
