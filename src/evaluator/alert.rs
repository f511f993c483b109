use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

impl Severity {
    /// Level an alert of this severity is logged at.
    pub fn log_level(self) -> log::Level {
        match self {
            Severity::Warning => log::Level::Warn,
            Severity::Error => log::Level::Error,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Down,
    Slow,
    CertificateExpiring,
    CertificateUnavailable,
}

/// A threshold breach, phrased for a human. Delivered once and then dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub kind: AlertKind,
    pub severity: Severity,
    pub message: String,
}

impl Alert {
    pub fn new(kind: AlertKind, message: impl Into<String>) -> Self {
        let severity = match kind {
            AlertKind::Down => Severity::Error,
            AlertKind::Slow | AlertKind::CertificateExpiring | AlertKind::CertificateUnavailable => {
                Severity::Warning
            }
        };
        Self {
            kind,
            severity,
            message: message.into(),
        }
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
