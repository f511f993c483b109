use chrono::{DateTime, Utc};

use crate::probe::Target;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateInfo {
    pub target: Target,
    pub expires_at: Result<DateTime<Utc>, String>,
}

impl CertificateInfo {
    pub fn expiring(target: Target, expires_at: DateTime<Utc>) -> Self {
        Self {
            target,
            expires_at: Ok(expires_at),
        }
    }

    pub fn failed(target: Target, error: impl Into<String>) -> Self {
        Self {
            target,
            expires_at: Err(error.into()),
        }
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at.as_ref().ok().copied()
    }

    pub fn error(&self) -> Option<&str> {
        self.expires_at.as_ref().err().map(String::as_str)
    }
}
