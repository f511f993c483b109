use crate::probe::Target;

/// Either a response was received (whatever its status) or the request failed at transport level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpOutcome {
    Response { status_code: u16, latency_millis: u64 },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub target: Target,
    pub outcome: HttpOutcome,
}

impl ProbeResult {
    pub fn response(target: Target, status_code: u16, latency_millis: u64) -> Self {
        Self {
            target,
            outcome: HttpOutcome::Response {
                status_code,
                latency_millis,
            },
        }
    }

    pub fn failed(target: Target, error: impl Into<String>) -> Self {
        Self {
            target,
            outcome: HttpOutcome::Failed {
                error: error.into(),
            },
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self.outcome {
            HttpOutcome::Response { status_code, .. } => Some(status_code),
            HttpOutcome::Failed { .. } => None,
        }
    }

    pub fn latency_millis(&self) -> Option<u64> {
        match self.outcome {
            HttpOutcome::Response { latency_millis, .. } => Some(latency_millis),
            HttpOutcome::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            HttpOutcome::Response { .. } => None,
            HttpOutcome::Failed { error } => Some(error),
        }
    }
}
