use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Detail attached to a probe that missed its deadline. Kept distinct from
/// dependency-reported messages so operators can tell "slow" from "broken".
pub const TIMEOUT_DETAIL: &str = "timeout";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CheckOutcome {
    Ok,
    Error,
    Disabled,
}

impl CheckOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckOutcome::Ok => "ok",
            CheckOutcome::Error => "error",
            CheckOutcome::Disabled => "disabled",
        }
    }
}

/// Result of one probe invocation. Built fresh on every readiness or
/// metrics request, never cached across requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub name: String,
    pub outcome: CheckOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub latency: Duration,
}

impl CheckResult {
    pub fn ok(name: String, latency: Duration) -> Self {
        Self {
            name,
            outcome: CheckOutcome::Ok,
            detail: None,
            latency,
        }
    }

    pub fn error(name: String, detail: String, latency: Duration) -> Self {
        Self {
            name,
            outcome: CheckOutcome::Error,
            detail: Some(detail),
            latency,
        }
    }

    pub fn timed_out(name: String, latency: Duration) -> Self {
        Self::error(name, TIMEOUT_DETAIL.to_string(), latency)
    }

    pub fn disabled(name: String) -> Self {
        Self {
            name,
            outcome: CheckOutcome::Disabled,
            detail: None,
            latency: Duration::ZERO,
        }
    }
}

/// One snapshot of every registered check, in registration order.
#[derive(Debug, Clone)]
pub struct HealthReport {
    pub timestamp: DateTime<Utc>,
    pub checks: Vec<CheckResult>,
}

impl HealthReport {
    pub fn new(checks: Vec<CheckResult>) -> Self {
        Self {
            timestamp: Utc::now(),
            checks,
        }
    }

    /// Error wins over everything; Disabled counts as success. A report
    /// with no applicable checks is healthy.
    pub fn is_ready(&self) -> bool {
        !self
            .checks
            .iter()
            .any(|check| check.outcome == CheckOutcome::Error)
    }
}
