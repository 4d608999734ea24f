use super::models::{CheckOutcome, HealthReport};
use super::redact::redact;
use crate::configuration::Environment;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;

/// Body of the liveness endpoint. Deliberately trivial: it must stay O(1)
/// and must never depend on the check registry, so a failing dependency can
/// never look like a dead process.
#[derive(Debug, Serialize)]
pub struct LivenessBody {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
}

impl LivenessBody {
    pub fn now() -> Self {
        Self {
            status: "healthy",
            timestamp: Utc::now(),
        }
    }
}

/// Readiness verdict plus its wire payload. Pure function of one report;
/// no state survives the request.
#[derive(Debug, Serialize)]
pub struct ReadinessBody {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub checks: IndexMap<String, &'static str>,
    #[serde(flatten)]
    pub errors: IndexMap<String, String>,
}

impl ReadinessBody {
    /// `checks` keeps registration order; `<name>_error` fields are present
    /// only for failing checks and only after redaction.
    pub fn from_report(report: &HealthReport, environment: Environment) -> Self {
        let mut checks = IndexMap::with_capacity(report.checks.len());
        let mut errors = IndexMap::new();

        for check in &report.checks {
            checks.insert(check.name.clone(), check.outcome.as_str());
            if check.outcome == CheckOutcome::Error {
                if let Some(detail) = &check.detail {
                    errors.insert(
                        format!("{}_error", check.name),
                        redact(detail, environment),
                    );
                }
            }
        }

        Self {
            status: if report.is_ready() {
                "ready"
            } else {
                "not_ready"
            },
            timestamp: report.timestamp,
            checks,
            errors,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == "ready"
    }
}
