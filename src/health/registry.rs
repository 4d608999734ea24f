use super::errors::ProbeError;
use super::models::{CheckResult, HealthReport};
use crate::configuration::Settings;
use async_trait::async_trait;
use futures::future::join_all;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::time::timeout;

/// One invokable probe of one dependency. Probes borrow connection pools
/// owned by the surrounding application; they perform a single bounded call.
#[async_trait]
pub trait Probe: Send + Sync {
    async fn probe(&self) -> Result<(), ProbeError>;
}

/// Adapter so plain async closures can be registered as probes.
pub struct FnProbe<F>(pub F);

#[async_trait]
impl<F, Fut> Probe for FnProbe<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), ProbeError>> + Send,
{
    async fn probe(&self) -> Result<(), ProbeError> {
        (self.0)().await
    }
}

type Applicability = Arc<dyn Fn(&Settings) -> bool + Send + Sync>;

/// A named check: probe plus the predicate deciding whether its dependency
/// is configured at all for this deployment.
pub struct Check {
    name: String,
    applicability: Applicability,
    probe: Arc<dyn Probe>,
}

impl Check {
    pub fn new<A, P>(name: &str, applicability: A, probe: P) -> Self
    where
        A: Fn(&Settings) -> bool + Send + Sync + 'static,
        P: Probe + 'static,
    {
        Self {
            name: name.to_string(),
            applicability: Arc::new(applicability),
            probe: Arc::new(probe),
        }
    }

    /// A check whose dependency is not configured in this deployment. It
    /// still appears in every report, with a disabled outcome.
    pub fn unconfigured(name: &str) -> Self {
        Self::new(name, |_| false, FnProbe(|| async { Ok::<(), ProbeError>(()) }))
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// The registered set of checks. Built once at process start, immutable
/// afterwards; every readiness or metrics request runs the applicable
/// checks concurrently and assembles a fresh report.
#[derive(Default)]
pub struct CheckRegistry {
    checks: Vec<Check>,
}

impl CheckRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, check: Check) {
        debug_assert!(
            !self.checks.iter().any(|c| c.name == check.name),
            "duplicate check name: {}",
            check.name
        );
        self.checks.push(check);
    }

    pub fn checks(&self) -> &[Check] {
        &self.checks
    }

    /// Run every applicable check in parallel, each under its own deadline.
    /// Results come back in registration order regardless of which probe
    /// finished first; total wall time is bounded by the largest single
    /// deadline, not their sum.
    #[tracing::instrument(name = "Run health checks", skip(self, settings))]
    pub async fn run_checks(&self, settings: &Settings) -> HealthReport {
        let deadline = settings.check_timeout();

        let probes = self.checks.iter().map(|check| {
            let applicable = (check.applicability)(settings);
            let name = check.name.clone();
            let probe = Arc::clone(&check.probe);

            async move {
                if !applicable {
                    return CheckResult::disabled(name);
                }

                let started = Instant::now();
                match timeout(deadline, probe.probe()).await {
                    Ok(Ok(())) => CheckResult::ok(name, started.elapsed()),
                    Ok(Err(err)) => {
                        tracing::error!(check = %name, error = %err, "health check failed");
                        CheckResult::error(name, err.to_string(), started.elapsed())
                    }
                    Err(_) => {
                        tracing::warn!(check = %name, timeout_ms = deadline.as_millis() as u64, "health check timed out");
                        CheckResult::timed_out(name, started.elapsed())
                    }
                }
            }
        });

        HealthReport::new(join_all(probes).await)
    }
}
