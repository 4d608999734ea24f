mod aggregate;
mod errors;
mod metrics;
mod models;
mod probes;
mod redact;
mod registry;

pub use aggregate::{LivenessBody, ReadinessBody};
pub use errors::{HealthApiError, ProbeError};
pub use metrics::{MetricKind, MetricSample, MetricsExporter};
pub use models::{CheckOutcome, CheckResult, HealthReport, TIMEOUT_DETAIL};
pub use probes::{amqp_probe, http_probe, postgres_probe, redis_probe};
pub use redact::{redact, REDACTED_PLACEHOLDER};
pub use registry::{Check, CheckRegistry, FnProbe, Probe};
