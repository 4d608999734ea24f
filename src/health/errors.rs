use actix_web::http::StatusCode;
use actix_web::ResponseError;

/// What a probe can report about its dependency. Missing configuration is
/// not represented here: an unconfigured dependency never reaches the probe,
/// it short-circuits to a disabled result in the executor.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    /// Could not reach the dependency at all (refused, DNS, transport).
    #[error("{0}")]
    Unreachable(String),
    /// Reached the dependency but it refused to serve (auth, bad status).
    #[error("{0}")]
    Rejected(String),
}

/// A fault inside this subsystem itself, as opposed to a failing
/// dependency. Surfaces as 500 so it is never mistaken for a legitimate
/// not-ready 503.
#[derive(Debug, thiserror::Error)]
pub enum HealthApiError {
    #[error("failed to serialize health payload: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ResponseError for HealthApiError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}
