use crate::configuration::Settings;
use crate::health::{CheckRegistry, HealthApiError, LivenessBody, MetricsExporter, ReadinessBody};
use actix_web::http::header::ContentType;
use actix_web::{get, web, HttpResponse};
use std::sync::Arc;

/// Process liveness. Never touches the registry: a failing dependency must
/// make this instance not-ready, not restarted.
#[get("")]
pub async fn liveness() -> HttpResponse {
    HttpResponse::Ok().json(LivenessBody::now())
}

/// Dependency-aware readiness. Runs every applicable check fresh for this
/// request; 503 tells the orchestrator to stop routing traffic here.
#[tracing::instrument(name = "Readiness check", skip_all)]
#[get("/ready")]
pub async fn readiness(
    registry: web::Data<Arc<CheckRegistry>>,
    settings: web::Data<Arc<Settings>>,
) -> Result<HttpResponse, HealthApiError> {
    let report = registry.run_checks(&settings).await;
    let body = ReadinessBody::from_report(&report, settings.environment);

    let payload = serde_json::to_string(&body)?;
    let mut response = if body.is_ready() {
        HttpResponse::Ok()
    } else {
        HttpResponse::ServiceUnavailable()
    };

    Ok(response
        .insert_header(ContentType::json())
        .body(payload))
}

/// Prometheus text exposition. Each scrape triggers its own executor run
/// under the same concurrency and timeout rules as readiness.
#[tracing::instrument(name = "Metrics scrape", skip_all)]
#[get("/metrics")]
pub async fn metrics(
    registry: web::Data<Arc<CheckRegistry>>,
    settings: web::Data<Arc<Settings>>,
    exporter: web::Data<Arc<MetricsExporter>>,
) -> HttpResponse {
    let report = registry.run_checks(&settings).await;
    let body = exporter.render_scrape(&report);

    HttpResponse::Ok()
        .insert_header(("Content-Type", "text/plain; charset=utf-8"))
        .body(body)
}
