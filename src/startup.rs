use crate::configuration::Settings;
use crate::health::{CheckRegistry, MetricsExporter};
use crate::routes;
use actix_web::{dev::Server, web, App, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

pub async fn run(
    listener: TcpListener,
    registry: CheckRegistry,
    settings: Settings,
) -> Result<Server, std::io::Error> {
    let exporter = MetricsExporter::new(
        &settings.service_name,
        settings.environment.as_str(),
        env!("CARGO_PKG_VERSION"),
    );

    let settings = web::Data::new(Arc::new(settings));
    let registry = web::Data::new(Arc::new(registry));
    let exporter = web::Data::new(Arc::new(exporter));

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(settings.clone())
            .app_data(registry.clone())
            .app_data(exporter.clone())
            .service(
                web::scope("/health")
                    .service(routes::liveness)
                    .service(routes::readiness),
            )
            .service(routes::metrics)
    })
    .listen(listener)?
    .run();

    Ok(server)
}
