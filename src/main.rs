use healthgate::configuration::get_configuration;
use healthgate::health::{
    amqp_probe, http_probe, postgres_probe, redis_probe, Check, CheckRegistry,
};
use healthgate::startup::run;
use healthgate::telemetry::{get_subscriber, init_subscriber};
use sqlx::postgres::PgPoolOptions;
use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = get_subscriber("healthgate".into(), "info".into());
    init_subscriber(subscriber);

    let settings = get_configuration().expect("Failed to read configuration.");

    let mut registry = CheckRegistry::new();

    match &settings.database {
        Some(database) => {
            tracing::info!(
                db_host = %database.host,
                db_port = database.port,
                db_name = %database.database_name,
                "database check enabled"
            );
            // Lazy pool: a database that is down at boot must surface as a
            // failing readiness check, not a crashed process.
            let pool = PgPoolOptions::new()
                .max_connections(2)
                .acquire_timeout(settings.check_timeout())
                .connect_lazy_with(database.connect_options());
            registry.register(Check::new(
                "database",
                |s| s.database.is_some(),
                postgres_probe(Arc::new(pool)),
            ));
        }
        None => registry.register(Check::unconfigured("database")),
    }

    match &settings.redis {
        Some(redis) => {
            tracing::info!(redis_host = %redis.host, redis_port = redis.port, "cache check enabled");
            let probe = redis_probe(&redis.connection_string())
                .map_err(|err| anyhow::anyhow!("failed to build redis client: {}", err))?;
            registry.register(Check::new("cache", |s| s.redis.is_some(), probe));
        }
        None => registry.register(Check::unconfigured("cache")),
    }

    match &settings.amqp {
        Some(amqp) => {
            tracing::info!(amqp_host = %amqp.host, amqp_port = amqp.port, "broker check enabled");
            let probe = amqp_probe(&amqp.connection_string())
                .map_err(|err| anyhow::anyhow!("failed to build amqp pool: {}", err))?;
            registry.register(Check::new("broker", |s| s.amqp.is_some(), probe));
        }
        None => registry.register(Check::unconfigured("broker")),
    }

    match &settings.upstream {
        Some(upstream) => {
            tracing::info!(url = %upstream.url, "upstream check enabled");
            let client = reqwest::Client::builder()
                .timeout(Duration::from_secs(3))
                .build()?;
            registry.register(Check::new(
                "upstream",
                |s| s.upstream.is_some(),
                http_probe(client, &upstream.url),
            ));
        }
        None => registry.register(Check::unconfigured("upstream")),
    }

    let address = format!("{}:{}", settings.app_host, settings.app_port);
    tracing::info!("Start server at {:?}", &address);
    let listener = TcpListener::bind(&address)?;

    run(listener, registry, settings).await?.await?;
    Ok(())
}
