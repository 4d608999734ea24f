//! Stock probes for the integrations the generated services ship with.
//! Each one borrows a client owned by the surrounding application and
//! performs a single cheap call; the executor supplies the deadline.

use super::errors::ProbeError;
use super::registry::Probe;
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

pub struct PostgresProbe {
    pool: Arc<PgPool>,
}

#[async_trait]
impl Probe for PostgresProbe {
    #[tracing::instrument(name = "Probe postgres", skip(self))]
    async fn probe(&self) -> Result<(), ProbeError> {
        sqlx::query("SELECT 1 as health_check")
            .fetch_one(self.pool.as_ref())
            .await
            .map(|_| ())
            .map_err(|err| match err {
                sqlx::Error::Database(db_err) => ProbeError::Rejected(db_err.to_string()),
                other => ProbeError::Unreachable(other.to_string()),
            })
    }
}

pub fn postgres_probe(pool: Arc<PgPool>) -> PostgresProbe {
    PostgresProbe { pool }
}

pub struct RedisProbe {
    client: redis::Client,
}

#[async_trait]
impl Probe for RedisProbe {
    #[tracing::instrument(name = "Probe redis", skip(self))]
    async fn probe(&self) -> Result<(), ProbeError> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|err| ProbeError::Unreachable(err.to_string()))?;

        let _pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|err| ProbeError::Rejected(err.to_string()))?;
        Ok(())
    }
}

pub fn redis_probe(connection_string: &str) -> Result<RedisProbe, ProbeError> {
    let client = redis::Client::open(connection_string)
        .map_err(|err| ProbeError::Unreachable(err.to_string()))?;
    Ok(RedisProbe { client })
}

pub struct AmqpProbe {
    pool: deadpool_lapin::Pool,
}

#[async_trait]
impl Probe for AmqpProbe {
    #[tracing::instrument(name = "Probe amqp broker", skip(self))]
    async fn probe(&self) -> Result<(), ProbeError> {
        let conn = self
            .pool
            .get()
            .await
            .map_err(|err| ProbeError::Unreachable(err.to_string()))?;

        conn.create_channel()
            .await
            .map(|_| ())
            .map_err(|err| ProbeError::Rejected(err.to_string()))
    }
}

pub fn amqp_probe(connection_string: &str) -> Result<AmqpProbe, ProbeError> {
    let mut config = deadpool_lapin::Config::default();
    config.url = Some(connection_string.to_string());

    let pool = config
        .create_pool(Some(deadpool_lapin::Runtime::Tokio1))
        .map_err(|err| ProbeError::Unreachable(err.to_string()))?;
    Ok(AmqpProbe { pool })
}

pub struct HttpProbe {
    client: reqwest::Client,
    url: String,
}

#[async_trait]
impl Probe for HttpProbe {
    #[tracing::instrument(name = "Probe upstream service", skip(self), fields(url = %self.url))]
    async fn probe(&self) -> Result<(), ProbeError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|err| ProbeError::Unreachable(err.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(ProbeError::Rejected(format!(
                "upstream returned status: {}",
                response.status()
            )))
        }
    }
}

pub fn http_probe(client: reqwest::Client, url: &str) -> HttpProbe {
    HttpProbe {
        client,
        url: url.to_string(),
    }
}
