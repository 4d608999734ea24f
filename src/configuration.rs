use sqlx::postgres::{PgConnectOptions, PgSslMode};

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Settings {
    pub app_host: String,
    pub app_port: u16,
    pub service_name: String,
    pub environment: Environment,
    /// Deadline for a single probe, in milliseconds.
    #[serde(default = "default_check_timeout_ms")]
    pub check_timeout_ms: u64,
    pub database: Option<DatabaseSettings>,
    pub redis: Option<RedisSettings>,
    pub amqp: Option<AmqpSettings>,
    pub upstream: Option<UpstreamSettings>,
}

fn default_check_timeout_ms() -> u64 {
    300
}

impl Settings {
    pub fn check_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.check_timeout_ms)
    }
}

/// Deployment environment the process runs in. Anything that is not
/// local/development gets error details redacted before they leave
/// the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(try_from = "String")]
pub enum Environment {
    Local,
    Development,
    Staging,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, Environment::Local | Environment::Development)
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "local" => Ok(Environment::Local),
            "dev" | "development" => Ok(Environment::Development),
            "staging" => Ok(Environment::Staging),
            "prod" | "production" => Ok(Environment::Production),
            other => Err(format!(
                "{} is not a supported environment. Use local, development, staging or production.",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub database_name: String,
}

impl DatabaseSettings {
    // Connection string: postgresql://<username>:<password>@<host>:<port>/<database_name>
    pub fn connection_string(&self) -> String {
        format!(
            "postgresql://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name,
        )
    }

    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.username)
            .password(&self.password)
            .database(&self.database_name)
            .ssl_mode(PgSslMode::Disable)
    }
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct RedisSettings {
    pub host: String,
    pub port: u16,
}

impl RedisSettings {
    pub fn connection_string(&self) -> String {
        format!("redis://{}:{}/", self.host, self.port)
    }
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct AmqpSettings {
    pub username: String,
    pub password: String,
    pub host: String,
    pub port: u16,
}

impl AmqpSettings {
    pub fn connection_string(&self) -> String {
        format!(
            "amqp://{}:{}@{}:{}/%2f",
            self.username, self.password, self.host, self.port,
        )
    }
}

/// An HTTP service this one depends on, probed with a plain GET.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct UpstreamSettings {
    pub url: String,
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let mut settings = config::Config::default();

    // Add configuration values from a file named `configuration`
    // with the .yaml extension
    settings.merge(config::File::with_name("configuration"))?; // .json, .toml, .yaml, .yml

    let mut config: Settings = settings.try_deserialize()?;

    // APP_ENVIRONMENT wins over the file, so one image can be promoted
    // through environments without re-rendering its configuration.
    if let Ok(environment) = std::env::var("APP_ENVIRONMENT") {
        config.environment = environment
            .try_into()
            .map_err(config::ConfigError::Message)?;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_parses_aliases() {
        assert_eq!(
            Environment::try_from("dev".to_string()).unwrap(),
            Environment::Development
        );
        assert_eq!(
            Environment::try_from("PROD".to_string()).unwrap(),
            Environment::Production
        );
        assert!(Environment::try_from("qa".to_string()).is_err());
    }

    #[test]
    fn local_and_development_are_local() {
        assert!(Environment::Local.is_local());
        assert!(Environment::Development.is_local());
        assert!(!Environment::Staging.is_local());
        assert!(!Environment::Production.is_local());
    }
}
