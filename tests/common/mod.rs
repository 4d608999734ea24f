use healthgate::configuration::{Environment, Settings};
use healthgate::health::CheckRegistry;

pub struct TestApp {
    pub address: String,
}

pub fn test_settings(environment: Environment) -> Settings {
    Settings {
        app_host: "127.0.0.1".to_string(),
        app_port: 0,
        service_name: "healthgate-test".to_string(),
        environment,
        check_timeout_ms: 300,
        database: None,
        redis: None,
        amqp: None,
        upstream: None,
    }
}

// We have to run the server in another task.
pub async fn spawn_app(registry: CheckRegistry, settings: Settings) -> TestApp {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let server = healthgate::startup::run(listener, registry, settings)
        .await
        .expect("Failed to bind address.");
    let _ = tokio::spawn(server);

    TestApp { address }
}
