mod common;

use common::{spawn_app, test_settings};
use healthgate::configuration::Environment;
use healthgate::health::{Check, CheckRegistry, FnProbe, ProbeError};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

fn ok_check(name: &str) -> Check {
    Check::new(name, |_| true, FnProbe(|| async { Ok::<(), ProbeError>(()) }))
}

fn failing_check(name: &str, message: &str) -> Check {
    let message = message.to_string();
    Check::new(
        name,
        |_| true,
        FnProbe(move || {
            let message = message.clone();
            async move { Err::<(), ProbeError>(ProbeError::Unreachable(message)) }
        }),
    )
}

#[tokio::test]
async fn liveness_works() {
    let app = spawn_app(CheckRegistry::new(), test_settings(Environment::Local)).await;
    let client = reqwest::Client::new();

    let response = client
        .get(&format!("{}/health", &app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn liveness_ignores_failing_dependencies() {
    let mut registry = CheckRegistry::new();
    registry.register(failing_check("database", "connection refused"));

    let app = spawn_app(registry, test_settings(Environment::Local)).await;
    let client = reqwest::Client::new();

    let response = client
        .get(&format!("{}/health", &app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn readiness_is_200_when_every_check_passes() {
    let mut registry = CheckRegistry::new();
    registry.register(ok_check("database"));

    let app = spawn_app(registry, test_settings(Environment::Local)).await;
    let client = reqwest::Client::new();

    let response = client
        .get(&format!("{}/health/ready", &app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ready");
    assert_eq!(body["checks"]["database"], "ok");
}

#[tokio::test]
async fn readiness_is_200_with_zero_registered_checks() {
    let app = spawn_app(CheckRegistry::new(), test_settings(Environment::Local)).await;
    let client = reqwest::Client::new();

    let response = client
        .get(&format!("{}/health/ready", &app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn unconfigured_dependencies_are_reported_but_never_fail_readiness() {
    let mut registry = CheckRegistry::new();
    registry.register(Check::unconfigured("cache"));

    let app = spawn_app(registry, test_settings(Environment::Local)).await;
    let client = reqwest::Client::new();

    let response = client
        .get(&format!("{}/health/ready", &app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ready");
    assert_eq!(body["checks"]["cache"], "disabled");
}

#[tokio::test]
async fn failing_database_with_unconfigured_cache_yields_503() {
    let mut registry = CheckRegistry::new();
    registry.register(failing_check("database", "connection refused"));
    registry.register(Check::unconfigured("cache"));

    let app = spawn_app(registry, test_settings(Environment::Local)).await;
    let client = reqwest::Client::new();

    let response = client
        .get(&format!("{}/health/ready", &app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status().as_u16(), 503);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "not_ready");
    assert_eq!(body["checks"]["database"], "error");
    assert_eq!(body["checks"]["cache"], "disabled");
    assert_eq!(body["database_error"], "connection refused");
}

#[tokio::test]
async fn error_detail_is_redacted_and_stable_outside_local() {
    // The underlying message changes on every call; the wire detail must not.
    let calls = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&calls);

    let mut registry = CheckRegistry::new();
    registry.register(Check::new(
        "database",
        |_| true,
        FnProbe(move || {
            let counter = Arc::clone(&counter);
            async move {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                Err::<(), ProbeError>(ProbeError::Unreachable(format!(
                    "connect attempt {} refused by db-internal-host:5432",
                    n
                )))
            }
        }),
    ));

    let app = spawn_app(registry, test_settings(Environment::Production)).await;
    let client = reqwest::Client::new();

    let mut details = Vec::new();
    for _ in 0..2 {
        let response = client
            .get(&format!("{}/health/ready", &app.address))
            .send()
            .await
            .expect("Failed to execute request.");
        assert_eq!(response.status().as_u16(), 503);
        let body: serde_json::Value = response.json().await.unwrap();
        details.push(body["database_error"].as_str().unwrap().to_string());
    }

    assert_eq!(details[0], "hidden");
    assert_eq!(details[0], details[1]);
}

#[tokio::test]
async fn stalled_broker_probe_times_out_without_hanging_the_response() {
    let mut registry = CheckRegistry::new();
    registry.register(Check::new(
        "broker",
        |_| true,
        FnProbe(|| async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok::<(), ProbeError>(())
        }),
    ));

    let app = spawn_app(registry, test_settings(Environment::Local)).await;
    let client = reqwest::Client::new();

    let started = Instant::now();
    let response = client
        .get(&format!("{}/health/ready", &app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(response.status().as_u16(), 503);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["checks"]["broker"], "error");
    assert_eq!(body["broker_error"], "timeout");
}

#[tokio::test]
async fn metrics_exposition_is_well_formed() {
    let mut registry = CheckRegistry::new();
    registry.register(ok_check("database"));
    registry.register(Check::unconfigured("cache"));

    let app = spawn_app(registry, test_settings(Environment::Staging)).await;
    let client = reqwest::Client::new();

    let response = client
        .get(&format!("{}/metrics", &app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(
        response.headers()["content-type"],
        "text/plain; charset=utf-8"
    );

    let body = response.text().await.unwrap();
    assert!(body.contains("app_up 1"));
    assert!(body.contains("service=\"healthgate-test\""));
    assert!(body.contains("environment=\"staging\""));
    assert!(body.contains("app_database_up 1"));
    assert!(body.contains("app_cache_up 0"));

    // Every metric line must be preceded by a HELP/TYPE pair with its name.
    let lines: Vec<&str> = body.lines().collect();
    for (i, line) in lines.iter().enumerate() {
        if line.starts_with('#') {
            continue;
        }
        let name = line.split(|c| c == '{' || c == ' ').next().unwrap();
        assert!(lines[i - 2].starts_with(&format!("# HELP {} ", name)));
        assert!(lines[i - 1].starts_with(&format!("# TYPE {} ", name)));
    }
}

#[tokio::test]
async fn scrape_counter_increases_by_one_per_scrape() {
    let app = spawn_app(CheckRegistry::new(), test_settings(Environment::Local)).await;
    let client = reqwest::Client::new();

    let mut counts = Vec::new();
    for _ in 0..2 {
        let body = client
            .get(&format!("{}/metrics", &app.address))
            .send()
            .await
            .expect("Failed to execute request.")
            .text()
            .await
            .unwrap();
        let count: u64 = body
            .lines()
            .find(|l| l.starts_with("app_metrics_scrapes_total"))
            .and_then(|l| l.split(' ').last())
            .unwrap()
            .parse()
            .unwrap();
        counts.push(count);
    }

    assert_eq!(counts[1], counts[0] + 1);
}

#[tokio::test]
async fn upstream_http_probe_follows_the_mock_server() {
    use healthgate::health::http_probe;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let mut registry = CheckRegistry::new();
    let http_client = reqwest::Client::new();
    registry.register(Check::new(
        "upstream",
        |_| true,
        http_probe(http_client, &format!("{}/health", mock_server.uri())),
    ));

    let app = spawn_app(registry, test_settings(Environment::Local)).await;
    let client = reqwest::Client::new();

    let response = client
        .get(&format!("{}/health/ready", &app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["checks"]["upstream"], "ok");
}

#[tokio::test]
async fn upstream_rejection_is_an_error_with_the_status_in_the_detail() {
    use healthgate::health::http_probe;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let mut registry = CheckRegistry::new();
    let http_client = reqwest::Client::new();
    registry.register(Check::new(
        "upstream",
        |_| true,
        http_probe(http_client, &format!("{}/health", mock_server.uri())),
    ));

    let app = spawn_app(registry, test_settings(Environment::Local)).await;
    let client = reqwest::Client::new();

    let response = client
        .get(&format!("{}/health/ready", &app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status().as_u16(), 503);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["checks"]["upstream"], "error");
    assert!(body["upstream_error"]
        .as_str()
        .unwrap()
        .contains("500"));
}
