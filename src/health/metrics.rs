use super::models::{CheckOutcome, HealthReport};
use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Gauge,
    Counter,
}

impl MetricKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Gauge => "gauge",
            MetricKind::Counter => "counter",
        }
    }
}

/// One sample in the exposition output. Pure value; the exporter assembles
/// a fresh sequence of these per scrape.
#[derive(Debug, Clone)]
pub struct MetricSample {
    pub name: String,
    pub kind: MetricKind,
    pub help: String,
    pub labels: Vec<(String, String)>,
    pub value: f64,
}

impl MetricSample {
    pub fn gauge(name: impl Into<String>, help: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            kind: MetricKind::Gauge,
            help: help.into(),
            labels: Vec::new(),
            value,
        }
    }

    pub fn counter(name: impl Into<String>, help: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            kind: MetricKind::Counter,
            help: help.into(),
            labels: Vec::new(),
            value,
        }
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.push((key.into(), value.into()));
        self
    }

    fn render_into(&self, out: &mut String) {
        // HELP/TYPE pair must precede every metric line and carry its name.
        let _ = writeln!(out, "# HELP {} {}", self.name, self.help);
        let _ = writeln!(out, "# TYPE {} {}", self.name, self.kind.as_str());
        if self.labels.is_empty() {
            let _ = writeln!(out, "{} {}", self.name, format_value(self.value));
        } else {
            let labels = self
                .labels
                .iter()
                .map(|(k, v)| format!("{}=\"{}\"", k, escape_label_value(v)))
                .collect::<Vec<_>>()
                .join(",");
            let _ = writeln!(out, "{}{{{}}} {}", self.name, labels, format_value(self.value));
        }
    }
}

fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

fn escape_label_value(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

/// Exposition metric names allow [a-zA-Z0-9_:]; everything else becomes an
/// underscore. A check whose name yields nothing usable is skipped so one
/// bad registration cannot break the whole scrape.
fn sanitize_metric_name(name: &str) -> Option<String> {
    let sanitized: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if sanitized.is_empty() || sanitized.chars().all(|c| c == '_') {
        return None;
    }
    Some(sanitized)
}

/// Renders health reports as Prometheus text exposition. Owns the one piece
/// of process-lifetime state in the subsystem: the scrape counter.
pub struct MetricsExporter {
    service: String,
    environment: String,
    version: String,
    started_at: Instant,
    scrapes: AtomicU64,
}

impl MetricsExporter {
    pub fn new(service: &str, environment: &str, version: &str) -> Self {
        Self {
            service: service.to_string(),
            environment: environment.to_string(),
            version: version.to_string(),
            started_at: Instant::now(),
            scrapes: AtomicU64::new(0),
        }
    }

    pub fn scrapes(&self) -> u64 {
        self.scrapes.load(Ordering::SeqCst)
    }

    /// One scrape: bumps the counter once, atomically, and renders the full
    /// exposition body in a stable order.
    pub fn render_scrape(&self, report: &HealthReport) -> String {
        let scrapes = self.scrapes.fetch_add(1, Ordering::SeqCst) + 1;
        let mut out = String::with_capacity(1024);

        MetricSample::gauge("app_up", "Whether the process is up and answering.", 1.0)
            .render_into(&mut out);

        MetricSample::gauge("app_info", "Static service information.", 1.0)
            .with_label("service", &self.service)
            .with_label("environment", &self.environment)
            .with_label("version", &self.version)
            .render_into(&mut out);

        MetricSample::gauge(
            "app_uptime_seconds",
            "Seconds since the process started.",
            self.started_at.elapsed().as_secs() as f64,
        )
        .render_into(&mut out);

        for check in &report.checks {
            let Some(name) = sanitize_metric_name(&check.name) else {
                tracing::warn!(check = %check.name, "skipping check with unusable metric name");
                continue;
            };

            // Disabled and failing checks both read 0 here. A scrape
            // consumer should not have to special-case "not configured".
            let up = match check.outcome {
                CheckOutcome::Ok => 1.0,
                CheckOutcome::Error | CheckOutcome::Disabled => 0.0,
            };

            MetricSample::gauge(
                format!("app_{}_up", name),
                format!("Whether the {} dependency check passed.", check.name),
                up,
            )
            .render_into(&mut out);

            MetricSample::gauge(
                format!("app_{}_latency_ms", name),
                format!("Latency of the last {} dependency check.", check.name),
                check.latency.as_millis() as f64,
            )
            .render_into(&mut out);
        }

        MetricSample::counter(
            "app_metrics_scrapes_total",
            "Number of times this process was scraped.",
            scrapes as f64,
        )
        .render_into(&mut out);

        out
    }
}
