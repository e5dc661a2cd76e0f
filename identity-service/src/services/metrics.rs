use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::OnceLock;

/// Process-wide collectors. Recording before `init_metrics` is a no-op.
pub struct Metrics {
    registry: Registry,
    pub http_requests_total: IntCounterVec,
    pub http_request_duration_seconds: HistogramVec,
    pub auth_events_total: IntCounterVec,
    pub otp_issued_total: IntCounterVec,
    pub email_deliveries_total: IntCounterVec,
}

static METRICS: OnceLock<Metrics> = OnceLock::new();

impl Metrics {
    fn build() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let http_requests_total = IntCounterVec::new(
            Opts::new("http_requests_total", "Total number of HTTP requests"),
            &["method", "path", "status"],
        )?;
        let http_request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "HTTP request duration in seconds",
            ),
            &["method", "path", "status"],
        )?;
        let auth_events_total = IntCounterVec::new(
            Opts::new("auth_events_total", "Authentication attempts by event and outcome"),
            &["event", "outcome"],
        )?;
        let otp_issued_total = IntCounterVec::new(
            Opts::new("otp_issued_total", "One-time codes issued by purpose"),
            &["purpose"],
        )?;
        let email_deliveries_total = IntCounterVec::new(
            Opts::new("email_deliveries_total", "Email deliveries by final outcome"),
            &["outcome"],
        )?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;
        registry.register(Box::new(auth_events_total.clone()))?;
        registry.register(Box::new(otp_issued_total.clone()))?;
        registry.register(Box::new(email_deliveries_total.clone()))?;

        Ok(Self {
            registry,
            http_requests_total,
            http_request_duration_seconds,
            auth_events_total,
            otp_issued_total,
            email_deliveries_total,
        })
    }
}

/// Build and install the collectors. Safe to call more than once.
pub fn init_metrics() {
    if METRICS.get().is_some() {
        return;
    }
    match Metrics::build() {
        Ok(metrics) => {
            let _ = METRICS.set(metrics);
        }
        Err(e) => tracing::error!("Failed to initialize metrics: {}", e),
    }
}

pub fn metrics() -> Option<&'static Metrics> {
    METRICS.get()
}

fn outcome(success: bool) -> &'static str {
    if success {
        "success"
    } else {
        "failure"
    }
}

pub fn record_http(method: &str, path: &str, status: u16, seconds: f64) {
    if let Some(m) = metrics() {
        let status = status.to_string();
        let labels = [method, path, status.as_str()];
        m.http_requests_total.with_label_values(&labels).inc();
        m.http_request_duration_seconds
            .with_label_values(&labels)
            .observe(seconds);
    }
}

/// `event` is e.g. `admin_login`, `user_login`, `user_pin_login`.
pub fn record_auth(event: &str, success: bool) {
    if let Some(m) = metrics() {
        m.auth_events_total
            .with_label_values(&[event, outcome(success)])
            .inc();
    }
}

pub fn record_otp(purpose: &str) {
    if let Some(m) = metrics() {
        m.otp_issued_total.with_label_values(&[purpose]).inc();
    }
}

pub fn record_email(delivered: bool) {
    if let Some(m) = metrics() {
        m.email_deliveries_total
            .with_label_values(&[if delivered { "delivered" } else { "failed" }])
            .inc();
    }
}

pub fn get_metrics() -> String {
    let registry = match METRICS.get() {
        Some(m) => &m.registry,
        None => {
            tracing::error!("Metrics registry not initialized");
            return "# Metrics registry not initialized\n".to_string();
        }
    };

    let mut buffer = Vec::new();
    if let Err(e) = TextEncoder::new().encode(&registry.gather(), &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return format!("# Failed to encode metrics: {}\n", e);
    }

    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to convert metrics to UTF-8: {}", e);
            format!("# Failed to convert metrics to UTF-8: {}\n", e)
        }
    }
}
