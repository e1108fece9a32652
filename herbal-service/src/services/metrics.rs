//! Prometheus metrics for herbal-service.
//!
//! HTTP metrics come from the `metrics` facade (service-core middleware) and are
//! rendered by the Prometheus exporter; AI-specific metrics live in a
//! `prometheus` registry appended to the same output.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::OnceLock;

pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub static REMEDY_REQUESTS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static GENAI_PROVIDER_LATENCY_SECONDS: OnceLock<HistogramVec> = OnceLock::new();
pub static GENAI_PROVIDER_ERRORS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Initialize all metrics. Must be called once at startup.
///
/// Recording helpers are no-ops until this runs, so tests can skip it.
pub fn init_metrics() -> anyhow::Result<()> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    if METRICS_HANDLE.set(handle).is_err() {
        anyhow::bail!("metrics already initialized");
    }

    let registry = Registry::new();

    let remedy_requests = IntCounterVec::new(
        Opts::new(
            "remedy_requests_total",
            "Herbal remedy requests by outcome",
        ),
        &["outcome"],
    )?;

    let provider_latency = HistogramVec::new(
        HistogramOpts::new(
            "genai_provider_latency_seconds",
            "Latency of AI provider calls in seconds",
        )
        .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 20.0, 30.0]),
        &["stage", "model"],
    )?;

    let provider_errors = IntCounterVec::new(
        Opts::new(
            "genai_provider_errors_total",
            "AI provider failures by stage and kind",
        ),
        &["stage", "kind"],
    )?;

    registry.register(Box::new(remedy_requests.clone()))?;
    registry.register(Box::new(provider_latency.clone()))?;
    registry.register(Box::new(provider_errors.clone()))?;

    let _ = REGISTRY.set(registry);
    let _ = REMEDY_REQUESTS_TOTAL.set(remedy_requests);
    let _ = GENAI_PROVIDER_LATENCY_SECONDS.set(provider_latency);
    let _ = GENAI_PROVIDER_ERRORS_TOTAL.set(provider_errors);

    Ok(())
}

/// Get metrics output in Prometheus text format.
pub fn get_metrics() -> String {
    let mut output = METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string());

    if let Some(registry) = REGISTRY.get() {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        if let Err(e) = encoder.encode(&registry.gather(), &mut buffer) {
            tracing::error!(error = %e, "Failed to encode metrics");
            return output;
        }
        match String::from_utf8(buffer) {
            Ok(custom) => output.push_str(&custom),
            Err(e) => tracing::error!(error = %e, "Failed to convert metrics to UTF-8"),
        }
    }

    output
}

/// Record the final outcome of a remedy request ("success" or an error kind).
pub fn record_remedy_request(outcome: &str) {
    if let Some(counter) = REMEDY_REQUESTS_TOTAL.get() {
        counter.with_label_values(&[outcome]).inc();
    }
}

/// Record provider latency.
pub fn record_provider_latency(stage: &str, model: &str, duration_secs: f64) {
    if let Some(histogram) = GENAI_PROVIDER_LATENCY_SECONDS.get() {
        histogram
            .with_label_values(&[stage, model])
            .observe(duration_secs);
    }
}

/// Record a provider error.
pub fn record_provider_error(stage: &str, kind: &str) {
    if let Some(counter) = GENAI_PROVIDER_ERRORS_TOTAL.get() {
        counter.with_label_values(&[stage, kind]).inc();
    }
}
