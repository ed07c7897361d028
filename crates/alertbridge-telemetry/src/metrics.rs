//! Prometheus metrics for alertbridge.
//!
//! Covers webhook intake, queue depth, order submission and worker state.
//!
//! # Panics
//!
//! Metric registration uses `unwrap()`. A registration failure means a
//! duplicate metric name, which should crash at startup. These panics only
//! occur during static initialization, never at runtime.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_gauge_vec, register_histogram_vec, register_int_gauge,
    CounterVec, Encoder, GaugeVec, HistogramVec, IntGauge, TextEncoder,
};

use crate::error::{TelemetryError, TelemetryResult};

/// Webhook requests by outcome.
/// Labels: result (queued/executed/unauthorized/bad_request/failed/queue_closed)
pub static WEBHOOK_REQUESTS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "alertbridge_webhook_requests_total",
        "Total webhook requests by result",
        &["result"]
    )
    .unwrap()
});

/// Alerts waiting in the queue.
pub static QUEUE_DEPTH: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!("alertbridge_queue_depth", "Alerts waiting in the queue").unwrap()
});

/// Orders accepted by the brokerage.
pub static ORDERS_SUBMITTED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "alertbridge_orders_submitted_total",
        "Total orders accepted by the brokerage",
        &["kind", "side"]
    )
    .unwrap()
});

/// Failed order attempts.
/// Labels: reason (submission/quote)
pub static ORDER_FAILURES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "alertbridge_order_failures_total",
        "Total failed order attempts",
        &["reason"]
    )
    .unwrap()
});

/// Brokerage submission round-trip in milliseconds.
pub static ORDER_SUBMIT_LATENCY_MS: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "alertbridge_order_submit_latency_ms",
        "Order submission latency in milliseconds",
        &["kind"],
        vec![10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0, 10000.0]
    )
    .unwrap()
});

/// Worker state (1 = active, 0 = inactive).
/// Labels: state (idle/processing/stopped)
pub static WORKER_STATE: Lazy<GaugeVec> = Lazy::new(|| {
    register_gauge_vec!(
        "alertbridge_worker_state",
        "Queue worker current state (1=active, 0=inactive)",
        &["state"]
    )
    .unwrap()
});

const WORKER_STATES: [&str; 3] = ["idle", "processing", "stopped"];

/// Metrics facade for easy access.
pub struct Metrics;

impl Metrics {
    /// Record a webhook request outcome.
    pub fn webhook_request(result: &str) {
        WEBHOOK_REQUESTS_TOTAL.with_label_values(&[result]).inc();
    }

    pub fn queue_depth_set(depth: i64) {
        QUEUE_DEPTH.set(depth);
    }

    /// Record an accepted order.
    pub fn order_submitted(kind: &str, side: &str) {
        ORDERS_SUBMITTED_TOTAL.with_label_values(&[kind, side]).inc();
    }

    pub fn order_failed(reason: &str) {
        ORDER_FAILURES_TOTAL.with_label_values(&[reason]).inc();
    }

    /// Record brokerage submission latency.
    pub fn order_submit_latency(kind: &str, latency_ms: f64) {
        ORDER_SUBMIT_LATENCY_MS
            .with_label_values(&[kind])
            .observe(latency_ms);
    }

    /// Set worker state.
    /// Only the active state is set to 1, all others to 0.
    pub fn worker_state_set(state: &str) {
        for s in WORKER_STATES {
            WORKER_STATE.with_label_values(&[s]).set(0.0);
        }
        WORKER_STATE.with_label_values(&[state]).set(1.0);
    }

    /// Render every registered metric in the Prometheus text format.
    pub fn gather_text() -> TelemetryResult<String> {
        Self::touch();
        let encoder = TextEncoder::new();
        let mut buf = Vec::new();
        encoder.encode(&prometheus::gather(), &mut buf)?;
        String::from_utf8(buf).map_err(|e| TelemetryError::Metrics(e.to_string()))
    }

    /// Force registration so metrics appear before their first update.
    fn touch() {
        Lazy::force(&WEBHOOK_REQUESTS_TOTAL);
        Lazy::force(&QUEUE_DEPTH);
        Lazy::force(&ORDERS_SUBMITTED_TOTAL);
        Lazy::force(&ORDER_FAILURES_TOTAL);
        Lazy::force(&ORDER_SUBMIT_LATENCY_MS);
        Lazy::force(&WORKER_STATE);
    }
}
