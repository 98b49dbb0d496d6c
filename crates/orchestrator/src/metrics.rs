use once_cell::sync::Lazy;
use opentelemetry::metrics::{Counter, Histogram, Meter};
use opentelemetry::{global, KeyValue};
use utils::metrics::lib::{register_counter_metric_instrument, register_histogram_metric_instrument, Metrics};
use utils::register_metric;

use crate::constants::DEFAULT_OTEL_SERVICE_NAME;

pub static POF_METRICS: Lazy<PofMetrics> = register_metric!(PofMetrics);

pub struct PofMetrics {
    pub meter: Meter,
    pub status_checks: Counter<u64>,
    pub jobs_finished: Counter<u64>,
    pub status_check_latency: Histogram<f64>,
}

impl Metrics for PofMetrics {
    fn register() -> Self {
        // Register meter
        let common_scope_attributes = vec![KeyValue::new("crate", "pof-orchestrator")];
        let pof_meter = global::meter_with_version(
            "crates.pof-orchestrator.opentelemetry",
            Some("0.17"),
            Some("https://opentelemetry.io/schemas/1.2.0"),
            Some(common_scope_attributes),
        );

        // Register all instruments
        let status_checks = register_counter_metric_instrument(
            &pof_meter,
            format!("{}{}", DEFAULT_OTEL_SERVICE_NAME, "_status_checks"),
            "Number of proof job status checks, by outcome".to_string(),
            "check".to_string(),
        );

        let jobs_finished = register_counter_metric_instrument(
            &pof_meter,
            format!("{}{}", DEFAULT_OTEL_SERVICE_NAME, "_jobs_finished"),
            "Number of proof jobs that reached a terminal status".to_string(),
            "job".to_string(),
        );

        let status_check_latency = register_histogram_metric_instrument(
            &pof_meter,
            format!("{}{}", DEFAULT_OTEL_SERVICE_NAME, "_status_check_latency"),
            "Round trip time of a proof job status check".to_string(),
            "ms".to_string(),
        );

        Self { meter: pof_meter, status_checks, jobs_finished, status_check_latency }
    }
}
