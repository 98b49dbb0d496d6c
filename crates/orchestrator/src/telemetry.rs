use std::time::Duration;

use color_eyre::eyre::eyre;
use opentelemetry::global;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry::KeyValue;
use opentelemetry_otlp::{ExportConfig, WithExportConfig};
use opentelemetry_sdk::metrics::reader::{DefaultAggregationSelector, DefaultTemporalitySelector};
use opentelemetry_sdk::metrics::{PeriodicReader, SdkMeterProvider};
use opentelemetry_sdk::trace::{BatchConfigBuilder, Config, Tracer, TracerProvider};
use opentelemetry_sdk::{runtime, Resource};
use tracing::Level;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;
use url::Url;

#[derive(Debug, Clone)]
pub struct InstrumentationParams {
    pub otel_service_name: String,
    pub otel_collector_endpoint: Option<Url>,
    pub log_level: Level,
}

/// Providers installed by [`setup_analytics`]. Flushed by [`Analytics::shutdown`].
#[derive(Default)]
pub struct Analytics {
    meter_provider: Option<SdkMeterProvider>,
    tracer_installed: bool,
}

/// Installs the global tracing subscriber.
///
/// Logs always go to stdout through the `fmt` layer. Traces and metrics are exported over OTLP
/// only when a collector endpoint is configured.
pub fn setup_analytics(params: &InstrumentationParams) -> color_eyre::Result<Analytics> {
    let level_filter = LevelFilter::from_level(params.log_level);

    let Some(endpoint) = params.otel_collector_endpoint.as_ref() else {
        tracing_subscriber::registry()
            .with(level_filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .map_err(|e| eyre!("Failed to install the tracing subscriber: {e}"))?;
        return Ok(Analytics::default());
    };

    let meter_provider = init_metric_provider(params, endpoint)?;
    let tracer = init_tracer_provider(params, endpoint)?;

    tracing_subscriber::registry()
        .with(level_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(OpenTelemetryLayer::new(tracer))
        .try_init()
        .map_err(|e| eyre!("Failed to install the tracing subscriber: {e}"))?;

    tracing::debug!(%endpoint, service = %params.otel_service_name, "OpenTelemetry export enabled");
    Ok(Analytics { meter_provider: Some(meter_provider), tracer_installed: true })
}

impl Analytics {
    pub fn shutdown(self) -> color_eyre::Result<()> {
        if self.tracer_installed {
            global::shutdown_tracer_provider();
        }
        if let Some(meter_provider) = self.meter_provider {
            meter_provider.shutdown().map_err(|e| eyre!("Failed to shut down the meter provider: {e}"))?;
        }
        Ok(())
    }
}

pub fn init_tracer_provider(params: &InstrumentationParams, endpoint: &Url) -> color_eyre::Result<Tracer> {
    let batch_config = BatchConfigBuilder::default().build();

    let provider: TracerProvider = opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(opentelemetry_otlp::new_exporter().tonic().with_endpoint(endpoint.to_string()))
        .with_trace_config(Config::default().with_resource(Resource::new(vec![KeyValue::new(
            opentelemetry_semantic_conventions::resource::SERVICE_NAME,
            format!("{}{}", params.otel_service_name, "_trace_service"),
        )])))
        .with_batch_config(batch_config)
        .install_batch(runtime::Tokio)
        .map_err(|e| eyre!("Failed to install the OTLP tracer: {e}"))?;

    global::set_tracer_provider(provider.clone());

    Ok(provider.tracer(format!("{}{}", params.otel_service_name, "_subscriber")))
}

pub fn init_metric_provider(params: &InstrumentationParams, endpoint: &Url) -> color_eyre::Result<SdkMeterProvider> {
    let export_config = ExportConfig { endpoint: endpoint.to_string(), ..ExportConfig::default() };

    let exporter = opentelemetry_otlp::new_exporter()
        .tonic()
        .with_export_config(export_config)
        .build_metrics_exporter(
            Box::new(DefaultAggregationSelector::new()),
            Box::new(DefaultTemporalitySelector::new()),
        )
        .map_err(|e| eyre!("Failed to build the OTLP metrics exporter: {e}"))?;

    // Creates a periodic reader that exports every 5 seconds
    let reader = PeriodicReader::builder(exporter, runtime::Tokio).with_interval(Duration::from_secs(5)).build();

    let provider = SdkMeterProvider::builder()
        .with_reader(reader)
        .with_resource(Resource::new(vec![KeyValue::new(
            opentelemetry_semantic_conventions::resource::SERVICE_NAME,
            format!("{}{}", params.otel_service_name, "_meter_service"),
        )]))
        .build();
    global::set_meter_provider(provider.clone());
    Ok(provider)
}
