pub use once_cell::sync::Lazy;
use opentelemetry::metrics::{Counter, Histogram, Meter};

pub trait Metrics {
    fn register() -> Self;
}

/// Builds a lazily registered metrics static: `static M: Lazy<T> = register_metric!(T);`
#[macro_export]
macro_rules! register_metric {
    ($type:ty) => {
        $crate::metrics::lib::Lazy::new(|| <$type as $crate::metrics::lib::Metrics>::register())
    };
}

pub fn register_counter_metric_instrument(
    crate_meter: &Meter,
    instrument_name: String,
    desc: String,
    unit: String,
) -> Counter<u64> {
    crate_meter.u64_counter(instrument_name).with_description(desc).with_unit(unit).init()
}

pub fn register_histogram_metric_instrument(
    crate_meter: &Meter,
    instrument_name: String,
    desc: String,
    unit: String,
) -> Histogram<f64> {
    crate_meter.f64_histogram(instrument_name).with_description(desc).with_unit(unit).init()
}
