use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts};

lazy_static::lazy_static!(
    pub static ref WITHDRAWALS_SUCCEEDED_TOTAL: IntCounter =
        counter("withdrawals_succeeded_total", "Total number of successful withdrawals");

    pub static ref WITHDRAWALS_FAILED_TOTAL: IntCounterVec =
        counter_vec("withdrawals_failed_total", "Total number of failed withdrawals by error kind", &["kind"]);

    pub static ref WITHDRAWALS_CANCELLED_TOTAL: IntCounter =
        counter("withdrawals_cancelled_total", "Total number of withdrawals abandoned before a response");

    pub static ref BALANCE_CACHE_FALLBACKS_TOTAL: IntCounter =
        counter("balance_cache_fallbacks_total", "Total number of balance lookups served from cache after a store failure");

    pub static ref WITHDRAWAL_PROCESSING_TIME_SECONDS: Histogram =
        histogram("withdrawal_processing_time_seconds", "Total time spent processing withdrawals in seconds");
);

fn counter(name: &str, help: &str) -> IntCounter {
    let counter = IntCounter::new(name, help).expect("metric options are valid");
    register(Box::new(counter.clone()));
    counter
}

fn counter_vec(name: &str, help: &str, labels: &[&str]) -> IntCounterVec {
    let counter =
        IntCounterVec::new(Opts::new(name, help), labels).expect("metric options are valid");
    register(Box::new(counter.clone()));
    counter
}

fn histogram(name: &str, help: &str) -> Histogram {
    let opts = HistogramOpts::new(name, help)
        .buckets(vec![0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]);
    let histogram = Histogram::with_opts(opts).expect("metric options are valid");
    register(Box::new(histogram.clone()));
    histogram
}

fn register(collector: Box<dyn prometheus::core::Collector>) {
    if let Err(e) = prometheus::default_registry().register(collector) {
        tracing::warn!("Failed to register metric: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_are_registered() {
        WITHDRAWALS_SUCCEEDED_TOTAL.inc();
        WITHDRAWALS_FAILED_TOTAL.with_label_values(&["validation"]).inc();

        let families = prometheus::default_registry().gather();
        let text = prometheus::TextEncoder::new()
            .encode_to_string(&families)
            .unwrap();

        assert!(text.contains("withdrawals_succeeded_total"));
        assert!(text.contains("withdrawals_failed_total{kind=\"validation\"}"));
    }
}
