use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus exporter and register all application metrics.
/// Returns a `PrometheusHandle` whose `render()` method produces the
/// text/plain Prometheus scrape payload.
pub fn init_metrics() -> PrometheusHandle {
    let builder = PrometheusBuilder::new();
    let handle = builder
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    // Pre-register counters so they appear even before the first increment.
    counter!("aggregations_total").absolute(0);
    counter!("provider_failures_total").absolute(0);
    counter!("adapter_timeouts_total").absolute(0);
    counter!("price_lookups_total").absolute(0);
    counter!("alerts_emitted_total").absolute(0);

    // Histogram is lazily created on first record; force creation.
    histogram!("aggregation_latency_seconds").record(0.0);

    handle
}
