//! Metrics setup and update for query execution.

use prometheus::core::{AtomicU64, GenericCounter};
use prometheus::Histogram;

/// The collection of metrics exposed through the `/metrics` endpoint.
#[derive(Debug, Clone)]
pub struct Metrics {
    pub query_total: GenericCounter<AtomicU64>,
    pub query_errors_total: GenericCounter<AtomicU64>,
    pub query_duration_seconds: Histogram,
}

impl Metrics {
    /// Set up counters and histograms used to produce Prometheus metrics.
    pub fn initialize(metrics_registry: &mut prometheus::Registry) -> Result<Self, prometheus::Error> {
        let query_total = add_int_counter_metric(
            metrics_registry,
            "restql_query_total",
            "Total successful queries.",
        )?;

        let query_errors_total = add_int_counter_metric(
            metrics_registry,
            "restql_query_errors_total",
            "Total queries that failed against the database.",
        )?;

        let query_duration_seconds = add_histogram_metric(
            metrics_registry,
            "restql_query_duration_seconds",
            "Time taken to count and fetch the rows of a query, in seconds.",
        )?;

        Ok(Self {
            query_total,
            query_errors_total,
            query_duration_seconds,
        })
    }
}

/// Create a new int counter metric and register it with the provided Prometheus Registry
fn add_int_counter_metric(
    metrics_registry: &mut prometheus::Registry,
    metric_name: &str,
    metric_description: &str,
) -> Result<GenericCounter<AtomicU64>, prometheus::Error> {
    let int_counter =
        prometheus::IntCounter::with_opts(prometheus::Opts::new(metric_name, metric_description))?;
    metrics_registry.register(Box::new(int_counter.clone()))?;
    Ok(int_counter)
}

/// Create a new histogram metric with the default buckets and register it with the
/// provided Prometheus Registry
fn add_histogram_metric(
    metrics_registry: &mut prometheus::Registry,
    metric_name: &str,
    metric_description: &str,
) -> Result<Histogram, prometheus::Error> {
    let histogram = Histogram::with_opts(prometheus::HistogramOpts::new(
        metric_name,
        metric_description,
    ))?;
    metrics_registry.register(Box::new(histogram.clone()))?;
    Ok(histogram)
}
