//! Metrics setup and update for query execution.

use prometheus::{Histogram, HistogramTimer, IntCounter};

/// The execution metrics, registered in a `prometheus::Registry` owned by the host
/// application, which decides how to gather and expose them.
#[derive(Debug, Clone)]
pub struct Metrics {
    query_total: IntCounter,
    count_total: IntCounter,
    error_total: IntCounter,
    query_execution_time: Histogram,
}

impl Metrics {
    /// Set up counters and gauges used to produce Prometheus metrics
    pub fn initialize(
        metrics_registry: &mut prometheus::Registry,
    ) -> Result<Self, prometheus::Error> {
        let query_total = add_int_counter_metric(
            metrics_registry,
            "sql_queryable_query_total",
            "Total successful queries.",
        )?;

        let count_total = add_int_counter_metric(
            metrics_registry,
            "sql_queryable_count_total",
            "Total successful count queries.",
        )?;

        let error_total = add_int_counter_metric(
            metrics_registry,
            "sql_queryable_error_total",
            "Total queries that failed in the database.",
        )?;

        let query_execution_time = add_histogram_metric(
            metrics_registry,
            "sql_queryable_query_execution_time",
            "Time taken to execute a statement, in seconds.",
        )?;

        Ok(Self {
            query_total,
            count_total,
            error_total,
            query_execution_time,
        })
    }

    pub fn record_successful_query(&self) {
        self.query_total.inc();
    }

    pub fn record_successful_count(&self) {
        self.count_total.inc();
    }

    pub fn record_failure(&self) {
        self.error_total.inc();
    }

    /// Start timing a statement. The time is recorded when the timer is dropped.
    pub fn time_query_execution(&self) -> HistogramTimer {
        self.query_execution_time.start_timer()
    }
}

/// Create a new int counter metric and register it with the provided Prometheus Registry
fn add_int_counter_metric(
    metrics_registry: &mut prometheus::Registry,
    metric_name: &str,
    metric_description: &str,
) -> Result<IntCounter, prometheus::Error> {
    let int_counter =
        IntCounter::with_opts(prometheus::Opts::new(metric_name, metric_description))?;
    metrics_registry.register(Box::new(int_counter.clone()))?;
    Ok(int_counter)
}

/// Create a new histogram metric using the default buckets, and register it with the
/// provided Prometheus Registry.
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
