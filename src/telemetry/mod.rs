//! Telemetry
//!
//! Metrics for authentication outcomes and store failures. Logging goes
//! through `tracing`.

pub mod metrics;

pub use metrics::{
    create_in_memory_metrics, no_op_metrics, AuthMetrics, InMemoryMetrics, MetricEntry,
    MetricLabels, NoOpMetrics,
};
