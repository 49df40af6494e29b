//! Metrics
//!
//! Authentication metrics interfaces and implementations.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Metric labels.
pub type MetricLabels = HashMap<String, String>;

/// Resource server metrics interface.
pub trait AuthMetrics: Send + Sync {
    /// Record the outcome of one authentication attempt.
    ///
    /// `status` is the challenge status of a rejection. Successful requests
    /// have none; the endpoint decides what it answers.
    fn record_authentication(&self, outcome: &str, status: Option<u16>);

    /// Record a failed store operation.
    fn record_store_error(&self, operation: &str);
}

/// No-op metrics implementation.
pub struct NoOpMetrics;

impl AuthMetrics for NoOpMetrics {
    fn record_authentication(&self, _outcome: &str, _status: Option<u16>) {}
    fn record_store_error(&self, _operation: &str) {}
}

/// No-op metrics singleton.
pub fn no_op_metrics() -> NoOpMetrics {
    NoOpMetrics
}

/// Metric entry for in-memory storage.
#[derive(Debug, Clone)]
pub struct MetricEntry {
    pub name: String,
    pub value: f64,
    pub labels: MetricLabels,
    pub timestamp: i64,
}

/// In-memory metrics for testing.
#[derive(Default)]
pub struct InMemoryMetrics {
    entries: Mutex<Vec<MetricEntry>>,
}

impl InMemoryMetrics {
    /// Create new in-memory metrics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded entries.
    pub fn get_entries(&self) -> Vec<MetricEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Get entries by name.
    pub fn get_entries_by_name(&self, name: &str) -> Vec<MetricEntry> {
        self.get_entries()
            .into_iter()
            .filter(|e| e.name == name)
            .collect()
    }

    /// Clear all entries.
    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn record(&self, name: &str, value: f64, labels: MetricLabels) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(MetricEntry {
                name: name.to_string(),
                value,
                labels,
                timestamp: chrono::Utc::now().timestamp_millis(),
            });
    }
}

impl AuthMetrics for InMemoryMetrics {
    fn record_authentication(&self, outcome: &str, status: Option<u16>) {
        let mut labels = MetricLabels::new();
        labels.insert("outcome".to_string(), outcome.to_string());
        if let Some(status) = status {
            labels.insert("status".to_string(), status.to_string());
        }
        self.record("oauth_authentications_total", 1.0, labels);
    }

    fn record_store_error(&self, operation: &str) {
        let mut labels = MetricLabels::new();
        labels.insert("operation".to_string(), operation.to_string());
        self.record("oauth_store_errors_total", 1.0, labels);
    }
}

/// Create in-memory metrics for testing.
pub fn create_in_memory_metrics() -> InMemoryMetrics {
    InMemoryMetrics::new()
}
