// file: src/utils/telemetry.rs
// description: operation timing and throughput metrics for indexing and answering

use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::info;

/// Operation timer for performance tracking
pub struct OperationTimer {
    operation: String,
    start: Instant,
}

impl OperationTimer {
    pub fn new(operation: &str) -> Self {
        info!("Starting operation: {}", operation);
        Self {
            operation: operation.to_string(),
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn finish(self) -> Duration {
        let elapsed = self.elapsed();
        info!(
            "Completed operation: {} in {:.2}s",
            self.operation,
            elapsed.as_secs_f64()
        );
        elapsed
    }

    /// Finishes and reports throughput, e.g. pages embedded per second.
    pub fn finish_with_count(self, count: usize, unit: &str) -> PerformanceMetrics {
        let metrics = PerformanceMetrics::new(&self.operation, count, unit, self.elapsed());
        info!("Completed operation: {}", metrics.summary());
        metrics
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceMetrics {
    pub operation: String,
    pub count: usize,
    pub unit: String,
    pub duration_ms: u64,
    pub per_second: f64,
}

impl PerformanceMetrics {
    pub fn new(operation: &str, count: usize, unit: &str, duration: Duration) -> Self {
        let secs = duration.as_secs_f64();
        Self {
            operation: operation.to_string(),
            count,
            unit: unit.to_string(),
            duration_ms: duration.as_millis() as u64,
            per_second: if secs > 0.0 { count as f64 / secs } else { 0.0 },
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "{}: {} {} in {}ms ({:.1} {}/s)",
            self.operation, self.count, self.unit, self.duration_ms, self.per_second, self.unit
        )
    }
}
