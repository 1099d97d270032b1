use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

pub struct Metrics {
    // Counters
    total_requests: AtomicUsize,
    successful_requests: AtomicUsize,
    failed_requests: AtomicUsize,
    rejected_inputs: AtomicUsize,
    cache_hits: AtomicUsize,

    // Timing (in microseconds)
    total_generation_time_us: AtomicU64,
    generations_timed: AtomicUsize,
}

impl Metrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            total_requests: AtomicUsize::new(0),
            successful_requests: AtomicUsize::new(0),
            failed_requests: AtomicUsize::new(0),
            rejected_inputs: AtomicUsize::new(0),
            cache_hits: AtomicUsize::new(0),
            total_generation_time_us: AtomicU64::new(0),
            generations_timed: AtomicUsize::new(0),
        })
    }

    pub fn record_request(&self, success: bool) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        if success {
            self.successful_requests.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed_requests.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Input that never reached the model
    pub fn record_rejected(&self) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.rejected_inputs.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_generation(&self, duration: Duration) {
        self.total_generation_time_us
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
        self.generations_timed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            successful_requests: self.successful_requests.load(Ordering::Relaxed),
            failed_requests: self.failed_requests.load(Ordering::Relaxed),
            rejected_inputs: self.rejected_inputs.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            avg_generation_time_ms: self
                .avg_time_ms(&self.total_generation_time_us, &self.generations_timed),
        }
    }

    fn avg_time_ms(&self, total_us: &AtomicU64, count: &AtomicUsize) -> f64 {
        let total = total_us.load(Ordering::Relaxed) as f64;
        let cnt = count.load(Ordering::Relaxed) as f64;
        if cnt > 0.0 {
            total / cnt / 1000.0 // Convert to ms
        } else {
            0.0
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub total_requests: usize,
    pub successful_requests: usize,
    pub failed_requests: usize,
    pub rejected_inputs: usize,
    pub cache_hits: usize,
    pub avg_generation_time_ms: f64,
}

pub struct TimedOperation {
    start: Instant,
}

impl TimedOperation {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_counts() {
        let metrics = Metrics::new();
        metrics.record_request(true);
        metrics.record_request(false);
        metrics.record_rejected();
        metrics.record_cache_hit();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.total_requests, 3);
        assert_eq!(snapshot.successful_requests, 1);
        assert_eq!(snapshot.failed_requests, 1);
        assert_eq!(snapshot.rejected_inputs, 1);
        assert_eq!(snapshot.cache_hits, 1);
        assert_eq!(snapshot.avg_generation_time_ms, 0.0);
    }

    #[test]
    fn test_average_generation_time() {
        let metrics = Metrics::new();
        metrics.record_generation(Duration::from_millis(100));
        metrics.record_generation(Duration::from_millis(300));

        assert_eq!(metrics.snapshot().avg_generation_time_ms, 200.0);
    }
}
