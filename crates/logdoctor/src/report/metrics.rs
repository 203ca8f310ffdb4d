use std::sync::atomic::{AtomicU64, Ordering};
use serde::Serialize;

/// Counters for analysis runs.
///
/// All operations use `Ordering::Relaxed`; `snapshot()` reads are not
/// transactional across fields.
#[derive(Debug, Default)]
pub struct AnalysisMetrics {
    pub runs: AtomicU64,
    pub rules_run: AtomicU64,
    pub findings: AtomicU64,
    pub panics: AtomicU64,
    pub time_nanos: AtomicU64,
}

impl AnalysisMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one finished analysis run.
    #[inline]
    pub fn record_run(&self, rules_run: u64, findings: u64, panics: u64, time_nanos: u64) {
        self.runs.fetch_add(1, Ordering::Relaxed);
        self.rules_run.fetch_add(rules_run, Ordering::Relaxed);
        self.findings.fetch_add(findings, Ordering::Relaxed);
        self.panics.fetch_add(panics, Ordering::Relaxed);
        self.time_nanos.fetch_add(time_nanos, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let runs = self.runs.load(Ordering::Relaxed);
        let time_nanos = self.time_nanos.load(Ordering::Relaxed);

        MetricsSnapshot {
            runs,
            rules_run: self.rules_run.load(Ordering::Relaxed),
            findings: self.findings.load(Ordering::Relaxed),
            rule_panics: self.panics.load(Ordering::Relaxed),
            avg_run_time_us: if runs > 0 {
                (time_nanos as f64 / runs as f64) / 1000.0
            } else {
                0.0
            },
        }
    }
}

/// A read-only snapshot of analysis metrics.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub runs: u64,
    pub rules_run: u64,
    pub findings: u64,
    pub rule_panics: u64,
    pub avg_run_time_us: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_snapshot() {
        let metrics = AnalysisMetrics::new();
        let snap = metrics.snapshot();
        assert_eq!(snap.runs, 0);
        assert_eq!(snap.avg_run_time_us, 0.0);
    }

    #[test]
    fn test_record_runs() {
        let metrics = AnalysisMetrics::new();
        metrics.record_run(10, 3, 0, 2_000);
        metrics.record_run(10, 1, 1, 4_000);

        let snap = metrics.snapshot();
        assert_eq!(snap.runs, 2);
        assert_eq!(snap.rules_run, 20);
        assert_eq!(snap.findings, 4);
        assert_eq!(snap.rule_panics, 1);
        assert!((snap.avg_run_time_us - 3.0).abs() < f64::EPSILON);
    }
}
