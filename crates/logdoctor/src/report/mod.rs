//! Report module — findings, severity, aggregation and run metrics.

pub mod model;
pub mod metrics;
pub mod aggregate;

pub use model::{Finding, Report, RuleFailure, Severity};
pub use metrics::{AnalysisMetrics, MetricsSnapshot};
pub use aggregate::analyze;
