// Module structure for the logdoctor analyzer.

// Core infrastructure
pub mod store;
pub mod search;
pub mod block;

// Domain modules
pub mod conf;
pub mod rules;
pub mod report;
pub mod runtime;

pub use conf::AnalyzerConfig;
pub use report::{Finding, Report, Severity};
pub use rules::{Rule, RuleSet};
pub use store::LogText;
