//! Conf module — configuration model, loading, and the message catalog.

pub mod model;
pub mod load;
pub mod catalog;

pub use model::{AnalyzerConfig, EncoderPolicy, Thresholds, Windows};
pub use load::{ConfigError, DEFAULT_CONFIG_FILE};
pub use catalog::{Catalog, MessageKey, MessageOverride, MessageTemplate};
