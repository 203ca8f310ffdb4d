//! Boot — logging init, config load, rule-set construction, log reading.

use std::fs;
use std::panic;
use std::path::Path;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::conf::AnalyzerConfig;
use crate::report::aggregate::panic_message;
use crate::rules::RuleSet;
use crate::store::LogText;

/// Initialise the tracing / logging subsystem.
///
/// Diagnostics go to stderr so stdout only carries the report.
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "logdoctor=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Route panic reports through tracing instead of the default stderr printer.
///
/// Rule panics are caught by the aggregator; this keeps their report in the
/// same structured log stream.
pub fn install_panic_hook() {
    panic::set_hook(Box::new(|info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()))
            .unwrap_or_else(|| "unknown".to_string());
        error!(location = %location, "Panic: {}", panic_message(info.payload()));
    }));
}

/// Load config (explicit path, env or default file) and build the standard
/// rule set from it.
pub fn boot(
    config_path: Option<&Path>,
) -> Result<(RuleSet, AnalyzerConfig), Box<dyn std::error::Error>> {
    info!("Starting logdoctor v{}", env!("CARGO_PKG_VERSION"));

    let config = AnalyzerConfig::load(config_path).map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;
    info!(
        "Thresholds: bitrate_divisor={}, overload warning={}% critical={}%",
        config.thresholds.bitrate_divisor,
        config.thresholds.overload_warning_pct,
        config.thresholds.overload_critical_pct
    );

    let rules = RuleSet::standard(&config)?;
    info!("Registered {} rules", rules.len());

    Ok((rules, config))
}

/// Read a log file into a line store. Invalid UTF-8 is replaced, not rejected.
pub fn read_log(path: &Path) -> std::io::Result<LogText> {
    let bytes = fs::read(path)?;
    let log = LogText::from_text(&String::from_utf8_lossy(&bytes));
    info!("Read {} lines from {}", log.len(), path.display());
    Ok(log)
}
