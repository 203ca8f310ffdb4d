use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use logdoctor::runtime::boot;
use logdoctor::Report;

/// Diagnose common problems in a capture/streaming application log
#[derive(Parser, Debug)]
#[command(name = "logdoctor", version)]
#[command(about = "Rule-based diagnosis of capture/streaming application logs")]
struct Args {
    /// Log file to analyze
    log: PathBuf,

    /// TOML config file (defaults to $LOGDOCTOR_CONFIG_FILE or ./logdoctor.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    boot::init_logging();
    boot::install_panic_hook();
    let args = Args::parse();

    let (rules, _config) = boot::boot(args.config.as_deref())?;
    let log = boot::read_log(&args.log)?;
    let report = rules.analyze(&log);

    match args.format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        Format::Text => print_text(&report),
    }
    Ok(())
}

fn print_text(report: &Report) {
    if report.is_empty() {
        println!("No issues found ({} lines analyzed).", report.lines_analyzed);
    }
    for finding in report.findings() {
        println!("[{}] {}", finding.severity().label(), finding.title());
        println!("    {}", finding.explanation());
        println!();
    }
    for failure in report.failures() {
        println!("[ERROR] rule {} failed: {}", failure.rule, failure.message);
    }
}
