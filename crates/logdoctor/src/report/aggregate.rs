//! Aggregate — run a rule set over one log and collect the report.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;
use tracing::{debug, error, info};

use crate::rules::RuleSet;
use crate::store::LogText;

use super::model::{Report, RuleFailure};

/// Invoke every rule exactly once, in registration order.
///
/// Absent results are dropped. A rule that panics is recorded as a
/// [`RuleFailure`]; the remaining rules still run.
pub fn analyze(log: &LogText, rules: &RuleSet) -> Report {
    let start = Instant::now();
    let mut report = Report::new(log.len());

    for rule in rules.rules() {
        let name = rule.name();
        match panic::catch_unwind(AssertUnwindSafe(|| rule.check(log))) {
            Ok(Some(finding)) => {
                debug!(rule = name, severity = finding.severity().as_str(), "Rule fired");
                report.push_finding(finding);
            }
            Ok(None) => debug!(rule = name, "Rule silent"),
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!(rule = name, "Rule panicked: {}", message);
                report.push_failure(RuleFailure { rule: name, message });
            }
        }
        report.rules_run += 1;
    }

    let elapsed = start.elapsed();
    rules.metrics().record_run(
        report.rules_run as u64,
        report.len() as u64,
        report.failures().len() as u64,
        elapsed.as_nanos() as u64,
    );
    let totals = rules.metrics().snapshot();
    info!(
        lines = report.lines_analyzed,
        rules = report.rules_run,
        findings = report.len(),
        failures = report.failures().len(),
        total_runs = totals.runs,
        total_rule_panics = totals.rule_panics,
        avg_run_time_us = totals.avg_run_time_us,
        "Analysis finished in {:?}",
        elapsed
    );

    report
}

/// Text of a panic payload (`&str` or `String`).
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conf::AnalyzerConfig;
    use crate::report::{Finding, Severity};
    use crate::rules::Rule;

    struct Fixed(&'static str, Option<Severity>);

    impl Rule for Fixed {
        fn name(&self) -> &'static str {
            self.0
        }

        fn check(&self, _log: &LogText) -> Option<Finding> {
            self.1.map(|s| Finding::new(self.0, s, self.0, "fixed"))
        }
    }

    struct Exploding;

    impl Rule for Exploding {
        fn name(&self) -> &'static str {
            "exploding"
        }

        fn check(&self, log: &LogText) -> Option<Finding> {
            let line = log.get(10_000).unwrap_or_else(|| panic!("line {} out of range", 10_000));
            Some(Finding::new("exploding", Severity::Info, line, ""))
        }
    }

    fn fixed_rules() -> RuleSet {
        RuleSet::with_rules(vec![
            Box::new(Fixed("a", Some(Severity::Warning))),
            Box::new(Fixed("b", None)),
            Box::new(Fixed("c", Some(Severity::Info))),
            Box::new(Fixed("d", None)),
            Box::new(Fixed("e", Some(Severity::Critical))),
        ])
    }

    // ─────────────────────────────────────────────────────────
    // Aggregation policy
    // ─────────────────────────────────────────────────────────

    #[test]
    fn test_findings_in_registration_order() {
        let report = fixed_rules().analyze(&LogText::from_text("x"));

        let names: Vec<_> = report.findings().iter().map(Finding::rule).collect();
        assert_eq!(names, vec!["a", "c", "e"]);
        assert_eq!(report.rules_run, 5);
        assert_eq!(report.max_severity(), Some(Severity::Critical));
        assert!(report.failures().is_empty());
    }

    #[test]
    fn test_panicking_rule_is_isolated() {
        let mut rules = fixed_rules();
        rules.register(Box::new(Exploding));
        rules.register(Box::new(Fixed("f", Some(Severity::Info))));

        let report = rules.analyze(&LogText::from_text("one line"));

        let names: Vec<_> = report.findings().iter().map(Finding::rule).collect();
        assert_eq!(names, vec!["a", "c", "e", "f"]);
        assert_eq!(report.failures().len(), 1);
        assert_eq!(report.failures()[0].rule, "exploding");
        assert!(report.failures()[0].message.contains("out of range"));
        assert_eq!(report.rules_run, 7);
        assert_eq!(rules.metrics().snapshot().rule_panics, 1);
    }

    #[test]
    fn test_metrics_recorded_per_run() {
        let rules = fixed_rules();
        rules.analyze(&LogText::default());
        rules.analyze(&LogText::default());

        let snap = rules.metrics().snapshot();
        assert_eq!(snap.runs, 2);
        assert_eq!(snap.rules_run, 10);
        assert_eq!(snap.findings, 6);
        assert_eq!(snap.rule_panics, 0);
    }

    #[test]
    fn test_empty_rule_set() {
        let report = RuleSet::empty().analyze(&LogText::from_text("a\nb"));
        assert!(report.is_empty());
        assert_eq!(report.lines_analyzed, 2);
        assert_eq!(report.max_severity(), None);
    }

    #[test]
    fn test_panic_message_payloads() {
        assert_eq!(panic_message(&"static"), "static");
        assert_eq!(panic_message(&String::from("owned")), "owned");
        assert_eq!(panic_message(&42_u32), "unknown panic payload");
    }

    // ─────────────────────────────────────────────────────────
    // Standard rule set, end to end
    // ─────────────────────────────────────────────────────────

    fn standard() -> RuleSet {
        RuleSet::standard(&AnalyzerConfig::default()).unwrap()
    }

    #[test]
    fn test_log_without_session_only_reports_no_session() {
        let log = LogText::from_text(
            "10:00:00.000: CPU Name: AMD Ryzen 7 5800X\n\
             10:00:00.100: [x264 encoder: 'simple_h264_stream'] settings:\n\
             10:00:00.100: \tbitrate:      100\n\
             10:00:00.100: \tfps_num:      60\n\
             10:00:00.100: \tfps_den:      1\n\
             10:00:00.100: \twidth:        1920\n\
             10:00:00.100: \theight:       1080\n\
             10:05:00.000: number of skipped frames due to encoding lag: 900/1000 (90.0%)\n",
        );

        let report = standard().analyze(&log);
        let names: Vec<_> = report.findings().iter().map(Finding::rule).collect();
        assert_eq!(names, vec!["no_session"]);
    }

    #[test]
    fn test_realistic_log() {
        let log = LogText::from_text(
            "10:00:00.000: Encoder ID 'vt_h264_sw' not found\n\
             10:00:00.500: ==== Recording Start ===============================================\n\
             10:00:00.510: [ffmpeg muxer: 'adv_file_output'] Writing file 'C:/Videos/out.mp4'...\n\
             10:00:01.000: ==== Streaming Start ===============================================\n\
             10:00:01.100: [x264 encoder: 'simple_h264_stream'] preset: medium\n\
             10:00:01.100: [x264 encoder: 'simple_h264_stream'] settings:\n\
             10:00:01.100: \trate_control: CBR\n\
             10:00:01.100: \tbitrate:      2500\n\
             10:00:01.100: \tfps_num:      60\n\
             10:00:01.100: \tfps_den:      1\n\
             10:00:01.100: \twidth:        1920\n\
             10:00:01.100: \theight:       1080\n\
             10:30:00.000: number of skipped frames due to encoding lag: 600/108000 (0,6%)\n",
        );

        let report = standard().analyze(&log);
        let names: Vec<_> = report.findings().iter().map(Finding::rule).collect();
        assert_eq!(
            names,
            vec![
                "output_format",
                "x264_preset",
                "x264_bitrate",
                "encoder_overload",
                "unknown_encoder",
            ]
        );

        let overload = report
            .findings()
            .iter()
            .find(|f| f.rule() == "encoder_overload")
            .unwrap();
        assert_eq!(overload.severity(), Severity::Info);
        assert_eq!(overload.title(), "0.6% CPU Encoder Overload");
        assert_eq!(report.max_severity(), Some(Severity::Critical));
        assert_eq!(report.rules_run, 10);
    }
}
