//! Overload — frames skipped by the encoder because it could not keep up.

use std::sync::Arc;

use crate::conf::{Catalog, MessageKey, Thresholds};
use crate::report::{Finding, Severity};
use crate::search::{self, LineMatcher};
use crate::store::LogText;

use super::error::RuleError;
use super::markers::Markers;
use super::session::SessionProbe;
use super::traits::Rule;

/// A skipped-frame percentage: the normalized text as logged (`4.0`, `7.5`
/// for `7,5`) and its value.
#[derive(Debug, Clone, PartialEq)]
pub struct Percentage {
    pub value: f64,
    pub text: String,
}

/// Percentage inside the first parenthesized group of a line.
///
/// Accepts `.` or `,` as decimal separator. Returns `None` for lines without
/// a group or with a value that is not a finite, non-negative number.
pub fn parse_percentage(line: &str) -> Option<Percentage> {
    let (_, rest) = line.split_once('(')?;
    let (inner, _) = rest.split_once(')')?;
    let text = inner.trim().trim_end_matches('%').trim().replace(',', ".");
    let value: f64 = text.parse().ok()?;
    (value.is_finite() && value >= 0.0).then_some(Percentage { value, text })
}

/// Severity for a measured overload percentage.
pub fn classify(percent: f64, thresholds: &Thresholds) -> Severity {
    if percent >= thresholds.overload_critical_pct {
        Severity::Critical
    } else if percent >= thresholds.overload_warning_pct {
        Severity::Warning
    } else {
        Severity::Info
    }
}

pub struct EncoderOverloadRule {
    session: SessionProbe,
    skipped: LineMatcher,
    software: Vec<LineMatcher>,
    hardware: Vec<LineMatcher>,
    thresholds: Thresholds,
    catalog: Arc<Catalog>,
}

impl EncoderOverloadRule {
    pub const NAME: &'static str = "encoder_overload";

    pub fn new(thresholds: &Thresholds, catalog: Arc<Catalog>) -> Result<Self, RuleError> {
        Ok(Self {
            session: SessionProbe::new()?,
            skipped: LineMatcher::literal(Markers::SKIPPED_FRAMES)?,
            software: LineMatcher::literals(Markers::SOFTWARE_ENCODERS)?,
            hardware: LineMatcher::literals(Markers::HARDWARE_ENCODERS)?,
            thresholds: thresholds.clone(),
            catalog,
        })
    }

    /// Explanation variant for the encoder families present in the log.
    fn family(&self, log: &LogText) -> MessageKey {
        let software = search::contains_any(&self.software, log);
        let hardware = search::contains_any(&self.hardware, log);
        match (software, hardware) {
            (true, true) => MessageKey::OverloadMixed,
            (true, false) => MessageKey::OverloadCpu,
            (false, true) => MessageKey::OverloadGpu,
            (false, false) => MessageKey::OverloadUnknown,
        }
    }
}

impl Rule for EncoderOverloadRule {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn check(&self, log: &LogText) -> Option<Finding> {
        if !self.session.has_session(log) {
            return None;
        }

        let skipped = search::search(&self.skipped, log);
        let worst = skipped
            .lines()
            .filter_map(parse_percentage)
            .fold(None, |worst: Option<Percentage>, p| match worst {
                Some(w) if w.value >= p.value => Some(w),
                _ => Some(p),
            })
            .filter(|p| p.value > 0.0)?;

        let severity = classify(worst.value, &self.thresholds);
        let key = self.family(log);
        tracing::debug!(
            rule = Self::NAME,
            percent = worst.value,
            severity = severity.as_str(),
            key = key.as_str(),
            "Encoder skipped frames"
        );

        self.catalog
            .finding_with(Self::NAME, key, severity, &[("percent", worst.text.as_str())])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STREAM_START: &str = "10:00:00.000: ==== Streaming Start ====";

    fn rule() -> EncoderOverloadRule {
        EncoderOverloadRule::new(&Thresholds::default(), Arc::new(Catalog::builtin())).unwrap()
    }

    fn skipped(percent: &str) -> String {
        format!(
            "10:05:00.000: Video stopped, number of skipped frames due to encoding lag: \
             120/3000 ({})",
            percent
        )
    }

    fn value(line: &str) -> Option<f64> {
        parse_percentage(line).map(|p| p.value)
    }

    fn session_log(extra: Vec<String>) -> LogText {
        let mut lines = vec![STREAM_START.to_string()];
        lines.extend(extra);
        LogText::from_lines(lines)
    }

    // ─────────────────────────────────────────────────────────
    // Parsing and classification
    // ─────────────────────────────────────────────────────────

    #[test]
    fn test_parse_percentage() {
        assert_eq!(value("lag: 12/100 (12.0%)"), Some(12.0));
        assert_eq!(value("lag: 1/3 ( 33,3% )"), Some(33.3));
        assert_eq!(value("lag: 0/100 (0%)"), Some(0.0));
        assert_eq!(value("first (4%) second (90%)"), Some(4.0));
    }

    #[test]
    fn test_parse_percentage_keeps_logged_text() {
        let p = parse_percentage("lag: 120/3000 (4.0%)").unwrap();
        assert_eq!(p.text, "4.0");
        assert_eq!(parse_percentage("lag (7,5%)").unwrap().text, "7.5");
    }

    #[test]
    fn test_parse_percentage_rejects_garbage() {
        assert_eq!(value("no group here"), None);
        assert_eq!(value("unclosed (12%"), None);
        assert_eq!(value("lag (n/a)"), None);
        assert_eq!(value("lag (-3%)"), None);
        assert_eq!(value("lag (inf%)"), None);
    }

    #[test]
    fn test_classify_boundaries() {
        let t = Thresholds::default();
        assert_eq!(classify(4.9, &t), Severity::Info);
        assert_eq!(classify(5.0, &t), Severity::Warning);
        assert_eq!(classify(14.99, &t), Severity::Warning);
        assert_eq!(classify(15.0, &t), Severity::Critical);
        assert_eq!(classify(80.0, &t), Severity::Critical);
    }

    #[test]
    fn test_classify_custom_thresholds() {
        let t = Thresholds {
            overload_warning_pct: 1.0,
            overload_critical_pct: 3.0,
            ..Thresholds::default()
        };
        assert_eq!(classify(2.0, &t), Severity::Warning);
        assert_eq!(classify(4.0, &t), Severity::Critical);
    }

    // ─────────────────────────────────────────────────────────
    // Rule
    // ─────────────────────────────────────────────────────────

    #[test]
    fn test_worst_value_decides() {
        let log = session_log(vec![skipped("20.5%"), skipped("3%")]);

        let finding = rule().check(&log).expect("expected a finding");
        assert_eq!(finding.severity(), Severity::Critical);
        assert!(finding.title().contains("20.5"), "title: {}", finding.title());
    }

    #[test]
    fn test_small_overload_is_info() {
        let finding = rule()
            .check(&session_log(vec![skipped("4%")]))
            .expect("expected a finding");
        assert_eq!(finding.severity(), Severity::Info);
        assert_eq!(finding.title(), "4% Encoder Overload");
    }

    #[test]
    fn test_title_keeps_logged_decimal() {
        let finding = rule()
            .check(&session_log(vec![skipped("4.0%")]))
            .expect("expected a finding");
        assert_eq!(finding.severity(), Severity::Info);
        assert_eq!(finding.title(), "4.0% Encoder Overload");
    }

    #[test]
    fn test_comma_decimal_warning() {
        let finding = rule()
            .check(&session_log(vec![skipped("7,5%")]))
            .expect("expected a finding");
        assert_eq!(finding.severity(), Severity::Warning);
        assert!(finding.title().starts_with("7.5%"));
    }

    #[test]
    fn test_zero_overload_absent() {
        assert!(rule().check(&session_log(vec![skipped("0.0%")])).is_none());
    }

    #[test]
    fn test_no_skipped_frames_absent() {
        let log = session_log(vec!["10:05:00.000: all fine".to_string()]);
        assert!(rule().check(&log).is_none());
    }

    #[test]
    fn test_requires_session() {
        let log = LogText::from_lines([skipped("40%")]);
        assert!(rule().check(&log).is_none());
    }

    #[test]
    fn test_family_selects_explanation() {
        let x264 = "10:00:01.000: [x264 encoder: 'simple_h264_stream'] preset: veryfast"
            .to_string();
        let nvenc = "10:00:01.000: [NVENC encoder: 'streaming_h264'] settings:".to_string();

        let cpu = rule().check(&session_log(vec![x264.clone(), skipped("10%")])).unwrap();
        assert_eq!(cpu.title(), "10% CPU Encoder Overload");
        assert!(cpu.explanation().contains("CPU overload"));

        let gpu = rule().check(&session_log(vec![nvenc.clone(), skipped("10%")])).unwrap();
        assert_eq!(gpu.title(), "10% GPU Encoder Overload");

        let mixed = rule().check(&session_log(vec![x264, nvenc, skipped("10%")])).unwrap();
        assert_eq!(mixed.title(), "10% Encoder Overload");
        assert!(mixed.explanation().contains("CPU Overload Guide"));
    }
}
