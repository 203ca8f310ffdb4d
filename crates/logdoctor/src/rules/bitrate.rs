//! Bitrate — configured stream bitrate against a resolution/frame-rate estimate.
//!
//! Target kbps = `width * height * fps_num / fps_den / divisor`. The divisor
//! is an empirical tunable (20000 by default).

use std::sync::Arc;

use crate::block::{BlockExtractor, FieldSpec, Ratio};
use crate::conf::{AnalyzerConfig, Catalog, MessageKey};
use crate::report::Finding;
use crate::store::LogText;

use super::error::RuleError;
use super::markers::Markers;
use super::session::SessionProbe;
use super::traits::Rule;

/// Estimated adequate bitrate in kbps, `None` when the frame rate is unusable.
pub fn target_bitrate(width: f64, height: f64, fps: Ratio, divisor: f64) -> Option<f64> {
    if divisor <= 0.0 {
        return None;
    }
    Some(width * height * fps.as_f64()? / divisor)
}

fn low_bitrate(
    rule: &'static str,
    bitrate: f64,
    target: Option<f64>,
    catalog: &Catalog,
) -> Option<Finding> {
    let target = target?;
    tracing::debug!(rule, bitrate, target, "Stream bitrate compared against estimate");
    if bitrate < target {
        catalog.finding(rule, MessageKey::LowStreamBitrate)
    } else {
        None
    }
}

const X264_FIELDS: &[FieldSpec] = &[
    FieldSpec::number("bitrate"),
    FieldSpec::number("fps_num"),
    FieldSpec::number("fps_den"),
    FieldSpec::number("width"),
    FieldSpec::number("height"),
];

/// Software encoder: everything is logged inside the encoder's own block.
pub struct X264BitrateRule {
    session: SessionProbe,
    settings: BlockExtractor,
    divisor: f64,
    catalog: Arc<Catalog>,
}

impl X264BitrateRule {
    pub const NAME: &'static str = "x264_bitrate";

    pub fn new(config: &AnalyzerConfig, catalog: Arc<Catalog>) -> Result<Self, RuleError> {
        Ok(Self {
            session: SessionProbe::new()?,
            settings: BlockExtractor::new(
                Markers::X264_STREAM_SETTINGS,
                config.windows.x264_settings,
            )?,
            divisor: config.thresholds.bitrate_divisor,
            catalog,
        })
    }
}

impl Rule for X264BitrateRule {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn check(&self, log: &LogText) -> Option<Finding> {
        if !self.session.has_session(log) {
            return None;
        }
        let record = self.settings.extract(log, X264_FIELDS);
        if record.is_empty() {
            return None;
        }

        let bitrate = record.number("bitrate")?;
        let fps = Ratio::new(
            record.number_or("fps_num", 0.0).max(0.0) as u64,
            record.number_or("fps_den", 1.0).max(0.0) as u64,
        );
        let target = target_bitrate(
            record.number_or("width", 0.0),
            record.number_or("height", 0.0),
            fps,
            self.divisor,
        );
        low_bitrate(Self::NAME, bitrate, target, &self.catalog)
    }
}

const NVENC_FIELDS: &[FieldSpec] = &[
    FieldSpec::number("bitrate"),
    FieldSpec::number("width"),
    FieldSpec::number("height"),
];

const VIDEO_FIELDS: &[FieldSpec] = &[FieldSpec::ratio("fps")];

/// Hardware encoder: the frame rate comes from the global video settings,
/// the bitrate and resolution from the encoder block. The two blocks are not
/// logged in lockstep, so the last occurrence of each is located separately.
pub struct NvencBitrateRule {
    session: SessionProbe,
    video: BlockExtractor,
    settings: BlockExtractor,
    divisor: f64,
    catalog: Arc<Catalog>,
}

impl NvencBitrateRule {
    pub const NAME: &'static str = "nvenc_bitrate";

    pub fn new(config: &AnalyzerConfig, catalog: Arc<Catalog>) -> Result<Self, RuleError> {
        Ok(Self {
            session: SessionProbe::new()?,
            video: BlockExtractor::new(
                Markers::VIDEO_SETTINGS_RESET,
                config.windows.video_settings,
            )?,
            settings: BlockExtractor::new(
                Markers::NVENC_STREAM_SETTINGS,
                config.windows.nvenc_settings,
            )?,
            divisor: config.thresholds.bitrate_divisor,
            catalog,
        })
    }
}

impl Rule for NvencBitrateRule {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn check(&self, log: &LogText) -> Option<Finding> {
        if !self.session.has_session(log) {
            return None;
        }
        let record = self.settings.extract(log, NVENC_FIELDS);
        if record.is_empty() {
            return None;
        }

        let fps = self
            .video
            .extract(log, VIDEO_FIELDS)
            .ratio_or("fps", Ratio::new(0, 1));
        let bitrate = record.number("bitrate")?;
        let target = target_bitrate(
            record.number_or("width", 0.0),
            record.number_or("height", 0.0),
            fps,
            self.divisor,
        );
        low_bitrate(Self::NAME, bitrate, target, &self.catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Severity;

    const STREAM_START: &str = "10:00:00.000: ==== Streaming Start ====";

    fn catalog() -> Arc<Catalog> {
        Arc::new(Catalog::builtin())
    }

    fn x264_log(bitrate: &str, fps_num: u32, width: u32, height: u32) -> LogText {
        LogText::from_lines(vec![
            STREAM_START.to_string(),
            "10:00:00.100: [x264 encoder: 'simple_h264_stream'] preset: veryfast".to_string(),
            "10:00:00.100: [x264 encoder: 'simple_h264_stream'] settings:".to_string(),
            "10:00:00.100: \trate_control: CBR".to_string(),
            format!("10:00:00.100: \tbitrate:      {}", bitrate),
            "10:00:00.100: \tbuffer size:  2500".to_string(),
            "10:00:00.100: \tcrf:          0".to_string(),
            format!("10:00:00.100: \tfps_num:      {}", fps_num),
            "10:00:00.100: \tfps_den:      1".to_string(),
            format!("10:00:00.100: \twidth:        {}", width),
            format!("10:00:00.100: \theight:       {}", height),
            "10:00:00.100: \tkeyint:       250".to_string(),
        ])
    }

    fn nvenc_log(bitrate: u32, fps: &str) -> LogText {
        LogText::from_lines(vec![
            "10:00:00.000: video settings reset:".to_string(),
            "10:00:00.000: \tbase resolution:   1920x1080".to_string(),
            "10:00:00.000: \toutput resolution: 1920x1080".to_string(),
            "10:00:00.000: \tdownscale filter:  Bicubic".to_string(),
            format!("10:00:00.000: \tfps:               {}", fps),
            "10:00:00.000: \tformat:            NV12".to_string(),
            STREAM_START.to_string(),
            "10:00:01.000: [NVENC encoder: 'streaming_h264'] settings:".to_string(),
            "10:00:01.000: \trate_control: CBR".to_string(),
            format!("10:00:01.000: \tbitrate:      {}", bitrate),
            "10:00:01.000: \tcqp:          20".to_string(),
            "10:00:01.000: \tkeyint:       250".to_string(),
            "10:00:01.000: \tpreset:       hq".to_string(),
            "10:00:01.000: \twidth:        1920".to_string(),
            "10:00:01.000: \theight:       1080".to_string(),
        ])
    }

    // ─────────────────────────────────────────────────────────
    // Estimate
    // ─────────────────────────────────────────────────────────

    #[test]
    fn test_target_bitrate_1080p60() {
        let target = target_bitrate(1920.0, 1080.0, Ratio::new(60, 1), 20_000.0).unwrap();
        assert!((target - 6220.8).abs() < 1e-9);
    }

    #[test]
    fn test_target_bitrate_keeps_fractional_fps() {
        let target = target_bitrate(1280.0, 720.0, Ratio::new(30000, 1001), 20_000.0).unwrap();
        let expected = 1280.0 * 720.0 * 30000.0 / 1001.0 / 20_000.0;
        assert!((target - expected).abs() < 1e-6);
    }

    #[test]
    fn test_target_bitrate_zero_denominator() {
        assert_eq!(target_bitrate(1920.0, 1080.0, Ratio::new(60, 0), 20_000.0), None);
    }

    // ─────────────────────────────────────────────────────────
    // x264
    // ─────────────────────────────────────────────────────────

    fn x264_rule() -> X264BitrateRule {
        X264BitrateRule::new(&AnalyzerConfig::default(), catalog()).unwrap()
    }

    #[test]
    fn test_x264_low_bitrate_flagged() {
        let finding = x264_rule()
            .check(&x264_log("6000", 60, 1920, 1080))
            .expect("expected a finding");
        assert_eq!(finding.severity(), Severity::Info);
        assert_eq!(finding.title(), "Low Stream Bitrate");
    }

    #[test]
    fn test_x264_adequate_bitrate() {
        assert!(x264_rule().check(&x264_log("7000", 60, 1920, 1080)).is_none());
    }

    #[test]
    fn test_x264_uses_last_block() {
        let mut lines: Vec<String> = x264_log("1000", 60, 1920, 1080).lines().to_vec();
        lines.extend(x264_log("9000", 60, 1920, 1080).lines().iter().cloned());
        assert!(x264_rule().check(&LogText::from_lines(lines)).is_none());
    }

    #[test]
    fn test_x264_malformed_bitrate_not_applicable() {
        assert!(x264_rule().check(&x264_log("lots", 60, 1920, 1080)).is_none());
    }

    #[test]
    fn test_x264_requires_session() {
        let lines: Vec<String> = x264_log("1000", 60, 1920, 1080).lines()[1..].to_vec();
        assert!(x264_rule().check(&LogText::from_lines(lines)).is_none());
    }

    // ─────────────────────────────────────────────────────────
    // NVENC
    // ─────────────────────────────────────────────────────────

    fn nvenc_rule() -> NvencBitrateRule {
        NvencBitrateRule::new(&AnalyzerConfig::default(), catalog()).unwrap()
    }

    #[test]
    fn test_nvenc_low_bitrate_flagged() {
        let finding = nvenc_rule()
            .check(&nvenc_log(6000, "60/1"))
            .expect("expected a finding");
        assert_eq!(finding.title(), "Low Stream Bitrate");
        assert_eq!(finding.rule(), "nvenc_bitrate");
    }

    #[test]
    fn test_nvenc_adequate_bitrate() {
        assert!(nvenc_rule().check(&nvenc_log(7000, "60/1")).is_none());
        assert!(nvenc_rule().check(&nvenc_log(6000, "30/1")).is_none());
    }

    #[test]
    fn test_nvenc_blocks_located_independently() {
        let mut lines: Vec<String> = nvenc_log(6000, "30/1").lines().to_vec();
        // A later video reset at 60 fps without a new encoder block.
        lines.extend([
            "10:30:00.000: video settings reset:".to_string(),
            "10:30:00.000: \tbase resolution:   1920x1080".to_string(),
            "10:30:00.000: \tfps:               60/1".to_string(),
        ]);
        assert!(nvenc_rule().check(&LogText::from_lines(lines)).is_some());
    }

    #[test]
    fn test_nvenc_without_video_settings_not_flagged() {
        let lines: Vec<String> = nvenc_log(100, "60/1").lines()[6..].to_vec();
        assert!(nvenc_rule().check(&LogText::from_lines(lines)).is_none());
    }

    #[test]
    fn test_nvenc_without_encoder_block() {
        let lines: Vec<String> = nvenc_log(100, "60/1").lines()[..7].to_vec();
        assert!(nvenc_rule().check(&LogText::from_lines(lines)).is_none());
    }
}
