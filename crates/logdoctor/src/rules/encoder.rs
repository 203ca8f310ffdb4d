//! Encoder — encoder choice, presets and start-up failures.

use std::sync::Arc;
use regex::Regex;

use crate::conf::{Catalog, EncoderPolicy, MessageKey};
use crate::report::Finding;
use crate::search::{self, LineMatcher};
use crate::store::LogText;

use super::error::RuleError;
use super::markers::Markers;
use super::traits::Rule;

/// Fires with a fixed catalog message whenever one marker occurs anywhere.
pub struct MarkerRule {
    name: &'static str,
    marker: LineMatcher,
    key: MessageKey,
    catalog: Arc<Catalog>,
}

impl MarkerRule {
    pub fn new(
        name: &'static str,
        marker: &str,
        key: MessageKey,
        catalog: Arc<Catalog>,
    ) -> Result<Self, RuleError> {
        Ok(Self {
            name,
            marker: LineMatcher::literal(marker)?,
            key,
            catalog,
        })
    }

    /// Custom FFmpeg output mode in use.
    pub fn custom_ffmpeg(catalog: Arc<Catalog>) -> Result<Self, RuleError> {
        Self::new("custom_ffmpeg", Markers::CUSTOM_FFMPEG_OUTPUT, MessageKey::CustomFfmpeg, catalog)
    }

    /// NVENC could not be opened.
    pub fn nvenc_start(catalog: Arc<Catalog>) -> Result<Self, RuleError> {
        Self::new("nvenc_start", Markers::NVENC_OPEN_FAILED, MessageKey::NvencStartFailure, catalog)
    }

    /// An encoder failed while encoding.
    pub fn encode_error(catalog: Arc<Catalog>) -> Result<Self, RuleError> {
        Self::new("encode_error", Markers::ENCODE_ERROR, MessageKey::EncoderStartError, catalog)
    }
}

impl Rule for MarkerRule {
    fn name(&self) -> &'static str {
        self.name
    }

    fn check(&self, log: &LogText) -> Option<Finding> {
        if !search::contains(&self.marker, log) {
            return None;
        }
        self.catalog.finding(self.name, self.key)
    }
}

/// Flags x264 presets slower than the approved fast set.
pub struct X264PresetRule {
    x264: LineMatcher,
    preset: LineMatcher,
    approved: Vec<String>,
    catalog: Arc<Catalog>,
}

impl X264PresetRule {
    pub const NAME: &'static str = "x264_preset";

    pub fn new(policy: &EncoderPolicy, catalog: Arc<Catalog>) -> Result<Self, RuleError> {
        Ok(Self {
            x264: LineMatcher::literal(Markers::X264_ENCODER)?,
            preset: LineMatcher::literal(Markers::PRESET)?,
            approved: policy.approved_presets.clone(),
            catalog,
        })
    }

    fn is_approved(&self, preset: &str) -> bool {
        self.approved.iter().any(|p| p == preset)
    }
}

/// Value following `preset: ` on a line, up to the next whitespace.
fn preset_value(line: &str) -> Option<&str> {
    let (_, rest) = line.split_once(Markers::PRESET)?;
    rest.split_whitespace().next()
}

impl Rule for X264PresetRule {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn check(&self, log: &LogText) -> Option<Finding> {
        let x264_lines = search::search(&self.x264, log);
        if x264_lines.is_empty() {
            return None;
        }

        let presets = search::search(&self.preset, &x264_lines);
        let slow = presets
            .lines()
            .filter_map(preset_value)
            .find(|p| !self.is_approved(p))?;

        tracing::debug!(rule = Self::NAME, preset = slow, "x264 preset outside approved set");
        self.catalog.finding(Self::NAME, MessageKey::X264Preset)
    }
}

/// "Encoder ID '<name>' not found": escalates when the id is one that a past
/// release renamed.
pub struct UnknownEncoderRule {
    encoder_id: LineMatcher,
    pattern: Regex,
    renamed: Vec<String>,
    catalog: Arc<Catalog>,
}

impl UnknownEncoderRule {
    pub const NAME: &'static str = "unknown_encoder";

    pub fn new(policy: &EncoderPolicy, catalog: Arc<Catalog>) -> Result<Self, RuleError> {
        Ok(Self {
            encoder_id: LineMatcher::literal(Markers::ENCODER_ID)?,
            pattern: Regex::new(Markers::UNKNOWN_ENCODER)?,
            renamed: policy.renamed_encoders.clone(),
            catalog,
        })
    }

    fn missing_encoder<'a>(&self, line: &'a str) -> Option<&'a str> {
        self.pattern
            .captures(line)
            .and_then(|caps| caps.name("name"))
            .map(|m| m.as_str())
    }
}

impl Rule for UnknownEncoderRule {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn check(&self, log: &LogText) -> Option<Finding> {
        let candidates = search::search(&self.encoder_id, log);
        let encoder = candidates.lines().find_map(|line| self.missing_encoder(line))?;

        let key = if self.renamed.iter().any(|r| r == encoder) {
            MessageKey::OutdatedEncoder
        } else {
            MessageKey::UnrecognisedEncoder
        };
        tracing::debug!(rule = Self::NAME, encoder, key = key.as_str(), "Encoder id not found");
        self.catalog.finding(Self::NAME, key)
    }
}
