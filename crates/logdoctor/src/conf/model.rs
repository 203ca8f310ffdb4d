//! Model — AnalyzerConfig and related structs.

use std::collections::HashMap;
use serde::{Deserialize, Serialize};

use super::catalog::MessageOverride;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub thresholds: Thresholds,
    pub windows: Windows,
    pub encoders: EncoderPolicy,
    /// Catalog overrides keyed by message key name (`low_stream_bitrate`, ...)
    pub messages: HashMap<String, MessageOverride>,
}

/// Empirical tunables. None of these have a documented derivation; they are
/// policy, not physics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Target kbps = width * height * fps / bitrate_divisor
    pub bitrate_divisor: f64,
    /// Skipped-frame percentage at which overload becomes a warning
    pub overload_warning_pct: f64,
    /// Skipped-frame percentage at which overload becomes critical
    pub overload_critical_pct: f64,
}

/// Number of lines scanned after each settings header.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Windows {
    pub x264_settings: usize,
    pub nvenc_settings: usize,
    pub video_settings: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderPolicy {
    /// x264 presets that do not warrant a finding
    pub approved_presets: Vec<String>,
    /// Encoder ids renamed by a past release (known cause of "not found")
    pub renamed_encoders: Vec<String>,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            bitrate_divisor: 20_000.0,
            overload_warning_pct: 5.0,
            overload_critical_pct: 15.0,
        }
    }
}

impl Default for Windows {
    fn default() -> Self {
        Self {
            x264_settings: 10,
            nvenc_settings: 12,
            video_settings: 7,
        }
    }
}

impl Default for EncoderPolicy {
    fn default() -> Self {
        Self {
            approved_presets: vec![
                "ultrafast".to_string(),
                "superfast".to_string(),
                "veryfast".to_string(),
            ],
            renamed_encoders: vec!["vt_h264_sw".to_string(), "vt_h264_hw".to_string()],
        }
    }
}

impl AnalyzerConfig {
    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        self.thresholds.validate()?;
        self.windows.validate()?;
        if self.encoders.approved_presets.is_empty() {
            return Err("encoders.approved_presets must not be empty".to_string());
        }
        Ok(())
    }
}

impl Thresholds {
    pub fn validate(&self) -> Result<(), String> {
        if !(self.bitrate_divisor.is_finite() && self.bitrate_divisor > 0.0) {
            return Err("thresholds.bitrate_divisor must be > 0".to_string());
        }
        if !(self.overload_warning_pct.is_finite() && self.overload_warning_pct >= 0.0) {
            return Err("thresholds.overload_warning_pct must be >= 0".to_string());
        }
        if !(self.overload_critical_pct.is_finite()
            && self.overload_critical_pct > self.overload_warning_pct)
        {
            return Err(
                "thresholds.overload_critical_pct must be > thresholds.overload_warning_pct".to_string(),
            );
        }
        Ok(())
    }
}

impl Windows {
    pub fn validate(&self) -> Result<(), String> {
        if self.x264_settings == 0 || self.nvenc_settings == 0 || self.video_settings == 0 {
            return Err("windows.* must be > 0".to_string());
        }
        Ok(())
    }
}
