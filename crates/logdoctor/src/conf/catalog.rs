//! Catalog — severity and message templates, looked up by rule message key.
//!
//! The catalog is built once (built-in texts, optionally overridden from the
//! config file) and shared read-only by every rule.

use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::report::{Finding, Severity};

const CLEAN_LOG: &str = "To make a clean log file, restart the application, start your stream or recording for about 30 seconds, stop it again, and then upload the current log file from the Help menu.";

const OVERLOAD_GENERIC: &str = r#"Encoder overload may be related to your CPU or GPU being overloaded, depending on the encoder in question. If you are using a software encoder (x264) please see the <a href="https://obsproject.com/wiki/General-Performance-and-Encoding-Issues">CPU Overload Guide</a>. If you are using a hardware encoder (AMF, QSV/Quicksync, NVENC) please see the <a href="https://obsproject.com/wiki/GPU-overload-issues">GPU Overload Guide</a>."#;

const LOW_BITRATE: &str = "Your stream encoder is set to a video bitrate that is too low. This will lower picture quality especially in high motion scenes like fast paced games. Use the Auto-Config Wizard to adjust your settings to the optimum for your situation. It can be accessed from the Tools menu, and then just follow the on-screen directions.";

/// Key of one catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MessageKey {
    NoSession,
    Mp4Recording,
    X264Preset,
    CustomFfmpeg,
    LowStreamBitrate,
    NvencStartFailure,
    EncoderStartError,
    OverloadMixed,
    OverloadCpu,
    OverloadGpu,
    OverloadUnknown,
    OutdatedEncoder,
    UnrecognisedEncoder,
}

impl MessageKey {
    pub const ALL: [MessageKey; 13] = [
        MessageKey::NoSession,
        MessageKey::Mp4Recording,
        MessageKey::X264Preset,
        MessageKey::CustomFfmpeg,
        MessageKey::LowStreamBitrate,
        MessageKey::NvencStartFailure,
        MessageKey::EncoderStartError,
        MessageKey::OverloadMixed,
        MessageKey::OverloadCpu,
        MessageKey::OverloadGpu,
        MessageKey::OverloadUnknown,
        MessageKey::OutdatedEncoder,
        MessageKey::UnrecognisedEncoder,
    ];

    /// Keys whose severity the rule derives from a measured value. Their
    /// templates carry no severity and config cannot set one.
    pub fn severity_is_measured(&self) -> bool {
        matches!(
            self,
            MessageKey::OverloadMixed
                | MessageKey::OverloadCpu
                | MessageKey::OverloadGpu
                | MessageKey::OverloadUnknown
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKey::NoSession => "no_session",
            MessageKey::Mp4Recording => "mp4_recording",
            MessageKey::X264Preset => "x264_preset",
            MessageKey::CustomFfmpeg => "custom_ffmpeg",
            MessageKey::LowStreamBitrate => "low_stream_bitrate",
            MessageKey::NvencStartFailure => "nvenc_start_failure",
            MessageKey::EncoderStartError => "encoder_start_error",
            MessageKey::OverloadMixed => "overload_mixed",
            MessageKey::OverloadCpu => "overload_cpu",
            MessageKey::OverloadGpu => "overload_gpu",
            MessageKey::OverloadUnknown => "overload_unknown",
            MessageKey::OutdatedEncoder => "outdated_encoder",
            MessageKey::UnrecognisedEncoder => "unrecognised_encoder",
        }
    }
}

impl FromStr for MessageKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MessageKey::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown message key: {}", s))
    }
}

/// Severity plus title/explanation templates.
///
/// Templates may contain `{name}` placeholders filled by the rule at render
/// time (e.g. `{percent}` in the overload titles). `severity` is `None` when
/// the rule computes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageTemplate {
    pub severity: Option<Severity>,
    pub title: String,
    pub explanation: String,
}

impl MessageTemplate {
    fn fixed(severity: Severity, title: &str, explanation: &str) -> Self {
        Self {
            severity: Some(severity),
            title: title.to_string(),
            explanation: explanation.to_string(),
        }
    }

    fn measured(title: &str, explanation: &str) -> Self {
        Self {
            severity: None,
            title: title.to_string(),
            explanation: explanation.to_string(),
        }
    }

    /// `(title, explanation)` with every `{name}` replaced by its value.
    pub fn render(&self, vars: &[(&str, &str)]) -> (String, String) {
        let mut title = self.title.clone();
        let mut explanation = self.explanation.clone();
        for (name, value) in vars {
            let placeholder = format!("{{{}}}", name);
            title = title.replace(&placeholder, value);
            explanation = explanation.replace(&placeholder, value);
        }
        (title, explanation)
    }
}

/// Partial replacement for a built-in entry, read from the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageOverride {
    pub severity: Option<Severity>,
    pub title: Option<String>,
    pub explanation: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Catalog {
    messages: BTreeMap<MessageKey, MessageTemplate>,
}

impl Catalog {
    pub fn builtin() -> Self {
        use MessageKey::*;
        use Severity::*;

        let entries = [
            (NoSession, MessageTemplate::fixed(
                Info,
                "No Output Session",
                &format!("Your log contains no recording or streaming session. Results of this log analysis are limited. Please post a link to a clean log file. {}", CLEAN_LOG),
            )),
            (Mp4Recording, MessageTemplate::fixed(
                Critical,
                "MP4/MOV Recording",
                "Record to FLV or MKV. If you record to MP4 or MOV and the recording is interrupted, the file will be corrupted and unrecoverable. <br><br>If you require MP4 files for some other purpose like editing, remux them afterwards by selecting File > Remux Recordings in the main window.",
            )),
            (X264Preset, MessageTemplate::fixed(
                Info,
                "Non-Default x264 Preset",
                "A slower x264 preset than 'veryfast' is in use. It is recommended to leave this value on veryfast, as there are significant diminishing returns to setting it lower. It can also result in very poor gaming performance on the system if you're not using a 2 PC setup.",
            )),
            (CustomFfmpeg, MessageTemplate::fixed(
                Warning,
                "Custom FFMPEG Output",
                r#"Custom FFMPEG output is in use. Only absolute professionals should use this. If you got your settings from a YouTube video advertising "Absolute best settings" then we recommend using one of the presets in Simple output mode instead."#,
            )),
            (LowStreamBitrate, MessageTemplate::fixed(Info, "Low Stream Bitrate", LOW_BITRATE)),
            (NvencStartFailure, MessageTemplate::fixed(
                Warning,
                "NVENC Start Failure",
                r#"The NVENC Encoder failed to start due of a variety of possible reasons. Make sure that Windows Game Bar and Windows Game DVR are disabled and that your GPU drivers are up to date. <br><br>You can perform a clean driver installation for your GPU by following the instructions at <a href="http://obsproject.com/forum/resources/performing-a-clean-gpu-driver-installation.65/"> Clean GPU driver installation</a>. <br>If this doesn't solve the issue, then it's possible your graphics card doesn't support NVENC. You can change to a different Encoder in Settings > Output."#,
            )),
            (EncoderStartError, MessageTemplate::fixed(
                Info,
                "Encoder start error",
                r#"An encoder failed to start. This could result in a bitrate stuck at 0 or the application stuck on "Stopping Recording". Depending on your encoder, try updating your drivers. If you're using QSV, make sure your iGPU is enabled. If that still doesn't help, try switching to a different encoder in Settings -> Output."#,
            )),
            (OverloadMixed, MessageTemplate::measured(
                "{percent}% Encoder Overload",
                OVERLOAD_GENERIC,
            )),
            (OverloadCpu, MessageTemplate::measured(
                "{percent}% CPU Encoder Overload",
                r#"The encoder is skipping frames because of CPU overload. Read about <a href="https://obsproject.com/wiki/General-Performance-and-Encoding-Issues">General Performance and Encoding Issues</a>."#,
            )),
            (OverloadGpu, MessageTemplate::measured(
                "{percent}% GPU Encoder Overload",
                r#"The encoder is skipping frames because of GPU overload. Read about troubleshooting tips in our <a href="https://obsproject.com/wiki/GPU-overload-issues">GPU Overload Guide</a>."#,
            )),
            (OverloadUnknown, MessageTemplate::measured(
                "{percent}% Encoder Overload",
                OVERLOAD_GENERIC,
            )),
            (OutdatedEncoder, MessageTemplate::fixed(
                Critical,
                "Outdated Encoder Set",
                "In version 27, the Apple VT encoder was changed to better support the Apple M1 platform, which resulted in the existing encoder becoming unrecognised. Manually navigate to Settings -> Output and set the 'Encoder' to fix this.",
            )),
            (UnrecognisedEncoder, MessageTemplate::fixed(
                Warning,
                "Unrecognised Encoder",
                "One of the configured encoders is not recognised. This can result in failure to go live or to record. To fix this, go to Settings -> Output and change the 'Encoder' option.",
            )),
        ];

        Self {
            messages: entries.into_iter().collect(),
        }
    }

    /// Apply config-file overrides keyed by [`MessageKey::as_str`] names.
    ///
    /// A severity patch on a key whose severity is measured is rejected.
    pub fn with_overrides(
        mut self,
        overrides: &HashMap<String, MessageOverride>,
    ) -> Result<Self, String> {
        for (name, patch) in overrides {
            let key: MessageKey = name.parse()?;
            let Some(entry) = self.messages.get_mut(&key) else {
                return Err(format!("message key has no built-in entry: {}", name));
            };
            if let Some(severity) = patch.severity {
                if key.severity_is_measured() {
                    return Err(format!(
                        "severity of {} is computed from the measured value and cannot be overridden",
                        name
                    ));
                }
                entry.severity = Some(severity);
            }
            if let Some(title) = &patch.title {
                entry.title = title.clone();
            }
            if let Some(explanation) = &patch.explanation {
                entry.explanation = explanation.clone();
            }
        }
        Ok(self)
    }

    pub fn get(&self, key: MessageKey) -> Option<&MessageTemplate> {
        self.messages.get(&key)
    }

    /// Finding with the catalog's severity and untouched texts.
    pub fn finding(&self, rule: &'static str, key: MessageKey) -> Option<Finding> {
        let template = self.lookup(rule, key)?;
        let Some(severity) = template.severity else {
            tracing::warn!(rule, key = key.as_str(), "Message has no fixed severity");
            return None;
        };
        Some(Finding::new(
            rule,
            severity,
            template.title.clone(),
            template.explanation.clone(),
        ))
    }

    /// Finding whose severity was computed by the rule, with placeholders filled.
    pub fn finding_with(
        &self,
        rule: &'static str,
        key: MessageKey,
        severity: Severity,
        vars: &[(&str, &str)],
    ) -> Option<Finding> {
        let (title, explanation) = self.lookup(rule, key)?.render(vars);
        Some(Finding::new(rule, severity, title, explanation))
    }

    fn lookup(&self, rule: &'static str, key: MessageKey) -> Option<&MessageTemplate> {
        let template = self.messages.get(&key);
        if template.is_none() {
            tracing::warn!(rule, key = key.as_str(), "Message key missing from catalog");
        }
        template
    }
}
