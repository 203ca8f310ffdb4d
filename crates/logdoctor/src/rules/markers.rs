//! Markers — literal tokens the rules look for.
//!
//! All tokens are matched as fixed strings, never as regexes.

/// Well-known log markers.
pub struct Markers;

impl Markers {
    pub const RECORDING_START: &'static str = "== Recording Start ==";
    pub const STREAMING_START: &'static str = "== Streaming Start ==";
    pub const REPLAY_BUFFER_START: &'static str = "== Replay Buffer Start ==";

    /// Any of these means the log holds at least one output session.
    pub const SESSION_STARTS: &'static [&'static str] = &[
        Self::RECORDING_START,
        Self::STREAMING_START,
        Self::REPLAY_BUFFER_START,
    ];

    pub const WRITING_FILE: &'static str = "Writing file ";
    pub const MP4_EXTENSION: &'static str = ".mp4";
    pub const MOV_EXTENSION: &'static str = ".mov";
    /// Muxer flags that keep an interrupted MP4/MOV recording recoverable.
    pub const FRAGMENTED_MOVFLAGS: &'static str = "movflags=frag_keyframe+empty_moov+delay_moov";

    pub const X264_ENCODER: &'static str = "x264 encoder:";
    pub const PRESET: &'static str = "preset: ";

    pub const CUSTOM_FFMPEG_OUTPUT: &'static str = "'adv_ffmpeg_output':";
    pub const NVENC_OPEN_FAILED: &'static str = "Failed to open NVENC codec";
    pub const ENCODE_ERROR: &'static str = "Error encoding with encoder";

    pub const X264_STREAM_SETTINGS: &'static str = "[x264 encoder: 'simple_h264_stream'] settings:";
    pub const NVENC_STREAM_SETTINGS: &'static str = "[NVENC encoder: 'streaming_h264'] settings:";
    pub const VIDEO_SETTINGS_RESET: &'static str = "video settings reset:";

    pub const SKIPPED_FRAMES: &'static str = "skipped frames";

    pub const SOFTWARE_ENCODERS: &'static [&'static str] = &["[x264 encoder:"];
    pub const HARDWARE_ENCODERS: &'static [&'static str] = &[
        "[jim-nvenc:",
        "[NVENC encoder:",
        "[AMF] [H264]",
        "[AMF] [H265]",
        "[qsv encoder:",
        "[VideoToolbox recording_h264:",
        "[VideoToolbox streaming_h264:",
    ];

    pub const ENCODER_ID: &'static str = "Encoder ID";
    /// Captures the encoder id of an "Encoder ID '<name>' not found" line.
    pub const UNKNOWN_ENCODER: &'static str = r"Encoder\sID\s'(?P<name>.+)'\snot\sfound";
}
