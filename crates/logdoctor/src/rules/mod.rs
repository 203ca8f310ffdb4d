//! Rules — independent detectors, one finding at most per rule and run.

pub mod traits;
pub mod error;
pub mod markers;
pub mod session;
pub mod output;
pub mod encoder;
pub mod bitrate;
pub mod overload;
pub mod registry;

pub use traits::Rule;
pub use error::RuleError;
pub use markers::Markers;
pub use session::{NoSessionRule, SessionProbe};
pub use output::OutputFormatRule;
pub use encoder::{MarkerRule, UnknownEncoderRule, X264PresetRule};
pub use bitrate::{NvencBitrateRule, X264BitrateRule};
pub use overload::EncoderOverloadRule;
pub use registry::RuleSet;
