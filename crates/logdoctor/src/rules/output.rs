//! Output — container format of recordings.

use std::sync::Arc;

use crate::conf::{Catalog, MessageKey};
use crate::report::Finding;
use crate::search::{self, LineMatcher};
use crate::store::LogText;

use super::error::RuleError;
use super::markers::Markers;
use super::traits::Rule;

/// Flags MP4/MOV recordings, which are lost entirely if the recording is
/// interrupted, unless fragmented muxer flags are in use.
pub struct OutputFormatRule {
    writing_file: LineMatcher,
    mp4: LineMatcher,
    mov: LineMatcher,
    fragmented: LineMatcher,
    catalog: Arc<Catalog>,
}

impl OutputFormatRule {
    pub const NAME: &'static str = "output_format";

    pub fn new(catalog: Arc<Catalog>) -> Result<Self, RuleError> {
        Ok(Self {
            writing_file: LineMatcher::literal(Markers::WRITING_FILE)?,
            mp4: LineMatcher::literal(Markers::MP4_EXTENSION)?,
            mov: LineMatcher::literal(Markers::MOV_EXTENSION)?,
            fragmented: LineMatcher::literal(Markers::FRAGMENTED_MOVFLAGS)?,
            catalog,
        })
    }
}

impl Rule for OutputFormatRule {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn check(&self, log: &LogText) -> Option<Finding> {
        let written = search::search(&self.writing_file, log);
        if written.is_empty() {
            return None;
        }

        let unsafe_container =
            search::contains(&self.mp4, &written) || search::contains(&self.mov, &written);
        if !unsafe_container || search::contains(&self.fragmented, log) {
            return None;
        }

        tracing::debug!(rule = Self::NAME, files = written.len(), "Unfragmented MP4/MOV recording");
        self.catalog.finding(Self::NAME, MessageKey::Mp4Recording)
    }
}
