//! Label-driven extraction of `label: value` fields from a settings block.

use tracing::{debug, warn};

use crate::search::{self, LineMatcher, SearchError};
use crate::store::LogText;

use super::model::{FieldSpec, FieldValue, StructuredRecord};

/// Reads the most recent settings block announced by a header line.
///
/// Only the last header counts: a log can hold several sessions and the most
/// recent one reflects the current configuration. Fields are matched by label
/// anywhere inside the window, so their order does not matter.
#[derive(Debug)]
pub struct BlockExtractor {
    header: LineMatcher,
    window: usize,
}

impl BlockExtractor {
    /// `window` is the number of lines after the header that may hold fields.
    pub fn new(header: &str, window: usize) -> Result<Self, SearchError> {
        Ok(Self {
            header: LineMatcher::literal(header)?,
            window,
        })
    }

    pub fn header(&self) -> &str {
        self.header.token()
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Index of the last header line, if any.
    pub fn locate(&self, log: &LogText) -> Option<usize> {
        search::last(&self.header, log).map(|hit| hit.index)
    }

    pub fn extract(&self, log: &LogText, fields: &[FieldSpec]) -> StructuredRecord {
        let Some(index) = self.locate(log) else {
            return StructuredRecord::default();
        };

        let mut record = StructuredRecord::found_at(index);
        for line in log.window(index + 1, self.window) {
            let Some((head, raw)) = split_value(line) else {
                continue;
            };

            for spec in fields {
                if record.get(spec.name).is_some() || !label_matches(head, spec.name) {
                    continue;
                }
                match FieldValue::coerce(raw, spec.kind) {
                    Some(value) => record.insert(spec.name, value),
                    None => warn!(
                        header = self.header(),
                        field = spec.name,
                        value = raw,
                        "Unparseable settings value, treating field as missing"
                    ),
                }
            }
        }

        debug!(
            header = self.header(),
            header_index = index,
            found = record.len(),
            wanted = fields.len(),
            "Extracted settings block"
        );
        record
    }
}

/// Split a line into everything before its last token and the last token.
fn split_value(line: &str) -> Option<(&str, &str)> {
    let line = line.trim_end();
    let cut = line.rfind(char::is_whitespace)?;
    let (head, value) = line.split_at(cut);
    let value = value.trim_start();
    if value.is_empty() {
        return None;
    }
    Some((head.trim_end(), value))
}

/// `head` ends with `name:` on a word boundary (`"\tbitrate:"` matches
/// `bitrate`, `"max_bitrate:"` does not).
fn label_matches(head: &str, name: &str) -> bool {
    head.strip_suffix(':')
        .and_then(|h| h.strip_suffix(name))
        .map(|rest| rest.is_empty() || rest.ends_with(char::is_whitespace))
        .unwrap_or(false)
}
