//! Store — the log as an immutable, 0-indexed sequence of lines.
//!
//! Line order is file order. Later lines are later events, so the last
//! occurrence of a marker usually describes the current session state.

use std::sync::Arc;

/// Immutable line store shared by every rule of an analysis run.
///
/// Cloning is cheap (the lines live behind an `Arc`) and there is no way to
/// mutate the lines once the store has been built.
#[derive(Debug, Clone, Default)]
pub struct LogText {
    lines: Arc<[String]>,
}

impl LogText {
    /// Build a store from already-decoded lines.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::<String>::into).collect(),
        }
    }

    /// Split raw log text into lines (`\n` or `\r\n` terminated).
    pub fn from_text(text: &str) -> Self {
        Self::from_lines(text.lines())
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Line at `index`, or `None` past the end of the log.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Lines in `[start, start + len)`, clamped to the end of the log.
    pub fn window(&self, start: usize, len: usize) -> &[String] {
        let start = start.min(self.lines.len());
        let end = start.saturating_add(len).min(self.lines.len());
        &self.lines[start..end]
    }
}

impl From<&str> for LogText {
    fn from(text: &str) -> Self {
        Self::from_text(text)
    }
}
