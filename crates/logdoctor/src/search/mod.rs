//! Search — literal line search over the log or over a prior result.
//!
//! Every query takes a [`LineSource`]: either the whole [`LogText`] or a
//! [`SearchResult`] produced earlier, so searches can be chained to narrow
//! a result down (`search(mp4, &search(writing_file, &log))`).

pub mod engine;

use std::iter::{Copied, Enumerate};
use std::slice;

use crate::store::LogText;

pub use engine::{LineMatcher, SearchError};

/// One matching line and its 0-based index in the original log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit<'a> {
    pub index: usize,
    pub line: &'a str,
}

/// Ordered hits, in the same relative order as the log. May be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResult<'a> {
    hits: Vec<Hit<'a>>,
}

impl<'a> SearchResult<'a> {
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, Hit<'a>> {
        self.hits.iter()
    }

    pub fn lines(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.hits.iter().map(|h| h.line)
    }

    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.hits.iter().map(|h| h.index)
    }
}

impl<'a> IntoIterator for SearchResult<'a> {
    type Item = Hit<'a>;
    type IntoIter = std::vec::IntoIter<Hit<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.hits.into_iter()
    }
}

impl<'r, 'a> IntoIterator for &'r SearchResult<'a> {
    type Item = Hit<'a>;
    type IntoIter = Copied<slice::Iter<'r, Hit<'a>>>;

    fn into_iter(self) -> Self::IntoIter {
        self.hits.iter().copied()
    }
}

/// Anything a search can run over.
pub trait LineSource<'a> {
    type Hits: DoubleEndedIterator<Item = Hit<'a>>;

    fn hits(self) -> Self::Hits;
}

/// Iterator over every line of a [`LogText`] as a [`Hit`].
pub struct LogHits<'a> {
    inner: Enumerate<slice::Iter<'a, String>>,
}

impl<'a> Iterator for LogHits<'a> {
    type Item = Hit<'a>;

    fn next(&mut self) -> Option<Hit<'a>> {
        self.inner.next().map(|(index, line)| Hit { index, line: line.as_str() })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a> DoubleEndedIterator for LogHits<'a> {
    fn next_back(&mut self) -> Option<Hit<'a>> {
        self.inner.next_back().map(|(index, line)| Hit { index, line: line.as_str() })
    }
}

impl<'a> LineSource<'a> for &'a LogText {
    type Hits = LogHits<'a>;

    fn hits(self) -> LogHits<'a> {
        LogHits {
            inner: self.lines().iter().enumerate(),
        }
    }
}

impl<'r, 'a> LineSource<'a> for &'r SearchResult<'a> {
    type Hits = Copied<slice::Iter<'r, Hit<'a>>>;

    fn hits(self) -> Self::Hits {
        self.hits.iter().copied()
    }
}

/// All entries of `source` containing the matcher's token, order preserved.
pub fn search<'a, S: LineSource<'a>>(matcher: &LineMatcher, source: S) -> SearchResult<'a> {
    SearchResult {
        hits: source.hits().filter(|h| matcher.is_match(h.line)).collect(),
    }
}

/// Whether the token occurs anywhere in `source`.
pub fn contains<'a, S: LineSource<'a>>(matcher: &LineMatcher, source: S) -> bool {
    source.hits().any(|h| matcher.is_match(h.line))
}

/// Whether any of the tokens occurs anywhere in `source`.
pub fn contains_any<'a, S>(matchers: &[LineMatcher], source: S) -> bool
where
    S: LineSource<'a> + Copy,
{
    matchers.iter().any(|m| contains(m, source))
}

/// Last matching entry. Scans backwards, so the cost is proportional to the
/// distance from the end.
pub fn last<'a, S: LineSource<'a>>(matcher: &LineMatcher, source: S) -> Option<Hit<'a>> {
    source.hits().rev().find(|h| matcher.is_match(h.line))
}
