use grep_matcher::Matcher;
use grep_regex::{RegexMatcher, RegexMatcherBuilder};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Invalid search token {token:?}: {reason}")]
    InvalidToken { token: String, reason: String },
}

/// Literal "does token T occur in this line" capability.
///
/// The token is matched as a fixed string: `.`, `[`, `]`, `+` and other regex
/// metacharacters carry no special meaning. Build once, reuse for every search.
#[derive(Debug)]
pub struct LineMatcher {
    token: String,
    matcher: RegexMatcher,
}

impl LineMatcher {
    pub fn literal(token: &str) -> Result<Self, SearchError> {
        let matcher = RegexMatcherBuilder::new()
            .case_insensitive(false)
            .multi_line(false)
            .fixed_strings(true)
            .build(token)
            .map_err(|e| SearchError::InvalidToken {
                token: token.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            token: token.to_string(),
            matcher,
        })
    }

    /// Build one matcher per token, failing on the first invalid one.
    pub fn literals(tokens: &[&str]) -> Result<Vec<Self>, SearchError> {
        tokens.iter().map(|t| Self::literal(t)).collect()
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    #[inline]
    pub fn is_match(&self, line: &str) -> bool {
        self.matcher.is_match(line.as_bytes()).unwrap_or(false)
    }
}
