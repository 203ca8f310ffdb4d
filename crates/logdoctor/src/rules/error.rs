use thiserror::Error;

use crate::search::SearchError;

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("Invalid marker: {0}")]
    Search(#[from] SearchError),

    #[error("Invalid capture pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Invalid message catalog: {0}")]
    Catalog(String),
}
