//! Session — whether the log holds any recording/streaming/replay session.

use std::sync::Arc;

use crate::conf::{Catalog, MessageKey};
use crate::report::Finding;
use crate::search::{self, LineMatcher};
use crate::store::LogText;

use super::error::RuleError;
use super::markers::Markers;
use super::traits::Rule;

/// Detects session-start markers. Shared by every rule that only applies to a
/// log with at least one output session.
#[derive(Debug)]
pub struct SessionProbe {
    starts: Vec<LineMatcher>,
}

impl SessionProbe {
    pub fn new() -> Result<Self, RuleError> {
        Ok(Self {
            starts: LineMatcher::literals(Markers::SESSION_STARTS)?,
        })
    }

    pub fn has_session(&self, log: &LogText) -> bool {
        search::contains_any(&self.starts, log)
    }
}

/// Fires when the log carries no analyzable session at all.
pub struct NoSessionRule {
    probe: SessionProbe,
    catalog: Arc<Catalog>,
}

impl NoSessionRule {
    pub const NAME: &'static str = "no_session";

    pub fn new(catalog: Arc<Catalog>) -> Result<Self, RuleError> {
        Ok(Self {
            probe: SessionProbe::new()?,
            catalog,
        })
    }
}

impl Rule for NoSessionRule {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn check(&self, log: &LogText) -> Option<Finding> {
        if self.probe.has_session(log) {
            return None;
        }
        self.catalog.finding(Self::NAME, MessageKey::NoSession)
    }
}
