use crate::report::Finding;
use crate::store::LogText;

/// A detector mapping the whole log to zero or one finding.
///
/// Rules only read the log. They hold pre-built matchers and configuration,
/// never state that survives between calls.
pub trait Rule: Send + Sync {
    /// Stable identifier, also recorded on the finding
    fn name(&self) -> &'static str;

    /// `None` when the rule's marker is absent or the rule does not apply
    fn check(&self, log: &LogText) -> Option<Finding>;
}
