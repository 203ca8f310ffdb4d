use std::fmt;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Criticality of a finding. Ordered: `Info < Warning < Critical`.
///
/// "No issue" is not a level; it is the absence of a [`Finding`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One diagnostic conclusion. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    rule: &'static str,
    severity: Severity,
    title: String,
    /// May carry simple HTML markup (links, line breaks); opaque to the core.
    explanation: String,
}

impl Finding {
    pub fn new(
        rule: &'static str,
        severity: Severity,
        title: impl Into<String>,
        explanation: impl Into<String>,
    ) -> Self {
        Self {
            rule,
            severity,
            title: title.into(),
            explanation: explanation.into(),
        }
    }

    /// Name of the rule that produced this finding.
    pub fn rule(&self) -> &'static str {
        self.rule
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn explanation(&self) -> &str {
        &self.explanation
    }
}

/// A rule that panicked during a run. The rest of the report is unaffected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleFailure {
    pub rule: &'static str,
    pub message: String,
}

/// Result of one analysis run: findings in rule-registration order.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub lines_analyzed: usize,
    pub rules_run: usize,
    findings: Vec<Finding>,
    failures: Vec<RuleFailure>,
}

impl Report {
    pub(crate) fn new(lines_analyzed: usize) -> Self {
        Self {
            generated_at: Utc::now(),
            lines_analyzed,
            rules_run: 0,
            findings: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub(crate) fn push_finding(&mut self, finding: Finding) {
        self.findings.push(finding);
    }

    pub(crate) fn push_failure(&mut self, failure: RuleFailure) {
        self.failures.push(failure);
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn failures(&self) -> &[RuleFailure] {
        &self.failures
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    /// Highest severity among the findings, `None` for a clean report.
    pub fn max_severity(&self) -> Option<Severity> {
        self.findings.iter().map(Finding::severity).max()
    }
}
