//! Registry — ordered rule set built once and reused for every log.

use std::sync::Arc;

use crate::conf::{AnalyzerConfig, Catalog};
use crate::report::{self, AnalysisMetrics, Report};
use crate::store::LogText;

use super::bitrate::{NvencBitrateRule, X264BitrateRule};
use super::encoder::{MarkerRule, UnknownEncoderRule, X264PresetRule};
use super::error::RuleError;
use super::output::OutputFormatRule;
use super::overload::EncoderOverloadRule;
use super::session::NoSessionRule;
use super::traits::Rule;

/// Rules in registration order. Report entries follow this order.
pub struct RuleSet {
    rules: Vec<Box<dyn Rule>>,
    metrics: AnalysisMetrics,
}

impl RuleSet {
    pub fn empty() -> Self {
        Self {
            rules: Vec::new(),
            metrics: AnalysisMetrics::new(),
        }
    }

    /// Every built-in rule, configured from `config`.
    pub fn standard(config: &AnalyzerConfig) -> Result<Self, RuleError> {
        let catalog = Arc::new(
            Catalog::builtin()
                .with_overrides(&config.messages)
                .map_err(RuleError::Catalog)?,
        );

        // Order matters: it is the order findings are reported in.
        let rules: Vec<Box<dyn Rule>> = vec![
            Box::new(NoSessionRule::new(Arc::clone(&catalog))?),
            Box::new(OutputFormatRule::new(Arc::clone(&catalog))?),
            Box::new(X264PresetRule::new(&config.encoders, Arc::clone(&catalog))?),
            Box::new(MarkerRule::custom_ffmpeg(Arc::clone(&catalog))?),
            Box::new(X264BitrateRule::new(config, Arc::clone(&catalog))?),
            Box::new(MarkerRule::nvenc_start(Arc::clone(&catalog))?),
            Box::new(NvencBitrateRule::new(config, Arc::clone(&catalog))?),
            Box::new(MarkerRule::encode_error(Arc::clone(&catalog))?),
            Box::new(EncoderOverloadRule::new(&config.thresholds, Arc::clone(&catalog))?),
            Box::new(UnknownEncoderRule::new(&config.encoders, catalog)?),
        ];

        tracing::debug!(rules = rules.len(), "Built standard rule set");
        Ok(Self::with_rules(rules))
    }

    pub fn with_rules(rules: Vec<Box<dyn Rule>>) -> Self {
        Self {
            rules,
            metrics: AnalysisMetrics::new(),
        }
    }

    pub fn register(&mut self, rule: Box<dyn Rule>) {
        self.rules.push(rule);
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    pub fn rules(&self) -> &[Box<dyn Rule>] {
        &self.rules
    }

    pub fn metrics(&self) -> &AnalysisMetrics {
        &self.metrics
    }

    /// Run every rule once against `log`.
    pub fn analyze(&self, log: &LogText) -> Report {
        report::analyze(log, self)
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::empty()
    }
}
