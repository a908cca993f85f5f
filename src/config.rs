// File: src/config.rs
use crate::core::converter::InputScript;
use crate::core::matcher::DEFAULT_ACCEPTANCE_THRESHOLD;
use crate::error::{ChandasError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

/// Analyzer settings. Missing fields take their defaults when deserialized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Minimum verse score for a meter to count as identified.
    pub acceptance_threshold: f64,
    pub script: InputScript,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            acceptance_threshold: DEFAULT_ACCEPTANCE_THRESHOLD,
            script: InputScript::Auto,
        }
    }
}

impl AnalyzerConfig {
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.acceptance_threshold = threshold;
        self
    }

    pub fn with_script(mut self, script: InputScript) -> Self {
        self.script = script;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.acceptance_threshold) {
            warn!(threshold = self.acceptance_threshold, "rejecting acceptance threshold");
            return Err(ChandasError::InvalidConfig(format!(
                "acceptance threshold must lie in [0, 1], got {}",
                self.acceptance_threshold
            )));
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        Self::from_json_str(&std::fs::read_to_string(path)?)
    }
}
