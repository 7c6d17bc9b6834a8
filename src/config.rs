//! Document configuration

use crate::limits::Limits;
use serde::{Deserialize, Serialize};

/// What to do when an Activity starts after it ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOrderPolicy {
    /// Fail construction with a domain constraint error
    #[default]
    Reject,
    /// Accept the record and log a warning
    Warn,
}

/// Configuration for a [`ProvDocument`](crate::documents::ProvDocument)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Activity start/end ordering policy
    time_order: TimeOrderPolicy,
    /// Local prefix for generated anonymous identifiers
    anonymous_prefix: String,
    /// Whether JSON output is pretty-printed
    pretty: bool,
    /// Processing limits
    limits: Limits,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            time_order: TimeOrderPolicy::default(),
            anonymous_prefix: "id".to_string(),
            pretty: false,
            limits: Limits::default(),
        }
    }
}

impl DocumentConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the time-order policy
    pub fn time_order(&self) -> TimeOrderPolicy {
        self.time_order
    }

    /// Get the anonymous identifier prefix
    pub fn anonymous_prefix(&self) -> &str {
        &self.anonymous_prefix
    }

    /// Check if JSON output is pretty-printed
    pub fn pretty(&self) -> bool {
        self.pretty
    }

    /// Get the limits
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Set the time-order policy
    pub fn with_time_order(mut self, policy: TimeOrderPolicy) -> Self {
        self.time_order = policy;
        self
    }

    /// Set the anonymous identifier prefix
    pub fn with_anonymous_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.anonymous_prefix = prefix.into();
        self
    }

    /// Set pretty printing
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Set the limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = DocumentConfig::default();
        assert_eq!(config.time_order(), TimeOrderPolicy::Reject);
        assert_eq!(config.anonymous_prefix(), "id");
        assert!(!config.pretty());
    }

    #[test]
    fn test_config_builder() {
        let config = DocumentConfig::new()
            .with_time_order(TimeOrderPolicy::Warn)
            .with_anonymous_prefix("anon")
            .with_pretty(true)
            .with_limits(Limits::strict());
        assert_eq!(config.time_order(), TimeOrderPolicy::Warn);
        assert_eq!(config.anonymous_prefix(), "anon");
        assert!(config.pretty());
        assert_eq!(config.limits(), &Limits::strict());
    }

    #[test]
    fn test_config_from_json() {
        let config: DocumentConfig =
            serde_json::from_str(r#"{"time_order": "warn", "pretty": true}"#).unwrap();
        assert_eq!(config.time_order(), TimeOrderPolicy::Warn);
        assert!(config.pretty());
        assert_eq!(config.anonymous_prefix(), "id");
    }
}
