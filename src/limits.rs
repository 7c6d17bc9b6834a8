//! Limits for PROV document processing
//!
//! Decoding untrusted PROV-JSON builds an in-memory graph whose size is
//! proportional to the input. These limits bound bundle nesting, record
//! counts and namespace declarations.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Limits configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Maximum nesting depth of bundles (the top-level document is depth 0)
    pub max_bundle_depth: usize,

    /// Maximum number of records in one document, across all bundles
    pub max_records: usize,

    /// Maximum number of registered namespaces
    pub max_namespaces: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_bundle_depth: 32,
            max_records: 1_000_000,
            max_namespaces: 10_000,
        }
    }
}

impl Limits {
    /// Create a new Limits with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create strict limits (more restrictive)
    pub fn strict() -> Self {
        Self {
            max_bundle_depth: 4,
            max_records: 10_000,
            max_namespaces: 100,
        }
    }

    /// Create permissive limits (less restrictive, use with caution)
    pub fn permissive() -> Self {
        Self {
            max_bundle_depth: 1024,
            max_records: 100_000_000,
            max_namespaces: 1_000_000,
        }
    }

    /// Check if bundle nesting depth is within limits
    pub fn check_bundle_depth(&self, depth: usize) -> Result<()> {
        if depth > self.max_bundle_depth {
            Err(Error::LimitExceeded(format!(
                "Bundle depth {} exceeds maximum {}",
                depth, self.max_bundle_depth
            )))
        } else {
            Ok(())
        }
    }

    /// Check if number of records is within limits
    pub fn check_records(&self, count: usize) -> Result<()> {
        if count > self.max_records {
            Err(Error::LimitExceeded(format!(
                "Record count {} exceeds maximum {}",
                count, self.max_records
            )))
        } else {
            Ok(())
        }
    }

    /// Check if number of namespaces is within limits
    pub fn check_namespaces(&self, count: usize) -> Result<()> {
        if count > self.max_namespaces {
            Err(Error::LimitExceeded(format!(
                "Namespace count {} exceeds maximum {}",
                count, self.max_namespaces
            )))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let limits = Limits::default();
        assert_eq!(limits.max_bundle_depth, 32);
        assert!(limits.check_bundle_depth(10).is_ok());
        assert!(limits.check_bundle_depth(33).is_err());
    }

    #[test]
    fn test_strict_limits() {
        let limits = Limits::strict();
        assert!(limits.max_records < Limits::default().max_records);
        assert!(limits.check_bundle_depth(5).is_err());
    }

    #[test]
    fn test_permissive_limits() {
        let limits = Limits::permissive();
        assert!(limits.max_bundle_depth > Limits::default().max_bundle_depth);
        assert!(limits.check_records(5_000_000).is_ok());
    }

    #[test]
    fn test_check_namespaces() {
        let limits = Limits::strict();
        assert!(limits.check_namespaces(100).is_ok());
        assert!(limits.check_namespaces(101).is_err());
    }

    #[test]
    fn test_deserialize_partial() {
        let limits: Limits = serde_json::from_str(r#"{"max_records": 5}"#).unwrap();
        assert_eq!(limits.max_records, 5);
        assert_eq!(limits.max_bundle_depth, 32);
    }
}
