use crate::error::{CreditAnalysisError, Result};
use crate::mappings::FieldMappings;
use crate::standards::StandardsTable;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Thresholds that turn a count of green ratios into a loan decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CreditPolicy {
    #[schemars(description = "Minimum number of green ratios (EBITDA excluded) for an approval")]
    pub accept_threshold: usize,

    #[schemars(
        description = "Green count that yields a conditional (amber) approval; fewer greens are rejected. Conventionally half of accept_threshold."
    )]
    pub reject_threshold: usize,
}

impl CreditPolicy {
    pub fn new(accept_threshold: usize, reject_threshold: usize) -> Result<Self> {
        if reject_threshold > accept_threshold {
            return Err(CreditAnalysisError::InvalidThresholds {
                accept: accept_threshold,
                reject: reject_threshold,
            });
        }
        Ok(Self {
            accept_threshold,
            reject_threshold,
        })
    }

    /// Follows the `accept = 2 × reject` convention.
    pub fn from_accept_threshold(accept_threshold: usize) -> Self {
        Self {
            accept_threshold,
            reject_threshold: accept_threshold / 2,
        }
    }
}

impl Default for CreditPolicy {
    fn default() -> Self {
        Self::from_accept_threshold(6)
    }
}

/// Immutable configuration handed to every computation.
#[derive(Debug, Clone, Default)]
pub struct AnalysisContext {
    pub mappings: FieldMappings,
    pub standards: StandardsTable,
    pub policy: CreditPolicy,
}

impl AnalysisContext {
    pub fn new(mappings: FieldMappings, standards: StandardsTable, policy: CreditPolicy) -> Self {
        Self {
            mappings,
            standards,
            policy,
        }
    }

    /// Loads the field mapping file and uses the built-in standards and default policy.
    pub fn from_mapping_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            mappings: FieldMappings::from_path(path)?,
            ..Self::default()
        })
    }

    pub fn with_policy(mut self, policy: CreditPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_standards(mut self, standards: StandardsTable) -> Self {
        self.standards = standards;
        self
    }
}
