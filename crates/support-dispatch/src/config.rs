//! Dispatch configuration
//!
//! Static process configuration, read once at startup from JSON. The SLA
//! section is the baseline that the administrator override is merged over.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::aggregates::{Agent, AssignmentRule, Ticket};
use crate::domain::value_objects::{SlaConfiguration, SlaDuration};
use crate::error::DispatchError;

/// Dispatch configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DispatchConfig {
    /// Time between SLA scans
    pub tick_interval: SlaDuration,
    /// Process defaults for SLA thresholds
    pub sla: SlaConfiguration,
    /// Initial state for the in-memory adapters
    pub seed: SeedData,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            tick_interval: SlaDuration::of_minutes(15),
            sla: SlaConfiguration::default(),
            seed: SeedData::default(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SeedData {
    pub agents: Vec<Agent>,
    pub rules: Vec<AssignmentRule>,
    pub tickets: Vec<Ticket>,
    /// Stored under the SLA settings key as if an administrator saved it
    pub sla_override: Option<Value>,
}

impl DispatchConfig {
    /// Load from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DispatchError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| DispatchError::Configuration(format!("cannot read {}: {e}", path.display())))?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, DispatchError> {
        let config: Self = serde_json::from_str(content)
            .map_err(|e| DispatchError::Configuration(format!("invalid dispatch config: {e}")))?;
        config.sla.validate()?;
        Ok(config)
    }
}
