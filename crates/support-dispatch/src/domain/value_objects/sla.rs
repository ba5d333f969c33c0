//! SLA thresholds

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Priority, SlaDuration};
use crate::error::DispatchError;

/// Raise a ticket to `to` once it has sat at its current priority for `after`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EscalationPolicy {
    pub after: SlaDuration,
    pub to: Priority,
}

/// Effective escalation and reassignment thresholds, keyed by priority.
///
/// A priority with no entry is never escalated (or never reassigned).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SlaConfiguration {
    #[serde(default)]
    pub priority_escalations: BTreeMap<Priority, EscalationPolicy>,
    #[serde(default)]
    pub reassign_after: BTreeMap<Priority, SlaDuration>,
}

impl SlaConfiguration {
    pub fn escalation_for(&self, priority: Priority) -> Option<&EscalationPolicy> {
        self.priority_escalations.get(&priority)
    }

    pub fn reassign_threshold(&self, priority: Priority) -> Option<SlaDuration> {
        self.reassign_after.get(&priority).copied()
    }

    /// Escalation targets must rank strictly above their source, so a ticket
    /// can never be escalated in a loop.
    pub fn validate(&self) -> Result<(), DispatchError> {
        for (from, policy) in &self.priority_escalations {
            if policy.to <= *from {
                return Err(DispatchError::Configuration(format!(
                    "priority_escalations.{from}.to must rank above {from}, got {}",
                    policy.to
                )));
            }
        }
        Ok(())
    }
}

impl Default for SlaConfiguration {
    fn default() -> Self {
        let hours = SlaDuration::of_hours;
        Self {
            priority_escalations: BTreeMap::from([
                (Priority::Low, EscalationPolicy { after: hours(72), to: Priority::High }),
                (Priority::Medium, EscalationPolicy { after: hours(24), to: Priority::High }),
            ]),
            reassign_after: BTreeMap::from([
                (Priority::High, hours(4)),
                (Priority::Medium, hours(12)),
                (Priority::Low, hours(24)),
            ]),
        }
    }
}
