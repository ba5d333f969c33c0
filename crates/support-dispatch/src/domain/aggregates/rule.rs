//! Assignment rule entity

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{AgentId, Priority, RulePriority};

/// Maps tickets of a priority (or any priority) to an agent.
///
/// Active rules are evaluated by ascending `position`; the first match wins.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentRule {
    pub id: String,
    #[serde(default)]
    pub priority: RulePriority,
    pub assigned_to: AgentId,
    #[serde(default)]
    pub position: i32,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl AssignmentRule {
    pub fn new(id: impl Into<String>, priority: RulePriority, assigned_to: AgentId, position: i32) -> Self {
        Self { id: id.into(), priority, assigned_to, position, active: true }
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn matches(&self, priority: Priority) -> bool {
        self.active && self.priority.matches(priority)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inactive_rule_never_matches() {
        let rule = AssignmentRule::new("r1", RulePriority::Wildcard, AgentId::new("a").unwrap(), 0);
        assert!(rule.matches(Priority::Low));
        assert!(!rule.inactive().matches(Priority::Low));
    }

    #[test]
    fn test_deserialize_defaults() {
        let rule: AssignmentRule = serde_json::from_value(serde_json::json!({
            "id": "r9",
            "assigned_to": "carol",
        }))
        .unwrap();
        assert_eq!(rule.priority, RulePriority::Wildcard);
        assert!(rule.active);
        assert_eq!(rule.position, 0);
    }
}
