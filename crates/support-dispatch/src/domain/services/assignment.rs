//! Rule evaluation
//!
//! Pure: picks an agent for a ticket from a rule list without touching
//! storage. The engine applies the result.

use std::collections::HashSet;

use crate::domain::aggregates::{AssignmentRule, Ticket};
use crate::domain::value_objects::AgentId;

/// Outcome of evaluating the rules against one ticket.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AssignmentDecision {
    /// No active, non-excluded rule matches the ticket priority.
    NoMatch,
    /// The winning rule targets the current assignee.
    Unchanged { agent: AgentId },
    /// The ticket moves to a new agent.
    Assign {
        from: Option<AgentId>,
        to: AgentId,
        rule_id: String,
        rule_position: i32,
    },
}

impl AssignmentDecision {
    pub fn agent(&self) -> Option<&AgentId> {
        match self {
            Self::NoMatch => None,
            Self::Unchanged { agent } => Some(agent),
            Self::Assign { to, .. } => Some(to),
        }
    }

    pub fn is_change(&self) -> bool {
        matches!(self, Self::Assign { .. })
    }
}

/// First active rule by ascending position (ties keep input order) whose
/// priority matches and whose agent is not excluded.
pub fn decide(ticket: &Ticket, rules: &[AssignmentRule], exclude: &HashSet<AgentId>) -> AssignmentDecision {
    let mut candidates: Vec<&AssignmentRule> = rules
        .iter()
        .filter(|rule| rule.matches(ticket.priority()))
        .collect();
    candidates.sort_by_key(|rule| rule.position);

    let Some(winner) = candidates
        .into_iter()
        .find(|rule| !exclude.contains(&rule.assigned_to))
    else {
        return AssignmentDecision::NoMatch;
    };

    if ticket.assigned_to() == Some(&winner.assigned_to) {
        return AssignmentDecision::Unchanged { agent: winner.assigned_to.clone() };
    }

    AssignmentDecision::Assign {
        from: ticket.assigned_to().cloned(),
        to: winner.assigned_to.clone(),
        rule_id: winner.id.clone(),
        rule_position: winner.position,
    }
}
