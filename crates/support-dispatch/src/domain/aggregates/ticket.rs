//! Ticket Aggregate
//!
//! The dispatch view of a support ticket. The ticketing subsystem owns the
//! record; dispatch only ever changes the assignee and the priority.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{AgentId, Priority, TicketId};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    id: TicketId,
    #[serde(default)]
    subject: String,
    #[serde(default)]
    priority: Priority,
    #[serde(default)]
    status: TicketStatus,
    #[serde(default)]
    assigned_to: Option<AgentId>,
    created_at: DateTime<Utc>,
    /// Optimistic concurrency counter, owned by persistence.
    #[serde(default)]
    version: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    #[default]
    Open,
    Pending,
    Resolved,
    Closed,
}

impl TicketStatus {
    pub fn is_unresolved(&self) -> bool {
        matches!(self, Self::Open | Self::Pending)
    }
}

impl Ticket {
    pub fn open(id: TicketId, subject: impl Into<String>, priority: Priority) -> Self {
        Self {
            id,
            subject: subject.into(),
            priority,
            status: TicketStatus::Open,
            assigned_to: None,
            created_at: Utc::now(),
            version: 0,
        }
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn with_assignee(mut self, agent: AgentId) -> Self {
        self.assigned_to = Some(agent);
        self
    }

    pub fn with_status(mut self, status: TicketStatus) -> Self {
        self.status = status;
        self
    }

    /// Used by repositories when storing a committed change.
    pub fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    pub fn id(&self) -> &TicketId { &self.id }
    pub fn subject(&self) -> &str { &self.subject }
    pub fn priority(&self) -> Priority { self.priority }
    pub fn status(&self) -> TicketStatus { self.status }
    pub fn assigned_to(&self) -> Option<&AgentId> { self.assigned_to.as_ref() }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }
    pub fn version(&self) -> u64 { self.version }
    pub fn is_unresolved(&self) -> bool { self.status.is_unresolved() }

    pub fn ensure_assignable(&self) -> Result<(), TicketError> {
        if self.is_unresolved() {
            Ok(())
        } else {
            Err(TicketError::Resolved(self.id.clone()))
        }
    }

    /// Replace the assignee, returning the previous one.
    pub fn assign(&mut self, agent: AgentId) -> Result<Option<AgentId>, TicketError> {
        self.ensure_assignable()?;
        Ok(self.assigned_to.replace(agent))
    }

    /// Raise the priority, returning the previous one.
    pub fn escalate(&mut self, to: Priority) -> Result<Priority, TicketError> {
        self.ensure_assignable()?;
        if to <= self.priority {
            return Err(TicketError::NotAnEscalation { from: self.priority, to });
        }
        Ok(std::mem::replace(&mut self.priority, to))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TicketError {
    #[error("ticket {0} is already resolved")]
    Resolved(TicketId),
    #[error("cannot escalate from {from} to {to}")]
    NotAnEscalation { from: Priority, to: Priority },
}
