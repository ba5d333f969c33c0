//! Dispatch audit records and notification events

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::domain::value_objects::{AgentId, Priority, TicketId};

pub const AUTO_ASSIGNED: &str = "auto_assigned";
pub const SLA_REASSIGNED: &str = "sla_reassigned";
pub const SLA_ESCALATED: &str = "sla_escalated";

/// What an audit record changed. SLA baselines are read back by kind, so a
/// custom assignment reason still resets the reassignment clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditKind {
    Assignment,
    Escalation,
}

/// Immutable log entry for one dispatch decision.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: Uuid,
    pub ticket_id: TicketId,
    pub kind: AuditKind,
    pub action: String,
    pub meta: Map<String, Value>,
    pub timestamp: DateTime<Utc>,
}

impl AuditRecord {
    pub fn new(
        ticket_id: TicketId,
        kind: AuditKind,
        action: impl Into<String>,
        meta: Map<String, Value>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self { id: Uuid::new_v4(), ticket_id, kind, action: action.into(), meta, timestamp }
    }
}

/// Raised after a committed change, for stakeholder notification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TicketEvent {
    Assigned {
        ticket_id: TicketId,
        from: Option<AgentId>,
        to: AgentId,
        reason: String,
    },
    Escalated {
        ticket_id: TicketId,
        from: Priority,
        to: Priority,
    },
}

impl TicketEvent {
    pub fn ticket_id(&self) -> &TicketId {
        match self {
            Self::Assigned { ticket_id, .. } | Self::Escalated { ticket_id, .. } => ticket_id,
        }
    }
}
