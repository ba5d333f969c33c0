//! Data Transfer Objects

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashSet;

use crate::domain::events::AUTO_ASSIGNED;
use crate::domain::value_objects::{AgentId, TicketId};
use crate::error::DispatchError;

/// Options for a single `assign` call
#[derive(Clone, Debug)]
pub struct AssignOptions {
    /// Agents that must not receive the ticket
    pub exclude: HashSet<AgentId>,
    /// Audit action recorded when the assignment changes
    pub reason: String,
    /// Extra audit context
    pub meta: Map<String, Value>,
}

impl Default for AssignOptions {
    fn default() -> Self {
        Self {
            exclude: HashSet::new(),
            reason: AUTO_ASSIGNED.to_string(),
            meta: Map::new(),
        }
    }
}

impl AssignOptions {
    pub fn excluding(mut self, agent: AgentId) -> Self {
        self.exclude.insert(agent);
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AssignmentResult {
    pub changed: bool,
    pub agent: Option<AgentId>,
    pub reason: String,
}

impl AssignmentResult {
    pub(crate) fn unchanged(agent: Option<AgentId>, reason: &str) -> Self {
        Self { changed: false, agent, reason: reason.to_string() }
    }

    pub(crate) fn changed(agent: AgentId, reason: &str) -> Self {
        Self { changed: true, agent: Some(agent), reason: reason.to_string() }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct TicketFailure {
    pub ticket_id: TicketId,
    pub kind: &'static str,
    pub error: String,
}

impl TicketFailure {
    pub fn new(ticket_id: TicketId, error: &DispatchError) -> Self {
        Self { ticket_id, kind: error.kind(), error: error.to_string() }
    }
}

/// Outcome of one SLA scan
#[derive(Clone, Debug, Serialize)]
pub struct TickReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub scanned: usize,
    pub escalated: usize,
    pub reassigned: usize,
    pub failures: Vec<TicketFailure>,
    /// Set when the SLA override was unusable and defaults were applied
    pub configuration_error: Option<String>,
    /// Set when the ticket list itself could not be read
    pub scan_error: Option<String>,
}

impl TickReport {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            finished_at: started_at,
            scanned: 0,
            escalated: 0,
            reassigned: 0,
            failures: Vec::new(),
            configuration_error: None,
            scan_error: None,
        }
    }

    /// Whether operators should hear about this tick
    pub fn needs_attention(&self) -> bool {
        !self.failures.is_empty() || self.configuration_error.is_some() || self.scan_error.is_some()
    }
}
