//! Outbound ports
//!
//! Hexagonal architecture: the collaborators dispatch depends on. Ticket and
//! audit storage, the rule list, the agent directory and the dynamic
//! settings store are owned by the wider support platform.

use async_trait::async_trait;
use serde_json::Value;

use crate::application::dto::TickReport;
use crate::domain::aggregates::{Agent, AssignmentRule, Ticket};
use crate::domain::events::{AuditKind, AuditRecord, TicketEvent};
use crate::domain::value_objects::{AgentId, TicketId};

/// Repository result type
pub type RepoResult<T> = Result<T, RepositoryError>;

/// Repository errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("storage error: {0}")]
    Storage(String),
}

/// A ticket mutation together with the audit record that explains it.
///
/// Repositories commit both or neither. The ticket still carries the
/// version it was loaded at; a stored version that differs means another
/// writer got there first.
#[derive(Clone, Debug)]
pub struct TicketChange {
    pub ticket: Ticket,
    pub audit: AuditRecord,
}

impl TicketChange {
    pub fn new(ticket: Ticket, audit: AuditRecord) -> Self {
        Self { ticket, audit }
    }

    pub fn expected_version(&self) -> u64 {
        self.ticket.version()
    }
}

/// Ticket repository port
#[async_trait]
pub trait TicketRepository: Send + Sync {
    /// Load a ticket by ID
    async fn load(&self, id: &TicketId) -> RepoResult<Option<Ticket>>;

    /// All open or pending tickets
    async fn list_unresolved(&self) -> RepoResult<Vec<Ticket>>;

    /// Atomically store the ticket and append its audit record, failing
    /// with `Conflict` on a version mismatch
    async fn commit(&self, change: TicketChange) -> RepoResult<Ticket>;
}

/// Read side of the append-only audit log
#[async_trait]
pub trait AuditTrail: Send + Sync {
    /// Most recent record of a kind
    async fn latest(&self, ticket_id: &TicketId, kind: AuditKind) -> RepoResult<Option<AuditRecord>>;
}

/// Assignment rule port
#[async_trait]
pub trait RuleRepository: Send + Sync {
    /// Active rules by ascending position, insertion order on ties. Never cached.
    async fn list_active(&self) -> RepoResult<Vec<AssignmentRule>>;
}

/// Agent directory port
#[async_trait]
pub trait AgentDirectory: Send + Sync {
    async fn find(&self, id: &AgentId) -> RepoResult<Option<Agent>>;
}

/// Administrator-editable settings
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get(&self, key: &str) -> RepoResult<Option<Value>>;
}

/// Notification dispatch port. Called fire-and-forget.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, event: TicketEvent) -> Result<(), NotificationError>;
}

/// Operator alerting port for tick failures
#[async_trait]
pub trait AlertChannel: Send + Sync {
    async fn report(&self, report: &TickReport) -> Result<(), NotificationError>;
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum NotificationError {
    #[error("delivery failed: {0}")]
    DeliveryFailed(String),
    #[error("channel closed")]
    ChannelClosed,
}
