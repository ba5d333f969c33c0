//! OpenSASE Support Dispatch
//!
//! Ticket auto-assignment and SLA escalation engine for the self-hosted
//! support platform.
//!
//! ## Architecture
//!
//! - **Domain Layer**: tickets, assignment rules, audit records and the pure
//!   decision services (rule matching, SLA merge and threshold checks)
//! - **Application Layer**: the assignment engine, SLA monitor and scheduler
//! - **Ports Layer**: hexagonal interfaces for persistence, settings,
//!   notifications and operator alerts
//! - **Infrastructure Layer**: in-memory adapters
//!
//! ## Flow
//!
//! Ticket creation calls [`AssignmentEngine::assign`] directly. A periodic
//! [`SlaScheduler`] drives [`SlaUseCases::tick`], which escalates stale
//! tickets and hands overdue ones back to the engine for reassignment.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod ports;

// Re-exports for convenience
pub use application::{
    AssignOptions, AssignmentEngine, AssignmentResult, ResolvedSla, SlaConfigResolver, SlaMonitor,
    SlaScheduler, TickReport, TicketFailure, SLA_SETTINGS_KEY,
};
pub use config::{DispatchConfig, SeedData};
pub use domain::aggregates::{Agent, AssignmentRule, Ticket, TicketError, TicketStatus};
pub use domain::events::{AuditKind, AuditRecord, TicketEvent};
pub use domain::services::{decide, resolve, AssignmentDecision};
pub use domain::value_objects::{
    AgentId, EscalationPolicy, Priority, RulePriority, SlaConfiguration, SlaDuration, TicketId,
};
pub use error::{DispatchError, Result};
pub use ports::inbound::{AssignmentUseCases, SlaUseCases};
pub use ports::outbound::{
    AgentDirectory, AlertChannel, AuditTrail, NotificationError, Notifier, RepositoryError,
    RuleRepository, SettingsStore, TicketChange, TicketRepository,
};
