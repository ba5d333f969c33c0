//! Inbound ports (Use case traits)
//!
//! Hexagonal architecture: what ticket handlers and the scheduler call.

use async_trait::async_trait;

use crate::application::dto::{AssignOptions, AssignmentResult, TickReport};
use crate::domain::value_objects::TicketId;
use crate::error::Result;

/// Ticket assignment use cases
#[async_trait]
pub trait AssignmentUseCases: Send + Sync {
    /// Assign a ticket by the active rules
    async fn assign(&self, ticket_id: &TicketId, options: AssignOptions) -> Result<AssignmentResult>;
}

/// SLA enforcement use cases
#[async_trait]
pub trait SlaUseCases: Send + Sync {
    /// Scan unresolved tickets once. Never fails; problems land in the report.
    async fn tick(&self) -> TickReport;
}
