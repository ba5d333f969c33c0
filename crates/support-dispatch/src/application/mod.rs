//! Application layer
//!
//! Use case implementations over the outbound ports.

pub mod dto;
pub mod engine;
pub mod monitor;
pub(crate) mod notifications;
pub mod resolver;
pub mod scheduler;

pub use dto::{AssignOptions, AssignmentResult, TickReport, TicketFailure};
pub use engine::{AssignmentEngine, MAX_COMMIT_ATTEMPTS};
pub use monitor::SlaMonitor;
pub use resolver::{ResolvedSla, SlaConfigResolver, SLA_SETTINGS_KEY};
pub use scheduler::SlaScheduler;
