//! Aggregates
pub mod agent;
pub mod rule;
pub mod ticket;
pub use agent::Agent;
pub use rule::AssignmentRule;
pub use ticket::{Ticket, TicketError, TicketStatus};
