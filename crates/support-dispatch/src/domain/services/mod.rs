//! Domain services module

pub mod assignment;
pub mod sla;

pub use assignment::{decide, AssignmentDecision};
pub use sla::{due_escalation, due_reassignment, resolve, threshold_elapsed};
