//! Domain module
//!
//! Contains all dispatch logic that does not touch storage.

pub mod aggregates;
pub mod events;
pub mod services;
pub mod value_objects;

pub use aggregates::*;
pub use events::*;
pub use value_objects::*;
