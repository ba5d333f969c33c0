//! Agent entity
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::AgentId;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool { true }

impl Agent {
    pub fn new(id: AgentId, name: impl Into<String>) -> Self {
        Self { id, name: name.into(), active: true }
    }
    pub fn deactivate(&mut self) { self.active = false; }
    /// Deactivated agents are treated as if they no longer exist.
    pub fn can_take_tickets(&self) -> bool { self.active }
}
