//! Ticket priority and rule priority matchers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ticket priority, ordered `Low < Medium < High`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!("unknown priority: {other}")),
        }
    }
}

/// Priority condition of an assignment rule.
///
/// Serialized as the priority name, or `null` for a wildcard.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<Priority>", into = "Option<Priority>")]
pub enum RulePriority {
    Specific(Priority),
    Wildcard,
}

impl Default for RulePriority {
    fn default() -> Self {
        Self::Wildcard
    }
}

impl RulePriority {
    pub fn matches(&self, priority: Priority) -> bool {
        match self {
            Self::Wildcard => true,
            Self::Specific(p) => *p == priority,
        }
    }
}

impl From<Option<Priority>> for RulePriority {
    fn from(value: Option<Priority>) -> Self {
        match value {
            Some(p) => Self::Specific(p),
            None => Self::Wildcard,
        }
    }
}

impl From<RulePriority> for Option<Priority> {
    fn from(value: RulePriority) -> Self {
        match value {
            RulePriority::Specific(p) => Some(p),
            RulePriority::Wildcard => None,
        }
    }
}

impl fmt::Display for RulePriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Specific(p) => p.fmt(f),
            Self::Wildcard => f.write_str("*"),
        }
    }
}
