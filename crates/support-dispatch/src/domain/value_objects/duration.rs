//! Human-readable SLA durations ("6 hours", "30 minutes", "2d")

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;
const WEEK: i64 = 7 * DAY;

/// A strictly positive whole-second duration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SlaDuration {
    seconds: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid duration {input:?}: {reason}")]
pub struct DurationParseError {
    input: String,
    reason: &'static str,
}

impl SlaDuration {
    pub fn from_seconds(seconds: i64) -> Option<Self> {
        // bound keeps chrono conversions infallible
        (seconds > 0 && seconds <= 100 * 365 * DAY).then_some(Self { seconds })
    }

    /// For positive literals only.
    pub(crate) const fn of_hours(n: u16) -> Self {
        Self { seconds: n as i64 * HOUR }
    }

    pub(crate) const fn of_minutes(n: u16) -> Self {
        Self { seconds: n as i64 * MINUTE }
    }

    pub fn minutes(n: i64) -> Option<Self> {
        n.checked_mul(MINUTE).and_then(Self::from_seconds)
    }

    pub fn hours(n: i64) -> Option<Self> {
        n.checked_mul(HOUR).and_then(Self::from_seconds)
    }

    pub fn days(n: i64) -> Option<Self> {
        n.checked_mul(DAY).and_then(Self::from_seconds)
    }

    pub fn as_seconds(&self) -> i64 {
        self.seconds
    }

    pub fn as_chrono(&self) -> Duration {
        Duration::seconds(self.seconds)
    }

    pub fn as_std(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.seconds.unsigned_abs())
    }
}

impl FromStr for SlaDuration {
    type Err = DurationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fail = |reason| DurationParseError { input: s.to_string(), reason };

        let trimmed = s.trim();
        let split = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        let (digits, unit) = trimmed.split_at(split);
        if digits.is_empty() {
            return Err(fail("missing amount"));
        }
        let amount: i64 = digits.parse().map_err(|_| fail("amount out of range"))?;

        let unit_seconds = match unit.trim().to_ascii_lowercase().as_str() {
            "s" | "sec" | "secs" | "second" | "seconds" => 1,
            "m" | "min" | "mins" | "minute" | "minutes" => MINUTE,
            "h" | "hr" | "hrs" | "hour" | "hours" => HOUR,
            "d" | "day" | "days" => DAY,
            "w" | "week" | "weeks" => WEEK,
            "" => return Err(fail("missing unit")),
            _ => return Err(fail("unknown unit")),
        };

        amount
            .checked_mul(unit_seconds)
            .and_then(Self::from_seconds)
            .ok_or_else(|| fail("must be positive and under 100 years"))
    }
}

impl fmt::Display for SlaDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (amount, unit) = [(WEEK, "week"), (DAY, "day"), (HOUR, "hour"), (MINUTE, "minute")]
            .into_iter()
            .find(|(size, _)| self.seconds % size == 0)
            .map(|(size, unit)| (self.seconds / size, unit))
            .unwrap_or((self.seconds, "second"));
        let plural = if amount == 1 { "" } else { "s" };
        write!(f, "{amount} {unit}{plural}")
    }
}

impl TryFrom<String> for SlaDuration {
    type Error = DurationParseError;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SlaDuration> for String {
    fn from(value: SlaDuration) -> Self {
        value.to_string()
    }
}
