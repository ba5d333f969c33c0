//! SLA configuration merge and threshold checks

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::domain::aggregates::Ticket;
use crate::domain::value_objects::{AgentId, EscalationPolicy, SlaConfiguration, SlaDuration};
use crate::error::DispatchError;

/// Deep-merge an override document onto the defaults.
///
/// Only the leaves present in `overrides` replace default values; a `null`
/// leaf removes the entry (disabling that threshold). The merged result is
/// validated before it is returned.
pub fn resolve(defaults: &SlaConfiguration, overrides: Option<&Value>) -> Result<SlaConfiguration, DispatchError> {
    let overrides = match overrides {
        None | Some(Value::Null) => return Ok(defaults.clone()),
        Some(value) if value.is_object() => value,
        Some(other) => {
            return Err(DispatchError::Configuration(format!(
                "SLA override must be an object, got {other}"
            )))
        }
    };

    let mut merged = serde_json::to_value(defaults)
        .map_err(|e| DispatchError::Configuration(e.to_string()))?;
    merge_values(&mut merged, overrides);

    let config: SlaConfiguration = serde_json::from_value(merged)
        .map_err(|e| DispatchError::Configuration(e.to_string()))?;
    config.validate()?;
    Ok(config)
}

fn merge_values(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                if value.is_null() {
                    base.remove(key);
                } else {
                    merge_values(base.entry(key.clone()).or_insert(Value::Null), value);
                }
            }
        }
        (base, overlay) => *base = overlay.clone(),
    }
}

pub fn threshold_elapsed(baseline: DateTime<Utc>, threshold: SlaDuration, now: DateTime<Utc>) -> bool {
    now.signed_duration_since(baseline) >= threshold.as_chrono()
}

/// Escalation policy to apply now, if the ticket has sat at its priority
/// for at least the configured time since `baseline`.
pub fn due_escalation(
    ticket: &Ticket,
    config: &SlaConfiguration,
    baseline: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Option<EscalationPolicy> {
    if !ticket.is_unresolved() {
        return None;
    }
    config
        .escalation_for(ticket.priority())
        .filter(|policy| threshold_elapsed(baseline, policy.after, now))
        .copied()
}

/// Current assignee and threshold, if the ticket is overdue for reassignment.
pub fn due_reassignment(
    ticket: &Ticket,
    config: &SlaConfiguration,
    last_assigned: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Option<(AgentId, SlaDuration)> {
    if !ticket.is_unresolved() {
        return None;
    }
    let current = ticket.assigned_to()?;
    config
        .reassign_threshold(ticket.priority())
        .filter(|threshold| threshold_elapsed(last_assigned, *threshold, now))
        .map(|threshold| (current.clone(), threshold))
}
