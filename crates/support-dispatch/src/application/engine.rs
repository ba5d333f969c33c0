//! Assignment engine
//!
//! Loads a ticket, evaluates the active rules with [`decide`], and commits
//! the new assignee together with its audit record. Concurrent callers are
//! serialized by the repository's version check: a caller that loses the
//! race reloads, sees the winner's assignee and returns a no-op.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::application::dto::{AssignOptions, AssignmentResult};
use crate::application::notifications;
use crate::domain::aggregates::AssignmentRule;
use crate::domain::events::{AuditKind, AuditRecord, TicketEvent};
use crate::domain::services::{decide, AssignmentDecision};
use crate::domain::value_objects::{AgentId, TicketId};
use crate::error::{DispatchError, Result};
use crate::ports::inbound::AssignmentUseCases;
use crate::ports::outbound::{
    AgentDirectory, Notifier, RepositoryError, RuleRepository, TicketChange, TicketRepository,
};

/// Attempts per call before a version conflict is surfaced.
pub const MAX_COMMIT_ATTEMPTS: u32 = 3;

pub struct AssignmentEngine {
    tickets: Arc<dyn TicketRepository>,
    rules: Arc<dyn RuleRepository>,
    agents: Arc<dyn AgentDirectory>,
    notifier: Arc<dyn Notifier>,
}

impl AssignmentEngine {
    pub fn new(
        tickets: Arc<dyn TicketRepository>,
        rules: Arc<dyn RuleRepository>,
        agents: Arc<dyn AgentDirectory>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self { tickets, rules, agents, notifier }
    }

    /// Active rules whose agent exists and is active. Rules pointing at
    /// anyone else are skipped as if they did not match.
    async fn resolvable_rules(&self) -> Result<Vec<AssignmentRule>> {
        let rules = self.rules.list_active().await?;
        let mut available: HashMap<AgentId, bool> = HashMap::new();
        let mut resolvable = Vec::with_capacity(rules.len());

        for rule in rules {
            let ok = match available.get(&rule.assigned_to) {
                Some(ok) => *ok,
                None => {
                    let ok = self
                        .agents
                        .find(&rule.assigned_to)
                        .await?
                        .is_some_and(|agent| agent.can_take_tickets());
                    available.insert(rule.assigned_to.clone(), ok);
                    ok
                }
            };
            if ok {
                resolvable.push(rule);
            } else {
                warn!(
                    rule_id = %rule.id,
                    agent = %rule.assigned_to,
                    "Skipping assignment rule for unknown or inactive agent"
                );
            }
        }
        Ok(resolvable)
    }

    pub async fn assign(&self, ticket_id: &TicketId, options: AssignOptions) -> Result<AssignmentResult> {
        let mut attempt = 0;
        loop {
            attempt += 1;

            let mut ticket = self
                .tickets
                .load(ticket_id)
                .await?
                .ok_or_else(|| DispatchError::Validation(format!("unknown ticket {ticket_id}")))?;
            ticket.ensure_assignable()?;

            let rules = self.resolvable_rules().await?;
            let (from, to, rule_id, rule_position) = match decide(&ticket, &rules, &options.exclude) {
                AssignmentDecision::NoMatch => {
                    debug!(ticket_id = %ticket_id, priority = %ticket.priority(), "No assignment rule matched");
                    return Ok(AssignmentResult::unchanged(None, &options.reason));
                }
                AssignmentDecision::Unchanged { agent } => {
                    debug!(ticket_id = %ticket_id, agent = %agent, "Ticket already with matching agent");
                    return Ok(AssignmentResult::unchanged(Some(agent), &options.reason));
                }
                AssignmentDecision::Assign { from, to, rule_id, rule_position } => (from, to, rule_id, rule_position),
            };

            let mut meta = options.meta.clone();
            meta.insert("from".into(), from.as_ref().map_or(Value::Null, |a| a.as_str().into()));
            meta.insert("to".into(), to.as_str().into());
            meta.insert("rule_id".into(), rule_id.into());
            meta.insert("rule_position".into(), rule_position.into());

            ticket.assign(to.clone())?;
            let audit = AuditRecord::new(ticket_id.clone(), AuditKind::Assignment, options.reason.clone(), meta, Utc::now());

            match self.tickets.commit(TicketChange::new(ticket, audit)).await {
                Ok(_) => {
                    info!(
                        ticket_id = %ticket_id,
                        from = from.as_ref().map(|a| a.as_str()).unwrap_or("-"),
                        to = %to,
                        reason = %options.reason,
                        "Ticket assigned"
                    );
                    notifications::dispatch(
                        &self.notifier,
                        TicketEvent::Assigned {
                            ticket_id: ticket_id.clone(),
                            from,
                            to: to.clone(),
                            reason: options.reason.clone(),
                        },
                    );
                    return Ok(AssignmentResult::changed(to, &options.reason));
                }
                Err(RepositoryError::Conflict(detail)) if attempt < MAX_COMMIT_ATTEMPTS => {
                    debug!(ticket_id = %ticket_id, attempt, detail = %detail, "Ticket changed concurrently, re-evaluating");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

#[async_trait]
impl AssignmentUseCases for AssignmentEngine {
    async fn assign(&self, ticket_id: &TicketId, options: AssignOptions) -> Result<AssignmentResult> {
        AssignmentEngine::assign(self, ticket_id, options).await
    }
}
