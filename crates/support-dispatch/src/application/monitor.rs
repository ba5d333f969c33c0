//! SLA monitor
//!
//! One `tick` scans every unresolved ticket. It escalates priority once a
//! ticket has sat at its current priority past the configured threshold, and
//! hands tickets that stayed with one agent too long back to the assignment
//! engine with that agent excluded.
//!
//! Escalation is measured from the latest `sla_escalated` record, falling
//! back to ticket creation, so every escalation level restarts the clock.
//! Reassignment is measured from the latest assignment record the same way.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};

use crate::application::dto::{AssignOptions, TickReport, TicketFailure};
use crate::application::engine::MAX_COMMIT_ATTEMPTS;
use crate::application::notifications;
use crate::application::resolver::{ResolvedSla, SlaConfigResolver};
use crate::domain::aggregates::Ticket;
use crate::domain::events::{AuditKind, AuditRecord, TicketEvent, SLA_ESCALATED, SLA_REASSIGNED};
use crate::domain::services::{due_escalation, due_reassignment};
use crate::domain::value_objects::SlaConfiguration;
use crate::error::{DispatchError, Result};
use crate::ports::inbound::{AssignmentUseCases, SlaUseCases};
use crate::ports::outbound::{
    AlertChannel, AuditTrail, Notifier, RepositoryError, TicketChange, TicketRepository,
};

pub struct SlaMonitor {
    tickets: Arc<dyn TicketRepository>,
    audit: Arc<dyn AuditTrail>,
    resolver: SlaConfigResolver,
    assignments: Arc<dyn AssignmentUseCases>,
    notifier: Arc<dyn Notifier>,
    alerts: Arc<dyn AlertChannel>,
}

impl SlaMonitor {
    pub fn new(
        tickets: Arc<dyn TicketRepository>,
        audit: Arc<dyn AuditTrail>,
        resolver: SlaConfigResolver,
        assignments: Arc<dyn AssignmentUseCases>,
        notifier: Arc<dyn Notifier>,
        alerts: Arc<dyn AlertChannel>,
    ) -> Self {
        Self { tickets, audit, resolver, assignments, notifier, alerts }
    }

    /// Run one scan as of `now`.
    pub async fn tick_at(&self, now: DateTime<Utc>) -> TickReport {
        let mut report = TickReport::new(now);
        let ResolvedSla { configuration, error: config_error } = self.resolver.resolve().await;
        report.configuration_error = config_error.map(|e| e.to_string());

        match self.tickets.list_unresolved().await {
            Ok(tickets) => {
                for ticket in tickets {
                    report.scanned += 1;
                    let ticket_id = ticket.id().clone();
                    if let Err(e) = self.process(ticket, &configuration, now, &mut report).await {
                        warn!(ticket_id = %ticket_id, kind = e.kind(), error = %e, "SLA processing failed for ticket");
                        report.failures.push(TicketFailure::new(ticket_id, &e));
                    }
                }
            }
            Err(e) => {
                error!(error = %e, "Could not list unresolved tickets");
                report.scan_error = Some(e.to_string());
            }
        }

        report.finished_at = Utc::now();
        info!(
            scanned = report.scanned,
            escalated = report.escalated,
            reassigned = report.reassigned,
            failures = report.failures.len(),
            "SLA tick complete"
        );

        if report.needs_attention() {
            if let Err(e) = self.alerts.report(&report).await {
                error!(error = %e, "Failed to deliver SLA tick alert");
            }
        }
        report
    }

    /// Counts each committed step as it lands, so a later failure does not
    /// hide an earlier escalation.
    async fn process(
        &self,
        ticket: Ticket,
        sla: &SlaConfiguration,
        now: DateTime<Utc>,
        report: &mut TickReport,
    ) -> Result<()> {
        let (ticket, escalated) = self.escalate_if_due(ticket, sla, now).await?;
        report.escalated += usize::from(escalated);
        let reassigned = self.reassign_if_due(&ticket, sla, now).await?;
        report.reassigned += usize::from(reassigned);
        Ok(())
    }

    async fn baseline(&self, ticket: &Ticket, kind: AuditKind) -> Result<DateTime<Utc>> {
        Ok(self
            .audit
            .latest(ticket.id(), kind)
            .await?
            .map(|record| record.timestamp)
            .unwrap_or_else(|| ticket.created_at()))
    }

    /// Returns the ticket as it now stands and whether it was escalated.
    async fn escalate_if_due(
        &self,
        mut ticket: Ticket,
        sla: &SlaConfiguration,
        now: DateTime<Utc>,
    ) -> Result<(Ticket, bool)> {
        let mut attempt = 0;
        loop {
            attempt += 1;

            let baseline = self.baseline(&ticket, AuditKind::Escalation).await?;
            let Some(policy) = due_escalation(&ticket, sla, baseline, now) else {
                return Ok((ticket, false));
            };

            let mut escalated = ticket.clone();
            let from = escalated.escalate(policy.to)?;
            let mut meta = Map::new();
            meta.insert("from".into(), from.as_str().into());
            meta.insert("to".into(), policy.to.as_str().into());
            meta.insert("threshold".into(), policy.after.to_string().into());
            let audit = AuditRecord::new(ticket.id().clone(), AuditKind::Escalation, SLA_ESCALATED, meta, now);

            match self.tickets.commit(TicketChange::new(escalated, audit)).await {
                Ok(stored) => {
                    info!(ticket_id = %stored.id(), from = %from, to = %policy.to, "Ticket escalated");
                    notifications::dispatch(
                        &self.notifier,
                        TicketEvent::Escalated { ticket_id: stored.id().clone(), from, to: policy.to },
                    );
                    return Ok((stored, true));
                }
                Err(RepositoryError::Conflict(detail)) if attempt < MAX_COMMIT_ATTEMPTS => {
                    debug!(ticket_id = %ticket.id(), attempt, detail = %detail, "Ticket changed concurrently, re-checking escalation");
                    ticket = self
                        .tickets
                        .load(ticket.id())
                        .await?
                        .ok_or_else(|| DispatchError::Validation(format!("ticket {} disappeared", ticket.id())))?;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    async fn reassign_if_due(&self, ticket: &Ticket, sla: &SlaConfiguration, now: DateTime<Utc>) -> Result<bool> {
        let last_assigned = self.baseline(ticket, AuditKind::Assignment).await?;
        let Some((current, threshold)) = due_reassignment(ticket, sla, last_assigned, now) else {
            return Ok(false);
        };

        let options = AssignOptions::default()
            .excluding(current.clone())
            .with_reason(SLA_REASSIGNED)
            .with_meta("threshold", Value::from(threshold.to_string()));
        let result = self.assignments.assign(ticket.id(), options).await?;

        if !result.changed {
            debug!(ticket_id = %ticket.id(), agent = %current, "Overdue ticket has no other eligible agent");
        }
        Ok(result.changed)
    }
}

#[async_trait]
impl SlaUseCases for SlaMonitor {
    async fn tick(&self) -> TickReport {
        self.tick_at(Utc::now()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dto::AssignmentResult;
    use crate::application::resolver::SLA_SETTINGS_KEY;
    use crate::application::testing::{agent, FailingCommits, FailingNotifier, Fixture, RecordingAlerts};
    use crate::domain::aggregates::TicketStatus;
    use crate::domain::events::AUTO_ASSIGNED;
    use crate::domain::value_objects::{Priority, TicketId};
    use crate::infrastructure::ChannelNotifier;
    use chrono::Duration;
    use serde_json::json;

    fn aged(id: u64, priority: Priority, hours: i64) -> Ticket {
        Ticket::open(TicketId::new(id), "VPN drops hourly", priority)
            .with_created_at(Utc::now() - Duration::hours(hours))
    }

    fn assignment_record(ticket: u64, to: &str, hours_ago: i64) -> AuditRecord {
        let mut meta = Map::new();
        meta.insert("to".into(), to.into());
        AuditRecord::new(
            TicketId::new(ticket),
            AuditKind::Assignment,
            AUTO_ASSIGNED,
            meta,
            Utc::now() - Duration::hours(hours_ago),
        )
    }

    #[tokio::test]
    async fn test_stale_low_ticket_escalates_once() {
        let fx = Fixture::new();
        fx.store.insert_ticket(aged(1, Priority::Low, 73));
        let monitor = fx.monitor();

        let report = monitor.tick().await;

        assert_eq!(report.escalated, 1);
        assert_eq!(fx.store.ticket(&TicketId::new(1)).unwrap().priority(), Priority::High);
        let escalations: Vec<_> = fx
            .store
            .audit_records()
            .into_iter()
            .filter(|r| r.action == SLA_ESCALATED)
            .collect();
        assert_eq!(escalations.len(), 1);
        assert_eq!(escalations[0].meta["from"], "low");
        assert_eq!(escalations[0].meta["to"], "high");
        assert_eq!(escalations[0].meta["threshold"], "3 days");

        let again = monitor.tick().await;
        assert_eq!(again.escalated, 0);
        let total = fx.store.audit_records().iter().filter(|r| r.action == SLA_ESCALATED).count();
        assert_eq!(total, 1);
    }

    #[tokio::test]
    async fn test_fresh_ticket_is_left_alone() {
        let fx = Fixture::new();
        fx.store.insert_ticket(aged(1, Priority::Low, 1));

        let report = fx.monitor().tick().await;

        assert_eq!(report.scanned, 1);
        assert_eq!(report.escalated, 0);
        assert_eq!(report.reassigned, 0);
        assert!(fx.store.audit_records().is_empty());
        assert!(!report.needs_attention());
    }

    #[tokio::test]
    async fn test_override_threshold_and_target_apply() {
        let fx = Fixture::new();
        fx.settings.set(
            SLA_SETTINGS_KEY,
            json!({ "priority_escalations": { "low": { "after": "6 hours", "to": "medium" } } }),
        );
        fx.store.insert_ticket(aged(1, Priority::Low, 7));

        fx.monitor().tick().await;

        let record = fx.store.audit_records().into_iter().find(|r| r.action == SLA_ESCALATED).unwrap();
        assert_eq!(record.meta["to"], "medium");
        assert_eq!(fx.store.ticket(&TicketId::new(1)).unwrap().priority(), Priority::Medium);
    }

    #[tokio::test]
    async fn test_next_escalation_level_measures_from_previous_escalation() {
        let fx = Fixture::new();
        fx.settings.set(
            SLA_SETTINGS_KEY,
            json!({ "priority_escalations": { "low": { "after": "6 hours", "to": "medium" } } }),
        );
        // medium escalates after 24 hours by default
        fx.store.insert_ticket(aged(1, Priority::Low, 30));
        let monitor = fx.monitor();

        let first = monitor.tick().await;
        assert_eq!(first.escalated, 1);
        assert_eq!(fx.store.ticket(&TicketId::new(1)).unwrap().priority(), Priority::Medium);

        let second = monitor.tick().await;
        assert_eq!(second.escalated, 0);

        let later = monitor.tick_at(Utc::now() + Duration::hours(25)).await;
        assert_eq!(later.escalated, 1);
        assert_eq!(fx.store.ticket(&TicketId::new(1)).unwrap().priority(), Priority::High);
    }

    #[tokio::test]
    async fn test_overdue_ticket_reassigned_away_from_agent() {
        let fx = Fixture::new();
        fx.store.insert_ticket(aged(1, Priority::High, 6).with_assignee(agent("A")));
        fx.store.record_history(assignment_record(1, "A", 5));
        let monitor = fx.monitor();

        let report = monitor.tick().await;

        assert_eq!(report.reassigned, 1);
        let ticket = fx.store.ticket(&TicketId::new(1)).unwrap();
        assert_eq!(ticket.assigned_to(), Some(&agent("B")));
        let record = fx.store.audit_records().into_iter().find(|r| r.action == SLA_REASSIGNED).unwrap();
        assert_eq!(record.meta["from"], "A");
        assert_eq!(record.meta["to"], "B");
        assert_eq!(record.meta["threshold"], "4 hours");

        // the reassignment reset the clock
        let again = monitor.tick().await;
        assert_eq!(again.reassigned, 0);
        assert_eq!(fx.store.ticket(&TicketId::new(1)).unwrap().assigned_to(), Some(&agent("B")));
    }

    #[tokio::test]
    async fn test_recently_assigned_ticket_not_reassigned() {
        let fx = Fixture::new();
        fx.store.insert_ticket(aged(1, Priority::High, 10).with_assignee(agent("A")));
        fx.store.record_history(assignment_record(1, "A", 1));

        let report = fx.monitor().tick().await;

        assert_eq!(report.reassigned, 0);
        assert_eq!(fx.store.ticket(&TicketId::new(1)).unwrap().assigned_to(), Some(&agent("A")));
    }

    #[tokio::test]
    async fn test_no_alternative_agent_is_not_a_failure() {
        let fx = Fixture::new();
        fx.rules.remove("high-to-a");
        fx.store.insert_ticket(aged(1, Priority::High, 6).with_assignee(agent("B")));

        let report = fx.monitor().tick().await;

        assert_eq!(report.reassigned, 0);
        assert!(report.failures.is_empty());
        assert_eq!(fx.store.ticket(&TicketId::new(1)).unwrap().assigned_to(), Some(&agent("B")));
    }

    #[tokio::test]
    async fn test_failing_ticket_does_not_stop_batch() {
        let fx = Fixture::new();
        for id in [1, 2, 3] {
            fx.store.insert_ticket(aged(id, Priority::Low, 80));
        }
        let tickets = Arc::new(FailingCommits::new(Arc::clone(&fx.store), [TicketId::new(2)]));
        let alerts = Arc::new(RecordingAlerts::default());
        let monitor = fx.monitor_with(tickets, alerts.clone());

        let report = monitor.tick().await;

        assert_eq!(report.scanned, 3);
        assert_eq!(report.escalated, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].ticket_id, TicketId::new(2));
        assert_eq!(report.failures[0].kind, "persistence");
        assert_eq!(fx.store.ticket(&TicketId::new(1)).unwrap().priority(), Priority::High);
        assert_eq!(fx.store.ticket(&TicketId::new(2)).unwrap().priority(), Priority::Low);
        assert_eq!(fx.store.ticket(&TicketId::new(3)).unwrap().priority(), Priority::High);
        assert_eq!(alerts.reports().len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_override_reported_and_defaults_used() {
        let fx = Fixture::new();
        fx.settings.set(SLA_SETTINGS_KEY, json!({ "priority_escalations": { "low": { "after": "later" } } }));
        fx.store.insert_ticket(aged(1, Priority::Low, 73));
        let alerts = Arc::new(RecordingAlerts::default());
        let monitor = fx.monitor_with(fx.store.clone(), alerts.clone());

        let report = monitor.tick().await;

        assert!(report.configuration_error.is_some());
        assert_eq!(report.escalated, 1);
        assert_eq!(alerts.reports().len(), 1);
    }

    #[tokio::test]
    async fn test_resolved_tickets_are_not_scanned() {
        let fx = Fixture::new();
        fx.store.insert_ticket(aged(1, Priority::Low, 100).with_status(TicketStatus::Closed));

        let report = fx.monitor().tick().await;

        assert_eq!(report.scanned, 0);
        assert!(fx.store.audit_records().is_empty());
    }

    #[tokio::test]
    async fn test_escalated_ticket_checked_against_new_reassign_bucket() {
        let fx = Fixture::new();
        fx.store.insert_ticket(aged(1, Priority::Low, 73).with_assignee(agent("C")));

        let report = fx.monitor().tick().await;

        assert_eq!(report.escalated, 1);
        assert_eq!(report.reassigned, 1);
        let ticket = fx.store.ticket(&TicketId::new(1)).unwrap();
        assert_eq!(ticket.priority(), Priority::High);
        assert_eq!(ticket.assigned_to(), Some(&agent("A")));
    }

    struct FailingAssignments;

    #[async_trait]
    impl AssignmentUseCases for FailingAssignments {
        async fn assign(&self, _ticket_id: &TicketId, _options: AssignOptions) -> Result<AssignmentResult> {
            Err(RepositoryError::Storage("assignment table locked".into()).into())
        }
    }

    #[tokio::test]
    async fn test_escalation_counted_when_reassignment_fails() {
        let fx = Fixture::new();
        fx.store.insert_ticket(aged(1, Priority::Low, 73).with_assignee(agent("C")));
        let alerts = Arc::new(RecordingAlerts::default());
        let monitor = fx.monitor_from(
            fx.store.clone(),
            Arc::new(FailingAssignments),
            Arc::new(crate::infrastructure::LogNotifier),
            alerts.clone(),
        );

        let report = monitor.tick().await;

        assert_eq!(report.escalated, 1);
        assert_eq!(report.reassigned, 0);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].kind, "persistence");
        assert_eq!(fx.store.ticket(&TicketId::new(1)).unwrap().priority(), Priority::High);

        let alerted = alerts.reports();
        assert_eq!(alerted.len(), 1);
        assert_eq!(alerted[0].escalated, 1);
    }

    #[tokio::test]
    async fn test_escalation_sends_notification() {
        let fx = Fixture::new();
        fx.store.insert_ticket(aged(1, Priority::Low, 73));
        let (notifier, mut events) = ChannelNotifier::new();
        let engine = Arc::new(fx.engine());
        let monitor = fx.monitor_from(
            fx.store.clone(),
            engine,
            Arc::new(notifier),
            Arc::new(RecordingAlerts::default()),
        );

        monitor.tick().await;

        let event = tokio::time::timeout(std::time::Duration::from_secs(1), events.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            event,
            TicketEvent::Escalated { ticket_id: TicketId::new(1), from: Priority::Low, to: Priority::High }
        );
    }

    #[tokio::test]
    async fn test_failing_notifier_does_not_fail_escalation() {
        let fx = Fixture::new();
        fx.store.insert_ticket(aged(1, Priority::Low, 73));
        let engine = Arc::new(fx.engine());
        let monitor = fx.monitor_from(
            fx.store.clone(),
            engine,
            Arc::new(FailingNotifier),
            Arc::new(RecordingAlerts::default()),
        );

        let report = monitor.tick().await;

        assert_eq!(report.escalated, 1);
        assert!(report.failures.is_empty());
        assert_eq!(fx.store.ticket(&TicketId::new(1)).unwrap().priority(), Priority::High);
        let escalations = fx.store.audit_records().into_iter().filter(|r| r.action == SLA_ESCALATED).count();
        assert_eq!(escalations, 1);
    }
}
