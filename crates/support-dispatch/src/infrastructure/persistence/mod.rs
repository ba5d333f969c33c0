//! In-memory repository implementations
//!
//! Used by tests and by the standalone scheduler daemon. The dispatch store
//! keeps tickets and the audit log under one lock so a commit is all or
//! nothing, the way a database transaction would be.

use std::collections::HashMap;

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use serde_json::Value;

use crate::domain::aggregates::{Agent, AssignmentRule, Ticket};
use crate::domain::events::{AuditKind, AuditRecord};
use crate::domain::value_objects::{AgentId, TicketId};
use crate::ports::outbound::{
    AgentDirectory, AuditTrail, RepoResult, RepositoryError, RuleRepository, SettingsStore,
    TicketChange, TicketRepository,
};

#[derive(Default)]
struct StoreState {
    tickets: HashMap<TicketId, Ticket>,
    audit: Vec<AuditRecord>,
}

/// Tickets plus their audit trail
#[derive(Default)]
pub struct InMemoryDispatchStore {
    state: Mutex<StoreState>,
}

impl InMemoryDispatchStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or overwrite a ticket, as the ticketing subsystem would.
    pub fn insert_ticket(&self, ticket: Ticket) {
        self.state.lock().tickets.insert(ticket.id().clone(), ticket);
    }

    /// Append a historical audit record without touching the ticket.
    pub fn record_history(&self, record: AuditRecord) {
        self.state.lock().audit.push(record);
    }

    pub fn ticket(&self, id: &TicketId) -> Option<Ticket> {
        self.state.lock().tickets.get(id).cloned()
    }

    pub fn audit_records(&self) -> Vec<AuditRecord> {
        self.state.lock().audit.clone()
    }
}

#[async_trait]
impl TicketRepository for InMemoryDispatchStore {
    async fn load(&self, id: &TicketId) -> RepoResult<Option<Ticket>> {
        Ok(self.ticket(id))
    }

    async fn list_unresolved(&self) -> RepoResult<Vec<Ticket>> {
        let state = self.state.lock();
        let mut tickets: Vec<Ticket> = state
            .tickets
            .values()
            .filter(|t| t.is_unresolved())
            .cloned()
            .collect();
        tickets.sort_by(|a, b| a.id().cmp(b.id()));
        Ok(tickets)
    }

    async fn commit(&self, change: TicketChange) -> RepoResult<Ticket> {
        let mut state = self.state.lock();
        let id = change.ticket.id().clone();
        let stored_version = state
            .tickets
            .get(&id)
            .map(|t| t.version())
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;
        if stored_version != change.expected_version() {
            return Err(RepositoryError::Conflict(format!(
                "ticket {id} is at version {stored_version}, expected {}",
                change.expected_version()
            )));
        }

        let stored = change.ticket.with_version(stored_version + 1);
        state.tickets.insert(id, stored.clone());
        state.audit.push(change.audit);
        Ok(stored)
    }
}

#[async_trait]
impl AuditTrail for InMemoryDispatchStore {
    async fn latest(&self, ticket_id: &TicketId, kind: AuditKind) -> RepoResult<Option<AuditRecord>> {
        let state = self.state.lock();
        Ok(state
            .audit
            .iter()
            .filter(|r| &r.ticket_id == ticket_id && r.kind == kind)
            .max_by_key(|r| r.timestamp)
            .cloned())
    }
}

/// Rule list in insertion order
#[derive(Default)]
pub struct InMemoryRuleRepository {
    rules: RwLock<Vec<AssignmentRule>>,
}

impl InMemoryRuleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: impl IntoIterator<Item = AssignmentRule>) -> Self {
        Self { rules: RwLock::new(rules.into_iter().collect()) }
    }

    /// Add a rule, replacing any rule with the same id in place.
    pub fn insert(&self, rule: AssignmentRule) {
        let mut rules = self.rules.write();
        match rules.iter_mut().find(|r| r.id == rule.id) {
            Some(existing) => *existing = rule,
            None => rules.push(rule),
        }
    }

    pub fn set_active(&self, id: &str, active: bool) -> bool {
        let mut rules = self.rules.write();
        rules
            .iter_mut()
            .find(|r| r.id == id)
            .map(|r| r.active = active)
            .is_some()
    }

    pub fn remove(&self, id: &str) -> bool {
        let mut rules = self.rules.write();
        let before = rules.len();
        rules.retain(|r| r.id != id);
        rules.len() != before
    }
}

#[async_trait]
impl RuleRepository for InMemoryRuleRepository {
    async fn list_active(&self) -> RepoResult<Vec<AssignmentRule>> {
        let mut active: Vec<AssignmentRule> = self
            .rules
            .read()
            .iter()
            .filter(|r| r.active)
            .cloned()
            .collect();
        // stable: ties keep insertion order
        active.sort_by_key(|r| r.position);
        Ok(active)
    }
}

#[derive(Default)]
pub struct InMemoryAgentDirectory {
    agents: DashMap<AgentId, Agent>,
}

impl InMemoryAgentDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_agents(agents: impl IntoIterator<Item = Agent>) -> Self {
        let directory = Self::new();
        for agent in agents {
            directory.insert(agent);
        }
        directory
    }

    pub fn insert(&self, agent: Agent) {
        self.agents.insert(agent.id.clone(), agent);
    }

    pub fn deactivate(&self, id: &AgentId) -> bool {
        self.agents
            .get_mut(id)
            .map(|mut agent| agent.deactivate())
            .is_some()
    }

    pub fn remove(&self, id: &AgentId) -> bool {
        self.agents.remove(id).is_some()
    }
}

#[async_trait]
impl AgentDirectory for InMemoryAgentDirectory {
    async fn find(&self, id: &AgentId) -> RepoResult<Option<Agent>> {
        Ok(self.agents.get(id).map(|agent| agent.value().clone()))
    }
}

#[derive(Default)]
pub struct InMemorySettingsStore {
    values: DashMap<String, Value>,
}

impl InMemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        self.values.remove(key).map(|(_, value)| value)
    }
}

#[async_trait]
impl SettingsStore for InMemorySettingsStore {
    async fn get(&self, key: &str) -> RepoResult<Option<Value>> {
        Ok(self.values.get(key).map(|value| value.value().clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{Priority, RulePriority};
    use chrono::{Duration, Utc};
    use serde_json::Map;

    fn agent(id: &str) -> AgentId {
        AgentId::new(id).unwrap()
    }

    fn audit(ticket: u64, kind: AuditKind, at: chrono::DateTime<Utc>) -> AuditRecord {
        AuditRecord::new(TicketId::new(ticket), kind, "test", Map::new(), at)
    }

    #[tokio::test]
    async fn test_commit_bumps_version_and_appends_audit() {
        let store = InMemoryDispatchStore::new();
        let ticket = Ticket::open(TicketId::new(1), "x", Priority::Low);
        store.insert_ticket(ticket.clone());

        let stored = store
            .commit(TicketChange::new(ticket.with_assignee(agent("a")), audit(1, AuditKind::Assignment, Utc::now())))
            .await
            .unwrap();

        assert_eq!(stored.version(), 1);
        assert_eq!(store.ticket(&TicketId::new(1)).unwrap().assigned_to(), Some(&agent("a")));
        assert_eq!(store.audit_records().len(), 1);
    }

    #[tokio::test]
    async fn test_stale_commit_conflicts_and_writes_nothing() {
        let store = InMemoryDispatchStore::new();
        let ticket = Ticket::open(TicketId::new(1), "x", Priority::Low);
        store.insert_ticket(ticket.clone().with_version(3));

        let err = store
            .commit(TicketChange::new(ticket.with_assignee(agent("a")), audit(1, AuditKind::Assignment, Utc::now())))
            .await
            .unwrap_err();

        assert!(matches!(err, RepositoryError::Conflict(_)));
        assert_eq!(store.ticket(&TicketId::new(1)).unwrap().assigned_to(), None);
        assert!(store.audit_records().is_empty());
    }

    #[tokio::test]
    async fn test_commit_unknown_ticket_not_found() {
        let store = InMemoryDispatchStore::new();
        let ticket = Ticket::open(TicketId::new(9), "x", Priority::Low);
        let err = store
            .commit(TicketChange::new(ticket, audit(9, AuditKind::Escalation, Utc::now())))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_latest_audit_by_kind() {
        let store = InMemoryDispatchStore::new();
        let now = Utc::now();
        store.record_history(audit(1, AuditKind::Assignment, now - Duration::hours(3)));
        store.record_history(audit(1, AuditKind::Assignment, now - Duration::hours(1)));
        store.record_history(audit(1, AuditKind::Escalation, now));
        store.record_history(audit(2, AuditKind::Assignment, now));

        let latest = store.latest(&TicketId::new(1), AuditKind::Assignment).await.unwrap().unwrap();
        assert_eq!(latest.timestamp, now - Duration::hours(1));
        let escalation = store.latest(&TicketId::new(1), AuditKind::Escalation).await.unwrap().unwrap();
        assert_eq!(escalation.timestamp, now);
        assert!(store.latest(&TicketId::new(3), AuditKind::Assignment).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_unresolved_skips_closed() {
        use crate::domain::aggregates::TicketStatus;
        let store = InMemoryDispatchStore::new();
        store.insert_ticket(Ticket::open(TicketId::new(2), "b", Priority::Low));
        store.insert_ticket(Ticket::open(TicketId::new(1), "a", Priority::Low).with_status(TicketStatus::Pending));
        store.insert_ticket(Ticket::open(TicketId::new(3), "c", Priority::Low).with_status(TicketStatus::Closed));

        let ids: Vec<u64> = store.list_unresolved().await.unwrap().iter().map(|t| t.id().value()).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_rules_listed_by_position_with_stable_ties() {
        let repo = InMemoryRuleRepository::with_rules([
            AssignmentRule::new("late", RulePriority::Wildcard, agent("c"), 2),
            AssignmentRule::new("tie-1", RulePriority::Wildcard, agent("a"), 1),
            AssignmentRule::new("off", RulePriority::Wildcard, agent("d"), 0).inactive(),
            AssignmentRule::new("tie-2", RulePriority::Specific(Priority::High), agent("b"), 1),
        ]);

        let ids: Vec<String> = repo.list_active().await.unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["tie-1", "tie-2", "late"]);

        assert!(repo.set_active("off", true));
        assert!(repo.remove("late"));
        assert!(!repo.remove("late"));
        let ids: Vec<String> = repo.list_active().await.unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["off", "tie-1", "tie-2"]);
    }

    #[tokio::test]
    async fn test_agent_directory_and_settings() {
        let directory = InMemoryAgentDirectory::with_agents([Agent::new(agent("a"), "Alice")]);
        assert!(directory.find(&agent("a")).await.unwrap().unwrap().can_take_tickets());
        assert!(directory.deactivate(&agent("a")));
        assert!(!directory.find(&agent("a")).await.unwrap().unwrap().can_take_tickets());
        assert!(directory.find(&agent("zed")).await.unwrap().is_none());

        let settings = InMemorySettingsStore::new();
        settings.set("support.sla", serde_json::json!({}));
        assert!(settings.get("support.sla").await.unwrap().is_some());
        assert!(settings.remove("support.sla").is_some());
        assert!(settings.get("support.sla").await.unwrap().is_none());
    }
}
