//! Wires the in-memory adapters, seeds them and builds the scheduler.

use std::collections::HashSet;
use std::sync::Arc;

use support_dispatch::infrastructure::{
    InMemoryAgentDirectory, InMemoryDispatchStore, InMemoryRuleRepository, InMemorySettingsStore,
    LogAlertChannel, LogNotifier,
};
use support_dispatch::{
    AgentId, AssignOptions, AssignmentEngine, DispatchConfig, SeedData,
    SlaConfigResolver, SlaMonitor, SlaScheduler, TicketId, SLA_SETTINGS_KEY,
};

#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("duplicate agent {0} in seed data")]
    DuplicateAgent(AgentId),
    #[error("duplicate rule {0:?} in seed data")]
    DuplicateRule(String),
    #[error("duplicate ticket {0} in seed data")]
    DuplicateTicket(TicketId),
}

pub struct Runtime {
    pub store: Arc<InMemoryDispatchStore>,
    pub scheduler: SlaScheduler,
}

pub async fn build(config: &DispatchConfig) -> Result<Runtime, BootstrapError> {
    let store = Arc::new(InMemoryDispatchStore::new());
    let rules = Arc::new(InMemoryRuleRepository::new());
    let agents = Arc::new(InMemoryAgentDirectory::new());
    let settings = Arc::new(InMemorySettingsStore::new());

    seed(&config.seed, &store, &rules, &agents, &settings)?;

    let notifier = Arc::new(LogNotifier);
    let engine = Arc::new(AssignmentEngine::new(store.clone(), rules, agents, notifier.clone()));
    let monitor = Arc::new(SlaMonitor::new(
        store.clone(),
        store.clone(),
        SlaConfigResolver::new(config.sla.clone(), settings),
        engine.clone(),
        notifier,
        Arc::new(LogAlertChannel),
    ));
    let scheduler = SlaScheduler::new(monitor, config.tick_interval.as_std());

    assign_new_tickets(&config.seed, &engine).await;

    Ok(Runtime { store, scheduler })
}

fn seed(
    data: &SeedData,
    store: &InMemoryDispatchStore,
    rules: &InMemoryRuleRepository,
    agents: &InMemoryAgentDirectory,
    settings: &InMemorySettingsStore,
) -> Result<(), BootstrapError> {
    let mut agent_ids = HashSet::new();
    for agent in &data.agents {
        if !agent_ids.insert(agent.id.clone()) {
            return Err(BootstrapError::DuplicateAgent(agent.id.clone()));
        }
        agents.insert(agent.clone());
    }

    let mut rule_ids = HashSet::new();
    for rule in &data.rules {
        if !rule_ids.insert(rule.id.as_str()) {
            return Err(BootstrapError::DuplicateRule(rule.id.clone()));
        }
        rules.insert(rule.clone());
    }

    for ticket in &data.tickets {
        if store.ticket(ticket.id()).is_some() {
            return Err(BootstrapError::DuplicateTicket(ticket.id().clone()));
        }
        store.insert_ticket(ticket.clone());
    }

    if let Some(overrides) = &data.sla_override {
        settings.set(SLA_SETTINGS_KEY, overrides.clone());
    }

    tracing::info!(
        agents = data.agents.len(),
        rules = data.rules.len(),
        tickets = data.tickets.len(),
        sla_override = data.sla_override.is_some(),
        "Seeded dispatch state"
    );
    Ok(())
}

/// Seeded tickets without an assignee get the creation-time assignment.
async fn assign_new_tickets(data: &SeedData, engine: &AssignmentEngine) {
    let pending = data
        .tickets
        .iter()
        .filter(|ticket| ticket.is_unresolved() && ticket.assigned_to().is_none());

    for ticket in pending {
        if let Err(e) = engine.assign(ticket.id(), AssignOptions::default()).await {
            tracing::warn!(ticket_id = %ticket.id(), error = %e, "Initial assignment failed");
        }
    }
}
