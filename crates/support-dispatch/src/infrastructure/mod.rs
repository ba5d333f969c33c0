//! Infrastructure layer

pub mod notify;
pub mod persistence;

pub use notify::{ChannelNotifier, LogAlertChannel, LogNotifier};
pub use persistence::{
    InMemoryAgentDirectory, InMemoryDispatchStore, InMemoryRuleRepository, InMemorySettingsStore,
};
