//! SLA configuration resolver
//!
//! Reads the administrator override from the settings store and merges it
//! over the process defaults. Never fails: a broken override yields the
//! defaults plus the error, so the scan still runs.

use std::sync::Arc;

use crate::domain::services::resolve;
use crate::domain::value_objects::SlaConfiguration;
use crate::error::DispatchError;
use crate::ports::outbound::SettingsStore;

/// Settings key holding the SLA override document
pub const SLA_SETTINGS_KEY: &str = "support.sla";

#[derive(Debug)]
pub struct ResolvedSla {
    pub configuration: SlaConfiguration,
    /// Why the defaults were used instead of the override, if they were
    pub error: Option<DispatchError>,
}

pub struct SlaConfigResolver {
    defaults: SlaConfiguration,
    settings: Arc<dyn SettingsStore>,
}

impl SlaConfigResolver {
    pub fn new(defaults: SlaConfiguration, settings: Arc<dyn SettingsStore>) -> Self {
        Self { defaults, settings }
    }

    pub fn defaults(&self) -> &SlaConfiguration {
        &self.defaults
    }

    pub async fn resolve(&self) -> ResolvedSla {
        let overrides = match self.settings.get(SLA_SETTINGS_KEY).await {
            Ok(overrides) => overrides,
            Err(e) => {
                tracing::warn!(key = SLA_SETTINGS_KEY, error = %e, "Could not read SLA override, using defaults");
                return self.fallback(e.into());
            }
        };

        match resolve(&self.defaults, overrides.as_ref()) {
            Ok(configuration) => ResolvedSla { configuration, error: None },
            Err(e) => {
                tracing::warn!(key = SLA_SETTINGS_KEY, error = %e, "Ignoring malformed SLA override, using defaults");
                self.fallback(e)
            }
        }
    }

    fn fallback(&self, error: DispatchError) -> ResolvedSla {
        ResolvedSla { configuration: self.defaults.clone(), error: Some(error) }
    }
}
