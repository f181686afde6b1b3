//! Act-as override registry
//!
//! Lets an authorized operator register that requests nominally from Discord
//! identity A should resolve and project as identity B. Process-wide state
//! with no expiry; cleared explicitly. Injected through the service context
//! rather than held as a global.

use dashmap::DashMap;
use tracing::info;

use scoutlink_common::RunAsConfig;

/// Transient operator-controlled identity override table
#[derive(Debug, Default)]
pub struct RunAsRegistry {
    overrides: DashMap<String, String>,
}

impl RunAsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the table from configuration
    pub fn from_config(config: &RunAsConfig) -> Self {
        let registry = Self::new();
        for (operator, target) in &config.overrides {
            registry.set_override(operator.clone(), target.clone());
        }
        registry
    }

    /// Register that `operator` acts as `target` until cleared
    pub fn set_override(&self, operator: String, target: String) {
        info!(%operator, %target, "act-as override set");
        self.overrides.insert(operator, target);
    }

    /// Remove the override for one operator
    pub fn clear_override(&self, operator: &str) {
        if self.overrides.remove(operator).is_some() {
            info!(%operator, "act-as override cleared");
        }
    }

    /// Drop every override
    pub fn clear_all(&self) {
        self.overrides.clear();
    }

    /// Map a Discord ID through the override table, passthrough when unset
    pub fn effective_discord_id(&self, discord_id: &str) -> String {
        self.overrides
            .get(discord_id)
            .map_or_else(|| discord_id.to_string(), |target| target.clone())
    }

    /// True when `operator` currently has an override registered
    pub fn has_override(&self, operator: &str) -> bool {
        self.overrides.contains_key(operator)
    }
}
