//! UserDescriptor - the transient "who is asking" bundle
//!
//! Carries whichever identifiers the caller happens to know. Primary
//! identifiers (email, Discord ID) locate a record directly; fallback hints
//! only catch a pre-existing record created under a different identifier.

use serde::Deserialize;

/// Transient identity descriptor supplied by adapters, never persisted
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserDescriptor {
    pub email: Option<String>,
    pub discord_id: Option<String>,
    #[serde(default)]
    pub fallback: FallbackHints,
}

/// Weaker identifiers used only when the primary ones match nothing
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FallbackHints {
    pub scout_membership_number: Option<String>,
    pub minecraft_username: Option<String>,
}

impl FallbackHints {
    /// True when no hint is present
    pub fn is_empty(&self) -> bool {
        self.scout_membership_number.is_none() && self.minecraft_username.is_none()
    }
}

impl UserDescriptor {
    /// Descriptor for a web-originated request identified by email
    pub fn by_email(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            ..Default::default()
        }
    }

    /// Descriptor for a Discord-originated request
    pub fn by_discord(discord_id: impl Into<String>) -> Self {
        Self {
            discord_id: Some(discord_id.into()),
            ..Default::default()
        }
    }

    /// Add a scout membership number as a fallback hint
    pub fn with_membership_fallback(mut self, membership_number: impl Into<String>) -> Self {
        self.fallback.scout_membership_number = Some(membership_number.into());
        self
    }

    /// Add a Minecraft username as a fallback hint
    pub fn with_minecraft_fallback(mut self, username: impl Into<String>) -> Self {
        self.fallback.minecraft_username = Some(username.into());
        self
    }

    /// True when the descriptor carries no identifier at all
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.discord_id.is_none() && self.fallback.is_empty()
    }
}
