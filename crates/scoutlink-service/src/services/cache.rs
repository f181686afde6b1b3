//! Short-lived resolution cache
//!
//! Replaces the old pattern of carrying an already-resolved User handle on
//! the descriptor itself. Entries are keyed by the descriptor's identifiers
//! and invalidated whenever the User they point at is mutated, so a stale
//! handle can never outlive a write.

use std::time::{Duration, Instant};

use dashmap::DashMap;

use scoutlink_core::{Snowflake, User, UserDescriptor};

const DEFAULT_TTL: Duration = Duration::from_secs(30);

struct CachedUser {
    user: User,
    stored_at: Instant,
}

/// Descriptor-keyed cache of recent resolutions
pub struct ResolutionCache {
    entries: DashMap<String, CachedUser>,
    ttl: Duration,
}

impl Default for ResolutionCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl ResolutionCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Canonical cache key for a descriptor; `None` when it carries nothing
    pub fn key_for(descriptor: &UserDescriptor) -> Option<String> {
        if descriptor.is_empty() {
            return None;
        }
        Some(format!(
            "e:{}|d:{}|m:{}|mc:{}",
            descriptor.email.as_deref().unwrap_or(""),
            descriptor.discord_id.as_deref().unwrap_or(""),
            descriptor
                .fallback
                .scout_membership_number
                .as_deref()
                .unwrap_or(""),
            descriptor
                .fallback
                .minecraft_username
                .as_deref()
                .unwrap_or("")
                .to_ascii_lowercase(),
        ))
    }

    /// Fetch a cached resolution, expiring it if past its TTL
    pub fn get(&self, descriptor: &UserDescriptor) -> Option<User> {
        let key = Self::key_for(descriptor)?;
        let entry = self.entries.get(&key)?;
        if entry.stored_at.elapsed() > self.ttl {
            drop(entry);
            self.entries.remove(&key);
            return None;
        }
        Some(entry.user.clone())
    }

    /// Store a resolution under its descriptor key
    pub fn put(&self, descriptor: &UserDescriptor, user: &User) {
        if let Some(key) = Self::key_for(descriptor) {
            self.entries.insert(
                key,
                CachedUser {
                    user: user.clone(),
                    stored_at: Instant::now(),
                },
            );
        }
    }

    /// Drop every entry pointing at the given User
    ///
    /// Called after any mutation of that User.
    pub fn invalidate_user(&self, id: Snowflake) {
        self.entries.retain(|_, cached| cached.user.id != id);
    }

    /// Drop everything
    pub fn clear(&self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: i64) -> User {
        User::new(Snowflake::new(id), None)
    }

    #[test]
    fn test_put_get_roundtrip() {
        let cache = ResolutionCache::default();
        let desc = UserDescriptor::by_discord("D1");
        cache.put(&desc, &user(1));

        let hit = cache.get(&desc).unwrap();
        assert_eq!(hit.id, Snowflake::new(1));
    }

    #[test]
    fn test_empty_descriptor_is_never_cached() {
        let cache = ResolutionCache::default();
        let desc = UserDescriptor::default();
        cache.put(&desc, &user(1));
        assert!(cache.get(&desc).is_none());
    }

    #[test]
    fn test_invalidate_user_drops_all_its_entries() {
        let cache = ResolutionCache::default();
        let by_discord = UserDescriptor::by_discord("D1");
        let by_email = UserDescriptor::by_email("a@x.com");
        cache.put(&by_discord, &user(1));
        cache.put(&by_email, &user(1));

        cache.invalidate_user(Snowflake::new(1));
        assert!(cache.get(&by_discord).is_none());
        assert!(cache.get(&by_email).is_none());
    }

    #[test]
    fn test_expired_entry_misses() {
        let cache = ResolutionCache::new(Duration::ZERO);
        let desc = UserDescriptor::by_discord("D1");
        cache.put(&desc, &user(1));
        assert!(cache.get(&desc).is_none());
    }

    #[test]
    fn test_minecraft_key_is_case_insensitive() {
        let a = UserDescriptor::default().with_minecraft_fallback("Notch");
        let b = UserDescriptor::default().with_minecraft_fallback("NOTCH");
        assert_eq!(
            ResolutionCache::key_for(&a),
            ResolutionCache::key_for(&b)
        );
    }
}
