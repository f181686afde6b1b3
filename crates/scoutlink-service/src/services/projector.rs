//! Role/nickname projector
//!
//! Derives the Discord-facing presentation (nickname string, role set) from a
//! resolved User's accumulated identities. The projection is pure over the
//! User; adapters apply it to the live guild member and reconcile only the
//! roles this system manages.

use serde::Serialize;
use tracing::instrument;

use scoutlink_core::{User, UserDescriptor};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::resolver::{IdentityResolver, ResolveOptions};

/// Every role this system may grant or revoke
///
/// Adapters must never touch roles outside this set when reconciling.
pub const MANAGED_ROLES: [&str; 7] = [
    "Leader",
    "Rover",
    "Venturer",
    "Scout",
    "Unmatched section",
    "Verified",
    "Verified (Legacy)",
];

const VERIFIED_ROLE: &str = "Verified";
const UNMATCHED_SECTION_ROLE: &str = "Unmatched section";

/// Discord-facing presentation of a resolved User
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Projection {
    /// The Discord ID this projection applies to, when one is linked
    pub discord_id: Option<String>,
    /// Desired nickname; `None` means leave the nickname untouched
    pub nickname: Option<String>,
    /// Desired set of managed roles
    pub roles: Vec<String>,
}

/// Role/nickname projector service
pub struct Projector<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> Projector<'a> {
    /// Create a new Projector
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Resolve a descriptor and project its presentation
    #[instrument(skip(self, descriptor))]
    pub async fn project(&self, descriptor: &UserDescriptor) -> ServiceResult<Projection> {
        let user = IdentityResolver::new(self.ctx)
            .resolve(descriptor, ResolveOptions::lookup())
            .await?;
        Ok(Self::project_user(&user))
    }

    /// Pure projection over an already-resolved User
    pub fn project_user(user: &User) -> Projection {
        Projection {
            discord_id: user.discord_id().map(str::to_string),
            nickname: Self::nickname(user),
            roles: Self::roles(user),
        }
    }

    /// Nickname: override or scout first name, then linked Minecraft names
    fn nickname(user: &User) -> Option<String> {
        let base = user
            .discord_member
            .as_ref()
            .and_then(|dm| dm.nickname.clone())
            .or_else(|| user.scout_member.as_ref().map(|s| s.firstname.clone()));

        let minecraft = if user.minecraft_players.is_empty() {
            None
        } else {
            Some(
                user.minecraft_players
                    .iter()
                    .map(|mc| mc.name.as_str())
                    .collect::<Vec<_>>()
                    .join(","),
            )
        };

        match (base, minecraft) {
            (Some(base), Some(minecraft)) => Some(format!("{base} | {minecraft}")),
            (Some(base), None) => Some(base),
            (None, Some(minecraft)) => Some(minecraft),
            (None, None) => None,
        }
    }

    /// Roles: Verified gate plus exactly one section role once verified
    ///
    /// The Verified role requires both rules acceptance and a retained
    /// verification payload that still asserts *current* membership; a
    /// ScoutMember row alone can be stale.
    fn roles(user: &User) -> Vec<String> {
        let Some(scout) = &user.scout_member else {
            return Vec::new();
        };

        let record = scout.member_record();
        let is_current = record.as_ref().is_some_and(|r| r.is_current_member());

        let mut roles = Vec::new();
        if user.agree_to_rules && is_current {
            roles.push(VERIFIED_ROLE.to_string());
        }
        roles.push(Self::section_role(record.as_ref().map_or("", |r| r.detail.class_id.as_str())).to_string());
        roles
    }

    /// Map a registrar classification code to its section role
    fn section_role(class_id: &str) -> &'static str {
        match class_id {
            "LDR" => "Leader",
            "ROVER" => "Rover",
            "VENT" => "Venturer",
            "SCOUT" => "Scout",
            _ => UNMATCHED_SECTION_ROLE,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use scoutlink_core::entities::{DiscordMember, MemberDetail, MemberRecord, MinecraftPlayer, ScoutMember};
    use scoutlink_core::Snowflake;

    use super::*;

    fn base_user() -> User {
        User::new(Snowflake::new(1), None)
    }

    fn scout_member(class_id: &str, current: bool) -> ScoutMember {
        let record = MemberRecord {
            detail: MemberDetail {
                reg_id: "1234567".to_string(),
                firstname: "Ben".to_string(),
                surname: "Jamin".to_string(),
                class_id: class_id.to_string(),
                mem_flag: current,
                ..Default::default()
            },
            ..Default::default()
        };
        ScoutMember {
            membership_number: "1234567".to_string(),
            firstname: "Ben".to_string(),
            lastname: "Jamin".to_string(),
            details: record.to_details(),
            verified_at: Utc::now(),
        }
    }

    fn minecraft(id: i64, name: &str) -> MinecraftPlayer {
        MinecraftPlayer {
            id,
            name: name.to_string(),
            oper: String::new(),
            time: String::new(),
            uuid: String::new(),
        }
    }

    #[test]
    fn test_nickname_override_with_minecraft_names() {
        let mut user = base_user();
        user.discord_member = Some(DiscordMember {
            discord_id: "D1".to_string(),
            nickname: Some("Benno".to_string()),
        });
        user.minecraft_players = vec![minecraft(1, "Notch"), minecraft(2, "Jeb")];

        let projection = Projector::project_user(&user);
        assert_eq!(projection.nickname.as_deref(), Some("Benno | Notch,Jeb"));
    }

    #[test]
    fn test_nickname_falls_back_to_scout_firstname() {
        let mut user = base_user();
        user.scout_member = Some(scout_member("SCOUT", true));

        let projection = Projector::project_user(&user);
        assert_eq!(projection.nickname.as_deref(), Some("Ben"));
    }

    #[test]
    fn test_no_nickname_when_nothing_available() {
        let projection = Projector::project_user(&base_user());
        assert_eq!(projection.nickname, None);
    }

    #[test]
    fn test_verified_role_requires_rules_and_current_membership() {
        let mut user = base_user();
        user.agree_to_rules = true;
        user.scout_member = Some(scout_member("SCOUT", true));

        let projection = Projector::project_user(&user);
        assert!(projection.roles.contains(&"Verified".to_string()));
        assert!(projection.roles.contains(&"Scout".to_string()));
    }

    #[test]
    fn test_stale_membership_blocks_verified_role() {
        let mut user = base_user();
        user.agree_to_rules = true;
        user.scout_member = Some(scout_member("SCOUT", false));

        let projection = Projector::project_user(&user);
        assert!(!projection.roles.contains(&"Verified".to_string()));
        // Section role still reflects the retained payload
        assert!(projection.roles.contains(&"Scout".to_string()));
    }

    #[test]
    fn test_rules_not_accepted_blocks_verified_role() {
        let mut user = base_user();
        user.scout_member = Some(scout_member("LDR", true));

        let projection = Projector::project_user(&user);
        assert!(!projection.roles.contains(&"Verified".to_string()));
        assert!(projection.roles.contains(&"Leader".to_string()));
    }

    #[test]
    fn test_unknown_classification_yields_unmatched_section() {
        let mut user = base_user();
        user.agree_to_rules = true;
        user.scout_member = Some(scout_member("XYZ", true));

        let projection = Projector::project_user(&user);
        assert!(projection.roles.contains(&"Unmatched section".to_string()));
        assert!(projection.roles.contains(&"Verified".to_string()));
    }

    #[test]
    fn test_section_role_mapping() {
        assert_eq!(Projector::section_role("LDR"), "Leader");
        assert_eq!(Projector::section_role("ROVER"), "Rover");
        assert_eq!(Projector::section_role("VENT"), "Venturer");
        assert_eq!(Projector::section_role("SCOUT"), "Scout");
        assert_eq!(Projector::section_role(""), "Unmatched section");
    }

    #[test]
    fn test_no_roles_without_scout_member() {
        let mut user = base_user();
        user.agree_to_rules = true;

        let projection = Projector::project_user(&user);
        assert!(projection.roles.is_empty());
    }

    #[test]
    fn test_every_projected_role_is_managed() {
        let mut user = base_user();
        user.agree_to_rules = true;
        user.scout_member = Some(scout_member("XYZ", true));

        let projection = Projector::project_user(&user);
        for role in &projection.roles {
            assert!(MANAGED_ROLES.contains(&role.as_str()));
        }
    }
}
