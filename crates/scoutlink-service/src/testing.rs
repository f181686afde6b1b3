//! In-memory test doubles for the repository and verifier traits
//!
//! Used by this crate's unit tests and by the integration test suite. The
//! in-memory repository enforces the same uniqueness rules as the real
//! schema so resolution behaviour matches production.

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use scoutlink_core::entities::{DiscordMember, MemberDetail, MemberRecord, MinecraftPlayer, ScoutMember, User};
use scoutlink_core::error::DomainError;
use scoutlink_core::traits::{
    MembershipVerifier, NewUser, RepoResult, ScoutCredentials, ScoutVerification, UserRepository,
};
use scoutlink_core::value_objects::Snowflake;

/// In-memory UserRepository with the production uniqueness rules
#[derive(Default)]
pub struct MemoryUserRepository {
    users: Mutex<Vec<User>>,
    next_player_id: AtomicI64,
    lookups: AtomicUsize,
    fail_next_create: AtomicBool,
    hidden_discord_id: Mutex<Option<String>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self {
            next_player_id: AtomicI64::new(1),
            ..Self::default()
        }
    }

    /// Number of find_* calls made so far
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    /// Make the next `create` fail as a uniqueness race would
    pub fn fail_next_create(&self) {
        self.fail_next_create.store(true, Ordering::SeqCst);
    }

    /// Make the next `find_by_discord_id` for this ID miss once
    ///
    /// Simulates the window where a racing request has not committed yet.
    pub fn hide_discord_id_once(&self, discord_id: &str) {
        *self.hidden_discord_id.lock().unwrap() = Some(discord_id.to_string());
    }

    /// Attach a minimal current-membership ScoutMember (test convenience)
    pub async fn attach_scout(&self, id: Snowflake, membership_number: &str) {
        let record = MemberRecord {
            detail: MemberDetail {
                reg_id: membership_number.to_string(),
                firstname: "Scout".to_string(),
                surname: "Member".to_string(),
                class_id: "SCOUT".to_string(),
                mem_flag: true,
                ..Default::default()
            },
            ..Default::default()
        };
        self.upsert_scout_member(
            id,
            &ScoutVerification {
                membership_number: membership_number.to_string(),
                firstname: "Scout".to_string(),
                lastname: "Member".to_string(),
                details: record.to_details(),
            },
        )
        .await
        .expect("attach_scout");
    }

    fn count_lookup(&self) {
        self.lookups.fetch_add(1, Ordering::SeqCst);
    }

    fn find_where<F>(&self, predicate: F) -> Option<User>
    where
        F: Fn(&User) -> bool,
    {
        self.users.lock().unwrap().iter().find(|u| predicate(u)).cloned()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>> {
        self.count_lookup();
        Ok(self.find_where(|u| u.id == id))
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        self.count_lookup();
        Ok(self.find_where(|u| u.email.as_deref() == Some(email)))
    }

    async fn find_by_discord_id(&self, discord_id: &str) -> RepoResult<Option<User>> {
        self.count_lookup();
        if self
            .hidden_discord_id
            .lock()
            .unwrap()
            .take_if(|hidden| hidden == discord_id)
            .is_some()
        {
            return Ok(None);
        }
        Ok(self.find_where(|u| u.discord_id() == Some(discord_id)))
    }

    async fn find_by_membership_number(
        &self,
        membership_number: &str,
    ) -> RepoResult<Option<User>> {
        self.count_lookup();
        Ok(self.find_where(|u| {
            u.scout_member
                .as_ref()
                .is_some_and(|s| s.membership_number == membership_number)
        }))
    }

    async fn find_by_minecraft_name(&self, name: &str) -> RepoResult<Option<User>> {
        self.count_lookup();
        Ok(self.find_where(|u| u.find_minecraft_player(name).is_some()))
    }

    async fn create(&self, new_user: &NewUser) -> RepoResult<User> {
        if self.fail_next_create.swap(false, Ordering::SeqCst) {
            return Err(DomainError::UserCreationFailed(
                "identifier already in use".to_string(),
            ));
        }

        let mut users = self.users.lock().unwrap();
        let email_taken = new_user
            .email
            .as_deref()
            .is_some_and(|e| users.iter().any(|u| u.email.as_deref() == Some(e)));
        let discord_taken = new_user
            .discord_id
            .as_deref()
            .is_some_and(|d| users.iter().any(|u| u.discord_id() == Some(d)));
        if email_taken || discord_taken || users.iter().any(|u| u.id == new_user.id) {
            return Err(DomainError::UserCreationFailed(
                "identifier already in use".to_string(),
            ));
        }

        let mut user = User::new(new_user.id, new_user.email.clone());
        if let Some(discord_id) = &new_user.discord_id {
            user.discord_member = Some(DiscordMember {
                discord_id: discord_id.clone(),
                nickname: None,
            });
        }
        users.push(user.clone());
        Ok(user)
    }

    async fn merge_into(&self, duplicate: Snowflake, survivor: Snowflake) -> RepoResult<()> {
        let mut users = self.users.lock().unwrap();
        if !users.iter().any(|u| u.id == survivor) {
            return Err(DomainError::UserNotFound);
        }
        let dup_idx = users
            .iter()
            .position(|u| u.id == duplicate)
            .ok_or(DomainError::UserNotFound)?;
        let dup = users.remove(dup_idx);

        let Some(surv) = users.iter_mut().find(|u| u.id == survivor) else {
            return Err(DomainError::UserNotFound);
        };
        if let Some(discord) = dup.discord_member {
            surv.discord_member = Some(discord);
        }
        if surv.email.is_none() {
            surv.email = dup.email;
        }
        surv.minecraft_players.extend(dup.minecraft_players);
        surv.agree_to_rules = surv.agree_to_rules || dup.agree_to_rules;
        surv.updated_at = Utc::now();
        Ok(())
    }

    async fn update_email(&self, id: Snowflake, email: &str) -> RepoResult<()> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(DomainError::UserNotFound)?;
        user.email = Some(email.to_string());
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn upsert_discord_member(
        &self,
        id: Snowflake,
        discord_id: &str,
        nickname: Option<&str>,
    ) -> RepoResult<()> {
        let mut users = self.users.lock().unwrap();

        // Detach the presence from its current owner, keeping its nickname
        let mut prior_nickname = None;
        for user in users.iter_mut() {
            if user.discord_id() == Some(discord_id) {
                prior_nickname = user.discord_member.take().and_then(|dm| dm.nickname);
            }
        }

        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(DomainError::UserNotFound)?;
        user.discord_member = Some(DiscordMember {
            discord_id: discord_id.to_string(),
            nickname: nickname.map(str::to_string).or(prior_nickname),
        });
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn upsert_scout_member(
        &self,
        id: Snowflake,
        verification: &ScoutVerification,
    ) -> RepoResult<()> {
        let mut users = self.users.lock().unwrap();

        let taken_elsewhere = users.iter().any(|u| {
            u.id != id
                && u.scout_member
                    .as_ref()
                    .is_some_and(|s| s.membership_number == verification.membership_number)
        });
        if taken_elsewhere {
            return Err(DomainError::UserCreationFailed(
                "membership number already attached to another user".to_string(),
            ));
        }

        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(DomainError::UserNotFound)?;
        user.scout_member = Some(ScoutMember {
            membership_number: verification.membership_number.clone(),
            firstname: verification.firstname.clone(),
            lastname: verification.lastname.clone(),
            details: verification.details.clone(),
            verified_at: Utc::now(),
        });
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn upsert_minecraft_player(&self, id: Snowflake, name: &str) -> RepoResult<()> {
        let mut users = self.users.lock().unwrap();

        // Last claim wins: detach the name from any other owner
        for user in users.iter_mut() {
            if user.id != id {
                user.minecraft_players
                    .retain(|mc| !mc.name.eq_ignore_ascii_case(name));
            }
        }

        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(DomainError::UserNotFound)?;
        if let Some(existing) = user
            .minecraft_players
            .iter_mut()
            .find(|mc| mc.name.eq_ignore_ascii_case(name))
        {
            existing.name = name.to_string();
        } else {
            user.minecraft_players.push(MinecraftPlayer {
                id: self.next_player_id.fetch_add(1, Ordering::SeqCst),
                name: name.to_string(),
                oper: String::new(),
                time: String::new(),
                uuid: String::new(),
            });
        }
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn set_nickname(&self, id: Snowflake, nickname: &str) -> RepoResult<()> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(DomainError::UserNotFound)?;
        let member = user
            .discord_member
            .as_mut()
            .ok_or(DomainError::UserNotFound)?;
        member.nickname = Some(nickname.to_string());
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn record_rule_acceptance(&self, id: Snowflake) -> RepoResult<()> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(DomainError::UserNotFound)?;
        user.agree_to_rules = true;
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn list(&self, page: i64, per_page: i64) -> RepoResult<Vec<User>> {
        let page = page.max(1);
        let per_page = per_page.clamp(1, 100);
        let mut users = self.users.lock().unwrap().clone();
        users.sort_by_key(|u| u.id);
        Ok(users
            .into_iter()
            .skip(((page - 1) * per_page) as usize)
            .take(per_page as usize)
            .collect())
    }
}

enum VerifierOutcome {
    Record(Box<MemberRecord>),
    NotVerified,
    QueryFailed(String),
}

/// MembershipVerifier double with a fixed outcome
pub struct StaticVerifier {
    outcome: VerifierOutcome,
}

impl StaticVerifier {
    /// Always verifies as a current member with the given identity
    pub fn current_member(membership_number: &str, firstname: &str, lastname: &str) -> Self {
        Self::with_record(MemberRecord {
            detail: MemberDetail {
                reg_id: membership_number.to_string(),
                firstname: firstname.to_string(),
                surname: lastname.to_string(),
                status: "A".to_string(),
                member_status: "Active".to_string(),
                class_id: "SCOUT".to_string(),
                mem_flag: true,
            },
            ..Default::default()
        })
    }

    /// Always returns the given record (must assert current membership)
    pub fn with_record(record: MemberRecord) -> Self {
        Self {
            outcome: VerifierOutcome::Record(Box::new(record)),
        }
    }

    /// Always answers "not a current member"
    pub fn not_verified() -> Self {
        Self {
            outcome: VerifierOutcome::NotVerified,
        }
    }

    /// Always fails as a transport error
    pub fn failing(msg: &str) -> Self {
        Self {
            outcome: VerifierOutcome::QueryFailed(msg.to_string()),
        }
    }
}

#[async_trait]
impl MembershipVerifier for StaticVerifier {
    async fn verify_member(
        &self,
        _credentials: &ScoutCredentials,
    ) -> Result<MemberRecord, DomainError> {
        match &self.outcome {
            VerifierOutcome::Record(record) => Ok((**record).clone()),
            VerifierOutcome::NotVerified => Err(DomainError::ExtranetMemberNotVerified),
            VerifierOutcome::QueryFailed(msg) => Err(DomainError::ExtranetQueryFailed(msg.clone())),
        }
    }
}
