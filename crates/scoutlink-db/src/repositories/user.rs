//! PostgreSQL implementation of UserRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use scoutlink_core::entities::User;
use scoutlink_core::error::DomainError;
use scoutlink_core::traits::{NewUser, RepoResult, ScoutVerification, UserRepository};
use scoutlink_core::value_objects::Snowflake;

use crate::mappers::assemble_user;
use crate::models::{DiscordMemberModel, MinecraftPlayerModel, ScoutMemberModel, UserModel};

use super::error::{map_db_error, map_unique_violation};

/// PostgreSQL implementation of UserRepository
///
/// Every lookup resolves to the user id first and then loads the full
/// aggregate, so callers always see all linked identities.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new PgUserRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_aggregate(&self, id: i64) -> RepoResult<Option<User>> {
        let user = sqlx::query_as::<_, UserModel>(
            r"
            SELECT id, email, agree_to_rules, created_at, updated_at
            FROM users
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        let Some(user) = user else {
            return Ok(None);
        };

        let scout = sqlx::query_as::<_, ScoutMemberModel>(
            r"
            SELECT user_id, membership_number, firstname, lastname, details, verified_at
            FROM scout_members
            WHERE user_id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        let discord = sqlx::query_as::<_, DiscordMemberModel>(
            r"
            SELECT discord_id, user_id, nickname
            FROM discord_members
            WHERE user_id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        let minecraft = sqlx::query_as::<_, MinecraftPlayerModel>(
            r"
            SELECT id, user_id, name, oper, time, uuid
            FROM minecraft_players
            WHERE user_id = $1
            ORDER BY id
            ",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(Some(assemble_user(user, scout, discord, minecraft)))
    }

    async fn load_by_owner_id(&self, owner: Option<i64>) -> RepoResult<Option<User>> {
        match owner {
            Some(id) => self.load_aggregate(id).await,
            None => Ok(None),
        }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>> {
        self.load_aggregate(id.into_inner()).await
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let owner = sqlx::query_scalar::<_, i64>(
            r"
            SELECT id FROM users WHERE email = $1
            ",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        self.load_by_owner_id(owner).await
    }

    #[instrument(skip(self))]
    async fn find_by_discord_id(&self, discord_id: &str) -> RepoResult<Option<User>> {
        let owner = sqlx::query_scalar::<_, i64>(
            r"
            SELECT user_id FROM discord_members WHERE discord_id = $1
            ",
        )
        .bind(discord_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        self.load_by_owner_id(owner).await
    }

    #[instrument(skip(self))]
    async fn find_by_membership_number(
        &self,
        membership_number: &str,
    ) -> RepoResult<Option<User>> {
        let owner = sqlx::query_scalar::<_, i64>(
            r"
            SELECT user_id FROM scout_members WHERE membership_number = $1
            ",
        )
        .bind(membership_number)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        self.load_by_owner_id(owner).await
    }

    #[instrument(skip(self))]
    async fn find_by_minecraft_name(&self, name: &str) -> RepoResult<Option<User>> {
        let owner = sqlx::query_scalar::<_, i64>(
            r"
            SELECT user_id FROM minecraft_players WHERE LOWER(name) = LOWER($1)
            ",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        self.load_by_owner_id(owner).await
    }

    #[instrument(skip(self))]
    async fn create(&self, new_user: &NewUser) -> RepoResult<User> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        sqlx::query(
            r"
            INSERT INTO users (id, email)
            VALUES ($1, $2)
            ",
        )
        .bind(new_user.id.into_inner())
        .bind(&new_user.email)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            map_unique_violation(e, || {
                DomainError::UserCreationFailed("identifier already in use".to_string())
            })
        })?;

        if let Some(discord_id) = &new_user.discord_id {
            sqlx::query(
                r"
                INSERT INTO discord_members (discord_id, user_id)
                VALUES ($1, $2)
                ",
            )
            .bind(discord_id)
            .bind(new_user.id.into_inner())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                map_unique_violation(e, || {
                    DomainError::UserCreationFailed("identifier already in use".to_string())
                })
            })?;
        }

        tx.commit().await.map_err(map_db_error)?;

        self.load_aggregate(new_user.id.into_inner())
            .await?
            .ok_or_else(|| DomainError::UserCreationFailed("created row not readable".to_string()))
    }

    #[instrument(skip(self))]
    async fn merge_into(&self, duplicate: Snowflake, survivor: Snowflake) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let duplicate_row = sqlx::query_as::<_, (Option<String>, bool)>(
            r"
            SELECT email, agree_to_rules FROM users WHERE id = $1
            ",
        )
        .bind(duplicate.into_inner())
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_error)?;

        let Some((email, agree_to_rules)) = duplicate_row else {
            return Err(DomainError::UserNotFound);
        };

        // Free the unique email so it can move to the survivor
        sqlx::query(
            r"
            UPDATE users SET email = NULL WHERE id = $1
            ",
        )
        .bind(duplicate.into_inner())
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        // The duplicate's Discord presence replaces whatever the survivor holds
        sqlx::query(
            r"
            DELETE FROM discord_members
            WHERE user_id = $1
              AND EXISTS (SELECT 1 FROM discord_members WHERE user_id = $2)
            ",
        )
        .bind(survivor.into_inner())
        .bind(duplicate.into_inner())
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        sqlx::query(
            r"
            UPDATE discord_members SET user_id = $1 WHERE user_id = $2
            ",
        )
        .bind(survivor.into_inner())
        .bind(duplicate.into_inner())
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        sqlx::query(
            r"
            UPDATE minecraft_players SET user_id = $1 WHERE user_id = $2
            ",
        )
        .bind(survivor.into_inner())
        .bind(duplicate.into_inner())
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        // Rules acceptance is never un-agreed by a merge
        let updated = sqlx::query(
            r"
            UPDATE users
            SET email = COALESCE(email, $2),
                agree_to_rules = agree_to_rules OR $3,
                updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(survivor.into_inner())
        .bind(email)
        .bind(agree_to_rules)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        if updated.rows_affected() == 0 {
            return Err(DomainError::UserNotFound);
        }

        // Remaining linked rows go with the duplicate via ON DELETE CASCADE
        sqlx::query(
            r"
            DELETE FROM users WHERE id = $1
            ",
        )
        .bind(duplicate.into_inner())
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn update_email(&self, id: Snowflake, email: &str) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE users
            SET email = $2, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .bind(email)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::UserNotFound);
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn upsert_discord_member(
        &self,
        id: Snowflake,
        discord_id: &str,
        nickname: Option<&str>,
    ) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        // A user holds at most one presence; drop any other one it owns so
        // the user_id uniqueness is free for the incoming row.
        sqlx::query(
            r"
            DELETE FROM discord_members WHERE user_id = $1 AND discord_id <> $2
            ",
        )
        .bind(id.into_inner())
        .bind(discord_id)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        // Conflict on discord_id moves the presence onto this user (merge)
        sqlx::query(
            r"
            INSERT INTO discord_members (discord_id, user_id, nickname)
            VALUES ($1, $2, $3)
            ON CONFLICT (discord_id) DO UPDATE
            SET user_id = EXCLUDED.user_id,
                nickname = COALESCE(EXCLUDED.nickname, discord_members.nickname)
            ",
        )
        .bind(discord_id)
        .bind(id.into_inner())
        .bind(nickname)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        self.touch(id).await
    }

    #[instrument(skip(self, verification))]
    async fn upsert_scout_member(
        &self,
        id: Snowflake,
        verification: &ScoutVerification,
    ) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO scout_members (user_id, membership_number, firstname, lastname, details, verified_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            ON CONFLICT (user_id) DO UPDATE
            SET membership_number = EXCLUDED.membership_number,
                firstname = EXCLUDED.firstname,
                lastname = EXCLUDED.lastname,
                details = EXCLUDED.details,
                verified_at = NOW()
            ",
        )
        .bind(id.into_inner())
        .bind(&verification.membership_number)
        .bind(&verification.firstname)
        .bind(&verification.lastname)
        .bind(&verification.details)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            map_unique_violation(e, || {
                DomainError::UserCreationFailed(
                    "membership number already attached to another user".to_string(),
                )
            })
        })?;

        self.touch(id).await
    }

    #[instrument(skip(self))]
    async fn upsert_minecraft_player(&self, id: Snowflake, name: &str) -> RepoResult<()> {
        // Conflict on the case-insensitive name detaches it from its current
        // owner (last claim wins), keeping server-side metadata intact
        sqlx::query(
            r"
            INSERT INTO minecraft_players (user_id, name)
            VALUES ($1, $2)
            ON CONFLICT (LOWER(name)) DO UPDATE
            SET user_id = EXCLUDED.user_id,
                name = EXCLUDED.name
            ",
        )
        .bind(id.into_inner())
        .bind(name)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        self.touch(id).await
    }

    #[instrument(skip(self))]
    async fn set_nickname(&self, id: Snowflake, nickname: &str) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE discord_members
            SET nickname = $2
            WHERE user_id = $1
            ",
        )
        .bind(id.into_inner())
        .bind(nickname)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::UserNotFound);
        }

        self.touch(id).await
    }

    #[instrument(skip(self))]
    async fn record_rule_acceptance(&self, id: Snowflake) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE users
            SET agree_to_rules = TRUE, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::UserNotFound);
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn list(&self, page: i64, per_page: i64) -> RepoResult<Vec<User>> {
        let page = page.max(1);
        let per_page = per_page.clamp(1, 100);

        let ids = sqlx::query_scalar::<_, i64>(
            r"
            SELECT id FROM users
            ORDER BY id
            LIMIT $1 OFFSET $2
            ",
        )
        .bind(per_page)
        .bind((page - 1) * per_page)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        let mut users = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(user) = self.load_aggregate(id).await? {
                users.push(user);
            }
        }

        Ok(users)
    }
}

impl PgUserRepository {
    async fn touch(&self, id: Snowflake) -> RepoResult<()> {
        sqlx::query(
            r"
            UPDATE users SET updated_at = NOW() WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgUserRepository>();
    }
}
