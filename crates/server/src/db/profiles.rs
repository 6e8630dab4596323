//! `PostgreSQL` profile repository.
//!
//! Queries are built at runtime with `query_as` so the crate builds without a
//! live database or an offline query cache.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};
use tracing::{debug, instrument};

use heartline_core::api::{ProfileTraits, UpsertOutcome};
use heartline_core::{
    Age, Gender, PlatformKey, SocialAccountId, Trait, UserId, Verification, VerificationStatus,
};

use super::{ProfileRepository, RepositoryError};
use crate::models::{HandleUpsert, SocialAccount, User};

const SOCIAL_ACCOUNT_COLUMNS: &str = "id, user_id, platform_id, account_id, \
     verification_status, verified_at, created_at, updated_at";

/// Repository backed by a `PostgreSQL` pool.
#[derive(Clone)]
pub struct PgProfileRepository {
    pool: PgPool,
}

impl PgProfileRepository {
    /// Create a new repository over `pool`.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// =============================================================================
// Row types
// =============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    id: UserId,
    name: String,
    email: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SocialAccountRow {
    id: SocialAccountId,
    user_id: UserId,
    platform_id: PlatformKey,
    account_id: Option<String>,
    verification_status: String,
    verified_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SocialAccountRow> for SocialAccount {
    type Error = RepositoryError;

    fn try_from(row: SocialAccountRow) -> Result<Self, Self::Error> {
        let status = VerificationStatus::parse(&row.verification_status).map_err(|e| {
            RepositoryError::DataCorruption(format!("social account {}: {e}", row.id))
        })?;
        let verification = Verification::from_parts(status, row.verified_at).map_err(|e| {
            RepositoryError::DataCorruption(format!("social account {}: {e}", row.id))
        })?;

        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            platform: row.platform_id,
            account_id: row.account_id,
            verification,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct TraitsRow {
    age: Option<i16>,
    gender: Option<String>,
    selected_traits: Json<Vec<Trait>>,
    wanted_traits: Json<Vec<Trait>>,
}

impl TryFrom<TraitsRow> for ProfileTraits {
    type Error = RepositoryError;

    fn try_from(row: TraitsRow) -> Result<Self, Self::Error> {
        let age = row
            .age
            .map(|years| {
                u8::try_from(years)
                    .ok()
                    .and_then(|y| Age::new(y).ok())
                    .ok_or_else(|| RepositoryError::DataCorruption(format!("invalid age: {years}")))
            })
            .transpose()?;
        let gender = row
            .gender
            .map(|g| {
                Gender::parse(&g)
                    .ok_or_else(|| RepositoryError::DataCorruption(format!("invalid gender: {g}")))
            })
            .transpose()?;

        Ok(Self {
            age,
            gender,
            selected_traits: row.selected_traits.0.into(),
            wanted_traits: row.wanted_traits.0.into(),
        })
    }
}

// =============================================================================
// Statements shared by single and composite writes
// =============================================================================

/// Lock the user row for the rest of the transaction.
///
/// Holding this lock serializes concurrent profile writes for one user, which
/// keeps the read-before-write upsert free of duplicate inserts.
async fn lock_user(conn: &mut PgConnection, id: &UserId) -> Result<(), RepositoryError> {
    let found: Option<i32> = sqlx::query_scalar("SELECT 1 FROM app_user WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    found.map(|_| ()).ok_or(RepositoryError::NotFound)
}

async fn set_name(
    conn: &mut PgConnection,
    id: &UserId,
    name: &str,
    now: DateTime<Utc>,
) -> Result<(), RepositoryError> {
    let result = sqlx::query("UPDATE app_user SET name = $1, updated_at = $2 WHERE id = $3")
        .bind(name)
        .bind(now)
        .bind(id)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }
    Ok(())
}

async fn upsert_account(
    conn: &mut PgConnection,
    id: &UserId,
    upsert: &HandleUpsert,
    now: DateTime<Utc>,
) -> Result<UpsertOutcome, RepositoryError> {
    let existing = sqlx::query_as::<_, SocialAccountRow>(&format!(
        "SELECT {SOCIAL_ACCOUNT_COLUMNS} FROM social_account \
         WHERE user_id = $1 AND platform_id = $2 FOR UPDATE"
    ))
    .bind(id)
    .bind(&upsert.platform)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(row) = existing {
        let account = SocialAccount::try_from(row)?;
        let next = upsert.next_verification(account.verification, now);

        sqlx::query(
            r"
            UPDATE social_account
            SET account_id = $1, verification_status = $2, verified_at = $3, updated_at = $4
            WHERE id = $5
            ",
        )
        .bind(&upsert.account_id)
        .bind(next.status().as_str())
        .bind(next.verified_at())
        .bind(now)
        .bind(account.id)
        .execute(&mut *conn)
        .await?;

        debug!(platform = %upsert.platform, account = %account.id, "Updated social account");
        return Ok(UpsertOutcome::Updated);
    }

    let next = upsert.next_verification(Verification::Unverified, now);
    let account_id = SocialAccountId::generate();

    sqlx::query(
        r"
        INSERT INTO social_account
            (id, user_id, platform_id, account_id, verification_status, verified_at, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ",
    )
    .bind(account_id)
    .bind(id)
    .bind(&upsert.platform)
    .bind(&upsert.account_id)
    .bind(next.status().as_str())
    .bind(next.verified_at())
    .bind(now)
    .bind(now)
    .execute(&mut *conn)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_unique_violation()
        {
            return RepositoryError::Conflict(format!(
                "social account for platform '{}' already exists",
                upsert.platform
            ));
        }
        RepositoryError::Database(e)
    })?;

    debug!(platform = %upsert.platform, account = %account_id, "Created social account");
    Ok(UpsertOutcome::Created)
}

#[async_trait]
impl ProfileRepository for PgProfileRepository {
    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(user_id = %id))]
    async fn get_user(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, name, email, created_at, updated_at
            FROM app_user
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    #[instrument(skip(self, email), fields(user_id = %id))]
    async fn create_user(
        &self,
        id: &UserId,
        name: &str,
        email: Option<&str>,
    ) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO app_user (id, name, email)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, created_at, updated_at
            ",
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("user already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        Ok(row.into())
    }

    #[instrument(skip(self), fields(user_id = %id))]
    async fn update_user_name(
        &self,
        id: &UserId,
        name: &str,
        now: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        set_name(&mut conn, id, name, now).await
    }

    #[instrument(skip(self), fields(user_id = %id))]
    async fn list_social_accounts(
        &self,
        id: &UserId,
    ) -> Result<Vec<SocialAccount>, RepositoryError> {
        // Accounts written by one composite update share `created_at`;
        // platform keeps their order stable.
        let rows = sqlx::query_as::<_, SocialAccountRow>(&format!(
            "SELECT {SOCIAL_ACCOUNT_COLUMNS} FROM social_account \
             WHERE user_id = $1 ORDER BY created_at, platform_id"
        ))
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(SocialAccount::try_from).collect()
    }

    #[instrument(skip(self, upsert), fields(user_id = %id, platform = %upsert.platform))]
    async fn upsert_social_account(
        &self,
        id: &UserId,
        upsert: &HandleUpsert,
        now: DateTime<Utc>,
    ) -> Result<UpsertOutcome, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        lock_user(&mut tx, id).await?;
        let outcome = upsert_account(&mut tx, id, upsert, now).await?;
        tx.commit().await?;
        Ok(outcome)
    }

    #[instrument(skip(self, handles), fields(user_id = %id, handles = handles.len()))]
    async fn apply_profile_update(
        &self,
        id: &UserId,
        name: &str,
        handles: &[HandleUpsert],
        now: DateTime<Utc>,
    ) -> Result<Vec<UpsertOutcome>, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        lock_user(&mut tx, id).await?;
        set_name(&mut tx, id, name, now).await?;

        let mut outcomes = Vec::with_capacity(handles.len());
        for upsert in handles {
            // Dropping `tx` on error rolls back every earlier write.
            outcomes.push(upsert_account(&mut tx, id, upsert, now).await?);
        }

        tx.commit().await?;
        Ok(outcomes)
    }

    #[instrument(skip(self), fields(user_id = %id))]
    async fn get_traits(&self, id: &UserId) -> Result<Option<ProfileTraits>, RepositoryError> {
        let row = sqlx::query_as::<_, TraitsRow>(
            r"
            SELECT age, gender, selected_traits, wanted_traits
            FROM profile_traits
            WHERE user_id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ProfileTraits::try_from).transpose()
    }

    #[instrument(skip(self, traits), fields(user_id = %id))]
    async fn save_traits(
        &self,
        id: &UserId,
        traits: &ProfileTraits,
        now: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        lock_user(&mut tx, id).await?;

        sqlx::query(
            r"
            INSERT INTO profile_traits (user_id, age, gender, selected_traits, wanted_traits, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id) DO UPDATE
            SET age = EXCLUDED.age,
                gender = EXCLUDED.gender,
                selected_traits = EXCLUDED.selected_traits,
                wanted_traits = EXCLUDED.wanted_traits,
                updated_at = EXCLUDED.updated_at
            ",
        )
        .bind(id)
        .bind(traits.age.map(|a| i16::from(a.years())))
        .bind(traits.gender.map(|g| g.as_str()))
        .bind(Json(traits.selected_traits.as_slice()))
        .bind(Json(traits.wanted_traits.as_slice()))
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}
