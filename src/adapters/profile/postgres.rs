//! PostgreSQL implementation of ProfileStore.
//!
//! Profiles live in the `users` table, keyed by the identity provider's
//! subject in `external_id`:
//!
//! ```sql
//! CREATE TABLE users (
//!     id                UUID PRIMARY KEY,
//!     external_id       TEXT NOT NULL,
//!     subscription_plan TEXT NOT NULL DEFAULT 'none',
//!     room_limit        INTEGER NOT NULL DEFAULT 0,
//!     updated_at        TIMESTAMPTZ NOT NULL DEFAULT now()
//! );
//! ```
//!
//! `external_id` is deliberately not unique here; duplicate rows are
//! reported to the caller, which refuses to write to either.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::domain::foundation::{DomainError, ErrorCode, ProfileRecordId, Timestamp, UserId};
use crate::ports::{PlanFields, ProfileHandle, ProfileStore};

pub struct PostgresProfileStore {
    pool: PgPool,
}

impl PostgresProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Builds a lazily connecting pool from `config`.
    pub fn from_config(config: &DatabaseConfig) -> Result<Self, DomainError> {
        let pool = config.connect_lazy().map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Invalid database settings: {}", e))
        })?;
        Ok(Self::new(pool))
    }
}

/// Database row for a profile lookup.
#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    id: Uuid,
    external_id: String,
}

impl TryFrom<ProfileRow> for ProfileHandle {
    type Error = DomainError;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        Ok(ProfileHandle {
            record_id: ProfileRecordId::new(row.id.to_string())?,
            user_id: UserId::new(row.external_id).map_err(|e| {
                DomainError::new(ErrorCode::DatabaseError, format!("Invalid external_id: {}", e))
            })?,
        })
    }
}

fn parse_record_id(id: &ProfileRecordId) -> Result<Uuid, DomainError> {
    Uuid::parse_str(id.as_str()).map_err(|e| {
        DomainError::new(
            ErrorCode::ValidationFailed,
            format!("Profile record id must be a valid UUID: {}", e),
        )
    })
}

fn room_limit_column(limit: u32) -> Result<i32, DomainError> {
    i32::try_from(limit).map_err(|_| {
        DomainError::new(
            ErrorCode::ValidationFailed,
            format!("Room limit {} does not fit the room_limit column", limit),
        )
    })
}

#[async_trait]
impl ProfileStore for PostgresProfileStore {
    async fn find_by_identity(&self, user_id: &UserId) -> Result<Vec<ProfileHandle>, DomainError> {
        let rows: Vec<ProfileRow> = sqlx::query_as(
            r#"
            SELECT id, external_id
            FROM users
            WHERE external_id = $1
            "#,
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to find profile: {}", e))
        })?;

        rows.into_iter().map(ProfileHandle::try_from).collect()
    }

    async fn update_plan_fields(
        &self,
        handle: &ProfileHandle,
        fields: &PlanFields,
    ) -> Result<(), DomainError> {
        let id = parse_record_id(&handle.record_id)?;

        let result = sqlx::query(
            r#"
            UPDATE users SET
                subscription_plan = $2,
                room_limit = $3,
                updated_at = $4
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&fields.subscription_plan)
        .bind(room_limit_column(fields.room_limit)?)
        .bind(Timestamp::now().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to update profile: {}", e))
        })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::ProfileNotFound,
                "Profile not found",
            ));
        }

        Ok(())
    }
}
