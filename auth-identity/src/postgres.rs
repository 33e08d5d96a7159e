//! Postgres-backed credential store

use crate::{error::*, models::*, repository::CredentialStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::FromRow;
use tracing::{debug, instrument};
use uuid::Uuid;

const USER_COLUMNS: &str = "id, email, password_hash, first_name, last_name, \
                            classification, provider, created_at, updated_at";

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    password_hash: Option<String>,
    first_name: String,
    last_name: String,
    classification: String,
    provider: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for UserIdentity {
    type Error = IdentityError;

    fn try_from(row: UserRow) -> Result<Self> {
        Ok(UserIdentity {
            id: row.id,
            email: row.email,
            password_hash: row.password_hash,
            display_name: DisplayName::new(row.first_name, row.last_name),
            classification: row.classification.parse().map_err(IdentityError::StorageError)?,
            provider: row.provider.parse().map_err(IdentityError::StorageError)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Apply the bundled schema migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| IdentityError::StorageError(format!("Migration failed: {e}")))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    #[instrument(skip(self, user))]
    async fn create(&self, user: NewUser) -> Result<UserIdentity> {
        let query = format!(
            "INSERT INTO users \
             (id, email, password_hash, first_name, last_name, classification, provider) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {USER_COLUMNS}"
        );

        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(Uuid::new_v4())
            .bind(normalize_email(&user.email))
            .bind(&user.password_hash)
            .bind(&user.display_name.first)
            .bind(&user.display_name.last)
            .bind(user.classification.as_str())
            .bind(user.provider.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    debug!("Insert rejected by users_email_key");
                    IdentityError::DuplicateEmail
                } else {
                    IdentityError::DatabaseError(e)
                }
            })?;

        row.try_into()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserIdentity>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");

        sqlx::query_as::<_, UserRow>(&query)
            .bind(normalize_email(email))
            .fetch_optional(&self.pool)
            .await?
            .map(UserIdentity::try_from)
            .transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserIdentity>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");

        sqlx::query_as::<_, UserRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(UserIdentity::try_from)
            .transpose()
    }

    async fn update_display_name(
        &self,
        id: Uuid,
        display_name: DisplayName,
    ) -> Result<UserIdentity> {
        let query = format!(
            "UPDATE users SET first_name = $2, last_name = $3, updated_at = NOW() \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        );

        sqlx::query_as::<_, UserRow>(&query)
            .bind(id)
            .bind(&display_name.first)
            .bind(&display_name.last)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(IdentityError::UserNotFound)?
            .try_into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(classification: &str, provider: &str) -> UserRow {
        let now = Utc::now();
        UserRow {
            id: Uuid::new_v4(),
            email: "jane@example.com".to_string(),
            password_hash: None,
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            classification: classification.to_string(),
            provider: provider.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn row_conversion() {
        let user = UserIdentity::try_from(row("business", "google")).unwrap();
        assert_eq!(user.classification, Classification::Business);
        assert_eq!(user.provider, IdentityProvider::Google);
        assert_eq!(user.display_name, DisplayName::new("Jane", "Doe"));
        assert!(user.is_federated());
    }

    #[test]
    fn unknown_stored_values_are_storage_errors() {
        let err = UserIdentity::try_from(row("enterprise", "google")).unwrap_err();
        assert!(matches!(err, IdentityError::StorageError(_)));

        let err = UserIdentity::try_from(row("individual", "github")).unwrap_err();
        assert!(matches!(err, IdentityError::StorageError(_)));
    }

    #[test]
    fn row_errors_are_not_unique_violations() {
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
    }
}
