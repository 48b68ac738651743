use crate::error::RepositoryResult;
use crate::models::{UserId, UserProfile};
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::error;

/// Persistent registry of participants.
///
/// Handlers only see this trait, so they can run against Postgres in
/// production and an in-memory table in tests.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// True iff a record with that identity is present
    async fn exists(&self, user_id: UserId) -> RepositoryResult<bool>;

    /// Insert a new participant.
    ///
    /// Fails with `RepositoryError::Duplicate` when the identity is already
    /// registered; existing rows are never overwritten.
    async fn insert(&self, profile: &UserProfile) -> RepositoryResult<()>;

    /// Every registered identity, in no particular order
    async fn list_all_user_ids(&self) -> RepositoryResult<Vec<UserId>>;

    /// Username on file, `None` when the identity is unknown or has none
    async fn find_username(&self, user_id: UserId) -> RepositoryResult<Option<String>>;

    /// Username on file, or `placeholder` when there is none.
    ///
    /// A missing row is an ordinary outcome and is not logged; any other
    /// failure is logged and also yields the placeholder.
    async fn lookup_username(&self, user_id: UserId, placeholder: &str) -> String {
        match self.find_username(user_id).await {
            Ok(Some(name)) if !name.is_empty() => name,
            Ok(_) => placeholder.to_string(),
            Err(e) => {
                error!(user_id, "Failed to look up username: {}", e);
                placeholder.to_string()
            }
        }
    }
}

/// Postgres-backed user store
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new UserRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Number of registered participants
    pub async fn count(&self) -> RepositoryResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn exists(&self, user_id: UserId) -> RepositoryResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE user_id = $1)",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn insert(&self, profile: &UserProfile) -> RepositoryResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (user_id, username, first_name, last_name)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(profile.user_id)
        .bind(profile.username.as_deref())
        .bind(profile.first_name.as_deref())
        .bind(profile.last_name.as_deref())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_all_user_ids(&self) -> RepositoryResult<Vec<UserId>> {
        let ids = sqlx::query_scalar::<_, i64>("SELECT user_id FROM users")
            .fetch_all(&self.pool)
            .await?;

        Ok(ids)
    }

    async fn find_username(&self, user_id: UserId) -> RepositoryResult<Option<String>> {
        // Outer Option: row present; inner: column not NULL
        let username = sqlx::query_scalar::<_, Option<String>>(
            "SELECT username FROM users WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(username.flatten())
    }
}
