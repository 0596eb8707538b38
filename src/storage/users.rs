use super::schema::Database;
use super::types::{StoreError, User};

impl Database {
    // ========================================================================
    // User Operations
    // ========================================================================

    /// Register a new user. Names are unique.
    pub async fn insert_user(&self, name: &str) -> Result<User, StoreError> {
        let now = chrono::Utc::now().timestamp();
        let result = sqlx::query(
            "INSERT INTO users (created_at, updated_at, name) VALUES (?, ?, ?)",
        )
        .bind(now)
        .bind(now)
        .bind(name)
        .execute(&self.pool)
        .await?;

        Ok(User {
            id: result.last_insert_rowid(),
            created_at: now,
            updated_at: now,
            name: name.to_string(),
        })
    }

    pub async fn user_by_name(&self, name: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, created_at, updated_at, name FROM users WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Delete every user. Feeds, follows, and posts reference users (directly
    /// or through feeds) with `ON DELETE CASCADE`, so this empties all four
    /// tables.
    pub async fn reset_users(&self) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM users").execute(&self.pool).await?;
        Ok(())
    }

    pub async fn all_users(&self) -> Result<Vec<User>, StoreError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, created_at, updated_at, name FROM users ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }
}
