use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};
use tracing::{debug, info};

use super::errors::RepositoryError;
use crate::database::DatabasePool;
use crate::models::user::{NewUser, UserRow};

/// Repository trait for user accounts
#[async_trait]
pub trait UserRepositoryTrait: Send + Sync {
    /// Insert a new user; a taken email yields `RepositoryError::Conflict`
    async fn create(&self, user: NewUser) -> Result<UserRow, RepositoryError>;

    /// Get a user by ID
    async fn find_by_id(&self, id: i64) -> Result<Option<UserRow>, RepositoryError>;

    /// Get a user by email (exact match)
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRow>, RepositoryError>;

    /// Delete a user together with the records only that user owns
    /// (medications, reminders, symptom diary entries) in one transaction.
    /// Fails with `ForeignKey` when shared records point at the user.
    async fn delete_with_owned_records(&self, id: i64) -> Result<(), RepositoryError>;
}

/// SQLite-backed user repository
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: DatabasePool,
}

impl UserRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

pub(crate) const USER_COLUMNS: &str = "id, name, email, password_hash, role, created_at";

pub(crate) fn map_user(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        role: row.get(4)?,
        created_at: row.get(5)?,
    })
}

#[async_trait]
impl UserRepositoryTrait for UserRepository {
    async fn create(&self, user: NewUser) -> Result<UserRow, RepositoryError> {
        debug!("Inserting user with role {}", user.role);
        let conn = self.pool.get()?;
        let created_at = Utc::now();

        conn.execute(
            "INSERT INTO users (name, email, password_hash, role, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![user.name, user.email, user.password_hash, user.role, created_at],
        )?;

        Ok(UserRow {
            id: conn.last_insert_rowid(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            created_at,
        })
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<UserRow>, RepositoryError> {
        debug!("Getting user by ID: {}", id);
        let conn = self.pool.get()?;
        let user = conn
            .query_row(
                &format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS),
                [id],
                map_user,
            )
            .optional()?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRow>, RepositoryError> {
        let conn = self.pool.get()?;
        let user = conn
            .query_row(
                &format!("SELECT {} FROM users WHERE email = ?1", USER_COLUMNS),
                [email],
                map_user,
            )
            .optional()?;
        Ok(user)
    }

    async fn delete_with_owned_records(&self, id: i64) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;

        let medications = tx.execute("DELETE FROM medications WHERE user_id = ?1", [id])?;
        let reminders = tx.execute("DELETE FROM reminders WHERE user_id = ?1", [id])?;
        let symptoms = tx.execute("DELETE FROM symptom_diary WHERE user_id = ?1", [id])?;
        let users = tx.execute("DELETE FROM users WHERE id = ?1", [id])?;

        if users == 0 {
            return Err(RepositoryError::NotFound(format!("user {}", id)));
        }

        tx.commit()?;
        info!(
            "Deleted user {} with {} medications, {} reminders, {} symptom entries",
            id, medications, reminders, symptoms
        );
        Ok(())
    }
}
