use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use super::errors::RepositoryError;
use crate::database::DatabasePool;
use crate::models::reminder::{NewReminder, ReminderChanges, ReminderRow};

/// Repository trait for reminders
#[async_trait]
pub trait ReminderRepositoryTrait: Send + Sync {
    async fn create(&self, reminder: NewReminder) -> Result<ReminderRow, RepositoryError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<ReminderRow>, RepositoryError>;

    /// Active reminders of a user ordered by time of day
    async fn list_active_for_user(&self, user_id: i64) -> Result<Vec<ReminderRow>, RepositoryError>;

    /// Apply only the supplied fields
    async fn update(&self, id: i64, changes: ReminderChanges) -> Result<Option<ReminderRow>, RepositoryError>;

    async fn delete(&self, id: i64) -> Result<bool, RepositoryError>;
}

/// SQLite-backed reminder repository
#[derive(Debug, Clone)]
pub struct ReminderRepository {
    pool: DatabasePool,
}

impl ReminderRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

const SELECT_REMINDER: &str = "SELECT id, user_id, type, title, time, is_active, created_at FROM reminders";

fn map_reminder(row: &Row<'_>) -> rusqlite::Result<ReminderRow> {
    Ok(ReminderRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        reminder_type: row.get(2)?,
        title: row.get(3)?,
        time: row.get(4)?,
        is_active: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn fetch_by_id(conn: &Connection, id: i64) -> Result<Option<ReminderRow>, RepositoryError> {
    let reminder = conn
        .query_row(&format!("{} WHERE id = ?1", SELECT_REMINDER), [id], map_reminder)
        .optional()?;
    Ok(reminder)
}

#[async_trait]
impl ReminderRepositoryTrait for ReminderRepository {
    async fn create(&self, reminder: NewReminder) -> Result<ReminderRow, RepositoryError> {
        debug!("Inserting {} reminder for user {}", reminder.reminder_type, reminder.user_id);
        let conn = self.pool.get()?;
        let created_at = Utc::now();

        conn.execute(
            "INSERT INTO reminders (user_id, type, title, time, is_active, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                reminder.user_id,
                reminder.reminder_type,
                reminder.title,
                reminder.time,
                reminder.is_active,
                created_at,
            ],
        )?;

        Ok(ReminderRow {
            id: conn.last_insert_rowid(),
            user_id: reminder.user_id,
            reminder_type: reminder.reminder_type,
            title: reminder.title,
            time: reminder.time,
            is_active: reminder.is_active,
            created_at,
        })
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ReminderRow>, RepositoryError> {
        let conn = self.pool.get()?;
        fetch_by_id(&conn, id)
    }

    async fn list_active_for_user(&self, user_id: i64) -> Result<Vec<ReminderRow>, RepositoryError> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE user_id = ?1 AND is_active = 1 ORDER BY time, id",
            SELECT_REMINDER
        ))?;
        let rows = stmt.query_map([user_id], map_reminder)?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    async fn update(&self, id: i64, changes: ReminderChanges) -> Result<Option<ReminderRow>, RepositoryError> {
        debug!("Updating reminder {}", id);
        let conn = self.pool.get()?;

        let changed = conn.execute(
            "UPDATE reminders SET
                type = COALESCE(?1, type),
                title = COALESCE(?2, title),
                time = COALESCE(?3, time),
                is_active = COALESCE(?4, is_active)
             WHERE id = ?5",
            params![changes.reminder_type, changes.title, changes.time, changes.is_active, id],
        )?;

        if changed == 0 {
            return Ok(None);
        }
        fetch_by_id(&conn, id)
    }

    async fn delete(&self, id: i64) -> Result<bool, RepositoryError> {
        let conn = self.pool.get()?;
        let removed = conn.execute("DELETE FROM reminders WHERE id = ?1", [id])?;
        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::NewUser;
    use crate::repository::{UserRepository, UserRepositoryTrait};

    #[tokio::test]
    async fn test_deactivated_reminders_are_not_listed() {
        let pool = DatabasePool::in_memory().unwrap();
        let user = UserRepository::new(pool.clone())
            .create(NewUser {
                name: "Rae".to_string(),
                email: "rae@example.com".to_string(),
                password_hash: "hash".to_string(),
                role: "patient".to_string(),
            })
            .await
            .unwrap();
        let repo = ReminderRepository::new(pool);

        let walk = repo
            .create(NewReminder {
                user_id: user.id,
                reminder_type: "exercise".to_string(),
                title: "Walk".to_string(),
                time: "18:00".to_string(),
                is_active: true,
            })
            .await
            .unwrap();
        repo.create(NewReminder {
            user_id: user.id,
            reminder_type: "food".to_string(),
            title: "Breakfast".to_string(),
            time: "07:00".to_string(),
            is_active: true,
        })
        .await
        .unwrap();

        let updated = repo
            .update(
                walk.id,
                ReminderChanges {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .expect("row exists");
        assert!(!updated.is_active);
        assert_eq!(updated.title, "Walk");

        let active = repo.list_active_for_user(user.id).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].title, "Breakfast");
    }
}
