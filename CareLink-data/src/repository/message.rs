use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use super::errors::RepositoryError;
use crate::database::DatabasePool;
use crate::models::message::{MessageRow, NewMessage};

/// Repository trait for direct messages
#[async_trait]
pub trait MessageRepositoryTrait: Send + Sync {
    async fn create(&self, message: NewMessage) -> Result<MessageRow, RepositoryError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<MessageRow>, RepositoryError>;

    /// Every message the user sent or received, newest first
    async fn list_for_user(&self, user_id: i64) -> Result<Vec<MessageRow>, RepositoryError>;

    /// Both directions of the exchange between two users, oldest first
    async fn conversation(&self, user_id: i64, other_user_id: i64) -> Result<Vec<MessageRow>, RepositoryError>;

    async fn mark_read(&self, id: i64) -> Result<Option<MessageRow>, RepositoryError>;
}

/// SQLite-backed message repository
#[derive(Debug, Clone)]
pub struct MessageRepository {
    pool: DatabasePool,
}

impl MessageRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

const SELECT_MESSAGE: &str = "SELECT m.id, m.sender_id, m.receiver_id, m.message, m.timestamp, m.is_read,
        s.name, r.name
     FROM messages m
     LEFT JOIN users s ON s.id = m.sender_id
     LEFT JOIN users r ON r.id = m.receiver_id";

fn map_message(row: &Row<'_>) -> rusqlite::Result<MessageRow> {
    Ok(MessageRow {
        id: row.get(0)?,
        sender_id: row.get(1)?,
        receiver_id: row.get(2)?,
        message: row.get(3)?,
        timestamp: row.get(4)?,
        is_read: row.get(5)?,
        sender_name: row.get(6)?,
        receiver_name: row.get(7)?,
    })
}

fn fetch_by_id(conn: &Connection, id: i64) -> Result<Option<MessageRow>, RepositoryError> {
    let message = conn
        .query_row(&format!("{} WHERE m.id = ?1", SELECT_MESSAGE), [id], map_message)
        .optional()?;
    Ok(message)
}

fn fetch_list(conn: &Connection, filter: &str, params: impl rusqlite::Params) -> Result<Vec<MessageRow>, RepositoryError> {
    let mut stmt = conn.prepare(&format!("{} {}", SELECT_MESSAGE, filter))?;
    let rows = stmt.query_map(params, map_message)?;

    let mut result = Vec::new();
    for row in rows {
        result.push(row?);
    }
    Ok(result)
}

#[async_trait]
impl MessageRepositoryTrait for MessageRepository {
    async fn create(&self, message: NewMessage) -> Result<MessageRow, RepositoryError> {
        debug!("Inserting message {} -> {}", message.sender_id, message.receiver_id);
        let conn = self.pool.get()?;

        conn.execute(
            "INSERT INTO messages (sender_id, receiver_id, message, timestamp, is_read)
             VALUES (?1, ?2, ?3, ?4, 0)",
            params![message.sender_id, message.receiver_id, message.message, Utc::now()],
        )?;

        let id = conn.last_insert_rowid();
        fetch_by_id(&conn, id)?.ok_or_else(|| RepositoryError::NotFound(format!("message {}", id)))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<MessageRow>, RepositoryError> {
        let conn = self.pool.get()?;
        fetch_by_id(&conn, id)
    }

    async fn list_for_user(&self, user_id: i64) -> Result<Vec<MessageRow>, RepositoryError> {
        let conn = self.pool.get()?;
        fetch_list(
            &conn,
            "WHERE m.sender_id = ?1 OR m.receiver_id = ?1 ORDER BY m.timestamp DESC, m.id DESC",
            [user_id],
        )
    }

    async fn conversation(&self, user_id: i64, other_user_id: i64) -> Result<Vec<MessageRow>, RepositoryError> {
        let conn = self.pool.get()?;
        fetch_list(
            &conn,
            "WHERE (m.sender_id = ?1 AND m.receiver_id = ?2) OR (m.sender_id = ?2 AND m.receiver_id = ?1)
             ORDER BY m.timestamp ASC, m.id ASC",
            [user_id, other_user_id],
        )
    }

    async fn mark_read(&self, id: i64) -> Result<Option<MessageRow>, RepositoryError> {
        let conn = self.pool.get()?;
        let changed = conn.execute("UPDATE messages SET is_read = 1 WHERE id = ?1", [id])?;
        if changed == 0 {
            return Ok(None);
        }
        fetch_by_id(&conn, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::NewUser;
    use crate::repository::{UserRepository, UserRepositoryTrait};

    async fn seed(pool: &DatabasePool, name: &str) -> i64 {
        UserRepository::new(pool.clone())
            .create(NewUser {
                name: name.to_string(),
                email: format!("{}@example.com", name.to_lowercase()),
                password_hash: "hash".to_string(),
                role: "patient".to_string(),
            })
            .await
            .unwrap()
            .id
    }

    fn note(sender_id: i64, receiver_id: i64, text: &str) -> NewMessage {
        NewMessage {
            sender_id,
            receiver_id,
            message: text.to_string(),
        }
    }

    #[tokio::test]
    async fn test_conversation_excludes_third_parties() {
        let pool = DatabasePool::in_memory().unwrap();
        let ann = seed(&pool, "Ann").await;
        let ben = seed(&pool, "Ben").await;
        let cat = seed(&pool, "Cat").await;
        let repo = MessageRepository::new(pool);

        let first = repo.create(note(ann, ben, "hi")).await.unwrap();
        repo.create(note(ben, ann, "hello")).await.unwrap();
        repo.create(note(cat, ann, "unrelated")).await.unwrap();

        assert_eq!(first.sender_name.as_deref(), Some("Ann"));
        assert_eq!(first.receiver_name.as_deref(), Some("Ben"));
        assert!(!first.is_read);

        let chat: Vec<String> = repo
            .conversation(ben, ann)
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.message)
            .collect();
        assert_eq!(chat, vec!["hi", "hello"]);

        assert_eq!(repo.list_for_user(ann).await.unwrap().len(), 3);
        assert_eq!(repo.list_for_user(cat).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_mark_read() {
        let pool = DatabasePool::in_memory().unwrap();
        let ann = seed(&pool, "Ann").await;
        let ben = seed(&pool, "Ben").await;
        let repo = MessageRepository::new(pool);

        let sent = repo.create(note(ann, ben, "ping")).await.unwrap();
        let read = repo.mark_read(sent.id).await.unwrap().expect("row exists");
        assert!(read.is_read);
        assert!(repo.mark_read(sent.id + 100).await.unwrap().is_none());
    }
}
