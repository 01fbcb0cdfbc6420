use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};
use tracing::debug;

use super::errors::RepositoryError;
use crate::database::DatabasePool;
use crate::models::symptom_diary::{NewSymptomEntry, SymptomEntryRow};

/// Repository trait for symptom diary entries
#[async_trait]
pub trait SymptomDiaryRepositoryTrait: Send + Sync {
    async fn create(&self, entry: NewSymptomEntry) -> Result<SymptomEntryRow, RepositoryError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<SymptomEntryRow>, RepositoryError>;

    /// Entries of a user, most recent date first, optionally capped
    async fn list_for_user(&self, user_id: i64, limit: Option<usize>) -> Result<Vec<SymptomEntryRow>, RepositoryError>;

    async fn delete(&self, id: i64) -> Result<bool, RepositoryError>;
}

/// SQLite-backed symptom diary repository
#[derive(Debug, Clone)]
pub struct SymptomDiaryRepository {
    pool: DatabasePool,
}

impl SymptomDiaryRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

const SELECT_ENTRY: &str = "SELECT id, user_id, date, symptoms, severity, notes, created_at FROM symptom_diary";

fn map_entry(row: &Row<'_>) -> rusqlite::Result<SymptomEntryRow> {
    Ok(SymptomEntryRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        date: row.get(2)?,
        symptoms: row.get(3)?,
        severity: row.get(4)?,
        notes: row.get(5)?,
        created_at: row.get(6)?,
    })
}

#[async_trait]
impl SymptomDiaryRepositoryTrait for SymptomDiaryRepository {
    async fn create(&self, entry: NewSymptomEntry) -> Result<SymptomEntryRow, RepositoryError> {
        debug!("Inserting symptom entry for user {}", entry.user_id);
        let conn = self.pool.get()?;
        let created_at = Utc::now();

        conn.execute(
            "INSERT INTO symptom_diary (user_id, date, symptoms, severity, notes, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![entry.user_id, entry.date, entry.symptoms, entry.severity, entry.notes, created_at],
        )?;

        Ok(SymptomEntryRow {
            id: conn.last_insert_rowid(),
            user_id: entry.user_id,
            date: entry.date,
            symptoms: entry.symptoms,
            severity: entry.severity,
            notes: entry.notes,
            created_at,
        })
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<SymptomEntryRow>, RepositoryError> {
        let conn = self.pool.get()?;
        let entry = conn
            .query_row(&format!("{} WHERE id = ?1", SELECT_ENTRY), [id], map_entry)
            .optional()?;
        Ok(entry)
    }

    async fn list_for_user(&self, user_id: i64, limit: Option<usize>) -> Result<Vec<SymptomEntryRow>, RepositoryError> {
        let conn = self.pool.get()?;
        // SQLite treats a negative LIMIT as "no limit"
        let limit = limit.map(|l| l as i64).unwrap_or(-1);
        let mut stmt = conn.prepare(&format!(
            "{} WHERE user_id = ?1 ORDER BY date DESC, id DESC LIMIT ?2",
            SELECT_ENTRY
        ))?;
        let rows = stmt.query_map(params![user_id, limit], map_entry)?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    async fn delete(&self, id: i64) -> Result<bool, RepositoryError> {
        let conn = self.pool.get()?;
        let removed = conn.execute("DELETE FROM symptom_diary WHERE id = ?1", [id])?;
        Ok(removed > 0)
    }
}
