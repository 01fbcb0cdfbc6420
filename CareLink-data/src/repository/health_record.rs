use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};
use tracing::debug;

use super::errors::RepositoryError;
use crate::database::DatabasePool;
use crate::models::health_record::{HealthRecordRow, NewHealthRecord};

/// Repository trait for uploaded health records
#[async_trait]
pub trait HealthRecordRepositoryTrait: Send + Sync {
    async fn create(&self, record: NewHealthRecord) -> Result<HealthRecordRow, RepositoryError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<HealthRecordRow>, RepositoryError>;

    /// Records of a patient, most recent upload first
    async fn list_for_patient(&self, patient_id: i64) -> Result<Vec<HealthRecordRow>, RepositoryError>;

    async fn delete(&self, id: i64) -> Result<bool, RepositoryError>;
}

/// SQLite-backed health record repository
#[derive(Debug, Clone)]
pub struct HealthRecordRepository {
    pool: DatabasePool,
}

impl HealthRecordRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

const SELECT_RECORD: &str = "SELECT id, patient_id, type, title, file_url, notes, uploaded_at FROM health_records";

fn map_record(row: &Row<'_>) -> rusqlite::Result<HealthRecordRow> {
    Ok(HealthRecordRow {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        record_type: row.get(2)?,
        title: row.get(3)?,
        file_url: row.get(4)?,
        notes: row.get(5)?,
        uploaded_at: row.get(6)?,
    })
}

#[async_trait]
impl HealthRecordRepositoryTrait for HealthRecordRepository {
    async fn create(&self, record: NewHealthRecord) -> Result<HealthRecordRow, RepositoryError> {
        debug!("Inserting {} record for patient {}", record.record_type, record.patient_id);
        let conn = self.pool.get()?;
        let uploaded_at = Utc::now();

        conn.execute(
            "INSERT INTO health_records (patient_id, type, title, file_url, notes, uploaded_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.patient_id,
                record.record_type,
                record.title,
                record.file_url,
                record.notes,
                uploaded_at,
            ],
        )?;

        Ok(HealthRecordRow {
            id: conn.last_insert_rowid(),
            patient_id: record.patient_id,
            record_type: record.record_type,
            title: record.title,
            file_url: record.file_url,
            notes: record.notes,
            uploaded_at,
        })
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<HealthRecordRow>, RepositoryError> {
        let conn = self.pool.get()?;
        let record = conn
            .query_row(&format!("{} WHERE id = ?1", SELECT_RECORD), [id], map_record)
            .optional()?;
        Ok(record)
    }

    async fn list_for_patient(&self, patient_id: i64) -> Result<Vec<HealthRecordRow>, RepositoryError> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE patient_id = ?1 ORDER BY uploaded_at DESC, id DESC",
            SELECT_RECORD
        ))?;
        let rows = stmt.query_map([patient_id], map_record)?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    async fn delete(&self, id: i64) -> Result<bool, RepositoryError> {
        let conn = self.pool.get()?;
        let removed = conn.execute("DELETE FROM health_records WHERE id = ?1", [id])?;
        Ok(removed > 0)
    }
}
