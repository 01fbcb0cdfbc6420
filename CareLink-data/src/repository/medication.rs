use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use super::errors::RepositoryError;
use crate::database::DatabasePool;
use crate::models::medication::{MedicationChanges, MedicationRow, NewMedication};

/// Repository trait for tracked medications
#[async_trait]
pub trait MedicationRepositoryTrait: Send + Sync {
    async fn create(&self, medication: NewMedication) -> Result<MedicationRow, RepositoryError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<MedicationRow>, RepositoryError>;

    /// All medications of a user ordered by dose time
    async fn list_for_user(&self, user_id: i64) -> Result<Vec<MedicationRow>, RepositoryError>;

    /// Apply only the supplied fields
    async fn update(&self, id: i64, changes: MedicationChanges) -> Result<Option<MedicationRow>, RepositoryError>;

    async fn delete(&self, id: i64) -> Result<bool, RepositoryError>;
}

/// SQLite-backed medication repository
#[derive(Debug, Clone)]
pub struct MedicationRepository {
    pool: DatabasePool,
}

impl MedicationRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

const SELECT_MEDICATION: &str = "SELECT id, user_id, name, dosage, time, total_tablets, remaining_tablets, created_at
     FROM medications";

fn map_medication(row: &Row<'_>) -> rusqlite::Result<MedicationRow> {
    Ok(MedicationRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        dosage: row.get(3)?,
        time: row.get(4)?,
        total_tablets: row.get(5)?,
        remaining_tablets: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn fetch_by_id(conn: &Connection, id: i64) -> Result<Option<MedicationRow>, RepositoryError> {
    let medication = conn
        .query_row(&format!("{} WHERE id = ?1", SELECT_MEDICATION), [id], map_medication)
        .optional()?;
    Ok(medication)
}

#[async_trait]
impl MedicationRepositoryTrait for MedicationRepository {
    async fn create(&self, medication: NewMedication) -> Result<MedicationRow, RepositoryError> {
        debug!("Inserting medication for user {}", medication.user_id);
        let conn = self.pool.get()?;
        let created_at = Utc::now();

        conn.execute(
            "INSERT INTO medications (user_id, name, dosage, time, total_tablets, remaining_tablets, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                medication.user_id,
                medication.name,
                medication.dosage,
                medication.time,
                medication.total_tablets,
                medication.remaining_tablets,
                created_at,
            ],
        )?;

        Ok(MedicationRow {
            id: conn.last_insert_rowid(),
            user_id: medication.user_id,
            name: medication.name,
            dosage: medication.dosage,
            time: medication.time,
            total_tablets: medication.total_tablets,
            remaining_tablets: medication.remaining_tablets,
            created_at,
        })
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<MedicationRow>, RepositoryError> {
        let conn = self.pool.get()?;
        fetch_by_id(&conn, id)
    }

    async fn list_for_user(&self, user_id: i64) -> Result<Vec<MedicationRow>, RepositoryError> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!("{} WHERE user_id = ?1 ORDER BY time, id", SELECT_MEDICATION))?;
        let rows = stmt.query_map([user_id], map_medication)?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    async fn update(&self, id: i64, changes: MedicationChanges) -> Result<Option<MedicationRow>, RepositoryError> {
        debug!("Updating medication {}", id);
        let conn = self.pool.get()?;

        let changed = conn.execute(
            "UPDATE medications SET
                name = COALESCE(?1, name),
                dosage = COALESCE(?2, dosage),
                time = COALESCE(?3, time),
                total_tablets = COALESCE(?4, total_tablets),
                remaining_tablets = COALESCE(?5, remaining_tablets)
             WHERE id = ?6",
            params![
                changes.name,
                changes.dosage,
                changes.time,
                changes.total_tablets,
                changes.remaining_tablets,
                id,
            ],
        )?;

        if changed == 0 {
            return Ok(None);
        }
        fetch_by_id(&conn, id)
    }

    async fn delete(&self, id: i64) -> Result<bool, RepositoryError> {
        let conn = self.pool.get()?;
        let removed = conn.execute("DELETE FROM medications WHERE id = ?1", [id])?;
        Ok(removed > 0)
    }
}
