use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use super::errors::RepositoryError;
use crate::database::DatabasePool;
use crate::models::prescription::{NewPrescription, PrescriptionRow};

/// Repository trait for prescriptions
#[async_trait]
pub trait PrescriptionRepositoryTrait: Send + Sync {
    async fn create(&self, prescription: NewPrescription) -> Result<PrescriptionRow, RepositoryError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<PrescriptionRow>, RepositoryError>;

    /// Prescriptions written for the patient, newest first
    async fn list_for_patient(&self, patient_id: i64) -> Result<Vec<PrescriptionRow>, RepositoryError>;

    /// Prescriptions authored by the doctor, newest first
    async fn list_for_doctor(&self, doctor_id: i64) -> Result<Vec<PrescriptionRow>, RepositoryError>;
}

/// SQLite-backed prescription repository
#[derive(Debug, Clone)]
pub struct PrescriptionRepository {
    pool: DatabasePool,
}

impl PrescriptionRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

const SELECT_PRESCRIPTION: &str = "SELECT r.id, r.patient_id, r.doctor_id, r.medicine, r.dosage, r.timing,
        r.duration, r.notes, r.created_at, p.name, d.name
     FROM prescriptions r
     LEFT JOIN users p ON p.id = r.patient_id
     LEFT JOIN users d ON d.id = r.doctor_id";

fn map_prescription(row: &Row<'_>) -> rusqlite::Result<PrescriptionRow> {
    Ok(PrescriptionRow {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        doctor_id: row.get(2)?,
        medicine: row.get(3)?,
        dosage: row.get(4)?,
        timing: row.get(5)?,
        duration: row.get(6)?,
        notes: row.get(7)?,
        created_at: row.get(8)?,
        patient_name: row.get(9)?,
        doctor_name: row.get(10)?,
    })
}

fn fetch_by_id(conn: &Connection, id: i64) -> Result<Option<PrescriptionRow>, RepositoryError> {
    let prescription = conn
        .query_row(&format!("{} WHERE r.id = ?1", SELECT_PRESCRIPTION), [id], map_prescription)
        .optional()?;
    Ok(prescription)
}

fn fetch_for(conn: &Connection, column: &str, user_id: i64) -> Result<Vec<PrescriptionRow>, RepositoryError> {
    let mut stmt = conn.prepare(&format!(
        "{} WHERE r.{} = ?1 ORDER BY r.created_at DESC, r.id DESC",
        SELECT_PRESCRIPTION, column
    ))?;
    let rows = stmt.query_map([user_id], map_prescription)?;

    let mut result = Vec::new();
    for row in rows {
        result.push(row?);
    }
    Ok(result)
}

#[async_trait]
impl PrescriptionRepositoryTrait for PrescriptionRepository {
    async fn create(&self, prescription: NewPrescription) -> Result<PrescriptionRow, RepositoryError> {
        debug!(
            "Inserting prescription doctor={} patient={}",
            prescription.doctor_id, prescription.patient_id
        );
        let conn = self.pool.get()?;

        conn.execute(
            "INSERT INTO prescriptions (patient_id, doctor_id, medicine, dosage, timing, duration, notes, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                prescription.patient_id,
                prescription.doctor_id,
                prescription.medicine,
                prescription.dosage,
                prescription.timing,
                prescription.duration,
                prescription.notes,
                Utc::now(),
            ],
        )?;

        let id = conn.last_insert_rowid();
        fetch_by_id(&conn, id)?.ok_or_else(|| RepositoryError::NotFound(format!("prescription {}", id)))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<PrescriptionRow>, RepositoryError> {
        let conn = self.pool.get()?;
        fetch_by_id(&conn, id)
    }

    async fn list_for_patient(&self, patient_id: i64) -> Result<Vec<PrescriptionRow>, RepositoryError> {
        let conn = self.pool.get()?;
        fetch_for(&conn, "patient_id", patient_id)
    }

    async fn list_for_doctor(&self, doctor_id: i64) -> Result<Vec<PrescriptionRow>, RepositoryError> {
        let conn = self.pool.get()?;
        fetch_for(&conn, "doctor_id", doctor_id)
    }
}
