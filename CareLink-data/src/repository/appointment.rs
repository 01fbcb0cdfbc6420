use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use super::errors::RepositoryError;
use super::user::map_user;
use crate::database::DatabasePool;
use crate::models::appointment::{AppointmentRow, NewAppointment};
use crate::models::user::UserRow;

/// Repository trait for appointments
#[async_trait]
pub trait AppointmentRepositoryTrait: Send + Sync {
    /// Book a new appointment
    async fn create(&self, appointment: NewAppointment) -> Result<AppointmentRow, RepositoryError>;

    /// Get an appointment by ID
    async fn find_by_id(&self, id: i64) -> Result<Option<AppointmentRow>, RepositoryError>;

    /// Appointments where the user is the patient
    async fn list_for_patient(&self, patient_id: i64) -> Result<Vec<AppointmentRow>, RepositoryError>;

    /// Appointments where the user is the doctor
    async fn list_for_doctor(&self, doctor_id: i64) -> Result<Vec<AppointmentRow>, RepositoryError>;

    /// Appointments of a patient with the given status dated at or after `from`, soonest first
    async fn list_upcoming_for_patient(
        &self,
        patient_id: i64,
        status: &str,
        from: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<AppointmentRow>, RepositoryError>;

    /// Set the status of an appointment
    async fn update_status(&self, id: i64, status: &str) -> Result<Option<AppointmentRow>, RepositoryError>;

    /// Delete an appointment; returns whether a row was removed
    async fn delete(&self, id: i64) -> Result<bool, RepositoryError>;

    /// Distinct patients who have at least one appointment with the doctor
    async fn list_patients_of_doctor(&self, doctor_id: i64) -> Result<Vec<UserRow>, RepositoryError>;

    /// Whether any appointment, in any status, links the doctor and the patient
    async fn has_appointment_between(&self, doctor_id: i64, patient_id: i64) -> Result<bool, RepositoryError>;
}

/// SQLite-backed appointment repository
#[derive(Debug, Clone)]
pub struct AppointmentRepository {
    pool: DatabasePool,
}

impl AppointmentRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

const SELECT_APPOINTMENT: &str = "SELECT a.id, a.patient_id, a.doctor_id, a.date, a.reason, a.status, a.created_at,
        p.name, d.name
     FROM appointments a
     LEFT JOIN users p ON p.id = a.patient_id
     LEFT JOIN users d ON d.id = a.doctor_id";

fn map_appointment(row: &Row<'_>) -> rusqlite::Result<AppointmentRow> {
    Ok(AppointmentRow {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        doctor_id: row.get(2)?,
        date: row.get(3)?,
        reason: row.get(4)?,
        status: row.get(5)?,
        created_at: row.get(6)?,
        patient_name: row.get(7)?,
        doctor_name: row.get(8)?,
    })
}

fn fetch_by_id(conn: &Connection, id: i64) -> Result<Option<AppointmentRow>, RepositoryError> {
    let appointment = conn
        .query_row(&format!("{} WHERE a.id = ?1", SELECT_APPOINTMENT), [id], map_appointment)
        .optional()?;
    Ok(appointment)
}

fn fetch_list(
    conn: &Connection,
    filter: &str,
    params: impl rusqlite::Params,
) -> Result<Vec<AppointmentRow>, RepositoryError> {
    let mut stmt = conn.prepare(&format!("{} {}", SELECT_APPOINTMENT, filter))?;
    let rows = stmt.query_map(params, map_appointment)?;

    let mut result = Vec::new();
    for row in rows {
        result.push(row?);
    }
    Ok(result)
}

#[async_trait]
impl AppointmentRepositoryTrait for AppointmentRepository {
    async fn create(&self, appointment: NewAppointment) -> Result<AppointmentRow, RepositoryError> {
        debug!(
            "Inserting appointment patient={} doctor={}",
            appointment.patient_id, appointment.doctor_id
        );
        let conn = self.pool.get()?;

        conn.execute(
            "INSERT INTO appointments (patient_id, doctor_id, date, reason, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                appointment.patient_id,
                appointment.doctor_id,
                appointment.date,
                appointment.reason,
                appointment.status,
                Utc::now(),
            ],
        )?;

        let id = conn.last_insert_rowid();
        fetch_by_id(&conn, id)?.ok_or_else(|| RepositoryError::NotFound(format!("appointment {}", id)))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<AppointmentRow>, RepositoryError> {
        let conn = self.pool.get()?;
        fetch_by_id(&conn, id)
    }

    async fn list_for_patient(&self, patient_id: i64) -> Result<Vec<AppointmentRow>, RepositoryError> {
        let conn = self.pool.get()?;
        fetch_list(&conn, "WHERE a.patient_id = ?1 ORDER BY a.date DESC, a.id DESC", [patient_id])
    }

    async fn list_for_doctor(&self, doctor_id: i64) -> Result<Vec<AppointmentRow>, RepositoryError> {
        let conn = self.pool.get()?;
        fetch_list(&conn, "WHERE a.doctor_id = ?1 ORDER BY a.date DESC, a.id DESC", [doctor_id])
    }

    async fn list_upcoming_for_patient(
        &self,
        patient_id: i64,
        status: &str,
        from: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<AppointmentRow>, RepositoryError> {
        let conn = self.pool.get()?;
        fetch_list(
            &conn,
            "WHERE a.patient_id = ?1 AND a.status = ?2 AND a.date >= ?3 ORDER BY a.date ASC LIMIT ?4",
            params![patient_id, status, from, limit as i64],
        )
    }

    async fn update_status(&self, id: i64, status: &str) -> Result<Option<AppointmentRow>, RepositoryError> {
        debug!("Updating appointment {} status to {}", id, status);
        let conn = self.pool.get()?;
        let changed = conn.execute("UPDATE appointments SET status = ?1 WHERE id = ?2", params![status, id])?;
        if changed == 0 {
            return Ok(None);
        }
        fetch_by_id(&conn, id)
    }

    async fn delete(&self, id: i64) -> Result<bool, RepositoryError> {
        let conn = self.pool.get()?;
        let removed = conn.execute("DELETE FROM appointments WHERE id = ?1", [id])?;
        Ok(removed > 0)
    }

    async fn list_patients_of_doctor(&self, doctor_id: i64) -> Result<Vec<UserRow>, RepositoryError> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT u.id, u.name, u.email, u.password_hash, u.role, u.created_at
             FROM users u
             WHERE u.id IN (SELECT patient_id FROM appointments WHERE doctor_id = ?1)
             ORDER BY u.name, u.id",
        )?;
        let rows = stmt.query_map([doctor_id], map_user)?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    async fn has_appointment_between(&self, doctor_id: i64, patient_id: i64) -> Result<bool, RepositoryError> {
        let conn = self.pool.get()?;
        let linked: bool = conn.query_row(
            "SELECT EXISTS (SELECT 1 FROM appointments WHERE doctor_id = ?1 AND patient_id = ?2)",
            [doctor_id, patient_id],
            |row| row.get(0),
        )?;
        Ok(linked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::NewUser;
    use crate::repository::{UserRepository, UserRepositoryTrait};
    use chrono::Duration;

    async fn seed_user(pool: &DatabasePool, name: &str, role: &str) -> i64 {
        UserRepository::new(pool.clone())
            .create(NewUser {
                name: name.to_string(),
                email: format!("{}@example.com", name.to_lowercase()),
                password_hash: "hash".to_string(),
                role: role.to_string(),
            })
            .await
            .unwrap()
            .id
    }

    fn booking(patient_id: i64, doctor_id: i64, date: DateTime<Utc>) -> NewAppointment {
        NewAppointment {
            patient_id,
            doctor_id,
            date,
            reason: Some("Checkup".to_string()),
            status: "pending".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_attaches_names() {
        let pool = DatabasePool::in_memory().unwrap();
        let patient = seed_user(&pool, "Alice", "patient").await;
        let doctor = seed_user(&pool, "House", "doctor").await;
        let repo = AppointmentRepository::new(pool);

        let created = repo.create(booking(patient, doctor, Utc::now())).await.unwrap();
        assert_eq!(created.status, "pending");
        assert_eq!(created.patient_name.as_deref(), Some("Alice"));
        assert_eq!(created.doctor_name.as_deref(), Some("House"));

        let for_doctor = repo.list_for_doctor(doctor).await.unwrap();
        assert_eq!(for_doctor.len(), 1);
        assert!(repo.list_for_patient(doctor).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_relationship_follows_appointment_lifecycle() {
        let pool = DatabasePool::in_memory().unwrap();
        let patient = seed_user(&pool, "Bob", "patient").await;
        let doctor = seed_user(&pool, "Grey", "doctor").await;
        let repo = AppointmentRepository::new(pool);

        assert!(!repo.has_appointment_between(doctor, patient).await.unwrap());

        let appointment = repo.create(booking(patient, doctor, Utc::now())).await.unwrap();
        repo.update_status(appointment.id, "rejected").await.unwrap();
        assert!(repo.has_appointment_between(doctor, patient).await.unwrap());
        assert!(!repo.has_appointment_between(patient, doctor).await.unwrap());

        assert!(repo.delete(appointment.id).await.unwrap());
        assert!(!repo.has_appointment_between(doctor, patient).await.unwrap());
        assert!(!repo.delete(appointment.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_upcoming_filters_status_and_date() {
        let pool = DatabasePool::in_memory().unwrap();
        let patient = seed_user(&pool, "Carol", "patient").await;
        let doctor = seed_user(&pool, "Strange", "doctor").await;
        let repo = AppointmentRepository::new(pool);
        let now = Utc::now();

        let past = repo.create(booking(patient, doctor, now - Duration::days(2))).await.unwrap();
        let later = repo.create(booking(patient, doctor, now + Duration::days(5))).await.unwrap();
        let sooner = repo.create(booking(patient, doctor, now + Duration::days(1))).await.unwrap();
        let _pending = repo.create(booking(patient, doctor, now + Duration::days(3))).await.unwrap();
        for id in [past.id, later.id, sooner.id] {
            repo.update_status(id, "approved").await.unwrap();
        }

        let upcoming = repo.list_upcoming_for_patient(patient, "approved", now, 5).await.unwrap();
        let ids: Vec<i64> = upcoming.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![sooner.id, later.id]);

        let limited = repo.list_upcoming_for_patient(patient, "approved", now, 1).await.unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[tokio::test]
    async fn test_patients_of_doctor_are_distinct() {
        let pool = DatabasePool::in_memory().unwrap();
        let alice = seed_user(&pool, "Alice", "patient").await;
        let bob = seed_user(&pool, "Bob", "patient").await;
        let doctor = seed_user(&pool, "Who", "doctor").await;
        let repo = AppointmentRepository::new(pool);

        repo.create(booking(alice, doctor, Utc::now())).await.unwrap();
        repo.create(booking(alice, doctor, Utc::now())).await.unwrap();
        repo.create(booking(bob, doctor, Utc::now())).await.unwrap();

        let patients = repo.list_patients_of_doctor(doctor).await.unwrap();
        let names: Vec<&str> = patients.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Alice", "Bob"]);
    }
}
