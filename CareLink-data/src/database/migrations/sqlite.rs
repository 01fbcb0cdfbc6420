use rusqlite::Connection;
use tracing::{debug, info};

use crate::database::DatabaseError;

/// Tables in dependency order. Every statement is idempotent.
const TABLES: &[(&str, &str)] = &[
    (
        "users",
        "CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            role TEXT NOT NULL CHECK (role IN ('patient', 'doctor')),
            created_at TEXT NOT NULL
        )",
    ),
    (
        "appointments",
        "CREATE TABLE IF NOT EXISTS appointments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            patient_id INTEGER NOT NULL REFERENCES users(id),
            doctor_id INTEGER NOT NULL REFERENCES users(id),
            date TEXT NOT NULL,
            reason TEXT,
            status TEXT NOT NULL DEFAULT 'pending'
                CHECK (status IN ('pending', 'approved', 'rejected', 'completed', 'cancelled')),
            created_at TEXT NOT NULL
        )",
    ),
    (
        "prescriptions",
        "CREATE TABLE IF NOT EXISTS prescriptions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            patient_id INTEGER NOT NULL REFERENCES users(id),
            doctor_id INTEGER NOT NULL REFERENCES users(id),
            medicine TEXT NOT NULL,
            dosage TEXT NOT NULL,
            timing TEXT NOT NULL,
            duration TEXT,
            notes TEXT,
            created_at TEXT NOT NULL
        )",
    ),
    (
        "medications",
        "CREATE TABLE IF NOT EXISTS medications (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id),
            name TEXT NOT NULL,
            dosage TEXT NOT NULL,
            time TEXT NOT NULL,
            total_tablets INTEGER NOT NULL CHECK (total_tablets >= 0),
            remaining_tablets INTEGER NOT NULL CHECK (remaining_tablets >= 0),
            created_at TEXT NOT NULL
        )",
    ),
    (
        "reminders",
        "CREATE TABLE IF NOT EXISTS reminders (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id),
            type TEXT NOT NULL CHECK (type IN ('medicine', 'food', 'exercise', 'custom')),
            title TEXT NOT NULL,
            time TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL
        )",
    ),
    (
        "symptom_diary",
        "CREATE TABLE IF NOT EXISTS symptom_diary (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id),
            date TEXT NOT NULL,
            symptoms TEXT NOT NULL,
            severity INTEGER NOT NULL CHECK (severity BETWEEN 1 AND 10),
            notes TEXT,
            created_at TEXT NOT NULL
        )",
    ),
    (
        "messages",
        "CREATE TABLE IF NOT EXISTS messages (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            sender_id INTEGER NOT NULL REFERENCES users(id),
            receiver_id INTEGER NOT NULL REFERENCES users(id),
            message TEXT NOT NULL,
            timestamp TEXT NOT NULL,
            is_read INTEGER NOT NULL DEFAULT 0
        )",
    ),
    (
        "health_records",
        "CREATE TABLE IF NOT EXISTS health_records (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            patient_id INTEGER NOT NULL REFERENCES users(id),
            type TEXT NOT NULL CHECK (type IN ('lab_report', 'prescription', 'medical_document', 'imaging')),
            title TEXT NOT NULL,
            file_url TEXT NOT NULL,
            notes TEXT,
            uploaded_at TEXT NOT NULL
        )",
    ),
];

const INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_appointments_patient ON appointments (patient_id)",
    "CREATE INDEX IF NOT EXISTS idx_appointments_doctor_patient ON appointments (doctor_id, patient_id)",
    "CREATE INDEX IF NOT EXISTS idx_prescriptions_patient ON prescriptions (patient_id)",
    "CREATE INDEX IF NOT EXISTS idx_prescriptions_doctor ON prescriptions (doctor_id)",
    "CREATE INDEX IF NOT EXISTS idx_medications_user ON medications (user_id)",
    "CREATE INDEX IF NOT EXISTS idx_reminders_user ON reminders (user_id)",
    "CREATE INDEX IF NOT EXISTS idx_symptom_diary_user_date ON symptom_diary (user_id, date DESC)",
    "CREATE INDEX IF NOT EXISTS idx_messages_sender ON messages (sender_id)",
    "CREATE INDEX IF NOT EXISTS idx_messages_receiver ON messages (receiver_id)",
    "CREATE INDEX IF NOT EXISTS idx_health_records_patient ON health_records (patient_id)",
];

/// Run SQLite migrations inside a single transaction
pub fn run_migrations(conn: &mut Connection) -> Result<(), DatabaseError> {
    info!("Running SQLite migrations");

    let tx = conn
        .transaction()
        .map_err(|e| DatabaseError::MigrationError(e.to_string()))?;

    for (table, ddl) in TABLES {
        debug!("Creating {} table if not exists", table);
        tx.execute(ddl, [])
            .map_err(|e| DatabaseError::MigrationError(format!("table {}: {}", table, e)))?;
    }

    for ddl in INDEXES {
        tx.execute(ddl, [])
            .map_err(|e| DatabaseError::MigrationError(format!("Failed to create index: {}", e)))?;
    }

    tx.commit()
        .map_err(|e| DatabaseError::MigrationError(e.to_string()))?;

    info!("SQLite migrations completed successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let mut conn = Connection::open_in_memory().expect("connection");
        run_migrations(&mut conn).expect("first run");
        run_migrations(&mut conn).expect("second run");

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
                [],
                |row| row.get(0),
            )
            .expect("count tables");
        assert_eq!(count as usize, TABLES.len());
    }

    #[test]
    fn test_role_check_constraint() {
        let mut conn = Connection::open_in_memory().expect("connection");
        run_migrations(&mut conn).expect("migrations");

        let result = conn.execute(
            "INSERT INTO users (name, email, password_hash, role, created_at)
             VALUES ('Eve', 'eve@example.com', 'x', 'admin', '2024-01-01 00:00:00+00:00')",
            [],
        );
        assert!(result.is_err());
    }
}
