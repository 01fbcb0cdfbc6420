//! Database connection module for CareLink
//!
//! Every repository shares a single r2d2 pool of SQLite connections. The pool
//! is created once at start-up and handed to repositories explicitly.

use std::env;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use r2d2::PooledConnection;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OpenFlags;
use tracing::{debug, info};

use super::migrations::run_sqlite_migrations;
use super::DatabaseError;

/// Connection pool over SQLite connections
pub type SqlitePool = r2d2::Pool<SqliteConnectionManager>;

/// Pragmas applied to every pooled connection
const CONNECTION_PRAGMAS: &str = "PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;";

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Path to SQLite database file
    pub sqlite_path: String,
    /// Maximum number of connections
    pub max_connections: u32,
    /// Connection timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            sqlite_path: "data/care_link.db".to_string(),
            max_connections: 10,
            timeout_seconds: 30,
        }
    }
}

impl DatabaseConfig {
    /// Create a new database configuration from environment variables
    pub fn from_env() -> Result<Self, DatabaseError> {
        let defaults = Self::default();

        let sqlite_path = env::var("DB_SQLITE_PATH").unwrap_or(defaults.sqlite_path);
        if sqlite_path.trim().is_empty() {
            return Err(DatabaseError::ConfigError("DB_SQLITE_PATH must not be empty".to_string()));
        }

        let max_connections = match env::var("DB_MAX_CONNECTIONS") {
            Ok(value) => value.parse::<u32>().map_err(|_| {
                DatabaseError::ConfigError(format!("DB_MAX_CONNECTIONS is not a number: {}", value))
            })?,
            Err(_) => defaults.max_connections,
        };

        let timeout_seconds = env::var("DB_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(defaults.timeout_seconds);

        info!(
            "Database configuration: path={}, max_connections={}, timeout={}s",
            sqlite_path, max_connections, timeout_seconds
        );

        Ok(Self {
            sqlite_path,
            max_connections: max_connections.max(1),
            timeout_seconds,
        })
    }
}

/// Shared handle to the connection pool
#[derive(Debug, Clone)]
pub struct DatabasePool {
    pool: Arc<SqlitePool>,
    location: String,
}

impl DatabasePool {
    /// Open (or create) the SQLite database file and run migrations
    pub fn open(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        info!("Initializing SQLite database at: {}", config.sqlite_path);

        if let Some(parent) = Path::new(&config.sqlite_path).parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                info!("Creating parent directory: {:?}", parent);
                fs::create_dir_all(parent)?;
            }
        }

        let manager = SqliteConnectionManager::file(&config.sqlite_path)
            .with_flags(OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE)
            .with_init(|conn| conn.execute_batch(CONNECTION_PRAGMAS));

        let pool = r2d2::Pool::builder()
            .max_size(config.max_connections)
            .connection_timeout(Duration::from_secs(config.timeout_seconds))
            .build(manager)?;

        let db = Self {
            pool: Arc::new(pool),
            location: config.sqlite_path.clone(),
        };
        db.migrate()?;

        info!("SQLite connection pool created successfully");
        Ok(db)
    }

    /// Create a migrated in-memory database.
    ///
    /// SQLite gives every in-memory connection its own database, so the pool
    /// holds exactly one connection that is never recycled.
    pub fn in_memory() -> Result<Self, DatabaseError> {
        debug!("Initializing in-memory SQLite database");

        let manager = SqliteConnectionManager::memory()
            .with_init(|conn| conn.execute_batch(CONNECTION_PRAGMAS));

        let pool = r2d2::Pool::builder()
            .max_size(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connection_timeout(Duration::from_secs(5))
            .build(manager)?;

        let db = Self {
            pool: Arc::new(pool),
            location: ":memory:".to_string(),
        };
        db.migrate()?;
        Ok(db)
    }

    /// Check a connection out of the pool
    pub fn get(&self) -> Result<PooledConnection<SqliteConnectionManager>, r2d2::Error> {
        self.pool.get()
    }

    /// Run a trivial query to prove the database answers
    pub fn ping(&self) -> Result<(), DatabaseError> {
        let conn = self.get()?;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }

    /// Human readable description of the pool for health reporting
    pub fn connection_info(&self) -> String {
        let state = self.pool.state();
        format!(
            "SQLite database at {} (connections: active={}, idle={})",
            self.location, state.connections, state.idle_connections
        )
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        let mut conn = self.get()?;
        run_sqlite_migrations(&mut conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_pool_enforces_foreign_keys() {
        let db = DatabasePool::in_memory().expect("in-memory pool");
        let conn = db.get().expect("connection");

        let enabled: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .expect("pragma");
        assert_eq!(enabled, 1);

        let result = conn.execute(
            "INSERT INTO medications (user_id, name, dosage, time, total_tablets, remaining_tablets, created_at)
             VALUES (999, 'Aspirin', '100mg', '08:00', 10, 10, '2024-01-01 00:00:00+00:00')",
            [],
        );
        assert!(result.is_err(), "insert referencing a missing user must fail");
    }

    #[test]
    fn test_file_pool_creates_parent_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("care_link.db");
        let config = DatabaseConfig {
            sqlite_path: path.to_string_lossy().to_string(),
            max_connections: 2,
            timeout_seconds: 5,
        };

        let db = DatabasePool::open(&config).expect("file pool");
        db.ping().expect("ping");
        assert!(path.exists());
        assert!(db.connection_info().contains("care_link.db"));
    }
}
