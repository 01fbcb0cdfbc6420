//! Storage for uploaded health record files.
//!
//! Files live under `UPLOAD_DIR`, one bucket directory per record type, and
//! are served back at `/uploads/{bucket}/{filename}`. Content is never
//! inspected.

use std::env;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::entities::RecordType;

/// URL prefix the upload directory is served under
pub const PUBLIC_PREFIX: &str = "/uploads";

const DEFAULT_UPLOAD_DIR: &str = "./uploads";
const DEFAULT_MAX_FILE_SIZE: usize = 10 * 1024 * 1024;
const MAX_NAME_ATTEMPTS: usize = 5;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid stored path: {0}")]
    InvalidPath(String),

    #[error("Could not find a free file name for {0}")]
    NameExhausted(String),
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub upload_dir: PathBuf,
    /// Largest accepted upload in bytes
    pub max_file_size: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl StorageConfig {
    /// Read `UPLOAD_DIR` and `MAX_FILE_SIZE`
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            upload_dir: env::var("UPLOAD_DIR").map(PathBuf::from).unwrap_or(defaults.upload_dir),
            max_file_size: env::var("MAX_FILE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_file_size),
        }
    }
}

/// Where a stored file ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredDocument {
    /// `/uploads/{bucket}/{filename}`
    pub public_path: String,
    pub filename: String,
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create every bucket directory
    async fn ensure_buckets(&self) -> Result<(), StorageError>;

    /// Write a file into the bucket for `record_type` under a fresh name
    async fn store(
        &self,
        owner_id: i64,
        record_type: RecordType,
        original_filename: &str,
        content: &[u8],
    ) -> Result<StoredDocument, StorageError>;

    /// Delete a file by its public path. A file that is already gone is not an error.
    async fn remove(&self, public_path: &str) -> Result<(), StorageError>;

    fn max_file_size(&self) -> usize;
}

/// Document store on the local filesystem
#[derive(Debug, Clone)]
pub struct LocalDocumentStore {
    config: StorageConfig,
}

impl LocalDocumentStore {
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }

    pub fn root(&self) -> &Path {
        &self.config.upload_dir
    }

    /// Map a public path back to a file inside a known bucket
    fn resolve(&self, public_path: &str) -> Result<PathBuf, StorageError> {
        let invalid = || StorageError::InvalidPath(public_path.to_string());

        let relative = public_path
            .strip_prefix(PUBLIC_PREFIX)
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(invalid)?;
        let (bucket, filename) = relative.split_once('/').ok_or_else(invalid)?;

        let known_bucket = RecordType::ALL.iter().any(|t| t.bucket() == bucket);
        if !known_bucket || filename.is_empty() || filename.contains(['/', '\\']) || filename.contains("..") {
            return Err(invalid());
        }

        Ok(self.config.upload_dir.join(bucket).join(filename))
    }
}

#[async_trait]
impl DocumentStore for LocalDocumentStore {
    async fn ensure_buckets(&self) -> Result<(), StorageError> {
        for record_type in RecordType::ALL {
            fs::create_dir_all(self.config.upload_dir.join(record_type.bucket())).await?;
        }
        info!("Upload buckets ready under {}", self.config.upload_dir.display());
        Ok(())
    }

    async fn store(
        &self,
        owner_id: i64,
        record_type: RecordType,
        original_filename: &str,
        content: &[u8],
    ) -> Result<StoredDocument, StorageError> {
        let bucket_dir = self.config.upload_dir.join(record_type.bucket());
        fs::create_dir_all(&bucket_dir).await?;
        let sanitized = sanitize_filename(original_filename);

        for _ in 0..MAX_NAME_ATTEMPTS {
            let filename = format!(
                "{}_{}_{}",
                owner_id,
                Utc::now().format("%Y%m%d_%H%M%S%3f"),
                sanitized
            );
            let path = bucket_dir.join(&filename);

            let mut file = match OpenOptions::new().write(true).create_new(true).open(&path).await {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    debug!("Upload name {} taken, retrying", filename);
                    tokio::time::sleep(std::time::Duration::from_millis(1)).await;
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            if let Err(e) = async {
                file.write_all(content).await?;
                file.sync_all().await
            }
            .await
            {
                drop(file);
                if let Err(cleanup) = fs::remove_file(&path).await {
                    warn!("Failed to remove partial upload {}: {}", path.display(), cleanup);
                }
                return Err(e.into());
            }

            info!("Stored {} bytes as {}/{}", content.len(), record_type.bucket(), filename);
            return Ok(StoredDocument {
                public_path: format!("{}/{}/{}", PUBLIC_PREFIX, record_type.bucket(), filename),
                filename,
            });
        }

        Err(StorageError::NameExhausted(sanitized))
    }

    async fn remove(&self, public_path: &str) -> Result<(), StorageError> {
        let path = self.resolve(public_path)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                info!("Removed stored file {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("Stored file {} was already missing", path.display());
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn max_file_size(&self) -> usize {
        self.config.max_file_size
    }
}

/// Reduce a client-supplied file name to a safe single path component
pub fn sanitize_filename(name: &str) -> String {
    // Drop path separators and null bytes, replace other special chars
    let sanitized: String = name
        .chars()
        .filter(|&c| c != '/' && c != '\\' && c != '\0')
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    // No traversal through consecutive dots
    let sanitized = sanitized.replace("..", "");
    let sanitized: String = sanitized.chars().take(100).collect();

    if sanitized.is_empty() {
        "document".into()
    } else {
        sanitized
    }
}
