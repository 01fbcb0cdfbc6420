//! Application configuration read from the environment

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use anyhow::{Context, Result};
use tracing::info;

use care_link_data::database::DatabaseConfig;
use care_link_domain::auth::password::PasswordHasher;
use care_link_domain::auth::token::TokenConfig;
use care_link_domain::storage::StorageConfig;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:8080";

/// HTTP server settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Origins allowed by CORS
    pub cors_origins: Vec<String>,
    /// Reported by the health check
    pub environment: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
            cors_origins: parse_origins(DEFAULT_CORS_ORIGINS),
            environment: "development".to_string(),
        }
    }
}

impl ServerConfig {
    /// Read `HOST`, `PORT`, `CORS_ORIGINS` and `APP_ENV`
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let host = match env::var("HOST") {
            Ok(value) => value.parse().with_context(|| format!("HOST is not an IP address: {}", value))?,
            Err(_) => defaults.host,
        };
        let port = match env::var("PORT") {
            Ok(value) => value.parse().with_context(|| format!("PORT must be a number: {}", value))?,
            Err(_) => defaults.port,
        };
        let cors_origins = match env::var("CORS_ORIGINS") {
            Ok(value) => parse_origins(&value),
            Err(_) => defaults.cors_origins,
        };
        check_origins(&cors_origins).context("CORS_ORIGINS is invalid")?;
        let environment = env::var("APP_ENV").unwrap_or(defaults.environment);

        Ok(Self {
            host,
            port,
            cors_origins,
            environment,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(String::from)
        .collect()
}

/// Credentialed CORS needs explicit origins
fn check_origins(origins: &[String]) -> Result<()> {
    if origins.iter().any(|origin| origin == "*") {
        anyhow::bail!("wildcard origin \"*\" cannot be combined with credentials; list each origin");
    }
    Ok(())
}

/// Everything the application needs to start
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub tokens: TokenConfig,
    pub hasher: PasswordHasher,
    pub storage: StorageConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let config = Self {
            server: ServerConfig::from_env()?,
            database: DatabaseConfig::from_env().context("invalid database configuration")?,
            tokens: TokenConfig::from_env().context("invalid token configuration")?,
            hasher: PasswordHasher::from_env(),
            storage: StorageConfig::from_env(),
        };

        info!(
            "Configuration loaded: env={}, listen={}, uploads={}",
            config.server.environment,
            config.server.socket_addr(),
            config.storage.upload_dir.display()
        );
        Ok(config)
    }
}
