// CareLink Domain
// Business rules, authorization and authentication for the CareLink API

// Services that implement business logic
pub mod services;

// Authentication and authorization
pub mod auth;

// Domain entities
pub mod entities;

// Health checks and system status
pub mod health;

// Uploaded document storage
pub mod storage;

// Re-export the database module from care_link_data for convenience
pub use care_link_data::database;

// Shared fixtures for tests in this crate and the API crate
#[cfg(any(test, feature = "testing"))]
pub mod testing;
