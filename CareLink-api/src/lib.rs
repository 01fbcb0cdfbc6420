// CareLink-api lib.rs
//
// HTTP layer of the CareLink API: routes, handlers, OpenAPI document and configuration.

pub mod api;
pub mod config;
pub mod entities;
pub mod openapi;

pub use api::create_application;
