//! # API Shared
//!
//! Shared wire types and services for the scenario explorer APIs.
//!
//! Contains:
//! - Request/response types (`dto` module) with serde and OpenAPI schema derives
//! - Shared services like `HealthService`
//!
//! Used by `api-rest` and the CLI so both surfaces render the same shapes.

pub mod dto;
pub mod health;

pub use dto::*;
pub use health::HealthService;
