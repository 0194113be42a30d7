//! Identifier utilities.
//!
//! Scenario records and sessions are identified by random (v4) UUIDs carried in a *canonical*
//! string form: **32 lowercase hexadecimal characters** (no hyphens).
//!
//! This crate provides:
//! - [`ScenarioId`], the immutable identifier of a stored scenario record.
//! - [`SessionId`], the identifier of a user session (one portfolio per session).
//!
//! ## Canonical UUID form
//! - Length: 32
//! - Characters: `0-9` and `a-f` only
//! - Example: `550e8400e29b41d4a716446655440000`
//!
//! Canonical form is *required* for externally supplied identifiers (for example, from REST paths
//! or CLI arguments). Non-canonical values (uppercase, hyphenated, wrong length, non-hex) are
//! rejected rather than normalised, so one identifier always has exactly one spelling.

mod service;

pub use service::{is_canonical, ScenarioId, SessionId, Uuid};

/// Error type for identifier operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum UuidError {
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for identifier operations.
pub type UuidResult<T> = Result<T, UuidError>;
