//! Request extractors, error responses and response hardening.

pub mod auth;
pub mod error;
pub mod security;

pub use auth::{AdminSession, OptionalSession};
