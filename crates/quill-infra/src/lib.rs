//! # Quill Infrastructure
//!
//! Concrete implementations of the ports defined in `quill-core`.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external services, in-memory post store only
//! - `postgres` - PostgreSQL post store via SeaORM
//! - `auth` - Argon2 password hashing + JWT session tokens

pub mod database;
pub mod settings;

#[cfg(feature = "auth")]
pub mod auth;

pub use database::InMemoryPostRepository;
pub use settings::YamlSettingsStore;

#[cfg(feature = "postgres")]
pub use database::{DatabaseConfig, PostgresPostRepository};

#[cfg(feature = "auth")]
pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService};
