//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod repository;
mod settings;

pub use auth::{AuthError, PasswordService, SessionClaims, TokenService};
pub use repository::{BaseRepository, PostRepository};
pub use settings::{SettingsError, SettingsStore};
