//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

#[cfg(feature = "postgres")]
use quill_infra::DatabaseConfig;

/// Default upload cap: 5 MiB.
const DEFAULT_UPLOAD_MAX_BYTES: usize = 5 * 1024 * 1024;

/// Credentials of the single admin account.
#[derive(Debug, Clone)]
pub struct AdminCredentials {
    pub username: String,
    /// Argon2 PHC string.
    pub password_hash: String,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    #[cfg(feature = "postgres")]
    pub database: Option<DatabaseConfig>,
    /// Apply pending schema migrations after connecting.
    #[cfg(feature = "postgres")]
    pub auto_migrate: bool,
    pub site_config_path: PathBuf,
    pub public_dir: PathBuf,
    pub upload_dir: PathBuf,
    pub upload_max_bytes: usize,
    pub admin: Option<AdminCredentials>,
}

fn parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        #[cfg(feature = "postgres")]
        let database = env::var("DATABASE_URL").ok().map(|url| DatabaseConfig {
            url,
            max_connections: parsed("DB_MAX_CONNECTIONS").unwrap_or(20),
            min_connections: parsed("DB_MIN_CONNECTIONS").unwrap_or(2),
        });

        let public_dir = PathBuf::from(env::var("PUBLIC_DIR").unwrap_or_else(|_| "public".into()));
        let upload_dir = env::var("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| public_dir.join("uploads"));

        let admin = match (env::var("ADMIN_USERNAME"), env::var("ADMIN_PASSWORD_HASH")) {
            (Ok(username), Ok(password_hash)) if !username.is_empty() => Some(AdminCredentials {
                username,
                password_hash,
            }),
            _ => None,
        };

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parsed("PORT").unwrap_or(3000),
            #[cfg(feature = "postgres")]
            database,
            #[cfg(feature = "postgres")]
            auto_migrate: env::var("DB_AUTO_MIGRATE")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            site_config_path: env::var("SITE_CONFIG_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("_config.yml")),
            public_dir,
            upload_dir,
            upload_max_bytes: parsed("UPLOAD_MAX_BYTES").unwrap_or(DEFAULT_UPLOAD_MAX_BYTES),
            admin,
        }
    }
}
