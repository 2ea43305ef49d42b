//! Print an Argon2 hash for `ADMIN_PASSWORD_HASH`.
//!
//! ```text
//! hash-password 'correct horse battery staple'
//! ```

use quill_core::ports::PasswordService;
use quill_infra::Argon2PasswordService;

fn main() -> anyhow::Result<()> {
    let Some(password) = std::env::args().nth(1) else {
        anyhow::bail!("usage: hash-password <password>");
    };
    if password.is_empty() {
        anyhow::bail!("password must not be empty");
    }

    let hash = Argon2PasswordService::new().hash(&password)?;
    println!("{hash}");
    Ok(())
}
