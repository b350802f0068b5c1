//! Login credentials.
//!
//! Credentials come from a three-line plaintext file (username, password,
//! TOTP secret) or from environment variables. Password and secret are held
//! in `Zeroizing` buffers and wiped when dropped.

use std::fmt;
use std::path::Path;
use tracing::{info, warn};
use trading_core::error::AuthError;
use zeroize::Zeroizing;

/// Username, password and TOTP secret for one account.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: Zeroizing<String>,
    pub totp_secret: Zeroizing<String>,
}

impl Credentials {
    /// Parse the three-line credential format.
    ///
    /// Lines are trimmed; missing lines come back empty.
    pub fn parse(contents: &str) -> Self {
        let mut lines = contents.lines().map(str::trim);
        let mut next = || lines.next().unwrap_or_default().to_string();

        let username = next();
        let password = Zeroizing::new(next());
        let totp_secret = Zeroizing::new(next());

        Self {
            username,
            password,
            totp_secret,
        }
    }

    /// Read credentials from a file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, AuthError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map(Zeroizing::new)
            .map_err(|source| AuthError::CredentialsFile {
                path: path.display().to_string(),
                source,
            })?;

        info!("Loaded credentials from {}", path.display());
        Ok(Self::parse(&contents))
    }

    /// Read credentials from environment variables.
    pub fn from_env(username_var: &str, password_var: &str, secret_var: &str) -> Result<Self, AuthError> {
        let username = load_from_env(username_var)?;
        let password = load_from_env(password_var)?;
        let totp_secret = load_from_env(secret_var)?;

        Ok(Self {
            username: username.trim().to_string(),
            password: Zeroizing::new(password.trim().to_string()),
            totp_secret: Zeroizing::new(totp_secret.trim().to_string()),
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Read the MFA backup code, if one is configured.
pub fn load_backup_code(env_var: &str) -> Option<Zeroizing<String>> {
    match load_from_env(env_var) {
        Ok(code) if !code.trim().is_empty() => Some(Zeroizing::new(code.trim().to_string())),
        _ => {
            warn!("No MFA backup code in {}; fallback login disabled", env_var);
            None
        }
    }
}

fn load_from_env(var: &str) -> Result<Zeroizing<String>, AuthError> {
    std::env::var(var)
        .map(Zeroizing::new)
        .map_err(|_| AuthError::EnvVarNotSet(var.to_string()))
}
