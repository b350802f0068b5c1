//! Brokerage login flow: TOTP first, backup code once on failure.

use tracing::{debug, error, info, warn};
use trading_core::error::AuthError;
use trading_core::traits::Broker;
use trading_core::types::{LoginRequest, MfaChallenge, Session};
use zeroize::Zeroizing;

use crate::credentials::Credentials;
use crate::totp;

/// How a session was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginPath {
    /// Generated TOTP code, ephemeral session
    Totp,
    /// Backup code over SMS challenge, persisted session
    BackupCode,
}

/// Logs in to a broker and logs out again.
pub struct SessionManager<'a, B: Broker + ?Sized> {
    broker: &'a B,
    backup_code: Option<Zeroizing<String>>,
}

impl<'a, B: Broker + ?Sized> SessionManager<'a, B> {
    pub fn new(broker: &'a B) -> Self {
        Self {
            broker,
            backup_code: None,
        }
    }

    /// Set the MFA backup code used when the TOTP login fails.
    pub fn with_backup_code(mut self, code: Option<Zeroizing<String>>) -> Self {
        self.backup_code = code;
        self
    }

    pub fn broker(&self) -> &'a B {
        self.broker
    }

    /// Log in with the given credentials.
    ///
    /// Returns `Ok(None)` without contacting the broker when the TOTP secret
    /// is not valid Base32. A failed TOTP login is retried exactly once with
    /// the backup code; a failure there is returned.
    pub async fn login(&self, credentials: &Credentials) -> Result<Option<(Session, LoginPath)>, AuthError> {
        if !totp::validate(&credentials.totp_secret) {
            error!("Invalid TOTP secret.");
            return Ok(None);
        }

        let otp_code = Zeroizing::new(totp::generate(&credentials.totp_secret)?);
        debug!("Generated OTP for {}", credentials.username);

        let primary = LoginRequest {
            username: credentials.username.clone(),
            password: credentials.password.clone(),
            mfa_code: otp_code,
            challenge: MfaChallenge::Email,
            persist_session: false,
        };

        let primary_err = match self.broker.login(&primary).await {
            Ok(session) => {
                info!("Logged in to {} with OTP", self.broker.name());
                return Ok(Some((session, LoginPath::Totp)));
            }
            Err(e) => e,
        };

        error!("Error logging in with OTP: {}", primary_err);
        let Some(backup_code) = self.backup_code.clone() else {
            warn!("No backup code configured, giving up");
            return Err(AuthError::Login(primary_err));
        };

        info!("Trying backup code...");
        let fallback = LoginRequest {
            mfa_code: backup_code,
            challenge: MfaChallenge::Sms,
            persist_session: true,
            ..primary
        };

        let session = self.broker.login(&fallback).await?;
        info!("Logged in to {} with backup code", self.broker.name());
        Ok(Some((session, LoginPath::BackupCode)))
    }

    /// Terminate the session.
    pub async fn logout(&self, session: &Session) -> Result<(), AuthError> {
        self.broker.logout(session).await?;
        info!("Logged out of {}", self.broker.name());
        Ok(())
    }
}
