//! Brokerage session handle and login parameters.

use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::Zeroizing;

/// Channel the broker uses for an out-of-band MFA challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MfaChallenge {
    Sms,
    Email,
}

impl MfaChallenge {
    pub fn as_str(&self) -> &'static str {
        match self {
            MfaChallenge::Sms => "sms",
            MfaChallenge::Email => "email",
        }
    }
}

/// A single login attempt.
#[derive(Clone)]
pub struct LoginRequest {
    pub username: String,
    pub password: Zeroizing<String>,
    pub mfa_code: Zeroizing<String>,
    pub challenge: MfaChallenge,
    /// Keep the resulting token on disk and reuse a stored one
    pub persist_session: bool,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("challenge", &self.challenge)
            .field("persist_session", &self.persist_session)
            .finish_non_exhaustive()
    }
}

/// Authenticated session returned by a broker login.
///
/// Every call that needs authorization takes the session explicitly.
#[derive(Clone, Serialize, Deserialize)]
pub struct Session {
    token_type: String,
    access_token: Zeroizing<String>,
    #[serde(default)]
    refresh_token: Option<Zeroizing<String>>,
    #[serde(skip)]
    persisted: bool,
}

impl Session {
    pub fn new(token_type: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            token_type: token_type.into(),
            access_token: Zeroizing::new(access_token.into()),
            refresh_token: None,
            persisted: false,
        }
    }

    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(Zeroizing::new(refresh_token.into()));
        self
    }

    pub fn persisted(mut self, persisted: bool) -> Self {
        self.persisted = persisted;
        self
    }

    /// Value for the `Authorization` header.
    pub fn authorization(&self) -> String {
        format!("{} {}", self.token_type, self.access_token.as_str())
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn is_persisted(&self) -> bool {
        self.persisted
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token_type", &self.token_type)
            .field("persisted", &self.persisted)
            .finish_non_exhaustive()
    }
}
