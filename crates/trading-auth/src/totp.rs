//! Time-based one-time passwords (RFC 6238) over Base32 shared secrets.

use chrono::Utc;
use data_encoding::BASE32;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use trading_core::error::AuthError;
use zeroize::Zeroizing;

type HmacSha1 = Hmac<Sha1>;

/// Length of one time step in seconds.
pub const STEP_SECS: u64 = 30;

/// Number of digits in a generated code.
pub const DIGITS: u32 = 6;

/// Decode a Base32 secret, ignoring case.
///
/// Input must be padded to a whole 8-character block. Unused trailing bits
/// are not checked.
pub fn decode_secret(secret: &str) -> Result<Zeroizing<Vec<u8>>, AuthError> {
    let normalized = Zeroizing::new(secret.to_ascii_uppercase());

    let mut base32 = BASE32.specification();
    base32.check_trailing_bits = false;
    let encoding = base32
        .encoding()
        .map_err(|e| AuthError::InvalidSecret(e.to_string()))?;

    encoding
        .decode(normalized.as_bytes())
        .map(Zeroizing::new)
        .map_err(|e| AuthError::InvalidSecret(e.to_string()))
}

/// Check whether a secret is valid Base32.
pub fn validate(secret: &str) -> bool {
    decode_secret(secret).is_ok()
}

/// Generate the code for the current time step.
pub fn generate(secret: &str) -> Result<String, AuthError> {
    let now = Utc::now().timestamp().max(0) as u64;
    generate_at(secret, now)
}

/// Generate the code for the time step containing `unix_secs`.
pub fn generate_at(secret: &str, unix_secs: u64) -> Result<String, AuthError> {
    let key = decode_secret(secret)?;
    hotp(&key, unix_secs / STEP_SECS)
}

/// HOTP value (RFC 4226) for a raw key and counter.
fn hotp(key: &[u8], counter: u64) -> Result<String, AuthError> {
    let mut mac = HmacSha1::new_from_slice(key)
        .map_err(|e| AuthError::InvalidSecret(e.to_string()))?;
    mac.update(&counter.to_be_bytes());
    let hash = mac.finalize().into_bytes();

    let offset = (hash[hash.len() - 1] & 0x0f) as usize;
    let binary = (u32::from(hash[offset]) & 0x7f) << 24
        | u32::from(hash[offset + 1]) << 16
        | u32::from(hash[offset + 2]) << 8
        | u32::from(hash[offset + 3]);

    let code = binary % 10u32.pow(DIGITS);
    Ok(format!("{:0width$}", code, width = DIGITS as usize))
}
