//! Credentials, one-time passwords and the brokerage login flow.

pub mod credentials;
pub mod session;
pub mod totp;

pub use credentials::{load_backup_code, Credentials};
pub use session::{LoginPath, SessionManager};
