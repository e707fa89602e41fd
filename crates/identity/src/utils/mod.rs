//! Internal utilities

pub mod password;
pub mod session;
pub mod validation;

pub use password::{hash_password, verify_password};
pub use session::{SessionClaims, SessionIssuer};
