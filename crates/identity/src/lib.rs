//! Tenant-aware identity lifecycle: registration, login, email verification
//! and password reset over the per-tenant user stores.

pub mod mailer;
pub mod redirect;
pub mod resolver;
pub mod service;
pub mod tokens;
pub mod types;
pub mod utils;

pub use mailer::{mailer_from_config, EmailSender, HttpMailer, LogMailer, MailError};
pub use redirect::redirect_target;
pub use resolver::{IdentityResolver, Resolution, StoreScope};
pub use service::IdentityService;
pub use tokens::{hash_code, IssuedCode, TokenError, TokenService};
pub use types::*;
pub use utils::{hash_password, verify_password, SessionClaims, SessionIssuer};
