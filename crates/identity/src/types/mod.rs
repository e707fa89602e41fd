//! Shared request, response and error types

pub mod errors;
pub mod requests;
pub mod responses;

pub use errors::{FieldError, IdentityError, IdentityResult};
pub use requests::{CodeRequest, EmailRequest, LoginRequest, RegisterRequest, ResetPasswordRequest};
pub use responses::{MessageResponse, RegistrationOutcome, SessionGrant, TenantSummary, UserProfile};
