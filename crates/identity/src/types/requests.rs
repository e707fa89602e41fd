//! Request types for identity operations.

use serde::{Deserialize, Serialize};

/// Registration form. `role` defaults to patient when absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub role: Option<String>,
    pub phone: Option<String>,
    pub specialization: Option<String>,
    pub years_of_experience: Option<i64>,
    pub license_number: Option<String>,
    pub tenant_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub tenant_id: Option<String>,
}

/// An email address plus a one-time code, used by email verification and
/// by reset-code checks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CodeRequest {
    pub email: String,
    pub code: String,
    pub tenant_id: Option<String>,
}

/// Operations that only need to locate the account.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmailRequest {
    pub email: String,
    pub tenant_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,
    pub code: String,
    pub new_password: String,
    pub confirm_password: String,
    pub tenant_id: Option<String>,
}
