//! User entity definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A clinic user as stored in a tenant store or the default store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: UserRole,
    pub account_status: AccountStatus,
    pub is_email_verified: bool,
    #[serde(skip_serializing)]
    pub email_verification_token_hash: Option<String>,
    #[serde(skip_serializing)]
    pub email_verification_expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing)]
    pub password_reset_token_hash: Option<String>,
    #[serde(skip_serializing)]
    pub password_reset_expires_at: Option<DateTime<Utc>>,
    pub onboarding_completed: bool,
    pub tenant_id: Option<String>,
    pub phone: Option<String>,
    pub specialization: Option<String>,
    pub years_of_experience: Option<i64>,
    pub license_number: Option<String>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Stored hash and expiry for the given one-time token purpose.
    pub fn token_state(&self, purpose: TokenPurpose) -> (Option<&str>, Option<DateTime<Utc>>) {
        match purpose {
            TokenPurpose::EmailVerification => (
                self.email_verification_token_hash.as_deref(),
                self.email_verification_expires_at,
            ),
            TokenPurpose::PasswordReset => (
                self.password_reset_token_hash.as_deref(),
                self.password_reset_expires_at,
            ),
        }
    }
}

/// Fields required to insert a new user record
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub account_status: AccountStatus,
    pub tenant_id: Option<String>,
    pub phone: Option<String>,
    pub specialization: Option<String>,
    pub years_of_experience: Option<i64>,
    pub license_number: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Patient,
    Doctor,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Patient => "patient",
            UserRole::Doctor => "doctor",
            UserRole::Admin => "admin",
        }
    }

    /// Strict parse used for caller-supplied values.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "patient" => Some(UserRole::Patient),
            "doctor" => Some(UserRole::Doctor),
            "admin" => Some(UserRole::Admin),
            _ => None,
        }
    }
}

impl From<&str> for UserRole {
    fn from(s: &str) -> Self {
        UserRole::parse(s).unwrap_or(UserRole::Patient)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Pending,
    Active,
    Suspended,
    Rejected,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Pending => "pending",
            AccountStatus::Active => "active",
            AccountStatus::Suspended => "suspended",
            AccountStatus::Rejected => "rejected",
        }
    }
}

impl From<&str> for AccountStatus {
    fn from(s: &str) -> Self {
        match s {
            "pending" => AccountStatus::Pending,
            "suspended" => AccountStatus::Suspended,
            "rejected" => AccountStatus::Rejected,
            _ => AccountStatus::Active,
        }
    }
}

impl std::fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two kinds of one-time code a user record can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenPurpose {
    EmailVerification,
    PasswordReset,
}

impl TokenPurpose {
    pub(crate) fn hash_column(&self) -> &'static str {
        match self {
            TokenPurpose::EmailVerification => "email_verification_token_hash",
            TokenPurpose::PasswordReset => "password_reset_token_hash",
        }
    }

    pub(crate) fn expiry_column(&self) -> &'static str {
        match self {
            TokenPurpose::EmailVerification => "email_verification_expires_at",
            TokenPurpose::PasswordReset => "password_reset_expires_at",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenPurpose::EmailVerification => "email_verification",
            TokenPurpose::PasswordReset => "password_reset",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parse_is_strict_but_row_decoding_is_lenient() {
        assert_eq!(UserRole::parse(" Doctor "), Some(UserRole::Doctor));
        assert_eq!(UserRole::parse("superuser"), None);
        assert_eq!(UserRole::from("superuser"), UserRole::Patient);
    }

    #[test]
    fn account_status_round_trips_through_strings() {
        for status in [
            AccountStatus::Pending,
            AccountStatus::Active,
            AccountStatus::Suspended,
            AccountStatus::Rejected,
        ] {
            assert_eq!(AccountStatus::from(status.as_str()), status);
        }
    }

    #[test]
    fn token_columns_are_distinct_per_purpose() {
        assert_ne!(
            TokenPurpose::EmailVerification.hash_column(),
            TokenPurpose::PasswordReset.hash_column()
        );
        assert_eq!(
            TokenPurpose::PasswordReset.expiry_column(),
            "password_reset_expires_at"
        );
    }
}
