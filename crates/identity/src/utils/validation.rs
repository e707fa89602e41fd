//! Input validation utilities.
//!
//! Validators push onto a shared list of [`FieldError`]s so a form is
//! rejected once with every problem listed.

use once_cell::sync::Lazy;
use regex::Regex;

use carebridge_database::UserRole;

use crate::types::{FieldError, IdentityError, IdentityResult, RegisterRequest};

static EMAIL_PATTERN: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$"));

const MAX_NAME_LENGTH: usize = 100;

/// Trim and lowercase an email address.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn validate_email(email: &str, errors: &mut Vec<FieldError>) -> IdentityResult<()> {
    let email = email.trim();
    if email.is_empty() {
        errors.push(FieldError::new("email", "Email is required"));
        return Ok(());
    }
    if email.len() > 255 {
        errors.push(FieldError::new("email", "Email too long"));
        return Ok(());
    }

    let pattern = EMAIL_PATTERN
        .as_ref()
        .map_err(|e| IdentityError::Internal(format!("Invalid email regex: {e}")))?;
    if !pattern.is_match(email) {
        errors.push(FieldError::new("email", "Invalid email format"));
    }
    Ok(())
}

/// Password strength requirements, reported against `field`.
pub fn validate_password(field: &str, password: &str, errors: &mut Vec<FieldError>) {
    if password.len() < 8 {
        errors.push(FieldError::new(field, "Password must be at least 8 characters long"));
        return;
    }
    if password.len() > 128 {
        errors.push(FieldError::new(field, "Password must be less than 128 characters long"));
        return;
    }

    if !password.chars().any(|c| c.is_lowercase()) {
        errors.push(FieldError::new(field, "Password must contain at least one lowercase letter"));
    }
    if !password.chars().any(|c| c.is_uppercase()) {
        errors.push(FieldError::new(field, "Password must contain at least one uppercase letter"));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push(FieldError::new(field, "Password must contain at least one digit"));
    }
}

pub fn validate_confirmation(password: &str, confirmation: &str, errors: &mut Vec<FieldError>) {
    if password != confirmation {
        errors.push(FieldError::new("confirmPassword", "Passwords do not match"));
    }
}

fn validate_name(field: &str, label: &str, value: &str, errors: &mut Vec<FieldError>) {
    let value = value.trim();
    if value.is_empty() {
        errors.push(FieldError::new(field, format!("{label} is required")));
    } else if value.chars().count() > MAX_NAME_LENGTH {
        errors.push(FieldError::new(field, format!("{label} is too long")));
    }
}

fn require_code(code: &str, errors: &mut Vec<FieldError>) {
    if code.trim().is_empty() {
        errors.push(FieldError::new("code", "Code is required"));
    }
}

fn finish(errors: Vec<FieldError>) -> IdentityResult<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(IdentityError::InvalidInput(errors))
    }
}

/// Validate a registration form and return the requested role.
pub fn validate_registration(request: &RegisterRequest) -> IdentityResult<UserRole> {
    let mut errors = Vec::new();

    validate_name("firstName", "First name", &request.first_name, &mut errors);
    validate_name("lastName", "Last name", &request.last_name, &mut errors);
    validate_email(&request.email, &mut errors)?;
    validate_password("password", &request.password, &mut errors);
    validate_confirmation(&request.password, &request.confirm_password, &mut errors);

    let role = match request.role.as_deref() {
        None => Some(UserRole::Patient),
        Some(raw) => {
            let parsed = UserRole::parse(raw);
            if parsed.is_none() {
                errors.push(FieldError::new("role", "Role must be patient, doctor or admin"));
            }
            parsed
        }
    };

    if role == Some(UserRole::Doctor) {
        let specialization = request.specialization.as_deref().map(str::trim).unwrap_or("");
        if specialization.is_empty() {
            errors.push(FieldError::new("specialization", "Specialization is required for doctors"));
        }
        match request.years_of_experience {
            None => errors.push(FieldError::new(
                "yearsOfExperience",
                "Years of experience is required for doctors",
            )),
            Some(years) if !(0..=80).contains(&years) => errors.push(FieldError::new(
                "yearsOfExperience",
                "Years of experience must be between 0 and 80",
            )),
            Some(_) => {}
        }
    }

    finish(errors)?;
    role.ok_or_else(|| IdentityError::invalid_field("role", "Role is required"))
}

pub fn validate_login(email: &str, password: &str) -> IdentityResult<()> {
    let mut errors = Vec::new();
    if email.trim().is_empty() {
        errors.push(FieldError::new("email", "Email is required"));
    }
    if password.is_empty() {
        errors.push(FieldError::new("password", "Password is required"));
    }
    finish(errors)
}

pub fn validate_email_only(email: &str) -> IdentityResult<()> {
    let mut errors = Vec::new();
    validate_email(email, &mut errors)?;
    finish(errors)
}

pub fn validate_code_submission(email: &str, code: &str) -> IdentityResult<()> {
    let mut errors = Vec::new();
    validate_email(email, &mut errors)?;
    require_code(code, &mut errors);
    finish(errors)
}

pub fn validate_password_reset(
    email: &str,
    code: &str,
    new_password: &str,
    confirmation: &str,
) -> IdentityResult<()> {
    let mut errors = Vec::new();
    validate_email(email, &mut errors)?;
    require_code(code, &mut errors);
    validate_password("newPassword", new_password, &mut errors);
    validate_confirmation(new_password, confirmation, &mut errors);
    finish(errors)
}
