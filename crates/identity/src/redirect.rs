//! Where a client should land after verifying an email address.

use carebridge_database::{AccountStatus, User, UserRole};

pub fn redirect_target(user: &User) -> &'static str {
    match (user.role, user.account_status) {
        (UserRole::Patient, _) if !user.onboarding_completed => "/onboarding",
        (UserRole::Patient, _) => "/dashboard",
        (UserRole::Doctor, AccountStatus::Active) => "/doctor/dashboard",
        (UserRole::Doctor, _) => "/pending-approval",
        (UserRole::Admin, _) => "/admin",
    }
}
