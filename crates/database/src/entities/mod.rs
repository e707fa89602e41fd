//! Domain entities for the database layer

pub mod tenant;
pub mod user;

pub use tenant::{NewTenant, Tenant, TenantBranding};
pub use user::{AccountStatus, NewUser, TokenPurpose, User, UserRole};
