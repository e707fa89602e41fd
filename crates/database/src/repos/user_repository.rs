//! User repository for store operations.

use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use super::{format_timestamp, parse_optional_timestamp, parse_timestamp};
use crate::connection::bounded;
use crate::entities::{AccountStatus, NewUser, TokenPurpose, User, UserRole};
use crate::types::{UserError, UserResult};

const USER_COLUMNS: &str = "id, first_name, last_name, email, password_hash, role, account_status, \
    is_email_verified, email_verification_token_hash, email_verification_expires_at, \
    password_reset_token_hash, password_reset_expires_at, onboarding_completed, tenant_id, phone, \
    specialization, years_of_experience, license_number, last_login_at, created_at, updated_at";

/// Repository for user records in one store.
///
/// Every statement runs under the operation timeout the repository was bound
/// with; an elapsed deadline surfaces as an error, never as "not found".
#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
    tenant_id: Option<String>,
    operation_timeout: Duration,
}

impl UserRepository {
    pub fn new(pool: SqlitePool, tenant_id: Option<String>, operation_timeout: Duration) -> Self {
        Self {
            pool,
            tenant_id,
            operation_timeout,
        }
    }

    /// Tenant whose store this repository reads, `None` for the default store.
    pub fn tenant_id(&self) -> Option<&str> {
        self.tenant_id.as_deref()
    }

    pub async fn find_by_id(&self, id: &str) -> UserResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
        let row = bounded::<_, UserError, _>(
            self.operation_timeout,
            "users.find_by_id",
            sqlx::query(&sql).bind(id).fetch_optional(&self.pool),
        )
        .await?;

        row.map(|row| user_from_row(&row)).transpose()
    }

    /// Find user by email, ignoring case and surrounding whitespace
    pub async fn find_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?");
        let row = bounded::<_, UserError, _>(
            self.operation_timeout,
            "users.find_by_email",
            sqlx::query(&sql)
                .bind(normalize_email(email))
                .fetch_optional(&self.pool),
        )
        .await?;

        row.map(|row| user_from_row(&row)).transpose()
    }

    pub async fn insert(&self, user: &NewUser) -> UserResult<User> {
        let now = format_timestamp(Utc::now());
        let id = cuid2::cuid();

        bounded::<_, UserError, _>(
            self.operation_timeout,
            "users.insert",
            sqlx::query(
                r#"
                INSERT INTO users (
                    id, first_name, last_name, email, password_hash, role, account_status,
                    is_email_verified, onboarding_completed, tenant_id, phone, specialization,
                    years_of_experience, license_number, created_at, updated_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, false, false, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&id)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(normalize_email(&user.email))
            .bind(&user.password_hash)
            .bind(user.role.as_str())
            .bind(user.account_status.as_str())
            .bind(&user.tenant_id)
            .bind(&user.phone)
            .bind(&user.specialization)
            .bind(user.years_of_experience)
            .bind(&user.license_number)
            .bind(&now)
            .bind(&now)
            .execute(&self.pool),
        )
        .await?;

        self.find_by_id(&id).await?.ok_or(UserError::UserNotFound)
    }

    /// Apply a partial update.
    ///
    /// Returns `Ok(false)` when the patch carries a token guard and the stored
    /// token no longer matches or has expired, so a one-time code can only be
    /// consumed once. An unguarded patch against a missing record is
    /// [`UserError::UserNotFound`].
    pub async fn update_fields(&self, id: &str, patch: &UserPatch) -> UserResult<bool> {
        let now = Utc::now();

        let mut query_parts: Vec<String> = patch
            .assignments
            .iter()
            .map(|(column, _)| format!("{column} = ?"))
            .collect();
        query_parts.push("updated_at = ?".to_string());

        let mut query_str = format!("UPDATE users SET {} WHERE id = ?", query_parts.join(", "));
        if let Some((purpose, _)) = &patch.guard {
            query_str.push_str(&format!(
                " AND {} = ? AND {} > ?",
                purpose.hash_column(),
                purpose.expiry_column()
            ));
        }

        let mut query = sqlx::query(&query_str);
        for (_, value) in &patch.assignments {
            query = match value {
                PatchValue::Text(text) => query.bind(text.clone()),
                PatchValue::Flag(flag) => query.bind(*flag),
            };
        }
        query = query.bind(format_timestamp(now)).bind(id);
        if let Some((_, expected_hash)) = &patch.guard {
            query = query.bind(expected_hash.clone()).bind(format_timestamp(now));
        }

        let result = bounded::<_, UserError, _>(
            self.operation_timeout,
            "users.update_fields",
            query.execute(&self.pool),
        )
        .await?;

        if result.rows_affected() > 0 {
            return Ok(true);
        }
        if patch.guard.is_some() {
            return Ok(false);
        }
        Err(UserError::UserNotFound)
    }

    /// Hard delete, used to roll back a registration whose follow-up failed.
    pub async fn delete(&self, id: &str) -> UserResult<()> {
        let result = bounded::<_, UserError, _>(
            self.operation_timeout,
            "users.delete",
            sqlx::query("DELETE FROM users WHERE id = ?")
                .bind(id)
                .execute(&self.pool),
        )
        .await?;

        if result.rows_affected() == 0 {
            return Err(UserError::UserNotFound);
        }

        Ok(())
    }

    pub async fn count(&self) -> UserResult<i64> {
        bounded::<_, UserError, _>(
            self.operation_timeout,
            "users.count",
            sqlx::query_scalar("SELECT COUNT(*) FROM users").fetch_one(&self.pool),
        )
        .await
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn user_from_row(row: &SqliteRow) -> UserResult<User> {
    Ok(User {
        id: row.try_get("id")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        role: UserRole::from(row.try_get::<String, _>("role")?.as_str()),
        account_status: AccountStatus::from(row.try_get::<String, _>("account_status")?.as_str()),
        is_email_verified: row.try_get("is_email_verified")?,
        email_verification_token_hash: optional_text(row, "email_verification_token_hash"),
        email_verification_expires_at: parse_optional_timestamp(
            "email_verification_expires_at",
            optional_text(row, "email_verification_expires_at"),
        ),
        password_reset_token_hash: optional_text(row, "password_reset_token_hash"),
        password_reset_expires_at: parse_optional_timestamp(
            "password_reset_expires_at",
            optional_text(row, "password_reset_expires_at"),
        ),
        onboarding_completed: row.try_get("onboarding_completed").unwrap_or(false),
        tenant_id: optional_text(row, "tenant_id"),
        phone: optional_text(row, "phone"),
        specialization: optional_text(row, "specialization"),
        years_of_experience: row
            .try_get::<Option<i64>, _>("years_of_experience")
            .unwrap_or(None),
        license_number: optional_text(row, "license_number"),
        last_login_at: parse_optional_timestamp("last_login_at", optional_text(row, "last_login_at")),
        created_at: parse_timestamp("created_at", row.try_get("created_at")?),
        updated_at: parse_timestamp("updated_at", row.try_get("updated_at")?),
    })
}

/// Optional columns decode leniently: a value of the wrong type reads as absent.
fn optional_text(row: &SqliteRow, column: &str) -> Option<String> {
    row.try_get::<Option<String>, _>(column).unwrap_or(None)
}

#[derive(Debug, Clone, PartialEq)]
enum PatchValue {
    Text(Option<String>),
    Flag(bool),
}

/// A partial update of a user record, built up field by field.
///
/// ```
/// use carebridge_database::{AccountStatus, TokenPurpose, UserPatch};
///
/// let patch = UserPatch::new()
///     .email_verified(true)
///     .account_status(AccountStatus::Active)
///     .clear_token(TokenPurpose::EmailVerification)
///     .expect_token(TokenPurpose::EmailVerification, "abc123");
/// assert!(!patch.is_empty());
/// assert!(patch.is_guarded());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserPatch {
    assignments: Vec<(&'static str, PatchValue)>,
    guard: Option<(TokenPurpose, String)>,
}

impl UserPatch {
    pub fn new() -> Self {
        Self::default()
    }

    fn assign(mut self, column: &'static str, value: PatchValue) -> Self {
        self.assignments.retain(|(existing, _)| *existing != column);
        self.assignments.push((column, value));
        self
    }

    pub fn password_hash(self, hash: impl Into<String>) -> Self {
        self.assign("password_hash", PatchValue::Text(Some(hash.into())))
    }

    pub fn email_verified(self, verified: bool) -> Self {
        self.assign("is_email_verified", PatchValue::Flag(verified))
    }

    pub fn account_status(self, status: AccountStatus) -> Self {
        self.assign(
            "account_status",
            PatchValue::Text(Some(status.as_str().to_string())),
        )
    }

    pub fn onboarding_completed(self, completed: bool) -> Self {
        self.assign("onboarding_completed", PatchValue::Flag(completed))
    }

    pub fn last_login_at(self, at: DateTime<Utc>) -> Self {
        self.assign("last_login_at", PatchValue::Text(Some(format_timestamp(at))))
    }

    /// Store a freshly issued token hash, replacing any previous one.
    pub fn issue_token(
        self,
        purpose: TokenPurpose,
        hash: impl Into<String>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        self.assign(purpose.hash_column(), PatchValue::Text(Some(hash.into())))
            .assign(
                purpose.expiry_column(),
                PatchValue::Text(Some(format_timestamp(expires_at))),
            )
    }

    pub fn clear_token(self, purpose: TokenPurpose) -> Self {
        self.assign(purpose.hash_column(), PatchValue::Text(None))
            .assign(purpose.expiry_column(), PatchValue::Text(None))
    }

    /// Only apply the patch if the stored token for `purpose` still equals
    /// `hash` and has not expired.
    pub fn expect_token(mut self, purpose: TokenPurpose, hash: impl Into<String>) -> Self {
        self.guard = Some((purpose, hash.into()));
        self
    }

    /// Combine two patches; fields and guard from `other` win.
    pub fn merge(mut self, other: UserPatch) -> Self {
        for (column, value) in other.assignments {
            self = self.assign(column, value);
        }
        if other.guard.is_some() {
            self.guard = other.guard;
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn is_guarded(&self) -> bool {
        self.guard.is_some()
    }
}
