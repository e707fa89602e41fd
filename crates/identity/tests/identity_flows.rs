//! End-to-end identity flows over real SQLite stores and a recording mailer.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tempfile::TempDir;

use carebridge_config::DatabaseConfig;
use carebridge_database::{
    initialize_pool, AccountStatus, ConnectionPool, NewTenant, NewUser, TenantBranding,
    TokenPurpose, UserPatch, UserRole,
};
use carebridge_identity::{
    hash_code, hash_password, CodeRequest, EmailRequest, EmailSender, IdentityError,
    IdentityResolver, IdentityService, LoginRequest, MailError, RegisterRequest,
    ResetPasswordRequest, SessionIssuer,
};

const PASSWORD: &str = "Secur3Pass";

#[derive(Default)]
struct RecordingMailer {
    sent: Mutex<Vec<(String, String)>>,
    failing: Mutex<bool>,
}

impl RecordingMailer {
    fn fail(&self, failing: bool) {
        *self.failing.lock().unwrap() = failing;
    }

    fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    /// The code carried by the most recent message to `to`.
    fn last_code_for(&self, to: &str) -> String {
        let sent = self.sent.lock().unwrap();
        let (_, html) = sent
            .iter()
            .rev()
            .find(|(recipient, _)| recipient == to)
            .expect("no email sent to recipient");
        let start = html.find("<code>").expect("email has no code") + "<code>".len();
        let end = html[start..].find("</code>").expect("unterminated code") + start;
        html[start..end].to_string()
    }
}

#[async_trait]
impl EmailSender for RecordingMailer {
    async fn send_email(&self, to: &str, _subject: &str, html: &str) -> Result<(), MailError> {
        if *self.failing.lock().unwrap() {
            return Err(MailError::Rejected(503));
        }
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), html.to_string()));
        Ok(())
    }
}

struct Harness {
    service: Arc<IdentityService>,
    pool: Arc<ConnectionPool>,
    mailer: Arc<RecordingMailer>,
    dir: TempDir,
}

impl Harness {
    async fn new() -> Self {
        Self::with_tenancy(true).await
    }

    async fn with_tenancy(multi_tenant_enabled: bool) -> Self {
        Self::build(multi_tenant_enabled, DatabaseConfig::default().operation_timeout_seconds).await
    }

    async fn with_operation_timeout(seconds: u64) -> Self {
        Self::build(true, seconds).await
    }

    async fn build(multi_tenant_enabled: bool, operation_timeout_seconds: u64) -> Self {
        let dir = TempDir::new().unwrap();
        let config = DatabaseConfig {
            registry_url: sqlite_url(&dir, "registry.db"),
            default_url: sqlite_url(&dir, "default.db"),
            max_connections: 2,
            operation_timeout_seconds,
            ..DatabaseConfig::default()
        };
        let pool = Arc::new(initialize_pool(&config).await.unwrap());
        let mailer = Arc::new(RecordingMailer::default());
        let service = Arc::new(IdentityService::new(
            IdentityResolver::new(pool.clone(), multi_tenant_enabled),
            SessionIssuer::new("test-secret", "carebridge-test"),
            mailer.clone(),
        ));

        let harness = Self {
            service,
            pool,
            mailer,
            dir,
        };
        harness.add_tenant("clinic1", true).await;
        harness
    }

    async fn add_tenant(&self, id: &str, active: bool) {
        self.add_tenant_at(id, &sqlite_url(&self.dir, &format!("{id}.db")), active)
            .await;
    }

    async fn add_tenant_at(&self, id: &str, locator: &str, active: bool) {
        self.pool
            .registry()
            .upsert_tenant(&NewTenant {
                id: id.to_string(),
                name: format!("{id} clinic"),
                backing_store_locator: locator.to_string(),
                active,
                branding: TenantBranding::default(),
            })
            .await
            .unwrap();
    }

    async fn seed_user(&self, tenant: Option<&str>, email: &str, password: &str) -> String {
        let handle = self.pool.acquire(tenant).await.unwrap();
        let user = self
            .pool
            .binder()
            .users_of(&handle)
            .insert(&NewUser {
                first_name: "Seeded".to_string(),
                last_name: "User".to_string(),
                email: email.to_string(),
                password_hash: hash_password(password).unwrap(),
                role: UserRole::Patient,
                account_status: AccountStatus::Active,
                tenant_id: tenant.map(str::to_owned),
                phone: None,
                specialization: None,
                years_of_experience: None,
                license_number: None,
            })
            .await
            .unwrap();
        user.id
    }

    async fn register_patient(&self, email: &str, tenant: Option<&str>) {
        self.service
            .register(patient_request(email, tenant))
            .await
            .unwrap();
    }

    async fn verify(&self, email: &str, tenant: Option<&str>) {
        let code = self.mailer.last_code_for(email);
        self.service
            .verify_email(code_request(email, &code, tenant))
            .await
            .unwrap();
    }
}

fn sqlite_url(dir: &TempDir, file: &str) -> String {
    format!("sqlite://{}", dir.path().join(file).display())
}

fn patient_request(email: &str, tenant: Option<&str>) -> RegisterRequest {
    RegisterRequest {
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        email: email.to_string(),
        password: PASSWORD.to_string(),
        confirm_password: PASSWORD.to_string(),
        tenant_id: tenant.map(str::to_owned),
        ..RegisterRequest::default()
    }
}

fn doctor_request(email: &str, tenant: Option<&str>) -> RegisterRequest {
    RegisterRequest {
        role: Some("doctor".to_string()),
        specialization: Some("Cardiology".to_string()),
        years_of_experience: Some(12),
        license_number: Some("LIC-4411".to_string()),
        ..patient_request(email, tenant)
    }
}

fn code_request(email: &str, code: &str, tenant: Option<&str>) -> CodeRequest {
    CodeRequest {
        email: email.to_string(),
        code: code.to_string(),
        tenant_id: tenant.map(str::to_owned),
    }
}

fn login_request(email: &str, password: &str, tenant: Option<&str>) -> LoginRequest {
    LoginRequest {
        email: email.to_string(),
        password: password.to_string(),
        tenant_id: tenant.map(str::to_owned),
    }
}

fn email_request(email: &str, tenant: Option<&str>) -> EmailRequest {
    EmailRequest {
        email: email.to_string(),
        tenant_id: tenant.map(str::to_owned),
    }
}

#[tokio::test]
async fn tenant_record_shadows_default_record_with_same_email() {
    let harness = Harness::new().await;
    let tenant_id = harness
        .seed_user(Some("clinic1"), "shared@example.com", "TenantPass1")
        .await;
    harness
        .seed_user(None, "shared@example.com", "DefaultPass1")
        .await;

    let grant = harness
        .service
        .login(login_request("shared@example.com", "TenantPass1", Some("clinic1")))
        .await
        .unwrap();
    assert_eq!(grant.user.id, tenant_id);

    let claims = harness.service.authenticate(&grant.token).unwrap();
    assert_eq!(claims.tenant_id.as_deref(), Some("clinic1"));

    let err = harness
        .service
        .login(login_request("shared@example.com", "DefaultPass1", Some("clinic1")))
        .await
        .unwrap_err();
    assert!(matches!(err, IdentityError::InvalidCredentials));
}

#[tokio::test]
async fn login_falls_back_to_default_store() {
    let harness = Harness::new().await;
    harness.add_tenant("dormant", false).await;
    let default_id = harness
        .seed_user(None, "fallback@example.com", PASSWORD)
        .await;

    for tenant in [Some("clinic1"), Some("dormant"), Some("nowhere"), None] {
        let grant = harness
            .service
            .login(login_request("fallback@example.com", PASSWORD, tenant))
            .await
            .unwrap();
        assert_eq!(grant.user.id, default_id);
        let claims = harness.service.authenticate(&grant.token).unwrap();
        assert_eq!(claims.tenant_id, None);
    }
}

#[tokio::test]
async fn unreachable_tenant_store_is_reported_not_skipped() {
    let harness = Harness::new().await;
    // A directory cannot be opened as a database file.
    let broken = format!("sqlite://{}", harness.dir.path().display());
    harness.add_tenant_at("clinic2", &broken, true).await;
    harness.seed_user(None, "shared@example.com", PASSWORD).await;

    let err = harness
        .service
        .login(login_request("shared@example.com", PASSWORD, Some("clinic2")))
        .await
        .unwrap_err();
    assert!(matches!(err, IdentityError::ConnectionFailed(_)), "{err:?}");

    let err = harness
        .service
        .forgot_password(email_request("shared@example.com", Some("clinic2")))
        .await
        .unwrap_err();
    assert!(matches!(err, IdentityError::ConnectionFailed(_)), "{err:?}");
    assert_eq!(harness.mailer.count(), 0);

    harness
        .service
        .login(login_request("shared@example.com", PASSWORD, None))
        .await
        .unwrap();
}

#[tokio::test]
async fn locked_tenant_store_surfaces_a_timeout() {
    let harness = Harness::with_operation_timeout(1).await;
    harness
        .seed_user(Some("clinic1"), "busy@example.com", PASSWORD)
        .await;

    let handle = harness.pool.acquire(Some("clinic1")).await.unwrap();
    let mut writer = handle.pool().acquire().await.unwrap();
    sqlx::query("BEGIN IMMEDIATE")
        .execute(&mut *writer)
        .await
        .unwrap();

    let err = harness
        .service
        .login(login_request("busy@example.com", PASSWORD, Some("clinic1")))
        .await
        .unwrap_err();
    assert!(matches!(err, IdentityError::Timeout(_)), "{err:?}");

    sqlx::query("ROLLBACK").execute(&mut *writer).await.unwrap();
}

#[tokio::test]
async fn malformed_tenant_id_is_rejected_as_input() {
    let harness = Harness::new().await;
    harness.seed_user(None, "someone@example.com", PASSWORD).await;

    let err = harness
        .service
        .login(login_request("someone@example.com", PASSWORD, Some("../etc")))
        .await
        .unwrap_err();
    match err {
        IdentityError::InvalidInput(fields) => assert_eq!(fields[0].field, "tenantId"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn tenant_ids_are_ignored_when_tenancy_is_disabled() {
    let harness = Harness::with_tenancy(false).await;
    harness.register_patient("solo@example.com", Some("clinic1")).await;

    let default = harness.pool.acquire(None).await.unwrap();
    let user = harness
        .pool
        .binder()
        .users_of(&default)
        .find_by_email("solo@example.com")
        .await
        .unwrap()
        .expect("user should land in the default store");
    assert_eq!(user.tenant_id, None);
    assert!(harness.service.list_tenants().await.unwrap().is_empty());
}

#[tokio::test]
async fn patient_registration_verification_and_redirect() {
    let harness = Harness::new().await;

    let outcome = harness
        .service
        .register(patient_request("Patient@Example.com", None))
        .await
        .unwrap();
    assert!(outcome.requires_verification);
    assert_eq!(outcome.user.email, "patient@example.com");
    assert!(!outcome.user.is_email_verified);
    assert_eq!(harness.mailer.count(), 1);

    let code = harness.mailer.last_code_for("patient@example.com");
    assert_eq!(code.len(), 6);
    assert!(code.chars().all(|c| c.is_ascii_digit()));

    let grant = harness
        .service
        .verify_email(code_request("patient@example.com", &code, None))
        .await
        .unwrap();
    assert!(grant.user.is_email_verified);
    assert_eq!(grant.redirect_target.as_deref(), Some("/onboarding"));

    let claims = harness.service.authenticate(&grant.token).unwrap();
    assert_eq!(claims.role, UserRole::Patient);
    assert_eq!(claims.tenant_id, None);

    let handle = harness.pool.acquire(None).await.unwrap();
    let stored = harness
        .pool
        .binder()
        .users_of(&handle)
        .find_by_id(&grant.user.id)
        .await
        .unwrap()
        .unwrap();
    assert!(stored.email_verification_token_hash.is_none());
    assert!(stored.email_verification_expires_at.is_none());
}

#[tokio::test]
async fn verification_code_is_single_use() {
    let harness = Harness::new().await;
    harness.register_patient("once@example.com", Some("clinic1")).await;
    let code = harness.mailer.last_code_for("once@example.com");

    harness
        .service
        .verify_email(code_request("once@example.com", &code, Some("clinic1")))
        .await
        .unwrap();

    let err = harness
        .service
        .verify_email(code_request("once@example.com", &code, Some("clinic1")))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        IdentityError::InvalidOrExpiredToken {
            new_code_sent: false
        }
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_verifications_have_one_winner() {
    let harness = Harness::new().await;
    harness.register_patient("race@example.com", Some("clinic1")).await;
    let code = harness.mailer.last_code_for("race@example.com");

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let service = Arc::clone(&harness.service);
            let request = code_request("race@example.com", &code, Some("clinic1"));
            tokio::spawn(async move { service.verify_email(request).await })
        })
        .collect();

    let mut winners = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(grant) => {
                assert!(grant.user.is_email_verified);
                winners += 1;
            }
            Err(err) => assert!(
                matches!(
                    err,
                    IdentityError::InvalidOrExpiredToken {
                        new_code_sent: false
                    }
                ),
                "{err:?}"
            ),
        }
    }
    assert_eq!(winners, 1);
    assert_eq!(harness.mailer.count(), 1);
}

#[tokio::test]
async fn wrong_verification_code_is_rejected_without_reissue() {
    let harness = Harness::new().await;
    harness.register_patient("typo@example.com", None).await;
    let code = harness.mailer.last_code_for("typo@example.com");
    let wrong = if code == "111111" { "222222" } else { "111111" };

    let err = harness
        .service
        .verify_email(code_request("typo@example.com", wrong, None))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        IdentityError::InvalidOrExpiredToken {
            new_code_sent: false
        }
    ));
    assert_eq!(harness.mailer.count(), 1);

    harness
        .service
        .verify_email(code_request("typo@example.com", &code, None))
        .await
        .unwrap();
}

#[tokio::test]
async fn expired_verification_code_triggers_a_fresh_one() {
    let harness = Harness::new().await;
    harness.register_patient("late@example.com", None).await;

    let handle = harness.pool.acquire(None).await.unwrap();
    let repository = harness.pool.binder().users_of(&handle);
    let user = repository
        .find_by_email("late@example.com")
        .await
        .unwrap()
        .unwrap();
    let patch = UserPatch::new().issue_token(
        TokenPurpose::EmailVerification,
        hash_code("123456"),
        Utc::now() - Duration::minutes(1),
    );
    assert!(repository.update_fields(&user.id, &patch).await.unwrap());

    let err = harness
        .service
        .verify_email(code_request("late@example.com", "123456", None))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        IdentityError::InvalidOrExpiredToken { new_code_sent: true }
    ));
    assert_eq!(harness.mailer.count(), 2);

    harness.verify("late@example.com", None).await;
}

#[tokio::test]
async fn doctor_stays_pending_after_verification() {
    let harness = Harness::new().await;

    let outcome = harness
        .service
        .register(doctor_request("doc@example.com", Some("clinic1")))
        .await
        .unwrap();
    assert_eq!(outcome.user.role, UserRole::Doctor);
    assert_eq!(outcome.user.account_status, AccountStatus::Pending);
    assert_eq!(outcome.user.tenant_id.as_deref(), Some("clinic1"));

    let code = harness.mailer.last_code_for("doc@example.com");
    let grant = harness
        .service
        .verify_email(code_request("doc@example.com", &code, Some("clinic1")))
        .await
        .unwrap();
    assert_eq!(grant.user.account_status, AccountStatus::Pending);
    assert_eq!(grant.redirect_target.as_deref(), Some("/pending-approval"));

    let err = harness
        .service
        .login(login_request("doc@example.com", PASSWORD, Some("clinic1")))
        .await
        .unwrap_err();
    assert!(matches!(err, IdentityError::PendingApproval));
}

#[tokio::test]
async fn suspended_patient_cannot_log_in() {
    let harness = Harness::new().await;
    let id = harness.seed_user(None, "blocked@example.com", PASSWORD).await;

    let handle = harness.pool.acquire(None).await.unwrap();
    harness
        .pool
        .binder()
        .users_of(&handle)
        .update_fields(&id, &UserPatch::new().account_status(AccountStatus::Suspended))
        .await
        .unwrap();

    let err = harness
        .service
        .login(login_request("blocked@example.com", PASSWORD, None))
        .await
        .unwrap_err();
    assert!(matches!(err, IdentityError::AccountSuspended));
}

#[tokio::test]
async fn login_records_last_login() {
    let harness = Harness::new().await;
    harness.seed_user(None, "returning@example.com", PASSWORD).await;

    let grant = harness
        .service
        .login(login_request("returning@example.com", PASSWORD, None))
        .await
        .unwrap();
    assert!(grant.user.last_login_at.is_some());
    assert_eq!(grant.redirect_target.as_deref(), Some("/onboarding"));

    let claims = harness.service.authenticate(&grant.token).unwrap();
    let profile = harness.service.current_user(&claims).await.unwrap();
    assert!(profile.last_login_at.is_some());
}

#[tokio::test]
async fn unknown_email_fails_login_with_invalid_credentials() {
    let harness = Harness::new().await;
    let err = harness
        .service
        .login(login_request("ghost@example.com", PASSWORD, Some("clinic1")))
        .await
        .unwrap_err();
    assert!(matches!(err, IdentityError::InvalidCredentials));
}

#[tokio::test]
async fn duplicate_registration_in_same_store_is_rejected() {
    let harness = Harness::new().await;
    harness.register_patient("dup@example.com", Some("clinic1")).await;

    let err = harness
        .service
        .register(patient_request("DUP@example.com", Some("clinic1")))
        .await
        .unwrap_err();
    assert!(matches!(err, IdentityError::DuplicateIdentity));

    harness.register_patient("dup@example.com", None).await;
}

#[tokio::test]
async fn registration_into_unavailable_tenant_is_refused() {
    let harness = Harness::new().await;
    harness.add_tenant("closed", false).await;

    for tenant in ["closed", "unknown"] {
        let err = harness
            .service
            .register(patient_request("new@example.com", Some(tenant)))
            .await
            .unwrap_err();
        assert!(matches!(err, IdentityError::TenantUnavailable(_)), "{err:?}");
    }
    assert_eq!(harness.mailer.count(), 0);
}

#[tokio::test]
async fn registration_is_rolled_back_when_mail_fails() {
    let harness = Harness::new().await;
    harness.mailer.fail(true);

    let err = harness
        .service
        .register(patient_request("unlucky@example.com", Some("clinic1")))
        .await
        .unwrap_err();
    assert!(matches!(err, IdentityError::RegistrationFailed(_)));

    let handle = harness.pool.acquire(Some("clinic1")).await.unwrap();
    let repository = harness.pool.binder().users_of(&handle);
    assert!(repository
        .find_by_email("unlucky@example.com")
        .await
        .unwrap()
        .is_none());

    harness.mailer.fail(false);
    harness
        .register_patient("unlucky@example.com", Some("clinic1"))
        .await;
}

#[tokio::test]
async fn invalid_registration_reports_fields() {
    let harness = Harness::new().await;
    let request = RegisterRequest {
        email: "not-an-email".to_string(),
        confirm_password: "Different1".to_string(),
        ..patient_request("", None)
    };

    match harness.service.register(request).await.unwrap_err() {
        IdentityError::InvalidInput(fields) => {
            let names: Vec<_> = fields.iter().map(|f| f.field.as_str()).collect();
            assert!(names.contains(&"email"));
            assert!(names.contains(&"confirmPassword"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn resend_issues_a_new_code_until_verified() {
    let harness = Harness::new().await;
    harness.register_patient("resend@example.com", None).await;
    let first = harness.mailer.last_code_for("resend@example.com");

    harness
        .service
        .resend_verification_code(email_request("resend@example.com", None))
        .await
        .unwrap();
    assert_eq!(harness.mailer.count(), 2);

    let second = harness.mailer.last_code_for("resend@example.com");
    if first != second {
        let err = harness
            .service
            .verify_email(code_request("resend@example.com", &first, None))
            .await
            .unwrap_err();
        assert!(matches!(err, IdentityError::InvalidOrExpiredToken { .. }));
    }

    harness.verify("resend@example.com", None).await;
    let err = harness
        .service
        .resend_verification_code(email_request("resend@example.com", None))
        .await
        .unwrap_err();
    assert!(matches!(err, IdentityError::EmailAlreadyVerified));
}

#[tokio::test]
async fn forgot_password_is_silent_for_unknown_email() {
    let harness = Harness::new().await;
    let response = harness
        .service
        .forgot_password(email_request("nobody@example.com", Some("clinic1")))
        .await
        .unwrap();
    assert!(!response.message.is_empty());
    assert_eq!(harness.mailer.count(), 0);
}

#[tokio::test]
async fn password_reset_round_trip() {
    let harness = Harness::new().await;
    harness.register_patient("first@example.com", Some("clinic1")).await;
    harness.register_patient("second@example.com", Some("clinic1")).await;

    for email in ["first@example.com", "second@example.com"] {
        harness
            .service
            .forgot_password(email_request(email, Some("clinic1")))
            .await
            .unwrap();
    }
    let first_code = harness.mailer.last_code_for("first@example.com");
    let second_code = harness.mailer.last_code_for("second@example.com");

    harness
        .service
        .verify_reset_code(code_request("first@example.com", &first_code, Some("clinic1")))
        .await
        .unwrap();

    let reset = |code: &str| ResetPasswordRequest {
        email: "first@example.com".to_string(),
        code: code.to_string(),
        new_password: "Fresh3rPass".to_string(),
        confirm_password: "Fresh3rPass".to_string(),
        tenant_id: Some("clinic1".to_string()),
    };

    let err = harness
        .service
        .reset_password(reset(&second_code))
        .await
        .unwrap_err();
    assert!(matches!(err, IdentityError::InvalidOrExpiredToken { .. }));

    harness
        .service
        .forgot_password(email_request("first@example.com", Some("clinic1")))
        .await
        .unwrap();
    let replaced_code = first_code;
    let first_code = harness.mailer.last_code_for("first@example.com");
    assert_ne!(replaced_code, first_code);

    let err = harness
        .service
        .reset_password(reset(&replaced_code))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        IdentityError::InvalidOrExpiredToken {
            new_code_sent: false
        }
    ));

    harness
        .service
        .reset_password(reset(&first_code))
        .await
        .unwrap();

    let err = harness
        .service
        .reset_password(reset(&first_code))
        .await
        .unwrap_err();
    assert!(matches!(err, IdentityError::InvalidOrExpiredToken { .. }));

    harness
        .service
        .login(login_request("first@example.com", "Fresh3rPass", Some("clinic1")))
        .await
        .unwrap();
    let err = harness
        .service
        .login(login_request("first@example.com", PASSWORD, Some("clinic1")))
        .await
        .unwrap_err();
    assert!(matches!(err, IdentityError::InvalidCredentials));
}

#[tokio::test]
async fn current_user_requires_a_live_record_and_tenant() {
    let harness = Harness::new().await;
    harness.add_tenant("clinic2", true).await;
    harness.seed_user(Some("clinic2"), "moving@example.com", PASSWORD).await;

    let grant = harness
        .service
        .login(login_request("moving@example.com", PASSWORD, Some("clinic2")))
        .await
        .unwrap();
    let claims = harness.service.authenticate(&grant.token).unwrap();
    assert_eq!(
        harness.service.current_user(&claims).await.unwrap().email,
        "moving@example.com"
    );

    harness
        .pool
        .registry()
        .set_active("clinic2", false)
        .await
        .unwrap();
    let err = harness.service.current_user(&claims).await.unwrap_err();
    assert!(matches!(err, IdentityError::Unauthorized));

    assert!(matches!(
        harness.service.authenticate("not-a-token").unwrap_err(),
        IdentityError::Unauthorized
    ));
}

#[tokio::test]
async fn list_tenants_returns_active_tenants_only() {
    let harness = Harness::new().await;
    harness.add_tenant("archived", false).await;

    let tenants = harness.service.list_tenants().await.unwrap();
    let ids: Vec<_> = tenants.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["clinic1"]);
}
