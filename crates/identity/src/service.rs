//! Identity operations composed from the resolver, the token service, the
//! session issuer and the mailer.

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};

use carebridge_database::{AccountStatus, NewUser, TokenPurpose, User, UserPatch, UserRepository, UserRole};

use crate::mailer::{templates, EmailSender, MailError};
use crate::redirect::redirect_target;
use crate::resolver::{IdentityResolver, Resolution};
use crate::tokens::{IssuedCode, TokenError, TokenService};
use crate::types::{
    CodeRequest, EmailRequest, IdentityError, IdentityResult, LoginRequest, MessageResponse,
    RegisterRequest, RegistrationOutcome, ResetPasswordRequest, SessionGrant, TenantSummary,
    UserProfile,
};
use crate::utils::validation::{
    normalize_email, validate_code_submission, validate_email_only, validate_login,
    validate_password_reset, validate_registration,
};
use crate::utils::{hash_password, verify_password, SessionClaims, SessionIssuer};

const RESET_REQUESTED_MESSAGE: &str =
    "If an account exists for this email, a password reset code has been sent";

pub struct IdentityService {
    resolver: IdentityResolver,
    tokens: TokenService,
    sessions: SessionIssuer,
    mailer: Arc<dyn EmailSender>,
}

impl IdentityService {
    pub fn new(resolver: IdentityResolver, sessions: SessionIssuer, mailer: Arc<dyn EmailSender>) -> Self {
        Self {
            resolver,
            tokens: TokenService::new(),
            sessions,
            mailer,
        }
    }

    pub fn resolver(&self) -> &IdentityResolver {
        &self.resolver
    }

    /// Active tenants for the public selection screen. Empty while tenancy
    /// is disabled, since tenant ids are ignored then.
    pub async fn list_tenants(&self) -> IdentityResult<Vec<TenantSummary>> {
        if !self.resolver.multi_tenant_enabled() {
            return Ok(Vec::new());
        }

        let tenants = self.resolver.pool().registry().list_active_tenants().await?;
        Ok(tenants.iter().map(TenantSummary::from).collect())
    }

    pub async fn register(&self, request: RegisterRequest) -> IdentityResult<RegistrationOutcome> {
        let role = validate_registration(&request)?;
        let email = normalize_email(&request.email);
        let tenant_id = self.resolver.effective_tenant(request.tenant_id.as_deref());

        let repository = self.resolver.repository_for(tenant_id).await?;
        if repository.find_by_email(&email).await?.is_some() {
            return Err(IdentityError::DuplicateIdentity);
        }

        let account_status = match role {
            UserRole::Doctor => AccountStatus::Pending,
            UserRole::Patient | UserRole::Admin => AccountStatus::Active,
        };
        let is_doctor = role == UserRole::Doctor;

        let user = repository
            .insert(&NewUser {
                first_name: request.first_name.trim().to_string(),
                last_name: request.last_name.trim().to_string(),
                email,
                password_hash: hash_password(&request.password)?,
                role,
                account_status,
                tenant_id: tenant_id.map(str::to_owned),
                phone: clean_optional(request.phone),
                specialization: clean_optional(request.specialization).filter(|_| is_doctor),
                years_of_experience: request.years_of_experience.filter(|_| is_doctor),
                license_number: clean_optional(request.license_number).filter(|_| is_doctor),
            })
            .await?;

        let issued = match self
            .tokens
            .issue(&repository, &user.id, TokenPurpose::EmailVerification)
            .await
        {
            Ok(issued) => issued,
            Err(err) => {
                self.roll_back_registration(&repository, &user).await;
                return Err(err);
            }
        };

        if let Err(err) = self.send_code(&user, TokenPurpose::EmailVerification, &issued).await {
            error!(user_id = %user.id, error = %err, "verification email failed, rolling back registration");
            self.roll_back_registration(&repository, &user).await;
            return Err(IdentityError::RegistrationFailed(
                "verification email could not be sent".to_string(),
            ));
        }

        info!(
            user_id = %user.id,
            role = %user.role,
            tenant_id = tenant_id.unwrap_or("default"),
            "user registered"
        );
        Ok(RegistrationOutcome {
            user: UserProfile::from(&user),
            message: "Registration successful. Check your email for a verification code".to_string(),
            requires_verification: true,
        })
    }

    pub async fn login(&self, request: LoginRequest) -> IdentityResult<SessionGrant> {
        validate_login(&request.email, &request.password)?;
        let email = normalize_email(&request.email);

        let Some(resolution) = self
            .resolver
            .resolve_by_email(&email, request.tenant_id.as_deref())
            .await?
        else {
            return Err(IdentityError::InvalidCredentials);
        };
        let Resolution {
            mut user,
            repository,
            found_in,
        } = resolution;

        if !verify_password(&request.password, &user.password_hash) {
            return Err(IdentityError::InvalidCredentials);
        }

        match (user.role, user.account_status) {
            (UserRole::Doctor, status) if status != AccountStatus::Active => {
                return Err(IdentityError::PendingApproval);
            }
            (_, AccountStatus::Suspended | AccountStatus::Rejected) => {
                return Err(IdentityError::AccountSuspended);
            }
            _ => {}
        }

        let now = Utc::now();
        repository
            .update_fields(&user.id, &UserPatch::new().last_login_at(now))
            .await?;
        user.last_login_at = Some(now);

        let token = self.sessions.issue(&user, found_in.tenant_id())?;
        info!(user_id = %user.id, store = %found_in, "user logged in");

        Ok(SessionGrant {
            token,
            redirect_target: Some(redirect_target(&user).to_string()),
            user: UserProfile::from(&user),
        })
    }

    pub async fn verify_email(&self, request: CodeRequest) -> IdentityResult<SessionGrant> {
        validate_code_submission(&request.email, &request.code)?;
        let email = normalize_email(&request.email);

        let Resolution {
            user,
            repository,
            found_in,
        } = self
            .resolver
            .resolve_by_email(&email, request.tenant_id.as_deref())
            .await?
            .ok_or(IdentityError::NotFound)?;

        if user.is_email_verified {
            return Err(IdentityError::InvalidOrExpiredToken {
                new_code_sent: false,
            });
        }

        let stored_hash = match self.tokens.validate(
            &user,
            TokenPurpose::EmailVerification,
            &request.code,
            Utc::now(),
        ) {
            Ok(stored_hash) => stored_hash,
            Err(TokenError::Mismatch) => {
                return Err(IdentityError::InvalidOrExpiredToken {
                    new_code_sent: false,
                })
            }
            Err(reason @ (TokenError::Missing | TokenError::Expired)) => {
                info!(user_id = %user.id, reason = %reason, "re-issuing verification code");
                let issued = self
                    .tokens
                    .issue(&repository, &user.id, TokenPurpose::EmailVerification)
                    .await?;
                self.send_code(&user, TokenPurpose::EmailVerification, &issued)
                    .await
                    .map_err(delivery_failed)?;
                return Err(IdentityError::InvalidOrExpiredToken { new_code_sent: true });
            }
        };

        let mut patch = UserPatch::new().email_verified(true);
        if user.role != UserRole::Doctor && user.account_status == AccountStatus::Pending {
            patch = patch.account_status(AccountStatus::Active);
        }
        let patch = patch.merge(
            self.tokens
                .consume_patch(TokenPurpose::EmailVerification, &stored_hash),
        );

        if !repository.update_fields(&user.id, &patch).await? {
            return Err(IdentityError::InvalidOrExpiredToken {
                new_code_sent: false,
            });
        }

        let user = repository
            .find_by_id(&user.id)
            .await?
            .ok_or(IdentityError::NotFound)?;
        let token = self.sessions.issue(&user, found_in.tenant_id())?;
        info!(user_id = %user.id, store = %found_in, "email verified");

        Ok(SessionGrant {
            token,
            redirect_target: Some(redirect_target(&user).to_string()),
            user: UserProfile::from(&user),
        })
    }

    pub async fn resend_verification_code(&self, request: EmailRequest) -> IdentityResult<MessageResponse> {
        validate_email_only(&request.email)?;
        let email = normalize_email(&request.email);

        let Resolution { user, repository, .. } = self
            .resolver
            .resolve_by_email(&email, request.tenant_id.as_deref())
            .await?
            .ok_or(IdentityError::NotFound)?;

        if user.is_email_verified {
            return Err(IdentityError::EmailAlreadyVerified);
        }

        let issued = self
            .tokens
            .issue(&repository, &user.id, TokenPurpose::EmailVerification)
            .await?;
        self.send_code(&user, TokenPurpose::EmailVerification, &issued)
            .await
            .map_err(delivery_failed)?;

        Ok(MessageResponse::new("A new verification code has been sent"))
    }

    /// Always answers the same way for unknown addresses, so the endpoint
    /// cannot be used to discover accounts.
    pub async fn forgot_password(&self, request: EmailRequest) -> IdentityResult<MessageResponse> {
        validate_email_only(&request.email)?;
        let email = normalize_email(&request.email);

        let Some(Resolution { user, repository, .. }) = self
            .resolver
            .resolve_by_email(&email, request.tenant_id.as_deref())
            .await?
        else {
            info!("password reset requested for unknown email");
            return Ok(MessageResponse::new(RESET_REQUESTED_MESSAGE));
        };

        let issued = self
            .tokens
            .issue(&repository, &user.id, TokenPurpose::PasswordReset)
            .await?;
        self.send_code(&user, TokenPurpose::PasswordReset, &issued)
            .await
            .map_err(delivery_failed)?;

        info!(user_id = %user.id, "password reset code issued");
        Ok(MessageResponse::new(RESET_REQUESTED_MESSAGE))
    }

    /// Check a reset code without consuming it.
    pub async fn verify_reset_code(&self, request: CodeRequest) -> IdentityResult<MessageResponse> {
        validate_code_submission(&request.email, &request.code)?;
        let email = normalize_email(&request.email);

        let resolution = self
            .resolver
            .resolve_by_email(&email, request.tenant_id.as_deref())
            .await?
            .ok_or(IdentityError::InvalidOrExpiredToken {
                new_code_sent: false,
            })?;

        self.tokens
            .validate(
                &resolution.user,
                TokenPurpose::PasswordReset,
                &request.code,
                Utc::now(),
            )
            .map_err(|_| IdentityError::InvalidOrExpiredToken {
                new_code_sent: false,
            })?;

        Ok(MessageResponse::new("Reset code is valid"))
    }

    pub async fn reset_password(&self, request: ResetPasswordRequest) -> IdentityResult<MessageResponse> {
        validate_password_reset(
            &request.email,
            &request.code,
            &request.new_password,
            &request.confirm_password,
        )?;
        let email = normalize_email(&request.email);
        let invalid = || IdentityError::InvalidOrExpiredToken {
            new_code_sent: false,
        };

        let Resolution { user, repository, .. } = self
            .resolver
            .resolve_by_email(&email, request.tenant_id.as_deref())
            .await?
            .ok_or_else(invalid)?;

        let stored_hash = self
            .tokens
            .validate(&user, TokenPurpose::PasswordReset, &request.code, Utc::now())
            .map_err(|_| invalid())?;

        let patch = UserPatch::new()
            .password_hash(hash_password(&request.new_password)?)
            .merge(
                self.tokens
                    .consume_patch(TokenPurpose::PasswordReset, &stored_hash),
            );
        if !repository.update_fields(&user.id, &patch).await? {
            return Err(invalid());
        }

        info!(user_id = %user.id, "password reset");
        Ok(MessageResponse::new("Password has been reset"))
    }

    /// Verify a bearer credential.
    pub fn authenticate(&self, token: &str) -> IdentityResult<SessionClaims> {
        self.sessions.validate(token)
    }

    /// Profile of the session's user, read from the store the session names.
    pub async fn current_user(&self, claims: &SessionClaims) -> IdentityResult<UserProfile> {
        match self
            .resolver
            .resolve_by_id(&claims.sub, claims.tenant_id.as_deref())
            .await
        {
            Ok(Some(resolution)) => Ok(UserProfile::from(&resolution.user)),
            Ok(None) | Err(IdentityError::TenantUnavailable(_)) => Err(IdentityError::Unauthorized),
            Err(err) => Err(err),
        }
    }

    async fn send_code(&self, user: &User, purpose: TokenPurpose, issued: &IssuedCode) -> Result<(), MailError> {
        let email = match purpose {
            TokenPurpose::EmailVerification => {
                templates::verification_email(&user.first_name, &issued.plaintext, issued.expires_at)
            }
            TokenPurpose::PasswordReset => {
                templates::password_reset_email(&user.first_name, &issued.plaintext, issued.expires_at)
            }
        };

        self.mailer
            .send_email(&user.email, &email.subject, &email.html)
            .await
    }

    async fn roll_back_registration(&self, repository: &UserRepository, user: &User) {
        if let Err(err) = repository.delete(&user.id).await {
            warn!(user_id = %user.id, error = %err, "failed to roll back registration");
        }
    }
}

fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn delivery_failed(err: MailError) -> IdentityError {
    error!(error = %err, "email delivery failed");
    IdentityError::Internal("email could not be delivered".to_string())
}
