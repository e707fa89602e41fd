//! Authentication REST endpoints

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use carebridge_identity::{
    CodeRequest, EmailRequest, LoginRequest, MessageResponse, RegisterRequest,
    RegistrationOutcome, ResetPasswordRequest, SessionGrant, UserProfile,
};

use crate::error::{ErrorResponse, GatewayResult};
use crate::rest::run_detached;
use crate::state::GatewayState;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterBody {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    /// `patient` (default), `doctor` or `admin`.
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub specialization: Option<String>,
    #[serde(default)]
    pub years_of_experience: Option<i64>,
    #[serde(default)]
    pub license_number: Option<String>,
    #[serde(default)]
    pub tenant_id: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginBody {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub tenant_id: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CodeBody {
    pub email: String,
    pub code: String,
    #[serde(default)]
    pub tenant_id: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmailBody {
    pub email: String,
    #[serde(default)]
    pub tenant_id: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordBody {
    pub email: String,
    pub code: String,
    pub new_password: String,
    pub confirm_password: String,
    #[serde(default)]
    pub tenant_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: String,
    pub account_status: String,
    pub is_email_verified: bool,
    pub onboarding_completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub years_of_experience: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub token: String,
    pub user: UserResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_target: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationResponse {
    pub user: UserResponse,
    pub message: String,
    pub requires_verification: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageBody {
    pub message: String,
}

impl From<RegisterBody> for RegisterRequest {
    fn from(body: RegisterBody) -> Self {
        Self {
            first_name: body.first_name,
            last_name: body.last_name,
            email: body.email,
            password: body.password,
            confirm_password: body.confirm_password,
            role: body.role,
            phone: body.phone,
            specialization: body.specialization,
            years_of_experience: body.years_of_experience,
            license_number: body.license_number,
            tenant_id: body.tenant_id,
        }
    }
}

impl From<LoginBody> for LoginRequest {
    fn from(body: LoginBody) -> Self {
        Self {
            email: body.email,
            password: body.password,
            tenant_id: body.tenant_id,
        }
    }
}

impl From<CodeBody> for CodeRequest {
    fn from(body: CodeBody) -> Self {
        Self {
            email: body.email,
            code: body.code,
            tenant_id: body.tenant_id,
        }
    }
}

impl From<EmailBody> for EmailRequest {
    fn from(body: EmailBody) -> Self {
        Self {
            email: body.email,
            tenant_id: body.tenant_id,
        }
    }
}

impl From<ResetPasswordBody> for ResetPasswordRequest {
    fn from(body: ResetPasswordBody) -> Self {
        Self {
            email: body.email,
            code: body.code,
            new_password: body.new_password,
            confirm_password: body.confirm_password,
            tenant_id: body.tenant_id,
        }
    }
}

impl From<UserProfile> for UserResponse {
    fn from(user: UserProfile) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            role: user.role.to_string(),
            account_status: user.account_status.to_string(),
            is_email_verified: user.is_email_verified,
            onboarding_completed: user.onboarding_completed,
            tenant_id: user.tenant_id,
            phone: user.phone,
            specialization: user.specialization,
            years_of_experience: user.years_of_experience,
            license_number: user.license_number,
            last_login_at: user.last_login_at.map(|at| at.to_rfc3339()),
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

impl From<SessionGrant> for SessionResponse {
    fn from(grant: SessionGrant) -> Self {
        Self {
            token: grant.token,
            user: grant.user.into(),
            redirect_target: grant.redirect_target,
        }
    }
}

impl From<RegistrationOutcome> for RegistrationResponse {
    fn from(outcome: RegistrationOutcome) -> Self {
        Self {
            user: outcome.user.into(),
            message: outcome.message,
            requires_verification: outcome.requires_verification,
        }
    }
}

impl From<MessageResponse> for MessageBody {
    fn from(response: MessageResponse) -> Self {
        Self {
            message: response.message,
        }
    }
}

/// Create authentication routes
pub fn create_auth_routes() -> Router<GatewayState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/verify-email", post(verify_email))
        .route("/resend-verification", post(resend_verification))
        .route("/forgot-password", post(forgot_password))
        .route("/verify-reset-code", post(verify_reset_code))
        .route("/reset-password", post(reset_password))
}

#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "Auth",
    request_body = RegisterBody,
    responses(
        (status = 201, description = "Account created, verification code sent", body = RegistrationResponse),
        (status = 400, description = "Invalid registration form", body = ErrorResponse),
        (status = 404, description = "Clinic not found", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
        (status = 502, description = "Verification email could not be sent", body = ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<GatewayState>,
    Json(body): Json<RegisterBody>,
) -> GatewayResult<(StatusCode, Json<RegistrationResponse>)> {
    let identity = state.identity().clone();
    let outcome = run_detached(async move { identity.register(body.into()).await }).await?;

    Ok((StatusCode::CREATED, Json(outcome.into())))
}

#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Auth",
    request_body = LoginBody,
    responses(
        (status = 200, description = "Session issued", body = SessionResponse),
        (status = 401, description = "Invalid email or password", body = ErrorResponse),
        (status = 403, description = "Account pending approval or suspended", body = ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<GatewayState>,
    Json(body): Json<LoginBody>,
) -> GatewayResult<Json<SessionResponse>> {
    let identity = state.identity().clone();
    let grant = run_detached(async move { identity.login(body.into()).await }).await?;

    Ok(Json(grant.into()))
}

#[utoipa::path(
    post,
    path = "/auth/verify-email",
    tag = "Auth",
    request_body = CodeBody,
    responses(
        (status = 200, description = "Email verified, session issued", body = SessionResponse),
        (status = 404, description = "Account not found", body = ErrorResponse),
        (status = 422, description = "Invalid or expired code; newCodeSent reports a re-issue", body = ErrorResponse)
    )
)]
pub async fn verify_email(
    State(state): State<GatewayState>,
    Json(body): Json<CodeBody>,
) -> GatewayResult<Json<SessionResponse>> {
    let identity = state.identity().clone();
    let grant = run_detached(async move { identity.verify_email(body.into()).await }).await?;

    Ok(Json(grant.into()))
}

#[utoipa::path(
    post,
    path = "/auth/resend-verification",
    tag = "Auth",
    request_body = EmailBody,
    responses(
        (status = 200, description = "New code sent", body = MessageBody),
        (status = 404, description = "Account not found", body = ErrorResponse),
        (status = 409, description = "Email already verified", body = ErrorResponse)
    )
)]
pub async fn resend_verification(
    State(state): State<GatewayState>,
    Json(body): Json<EmailBody>,
) -> GatewayResult<Json<MessageBody>> {
    let identity = state.identity().clone();
    let response =
        run_detached(async move { identity.resend_verification_code(body.into()).await }).await?;

    Ok(Json(response.into()))
}

#[utoipa::path(
    post,
    path = "/auth/forgot-password",
    tag = "Auth",
    request_body = EmailBody,
    responses(
        (status = 200, description = "Reset code sent if the account exists", body = MessageBody),
        (status = 400, description = "Invalid email", body = ErrorResponse)
    )
)]
pub async fn forgot_password(
    State(state): State<GatewayState>,
    Json(body): Json<EmailBody>,
) -> GatewayResult<Json<MessageBody>> {
    let identity = state.identity().clone();
    let response = run_detached(async move { identity.forgot_password(body.into()).await }).await?;

    Ok(Json(response.into()))
}

#[utoipa::path(
    post,
    path = "/auth/verify-reset-code",
    tag = "Auth",
    request_body = CodeBody,
    responses(
        (status = 200, description = "Code is valid", body = MessageBody),
        (status = 422, description = "Invalid or expired code", body = ErrorResponse)
    )
)]
pub async fn verify_reset_code(
    State(state): State<GatewayState>,
    Json(body): Json<CodeBody>,
) -> GatewayResult<Json<MessageBody>> {
    let identity = state.identity().clone();
    let response =
        run_detached(async move { identity.verify_reset_code(body.into()).await }).await?;

    Ok(Json(response.into()))
}

#[utoipa::path(
    post,
    path = "/auth/reset-password",
    tag = "Auth",
    request_body = ResetPasswordBody,
    responses(
        (status = 200, description = "Password changed", body = MessageBody),
        (status = 400, description = "Weak or mismatched password", body = ErrorResponse),
        (status = 422, description = "Invalid or expired code", body = ErrorResponse)
    )
)]
pub async fn reset_password(
    State(state): State<GatewayState>,
    Json(body): Json<ResetPasswordBody>,
) -> GatewayResult<Json<MessageBody>> {
    let identity = state.identity().clone();
    let response = run_detached(async move { identity.reset_password(body.into()).await }).await?;

    Ok(Json(response.into()))
}
