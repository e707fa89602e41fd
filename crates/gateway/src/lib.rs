//! # Carebridge Gateway Crate
//!
//! HTTP surface for the identity platform. Routes map one-to-one onto
//! [`carebridge_identity::IdentityService`] operations; identity errors are
//! translated into status codes by [`GatewayError`].
//!
//! - **REST**: tenant listing, the auth lifecycle and the session-bound
//!   `/users/me`, with OpenAPI documentation in debug builds
//! - **Middleware**: bearer sessions, CORS and request logging

pub mod error;
pub mod middleware;
pub mod rest;
pub mod state;

pub use error::{GatewayError, GatewayResult};
pub use middleware::require_session;
pub use state::GatewayState;

use axum::{middleware as axum_middleware, Router};
use tower::ServiceBuilder;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

/// Create the main application router with all routes
pub fn create_router(state: GatewayState) -> Router {
    #[allow(unused_mut)]
    let mut router = rest::create_rest_routes(state.clone())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(axum_middleware::from_fn(middleware::logging_middleware))
                .layer(middleware::create_cors_layer()),
        );

    #[cfg(debug_assertions)]
    {
        #[derive(OpenApi)]
        #[openapi(
            paths(
                rest::health::health_check,
                rest::tenants::list_tenants,
                rest::auth::register,
                rest::auth::login,
                rest::auth::verify_email,
                rest::auth::resend_verification,
                rest::auth::forgot_password,
                rest::auth::verify_reset_code,
                rest::auth::reset_password,
                rest::users::me,
            ),
            components(
                schemas(
                    error::ErrorResponse,
                    error::FieldErrorResponse,
                    rest::health::HealthResponse,
                    rest::tenants::BrandingResponse,
                    rest::tenants::TenantResponse,
                    rest::tenants::TenantListResponse,
                    rest::auth::RegisterBody,
                    rest::auth::LoginBody,
                    rest::auth::CodeBody,
                    rest::auth::EmailBody,
                    rest::auth::ResetPasswordBody,
                    rest::auth::UserResponse,
                    rest::auth::SessionResponse,
                    rest::auth::RegistrationResponse,
                    rest::auth::MessageBody,
                )
            ),
            tags(
                (name = "Health", description = "Liveness"),
                (name = "Tenants", description = "Clinic selection"),
                (name = "Auth", description = "Registration, login, verification and password reset"),
                (name = "Users", description = "Session-bound user data"),
            )
        )]
        struct ApiDoc;

        router = router.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));
    }

    router
}
