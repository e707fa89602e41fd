//! Session-bound user endpoints

use axum::{extract::State, middleware, routing::get, Extension, Json, Router};

use carebridge_identity::SessionClaims;

use crate::error::{ErrorResponse, GatewayResult};
use crate::middleware::require_session;
use crate::rest::auth::UserResponse;
use crate::rest::run_detached;
use crate::state::GatewayState;

/// Create user routes. Every route here requires a bearer session.
pub fn create_user_routes(state: GatewayState) -> Router<GatewayState> {
    Router::new()
        .route("/me", get(me))
        .route_layer(middleware::from_fn_with_state(state, require_session))
}

#[utoipa::path(
    get,
    path = "/users/me",
    tag = "Users",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Missing or invalid session", body = ErrorResponse)
    )
)]
pub async fn me(
    State(state): State<GatewayState>,
    Extension(claims): Extension<SessionClaims>,
) -> GatewayResult<Json<UserResponse>> {
    let identity = state.identity().clone();
    let profile = run_detached(async move { identity.current_user(&claims).await }).await?;

    Ok(Json(profile.into()))
}
