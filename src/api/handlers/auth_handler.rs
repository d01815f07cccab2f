//! Authentication handlers.

use axum::{
    extract::{Extension, State},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::ProfileResponse;
use crate::errors::AppResult;
use crate::services::{AccessToken, TokenPair};

/// Credentials exchanged for a token pair
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(required)]
    #[schema(example = "colombo.clerk")]
    pub username: Option<String>,
    #[validate(required)]
    #[schema(example = "SecurePass123!")]
    pub password: Option<String>,
}

/// Refresh token exchanged for a new access token
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RefreshRequest {
    #[validate(required)]
    pub refresh: Option<String>,
}

/// Public token routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/token/", post(obtain_token))
        .route("/token/refresh/", post(refresh_token))
}

/// Routes that need an authenticated principal
pub fn profile_routes() -> Router<AppState> {
    Router::new().route("/profile/", get(profile))
}

/// Login and get a token pair
#[utoipa::path(
    post,
    path = "/api/auth/token/",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenPair),
        (status = 400, description = "Missing fields"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn obtain_token(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<Json<TokenPair>> {
    let tokens = state
        .auth_service
        .login(
            payload.username.unwrap_or_default(),
            payload.password.unwrap_or_default(),
        )
        .await?;

    Ok(Json(tokens))
}

/// Exchange a refresh token for a new access token
#[utoipa::path(
    post,
    path = "/api/auth/token/refresh/",
    tag = "Authentication",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New access token", body = AccessToken),
        (status = 400, description = "Missing fields"),
        (status = 401, description = "Invalid or expired refresh token")
    )
)]
pub async fn refresh_token(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RefreshRequest>,
) -> AppResult<Json<AccessToken>> {
    let token = state
        .auth_service
        .refresh(payload.refresh.as_deref().unwrap_or_default())
        .await?;

    Ok(Json(token))
}

/// Username of the calling principal
#[utoipa::path(
    get,
    path = "/api/auth/profile/",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current principal", body = ProfileResponse),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn profile(Extension(current_user): Extension<CurrentUser>) -> Json<ProfileResponse> {
    Json(ProfileResponse {
        username: current_user.username,
    })
}
