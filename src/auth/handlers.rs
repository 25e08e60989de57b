use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{instrument, warn};

use crate::{
    auth::{
        dto::{ApiResponse, AuthPayload, LoginRequest, ProfilePayload, RegisterRequest},
        extractors::AuthUser,
        services::AuthService,
    },
    error::{route_not_found, ApiError},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register).fallback(route_not_found))
        .route("/login", post(login).fallback(route_not_found))
}

pub fn profile_routes() -> Router<AppState> {
    Router::new().route("/profile", get(profile).fallback(route_not_found))
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        warn!(error = %rejection, "unreadable request body");
        ApiError::Validation("Invalid JSON body".into())
    })
}

#[instrument(skip(auth, payload))]
pub async fn register(
    State(auth): State<AuthService>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<AuthPayload>>), ApiError> {
    let out = auth.register(json_body(payload)?).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("User registered successfully", out)),
    ))
}

#[instrument(skip(auth, payload))]
pub async fn login(
    State(auth): State<AuthService>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<AuthPayload>>, ApiError> {
    let out = auth.login(json_body(payload)?).await?;
    Ok(Json(ApiResponse::ok("Login successful", out)))
}

#[instrument(skip(auth, user), fields(user_id = %user.0.id))]
pub async fn profile(
    State(auth): State<AuthService>,
    user: AuthUser,
) -> Json<ApiResponse<ProfilePayload>> {
    let user = auth.get_profile(user.0);
    Json(ApiResponse::ok(
        "Profile retrieved successfully",
        ProfilePayload { user },
    ))
}
