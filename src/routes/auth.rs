use axum::{
    Json, Router,
    extract::State,
    routing::{get, post, put},
};

use crate::{
    dto::{
        Empty,
        auth::{
            LoginRequest, PasswordUpdateRequest, RegisterRequest, TokenResponse,
            UserDetailsResponse, UserDetailsUpdateRequest,
        },
    },
    error::AppError,
    routes::SessionToken,
    services::auth_service,
    state::SharedState,
};

/// Routes handling registration, login, and account management.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/v1/admin/auth/register", post(register))
        .route("/v1/admin/auth/login", post(login))
        .route("/v1/admin/auth/logout", post(logout))
        .route("/v1/admin/user/details", get(user_details).put(user_details_update))
        .route("/v1/admin/user/password", put(user_password_update))
}

/// Register a new owner account.
#[utoipa::path(
    post,
    path = "/v1/admin/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses((status = 200, description = "Account created and logged in", body = TokenResponse))
)]
pub async fn register(
    State(state): State<SharedState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let response = auth_service::register(&state, payload).await?;
    Ok(Json(response))
}

/// Log into an existing account.
#[utoipa::path(
    post,
    path = "/v1/admin/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses((status = 200, description = "Logged in", body = TokenResponse))
)]
pub async fn login(
    State(state): State<SharedState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let response = auth_service::login(&state, payload).await?;
    Ok(Json(response))
}

/// Invalidate the presented token.
#[utoipa::path(
    post,
    path = "/v1/admin/auth/logout",
    tag = "auth",
    responses((status = 200, description = "Logged out", body = Empty))
)]
pub async fn logout(
    State(state): State<SharedState>,
    SessionToken(token): SessionToken,
) -> Result<Json<Empty>, AppError> {
    auth_service::logout(&state, token).await?;
    Ok(Json(Empty::default()))
}

/// Details of the calling account.
#[utoipa::path(
    get,
    path = "/v1/admin/user/details",
    tag = "user",
    responses((status = 200, description = "Account details", body = UserDetailsResponse))
)]
pub async fn user_details(
    State(state): State<SharedState>,
    SessionToken(token): SessionToken,
) -> Result<Json<UserDetailsResponse>, AppError> {
    let response = auth_service::user_details(&state, token).await?;
    Ok(Json(response))
}

/// Update name and email of the calling account.
#[utoipa::path(
    put,
    path = "/v1/admin/user/details",
    tag = "user",
    request_body = UserDetailsUpdateRequest,
    responses((status = 200, description = "Details updated", body = Empty))
)]
pub async fn user_details_update(
    State(state): State<SharedState>,
    SessionToken(token): SessionToken,
    Json(payload): Json<UserDetailsUpdateRequest>,
) -> Result<Json<Empty>, AppError> {
    auth_service::user_details_update(&state, token, payload).await?;
    Ok(Json(Empty::default()))
}

/// Change the password of the calling account.
#[utoipa::path(
    put,
    path = "/v1/admin/user/password",
    tag = "user",
    request_body = PasswordUpdateRequest,
    responses((status = 200, description = "Password changed", body = Empty))
)]
pub async fn user_password_update(
    State(state): State<SharedState>,
    SessionToken(token): SessionToken,
    Json(payload): Json<PasswordUpdateRequest>,
) -> Result<Json<Empty>, AppError> {
    auth_service::user_password_update(&state, token, payload).await?;
    Ok(Json(Empty::default()))
}
