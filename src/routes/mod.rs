use axum::{
    Json, Router,
    extract::{FromRequestParts, State},
    http::request::Parts,
    routing::delete,
};
use tower_http::services::ServeDir;
use uuid::Uuid;

use crate::{dto::Empty, error::AppError, state::SharedState};

/// Auth and user-account routes.
pub mod auth;
/// Swagger UI and the OpenAPI document.
pub mod docs;
/// Health check route.
pub mod health;
/// Player-facing routes.
pub mod player;
/// Quiz and question management routes.
pub mod quiz;
/// Session lifecycle and results routes.
pub mod session;

/// Login token presented in the `token` request header.
///
/// The extractor only parses the header; whether the token is actually
/// active is checked in the service layer.
pub struct SessionToken(pub Uuid);

impl<S> FromRequestParts<S> for SessionToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get("token")
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("token header is missing".into()))?;

        let token = Uuid::parse_str(value)
            .map_err(|_| AppError::Unauthorized("token is empty or invalid".into()))?;
        Ok(SessionToken(token))
    }
}

/// Wipe all application state; used between test runs of API consumers.
#[utoipa::path(
    delete,
    path = "/v1/clear",
    tag = "other",
    responses((status = 200, description = "State cleared", body = Empty))
)]
pub async fn clear(State(state): State<SharedState>) -> Json<Empty> {
    state.reset().await;
    Json(Empty::default())
}

/// Compose all route trees, wiring in shared state, the CSV download
/// directory, and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(auth::router())
        .merge(quiz::router())
        .merge(session::router())
        .merge(player::router())
        .route("/v1/clear", delete(clear))
        .nest_service("/csv", ServeDir::new(state.config().public_dir.clone()));

    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}
