use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post, put},
};
use uuid::Uuid;

use crate::{
    dto::{
        Empty,
        session::{
            CsvLinkResponse, DriveSessionRequest, QuizResultsResponse, SessionIdResponse,
            SessionStatusResponse, SessionsViewResponse, StartSessionRequest,
        },
    },
    error::AppError,
    routes::SessionToken,
    services::session_service,
    state::SharedState,
};

/// Routes handling session lifecycle and results for quiz owners.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/v1/admin/quiz/{quizid}/sessions", get(sessions_view))
        .route("/v1/admin/quiz/{quizid}/session/start", post(start_session))
        .route(
            "/v1/admin/quiz/{quizid}/session/{sessionid}",
            put(drive_session).get(session_status),
        )
        .route(
            "/v1/admin/quiz/{quizid}/session/{sessionid}/results",
            get(session_results),
        )
        .route(
            "/v1/admin/quiz/{quizid}/session/{sessionid}/results/csv",
            get(session_results_csv),
        )
}

/// Active and ended sessions of a quiz.
#[utoipa::path(
    get,
    path = "/v1/admin/quiz/{quizid}/sessions",
    tag = "session",
    params(("quizid" = Uuid, Path, description = "Quiz to inspect")),
    responses((status = 200, description = "Session listings", body = SessionsViewResponse))
)]
pub async fn sessions_view(
    State(state): State<SharedState>,
    SessionToken(token): SessionToken,
    Path(quiz_id): Path<Uuid>,
) -> Result<Json<SessionsViewResponse>, AppError> {
    let response = session_service::sessions_view(&state, token, quiz_id).await?;
    Ok(Json(response))
}

/// Start a new session for a quiz.
#[utoipa::path(
    post,
    path = "/v1/admin/quiz/{quizid}/session/start",
    tag = "session",
    params(("quizid" = Uuid, Path, description = "Quiz to run")),
    request_body = StartSessionRequest,
    responses((status = 200, description = "Session started", body = SessionIdResponse))
)]
pub async fn start_session(
    State(state): State<SharedState>,
    SessionToken(token): SessionToken,
    Path(quiz_id): Path<Uuid>,
    Json(payload): Json<StartSessionRequest>,
) -> Result<Json<SessionIdResponse>, AppError> {
    let response = session_service::start_session(&state, token, quiz_id, payload).await?;
    Ok(Json(response))
}

/// Apply a state machine action to a session.
#[utoipa::path(
    put,
    path = "/v1/admin/quiz/{quizid}/session/{sessionid}",
    tag = "session",
    params(
        ("quizid" = Uuid, Path, description = "Quiz the session runs"),
        ("sessionid" = Uuid, Path, description = "Session to drive")
    ),
    request_body = DriveSessionRequest,
    responses((status = 200, description = "Action applied", body = Empty))
)]
pub async fn drive_session(
    State(state): State<SharedState>,
    SessionToken(token): SessionToken,
    Path((quiz_id, session_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<DriveSessionRequest>,
) -> Result<Json<Empty>, AppError> {
    session_service::drive_session(&state, token, quiz_id, session_id, &payload.action).await?;
    Ok(Json(Empty::default()))
}

/// Owner-facing status of a session.
#[utoipa::path(
    get,
    path = "/v1/admin/quiz/{quizid}/session/{sessionid}",
    tag = "session",
    params(
        ("quizid" = Uuid, Path, description = "Quiz the session runs"),
        ("sessionid" = Uuid, Path, description = "Session to inspect")
    ),
    responses((status = 200, description = "Session status", body = SessionStatusResponse))
)]
pub async fn session_status(
    State(state): State<SharedState>,
    SessionToken(token): SessionToken,
    Path((quiz_id, session_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<SessionStatusResponse>, AppError> {
    let response = session_service::session_status(&state, token, quiz_id, session_id).await?;
    Ok(Json(response))
}

/// Final results of a session.
#[utoipa::path(
    get,
    path = "/v1/admin/quiz/{quizid}/session/{sessionid}/results",
    tag = "session",
    params(
        ("quizid" = Uuid, Path, description = "Quiz the session runs"),
        ("sessionid" = Uuid, Path, description = "Session to read results from")
    ),
    responses((status = 200, description = "Final results", body = QuizResultsResponse))
)]
pub async fn session_results(
    State(state): State<SharedState>,
    SessionToken(token): SessionToken,
    Path((quiz_id, session_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<QuizResultsResponse>, AppError> {
    let response = session_service::session_results(&state, token, quiz_id, session_id).await?;
    Ok(Json(response))
}

/// Export the final results as CSV.
#[utoipa::path(
    get,
    path = "/v1/admin/quiz/{quizid}/session/{sessionid}/results/csv",
    tag = "session",
    params(
        ("quizid" = Uuid, Path, description = "Quiz the session runs"),
        ("sessionid" = Uuid, Path, description = "Session to export")
    ),
    responses((status = 200, description = "Download link", body = CsvLinkResponse))
)]
pub async fn session_results_csv(
    State(state): State<SharedState>,
    SessionToken(token): SessionToken,
    Path((quiz_id, session_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<CsvLinkResponse>, AppError> {
    let response = session_service::session_results_csv(&state, token, quiz_id, session_id).await?;
    Ok(Json(response))
}
