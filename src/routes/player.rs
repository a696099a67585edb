use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post, put},
};

use crate::{
    dto::{
        Empty,
        player::{
            ChatSendRequest, ChatViewResponse, JoinSessionRequest, JoinSessionResponse,
            PlayerQuestionInfoResponse, PlayerStatusResponse, SubmitAnswersRequest,
        },
        session::{QuestionResult, QuizResultsResponse},
    },
    error::AppError,
    services::player_service,
    state::{SharedState, session::PlayerId},
};

/// Routes consumed by anonymous players.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/v1/player/join", post(join_session))
        .route("/v1/player/{playerid}", get(player_status))
        .route(
            "/v1/player/{playerid}/question/{questionposition}",
            get(question_info),
        )
        .route(
            "/v1/player/{playerid}/question/{questionposition}/answer",
            put(submit_answers),
        )
        .route(
            "/v1/player/{playerid}/question/{questionposition}/results",
            get(question_results),
        )
        .route("/v1/player/{playerid}/results", get(session_results))
        .route("/v1/player/{playerid}/chat", get(chat_view).post(chat_send))
}

/// Join a lobby-state session.
#[utoipa::path(
    post,
    path = "/v1/player/join",
    tag = "player",
    request_body = JoinSessionRequest,
    responses((status = 200, description = "Player admitted", body = JoinSessionResponse))
)]
pub async fn join_session(
    State(state): State<SharedState>,
    Json(payload): Json<JoinSessionRequest>,
) -> Result<Json<JoinSessionResponse>, AppError> {
    let response = player_service::join_session(&state, payload).await?;
    Ok(Json(response))
}

/// Session status as visible to a player.
#[utoipa::path(
    get,
    path = "/v1/player/{playerid}",
    tag = "player",
    params(("playerid" = u64, Path, description = "Player to look up")),
    responses((status = 200, description = "Player status", body = PlayerStatusResponse))
)]
pub async fn player_status(
    State(state): State<SharedState>,
    Path(player_id): Path<PlayerId>,
) -> Result<Json<PlayerStatusResponse>, AppError> {
    let response = player_service::player_status(&state, player_id).await?;
    Ok(Json(response))
}

/// The currently live question.
#[utoipa::path(
    get,
    path = "/v1/player/{playerid}/question/{questionposition}",
    tag = "player",
    params(
        ("playerid" = u64, Path, description = "Player asking"),
        ("questionposition" = usize, Path, description = "One-based question position")
    ),
    responses((status = 200, description = "Question info", body = PlayerQuestionInfoResponse))
)]
pub async fn question_info(
    State(state): State<SharedState>,
    Path((player_id, question_position)): Path<(PlayerId, usize)>,
) -> Result<Json<PlayerQuestionInfoResponse>, AppError> {
    let response = player_service::question_info(&state, player_id, question_position).await?;
    Ok(Json(response))
}

/// Submit answers for the open question.
#[utoipa::path(
    put,
    path = "/v1/player/{playerid}/question/{questionposition}/answer",
    tag = "player",
    params(
        ("playerid" = u64, Path, description = "Player submitting"),
        ("questionposition" = usize, Path, description = "One-based question position")
    ),
    request_body = SubmitAnswersRequest,
    responses((status = 200, description = "Submission recorded", body = Empty))
)]
pub async fn submit_answers(
    State(state): State<SharedState>,
    Path((player_id, question_position)): Path<(PlayerId, usize)>,
    Json(payload): Json<SubmitAnswersRequest>,
) -> Result<Json<Empty>, AppError> {
    player_service::submit_answers(&state, player_id, question_position, payload).await?;
    Ok(Json(Empty::default()))
}

/// Result of one question while its answers are on display.
#[utoipa::path(
    get,
    path = "/v1/player/{playerid}/question/{questionposition}/results",
    tag = "player",
    params(
        ("playerid" = u64, Path, description = "Player asking"),
        ("questionposition" = usize, Path, description = "One-based question position")
    ),
    responses((status = 200, description = "Question result", body = QuestionResult))
)]
pub async fn question_results(
    State(state): State<SharedState>,
    Path((player_id, question_position)): Path<(PlayerId, usize)>,
) -> Result<Json<QuestionResult>, AppError> {
    let response = player_service::question_results(&state, player_id, question_position).await?;
    Ok(Json(response))
}

/// Final results of the player's session.
#[utoipa::path(
    get,
    path = "/v1/player/{playerid}/results",
    tag = "player",
    params(("playerid" = u64, Path, description = "Player asking")),
    responses((status = 200, description = "Final results", body = QuizResultsResponse))
)]
pub async fn session_results(
    State(state): State<SharedState>,
    Path(player_id): Path<PlayerId>,
) -> Result<Json<QuizResultsResponse>, AppError> {
    let response = player_service::session_results(&state, player_id).await?;
    Ok(Json(response))
}

/// The session chat log.
#[utoipa::path(
    get,
    path = "/v1/player/{playerid}/chat",
    tag = "player",
    params(("playerid" = u64, Path, description = "Player asking")),
    responses((status = 200, description = "Chat log", body = ChatViewResponse))
)]
pub async fn chat_view(
    State(state): State<SharedState>,
    Path(player_id): Path<PlayerId>,
) -> Result<Json<ChatViewResponse>, AppError> {
    let response = player_service::chat_view(&state, player_id).await?;
    Ok(Json(response))
}

/// Post a message to the session chat.
#[utoipa::path(
    post,
    path = "/v1/player/{playerid}/chat",
    tag = "player",
    params(("playerid" = u64, Path, description = "Player posting")),
    request_body = ChatSendRequest,
    responses((status = 200, description = "Message posted", body = Empty))
)]
pub async fn chat_send(
    State(state): State<SharedState>,
    Path(player_id): Path<PlayerId>,
    Json(payload): Json<ChatSendRequest>,
) -> Result<Json<Empty>, AppError> {
    player_service::chat_send(&state, player_id, payload).await?;
    Ok(Json(Empty::default()))
}
