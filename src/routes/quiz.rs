use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post, put},
};
use uuid::Uuid;

use crate::{
    dto::{
        Empty,
        quiz::{
            CreateQuizRequest, DuplicateQuestionResponse, MoveQuestionRequest, QuestionIdResponse,
            QuestionRequest, QuizDescriptionUpdateRequest, QuizIdResponse, QuizInfoResponse,
            QuizListResponse, QuizNameUpdateRequest, QuizTransferRequest, TrashEmptyRequest,
        },
    },
    error::AppError,
    routes::SessionToken,
    services::quiz_service,
    state::SharedState,
};

/// Routes handling quiz and question management.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/v1/admin/quiz", post(create_quiz))
        .route("/v1/admin/quiz/list", get(list_quizzes))
        .route("/v1/admin/quiz/trash", get(trash_view))
        .route("/v1/admin/quiz/trash/empty", delete(trash_empty))
        .route(
            "/v1/admin/quiz/{quizid}",
            get(quiz_info).delete(remove_quiz),
        )
        .route("/v1/admin/quiz/{quizid}/name", put(update_name))
        .route(
            "/v1/admin/quiz/{quizid}/description",
            put(update_description),
        )
        .route("/v1/admin/quiz/{quizid}/restore", post(trash_restore))
        .route("/v1/admin/quiz/{quizid}/transfer", post(transfer_owner))
        .route("/v1/admin/quiz/{quizid}/question", post(create_question))
        .route(
            "/v1/admin/quiz/{quizid}/question/{questionid}",
            put(update_question).delete(delete_question),
        )
        .route(
            "/v1/admin/quiz/{quizid}/question/{questionid}/move",
            put(move_question),
        )
        .route(
            "/v1/admin/quiz/{quizid}/question/{questionid}/duplicate",
            post(duplicate_question),
        )
}

/// Create a new quiz.
#[utoipa::path(
    post,
    path = "/v1/admin/quiz",
    tag = "quiz",
    request_body = CreateQuizRequest,
    responses((status = 200, description = "Quiz created", body = QuizIdResponse))
)]
pub async fn create_quiz(
    State(state): State<SharedState>,
    SessionToken(token): SessionToken,
    Json(payload): Json<CreateQuizRequest>,
) -> Result<Json<QuizIdResponse>, AppError> {
    let response = quiz_service::create_quiz(&state, token, payload).await?;
    Ok(Json(response))
}

/// List the caller's quizzes.
#[utoipa::path(
    get,
    path = "/v1/admin/quiz/list",
    tag = "quiz",
    responses((status = 200, description = "Owned quizzes", body = QuizListResponse))
)]
pub async fn list_quizzes(
    State(state): State<SharedState>,
    SessionToken(token): SessionToken,
) -> Result<Json<QuizListResponse>, AppError> {
    let response = quiz_service::list_quizzes(&state, token).await?;
    Ok(Json(response))
}

/// List the caller's trashed quizzes.
#[utoipa::path(
    get,
    path = "/v1/admin/quiz/trash",
    tag = "quiz",
    responses((status = 200, description = "Trashed quizzes", body = QuizListResponse))
)]
pub async fn trash_view(
    State(state): State<SharedState>,
    SessionToken(token): SessionToken,
) -> Result<Json<QuizListResponse>, AppError> {
    let response = quiz_service::trash_view(&state, token).await?;
    Ok(Json(response))
}

/// Permanently delete a batch of trashed quizzes.
#[utoipa::path(
    delete,
    path = "/v1/admin/quiz/trash/empty",
    tag = "quiz",
    request_body = TrashEmptyRequest,
    responses((status = 200, description = "Trash emptied", body = Empty))
)]
pub async fn trash_empty(
    State(state): State<SharedState>,
    SessionToken(token): SessionToken,
    Json(payload): Json<TrashEmptyRequest>,
) -> Result<Json<Empty>, AppError> {
    quiz_service::trash_empty(&state, token, payload.quiz_ids).await?;
    Ok(Json(Empty::default()))
}

/// Full information about one quiz.
#[utoipa::path(
    get,
    path = "/v1/admin/quiz/{quizid}",
    tag = "quiz",
    params(("quizid" = Uuid, Path, description = "Quiz to inspect")),
    responses((status = 200, description = "Quiz information", body = QuizInfoResponse))
)]
pub async fn quiz_info(
    State(state): State<SharedState>,
    SessionToken(token): SessionToken,
    Path(quiz_id): Path<Uuid>,
) -> Result<Json<QuizInfoResponse>, AppError> {
    let response = quiz_service::quiz_info(&state, token, quiz_id).await?;
    Ok(Json(response))
}

/// Move a quiz to the trash.
#[utoipa::path(
    delete,
    path = "/v1/admin/quiz/{quizid}",
    tag = "quiz",
    params(("quizid" = Uuid, Path, description = "Quiz to remove")),
    responses((status = 200, description = "Quiz trashed", body = Empty))
)]
pub async fn remove_quiz(
    State(state): State<SharedState>,
    SessionToken(token): SessionToken,
    Path(quiz_id): Path<Uuid>,
) -> Result<Json<Empty>, AppError> {
    quiz_service::remove_quiz(&state, token, quiz_id).await?;
    Ok(Json(Empty::default()))
}

/// Rename a quiz.
#[utoipa::path(
    put,
    path = "/v1/admin/quiz/{quizid}/name",
    tag = "quiz",
    params(("quizid" = Uuid, Path, description = "Quiz to rename")),
    request_body = QuizNameUpdateRequest,
    responses((status = 200, description = "Quiz renamed", body = Empty))
)]
pub async fn update_name(
    State(state): State<SharedState>,
    SessionToken(token): SessionToken,
    Path(quiz_id): Path<Uuid>,
    Json(payload): Json<QuizNameUpdateRequest>,
) -> Result<Json<Empty>, AppError> {
    quiz_service::update_name(&state, token, quiz_id, payload.name).await?;
    Ok(Json(Empty::default()))
}

/// Update a quiz description.
#[utoipa::path(
    put,
    path = "/v1/admin/quiz/{quizid}/description",
    tag = "quiz",
    params(("quizid" = Uuid, Path, description = "Quiz to update")),
    request_body = QuizDescriptionUpdateRequest,
    responses((status = 200, description = "Description updated", body = Empty))
)]
pub async fn update_description(
    State(state): State<SharedState>,
    SessionToken(token): SessionToken,
    Path(quiz_id): Path<Uuid>,
    Json(payload): Json<QuizDescriptionUpdateRequest>,
) -> Result<Json<Empty>, AppError> {
    quiz_service::update_description(&state, token, quiz_id, payload.description).await?;
    Ok(Json(Empty::default()))
}

/// Restore a quiz from the trash.
#[utoipa::path(
    post,
    path = "/v1/admin/quiz/{quizid}/restore",
    tag = "quiz",
    params(("quizid" = Uuid, Path, description = "Quiz to restore")),
    responses((status = 200, description = "Quiz restored", body = Empty))
)]
pub async fn trash_restore(
    State(state): State<SharedState>,
    SessionToken(token): SessionToken,
    Path(quiz_id): Path<Uuid>,
) -> Result<Json<Empty>, AppError> {
    quiz_service::trash_restore(&state, token, quiz_id).await?;
    Ok(Json(Empty::default()))
}

/// Transfer a quiz to another account.
#[utoipa::path(
    post,
    path = "/v1/admin/quiz/{quizid}/transfer",
    tag = "quiz",
    params(("quizid" = Uuid, Path, description = "Quiz to transfer")),
    request_body = QuizTransferRequest,
    responses((status = 200, description = "Ownership transferred", body = Empty))
)]
pub async fn transfer_owner(
    State(state): State<SharedState>,
    SessionToken(token): SessionToken,
    Path(quiz_id): Path<Uuid>,
    Json(payload): Json<QuizTransferRequest>,
) -> Result<Json<Empty>, AppError> {
    quiz_service::transfer_owner(&state, token, quiz_id, payload.user_email).await?;
    Ok(Json(Empty::default()))
}

/// Add a question to a quiz.
#[utoipa::path(
    post,
    path = "/v1/admin/quiz/{quizid}/question",
    tag = "question",
    params(("quizid" = Uuid, Path, description = "Quiz to extend")),
    request_body = QuestionRequest,
    responses((status = 200, description = "Question created", body = QuestionIdResponse))
)]
pub async fn create_question(
    State(state): State<SharedState>,
    SessionToken(token): SessionToken,
    Path(quiz_id): Path<Uuid>,
    Json(payload): Json<QuestionRequest>,
) -> Result<Json<QuestionIdResponse>, AppError> {
    let response =
        quiz_service::create_question(&state, token, quiz_id, payload.question_body).await?;
    Ok(Json(response))
}

/// Replace a question of a quiz.
#[utoipa::path(
    put,
    path = "/v1/admin/quiz/{quizid}/question/{questionid}",
    tag = "question",
    params(
        ("quizid" = Uuid, Path, description = "Quiz the question belongs to"),
        ("questionid" = Uuid, Path, description = "Question to update")
    ),
    request_body = QuestionRequest,
    responses((status = 200, description = "Question updated", body = Empty))
)]
pub async fn update_question(
    State(state): State<SharedState>,
    SessionToken(token): SessionToken,
    Path((quiz_id, question_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<QuestionRequest>,
) -> Result<Json<Empty>, AppError> {
    quiz_service::update_question(&state, token, quiz_id, question_id, payload.question_body)
        .await?;
    Ok(Json(Empty::default()))
}

/// Delete a question from a quiz.
#[utoipa::path(
    delete,
    path = "/v1/admin/quiz/{quizid}/question/{questionid}",
    tag = "question",
    params(
        ("quizid" = Uuid, Path, description = "Quiz the question belongs to"),
        ("questionid" = Uuid, Path, description = "Question to delete")
    ),
    responses((status = 200, description = "Question deleted", body = Empty))
)]
pub async fn delete_question(
    State(state): State<SharedState>,
    SessionToken(token): SessionToken,
    Path((quiz_id, question_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Empty>, AppError> {
    quiz_service::delete_question(&state, token, quiz_id, question_id).await?;
    Ok(Json(Empty::default()))
}

/// Move a question to a new position.
#[utoipa::path(
    put,
    path = "/v1/admin/quiz/{quizid}/question/{questionid}/move",
    tag = "question",
    params(
        ("quizid" = Uuid, Path, description = "Quiz the question belongs to"),
        ("questionid" = Uuid, Path, description = "Question to move")
    ),
    request_body = MoveQuestionRequest,
    responses((status = 200, description = "Question moved", body = Empty))
)]
pub async fn move_question(
    State(state): State<SharedState>,
    SessionToken(token): SessionToken,
    Path((quiz_id, question_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<MoveQuestionRequest>,
) -> Result<Json<Empty>, AppError> {
    quiz_service::move_question(&state, token, quiz_id, question_id, payload.new_position).await?;
    Ok(Json(Empty::default()))
}

/// Duplicate a question right after its source.
#[utoipa::path(
    post,
    path = "/v1/admin/quiz/{quizid}/question/{questionid}/duplicate",
    tag = "question",
    params(
        ("quizid" = Uuid, Path, description = "Quiz the question belongs to"),
        ("questionid" = Uuid, Path, description = "Question to duplicate")
    ),
    responses((status = 200, description = "Question duplicated", body = DuplicateQuestionResponse))
)]
pub async fn duplicate_question(
    State(state): State<SharedState>,
    SessionToken(token): SessionToken,
    Path((quiz_id, question_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<DuplicateQuestionResponse>, AppError> {
    let response = quiz_service::duplicate_question(&state, token, quiz_id, question_id).await?;
    Ok(Json(response))
}
