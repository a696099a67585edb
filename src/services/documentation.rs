use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Quizdeck Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::clear,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::auth::logout,
        crate::routes::auth::user_details,
        crate::routes::auth::user_details_update,
        crate::routes::auth::user_password_update,
        crate::routes::quiz::create_quiz,
        crate::routes::quiz::list_quizzes,
        crate::routes::quiz::trash_view,
        crate::routes::quiz::trash_empty,
        crate::routes::quiz::quiz_info,
        crate::routes::quiz::remove_quiz,
        crate::routes::quiz::update_name,
        crate::routes::quiz::update_description,
        crate::routes::quiz::trash_restore,
        crate::routes::quiz::transfer_owner,
        crate::routes::quiz::create_question,
        crate::routes::quiz::update_question,
        crate::routes::quiz::delete_question,
        crate::routes::quiz::move_question,
        crate::routes::quiz::duplicate_question,
        crate::routes::session::sessions_view,
        crate::routes::session::start_session,
        crate::routes::session::drive_session,
        crate::routes::session::session_status,
        crate::routes::session::session_results,
        crate::routes::session::session_results_csv,
        crate::routes::player::join_session,
        crate::routes::player::player_status,
        crate::routes::player::question_info,
        crate::routes::player::submit_answers,
        crate::routes::player::question_results,
        crate::routes::player::session_results,
        crate::routes::player::chat_view,
        crate::routes::player::chat_send,
    ),
    components(
        schemas(
            crate::dto::Empty,
            crate::routes::health::HealthResponse,
            crate::state::state_machine::SessionState,
            crate::state::state_machine::HostAction,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Registration and login"),
        (name = "user", description = "Account management"),
        (name = "quiz", description = "Quiz management"),
        (name = "question", description = "Question management"),
        (name = "session", description = "Live session control and results"),
        (name = "player", description = "Anonymous player operations"),
        (name = "other", description = "Maintenance operations"),
    )
)]
pub struct ApiDoc;
