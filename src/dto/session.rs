use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dto::quiz::QuizInfoResponse,
    state::{session::QuizSession, state_machine::SessionState},
};

/// Payload to start a new session for a quiz.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionRequest {
    /// Player count that auto-starts the session; zero disables auto-start.
    pub auto_start_num: usize,
}

/// Id of a freshly started session.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionIdResponse {
    /// The new session id.
    pub session_id: Uuid,
}

/// Payload carrying a state machine action.
///
/// The action arrives as a string so an unrecognized value can be rejected
/// as a domain error rather than a deserialization failure.
#[derive(Debug, Deserialize, ToSchema)]
pub struct DriveSessionRequest {
    /// Wire name of the action, e.g. `NEXT_QUESTION`.
    pub action: String,
}

/// Active and inactive session listings for a quiz.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionsViewResponse {
    /// Sessions not yet in the END state.
    pub active_sessions: Vec<Uuid>,
    /// Ended sessions.
    pub inactive_sessions: Vec<Uuid>,
}

/// Quiz metadata attached to a session status response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionMetadata {
    /// Snapshot of the quiz the session runs.
    pub quiz_info: QuizInfoResponse,
}

/// Owner-facing status of a session.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatusResponse {
    /// Current state machine state.
    pub state: SessionState,
    /// Index of the current question, `-1` before the first one.
    pub at_question: i64,
    /// Player names in join order.
    pub players: Vec<String>,
    /// Quiz metadata from the session snapshot.
    pub metadata: SessionMetadata,
}

impl From<&QuizSession> for SessionStatusResponse {
    fn from(session: &QuizSession) -> Self {
        Self {
            state: session.state,
            at_question: at_question_wire(session),
            players: session.player_names(),
            metadata: SessionMetadata {
                quiz_info: (&session.snapshot).into(),
            },
        }
    }
}

/// Wire representation of `at_question`: `-1` until the first question.
pub fn at_question_wire(session: &QuizSession) -> i64 {
    session
        .at_question
        .map(|index| index as i64)
        .unwrap_or(-1)
}

/// Aggregate result for one question of a session.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResult {
    /// Id of the question this result describes.
    pub question_id: Uuid,
    /// Names of players who answered correctly, sorted lexicographically.
    pub players_correct_list: Vec<String>,
    /// Mean answer time across every player of the session, in seconds.
    pub average_answer_time: f64,
    /// Share of players who answered correctly, rounded to an integer.
    pub percent_correct: u32,
}

/// One entry of the final ranking.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RankedPlayer {
    /// Player display name.
    pub name: String,
    /// Accumulated score across every question.
    pub score: f64,
}

/// Final results of a session.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizResultsResponse {
    /// Players sorted descending by accumulated score.
    pub users_ranked_by_score: Vec<RankedPlayer>,
    /// Per-question aggregates for every question of the quiz.
    pub question_results: Vec<QuestionResult>,
}

/// Download link for an exported CSV results file.
#[derive(Debug, Serialize, ToSchema)]
pub struct CsvLinkResponse {
    /// URL the exported file is served from.
    pub url: String,
}
