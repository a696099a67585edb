use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::state::{
    quiz::{AnswerColour, Question},
    session::{ChatMessage, PlayerId},
    state_machine::SessionState,
};

/// Payload to join a session.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JoinSessionRequest {
    /// Id of the session to join.
    pub session_id: Uuid,
    /// Requested display name; an empty string asks for a generated one.
    pub name: String,
}

/// Id assigned to a freshly joined player.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JoinSessionResponse {
    /// The new player id.
    pub player_id: PlayerId,
}

/// Player-facing session status.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStatusResponse {
    /// Current state machine state.
    pub state: SessionState,
    /// Total question count of the session's quiz snapshot.
    pub num_questions: usize,
    /// Index of the current question, `-1` before the first one.
    pub at_question: i64,
}

/// Answer projection without the correctness flag (player-facing).
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlayerAnswerDto {
    /// Answer id to submit back.
    pub answer_id: Uuid,
    /// Answer text.
    pub answer: String,
    /// Display colour.
    pub colour: AnswerColour,
}

/// Question projection shown to a player while it is live.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlayerQuestionInfoResponse {
    /// Question id.
    pub question_id: Uuid,
    /// Question text.
    pub question: String,
    /// Answer duration in seconds.
    pub duration: u64,
    /// Points at stake.
    pub points: u32,
    /// Selectable answers, correctness withheld.
    pub answers: Vec<PlayerAnswerDto>,
}

impl From<&Question> for PlayerQuestionInfoResponse {
    fn from(question: &Question) -> Self {
        Self {
            question_id: question.id,
            question: question.text.clone(),
            duration: question.duration_secs,
            points: question.points,
            answers: question
                .answers
                .iter()
                .map(|answer| PlayerAnswerDto {
                    answer_id: answer.id,
                    answer: answer.text.clone(),
                    colour: answer.colour,
                })
                .collect(),
        }
    }
}

/// Payload submitting answers for the open question.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswersRequest {
    /// Selected answer ids; non-empty and duplicate-free.
    pub answer_ids: Vec<Uuid>,
}

/// One chat message as served to players.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageDto {
    /// Message text.
    pub message_body: String,
    /// Id of the posting player.
    pub player_id: PlayerId,
    /// Name of the posting player.
    pub player_name: String,
    /// Unix timestamp the message was sent.
    pub time_sent: i64,
}

impl From<&ChatMessage> for MessageDto {
    fn from(message: &ChatMessage) -> Self {
        Self {
            message_body: message.body.clone(),
            player_id: message.player_id,
            player_name: message.player_name.clone(),
            time_sent: message.time_sent,
        }
    }
}

/// The full ordered chat log of a session.
#[derive(Debug, Serialize, ToSchema)]
pub struct ChatViewResponse {
    /// Messages in the order they were posted.
    pub messages: Vec<MessageDto>,
}

/// Message body wrapper used when posting to the chat.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageBody {
    /// Message text, non-empty and at most 100 characters.
    pub message_body: String,
}

/// Payload posting a chat message.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ChatSendRequest {
    /// The message to post.
    pub message: MessageBody,
}
