use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::state::quiz::{Answer, AnswerColour, Question, Quiz, QuizSnapshot};

/// Payload to create a quiz.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateQuizRequest {
    /// Quiz name, 3 to 30 alphanumeric/space characters, unique per owner.
    pub name: String,
    /// Description, at most 100 characters.
    pub description: String,
}

/// Id of a freshly created quiz.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizIdResponse {
    /// The new quiz id.
    pub quiz_id: Uuid,
}

/// One entry of the owner's quiz list.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizListEntry {
    /// Quiz id.
    pub quiz_id: Uuid,
    /// Quiz name.
    pub name: String,
}

/// The owner's quiz (or trash) listing.
#[derive(Debug, Serialize, ToSchema)]
pub struct QuizListResponse {
    /// Quizzes owned by the caller.
    pub quizzes: Vec<QuizListEntry>,
}

/// Answer projection including the correctness flag (owner-facing).
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnswerDto {
    /// Answer id.
    pub answer_id: Uuid,
    /// Answer text.
    pub answer: String,
    /// Display colour.
    pub colour: AnswerColour,
    /// Whether the answer is part of the correct set.
    pub correct: bool,
}

impl From<&Answer> for AnswerDto {
    fn from(answer: &Answer) -> Self {
        Self {
            answer_id: answer.id,
            answer: answer.text.clone(),
            colour: answer.colour,
            correct: answer.correct,
        }
    }
}

/// Question projection (owner-facing).
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDto {
    /// Question id.
    pub question_id: Uuid,
    /// Question text.
    pub question: String,
    /// Answer duration in seconds.
    pub duration: u64,
    /// Points at stake.
    pub points: u32,
    /// Selectable answers.
    pub answers: Vec<AnswerDto>,
}

impl From<&Question> for QuestionDto {
    fn from(question: &Question) -> Self {
        Self {
            question_id: question.id,
            question: question.text.clone(),
            duration: question.duration_secs,
            points: question.points,
            answers: question.answers.iter().map(Into::into).collect(),
        }
    }
}

/// Full quiz information.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizInfoResponse {
    /// Quiz id.
    pub quiz_id: Uuid,
    /// Quiz name.
    pub name: String,
    /// Unix timestamp of creation.
    pub time_created: i64,
    /// Unix timestamp of the last edit.
    pub time_last_edited: i64,
    /// Description.
    pub description: String,
    /// Number of questions.
    pub num_questions: usize,
    /// The questions themselves.
    pub questions: Vec<QuestionDto>,
    /// Sum of all question durations in seconds.
    pub duration: u64,
}

impl From<&Quiz> for QuizInfoResponse {
    fn from(quiz: &Quiz) -> Self {
        Self {
            quiz_id: quiz.id,
            name: quiz.name.clone(),
            time_created: quiz.time_created,
            time_last_edited: quiz.time_last_edited,
            description: quiz.description.clone(),
            num_questions: quiz.questions.len(),
            questions: quiz.questions.iter().map(Into::into).collect(),
            duration: quiz.total_duration_secs(),
        }
    }
}

impl From<&QuizSnapshot> for QuizInfoResponse {
    fn from(snapshot: &QuizSnapshot) -> Self {
        Self {
            quiz_id: snapshot.quiz_id,
            name: snapshot.name.clone(),
            time_created: snapshot.time_created,
            time_last_edited: snapshot.time_last_edited,
            description: snapshot.description.clone(),
            num_questions: snapshot.questions.len(),
            questions: snapshot.questions.iter().map(Into::into).collect(),
            duration: snapshot.total_duration_secs(),
        }
    }
}

/// Payload to rename a quiz.
#[derive(Debug, Deserialize, ToSchema)]
pub struct QuizNameUpdateRequest {
    /// Replacement name.
    pub name: String,
}

/// Payload to update a quiz description.
#[derive(Debug, Deserialize, ToSchema)]
pub struct QuizDescriptionUpdateRequest {
    /// Replacement description.
    pub description: String,
}

/// Payload to transfer quiz ownership.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizTransferRequest {
    /// Email of the account receiving the quiz.
    pub user_email: String,
}

/// Payload to empty selected quizzes from the trash.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrashEmptyRequest {
    /// Ids of the trashed quizzes to delete permanently.
    pub quiz_ids: Vec<Uuid>,
}

/// Inbound answer definition for question create/update.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AnswerInput {
    /// Answer text, 1 to 30 characters, unique within the question.
    pub answer: String,
    /// Whether the answer is correct.
    pub correct: bool,
}

/// Inbound question definition for create and update.
#[derive(Debug, Deserialize, ToSchema)]
pub struct QuestionBody {
    /// Question text, 5 to 50 characters.
    pub question: String,
    /// Answer duration in seconds, strictly positive.
    pub duration: u64,
    /// Points at stake, 1 to 10.
    pub points: u32,
    /// Between two and six answers, at least one of them correct.
    pub answers: Vec<AnswerInput>,
}

/// Wrapper object question create/update requests arrive in.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRequest {
    /// The question definition.
    pub question_body: QuestionBody,
}

/// Id of a freshly created question.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionIdResponse {
    /// The new question id.
    pub question_id: Uuid,
}

/// Id of a duplicated question.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateQuestionResponse {
    /// Id of the copy inserted after the source question.
    pub new_question_id: Uuid,
}

/// Payload to move a question to a new position.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MoveQuestionRequest {
    /// Zero-based target position.
    pub new_position: usize,
}
