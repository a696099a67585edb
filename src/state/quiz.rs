use std::collections::HashSet;

use rand::Rng;
use serde::Serialize;
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;

/// Display colour assigned to an answer when the question is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AnswerColour {
    /// Red.
    Red,
    /// Blue.
    Blue,
    /// Green.
    Green,
    /// Yellow.
    Yellow,
    /// Purple.
    Purple,
    /// Brown.
    Brown,
    /// Orange.
    Orange,
}

impl AnswerColour {
    const ALL: [AnswerColour; 7] = [
        AnswerColour::Red,
        AnswerColour::Blue,
        AnswerColour::Green,
        AnswerColour::Yellow,
        AnswerColour::Purple,
        AnswerColour::Brown,
        AnswerColour::Orange,
    ];

    /// Pick a colour at random.
    pub fn random() -> Self {
        let mut rng = rand::rng();
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }
}

/// One selectable answer of a question.
#[derive(Debug, Clone)]
pub struct Answer {
    /// Stable identifier players submit back.
    pub id: Uuid,
    /// Answer text shown to players.
    pub text: String,
    /// Display colour.
    pub colour: AnswerColour,
    /// Whether this answer is part of the correct set.
    pub correct: bool,
}

/// A single question of a quiz.
#[derive(Debug, Clone)]
pub struct Question {
    /// Stable identifier for the question.
    pub id: Uuid,
    /// Question text.
    pub text: String,
    /// Time players have to answer once the question opens, in seconds.
    pub duration_secs: u64,
    /// Points at stake; scaled by rank when awarded.
    pub points: u32,
    /// Selectable answers, between two and six of them.
    pub answers: Vec<Answer>,
}

impl Question {
    /// Ids of every answer attached to this question.
    pub fn answer_ids(&self) -> HashSet<Uuid> {
        self.answers.iter().map(|answer| answer.id).collect()
    }

    /// Ids of the answers marked correct.
    pub fn correct_answer_ids(&self) -> HashSet<Uuid> {
        self.answers
            .iter()
            .filter(|answer| answer.correct)
            .map(|answer| answer.id)
            .collect()
    }
}

/// A quiz definition owned by a registered user.
#[derive(Debug, Clone)]
pub struct Quiz {
    /// Stable identifier for the quiz.
    pub id: Uuid,
    /// Account that currently owns the quiz.
    pub owner_id: Uuid,
    /// Quiz name, unique per owner.
    pub name: String,
    /// Free-form description, possibly empty.
    pub description: String,
    /// Unix timestamp of creation.
    pub time_created: i64,
    /// Unix timestamp of the last edit.
    pub time_last_edited: i64,
    /// Ordered question list.
    pub questions: Vec<Question>,
}

impl Quiz {
    /// Build a fresh quiz with no questions.
    pub fn new(owner_id: Uuid, name: String, description: String) -> Self {
        let now = unix_now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            name,
            description,
            time_created: now,
            time_last_edited: now,
            questions: Vec::new(),
        }
    }

    /// Sum of all question durations in seconds.
    pub fn total_duration_secs(&self) -> u64 {
        self.questions.iter().map(|q| q.duration_secs).sum()
    }

    /// Look up a question by id.
    pub fn question(&self, question_id: Uuid) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == question_id)
    }

    /// Index of a question within the quiz, if present.
    pub fn question_index(&self, question_id: Uuid) -> Option<usize> {
        self.questions.iter().position(|q| q.id == question_id)
    }

    /// Stamp the quiz as edited now.
    pub fn touch(&mut self) {
        self.time_last_edited = unix_now();
    }
}

/// Immutable copy of a quiz taken when a session starts.
///
/// Edits to the live quiz definition never affect a session already
/// running; all session-side reads go through this snapshot.
#[derive(Debug, Clone)]
pub struct QuizSnapshot {
    /// Id of the quiz this snapshot was taken from.
    pub quiz_id: Uuid,
    /// Quiz name at snapshot time.
    pub name: String,
    /// Quiz description at snapshot time.
    pub description: String,
    /// Creation timestamp carried over from the quiz.
    pub time_created: i64,
    /// Last-edit timestamp at snapshot time.
    pub time_last_edited: i64,
    /// Frozen question list.
    pub questions: Vec<Question>,
}

impl QuizSnapshot {
    /// Freeze the current state of a quiz.
    pub fn of(quiz: &Quiz) -> Self {
        Self {
            quiz_id: quiz.id,
            name: quiz.name.clone(),
            description: quiz.description.clone(),
            time_created: quiz.time_created,
            time_last_edited: quiz.time_last_edited,
            questions: quiz.questions.clone(),
        }
    }

    /// Sum of all question durations in seconds.
    pub fn total_duration_secs(&self) -> u64 {
        self.questions.iter().map(|q| q.duration_secs).sum()
    }
}

/// Current wall-clock time as a unix timestamp in seconds.
pub fn unix_now() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}
