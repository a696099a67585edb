use std::collections::HashSet;

use uuid::Uuid;

use crate::{
    dto::quiz::{
        AnswerInput, CreateQuizRequest, DuplicateQuestionResponse, QuestionBody,
        QuestionIdResponse, QuizIdResponse, QuizInfoResponse, QuizListEntry, QuizListResponse,
    },
    error::ServiceError,
    services::auth_service,
    state::{
        SharedState,
        quiz::{Answer, AnswerColour, Question, Quiz},
        user::User,
    },
};

const QUIZ_NAME_MIN: usize = 3;
const QUIZ_NAME_MAX: usize = 30;
const QUIZ_DESCRIPTION_MAX: usize = 100;
const QUESTION_TEXT_MIN: usize = 5;
const QUESTION_TEXT_MAX: usize = 50;
const ANSWER_COUNT_MIN: usize = 2;
const ANSWER_COUNT_MAX: usize = 6;
const ANSWER_TEXT_MIN: usize = 1;
const ANSWER_TEXT_MAX: usize = 30;
const POINTS_MIN: u32 = 1;
const POINTS_MAX: u32 = 10;
/// Sum of question durations a quiz may not exceed, in seconds.
const QUIZ_DURATION_MAX_SECS: u64 = 180;

/// Create a new quiz for the authenticated owner.
pub async fn create_quiz(
    state: &SharedState,
    token: Uuid,
    request: CreateQuizRequest,
) -> Result<QuizIdResponse, ServiceError> {
    let user = auth_service::authenticate(state, token)?;

    validate_quiz_name(&request.name)?;
    if name_taken_by_owner(state, user.id, &request.name, None) {
        return Err(ServiceError::InvalidInput(
            "a quiz with this name already exists for this owner".into(),
        ));
    }
    if request.description.len() > QUIZ_DESCRIPTION_MAX {
        return Err(ServiceError::InvalidInput(
            "description must be at most 100 characters".into(),
        ));
    }

    let quiz = Quiz::new(user.id, request.name, request.description);
    let quiz_id = quiz.id;
    state.quizzes().insert(quiz_id, quiz);

    Ok(QuizIdResponse { quiz_id })
}

/// List the quizzes owned by the authenticated caller.
pub async fn list_quizzes(
    state: &SharedState,
    token: Uuid,
) -> Result<QuizListResponse, ServiceError> {
    let user = auth_service::authenticate(state, token)?;

    let quizzes = state
        .quizzes()
        .iter()
        .filter(|entry| entry.value().owner_id == user.id)
        .map(|entry| QuizListEntry {
            quiz_id: entry.value().id,
            name: entry.value().name.clone(),
        })
        .collect();

    Ok(QuizListResponse { quizzes })
}

/// Full information about one owned quiz.
pub async fn quiz_info(
    state: &SharedState,
    token: Uuid,
    quiz_id: Uuid,
) -> Result<QuizInfoResponse, ServiceError> {
    let user = auth_service::authenticate(state, token)?;
    let quiz = owned_quiz(state, &user, quiz_id)?;
    Ok((&quiz).into())
}

/// Move an owned quiz to the trash.
pub async fn remove_quiz(
    state: &SharedState,
    token: Uuid,
    quiz_id: Uuid,
) -> Result<(), ServiceError> {
    let user = auth_service::authenticate(state, token)?;
    owned_quiz(state, &user, quiz_id)?;

    if let Some((id, quiz)) = state.quizzes().remove(&quiz_id) {
        state.trash().insert(id, quiz);
    }
    Ok(())
}

/// Rename an owned quiz.
pub async fn update_name(
    state: &SharedState,
    token: Uuid,
    quiz_id: Uuid,
    name: String,
) -> Result<(), ServiceError> {
    let user = auth_service::authenticate(state, token)?;
    owned_quiz(state, &user, quiz_id)?;

    validate_quiz_name(&name)?;
    if name_taken_by_owner(state, user.id, &name, Some(quiz_id)) {
        return Err(ServiceError::InvalidInput(
            "a quiz with this name already exists for this owner".into(),
        ));
    }

    let mut quiz = quiz_mut(state, quiz_id)?;
    quiz.name = name;
    quiz.touch();
    Ok(())
}

/// Update the description of an owned quiz.
pub async fn update_description(
    state: &SharedState,
    token: Uuid,
    quiz_id: Uuid,
    description: String,
) -> Result<(), ServiceError> {
    let user = auth_service::authenticate(state, token)?;
    owned_quiz(state, &user, quiz_id)?;

    if description.len() > QUIZ_DESCRIPTION_MAX {
        return Err(ServiceError::InvalidInput(
            "description must be at most 100 characters".into(),
        ));
    }

    let mut quiz = quiz_mut(state, quiz_id)?;
    quiz.description = description;
    quiz.touch();
    Ok(())
}

/// List the caller's trashed quizzes.
pub async fn trash_view(state: &SharedState, token: Uuid) -> Result<QuizListResponse, ServiceError> {
    let user = auth_service::authenticate(state, token)?;

    let quizzes = state
        .trash()
        .iter()
        .filter(|entry| entry.value().owner_id == user.id)
        .map(|entry| QuizListEntry {
            quiz_id: entry.value().id,
            name: entry.value().name.clone(),
        })
        .collect();

    Ok(QuizListResponse { quizzes })
}

/// Restore a quiz from the trash.
pub async fn trash_restore(
    state: &SharedState,
    token: Uuid,
    quiz_id: Uuid,
) -> Result<(), ServiceError> {
    let user = auth_service::authenticate(state, token)?;

    let trashed = state.trash().get(&quiz_id).map(|entry| {
        (
            entry.value().owner_id,
            entry.value().name.clone(),
        )
    });
    let is_active = state.quizzes().contains_key(&quiz_id);

    let Some((owner_id, name)) = trashed else {
        if is_active {
            return Err(ServiceError::InvalidInput("quiz is not in the trash".into()));
        }
        return Err(ServiceError::Forbidden("quiz id is invalid".into()));
    };
    if owner_id != user.id {
        return Err(ServiceError::Forbidden(
            "caller does not own this quiz".into(),
        ));
    }

    let name_collides = state
        .quizzes()
        .iter()
        .any(|entry| entry.value().name == name && entry.value().id != quiz_id);
    if name_collides {
        return Err(ServiceError::InvalidInput(
            "an active quiz already uses this name".into(),
        ));
    }

    if let Some((id, quiz)) = state.trash().remove(&quiz_id) {
        state.quizzes().insert(id, quiz);
    }
    Ok(())
}

/// Permanently delete a batch of trashed quizzes.
pub async fn trash_empty(
    state: &SharedState,
    token: Uuid,
    quiz_ids: Vec<Uuid>,
) -> Result<(), ServiceError> {
    let user = auth_service::authenticate(state, token)?;

    for quiz_id in &quiz_ids {
        let trashed_owner = state.trash().get(quiz_id).map(|entry| entry.value().owner_id);
        let is_active = state.quizzes().contains_key(quiz_id);

        match trashed_owner {
            None if !is_active => {
                return Err(ServiceError::Forbidden("quiz id is invalid".into()));
            }
            Some(owner_id) if owner_id != user.id => {
                return Err(ServiceError::Forbidden(
                    "caller does not own this quiz".into(),
                ));
            }
            _ => {}
        }
    }
    for quiz_id in &quiz_ids {
        if !state.trash().contains_key(quiz_id) {
            return Err(ServiceError::InvalidInput("quiz is not in the trash".into()));
        }
    }

    for quiz_id in &quiz_ids {
        state.trash().remove(quiz_id);
    }
    Ok(())
}

/// Transfer an owned quiz to another account identified by email.
pub async fn transfer_owner(
    state: &SharedState,
    token: Uuid,
    quiz_id: Uuid,
    user_email: String,
) -> Result<(), ServiceError> {
    let user = auth_service::authenticate(state, token)?;
    let quiz = owned_quiz(state, &user, quiz_id)?;

    let target = state
        .users()
        .iter()
        .find(|entry| entry.value().email == user_email)
        .map(|entry| entry.value().clone())
        .ok_or_else(|| {
            ServiceError::InvalidInput("target email does not belong to a registered user".into())
        })?;

    if target.id == user.id {
        return Err(ServiceError::InvalidInput(
            "target email belongs to the calling user".into(),
        ));
    }

    let target_has_same_name = state
        .quizzes()
        .iter()
        .any(|entry| entry.value().owner_id == target.id && entry.value().name == quiz.name);
    if target_has_same_name {
        return Err(ServiceError::InvalidInput(
            "target user already owns a quiz with this name".into(),
        ));
    }

    // From here on the previous owner can no longer drive sessions of this
    // quiz; ownership is revalidated on every host call.
    let mut quiz = quiz_mut(state, quiz_id)?;
    quiz.owner_id = target.id;
    quiz.touch();
    Ok(())
}

/// Add a question to an owned quiz.
pub async fn create_question(
    state: &SharedState,
    token: Uuid,
    quiz_id: Uuid,
    body: QuestionBody,
) -> Result<QuestionIdResponse, ServiceError> {
    let user = auth_service::authenticate(state, token)?;
    let quiz = owned_quiz(state, &user, quiz_id)?;

    validate_question_body(&body, quiz.total_duration_secs())?;

    let question = build_question(body);
    let question_id = question.id;

    let mut quiz = quiz_mut(state, quiz_id)?;
    quiz.questions.push(question);
    quiz.touch();

    Ok(QuestionIdResponse { question_id })
}

/// Replace a question of an owned quiz.
pub async fn update_question(
    state: &SharedState,
    token: Uuid,
    quiz_id: Uuid,
    question_id: Uuid,
    body: QuestionBody,
) -> Result<(), ServiceError> {
    let user = auth_service::authenticate(state, token)?;
    let quiz = owned_quiz(state, &user, quiz_id)?;

    let index = quiz
        .question_index(question_id)
        .ok_or_else(|| ServiceError::InvalidInput("question id is not part of this quiz".into()))?;

    // Duration budget without the question being replaced.
    let other_duration = quiz.total_duration_secs() - quiz.questions[index].duration_secs;
    validate_question_body(&body, other_duration)?;

    let mut question = build_question(body);
    question.id = question_id;

    let mut quiz = quiz_mut(state, quiz_id)?;
    quiz.questions[index] = question;
    quiz.touch();
    Ok(())
}

/// Delete a question from an owned quiz.
pub async fn delete_question(
    state: &SharedState,
    token: Uuid,
    quiz_id: Uuid,
    question_id: Uuid,
) -> Result<(), ServiceError> {
    let user = auth_service::authenticate(state, token)?;
    let quiz = owned_quiz(state, &user, quiz_id)?;

    let index = quiz
        .question_index(question_id)
        .ok_or_else(|| ServiceError::InvalidInput("question id is not part of this quiz".into()))?;

    let mut quiz = quiz_mut(state, quiz_id)?;
    quiz.questions.remove(index);
    quiz.touch();
    Ok(())
}

/// Move a question of an owned quiz to a new position.
pub async fn move_question(
    state: &SharedState,
    token: Uuid,
    quiz_id: Uuid,
    question_id: Uuid,
    new_position: usize,
) -> Result<(), ServiceError> {
    let user = auth_service::authenticate(state, token)?;
    let quiz = owned_quiz(state, &user, quiz_id)?;

    let index = quiz
        .question_index(question_id)
        .ok_or_else(|| ServiceError::InvalidInput("question id is not part of this quiz".into()))?;

    if new_position >= quiz.questions.len() {
        return Err(ServiceError::InvalidInput(
            "new position is outside the question list".into(),
        ));
    }
    if new_position == index {
        return Err(ServiceError::InvalidInput(
            "new position is the question's current position".into(),
        ));
    }

    let mut quiz = quiz_mut(state, quiz_id)?;
    let question = quiz.questions.remove(index);
    quiz.questions.insert(new_position, question);
    quiz.touch();
    Ok(())
}

/// Duplicate a question, inserting the copy right after the source.
pub async fn duplicate_question(
    state: &SharedState,
    token: Uuid,
    quiz_id: Uuid,
    question_id: Uuid,
) -> Result<DuplicateQuestionResponse, ServiceError> {
    let user = auth_service::authenticate(state, token)?;
    let quiz = owned_quiz(state, &user, quiz_id)?;

    let index = quiz
        .question_index(question_id)
        .ok_or_else(|| ServiceError::InvalidInput("question id is not part of this quiz".into()))?;

    let source_duration = quiz.questions[index].duration_secs;
    if quiz.total_duration_secs() + source_duration > QUIZ_DURATION_MAX_SECS {
        return Err(ServiceError::InvalidInput(
            "total question duration would exceed 3 minutes".into(),
        ));
    }

    let mut copy = quiz.questions[index].clone();
    copy.id = Uuid::new_v4();
    let new_question_id = copy.id;

    let mut quiz = quiz_mut(state, quiz_id)?;
    quiz.questions.insert(index + 1, copy);
    quiz.touch();

    Ok(DuplicateQuestionResponse { new_question_id })
}

/// Look up a quiz and check the caller owns it.
///
/// An unknown quiz id and a quiz owned by someone else are deliberately
/// indistinguishable to the caller.
pub fn owned_quiz(state: &SharedState, user: &User, quiz_id: Uuid) -> Result<Quiz, ServiceError> {
    state
        .quizzes()
        .get(&quiz_id)
        .filter(|entry| entry.value().owner_id == user.id)
        .map(|entry| entry.value().clone())
        .ok_or_else(|| {
            ServiceError::Forbidden("quiz id is invalid or the caller does not own the quiz".into())
        })
}

fn quiz_mut(
    state: &SharedState,
    quiz_id: Uuid,
) -> Result<dashmap::mapref::one::RefMut<'_, Uuid, Quiz>, ServiceError> {
    state
        .quizzes()
        .get_mut(&quiz_id)
        .ok_or_else(|| ServiceError::Forbidden("quiz id is invalid".into()))
}

fn name_taken_by_owner(
    state: &SharedState,
    owner_id: Uuid,
    name: &str,
    except: Option<Uuid>,
) -> bool {
    state.quizzes().iter().any(|entry| {
        entry.value().owner_id == owner_id
            && entry.value().name == name
            && Some(entry.value().id) != except
    })
}

fn validate_quiz_name(name: &str) -> Result<(), ServiceError> {
    if name.len() < QUIZ_NAME_MIN || name.len() > QUIZ_NAME_MAX {
        return Err(ServiceError::InvalidInput(
            "quiz name must be between 3 and 30 characters".into(),
        ));
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == ' ') {
        return Err(ServiceError::InvalidInput(
            "quiz name may only contain alphanumeric characters and spaces".into(),
        ));
    }
    Ok(())
}

fn validate_question_body(body: &QuestionBody, other_duration: u64) -> Result<(), ServiceError> {
    if body.question.len() < QUESTION_TEXT_MIN || body.question.len() > QUESTION_TEXT_MAX {
        return Err(ServiceError::InvalidInput(
            "question text must be between 5 and 50 characters".into(),
        ));
    }
    if body.answers.len() < ANSWER_COUNT_MIN || body.answers.len() > ANSWER_COUNT_MAX {
        return Err(ServiceError::InvalidInput(
            "a question must have between 2 and 6 answers".into(),
        ));
    }
    if body.duration == 0 {
        return Err(ServiceError::InvalidInput(
            "question duration must be strictly positive".into(),
        ));
    }
    if other_duration + body.duration > QUIZ_DURATION_MAX_SECS {
        return Err(ServiceError::InvalidInput(
            "total question duration would exceed 3 minutes".into(),
        ));
    }
    if body.points < POINTS_MIN || body.points > POINTS_MAX {
        return Err(ServiceError::InvalidInput(
            "question points must be between 1 and 10".into(),
        ));
    }
    if body
        .answers
        .iter()
        .any(|a| a.answer.len() < ANSWER_TEXT_MIN || a.answer.len() > ANSWER_TEXT_MAX)
    {
        return Err(ServiceError::InvalidInput(
            "answers must be between 1 and 30 characters".into(),
        ));
    }
    let unique: HashSet<&str> = body.answers.iter().map(|a| a.answer.as_str()).collect();
    if unique.len() != body.answers.len() {
        return Err(ServiceError::InvalidInput(
            "answer strings must be unique within a question".into(),
        ));
    }
    if !body.answers.iter().any(|a| a.correct) {
        return Err(ServiceError::InvalidInput(
            "at least one answer must be correct".into(),
        ));
    }
    Ok(())
}

fn build_question(body: QuestionBody) -> Question {
    let answers = body
        .answers
        .into_iter()
        .map(|input: AnswerInput| Answer {
            id: Uuid::new_v4(),
            text: input.answer,
            colour: AnswerColour::random(),
            correct: input.correct,
        })
        .collect();

    Question {
        id: Uuid::new_v4(),
        text: body.question,
        duration_secs: body.duration,
        points: body.points,
        answers,
    }
}
