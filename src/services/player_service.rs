use std::sync::Arc;

use rand::seq::SliceRandom;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::info;

use crate::{
    dto::{
        player::{
            ChatSendRequest, ChatViewResponse, JoinSessionRequest, JoinSessionResponse,
            PlayerQuestionInfoResponse, PlayerStatusResponse, SubmitAnswersRequest,
        },
        session::{QuestionResult, QuizResultsResponse, at_question_wire},
    },
    error::ServiceError,
    services::{scoring, session_service},
    state::{
        SharedState,
        session::{Player, PlayerId, QuizSession, Submission},
        state_machine::{self, HostAction, SessionState},
    },
};

const MESSAGE_LEN_MAX: usize = 100;
const GENERATED_LETTERS: usize = 5;
const GENERATED_DIGITS: usize = 3;

/// Admit a player into a lobby-state session.
///
/// An empty requested name is replaced by a generated one of five distinct
/// lowercase letters followed by three distinct digits, regenerated until
/// unique within the session. Reaching the session's auto-start count emits
/// a NEXT_QUESTION through the same transition path a host action takes,
/// while the session lock is still held.
pub async fn join_session(
    state: &SharedState,
    request: JoinSessionRequest,
) -> Result<JoinSessionResponse, ServiceError> {
    let handle = state
        .sessions()
        .get(request.session_id)
        .ok_or_else(|| ServiceError::InvalidInput("session id is invalid".into()))?;

    let mut session = handle.lock().await;

    if session.state != SessionState::Lobby {
        return Err(ServiceError::InvalidState(
            "session is not in LOBBY state".into(),
        ));
    }

    let name = if request.name.trim().is_empty() {
        generated_unique_name(&session)
    } else {
        request.name
    };
    if session.players.iter().any(|player| player.name == name) {
        return Err(ServiceError::InvalidInput(
            "name is already taken in this session".into(),
        ));
    }

    let player_id = state.sessions().allocate_player_id();
    let question_count = session.snapshot.questions.len();
    let session_id = session.id;
    session.players.push(Player::new(
        player_id,
        session_id,
        name.clone(),
        question_count,
    ));
    state.sessions().register_player(player_id, session.id);

    info!(session_id = %session.id, player_id, name = %name, "player joined");

    if session.auto_start_num != 0 && session.players.len() == session.auto_start_num {
        let transition = state_machine::plan_action(session.state, HostAction::NextQuestion)?;
        session_service::apply_transition(state, &mut session, transition)?;
        info!(session_id = %session.id, "lobby full, session auto-started");
    }

    Ok(JoinSessionResponse { player_id })
}

/// Session status as visible to a player.
pub async fn player_status(
    state: &SharedState,
    player_id: PlayerId,
) -> Result<PlayerStatusResponse, ServiceError> {
    let handle = player_session(state, player_id).await?;
    let session = handle.lock().await;

    Ok(PlayerStatusResponse {
        state: session.state,
        num_questions: session.snapshot.questions.len(),
        at_question: at_question_wire(&session),
    })
}

/// The currently live question, with correctness withheld.
pub async fn question_info(
    state: &SharedState,
    player_id: PlayerId,
    question_position: usize,
) -> Result<PlayerQuestionInfoResponse, ServiceError> {
    let handle = player_session(state, player_id).await?;
    let session = handle.lock().await;

    check_question_position(&session, question_position)?;
    match session.state {
        SessionState::Lobby => {
            return Err(ServiceError::InvalidState("session is in LOBBY state".into()));
        }
        SessionState::QuestionCountdown => {
            return Err(ServiceError::InvalidState(
                "session is in QUESTION_COUNTDOWN state".into(),
            ));
        }
        SessionState::End => {
            return Err(ServiceError::InvalidState("session is in END state".into()));
        }
        _ => {}
    }
    check_at_question(&session, question_position)?;

    Ok((&session.snapshot.questions[question_position - 1]).into())
}

/// Record a player's answer for the currently open question.
///
/// Resubmission before the question closes overwrites the prior submission;
/// the last write wins.
pub async fn submit_answers(
    state: &SharedState,
    player_id: PlayerId,
    question_position: usize,
    request: SubmitAnswersRequest,
) -> Result<(), ServiceError> {
    let handle = player_session(state, player_id).await?;
    let mut session = handle.lock().await;

    check_question_position(&session, question_position)?;
    if session.state != SessionState::QuestionOpen {
        return Err(ServiceError::InvalidState(
            "session is not in QUESTION_OPEN state".into(),
        ));
    }
    check_at_question(&session, question_position)?;

    let answer_ids = request.answer_ids;
    if answer_ids.is_empty() {
        return Err(ServiceError::InvalidInput(
            "at least one answer id must be submitted".into(),
        ));
    }
    let mut seen = answer_ids.clone();
    seen.sort();
    seen.dedup();
    if seen.len() != answer_ids.len() {
        return Err(ServiceError::InvalidInput(
            "duplicate answer ids were submitted".into(),
        ));
    }

    let question = &session.snapshot.questions[question_position - 1];
    let valid_ids = question.answer_ids();
    if answer_ids.iter().any(|id| !valid_ids.contains(id)) {
        return Err(ServiceError::InvalidInput(
            "answer ids are not valid for this question".into(),
        ));
    }

    let submission = Submission {
        submitted_at: OffsetDateTime::now_utc(),
        answer_ids,
    };
    let player = session
        .player_mut(player_id)
        .ok_or_else(|| ServiceError::InvalidInput("player id does not exist".into()))?;
    player.submissions[question_position - 1] = Some(submission);

    Ok(())
}

/// Result of one question, available while its answers are on display.
pub async fn question_results(
    state: &SharedState,
    player_id: PlayerId,
    question_position: usize,
) -> Result<QuestionResult, ServiceError> {
    let handle = player_session(state, player_id).await?;
    let session = handle.lock().await;

    if session.state != SessionState::AnswerShow {
        return Err(ServiceError::InvalidState(
            "session is not in ANSWER_SHOW state".into(),
        ));
    }
    check_question_position(&session, question_position)?;
    check_at_question(&session, question_position)?;

    let mut scores = vec![0.0; session.players.len()];
    Ok(scoring::question_result(
        &session,
        &session.snapshot.questions[question_position - 1],
        question_position - 1,
        &mut scores,
        &mut Vec::new(),
    ))
}

/// Final results of the player's session.
pub async fn session_results(
    state: &SharedState,
    player_id: PlayerId,
) -> Result<QuizResultsResponse, ServiceError> {
    let handle = player_session(state, player_id).await?;
    let session = handle.lock().await;

    if session.state != SessionState::FinalResults {
        return Err(ServiceError::InvalidState(
            "session is not in FINAL_RESULTS state".into(),
        ));
    }
    Ok(scoring::session_results(&session))
}

/// The ordered chat log of the player's session.
pub async fn chat_view(
    state: &SharedState,
    player_id: PlayerId,
) -> Result<ChatViewResponse, ServiceError> {
    let handle = player_session(state, player_id).await?;
    let session = handle.lock().await;

    Ok(ChatViewResponse {
        messages: session.messages.iter().map(Into::into).collect(),
    })
}

/// Post a chat message to the player's session.
pub async fn chat_send(
    state: &SharedState,
    player_id: PlayerId,
    request: ChatSendRequest,
) -> Result<(), ServiceError> {
    let body = request.message.message_body;
    if body.trim().is_empty() {
        return Err(ServiceError::InvalidInput("message cannot be empty".into()));
    }
    if body.len() > MESSAGE_LEN_MAX {
        return Err(ServiceError::InvalidInput(
            "message cannot exceed 100 characters".into(),
        ));
    }

    let handle = player_session(state, player_id).await?;
    let mut session = handle.lock().await;

    let player_name = session
        .player(player_id)
        .map(|player| player.name.clone())
        .ok_or_else(|| ServiceError::InvalidInput("player id does not exist".into()))?;
    session.post_message(player_id, player_name, body);

    Ok(())
}

/// Resolve the session a player belongs to.
async fn player_session(
    state: &SharedState,
    player_id: PlayerId,
) -> Result<Arc<Mutex<QuizSession>>, ServiceError> {
    let session_id = state
        .sessions()
        .session_of_player(player_id)
        .ok_or_else(|| ServiceError::InvalidInput("player id does not exist".into()))?;
    state
        .sessions()
        .get(session_id)
        .ok_or_else(|| ServiceError::InvalidInput("player id does not exist".into()))
}

fn check_question_position(
    session: &QuizSession,
    question_position: usize,
) -> Result<(), ServiceError> {
    if question_position == 0 || question_position > session.snapshot.questions.len() {
        return Err(ServiceError::InvalidInput(
            "question position is not valid for this session".into(),
        ));
    }
    Ok(())
}

fn check_at_question(session: &QuizSession, question_position: usize) -> Result<(), ServiceError> {
    if session.at_question != Some(question_position - 1) {
        return Err(ServiceError::InvalidState(
            "session is not on this question".into(),
        ));
    }
    Ok(())
}

/// Generate a `[a-z]{5}[0-9]{3}` name not yet used in the session.
///
/// Letters and digits are drawn from shuffled pools, so characters never
/// repeat within the generated token.
fn generated_unique_name(session: &QuizSession) -> String {
    loop {
        let candidate = generate_name();
        if !session.players.iter().any(|player| player.name == candidate) {
            return candidate;
        }
    }
}

fn generate_name() -> String {
    let mut rng = rand::rng();
    let mut letters: Vec<char> = ('a'..='z').collect();
    let mut digits: Vec<char> = ('0'..='9').collect();
    letters.shuffle(&mut rng);
    digits.shuffle(&mut rng);

    letters
        .into_iter()
        .take(GENERATED_LETTERS)
        .chain(digits.into_iter().take(GENERATED_DIGITS))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::generate_name;

    #[test]
    fn generated_names_match_the_expected_shape() {
        for _ in 0..100 {
            let name = generate_name();
            assert_eq!(name.len(), 8);
            assert!(name[..5].chars().all(|c| c.is_ascii_lowercase()));
            assert!(name[5..].chars().all(|c| c.is_ascii_digit()));

            // No character repeats within the token.
            let unique: HashSet<char> = name.chars().collect();
            assert_eq!(unique.len(), name.len());
        }
    }
}
