use std::{sync::Arc, time::Duration};

use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    dto::session::{
        CsvLinkResponse, QuizResultsResponse, SessionIdResponse, SessionStatusResponse,
        SessionsViewResponse, StartSessionRequest,
    },
    error::ServiceError,
    services::{auth_service, quiz_service, scoring},
    state::{
        SharedState,
        session::QuizSession,
        state_machine::{self, HostAction, SessionState, TimerEvent, Transition},
    },
};

/// Fixed delay between NEXT_QUESTION and the question opening.
const COUNTDOWN: Duration = Duration::from_secs(3);
/// Largest accepted auto-start player count.
const AUTO_START_MAX: usize = 50;
/// Most non-ended sessions one quiz may have at a time.
const ACTIVE_SESSIONS_MAX: usize = 10;

/// Start a new session for an owned quiz.
pub async fn start_session(
    state: &SharedState,
    token: Uuid,
    quiz_id: Uuid,
    request: StartSessionRequest,
) -> Result<SessionIdResponse, ServiceError> {
    let user = auth_service::authenticate(state, token)?;

    let quiz = match quiz_service::owned_quiz(state, &user, quiz_id) {
        Ok(quiz) => quiz,
        Err(err) => {
            let in_trash = state
                .trash()
                .get(&quiz_id)
                .is_some_and(|entry| entry.value().owner_id == user.id);
            if in_trash {
                return Err(ServiceError::InvalidInput("quiz is in the trash".into()));
            }
            return Err(err);
        }
    };

    if quiz.questions.is_empty() {
        return Err(ServiceError::InvalidInput(
            "quiz has no questions to run".into(),
        ));
    }
    if request.auto_start_num > AUTO_START_MAX {
        return Err(ServiceError::InvalidInput(
            "auto-start number must not exceed 50".into(),
        ));
    }
    if active_session_count(state, quiz_id).await > ACTIVE_SESSIONS_MAX {
        return Err(ServiceError::InvalidInput(
            "quiz already has more than 10 active sessions".into(),
        ));
    }

    let session = QuizSession::new(&quiz, request.auto_start_num);
    let session_id = session.id;
    state.sessions().insert(session);

    info!(%session_id, %quiz_id, "session started");
    Ok(SessionIdResponse { session_id })
}

/// Apply a host action to a session's state machine.
///
/// Ownership of the quiz is revalidated on every call, so a transferred
/// quiz immediately locks the previous owner out of its running sessions.
pub async fn drive_session(
    state: &SharedState,
    token: Uuid,
    quiz_id: Uuid,
    session_id: Uuid,
    action: &str,
) -> Result<(), ServiceError> {
    let user = auth_service::authenticate(state, token)?;
    quiz_service::owned_quiz(state, &user, quiz_id)?;

    let action: HostAction = action.parse()?;

    let handle = state
        .sessions()
        .get(session_id)
        .ok_or_else(|| ServiceError::InvalidInput("session id is invalid".into()))?;

    let mut session = handle.lock().await;
    if session.quiz_id != quiz_id {
        return Err(ServiceError::InvalidInput(
            "session does not belong to this quiz".into(),
        ));
    }

    let transition = state_machine::plan_action(session.state, action)?;
    apply_transition(state, &mut session, transition)?;
    Ok(())
}

/// Active and ended session ids for an owned quiz.
pub async fn sessions_view(
    state: &SharedState,
    token: Uuid,
    quiz_id: Uuid,
) -> Result<SessionsViewResponse, ServiceError> {
    let user = auth_service::authenticate(state, token)?;
    quiz_service::owned_quiz(state, &user, quiz_id)?;

    let mut active_sessions = Vec::new();
    let mut inactive_sessions = Vec::new();
    for (session_id, handle) in state.sessions().sessions_of_quiz(quiz_id) {
        let session = handle.lock().await;
        if session.state == SessionState::End {
            inactive_sessions.push(session_id);
        } else {
            active_sessions.push(session_id);
        }
    }
    active_sessions.sort();
    inactive_sessions.sort();

    Ok(SessionsViewResponse {
        active_sessions,
        inactive_sessions,
    })
}

/// Owner-facing status of one session.
pub async fn session_status(
    state: &SharedState,
    token: Uuid,
    quiz_id: Uuid,
    session_id: Uuid,
) -> Result<SessionStatusResponse, ServiceError> {
    let session = owned_session(state, token, quiz_id, session_id).await?;
    let session = session.lock().await;
    Ok((&*session).into())
}

/// Final results of a session, available only in FINAL_RESULTS.
pub async fn session_results(
    state: &SharedState,
    token: Uuid,
    quiz_id: Uuid,
    session_id: Uuid,
) -> Result<QuizResultsResponse, ServiceError> {
    let session = owned_session(state, token, quiz_id, session_id).await?;
    let session = session.lock().await;
    if session.state != SessionState::FinalResults {
        return Err(ServiceError::InvalidState(
            "session is not in FINAL_RESULTS state".into(),
        ));
    }
    Ok(scoring::session_results(&session))
}

/// Export the final results as CSV and return the download link.
///
/// One row per player in join order: `name,score_q1,rank_q1,...`, rank 0
/// and score 0 for a question the player did not answer correctly.
pub async fn session_results_csv(
    state: &SharedState,
    token: Uuid,
    quiz_id: Uuid,
    session_id: Uuid,
) -> Result<CsvLinkResponse, ServiceError> {
    let session = owned_session(state, token, quiz_id, session_id).await?;
    let session = session.lock().await;
    if session.state != SessionState::FinalResults {
        return Err(ServiceError::InvalidState(
            "session is not in FINAL_RESULTS state".into(),
        ));
    }

    let table = scoring::rank_table(&session);
    let mut csv = String::new();
    for (player_index, player) in session.players.iter().enumerate() {
        csv.push_str(&player.name);
        for (question_index, question) in session.snapshot.questions.iter().enumerate() {
            let rank = table[question_index][player_index];
            let score = if rank != 0 {
                f64::from(question.points) / rank as f64
            } else {
                0.0
            };
            csv.push_str(&format!(",{score},{rank}"));
        }
        csv.push('\n');
    }

    let file_name = format!("quiz_final_results_{}.csv", session.id);
    drop(session);

    let directory = state.config().public_dir.clone();
    tokio::fs::create_dir_all(&directory).await?;
    tokio::fs::write(directory.join(&file_name), csv).await?;

    Ok(CsvLinkResponse {
        url: format!("{}/csv/{file_name}", state.config().base_url),
    })
}

/// Perform a validated transition's side effects and move the state.
///
/// Must be called with the session lock held; every mutation of session
/// state — explicit host actions, the auto-start emitted by the join
/// handler, and timer fires — funnels through here, so transitions can
/// never interleave.
pub(crate) fn apply_transition(
    state: &SharedState,
    session: &mut QuizSession,
    transition: Transition,
) -> Result<(), ServiceError> {
    let from = session.state;

    match transition {
        Transition::StartCountdown => {
            let next_index = session.at_question.map_or(0, |index| index + 1);
            if next_index >= session.snapshot.questions.len() {
                return Err(ServiceError::InvalidState(
                    "there is no further question in this session".into(),
                ));
            }
            session.at_question = Some(next_index);
            session.state = SessionState::QuestionCountdown;
            arm_timer(state, session, COUNTDOWN, TimerEvent::CountdownElapsed);
        }
        Transition::OpenQuestion => {
            let index = session.at_question.ok_or_else(|| {
                ServiceError::InvalidState("session has no current question".into())
            })?;
            let duration_secs = session
                .snapshot
                .questions
                .get(index)
                .map(|question| question.duration_secs)
                .ok_or_else(|| {
                    ServiceError::InvalidState("session has no current question".into())
                })?;

            session.question_start_times[index] = Some(OffsetDateTime::now_utc());
            session.state = SessionState::QuestionOpen;
            arm_timer(
                state,
                session,
                Duration::from_secs(duration_secs),
                TimerEvent::QuestionElapsed,
            );
        }
        Transition::CloseQuestion => {
            session.cancel_pending_timer();
            session.state = SessionState::QuestionClose;
        }
        Transition::ShowAnswers => {
            session.cancel_pending_timer();
            session.state = SessionState::AnswerShow;
        }
        Transition::ShowFinalResults => {
            session.cancel_pending_timer();
            session.state = SessionState::FinalResults;
        }
        Transition::EndSession => {
            session.cancel_pending_timer();
            session.state = SessionState::End;
        }
    }

    info!(
        session_id = %session.id,
        from = ?from,
        to = ?session.state,
        at_question = ?session.at_question,
        "session transition"
    );
    Ok(())
}

/// Arm the session's single timer slot with a delayed transition event.
///
/// The previous timer (if any) is cancelled first, so at most one timer is
/// ever outstanding per session.
fn arm_timer(state: &SharedState, session: &mut QuizSession, delay: Duration, event: TimerEvent) {
    let generation = session.cancel_pending_timer();
    let session_id = session.id;
    let shared = state.clone();

    let task = tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        handle_timer_fire(shared, session_id, generation, event).await;
    });
    session.install_timer(generation, task.abort_handle());

    debug!(%session_id, ?event, ?delay, generation, "timer armed");
}

/// Process a timer fire as a transition-due event for a specific session.
///
/// The generation check happens under the same session lock every other
/// mutation takes, so a fire racing a cancellation (or an END) can never
/// apply: it observes the bumped generation and returns.
async fn handle_timer_fire(
    state: SharedState,
    session_id: Uuid,
    generation: u64,
    event: TimerEvent,
) {
    let Some(handle) = state.sessions().get(session_id) else {
        return;
    };
    let mut session = handle.lock().await;

    if session.timer_generation() != generation {
        debug!(%session_id, generation, "stale timer fire ignored");
        return;
    }
    let Some(transition) = state_machine::plan_timer(session.state, event) else {
        debug!(%session_id, ?event, state = ?session.state, "timer fire has no effect");
        return;
    };

    if let Err(err) = apply_transition(&state, &mut session, transition) {
        warn!(%session_id, error = %err, "timer transition failed");
    }
}

async fn active_session_count(state: &SharedState, quiz_id: Uuid) -> usize {
    let mut count = 0;
    for (_, handle) in state.sessions().sessions_of_quiz(quiz_id) {
        let session = handle.lock().await;
        if session.state != SessionState::End {
            count += 1;
        }
    }
    count
}

/// Authenticate, check quiz ownership, and resolve the session handle.
async fn owned_session(
    state: &SharedState,
    token: Uuid,
    quiz_id: Uuid,
    session_id: Uuid,
) -> Result<Arc<Mutex<QuizSession>>, ServiceError> {
    let user = auth_service::authenticate(state, token)?;
    quiz_service::owned_quiz(state, &user, quiz_id)?;

    let handle = state
        .sessions()
        .get(session_id)
        .ok_or_else(|| ServiceError::InvalidInput("session id is invalid".into()))?;

    {
        let session = handle.lock().await;
        if session.quiz_id != quiz_id {
            return Err(ServiceError::InvalidInput(
                "session does not belong to this quiz".into(),
            ));
        }
    }
    Ok(handle)
}
