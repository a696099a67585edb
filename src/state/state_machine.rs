use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Lifecycle states of a live quiz session.
///
/// A session starts in [`SessionState::Lobby`] and ends in the terminal
/// [`SessionState::End`], which is reachable from every other state and
/// accepts no further actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionState {
    /// Players may join; the quiz has not started.
    Lobby,
    /// Fixed three-second countdown before the question opens.
    QuestionCountdown,
    /// The current question is open for answer submissions.
    QuestionOpen,
    /// The question duration elapsed; submissions are no longer accepted.
    QuestionClose,
    /// Correct answers are on display for the current question.
    AnswerShow,
    /// The session is over and final rankings are available.
    FinalResults,
    /// Terminal state; nothing can happen to the session any more.
    End,
}

/// Actions the session owner can apply to drive the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HostAction {
    /// Advance to the next question and begin its countdown.
    NextQuestion,
    /// Cut the countdown short and open the question immediately.
    SkipCountdown,
    /// Reveal the correct answers for the current question.
    GoToAnswer,
    /// Jump to the final results screen.
    GoToFinalResults,
    /// Terminate the session.
    End,
}

/// Error returned when an action value is not one of the known actions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown action `{0}`")]
pub struct UnknownAction(pub String);

impl FromStr for HostAction {
    type Err = UnknownAction;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "NEXT_QUESTION" => Ok(Self::NextQuestion),
            "SKIP_COUNTDOWN" => Ok(Self::SkipCountdown),
            "GO_TO_ANSWER" => Ok(Self::GoToAnswer),
            "GO_TO_FINAL_RESULTS" => Ok(Self::GoToFinalResults),
            "END" => Ok(Self::End),
            other => Err(UnknownAction(other.to_string())),
        }
    }
}

/// Autonomous events fired by the timer subsystem.
///
/// These are the only transitions not triggered by an explicit host action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// The three-second question countdown ran out.
    CountdownElapsed,
    /// The question's configured duration ran out.
    QuestionElapsed,
}

/// Validated outcome of a transition, naming the side effects the engine
/// must perform while it still holds the session lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Advance `at_question`, enter `QUESTION_COUNTDOWN`, arm the countdown.
    StartCountdown,
    /// Enter `QUESTION_OPEN`, record the question start time, arm the
    /// duration timer.
    OpenQuestion,
    /// Enter `QUESTION_CLOSE` once the duration timer fires.
    CloseQuestion,
    /// Enter `ANSWER_SHOW`, cancelling any pending timer.
    ShowAnswers,
    /// Enter `FINAL_RESULTS`, cancelling any pending timer.
    ShowFinalResults,
    /// Enter `END`, cancelling any pending timer.
    EndSession,
}

impl Transition {
    /// State the session machine lands in after this transition.
    pub fn next_state(self) -> SessionState {
        match self {
            Transition::StartCountdown => SessionState::QuestionCountdown,
            Transition::OpenQuestion => SessionState::QuestionOpen,
            Transition::CloseQuestion => SessionState::QuestionClose,
            Transition::ShowAnswers => SessionState::AnswerShow,
            Transition::ShowFinalResults => SessionState::FinalResults,
            Transition::EndSession => SessionState::End,
        }
    }
}

/// Error returned when an action is not legal in the current state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("action {action:?} cannot be applied while in {state:?}")]
pub struct InvalidAction {
    /// State the session was in when the action was received.
    pub state: SessionState,
    /// The rejected action.
    pub action: HostAction,
}

/// Validate a host action against the current state and return the
/// transition to perform.
pub fn plan_action(state: SessionState, action: HostAction) -> Result<Transition, InvalidAction> {
    use SessionState::*;

    let transition = match (state, action) {
        (Lobby, HostAction::NextQuestion) => Transition::StartCountdown,
        (QuestionCountdown, HostAction::SkipCountdown) => Transition::OpenQuestion,
        (QuestionOpen, HostAction::GoToAnswer) => Transition::ShowAnswers,
        (QuestionClose, HostAction::NextQuestion) => Transition::StartCountdown,
        (QuestionClose, HostAction::GoToAnswer) => Transition::ShowAnswers,
        (QuestionClose, HostAction::GoToFinalResults) => Transition::ShowFinalResults,
        (AnswerShow, HostAction::NextQuestion) => Transition::StartCountdown,
        (AnswerShow, HostAction::GoToFinalResults) => Transition::ShowFinalResults,
        (End, _) => return Err(InvalidAction { state, action }),
        (_, HostAction::End) => Transition::EndSession,
        (state, action) => return Err(InvalidAction { state, action }),
    };

    Ok(transition)
}

/// Map a timer fire onto a transition, or `None` when the fire is stale.
///
/// A stale fire (the session moved on before the callback ran) is a no-op
/// rather than an error: no caller is waiting on a timer.
pub fn plan_timer(state: SessionState, event: TimerEvent) -> Option<Transition> {
    match (state, event) {
        (SessionState::QuestionCountdown, TimerEvent::CountdownElapsed) => {
            Some(Transition::OpenQuestion)
        }
        (SessionState::QuestionOpen, TimerEvent::QuestionElapsed) => Some(Transition::CloseQuestion),
        _ => None,
    }
}
