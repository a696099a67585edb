use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use dashmap::DashMap;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tokio::task::AbortHandle;
use uuid::Uuid;

use crate::state::{
    quiz::{Question, Quiz, QuizSnapshot, unix_now},
    state_machine::SessionState,
};

/// Identifier for a player, unique across every session in the process.
pub type PlayerId = u64;

/// One recorded answer submission for a question.
#[derive(Debug, Clone)]
pub struct Submission {
    /// Wall-clock time the submission was accepted.
    pub submitted_at: OffsetDateTime,
    /// Answer ids the player selected.
    pub answer_ids: Vec<Uuid>,
}

/// A participant of one quiz session.
#[derive(Debug, Clone)]
pub struct Player {
    /// Process-wide unique player id.
    pub id: PlayerId,
    /// Session this player belongs to.
    pub session_id: Uuid,
    /// Display name, unique within the session.
    pub name: String,
    /// Per-question submissions; `None` means no submission yet.
    pub submissions: Vec<Option<Submission>>,
}

impl Player {
    /// Create a player with an empty submission slot per question.
    pub fn new(id: PlayerId, session_id: Uuid, name: String, question_count: usize) -> Self {
        Self {
            id,
            session_id,
            name,
            submissions: vec![None; question_count],
        }
    }
}

/// One chat message posted to a session.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    /// Message text.
    pub body: String,
    /// Id of the posting player.
    pub player_id: PlayerId,
    /// Name of the posting player at the time of sending.
    pub player_name: String,
    /// Unix timestamp the message was sent.
    pub time_sent: i64,
}

/// Handle to the timer task currently armed for a session.
#[derive(Debug)]
struct PendingTimer {
    generation: u64,
    handle: AbortHandle,
}

/// One live (or ended) run of a quiz.
///
/// All mutable session state lives behind a per-session [`Mutex`] owned by
/// the [`SessionStore`]; every read-modify-write against a session happens
/// under that lock, including timer fires.
#[derive(Debug)]
pub struct QuizSession {
    /// Process-lifetime unique session id.
    pub id: Uuid,
    /// Quiz this session runs; ownership is revalidated against the live
    /// quiz on every host call.
    pub quiz_id: Uuid,
    /// Current state machine state.
    pub state: SessionState,
    /// Index of the current question; `None` until the first question
    /// starts. Monotonically increasing, never reset.
    pub at_question: Option<usize>,
    /// Player count that triggers the automatic first advance out of the
    /// lobby. Zero disables auto-start.
    pub auto_start_num: usize,
    /// Players in join order.
    pub players: Vec<Player>,
    /// Per-question timestamp recorded when the question entered
    /// `QUESTION_OPEN`; the zero point for answer-time measurement.
    pub question_start_times: Vec<Option<OffsetDateTime>>,
    /// Append-only chat log.
    pub messages: Vec<ChatMessage>,
    /// Frozen copy of the quiz taken at session start.
    pub snapshot: QuizSnapshot,
    timer_generation: u64,
    pending_timer: Option<PendingTimer>,
}

impl QuizSession {
    /// Create a lobby-state session over a snapshot of the given quiz.
    pub fn new(quiz: &Quiz, auto_start_num: usize) -> Self {
        let snapshot = QuizSnapshot::of(quiz);
        let question_count = snapshot.questions.len();
        Self {
            id: Uuid::new_v4(),
            quiz_id: quiz.id,
            state: SessionState::Lobby,
            at_question: None,
            auto_start_num,
            players: Vec::new(),
            question_start_times: vec![None; question_count],
            messages: Vec::new(),
            snapshot,
            timer_generation: 0,
            pending_timer: None,
        }
    }

    /// The question the session is currently at, if any.
    pub fn current_question(&self) -> Option<(usize, &Question)> {
        let index = self.at_question?;
        let question = self.snapshot.questions.get(index)?;
        Some((index, question))
    }

    /// Player names in join order.
    pub fn player_names(&self) -> Vec<String> {
        self.players.iter().map(|p| p.name.clone()).collect()
    }

    /// Look up a player of this session by id.
    pub fn player(&self, player_id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }

    /// Mutable lookup of a player of this session by id.
    pub fn player_mut(&mut self, player_id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == player_id)
    }

    /// Append a chat message stamped with the current time.
    pub fn post_message(&mut self, player_id: PlayerId, player_name: String, body: String) {
        self.messages.push(ChatMessage {
            body,
            player_id,
            player_name,
            time_sent: unix_now(),
        });
    }

    /// Cancel any pending timer and invalidate in-flight fires.
    ///
    /// The generation bump happens under the session lock, so a timer task
    /// that already woke up but has not yet taken the lock will observe a
    /// stale generation and no-op: exactly one of {cancel, fire} takes
    /// effect, never both.
    pub fn cancel_pending_timer(&mut self) -> u64 {
        if let Some(timer) = self.pending_timer.take() {
            timer.handle.abort();
        }
        self.timer_generation += 1;
        self.timer_generation
    }

    /// Record the spawned timer task for the given generation.
    ///
    /// Invariant: at most one timer is ever pending; callers obtain
    /// `generation` from [`QuizSession::cancel_pending_timer`], which
    /// evicted any previous timer.
    pub fn install_timer(&mut self, generation: u64, handle: AbortHandle) {
        self.pending_timer = Some(PendingTimer { generation, handle });
    }

    /// Current timer generation; fires carrying an older value are stale.
    pub fn timer_generation(&self) -> u64 {
        self.timer_generation
    }

    /// Whether a timer is currently armed.
    pub fn has_pending_timer(&self) -> bool {
        self.pending_timer.is_some()
    }
}

/// Authoritative collection of live sessions and their players.
///
/// Sessions are held behind `Arc<Mutex<_>>` so request handlers and timer
/// callbacks serialise their read-modify-write sequences per session while
/// leaving unrelated sessions untouched.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: DashMap<Uuid, Arc<Mutex<QuizSession>>>,
    session_quiz: DashMap<Uuid, Uuid>,
    player_session: DashMap<PlayerId, Uuid>,
    next_player_id: AtomicU64,
}

impl SessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a freshly created session and return its shared handle.
    pub fn insert(&self, session: QuizSession) -> Arc<Mutex<QuizSession>> {
        let id = session.id;
        let quiz_id = session.quiz_id;
        let handle = Arc::new(Mutex::new(session));
        self.sessions.insert(id, handle.clone());
        self.session_quiz.insert(id, quiz_id);
        handle
    }

    /// Shared handle to a session, if it exists.
    pub fn get(&self, session_id: Uuid) -> Option<Arc<Mutex<QuizSession>>> {
        self.sessions
            .get(&session_id)
            .map(|entry| entry.value().clone())
    }

    /// Handles of every session started for the given quiz.
    pub fn sessions_of_quiz(&self, quiz_id: Uuid) -> Vec<(Uuid, Arc<Mutex<QuizSession>>)> {
        self.session_quiz
            .iter()
            .filter(|entry| *entry.value() == quiz_id)
            .filter_map(|entry| self.get(*entry.key()).map(|handle| (*entry.key(), handle)))
            .collect()
    }

    /// Allocate the next player id; strictly increasing, never reused.
    pub fn allocate_player_id(&self) -> PlayerId {
        self.next_player_id.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Record which session a player belongs to.
    pub fn register_player(&self, player_id: PlayerId, session_id: Uuid) {
        self.player_session.insert(player_id, session_id);
    }

    /// Session id a player belongs to, if the player exists.
    pub fn session_of_player(&self, player_id: PlayerId) -> Option<Uuid> {
        self.player_session.get(&player_id).map(|entry| *entry.value())
    }

    /// Drop every session and player, cancelling all outstanding timers.
    pub async fn clear(&self) {
        let handles: Vec<Arc<Mutex<QuizSession>>> = self
            .sessions
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        for handle in handles {
            handle.lock().await.cancel_pending_timer();
        }
        self.sessions.clear();
        self.session_quiz.clear();
        self.player_session.clear();
    }
}
