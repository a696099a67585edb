//! Shared in-memory application state: user, quiz, and session stores.

/// Quiz, question, and answer domain models plus the session snapshot.
pub mod quiz;
/// Live session and player records and the session store.
pub mod session;
/// The session lifecycle state machine.
pub mod state_machine;
/// Registered owner accounts.
pub mod user;

use std::sync::Arc;

use dashmap::DashMap;
use uuid::Uuid;

use crate::{
    config::AppConfig,
    state::{quiz::Quiz, session::SessionStore, user::User},
};

/// Cheaply cloneable handle to the whole application state.
pub type SharedState = Arc<AppState>;

/// Central application state owning every store.
///
/// There is no ambient global: the state is constructed once at startup and
/// injected into every route handler, service call, and timer task.
pub struct AppState {
    config: AppConfig,
    users: DashMap<Uuid, User>,
    tokens: DashMap<Uuid, Uuid>,
    quizzes: DashMap<Uuid, Quiz>,
    trash: DashMap<Uuid, Quiz>,
    sessions: SessionStore,
}

impl AppState {
    /// Construct a fresh [`AppState`] wrapped in an [`Arc`].
    pub fn new(config: AppConfig) -> SharedState {
        Arc::new(Self {
            config,
            users: DashMap::new(),
            tokens: DashMap::new(),
            quizzes: DashMap::new(),
            trash: DashMap::new(),
            sessions: SessionStore::new(),
        })
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Registered accounts keyed by user id.
    pub fn users(&self) -> &DashMap<Uuid, User> {
        &self.users
    }

    /// Active login tokens mapped to the user they authenticate.
    pub fn tokens(&self) -> &DashMap<Uuid, Uuid> {
        &self.tokens
    }

    /// Live quiz definitions keyed by quiz id.
    pub fn quizzes(&self) -> &DashMap<Uuid, Quiz> {
        &self.quizzes
    }

    /// Removed quizzes awaiting restore or permanent deletion.
    pub fn trash(&self) -> &DashMap<Uuid, Quiz> {
        &self.trash
    }

    /// Store of live and ended quiz sessions.
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Wipe every store, cancelling all outstanding session timers first so
    /// no autonomous transition can touch cleared state.
    pub async fn reset(&self) {
        self.sessions.clear().await;
        self.users.clear();
        self.tokens.clear();
        self.quizzes.clear();
        self.trash.clear();
    }
}
