//! Integration tests driving the session engine through the service layer.
//!
//! Timer-dependent tests run on a paused tokio clock, so the three-second
//! countdown and the question duration elapse deterministically.

use std::time::Duration;

use quizdeck_back::{
    config::AppConfig,
    dto::{
        auth::RegisterRequest,
        player::{JoinSessionRequest, SubmitAnswersRequest},
        quiz::{AnswerInput, CreateQuizRequest, QuestionBody},
        session::StartSessionRequest,
    },
    error::ServiceError,
    services::{auth_service, player_service, quiz_service, session_service},
    state::{AppState, SharedState, state_machine::SessionState},
};
use uuid::Uuid;

fn test_state() -> SharedState {
    AppState::new(AppConfig::for_tests(
        std::env::temp_dir().join("quizdeck-session-flow"),
    ))
}

async fn register(state: &SharedState, email: &str) -> Uuid {
    let response = auth_service::register(
        state,
        RegisterRequest {
            email: email.to_string(),
            password: "abcd1234".to_string(),
            name_first: "Quiz".to_string(),
            name_last: "Host".to_string(),
        },
    )
    .await
    .unwrap();
    Uuid::parse_str(&response.token).unwrap()
}

async fn add_question(state: &SharedState, token: Uuid, quiz_id: Uuid, duration: u64, points: u32) {
    quiz_service::create_question(
        state,
        token,
        quiz_id,
        QuestionBody {
            question: "Best systems language?".to_string(),
            duration,
            points,
            answers: vec![
                AnswerInput {
                    answer: "Rust".to_string(),
                    correct: true,
                },
                AnswerInput {
                    answer: "COBOL".to_string(),
                    correct: false,
                },
            ],
        },
    )
    .await
    .unwrap();
}

/// Register a host, create a one-question quiz (duration 4s, 5 points), and
/// return `(state, token, quiz_id)`.
async fn setup() -> (SharedState, Uuid, Uuid) {
    let state = test_state();
    let token = register(&state, "host@example.com").await;
    let quiz = quiz_service::create_quiz(
        &state,
        token,
        CreateQuizRequest {
            name: "Trivia Night".to_string(),
            description: String::new(),
        },
    )
    .await
    .unwrap();
    add_question(&state, token, quiz.quiz_id, 4, 5).await;
    (state, token, quiz.quiz_id)
}

async fn start(state: &SharedState, token: Uuid, quiz_id: Uuid, auto_start_num: usize) -> Uuid {
    session_service::start_session(state, token, quiz_id, StartSessionRequest { auto_start_num })
        .await
        .unwrap()
        .session_id
}

async fn join(state: &SharedState, session_id: Uuid, name: &str) -> u64 {
    player_service::join_session(
        state,
        JoinSessionRequest {
            session_id,
            name: name.to_string(),
        },
    )
    .await
    .unwrap()
    .player_id
}

async fn drive(
    state: &SharedState,
    token: Uuid,
    quiz_id: Uuid,
    session_id: Uuid,
    action: &str,
) -> Result<(), ServiceError> {
    session_service::drive_session(state, token, quiz_id, session_id, action).await
}

async fn player_state(state: &SharedState, player_id: u64) -> SessionState {
    player_service::player_status(state, player_id)
        .await
        .unwrap()
        .state
}

async fn answer_ids(
    state: &SharedState,
    token: Uuid,
    quiz_id: Uuid,
    correct: bool,
) -> Vec<Uuid> {
    let info = quiz_service::quiz_info(state, token, quiz_id).await.unwrap();
    info.questions[0]
        .answers
        .iter()
        .filter(|answer| answer.correct == correct)
        .map(|answer| answer.answer_id)
        .collect()
}

async fn submit(
    state: &SharedState,
    player_id: u64,
    position: usize,
    ids: Vec<Uuid>,
) -> Result<(), ServiceError> {
    player_service::submit_answers(
        state,
        player_id,
        position,
        SubmitAnswersRequest { answer_ids: ids },
    )
    .await
}

#[tokio::test]
async fn lobby_auto_starts_when_threshold_reached() {
    let (state, token, quiz_id) = setup().await;
    let session_id = start(&state, token, quiz_id, 2).await;

    let first = join(&state, session_id, "First").await;
    assert_eq!(player_state(&state, first).await, SessionState::Lobby);

    let second = join(&state, session_id, "Second").await;
    assert_eq!(
        player_state(&state, second).await,
        SessionState::QuestionCountdown
    );

    // The session has left the lobby, so further joins are rejected.
    let err = player_service::join_session(
        &state,
        JoinSessionRequest {
            session_id,
            name: "TooLate".to_string(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidState(_)));
}

#[tokio::test(start_paused = true)]
async fn countdown_fires_after_three_seconds() {
    let (state, token, quiz_id) = setup().await;
    let session_id = start(&state, token, quiz_id, 1).await;
    let player = join(&state, session_id, "Hayden").await;

    assert_eq!(
        player_state(&state, player).await,
        SessionState::QuestionCountdown
    );

    tokio::time::sleep(Duration::from_millis(3100)).await;
    assert_eq!(player_state(&state, player).await, SessionState::QuestionOpen);
}

#[tokio::test(start_paused = true)]
async fn question_closes_when_duration_elapses() {
    let (state, token, quiz_id) = setup().await;
    let session_id = start(&state, token, quiz_id, 1).await;
    let player = join(&state, session_id, "Hayden").await;

    drive(&state, token, quiz_id, session_id, "SKIP_COUNTDOWN")
        .await
        .unwrap();
    assert_eq!(player_state(&state, player).await, SessionState::QuestionOpen);

    // Question duration is 4 seconds.
    tokio::time::sleep(Duration::from_millis(4100)).await;
    assert_eq!(
        player_state(&state, player).await,
        SessionState::QuestionClose
    );
}

#[tokio::test(start_paused = true)]
async fn end_cancels_pending_timer_for_good() {
    let (state, token, quiz_id) = setup().await;
    let session_id = start(&state, token, quiz_id, 1).await;
    let player = join(&state, session_id, "Hayden").await;

    // Countdown timer is armed; END must cancel it.
    drive(&state, token, quiz_id, session_id, "END").await.unwrap();
    assert_eq!(player_state(&state, player).await, SessionState::End);

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(player_state(&state, player).await, SessionState::End);

    // No action of any kind is accepted after END.
    for action in [
        "NEXT_QUESTION",
        "SKIP_COUNTDOWN",
        "GO_TO_ANSWER",
        "GO_TO_FINAL_RESULTS",
        "END",
    ] {
        let err = drive(&state, token, quiz_id, session_id, action)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }
}

#[tokio::test(start_paused = true)]
async fn skipping_countdown_rearms_the_duration_timer_once() {
    let (state, token, quiz_id) = setup().await;
    let session_id = start(&state, token, quiz_id, 1).await;
    let player = join(&state, session_id, "Hayden").await;

    // Skip immediately; the cancelled countdown must not open the question
    // a second time or interfere with the duration timer.
    drive(&state, token, quiz_id, session_id, "SKIP_COUNTDOWN")
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(3100)).await;
    assert_eq!(player_state(&state, player).await, SessionState::QuestionOpen);

    tokio::time::sleep(Duration::from_millis(1000)).await;
    assert_eq!(
        player_state(&state, player).await,
        SessionState::QuestionClose
    );
}

#[tokio::test(start_paused = true)]
async fn at_most_one_timer_is_ever_pending() {
    let (state, token, quiz_id) = setup().await;
    let session_id = start(&state, token, quiz_id, 1).await;
    join(&state, session_id, "Hayden").await;

    let handle = state.sessions().get(session_id).unwrap();

    // Countdown armed by the auto-start.
    assert!(handle.lock().await.has_pending_timer());

    // Skipping cancels the countdown and arms the duration timer: still one.
    drive(&state, token, quiz_id, session_id, "SKIP_COUNTDOWN")
        .await
        .unwrap();
    assert!(handle.lock().await.has_pending_timer());

    // Leaving the timed state clears the slot.
    drive(&state, token, quiz_id, session_id, "GO_TO_ANSWER")
        .await
        .unwrap();
    assert!(!handle.lock().await.has_pending_timer());

    drive(&state, token, quiz_id, session_id, "END").await.unwrap();
    assert!(!handle.lock().await.has_pending_timer());
}

#[tokio::test]
async fn single_player_full_session() {
    let (state, token, quiz_id) = setup().await;
    let session_id = start(&state, token, quiz_id, 1).await;
    let player = join(&state, session_id, "Hayden").await;

    drive(&state, token, quiz_id, session_id, "SKIP_COUNTDOWN")
        .await
        .unwrap();

    let correct = answer_ids(&state, token, quiz_id, true).await;
    submit(&state, player, 1, correct).await.unwrap();

    drive(&state, token, quiz_id, session_id, "GO_TO_ANSWER")
        .await
        .unwrap();

    let result = player_service::question_results(&state, player, 1)
        .await
        .unwrap();
    assert_eq!(result.percent_correct, 100);
    assert_eq!(result.players_correct_list, vec!["Hayden".to_string()]);

    drive(&state, token, quiz_id, session_id, "GO_TO_FINAL_RESULTS")
        .await
        .unwrap();

    let results = session_service::session_results(&state, token, quiz_id, session_id)
        .await
        .unwrap();
    assert_eq!(results.users_ranked_by_score.len(), 1);
    assert_eq!(results.users_ranked_by_score[0].name, "Hayden");
    assert!((results.users_ranked_by_score[0].score - 5.0).abs() < 1e-9);

    // The player sees the same ranking.
    let player_results = player_service::session_results(&state, player).await.unwrap();
    assert_eq!(player_results.users_ranked_by_score[0].name, "Hayden");
}

#[tokio::test]
async fn two_player_scoring_splits_points_by_rank() {
    let (state, token, quiz_id) = setup().await;
    let session_id = start(&state, token, quiz_id, 0).await;
    let x = join(&state, session_id, "X").await;
    let y = join(&state, session_id, "Y").await;

    drive(&state, token, quiz_id, session_id, "NEXT_QUESTION")
        .await
        .unwrap();
    drive(&state, token, quiz_id, session_id, "SKIP_COUNTDOWN")
        .await
        .unwrap();

    let correct = answer_ids(&state, token, quiz_id, true).await;
    submit(&state, x, 1, correct.clone()).await.unwrap();
    submit(&state, y, 1, correct).await.unwrap();

    drive(&state, token, quiz_id, session_id, "GO_TO_ANSWER")
        .await
        .unwrap();
    drive(&state, token, quiz_id, session_id, "GO_TO_FINAL_RESULTS")
        .await
        .unwrap();

    let results = session_service::session_results(&state, token, quiz_id, session_id)
        .await
        .unwrap();
    assert_eq!(results.users_ranked_by_score[0].name, "X");
    assert!((results.users_ranked_by_score[0].score - 5.0).abs() < 1e-9);
    assert_eq!(results.users_ranked_by_score[1].name, "Y");
    assert!((results.users_ranked_by_score[1].score - 2.5).abs() < 1e-9);
}

#[tokio::test]
async fn submission_rejected_outside_question_open() {
    let (state, token, quiz_id) = setup().await;
    let session_id = start(&state, token, quiz_id, 0).await;
    let player = join(&state, session_id, "Hayden").await;
    let correct = answer_ids(&state, token, quiz_id, true).await;

    // LOBBY.
    let err = submit(&state, player, 1, correct.clone()).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidState(_)));

    // QUESTION_COUNTDOWN.
    drive(&state, token, quiz_id, session_id, "NEXT_QUESTION")
        .await
        .unwrap();
    let err = submit(&state, player, 1, correct).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidState(_)));
}

#[tokio::test]
async fn resubmission_overwrites_before_close() {
    let (state, token, quiz_id) = setup().await;
    let session_id = start(&state, token, quiz_id, 1).await;
    let player = join(&state, session_id, "Hayden").await;

    drive(&state, token, quiz_id, session_id, "SKIP_COUNTDOWN")
        .await
        .unwrap();

    let wrong = answer_ids(&state, token, quiz_id, false).await;
    let correct = answer_ids(&state, token, quiz_id, true).await;
    submit(&state, player, 1, wrong).await.unwrap();
    // Last write wins.
    submit(&state, player, 1, correct).await.unwrap();

    drive(&state, token, quiz_id, session_id, "GO_TO_ANSWER")
        .await
        .unwrap();
    let result = player_service::question_results(&state, player, 1)
        .await
        .unwrap();
    assert_eq!(result.percent_correct, 100);
}

#[tokio::test]
async fn malformed_submissions_are_rejected() {
    let (state, token, quiz_id) = setup().await;
    let session_id = start(&state, token, quiz_id, 1).await;
    let player = join(&state, session_id, "Hayden").await;

    drive(&state, token, quiz_id, session_id, "SKIP_COUNTDOWN")
        .await
        .unwrap();
    let correct = answer_ids(&state, token, quiz_id, true).await;

    // Empty list.
    let err = submit(&state, player, 1, Vec::new()).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)));

    // Duplicates.
    let duplicated = vec![correct[0], correct[0]];
    let err = submit(&state, player, 1, duplicated).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)));

    // An id from outside the question's answer set.
    let err = submit(&state, player, 1, vec![Uuid::new_v4()]).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)));

    // A position the session is not at.
    let err = submit(&state, player, 2, correct).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)));
}

#[tokio::test]
async fn skip_countdown_rejected_while_question_open() {
    let (state, token, quiz_id) = setup().await;
    let session_id = start(&state, token, quiz_id, 1).await;
    join(&state, session_id, "Hayden").await;

    drive(&state, token, quiz_id, session_id, "SKIP_COUNTDOWN")
        .await
        .unwrap();
    let err = drive(&state, token, quiz_id, session_id, "SKIP_COUNTDOWN")
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidState(_)));
}

#[tokio::test]
async fn unknown_action_is_rejected_in_any_state() {
    let (state, token, quiz_id) = setup().await;
    let session_id = start(&state, token, quiz_id, 0).await;

    let err = drive(&state, token, quiz_id, session_id, "DO_A_BARREL_ROLL")
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)));
}

#[tokio::test]
async fn generated_player_names_are_unique_and_well_formed() {
    let (state, token, quiz_id) = setup().await;
    let session_id = start(&state, token, quiz_id, 0).await;

    join(&state, session_id, "").await;
    join(&state, session_id, "").await;

    let status = session_service::session_status(&state, token, quiz_id, session_id)
        .await
        .unwrap();
    assert_eq!(status.players.len(), 2);
    assert_ne!(status.players[0], status.players[1]);

    for name in &status.players {
        assert_eq!(name.len(), 8);
        assert!(name[..5].chars().all(|c| c.is_ascii_lowercase()));
        assert!(name[5..].chars().all(|c| c.is_ascii_digit()));
    }
}

#[tokio::test]
async fn duplicate_name_join_is_rejected() {
    let (state, token, quiz_id) = setup().await;
    let session_id = start(&state, token, quiz_id, 0).await;

    join(&state, session_id, "Hayden").await;
    let err = player_service::join_session(
        &state,
        JoinSessionRequest {
            session_id,
            name: "Hayden".to_string(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)));
}

#[tokio::test]
async fn results_are_gated_on_session_state() {
    let (state, token, quiz_id) = setup().await;
    let session_id = start(&state, token, quiz_id, 1).await;
    let player = join(&state, session_id, "Hayden").await;

    drive(&state, token, quiz_id, session_id, "SKIP_COUNTDOWN")
        .await
        .unwrap();

    // Question results require ANSWER_SHOW.
    let err = player_service::question_results(&state, player, 1)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidState(_)));

    // Final results require FINAL_RESULTS.
    let err = session_service::session_results(&state, token, quiz_id, session_id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidState(_)));
    let err = player_service::session_results(&state, player).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidState(_)));
}

#[tokio::test]
async fn next_question_beyond_the_last_is_rejected() {
    let (state, token, quiz_id) = setup().await;
    let session_id = start(&state, token, quiz_id, 1).await;
    join(&state, session_id, "Hayden").await;

    drive(&state, token, quiz_id, session_id, "SKIP_COUNTDOWN")
        .await
        .unwrap();
    drive(&state, token, quiz_id, session_id, "GO_TO_ANSWER")
        .await
        .unwrap();

    // One-question quiz: there is nothing to advance to.
    let err = drive(&state, token, quiz_id, session_id, "NEXT_QUESTION")
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidState(_)));
}

#[tokio::test]
async fn status_reads_do_not_mutate_the_session() {
    let (state, token, quiz_id) = setup().await;
    let session_id = start(&state, token, quiz_id, 0).await;
    let player = join(&state, session_id, "Hayden").await;

    let before = session_service::session_status(&state, token, quiz_id, session_id)
        .await
        .unwrap();
    player_service::player_status(&state, player).await.unwrap();
    let after = session_service::session_status(&state, token, quiz_id, session_id)
        .await
        .unwrap();

    assert_eq!(before.state, after.state);
    assert_eq!(before.at_question, after.at_question);
    assert_eq!(before.players, after.players);
    assert_eq!(before.at_question, -1);
}

#[tokio::test]
async fn session_runs_on_a_snapshot_insulated_from_quiz_edits() {
    let (state, token, quiz_id) = setup().await;
    let session_id = start(&state, token, quiz_id, 0).await;
    let player = join(&state, session_id, "Hayden").await;

    // Add a second question to the live quiz after session start.
    add_question(&state, token, quiz_id, 10, 7).await;

    let status = player_service::player_status(&state, player).await.unwrap();
    assert_eq!(status.num_questions, 1);
}

#[tokio::test]
async fn transferred_quiz_locks_out_the_previous_owner() {
    let (state, token, quiz_id) = setup().await;
    let session_id = start(&state, token, quiz_id, 0).await;

    register(&state, "successor@example.com").await;
    quiz_service::transfer_owner(&state, token, quiz_id, "successor@example.com".to_string())
        .await
        .unwrap();

    let err = drive(&state, token, quiz_id, session_id, "NEXT_QUESTION")
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));
}

#[tokio::test]
async fn session_start_enforces_limits() {
    let (state, token, quiz_id) = setup().await;

    // Auto-start cap.
    let err = session_service::start_session(
        &state,
        token,
        quiz_id,
        StartSessionRequest { auto_start_num: 51 },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)));

    // A quiz without questions cannot run.
    let empty_quiz = quiz_service::create_quiz(
        &state,
        token,
        CreateQuizRequest {
            name: "Empty Quiz".to_string(),
            description: String::new(),
        },
    )
    .await
    .unwrap();
    let err = session_service::start_session(
        &state,
        token,
        empty_quiz.quiz_id,
        StartSessionRequest { auto_start_num: 0 },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)));
}

#[tokio::test]
async fn csv_export_lists_per_question_scores_and_ranks() {
    let dir = tempfile::tempdir().unwrap();
    let state = AppState::new(AppConfig::for_tests(dir.path().to_path_buf()));
    let token = register(&state, "host@example.com").await;
    let quiz = quiz_service::create_quiz(
        &state,
        token,
        CreateQuizRequest {
            name: "Trivia Night".to_string(),
            description: String::new(),
        },
    )
    .await
    .unwrap();
    add_question(&state, token, quiz.quiz_id, 4, 5).await;

    let session_id = start(&state, token, quiz.quiz_id, 0).await;
    let x = join(&state, session_id, "X").await;
    let y = join(&state, session_id, "Y").await;

    drive(&state, token, quiz.quiz_id, session_id, "NEXT_QUESTION")
        .await
        .unwrap();
    drive(&state, token, quiz.quiz_id, session_id, "SKIP_COUNTDOWN")
        .await
        .unwrap();
    let correct = answer_ids(&state, token, quiz.quiz_id, true).await;
    submit(&state, x, 1, correct.clone()).await.unwrap();
    submit(&state, y, 1, correct).await.unwrap();
    drive(&state, token, quiz.quiz_id, session_id, "GO_TO_ANSWER")
        .await
        .unwrap();
    drive(&state, token, quiz.quiz_id, session_id, "GO_TO_FINAL_RESULTS")
        .await
        .unwrap();

    let link = session_service::session_results_csv(&state, token, quiz.quiz_id, session_id)
        .await
        .unwrap();
    assert!(link.url.ends_with(&format!("quiz_final_results_{session_id}.csv")));

    let contents = std::fs::read_to_string(
        dir.path().join(format!("quiz_final_results_{session_id}.csv")),
    )
    .unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines, vec!["X,5,1", "Y,2.5,2"]);
}
