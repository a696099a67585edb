//! Integration tests exercising the HTTP surface end to end.

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use quizdeck_back::{
    config::AppConfig,
    routes,
    state::AppState,
};
use serde_json::{Value, json};

fn server() -> TestServer {
    let state = AppState::new(AppConfig::for_tests(
        std::env::temp_dir().join("quizdeck-api-tests"),
    ));
    TestServer::new(routes::router(state)).unwrap()
}

fn token_header(token: &str) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("token"),
        HeaderValue::from_str(token).unwrap(),
    )
}

async fn register(server: &TestServer, email: &str) -> String {
    let response = server
        .post("/v1/admin/auth/register")
        .json(&json!({
            "email": email,
            "password": "abcd1234",
            "nameFirst": "Quiz",
            "nameLast": "Host",
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    response.json::<Value>()["token"].as_str().unwrap().to_string()
}

async fn create_quiz(server: &TestServer, token: &str, name: &str) -> String {
    let (header, value) = token_header(token);
    let response = server
        .post("/v1/admin/quiz")
        .add_header(header, value)
        .json(&json!({ "name": name, "description": "A quiz" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    response.json::<Value>()["quizId"].as_str().unwrap().to_string()
}

async fn add_question(server: &TestServer, token: &str, quiz_id: &str) {
    let (header, value) = token_header(token);
    let response = server
        .post(&format!("/v1/admin/quiz/{quiz_id}/question"))
        .add_header(header, value)
        .json(&json!({
            "questionBody": {
                "question": "Best systems language?",
                "duration": 4,
                "points": 5,
                "answers": [
                    { "answer": "Rust", "correct": true },
                    { "answer": "COBOL", "correct": false },
                ],
            }
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn healthcheck_reports_ok() {
    let server = server();
    let response = server.get("/healthcheck").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["status"], "ok");
}

#[tokio::test]
async fn register_rejects_bad_input() {
    let server = server();

    let response = server
        .post("/v1/admin/auth/register")
        .json(&json!({
            "email": "not-an-email",
            "password": "abcd1234",
            "nameFirst": "Quiz",
            "nameLast": "Host",
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    register(&server, "host@example.com").await;
    let response = server
        .post("/v1/admin/auth/register")
        .json(&json!({
            "email": "host@example.com",
            "password": "abcd1234",
            "nameFirst": "Quiz",
            "nameLast": "Host",
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_and_logout_lifecycle() {
    let server = server();
    register(&server, "host@example.com").await;

    let response = server
        .post("/v1/admin/auth/login")
        .json(&json!({ "email": "host@example.com", "password": "wrong000" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let response = server
        .post("/v1/admin/auth/login")
        .json(&json!({ "email": "host@example.com", "password": "abcd1234" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let token = response.json::<Value>()["token"].as_str().unwrap().to_string();

    let details = server
        .get("/v1/admin/user/details")
        .add_header(token_header(&token).0, token_header(&token).1)
        .await;
    assert_eq!(details.status_code(), StatusCode::OK);
    let body = details.json::<Value>();
    assert_eq!(body["user"]["name"], "Quiz Host");
    // Registration plus this login.
    assert_eq!(body["user"]["numSuccessfulLogins"], 2);

    let logout = server
        .post("/v1/admin/auth/logout")
        .add_header(token_header(&token).0, token_header(&token).1)
        .await;
    assert_eq!(logout.status_code(), StatusCode::OK);

    let after = server
        .get("/v1/admin/user/details")
        .add_header(token_header(&token).0, token_header(&token).1)
        .await;
    assert_eq!(after.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn missing_token_header_is_unauthorized() {
    let server = server();
    let response = server.get("/v1/admin/quiz/list").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn quiz_management_round_trip() {
    let server = server();
    let token = register(&server, "host@example.com").await;
    let quiz_id = create_quiz(&server, &token, "Trivia Night").await;

    let list = server
        .get("/v1/admin/quiz/list")
        .add_header(token_header(&token).0, token_header(&token).1)
        .await;
    assert_eq!(list.json::<Value>()["quizzes"][0]["name"], "Trivia Night");

    let (header, value) = token_header(&token);
    let rename = server
        .put(&format!("/v1/admin/quiz/{quiz_id}/name"))
        .add_header(header, value)
        .json(&json!({ "name": "Harder Trivia" }))
        .await;
    assert_eq!(rename.status_code(), StatusCode::OK);

    add_question(&server, &token, &quiz_id).await;
    let info = server
        .get(&format!("/v1/admin/quiz/{quiz_id}"))
        .add_header(token_header(&token).0, token_header(&token).1)
        .await;
    let body = info.json::<Value>();
    assert_eq!(body["name"], "Harder Trivia");
    assert_eq!(body["numQuestions"], 1);
    assert_eq!(body["duration"], 4);

    // Remove, see it in the trash, restore it.
    let remove = server
        .delete(&format!("/v1/admin/quiz/{quiz_id}"))
        .add_header(token_header(&token).0, token_header(&token).1)
        .await;
    assert_eq!(remove.status_code(), StatusCode::OK);

    let trash = server
        .get("/v1/admin/quiz/trash")
        .add_header(token_header(&token).0, token_header(&token).1)
        .await;
    assert_eq!(trash.json::<Value>()["quizzes"][0]["name"], "Harder Trivia");

    let restore = server
        .post(&format!("/v1/admin/quiz/{quiz_id}/restore"))
        .add_header(token_header(&token).0, token_header(&token).1)
        .await;
    assert_eq!(restore.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn foreign_quiz_access_is_forbidden() {
    let server = server();
    let owner = register(&server, "owner@example.com").await;
    let other = register(&server, "other@example.com").await;
    let quiz_id = create_quiz(&server, &owner, "Private Quiz").await;

    let response = server
        .get(&format!("/v1/admin/quiz/{quiz_id}"))
        .add_header(token_header(&other).0, token_header(&other).1)
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn full_session_over_http() {
    let server = server();
    let token = register(&server, "host@example.com").await;
    let quiz_id = create_quiz(&server, &token, "Trivia Night").await;
    add_question(&server, &token, &quiz_id).await;

    let (header, value) = token_header(&token);
    let start = server
        .post(&format!("/v1/admin/quiz/{quiz_id}/session/start"))
        .add_header(header, value)
        .json(&json!({ "autoStartNum": 1 }))
        .await;
    assert_eq!(start.status_code(), StatusCode::OK);
    let session_id = start.json::<Value>()["sessionId"].as_str().unwrap().to_string();

    let join = server
        .post("/v1/player/join")
        .json(&json!({ "sessionId": session_id, "name": "Hayden" }))
        .await;
    assert_eq!(join.status_code(), StatusCode::OK);
    let player_id = join.json::<Value>()["playerId"].as_u64().unwrap();

    // One player fills the lobby: the session auto-started.
    let status = server
        .get(&format!("/v1/admin/quiz/{quiz_id}/session/{session_id}"))
        .add_header(token_header(&token).0, token_header(&token).1)
        .await;
    let body = status.json::<Value>();
    assert_eq!(body["state"], "QUESTION_COUNTDOWN");
    assert_eq!(body["atQuestion"], 0);
    assert_eq!(body["players"][0], "Hayden");

    let (header, value) = token_header(&token);
    let skip = server
        .put(&format!("/v1/admin/quiz/{quiz_id}/session/{session_id}"))
        .add_header(header, value)
        .json(&json!({ "action": "SKIP_COUNTDOWN" }))
        .await;
    assert_eq!(skip.status_code(), StatusCode::OK);

    // Player-facing question info withholds correctness.
    let info = server
        .get(&format!("/v1/player/{player_id}/question/1"))
        .await;
    assert_eq!(info.status_code(), StatusCode::OK);
    let question = info.json::<Value>();
    assert!(question["answers"][0].get("correct").is_none());

    // Find the correct answer id through the owner view.
    let owner_info = server
        .get(&format!("/v1/admin/quiz/{quiz_id}"))
        .add_header(token_header(&token).0, token_header(&token).1)
        .await;
    let owner_body = owner_info.json::<Value>();
    let correct_id = owner_body["questions"][0]["answers"]
        .as_array()
        .unwrap()
        .iter()
        .find(|answer| answer["correct"] == true)
        .unwrap()["answerId"]
        .as_str()
        .unwrap()
        .to_string();

    let submit = server
        .put(&format!("/v1/player/{player_id}/question/1/answer"))
        .json(&json!({ "answerIds": [correct_id] }))
        .await;
    assert_eq!(submit.status_code(), StatusCode::OK);

    let (header, value) = token_header(&token);
    let to_answer = server
        .put(&format!("/v1/admin/quiz/{quiz_id}/session/{session_id}"))
        .add_header(header, value)
        .json(&json!({ "action": "GO_TO_ANSWER" }))
        .await;
    assert_eq!(to_answer.status_code(), StatusCode::OK);

    let question_results = server
        .get(&format!("/v1/player/{player_id}/question/1/results"))
        .await;
    let results_body = question_results.json::<Value>();
    assert_eq!(results_body["percentCorrect"], 100);
    assert_eq!(results_body["playersCorrectList"][0], "Hayden");

    let (header, value) = token_header(&token);
    let to_final = server
        .put(&format!("/v1/admin/quiz/{quiz_id}/session/{session_id}"))
        .add_header(header, value)
        .json(&json!({ "action": "GO_TO_FINAL_RESULTS" }))
        .await;
    assert_eq!(to_final.status_code(), StatusCode::OK);

    let final_results = server
        .get(&format!(
            "/v1/admin/quiz/{quiz_id}/session/{session_id}/results"
        ))
        .add_header(token_header(&token).0, token_header(&token).1)
        .await;
    let final_body = final_results.json::<Value>();
    assert_eq!(final_body["usersRankedByScore"][0]["name"], "Hayden");
    assert_eq!(final_body["usersRankedByScore"][0]["score"], 5.0);

    let csv = server
        .get(&format!(
            "/v1/admin/quiz/{quiz_id}/session/{session_id}/results/csv"
        ))
        .add_header(token_header(&token).0, token_header(&token).1)
        .await;
    assert_eq!(csv.status_code(), StatusCode::OK);
    let url = csv.json::<Value>()["url"].as_str().unwrap().to_string();
    assert!(url.contains(&format!("quiz_final_results_{session_id}.csv")));
}

#[tokio::test]
async fn invalid_action_over_http_is_bad_request() {
    let server = server();
    let token = register(&server, "host@example.com").await;
    let quiz_id = create_quiz(&server, &token, "Trivia Night").await;
    add_question(&server, &token, &quiz_id).await;

    let (header, value) = token_header(&token);
    let start = server
        .post(&format!("/v1/admin/quiz/{quiz_id}/session/start"))
        .add_header(header, value)
        .json(&json!({ "autoStartNum": 0 }))
        .await;
    let session_id = start.json::<Value>()["sessionId"].as_str().unwrap().to_string();

    let (header, value) = token_header(&token);
    let response = server
        .put(&format!("/v1/admin/quiz/{quiz_id}/session/{session_id}"))
        .add_header(header, value)
        .json(&json!({ "action": "NOT_AN_ACTION" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn clear_wipes_all_state() {
    let server = server();
    let token = register(&server, "host@example.com").await;

    let response = server.delete("/v1/clear").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let after = server
        .get("/v1/admin/quiz/list")
        .add_header(token_header(&token).0, token_header(&token).1)
        .await;
    assert_eq!(after.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn chat_round_trip() {
    let server = server();
    let token = register(&server, "host@example.com").await;
    let quiz_id = create_quiz(&server, &token, "Trivia Night").await;
    add_question(&server, &token, &quiz_id).await;

    let (header, value) = token_header(&token);
    let start = server
        .post(&format!("/v1/admin/quiz/{quiz_id}/session/start"))
        .add_header(header, value)
        .json(&json!({ "autoStartNum": 0 }))
        .await;
    let session_id = start.json::<Value>()["sessionId"].as_str().unwrap().to_string();

    let join = server
        .post("/v1/player/join")
        .json(&json!({ "sessionId": session_id, "name": "Hayden" }))
        .await;
    let player_id = join.json::<Value>()["playerId"].as_u64().unwrap();

    let send = server
        .post(&format!("/v1/player/{player_id}/chat"))
        .json(&json!({ "message": { "messageBody": "good luck all" } }))
        .await;
    assert_eq!(send.status_code(), StatusCode::OK);

    let empty = server
        .post(&format!("/v1/player/{player_id}/chat"))
        .json(&json!({ "message": { "messageBody": "   " } }))
        .await;
    assert_eq!(empty.status_code(), StatusCode::BAD_REQUEST);

    let view = server.get(&format!("/v1/player/{player_id}/chat")).await;
    let body = view.json::<Value>();
    assert_eq!(body["messages"][0]["messageBody"], "good luck all");
    assert_eq!(body["messages"][0]["playerName"], "Hayden");
}
