use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::app;
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn authed_request(uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .header("userid", "user-1")
        .header("usertoken", "token-1")
        .header("usertype", "google")
        .body(body.to_string())
        .unwrap()
}

fn anonymous_request(uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

const POKE_URI: &str = "/poke/test-suffix";
const ACTIVITY_URI: &str =
    "/activity/v2/test-suffix?steps=12000&calories=500.0&distance=8.5&bg=false";

// --- poke ---

#[tokio::test]
async fn poke_records_expression() {
    let app = app();
    let resp = app
        .oneshot(authed_request(
            POKE_URI,
            r#"{"action":"cheer","id":"user-2","type":"google","message":"go!"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn poke_without_credentials_returns_401() {
    let app = app();
    let resp = app
        .oneshot(anonymous_request(
            POKE_URI,
            r#"{"action":"cheer","id":"user-2","type":"google","message":"go!"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_text(resp).await, "missing credentials");
}

#[tokio::test]
async fn poke_unknown_action_returns_400() {
    let app = app();
    let resp = app
        .oneshot(authed_request(
            POKE_URI,
            r#"{"action":"shove","id":"user-2","type":"google","message":"?"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(resp).await, "unknown action: shove");
}

#[tokio::test]
async fn poke_malformed_json_returns_422() {
    let app = app();
    let resp = app
        .oneshot(authed_request(POKE_URI, r#"{"action":"cheer"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// --- activity ---

#[tokio::test]
async fn activity_without_credentials_returns_401() {
    let app = app();
    let resp = app
        .oneshot(anonymous_request(ACTIVITY_URI, r#"{"history":[],"leaderboard":[]}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn activity_missing_query_returns_400() {
    let app = app();
    let resp = app
        .oneshot(authed_request(
            "/activity/v2/test-suffix",
            r#"{"history":[],"leaderboard":[]}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn activity_reflects_submission_on_the_leaderboard() {
    let app = app();
    let resp = app
        .oneshot(authed_request(ACTIVITY_URI, r#"{"history":[],"leaderboard":[]}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let summary: serde_json::Value = body_json(resp).await;

    let board = &summary["leaderbord"][0];
    assert_eq!(board["day"], "today");
    assert_eq!(board["totalSteps"], 12000);
    assert_eq!(board["data"][0]["id"], "user-1");
    assert_eq!(board["data"][0]["steps"], 12000);

    // The service percent-encodes dateTime; the fixture must too.
    let date_time = board["data"][0]["dateTime"].as_str().unwrap();
    assert!(date_time.contains("%3A"), "{date_time}");

    assert_eq!(summary["unreadAlertsCount"], 0);
    assert_eq!(summary["userGroups"][0]["role"], "admin");
    assert_eq!(summary["users"][0]["type"], "google");
}

// --- stateful sequences ---

#[tokio::test]
async fn activity_latest_submission_wins() {
    use tower::Service;

    let mut app = app().into_service();

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(authed_request(
            "/activity/v2/test-suffix?steps=1000&calories=40.0&distance=0.8&bg=false",
            r#"{"history":[],"leaderboard":[]}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(authed_request(
            "/activity/v2/test-suffix?steps=2500&calories=90.0&distance=2.0&bg=false",
            r#"{"history":[],"leaderboard":[]}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let summary: serde_json::Value = body_json(resp).await;
    let board = &summary["leaderbord"][0];
    // One entry per user, not per submission.
    assert_eq!(board["data"].as_array().unwrap().len(), 1);
    assert_eq!(board["totalSteps"], 2500);
}

#[tokio::test]
async fn pokes_surface_as_unread_alerts() {
    use tower::Service;

    let mut app = app().into_service();

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(authed_request(
            POKE_URI,
            r#"{"action":"taunt","id":"user-2","type":"google","message":"catch me"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(authed_request(ACTIVITY_URI, r#"{"history":[],"leaderboard":[]}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let summary: serde_json::Value = body_json(resp).await;
    assert_eq!(summary["unreadAlertsCount"], 1);
}
