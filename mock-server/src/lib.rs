//! In-memory stand-in for the StepUp service, used by the core crate's
//! integration tests and runnable standalone for manual poking.
//!
//! Implements the two endpoints the client consumes and reproduces the
//! service's wire quirks: required credential headers, percent-encoded
//! `dateTime` strings, and the `leaderbord` response field. DTOs are
//! defined independently from the client crate; the integration tests
//! catch schema drift between the two.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

/// A recorded social expression.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Poke {
    pub action: String,
    pub id: String,
    #[serde(rename = "type")]
    pub recipient_type: String,
    pub message: String,
}

/// Query parameters of an activity submission.
#[derive(Debug, Deserialize)]
pub struct ActivityParams {
    pub steps: u64,
    pub calories: f64,
    pub distance: f64,
    #[serde(default)]
    pub bg: bool,
}

/// Body of an activity submission. Both sections are echoed client state;
/// the real service tolerates their absence.
#[derive(Debug, Deserialize)]
pub struct ActivityBody {
    #[serde(default)]
    pub history: Vec<Value>,
    #[serde(default)]
    pub leaderboard: Vec<Value>,
}

/// Latest metrics submitted by one user.
#[derive(Clone, Debug)]
struct Score {
    steps: u64,
    calories: f64,
    distance: f64,
}

#[derive(Default)]
pub struct ServerState {
    pokes: Vec<Poke>,
    scores: HashMap<String, Score>,
}

pub type Db = Arc<RwLock<ServerState>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(ServerState::default()));
    Router::new()
        .route("/poke/{suffix}", post(poke))
        .route("/activity/v2/{suffix}", post(activity))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Extract the credential headers every endpoint requires. The values are
/// not verified, only required to be present, matching the fixture's role
/// as a schema-faithful stand-in.
fn credentials(headers: &HeaderMap) -> Option<(String, String, String)> {
    let get = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };
    Some((get("userid")?, get("usertoken")?, get("usertype")?))
}

async fn poke(
    State(db): State<Db>,
    Path(_suffix): Path<String>,
    headers: HeaderMap,
    Json(input): Json<Poke>,
) -> Result<StatusCode, (StatusCode, String)> {
    if credentials(&headers).is_none() {
        return Err((StatusCode::UNAUTHORIZED, "missing credentials".to_string()));
    }
    if !matches!(input.action.as_str(), "nudge" | "cheer" | "taunt") {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("unknown action: {}", input.action),
        ));
    }
    db.write().await.pokes.push(input);
    Ok(StatusCode::OK)
}

async fn activity(
    State(db): State<Db>,
    Path(_suffix): Path<String>,
    Query(params): Query<ActivityParams>,
    headers: HeaderMap,
    Json(_body): Json<ActivityBody>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let (user_id, _, _) = match credentials(&headers) {
        Some(creds) => creds,
        None => return Err((StatusCode::UNAUTHORIZED, "missing credentials".to_string())),
    };

    let mut state = db.write().await;
    state.scores.insert(
        user_id,
        Score {
            steps: params.steps,
            calories: params.calories,
            distance: params.distance,
        },
    );

    // Today's board over everything submitted so far. dateTime goes out
    // percent-encoded, the way the real service sends it.
    let midnight = Utc::now().format("%Y-%m-%dT00:00:00").to_string();
    let date_time = urlencoding::encode(&midnight).into_owned();
    let date = Utc::now().format("%Y-%m-%d").to_string();

    let mut data: Vec<Value> = Vec::new();
    let mut total_steps = 0u64;
    for (id, score) in &state.scores {
        total_steps += score.steps;
        data.push(json!({
            "id": id,
            "steps": score.steps,
            "calories": score.calories,
            "distance": score.distance,
            "isFinal": false,
            "dateTime": date_time,
        }));
    }

    let users: Vec<Value> = state
        .scores
        .keys()
        .map(|id| {
            json!({
                "id": id,
                "firstName": "Step",
                "lastName": id.clone(),
                "type": "google",
            })
        })
        .collect();

    Ok(Json(json!({
        "leaderbord": [{
            "day": "today",
            "date": date,
            "data": data,
            "totalSteps": total_steps,
        }],
        "unreadAlertsCount": state.pokes.len(),
        "userGroups": [{ "id": "group-1", "name": "Step Friends", "role": "admin" }],
        "users": users,
    })))
}
