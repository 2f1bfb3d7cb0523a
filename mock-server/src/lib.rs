//! Fixture backend for exercising a REST client over real HTTP.
//!
//! Serves one route per response shape a client has to handle: plain text,
//! raw bytes, JSON echo of the request, a small notes collection, arbitrary
//! failing statuses, and a token-protected resource.

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Note {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub body: String,
}

#[derive(Deserialize)]
pub struct NewNote {
    pub title: String,
    #[serde(default)]
    pub body: String,
}

/// What `/echo` saw of the incoming request.
#[derive(Debug, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub headers: BTreeMap<String, String>,
    pub query: BTreeMap<String, String>,
    pub body: String,
}

pub type Db = Arc<RwLock<HashMap<Uuid, Note>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/sample", get(sample))
        .route("/binary", get(binary))
        .route("/echo", any(echo))
        .route("/me", get(me))
        .route("/status/{code}", get(status))
        .route("/notes", get(list_notes).post(create_note))
        .route("/notes/{id}", get(get_note).put(replace_note).delete(delete_note))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "mock server ready");
    }
    axum::serve(listener, app()).await
}

async fn sample() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/plain")], "get-request")
}

async fn binary() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/octet-stream")],
        Bytes::from_static(&[0xde, 0xad, 0xbe, 0xef]),
    )
}

async fn echo(
    method: Method,
    headers: HeaderMap,
    Query(query): Query<BTreeMap<String, String>>,
    body: String,
) -> Json<Echo> {
    let headers = headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect();
    Json(Echo {
        method: method.as_str().to_string(),
        headers,
        query,
        body,
    })
}

async fn me(headers: HeaderMap) -> Response {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Token "));
    match token {
        Some(token) => Json(json!({ "token": token })).into_response(),
        None => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "missing token" })),
        )
            .into_response(),
    }
}

async fn status(Path(code): Path<u16>) -> Response {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST);
    (
        status,
        [(header::CONTENT_TYPE, "text/plain")],
        format!("status {}", status.as_u16()),
    )
        .into_response()
}

fn note_not_found() -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "note not found" })))
}

async fn list_notes(State(db): State<Db>) -> Json<Vec<Note>> {
    let notes = db.read().await;
    Json(notes.values().cloned().collect())
}

async fn create_note(State(db): State<Db>, Json(input): Json<NewNote>) -> (StatusCode, Json<Note>) {
    let note = Note {
        id: Uuid::new_v4(),
        title: input.title,
        body: input.body,
    };
    db.write().await.insert(note.id, note.clone());
    (StatusCode::CREATED, Json(note))
}

async fn get_note(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
) -> Result<Json<Note>, (StatusCode, Json<serde_json::Value>)> {
    let notes = db.read().await;
    notes.get(&id).cloned().map(Json).ok_or_else(note_not_found)
}

async fn replace_note(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    Json(input): Json<NewNote>,
) -> Result<Json<Note>, (StatusCode, Json<serde_json::Value>)> {
    let mut notes = db.write().await;
    let note = notes.get_mut(&id).ok_or_else(note_not_found)?;
    note.title = input.title;
    note.body = input.body;
    Ok(Json(note.clone()))
}

async fn delete_note(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, Json<serde_json::Value>)> {
    let mut notes = db.write().await;
    notes
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(note_not_found)
}
