use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const APPCODE_HEADER: &str = "x-appcode";
pub const SESSION_HEADER: &str = "x-session";

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionInfo {
    pub username: String,
    pub session: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    pub username: String,
}

#[derive(Debug, Default)]
pub struct Backend {
    app_code: String,
    users: HashMap<String, String>,
    sessions: HashMap<String, String>,
    documents: HashMap<(String, Uuid), Value>,
}

pub type Db = Arc<RwLock<Backend>>;

type Reply = (StatusCode, Json<Value>);

pub fn app(app_code: &str) -> Router {
    let db: Db = Arc::new(RwLock::new(Backend {
        app_code: app_code.to_string(),
        ..Backend::default()
    }));
    Router::new()
        .route("/user", post(signup))
        .route("/user/login", post(login))
        .route("/user/me", get(me))
        .route("/echo/headers", get(echo_headers))
        .route("/document/{collection}", post(create_document))
        .route(
            "/document/{collection}/{id}",
            get(get_document).put(update_document),
        )
        .route_layer(middleware::from_fn_with_state(db.clone(), require_appcode))
        .with_state(db)
}

pub async fn run(listener: TcpListener, app_code: &str) -> Result<(), std::io::Error> {
    axum::serve(listener, app(app_code)).await
}

/// Success body in the backend's envelope format.
pub fn ok(status: StatusCode, data: Value) -> Reply {
    (
        status,
        Json(json!({ "result": "ok", "data": data, "http_code": status.as_u16() })),
    )
}

pub fn failure(status: StatusCode, message: &str) -> Reply {
    (
        status,
        Json(json!({ "result": "error", "message": message, "http_code": status.as_u16() })),
    )
}

async fn require_appcode(State(db): State<Db>, request: Request, next: Next) -> Response {
    let expected = db.read().await.app_code.clone();
    let presented = request
        .headers()
        .get(APPCODE_HEADER)
        .and_then(|v| v.to_str().ok());
    if presented != Some(expected.as_str()) {
        tracing::debug!(uri = %request.uri(), "rejecting request with bad app code");
        return failure(StatusCode::UNAUTHORIZED, "invalid app code").into_response();
    }
    next.run(request).await
}

fn session_user(backend: &Backend, headers: &HeaderMap) -> Result<String, Reply> {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|token| backend.sessions.get(token))
        .cloned()
        .ok_or_else(|| failure(StatusCode::UNAUTHORIZED, "missing or expired session"))
}

fn open_session(backend: &mut Backend, username: &str) -> SessionInfo {
    let session = Uuid::new_v4().to_string();
    backend.sessions.insert(session.clone(), username.to_string());
    SessionInfo {
        username: username.to_string(),
        session,
    }
}

fn to_data<T: Serialize>(value: &T) -> Result<Value, Reply> {
    serde_json::to_value(value).map_err(|e| {
        tracing::error!(error = %e, "response payload did not serialize");
        failure(StatusCode::INTERNAL_SERVER_ERROR, "response payload did not serialize")
    })
}

async fn signup(State(db): State<Db>, Json(input): Json<Credentials>) -> Result<Reply, Reply> {
    let mut backend = db.write().await;
    if backend.users.contains_key(&input.username) {
        return Err(failure(StatusCode::CONFLICT, "user already exists"));
    }
    backend
        .users
        .insert(input.username.clone(), input.password);
    let info = open_session(&mut backend, &input.username);
    Ok(ok(StatusCode::CREATED, to_data(&info)?))
}

async fn login(State(db): State<Db>, Json(input): Json<Credentials>) -> Result<Reply, Reply> {
    let mut backend = db.write().await;
    if backend.users.get(&input.username) != Some(&input.password) {
        return Err(failure(StatusCode::UNAUTHORIZED, "invalid credentials"));
    }
    let info = open_session(&mut backend, &input.username);
    Ok(ok(StatusCode::OK, to_data(&info)?))
}

async fn me(State(db): State<Db>, headers: HeaderMap) -> Result<Reply, Reply> {
    let backend = db.read().await;
    let username = session_user(&backend, &headers)?;
    Ok(ok(StatusCode::OK, to_data(&Profile { username })?))
}

/// Request headers as a lowercase-name → value map.
async fn echo_headers(headers: HeaderMap) -> Reply {
    let echoed: serde_json::Map<String, Value> = headers
        .iter()
        .filter_map(|(name, value)| {
            let value = value.to_str().ok()?;
            Some((name.as_str().to_string(), Value::String(value.to_string())))
        })
        .collect();
    ok(StatusCode::OK, Value::Object(echoed))
}

async fn create_document(
    State(db): State<Db>,
    Path(collection): Path<String>,
    headers: HeaderMap,
    Json(input): Json<Value>,
) -> Result<Reply, Reply> {
    let mut backend = db.write().await;
    session_user(&backend, &headers)?;
    let Value::Object(mut fields) = input else {
        return Err(failure(StatusCode::BAD_REQUEST, "document must be a JSON object"));
    };
    let id = Uuid::new_v4();
    fields.insert("id".to_string(), Value::String(id.to_string()));
    let document = Value::Object(fields);
    backend.documents.insert((collection, id), document.clone());
    Ok(ok(StatusCode::CREATED, document))
}

async fn get_document(
    State(db): State<Db>,
    Path((collection, id)): Path<(String, Uuid)>,
    headers: HeaderMap,
) -> Result<Reply, Reply> {
    let backend = db.read().await;
    session_user(&backend, &headers)?;
    backend
        .documents
        .get(&(collection, id))
        .cloned()
        .map(|document| ok(StatusCode::OK, document))
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "document not found"))
}

async fn update_document(
    State(db): State<Db>,
    Path((collection, id)): Path<(String, Uuid)>,
    headers: HeaderMap,
    Json(input): Json<Value>,
) -> Result<Reply, Reply> {
    let mut backend = db.write().await;
    session_user(&backend, &headers)?;
    let Value::Object(mut fields) = input else {
        return Err(failure(StatusCode::BAD_REQUEST, "document must be a JSON object"));
    };
    let slot = backend
        .documents
        .get_mut(&(collection, id))
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "document not found"))?;
    fields.insert("id".to_string(), Value::String(id.to_string()));
    *slot = Value::Object(fields);
    Ok(ok(StatusCode::OK, slot.clone()))
}
