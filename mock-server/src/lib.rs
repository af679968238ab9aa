use std::{
    collections::HashMap,
    io::{Cursor, Write},
    sync::Arc,
};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// Token accepted by the routes that check bearer credentials.
pub const VALID_TOKEN: &str = "valid-token";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Model {
    pub uuid: Uuid,
    pub name: String,
    pub description: String,
}

#[derive(Deserialize)]
pub struct CreateModel {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Deserialize)]
pub struct UpdateModel {
    pub name: Option<String>,
    pub description: Option<String>,
}

pub type Db = Arc<RwLock<HashMap<Uuid, Model>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/api/v1/me", get(me))
        .route("/api/v1/models", get(list_models))
        .route("/api/v1/model", post(create_model))
        .route("/api/v1/model/{uuid}", get(get_model).put(update_model))
        .route("/api/v1/model/{uuid}/files", get(download_files))
        .route("/api/v1/echo", get(echo).post(echo).put(echo))
        .route("/api/v1/invalid", get(invalid))
        .route("/api/v1/locked", get(locked))
        .route("/api/v1/broken", get(broken))
        .route("/api/v1/plain", get(plain))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn is_authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == format!("Bearer {VALID_TOKEN}"))
}

fn denied() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"message": "denied"})),
    )
        .into_response()
}

async fn me(headers: HeaderMap) -> Response {
    if !is_authorized(&headers) {
        return denied();
    }
    Json(json!({"id": "user", "email": "user@example.com"})).into_response()
}

async fn list_models(State(db): State<Db>) -> Json<Vec<Model>> {
    let models = db.read().await;
    Json(models.values().cloned().collect())
}

async fn create_model(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<CreateModel>,
) -> Response {
    if !is_authorized(&headers) {
        return denied();
    }
    let model = Model {
        uuid: Uuid::new_v4(),
        name: input.name,
        description: input.description,
    };
    db.write().await.insert(model.uuid, model.clone());
    (StatusCode::CREATED, Json(model)).into_response()
}

async fn get_model(
    State(db): State<Db>,
    Path(uuid): Path<Uuid>,
) -> Result<Json<Model>, (StatusCode, Json<Value>)> {
    let models = db.read().await;
    models.get(&uuid).cloned().map(Json).ok_or_else(not_found)
}

async fn update_model(
    State(db): State<Db>,
    Path(uuid): Path<Uuid>,
    Json(input): Json<UpdateModel>,
) -> Result<Json<Model>, (StatusCode, Json<Value>)> {
    let mut models = db.write().await;
    let model = models.get_mut(&uuid).ok_or_else(not_found)?;
    if let Some(name) = input.name {
        model.name = name;
    }
    if let Some(description) = input.description {
        model.description = description;
    }
    Ok(Json(model.clone()))
}

fn not_found() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"message": "model not found"})),
    )
}

/// Serves a ZIP bundle with the metadata directory macOS archivers add.
async fn download_files(
    State(db): State<Db>,
    Path(uuid): Path<Uuid>,
) -> Result<Response, (StatusCode, Json<Value>)> {
    let models = db.read().await;
    let model = models.get(&uuid).ok_or_else(not_found)?;
    let bundle = model_bundle(&model.name).map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"message": e.to_string()})),
        )
    })?;
    Ok(([(header::CONTENT_TYPE, "application/zip")], bundle).into_response())
}

pub fn model_bundle(name: &str) -> zip::result::ZipResult<Vec<u8>> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::FileOptions::<()>::default();
    zip.start_file("model.json", options)?;
    zip.write_all(json!({"name": name}).to_string().as_bytes())?;
    zip.start_file("code/model.py", options)?;
    zip.write_all(b"def predict(x):\n    return x\n")?;
    zip.start_file("__MACOSX/code/._model.py", options)?;
    zip.write_all(b"resource fork")?;
    Ok(zip.finish()?.into_inner())
}

/// Reflects what the client sent so tests can assert on it.
async fn echo(
    method: Method,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
    body: String,
) -> Json<Value> {
    let header_value = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };
    let body: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
    Json(json!({
        "method": method.as_str(),
        "query": query,
        "authorization": header_value(header::AUTHORIZATION),
        "content_type": header_value(header::CONTENT_TYPE),
        "body": body,
    }))
}

async fn invalid() -> (StatusCode, Json<Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"message": "invalid request"})),
    )
}

async fn locked() -> (StatusCode, &'static str) {
    (StatusCode::UNAUTHORIZED, "login required")
}

async fn broken() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "internal error")
}

async fn plain() -> &'static str {
    "pong"
}
