use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Extension, Path, Query};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;

use crate::audit;
use crate::controller::{SnapshotBroadcaster, StateUpdate};
use crate::engine::CommandEngine;
use crate::error::AppError;

// ── Shared state ─────────────────────────────────────────────────

/// Everything the handlers share. The engine sits behind one lock so batches from
/// concurrent requests never interleave.
#[derive(Clone)]
pub struct ApiState {
    engine: Arc<Mutex<Box<dyn CommandEngine>>>,
    updates: SnapshotBroadcaster,
    audit_dir: Option<PathBuf>,
}

impl ApiState {
    /// Wires the engine's change notifications into a broadcast channel with
    /// `buffer` pending updates per subscriber.
    pub fn new(mut engine: Box<dyn CommandEngine>, buffer: usize, audit_dir: Option<PathBuf>) -> Self {
        let updates = SnapshotBroadcaster::new(buffer);
        engine.observe(Arc::new(updates.clone()));
        Self {
            engine: Arc::new(Mutex::new(engine)),
            updates,
            audit_dir,
        }
    }

    /// Subscribe and take the current snapshot under the same lock, so no update can
    /// fall between the two.
    fn subscribe(&self) -> (StateUpdate, broadcast::Receiver<StateUpdate>) {
        let engine = self.engine.lock();
        let rx = self.updates.subscribe();
        (StateUpdate::of(&engine.snapshot()), rx)
    }
}

// ── Response types ───────────────────────────────────────────────

#[derive(Serialize)]
struct ApiOk<T: Serialize> {
    ok: bool,
    data: T,
}

#[derive(Serialize)]
struct ApiErr {
    ok: bool,
    error: String,
}

fn ok_json<T: Serialize>(data: T) -> impl IntoResponse {
    Json(ApiOk { ok: true, data })
}

fn err_json(status: StatusCode, msg: String) -> impl IntoResponse {
    (status, Json(ApiErr { ok: false, error: msg }))
}

fn error_status(error: &AppError) -> StatusCode {
    match error {
        AppError::UnknownOperation { .. } => StatusCode::NOT_FOUND,
        AppError::InvalidState { .. } => StatusCode::CONFLICT,
        AppError::Io { .. } | AppError::Settings { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        AppError::InvalidParameters { .. } | AppError::InvalidValue { .. } => {
            StatusCode::BAD_REQUEST
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────

#[derive(Deserialize)]
struct InterpretRequest {
    /// Raw generator output.
    output: String,
}

async fn get_health(Extension(state): Extension<ApiState>) -> impl IntoResponse {
    let device_set = state.engine.lock().device_set();
    ok_json(serde_json::json!({ "status": "ok", "device_set": device_set }))
}

async fn get_state(Extension(state): Extension<ApiState>) -> impl IntoResponse {
    ok_json(state.engine.lock().snapshot())
}

async fn get_context(Extension(state): Extension<ApiState>) -> impl IntoResponse {
    ok_json(state.engine.lock().describe())
}

#[derive(Deserialize, Default)]
struct ToolsQuery {
    /// List hidden operations and flags too.
    #[serde(default)]
    all: bool,
}

async fn get_tools(
    Extension(state): Extension<ApiState>,
    Query(query): Query<ToolsQuery>,
) -> impl IntoResponse {
    let engine = state.engine.lock();
    if query.all {
        ok_json(engine.catalog().to_json_schema())
    } else {
        ok_json(engine.catalog().to_tool_schemas())
    }
}

async fn post_interpret(
    Extension(state): Extension<ApiState>,
    Json(body): Json<InterpretRequest>,
) -> impl IntoResponse {
    let (device_set, outcome) = {
        let mut engine = state.engine.lock();
        (engine.device_set(), engine.handle(&body.output))
    };
    if let Some(dir) = state.audit_dir.clone() {
        let record = outcome.clone();
        let write = tokio::task::spawn_blocking(move || audit::log_outcome(&dir, device_set, &record));
        if let Err(e) = write.await {
            tracing::warn!("audit write task failed: {e}");
        }
    }
    ok_json(outcome)
}

async fn post_tool(
    Extension(state): Extension<ApiState>,
    Path(name): Path<String>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let result = state.engine.lock().execute(&name, &body);
    match &result.error {
        None => ok_json(result).into_response(),
        Some(e) => err_json(error_status(e), result.message.clone()).into_response(),
    }
}

async fn get_ws(ws: WebSocketUpgrade, Extension(state): Extension<ApiState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Initial snapshot, then every change notification. Text `ping` is answered with `pong`.
async fn handle_socket(socket: WebSocket, state: ApiState) {
    let (initial, mut updates) = state.subscribe();
    let (mut sender, mut receiver) = socket.split();

    if send_update(&mut sender, &initial).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            update = updates.recv() => match update {
                Ok(update) => {
                    if send_update(&mut sender, &update).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "websocket subscriber lagging");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            msg = receiver.next() => match msg {
                Some(Ok(Message::Text(text))) if text.as_str() == "ping" => {
                    if sender.send(Message::Text("pong".into())).await.is_err() {
                        break;
                    }
                }
                Some(Ok(Message::Close(_)) | Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }
    tracing::debug!("websocket closed");
}

async fn send_update<S>(sender: &mut S, update: &StateUpdate) -> Result<(), ()>
where
    S: futures_util::Sink<Message> + Unpin,
{
    let payload = serde_json::to_string(update).map_err(|_| ())?;
    sender.send(Message::Text(payload.into())).await.map_err(|_| ())
}

// ── Server startup ───────────────────────────────────────────────

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/", get(get_health))
        .route("/api/state", get(get_state))
        .route("/api/context", get(get_context))
        .route("/api/tools", get(get_tools))
        .route("/api/tools/{name}", post(post_tool))
        .route("/api/interpret", post(post_interpret))
        .route("/ws", get(get_ws))
        .layer(CorsLayer::permissive())
        .layer(Extension(state))
}

/// Bind `addr` and serve until the process exits.
pub async fn serve(addr: SocketAddr, state: ApiState) -> Result<(), AppError> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;
    tracing::info!(%local, "api listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}
