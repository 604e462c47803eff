//! Drone Web 服务
//!
//! 启动: cargo run --bin drone-web --features web
//! POST /api/invoke 返回完整回复；POST /api/stream 以 SSE 返回（当前为单块）。

#![cfg(feature = "web")]

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post},
    Json, Router,
};
use futures_util::{Stream, StreamExt};
use serde::{Deserialize, Serialize};

use drone::bridge::{create_agent, AgentBridge};
use drone::config::load_config;
use drone::engine::HandoffContext;
use drone::error::AgentError;

struct AppState {
    bridge: AgentBridge,
}

#[derive(Debug, Deserialize)]
struct InvokeRequest {
    message: String,
    #[serde(default)]
    session_id: Option<String>,
    /// 跨 Agent 交接上下文，原样透传给引擎
    #[serde(default)]
    handoff: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct InvokeResponse {
    reply: String,
    session_id: String,
}

fn error_status(e: &AgentError) -> StatusCode {
    match e {
        AgentError::EmptyMessage => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    drone::observability::init();

    let cfg = load_config(Some(std::path::Path::new("config"))).unwrap_or_default();
    let bridge = create_agent("config", None);
    tracing::info!("Bridge ready ({:?} backend)", bridge.backend_kind());

    let state = Arc::new(AppState { bridge });

    let app = Router::new()
        .route("/api/invoke", post(api_invoke))
        .route("/api/stream", post(api_stream))
        .route("/api/health", get(|| async { "OK" }))
        .with_state(Arc::clone(&state));

    let port = std::env::var("DRONE_WEB_PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(cfg.web.port);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Drone web: http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// POST /api/invoke：{ message, session_id?, handoff? } -> { reply, session_id }
async fn api_invoke(
    State(state): State<Arc<AppState>>,
    Json(req): Json<InvokeRequest>,
) -> Result<Json<InvokeResponse>, (StatusCode, String)> {
    let session_id = req
        .session_id
        .clone()
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let handoff = req.handoff.map(HandoffContext);

    let reply = state
        .bridge
        .invoke(&req.message, Some(&session_id), handoff.as_ref())
        .await
        .map_err(|e| (error_status(&e), e.to_string()))?;

    Ok(Json(InvokeResponse { reply, session_id }))
}

/// POST /api/stream：同 invoke，但以 SSE 推送回复块（当前恰为一块）
async fn api_stream(
    State(state): State<Arc<AppState>>,
    Json(req): Json<InvokeRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, (StatusCode, String)> {
    let session_id = req
        .session_id
        .clone()
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let handoff = req.handoff.map(HandoffContext);

    let chunks = state
        .bridge
        .stream(&req.message, Some(&session_id), handoff.as_ref())
        .await
        .map_err(|e| (error_status(&e), e.to_string()))?;

    let events = chunks.map(|chunk| Ok(Event::default().data(chunk)));
    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}
