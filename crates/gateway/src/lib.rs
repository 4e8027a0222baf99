//! HTTP API gateway for Confab.
//!
//! Exposes REST endpoints for health checks, chat, and topic
//! management. The entire conversation state lives in one
//! `ConversationManager` behind an async `RwLock`; each chat request
//! takes the write lock for the duration of the backend call, which
//! serializes turns exactly like the single-user assistant it fronts.
//!
//! Built on Axum.

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tracing::info;

use confab_core::message::{ConversationId, Turn};
use confab_session::{ContextBuilder, ConversationManager};
use confab_store::{ConversationStore, FlatLog};

/// Shared application state for the gateway.
pub struct GatewayState {
    pub manager: ConversationManager,
}

type SharedState = Arc<RwLock<GatewayState>>;

/// Build the Axum router with all gateway routes.
pub fn build_router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/chat", post(chat_handler))
        .route("/api/topics", get(topics_handler))
        .route("/api/topics/select", post(select_topic_handler))
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the gateway HTTP server.
///
/// Wires the Ollama backend, the file stores, and (when enabled) the
/// voice synthesizer from config, then serves until interrupted.
pub async fn start(config: confab_config::AppConfig) -> confab_core::Result<()> {
    let host = config.gateway.host.clone();
    let port = config.gateway.port;
    let addr = format!("{host}:{port}");

    let backend = Arc::new(confab_providers::OllamaBackend::new(
        &config.backend.ollama_url,
    ));

    let context = ContextBuilder::new(&config.assistant.persona)
        .with_recent_limit(config.memory.recent_pairs);

    let mut manager = ConversationManager::new(
        ConversationStore::new(config.conversations_path()),
        FlatLog::new(config.flat_log_path()),
        backend,
        context,
        &config.model,
    )
    .with_temperature(config.temperature)
    .with_voice_lang(&config.voice.lang);

    if let Some(max_tokens) = config.max_tokens {
        manager = manager.with_max_tokens(max_tokens);
    }

    if config.voice.enabled {
        let tts = confab_voice::GoogleTts::new(config.audio_dir());
        manager = manager.with_voice(Arc::new(tts));
    }

    let state = Arc::new(RwLock::new(GatewayState { manager }));
    let app = build_router(state);

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Deserialize)]
struct ChatRequest {
    message: String,

    /// Continue this conversation; omit to start a new one
    #[serde(default)]
    conversation_id: Option<String>,

    /// Request an audio artifact for the reply
    #[serde(default)]
    voice: bool,
}

#[derive(Serialize)]
struct ChatResponse {
    reply: String,
    conversation_id: String,
    session: Vec<Turn>,
    #[serde(skip_serializing_if = "Option::is_none")]
    audio: Option<PathBuf>,
    titles: Vec<String>,
}

/// Process one chat turn.
///
/// The session fed to the manager is the stored transcript of the
/// addressed conversation: the gateway keeps no per-client state, so a
/// conversation id is the whole resume handle.
async fn chat_handler(
    State(state): State<SharedState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, StatusCode> {
    if payload.message.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let mut state = state.write().await;

    let (session, active_id) = match payload.conversation_id {
        Some(raw) => {
            let id = ConversationId::from(&raw);
            match state.manager.snapshot().iter().find(|c| c.id == id) {
                Some(conv) => (conv.turns.clone(), Some(id)),
                None => return Err(StatusCode::NOT_FOUND),
            }
        }
        None => (Vec::new(), None),
    };

    let outcome = state
        .manager
        .handle_message(&payload.message, payload.voice, session, active_id)
        .await;

    let reply = outcome
        .session
        .last()
        .map(|t| t.assistant.clone())
        .unwrap_or_default();

    // Non-blank input always lands in a conversation
    let conversation_id = outcome
        .conversation_id
        .map(|id| id.to_string())
        .ok_or(StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(ChatResponse {
        reply,
        conversation_id,
        session: outcome.session,
        audio: outcome.audio,
        titles: outcome.titles,
    }))
}

#[derive(Serialize)]
struct TopicsResponse {
    titles: Vec<String>,
}

async fn topics_handler(State(state): State<SharedState>) -> Json<TopicsResponse> {
    let state = state.read().await;
    Json(TopicsResponse {
        titles: state.manager.titles(),
    })
}

#[derive(Deserialize)]
struct SelectTopicRequest {
    title: String,
}

#[derive(Serialize)]
struct SelectTopicResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    conversation_id: Option<String>,
    session: Vec<Turn>,
}

/// Resume a stored conversation by title. Unknown titles resolve to an
/// empty session rather than an error, matching the selector contract.
async fn select_topic_handler(
    State(state): State<SharedState>,
    Json(payload): Json<SelectTopicRequest>,
) -> Json<SelectTopicResponse> {
    let state = state.read().await;
    let (session, id) = state.manager.select_topic(&payload.title);
    Json(SelectTopicResponse {
        conversation_id: id.map(|id| id.to_string()),
        session,
    })
}
