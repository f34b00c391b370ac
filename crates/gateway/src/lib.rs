//! HTTP gateway for toolchat.
//!
//! Exposes the streaming chat endpoint, a health check and the tool list.
//!
//! Built on Axum for high performance async HTTP.

pub mod chat;
pub mod edge;

use axum::extract::DefaultBodyLimit;
use axum::{
    Router,
    extract::State,
    http::{HeaderValue, Method, header},
    middleware,
    response::Json,
    routing::{get, post},
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

use toolchat_agent::Agent;
use toolchat_config::{AppConfig, GatewayConfig};
use toolchat_core::provider::ToolDefinition;

/// Shared application state for the gateway.
pub struct GatewayState {
    pub agent: Arc<Agent>,
    /// Wall-clock budget for one chat run
    pub max_duration: Duration,
}

impl GatewayState {
    pub fn new(agent: Agent, config: &GatewayConfig) -> Self {
        Self {
            agent: Arc::new(agent),
            max_duration: Duration::from_secs(config.max_duration_secs),
        }
    }
}

pub type SharedState = Arc<GatewayState>;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Build the Axum router with all gateway routes.
///
/// Layers, outermost first: HTTP trace logging, CORS for the configured
/// origins, the edge path filter (when enabled), and the body size limit.
pub fn build_router(state: SharedState, config: &GatewayConfig) -> Router {
    let mut router = Router::new()
        .route("/health", get(health_handler))
        .route("/api/chat", post(chat::chat_handler))
        .route("/api/tools", get(tools_handler))
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.body_limit_bytes));

    if config.edge_filter {
        router = router.layer(middleware::from_fn(edge::edge_filter));
    }

    router
        .layer(cors_layer(&config.allowed_origins))
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// CORS for the configured origins only; none means same-origin.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(Duration::from_secs(3600))
}

/// Start the gateway HTTP server.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let providers = toolchat_providers::build_from_config(&config);
    let provider = providers.default_provider().ok_or_else(|| {
        format!(
            "Provider '{}' is not configured: set an API key",
            config.default_provider
        )
    })?;

    let agent = Agent::from_config(&config, provider)?;
    info!(
        model = %agent.model(),
        tools = agent.tools().len(),
        max_steps = agent.max_steps(),
        "Agent ready"
    );

    let state = Arc::new(GatewayState::new(agent, &config.gateway));
    let app = build_router(state, &config.gateway);

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

async fn tools_handler(State(state): State<SharedState>) -> Json<Vec<ToolDefinition>> {
    Json(state.agent.tools().definitions())
}
