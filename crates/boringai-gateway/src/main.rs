//! BoringAI Consultation Gateway: `/chat` plus health checks.
//! Holds the model credential; the browser client never sees it.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use boringai_core::{BoringConsultant, ChatTurn, ConsultantConfig, OpenAiChat};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const SERVICE_MESSAGE: &str = "BoringAI Consultation API is running";
const TECHNICAL_DIFFICULTIES: &str =
    "Sorry, I'm experiencing technical difficulties. Please try again.";
const LOG_PREVIEW_CHARS: usize = 100;

#[derive(Clone)]
struct AppState {
    consultant: Arc<BoringConsultant>,
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    message: String,
    #[serde(default)]
    conversation_history: Vec<ChatTurn>,
    #[serde(default)]
    user_context: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct ChatResponse {
    response: String,
    conversation_state: String,
    suggested_actions: Vec<String>,
    confidence_score: f64,
}

#[tokio::main]
async fn main() {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("[boringai-gateway] .env not loaded: {} (using system environment)", e);
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match ConsultantConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("[boringai-gateway] {}", e);
            std::process::exit(1);
        }
    };
    tracing::info!(
        model = %config.model,
        timeout_secs = config.llm_timeout.as_secs(),
        "consultant configured"
    );

    let model = Arc::new(OpenAiChat::from_config(&config));
    let state = AppState {
        consultant: Arc::new(BoringConsultant::from_config(model, &config)),
    };

    let addr = config.bind_addr();
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("[boringai-gateway] cannot bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };
    tracing::info!("[boringai-gateway] listening on {}", addr);

    if let Err(e) = axum::serve(listener, build_app(state)).await {
        tracing::error!("[boringai-gateway] server error: {}", e);
    }
}

fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/chat", post(chat_handler))
        .with_state(state)
        .layer(axum::middleware::from_fn(log_request))
        .layer(CorsLayer::permissive())
}

async fn log_request(request: Request<Body>, next: Next) -> Response {
    tracing::debug!("{} {}", request.method(), request.uri().path());
    next.run(request).await
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": SERVICE_MESSAGE,
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
    }))
}

/// POST /chat: one consultation turn. The pipeline runs in its own task; a panic there is
/// the only path to a 500.
async fn chat_handler(
    axum::extract::State(state): axum::extract::State<AppState>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, Response> {
    tracing::info!("Received chat request: {}...", preview(&body.message));

    let consultant = Arc::clone(&state.consultant);
    let ChatRequest {
        message,
        conversation_history,
        user_context,
    } = body;
    let outcome = tokio::spawn(async move {
        consultant
            .process_message(&message, conversation_history, user_context)
            .await
    })
    .await
    .map_err(|e| {
        tracing::error!("Error processing chat request: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "detail": TECHNICAL_DIFFICULTIES })),
        )
            .into_response()
    })?;

    tracing::info!("Generated response: {}...", preview(&outcome.response));

    Ok(Json(ChatResponse {
        response: outcome.response,
        conversation_state: outcome.stage.to_string(),
        suggested_actions: outcome.suggested_actions,
        confidence_score: outcome.confidence_score,
    }))
}

fn preview(s: &str) -> String {
    s.chars().take(LOG_PREVIEW_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use boringai_core::{LanguageModel, LlmError, LlmMessage, FALLBACK_RESPONSE};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;
    use tower::ServiceExt;

    /// Replays queued replies; an exhausted queue fails the call.
    struct QueuedModel {
        replies: Mutex<VecDeque<Result<String, LlmError>>>,
    }

    impl QueuedModel {
        fn new(replies: Vec<Result<String, LlmError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
            }
        }
    }

    #[async_trait]
    impl LanguageModel for QueuedModel {
        async fn complete(&self, _messages: &[LlmMessage]) -> Result<String, LlmError> {
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(LlmError::EmptyCompletion))
        }
    }

    struct PanickingModel;

    #[async_trait]
    impl LanguageModel for PanickingModel {
        async fn complete(&self, _messages: &[LlmMessage]) -> Result<String, LlmError> {
            panic!("model client bug");
        }
    }

    fn app(model: Arc<dyn LanguageModel>) -> Router {
        build_app(AppState {
            consultant: Arc::new(BoringConsultant::new(model, Duration::from_secs(1))),
        })
    }

    async fn post_chat(app: Router, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let req = Request::builder()
            .method("POST")
            .uri("/chat")
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_root_reports_healthy() {
        let req = Request::builder().uri("/").body(Body::empty()).unwrap();
        let res = app(Arc::new(QueuedModel::new(vec![]))).oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["message"], SERVICE_MESSAGE);
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_health_has_timestamp() {
        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let res = app(Arc::new(QueuedModel::new(vec![]))).oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["status"], "healthy");
        assert!(json["timestamp"].as_str().unwrap().ends_with('Z'));
    }

    #[tokio::test]
    async fn test_chat_qualification_turn() {
        let model = Arc::new(QueuedModel::new(vec![
            Ok("handler reply".into()),
            Ok("Budgets usually start small.".into()),
        ]));
        let (status, json) = post_chat(
            app(model),
            serde_json::json!({
                "message": "What does this cost?",
                "conversation_history": [
                    { "role": "user", "content": "We process invoices by hand." },
                    { "role": "assistant", "content": "How many per month?" }
                ],
                "user_context": { "source": "landing-page" }
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["conversation_state"], "qualification");
        assert_eq!(json["response"], "Budgets usually start small.");
        assert_eq!(json["confidence_score"], 0.85);
        assert_eq!(json["suggested_actions"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_chat_defaults_history_and_context() {
        let model = Arc::new(QueuedModel::new(vec![
            Ok("handler reply".into()),
            Ok("Tell me about your business.".into()),
        ]));
        let (status, json) =
            post_chat(app(model), serde_json::json!({ "message": "What does this cost?" })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["conversation_state"], "consultation");
        assert_eq!(json["confidence_score"], 0.8);
    }

    #[tokio::test]
    async fn test_chat_model_outage_returns_fallback_with_200() {
        let model = Arc::new(QueuedModel::new(vec![
            Ok("handler reply".into()),
            Err(LlmError::Api {
                status: 502,
                body: "bad gateway".into(),
            }),
        ]));
        let (status, json) = post_chat(
            app(model),
            serde_json::json!({ "message": "How can we automate onboarding?" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["response"], FALLBACK_RESPONSE);
        assert_eq!(json["conversation_state"], "consultation");
        assert_eq!(json["confidence_score"], 0.1);
        assert_eq!(json["suggested_actions"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_chat_panic_maps_to_500() {
        let (status, json) =
            post_chat(app(Arc::new(PanickingModel)), serde_json::json!({ "message": "hi" })).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["detail"], TECHNICAL_DIFFICULTIES);
    }

    #[tokio::test]
    async fn test_cors_allows_any_origin() {
        let req = Request::builder()
            .uri("/health")
            .header("origin", "http://127.0.0.1:5500")
            .body(Body::empty())
            .unwrap();
        let res = app(Arc::new(QueuedModel::new(vec![]))).oneshot(req).await.unwrap();
        assert_eq!(
            res.headers()
                .get("access-control-allow-origin")
                .and_then(|v| v.to_str().ok()),
            Some("*")
        );
    }
}
