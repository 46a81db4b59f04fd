use std::net::SocketAddr;

use anyhow::Result;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Json};
use axum::routing::{get, post};
use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::ask::AskService;
use crate::config::AppConfig;
use crate::models::{AskRequest, AskResponse, HealthResponse};

#[derive(Clone)]
struct AppState {
    ask: AskService,
}

/// Static description of one exposed route, used for startup diagnostics.
/// Lists each route's primary methods; the static file service also answers
/// HEAD for the paths it serves.
#[derive(Debug, Clone)]
pub struct RouteDescriptor {
    pub path: &'static str,
    pub methods: &'static [&'static str],
}

pub fn route_table() -> Vec<RouteDescriptor> {
    vec![
        RouteDescriptor {
            path: "/",
            methods: &["GET"],
        },
        RouteDescriptor {
            path: "/api/ask",
            methods: &["POST"],
        },
        RouteDescriptor {
            path: "/healthz",
            methods: &["GET"],
        },
        RouteDescriptor {
            path: "/static",
            methods: &["GET"],
        },
    ]
}

pub async fn run_server(config: AppConfig, ask: AskService) -> Result<()> {
    let state = AppState { ask };

    let app = Router::new()
        .route("/", get(index_page))
        .route("/api/ask", post(ask_handler))
        .route("/healthz", get(health))
        .nest_service("/static", ServeDir::new("static"))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn index_page() -> Html<&'static str> {
    Html(include_str!("../static/index.html"))
}

async fn ask_handler(
    State(state): State<AppState>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>, ApiError> {
    let question = request.question.trim();
    if question.is_empty() {
        return Err(ApiError::bad_request("Question is required"));
    }

    match state.ask.answer(question).await {
        Ok(answer) => Ok(Json(answer)),
        Err(err) => {
            tracing::error!("error processing question: {err:#}");
            Err(ApiError::internal("Error processing your question"))
        }
    }
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}
