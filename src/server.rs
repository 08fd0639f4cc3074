//! HTTP boundary: `POST /api/scrape` and `GET /health`

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::json;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::events::{Event, ScrapeRequest};
use crate::orchestrator::Pipeline;
use crate::utils::ScrapeError;
use crate::Config;

#[derive(Clone)]
struct AppState {
    pipeline: Pipeline,
    ceiling: Duration,
}

#[derive(Serialize)]
struct ScrapeResponse {
    events: Vec<Event>,
}

/// Build the router; `ceiling` bounds each scrape invocation
pub fn router(pipeline: Pipeline, ceiling: Duration) -> Router {
    Router::new()
        .route("/api/scrape", post(scrape))
        .route("/health", get(health))
        .with_state(AppState { pipeline, ceiling })
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    path = %request.uri().path(),
                )
            }),
        )
}

/// Bind the configured address and serve until Ctrl-C
pub async fn serve(config: &Config, pipeline: Pipeline) -> anyhow::Result<()> {
    let ceiling = Duration::from_secs(config.pipeline.invocation_timeout_secs);
    let app = router(pipeline, ceiling);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr).await?;
    info!("gig-scout listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

async fn scrape(
    State(state): State<AppState>,
    payload: Result<Json<ScrapeRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return error_response(StatusCode::BAD_REQUEST, rejection.body_text()),
    };

    match state.pipeline.run_bounded(request, state.ceiling).await {
        Ok(events) => Json(ScrapeResponse { events }).into_response(),
        Err(e) => {
            let status = match e {
                ScrapeError::Validation(_) => StatusCode::BAD_REQUEST,
                ScrapeError::Fatal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            error_response(status, e.to_string())
        }
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
