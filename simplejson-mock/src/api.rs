pub use crate::annotations::annotations_handler;
pub use crate::query::query_handler;

use crate::auth::require_basic_auth;
use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::debug;

pub async fn hello_handler() -> impl IntoResponse {
    // Answered to the datasource's "test connection" probe. Keep it lightweight.
    Json(json!({ "status": "ok", "message": "simple json datasource" }))
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub target: String,
}

/// Lists the configured target names, optionally narrowed to a prefix.
/// A request without a JSON content type lists everything.
pub async fn search_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<Vec<String>>, ApiError> {
    let target = match payload {
        Ok(Json(req)) => req.target,
        Err(JsonRejection::MissingJsonContentType(_)) => String::new(),
        Err(rejection) => return Err(rejection.into()),
    };
    let prefix = target.trim();
    let names: Vec<String> = state
        .search_targets
        .iter()
        .filter(|name| name.starts_with(prefix))
        .cloned()
        .collect();
    debug!("Search '{}' matched {} target(s)", prefix, names.len());
    Ok(Json(names))
}

pub fn router(state: Arc<AppState>) -> Router {
    let body_limit = state.max_request_body_bytes;
    Router::new()
        .route("/", get(hello_handler))
        .route("/search", post(search_handler))
        .route("/query", post(query_handler))
        .route("/annotations", post(annotations_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_basic_auth,
        ))
        .layer(DefaultBodyLimit::max(body_limit))
        // Preflight requests are answered here, before authentication runs
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
