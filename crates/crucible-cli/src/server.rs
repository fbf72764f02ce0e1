//! HTTP transport for recipe search
//!
//! `POST /api/search` takes a search request and answers in the wire
//! format; `GET /health` reports liveness.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use crucible_core::{RuleStore, SearchRequest};
use crucible_search::{RecipeSearchEngine, SearchEngine, SearchError};
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;

use crate::output::SearchResponse;

/// Maximum request body size (1MB)
const MAX_BODY_SIZE: usize = 1024 * 1024;

/// Shared server state
pub struct ServerState {
    engine: RecipeSearchEngine,
    rules: Arc<RuleStore>,
}

impl ServerState {
    pub fn new(engine: RecipeSearchEngine, rules: Arc<RuleStore>) -> Self {
        Self { engine, rules }
    }
}

/// Create the HTTP router
pub fn create_router(state: Arc<ServerState>) -> Router {
    // Browser front ends are served from anywhere
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/api/search", post(search_handler))
        .route("/health", get(health_handler))
        .with_state(state)
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(serde_json::json!({ "error": message.into() }))).into_response()
}

/// Health check endpoint
async fn health_handler(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "server": "crucible",
        "version": env!("CARGO_PKG_VERSION"),
        "elements": state.rules.len(),
        "recipes": state.rules.recipe_count()
    }))
}

/// Search endpoint
async fn search_handler(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            tracing::warn!("Failed to decode request: {}", rejection.body_text());
            return error_response(StatusCode::BAD_REQUEST, "invalid input");
        }
    };

    tracing::info!(
        "Searching for '{}' using {} ({} mode, maxRecipes {:?})",
        request.target,
        request.algorithm,
        request.mode,
        request.max_recipes
    );

    let started = Instant::now();
    match state.engine.search(&request, Arc::clone(&state.rules)).await {
        Ok(outcome) => {
            let elapsed = started.elapsed();
            tracing::info!(
                "Answered '{}' with {} path(s) in {:?}",
                request.target,
                outcome.paths.len(),
                elapsed
            );
            Json(SearchResponse::from_outcome(&outcome, elapsed)).into_response()
        }
        Err(SearchError::UnknownItem(item)) => {
            error_response(StatusCode::NOT_FOUND, format!("unknown item: {}", item))
        }
        Err(SearchError::Validation(e)) => error_response(StatusCode::BAD_REQUEST, e.to_string()),
        Err(e) => {
            tracing::error!("Search for '{}' failed: {}", request.target, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    fn router() -> Router {
        let rules = RuleStore::new()
            .with_recipe("Brick", "Mud", "Fire")
            .with_recipe("Brick", "Clay", "Stone")
            .with_recipe("Mud", "Water", "Earth")
            .with_recipe("Clay", "Mud", "Sand")
            .with_recipe("Stone", "Lava", "Air")
            .with_recipe("Sand", "Earth", "Fire")
            .with_recipe("Lava", "Earth", "Fire");
        let state = ServerState::new(RecipeSearchEngine::default(), Arc::new(rules));
        create_router(Arc::new(state))
    }

    fn post_search(body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/api/search")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_single_search() {
        let response = router()
            .oneshot(post_search(
                r#"{"target":"Brick","algorithm":"DFS","searchMode":"single"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["tree"][0]["name"], "Brick");
        assert_eq!(json["tree"][0]["children"][0]["name"], "Mud");
        assert_eq!(json["nodesVisited"].as_array().unwrap().len(), 1);
        assert!(json["executionTime"].is_number());
    }

    #[tokio::test]
    async fn test_multiple_search() {
        let response = router()
            .oneshot(post_search(
                r#"{"target":"Brick","algorithm":"BFS","searchMode":"multiple","maxRecipes":2}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["trees"].as_array().unwrap().len(), 2);
        assert_eq!(json["nodesVisited"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_bad_requests() {
        let response = router().oneshot(post_search("{not json")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "invalid input");

        let response = router()
            .oneshot(post_search(r#"{"target":"Unobtainium"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = router()
            .oneshot(Request::get("/api/search").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_cors_preflight() {
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/search")
            .header(header::ORIGIN, "http://example.com")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();
        let response = router().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
    }

    #[tokio::test]
    async fn test_health() {
        let response = router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["recipes"], 7);
    }
}
