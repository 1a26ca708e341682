use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use filmquery_core::{Catalog, QueryError};
use serde::Serialize;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Serialize)]
pub struct MonthCountResponse {
    pub mes: String,
    pub cantidad_filmaciones: usize,
}

#[derive(Serialize)]
pub struct TitleScoreResponse {
    pub titulo: String,
    pub score: f64,
}

#[derive(Serialize)]
pub struct RecommendationResponse {
    pub titulo: String,
    pub recomendaciones: Vec<String>,
}

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    /// Titles returned per recommendation.
    pub top_k: usize,
}

impl AppState {
    pub fn new(catalog: Catalog, top_k: usize) -> Self {
        Self { catalog: Arc::new(catalog), top_k }
    }
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/cantidad_filmaciones_mes/:mes", get(month_count_handler))
        .route("/score_titulo/:titulo", get(title_score_handler))
        .route("/recomendacion/:titulo", get(recommendation_handler))
        .with_state(state)
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

// CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
fn cors_layer() -> CorsLayer {
    let base = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    let origins: Vec<_> = std::env::var("CORS_ALLOW_ORIGIN")
        .map(|val| val.split(',').filter_map(|s| s.trim().parse().ok()).collect())
        .unwrap_or_default();
    if origins.is_empty() {
        base.allow_origin(Any)
    } else {
        base.allow_origin(AllowOrigin::list(origins))
    }
}

pub async fn month_count_handler(
    State(state): State<AppState>,
    Path(mes): Path<String>,
) -> Result<Json<MonthCountResponse>, ApiError> {
    let cantidad_filmaciones = state.catalog.films_in_month(&mes)?;
    Ok(Json(MonthCountResponse { mes, cantidad_filmaciones }))
}

pub async fn title_score_handler(
    State(state): State<AppState>,
    Path(titulo): Path<String>,
) -> Result<Json<TitleScoreResponse>, ApiError> {
    let found = state.catalog.score_by_title(&titulo)?;
    tracing::debug!(query = %titulo, matched = %found.title, "title score");
    Ok(Json(TitleScoreResponse { titulo, score: found.score }))
}

pub async fn recommendation_handler(
    State(state): State<AppState>,
    Path(titulo): Path<String>,
) -> Result<Json<RecommendationResponse>, ApiError> {
    // ranking scores every title on the rayon pool; keep it off the async workers
    let catalog = Arc::clone(&state.catalog);
    let query = titulo.clone();
    let recomendaciones = tokio::task::spawn_blocking(move || catalog.recommend(&query, state.top_k))
        .await
        .map_err(ApiError::internal)??;
    Ok(Json(RecommendationResponse { titulo, recomendaciones }))
}

/// Error rendered as `{"detail": message}` with a matching status code.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self { status: StatusCode::BAD_REQUEST, message: message.into() }
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self { status: StatusCode::NOT_FOUND, message: message.into() }
    }

    fn internal(err: impl std::fmt::Display) -> Self {
        tracing::error!(error = %err, "request failed");
        Self { status: StatusCode::INTERNAL_SERVER_ERROR, message: "internal server error".into() }
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        tracing::debug!(error = %err, "rejected query");
        match err {
            QueryError::InvalidMonth(_) => ApiError::bad_request("Mes no válido"),
            QueryError::TitleNotFound(_) => ApiError::not_found("Película no encontrada"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(serde_json::json!({ "detail": self.message }))).into_response()
    }
}
