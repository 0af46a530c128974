// Axum API Server Module
//
// Purpose: thin HTTP layer over the recommendation engine. Serves the
// questionnaire, turns submitted answers into ranked crops, exposes the
// catalog and the AHP diagnostics, and mirrors the assistant's tool calls.

#[cfg(feature = "api")]
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};

#[cfg(feature = "api")]
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

#[cfg(feature = "api")]
use moka::future::Cache;

#[cfg(feature = "api")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "api")]
use std::path::PathBuf;

#[cfg(feature = "api")]
use std::sync::Arc;

#[cfg(feature = "api")]
use std::time::Duration;

#[cfg(feature = "api")]
use crate::data::{catalog_fingerprint, Crop, CropStore, InMemoryCropStore, UserInputRecord};

#[cfg(feature = "api")]
use crate::error::EngineError;

#[cfg(feature = "api")]
use crate::explanation::{format_catalog, format_top_recommendations, TOOL_TOP_N};

#[cfg(feature = "api")]
use crate::questionnaire::{AnswerAggregator, Questionnaire, TechnicalValues, UserAnswer};

#[cfg(feature = "api")]
use crate::scorer::Recommendation;

#[cfg(feature = "api")]
use crate::weighting::AhpModel;

// ============================================================================
// Configuration
// ============================================================================

#[cfg(feature = "api")]
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Crop catalog file (.csv, .parquet or .json)
    pub catalog_path: PathBuf,
    /// Custom questionnaire JSON; the built-in one when unset
    pub questionnaire_path: Option<PathBuf>,
    pub port: u16,
    pub cache_ttl: Duration,
}

#[cfg(feature = "api")]
impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from("data/crops.csv"),
            questionnaire_path: None,
            port: 8000,
            cache_ttl: Duration::from_secs(300),
        }
    }
}

#[cfg(feature = "api")]
impl ServerConfig {
    /// Read CROP_CATALOG, QUESTIONNAIRE, PORT and CACHE_TTL_SECS
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let catalog_path = std::env::var("CROP_CATALOG")
            .map(PathBuf::from)
            .unwrap_or(defaults.catalog_path);

        let questionnaire_path = std::env::var("QUESTIONNAIRE").ok().map(PathBuf::from);

        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(defaults.port);

        let cache_ttl = std::env::var("CACHE_TTL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.cache_ttl);

        Self {
            catalog_path,
            questionnaire_path,
            port,
            cache_ttl,
        }
    }
}

// ============================================================================
// Application State
// ============================================================================

#[cfg(feature = "api")]
#[derive(Clone)]
pub struct AppState {
    /// Weights + consistency ratio, computed once at startup
    pub model: Arc<AhpModel>,
    pub questionnaire: Arc<Questionnaire>,
    pub aggregator: Arc<AnswerAggregator>,
    pub store: Arc<dyn CropStore>,
    /// Ranked results keyed by catalog fingerprint + technical values
    pub cache: Cache<String, Arc<Vec<Recommendation>>>,
}

#[cfg(feature = "api")]
impl AppState {
    pub fn new(config: &ServerConfig) -> anyhow::Result<Self> {
        tracing::info!("Loading crop catalog from {:?}...", config.catalog_path);
        let store = InMemoryCropStore::from_catalog(&config.catalog_path)?;

        let questionnaire = match &config.questionnaire_path {
            Some(path) => {
                tracing::info!("Loading questionnaire from {:?}...", path);
                Questionnaire::load(path)?
            }
            None => Questionnaire::standard(),
        };

        Ok(Self::with_store(Arc::new(store), questionnaire, config.cache_ttl))
    }

    pub fn with_store(
        store: Arc<dyn CropStore>,
        questionnaire: Questionnaire,
        cache_ttl: Duration,
    ) -> Self {
        let model = AhpModel::initialize();
        tracing::info!(
            "AHP weights: {}",
            model
                .weights()
                .iter()
                .map(|(c, w)| format!("{}={:.4}", c, w))
                .collect::<Vec<_>>()
                .join(", ")
        );
        tracing::info!("AHP consistency ratio: {:.4}", model.consistency_ratio());
        tracing::info!("Questionnaire: {} questions", questionnaire.len());

        let cache = Cache::builder()
            .max_capacity(10_000)
            .time_to_live(cache_ttl)
            .build();

        Self {
            model: Arc::new(model),
            aggregator: Arc::new(AnswerAggregator::new(&questionnaire)),
            questionnaire: Arc::new(questionnaire),
            store,
            cache,
        }
    }
}

// ============================================================================
// Router
// ============================================================================

#[cfg(feature = "api")]
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/questions", get(get_questions))
        .route("/api/recommend", post(recommend_from_answers))
        .route("/api/recommend/values", post(recommend_from_values))
        .route("/api/crops", get(get_crops))
        .route("/api/weights", get(get_weights))
        // Assistant tool calls (plain-text results)
        .route("/api/tools/recommend", post(tool_recommend))
        .route("/api/tools/crops", get(tool_crops))
        // Middleware (applied in reverse order)
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================================================
// Request / Response bodies
// ============================================================================

#[cfg(feature = "api")]
#[derive(Debug, Deserialize)]
pub struct AnswerSubmission {
    pub answers: Vec<UserAnswer>,
}

#[cfg(feature = "api")]
#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub technical_values: TechnicalValues,
    pub recommendations: Vec<Recommendation>,
}

// ============================================================================
// Endpoint Handlers
// ============================================================================

#[cfg(feature = "api")]
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

#[cfg(feature = "api")]
async fn get_questions(State(state): State<AppState>) -> Json<Questionnaire> {
    Json(state.questionnaire.as_ref().clone())
}

#[cfg(feature = "api")]
async fn recommend_from_answers(
    State(state): State<AppState>,
    Json(submission): Json<AnswerSubmission>,
) -> Result<Json<RecommendationResponse>, AppError> {
    let technical_values = state.aggregator.map_answers_to_values(&submission.answers);
    tracing::info!("Calculated technical values: {:?}", technical_values);
    recommend(&state, technical_values).await
}

#[cfg(feature = "api")]
async fn recommend_from_values(
    State(state): State<AppState>,
    Json(technical_values): Json<TechnicalValues>,
) -> Result<Json<RecommendationResponse>, AppError> {
    recommend(&state, technical_values).await
}

/// Shared recommendation path: read the catalog, rank (cached per catalog
/// fingerprint), then record the submission
#[cfg(feature = "api")]
async fn recommend(
    state: &AppState,
    technical_values: TechnicalValues,
) -> Result<Json<RecommendationResponse>, AppError> {
    let crops = fetch_catalog(state)?;
    let cache_key = format!(
        "recommend:{:016x}:{:?}",
        catalog_fingerprint(&crops),
        technical_values
    );

    let recommendations = match state.cache.get(&cache_key).await {
        Some(cached) => {
            tracing::debug!("Cache hit for recommendation query");
            cached
        }
        None => {
            let ranked = Arc::new(state.model.rank_crops(&technical_values, &crops));
            state.cache.insert(cache_key, ranked.clone()).await;
            ranked
        }
    };

    if let Err(e) = state
        .store
        .record_user_input(UserInputRecord::from(&technical_values))
    {
        tracing::warn!("Failed to save user input: {}", e);
    }

    Ok(Json(RecommendationResponse {
        technical_values,
        recommendations: recommendations.as_ref().clone(),
    }))
}

/// Fetch the catalog, treating an empty table as "not found"
#[cfg(feature = "api")]
fn fetch_catalog(state: &AppState) -> Result<Vec<Crop>, AppError> {
    let crops = state.store.fetch_crops()?;
    if crops.is_empty() {
        return Err(AppError::NotFound("No crops found in catalog".to_string()));
    }
    Ok(crops)
}

#[cfg(feature = "api")]
async fn get_crops(State(state): State<AppState>) -> Result<Json<Vec<Crop>>, AppError> {
    Ok(Json(state.store.fetch_crops()?))
}

#[cfg(feature = "api")]
async fn get_weights(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "weights": state.model.weights(),
        "consistency_ratio": state.model.consistency_ratio(),
        "consistent": state.model.is_consistent(),
    }))
}

#[cfg(feature = "api")]
async fn tool_recommend(
    State(state): State<AppState>,
    Json(technical_values): Json<TechnicalValues>,
) -> Result<Json<serde_json::Value>, AppError> {
    let crops = state.store.fetch_crops()?;
    let result = if crops.is_empty() {
        format_catalog(&crops)
    } else {
        let ranked = state.model.rank_crops(&technical_values, &crops);
        format_top_recommendations(&ranked, TOOL_TOP_N)
    };
    Ok(Json(serde_json::json!({ "result": result })))
}

#[cfg(feature = "api")]
async fn tool_crops(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let crops = state.store.fetch_crops()?;
    Ok(Json(serde_json::json!({ "result": format_catalog(&crops) })))
}

// ============================================================================
// Error Handling
// ============================================================================

#[cfg(feature = "api")]
#[derive(Debug)]
pub enum AppError {
    Store(String),
    Internal(String),
    NotFound(String),
}

#[cfg(feature = "api")]
impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Store(msg) => AppError::Store(msg),
            other => AppError::Internal(other.to_string()),
        }
    }
}

#[cfg(feature = "api")]
impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::Store(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        };

        tracing::error!("Request failed ({}): {}", status, message);

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
