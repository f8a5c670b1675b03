//! HTTP API for suitability predictions, retraining, health and metrics

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use matcher_lib::{
    health::{ComponentStatus, HealthRegistry},
    MatcherMetrics, ModelError, ModelSelector, ProjectRecord, Scored, StrategyKind,
    StructuredLogger, VolunteerRecord,
};
use prometheus::{Encoder, TextEncoder};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub health_registry: HealthRegistry,
    pub metrics: MatcherMetrics,
    pub logger: StructuredLogger,
    pub selector: Arc<ModelSelector>,
    pub default_dataset: PathBuf,
}

impl AppState {
    pub fn new(
        health_registry: HealthRegistry,
        metrics: MatcherMetrics,
        logger: StructuredLogger,
        selector: Arc<ModelSelector>,
        default_dataset: PathBuf,
    ) -> Self {
        Self {
            health_registry,
            metrics,
            logger,
            selector,
            default_dataset,
        }
    }
}

/// API error carrying the HTTP status and a detail message
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

impl From<ModelError> for ApiError {
    fn from(err: ModelError) -> Self {
        match &err {
            ModelError::NotTrained => ApiError::new(
                StatusCode::SERVICE_UNAVAILABLE,
                "Model is not trained. Contact the administrator.",
            ),
            ModelError::Dataset(_) => {
                ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
            }
            ModelError::Artifact(_) | ModelError::Scoring(_) => {
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PredictRequest {
    pub volunteer: VolunteerRecord,
    pub project: ProjectRecord,
}

#[derive(Debug, Clone, Serialize)]
pub struct PredictResponse {
    #[serde(flatten)]
    pub scored: Scored,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RetrainRequest {
    #[serde(default)]
    pub data_path: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RetrainResponse {
    pub message: String,
    pub accuracy: f64,
    pub strategy: StrategyKind,
    pub status: String,
}

/// One entry of a batch response: a prediction or a per-item error.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum BatchEntry {
    Prediction(PredictResponse),
    Error { error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchResponse {
    pub predictions: Vec<BatchEntry>,
}

fn recommendation_message(scored: &Scored) -> String {
    let confident = scored.result.confidence > 0.8;
    let text = match (scored.result.is_suitable, confident) {
        (true, true) => "Volunteer highly recommended for this project",
        (true, false) => "Volunteer recommended for this project",
        (false, true) => "Volunteer not recommended for this project",
        (false, false) => "Volunteer possibly unsuited to this project",
    };
    text.to_string()
}

fn score_one(state: &AppState, request: &PredictRequest) -> Result<PredictResponse, ModelError> {
    let start = Instant::now();
    let scored = state.selector.predict(&request.volunteer, &request.project)?;
    state
        .metrics
        .observe_prediction_latency(start.elapsed().as_secs_f64());
    state.metrics.inc_predictions();
    state.logger.log_prediction(
        scored.strategy,
        scored.result.is_suitable,
        scored.result.confidence,
        scored.result.probability_suitable,
        scored.fallback_used,
    );

    let message = recommendation_message(&scored);
    Ok(PredictResponse { scored, message })
}

/// Score one volunteer/project pair
async fn predict(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PredictRequest>,
) -> Result<Json<PredictResponse>, ApiError> {
    score_one(&state, &request).map(Json).map_err(|e| {
        state.metrics.inc_prediction_errors();
        ApiError::from(e)
    })
}

/// Score a batch of pairs; per-item failures do not fail the batch
///
/// Each entry takes the same scoring path as `/predict`, so a tier that
/// answers single requests answers batches too.
async fn predict_batch(
    State(state): State<Arc<AppState>>,
    Json(requests): Json<Vec<PredictRequest>>,
) -> Result<Json<BatchResponse>, ApiError> {
    let predictions = requests
        .iter()
        .map(|request| match score_one(&state, request) {
            Ok(response) => BatchEntry::Prediction(response),
            Err(e) => {
                state.metrics.inc_prediction_errors();
                BatchEntry::Error {
                    error: e.to_string(),
                }
            }
        })
        .collect();

    Ok(Json(BatchResponse { predictions }))
}

/// Retrain the active strategy and persist the refreshed artifact
async fn retrain(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RetrainRequest>,
) -> Result<Json<RetrainResponse>, ApiError> {
    let path = request
        .data_path
        .map(PathBuf::from)
        .unwrap_or_else(|| state.default_dataset.clone());

    if !path.exists() {
        return Err(ApiError::new(
            StatusCode::NOT_FOUND,
            format!("Training data file not found: {}", path.display()),
        ));
    }

    let selector = state.selector.clone();
    let train_path = path.clone();
    let start = Instant::now();
    let outcome = tokio::task::spawn_blocking(move || {
        let accuracy = selector.train(&train_path)?;
        selector.save()?;
        Ok::<f64, ModelError>(accuracy)
    })
    .await
    .map_err(|e| {
        ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("training task failed: {e}"),
        )
    })?;

    let strategy = state.selector.strategy_kind();
    match outcome {
        Ok(accuracy) => {
            state
                .metrics
                .observe_training_latency(start.elapsed().as_secs_f64());
            state.metrics.inc_trainings();
            state.logger.log_training(strategy, Some(accuracy), None);
            Ok(Json(RetrainResponse {
                message: "Model retrained successfully".to_string(),
                accuracy,
                strategy,
                status: "success".to_string(),
            }))
        }
        Err(e) => {
            state.metrics.inc_training_errors();
            state.logger.log_training(strategy, None, Some(&e.to_string()));
            Err(ApiError::from(e))
        }
    }
}

/// Describe the active strategy and its feature contract
async fn model_info(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let caps = state.selector.capabilities();
    if !caps.is_trained {
        return Json(json!({
            "status": "not_trained",
            "message": "Model is not trained",
            "strategy": caps.strategy,
        }));
    }

    Json(json!({
        "status": "trained",
        "strategy": caps.strategy,
        "feature_names": caps.feature_names,
        "is_trained": caps.is_trained,
    }))
}

/// Health check response - returns 200 if healthy, 503 if unhealthy
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_registry.health().await;

    let status_code = match health.status {
        ComponentStatus::Healthy => StatusCode::OK,
        ComponentStatus::Degraded => StatusCode::OK, // Still operational
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

/// Readiness check response - returns 200 if ready, 503 if not ready
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

/// Prometheus metrics endpoint
async fn metrics() -> Result<impl IntoResponse, ApiError> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    encoder.encode(&metric_families, &mut buffer).map_err(|e| {
        ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("metrics encoding failed: {e}"),
        )
    })?;

    Ok((
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    ))
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/predict", post(predict))
        .route("/predict/batch", post(predict_batch))
        .route("/retrain", post(retrain))
        .route("/model/info", get(model_info))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Start the API server
pub async fn serve(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
