//! Integration tests for the suitability API endpoints

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use matcher_lib::{
    health::{components, HealthRegistry},
    MatcherMetrics, ModelSelector, StrategyKind, StructuredLogger,
};
use serde_json::{json, Value};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use suitability_server::api::{self, AppState};
use tempfile::TempDir;
use tower::ServiceExt;

async fn setup_test_app(strategy: Option<StrategyKind>) -> (Router, Arc<AppState>, TempDir) {
    let dir = TempDir::new().unwrap();

    let health_registry = HealthRegistry::new();
    health_registry.register(components::MODEL).await;
    health_registry.register(components::ARTIFACT_STORE).await;

    let metrics = MatcherMetrics::new();
    let logger = StructuredLogger::new("test-service");
    let selector = Arc::new(ModelSelector::initialize(&dir.path().join("models"), strategy));

    let state = Arc::new(AppState::new(
        health_registry,
        metrics,
        logger,
        selector,
        dir.path().join("training_data.csv"),
    ));
    let router = api::create_router(state.clone());

    (router, state, dir)
}

fn write_training_csv(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("training_data.csv");
    let mut f = std::fs::File::create(&path).unwrap();
    writeln!(
        f,
        "reliability,punctuality,task_quality,success_rate,total_projects,completed_projects,total_hours,availability_hours,project_duration,project_complexity,required_hours,is_suitable"
    )
    .unwrap();
    for i in 0..15 {
        let jitter = (i % 5) as f64 * 0.1;
        writeln!(
            f,
            "{r},{r},{r},0.9,12,11,{h},30.0,6.0,3.0,20.0,1",
            r = 8.0 + jitter,
            h = 180.0 + jitter * 20.0
        )
        .unwrap();
        writeln!(
            f,
            "{r},{r},{r},0.2,2,1,{h},4.0,10.0,8.0,40.0,0",
            r = 2.0 + jitter,
            h = 15.0 + jitter * 10.0
        )
        .unwrap();
    }
    path
}

fn predict_payload() -> Value {
    json!({
        "volunteer": {
            "reliability": 8.5,
            "punctuality": 9.0,
            "task_quality": 8.0,
            "success_rate": 0.9,
            "total_projects": 12,
            "completed_projects": 11,
            "total_hours": 150.5,
            "availability_hours": 25.0
        },
        "project": {
            "project_duration": 6.0,
            "project_complexity": 7.0,
            "required_hours": 20.0
        }
    })
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_predict_with_rule_strategy() {
    let (app, _state, _dir) = setup_test_app(Some(StrategyKind::RuleFallback)).await;

    let response = app
        .oneshot(post_json("/predict", &predict_payload()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["is_suitable"], true);
    assert_eq!(body["strategy"], "rule_fallback");
    assert_eq!(body["fallback_used"], false);
    let confidence = body["confidence"].as_f64().unwrap();
    assert!((0.5..=1.0).contains(&confidence));
    let probability = body["probability_suitable"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&probability));
    assert!(body["message"].as_str().unwrap().contains("recommended"));
}

#[tokio::test]
async fn test_predict_untrained_full_tier_returns_503() {
    let (app, state, _dir) = setup_test_app(None).await;

    // Only meaningful when the trainable tier is present and untrained.
    if state.selector.strategy_kind() != StrategyKind::Full {
        return;
    }

    let response = app
        .oneshot(post_json("/predict", &predict_payload()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body = body_json(response).await;
    assert!(body["detail"].as_str().unwrap().contains("not trained"));
}

#[tokio::test]
async fn test_retrain_then_predict_on_full_tier() {
    let (app, state, dir) = setup_test_app(None).await;
    write_training_csv(&dir);

    let response = app
        .clone()
        .oneshot(post_json("/retrain", &json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "success");
    let accuracy = body["accuracy"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&accuracy));

    let response = app
        .oneshot(post_json("/predict", &predict_payload()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(
        body["strategy"].as_str().unwrap(),
        state.selector.strategy_kind().as_str()
    );
}

#[tokio::test]
async fn test_retrain_missing_dataset_returns_404() {
    let (app, _state, _dir) = setup_test_app(Some(StrategyKind::RuleFallback)).await;

    let response = app
        .oneshot(post_json(
            "/retrain",
            &json!({ "data_path": "/nonexistent/data.csv" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = body_json(response).await;
    assert!(body["detail"].as_str().unwrap().contains("not found"));
}

#[tokio::test]
async fn test_retrain_malformed_dataset_returns_422() {
    let (app, _state, dir) = setup_test_app(Some(StrategyKind::RuleFallback)).await;

    // Header without the required label column.
    let path = dir.path().join("bad.csv");
    let mut f = std::fs::File::create(&path).unwrap();
    writeln!(f, "reliability,punctuality").unwrap();
    writeln!(f, "8.0,9.0").unwrap();

    let response = app
        .oneshot(post_json(
            "/retrain",
            &json!({ "data_path": path.to_str().unwrap() }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = body_json(response).await;
    assert!(body["detail"].as_str().unwrap().contains("is_suitable"));
}

#[tokio::test]
async fn test_batch_predictions() {
    let (app, _state, _dir) = setup_test_app(Some(StrategyKind::RuleFallback)).await;

    let payload = json!([predict_payload(), predict_payload()]);
    let response = app
        .oneshot(post_json("/predict/batch", &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let predictions = body["predictions"].as_array().unwrap();
    assert_eq!(predictions.len(), 2);
    for entry in predictions {
        assert!(entry["is_suitable"].is_boolean());
        assert!(entry["confidence"].is_number());
    }
}

#[tokio::test]
async fn test_batch_and_single_agree_on_untrained_numeric_tier() {
    let (app, _state, _dir) = setup_test_app(Some(StrategyKind::NumericFallback)).await;

    let single = app
        .clone()
        .oneshot(post_json("/predict", &predict_payload()))
        .await
        .unwrap();
    let batch = app
        .oneshot(post_json("/predict/batch", &json!([predict_payload()])))
        .await
        .unwrap();

    // The numeric tier answers untrained; a batch of the same request
    // must not be turned away.
    assert_eq!(single.status(), StatusCode::OK);
    assert_eq!(batch.status(), StatusCode::OK);

    let single_body = body_json(single).await;
    let batch_body = body_json(batch).await;
    let entry = &batch_body["predictions"][0];
    assert_eq!(entry["is_suitable"], single_body["is_suitable"]);
    assert_eq!(entry["probability_suitable"], single_body["probability_suitable"]);
    assert_eq!(entry["strategy"], single_body["strategy"]);
}

#[tokio::test]
async fn test_model_info_untrained_and_trained() {
    let (app, _state, dir) = setup_test_app(Some(StrategyKind::NumericFallback)).await;

    let response = app.clone().oneshot(get("/model/info")).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(body["status"], "not_trained");

    write_training_csv(&dir);
    let response = app
        .clone()
        .oneshot(post_json("/retrain", &json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get("/model/info")).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(body["status"], "trained");
    assert_eq!(body["strategy"], "numeric_fallback");
    let names = body["feature_names"].as_array().unwrap();
    assert_eq!(names.len(), 15);
    assert_eq!(names[0], "reliability");
}

#[tokio::test]
async fn test_healthz_returns_ok_when_healthy() {
    let (app, _state, _dir) = setup_test_app(Some(StrategyKind::RuleFallback)).await;

    let response = app.oneshot(get("/healthz")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert!(body["components"]["model"].is_object());
    assert!(body["components"]["artifact_store"].is_object());
}

#[tokio::test]
async fn test_healthz_returns_503_when_unhealthy() {
    let (app, state, _dir) = setup_test_app(Some(StrategyKind::RuleFallback)).await;

    state
        .health_registry
        .set_unhealthy(components::MODEL, "Strategy initialization failed")
        .await;

    let response = app.oneshot(get("/healthz")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_readyz_transitions() {
    let (app, state, _dir) = setup_test_app(Some(StrategyKind::RuleFallback)).await;

    let response = app.clone().oneshot(get("/readyz")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    state.health_registry.set_ready(true).await;

    let response = app.oneshot(get("/readyz")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_metrics_endpoint_returns_prometheus_format() {
    let (app, state, _dir) = setup_test_app(Some(StrategyKind::RuleFallback)).await;

    state.metrics.observe_prediction_latency(0.001);
    state.metrics.inc_predictions();

    let response = app.oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response.headers().get("content-type").unwrap();
    assert!(content_type.to_str().unwrap().contains("text/plain"));

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let metrics_text = String::from_utf8(body.to_vec()).unwrap();

    assert!(metrics_text.contains("suitability_prediction_latency_seconds"));
    assert!(metrics_text.contains("suitability_predictions_total"));
    assert!(metrics_text.contains("suitability_strategy_info"));
}
