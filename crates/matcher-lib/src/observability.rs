//! Observability infrastructure for the suitability service
//!
//! Provides:
//! - Prometheus metrics (prediction/training latency, prediction counters,
//!   fallback usage, active strategy info)
//! - Structured JSON logging with tracing

use crate::models::StrategyKind;
use prometheus::{
    register_gauge_vec, register_histogram, register_int_gauge, GaugeVec, Histogram, IntGauge,
};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Default histogram buckets for prediction latency (in seconds)
const PREDICTION_LATENCY_BUCKETS: &[f64] = &[
    0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
];

/// Histogram buckets for training runs, which take much longer
const TRAINING_LATENCY_BUCKETS: &[f64] = &[0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 15.0, 60.0, 300.0];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<MatcherMetricsInner> = OnceLock::new();

struct MatcherMetricsInner {
    prediction_latency_seconds: Histogram,
    training_latency_seconds: Histogram,
    predictions_total: IntGauge,
    prediction_errors_total: IntGauge,
    fallback_predictions_total: IntGauge,
    trainings_total: IntGauge,
    training_errors_total: IntGauge,
    strategy_info: GaugeVec,
}

impl MatcherMetricsInner {
    fn new() -> Self {
        Self {
            prediction_latency_seconds: register_histogram!(
                "suitability_prediction_latency_seconds",
                "Time spent scoring one volunteer/project pair",
                PREDICTION_LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register prediction_latency_seconds"),

            training_latency_seconds: register_histogram!(
                "suitability_training_latency_seconds",
                "Time spent in one training run",
                TRAINING_LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register training_latency_seconds"),

            predictions_total: register_int_gauge!(
                "suitability_predictions_total",
                "Total number of predictions served"
            )
            .expect("Failed to register predictions_total"),

            prediction_errors_total: register_int_gauge!(
                "suitability_prediction_errors_total",
                "Total number of prediction requests answered with an error"
            )
            .expect("Failed to register prediction_errors_total"),

            fallback_predictions_total: register_int_gauge!(
                "suitability_fallback_predictions_total",
                "Predictions answered by the rule scorer after a strategy fault"
            )
            .expect("Failed to register fallback_predictions_total"),

            trainings_total: register_int_gauge!(
                "suitability_trainings_total",
                "Total number of completed training runs"
            )
            .expect("Failed to register trainings_total"),

            training_errors_total: register_int_gauge!(
                "suitability_training_errors_total",
                "Total number of failed training runs"
            )
            .expect("Failed to register training_errors_total"),

            strategy_info: register_gauge_vec!(
                "suitability_strategy_info",
                "Information about the active scoring strategy",
                &["strategy"]
            )
            .expect("Failed to register strategy_info"),
        }
    }
}

/// Matcher metrics for Prometheus exposition
///
/// This is a lightweight handle to the global metrics instance.
/// Multiple clones share the same underlying metrics.
#[derive(Clone)]
pub struct MatcherMetrics {
    _private: (),
}

impl Default for MatcherMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl MatcherMetrics {
    /// Create a new metrics handle (initializes global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(MatcherMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &MatcherMetricsInner {
        GLOBAL_METRICS.get().expect("Metrics not initialized")
    }

    pub fn observe_prediction_latency(&self, duration_secs: f64) {
        self.inner().prediction_latency_seconds.observe(duration_secs);
    }

    pub fn observe_training_latency(&self, duration_secs: f64) {
        self.inner().training_latency_seconds.observe(duration_secs);
    }

    pub fn inc_predictions(&self) {
        self.inner().predictions_total.inc();
    }

    pub fn inc_prediction_errors(&self) {
        self.inner().prediction_errors_total.inc();
    }

    pub fn inc_fallback_predictions(&self) {
        self.inner().fallback_predictions_total.inc();
    }

    pub fn inc_trainings(&self) {
        self.inner().trainings_total.inc();
    }

    pub fn inc_training_errors(&self) {
        self.inner().training_errors_total.inc();
    }

    /// Record the strategy selected at startup.
    pub fn set_strategy(&self, strategy: StrategyKind) {
        self.inner().strategy_info.reset();
        self.inner()
            .strategy_info
            .with_label_values(&[strategy.as_str()])
            .set(1.0);
    }
}

/// Structured logger for service events
///
/// Provides consistent JSON-formatted logging for predictions, training
/// runs and lifecycle events.
#[derive(Clone)]
pub struct StructuredLogger {
    service_name: String,
}

impl StructuredLogger {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }

    /// Log a served prediction
    pub fn log_prediction(
        &self,
        strategy: StrategyKind,
        is_suitable: bool,
        confidence: f64,
        probability_suitable: f64,
        fallback_used: bool,
    ) {
        info!(
            event = "prediction_served",
            service = %self.service_name,
            strategy = %strategy,
            is_suitable = is_suitable,
            confidence = confidence,
            probability_suitable = probability_suitable,
            fallback_used = fallback_used,
            "Prediction served"
        );
    }

    /// Log the outcome of a training run
    pub fn log_training(&self, strategy: StrategyKind, accuracy: Option<f64>, error: Option<&str>) {
        match (accuracy, error) {
            (Some(accuracy), _) => {
                info!(
                    event = "training_completed",
                    service = %self.service_name,
                    strategy = %strategy,
                    accuracy = accuracy,
                    "Training run completed"
                );
            }
            (None, reason) => {
                warn!(
                    event = "training_failed",
                    service = %self.service_name,
                    strategy = %strategy,
                    reason = reason.unwrap_or("unknown"),
                    "Training run failed"
                );
            }
        }
    }

    /// Log an artifact load attempt at startup
    pub fn log_artifact_load(&self, loaded: bool, detail: &str) {
        if loaded {
            info!(
                event = "artifact_loaded",
                service = %self.service_name,
                detail = %detail,
                "Model artifact loaded"
            );
        } else {
            warn!(
                event = "artifact_unavailable",
                service = %self.service_name,
                detail = %detail,
                "Serving without a persisted model artifact"
            );
        }
    }

    /// Log service startup
    pub fn log_startup(&self, version: &str, strategy: StrategyKind) {
        info!(
            event = "service_started",
            service = %self.service_name,
            version = %version,
            strategy = %strategy,
            "Suitability service started"
        );
    }

    /// Log service shutdown
    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "service_shutdown",
            service = %self.service_name,
            reason = %reason,
            "Suitability service shutting down"
        );
    }
}
