//! Core data models for the suitability service

use serde::{Deserialize, Serialize};

/// Rated history of a volunteer.
///
/// `reliability`, `punctuality` and `task_quality` are 0-10 ratings;
/// `success_rate` is a 0-1 ratio. Fields absent from the input payload
/// default to zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VolunteerRecord {
    pub reliability: f64,
    pub punctuality: f64,
    pub task_quality: f64,
    pub success_rate: f64,
    pub total_projects: u32,
    pub completed_projects: u32,
    pub total_hours: f64,
    pub availability_hours: f64,
}

/// Attributes of the project a volunteer is being matched against.
///
/// `project_duration` is in weeks, `project_complexity` on a 0-10 scale.
/// `required_hours` of zero is tolerated and never divides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectRecord {
    pub project_duration: f64,
    pub project_complexity: f64,
    pub required_hours: f64,
}

/// Normalized prediction output shared by every strategy.
///
/// `confidence` measures distance from the decision boundary and is allowed
/// to diverge from the raw class probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub is_suitable: bool,
    pub confidence: f64,
    pub probability_suitable: f64,
}

/// Which scoring strategy is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Trained decision-tree ensemble.
    Full,
    /// Feature derivation plus rule scoring, upgraded after training.
    NumericFallback,
    /// Pure rule-based scorer, no trained state.
    RuleFallback,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Full => "full",
            StrategyKind::NumericFallback => "numeric_fallback",
            StrategyKind::RuleFallback => "rule_fallback",
        }
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A prediction together with the path that produced it.
///
/// `fallback_used` is true when the selector recovered from a strategy
/// error by re-answering with the rule scorer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scored {
    #[serde(flatten)]
    pub result: PredictionResult,
    pub strategy: StrategyKind,
    pub fallback_used: bool,
}

/// Capability descriptor returned by selector initialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capabilities {
    pub strategy: StrategyKind,
    pub feature_names: Vec<String>,
    pub is_trained: bool,
}
