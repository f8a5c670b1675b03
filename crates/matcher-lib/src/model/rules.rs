//! Deterministic rule-based scorer
//!
//! The last line of defense: no trained state, no dependencies beyond the
//! input records, and it never returns an error. The weighting below is the
//! reference business formula and is reproduced literally, including the
//! mixed 0-10 and 0-1 scales in the performance mean.

use crate::models::{PredictionResult, ProjectRecord, VolunteerRecord};
use tracing::warn;

/// Score at or above which a volunteer is considered suitable.
pub const SUITABILITY_THRESHOLD: f64 = 0.6;

/// Accuracy reported by the no-op train of strategies without a real fit.
pub const NOMINAL_ACCURACY: f64 = 0.75;

const PERFORMANCE_WEIGHT: f64 = 0.40;
const EXPERIENCE_WEIGHT: f64 = 0.25;
const AVAILABILITY_WEIGHT: f64 = 0.25;
const COMPLEXITY_WEIGHT: f64 = 0.10;

/// Rule-based suitability scorer.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleScorer;

impl RuleScorer {
    pub fn new() -> Self {
        Self
    }

    /// Score one volunteer/project pair.
    ///
    /// A non-finite intermediate (NaN propagated from malformed input) is
    /// answered with the fixed conservative result instead of an error.
    pub fn predict(&self, volunteer: &VolunteerRecord, project: &ProjectRecord) -> PredictionResult {
        let score = self.final_score(volunteer, project);
        if !score.is_finite() {
            warn!(score, "rule scoring produced a non-finite value, using conservative default");
            return Self::conservative_default();
        }

        let is_suitable = score >= SUITABILITY_THRESHOLD;
        let confidence = ((score - SUITABILITY_THRESHOLD).abs() * 2.0).clamp(0.5, 1.0);

        PredictionResult {
            is_suitable,
            confidence,
            probability_suitable: score,
        }
    }

    fn final_score(&self, volunteer: &VolunteerRecord, project: &ProjectRecord) -> f64 {
        // Performance: mean of the three 0-10 ratings and the 0-1 success
        // rate, intentionally un-normalized.
        let performance_score = (volunteer.reliability
            + volunteer.punctuality
            + volunteer.task_quality
            + volunteer.success_rate)
            / 4.0;

        // Experience: completion history, project count and logged hours.
        let completion_rate = safe_divide(
            f64::from(volunteer.completed_projects),
            f64::from(volunteer.total_projects),
            0.5,
        );
        let experience_factor = (f64::from(volunteer.total_projects) / 10.0).min(1.0);
        let hours_factor = (volunteer.total_hours / 1000.0).min(1.0);
        let experience_score =
            completion_rate * 0.6 + experience_factor * 0.2 + hours_factor * 0.2;

        // Availability against the project's required hours.
        let availability_score =
            safe_divide(volunteer.availability_hours, project.required_hours, 0.0).min(1.0);

        // Simpler projects are easier to complete.
        let complexity_factor = (10.0 - project.project_complexity) / 10.0;

        let mut final_score = performance_score * PERFORMANCE_WEIGHT
            + experience_score * EXPERIENCE_WEIGHT
            + availability_score * AVAILABILITY_WEIGHT
            + complexity_factor * COMPLEXITY_WEIGHT;

        // Long projects demand more commitment, short ones are flexible.
        if project.project_duration > 12.0 {
            final_score *= 0.9;
        } else if project.project_duration < 4.0 {
            final_score *= 1.1;
        }

        final_score.clamp(0.0, 1.0)
    }

    /// Fixed answer used when scoring itself faults.
    pub fn conservative_default() -> PredictionResult {
        PredictionResult {
            is_suitable: true,
            confidence: 0.5,
            probability_suitable: 0.6,
        }
    }
}

fn safe_divide(a: f64, b: f64, default: f64) -> f64 {
    if b == 0.0 {
        default
    } else {
        a / b
    }
}
