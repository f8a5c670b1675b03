//! Feature derivation for volunteer/project pairs
//!
//! Turns a raw record pair into the fixed 15-element vector consumed by both
//! the trained ensemble and the rule scorer. The name list and ordering are
//! a compile-time contract shared by training and inference; artifacts whose
//! recorded names differ are rejected at load time.

use crate::models::{ProjectRecord, VolunteerRecord};
use serde::{Deserialize, Serialize};

/// Eleven raw fields plus the four derived fields.
pub const NUM_FEATURES: usize = 15;

/// Ordered feature names. Training-time and inference-time construction both
/// index against this list.
pub const FEATURE_NAMES: [&str; NUM_FEATURES] = [
    "reliability",
    "punctuality",
    "task_quality",
    "success_rate",
    "total_projects",
    "completed_projects",
    "total_hours",
    "availability_hours",
    "project_duration",
    "project_complexity",
    "required_hours",
    "experience_score",
    "performance_avg",
    "availability_ratio",
    "completion_rate",
];

/// Fixed-order numeric encoding of a volunteer+project pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    values: [f64; NUM_FEATURES],
}

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        NUM_FEATURES
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Value by feature name. Test helper mostly; inference works by index.
    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_NAMES
            .iter()
            .position(|n| *n == name)
            .map(|i| self.values[i])
    }
}

/// Derive the feature vector for one volunteer/project pair.
///
/// Pure function of its inputs. `completed_projects` is clamped to
/// `total_projects` before the completion ratio, and `required_hours` at or
/// below zero uses a protected denominator of 1.
pub fn derive(volunteer: &VolunteerRecord, project: &ProjectRecord) -> FeatureVector {
    let total_projects = f64::from(volunteer.total_projects);
    let completed = f64::from(volunteer.completed_projects.min(volunteer.total_projects));

    let experience_score = total_projects * 0.3 + volunteer.total_hours * 0.002;
    let performance_avg =
        (volunteer.reliability + volunteer.punctuality + volunteer.task_quality) / 3.0;

    let required = if project.required_hours > 0.0 {
        project.required_hours
    } else {
        1.0
    };
    let availability_ratio = (volunteer.availability_hours / required).min(2.0);
    let completion_rate = completed / total_projects.max(1.0);

    FeatureVector {
        values: [
            volunteer.reliability,
            volunteer.punctuality,
            volunteer.task_quality,
            volunteer.success_rate,
            total_projects,
            completed,
            volunteer.total_hours,
            volunteer.availability_hours,
            project.project_duration,
            project.project_complexity,
            project.required_hours,
            experience_score,
            performance_avg,
            availability_ratio,
            completion_rate,
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_volunteer() -> VolunteerRecord {
        VolunteerRecord {
            reliability: 8.5,
            punctuality: 9.0,
            task_quality: 8.0,
            success_rate: 0.9,
            total_projects: 12,
            completed_projects: 11,
            total_hours: 150.5,
            availability_hours: 25.0,
        }
    }

    fn sample_project() -> ProjectRecord {
        ProjectRecord {
            project_duration: 6.0,
            project_complexity: 7.0,
            required_hours: 20.0,
        }
    }

    #[test]
    fn feature_order_is_stable() {
        let a = derive(&sample_volunteer(), &sample_project());
        let b = derive(&sample_volunteer(), &sample_project());
        assert_eq!(a, b);
        assert_eq!(a.len(), NUM_FEATURES);
        assert_eq!(FEATURE_NAMES.len(), NUM_FEATURES);
    }

    #[test]
    fn derived_values() {
        let f = derive(&sample_volunteer(), &sample_project());
        let exp = 12.0 * 0.3 + 150.5 * 0.002;
        assert!((f.get("experience_score").unwrap() - exp).abs() < 1e-9);
        let perf = (8.5 + 9.0 + 8.0) / 3.0;
        assert!((f.get("performance_avg").unwrap() - perf).abs() < 1e-9);
        assert!((f.get("availability_ratio").unwrap() - 1.25).abs() < 1e-9);
        assert!((f.get("completion_rate").unwrap() - 11.0 / 12.0).abs() < 1e-9);
    }

    #[test]
    fn availability_ratio_is_capped_at_two() {
        let mut v = sample_volunteer();
        v.availability_hours = 100.0;
        let f = derive(&v, &sample_project());
        assert_eq!(f.get("availability_ratio").unwrap(), 2.0);
    }

    #[test]
    fn zero_required_hours_does_not_divide() {
        let mut p = sample_project();
        p.required_hours = 0.0;
        let f = derive(&sample_volunteer(), &p);
        let ratio = f.get("availability_ratio").unwrap();
        assert!(ratio.is_finite());
        // Protected denominator of 1, capped at 2.
        assert_eq!(ratio, 2.0);
    }

    #[test]
    fn zero_projects_uses_protected_denominator() {
        let mut v = sample_volunteer();
        v.total_projects = 0;
        v.completed_projects = 0;
        let f = derive(&v, &sample_project());
        assert_eq!(f.get("completion_rate").unwrap(), 0.0);
    }

    #[test]
    fn completed_is_clamped_to_total() {
        let mut v = sample_volunteer();
        v.total_projects = 5;
        v.completed_projects = 9;
        let f = derive(&v, &sample_project());
        assert_eq!(f.get("completed_projects").unwrap(), 5.0);
        assert_eq!(f.get("completion_rate").unwrap(), 1.0);
    }

    #[test]
    fn defaulted_records_derive_to_finite_values() {
        let f = derive(&VolunteerRecord::default(), &ProjectRecord::default());
        assert!(f.as_slice().iter().all(|v| v.is_finite()));
    }
}
