//! Strategy selection and graceful degradation
//!
//! The selector picks one scoring strategy per process lifetime at startup
//! and owns it for the life of the service. The cascade runs trainable
//! classifier, then numeric fallback, then pure rules; an operator can pin a
//! lower tier explicitly. At call time the selector is the guarantee that
//! the service boundary always receives a well-formed result: an unexpected
//! strategy fault is answered by the rule scorer, with the recovery recorded
//! in the result itself.

use crate::artifact;
use crate::dataset;
use crate::error::ModelError;
#[cfg(feature = "trainable")]
use crate::model::forest::{ForestConfig, ForestModel};
use crate::model::numeric::NumericModel;
use crate::model::rules::{RuleScorer, NOMINAL_ACCURACY};
use crate::models::{Capabilities, ProjectRecord, Scored, StrategyKind, VolunteerRecord};
use crate::observability::MatcherMetrics;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const RULE_MODEL_TYPE: &str = "rule_based";

enum ActiveStrategy {
    #[cfg(feature = "trainable")]
    Full(ForestModel),
    Numeric(NumericModel),
    Rules(RuleScorer),
}

impl ActiveStrategy {
    fn kind(&self) -> StrategyKind {
        match self {
            #[cfg(feature = "trainable")]
            ActiveStrategy::Full(_) => StrategyKind::Full,
            ActiveStrategy::Numeric(_) => StrategyKind::NumericFallback,
            ActiveStrategy::Rules(_) => StrategyKind::RuleFallback,
        }
    }
}

/// Owns the active strategy and dispatches every model operation to it.
pub struct ModelSelector {
    strategy: ActiveStrategy,
    artifact_dir: PathBuf,
    last_resort: RuleScorer,
    metrics: MatcherMetrics,
}

impl ModelSelector {
    /// Select the active strategy, degrading through the cascade.
    ///
    /// Never fails: the rule scorer needs nothing from the environment, so
    /// there is always a tier left to land on. The choice is final for the
    /// process lifetime.
    pub fn initialize(artifact_dir: &Path, requested: Option<StrategyKind>) -> Self {
        let strategy = Self::select(artifact_dir, requested);
        let metrics = MatcherMetrics::new();
        metrics.set_strategy(strategy.kind());
        info!(strategy = %strategy.kind(), "scoring strategy selected");

        Self {
            strategy,
            artifact_dir: artifact_dir.to_path_buf(),
            last_resort: RuleScorer::new(),
            metrics,
        }
    }

    fn select(artifact_dir: &Path, requested: Option<StrategyKind>) -> ActiveStrategy {
        match requested {
            Some(StrategyKind::RuleFallback) => {
                return ActiveStrategy::Rules(RuleScorer::new());
            }
            Some(StrategyKind::NumericFallback) => {
                return ActiveStrategy::Numeric(NumericModel::new(artifact_dir));
            }
            Some(StrategyKind::Full) | None => {}
        }

        #[cfg(feature = "trainable")]
        match ForestModel::new(artifact_dir, ForestConfig::default()) {
            Ok(model) => return ActiveStrategy::Full(model),
            Err(e) => {
                warn!(error = %e, "trainable classifier unavailable, degrading to numeric fallback");
            }
        }

        #[cfg(not(feature = "trainable"))]
        warn!("built without the trainable classifier, degrading to numeric fallback");

        ActiveStrategy::Numeric(NumericModel::new(artifact_dir))
    }

    /// Read-only capability descriptor for the active strategy.
    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            strategy: self.strategy.kind(),
            feature_names: artifact::ArtifactMetadata::contract_names(),
            is_trained: self.is_trained(),
        }
    }

    pub fn strategy_kind(&self) -> StrategyKind {
        self.strategy.kind()
    }

    pub fn is_trained(&self) -> bool {
        match &self.strategy {
            #[cfg(feature = "trainable")]
            ActiveStrategy::Full(m) => m.is_trained(),
            ActiveStrategy::Numeric(m) => m.is_trained(),
            ActiveStrategy::Rules(_) => true,
        }
    }

    /// Score one volunteer/project pair with the active strategy.
    ///
    /// `NotTrained` is the one error surfaced to the caller; any other
    /// strategy fault is recovered by re-answering with the rule scorer.
    pub fn predict(
        &self,
        volunteer: &VolunteerRecord,
        project: &ProjectRecord,
    ) -> Result<Scored, ModelError> {
        match &self.strategy {
            #[cfg(feature = "trainable")]
            ActiveStrategy::Full(model) => match model.predict(volunteer, project) {
                Ok(result) => Ok(Scored {
                    result,
                    strategy: StrategyKind::Full,
                    fallback_used: false,
                }),
                Err(ModelError::NotTrained) => Err(ModelError::NotTrained),
                Err(e) => Ok(self.recover(volunteer, project, &e)),
            },
            ActiveStrategy::Numeric(model) => Ok(Scored {
                result: model.predict(volunteer, project),
                strategy: StrategyKind::NumericFallback,
                fallback_used: false,
            }),
            ActiveStrategy::Rules(scorer) => Ok(Scored {
                result: scorer.predict(volunteer, project),
                strategy: StrategyKind::RuleFallback,
                fallback_used: false,
            }),
        }
    }

    /// Last-resort recovery: answer with the rule scorer and mark the result.
    fn recover(
        &self,
        volunteer: &VolunteerRecord,
        project: &ProjectRecord,
        error: &ModelError,
    ) -> Scored {
        warn!(error = %error, "strategy fault during predict, recovering with rule scorer");
        self.metrics.inc_fallback_predictions();
        Scored {
            result: self.last_resort.predict(volunteer, project),
            strategy: StrategyKind::RuleFallback,
            fallback_used: true,
        }
    }

    /// Train the active strategy on a CSV dataset.
    ///
    /// The dataset is validated before dispatch, so a missing file or label
    /// column is a `DatasetError` on every tier rather than a fabricated
    /// accuracy.
    pub fn train(&self, dataset_path: &Path) -> Result<f64, ModelError> {
        let data = dataset::load_csv(dataset_path)?;
        match &self.strategy {
            #[cfg(feature = "trainable")]
            ActiveStrategy::Full(model) => model.train(&data),
            ActiveStrategy::Numeric(model) => {
                info!(rows = data.len(), "no classifier at this tier, recording nominal accuracy");
                Ok(model.train())
            }
            ActiveStrategy::Rules(_) => {
                info!(rows = data.len(), "rule scorer needs no training, recording nominal accuracy");
                Ok(NOMINAL_ACCURACY)
            }
        }
    }

    /// Persist the active strategy's artifact.
    pub fn save(&self) -> Result<(), ModelError> {
        match &self.strategy {
            #[cfg(feature = "trainable")]
            ActiveStrategy::Full(model) => model.save(),
            ActiveStrategy::Numeric(model) => model.save(),
            ActiveStrategy::Rules(_) => artifact::save_metadata(&self.artifact_dir, RULE_MODEL_TYPE),
        }
    }

    /// Restore the active strategy's artifact.
    ///
    /// `Ok(false)` means nothing was persisted; an error means an artifact
    /// exists but is unusable, and the current state is left untouched.
    pub fn load(&self) -> Result<bool, ModelError> {
        match &self.strategy {
            #[cfg(feature = "trainable")]
            ActiveStrategy::Full(model) => model.load(),
            ActiveStrategy::Numeric(model) => model.load(),
            ActiveStrategy::Rules(_) => {
                if !self.artifact_dir.join(artifact::METADATA_FILE).exists() {
                    return Ok(false);
                }
                artifact::load_metadata(&self.artifact_dir)?;
                Ok(true)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    const HEADER: &str = "reliability,punctuality,task_quality,success_rate,total_projects,completed_projects,total_hours,availability_hours,project_duration,project_complexity,required_hours,is_suitable";

    fn training_csv() -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        writeln!(f, "{HEADER}").unwrap();
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
        f.flush().unwrap();
        f
    }

    fn sample() -> (VolunteerRecord, ProjectRecord) {
        (
            VolunteerRecord {
                reliability: 8.5,
                punctuality: 8.5,
                task_quality: 8.0,
                success_rate: 0.9,
                total_projects: 10,
                completed_projects: 9,
                total_hours: 170.0,
                availability_hours: 28.0,
            },
            ProjectRecord {
                project_duration: 6.0,
                project_complexity: 4.0,
                required_hours: 20.0,
            },
        )
    }

    #[cfg(feature = "trainable")]
    #[test]
    fn default_cascade_lands_on_the_trainable_tier() {
        let dir = TempDir::new().unwrap();
        let selector = ModelSelector::initialize(dir.path(), None);
        assert_eq!(selector.strategy_kind(), StrategyKind::Full);
        assert!(!selector.is_trained());
    }

    #[cfg(feature = "trainable")]
    #[test]
    fn untrained_full_tier_surfaces_not_trained() {
        let dir = TempDir::new().unwrap();
        let selector = ModelSelector::initialize(dir.path(), None);
        let (v, p) = sample();
        assert!(matches!(selector.predict(&v, &p).unwrap_err(), ModelError::NotTrained));
    }

    #[cfg(feature = "trainable")]
    #[test]
    fn train_then_predict_uses_the_full_strategy() {
        let dir = TempDir::new().unwrap();
        let selector = ModelSelector::initialize(dir.path(), None);
        let csv = training_csv();

        let accuracy = selector.train(csv.path()).unwrap();
        assert!((0.0..=1.0).contains(&accuracy));
        assert!(selector.is_trained());

        let (v, p) = sample();
        let scored = selector.predict(&v, &p).unwrap();
        assert_eq!(scored.strategy, StrategyKind::Full);
        assert!(!scored.fallback_used);
        assert!((0.0..=1.0).contains(&scored.result.probability_suitable));
    }

    #[cfg(feature = "trainable")]
    #[test]
    fn save_and_load_round_trip_through_the_selector() {
        let dir = TempDir::new().unwrap();
        let selector = ModelSelector::initialize(dir.path(), None);
        let csv = training_csv();
        selector.train(csv.path()).unwrap();
        selector.save().unwrap();

        let restored = ModelSelector::initialize(dir.path(), None);
        assert!(restored.load().unwrap());
        assert!(restored.is_trained());

        let (v, p) = sample();
        assert_eq!(
            selector.predict(&v, &p).unwrap().result,
            restored.predict(&v, &p).unwrap().result
        );
    }

    #[test]
    fn pinned_rule_tier_answers_untrained() {
        let dir = TempDir::new().unwrap();
        let selector = ModelSelector::initialize(dir.path(), Some(StrategyKind::RuleFallback));
        assert_eq!(selector.strategy_kind(), StrategyKind::RuleFallback);
        assert!(selector.is_trained());

        let (v, p) = sample();
        let scored = selector.predict(&v, &p).unwrap();
        assert_eq!(scored.strategy, StrategyKind::RuleFallback);
        assert!(!scored.fallback_used);
        assert!((0.5..=1.0).contains(&scored.result.confidence));
    }

    #[test]
    fn numeric_tier_trains_to_nominal_accuracy() {
        let dir = TempDir::new().unwrap();
        let selector = ModelSelector::initialize(dir.path(), Some(StrategyKind::NumericFallback));
        let csv = training_csv();

        let accuracy = selector.train(csv.path()).unwrap();
        assert_eq!(accuracy, NOMINAL_ACCURACY);
        assert!(selector.is_trained());

        let (v, p) = sample();
        let scored = selector.predict(&v, &p).unwrap();
        assert_eq!(scored.strategy, StrategyKind::NumericFallback);
    }

    #[test]
    fn rule_tier_load_reports_whether_metadata_was_persisted() {
        let dir = TempDir::new().unwrap();
        let selector = ModelSelector::initialize(dir.path(), Some(StrategyKind::RuleFallback));

        // Fresh deployment: nothing persisted yet.
        assert!(!selector.load().unwrap());

        selector.save().unwrap();
        assert!(selector.load().unwrap());
    }

    #[test]
    fn missing_dataset_is_an_error_on_every_tier() {
        let dir = TempDir::new().unwrap();
        for kind in [StrategyKind::NumericFallback, StrategyKind::RuleFallback] {
            let selector = ModelSelector::initialize(dir.path(), Some(kind));
            let err = selector.train(Path::new("/nonexistent/data.csv")).unwrap_err();
            assert!(matches!(err, ModelError::Dataset(_)));
        }
    }

    #[test]
    fn recovery_answers_with_the_rule_scorer() {
        let dir = TempDir::new().unwrap();
        let selector = ModelSelector::initialize(dir.path(), Some(StrategyKind::RuleFallback));
        let (v, p) = sample();

        let scored = selector.recover(&v, &p, &ModelError::scoring("forced fault"));
        assert_eq!(scored.strategy, StrategyKind::RuleFallback);
        assert!(scored.fallback_used);
        assert!((0.5..=1.0).contains(&scored.result.confidence));
        assert!((0.0..=1.0).contains(&scored.result.probability_suitable));
    }

    #[test]
    fn capabilities_expose_the_feature_contract() {
        let dir = TempDir::new().unwrap();
        let selector = ModelSelector::initialize(dir.path(), Some(StrategyKind::RuleFallback));
        let caps = selector.capabilities();
        assert_eq!(caps.strategy, StrategyKind::RuleFallback);
        assert_eq!(caps.feature_names.len(), crate::model::features::NUM_FEATURES);
        assert_eq!(caps.feature_names[0], "reliability");
        assert!(caps.is_trained);
    }
}
