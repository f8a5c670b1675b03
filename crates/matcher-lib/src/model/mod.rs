//! Suitability scoring strategies

pub mod features;
#[cfg(feature = "trainable")]
pub mod forest;
pub mod numeric;
pub mod rules;
#[cfg(feature = "trainable")]
pub mod scaler;
pub mod selector;

pub use features::{derive, FeatureVector, FEATURE_NAMES, NUM_FEATURES};
#[cfg(feature = "trainable")]
pub use forest::{ForestConfig, ForestModel, MIN_TRAINING_ROWS};
pub use numeric::NumericModel;
pub use rules::{RuleScorer, NOMINAL_ACCURACY, SUITABILITY_THRESHOLD};
#[cfg(feature = "trainable")]
pub use scaler::StandardScaler;
pub use selector::ModelSelector;
