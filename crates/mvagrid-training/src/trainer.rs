use mvagrid_dataset::balance::TrainingSet;

use crate::grid::GridPoint;

/// Minimum number of training events a configuration is fitted on.
pub const MIN_TRAINING_EVENTS: usize = 10;

/// A fitted signal/background classifier.
pub trait Classifier: Send + Sync {
    /// Classifier response for one feature vector; larger is more signal-like.
    fn score(&self, features: &[f64]) -> f64;

    /// Importance of every input feature, in input order.
    fn feature_importance(&self) -> Vec<(String, f64)>;
}

/// Fits one classifier per grid point.
pub trait Trainer: Sync {
    type Model: Classifier;

    fn fit(&self, point: &GridPoint, set: &TrainingSet<'_>) -> Result<Self::Model, FitError>;
}

/// Failure reported by a [`Trainer`] implementation.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("{message}")]
pub struct FitError {
    pub message: String,
}

impl FitError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum TrainingError {
    #[display("{config}: need at least 2 sample classes, found {found}")]
    InsufficientClasses { config: String, found: usize },
    #[display("{config}: need at least {required} training events, found {found}")]
    InsufficientTrainingData {
        config: String,
        found: usize,
        required: usize,
    },
    #[display("{config}: trainer failed")]
    Trainer { config: String, source: FitError },
}

/// Fits the classifier of one grid point after checking the training set.
///
/// Fails without calling the trainer when fewer than two sample classes or
/// fewer than [`MIN_TRAINING_EVENTS`] events are present.
pub fn train<T>(
    trainer: &T,
    point: &GridPoint,
    set: &TrainingSet<'_>,
) -> Result<T::Model, TrainingError>
where
    T: Trainer + ?Sized,
{
    let classes = set.num_classes();
    if classes < 2 {
        return Err(TrainingError::InsufficientClasses {
            config: point.name.clone(),
            found: classes,
        });
    }
    if set.len() < MIN_TRAINING_EVENTS {
        return Err(TrainingError::InsufficientTrainingData {
            config: point.name.clone(),
            found: set.len(),
            required: MIN_TRAINING_EVENTS,
        });
    }

    tracing::info!(config = %point.name, events = set.len(), "training");
    trainer
        .fit(point, set)
        .map_err(|source| TrainingError::Trainer {
            config: point.name.clone(),
            source,
        })
}
