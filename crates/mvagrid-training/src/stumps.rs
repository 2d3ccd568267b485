//! Boosted decision stumps, the built-in reference classifier.
//!
//! AdaBoost over one-cut decision stumps. Each round scans `nCuts` equally
//! spaced cuts per feature, keeps the stump with the lowest weighted
//! misclassification, and re-weights the events it got wrong.
//!
//! | Hyperparameter | Meaning                                 | Default |
//! |----------------|-----------------------------------------|---------|
//! | `NTrees`       | maximum number of boosting rounds       | 100     |
//! | `Shrinkage`    | learning rate applied to each stump     | 0.5     |
//! | `nCuts`        | candidate cuts per feature and round    | 20      |
//!
//! The response is `Σ α_k h_k(x) / Σ α_k`, in `[-1, 1]`. A feature's
//! importance is the share of the total `α` carried by stumps cutting on it.
//! Events with negative weight do not take part in the fit.

use mvagrid_dataset::{balance::TrainingSet, category::SampleClass};
use serde::{Deserialize, Serialize};

use crate::{
    grid::{GridPoint, ParamValue},
    trainer::{Classifier, FitError, Trainer},
};

const DEFAULT_TREES: usize = 100;
const DEFAULT_SHRINKAGE: f64 = 0.5;
const DEFAULT_CUTS: usize = 20;
const MIN_ERROR: f64 = 1e-10;

/// Hyperparameters read from a grid point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StumpParams {
    pub trees: usize,
    pub shrinkage: f64,
    pub cuts: usize,
}

impl Default for StumpParams {
    fn default() -> Self {
        Self {
            trees: DEFAULT_TREES,
            shrinkage: DEFAULT_SHRINKAGE,
            cuts: DEFAULT_CUTS,
        }
    }
}

impl StumpParams {
    pub fn from_point(point: &GridPoint) -> Result<Self, FitError> {
        let mut params = Self::default();
        for coordinate in &point.coordinates {
            match coordinate.axis.as_str() {
                "NTrees" => params.trees = positive_count(&coordinate.axis, &coordinate.value)?,
                "nCuts" => params.cuts = positive_count(&coordinate.axis, &coordinate.value)?,
                "Shrinkage" => {
                    params.shrinkage = coordinate
                        .value
                        .as_f64()
                        .filter(|v| *v > 0.0)
                        .ok_or_else(|| {
                            FitError::new(format!(
                                "Shrinkage must be positive, got {}",
                                coordinate.value
                            ))
                        })?;
                }
                other => tracing::debug!(option = other, "option ignored by boosted stumps"),
            }
        }
        Ok(params)
    }
}

fn positive_count(axis: &str, value: &ParamValue) -> Result<usize, FitError> {
    match value {
        ParamValue::Int(v) if *v > 0 => usize::try_from(*v).map_err(|_| out_of_range(axis, value)),
        _ => Err(out_of_range(axis, value)),
    }
}

fn out_of_range(axis: &str, value: &ParamValue) -> FitError {
    FitError::new(format!("{axis} must be a positive integer, got {value}"))
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stump {
    pub feature: usize,
    pub cut: f64,
    /// `+1` when values at or above the cut are signal-like, `-1` otherwise.
    pub polarity: f64,
    pub alpha: f64,
}

impl Stump {
    fn vote(&self, features: &[f64]) -> f64 {
        let above = features.get(self.feature).is_some_and(|v| *v >= self.cut);
        if above { self.polarity } else { -self.polarity }
    }
}

/// A fitted stump ensemble.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoostedStumps {
    pub feature_names: Vec<String>,
    pub stumps: Vec<Stump>,
}

impl Classifier for BoostedStumps {
    fn score(&self, features: &[f64]) -> f64 {
        let total = self.stumps.iter().map(|s| s.alpha).sum::<f64>();
        if total <= 0.0 {
            return 0.0;
        }
        self.stumps
            .iter()
            .map(|s| s.alpha * s.vote(features))
            .sum::<f64>()
            / total
    }

    fn feature_importance(&self) -> Vec<(String, f64)> {
        let mut importance = vec![0.0; self.feature_names.len()];
        for stump in &self.stumps {
            if let Some(slot) = importance.get_mut(stump.feature) {
                *slot += stump.alpha;
            }
        }
        let total = importance.iter().sum::<f64>();
        self.feature_names
            .iter()
            .cloned()
            .zip(importance)
            .map(|(name, v)| (name, if total > 0.0 { v / total } else { 0.0 }))
            .collect()
    }
}

/// Trainer producing [`BoostedStumps`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BoostedStumpTrainer;

impl Trainer for BoostedStumpTrainer {
    type Model = BoostedStumps;

    fn fit(&self, point: &GridPoint, set: &TrainingSet<'_>) -> Result<BoostedStumps, FitError> {
        let params = StumpParams::from_point(point)?;
        Ok(fit_stumps(set, params))
    }
}

/// Candidate cuts and per-event bin index of one feature.
struct FeatureCuts {
    cuts: Vec<f64>,
    /// Number of cuts at or below each event's value.
    bins: Vec<usize>,
}

impl FeatureCuts {
    #[expect(clippy::cast_precision_loss)]
    fn new(values: impl Iterator<Item = f64> + Clone, num_cuts: usize) -> Self {
        let (min, max) = values
            .clone()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        let cuts = if min.is_finite() && max > min {
            let step = (max - min) / (num_cuts + 1) as f64;
            (1..=num_cuts).map(|k| min + step * k as f64).collect()
        } else {
            vec![]
        };
        let bins = values
            .map(|v| cuts.partition_point(|c| *c <= v))
            .collect();
        Self { cuts, bins }
    }
}

#[must_use]
pub fn fit_stumps(set: &TrainingSet<'_>, params: StumpParams) -> BoostedStumps {
    let num_features = set.feature_names.len();
    let labels = set
        .events
        .iter()
        .map(|e| if e.class == SampleClass::Signal { 1.0 } else { -1.0 })
        .collect::<Vec<f64>>();
    let mut weights = set
        .events
        .iter()
        .map(|e| e.weight.max(0.0))
        .collect::<Vec<_>>();
    normalize(&mut weights);

    let features = (0..num_features)
        .map(|f| FeatureCuts::new(set.events.iter().map(move |e| e.features[f]), params.cuts))
        .collect::<Vec<_>>();

    let mut stumps = vec![];
    for round in 0..params.trees {
        let Some((mut stump, error)) = best_stump(&features, &labels, &weights) else {
            break;
        };
        if error >= 0.5 {
            tracing::debug!(round, error, "no stump better than chance");
            break;
        }
        let error = error.max(MIN_ERROR);
        stump.alpha = params.shrinkage * 0.5 * ((1.0 - error) / error).ln();

        for ((w, y), e) in weights.iter_mut().zip(&labels).zip(&set.events) {
            *w *= (-stump.alpha * y * stump.vote(e.features)).exp();
        }
        normalize(&mut weights);
        stumps.push(stump);
    }

    BoostedStumps {
        feature_names: set.feature_names.to_vec(),
        stumps,
    }
}

fn normalize(weights: &mut [f64]) {
    let total = weights.iter().sum::<f64>();
    if total > 0.0 {
        weights.iter_mut().for_each(|w| *w /= total);
    }
}

/// Finds the stump with the lowest weighted error.
fn best_stump(features: &[FeatureCuts], labels: &[f64], weights: &[f64]) -> Option<(Stump, f64)> {
    let mut best: Option<(Stump, f64)> = None;
    for (feature, cuts) in features.iter().enumerate() {
        let num_bins = cuts.cuts.len() + 1;
        let mut signal = vec![0.0; num_bins];
        let mut background = vec![0.0; num_bins];
        for ((&bin, &y), &w) in cuts.bins.iter().zip(labels).zip(weights) {
            if y > 0.0 {
                signal[bin] += w;
            } else {
                background[bin] += w;
            }
        }
        let total_background = background.iter().sum::<f64>();

        // Error of "signal iff value >= cut": signal below plus background above
        let mut signal_below = 0.0;
        let mut background_below = 0.0;
        for (k, &cut) in cuts.cuts.iter().enumerate() {
            signal_below += signal[k];
            background_below += background[k];
            let error = signal_below + (total_background - background_below);
            for (polarity, error) in [(1.0, error), (-1.0, 1.0 - error)] {
                if best.is_none_or(|(_, e)| error < e) {
                    best = Some((
                        Stump {
                            feature,
                            cut,
                            polarity,
                            alpha: 0.0,
                        },
                        error,
                    ));
                }
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use mvagrid_dataset::balance::TrainingEvent;
    use rand::SeedableRng as _;
    use rand_distr::{Distribution as _, Normal};
    use rand_pcg::Pcg32;

    use crate::grid::{GridAxis, GridSpace};

    use super::*;

    fn sample(n: usize, mean: f64, rng: &mut Pcg32) -> Vec<Vec<f64>> {
        let informative = Normal::new(mean, 1.0).unwrap();
        let noise = Normal::new(0.0, 1.0).unwrap();
        (0..n)
            .map(|_| vec![informative.sample(rng), noise.sample(rng)])
            .collect()
    }

    fn names() -> Vec<String> {
        vec!["good".into(), "noise".into()]
    }

    fn training_set<'a>(
        names: &'a [String],
        signal: &'a [Vec<f64>],
        background: &'a [Vec<f64>],
    ) -> TrainingSet<'a> {
        let events = signal
            .iter()
            .map(|f| (f, SampleClass::Signal))
            .chain(background.iter().map(|f| (f, SampleClass::Background)))
            .map(|(f, class)| TrainingEvent {
                features: f,
                class,
                weight: 1.0,
            })
            .collect();
        TrainingSet {
            feature_names: names,
            events,
        }
    }

    #[test]
    fn test_separates_shifted_gaussians() {
        let mut rng = Pcg32::seed_from_u64(1);
        let signal = sample(300, 2.0, &mut rng);
        let background = sample(300, -2.0, &mut rng);
        let names = names();
        let set = training_set(&names, &signal, &background);

        let model = fit_stumps(&set, StumpParams::default());
        let mean = |events: &[Vec<f64>]| {
            events.iter().map(|f| model.score(f)).sum::<f64>() / events.len() as f64
        };
        assert!(mean(&signal) > 0.3);
        assert!(mean(&background) < -0.3);
        assert!(signal.iter().all(|f| (-1.0..=1.0).contains(&model.score(f))));

        let importance = model.feature_importance();
        assert_eq!(importance[0].0, "good");
        assert!(importance[0].1 > importance[1].1);
        let total = importance.iter().map(|(_, v)| v).sum::<f64>();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_params_from_point() {
        let space = GridSpace::new(vec![
            GridAxis::new("NTrees", vec![ParamValue::Int(5)]),
            GridAxis::new("Shrinkage", vec![ParamValue::Float(0.1)]),
            GridAxis::new("BoostType", vec![ParamValue::Text("AdaBoost".into())]),
        ])
        .unwrap();
        let params = StumpParams::from_point(&space.expand()[0]).unwrap();
        assert_eq!(params.trees, 5);
        assert_eq!(params.shrinkage, 0.1);
        assert_eq!(params.cuts, DEFAULT_CUTS);
    }

    #[test]
    fn test_invalid_params_are_fit_errors() {
        let space = GridSpace::new(vec![GridAxis::new("NTrees", vec![ParamValue::Int(0)])]).unwrap();
        assert!(StumpParams::from_point(&space.expand()[0]).is_err());
    }

    #[test]
    fn test_constant_features_give_neutral_model() {
        let names = names();
        let signal = vec![vec![1.0, 1.0]; 10];
        let background = vec![vec![1.0, 1.0]; 10];
        let set = training_set(&names, &signal, &background);
        let model = fit_stumps(&set, StumpParams::default());
        assert!(model.stumps.is_empty());
        assert_eq!(model.score(&[1.0, 1.0]), 0.0);
        assert!(model.feature_importance().iter().all(|(_, v)| *v == 0.0));
    }
}
