//! Per-category re-weighting of the training sample.
//!
//! Categories have very different populations, and the raw event weights only
//! encode the physical cross-section. Before training, every category present
//! in the training fold is scaled so that its total weight over *both* folds
//! equals its target sample weight:
//!
//! ```text
//! scale(key) = sample_weight(key) / Σ_{fold ∈ {training, testing}} Σ_{e ∈ key} w_e
//! ```
//!
//! The scale only affects the [`TrainingSet`] handed to the trainer. Stored
//! weights are never modified, so evaluation statistics keep the physical
//! normalization.

use std::collections::BTreeMap;

use crate::{
    category::{CategoryKey, SampleClass},
    dataset::Dataset,
    fold::Fold,
};

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum BalanceError {
    #[display("category {key} has zero total weight")]
    DivisionByZero { key: CategoryKey },
}

/// Scale factors of the categories in the training fold.
#[derive(Debug, Default)]
pub struct CategoryScales {
    pub factors: BTreeMap<CategoryKey, f64>,
    /// Categories that cannot be scaled. They are left out of training.
    pub excluded: Vec<BalanceError>,
}

fn category_scale(
    dataset: &Dataset,
    key: &CategoryKey,
    sample_weight: f64,
) -> Result<f64, BalanceError> {
    let total = Fold::ALL
        .iter()
        .filter_map(|&fold| dataset.bucket(fold, key))
        .map(|b| b.total_weight())
        .sum::<f64>();
    if total == 0.0 {
        return Err(BalanceError::DivisionByZero { key: key.clone() });
    }
    let scale = sample_weight / total;
    tracing::debug!(category = %key, total, scale, "category scale");
    Ok(scale)
}

/// Computes the scale factor of every category in the training fold.
///
/// A category with zero total weight is excluded on its own; the others are
/// unaffected.
#[must_use]
pub fn compute_scales(dataset: &Dataset) -> CategoryScales {
    let mut scales = CategoryScales::default();
    for (key, bucket) in dataset.fold(Fold::Training) {
        match category_scale(dataset, key, bucket.sample_weight) {
            Ok(scale) => {
                scales.factors.insert(key.clone(), scale);
            }
            Err(e) => {
                tracing::warn!(category = %key, "{e}, excluded from training");
                scales.excluded.push(e);
            }
        }
    }
    scales
}

/// A training event with its balanced weight.
#[derive(Debug, Clone, Copy)]
pub struct TrainingEvent<'a> {
    pub features: &'a [f64],
    pub class: SampleClass,
    pub weight: f64,
}

/// Balanced view of the training fold, borrowed from a [`Dataset`].
#[derive(Debug, Clone)]
pub struct TrainingSet<'a> {
    pub feature_names: &'a [String],
    pub events: Vec<TrainingEvent<'a>>,
}

impl<'a> TrainingSet<'a> {
    /// Materializes the training fold with balanced weights.
    ///
    /// Categories without a scale factor are skipped.
    #[must_use]
    pub fn balanced(dataset: &'a Dataset, scales: &CategoryScales) -> Self {
        let events = dataset
            .fold(Fold::Training)
            .iter()
            .filter_map(|(key, bucket)| {
                let scale = *scales.factors.get(key)?;
                Some((key.class(), scale, bucket))
            })
            .flat_map(|(class, scale, bucket)| {
                bucket.events.iter().map(move |e| TrainingEvent {
                    features: &e.features,
                    class,
                    weight: e.weight * scale,
                })
            })
            .collect();
        Self {
            feature_names: dataset.feature_names(),
            events,
        }
    }

    /// Number of distinct sample classes present.
    #[must_use]
    pub fn num_classes(&self) -> usize {
        let has = |class| self.events.iter().any(|e| e.class == class);
        usize::from(has(SampleClass::Signal)) + usize::from(has(SampleClass::Background))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        assign::{BackgroundAssigner, WorkingPoint},
        category::SampleId,
        dataset::{DatasetBuilder, IncomingEvent},
        feature::{Feature, FeatureLayout},
        random::DrawStream,
    };

    use super::*;

    fn add(
        builder: &mut DatasetBuilder,
        fold: Fold,
        sample: SampleId,
        weight: f64,
        sample_weight: f64,
    ) {
        let features = [Feature::new("x", weight)];
        builder
            .add_event(IncomingEvent {
                event_key: 0,
                fold,
                features: &features,
                sample,
                spin: Some(0),
                channel: "A",
                weight,
                sample_weight,
            })
            .unwrap();
    }

    fn builder() -> DatasetBuilder {
        let assigner = BackgroundAssigner::new(
            vec![WorkingPoint { mass: 300, spin: 0 }],
            DrawStream::sequential(0),
        )
        .unwrap();
        DatasetBuilder::new(FeatureLayout::new(None, false), assigner)
    }

    #[test]
    fn test_scaled_weight_matches_sample_weight() {
        let mut b = builder();
        let signal = SampleId::Signal { mass: 300 };
        for (i, w) in [0.5, 1.5, 2.0, 0.25].into_iter().enumerate() {
            let fold = if i % 2 == 0 { Fold::Training } else { Fold::Testing };
            add(&mut b, fold, signal, w, 7.0);
        }
        for w in [3.0, 1.0, 4.0] {
            add(&mut b, Fold::Training, SampleId::BackgroundAll, w, 2.0);
        }
        add(&mut b, Fold::Testing, SampleId::BackgroundAll, 2.0, 2.0);
        let dataset = b.build();

        let scales = compute_scales(&dataset);
        assert!(scales.excluded.is_empty());
        assert_eq!(scales.factors.len(), 2);
        for (key, scale) in &scales.factors {
            let total = Fold::ALL
                .iter()
                .filter_map(|&f| dataset.bucket(f, key))
                .map(|b| b.total_weight())
                .sum::<f64>();
            let target = dataset.bucket(Fold::Training, key).unwrap().sample_weight;
            assert!((total * scale - target).abs() < 1e-12);
        }
    }

    #[test]
    fn test_training_set_keeps_stored_weights() {
        let mut b = builder();
        add(&mut b, Fold::Training, SampleId::SignalNonResonant, 2.0, 1.0);
        add(&mut b, Fold::Training, SampleId::BackgroundAll, 4.0, 1.0);
        let dataset = b.build();

        let set = TrainingSet::balanced(&dataset, &compute_scales(&dataset));
        assert_eq!(set.len(), 2);
        assert_eq!(set.num_classes(), 2);
        assert!(set.events.iter().all(|e| (e.weight - 1.0).abs() < 1e-12));
        let stored = dataset
            .buckets()
            .flat_map(|(_, _, b)| b.events.iter().map(|e| e.weight))
            .collect::<Vec<_>>();
        assert_eq!(stored, vec![2.0, 4.0]);
    }

    #[test]
    fn test_zero_weight_category_is_excluded_alone() {
        let mut b = builder();
        add(&mut b, Fold::Training, SampleId::Signal { mass: 260 }, 0.0, 1.0);
        add(&mut b, Fold::Training, SampleId::Signal { mass: 300 }, 2.0, 1.0);
        add(&mut b, Fold::Training, SampleId::BackgroundAll, 4.0, 1.0);
        let dataset = b.build();

        let scales = compute_scales(&dataset);
        let [BalanceError::DivisionByZero { key }] = scales.excluded.as_slice() else {
            panic!("one excluded category expected: {:?}", scales.excluded);
        };
        assert_eq!(key.sample, SampleId::Signal { mass: 260 });
        assert_eq!(scales.factors.len(), 2);

        let set = TrainingSet::balanced(&dataset, &scales);
        assert_eq!(set.len(), 2);
        assert_eq!(set.num_classes(), 2);
    }
}
