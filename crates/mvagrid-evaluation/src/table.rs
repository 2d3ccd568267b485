use std::collections::BTreeMap;

use mvagrid_dataset::{
    category::CategoryKey,
    dataset::Dataset,
    fold::{Fold, FoldPair},
};
use mvagrid_stats::WeightedValue;
use mvagrid_training::trainer::Classifier;

use crate::hierarchy::CategoryHierarchy;

/// Classifier scores of one configuration, `category -> fold -> scores`.
///
/// Every score keeps the original (unbalanced) event weight. Built once per
/// grid point and then only read.
#[derive(Debug, Clone, Default)]
pub struct EvaluationTable {
    entries: BTreeMap<CategoryKey, FoldPair<Vec<WeightedValue>>>,
}

impl EvaluationTable {
    /// Scores every stored event and rolls the scores up the hierarchy.
    ///
    /// Each concrete key is scored once. Its scores are appended to its own
    /// entry and to each declared parent of the same sample class.
    pub fn evaluate<C>(model: &C, dataset: &Dataset, hierarchy: &CategoryHierarchy) -> Self
    where
        C: Classifier + ?Sized,
    {
        let mut table = Self::default();
        for (fold, key, bucket) in dataset.buckets() {
            let scores = bucket
                .events
                .iter()
                .map(|e| WeightedValue::new(model.score(&e.features), e.weight))
                .collect::<Vec<_>>();

            let parents = hierarchy.parents(key);
            if parents.is_empty() {
                tracing::warn!(category = %key, "category has no declared parents");
            }
            for parent in parents {
                if parent.class() != key.class() {
                    tracing::warn!(category = %key, %parent, "skipping roll-up across classes");
                    continue;
                }
                table.append(parent, fold, &scores);
            }
            table.append(key, fold, &scores);
        }
        table
    }

    fn append(&mut self, key: &CategoryKey, fold: Fold, scores: &[WeightedValue]) {
        self.entries.entry(key.clone()).or_default()[fold].extend_from_slice(scores);
    }

    /// Scores of a category in one fold, empty when absent.
    #[must_use]
    pub fn scores(&self, key: &CategoryKey, fold: Fold) -> &[WeightedValue] {
        self.entries
            .get(key)
            .map(|pair| pair[fold].as_slice())
            .unwrap_or_default()
    }

    /// Scores of a category over both folds.
    #[must_use]
    pub fn all_scores(&self, key: &CategoryKey) -> Vec<WeightedValue> {
        Fold::ALL
            .iter()
            .flat_map(|&fold| self.scores(key, fold))
            .copied()
            .collect()
    }

    #[must_use]
    pub fn contains(&self, key: &CategoryKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &CategoryKey> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CategoryKey, &FoldPair<Vec<WeightedValue>>)> {
        self.entries.iter()
    }
}
