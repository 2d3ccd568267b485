//! Feature-importance ranking and its stability across configurations.
//!
//! Within one configuration, features are sorted by descending importance and
//! given 1-based positions. The sort is stable, so features with equal
//! importance keep the order in which the trainer listed them.
//!
//! Across configurations, [`RankingAccumulator`] collects every feature's
//! positions and raw importances and summarizes them as histograms plus
//! descriptive statistics of the importance.

use std::collections::BTreeMap;

use mvagrid_stats::{descriptive::DescriptiveStats, histogram::Histogram};
use serde::Serialize;

/// Number of bins of the importance histogram.
const IMPORTANCE_BINS: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureRank {
    pub name: String,
    pub importance: f64,
    /// 1-based rank, 1 is the most important feature.
    pub position: usize,
}

/// Ranks the features of one configuration.
///
/// The result is ordered by position.
///
/// # Examples
///
/// ```
/// use mvagrid_evaluation::ranking::rank;
///
/// let ranks = rank(&[
///     ("pt".to_owned(), 0.2),
///     ("m_vis".to_owned(), 0.5),
///     ("eta".to_owned(), 0.3),
/// ]);
/// let names = ranks.iter().map(|r| r.name.as_str()).collect::<Vec<_>>();
/// assert_eq!(names, ["m_vis", "eta", "pt"]);
/// assert_eq!(ranks[0].position, 1);
/// ```
#[must_use]
pub fn rank(importance: &[(String, f64)]) -> Vec<FeatureRank> {
    let mut sorted = importance.iter().collect::<Vec<_>>();
    sorted.sort_by(|(_, a), (_, b)| b.total_cmp(a));
    sorted
        .into_iter()
        .enumerate()
        .map(|(i, (name, importance))| FeatureRank {
            name: name.clone(),
            importance: *importance,
            position: i + 1,
        })
        .collect()
}

/// Position and importance distribution of one feature across configurations.
#[derive(Debug, Clone, Serialize)]
pub struct FeatureStability {
    pub name: String,
    pub positions: Histogram,
    pub importance: Histogram,
    pub importance_stats: Option<DescriptiveStats>,
}

#[derive(Debug, Clone, Default)]
pub struct RankingAccumulator {
    num_features: usize,
    positions: BTreeMap<String, Vec<usize>>,
    importances: BTreeMap<String, Vec<f64>>,
}

impl RankingAccumulator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, ranks: &[FeatureRank]) {
        self.num_features = self.num_features.max(ranks.len());
        for r in ranks {
            self.positions
                .entry(r.name.clone())
                .or_default()
                .push(r.position);
            self.importances
                .entry(r.name.clone())
                .or_default()
                .push(r.importance);
        }
    }

    /// Summarizes every feature seen so far, in name order.
    ///
    /// Position histograms have one unit-width bin per rank, centered on
    /// `1..=N`. Importance histograms span `[0, max]` over all features.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn summary(&self) -> Vec<FeatureStability> {
        let n = self.num_features.max(1);
        let max_importance = self
            .importances
            .values()
            .flatten()
            .copied()
            .fold(0.0_f64, f64::max);
        self.positions
            .iter()
            .map(|(name, positions)| {
                let mut position_hist = Histogram::uniform(n, 0.5, n as f64 + 0.5);
                for &p in positions {
                    position_hist.fill(p as f64, 1.0);
                }
                let values = self.importances.get(name).cloned().unwrap_or_default();
                let mut importance_hist = Histogram::uniform(IMPORTANCE_BINS, 0.0, max_importance);
                for &v in &values {
                    importance_hist.fill(v, 1.0);
                }
                FeatureStability {
                    name: name.clone(),
                    positions: position_hist,
                    importance: importance_hist,
                    importance_stats: DescriptiveStats::new(values),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn importance(values: &[f64]) -> Vec<(String, f64)> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| (format!("f{i}"), v))
            .collect()
    }

    #[test]
    fn test_positions_are_a_permutation() {
        let ranks = rank(&importance(&[0.1, 0.4, 0.05, 0.3, 0.15]));
        let positions = ranks.iter().map(|r| r.position).collect::<BTreeSet<_>>();
        assert_eq!(positions, (1..=5).collect());
    }

    #[test]
    fn test_reversed_importance_reverses_ranks() {
        let forward = importance(&[0.5, 0.3, 0.15, 0.05]);
        let backward = importance(&[0.05, 0.15, 0.3, 0.5]);
        let position_of = |ranks: &[FeatureRank], name: &str| {
            ranks.iter().find(|r| r.name == name).map(|r| r.position)
        };
        let fr = rank(&forward);
        let br = rank(&backward);
        for i in 0..4 {
            let name = format!("f{i}");
            assert_eq!(position_of(&fr, &name), Some(i + 1));
            assert_eq!(position_of(&br, &name), Some(4 - i));
        }
    }

    #[test]
    fn test_ties_keep_input_order() {
        let ranks = rank(&importance(&[0.2, 0.2, 0.6]));
        let names = ranks.iter().map(|r| r.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, ["f2", "f0", "f1"]);
    }

    #[test]
    fn test_accumulator_histograms() {
        let mut acc = RankingAccumulator::new();
        acc.add(&rank(&importance(&[0.7, 0.3])));
        acc.add(&rank(&importance(&[0.4, 0.6])));
        let summary = acc.summary();
        assert_eq!(summary.len(), 2);

        let f0 = &summary[0];
        assert_eq!(f0.name, "f0");
        assert_eq!(f0.positions.bins.len(), 2);
        assert_eq!(f0.positions.bins[0].entries, 1);
        assert_eq!(f0.positions.bins[1].entries, 1);
        assert_eq!(f0.importance.entries(), 2);
        let stats = f0.importance_stats.as_ref().unwrap();
        assert!((stats.mean - 0.55).abs() < 1e-12);
    }
}
