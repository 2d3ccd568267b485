//! Separation, stability and significance metrics of one configuration.
//!
//! All metrics read a finished [`EvaluationTable`]:
//!
//! - **ROC integral** per fold, for every signal working point present in the
//!   table against its paired background category
//! - **KS / chi-square** between the training and testing scores of the same
//!   category, for every category populated in both folds
//! - **Significance scan** over both folds combined, for every signal working
//!   point present in the table
//!
//! A signal working point is any signal-class key of the table: concrete
//! `(channel, mass, spin)` points and all of their channel, mass and spin
//! aggregates. Keys without signal statistics are never in the table, so they
//! are skipped rather than reported as zero.

use mvagrid_dataset::{
    category::{CategoryKey, SampleClass, SampleId, Spin},
    fold::{Fold, FoldPair},
};
use mvagrid_stats::{
    compare::{Chi2Test, KsTest},
    roc::roc_integral,
    significance::{OptimalCut, SignificanceScan},
};

use crate::table::EvaluationTable;

/// Background category a signal working point is compared against.
///
/// Resonant signal pairs with the background of the same pseudo mass,
/// non-resonant signal with pseudo mass `0` and the mass aggregate with the
/// background aggregate. Channel is kept; background carries no spin.
///
/// # Examples
///
/// ```
/// use mvagrid_dataset::category::{CategoryKey, Channel, SampleId, Spin};
/// use mvagrid_evaluation::metrics::background_partner;
///
/// let signal = CategoryKey::new(Channel::Any, SampleId::AnyMass, Spin::Any);
/// let background = background_partner(&signal).unwrap();
/// assert_eq!(background.sample, SampleId::BackgroundAll);
/// assert_eq!(background.spin, Spin::None);
/// ```
#[must_use]
pub fn background_partner(signal: &CategoryKey) -> Option<CategoryKey> {
    let sample = match signal.sample {
        SampleId::Signal { mass } => SampleId::Background { pseudo_mass: mass },
        SampleId::SignalNonResonant => SampleId::Background { pseudo_mass: 0 },
        SampleId::AnyMass => SampleId::BackgroundAll,
        SampleId::Background { .. } | SampleId::BackgroundAll => return None,
    };
    Some(CategoryKey::new(signal.channel.clone(), sample, Spin::None))
}

#[derive(Debug, Clone, PartialEq)]
pub struct RocEntry {
    pub signal: CategoryKey,
    pub background: CategoryKey,
    pub roc: FoldPair<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StabilityEntry {
    pub key: CategoryKey,
    pub ks: Option<KsTest>,
    pub chi2: Option<Chi2Test>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignificanceEntry {
    pub key: CategoryKey,
    pub best: OptimalCut,
}

/// Every metric of one configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metrics {
    pub roc: Vec<RocEntry>,
    pub stability: Vec<StabilityEntry>,
    pub significance: Vec<SignificanceEntry>,
}

impl Metrics {
    #[must_use]
    pub fn compute(table: &EvaluationTable) -> Self {
        let mut metrics = Self::default();
        for key in table.keys() {
            if let Some(entry) = stability(table, key) {
                metrics.stability.push(entry);
            }
            if key.class() != SampleClass::Signal {
                continue;
            }
            let Some(background) = background_partner(key) else {
                continue;
            };

            let roc = FoldPair {
                training: roc_integral(
                    table.scores(key, Fold::Training),
                    table.scores(&background, Fold::Training),
                ),
                testing: roc_integral(
                    table.scores(key, Fold::Testing),
                    table.scores(&background, Fold::Testing),
                ),
            };

            match SignificanceScan::run(&table.all_scores(key), &table.all_scores(&background)) {
                Some(best) => metrics.significance.push(SignificanceEntry {
                    key: key.clone(),
                    best,
                }),
                None => tracing::debug!(category = %key, "no significance optimum"),
            }
            metrics.roc.push(RocEntry {
                signal: key.clone(),
                background,
                roc,
            });
        }
        metrics
    }

    #[must_use]
    pub fn significance_of(&self, key: &CategoryKey) -> Option<&OptimalCut> {
        self.significance
            .iter()
            .find(|e| e.key == *key)
            .map(|e| &e.best)
    }

    #[must_use]
    pub fn roc_of(&self, key: &CategoryKey) -> Option<&FoldPair<Option<f64>>> {
        self.roc.iter().find(|e| e.signal == *key).map(|e| &e.roc)
    }
}

fn stability(table: &EvaluationTable, key: &CategoryKey) -> Option<StabilityEntry> {
    let training = table.scores(key, Fold::Training);
    let testing = table.scores(key, Fold::Testing);
    if training.is_empty() || testing.is_empty() {
        return None;
    }
    Some(StabilityEntry {
        key: key.clone(),
        ks: KsTest::from_weighted(training, testing),
        chi2: Chi2Test::two_sample(training, testing),
    })
}
