use std::fmt;

use mvagrid_dataset::category::{CategoryKey, Channel, SampleId, Spin};
use mvagrid_training::grid::GridPoint;
use serde::Serialize;

use crate::{metrics::Metrics, ranking::FeatureRank};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RowStatus {
    Trained,
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HyperparameterEntry {
    pub name: String,
    /// Index of the value along its axis.
    pub position: usize,
    /// Numeric value, `None` for text values.
    pub value: Option<f64>,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignificanceRecord {
    pub channel: Channel,
    pub sample: SampleId,
    pub mass: Option<u32>,
    pub spin: Spin,
    pub cut: f64,
    pub significance: f64,
    pub significance_error: f64,
    pub signal_yield: f64,
    pub background_yield: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StabilityRecord {
    pub category: CategoryKey,
    pub ks: Option<f64>,
    pub ks_p_value: Option<f64>,
    pub chi2: Option<f64>,
    pub ndf: Option<usize>,
    pub chi2_per_ndf: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RocRecord {
    pub signal: CategoryKey,
    pub background: CategoryKey,
    pub training: Option<f64>,
    pub testing: Option<f64>,
}

/// One output row per grid point.
///
/// Failed grid points keep their name and hyperparameters and leave every
/// metric list empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub config: String,
    pub trainer_config: String,
    #[serde(flatten)]
    pub status: RowStatus,
    pub hyperparameters: Vec<HyperparameterEntry>,
    pub significance: Vec<SignificanceRecord>,
    pub stability: Vec<StabilityRecord>,
    pub roc: Vec<RocRecord>,
    pub features: Vec<FeatureRank>,
}

impl ReportRow {
    fn empty(point: &GridPoint, status: RowStatus) -> Self {
        let hyperparameters = point
            .coordinates
            .iter()
            .map(|c| HyperparameterEntry {
                name: c.axis.clone(),
                position: c.position,
                value: c.value.as_f64(),
                label: c.value.to_string(),
            })
            .collect();
        Self {
            config: point.name.clone(),
            trainer_config: point.config_string(),
            status,
            hyperparameters,
            significance: vec![],
            stability: vec![],
            roc: vec![],
            features: vec![],
        }
    }

    /// Flattens the metrics and feature ranking of a trained grid point.
    #[must_use]
    pub fn assemble(point: &GridPoint, metrics: &Metrics, features: Vec<FeatureRank>) -> Self {
        let mut row = Self::empty(point, RowStatus::Trained);
        row.significance = metrics
            .significance
            .iter()
            .map(|e| SignificanceRecord {
                channel: e.key.channel.clone(),
                sample: e.key.sample,
                mass: e.key.sample.mass(),
                spin: e.key.spin,
                cut: e.best.cut,
                significance: e.best.significance.value,
                significance_error: e.best.significance.error,
                signal_yield: e.best.signal.value,
                background_yield: e.best.background.value,
            })
            .collect();
        row.stability = metrics
            .stability
            .iter()
            .map(|e| StabilityRecord {
                category: e.key.clone(),
                ks: e.ks.map(|ks| ks.statistic),
                ks_p_value: e.ks.map(|ks| ks.p_value),
                chi2: e.chi2.map(|c| c.chi2),
                ndf: e.chi2.map(|c| c.ndf),
                chi2_per_ndf: e.chi2.map(|c| c.per_ndf()),
            })
            .collect();
        row.roc = metrics
            .roc
            .iter()
            .map(|e| RocRecord {
                signal: e.signal.clone(),
                background: e.background.clone(),
                training: e.roc.training,
                testing: e.roc.testing,
            })
            .collect();
        row.features = features;
        row
    }

    #[must_use]
    pub fn failed(point: &GridPoint, error: &dyn fmt::Display) -> Self {
        Self::empty(
            point,
            RowStatus::Failed {
                error: error.to_string(),
            },
        )
    }

    #[must_use]
    pub fn is_trained(&self) -> bool {
        self.status == RowStatus::Trained
    }

    /// Significance record of one category.
    #[must_use]
    pub fn significance_of(&self, key: &CategoryKey) -> Option<&SignificanceRecord> {
        self.significance
            .iter()
            .find(|r| r.channel == key.channel && r.sample == key.sample && r.spin == key.spin)
    }
}
