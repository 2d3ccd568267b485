use chrono::{DateTime, Utc};
use mvagrid_dataset::{
    category::{CategoryKey, SampleClass},
    fold::{Fold, FoldPair},
};
use mvagrid_evaluation::{ranking::FeatureStability, report::ReportRow};
use serde::Serialize;

/// Run parameters shared by every output file.
#[derive(Debug, Clone, Serialize)]
pub struct RunInfo {
    /// Timestamp when the run finished (ISO 8601 format)
    pub created_at: DateTime<Utc>,
    /// Name of the selected MVA setup
    pub setup: String,
    pub seed: u64,
    pub number_sets: u32,
    pub which_test: u32,
    pub unblind: bool,
    /// Stored events per fold
    pub num_events: FoldPair<usize>,
}

/// Result of a full grid study.
#[derive(Debug, Clone, Serialize)]
pub struct StudyReport {
    pub run: RunInfo,
    pub feature_names: Vec<String>,
    pub rows: Vec<ReportRow>,
    pub feature_stability: Vec<FeatureStability>,
    /// Training categories with zero total weight, left out of training
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub excluded_categories: Vec<CategoryKey>,
}

/// Accumulated dataset written instead of training.
#[derive(Debug, Clone, Serialize)]
pub struct EventDump {
    pub run: RunInfo,
    pub feature_names: Vec<String>,
    pub events: Vec<DumpedEvent>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DumpedEvent {
    pub index: usize,
    pub fold: Fold,
    pub category: CategoryKey,
    pub class: SampleClass,
    pub features: Vec<f64>,
    pub weight: f64,
}
