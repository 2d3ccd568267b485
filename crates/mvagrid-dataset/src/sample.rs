use std::{collections::BTreeSet, path::PathBuf};

use serde::{Deserialize, Serialize};

use crate::{assign::WorkingPoint, category::SampleId};

/// One input sample file with its metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleEntry {
    pub file: PathBuf,
    pub id: SampleId,
    #[serde(default)]
    pub spin: Option<i32>,
    /// Per-event weight (cross-section normalization).
    pub weight: f64,
    /// Target sample weight overriding the setup default.
    #[serde(default)]
    pub sample_weight: Option<f64>,
}

/// Inclusive resonance mass window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MassRange {
    pub min: u32,
    pub max: u32,
}

impl MassRange {
    #[must_use]
    pub fn contains(&self, mass: u32) -> bool {
        (self.min..=self.max).contains(&mass)
    }

    /// Whether a signal sample belongs to the studied range.
    ///
    /// Non-resonant signal is always accepted.
    #[must_use]
    pub fn accepts(&self, sample: SampleId) -> bool {
        match sample {
            SampleId::Signal { mass } => self.contains(mass),
            _ => true,
        }
    }
}

/// Collects the signal working points of a sample list.
///
/// Resonant signal samples outside `range` are ignored and non-resonant
/// signal contributes mass `0`. The result is sorted and free of duplicates.
///
/// # Examples
///
/// ```
/// use mvagrid_dataset::{
///     category::SampleId,
///     sample::{MassRange, SampleEntry, signal_working_points},
/// };
///
/// let entry = |id, spin| SampleEntry {
///     file: "f.json".into(),
///     id,
///     spin,
///     weight: 1.0,
///     sample_weight: None,
/// };
/// let entries = [
///     entry(SampleId::Signal { mass: 300 }, Some(0)),
///     entry(SampleId::Signal { mass: 900 }, Some(0)),
///     entry(SampleId::SignalNonResonant, Some(0)),
///     entry(SampleId::BackgroundAll, None),
/// ];
/// let points = signal_working_points(&entries, MassRange { min: 250, max: 400 });
/// assert_eq!(points.len(), 2);
/// assert_eq!(points[0].mass, 0);
/// assert_eq!(points[1].mass, 300);
/// ```
#[must_use]
pub fn signal_working_points(entries: &[SampleEntry], range: MassRange) -> Vec<WorkingPoint> {
    entries
        .iter()
        .filter(|e| e.id.is_signal_class() && !e.id.is_aggregate() && range.accepts(e.id))
        .filter_map(|e| {
            Some(WorkingPoint {
                mass: e.id.mass()?,
                spin: e.spin.unwrap_or_default(),
            })
        })
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
