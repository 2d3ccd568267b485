//! Equal-population rebinning for two-sample comparisons
//!
//! A binned chi-square comparison is only meaningful when every bin holds
//! enough entries. This module starts from a fine uniform binning over the
//! common range of two samples and merges adjacent bins until each merged bin
//! holds at least a minimum number of entries in *both* samples.
//!
//! The merged edges are computed once and then applied to both samples, so the
//! two histograms being compared always share exactly the same binning.
//!
//! # Algorithm
//!
//! 1. Fill both samples into `fine_bins` equal-width bins over the union range
//! 2. Walk the bins in ascending order, accumulating entries of both samples
//! 3. Close the merged bin as soon as both accumulated counts reach the minimum
//! 4. Fold an under-populated tail into the previous merged bin
//!
//! # Examples
//!
//! ```
//! use mvagrid_stats::{WeightedValue, binning::shared_edges};
//!
//! let a = (0..100).map(|i| WeightedValue::new(f64::from(i), 1.0)).collect::<Vec<_>>();
//! let b = a.clone();
//! let edges = shared_edges(&a, &b, 50, 10).unwrap();
//!
//! // 100 entries with at least 10 per bin give at most 10 merged bins
//! assert!(edges.len() - 1 <= 10);
//! assert_eq!(edges[0], 0.0);
//! ```

use crate::{WeightedValue, histogram::Histogram};

/// Number of fine bins used before merging.
pub const DEFAULT_FINE_BINS: usize = 50;

/// Minimum number of entries per merged bin.
pub const MIN_ENTRIES_PER_BIN: u64 = 10;

/// Merges adjacent bins of two histograms sharing the same edges.
///
/// Returns the merged edges. Each merged bin holds at least `min_entries`
/// entries in both histograms, except when the whole range does not reach the
/// threshold, in which case a single bin spanning the full range is returned.
///
/// # Panics
///
/// Panics if the two histograms do not share the same edges.
#[must_use]
pub fn merge_edges(a: &Histogram, b: &Histogram, min_entries: u64) -> Vec<f64> {
    assert_eq!(a.edges(), b.edges(), "histograms must share their edges");
    let Some(first) = a.bins.first() else {
        return vec![];
    };
    let end = a.bins[a.bins.len() - 1].range.end;

    let mut edges = vec![first.range.start];
    let mut acc_a = 0;
    let mut acc_b = 0;
    for (bin_a, bin_b) in a.bins.iter().zip(&b.bins) {
        acc_a += bin_a.entries;
        acc_b += bin_b.entries;

        // Close the merged bin once both samples are populated enough
        if acc_a >= min_entries && acc_b >= min_entries {
            edges.push(bin_a.range.end);
            acc_a = 0;
            acc_b = 0;
        }
    }

    // Fold the under-populated tail into the previous merged bin
    if edges[edges.len() - 1] < end {
        if edges.len() > 1 {
            let last = edges.len() - 1;
            edges[last] = end;
        } else {
            edges.push(end);
        }
    }

    edges
}

/// Computes merged edges shared by two weighted samples.
///
/// Returns `None` if either sample is empty.
#[must_use]
pub fn shared_edges(
    a: &[WeightedValue],
    b: &[WeightedValue],
    fine_bins: usize,
    min_entries: u64,
) -> Option<Vec<f64>> {
    if a.is_empty() || b.is_empty() {
        return None;
    }
    let (min, max) = a
        .iter()
        .chain(b)
        .map(|v| v.value)
        .filter(|v| !v.is_nan())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !min.is_finite() || !max.is_finite() {
        return None;
    }

    let mut fine_a = Histogram::uniform(fine_bins, min, max);
    let mut fine_b = fine_a.clone();
    for v in a {
        fine_a.fill(v.value, v.weight);
    }
    for v in b {
        fine_b.fill(v.value, v.weight);
    }
    Some(merge_edges(&fine_a, &fine_b, min_entries))
}
