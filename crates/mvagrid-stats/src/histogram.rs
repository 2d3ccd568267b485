use std::ops::Range;

use serde::Serialize;

use crate::WeightedValue;

/// A weighted histogram over explicit, contiguous bin edges.
///
/// Each bin tracks the raw number of entries as well as the sum of weights and
/// the sum of squared weights, so that both unweighted comparisons (chi-square
/// between two samples) and weighted yields with their statistical error can be
/// read from the same object.
///
/// Values below the first edge or at/above the last edge are collected in the
/// dedicated underflow/overflow counters instead of being dropped silently.
#[derive(Debug, Clone, Serialize)]
pub struct Histogram {
    /// The bins comprising the histogram, ordered by their range.
    pub bins: Vec<HistogramBin>,
    /// Weighted content below the first bin edge.
    pub underflow: HistogramBin,
    /// Weighted content at or above the last bin edge.
    pub overflow: HistogramBin,
}

/// A single bin in a histogram.
#[derive(Debug, Clone, Serialize)]
pub struct HistogramBin {
    /// The range of values covered by this bin (inclusive start, exclusive end).
    pub range: Range<f64>,
    /// The number of entries filled into this bin.
    pub entries: u64,
    /// The sum of weights of the entries.
    pub sum_weights: f64,
    /// The sum of squared weights, used for the statistical error.
    pub sum_weights_sq: f64,
}

impl HistogramBin {
    fn empty(range: Range<f64>) -> Self {
        Self {
            range,
            entries: 0,
            sum_weights: 0.0,
            sum_weights_sq: 0.0,
        }
    }

    fn add(&mut self, weight: f64) {
        self.entries += 1;
        self.sum_weights += weight;
        self.sum_weights_sq += weight * weight;
    }

    /// The statistical error on the weighted content, `sqrt(sum w^2)`.
    #[must_use]
    pub fn error(&self) -> f64 {
        self.sum_weights_sq.sqrt()
    }
}

impl Histogram {
    /// Creates an empty histogram with `num_bins` equal-width bins over `[min, max]`.
    ///
    /// The upper edge is nudged up by one ULP so that a value exactly at `max`
    /// falls into the last bin rather than the overflow. Edges that round to
    /// the same value are collapsed, so a range only a few ULPs wide gets
    /// fewer bins than requested.
    ///
    /// # Examples
    ///
    /// ```
    /// # use mvagrid_stats::histogram::Histogram;
    /// let mut histogram = Histogram::uniform(4, 0.0, 1.0);
    /// histogram.fill(1.0, 2.0);
    /// assert_eq!(histogram.bins[3].sum_weights, 2.0);
    /// assert_eq!(histogram.overflow.entries, 0);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn uniform(num_bins: usize, min: f64, max: f64) -> Self {
        assert!(num_bins > 0, "histogram needs at least one bin");
        let max = if max > min { max } else { min + 1.0 };
        let width = (max - min) / num_bins as f64;
        let mut edges = (0..num_bins)
            .map(|i| min + width * i as f64)
            .collect::<Vec<_>>();
        edges.push(max.next_up());
        edges.dedup_by(|edge, previous| *edge <= *previous);
        Self::from_edges(&edges)
    }

    /// Creates an empty histogram from explicit ascending bin edges.
    ///
    /// # Panics
    ///
    /// Panics if fewer than two edges are given or the edges are not strictly
    /// increasing.
    #[must_use]
    pub fn from_edges(edges: &[f64]) -> Self {
        assert!(edges.len() >= 2, "histogram needs at least two edges");
        assert!(
            edges.is_sorted_by(|a, b| a < b),
            "bin edges must be strictly increasing"
        );
        let bins = edges
            .windows(2)
            .map(|w| HistogramBin::empty(w[0]..w[1]))
            .collect();
        let first = edges[0];
        let last = edges[edges.len() - 1];
        Self {
            bins,
            underflow: HistogramBin::empty(f64::NEG_INFINITY..first),
            overflow: HistogramBin::empty(last..f64::INFINITY),
        }
    }

    /// Creates a histogram with the given edges and fills it with `values`.
    #[must_use]
    pub fn with_values<'a, I>(edges: &[f64], values: I) -> Self
    where
        I: IntoIterator<Item = &'a WeightedValue>,
    {
        let mut histogram = Self::from_edges(edges);
        for v in values {
            histogram.fill(v.value, v.weight);
        }
        histogram
    }

    /// The bin edges, `bins.len() + 1` values.
    #[must_use]
    pub fn edges(&self) -> Vec<f64> {
        let mut edges = self.bins.iter().map(|b| b.range.start).collect::<Vec<_>>();
        if let Some(last) = self.bins.last() {
            edges.push(last.range.end);
        }
        edges
    }

    /// Adds one entry with the given weight. NaN values are ignored.
    pub fn fill(&mut self, value: f64, weight: f64) {
        let Some(first) = self.bins.first() else {
            return;
        };
        if value.is_nan() {
            return;
        }
        if value < first.range.start {
            self.underflow.add(weight);
            return;
        }
        // Bins are contiguous, so the first bin whose end is above the value holds it.
        let idx = self.bins.partition_point(|b| b.range.end <= value);
        match self.bins.get_mut(idx) {
            Some(bin) => bin.add(weight),
            None => self.overflow.add(weight),
        }
    }

    /// Total number of entries inside the bin range.
    #[must_use]
    pub fn entries(&self) -> u64 {
        self.bins.iter().map(|b| b.entries).sum()
    }

    /// Total weighted content inside the bin range.
    #[must_use]
    pub fn integral(&self) -> f64 {
        self.bins.iter().map(|b| b.sum_weights).sum()
    }
}
