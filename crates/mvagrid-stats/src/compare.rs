//! Two-sample comparisons of score distributions.
//!
//! Both tests check whether two samples are compatible with one underlying
//! distribution. They compare the training-fold and testing-fold classifier
//! scores of one category (overtraining check).
//!
//! - [`KsTest`]: unbinned Kolmogorov-Smirnov test (maximum distance between
//!   the weighted empirical CDFs)
//! - [`Chi2Test`]: binned chi-square test on equal-population bins shared by
//!   both samples (see [`crate::binning`])

use crate::{
    WeightedValue,
    binning::{self, DEFAULT_FINE_BINS, MIN_ENTRIES_PER_BIN},
    histogram::Histogram,
};

/// Result of a two-sample Kolmogorov-Smirnov test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KsTest {
    /// Maximum distance between the two empirical CDFs, in `[0, 1]`.
    pub statistic: f64,
    /// Asymptotic probability of observing a distance at least this large
    /// when both samples come from the same distribution.
    pub p_value: f64,
}

impl KsTest {
    /// Runs the test on two unweighted samples.
    ///
    /// Returns `None` if either sample is empty.
    #[must_use]
    pub fn two_sample(a: &[f64], b: &[f64]) -> Option<Self> {
        let unit = |values: &[f64]| {
            values
                .iter()
                .map(|&v| WeightedValue::new(v, 1.0))
                .collect::<Vec<_>>()
        };
        Self::from_weighted(&unit(a), &unit(b))
    }

    /// Runs the test on two weighted samples.
    ///
    /// The empirical CDFs accumulate event weights, and the p-value uses the
    /// effective number of entries `(Σw)² / Σw²` of each sample. Returns `None`
    /// if either sample is empty or has no positive total weight.
    #[must_use]
    pub fn from_weighted(a: &[WeightedValue], b: &[WeightedValue]) -> Option<Self> {
        let a = Ecdf::new(a)?;
        let b = Ecdf::new(b)?;

        let (mut i, mut j) = (0, 0);
        let (mut cum_a, mut cum_b) = (0.0, 0.0);
        let mut statistic = 0.0_f64;
        while i < a.values.len() && j < b.values.len() {
            let x = f64::min(a.values[i].value, b.values[j].value);
            // Step over every value tied at x in both samples before comparing
            while i < a.values.len() && a.values[i].value <= x {
                cum_a += a.values[i].weight;
                i += 1;
            }
            while j < b.values.len() && b.values[j].value <= x {
                cum_b += b.values[j].weight;
                j += 1;
            }
            statistic = statistic.max((cum_a / a.total - cum_b / b.total).abs());
        }

        let en = (a.effective * b.effective / (a.effective + b.effective)).sqrt();
        let lambda = (en + 0.12 + 0.11 / en) * statistic;
        Some(Self {
            statistic,
            p_value: kolmogorov_probability(lambda),
        })
    }
}

/// Weighted sample sorted by value.
struct Ecdf {
    values: Vec<WeightedValue>,
    total: f64,
    /// `(Σw)² / Σw²`
    effective: f64,
}

impl Ecdf {
    fn new(values: &[WeightedValue]) -> Option<Self> {
        let mut values = values
            .iter()
            .filter(|v| !v.value.is_nan())
            .copied()
            .collect::<Vec<_>>();
        values.sort_by(|x, y| x.value.total_cmp(&y.value));
        let total = values.iter().map(|v| v.weight).sum::<f64>();
        let sum_sq = values.iter().map(|v| v.weight * v.weight).sum::<f64>();
        (total > 0.0).then(|| Self {
            values,
            total,
            effective: total * total / sum_sq,
        })
    }
}

/// Asymptotic Kolmogorov distribution `Q(λ) = 2 Σ (-1)^(j-1) exp(-2 j² λ²)`.
fn kolmogorov_probability(lambda: f64) -> f64 {
    if lambda < 1e-3 {
        return 1.0;
    }
    let a2 = -2.0 * lambda * lambda;
    let mut sign = 2.0;
    let mut sum = 0.0;
    let mut previous = 0.0_f64;
    for j in 1..=100_i32 {
        let term = sign * (a2 * f64::from(j * j)).exp();
        sum += term;
        if term.abs() <= 1e-3 * previous || term.abs() <= 1e-8 * sum {
            return sum.clamp(0.0, 1.0);
        }
        sign = -sign;
        previous = term.abs();
    }
    // No convergence: the distance is compatible with zero
    1.0
}

/// Result of a binned two-sample chi-square test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Chi2Test {
    pub chi2: f64,
    /// Degrees of freedom, the number of merged bins minus one.
    pub ndf: usize,
}

impl Chi2Test {
    /// Chi-square per degree of freedom.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn per_ndf(&self) -> f64 {
        self.chi2 / self.ndf as f64
    }

    /// Runs the test with the default binning policy
    /// ([`DEFAULT_FINE_BINS`] fine bins, [`MIN_ENTRIES_PER_BIN`] per merged bin).
    #[must_use]
    pub fn two_sample(a: &[WeightedValue], b: &[WeightedValue]) -> Option<Self> {
        Self::with_binning(a, b, DEFAULT_FINE_BINS, MIN_ENTRIES_PER_BIN)
    }

    /// Runs the test with an explicit binning policy.
    ///
    /// Returns `None` when either sample is empty or when rebinning leaves
    /// fewer than two bins.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn with_binning(
        a: &[WeightedValue],
        b: &[WeightedValue],
        fine_bins: usize,
        min_entries: u64,
    ) -> Option<Self> {
        let edges = binning::shared_edges(a, b, fine_bins, min_entries)?;
        if edges.len() < 3 {
            return None;
        }
        let ha = Histogram::with_values(&edges, a);
        let hb = Histogram::with_values(&edges, b);
        let na = ha.entries() as f64;
        let nb = hb.entries() as f64;
        if na == 0.0 || nb == 0.0 {
            return None;
        }

        let ratio_ab = (nb / na).sqrt();
        let ratio_ba = (na / nb).sqrt();
        let chi2 = ha
            .bins
            .iter()
            .zip(&hb.bins)
            .filter(|(x, y)| x.entries + y.entries > 0)
            .map(|(x, y)| {
                let (x, y) = (x.entries as f64, y.entries as f64);
                (ratio_ab * x - ratio_ba * y).powi(2) / (x + y)
            })
            .sum();

        Some(Self {
            chi2,
            ndf: edges.len() - 2,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(n: u32, offset: f64) -> Vec<f64> {
        (0..n).map(|i| (f64::from(i) + offset) / f64::from(n)).collect()
    }

    fn unit(values: &[f64]) -> Vec<WeightedValue> {
        values.iter().map(|&v| WeightedValue::new(v, 1.0)).collect()
    }

    #[test]
    fn test_ks_identical_samples() {
        let a = grid(500, 0.0);
        let ks = KsTest::two_sample(&a, &a).unwrap();
        assert_eq!(ks.statistic, 0.0);
        assert!((ks.p_value - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_ks_disjoint_samples() {
        let a = grid(100, 0.0);
        let b = a.iter().map(|v| v + 10.0).collect::<Vec<_>>();
        let ks = KsTest::two_sample(&a, &b).unwrap();
        assert_eq!(ks.statistic, 1.0);
        assert!(ks.p_value < 1e-6);
    }

    #[test]
    fn test_ks_handles_ties() {
        let ks = KsTest::two_sample(&[1.0, 1.0, 2.0], &[1.0, 2.0, 2.0]).unwrap();
        assert!((ks.statistic - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_ks_empty() {
        assert!(KsTest::two_sample(&[], &[1.0]).is_none());
    }

    #[test]
    fn test_ks_uses_event_weights() {
        let a = [WeightedValue::new(0.0, 3.0), WeightedValue::new(1.0, 1.0)];
        let b = [WeightedValue::new(0.0, 1.0), WeightedValue::new(1.0, 3.0)];
        let ks = KsTest::from_weighted(&a, &b).unwrap();
        assert!((ks.statistic - 0.5).abs() < 1e-12);
        assert_eq!(KsTest::two_sample(&[0.0, 1.0], &[0.0, 1.0]).unwrap().statistic, 0.0);
    }

    #[test]
    fn test_ks_ignores_overall_normalization() {
        let a = unit(&grid(300, 0.0));
        let b = unit(&grid(200, 0.3));
        let scaled = a
            .iter()
            .map(|v| WeightedValue::new(v.value, 2.5 * v.weight))
            .collect::<Vec<_>>();
        let ks = KsTest::from_weighted(&a, &b).unwrap();
        let ks_scaled = KsTest::from_weighted(&scaled, &b).unwrap();
        assert!((ks.statistic - ks_scaled.statistic).abs() < 1e-12);
        assert!((ks.p_value - ks_scaled.p_value).abs() < 1e-9);
    }

    #[test]
    fn test_ks_zero_total_weight() {
        let a = [WeightedValue::new(0.5, 0.0)];
        assert!(KsTest::from_weighted(&a, &a).is_none());
    }

    #[test]
    fn test_chi2_identical_samples() {
        let a = unit(&grid(1000, 0.0));
        let test = Chi2Test::two_sample(&a, &a).unwrap();
        assert_eq!(test.chi2, 0.0);
        assert!(test.ndf >= 1);
    }

    #[test]
    fn test_chi2_compatible_samples_below_two_per_ndf() {
        let a = unit(&grid(2000, 0.25));
        let b = unit(&grid(700, 0.75));
        let test = Chi2Test::two_sample(&a, &b).unwrap();
        assert!(test.per_ndf() < 2.0, "chi2/ndf = {}", test.per_ndf());
    }

    #[test]
    fn test_chi2_detects_shifted_samples() {
        let a = unit(&grid(1000, 0.0));
        let b = unit(&grid(1000, 0.0).iter().map(|v| 0.5 + v / 2.0).collect::<Vec<_>>());
        let test = Chi2Test::two_sample(&a, &b).unwrap();
        assert!(test.per_ndf() > 5.0, "chi2/ndf = {}", test.per_ndf());
    }

    #[test]
    fn test_chi2_too_few_entries() {
        let a = unit(&[0.1, 0.2, 0.3]);
        assert!(Chi2Test::two_sample(&a, &a).is_none());
    }

    #[test]
    fn test_chi2_on_scores_one_ulp_apart() {
        let mut values = vec![1.0; 30];
        values.extend(vec![1.0_f64.next_up(); 30]);
        let a = unit(&values);
        let test = Chi2Test::two_sample(&a, &a).unwrap();
        assert_eq!(test.chi2, 0.0);
        assert_eq!(test.ndf, 1);
    }

    #[test]
    fn test_chi2_single_merged_bin() {
        let mut values = vec![1.0; 15];
        values.extend(vec![1.0_f64.next_up(); 5]);
        let a = unit(&values);
        assert!(Chi2Test::two_sample(&a, &a).is_none());
    }
}
