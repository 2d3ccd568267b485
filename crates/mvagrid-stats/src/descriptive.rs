//! Summary statistics of a list of values.
//!
//! Used to summarize how a quantity (typically a feature importance) varies
//! over the configurations of a study.

use serde::Serialize;

/// Location and spread of a set of values.
///
/// NaN values are skipped. The variance is the population variance.
#[derive(Debug, Clone, Serialize)]
pub struct DescriptiveStats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Upper median for an even count.
    pub median: f64,
    pub variance: f64,
    pub std_dev: f64,
}

impl DescriptiveStats {
    /// Summarizes `values`, or returns `None` when no non-NaN value is given.
    ///
    /// # Examples
    ///
    /// ```
    /// # use mvagrid_stats::descriptive::DescriptiveStats;
    /// let stats = DescriptiveStats::new([0.4, 0.1, f64::NAN, 0.3, 0.2]).unwrap();
    /// assert_eq!(stats.count, 4);
    /// assert_eq!(stats.min, 0.1);
    /// assert_eq!(stats.max, 0.4);
    /// assert_eq!(stats.median, 0.3);
    /// assert!((stats.mean - 0.25).abs() < 1e-12);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut sorted = values
            .into_iter()
            .filter(|v| !v.is_nan())
            .collect::<Vec<_>>();
        sorted.sort_by(f64::total_cmp);
        let (&min, &max) = (sorted.first()?, sorted.last()?);

        // Welford update keeps the variance stable for values of similar size
        let mut mean = 0.0;
        let mut m2 = 0.0;
        for (i, &v) in sorted.iter().enumerate() {
            let delta = v - mean;
            mean += delta / (i + 1) as f64;
            m2 += delta * (v - mean);
        }
        let count = sorted.len();
        let variance = m2 / count as f64;

        Some(Self {
            count,
            min,
            max,
            mean,
            median: sorted[count / 2],
            variance,
            std_dev: variance.sqrt(),
        })
    }
}
