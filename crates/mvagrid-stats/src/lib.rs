//! Statistical tools for classifier evaluation.
//!
//! This crate provides the numeric building blocks used to judge a trained
//! signal/background classifier:
//!
//! - **Descriptive statistics**: mean, median, variance, standard deviation
//! - **Weighted histograms**: fixed-edge histograms with per-bin weight sums
//! - **Equal-population rebinning**: merge adjacent bins until every merged bin is
//!   populated enough for a chi-square comparison
//! - **ROC integral**: weighted area under the signal-efficiency vs
//!   background-rejection curve
//! - **Two-sample tests**: Kolmogorov-Smirnov and binned chi-square comparisons
//!   between two score distributions
//! - **Significance scan**: threshold scan maximizing `S / sqrt(S + B)` with
//!   propagated uncertainty
//!
//! # Modules
//!
//! - [`descriptive`]: Descriptive statistics for summarizing datasets
//! - [`histogram`]: Weighted histograms with explicit bin edges
//! - [`binning`]: Equal-population rebinning shared by two histograms
//! - [`roc`]: ROC integral between two weighted samples
//! - [`compare`]: Kolmogorov-Smirnov and chi-square two-sample comparisons
//! - [`significance`]: Cut-optimized significance estimation
//!
//! # Examples
//!
//! ## Computing descriptive statistics
//!
//! ```
//! use mvagrid_stats::descriptive::DescriptiveStats;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let stats = DescriptiveStats::new(values).unwrap();
//! assert_eq!(stats.mean, 3.0);
//! ```
//!
//! ## Comparing two score distributions
//!
//! ```
//! use mvagrid_stats::compare::KsTest;
//!
//! let train = [0.1, 0.2, 0.3, 0.4, 0.5];
//! let test = [0.1, 0.2, 0.3, 0.4, 0.5];
//! let ks = KsTest::two_sample(&train, &test).unwrap();
//! assert_eq!(ks.statistic, 0.0);
//! ```
//!
//! ## Scanning for the optimal cut
//!
//! ```
//! use mvagrid_stats::{WeightedValue, significance::SignificanceScan};
//!
//! let signal = vec![WeightedValue::new(0.9, 1.0); 100];
//! let background = vec![WeightedValue::new(0.1, 1.0); 1000];
//! let best = SignificanceScan::run(&signal, &background).unwrap();
//! assert!(best.significance.value > 9.0);
//! ```

use serde::{Deserialize, Serialize};

pub mod binning;
pub mod compare;
pub mod descriptive;
pub mod histogram;
pub mod roc;
pub mod significance;

/// A value paired with the statistical weight of the observation it came from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightedValue {
    pub value: f64,
    pub weight: f64,
}

impl WeightedValue {
    #[must_use]
    pub const fn new(value: f64, weight: f64) -> Self {
        Self { value, weight }
    }
}

/// A central value with its (symmetric) statistical uncertainty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub value: f64,
    pub error: f64,
}

impl Measurement {
    #[must_use]
    pub const fn new(value: f64, error: f64) -> Self {
        Self { value, error }
    }

    /// Relative uncertainty, or `None` when the central value is zero.
    #[must_use]
    pub fn relative_error(&self) -> Option<f64> {
        (self.value != 0.0).then(|| self.error / self.value.abs())
    }
}
