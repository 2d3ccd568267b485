//! Cut-optimized significance estimation.
//!
//! For a threshold `c` on the classifier score, the selected signal and
//! background yields are the weighted sums of events scoring at or above `c`.
//! The significance estimator is
//!
//! ```text
//! Z = S / sqrt(S + B)
//! ```
//!
//! with its uncertainty propagated from the statistical errors of the yields
//! (`σ_S² = Σ w_s²`, `σ_B² = Σ w_b²`):
//!
//! ```text
//! ∂Z/∂S = (S + 2B) / (2 (S + B)^(3/2))
//! ∂Z/∂B = -S / (2 (S + B)^(3/2))
//! σ_Z   = sqrt((∂Z/∂S σ_S)² + (∂Z/∂B σ_B)²)
//! ```
//!
//! The scan visits every distinct score value as a candidate threshold, so the
//! optimum is exact for the given samples.

use crate::{Measurement, WeightedValue};

/// Best working point found by a significance scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptimalCut {
    /// Events with `score >= cut` are selected.
    pub cut: f64,
    pub significance: Measurement,
    /// Selected signal yield.
    pub signal: Measurement,
    /// Selected background yield.
    pub background: Measurement,
}

/// Computes `S / sqrt(S + B)` with propagated uncertainty.
///
/// Returns `None` when `S <= 0` or `S + B <= 0`.
///
/// # Examples
///
/// ```
/// use mvagrid_stats::{Measurement, significance::estimate};
///
/// let z = estimate(Measurement::new(100.0, 10.0), Measurement::new(0.0, 0.0)).unwrap();
/// assert_eq!(z.value, 10.0);
/// assert!((z.error - 0.5).abs() < 1e-12);
/// ```
#[must_use]
pub fn estimate(signal: Measurement, background: Measurement) -> Option<Measurement> {
    let s = signal.value;
    let b = background.value;
    let total = s + b;
    if s <= 0.0 || total <= 0.0 {
        return None;
    }
    let value = s / total.sqrt();
    let denom = 2.0 * total.powf(1.5);
    let d_s = (s + 2.0 * b) / denom;
    let d_b = -s / denom;
    let error = ((d_s * signal.error).powi(2) + (d_b * background.error).powi(2)).sqrt();
    Some(Measurement::new(value, error))
}

/// Threshold scan maximizing the significance estimator.
#[derive(Debug, Clone, Copy)]
pub struct SignificanceScan;

impl SignificanceScan {
    /// Scans every distinct score value and returns the optimal cut.
    ///
    /// Returns `None` when no threshold selects a positive signal yield.
    /// When several thresholds reach the same significance, the highest one is
    /// kept.
    #[must_use]
    pub fn run(signal: &[WeightedValue], background: &[WeightedValue]) -> Option<OptimalCut> {
        let mut events = signal
            .iter()
            .map(|v| (v, true))
            .chain(background.iter().map(|v| (v, false)))
            .filter(|(v, _)| !v.value.is_nan())
            .collect::<Vec<_>>();
        events.sort_by(|(a, _), (b, _)| b.value.total_cmp(&a.value));

        let mut s = 0.0;
        let mut s_sq = 0.0;
        let mut b = 0.0;
        let mut b_sq = 0.0;
        let mut best: Option<OptimalCut> = None;

        let mut i = 0;
        while i < events.len() {
            let cut = events[i].0.value;
            // Consume every event tied at this score before evaluating the cut
            while i < events.len() && events[i].0.value >= cut {
                let (v, is_signal) = events[i];
                if is_signal {
                    s += v.weight;
                    s_sq += v.weight * v.weight;
                } else {
                    b += v.weight;
                    b_sq += v.weight * v.weight;
                }
                i += 1;
            }

            let signal_yield = Measurement::new(s, s_sq.sqrt());
            let background_yield = Measurement::new(b, b_sq.sqrt());
            let Some(significance) = estimate(signal_yield, background_yield) else {
                continue;
            };
            if best.is_none_or(|best| significance.value > best.significance.value) {
                best = Some(OptimalCut {
                    cut,
                    significance,
                    signal: signal_yield,
                    background: background_yield,
                });
            }
        }

        best
    }
}
