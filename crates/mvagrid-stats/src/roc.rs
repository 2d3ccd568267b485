//! ROC integral between a signal and a background sample.
//!
//! The integral of the receiver-operating-characteristic curve equals the
//! probability that a randomly drawn signal event scores higher than a randomly
//! drawn background event, with ties counted as one half. Both draws are
//! weighted by the event weights, so the result is the weighted area under the
//! signal-efficiency vs background-rejection curve.
//!
//! ```text
//! AUC = Σ_s Σ_b w_s w_b [ 1(x_s > x_b) + ½ 1(x_s = x_b) ] / (W_s W_b)
//! ```

use crate::WeightedValue;

/// Computes the weighted ROC integral.
///
/// Returns `None` if either sample has a non-positive total weight.
///
/// # Examples
///
/// ```
/// use mvagrid_stats::{WeightedValue, roc::roc_integral};
///
/// let signal = [WeightedValue::new(0.8, 1.0), WeightedValue::new(0.9, 1.0)];
/// let background = [WeightedValue::new(0.1, 1.0), WeightedValue::new(0.2, 1.0)];
/// assert_eq!(roc_integral(&signal, &background), Some(1.0));
/// ```
#[must_use]
pub fn roc_integral(signal: &[WeightedValue], background: &[WeightedValue]) -> Option<f64> {
    let signal_total = signal.iter().map(|v| v.weight).sum::<f64>();
    let background_total = background.iter().map(|v| v.weight).sum::<f64>();
    if signal_total <= 0.0 || background_total <= 0.0 {
        return None;
    }

    let mut sorted = background.to_vec();
    sorted.sort_by(|a, b| a.value.total_cmp(&b.value));
    let mut cumulative = Vec::with_capacity(sorted.len() + 1);
    cumulative.push(0.0);
    let mut acc = 0.0;
    for v in &sorted {
        acc += v.weight;
        cumulative.push(acc);
    }

    let mut area = 0.0;
    for s in signal {
        let below = sorted.partition_point(|b| b.value < s.value);
        let not_above = sorted.partition_point(|b| b.value <= s.value);
        let tied = cumulative[not_above] - cumulative[below];
        area += s.weight * (cumulative[below] + 0.5 * tied);
    }

    Some(area / (signal_total * background_total))
}
