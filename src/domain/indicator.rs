//! Numeric indicators shared by scorers and provider adapters.

/// Arithmetic mean of `values`, or `None` when empty or non-finite.
#[must_use]
pub fn moving_average(values: &[f64]) -> Option<f64> {
    if values.is_empty() || values.iter().any(|v| !v.is_finite()) {
        return None;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    mean.is_finite().then_some(mean)
}

/// Relative strength index over the last `period` price changes.
///
/// Uses simple means of gains and losses. Returns `None` when fewer than
/// `period + 1` closes are available. A window without losses reads 100
/// when it had gains and 50 when it was flat.
#[must_use]
pub fn rsi(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period + 1 {
        return None;
    }
    let window = &closes[closes.len() - (period + 1)..];
    if window.iter().any(|c| !c.is_finite()) {
        return None;
    }

    let (mut gains, mut losses) = (0.0, 0.0);
    for pair in window.windows(2) {
        let delta = pair[1] - pair[0];
        if delta > 0.0 {
            gains += delta;
        } else {
            losses -= delta;
        }
    }
    let avg_gain = gains / period as f64;
    let avg_loss = losses / period as f64;

    if avg_loss == 0.0 {
        return Some(if avg_gain > 0.0 { 100.0 } else { 50.0 });
    }
    let rs = avg_gain / avg_loss;
    Some(100.0 - 100.0 / (1.0 + rs))
}
