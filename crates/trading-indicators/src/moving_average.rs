//! Simple moving averages over close prices.

/// Mean of the last `window` values.
///
/// NaN when `window` is zero or there are fewer than `window` values.
pub fn trailing_mean(values: &[f64], window: usize) -> f64 {
    if window == 0 || values.len() < window {
        return f64::NAN;
    }
    values[values.len() - window..].iter().sum::<f64>() / window as f64
}

/// Rolling mean aligned with the input.
///
/// Entry `i` averages `values[i + 1 - window..=i]`; the first `window - 1`
/// entries are NaN. The last entry equals [`trailing_mean`].
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    if window == 0 {
        return vec![f64::NAN; values.len()];
    }

    let mut out = Vec::with_capacity(values.len());
    let mut sum = 0.0;
    for (i, value) in values.iter().enumerate() {
        sum += value;
        if i >= window {
            sum -= values[i - window];
        }
        out.push(if i + 1 >= window { sum / window as f64 } else { f64::NAN });
    }
    out
}
