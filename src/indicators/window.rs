//! Sliding-window helpers shared by the full-window indicators
//!
//! Every helper returns an index-aligned vector and only produces a value
//! when the whole trailing window is gap-free.

/// Trailing arithmetic mean over `length` values
///
/// Maintains a running sum (add new, subtract old) together with a count of
/// gaps inside the window.
pub fn rolling_mean(values: &[Option<f64>], length: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; values.len()];
    if length == 0 || values.len() < length {
        return result;
    }

    let valid = |v: Option<f64>| v.filter(|x| x.is_finite());
    let mut sum = 0.0;
    let mut gaps = 0usize;

    for i in 0..values.len() {
        match valid(values[i]) {
            Some(v) => sum += v,
            None => gaps += 1,
        }
        if i >= length {
            match valid(values[i - length]) {
                Some(v) => sum -= v,
                None => gaps -= 1,
            }
        }
        if i + 1 >= length && gaps == 0 {
            result[i] = Some(sum / length as f64);
        }
    }

    result
}

/// Fold every full, gap-free trailing window of `length` values
fn rolling_fold<F>(values: &[Option<f64>], length: usize, init: f64, f: F) -> Vec<Option<f64>>
where
    F: Fn(f64, f64) -> f64,
{
    let mut result = vec![None; values.len()];
    if length == 0 || values.len() < length {
        return result;
    }

    for i in length - 1..values.len() {
        result[i] = values[i + 1 - length..=i]
            .iter()
            .try_fold(init, |acc, v| v.filter(|x| x.is_finite()).map(|x| f(acc, x)));
    }

    result
}

/// Highest value of each trailing window
pub fn rolling_max(values: &[Option<f64>], length: usize) -> Vec<Option<f64>> {
    rolling_fold(values, length, f64::NEG_INFINITY, f64::max)
}

/// Lowest value of each trailing window
pub fn rolling_min(values: &[Option<f64>], length: usize) -> Vec<Option<f64>> {
    rolling_fold(values, length, f64::INFINITY, f64::min)
}

/// Midpoint of the highest high and lowest low of each trailing window
pub fn rolling_midpoint(
    highs: &[Option<f64>],
    lows: &[Option<f64>],
    length: usize,
) -> Vec<Option<f64>> {
    rolling_max(highs, length)
        .into_iter()
        .zip(rolling_min(lows, length))
        .map(|(high, low)| Some((high? + low?) / 2.0))
        .collect()
}
