//! Exponential Moving Average helper
//!
//! Seeded with the first non-gap value (emitted verbatim), then
//! `ema = alpha * v + (1 - alpha) * prev` with `alpha = 2 / (length + 1)`,
//! evaluated as `prev + alpha * (v - prev)` so a constant input stays exact.
//! There is no warm-up guard beyond the seed.

use serde::{Deserialize, Serialize};

/// How the recurrence treats a gap in its input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapPolicy {
    /// Emit a gap and keep the previous EMA for the next valid value
    #[default]
    Freeze,
    /// Emit a gap and re-seed from the next valid value
    Reset,
}

/// Calculate Exponential Moving Average
pub fn ema(values: &[Option<f64>], length: usize, policy: GapPolicy) -> Vec<Option<f64>> {
    let mut result = Vec::with_capacity(values.len());
    if length == 0 {
        result.resize(values.len(), None);
        return result;
    }

    let alpha = 2.0 / (length as f64 + 1.0);
    let mut prev: Option<f64> = None;

    for value in values {
        match (value.filter(|v| v.is_finite()), prev) {
            (Some(v), None) => {
                prev = Some(v);
                result.push(Some(v));
            }
            (Some(v), Some(p)) => {
                let next = (v - p) * alpha + p;
                prev = Some(next);
                result.push(Some(next));
            }
            (None, _) => {
                if policy == GapPolicy::Reset {
                    prev = None;
                }
                result.push(None);
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_ema_seed_and_recurrence() {
        let values = vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(5.0)];
        let result = ema(&values, 3, GapPolicy::Freeze);

        // alpha = 0.5
        assert_eq!(result[0], Some(1.0));
        assert_relative_eq!(result[1].unwrap(), 1.5);
        assert_relative_eq!(result[2].unwrap(), 2.25);
        assert_relative_eq!(result[3].unwrap(), 3.125);
        assert_relative_eq!(result[4].unwrap(), 4.0625);
    }

    #[test]
    fn test_ema_leading_gaps() {
        let values = vec![None, None, Some(10.0), Some(20.0)];
        let result = ema(&values, 1, GapPolicy::Freeze);
        assert_eq!(result, vec![None, None, Some(10.0), Some(20.0)]);
    }

    #[test]
    fn test_ema_all_gaps() {
        let values = vec![None, Some(f64::NAN), None];
        assert_eq!(ema(&values, 5, GapPolicy::Freeze), vec![None, None, None]);
    }

    #[test]
    fn test_freeze_keeps_previous_value_across_gap() {
        let values = vec![Some(2.0), None, Some(4.0)];
        let result = ema(&values, 3, GapPolicy::Freeze);
        assert_eq!(result[1], None);
        assert_relative_eq!(result[2].unwrap(), 3.0);
    }

    #[test]
    fn test_reset_reseeds_after_gap() {
        let values = vec![Some(2.0), None, Some(4.0), Some(6.0)];
        let result = ema(&values, 3, GapPolicy::Reset);
        assert_eq!(result[1], None);
        assert_eq!(result[2], Some(4.0));
        assert_relative_eq!(result[3].unwrap(), 5.0);
    }
}
