//! Products, averages and per-ensemble summaries.

use serde::{Deserialize, Serialize};

use crate::error::{ChshError, ChshResult};
use crate::sampler::{MeasurementSetting, OUTCOME_PAIRS, OutcomePair};

/// Per-trial products, each exactly `+1` or `−1`.
pub fn pairs_to_products(pairs: &[OutcomePair]) -> Vec<i8> {
    pairs.iter().map(|p| p.product()).collect()
}

/// Arithmetic mean of a product sequence.
///
/// Products are summed as integers, so the only rounding is the final
/// division.
pub fn average(products: &[i8]) -> ChshResult<f64> {
    if products.is_empty() {
        return Err(ChshError::EmptySampleSet);
    }
    let sum: i64 = products.iter().map(|&p| i64::from(p)).sum();
    Ok(sum as f64 / products.len() as f64)
}

/// Occurrences of each outcome, in [`OUTCOME_PAIRS`] order.
pub fn outcome_counts(pairs: &[OutcomePair]) -> [u64; 4] {
    let mut counts = [0u64; 4];
    for p in pairs {
        counts[p.index()] += 1;
    }
    counts
}

/// Standard error of a ±1 mean: `sqrt((1 − m²) / n)`.
pub fn standard_error(mean: f64, n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    ((1.0 - mean * mean).max(0.0) / n as f64).sqrt()
}

/// Statistics of one ensemble.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleSummary {
    pub setting: MeasurementSetting,
    pub samples: usize,
    /// Counts for (1,1), (1,-1), (-1,1), (-1,-1).
    pub counts: [u64; 4],
    /// Mean pair product.
    pub mean: f64,
    pub std_error: f64,
    /// `cos(θ1 − θ2)`.
    pub ideal: f64,
}

impl EnsembleSummary {
    /// Deviation from the ideal value in units of standard error.
    ///
    /// Returns 0 when the ideal is ±1, where the estimator has no variance.
    pub fn z_score(&self) -> f64 {
        let se = standard_error(self.ideal, self.samples);
        if se == 0.0 {
            return 0.0;
        }
        (self.mean - self.ideal) / se
    }
}

/// Summarise a sample set drawn at `setting`.
pub fn summarize(setting: MeasurementSetting, pairs: &[OutcomePair]) -> ChshResult<EnsembleSummary> {
    let mean = average(&pairs_to_products(pairs))?;
    Ok(EnsembleSummary {
        setting,
        samples: pairs.len(),
        counts: outcome_counts(pairs),
        mean,
        std_error: standard_error(mean, pairs.len()),
        ideal: setting.ideal_correlation(),
    })
}

/// Render counts as `(1, 1)=n0 (1, -1)=n1 ...`.
pub fn format_counts(counts: &[u64; 4]) -> String {
    OUTCOME_PAIRS
        .iter()
        .zip(counts.iter())
        .map(|(o, c)| format!("{o}={c}"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::sample_pairs;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::f64::consts::FRAC_PI_4;

    fn pairs(indices: &[usize]) -> Vec<OutcomePair> {
        indices
            .iter()
            .map(|&i| OutcomePair::from_index(i).unwrap())
            .collect()
    }

    #[test]
    fn test_products_follow_outcomes() {
        let v = pairs(&[0, 1, 2, 3, 0]);
        assert_eq!(pairs_to_products(&v), vec![1, -1, -1, 1, 1]);
    }

    #[test]
    fn test_average_basic() {
        assert_eq!(average(&[1, 1, -1, 1]).unwrap(), 0.5);
        assert_eq!(average(&[-1, -1]).unwrap(), -1.0);
    }

    #[test]
    fn test_average_empty_is_error() {
        assert_eq!(average(&[]), Err(ChshError::EmptySampleSet));
    }

    #[test]
    fn test_average_large_exact() {
        // 60_000 of +1, 40_000 of -1: exactly 0.2 with integer accumulation.
        let mut products = vec![1i8; 60_000];
        products.extend(std::iter::repeat_n(-1i8, 40_000));
        assert_eq!(average(&products).unwrap(), 0.2);
    }

    #[test]
    fn test_outcome_counts() {
        let v = pairs(&[0, 0, 3, 1, 2, 2, 2]);
        assert_eq!(outcome_counts(&v), [2, 1, 3, 1]);
    }

    #[test]
    fn test_standard_error_edges() {
        assert_eq!(standard_error(1.0, 100), 0.0);
        assert_eq!(standard_error(0.0, 0), 0.0);
        assert!((standard_error(0.0, 100) - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_summary_converges_to_cosine() {
        let mut rng = StdRng::seed_from_u64(2024);
        let setting = MeasurementSetting::new(0.0, FRAC_PI_4);
        let v = sample_pairs(&mut rng, 100_000, setting).unwrap();
        let s = summarize(setting, &v).unwrap();
        assert_eq!(s.samples, 100_000);
        assert_eq!(s.counts.iter().sum::<u64>(), 100_000);
        assert!((s.mean - FRAC_PI_4.cos()).abs() < 0.01, "mean {}", s.mean);
        assert!(s.z_score().abs() < 5.0);
    }

    #[test]
    fn test_format_counts() {
        assert_eq!(
            format_counts(&[1, 2, 3, 4]),
            "(1, 1)=1 (1, -1)=2 (-1, 1)=3 (-1, -1)=4"
        );
    }
}
