//! Outcome-pair sampler.
//!
//! A measurement setting `(θ1, θ2)` fixes a four-way categorical distribution
//! over the joint outcomes of the two detectors:
//!
//! ```text
//! d = θ1/2 − θ2/2
//! P = [cos²d, sin²d, sin²d, cos²d] / 2
//!      (1,1)  (1,-1) (-1,1) (-1,-1)
//! ```
//!
//! Correlated outcomes carry `cos²d`, anti-correlated outcomes carry `sin²d`,
//! so the expected product of a pair is `cos(θ1 − θ2)`.

use rand::Rng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use serde::{Deserialize, Serialize};

use crate::error::{ChshError, ChshResult};

/// Absolute tolerance on `Σ p − 1` when validating a distribution.
pub const DISTRIBUTION_TOLERANCE: f64 = 1e-9;

// ---------------------------------------------------------------------------
// Outcome pairs
// ---------------------------------------------------------------------------

/// Joint ±1 result of one trial.
///
/// Only the four values in [`OUTCOME_PAIRS`] can be constructed, so the
/// product of the two components is always exactly `+1` or `−1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct OutcomePair {
    first: i8,
    second: i8,
}

/// The four outcomes in distribution order.
pub const OUTCOME_PAIRS: [OutcomePair; 4] = [
    OutcomePair { first: 1, second: 1 },
    OutcomePair { first: 1, second: -1 },
    OutcomePair { first: -1, second: 1 },
    OutcomePair { first: -1, second: -1 },
];

impl OutcomePair {
    /// Outcome at position `index` of [`OUTCOME_PAIRS`].
    pub fn from_index(index: usize) -> Option<Self> {
        OUTCOME_PAIRS.get(index).copied()
    }

    pub fn first(self) -> i8 {
        self.first
    }

    pub fn second(self) -> i8 {
        self.second
    }

    /// Position of this outcome in [`OUTCOME_PAIRS`].
    pub fn index(self) -> usize {
        let hi = usize::from(self.first < 0);
        let lo = usize::from(self.second < 0);
        hi * 2 + lo
    }

    /// Product of the two detector results.
    pub fn product(self) -> i8 {
        self.first * self.second
    }
}

impl std::fmt::Display for OutcomePair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.first, self.second)
    }
}

// ---------------------------------------------------------------------------
// Measurement settings
// ---------------------------------------------------------------------------

/// Pair of analyser angles in radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeasurementSetting {
    pub theta1: f64,
    pub theta2: f64,
}

impl MeasurementSetting {
    pub fn new(theta1: f64, theta2: f64) -> Self {
        Self { theta1, theta2 }
    }

    /// Reject NaN and infinite angles.
    pub fn validate(&self) -> ChshResult<()> {
        if !self.theta1.is_finite() {
            return Err(ChshError::InvalidAngle {
                name: "theta1",
                value: self.theta1,
            });
        }
        if !self.theta2.is_finite() {
            return Err(ChshError::InvalidAngle {
                name: "theta2",
                value: self.theta2,
            });
        }
        Ok(())
    }

    /// `θ1/2 − θ2/2`, the argument of the cos²/sin² weights.
    pub fn half_difference(&self) -> f64 {
        self.theta1 / 2.0 - self.theta2 / 2.0
    }

    /// Noise-free expectation of the pair product, `cos(θ1 − θ2)`.
    pub fn ideal_correlation(&self) -> f64 {
        (self.theta1 - self.theta2).cos()
    }

    /// Both analysers turned by the same `delta`.
    pub fn rotated(&self, delta: f64) -> Self {
        Self {
            theta1: self.theta1 + delta,
            theta2: self.theta2 + delta,
        }
    }
}

impl std::fmt::Display for MeasurementSetting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "θ1={:.6}, θ2={:.6}", self.theta1, self.theta2)
    }
}

// ---------------------------------------------------------------------------
// Probability distribution
// ---------------------------------------------------------------------------

/// Categorical distribution over [`OUTCOME_PAIRS`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProbabilityDistribution {
    probabilities: [f64; 4],
}

impl ProbabilityDistribution {
    /// Distribution for the analyser angles `theta1`, `theta2`.
    pub fn from_angles(theta1: f64, theta2: f64) -> Self {
        Self::from_setting(MeasurementSetting::new(theta1, theta2))
    }

    pub fn from_setting(setting: MeasurementSetting) -> Self {
        let d = setting.half_difference();
        let u = d.cos();
        let v = d.sin();
        let same = u * u / 2.0;
        let flip = v * v / 2.0;
        Self {
            probabilities: [same, flip, flip, same],
        }
    }

    /// Raw weights; not guaranteed valid unless [`validate`](Self::validate)
    /// succeeded.
    pub fn from_weights(probabilities: [f64; 4]) -> Self {
        Self { probabilities }
    }

    pub fn probabilities(&self) -> [f64; 4] {
        self.probabilities
    }

    /// Probability of `outcome`.
    pub fn probability_of(&self, outcome: OutcomePair) -> f64 {
        self.probabilities[outcome.index()]
    }

    pub fn total(&self) -> f64 {
        self.probabilities.iter().sum()
    }

    /// Expected pair product under this distribution.
    pub fn expected_product(&self) -> f64 {
        OUTCOME_PAIRS
            .iter()
            .zip(self.probabilities.iter())
            .map(|(o, p)| f64::from(o.product()) * p)
            .sum()
    }

    /// Check every weight is finite and non-negative and the total is 1.
    pub fn validate(&self) -> ChshResult<()> {
        for (i, &p) in self.probabilities.iter().enumerate() {
            if !p.is_finite() {
                return Err(ChshError::InvalidDistribution {
                    reason: format!("p[{i}] is not finite ({p})"),
                });
            }
            if p < 0.0 {
                return Err(ChshError::InvalidDistribution {
                    reason: format!("p[{i}] is negative ({p})"),
                });
            }
        }
        let total = self.total();
        if (total - 1.0).abs() > DISTRIBUTION_TOLERANCE {
            return Err(ChshError::InvalidDistribution {
                reason: format!("probabilities sum to {total}, expected 1"),
            });
        }
        Ok(())
    }
}

impl std::fmt::Display for ProbabilityDistribution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [a, b, c, d] = self.probabilities;
        write!(f, "[{a:.6}, {b:.6}, {c:.6}, {d:.6}]")
    }
}

// ---------------------------------------------------------------------------
// Sampling
// ---------------------------------------------------------------------------

/// Draw `n` independent outcome pairs for `setting`.
///
/// Fails with [`ChshError::InvalidSampleCount`] for `n == 0` and with
/// [`ChshError::InvalidAngle`] for non-finite angles. Both checks run before
/// the generator is touched.
pub fn sample_pairs(
    rng: &mut impl Rng,
    n: usize,
    setting: MeasurementSetting,
) -> ChshResult<Vec<OutcomePair>> {
    if n == 0 {
        return Err(ChshError::InvalidSampleCount { n });
    }
    setting.validate()?;

    let distribution = ProbabilityDistribution::from_setting(setting);
    distribution.validate()?;
    log::debug!("sampling {n} pairs at {setting}: p = {distribution}");

    let index = WeightedIndex::new(distribution.probabilities())
        .map_err(|e| ChshError::Sampling(e.to_string()))?;
    Ok((0..n).map(|_| OUTCOME_PAIRS[index.sample(&mut *rng)]).collect())
}

/// [`sample_pairs`] with bare angles.
pub fn generate_chsh_pairs(
    rng: &mut impl Rng,
    n: usize,
    theta1: f64,
    theta2: f64,
) -> ChshResult<Vec<OutcomePair>> {
    sample_pairs(rng, n, MeasurementSetting::new(theta1, theta2))
}
