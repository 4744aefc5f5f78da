//! The four CHSH measurement ensembles.
//!
//! | Ensemble | θ1  | θ2        |
//! |----------|-----|-----------|
//! | A        | 0   | φ + π/4   |
//! | B        | 0   | φ − π/4   |
//! | C        | π/2 | φ + π/4   |
//! | D        | π/2 | φ − π/4   |
//!
//! `φ` is the caller-supplied `phi2shift`; `φ = 0` is the standard Bell test
//! configuration.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{ChshError, ChshResult};
use crate::sampler::{MeasurementSetting, OutcomePair, sample_pairs};

/// One of the four analyser combinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ensemble {
    A,
    B,
    C,
    D,
}

impl Ensemble {
    /// All ensembles in correlator order.
    pub const ALL: [Ensemble; 4] = [Ensemble::A, Ensemble::B, Ensemble::C, Ensemble::D];

    /// Analyser angles for this ensemble under second-analyser shift `phi2shift`.
    pub fn setting(self, phi2shift: f64) -> MeasurementSetting {
        let (theta1, offset) = match self {
            Self::A => (0.0, FRAC_PI_4),
            Self::B => (0.0, -FRAC_PI_4),
            Self::C => (FRAC_PI_2, FRAC_PI_4),
            Self::D => (FRAC_PI_2, -FRAC_PI_4),
        };
        MeasurementSetting::new(theta1, phi2shift + offset)
    }

    /// [`setting`](Self::setting) with both analysers additionally turned by `rotation`.
    pub fn rotated_setting(self, phi2shift: f64, rotation: f64) -> MeasurementSetting {
        self.setting(phi2shift).rotated(rotation)
    }

    /// Coefficient of this ensemble's average in the correlator.
    pub fn sign(self) -> f64 {
        match self {
            Self::D => -1.0,
            _ => 1.0,
        }
    }

    /// Draw `n` pairs for this ensemble.
    pub fn generate(
        self,
        rng: &mut impl Rng,
        n: usize,
        phi2shift: f64,
    ) -> ChshResult<Vec<OutcomePair>> {
        sample_pairs(rng, n, self.setting(phi2shift))
    }

    /// Single-letter label.
    pub fn label(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        }
    }
}

impl std::fmt::Display for Ensemble {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Ensemble {
    type Err = ChshError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "a" | "A" => Ok(Self::A),
            "b" | "B" => Ok(Self::B),
            "c" | "C" => Ok(Self::C),
            "d" | "D" => Ok(Self::D),
            other => Err(ChshError::UnknownEnsemble(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_angle_table_unshifted() {
        let a = Ensemble::A.setting(0.0);
        assert_eq!((a.theta1, a.theta2), (0.0, FRAC_PI_4));
        let b = Ensemble::B.setting(0.0);
        assert_eq!((b.theta1, b.theta2), (0.0, -FRAC_PI_4));
        let c = Ensemble::C.setting(0.0);
        assert_eq!((c.theta1, c.theta2), (FRAC_PI_2, FRAC_PI_4));
        let d = Ensemble::D.setting(0.0);
        assert_eq!((d.theta1, d.theta2), (FRAC_PI_2, -FRAC_PI_4));
    }

    #[test]
    fn test_shift_moves_second_angle_only() {
        for e in Ensemble::ALL {
            let base = e.setting(0.0);
            let shifted = e.setting(0.3);
            assert_eq!(shifted.theta1, base.theta1);
            assert!((shifted.theta2 - base.theta2 - 0.3).abs() < 1e-12);
        }
    }

    #[test]
    fn test_rotation_moves_both_angles() {
        let s = Ensemble::C.rotated_setting(0.1, 1.0);
        assert!((s.theta1 - (FRAC_PI_2 + 1.0)).abs() < 1e-12);
        assert!((s.theta2 - (0.1 + FRAC_PI_4 + 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_signs() {
        let signs: Vec<f64> = Ensemble::ALL.iter().map(|e| e.sign()).collect();
        assert_eq!(signs, vec![1.0, 1.0, 1.0, -1.0]);
    }

    #[test]
    fn test_parse_and_display() {
        for e in Ensemble::ALL {
            assert_eq!(e.to_string().parse::<Ensemble>().unwrap(), e);
            assert_eq!(
                e.label().to_lowercase().parse::<Ensemble>().unwrap(),
                e
            );
        }
        assert!(matches!(
            "E".parse::<Ensemble>(),
            Err(ChshError::UnknownEnsemble(_))
        ));
    }

    #[test]
    fn test_generate_matches_sampler() {
        let direct = sample_pairs(
            &mut StdRng::seed_from_u64(9),
            128,
            Ensemble::B.setting(0.2),
        )
        .unwrap();
        let via = Ensemble::B
            .generate(&mut StdRng::seed_from_u64(9), 128, 0.2)
            .unwrap();
        assert_eq!(direct, via);
    }

    #[test]
    fn test_generate_rejects_zero() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(Ensemble::A.generate(&mut rng, 0, 0.0).is_err());
    }
}
