//! # chsh-core
//!
//! **Monte Carlo estimate of the CHSH correlator for an entangled pair.**
//!
//! Each trial yields a pair of ±1 detector results drawn from the quantum
//! joint distribution for analyser angles `(θ1, θ2)`. Four ensembles of
//! trials at the standard Bell-test settings are averaged and combined into
//! `S = E(A) + E(B) + E(C) − E(D)`, which approaches `2√2` and so exceeds
//! the classical bound of 2.
//!
//! ## Quick Start
//!
//! ```
//! use chsh_core::{TSIRELSON_BOUND, correlate};
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let report = correlate(&mut rng, 100_000, 0.0).unwrap();
//! assert!((report.sum - TSIRELSON_BOUND).abs() < 0.05);
//! println!("{report}");
//! ```
//!
//! ## Architecture
//!
//! Sampler → Aggregator → Ensembles (A–D) → Correlator
//!
//! The generator is always passed in by the caller. Seed a
//! [`rand::rngs::StdRng`] for reproducible runs.

pub mod aggregate;
pub mod correlator;
pub mod ensemble;
pub mod error;
pub mod sampler;

pub use aggregate::{
    EnsembleSummary, average, format_counts, outcome_counts, pairs_to_products, standard_error,
    summarize,
};
pub use correlator::{
    CLASSICAL_BOUND, CorrelatorReport, TSIRELSON_BOUND, correlate, correlate_rotated,
    generate_correlator, ideal_correlator, phase_sweep,
};
pub use ensemble::Ensemble;
pub use error::{ChshError, ChshResult};
pub use sampler::{
    DISTRIBUTION_TOLERANCE, MeasurementSetting, OUTCOME_PAIRS, OutcomePair,
    ProbabilityDistribution, generate_chsh_pairs, sample_pairs,
};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
