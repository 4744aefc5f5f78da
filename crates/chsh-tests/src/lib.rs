//! Statistical verification battery for CHSH simulations.
//!
//! Checks that sampled ensembles follow the quantum joint distribution and
//! that the correlator behaves as predicted. Each test returns a
//! [`TestResult`] with a p-value (where applicable), a pass/fail
//! determination, and a letter grade (A through F).

use std::f64::consts::{PI, SQRT_2};

use chsh_core::{
    CLASSICAL_BOUND, ChshResult, CorrelatorReport, DISTRIBUTION_TOLERANCE, Ensemble,
    EnsembleSummary, MeasurementSetting, OutcomePair, ProbabilityDistribution, average,
    correlate_rotated, outcome_counts, pairs_to_products, standard_error, summarize,
};
use rand::Rng;
use statrs::distribution::{ChiSquared, ContinuousCDF};
use statrs::function::erf::erfc;

/// p-value threshold for consistency tests.
pub const SIGNIFICANCE: f64 = 0.01;

/// Fewest trials a sample-based test will score.
pub const MIN_SAMPLES: usize = 100;

/// Common analyser rotation used by the invariance check.
pub const INVARIANCE_ROTATION: f64 = PI / 3.0;

/// Weights below this are treated as structurally impossible outcomes.
const ZERO_WEIGHT: f64 = 1e-12;

// ═══════════════════════════════════════════════════════════════════════════════
// Core types
// ═══════════════════════════════════════════════════════════════════════════════

/// Result of a single verification test.
#[derive(Debug, Clone)]
pub struct TestResult {
    pub name: String,
    pub passed: bool,
    pub p_value: Option<f64>,
    pub statistic: f64,
    pub details: String,
    pub grade: char,
}

impl TestResult {
    /// Assign a letter grade based on p-value.
    ///
    /// - A: p >= 0.1
    /// - B: p >= 0.01
    /// - C: p >= 0.001
    /// - D: p >= 0.0001
    /// - F: otherwise or None
    pub fn grade_from_p(p: Option<f64>) -> char {
        match p {
            Some(p) if p >= 0.1 => 'A',
            Some(p) if p >= 0.01 => 'B',
            Some(p) if p >= 0.001 => 'C',
            Some(p) if p >= 0.0001 => 'D',
            _ => 'F',
        }
    }

    /// Grade an effect that should be large: A at 5σ and above, F below 1σ.
    pub fn grade_from_sigma(z: f64) -> char {
        if z >= 5.0 {
            'A'
        } else if z >= 3.0 {
            'B'
        } else if z >= 2.0 {
            'C'
        } else if z >= 1.0 {
            'D'
        } else {
            'F'
        }
    }

    /// Determine pass/fail from p-value against a threshold.
    pub fn pass_from_p(p: Option<f64>, threshold: f64) -> bool {
        match p {
            Some(p) => p >= threshold,
            None => false,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Helpers
// ═══════════════════════════════════════════════════════════════════════════════

/// Return a failing `TestResult` when the sample set is too small.
fn insufficient(name: &str, needed: usize, got: usize) -> TestResult {
    TestResult {
        name: name.to_string(),
        passed: false,
        p_value: None,
        statistic: 0.0,
        details: format!("Insufficient data: need {needed}, got {got}"),
        grade: 'F',
    }
}

/// Two-sided normal p-value for a z statistic.
fn two_sided_p(z: f64) -> f64 {
    erfc(z.abs() / SQRT_2)
}

/// Upper-tail normal p-value for a z statistic.
fn upper_tail_p(z: f64) -> f64 {
    0.5 * erfc(z / SQRT_2)
}

fn from_p(name: String, p: f64, statistic: f64, details: String) -> TestResult {
    TestResult {
        name,
        passed: TestResult::pass_from_p(Some(p), SIGNIFICANCE),
        p_value: Some(p),
        statistic,
        details,
        grade: TestResult::grade_from_p(Some(p)),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// 1. DISTRIBUTION TESTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Weights are finite, non-negative and sum to 1 within tolerance.
pub fn distribution_normalization(label: &str, setting: MeasurementSetting) -> TestResult {
    let name = format!("Normalization {label}");
    let dist = ProbabilityDistribution::from_setting(setting);
    let deviation = (dist.total() - 1.0).abs();
    match dist.validate() {
        Ok(()) => TestResult {
            name,
            passed: true,
            p_value: None,
            statistic: deviation,
            details: format!("p={dist}, |Σp−1|={deviation:.2e}"),
            grade: 'A',
        },
        Err(e) => TestResult {
            name,
            passed: false,
            p_value: None,
            statistic: deviation,
            details: format!("{e} (tolerance {DISTRIBUTION_TOLERANCE:e})"),
            grade: 'F',
        },
    }
}

/// Chi-squared goodness of fit of outcome counts against the quantum weights.
///
/// Outcomes with zero weight are excluded from the statistic; observing one
/// fails the test outright.
pub fn outcome_goodness_of_fit(
    label: &str,
    setting: MeasurementSetting,
    pairs: &[OutcomePair],
) -> TestResult {
    let name = format!("Outcome Chi-Squared {label}");
    let n = pairs.len();
    if n < MIN_SAMPLES {
        return insufficient(&name, MIN_SAMPLES, n);
    }
    let probabilities = ProbabilityDistribution::from_setting(setting).probabilities();
    let counts = outcome_counts(pairs);

    let mut chi2 = 0.0;
    let mut bins = 0usize;
    for (&p, &observed) in probabilities.iter().zip(counts.iter()) {
        if p < ZERO_WEIGHT {
            if observed > 0 {
                return TestResult {
                    name,
                    passed: false,
                    p_value: Some(0.0),
                    statistic: f64::INFINITY,
                    details: format!("impossible outcome observed {observed} times"),
                    grade: 'F',
                };
            }
            continue;
        }
        let expected = p * n as f64;
        let diff = observed as f64 - expected;
        chi2 += diff * diff / expected;
        bins += 1;
    }

    let dof = bins.saturating_sub(1);
    let p = if dof == 0 {
        1.0
    } else {
        match ChiSquared::new(dof as f64) {
            Ok(dist) => dist.sf(chi2),
            Err(_) => return insufficient(&name, 2, bins),
        }
    };
    from_p(
        name,
        p,
        chi2,
        format!("counts={counts:?}, dof={dof}, n={n}"),
    )
}

// ═══════════════════════════════════════════════════════════════════════════════
// 2. CORRELATION TESTS
// ═══════════════════════════════════════════════════════════════════════════════

/// z-test of the mean pair product against `cos(θ1 − θ2)`.
pub fn product_mean(label: &str, setting: MeasurementSetting, pairs: &[OutcomePair]) -> TestResult {
    let name = format!("Product Mean {label}");
    let n = pairs.len();
    if n < MIN_SAMPLES {
        return insufficient(&name, MIN_SAMPLES, n);
    }
    let mean = match average(&pairs_to_products(pairs)) {
        Ok(m) => m,
        Err(_) => return insufficient(&name, MIN_SAMPLES, 0),
    };
    let ideal = setting.ideal_correlation();
    let se = standard_error(ideal, n);

    if se < ZERO_WEIGHT {
        // Perfect (anti-)correlation: every product is fixed.
        let exact = (mean - ideal).abs() < 1e-9;
        let p = if exact { 1.0 } else { 0.0 };
        return from_p(
            name,
            p,
            0.0,
            format!("mean={mean:.6}, ideal={ideal:.6} (deterministic)"),
        );
    }

    let z = (mean - ideal) / se;
    from_p(
        name,
        two_sided_p(z),
        z,
        format!("mean={mean:.6}, ideal={ideal:.6}, se={se:.6}"),
    )
}

/// One-sided test that `|S|` exceeds the classical bound 2.
///
/// Passes when the violation is significant at [`SIGNIFICANCE`].
pub fn chsh_violation(report: &CorrelatorReport) -> TestResult {
    let name = "CHSH Violation".to_string();
    let z = report.violation_sigma();
    let p = if z.is_finite() { upper_tail_p(z) } else { 0.0 };
    TestResult {
        name,
        passed: p < SIGNIFICANCE,
        p_value: Some(p),
        statistic: z,
        details: format!(
            "|S|={:.6}, bound={CLASSICAL_BOUND}, σ={:.6}",
            report.sum.abs(),
            report.std_error
        ),
        grade: TestResult::grade_from_sigma(z),
    }
}

/// Two-sided test of `S` against its noise-free value.
pub fn ideal_consistency(report: &CorrelatorReport) -> TestResult {
    let name = "Correlator vs Ideal".to_string();
    if report.std_error == 0.0 {
        let exact = (report.sum - report.ideal_sum).abs() < 1e-9;
        return from_p(
            name,
            if exact { 1.0 } else { 0.0 },
            0.0,
            format!("S={:.6}, ideal={:.6}", report.sum, report.ideal_sum),
        );
    }
    let z = (report.sum - report.ideal_sum) / report.std_error;
    from_p(
        name,
        two_sided_p(z),
        z,
        format!(
            "S={:.6}, ideal={:.6}, σ={:.6}",
            report.sum, report.ideal_sum, report.std_error
        ),
    )
}

/// Two-sample test that a common analyser rotation leaves `S` unchanged.
pub fn rotation_invariance(base: &CorrelatorReport, rotated: &CorrelatorReport) -> TestResult {
    let name = "Rotation Invariance".to_string();
    let se = (base.std_error.powi(2) + rotated.std_error.powi(2)).sqrt();
    let diff = rotated.sum - base.sum;
    let details = format!(
        "S(0)={:.6}, S(δ={:.4})={:.6}",
        base.sum, rotated.rotation, rotated.sum
    );
    if se == 0.0 {
        return from_p(name, if diff.abs() < 1e-9 { 1.0 } else { 0.0 }, 0.0, details);
    }
    let z = diff / se;
    from_p(name, two_sided_p(z), z, details)
}

// ═══════════════════════════════════════════════════════════════════════════════
// Test battery
// ═══════════════════════════════════════════════════════════════════════════════

/// Everything produced by one battery run.
#[derive(Debug, Clone)]
pub struct BatteryRun {
    /// Correlator at the requested settings.
    pub report: CorrelatorReport,
    /// Correlator with both analysers turned by [`INVARIANCE_ROTATION`].
    pub rotated: CorrelatorReport,
    pub results: Vec<TestResult>,
}

/// Sample all ensembles at `phi2shift` and run every test.
///
/// Per ensemble: normalization, outcome chi-squared, product mean. Then the
/// correlator tests: classical violation, ideal consistency, rotation
/// invariance.
pub fn run_battery(rng: &mut impl Rng, n: usize, phi2shift: f64) -> ChshResult<BatteryRun> {
    let mut results = Vec::with_capacity(Ensemble::ALL.len() * 3 + 3);
    let a = check_ensemble(rng, n, phi2shift, Ensemble::A, &mut results)?;
    let b = check_ensemble(rng, n, phi2shift, Ensemble::B, &mut results)?;
    let c = check_ensemble(rng, n, phi2shift, Ensemble::C, &mut results)?;
    let d = check_ensemble(rng, n, phi2shift, Ensemble::D, &mut results)?;

    let report = CorrelatorReport::from_summaries(phi2shift, 0.0, [a, b, c, d]);
    let rotated = correlate_rotated(rng, n, phi2shift, INVARIANCE_ROTATION)?;

    results.push(chsh_violation(&report));
    results.push(ideal_consistency(&report));
    results.push(rotation_invariance(&report, &rotated));

    let passed = results.iter().filter(|r| r.passed).count();
    log::info!(
        "battery n={n} phi2shift={phi2shift:.6}: {passed}/{} passed",
        results.len()
    );
    for r in results.iter().filter(|r| !r.passed) {
        log::warn!("{} failed: {}", r.name, r.details);
    }

    Ok(BatteryRun {
        report,
        rotated,
        results,
    })
}

fn check_ensemble(
    rng: &mut impl Rng,
    n: usize,
    phi2shift: f64,
    ensemble: Ensemble,
    results: &mut Vec<TestResult>,
) -> ChshResult<EnsembleSummary> {
    let setting = ensemble.setting(phi2shift);
    let pairs = ensemble.generate(rng, n, phi2shift)?;
    let label = ensemble.label();
    results.push(distribution_normalization(label, setting));
    results.push(outcome_goodness_of_fit(label, setting, &pairs));
    results.push(product_mean(label, setting, &pairs));
    summarize(setting, &pairs)
}

/// Calculate overall quality score (0-100) from test results.
///
/// Each grade maps to a score: A=100, B=75, C=50, D=25, F=0.
/// Returns the average across all tests.
pub fn calculate_quality_score(results: &[TestResult]) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    let total: f64 = results
        .iter()
        .map(|r| match r.grade {
            'A' => 100.0,
            'B' => 75.0,
            'C' => 50.0,
            'D' => 25.0,
            _ => 0.0,
        })
        .sum();
    total / results.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chsh_core::{OUTCOME_PAIRS, correlate, sample_pairs};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

    fn rng(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }

    #[test]
    fn test_grade_from_p() {
        assert_eq!(TestResult::grade_from_p(Some(0.5)), 'A');
        assert_eq!(TestResult::grade_from_p(Some(0.05)), 'B');
        assert_eq!(TestResult::grade_from_p(Some(0.005)), 'C');
        assert_eq!(TestResult::grade_from_p(Some(0.0005)), 'D');
        assert_eq!(TestResult::grade_from_p(Some(0.00000001)), 'F');
        assert_eq!(TestResult::grade_from_p(None), 'F');
    }

    #[test]
    fn test_grade_from_sigma() {
        assert_eq!(TestResult::grade_from_sigma(180.0), 'A');
        assert_eq!(TestResult::grade_from_sigma(3.5), 'B');
        assert_eq!(TestResult::grade_from_sigma(2.0), 'C');
        assert_eq!(TestResult::grade_from_sigma(1.2), 'D');
        assert_eq!(TestResult::grade_from_sigma(-4.0), 'F');
    }

    #[test]
    fn test_pass_from_p() {
        assert!(TestResult::pass_from_p(Some(0.05), 0.01));
        assert!(!TestResult::pass_from_p(Some(0.005), 0.01));
        assert!(!TestResult::pass_from_p(None, 0.01));
    }

    #[test]
    fn test_normalization_passes_for_ensembles() {
        for e in Ensemble::ALL {
            for phi in [0.0, 0.7, -2.0] {
                let r = distribution_normalization(e.label(), e.setting(phi));
                assert!(r.passed, "{}: {}", r.name, r.details);
                assert!(r.statistic < DISTRIBUTION_TOLERANCE);
            }
        }
    }

    #[test]
    fn test_insufficient_data() {
        let setting = MeasurementSetting::new(0.0, FRAC_PI_4);
        let pairs = sample_pairs(&mut rng(1), 10, setting).unwrap();
        let r = outcome_goodness_of_fit("A", setting, &pairs);
        assert!(!r.passed);
        assert!(r.details.contains("Insufficient"));
        let r = product_mean("A", setting, &pairs);
        assert!(!r.passed);
    }

    #[test]
    fn test_impossible_outcome_fails_fit() {
        // Aligned analysers never anti-correlate; inject one (1, -1).
        let setting = MeasurementSetting::new(0.0, 0.0);
        let mut pairs = vec![OUTCOME_PAIRS[0]; 500];
        pairs.extend(vec![OUTCOME_PAIRS[3]; 500]);
        pairs.push(OUTCOME_PAIRS[1]);
        let r = outcome_goodness_of_fit("X", setting, &pairs);
        assert!(!r.passed);
        assert_eq!(r.p_value, Some(0.0));
    }

    #[test]
    fn test_biased_sample_fails_fit_and_mean() {
        // Data drawn at the wrong setting must be rejected.
        let truth = MeasurementSetting::new(0.0, FRAC_PI_2);
        let claimed = MeasurementSetting::new(0.0, FRAC_PI_4);
        let pairs = sample_pairs(&mut rng(2), 50_000, truth).unwrap();
        assert!(!outcome_goodness_of_fit("A", claimed, &pairs).passed);
        let mean = product_mean("A", claimed, &pairs);
        assert!(!mean.passed);
        assert!(mean.statistic < -50.0);
    }

    #[test]
    fn test_deterministic_mean_when_aligned() {
        let setting = MeasurementSetting::new(0.4, 0.4);
        let pairs = sample_pairs(&mut rng(3), 1_000, setting).unwrap();
        let r = product_mean("Z", setting, &pairs);
        assert!(r.passed);
        assert_eq!(r.p_value, Some(1.0));
    }

    #[test]
    fn test_violation_at_standard_settings() {
        let report = correlate(&mut rng(4), 100_000, 0.0).unwrap();
        let r = chsh_violation(&report);
        assert!(r.passed);
        assert_eq!(r.grade, 'A');
        assert!(r.statistic > 50.0);
    }

    #[test]
    fn test_no_violation_at_quarter_turn() {
        // phi2shift = π/2 drives the ideal correlator to zero.
        let report = correlate(&mut rng(5), 50_000, FRAC_PI_2).unwrap();
        let r = chsh_violation(&report);
        assert!(!r.passed);
        assert_eq!(r.grade, 'F');
    }

    #[test]
    fn test_battery_shape_and_score() {
        let run = run_battery(&mut rng(6), 20_000, 0.0).unwrap();
        assert_eq!(run.results.len(), 15);
        assert_eq!(run.rotated.rotation, INVARIANCE_ROTATION);
        assert_eq!(run.report.samples, 20_000);
        let normalized = run
            .results
            .iter()
            .filter(|r| r.name.starts_with("Normalization"))
            .count();
        assert_eq!(normalized, 4);
        let passed = run.results.iter().filter(|r| r.passed).count();
        assert!(
            passed > run.results.len() / 2,
            "Only {passed}/{} tests passed",
            run.results.len()
        );
        assert!(calculate_quality_score(&run.results) > 50.0);
    }

    #[test]
    fn test_battery_rejects_zero_samples() {
        assert!(run_battery(&mut rng(7), 0, 0.0).is_err());
    }

    #[test]
    fn test_quality_score() {
        let results = vec![
            TestResult {
                name: "A".into(),
                passed: true,
                p_value: Some(0.5),
                statistic: 0.0,
                details: String::new(),
                grade: 'A',
            },
            TestResult {
                name: "F".into(),
                passed: false,
                p_value: Some(0.0),
                statistic: 0.0,
                details: String::new(),
                grade: 'F',
            },
        ];
        let score = calculate_quality_score(&results);
        assert!((score - 50.0).abs() < 0.01);
    }

    #[test]
    fn test_calculate_quality_score_empty() {
        assert_eq!(calculate_quality_score(&[]), 0.0);
    }
}
