use std::time::Instant;

use chsh_core::{ChshResult, Ensemble};
use chsh_tests::{BatteryRun, TestResult, calculate_quality_score, run_battery};

pub fn run(
    samples: usize,
    phi2shift: f64,
    seed: Option<u64>,
    output_path: Option<&str>,
) -> ChshResult<()> {
    let mut rng = super::make_rng(seed);

    println!(
        "🔬 Running CHSH verification battery: {samples} samples per ensemble, phi2shift = {phi2shift:.6}...\n"
    );

    let t0 = Instant::now();
    let battery = run_battery(&mut rng, samples, phi2shift)?;
    let elapsed = t0.elapsed().as_secs_f64();

    println!("{}\n", battery.report);

    println!("{}", "=".repeat(72));
    println!(
        "{:<26} {:>3} {:>6} {:>12} {:>12}",
        "Test", "P", "Grade", "p-value", "Statistic"
    );
    println!("{}", "-".repeat(72));
    for t in &battery.results {
        let ok = if t.passed { "✓" } else { "✗" };
        println!(
            "{:<26} {:>3} {:>6} {:>12} {:>12.4}",
            t.name,
            ok,
            t.grade,
            format_p(t),
            t.statistic
        );
    }
    println!("{}", "-".repeat(72));

    let score = calculate_quality_score(&battery.results);
    let passed = battery.results.iter().filter(|r| r.passed).count();
    println!(
        "Score: {:.1}/100 ({}/{} passed) [{:.1}s]",
        score,
        passed,
        battery.results.len(),
        elapsed
    );

    if let Some(path) = output_path {
        let report = generate_report(&battery, seed);
        if let Err(e) = std::fs::write(path, &report) {
            eprintln!("Failed to write report to {path}: {e}");
        } else {
            println!("\n📄 Report saved to: {path}");
        }
    }
    Ok(())
}

fn format_p(t: &TestResult) -> String {
    t.p_value
        .map(|p| format!("{p:.6}"))
        .unwrap_or_else(|| "—".to_string())
}

fn generate_report(battery: &BatteryRun, seed: Option<u64>) -> String {
    let r = &battery.report;
    let mut report = String::new();
    report.push_str("# CHSH — Verification Report\n\n");
    report.push_str(&format!("Generated: {}\n\n", chrono_now()));
    report.push_str(&format!(
        "- Samples per ensemble: {}\n- phi2shift: {:.6}\n- Seed: {}\n\n",
        r.samples,
        r.phi2shift,
        seed.map(|s| s.to_string())
            .unwrap_or_else(|| "random (see log)".to_string())
    ));

    report.push_str("## Ensembles\n\n");
    report.push_str("| Ensemble | θ1 | θ2 | Mean | Ideal | σ | Counts |\n");
    report.push_str("|----------|----|----|------|-------|---|--------|\n");
    for e in Ensemble::ALL {
        let s = r.summary(e);
        report.push_str(&format!(
            "| {e} | {:.6} | {:.6} | {:.6} | {:.6} | {:.6} | {:?} |\n",
            s.setting.theta1, s.setting.theta2, s.mean, s.ideal, s.std_error, s.counts
        ));
    }
    report.push_str(&format!(
        "\n**S = {:.6} ± {:.6}** (ideal {:.6}; rotated by {:.4}: {:.6})\n\n",
        r.sum, r.std_error, r.ideal_sum, battery.rotated.rotation, battery.rotated.sum
    ));

    let score = calculate_quality_score(&battery.results);
    let passed = battery.results.iter().filter(|t| t.passed).count();
    report.push_str("## Tests\n\n");
    report.push_str(&format!(
        "- Score: {:.1}/100\n- Passed: {}/{}\n\n",
        score,
        passed,
        battery.results.len()
    ));
    report.push_str("| Test | P | Grade | p-value | Statistic | Details |\n");
    report.push_str("|------|---|-------|---------|-----------|--------|\n");
    for t in &battery.results {
        let ok = if t.passed { "✓" } else { "✗" };
        report.push_str(&format!(
            "| {} | {} | {} | {} | {:.4} | {} |\n",
            t.name,
            ok,
            t.grade,
            format_p(t),
            t.statistic,
            t.details
        ));
    }

    report
}

fn chrono_now() -> String {
    // Simple timestamp without chrono dependency
    let dur = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    format!("Unix timestamp: {}", dur.as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_report_sections() {
        let mut rng = super::super::make_rng(Some(10));
        let battery = run_battery(&mut rng, 5_000, 0.0).unwrap();
        let md = generate_report(&battery, Some(10));
        assert!(md.starts_with("# CHSH — Verification Report"));
        assert!(md.contains("- Seed: 10"));
        assert!(md.contains("## Ensembles"));
        assert!(md.contains("| D | "));
        assert!(md.contains("CHSH Violation"));
        // two table headers, four ensemble rows, one row per test
        let rows = md.lines().filter(|l| l.starts_with("| ")).count();
        assert_eq!(rows, 2 + 4 + battery.results.len());
    }

    #[test]
    fn test_run_writes_markdown() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("report.md");
        let path_str = path.to_string_lossy().to_string();
        run(2_000, 0.0, Some(5), Some(&path_str)).unwrap();
        let md = std::fs::read_to_string(&path).unwrap();
        assert!(md.contains("Samples per ensemble: 2000"));
    }

    #[test]
    fn test_format_p_missing() {
        let t = TestResult {
            name: "x".into(),
            passed: true,
            p_value: None,
            statistic: 0.0,
            details: String::new(),
            grade: 'A',
        };
        assert_eq!(format_p(&t), "—");
    }
}
