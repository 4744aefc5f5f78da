use chsh_core::{ChshResult, phase_sweep};

pub fn run(
    samples: usize,
    start: f64,
    end: f64,
    steps: usize,
    seed: Option<u64>,
    output_path: Option<&str>,
) -> ChshResult<()> {
    let phis = super::phase_grid(start, end, steps);
    if phis.is_empty() {
        eprintln!("Nothing to sweep: --steps must be at least 1.");
        return Ok(());
    }

    let mut rng = super::make_rng(seed);
    let reports = phase_sweep(&mut rng, samples, &phis)?;

    println!(
        "CHSH sweep: {} phases, {} samples per ensemble\n",
        reports.len(),
        samples
    );
    println!(
        "{:>10} {:>10} {:>10} {:>9} {:>7}",
        "phi", "S", "ideal", "σ", "z"
    );
    println!("{}", "-".repeat(50));
    for r in &reports {
        let z = if r.std_error > 0.0 {
            (r.sum - r.ideal_sum) / r.std_error
        } else {
            0.0
        };
        let mark = if r.violates_classical_bound() { " *" } else { "" };
        println!(
            "{:>10.4} {:>10.6} {:>10.6} {:>9.6} {:>+7.2}{mark}",
            r.phi2shift, r.sum, r.ideal_sum, r.std_error, z
        );
    }
    println!("\n* |S| above the classical bound of 2");

    if let Some(path) = output_path {
        super::write_output(path, &reports);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chsh_core::CorrelatorReport;

    #[test]
    fn test_sweep_writes_all_phases() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("sweep.json");
        let path_str = path.to_string_lossy().to_string();
        run(1_000, 0.0, 1.0, 3, Some(4), Some(&path_str)).unwrap();

        let reports: Vec<CorrelatorReport> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(reports.len(), 3);
        assert_eq!(reports[2].phi2shift, 1.0);
    }

    #[test]
    fn test_sweep_zero_steps_is_noop() {
        run(1_000, 0.0, 1.0, 0, Some(4), None).unwrap();
    }

    #[test]
    fn test_sweep_propagates_invalid_samples() {
        assert!(run(0, 0.0, 1.0, 2, Some(4), None).is_err());
    }
}
