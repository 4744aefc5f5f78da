use chsh_core::{ChshResult, Ensemble, ProbabilityDistribution, correlate};

pub struct RunCommandConfig<'a> {
    pub samples: usize,
    pub phi2shift: f64,
    pub seed: Option<u64>,
    pub show_distribution: bool,
    pub output_path: Option<&'a str>,
}

pub fn run(config: RunCommandConfig<'_>) -> ChshResult<()> {
    let mut rng = super::make_rng(config.seed);
    let report = correlate(&mut rng, config.samples, config.phi2shift)?;

    if config.show_distribution {
        for ensemble in Ensemble::ALL {
            let setting = ensemble.setting(config.phi2shift);
            println!(
                "Ensemble {ensemble} ({setting}): p = {}",
                ProbabilityDistribution::from_setting(setting)
            );
        }
        println!();
    }

    println!("{report}");

    if let Some(path) = config.output_path {
        super::write_output(path, &report);
    }
    Ok(())
}
