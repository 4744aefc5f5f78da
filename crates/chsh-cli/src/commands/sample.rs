use chsh_core::{
    ChshResult, Ensemble, MeasurementSetting, ProbabilityDistribution, format_counts,
    pairs_to_products, sample_pairs, summarize,
};

/// Products shown at each end of `--show-products`.
const PRODUCT_EDGE: usize = 3;

pub struct SampleCommandConfig<'a> {
    pub ensemble: Option<&'a str>,
    pub theta1: f64,
    pub theta2: f64,
    pub phi2shift: f64,
    pub samples: usize,
    pub seed: Option<u64>,
    pub show_products: bool,
}

/// Resolve the measurement setting from either an ensemble label or angles.
pub fn resolve_setting(config: &SampleCommandConfig<'_>) -> ChshResult<MeasurementSetting> {
    match config.ensemble {
        Some(label) => Ok(label.parse::<Ensemble>()?.setting(config.phi2shift)),
        None => Ok(MeasurementSetting::new(config.theta1, config.theta2)),
    }
}

pub fn run(config: SampleCommandConfig<'_>) -> ChshResult<()> {
    let setting = resolve_setting(&config)?;
    let mut rng = super::make_rng(config.seed);
    let pairs = sample_pairs(&mut rng, config.samples, setting)?;
    let summary = summarize(setting, &pairs)?;

    println!("Setting:      {setting}");
    println!(
        "Distribution: {}",
        ProbabilityDistribution::from_setting(setting)
    );
    if config.show_products {
        println!(
            "Products:     {}",
            super::abbreviate(&pairs_to_products(&pairs), PRODUCT_EDGE)
        );
    }
    println!("Counts:       {}", format_counts(&summary.counts));
    println!(
        "Mean product: {:.6} ± {:.6}",
        summary.mean, summary.std_error
    );
    println!(
        "cos(θ1 − θ2): {:.6}  (z = {:+.2})",
        summary.ideal,
        summary.z_score()
    );
    Ok(())
}
