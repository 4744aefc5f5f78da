//! CLI for chsh — simulate a Bell test and check the CHSH correlator.

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "chsh")]
#[command(about = "chsh — Monte Carlo Bell test: ensemble averages and the CHSH correlator")]
#[command(version = chsh_core::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sample the four ensembles and print their averages and the correlator sum
    Run {
        /// Trials per ensemble
        #[arg(long, default_value = "100000")]
        samples: usize,

        /// Phase shift applied to the second analyser (radians)
        #[arg(long, default_value = "0.0", allow_negative_numbers = true)]
        phi: f64,

        /// Seed for the random generator (random and logged if omitted)
        #[arg(long)]
        seed: Option<u64>,

        /// Print each ensemble's outcome distribution before the results
        #[arg(long)]
        show_distribution: bool,

        /// Write the full correlator report as JSON
        #[arg(long)]
        output: Option<String>,
    },

    /// Sample one measurement setting and compare the mean product to cos(θ1 − θ2).
    /// Use --ensemble to pick a standard setting instead of explicit angles.
    Sample {
        /// Standard ensemble (A, B, C or D); overrides --theta1/--theta2
        #[arg(long)]
        ensemble: Option<String>,

        /// First analyser angle (radians)
        #[arg(long, default_value = "0.0", allow_negative_numbers = true)]
        theta1: f64,

        /// Second analyser angle (radians)
        #[arg(long, default_value = "0.0", allow_negative_numbers = true)]
        theta2: f64,

        /// Phase shift for --ensemble (radians)
        #[arg(long, default_value = "0.0", allow_negative_numbers = true)]
        phi: f64,

        /// Number of trials
        #[arg(long, default_value = "100000")]
        samples: usize,

        /// Seed for the random generator
        #[arg(long)]
        seed: Option<u64>,

        /// Print the per-trial product vector (abbreviated)
        #[arg(long)]
        show_products: bool,
    },

    /// Correlator across a range of second-analyser phase shifts
    Sweep {
        /// Trials per ensemble at each phase
        #[arg(long, default_value = "20000")]
        samples: usize,

        /// First phase shift (radians)
        #[arg(long, default_value = "0.0", allow_negative_numbers = true)]
        start: f64,

        /// Last phase shift (radians, inclusive); defaults to 2π
        #[arg(long, allow_negative_numbers = true)]
        end: Option<f64>,

        /// Number of phases between start and end
        #[arg(long, default_value = "9")]
        steps: usize,

        /// Seed for the random generator
        #[arg(long)]
        seed: Option<u64>,

        /// Write all reports as JSON
        #[arg(long)]
        output: Option<String>,
    },

    /// Run the statistical verification battery with pass/fail and p-values
    Report {
        /// Trials per ensemble
        #[arg(long, default_value = "100000")]
        samples: usize,

        /// Phase shift applied to the second analyser (radians)
        #[arg(long, default_value = "0.0", allow_negative_numbers = true)]
        phi: f64,

        /// Seed for the random generator
        #[arg(long)]
        seed: Option<u64>,

        /// Output path for a Markdown report
        #[arg(long)]
        output: Option<String>,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            samples,
            phi,
            seed,
            show_distribution,
            output,
        } => commands::run::run(commands::run::RunCommandConfig {
            samples,
            phi2shift: phi,
            seed,
            show_distribution,
            output_path: output.as_deref(),
        }),
        Commands::Sample {
            ensemble,
            theta1,
            theta2,
            phi,
            samples,
            seed,
            show_products,
        } => commands::sample::run(commands::sample::SampleCommandConfig {
            ensemble: ensemble.as_deref(),
            theta1,
            theta2,
            phi2shift: phi,
            samples,
            seed,
            show_products,
        }),
        Commands::Sweep {
            samples,
            start,
            end,
            steps,
            seed,
            output,
        } => commands::sweep::run(
            samples,
            start,
            end.unwrap_or(std::f64::consts::TAU),
            steps,
            seed,
            output.as_deref(),
        ),
        Commands::Report {
            samples,
            phi,
            seed,
            output,
        } => commands::report::run(samples, phi, seed, output.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
