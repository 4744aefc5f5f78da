pub mod report;
pub mod run;
pub mod sample;
pub mod sweep;

use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

/// Build the generator for a command.
/// Without an explicit seed one is drawn from the thread RNG and logged so the
/// run can be replayed with `--seed`.
pub fn make_rng(seed: Option<u64>) -> StdRng {
    let seed = seed.unwrap_or_else(|| rand::rng().random());
    log::info!("rng seed = {seed}");
    StdRng::seed_from_u64(seed)
}

/// `steps` evenly spaced phases from `start` to `end` inclusive.
pub fn phase_grid(start: f64, end: f64, steps: usize) -> Vec<f64> {
    match steps {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (steps - 1) as f64;
            (0..steps).map(|i| start + step * i as f64).collect()
        }
    }
}

/// Serialize `value` as pretty JSON to `path`.
pub fn save_json<T: Serialize>(path: impl AsRef<Path>, value: &T) -> std::io::Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(std::io::Error::other)?;
    std::fs::write(path, json)
}

/// [`save_json`] with the user-facing success/failure message.
pub fn write_output<T: Serialize>(path: &str, value: &T) {
    match save_json(path, value) {
        Ok(()) => println!("\n📄 Results saved to: {path}"),
        Err(e) => eprintln!("Failed to write results to {path}: {e}"),
    }
}

/// Abbreviated vector rendering: `[1 -1 1 ... -1 1 1]` for long inputs.
pub fn abbreviate(values: &[i8], edge: usize) -> String {
    let fmt = |v: &[i8]| {
        v.iter()
            .map(|x| x.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    };
    if values.len() <= edge * 2 {
        return format!("[{}]", fmt(values));
    }
    format!(
        "[{} ... {}]",
        fmt(&values[..edge]),
        fmt(&values[values.len() - edge..])
    )
}
