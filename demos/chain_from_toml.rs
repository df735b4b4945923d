//! Builds a pipeline from a TOML description and prints the listing.
//!
//! Pass a path to a TOML file, or run without arguments to use the
//! built-in description.

use anyhow::{Context, Result};
use pmchain::config::PipelineConfig;

const DEFAULT_CHAIN: &str = r#"
duration = 1.0
sample_rate = 2000.0

[[blocks]]
type = "sine"
frequency = 20.0

[[blocks]]
type = "phase_modulator"
frequency = 400.0
deviation = 0.8

[[blocks]]
type = "awgn"
snr_db = 25.0
seed = 1

[[blocks]]
type = "band_pass"
low_hz = 300.0
high_hz = 500.0
mode = "zero_phase"

[[blocks]]
type = "phase_demodulator"
carrier_hz = 400.0
deviation = 0.8
"#;

fn main() -> Result<()> {
    let text = match std::env::args().nth(1) {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("reading pipeline description from {}", path))?,
        None => DEFAULT_CHAIN.to_string(),
    };

    let config = PipelineConfig::from_toml_str(&text)?;
    let pipeline = config.build()?;
    print!("{}", pipeline);

    let message = pipeline
        .input_block()
        .context("pipeline has no blocks")?
        .output();
    let recovered = pipeline
        .output_block()
        .context("pipeline has no blocks")?
        .output();
    let error = message
        .samples()
        .iter()
        .zip(recovered.samples())
        .map(|(a, b)| (a - b).powi(2))
        .sum::<f64>()
        / message.len().max(1) as f64;
    println!("MSE between first and last block: {:.3e}", error);

    Ok(())
}
