//! Declarative pipeline descriptions.
//!
//! A [`PipelineConfig`] lists the timeline parameters and the blocks of a
//! chain in signal-flow order. It deserializes from TOML:
//!
//! ```toml
//! duration = 2.0
//! sample_rate = 1000.0
//!
//! [[blocks]]
//! type = "sine"
//! frequency = 50.0
//!
//! [[blocks]]
//! type = "phase_modulator"
//! frequency = 100.0
//! deviation = 0.5
//!
//! [[blocks]]
//! type = "awgn"
//! snr_db = 30.0
//! seed = 7
//! ```
//!
//! Omitted parameters take the same defaults as the block constructors.

use crate::analytic::AnalyticMethod;
use crate::blocks::{
    AwgnChannel, BandPassFilter, Block, LowPassFilter, PhaseDemodulator, PhaseModulator,
    SineGenerator,
};
use crate::error::{Error, Result};
use crate::filters::{DEFAULT_ORDER, FilterMode};
use crate::pipeline::Pipeline;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

fn unit() -> f64 {
    1.0
}

fn default_snr_db() -> f64 {
    20.0
}

fn default_order() -> usize {
    DEFAULT_ORDER
}

fn enabled() -> bool {
    true
}

/// One block of a [`PipelineConfig`], tagged by `type`.
///
/// Each variant's table rejects keys it does not know, so a misspelt
/// optional parameter is an error instead of a silent default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockConfig {
    Sine(SineConfig),
    PhaseModulator(PhaseModulatorConfig),
    Awgn(AwgnConfig),
    LowPass(LowPassConfig),
    BandPass(BandPassConfig),
    PhaseDemodulator(PhaseDemodulatorConfig),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SineConfig {
    pub frequency: f64,
    #[serde(default = "unit")]
    pub amplitude: f64,
    #[serde(default)]
    pub phase: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PhaseModulatorConfig {
    pub frequency: f64,
    #[serde(default = "unit")]
    pub amplitude: f64,
    #[serde(default = "unit")]
    pub deviation: f64,
}

/// Channel parameters; without a `seed` the noise is entropy-seeded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AwgnConfig {
    #[serde(default = "default_snr_db")]
    pub snr_db: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LowPassConfig {
    pub cutoff_hz: f64,
    #[serde(default = "default_order")]
    pub order: usize,
    #[serde(default)]
    pub mode: FilterMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BandPassConfig {
    pub low_hz: f64,
    pub high_hz: f64,
    #[serde(default = "default_order")]
    pub order: usize,
    #[serde(default)]
    pub mode: FilterMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PhaseDemodulatorConfig {
    pub carrier_hz: f64,
    #[serde(default = "unit")]
    pub deviation: f64,
    #[serde(default)]
    pub method: AnalyticMethod,
    #[serde(default = "enabled")]
    pub remove_mean: bool,
}

impl BlockConfig {
    /// Builds the described block for `pipeline`.
    ///
    /// # Errors
    ///
    /// Propagates the constructor's [`Error::InvalidArgument`].
    pub fn build(&self, pipeline: &Pipeline) -> Result<Block> {
        let sample_rate = pipeline.sample_rate();
        match self {
            BlockConfig::Sine(sine) => Block::new(
                pipeline,
                SineGenerator::new(sine.frequency)
                    .with_amplitude(sine.amplitude)
                    .with_phase(sine.phase),
            ),
            BlockConfig::PhaseModulator(pm) => Block::new(
                pipeline,
                PhaseModulator::new(pm.frequency, pm.amplitude, pm.deviation),
            ),
            BlockConfig::Awgn(awgn) => {
                let channel = match awgn.seed {
                    Some(seed) => AwgnChannel::with_seed(awgn.snr_db, seed),
                    None => AwgnChannel::new(awgn.snr_db),
                };
                Block::new(pipeline, channel)
            }
            BlockConfig::LowPass(lp) => Block::new(
                pipeline,
                LowPassFilter::new(lp.cutoff_hz, sample_rate, lp.mode)?.with_order(lp.order)?,
            ),
            BlockConfig::BandPass(bp) => Block::new(
                pipeline,
                BandPassFilter::new(bp.low_hz, bp.high_hz, sample_rate, bp.mode)?
                    .with_order(bp.order)?,
            ),
            BlockConfig::PhaseDemodulator(demod) => Block::new(
                pipeline,
                PhaseDemodulator::new(demod.carrier_hz, demod.deviation)?
                    .with_method(demod.method)
                    .with_mean_removal(demod.remove_mean),
            ),
        }
    }
}

/// A whole pipeline: timeline parameters plus blocks in flow order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    pub duration: f64,
    pub sample_rate: f64,
    #[serde(default)]
    pub blocks: Vec<BlockConfig>,
}

impl PipelineConfig {
    /// Parses a TOML description.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the text is not valid TOML or does not
    /// describe a pipeline.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|err| Error::Config(err.to_string()))
    }

    /// Renders the description as TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|err| Error::Config(err.to_string()))
    }

    /// Builds every block, adds them in order and connects the chain.
    ///
    /// # Examples
    ///
    /// ```
    /// use pmchain::config::PipelineConfig;
    ///
    /// let config = PipelineConfig::from_toml_str(
    ///     r#"
    ///     duration = 1.0
    ///     sample_rate = 500.0
    ///
    ///     [[blocks]]
    ///     type = "sine"
    ///     frequency = 5.0
    ///
    ///     [[blocks]]
    ///     type = "low_pass"
    ///     cutoff_hz = 20.0
    ///     mode = "zero_phase"
    ///     "#,
    /// )
    /// .unwrap();
    ///
    /// let pipeline = config.build().unwrap();
    /// assert_eq!(pipeline.len(), 2);
    /// assert_eq!(pipeline.get_block(1).unwrap().name(), "Low-Pass Filter (0 - 20 Hz)");
    /// ```
    pub fn build(&self) -> Result<Pipeline> {
        let mut pipeline = Pipeline::new(self.duration, self.sample_rate)?;
        for block in &self.blocks {
            let built = block.build(&pipeline)?;
            pipeline.add_block(built)?;
        }
        pipeline.connect_blocks()?;
        Ok(pipeline)
    }
}

impl FromStr for PipelineConfig {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self> {
        Self::from_toml_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_constructors() {
        let config = PipelineConfig::from_toml_str(
            r#"
            duration = 1.0
            sample_rate = 100.0

            [[blocks]]
            type = "phase_modulator"
            frequency = 10.0

            [[blocks]]
            type = "awgn"

            [[blocks]]
            type = "band_pass"
            low_hz = 5.0
            high_hz = 15.0

            [[blocks]]
            type = "phase_demodulator"
            carrier_hz = 10.0
            "#,
        )
        .unwrap();

        assert_eq!(
            config.blocks,
            vec![
                BlockConfig::PhaseModulator(PhaseModulatorConfig {
                    frequency: 10.0,
                    amplitude: 1.0,
                    deviation: 1.0,
                }),
                BlockConfig::Awgn(AwgnConfig {
                    snr_db: 20.0,
                    seed: None,
                }),
                BlockConfig::BandPass(BandPassConfig {
                    low_hz: 5.0,
                    high_hz: 15.0,
                    order: DEFAULT_ORDER,
                    mode: FilterMode::Causal,
                }),
                BlockConfig::PhaseDemodulator(PhaseDemodulatorConfig {
                    carrier_hz: 10.0,
                    deviation: 1.0,
                    method: AnalyticMethod::Single,
                    remove_mean: true,
                }),
            ]
        );
    }

    #[test]
    fn test_parse_errors_are_config_errors() {
        assert!(matches!(
            PipelineConfig::from_toml_str("duration = "),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            PipelineConfig::from_toml_str(
                "duration = 1.0\nsample_rate = 10.0\n[[blocks]]\ntype = \"mixer\"\n"
            ),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            "sample_rate = 10.0".parse::<PipelineConfig>(),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_misspelt_block_keys_are_rejected() {
        let header = "duration = 1.0\nsample_rate = 100.0\n[[blocks]]\n";
        for block in [
            "type = \"low_pass\"\ncutoff_hz = 10.0\norde = 3\n",
            "type = \"phase_demodulator\"\ncarrier_hz = 10.0\nremove_maen = false\n",
            "type = \"awgn\"\nsnr = 5.0\n",
            "type = \"sine\"\nfrequency = 2.0\nphase_rad = 1.0\n",
        ] {
            let text = format!("{header}{block}");
            match PipelineConfig::from_toml_str(&text) {
                Err(Error::Config(message)) => assert!(message.contains("unknown field")),
                other => panic!("accepted {:?}: {:?}", block, other),
            }
        }
    }

    #[test]
    fn test_known_block_keys_still_parse() {
        let config = PipelineConfig::from_toml_str(
            r#"
            duration = 1.0
            sample_rate = 100.0

            [[blocks]]
            type = "low_pass"
            cutoff_hz = 10.0
            order = 3
            "#,
        )
        .unwrap();
        assert_eq!(
            config.blocks,
            vec![BlockConfig::LowPass(LowPassConfig {
                cutoff_hz: 10.0,
                order: 3,
                mode: FilterMode::Causal,
            })]
        );
    }

    #[test]
    fn test_build_surfaces_block_errors() {
        let config = PipelineConfig {
            duration: 1.0,
            sample_rate: 100.0,
            blocks: vec![BlockConfig::LowPass(LowPassConfig {
                cutoff_hz: 80.0,
                order: 4,
                mode: FilterMode::Causal,
            })],
        };
        assert!(matches!(config.build(), Err(Error::InvalidArgument(_))));

        let config = PipelineConfig {
            duration: 0.0,
            sample_rate: 100.0,
            blocks: Vec::new(),
        };
        assert!(matches!(config.build(), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = PipelineConfig {
            duration: 0.5,
            sample_rate: 200.0,
            blocks: vec![
                BlockConfig::Sine(SineConfig {
                    frequency: 3.0,
                    amplitude: 2.0,
                    phase: 0.0,
                }),
                BlockConfig::Awgn(AwgnConfig {
                    snr_db: 12.0,
                    seed: Some(3),
                }),
                BlockConfig::LowPass(LowPassConfig {
                    cutoff_hz: 40.0,
                    order: 3,
                    mode: FilterMode::ZeroPhase,
                }),
            ],
        };
        let text = config.to_toml_string().unwrap();
        assert_eq!(PipelineConfig::from_toml_str(&text).unwrap(), config);
    }
}
