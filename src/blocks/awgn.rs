//! Additive white Gaussian noise channel.

use super::Transform;
use crate::error::{Error, Result};
use crate::noise::GaussianNoise;
use crate::signals::{Signal, Timeline};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{trace, warn};

/// Adds Gaussian noise scaled to a target signal-to-noise ratio.
///
/// The noise standard deviation is `sqrt(var(input)) · 10^(-snr/20)`, so the
/// ratio is relative to the varying part of the input only. A zero-energy
/// input passes through untouched and the recorded noise is all zeros.
///
/// The last noise realization is kept so the achieved SNR can be measured
/// with [`AwgnChannel::snr`].
#[derive(Debug, Clone)]
pub struct AwgnChannel {
    snr_db: f64,
    noise: GaussianNoise<StdRng>,
    last_noise: Vec<f64>,
    signal_sum_squares: f64,
}

impl AwgnChannel {
    /// Creates a channel seeded from system entropy.
    ///
    /// # Arguments
    ///
    /// * `snr_db` - Target signal-to-noise ratio in dB
    pub fn new(snr_db: f64) -> Self {
        Self::with_rng(snr_db, StdRng::from_entropy())
    }

    /// Creates a channel whose noise is reproducible from `seed`.
    ///
    /// # Examples
    ///
    /// ```
    /// use pmchain::Timeline;
    /// use pmchain::blocks::{AwgnChannel, SineGenerator, Transform};
    ///
    /// let timeline = Timeline::new(1.0, 500.0).unwrap();
    /// let tone = SineGenerator::new(10.0).process(&timeline.zeros(), &timeline);
    ///
    /// let a = AwgnChannel::with_seed(20.0, 9).process(&tone, &timeline);
    /// let b = AwgnChannel::with_seed(20.0, 9).process(&tone, &timeline);
    /// assert_eq!(a, b);
    /// ```
    pub fn with_seed(snr_db: f64, seed: u64) -> Self {
        Self::with_rng(snr_db, StdRng::seed_from_u64(seed))
    }

    /// Creates a channel drawing from `rng`.
    pub fn with_rng(snr_db: f64, rng: StdRng) -> Self {
        Self {
            snr_db,
            noise: GaussianNoise::with_rng(rng),
            last_noise: Vec::new(),
            signal_sum_squares: 0.0,
        }
    }

    /// Target SNR in dB.
    pub fn snr_db(&self) -> f64 {
        self.snr_db
    }

    /// The noise added by the last process pass.
    pub fn noise(&self) -> &[f64] {
        &self.last_noise
    }

    /// SNR actually achieved by the last pass, in dB.
    ///
    /// Computed as `10·log10(Σ(x - mean)² / Σ noise²)`. Returns positive
    /// infinity when no noise was added.
    pub fn snr(&self) -> f64 {
        let noise_sum_squares: f64 = self.last_noise.iter().map(|n| n * n).sum();
        if noise_sum_squares == 0.0 {
            return f64::INFINITY;
        }
        10.0 * (self.signal_sum_squares / noise_sum_squares).log10()
    }
}

impl Transform for AwgnChannel {
    fn process(&mut self, input: &Signal, timeline: &Timeline) -> Signal {
        let variance = input.energy();
        self.signal_sum_squares = variance * input.len() as f64;

        if variance <= 0.0 {
            self.last_noise = vec![0.0; input.len()];
            return input.clone();
        }

        let sigma = variance.sqrt() * 10f64.powf(-self.snr_db / 20.0);
        trace!(sigma, snr_db = self.snr_db, "drawing channel noise");
        self.last_noise = match self.noise.samples(timeline.len(), sigma) {
            Ok(noise) => noise,
            Err(err) => {
                warn!(%err, "no noise added");
                vec![0.0; input.len()]
            }
        };

        let samples = input
            .samples()
            .iter()
            .zip(self.last_noise.iter())
            .map(|(x, n)| x + n)
            .collect();
        timeline.signal(samples)
    }

    fn label(&self) -> String {
        "AWGN Channel".to_string()
    }

    fn check(&self, _timeline: &Timeline) -> Result<()> {
        if self.snr_db.is_nan() {
            return Err(Error::invalid("SNR must be a number"));
        }
        Ok(())
    }
}
