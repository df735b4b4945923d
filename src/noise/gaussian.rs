//! Gaussian noise source.

use crate::error::{Error, Result};
use rand::Rng;
use rand_distr::{Distribution, Normal, StandardNormal};

/// A zero-mean Gaussian sample generator.
///
/// Wraps an RNG and draws from [`rand_distr::Normal`], so a seeded RNG gives
/// a reproducible noise sequence.
#[derive(Debug, Clone)]
pub struct GaussianNoise<R: Rng = rand::rngs::ThreadRng> {
    rng: R,
}

impl GaussianNoise<rand::rngs::ThreadRng> {
    /// Creates a generator backed by the thread-local RNG.
    ///
    /// # Examples
    ///
    /// ```
    /// use pmchain::noise::GaussianNoise;
    ///
    /// let mut noise = GaussianNoise::new();
    /// let sample = noise.next_sample();
    /// assert!(sample.is_finite());
    /// ```
    pub fn new() -> Self {
        Self::with_rng(rand::thread_rng())
    }
}

impl Default for GaussianNoise<rand::rngs::ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> GaussianNoise<R> {
    /// Creates a generator drawing from `rng`.
    ///
    /// # Examples
    ///
    /// ```
    /// use pmchain::noise::GaussianNoise;
    /// use rand::SeedableRng;
    ///
    /// let seeded = || GaussianNoise::with_rng(rand::rngs::StdRng::seed_from_u64(7));
    /// let a = seeded().samples(4, 1.0).unwrap();
    /// let b = seeded().samples(4, 1.0).unwrap();
    /// assert_eq!(a, b);
    /// ```
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Draws one standard normal sample.
    pub fn next_sample(&mut self) -> f64 {
        StandardNormal.sample(&mut self.rng)
    }

    /// Draws `len` samples with standard deviation `sigma`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `sigma` is negative or not
    /// finite.
    pub fn samples(&mut self, len: usize, sigma: f64) -> Result<Vec<f64>> {
        if !sigma.is_finite() {
            return Err(Error::invalid(format!(
                "noise sigma must be finite, got {sigma}"
            )));
        }
        let normal = Normal::new(0.0, sigma)
            .map_err(|e| Error::invalid(format!("noise sigma {sigma}: {e}")))?;
        Ok(normal.sample_iter(&mut self.rng).take(len).collect())
    }
}
