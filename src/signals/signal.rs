//! The sampled waveform container passed between blocks.

use super::spectrum::{self, Spectrum};
use crate::error::{Error, Result};

/// A finite, sampled, real-valued waveform together with its sample rate.
///
/// A `Signal` is immutable once built: blocks never modify one in place,
/// they produce a fresh `Signal` every time they process. The time axis and
/// the spectrum are derived on demand and never cached, so every view is a
/// pure function of the samples.
///
/// # Examples
///
/// ```
/// use pmchain::Signal;
///
/// let signal = Signal::new(vec![1.0, -1.0, 1.0, -1.0], 4.0).unwrap();
/// let (time, samples) = signal.time_domain();
/// assert_eq!(time, vec![0.0, 0.25, 0.5, 0.75]);
/// assert_eq!(samples, &[1.0, -1.0, 1.0, -1.0]);
/// assert_eq!(signal.energy(), 1.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    samples: Vec<f64>,
    sample_rate: f64,
}

impl Signal {
    /// Creates a signal from raw samples.
    ///
    /// # Arguments
    ///
    /// * `samples` - Sample values, oldest first
    /// * `sample_rate` - Sample rate in Hz, must be positive and finite
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `samples` is empty or
    /// `sample_rate` is not a positive finite number.
    pub fn new(samples: Vec<f64>, sample_rate: f64) -> Result<Self> {
        if samples.is_empty() {
            return Err(Error::invalid("a signal needs at least one sample"));
        }
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(Error::invalid(format!(
                "sample rate must be positive, got {sample_rate}"
            )));
        }
        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// Creates a silent signal of `len` samples.
    ///
    /// # Errors
    ///
    /// Same as [`Signal::new`].
    pub fn zeros(len: usize, sample_rate: f64) -> Result<Self> {
        Self::new(vec![0.0; len], sample_rate)
    }

    // Blocks only ever build signals from a validated timeline.
    pub(crate) fn from_parts(samples: Vec<f64>, sample_rate: f64) -> Self {
        debug_assert!(sample_rate > 0.0 && !samples.is_empty());
        Self {
            samples,
            sample_rate,
        }
    }

    /// The sample values.
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// Consumes the signal and returns its sample buffer.
    pub fn into_samples(self) -> Vec<f64> {
        self.samples
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns true if the signal holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Length of the signal in seconds.
    pub fn duration(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate
    }

    /// Regenerates the time axis and pairs it with the samples.
    ///
    /// The axis is `t_k = k / sample_rate`; it is not stored anywhere.
    pub fn time_domain(&self) -> (Vec<f64>, &[f64]) {
        let time = (0..self.samples.len())
            .map(|k| k as f64 / self.sample_rate)
            .collect();
        (time, &self.samples)
    }

    /// Arithmetic mean of the samples, 0 for an empty signal.
    pub fn mean(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().sum::<f64>() / self.samples.len() as f64
    }

    /// Mean square of the samples (total power, including any DC offset).
    pub fn power(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().map(|x| x * x).sum::<f64>() / self.samples.len() as f64
    }

    /// Population variance of the samples.
    ///
    /// This is the signal "energy" the channel uses to scale its noise:
    /// DC offset is ignored, so SNR is always relative to the varying part
    /// of the waveform.
    pub fn energy(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let mean = self.mean();
        self.samples
            .iter()
            .map(|x| (x - mean) * (x - mean))
            .sum::<f64>()
            / self.samples.len() as f64
    }

    /// Blackman-windowed, zero-centred magnitude spectrum normalized to its
    /// own peak.
    pub fn spectrum(&self) -> Spectrum {
        spectrum::normalized_spectrum(&self.samples, self.sample_rate)
    }

    /// Same as [`Signal::spectrum`] with the magnitude expressed in dB.
    pub fn spectrum_db(&self) -> Spectrum {
        self.spectrum().to_db()
    }
}
