//! The shared sample-instant axis of a pipeline.

use crate::error::{Error, Result};
use crate::signals::Signal;

/// Relative slack used when turning `duration * sample_rate` into a count.
const COUNT_TOLERANCE: f64 = 1e-9;

/// Sample instants shared by every block of a pipeline.
///
/// The timeline holds `floor(duration * sample_rate)` instants
/// `t_k = k / sample_rate`. It is created once by the pipeline and shared
/// read-only (behind an `Arc`) with every block built for it.
///
/// # Examples
///
/// ```
/// use pmchain::Timeline;
///
/// let timeline = Timeline::new(2.0, 1000.0).unwrap();
/// assert_eq!(timeline.len(), 2000);
/// assert_eq!(timeline.times()[1], 0.001);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    duration: f64,
    sample_rate: f64,
    times: Vec<f64>,
}

impl Timeline {
    /// Builds the timeline for a simulation.
    ///
    /// # Arguments
    ///
    /// * `duration` - Total simulated time in seconds
    /// * `sample_rate` - Sample rate in Hz
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if either value is not positive
    /// and finite, or if not even one sample period fits in `duration`.
    pub fn new(duration: f64, sample_rate: f64) -> Result<Self> {
        if !(duration.is_finite() && duration > 0.0) {
            return Err(Error::invalid(format!(
                "duration must be positive, got {duration}"
            )));
        }
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(Error::invalid(format!(
                "sample rate must be positive, got {sample_rate}"
            )));
        }

        let exact = duration * sample_rate;
        let count = (exact * (1.0 + COUNT_TOLERANCE)).floor();
        if count < 1.0 {
            return Err(Error::invalid(format!(
                "duration {duration} s is shorter than one sample period at {sample_rate} Hz"
            )));
        }

        let len = count as usize;
        let times = (0..len).map(|k| k as f64 / sample_rate).collect();
        Ok(Self {
            duration,
            sample_rate,
            times,
        })
    }

    /// Simulated duration in seconds.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Number of sample instants.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Always false for a constructed timeline; provided for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// The sample instants in seconds.
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// A silent signal spanning the whole timeline.
    pub fn zeros(&self) -> Signal {
        Signal::from_parts(vec![0.0; self.len()], self.sample_rate)
    }

    /// Wraps samples computed on this timeline into a signal.
    pub(crate) fn signal(&self, samples: Vec<f64>) -> Signal {
        debug_assert_eq!(samples.len(), self.len());
        Signal::from_parts(samples, self.sample_rate)
    }

    /// Checks that `signal` could have been produced on this timeline.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] when the length or sample rate differ.
    pub fn check_compatible(&self, signal: &Signal) -> Result<()> {
        if signal.len() != self.len() {
            return Err(Error::mismatch(format!(
                "signal has {} samples, timeline has {}",
                signal.len(),
                self.len()
            )));
        }
        if signal.sample_rate() != self.sample_rate {
            return Err(Error::mismatch(format!(
                "signal sampled at {} Hz, timeline at {} Hz",
                signal.sample_rate(),
                self.sample_rate
            )));
        }
        Ok(())
    }
}
