//! Sine generator, the usual pipeline source.

use super::Transform;
use crate::signals::{Signal, Timeline};
use std::f64::consts::PI;

/// Generates `amplitude · sin(2π·frequency·t + phase)` over the timeline.
///
/// This is a source: connecting it to a predecessor has no effect.
///
/// # Examples
///
/// ```
/// use pmchain::Timeline;
/// use pmchain::blocks::{SineGenerator, Transform};
///
/// let timeline = Timeline::new(1.0, 8.0).unwrap();
/// let mut sine = SineGenerator::new(2.0).with_amplitude(3.0);
/// let out = sine.process(&timeline.zeros(), &timeline);
/// assert!((out.samples()[1] - 3.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SineGenerator {
    frequency: f64,
    amplitude: f64,
    phase: f64,
}

impl SineGenerator {
    /// Creates a unit-amplitude, zero-phase sine.
    ///
    /// # Arguments
    ///
    /// * `frequency` - Frequency in Hz
    pub fn new(frequency: f64) -> Self {
        Self {
            frequency,
            amplitude: 1.0,
            phase: 0.0,
        }
    }

    /// Sets the peak amplitude.
    pub fn with_amplitude(mut self, amplitude: f64) -> Self {
        self.amplitude = amplitude;
        self
    }

    /// Sets the initial phase in radians.
    pub fn with_phase(mut self, phase: f64) -> Self {
        self.phase = phase;
        self
    }

    /// Frequency in Hz.
    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// Peak amplitude.
    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }

    /// Initial phase in radians.
    pub fn phase(&self) -> f64 {
        self.phase
    }
}

impl Transform for SineGenerator {
    fn process(&mut self, _input: &Signal, timeline: &Timeline) -> Signal {
        let omega = 2.0 * PI * self.frequency;
        let samples = timeline
            .times()
            .iter()
            .map(|t| self.amplitude * (omega * t + self.phase).sin())
            .collect();
        timeline.signal(samples)
    }

    fn label(&self) -> String {
        "Sine Generator".to_string()
    }

    fn is_source(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_samples_follow_formula() {
        let timeline = Timeline::new(1.0, 100.0).unwrap();
        let mut sine = SineGenerator::new(5.0)
            .with_amplitude(2.0)
            .with_phase(0.25);
        let out = sine.process(&timeline.zeros(), &timeline);
        assert_eq!(out.len(), 100);
        for (t, v) in timeline.times().iter().zip(out.samples()) {
            let expected = 2.0 * (2.0 * PI * 5.0 * t + 0.25).sin();
            assert!((v - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn test_ignores_input() {
        let timeline = Timeline::new(0.5, 64.0).unwrap();
        let mut sine = SineGenerator::new(4.0);
        let noisy = timeline.signal(vec![7.0; timeline.len()]);
        let a = sine.process(&timeline.zeros(), &timeline);
        let b = sine.process(&noisy, &timeline);
        assert_eq!(a, b);
        assert!(sine.is_source());
    }

    #[test]
    fn test_defaults() {
        let sine = SineGenerator::new(50.0);
        assert_eq!(sine.frequency(), 50.0);
        assert_eq!(sine.amplitude(), 1.0);
        assert_eq!(sine.phase(), 0.0);
        assert_eq!(sine.label(), "Sine Generator");
    }
}
