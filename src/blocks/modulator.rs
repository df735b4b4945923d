//! Phase modulator.

use super::Transform;
use crate::signals::{Signal, Timeline};
use std::f64::consts::PI;

/// Phase-modulates a carrier with the input signal.
///
/// The output is `amplitude · sin(2π·frequency·t + deviation·m(t))`, where
/// `m` is the input.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseModulator {
    frequency: f64,
    amplitude: f64,
    deviation: f64,
}

impl PhaseModulator {
    /// Creates a modulator.
    ///
    /// # Arguments
    ///
    /// * `frequency` - Carrier frequency in Hz
    /// * `amplitude` - Carrier peak amplitude
    /// * `deviation` - Phase deviation in radians per unit of input
    pub fn new(frequency: f64, amplitude: f64, deviation: f64) -> Self {
        Self {
            frequency,
            amplitude,
            deviation,
        }
    }

    /// Carrier frequency in Hz.
    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// Carrier peak amplitude.
    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }

    /// Phase deviation in radians per unit of input.
    pub fn deviation(&self) -> f64 {
        self.deviation
    }

    /// Peak frequency deviation in Hz for a unit sinusoidal message at
    /// `message_hz`.
    pub fn peak_frequency_deviation(&self, message_hz: f64) -> f64 {
        self.deviation.abs() * message_hz
    }

    /// Carson's rule bandwidth estimate, `2·(Δf + f_m)`, for a unit
    /// sinusoidal message at `message_hz`.
    ///
    /// # Examples
    ///
    /// ```
    /// use pmchain::blocks::PhaseModulator;
    ///
    /// let pm = PhaseModulator::new(100.0, 1.0, 0.5);
    /// assert_eq!(pm.carson_bandwidth(50.0), 150.0);
    /// ```
    pub fn carson_bandwidth(&self, message_hz: f64) -> f64 {
        2.0 * (self.peak_frequency_deviation(message_hz) + message_hz)
    }
}

impl Transform for PhaseModulator {
    fn process(&mut self, input: &Signal, timeline: &Timeline) -> Signal {
        let omega = 2.0 * PI * self.frequency;
        let samples = timeline
            .times()
            .iter()
            .zip(input.samples())
            .map(|(t, m)| self.amplitude * (omega * t + self.deviation * m).sin())
            .collect();
        timeline.signal(samples)
    }

    fn label(&self) -> String {
        "Phase Modulator".to_string()
    }
}
