//! Phase demodulator.

use super::Transform;
use crate::analytic::{AnalyticMethod, unwrap};
use crate::error::{Error, Result};
use crate::signals::{Signal, Timeline};
use std::f64::consts::{FRAC_PI_2, PI};
use tracing::debug;

/// Samples at each buffer edge used to fit the carrier continuation.
const EDGE_FIT: usize = 4;

/// Recovers the message from a phase-modulated carrier.
///
/// The instantaneous phase is read off the analytic signal of the input,
/// unwrapped, and corrected by `+π/2` (the analytic signal of `sin θ` is
/// `-j·e^{jθ}`). The carrier ramp `2π·carrier·t` is then subtracted and the
/// remainder divided by the deviation. By default the mean of the result is
/// removed as well, which cancels the 2πk offset unwrapping may leave.
///
/// The analytic signal is taken over a padded buffer. Half the input length
/// is added on each side as a tapered continuation of the carrier and
/// cropped off afterwards, so the FFT never sees a jump where the buffer
/// wraps around.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseDemodulator {
    carrier_hz: f64,
    deviation: f64,
    method: AnalyticMethod,
    remove_mean: bool,
}

impl PhaseDemodulator {
    /// Creates a demodulator matching a [`PhaseModulator`](super::PhaseModulator).
    ///
    /// # Arguments
    ///
    /// * `carrier_hz` - Carrier frequency in Hz
    /// * `deviation` - Phase deviation used by the modulator
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `deviation` is zero or not
    /// finite.
    pub fn new(carrier_hz: f64, deviation: f64) -> Result<Self> {
        if deviation == 0.0 || !deviation.is_finite() {
            return Err(Error::invalid(format!(
                "deviation must be finite and non-zero, got {deviation}"
            )));
        }
        Ok(Self {
            carrier_hz,
            deviation,
            method: AnalyticMethod::default(),
            remove_mean: true,
        })
    }

    /// Selects how the analytic signal is built.
    pub fn with_method(mut self, method: AnalyticMethod) -> Self {
        self.method = method;
        self
    }

    /// Enables or disables removal of the output mean.
    pub fn with_mean_removal(mut self, enabled: bool) -> Self {
        self.remove_mean = enabled;
        self
    }

    /// Carrier frequency in Hz.
    pub fn carrier_hz(&self) -> f64 {
        self.carrier_hz
    }

    /// Phase deviation the output is divided by.
    pub fn deviation(&self) -> f64 {
        self.deviation
    }

    /// Construction used for the analytic signal.
    pub fn method(&self) -> AnalyticMethod {
        self.method
    }

    /// Whether the output mean is removed.
    pub fn removes_mean(&self) -> bool {
        self.remove_mean
    }
}

impl Transform for PhaseDemodulator {
    fn process(&mut self, input: &Signal, timeline: &Timeline) -> Signal {
        let omega = 2.0 * PI * self.carrier_hz;
        let len = input.len();
        let pad = len / 2;
        let padded = extend_carrier(input.samples(), omega / timeline.sample_rate(), pad);
        let analytic = self.method.apply(&padded);
        let wrapped: Vec<f64> = analytic[pad..pad + len].iter().map(|z| z.arg()).collect();
        let phase = unwrap(&wrapped);

        let mut samples: Vec<f64> = phase
            .iter()
            .zip(timeline.times())
            .map(|(p, t)| (p + FRAC_PI_2 - omega * t) / self.deviation)
            .collect();

        if self.remove_mean && !samples.is_empty() {
            let mean = samples.iter().sum::<f64>() / samples.len() as f64;
            samples.iter_mut().for_each(|s| *s -= mean);
        }
        timeline.signal(samples)
    }

    fn label(&self) -> String {
        "Phase Demodulator".to_string()
    }
}

/// Pads `samples` with `pad` extra samples on each side.
///
/// A tone at `omega` radians per sample is fitted by least squares to the
/// first and last [`EDGE_FIT`] samples and continued outwards under a
/// raised-cosine taper that reaches zero at the outer ends. If a fit is
/// ill-conditioned (a carrier at DC or Nyquist) that side is padded with
/// zeros.
fn extend_carrier(samples: &[f64], omega: f64, pad: usize) -> Vec<f64> {
    let len = samples.len();
    if pad == 0 || len == 0 {
        return samples.to_vec();
    }
    let fit = EDGE_FIT.min(len);
    let head = fit_tone(&samples[..fit], 0.0, omega);
    let tail = fit_tone(&samples[len - fit..], -((fit - 1) as f64), omega);
    let taper = |j: usize| 0.5 * (1.0 + (PI * j as f64 / pad as f64).cos());

    let mut padded = Vec::with_capacity(len + 2 * pad);
    padded.extend((1..=pad).rev().map(|j| taper(j) * head.at(-(j as f64), omega)));
    padded.extend_from_slice(samples);
    padded.extend((1..=pad).map(|j| taper(j) * tail.at(j as f64, omega)));
    padded
}

/// `a·cos(ω·p) + b·sin(ω·p)` with `p` counted in samples from a buffer edge.
#[derive(Debug, Clone, Copy, Default)]
struct Tone {
    a: f64,
    b: f64,
}

impl Tone {
    fn at(self, position: f64, omega: f64) -> f64 {
        self.a * (omega * position).cos() + self.b * (omega * position).sin()
    }
}

/// Least-squares tone fit to `samples`, the first of which sits at `start`.
fn fit_tone(samples: &[f64], start: f64, omega: f64) -> Tone {
    let (mut cc, mut ss, mut cs, mut xc, mut xs) = (0.0, 0.0, 0.0, 0.0, 0.0);
    for (k, x) in samples.iter().enumerate() {
        let (s, c) = (omega * (start + k as f64)).sin_cos();
        cc += c * c;
        ss += s * s;
        cs += c * s;
        xc += x * c;
        xs += x * s;
    }
    let det = cc * ss - cs * cs;
    if det <= 1e-9 * (cc + ss).powi(2) {
        debug!(omega, "carrier fit is singular, padding with zeros");
        return Tone::default();
    }
    Tone {
        a: (xc * ss - xs * cs) / det,
        b: (xs * cc - xc * cs) / det,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::{PhaseModulator, SineGenerator};

    fn modulated(
        timeline: &Timeline,
        message_hz: f64,
        carrier_hz: f64,
        deviation: f64,
    ) -> (Signal, Signal) {
        let message = SineGenerator::new(message_hz).process(&timeline.zeros(), timeline);
        let carrier = PhaseModulator::new(carrier_hz, 1.0, deviation).process(&message, timeline);
        (message, carrier)
    }

    fn mse(a: &[f64], b: &[f64]) -> f64 {
        a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum::<f64>() / a.len() as f64
    }

    fn centered(signal: &Signal) -> Vec<f64> {
        let mean = signal.mean();
        signal.samples().iter().map(|s| s - mean).collect()
    }

    #[test]
    fn test_rejects_zero_deviation() {
        assert!(matches!(
            PhaseDemodulator::new(100.0, 0.0),
            Err(Error::InvalidArgument(_))
        ));
        assert!(PhaseDemodulator::new(100.0, f64::NAN).is_err());
        assert!(PhaseDemodulator::new(100.0, f64::INFINITY).is_err());
        assert!(PhaseDemodulator::new(100.0, -0.5).is_ok());
    }

    #[test]
    fn test_defaults() {
        let demod = PhaseDemodulator::new(100.0, 0.5).unwrap();
        assert_eq!(demod.carrier_hz(), 100.0);
        assert_eq!(demod.deviation(), 0.5);
        assert_eq!(demod.method(), AnalyticMethod::Single);
        assert!(demod.removes_mean());
    }

    #[test]
    fn test_recovers_message() {
        let timeline = Timeline::new(2.0, 1000.0).unwrap();
        let (message, carrier) = modulated(&timeline, 5.0, 100.0, 0.5);
        let mut demod = PhaseDemodulator::new(100.0, 0.5).unwrap();
        let recovered = demod.process(&carrier, &timeline);
        let error = mse(recovered.samples(), message.samples());
        assert!(error < 1e-5, "mse = {}", error);
    }

    #[test]
    fn test_recovers_message_on_partial_periods() {
        let cases = [
            (1.001, 3.7, 123.4, 1.0),
            (1.0, 5.0, 100.3, 0.1),
            (1.0, 5.0, 100.3, 0.5),
            (0.25, 3.0, 50.0, 0.5),
        ];
        for (duration, message_hz, carrier_hz, deviation) in cases {
            let timeline = Timeline::new(duration, 1000.0).unwrap();
            let (message, carrier) = modulated(&timeline, message_hz, carrier_hz, deviation);
            let mut demod = PhaseDemodulator::new(carrier_hz, deviation).unwrap();
            let recovered = demod.process(&carrier, &timeline);
            let error = mse(recovered.samples(), &centered(&message));
            assert!(error < 1e-4, "{carrier_hz} Hz, deviation {deviation}: mse = {error}");

            let edge = (recovered.samples()[0] - centered(&message)[0]).abs();
            assert!(edge < 0.2, "first sample off by {}", edge);
        }
    }

    #[test]
    fn test_extend_carrier_continues_a_tone() {
        let omega = 2.0 * PI * 0.1003;
        let x: Vec<f64> = (0..101).map(|k| (omega * k as f64 + 0.3).sin()).collect();
        let pad = 50;
        let padded = extend_carrier(&x, omega, pad);
        assert_eq!(padded.len(), x.len() + 2 * pad);
        assert_eq!(&padded[pad..pad + x.len()], x.as_slice());

        let taper = |j: usize| 0.5 * (1.0 + (PI * j as f64 / pad as f64).cos());
        for j in 1..=pad {
            let before = taper(j) * (-omega * j as f64 + 0.3).sin();
            let after = taper(j) * (omega * (100 + j) as f64 + 0.3).sin();
            assert!((padded[pad - j] - before).abs() < 1e-9);
            assert!((padded[pad + 100 + j] - after).abs() < 1e-9);
        }
        assert!(padded[0].abs() < 1e-12);
        assert!(padded[padded.len() - 1].abs() < 1e-12);
    }

    #[test]
    fn test_extend_carrier_at_nyquist_pads_zeros() {
        let x: Vec<f64> = (0..8).map(|k| if k % 2 == 0 { 1.0 } else { -1.0 }).collect();
        let padded = extend_carrier(&x, PI, 4);
        assert!(padded[..4].iter().all(|v| *v == 0.0));
        assert!(padded[12..].iter().all(|v| *v == 0.0));
        assert_eq!(extend_carrier(&x, PI, 0), x);
    }

    #[test]
    fn test_methods_agree() {
        let cases = [(1.0, 800.0, 4.0, 120.0, 0.8), (1.001, 1000.0, 5.0, 100.3, 0.5)];
        for (duration, rate, message_hz, carrier_hz, deviation) in cases {
            let timeline = Timeline::new(duration, rate).unwrap();
            let (_, carrier) = modulated(&timeline, message_hz, carrier_hz, deviation);
            let mut single = PhaseDemodulator::new(carrier_hz, deviation).unwrap();
            let mut double = PhaseDemodulator::new(carrier_hz, deviation)
                .unwrap()
                .with_method(AnalyticMethod::DoubleQuadrature);
            let a = single.process(&carrier, &timeline);
            let b = double.process(&carrier, &timeline);
            for (x, y) in a.samples().iter().zip(b.samples()) {
                assert!((x - y).abs() < 1e-8, "{carrier_hz} Hz: {x} vs {y}");
            }
        }
    }

    #[test]
    fn test_without_mean_removal_offset_is_whole_turns() {
        let timeline = Timeline::new(2.0, 1000.0).unwrap();
        let (message, carrier) = modulated(&timeline, 5.0, 100.0, 1.0);
        let mut demod = PhaseDemodulator::new(100.0, 1.0)
            .unwrap()
            .with_mean_removal(false);
        assert!(!demod.removes_mean());
        let recovered = demod.process(&carrier, &timeline);

        let offsets: Vec<f64> = recovered
            .samples()
            .iter()
            .zip(message.samples())
            .map(|(r, m)| r - m)
            .collect();
        let offset = offsets.iter().sum::<f64>() / offsets.len() as f64;
        let turns = offset / (2.0 * PI);
        assert!((turns - turns.round()).abs() < 1e-3, "offset {}", offset);
        assert!(mse(&centered(&recovered), &centered(&message)) < 1e-5);
    }

    #[test]
    fn test_output_length_matches_timeline() {
        let timeline = Timeline::new(0.25, 400.0).unwrap();
        let mut demod = PhaseDemodulator::new(50.0, 0.5).unwrap();
        assert_eq!(demod.process(&timeline.zeros(), &timeline).len(), 100);
    }
}
