//! Frequency-domain view of a signal.
//!
//! The spectrum is computed the same way for every block output: a
//! Blackman window over the whole buffer, a full-length DFT, an fft-shift
//! that puts 0 Hz in the middle, and a normalization by the peak magnitude.

use num_complex::Complex64;
use rustfft::FftPlanner;
use std::f64::consts::PI;

/// A zero-centred frequency axis paired with a magnitude per bin.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    /// Bin frequencies in Hz, ascending, `(i - N/2) * fs / N`.
    pub frequencies: Vec<f64>,
    /// Magnitude per bin, linear (peak = 1) or in dB depending on how the
    /// spectrum was obtained.
    pub magnitude: Vec<f64>,
}

impl Spectrum {
    /// Number of bins.
    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    /// Returns true if the spectrum has no bins.
    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    /// Converts a linear magnitude spectrum into dB (`20·log10`).
    ///
    /// Empty bins map to negative infinity.
    pub fn to_db(&self) -> Self {
        Self {
            frequencies: self.frequencies.clone(),
            magnitude: self.magnitude.iter().map(|m| 20.0 * m.log10()).collect(),
        }
    }

    /// Keeps only the non-negative frequency half of the spectrum.
    pub fn one_sided(&self) -> Self {
        let start = self.frequencies.len() / 2;
        Self {
            frequencies: self.frequencies[start..].to_vec(),
            magnitude: self.magnitude[start..].to_vec(),
        }
    }

    /// Frequency of the strongest bin, if any.
    pub fn peak_frequency(&self) -> Option<f64> {
        self.magnitude
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| self.frequencies[i])
    }
}

/// Blackman window of length `n` (symmetric, endpoints at zero).
pub fn blackman(n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![1.0],
        _ => {
            let m = (n - 1) as f64;
            (0..n)
                .map(|i| {
                    let x = i as f64 / m;
                    0.42 - 0.5 * (2.0 * PI * x).cos() + 0.08 * (4.0 * PI * x).cos()
                })
                .collect()
        }
    }
}

/// Zero-centred frequency axis matching an fft-shifted DFT of length `n`.
pub fn shifted_frequencies(n: usize, sample_rate: f64) -> Vec<f64> {
    let half = (n / 2) as f64;
    let bin = sample_rate / n as f64;
    (0..n).map(|i| (i as f64 - half) * bin).collect()
}

/// Rotates a DFT so the zero-frequency bin lands at index `n / 2`.
pub fn fft_shift<T: Copy>(values: &[T]) -> Vec<T> {
    let n = values.len();
    let split = n - n / 2;
    values[split..]
        .iter()
        .chain(values[..split].iter())
        .copied()
        .collect()
}

pub(crate) fn normalized_spectrum(samples: &[f64], sample_rate: f64) -> Spectrum {
    let n = samples.len();
    let frequencies = shifted_frequencies(n, sample_rate);
    if n == 0 {
        return Spectrum {
            frequencies,
            magnitude: Vec::new(),
        };
    }

    let window = blackman(n);
    let mut buffer: Vec<Complex64> = samples
        .iter()
        .zip(window.iter())
        .map(|(x, w)| Complex64::new(x * w, 0.0))
        .collect();

    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(n);
    fft.process(&mut buffer);

    let magnitude: Vec<f64> = fft_shift(&buffer).iter().map(|c| c.norm()).collect();
    let peak = magnitude.iter().copied().fold(0.0_f64, f64::max);
    let magnitude = if peak > 0.0 {
        magnitude.into_iter().map(|m| m / peak).collect()
    } else {
        // Silent input: nothing to normalize against.
        vec![0.0; n]
    };

    Spectrum {
        frequencies,
        magnitude,
    }
}
