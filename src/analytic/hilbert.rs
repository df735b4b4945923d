//! FFT-based analytic signal construction.

use num_complex::Complex64;
use rustfft::FftPlanner;

/// Which construction a demodulator uses to obtain the analytic signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "config", serde(rename_all = "snake_case"))]
pub enum AnalyticMethod {
    /// One FFT round trip, see [`analytic_signal`].
    #[default]
    Single,
    /// Two Hilbert transforms combined in quadrature, see
    /// [`analytic_signal_double`].
    DoubleQuadrature,
}

impl AnalyticMethod {
    /// Builds the analytic signal of `samples` with this construction.
    pub fn apply(self, samples: &[f64]) -> Vec<Complex64> {
        match self {
            AnalyticMethod::Single => analytic_signal(samples),
            AnalyticMethod::DoubleQuadrature => analytic_signal_double(samples),
        }
    }
}

/// Returns the analytic signal `x + j·H{x}` of a real buffer.
///
/// The buffer is transformed with a full-length DFT, negative-frequency
/// bins are zeroed, positive ones doubled, and the DC bin (and the Nyquist
/// bin for even lengths) kept as is before the inverse transform. The real
/// part of the result reproduces the input.
///
/// # Examples
///
/// ```
/// use pmchain::analytic::analytic_signal;
///
/// let x: Vec<f64> = (0..64)
///     .map(|k| (2.0 * std::f64::consts::PI * 4.0 * k as f64 / 64.0).cos())
///     .collect();
/// let z = analytic_signal(&x);
/// // cos -> e^{jθ}: unit envelope everywhere.
/// assert!(z.iter().all(|c| (c.norm() - 1.0).abs() < 1e-9));
/// ```
pub fn analytic_signal(samples: &[f64]) -> Vec<Complex64> {
    let n = samples.len();
    if n == 0 {
        return Vec::new();
    }

    let mut planner = FftPlanner::<f64>::new();
    let forward = planner.plan_fft_forward(n);
    let inverse = planner.plan_fft_inverse(n);

    let mut buffer: Vec<Complex64> = samples.iter().map(|&x| Complex64::new(x, 0.0)).collect();
    forward.process(&mut buffer);

    let positive_end = n.div_ceil(2);
    for (k, bin) in buffer.iter_mut().enumerate() {
        if k == 0 || (n % 2 == 0 && k == n / 2) {
            continue;
        }
        *bin *= if k < positive_end { 2.0 } else { 0.0 };
    }

    inverse.process(&mut buffer);
    let scale = 1.0 / n as f64;
    buffer.iter_mut().for_each(|c| *c *= scale);
    buffer
}

/// The Hilbert transform of a real buffer, `Im(analytic_signal(x))`.
pub fn hilbert_transform(samples: &[f64]) -> Vec<f64> {
    analytic_signal(samples).into_iter().map(|c| c.im).collect()
}

/// Analytic signal built from two Hilbert transforms.
///
/// With `y = H{x}`, the result is `-H{y} + j·y`. Applying `H` twice drops
/// the DC and Nyquist content of `x`, so those parts are added back to the
/// real part. The result matches [`analytic_signal`] to floating-point
/// precision for any input.
pub fn analytic_signal_double(samples: &[f64]) -> Vec<Complex64> {
    let quadrature = hilbert_transform(samples);
    let in_phase = hilbert_transform(&quadrature);
    let residual = dc_and_nyquist(samples);
    in_phase
        .into_iter()
        .zip(quadrature)
        .zip(residual)
        .map(|((i, q), r)| Complex64::new(r - i, q))
        .collect()
}

/// The part of `samples` living in the DC bin and, for even lengths, the
/// Nyquist bin.
fn dc_and_nyquist(samples: &[f64]) -> Vec<f64> {
    let n = samples.len();
    if n == 0 {
        return Vec::new();
    }
    let alternating = |k: usize| if k % 2 == 0 { 1.0 } else { -1.0 };
    let mean = samples.iter().sum::<f64>() / n as f64;
    let nyquist = if n % 2 == 0 {
        samples
            .iter()
            .enumerate()
            .map(|(k, x)| x * alternating(k))
            .sum::<f64>()
            / n as f64
    } else {
        0.0
    };
    (0..n).map(|k| mean + nyquist * alternating(k)).collect()
}
