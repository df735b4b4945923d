//! Applying designed coefficients to whole sample buffers.
//!
//! Two modes are provided: plain causal filtering, which delays the signal
//! by the filter's group delay, and forward-backward zero-phase filtering,
//! which cancels that delay at the cost of needing the entire buffer up
//! front (always the case in this crate).

use super::Coefficients;
use tracing::debug;

/// How a filter block runs its coefficients over the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "config", serde(rename_all = "snake_case"))]
pub enum FilterMode {
    /// Forward-only recursive filtering. Introduces phase delay.
    #[default]
    Causal,
    /// Forward-backward filtering. No phase delay, squared magnitude
    /// response (effective order doubled).
    ZeroPhase,
}

impl FilterMode {
    /// Runs `coeffs` over `input` in this mode.
    pub fn apply(self, coeffs: &Coefficients, input: &[f64]) -> Vec<f64> {
        match self {
            FilterMode::Causal => lfilter(coeffs, input),
            FilterMode::ZeroPhase => filtfilt(coeffs, input),
        }
    }
}

/// Causal IIR filtering from a zero initial state.
///
/// Implements the direct-form II transposed difference equation
/// `a[0] y[n] = sum b[k] x[n-k] - sum_{k>=1} a[k] y[n-k]`.
pub fn lfilter(coeffs: &Coefficients, input: &[f64]) -> Vec<f64> {
    let taps = coeffs.b().len().max(coeffs.a().len());
    lfilter_with_state(coeffs, input, vec![0.0; taps - 1])
}

/// Steady-state initial conditions for a unit step input.
///
/// Scaling the returned state by the first sample of a buffer starts the
/// filter as if that value had been applied forever, which suppresses the
/// start-up transient.
pub fn lfilter_zi(coeffs: &Coefficients) -> Vec<f64> {
    let (b, a) = padded(coeffs);
    let n = b.len();
    if n < 2 {
        return Vec::new();
    }
    let m = n - 1;

    // (I - companion(a)^T) zi = b[1..] - a[1..] * b[0]
    let mut matrix = vec![vec![0.0; m]; m];
    for (i, row) in matrix.iter_mut().enumerate() {
        row[i] += 1.0;
        row[0] += a[i + 1];
        if i + 1 < m {
            row[i + 1] -= 1.0;
        }
    }
    let rhs: Vec<f64> = (0..m).map(|i| b[i + 1] - a[i + 1] * b[0]).collect();

    match solve(matrix, rhs) {
        Some(zi) => zi,
        None => {
            debug!(order = m, "steady state is singular, starting from rest");
            vec![0.0; m]
        }
    }
}

/// Zero-phase forward-backward filtering.
///
/// The input is extended at both ends by odd reflection over
/// `3 * max(len(a), len(b))` samples (fewer for very short buffers), both
/// passes start from the steady-state initial conditions, and the padding
/// is stripped from the result.
pub fn filtfilt(coeffs: &Coefficients, input: &[f64]) -> Vec<f64> {
    if input.is_empty() {
        return Vec::new();
    }
    let taps = coeffs.b().len().max(coeffs.a().len());
    let pad = (3 * taps).min(input.len() - 1);
    let extended = odd_extend(input, pad);
    let zi = lfilter_zi(coeffs);

    let scaled = |x0: f64| zi.iter().map(|z| z * x0).collect::<Vec<f64>>();

    let mut forward = lfilter_with_state(coeffs, &extended, scaled(extended[0]));
    forward.reverse();
    let mut backward = lfilter_with_state(coeffs, &forward, scaled(forward[0]));
    backward.reverse();

    backward[pad..pad + input.len()].to_vec()
}

fn lfilter_with_state(coeffs: &Coefficients, input: &[f64], mut state: Vec<f64>) -> Vec<f64> {
    let (b, a) = padded(coeffs);
    let n = b.len();
    let mut output = Vec::with_capacity(input.len());

    for &x in input {
        let y = b[0] * x + state.first().copied().unwrap_or(0.0);
        for j in 0..n.saturating_sub(1) {
            let next = if j + 1 < n - 1 { state[j + 1] } else { 0.0 };
            state[j] = b[j + 1] * x + next - a[j + 1] * y;
        }
        output.push(y);
    }
    output
}

/// `b` and `a` zero-padded to a common length.
fn padded(coeffs: &Coefficients) -> (Vec<f64>, Vec<f64>) {
    let n = coeffs.b().len().max(coeffs.a().len());
    let mut b = coeffs.b().to_vec();
    let mut a = coeffs.a().to_vec();
    b.resize(n, 0.0);
    a.resize(n, 0.0);
    (b, a)
}

fn odd_extend(input: &[f64], pad: usize) -> Vec<f64> {
    let n = input.len();
    let first = input[0];
    let last = input[n - 1];

    let mut extended = Vec::with_capacity(n + 2 * pad);
    extended.extend((1..=pad).rev().map(|k| 2.0 * first - input[k]));
    extended.extend_from_slice(input);
    extended.extend((1..=pad).map(|k| 2.0 * last - input[n - 1 - k]));
    extended
}

/// Gaussian elimination with partial pivoting. `None` if singular.
fn solve(mut matrix: Vec<Vec<f64>>, mut rhs: Vec<f64>) -> Option<Vec<f64>> {
    let m = rhs.len();
    for col in 0..m {
        let pivot = (col..m)
            .max_by(|&i, &j| matrix[i][col].abs().total_cmp(&matrix[j][col].abs()))?;
        if matrix[pivot][col].abs() < 1e-14 {
            return None;
        }
        matrix.swap(col, pivot);
        rhs.swap(col, pivot);

        for row in col + 1..m {
            let factor = matrix[row][col] / matrix[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..m {
                let delta = factor * matrix[col][k];
                matrix[row][k] -= delta;
            }
            let delta = factor * rhs[col];
            rhs[row] -= delta;
        }
    }

    let mut solution = vec![0.0; m];
    for row in (0..m).rev() {
        let tail: f64 = (row + 1..m).map(|k| matrix[row][k] * solution[k]).sum();
        solution[row] = (rhs[row] - tail) / matrix[row][row];
    }
    Some(solution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{design_bandpass, design_lowpass};
    use std::f64::consts::PI;

    fn tone(freq: f64, fs: f64, len: usize) -> Vec<f64> {
        (0..len)
            .map(|k| (2.0 * PI * freq * k as f64 / fs).sin())
            .collect()
    }

    fn rms(values: &[f64]) -> f64 {
        (values.iter().map(|v| v * v).sum::<f64>() / values.len() as f64).sqrt()
    }

    #[test]
    fn test_lfilter_moving_average() {
        let coeffs = Coefficients::new(vec![0.5, 0.5], vec![1.0]).unwrap();
        let y = lfilter(&coeffs, &[2.0, 4.0, 6.0, 8.0]);
        assert_eq!(y, vec![1.0, 3.0, 5.0, 7.0]);
    }

    #[test]
    fn test_lfilter_one_pole_recursion() {
        // y[n] = x[n] + 0.5 y[n-1]
        let coeffs = Coefficients::new(vec![1.0], vec![1.0, -0.5]).unwrap();
        let y = lfilter(&coeffs, &[1.0, 0.0, 0.0, 0.0]);
        assert_eq!(y, vec![1.0, 0.5, 0.25, 0.125]);
    }

    #[test]
    fn test_lfilter_zi_gives_steady_state_step() {
        let coeffs = design_lowpass(50.0, 1000.0, 4).unwrap();
        let zi = lfilter_zi(&coeffs);
        let y = lfilter_with_state(&coeffs, &[1.0; 32], zi);
        for v in y {
            assert!((v - 1.0).abs() < 1e-9, "step response not settled: {}", v);
        }
    }

    #[test]
    fn test_causal_lowpass_attenuates_high_tone() {
        let fs = 1000.0;
        let coeffs = design_lowpass(50.0, fs, 5).unwrap();
        let low = lfilter(&coeffs, &tone(10.0, fs, 2000));
        let high = lfilter(&coeffs, &tone(200.0, fs, 2000));
        assert!(rms(&low[500..]) > 0.65);
        assert!(rms(&high[500..]) < 1e-3);
    }

    #[test]
    fn test_lfilter_zi_of_integrator_is_rest() {
        // A pole at z = 1 has no steady state for a step.
        let coeffs = Coefficients::new(vec![1.0, 0.5], vec![1.0, -1.0]).unwrap();
        assert_eq!(lfilter_zi(&coeffs), vec![0.0]);

        let out = filtfilt(&coeffs, &[1.0; 8]);
        assert_eq!(out.len(), 8);
        assert!(out.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_filtfilt_has_no_phase_delay() {
        let fs = 1000.0;
        let input = tone(5.0, fs, 2000);
        let coeffs = design_lowpass(50.0, fs, 5).unwrap();

        let zero_phase = filtfilt(&coeffs, &input);
        let causal = lfilter(&coeffs, &input);

        let err = |y: &[f64]| {
            let diff: Vec<f64> = y[200..1800]
                .iter()
                .zip(input[200..1800].iter())
                .map(|(a, b)| a - b)
                .collect();
            rms(&diff)
        };
        assert!(err(&zero_phase) < 1e-3, "zero-phase error {}", err(&zero_phase));
        assert!(err(&causal) > 1e-2, "causal output should lag the input");
    }

    #[test]
    fn test_filtfilt_preserves_length_and_constant() {
        let coeffs = design_bandpass(80.0, 120.0, 1000.0, 2).unwrap();
        let out = filtfilt(&coeffs, &[0.0; 100]);
        assert_eq!(out.len(), 100);
        assert!(out.iter().all(|v| v.abs() < 1e-12));

        let lp = design_lowpass(50.0, 1000.0, 3).unwrap();
        let out = filtfilt(&lp, &[2.0; 64]);
        assert!(out.iter().all(|v| (v - 2.0).abs() < 1e-9));
    }

    #[test]
    fn test_filtfilt_short_buffers() {
        let coeffs = design_lowpass(50.0, 1000.0, 5).unwrap();
        assert!(filtfilt(&coeffs, &[]).is_empty());
        assert_eq!(filtfilt(&coeffs, &[1.5]).len(), 1);
        assert_eq!(filtfilt(&coeffs, &[1.0, 2.0, 3.0]).len(), 3);
    }

    #[test]
    fn test_odd_extension() {
        let ext = odd_extend(&[1.0, 2.0, 4.0], 2);
        assert_eq!(ext, vec![-2.0, 0.0, 1.0, 2.0, 4.0, 6.0, 7.0]);
    }

    #[test]
    fn test_mode_dispatch() {
        let coeffs = Coefficients::new(vec![0.5, 0.5], vec![1.0]).unwrap();
        let input = [1.0, 2.0, 3.0];
        assert_eq!(FilterMode::Causal.apply(&coeffs, &input), lfilter(&coeffs, &input));
        assert_eq!(
            FilterMode::ZeroPhase.apply(&coeffs, &input),
            filtfilt(&coeffs, &input)
        );
    }
}
