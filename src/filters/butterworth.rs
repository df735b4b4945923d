//! Butterworth filter design.
//!
//! Designs follow the classic analog-prototype route: the normalized
//! Butterworth poles are scaled (low-pass) or transformed (band-pass) to the
//! pre-warped cutoff, mapped to the z-plane with the bilinear transform, and
//! finally expanded into transfer-function polynomials `b` / `a`.
//!
//! Design is kept separate from application so that coefficients can be
//! checked on their own, through [`Coefficients::magnitude`].

use num_complex::Complex64;
use std::f64::consts::PI;
use tracing::debug;

use crate::error::{Error, Result};

/// Filter order used when none is given.
pub const DEFAULT_ORDER: usize = 5;

/// Transfer-function coefficients of a digital IIR filter.
///
/// `H(z) = (b[0] + b[1] z^-1 + ...) / (a[0] + a[1] z^-1 + ...)` with
/// `a[0] == 1`. The z-plane poles of the design are kept alongside so that
/// stability can be checked without root finding.
#[derive(Debug, Clone, PartialEq)]
pub struct Coefficients {
    b: Vec<f64>,
    a: Vec<f64>,
    poles: Vec<Complex64>,
}

impl Coefficients {
    /// Builds coefficients from raw polynomials, normalizing by `a[0]`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if either polynomial is empty or
    /// `a[0]` is zero.
    pub fn new(b: Vec<f64>, a: Vec<f64>) -> Result<Self> {
        let a0 = match a.first() {
            Some(&a0) if a0 != 0.0 => a0,
            _ => return Err(Error::invalid("denominator must start with a non-zero term")),
        };
        if b.is_empty() {
            return Err(Error::invalid("numerator must not be empty"));
        }
        Ok(Self {
            b: b.into_iter().map(|c| c / a0).collect(),
            a: a.into_iter().map(|c| c / a0).collect(),
            poles: Vec::new(),
        })
    }

    /// Numerator (feed-forward) coefficients.
    pub fn b(&self) -> &[f64] {
        &self.b
    }

    /// Denominator (feedback) coefficients, `a[0] == 1`.
    pub fn a(&self) -> &[f64] {
        &self.a
    }

    /// z-plane poles of a designed filter (empty for hand-built ones).
    pub fn poles(&self) -> &[Complex64] {
        &self.poles
    }

    /// Filter order (degree of the denominator).
    pub fn order(&self) -> usize {
        self.a.len().saturating_sub(1)
    }

    /// Returns true if every known pole lies strictly inside the unit circle.
    pub fn is_stable(&self) -> bool {
        self.poles.iter().all(|p| p.norm() < 1.0)
    }

    /// Complex frequency response at `freq_hz`.
    pub fn frequency_response(&self, freq_hz: f64, sample_rate: f64) -> Complex64 {
        let w = 2.0 * PI * freq_hz / sample_rate;
        let eval = |coeffs: &[f64]| {
            coeffs
                .iter()
                .enumerate()
                .map(|(k, &c)| c * Complex64::from_polar(1.0, -w * k as f64))
                .sum::<Complex64>()
        };
        eval(&self.b) / eval(&self.a)
    }

    /// Magnitude of the frequency response at `freq_hz`.
    pub fn magnitude(&self, freq_hz: f64, sample_rate: f64) -> f64 {
        self.frequency_response(freq_hz, sample_rate).norm()
    }
}

/// Designs a digital Butterworth low-pass filter.
///
/// # Arguments
///
/// * `cutoff_hz` - -3 dB cutoff frequency in Hz
/// * `sample_rate_hz` - Sample rate in Hz
/// * `order` - Filter order (number of poles)
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if the normalized cutoff
/// `cutoff_hz / (0.5 * sample_rate_hz)` is not strictly between 0 and 1,
/// or if `order` is zero.
///
/// # Examples
///
/// ```
/// use pmchain::filters::design_lowpass;
///
/// let coeffs = design_lowpass(50.0, 1000.0, 5).unwrap();
/// assert_eq!(coeffs.order(), 5);
/// assert!((coeffs.magnitude(0.0, 1000.0) - 1.0).abs() < 1e-9);
/// assert!((coeffs.magnitude(50.0, 1000.0) - 0.5_f64.sqrt()).abs() < 1e-6);
/// ```
pub fn design_lowpass(cutoff_hz: f64, sample_rate_hz: f64, order: usize) -> Result<Coefficients> {
    check_order(order)?;
    let wn = normalized_edge(cutoff_hz, sample_rate_hz)?;
    let warped = prewarp(wn);

    let (zeros, poles, gain) = lowpass_to_lowpass(&[], &prototype_poles(order), 1.0, warped);
    let coeffs = bilinear(&zeros, &poles, gain);

    debug!(cutoff_hz, sample_rate_hz, order, "designed butterworth low-pass");
    Ok(coeffs)
}

/// Designs a digital Butterworth band-pass filter.
///
/// The resulting filter has order `2 * order`.
///
/// # Arguments
///
/// * `low_hz` - Lower -3 dB edge in Hz
/// * `high_hz` - Upper -3 dB edge in Hz
/// * `sample_rate_hz` - Sample rate in Hz
/// * `order` - Order of the low-pass prototype
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if `low_hz >= high_hz`, if either
/// edge fails the Nyquist check, or if `order` is zero.
pub fn design_bandpass(
    low_hz: f64,
    high_hz: f64,
    sample_rate_hz: f64,
    order: usize,
) -> Result<Coefficients> {
    check_order(order)?;
    if !(low_hz < high_hz) {
        return Err(Error::invalid(format!(
            "band-pass low edge {low_hz} Hz must be below high edge {high_hz} Hz"
        )));
    }
    let low = prewarp(normalized_edge(low_hz, sample_rate_hz)?);
    let high = prewarp(normalized_edge(high_hz, sample_rate_hz)?);

    let centre = (low * high).sqrt();
    let bandwidth = high - low;
    let (zeros, poles, gain) =
        lowpass_to_bandpass(&[], &prototype_poles(order), 1.0, centre, bandwidth);
    let coeffs = bilinear(&zeros, &poles, gain);

    debug!(low_hz, high_hz, sample_rate_hz, order, "designed butterworth band-pass");
    Ok(coeffs)
}

fn check_order(order: usize) -> Result<()> {
    if order == 0 {
        return Err(Error::invalid("filter order must be at least 1"));
    }
    Ok(())
}

/// Cutoff as a fraction of Nyquist, validated to lie in (0, 1).
fn normalized_edge(freq_hz: f64, sample_rate_hz: f64) -> Result<f64> {
    if !(sample_rate_hz.is_finite() && sample_rate_hz > 0.0) {
        return Err(Error::invalid(format!(
            "sample rate must be positive, got {sample_rate_hz}"
        )));
    }
    let nyquist = 0.5 * sample_rate_hz;
    let wn = freq_hz / nyquist;
    if !(wn > 0.0 && wn < 1.0) {
        return Err(Error::invalid(format!(
            "cutoff {freq_hz} Hz must lie strictly between 0 and the Nyquist frequency {nyquist} Hz"
        )));
    }
    Ok(wn)
}

// Designs run at a nominal sample rate of 2, so Nyquist sits at 1.
const DESIGN_FS: f64 = 2.0;

fn prewarp(wn: f64) -> f64 {
    2.0 * DESIGN_FS * (PI * wn / DESIGN_FS).tan()
}

/// Poles of the normalized analog Butterworth prototype (cutoff 1 rad/s).
fn prototype_poles(order: usize) -> Vec<Complex64> {
    let n = order as i64;
    (0..order as i64)
        .map(|i| {
            let m = (-n + 1 + 2 * i) as f64;
            -Complex64::from_polar(1.0, PI * m / (2.0 * order as f64))
        })
        .collect()
}

type Zpk = (Vec<Complex64>, Vec<Complex64>, f64);

fn lowpass_to_lowpass(zeros: &[Complex64], poles: &[Complex64], gain: f64, wo: f64) -> Zpk {
    let degree = poles.len() - zeros.len();
    (
        zeros.iter().map(|z| z * wo).collect(),
        poles.iter().map(|p| p * wo).collect(),
        gain * wo.powi(degree as i32),
    )
}

fn lowpass_to_bandpass(
    zeros: &[Complex64],
    poles: &[Complex64],
    gain: f64,
    wo: f64,
    bw: f64,
) -> Zpk {
    let degree = poles.len() - zeros.len();
    let split = |roots: &[Complex64]| -> Vec<Complex64> {
        let scaled: Vec<Complex64> = roots.iter().map(|r| r * (bw / 2.0)).collect();
        let upper = scaled.iter().map(|r| r + (r * r - wo * wo).sqrt());
        let lower = scaled.iter().map(|r| r - (r * r - wo * wo).sqrt());
        upper.chain(lower).collect()
    };

    let mut bp_zeros = split(zeros);
    bp_zeros.extend(std::iter::repeat(Complex64::new(0.0, 0.0)).take(degree));
    (bp_zeros, split(poles), gain * bw.powi(degree as i32))
}

/// Maps an analog zpk design to the z-plane and expands it to `b` / `a`.
fn bilinear(zeros: &[Complex64], poles: &[Complex64], gain: f64) -> Coefficients {
    let fs2 = Complex64::new(2.0 * DESIGN_FS, 0.0);
    let degree = poles.len() - zeros.len();

    let mut z_zeros: Vec<Complex64> = zeros.iter().map(|z| (fs2 + z) / (fs2 - z)).collect();
    let z_poles: Vec<Complex64> = poles.iter().map(|p| (fs2 + p) / (fs2 - p)).collect();
    // Zeros at infinity land on Nyquist.
    z_zeros.extend(std::iter::repeat(Complex64::new(-1.0, 0.0)).take(degree));

    let num: Complex64 = zeros.iter().map(|z| fs2 - z).product();
    let den: Complex64 = poles.iter().map(|p| fs2 - p).product();
    let z_gain = gain * (num / den).re;

    let b = expand(&z_zeros).into_iter().map(|c| c.re * z_gain).collect();
    let a = expand(&z_poles).into_iter().map(|c| c.re).collect();
    Coefficients {
        b,
        a,
        poles: z_poles,
    }
}

/// Monic polynomial coefficients (highest power first) with the given roots.
fn expand(roots: &[Complex64]) -> Vec<Complex64> {
    let mut coeffs = vec![Complex64::new(1.0, 0.0)];
    for root in roots {
        let mut next = vec![Complex64::new(0.0, 0.0); coeffs.len() + 1];
        for (i, c) in coeffs.iter().enumerate() {
            next[i] += c;
            next[i + 1] -= c * root;
        }
        coeffs = next;
    }
    coeffs
}

#[cfg(test)]
mod tests {
    use super::*;

    const FS: f64 = 1000.0;

    #[test]
    fn test_first_order_lowpass_matches_closed_form() {
        // Quarter-rate cutoff: tan(pi/4) = 1, so b = [0.5, 0.5], a = [1, 0].
        let coeffs = design_lowpass(250.0, FS, 1).unwrap();
        assert!((coeffs.b()[0] - 0.5).abs() < 1e-12);
        assert!((coeffs.b()[1] - 0.5).abs() < 1e-12);
        assert!((coeffs.a()[0] - 1.0).abs() < 1e-12);
        assert!(coeffs.a()[1].abs() < 1e-12);
    }

    #[test]
    fn test_second_order_lowpass_matches_reference() {
        // Reference values for butter(2, 0.2).
        let coeffs = design_lowpass(100.0, FS, 2).unwrap();
        let b = [0.067_455_273_889_071_9, 0.134_910_547_778_143_8, 0.067_455_273_889_071_9];
        let a = [1.0, -1.142_980_502_539_901_3, 0.412_801_598_096_188_8];
        for (got, want) in coeffs.b().iter().zip(b.iter()) {
            assert!((got - want).abs() < 1e-12, "b: {} vs {}", got, want);
        }
        for (got, want) in coeffs.a().iter().zip(a.iter()) {
            assert!((got - want).abs() < 1e-12, "a: {} vs {}", got, want);
        }
    }

    #[test]
    fn test_lowpass_response_shape() {
        for &(cutoff, order) in &[(10.0, 5), (50.0, 5), (120.0, 3), (400.0, 4)] {
            let coeffs = design_lowpass(cutoff, FS, order).unwrap();
            assert_eq!(coeffs.order(), order);
            assert!(coeffs.is_stable());

            let dc = coeffs.magnitude(0.0, FS);
            assert!(dc >= 0.707, "DC gain {} for cutoff {}", dc, cutoff);
            assert!((dc - 1.0).abs() < 1e-6);

            let at_cutoff = coeffs.magnitude(cutoff, FS);
            assert!(
                (at_cutoff - 0.5_f64.sqrt()).abs() < 1e-6,
                "|H(fc)| = {} for cutoff {}",
                at_cutoff,
                cutoff
            );

            // Monotonic roll-off between the cutoff and Nyquist.
            let mut previous = at_cutoff;
            let steps = 50;
            for i in 1..=steps {
                let f = cutoff + (FS / 2.0 - cutoff) * i as f64 / steps as f64;
                let m = coeffs.magnitude(f, FS);
                assert!(m <= previous + 1e-12, "not monotonic at {} Hz", f);
                previous = m;
            }
        }
    }

    #[test]
    fn test_bandpass_response_shape() {
        let coeffs = design_bandpass(80.0, 120.0, FS, 3).unwrap();
        assert_eq!(coeffs.order(), 6);
        assert!(coeffs.is_stable());

        let centre = (80.0_f64 * 120.0).sqrt();
        // Pre-warping moves the digital peak slightly; search near the centre.
        let peak = (0..200)
            .map(|i| coeffs.magnitude(90.0 + i as f64 * 0.1, FS))
            .fold(0.0, f64::max);
        assert!((peak - 1.0).abs() < 1e-3, "peak gain {}", peak);
        assert!(coeffs.magnitude(centre, FS) > 0.95);

        assert!((coeffs.magnitude(80.0, FS) - 0.5_f64.sqrt()).abs() < 1e-6);
        assert!((coeffs.magnitude(120.0, FS) - 0.5_f64.sqrt()).abs() < 1e-6);
        assert!(coeffs.magnitude(0.0, FS) < 1e-9);
        assert!(coeffs.magnitude(400.0, FS) < 1e-3);
    }

    #[test]
    fn test_nyquist_violations() {
        assert!(matches!(
            design_lowpass(500.0, FS, 5),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            design_lowpass(600.0, FS, 5),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            design_lowpass(0.0, FS, 5),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            design_lowpass(-5.0, FS, 5),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            design_bandpass(100.0, 500.0, FS, 5),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            design_bandpass(0.0, 100.0, FS, 5),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_bandpass_edge_order() {
        assert!(matches!(
            design_bandpass(120.0, 80.0, FS, 5),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            design_bandpass(100.0, 100.0, FS, 5),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_zero_order_rejected() {
        assert!(design_lowpass(50.0, FS, 0).is_err());
        assert!(design_bandpass(50.0, 60.0, FS, 0).is_err());
    }

    #[test]
    fn test_manual_coefficients_normalized() {
        let coeffs = Coefficients::new(vec![2.0, 2.0], vec![2.0, -1.0]).unwrap();
        assert_eq!(coeffs.b(), &[1.0, 1.0]);
        assert_eq!(coeffs.a(), &[1.0, -0.5]);
        assert!(Coefficients::new(vec![1.0], vec![0.0, 1.0]).is_err());
        assert!(Coefficients::new(vec![], vec![1.0]).is_err());
    }
}
