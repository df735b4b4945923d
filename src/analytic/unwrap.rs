//! Phase unwrapping.

use std::f64::consts::PI;

/// Removes artificial 2π jumps from a wrapped phase sequence.
///
/// Whenever two consecutive samples differ by more than π, a multiple of
/// 2π is added to every following sample so that the step becomes the
/// equivalent step in `[-π, π]`. The first sample is left untouched. A step
/// of exactly ±π is kept as it is.
///
/// # Examples
///
/// ```
/// use pmchain::analytic::unwrap;
///
/// let wrapped = [0.0, 3.0, -3.0, -1.0];
/// let unwrapped = unwrap(&wrapped);
/// let two_pi = 2.0 * std::f64::consts::PI;
/// assert_eq!(unwrapped[1], 3.0);
/// assert!((unwrapped[2] - (two_pi - 3.0)).abs() < 1e-12);
/// assert!((unwrapped[3] - (two_pi - 1.0)).abs() < 1e-12);
/// ```
pub fn unwrap(phase: &[f64]) -> Vec<f64> {
    let mut output = Vec::with_capacity(phase.len());
    let Some(&first) = phase.first() else {
        return output;
    };
    output.push(first);

    let mut correction = 0.0;
    for pair in phase.windows(2) {
        let step = pair[1] - pair[0];
        if step.abs() >= PI {
            let mut wrapped = (step + PI).rem_euclid(2.0 * PI) - PI;
            if wrapped == -PI && step > 0.0 {
                wrapped = PI;
            }
            correction += wrapped - step;
        }
        output.push(pair[1] + correction);
    }
    output
}
