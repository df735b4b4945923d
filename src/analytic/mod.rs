//! Analytic signal construction and phase unwrapping.
//!
//! These are the building blocks of phase demodulation: the analytic
//! signal turns a real passband waveform into a complex one whose argument
//! is the instantaneous phase, and [`unwrap`] removes the 2π wraps that
//! `atan2` introduces.

mod hilbert;
mod unwrap;

pub use hilbert::{AnalyticMethod, analytic_signal, analytic_signal_double, hilbert_transform};
pub use unwrap::unwrap;
