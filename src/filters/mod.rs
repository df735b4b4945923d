//! Digital filter design and application.
//!
//! This module contains:
//! - Butterworth low-pass and band-pass coefficient design
//! - Causal (`lfilter`) and zero-phase (`filtfilt`) application over buffers

mod apply;
mod butterworth;

pub use apply::{FilterMode, filtfilt, lfilter, lfilter_zi};
pub use butterworth::{Coefficients, DEFAULT_ORDER, design_bandpass, design_lowpass};
