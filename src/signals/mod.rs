//! Signal representation and its derived views.
//!
//! This module provides:
//! - `Signal`, the immutable sampled waveform passed between blocks
//! - `Spectrum`, the normalized, zero-centred frequency-domain view
//! - `Timeline`, the sample-instant axis shared by a pipeline's blocks

mod signal;
pub mod spectrum;
mod timeline;

pub use signal::Signal;
pub use spectrum::Spectrum;
pub use timeline::Timeline;
