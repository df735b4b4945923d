//! pmchain - A phase-modulation communication chain simulator
//!
//! This library builds a pipeline of signal-processing blocks (a sine
//! source, a phase modulator, an AWGN channel, Butterworth filters and a
//! phase demodulator) on a shared timeline and runs whole sampled buffers
//! through it, front to back.
//!
//! ```
//! use pmchain::{Block, FilterMode, Pipeline};
//!
//! let mut pipeline = Pipeline::new(2.0, 1000.0)?;
//! let chain = vec![
//!     Block::sine(&pipeline, 50.0)?,
//!     Block::phase_modulator(&pipeline, 100.0, 1.0, 0.5)?,
//!     Block::awgn(&pipeline, 30.0)?,
//!     Block::low_pass(&pipeline, 50.0, FilterMode::ZeroPhase)?,
//!     Block::phase_demodulator(&pipeline, 100.0, 0.5)?,
//! ];
//! pipeline.extend(chain)?;
//! pipeline.connect_blocks()?;
//!
//! let snr = pipeline.get_block(2)?.snr().unwrap_or_default();
//! assert!((snr - 30.0).abs() < 3.0);
//! # Ok::<(), pmchain::Error>(())
//! ```

pub mod analytic;
pub mod blocks;
#[cfg(feature = "config")]
pub mod config;
mod error;
pub mod filters;
pub mod noise;
mod pipeline;
pub mod signals;

// Re-export commonly used types at the crate root
pub use blocks::{Block, BlockKind, Transform};
pub use error::{Error, Result};
pub use filters::{Coefficients, FilterMode, design_bandpass, design_lowpass};
pub use pipeline::{BlockInfo, Pipeline};
pub use signals::{Signal, Spectrum, Timeline};
