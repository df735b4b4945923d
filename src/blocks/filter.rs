//! Butterworth filter blocks.

use super::Transform;
use crate::error::{Error, Result};
use crate::filters::{Coefficients, DEFAULT_ORDER, FilterMode, design_bandpass, design_lowpass};
use crate::signals::{Signal, Timeline};

fn check_rate(designed_for: f64, timeline: &Timeline) -> Result<()> {
    if designed_for != timeline.sample_rate() {
        return Err(Error::mismatch(format!(
            "filter designed for {} Hz, timeline sampled at {} Hz",
            designed_for,
            timeline.sample_rate()
        )));
    }
    Ok(())
}

/// Butterworth low-pass filter block.
///
/// Coefficients are designed once, at construction, so cutoff and order
/// errors surface immediately.
///
/// # Examples
///
/// ```
/// use pmchain::blocks::{LowPassFilter, Transform};
/// use pmchain::filters::FilterMode;
///
/// let lp = LowPassFilter::new(50.0, 1000.0, FilterMode::ZeroPhase).unwrap();
/// assert_eq!(lp.label(), "Low-Pass Filter (0 - 50 Hz)");
/// assert!(LowPassFilter::new(600.0, 1000.0, FilterMode::Causal).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LowPassFilter {
    cutoff_hz: f64,
    sample_rate: f64,
    order: usize,
    mode: FilterMode,
    coefficients: Coefficients,
}

impl LowPassFilter {
    /// Designs an order-5 low-pass filter.
    ///
    /// # Arguments
    ///
    /// * `cutoff_hz` - -3 dB frequency in Hz
    /// * `sample_rate` - Sample rate of the pipeline the block will join
    /// * `mode` - Causal or zero-phase application
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the cutoff is not strictly
    /// between 0 and the Nyquist frequency.
    pub fn new(cutoff_hz: f64, sample_rate: f64, mode: FilterMode) -> Result<Self> {
        let coefficients = design_lowpass(cutoff_hz, sample_rate, DEFAULT_ORDER)?;
        Ok(Self {
            cutoff_hz,
            sample_rate,
            order: DEFAULT_ORDER,
            mode,
            coefficients,
        })
    }

    /// Re-designs the filter with another order.
    pub fn with_order(mut self, order: usize) -> Result<Self> {
        self.coefficients = design_lowpass(self.cutoff_hz, self.sample_rate, order)?;
        self.order = order;
        Ok(self)
    }

    /// The -3 dB cutoff in Hz.
    pub fn cutoff_hz(&self) -> f64 {
        self.cutoff_hz
    }

    /// Butterworth order of the design.
    pub fn order(&self) -> usize {
        self.order
    }

    /// How the coefficients are run over the input.
    pub fn mode(&self) -> FilterMode {
        self.mode
    }

    /// The designed transfer function.
    pub fn coefficients(&self) -> &Coefficients {
        &self.coefficients
    }
}

impl Transform for LowPassFilter {
    fn process(&mut self, input: &Signal, timeline: &Timeline) -> Signal {
        timeline.signal(self.mode.apply(&self.coefficients, input.samples()))
    }

    fn label(&self) -> String {
        format!("Low-Pass Filter (0 - {} Hz)", self.cutoff_hz)
    }

    fn check(&self, timeline: &Timeline) -> Result<()> {
        check_rate(self.sample_rate, timeline)
    }
}

/// Butterworth band-pass filter block.
///
/// The order applies to the low-pass prototype, so the designed filter has
/// twice as many poles.
#[derive(Debug, Clone, PartialEq)]
pub struct BandPassFilter {
    low_hz: f64,
    high_hz: f64,
    sample_rate: f64,
    order: usize,
    mode: FilterMode,
    coefficients: Coefficients,
}

impl BandPassFilter {
    /// Designs an order-5 band-pass filter.
    ///
    /// # Arguments
    ///
    /// * `low_hz` - Lower -3 dB edge in Hz
    /// * `high_hz` - Upper -3 dB edge in Hz
    /// * `sample_rate` - Sample rate of the pipeline the block will join
    /// * `mode` - Causal or zero-phase application
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `low_hz >= high_hz` or either
    /// edge falls outside `(0, sample_rate / 2)`.
    pub fn new(low_hz: f64, high_hz: f64, sample_rate: f64, mode: FilterMode) -> Result<Self> {
        let coefficients = design_bandpass(low_hz, high_hz, sample_rate, DEFAULT_ORDER)?;
        Ok(Self {
            low_hz,
            high_hz,
            sample_rate,
            order: DEFAULT_ORDER,
            mode,
            coefficients,
        })
    }

    /// Re-designs the filter with another prototype order.
    pub fn with_order(mut self, order: usize) -> Result<Self> {
        self.coefficients = design_bandpass(self.low_hz, self.high_hz, self.sample_rate, order)?;
        self.order = order;
        Ok(self)
    }

    /// The band edges in Hz, low first.
    pub fn band(&self) -> (f64, f64) {
        (self.low_hz, self.high_hz)
    }

    /// Butterworth order of the design.
    pub fn order(&self) -> usize {
        self.order
    }

    /// How the coefficients are run over the input.
    pub fn mode(&self) -> FilterMode {
        self.mode
    }

    /// The designed transfer function.
    pub fn coefficients(&self) -> &Coefficients {
        &self.coefficients
    }
}

impl Transform for BandPassFilter {
    fn process(&mut self, input: &Signal, timeline: &Timeline) -> Signal {
        timeline.signal(self.mode.apply(&self.coefficients, input.samples()))
    }

    fn label(&self) -> String {
        format!("Band-Pass Filter ({} - {} Hz)", self.low_hz, self.high_hz)
    }

    fn check(&self, timeline: &Timeline) -> Result<()> {
        check_rate(self.sample_rate, timeline)
    }
}
