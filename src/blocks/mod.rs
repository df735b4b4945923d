//! Processing blocks and their variants.
//!
//! A [`Block`] is the node a [`Pipeline`](crate::Pipeline) stores: it owns
//! its current input and output signals and a [`BlockKind`] describing what
//! it does. Each kind wraps one of the variant structs below, all of which
//! implement [`Transform`].

mod awgn;
mod demodulator;
mod filter;
mod modulator;
mod sine;
mod transform;

pub use awgn::AwgnChannel;
pub use demodulator::PhaseDemodulator;
pub use filter::{BandPassFilter, LowPassFilter};
pub use modulator::PhaseModulator;
pub use sine::SineGenerator;
pub use transform::Transform;

use crate::Pipeline;
use crate::error::Result;
use crate::filters::FilterMode;
use crate::signals::{Signal, Timeline};
use std::sync::Arc;
use tracing::{debug, trace};

/// The closed set of block variants.
#[derive(Debug, Clone)]
pub enum BlockKind {
    Sine(SineGenerator),
    PhaseModulator(PhaseModulator),
    Awgn(AwgnChannel),
    LowPass(LowPassFilter),
    BandPass(BandPassFilter),
    PhaseDemodulator(PhaseDemodulator),
}

impl BlockKind {
    fn transform(&self) -> &dyn Transform {
        match self {
            BlockKind::Sine(t) => t,
            BlockKind::PhaseModulator(t) => t,
            BlockKind::Awgn(t) => t,
            BlockKind::LowPass(t) => t,
            BlockKind::BandPass(t) => t,
            BlockKind::PhaseDemodulator(t) => t,
        }
    }

    fn transform_mut(&mut self) -> &mut dyn Transform {
        match self {
            BlockKind::Sine(t) => t,
            BlockKind::PhaseModulator(t) => t,
            BlockKind::Awgn(t) => t,
            BlockKind::LowPass(t) => t,
            BlockKind::BandPass(t) => t,
            BlockKind::PhaseDemodulator(t) => t,
        }
    }

    /// The channel parameters, if this is an AWGN block.
    pub fn as_awgn(&self) -> Option<&AwgnChannel> {
        match self {
            BlockKind::Awgn(channel) => Some(channel),
            _ => None,
        }
    }
}

impl Transform for BlockKind {
    fn process(&mut self, input: &Signal, timeline: &Timeline) -> Signal {
        self.transform_mut().process(input, timeline)
    }

    fn label(&self) -> String {
        self.transform().label()
    }

    fn is_source(&self) -> bool {
        self.transform().is_source()
    }

    fn check(&self, timeline: &Timeline) -> Result<()> {
        self.transform().check(timeline)
    }
}

macro_rules! impl_from_variant {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for BlockKind {
                fn from(value: $ty) -> Self {
                    BlockKind::$variant(value)
                }
            }
        )*
    };
}

impl_from_variant! {
    Sine => SineGenerator,
    PhaseModulator => PhaseModulator,
    Awgn => AwgnChannel,
    LowPass => LowPassFilter,
    BandPass => BandPassFilter,
    PhaseDemodulator => PhaseDemodulator,
}

/// A processing node bound to a pipeline's timeline.
///
/// A block always holds an input and the output its transform produced
/// from that input; the two are updated together. A freshly built block
/// has processed an all-zero input once. Connecting it to a predecessor
/// copies the predecessor's output into its input and processes again.
///
/// # Examples
///
/// ```
/// use pmchain::{Block, Pipeline};
///
/// let pipeline = Pipeline::new(1.0, 100.0).unwrap();
/// let source = Block::sine(&pipeline, 5.0).unwrap();
/// let mut modulator = Block::phase_modulator(&pipeline, 20.0, 1.0, 0.5).unwrap();
///
/// modulator.connect(&source).unwrap();
/// assert_eq!(modulator.input(), source.output());
/// assert_eq!(modulator.output().len(), 100);
/// ```
#[derive(Debug, Clone)]
pub struct Block {
    name: String,
    kind: BlockKind,
    input: Signal,
    output: Signal,
    timeline: Arc<Timeline>,
}

impl Block {
    /// Builds a block for `pipeline` from any variant.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`](crate::Error::TypeMismatch) if the
    /// variant was configured for another sample rate.
    pub fn new(pipeline: &Pipeline, kind: impl Into<BlockKind>) -> Result<Self> {
        Self::on_timeline(pipeline.shared_timeline(), kind)
    }

    /// Builds a block on an explicit shared timeline.
    pub fn on_timeline(timeline: Arc<Timeline>, kind: impl Into<BlockKind>) -> Result<Self> {
        let mut kind = kind.into();
        kind.check(&timeline)?;

        let input = timeline.zeros();
        let output = kind.process(&input, &timeline);
        let name = kind.label();
        debug!(block = %name, samples = timeline.len(), "block created");
        Ok(Self {
            name,
            kind,
            input,
            output,
            timeline,
        })
    }

    /// A unit-amplitude sine source.
    pub fn sine(pipeline: &Pipeline, frequency: f64) -> Result<Self> {
        Self::new(pipeline, SineGenerator::new(frequency))
    }

    /// A phase modulator.
    pub fn phase_modulator(
        pipeline: &Pipeline,
        frequency: f64,
        amplitude: f64,
        deviation: f64,
    ) -> Result<Self> {
        Self::new(pipeline, PhaseModulator::new(frequency, amplitude, deviation))
    }

    /// An entropy-seeded AWGN channel.
    pub fn awgn(pipeline: &Pipeline, snr_db: f64) -> Result<Self> {
        Self::new(pipeline, AwgnChannel::new(snr_db))
    }

    /// An order-5 Butterworth low-pass filter.
    pub fn low_pass(pipeline: &Pipeline, cutoff_hz: f64, mode: FilterMode) -> Result<Self> {
        Self::new(
            pipeline,
            LowPassFilter::new(cutoff_hz, pipeline.sample_rate(), mode)?,
        )
    }

    /// An order-5 Butterworth band-pass filter.
    pub fn band_pass(
        pipeline: &Pipeline,
        low_hz: f64,
        high_hz: f64,
        mode: FilterMode,
    ) -> Result<Self> {
        Self::new(
            pipeline,
            BandPassFilter::new(low_hz, high_hz, pipeline.sample_rate(), mode)?,
        )
    }

    /// A phase demodulator with mean removal.
    pub fn phase_demodulator(pipeline: &Pipeline, carrier_hz: f64, deviation: f64) -> Result<Self> {
        Self::new(pipeline, PhaseDemodulator::new(carrier_hz, deviation)?)
    }

    /// The current input signal.
    pub fn input(&self) -> &Signal {
        &self.input
    }

    /// The output produced from the current input.
    pub fn output(&self) -> &Signal {
        &self.output
    }

    /// Diagnostic label.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Replaces the diagnostic label shown by [`Pipeline::list_blocks`].
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// The wrapped transform.
    pub fn kind(&self) -> &BlockKind {
        &self.kind
    }

    /// Returns true if connecting this block has no effect.
    pub fn is_source(&self) -> bool {
        self.kind.is_source()
    }

    /// The timeline the block was created on.
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub(crate) fn shared_timeline(&self) -> &Arc<Timeline> {
        &self.timeline
    }

    /// Feeds the predecessor's output into this block.
    ///
    /// Source blocks accept the call and change nothing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`](crate::Error::TypeMismatch) if the
    /// predecessor's output does not fit this block's timeline. The block is
    /// left untouched in that case.
    pub fn connect(&mut self, predecessor: &Block) -> Result<()> {
        if self.is_source() {
            trace!(block = %self.name, "source ignores connection");
            return Ok(());
        }
        debug!(from = %predecessor.name, to = %self.name, "connecting");
        self.set_input(predecessor.output.clone())
    }

    /// Replaces the input and recomputes the output.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`](crate::Error::TypeMismatch) if
    /// `input` does not fit this block's timeline.
    pub fn set_input(&mut self, input: Signal) -> Result<()> {
        self.timeline.check_compatible(&input)?;
        self.input = input;
        self.reprocess();
        Ok(())
    }

    /// Runs the transform again on the current input.
    ///
    /// Only the AWGN channel produces a different output, with a fresh noise
    /// realization.
    pub fn reprocess(&mut self) {
        self.output = self.kind.process(&self.input, &self.timeline);
        trace!(block = %self.name, energy = self.output.energy(), "processed");
    }

    /// The SNR achieved by the last pass, for AWGN blocks.
    pub fn snr(&self) -> Option<f64> {
        self.kind.as_awgn().map(AwgnChannel::snr)
    }
}
