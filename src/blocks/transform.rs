//! The processing contract every block variant implements.

use crate::error::Result;
use crate::signals::{Signal, Timeline};

/// A whole-buffer signal transformation bound to a timeline.
///
/// Every variant of [`BlockKind`](super::BlockKind) implements this trait.
/// Apart from the noise channel, which draws fresh noise on each call,
/// `process` is a pure function of the input, the parameters and the
/// timeline.
pub trait Transform {
    /// Maps `input` to a new output signal sampled on `timeline`.
    ///
    /// # Arguments
    ///
    /// * `input` - The current input, always compatible with `timeline`
    /// * `timeline` - The sample instants of the owning pipeline
    fn process(&mut self, input: &Signal, timeline: &Timeline) -> Signal;

    /// Default diagnostic label for blocks built from this transform.
    fn label(&self) -> String;

    /// Returns true if the output never depends on the input.
    fn is_source(&self) -> bool {
        false
    }

    /// Checks that the transform was configured for `timeline`.
    ///
    /// Transforms that precompute anything from the sample rate override
    /// this. The default accepts every timeline.
    fn check(&self, _timeline: &Timeline) -> Result<()> {
        Ok(())
    }
}
