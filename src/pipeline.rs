//! Ordered chains of blocks sharing one timeline.

use crate::blocks::Block;
use crate::error::{Error, Result};
use crate::signals::Timeline;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Index and name of a block, as reported by [`Pipeline::list_blocks`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockInfo {
    pub index: usize,
    pub name: String,
}

/// A simulated communication chain.
///
/// The pipeline owns the timeline every block is built on and the blocks
/// themselves, in signal-flow order. Adding blocks does not wire them up;
/// [`Pipeline::connect_blocks`] feeds each block's output into the next
/// one, front to back.
///
/// # Examples
///
/// ```
/// use pmchain::{Block, FilterMode, Pipeline};
///
/// let mut pipeline = Pipeline::new(2.0, 1000.0).unwrap();
/// let blocks = vec![
///     Block::sine(&pipeline, 5.0).unwrap(),
///     Block::phase_modulator(&pipeline, 100.0, 1.0, 0.5).unwrap(),
///     Block::band_pass(&pipeline, 80.0, 120.0, FilterMode::ZeroPhase).unwrap(),
///     Block::phase_demodulator(&pipeline, 100.0, 0.5).unwrap(),
/// ];
/// pipeline.extend(blocks).unwrap();
/// pipeline.connect_blocks().unwrap();
///
/// assert_eq!(pipeline.len(), 4);
/// assert_eq!(pipeline.output_block().unwrap().output().len(), 2000);
/// ```
#[derive(Debug, Clone)]
pub struct Pipeline {
    timeline: Arc<Timeline>,
    blocks: Vec<Block>,
}

impl Pipeline {
    /// Creates an empty pipeline.
    ///
    /// # Arguments
    ///
    /// * `duration` - Simulated time in seconds
    /// * `sample_rate` - Sample rate in Hz
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if either value is not positive or
    /// `duration` is shorter than one sample period.
    pub fn new(duration: f64, sample_rate: f64) -> Result<Self> {
        let timeline = Timeline::new(duration, sample_rate)?;
        info!(
            duration,
            sample_rate,
            samples = timeline.len(),
            "pipeline created"
        );
        Ok(Self {
            timeline: Arc::new(timeline),
            blocks: Vec::new(),
        })
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// A handle to the timeline, for building blocks.
    pub fn shared_timeline(&self) -> Arc<Timeline> {
        Arc::clone(&self.timeline)
    }

    pub fn duration(&self) -> f64 {
        self.timeline.duration()
    }

    pub fn sample_rate(&self) -> f64 {
        self.timeline.sample_rate()
    }

    fn accept(&self, block: &Block) -> Result<()> {
        let theirs = block.shared_timeline();
        if Arc::ptr_eq(theirs, &self.timeline) || **theirs == *self.timeline {
            return Ok(());
        }
        Err(Error::mismatch(format!(
            "block '{}' was built for {} samples at {} Hz, pipeline has {} samples at {} Hz",
            block.name(),
            theirs.len(),
            theirs.sample_rate(),
            self.timeline.len(),
            self.timeline.sample_rate()
        )))
    }

    /// Appends a block and returns its index.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if the block was built for a
    /// different timeline.
    pub fn add_block(&mut self, block: Block) -> Result<usize> {
        self.accept(&block)?;
        let index = self.blocks.len();
        debug!(index, block = block.name(), "block added");
        self.blocks.push(block);
        Ok(index)
    }

    /// Inserts a block at `position`, shifting later blocks back.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoSuchBlock`] if `position > len()` and
    /// [`Error::TypeMismatch`] as for [`Pipeline::add_block`].
    pub fn insert_block(&mut self, position: usize, block: Block) -> Result<()> {
        if position > self.blocks.len() {
            return Err(Error::NoSuchBlock {
                index: position,
                len: self.blocks.len(),
            });
        }
        self.accept(&block)?;
        debug!(index = position, block = block.name(), "block inserted");
        self.blocks.insert(position, block);
        Ok(())
    }

    /// Appends several blocks in order.
    ///
    /// Stops at the first rejected block; blocks before it stay added.
    pub fn extend(&mut self, blocks: impl IntoIterator<Item = Block>) -> Result<()> {
        for block in blocks {
            self.add_block(block)?;
        }
        Ok(())
    }

    /// Connects every block to its predecessor, front to back.
    ///
    /// Each block is reprocessed exactly once, after its predecessor.
    pub fn connect_blocks(&mut self) -> Result<()> {
        for i in 1..self.blocks.len() {
            let (done, rest) = self.blocks.split_at_mut(i);
            let previous = &done[i - 1];
            let current = &mut rest[0];
            debug!(
                "{} {} - {} {}",
                i - 1,
                previous.name(),
                i,
                current.name()
            );
            current.connect(previous)?;
        }
        info!(blocks = self.blocks.len(), "pipeline connected");
        Ok(())
    }

    /// Index and name of every block.
    pub fn list_blocks(&self) -> Vec<BlockInfo> {
        self.blocks
            .iter()
            .enumerate()
            .map(|(index, block)| BlockInfo {
                index,
                name: block.name().to_string(),
            })
            .collect()
    }

    /// # Errors
    ///
    /// Returns [`Error::NoSuchBlock`] if `index` is out of range.
    pub fn get_block(&self, index: usize) -> Result<&Block> {
        let len = self.blocks.len();
        self.blocks.get(index).ok_or(Error::NoSuchBlock { index, len })
    }

    /// # Errors
    ///
    /// Returns [`Error::NoSuchBlock`] if `index` is out of range.
    pub fn get_block_mut(&mut self, index: usize) -> Result<&mut Block> {
        let len = self.blocks.len();
        self.blocks
            .get_mut(index)
            .ok_or(Error::NoSuchBlock { index, len })
    }

    /// The first block, if any.
    pub fn input_block(&self) -> Option<&Block> {
        self.blocks.first()
    }

    /// The last block, if any.
    pub fn output_block(&self) -> Option<&Block> {
        self.blocks.last()
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Block> {
        self.blocks.iter()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

impl<'a> IntoIterator for &'a Pipeline {
    type Item = &'a Block;
    type IntoIter = std::slice::Iter<'a, Block>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.iter()
    }
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total blocks: {}", self.blocks.len())?;
        for info in self.list_blocks() {
            writeln!(f, "{:2}: {}", info.index, info.name)?;
        }
        Ok(())
    }
}
