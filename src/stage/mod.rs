//! The three concurrent stages of one butterfly step and the queues that
//! connect them.
//!
//! ```text
//!              data0 ─┐
//! reorder ──── data1 ─┼──▶ compute ──── out0 ─┐
//!            twiddle ─┘                 out1 ─┴──▶ writeback
//! ```
//!
//! Every stream is carried as two scalar queues, one for real parts and one
//! for imaginary parts, which are always reserved, committed, read and
//! released together so their chunks stay aligned.

pub mod compute;
pub mod reorder;
pub mod writeback;

pub use compute::ComputeStage;
pub use reorder::{ReorderMode, ReorderStage};
pub use writeback::WritebackStage;

use crate::config::PipelineConfig;
use crate::error::{PipelineError, QueueError};
use crate::queue::{BoundedStreamQueue, ReadChunk, WriteChunk};

/// A complex stream: paired real and imaginary scalar queues.
pub struct SplitQueue {
    pub re: BoundedStreamQueue<f32>,
    pub im: BoundedStreamQueue<f32>,
}

/// A reserved chunk pair for writing.
pub struct SplitWriteChunk {
    pub re: WriteChunk<f32>,
    pub im: WriteChunk<f32>,
}

impl SplitWriteChunk {
    /// Append one complex sample. Writes nothing and returns `false` if
    /// either half is full.
    #[inline]
    pub fn push(&mut self, re: f32, im: f32) -> bool {
        if self.re.is_full() || self.im.is_full() {
            return false;
        }
        self.re.push(re) & self.im.push(im)
    }

    pub fn len(&self) -> usize {
        self.re.len()
    }

    pub fn is_empty(&self) -> bool {
        self.re.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.re.is_full()
    }
}

/// A committed chunk pair for reading.
pub struct SplitReadChunk {
    pub re: ReadChunk<f32>,
    pub im: ReadChunk<f32>,
}

impl SplitReadChunk {
    /// Length shared by both halves, or `None` if they disagree.
    pub fn len(&self) -> Option<usize> {
        if self.re.len() == self.im.len() {
            Some(self.re.len())
        } else {
            None
        }
    }
}

impl SplitQueue {
    pub fn new(name_re: &'static str, name_im: &'static str, capacity: usize, chunk_size: usize) -> Self {
        Self {
            re: BoundedStreamQueue::new(name_re, capacity, chunk_size),
            im: BoundedStreamQueue::new(name_im, capacity, chunk_size),
        }
    }

    pub fn reserve(&self) -> Result<SplitWriteChunk, QueueError> {
        let re = self.re.reserve_for_write()?;
        let im = self.im.reserve_for_write()?;
        Ok(SplitWriteChunk { re, im })
    }

    pub fn commit(&self, chunk: SplitWriteChunk) -> Result<(), QueueError> {
        self.re.commit_write(chunk.re)?;
        self.im.commit_write(chunk.im)
    }

    pub fn wait(&self) -> Result<SplitReadChunk, QueueError> {
        let re = self.re.wait_for_read()?;
        let im = self.im.wait_for_read()?;
        Ok(SplitReadChunk { re, im })
    }

    pub fn release(&self, chunk: SplitReadChunk) {
        self.re.release_read(chunk.re);
        self.im.release_read(chunk.im);
    }

    pub fn close(&self) {
        self.re.close();
        self.im.close();
    }

    pub fn is_drained(&self) -> bool {
        self.re.is_drained() && self.im.is_drained()
    }
}

/// All queues of the pipeline. Built once per run and reused by every step;
/// each step must leave them drained. Buffers are sized by
/// [`PipelineConfig::allocated_chunks`] and
/// [`PipelineConfig::allocated_chunk_len`].
pub struct PipelineQueues {
    pub data0: SplitQueue,
    pub data1: SplitQueue,
    pub twiddle: SplitQueue,
    pub out0: SplitQueue,
    pub out1: SplitQueue,
}

impl PipelineQueues {
    pub fn new(config: &PipelineConfig) -> Self {
        let cap = config.allocated_chunks();
        let chunk = config.allocated_chunk_len();
        Self {
            data0: SplitQueue::new("data0_re", "data0_im", cap, chunk),
            data1: SplitQueue::new("data1_re", "data1_im", cap, chunk),
            twiddle: SplitQueue::new("twiddle_re", "twiddle_im", cap, chunk),
            out0: SplitQueue::new("out0_re", "out0_im", cap, chunk),
            out1: SplitQueue::new("out1_re", "out1_im", cap, chunk),
        }
    }

    fn all(&self) -> [&SplitQueue; 5] {
        [
            &self.data0,
            &self.data1,
            &self.twiddle,
            &self.out0,
            &self.out1,
        ]
    }

    pub fn close_all(&self) {
        for q in self.all() {
            q.close();
        }
    }

    /// Names of queues still holding chunks.
    pub fn undrained(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        for q in self.all() {
            if !q.re.is_drained() {
                names.push(q.re.name());
            }
            if !q.im.is_drained() {
                names.push(q.im.name());
            }
        }
        names
    }
}

/// Closes every queue when dropped unless disarmed, so a stage that fails or
/// panics unblocks its peers instead of leaving them waiting forever.
pub(crate) struct AbortOnDrop<'a> {
    queues: &'a PipelineQueues,
    stage: &'static str,
    armed: bool,
}

impl<'a> AbortOnDrop<'a> {
    pub(crate) fn new(queues: &'a PipelineQueues, stage: &'static str) -> Self {
        Self {
            queues,
            stage,
            armed: true,
        }
    }

    pub(crate) fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for AbortOnDrop<'_> {
    fn drop(&mut self) {
        if self.armed {
            log::warn!("{} stage aborted, closing pipeline queues", self.stage);
            self.queues.close_all();
        }
    }
}

/// Run `body` as stage `stage`, closing all queues if it fails or panics.
pub(crate) fn guarded<T>(
    queues: &PipelineQueues,
    stage: &'static str,
    body: impl FnOnce() -> Result<T, PipelineError>,
) -> Result<T, PipelineError> {
    let guard = AbortOnDrop::new(queues, stage);
    let result = body();
    if result.is_ok() {
        guard.disarm();
    }
    result
}
