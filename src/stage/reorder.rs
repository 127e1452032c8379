//! Scatter a step's logical signal into the `data0`, `data1` and `twiddle`
//! chunk streams.

use crate::bitrev::permute_in_place;
use crate::config::Direction;
use crate::error::{InvariantViolation, PipelineError};
use crate::indexer::{ButterflyIndex, StepGeometry};
use crate::num::SplitSignal;
use crate::twiddle::TwiddleTable;

use super::{PipelineQueues, SplitQueue, SplitWriteChunk};

/// How the stage obtains its input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReorderMode {
    /// Step 0: the signal arrives in natural order from the caller. It is
    /// bit-reversed, and conjugated for [`Direction::Backward`], before
    /// scattering.
    Initial(Direction),
    /// Later steps: the signal is the previous step's reassembled output.
    Recurring,
}

impl ReorderMode {
    pub fn for_step(step: u32, direction: Direction) -> Self {
        if step == 0 {
            ReorderMode::Initial(direction)
        } else {
            ReorderMode::Recurring
        }
    }
}

pub struct ReorderStage<'a> {
    geometry: StepGeometry,
    mode: ReorderMode,
    twiddles: &'a TwiddleTable,
    queues: &'a PipelineQueues,
}

/// One in-progress chunk per output stream. Chunks are reserved lazily so a
/// step whose population ends on a chunk boundary commits no empty tail.
struct ScatterCursor<'q> {
    queue: &'q SplitQueue,
    step: u32,
    chunk: Option<SplitWriteChunk>,
    committed: usize,
}

impl<'q> ScatterCursor<'q> {
    fn new(queue: &'q SplitQueue, step: u32) -> Self {
        Self {
            queue,
            step,
            chunk: None,
            committed: 0,
        }
    }

    fn push(&mut self, idx: &ButterflyIndex, re: f32, im: f32) -> Result<(), PipelineError> {
        if self.chunk.is_none() {
            self.chunk = Some(self.queue.reserve()?);
        }
        let full = match self.chunk.as_mut() {
            Some(chunk) => {
                if !chunk.push(re, im) {
                    return Err(InvariantViolation::new(
                        self.step,
                        idx.spectra,
                        idx.point,
                        format!(
                            "{} chunk rejected a sample after {} of {}",
                            self.queue.re.name(),
                            chunk.len(),
                            self.queue.re.chunk_size()
                        ),
                    )
                    .into());
                }
                chunk.is_full()
            }
            None => false,
        };
        if full {
            if let Some(full) = self.chunk.take() {
                self.queue.commit(full)?;
                self.committed += 1;
            }
        }
        Ok(())
    }

    fn finish(mut self) -> Result<usize, PipelineError> {
        if let Some(tail) = self.chunk.take() {
            if !tail.is_empty() {
                self.queue.commit(tail)?;
                self.committed += 1;
            }
        }
        Ok(self.committed)
    }
}

impl<'a> ReorderStage<'a> {
    pub fn new(
        geometry: StepGeometry,
        mode: ReorderMode,
        twiddles: &'a TwiddleTable,
        queues: &'a PipelineQueues,
    ) -> Self {
        Self {
            geometry,
            mode,
            twiddles,
            queues,
        }
    }

    /// Scatter `signal` into the queues. In initial mode the signal is
    /// permuted (and possibly conjugated) in place first.
    ///
    /// Returns the number of chunks committed per stream.
    pub fn run(self, signal: &mut SplitSignal) -> Result<usize, PipelineError> {
        let step = self.geometry.step;
        if let ReorderMode::Initial(direction) = self.mode {
            let (re, im) = signal.as_mut_slices();
            permute_in_place(re, im);
            if direction == Direction::Backward {
                for v in im.iter_mut() {
                    *v = -*v;
                }
            }
            log::trace!("reorder: bit-reversed {} samples ({})", re.len(), direction);
        }

        let n = signal.len();
        let mut data0 = ScatterCursor::new(&self.queues.data0, step);
        let mut data1 = ScatterCursor::new(&self.queues.data1, step);
        let mut twiddle = ScatterCursor::new(&self.queues.twiddle, step);

        for idx in self.geometry.indices() {
            let a = signal.get(idx.d0).ok_or_else(|| {
                InvariantViolation::new(
                    step,
                    idx.spectra,
                    idx.point,
                    format!("d0 index {} outside domain of {}", idx.d0, n),
                )
            })?;
            let b = signal.get(idx.d1).ok_or_else(|| {
                InvariantViolation::new(
                    step,
                    idx.spectra,
                    idx.point,
                    format!("d1 index {} outside domain of {}", idx.d1, n),
                )
            })?;
            let w = self.twiddles.get(idx.twiddle).ok_or_else(|| {
                InvariantViolation::new(
                    step,
                    idx.spectra,
                    idx.point,
                    format!(
                        "twiddle index {} outside table of {}",
                        idx.twiddle,
                        self.twiddles.len()
                    ),
                )
            })?;
            data0.push(&idx, a.re, a.im)?;
            data1.push(&idx, b.re, b.im)?;
            twiddle.push(&idx, w.re, w.im)?;
        }

        let chunks = data0.finish()?;
        data1.finish()?;
        twiddle.finish()?;
        log::trace!("reorder: step {} scattered {} chunks per stream", step, chunks);
        Ok(chunks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use crate::indexer::num_steps;
    use crate::num::Complex32;

    fn config(n: usize, chunk: usize) -> PipelineConfig {
        PipelineConfig::with_chunk_size(n, Direction::Forward, chunk)
    }

    fn drain(q: &SplitQueue) -> (Vec<Vec<f32>>, Vec<Vec<f32>>) {
        let mut re = Vec::new();
        let mut im = Vec::new();
        while q.re.pending() > 0 {
            let c = q.wait().unwrap();
            re.push(c.re.to_vec());
            im.push(c.im.to_vec());
            q.release(c);
        }
        (re, im)
    }

    #[test]
    fn initial_mode_bit_reverses_and_scatters() {
        let n = 8;
        let cfg = config(n, 2);
        let queues = PipelineQueues::new(&cfg);
        let tw = TwiddleTable::build(n).unwrap();
        let re: Vec<f32> = (0..n).map(|i| i as f32).collect();
        let mut signal = SplitSignal::new(re, vec![0.0; n]).unwrap();
        let geometry = StepGeometry::new(0, num_steps(n), n);
        let chunks = ReorderStage::new(geometry, ReorderMode::Initial(Direction::Forward), &tw, &queues)
            .run(&mut signal)
            .unwrap();
        assert_eq!(chunks, 2);
        // bit-reversed order is [0,4,2,6,1,5,3,7]; step 0 pairs neighbours
        assert_eq!(drain(&queues.data0).0, vec![vec![0.0, 2.0], vec![1.0, 3.0]]);
        assert_eq!(drain(&queues.data1).0, vec![vec![4.0, 6.0], vec![5.0, 7.0]]);
        let (tw_re, _) = drain(&queues.twiddle);
        assert!(tw_re.iter().flatten().all(|&v| v == 1.0));
    }

    #[test]
    fn backward_negates_imaginary_only_on_initial_step() {
        let n = 4;
        let cfg = config(n, 2);
        let queues = PipelineQueues::new(&cfg);
        let tw = TwiddleTable::build(n).unwrap();
        let mut signal = SplitSignal::new(vec![0.0; n], vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let geometry = StepGeometry::new(0, num_steps(n), n);
        ReorderStage::new(geometry, ReorderMode::Initial(Direction::Backward), &tw, &queues)
            .run(&mut signal)
            .unwrap();
        assert_eq!(drain(&queues.data0).1, vec![vec![-1.0, -2.0]]);

        let geometry = StepGeometry::new(1, num_steps(n), n);
        ReorderStage::new(geometry, ReorderMode::Recurring, &tw, &queues)
            .run(&mut signal)
            .unwrap();
        // signal already holds the conjugated, permuted samples
        assert_eq!(drain(&queues.data0).1, vec![vec![-1.0, -3.0]]);
    }

    #[test]
    fn partial_tail_chunk_is_committed() {
        let n = 16;
        let cfg = config(n, 3);
        let queues = PipelineQueues::new(&cfg);
        let tw = TwiddleTable::build(n).unwrap();
        let mut signal = SplitSignal::zeros(n);
        signal.set(0, Complex32::new(1.0, 0.0));
        let geometry = StepGeometry::new(2, num_steps(n), n);
        let chunks = ReorderStage::new(geometry, ReorderMode::Recurring, &tw, &queues)
            .run(&mut signal)
            .unwrap();
        assert_eq!(chunks, 3);
        let lens: Vec<usize> = drain(&queues.data1).0.iter().map(|c| c.len()).collect();
        assert_eq!(lens, vec![3, 3, 2]);
        assert_eq!(queues.undrained().len(), 4);
    }

    #[test]
    fn mismatched_signal_is_an_invariant_violation() {
        let n = 8;
        let cfg = config(n, 4);
        let queues = PipelineQueues::new(&cfg);
        let tw = TwiddleTable::build(n).unwrap();
        let mut short = SplitSignal::zeros(4);
        let geometry = StepGeometry::new(2, num_steps(n), n);
        let err = ReorderStage::new(geometry, ReorderMode::Recurring, &tw, &queues)
            .run(&mut short)
            .unwrap_err();
        match err {
            PipelineError::Invariant(v) => {
                assert_eq!(v.step, 2);
                assert!(v.detail.contains("d1 index 4"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn misaligned_stream_halves_fail_the_scatter() {
        use crate::queue::BoundedStreamQueue;
        let queue = SplitQueue {
            re: BoundedStreamQueue::new("data0_re", 1, 2),
            im: BoundedStreamQueue::new("data0_im", 1, 1),
        };
        let idx = ButterflyIndex {
            spectra: 0,
            point: 2,
            d0: 1,
            d1: 3,
            twiddle: 0,
        };
        let mut cursor = ScatterCursor::new(&queue, 0);
        cursor.push(&idx, 1.0, 1.0).unwrap();
        let err = cursor.push(&idx, 2.0, 2.0).unwrap_err();
        let v = match err {
            PipelineError::Invariant(v) => v,
            other => panic!("unexpected error {:?}", other),
        };
        assert_eq!((v.step, v.spectra, v.point), (0, 0, 2));
        assert_eq!(v.detail, "data0_re chunk rejected a sample after 1 of 2");
    }
}
