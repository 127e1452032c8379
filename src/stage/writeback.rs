//! Gather `out0`/`out1` chunks back into canonical signal positions.
//!
//! Walks the step's butterfly sequence in the same order the reorder stage
//! scattered it, so the `i`-th streamed result lands on the `i`-th
//! butterfly's `d0`/`d1`.

use crate::error::{InvariantViolation, PipelineError};
use crate::indexer::StepGeometry;
use crate::num::{Complex32, SplitSignal};

use super::{PipelineQueues, SplitReadChunk};

pub struct WritebackStage<'a> {
    geometry: StepGeometry,
    chunks: usize,
    queues: &'a PipelineQueues,
}

/// The output pair currently being drained.
struct Cursor {
    out0: SplitReadChunk,
    out1: SplitReadChunk,
    len: usize,
    pos: usize,
}

impl<'a> WritebackStage<'a> {
    pub fn new(geometry: StepGeometry, chunks: usize, queues: &'a PipelineQueues) -> Self {
        Self {
            geometry,
            chunks,
            queues,
        }
    }

    fn release(&self, cursor: Cursor) {
        self.queues.out0.release(cursor.out0);
        self.queues.out1.release(cursor.out1);
    }

    /// Fill `target` with this step's results. Every position of `target` is
    /// overwritten. Returns the number of chunks consumed.
    pub fn run(self, target: &mut SplitSignal) -> Result<usize, PipelineError> {
        let step = self.geometry.step;
        let n = target.len();
        let mut consumed = 0usize;
        let mut cursor: Option<Cursor> = None;

        for idx in self.geometry.indices() {
            let violation = |detail: String| InvariantViolation::new(step, idx.spectra, idx.point, detail);

            if cursor.as_ref().map_or(true, |c| c.pos == c.len) {
                if let Some(done) = cursor.take() {
                    self.release(done);
                }
                if consumed == self.chunks {
                    return Err(violation(format!(
                        "indexer needs more than the {} chunks produced",
                        self.chunks
                    ))
                    .into());
                }
                let out0 = self.queues.out0.wait()?;
                let out1 = self.queues.out1.wait()?;
                consumed += 1;
                let len = match (out0.len(), out1.len()) {
                    (Some(a), Some(b)) if a == b => a,
                    (a, b) => {
                        return Err(violation(format!(
                            "output chunk {} lengths disagree (out0 {:?}, out1 {:?})",
                            consumed, a, b
                        ))
                        .into())
                    }
                };
                cursor = Some(Cursor {
                    out0,
                    out1,
                    len,
                    pos: 0,
                });
            }

            let Some(c) = cursor.as_mut() else {
                continue;
            };
            let x0 = Complex32::new(c.out0.re[c.pos], c.out0.im[c.pos]);
            let x1 = Complex32::new(c.out1.re[c.pos], c.out1.im[c.pos]);
            c.pos += 1;
            if !target.set(idx.d0, x0) {
                return Err(violation(format!("d0 index {} outside domain of {}", idx.d0, n)).into());
            }
            if !target.set(idx.d1, x1) {
                return Err(violation(format!("d1 index {} outside domain of {}", idx.d1, n)).into());
            }
        }

        if let Some(last) = cursor.take() {
            let leftover = last.len - last.pos;
            self.release(last);
            if leftover != 0 {
                return Err(InvariantViolation::new(
                    step,
                    0,
                    0,
                    format!("{} streamed results left after the last butterfly", leftover),
                )
                .into());
            }
        }
        if consumed != self.chunks {
            return Err(InvariantViolation::new(
                step,
                0,
                0,
                format!("consumed {} of {} output chunks", consumed, self.chunks),
            )
            .into());
        }
        log::trace!("writeback: step {} gathered {} chunks", step, consumed);
        Ok(consumed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Direction, PipelineConfig};
    use crate::indexer::num_steps;
    use crate::stage::SplitQueue;

    fn push(queue: &SplitQueue, re: &[f32]) {
        let mut w = queue.reserve().unwrap();
        for &r in re {
            assert!(w.push(r, -r));
        }
        queue.commit(w).unwrap();
    }

    #[test]
    fn gathers_in_indexer_order() {
        let n = 8;
        let cfg = PipelineConfig::with_chunk_size(n, Direction::Forward, 3);
        let queues = PipelineQueues::new(&cfg);
        // step 1 of 8 visits (d0,d1) = (0,2) (4,6) (1,3) (5,7)
        push(&queues.out0, &[0.0, 4.0, 1.0]);
        push(&queues.out0, &[5.0]);
        push(&queues.out1, &[2.0, 6.0, 3.0]);
        push(&queues.out1, &[7.0]);
        let mut target = SplitSignal::zeros(n);
        let geometry = StepGeometry::new(1, num_steps(n), n);
        let used = WritebackStage::new(geometry, 2, &queues)
            .run(&mut target)
            .unwrap();
        assert_eq!(used, 2);
        let expected: Vec<f32> = (0..n).map(|i| i as f32).collect();
        assert_eq!(target.re(), &expected[..]);
        assert_eq!(target.im()[3], -3.0);
        assert!(queues.undrained().is_empty());
    }

    #[test]
    fn too_few_chunks_fail_fast() {
        let n = 4;
        let cfg = PipelineConfig::with_chunk_size(n, Direction::Forward, 1);
        let queues = PipelineQueues::new(&cfg);
        push(&queues.out0, &[1.0]);
        push(&queues.out1, &[1.0]);
        let mut target = SplitSignal::zeros(n);
        let geometry = StepGeometry::new(0, num_steps(n), n);
        let err = WritebackStage::new(geometry, 1, &queues)
            .run(&mut target)
            .unwrap_err();
        assert!(matches!(err, PipelineError::Invariant(_)));
    }
}
