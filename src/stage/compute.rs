//! Element-wise butterflies over streamed `(data0, data1, twiddle)` chunks.
//!
//! Direction-agnostic: conjugation happens on ingest in the reorder stage.

use crate::butterfly::{butterfly_run, ButterflyInputs, ButterflyOutputs};
use crate::error::{InvariantViolation, PipelineError};
use crate::indexer::StepGeometry;

use super::PipelineQueues;

pub struct ComputeStage<'a> {
    geometry: StepGeometry,
    chunks: usize,
    chunk_size: usize,
    queues: &'a PipelineQueues,
}

impl<'a> ComputeStage<'a> {
    /// `chunks` is the number of chunks the reorder stage commits per stream
    /// in this step.
    pub fn new(
        geometry: StepGeometry,
        chunks: usize,
        chunk_size: usize,
        queues: &'a PipelineQueues,
    ) -> Self {
        Self {
            geometry,
            chunks,
            chunk_size,
            queues,
        }
    }

    /// Consume `chunks` input triples and emit the same number of output
    /// pairs. Returns the number of butterflies computed.
    pub fn run(self) -> Result<usize, PipelineError> {
        let q = self.queues;
        let mut computed = 0usize;
        for chunk_index in 0..self.chunks {
            let d0 = q.data0.wait()?;
            let d1 = q.data1.wait()?;
            let tw = q.twiddle.wait()?;

            let inputs = ButterflyInputs {
                d0_re: &d0.re,
                d0_im: &d0.im,
                d1_re: &d1.re,
                d1_im: &d1.im,
                tw_re: &tw.re,
                tw_im: &tw.im,
            };
            let len = inputs.len().ok_or_else(|| {
                let offset = chunk_index * self.chunk_size;
                // first butterfly carried by the chunk
                let (spectra, point) = self
                    .geometry
                    .indices()
                    .nth(offset)
                    .map_or((0, 0), |idx| (idx.spectra, idx.point));
                InvariantViolation::new(
                    self.geometry.step,
                    spectra,
                    point,
                    format!(
                        "chunk {} at stream offset {}: streams disagree in length (data0 {:?}, data1 {:?}, twiddle {:?})",
                        chunk_index,
                        offset,
                        d0.len(),
                        d1.len(),
                        tw.len()
                    ),
                )
            })?;

            let mut out0 = q.out0.reserve()?;
            let mut out1 = q.out1.reserve()?;
            let mut outputs = ButterflyOutputs {
                out0_re: out0.re.fill(len),
                out0_im: out0.im.fill(len),
                out1_re: out1.re.fill(len),
                out1_im: out1.im.fill(len),
            };
            computed += butterfly_run(&inputs, &mut outputs);

            q.out0.commit(out0)?;
            q.out1.commit(out1)?;
            q.data0.release(d0);
            q.data1.release(d1);
            q.twiddle.release(tw);
            log::trace!(
                "compute: step {} chunk {} ({} butterflies)",
                self.geometry.step,
                chunk_index,
                len
            );
        }
        Ok(computed)
    }
}
