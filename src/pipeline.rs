//! Step-by-step orchestration of the streaming transform.
//!
//! A run walks `INIT → STEP(0) → … → STEP(num_steps) → DONE`. Each step
//! spawns the reorder, compute and writeback stages on scoped threads and
//! joins all three before the next step starts, so no step ever observes
//! another step's partial output.
//!
//! Two full-size buffers alternate by step parity: step `k` reorders from
//! one and writes back into the other, then the roles swap.

use core::fmt;
use std::sync::Arc;
use std::thread;

use crate::config::{Direction, PipelineConfig};
use crate::error::{BlockId, ConfigError, InvariantViolation, PipelineError};
use crate::indexer::{num_steps, StepGeometry};
use crate::num::SplitSignal;
use crate::stage::{guarded, ComputeStage, PipelineQueues, ReorderMode, ReorderStage, WritebackStage};
use crate::storage::BlockStore;
use crate::twiddle::TwiddleTable;

/// Orchestrator state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineState {
    Init,
    Step(u32),
    Done,
}

impl PipelineState {
    /// Successor of `self` in a run of `num_steps + 1` steps.
    pub fn next(self, num_steps: u32) -> Option<Self> {
        match self {
            PipelineState::Init => Some(PipelineState::Step(0)),
            PipelineState::Step(k) if k < num_steps => Some(PipelineState::Step(k + 1)),
            PipelineState::Step(_) => Some(PipelineState::Done),
            PipelineState::Done => None,
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineState::Init => write!(f, "INIT"),
            PipelineState::Step(k) => write!(f, "STEP({})", k),
            PipelineState::Done => write!(f, "DONE"),
        }
    }
}

/// A validated, reusable streaming FFT for one domain size and direction.
///
/// Each call to [`process`](Self::process) is an independent run with its own
/// queues and buffers; a `StreamingFft` can be shared across threads.
#[derive(Clone, Debug)]
pub struct StreamingFft {
    config: PipelineConfig,
    twiddles: Arc<TwiddleTable>,
    num_steps: u32,
}

impl StreamingFft {
    /// Validate `config` and build its twiddle table.
    pub fn new(config: PipelineConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        let twiddles = TwiddleTable::build(config.domain_size)?;
        Ok(Self::assemble(config, Arc::new(twiddles)))
    }

    /// Like [`new`](Self::new) but reuses an existing twiddle table.
    pub fn with_twiddles(
        config: PipelineConfig,
        twiddles: Arc<TwiddleTable>,
    ) -> Result<Self, PipelineError> {
        config.validate()?;
        if twiddles.domain_size() != config.domain_size {
            return Err(ConfigError::LengthMismatch {
                expected: config.domain_size,
                actual: twiddles.domain_size(),
            }
            .into());
        }
        Ok(Self::assemble(config, twiddles))
    }

    fn assemble(config: PipelineConfig, twiddles: Arc<TwiddleTable>) -> Self {
        Self {
            num_steps: num_steps(config.domain_size),
            config,
            twiddles,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn direction(&self) -> Direction {
        self.config.direction
    }

    pub fn domain_size(&self) -> usize {
        self.config.domain_size
    }

    /// Index of the last step; a run performs `num_steps + 1` steps.
    pub fn num_steps(&self) -> u32 {
        self.num_steps
    }

    pub fn twiddles(&self) -> &Arc<TwiddleTable> {
        &self.twiddles
    }

    /// Every state a run passes through, in order.
    pub fn states(&self) -> impl Iterator<Item = PipelineState> {
        let last = self.num_steps;
        core::iter::successors(Some(PipelineState::Init), move |s| s.next(last))
    }

    /// Transform `signal` (natural order) and return the result.
    ///
    /// # Errors
    /// [`ConfigError::LengthMismatch`] if the signal does not have
    /// `domain_size` samples; [`PipelineError::Invariant`] on an internal
    /// defect. No partial result is returned.
    pub fn process(&self, signal: SplitSignal) -> Result<SplitSignal, PipelineError> {
        let n = self.config.domain_size;
        if signal.len() != n {
            return Err(ConfigError::LengthMismatch {
                expected: n,
                actual: signal.len(),
            }
            .into());
        }

        let mut current = signal;
        let mut spare = SplitSignal::zeros(n);
        let queues = PipelineQueues::new(&self.config);

        for state in self.states() {
            log::debug!("{}-point {} transform: {}", n, self.config.direction, state);
            if let PipelineState::Step(step) = state {
                self.run_step(step, &queues, &mut current, &mut spare)?;
                core::mem::swap(&mut current, &mut spare);
            }
        }
        Ok(current)
    }

    /// In-place convenience over planar slices.
    pub fn process_split(&self, re: &mut [f32], im: &mut [f32]) -> Result<(), PipelineError> {
        let n = self.config.domain_size;
        for len in [re.len(), im.len()] {
            if len != n {
                return Err(ConfigError::LengthMismatch {
                    expected: n,
                    actual: len,
                }
                .into());
            }
        }
        let signal = SplitSignal::new(re.to_vec(), im.to_vec())?;
        let out = self.process(signal)?;
        let (out_re, out_im) = out.as_slices();
        re.copy_from_slice(out_re);
        im.copy_from_slice(out_im);
        Ok(())
    }

    /// Read block `source`, transform it and write the result to `dest`.
    /// Nothing is written if the transform fails.
    pub fn run<S: BlockStore + ?Sized>(
        &self,
        store: &mut S,
        source: BlockId,
        dest: BlockId,
    ) -> Result<(), PipelineError> {
        let input = store.read_block(source, self.config.domain_size)?;
        log::debug!("read {} for {} transform", source, self.config.direction);
        let output = self.process(input)?;
        store.write_block(dest, &output)?;
        Ok(())
    }

    /// Transform independent signals. With the `parallel` feature the runs
    /// are spread over the rayon pool.
    pub fn process_batch(&self, signals: Vec<SplitSignal>) -> Result<Vec<SplitSignal>, PipelineError> {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            signals.into_par_iter().map(|s| self.process(s)).collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            signals.into_iter().map(|s| self.process(s)).collect()
        }
    }

    fn run_step(
        &self,
        step: u32,
        queues: &PipelineQueues,
        input: &mut SplitSignal,
        output: &mut SplitSignal,
    ) -> Result<(), PipelineError> {
        let n = self.config.domain_size;
        let geometry = StepGeometry::new(step, self.num_steps, n);
        let mode = ReorderMode::for_step(step, self.config.direction);
        let chunks = self.config.chunks_per_step();
        let chunk_size = self.config.chunk_size;
        let twiddles: &TwiddleTable = &self.twiddles;

        let results = thread::scope(|s| {
            let reorder = s.spawn(move || {
                guarded(queues, "reorder", move || {
                    ReorderStage::new(geometry, mode, twiddles, queues).run(input)
                })
            });
            let compute = s.spawn(move || {
                guarded(queues, "compute", move || {
                    ComputeStage::new(geometry, chunks, chunk_size, queues).run()
                })
            });
            let writeback = s.spawn(move || {
                guarded(queues, "writeback", move || {
                    WritebackStage::new(geometry, chunks, queues).run(output)
                })
            });
            [
                joined("reorder", step, reorder.join()),
                joined("compute", step, compute.join()),
                joined("writeback", step, writeback.join()),
            ]
        });

        let [scattered, _computed, gathered] = first_failure(results)?;
        if scattered != chunks || gathered != chunks {
            return Err(InvariantViolation::new(
                step,
                0,
                0,
                format!(
                    "expected {} chunks per stream, reorder produced {} and writeback consumed {}",
                    chunks, scattered, gathered
                ),
            )
            .into());
        }
        let undrained = queues.undrained();
        if !undrained.is_empty() {
            return Err(InvariantViolation::new(
                step,
                0,
                0,
                format!("queues not drained at step barrier: {}", undrained.join(", ")),
            )
            .into());
        }
        Ok(())
    }
}

fn joined(
    stage: &'static str,
    step: u32,
    result: thread::Result<Result<usize, PipelineError>>,
) -> Result<usize, PipelineError> {
    result.unwrap_or_else(|_| {
        Err(InvariantViolation::new(step, 0, 0, format!("{} stage panicked", stage)).into())
    })
}

/// Collapse per-stage results, preferring a root cause over the `Aborted`
/// errors its peers report after the queues close.
fn first_failure(results: [Result<usize, PipelineError>; 3]) -> Result<[usize; 3], PipelineError> {
    let mut counts = [0usize; 3];
    let mut secondary = None;
    for (slot, result) in counts.iter_mut().zip(results) {
        match result {
            Ok(c) => *slot = c,
            Err(e) if e.is_secondary() => {
                secondary.get_or_insert(e);
            }
            Err(e) => return Err(e),
        }
    }
    match secondary {
        Some(e) => Err(e),
        None => Ok(counts),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QueueError;
    use crate::num::Complex32;
    use crate::reference::reference_fft;

    #[test]
    fn state_schedule() {
        let fft = StreamingFft::new(PipelineConfig::new(8, Direction::Forward)).unwrap();
        let states: Vec<PipelineState> = fft.states().collect();
        assert_eq!(
            states,
            vec![
                PipelineState::Init,
                PipelineState::Step(0),
                PipelineState::Step(1),
                PipelineState::Step(2),
                PipelineState::Done
            ]
        );
        assert_eq!(PipelineState::Step(3).to_string(), "STEP(3)");
    }

    #[test]
    fn eight_point_impulse() {
        let fft = StreamingFft::new(PipelineConfig::with_chunk_size(8, Direction::Forward, 2)).unwrap();
        let mut input = SplitSignal::zeros(8);
        input.set(4, Complex32::new(8.0, 16.0));
        let out = fft.process(input).unwrap();
        for k in 0..8 {
            let sign = if k % 2 == 0 { 1.0 } else { -1.0 };
            assert_eq!(out.get(k), Some(Complex32::new(8.0 * sign, 16.0 * sign)), "bin {}", k);
        }
    }

    #[test]
    fn matches_serial_reference_bit_for_bit() {
        let n = 64;
        let re: Vec<f32> = (0..n).map(|i| ((i * 7) % 13) as f32 - 6.0).collect();
        let im: Vec<f32> = (0..n).map(|i| ((i * 5) % 11) as f32 * 0.25).collect();
        let signal = SplitSignal::new(re, im).unwrap();
        for direction in [Direction::Forward, Direction::Backward] {
            let fft = StreamingFft::new(PipelineConfig::with_chunk_size(n, direction, 5)).unwrap();
            let streamed = fft.process(signal.clone()).unwrap();
            let mut serial = signal.clone();
            reference_fft(&mut serial, fft.twiddles(), direction).unwrap();
            assert_eq!(streamed, serial, "{}", direction);
        }
    }

    #[test]
    fn two_point_domain() {
        let fft = StreamingFft::new(PipelineConfig::new(2, Direction::Forward)).unwrap();
        assert_eq!(fft.num_steps(), 0);
        let out = fft
            .process(SplitSignal::new(vec![1.0, 2.0], vec![0.0, 1.0]).unwrap())
            .unwrap();
        assert_eq!(out.re(), &[3.0, -1.0]);
        assert_eq!(out.im(), &[1.0, -1.0]);
    }

    #[test]
    fn wrong_length_is_rejected_before_any_stage() {
        let fft = StreamingFft::new(PipelineConfig::new(16, Direction::Forward)).unwrap();
        let err = fft.process(SplitSignal::zeros(8)).unwrap_err();
        assert_eq!(
            err,
            PipelineError::Configuration(ConfigError::LengthMismatch {
                expected: 16,
                actual: 8
            })
        );
    }

    #[test]
    fn root_cause_beats_aborted() {
        let root = PipelineError::from(InvariantViolation::new(1, 2, 3, "boom"));
        let got = first_failure([
            Err(PipelineError::from(QueueError::Closed)),
            Err(root.clone()),
            Ok(4),
        ]);
        assert_eq!(got, Err(root));
        let only_secondary = first_failure([Ok(1), Err(QueueError::Closed.into()), Ok(1)]);
        assert!(only_secondary.unwrap_err().is_secondary());
    }

    #[test]
    fn failing_stage_unblocks_peers_and_reports_root_cause() {
        let fft = StreamingFft::new(PipelineConfig::with_chunk_size(8, Direction::Forward, 4)).unwrap();
        let queues = PipelineQueues::new(fft.config());
        let mut short = SplitSignal::zeros(4);
        let mut spare = SplitSignal::zeros(8);
        let err = fft.run_step(1, &queues, &mut short, &mut spare).unwrap_err();
        match err {
            PipelineError::Invariant(v) => {
                assert_eq!(v.step, 1);
                assert!(v.detail.contains("d0 index 4"), "{}", v.detail);
            }
            other => panic!("expected invariant violation, got {:?}", other),
        }
        assert!(queues.data0.re.is_closed());
    }

    #[test]
    fn foreign_twiddle_table_is_rejected() {
        let table = Arc::new(TwiddleTable::build(8).unwrap());
        let err = StreamingFft::with_twiddles(PipelineConfig::new(16, Direction::Forward), table);
        assert!(matches!(
            err,
            Err(PipelineError::Configuration(ConfigError::LengthMismatch { .. }))
        ));
    }
}
