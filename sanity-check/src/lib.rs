use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::time::{Duration, Instant};
use streamfft::{
    descale, golden_impulse, move_origin, BlockId, BlockStore, Direction, MemoryStore,
    PipelineConfig, PipelineError, SplitSignal, StreamingFft,
};

const SOURCE: BlockId = BlockId(0);
const SPECTRUM: BlockId = BlockId(1);
const RESULT: BlockId = BlockId(2);

/// Signal pushed through the forward/backward identity check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CheckInput {
    /// Zero except `(N, 2N)` at `N/2`.
    Golden,
    /// Uniform samples in `[-1, 1)` from a seeded generator.
    Random { seed: u64 },
}

#[derive(Clone, Debug)]
pub struct CheckOptions {
    pub domain_size: usize,
    pub chunk_size: Option<usize>,
    pub queue_capacity: Option<usize>,
    pub input: CheckInput,
    /// Allowed absolute error, scaled by the largest input magnitude.
    pub tolerance: f32,
}

impl CheckOptions {
    pub fn new(domain_size: usize) -> Self {
        Self {
            domain_size,
            chunk_size: None,
            queue_capacity: None,
            input: CheckInput::Golden,
            tolerance: 1e-4,
        }
    }

    fn config(&self, direction: Direction) -> PipelineConfig {
        let mut config = match self.chunk_size {
            Some(chunk) => PipelineConfig::with_chunk_size(self.domain_size, direction, chunk),
            None => PipelineConfig::new(self.domain_size, direction),
        };
        if let Some(capacity) = self.queue_capacity {
            config = config.queue_capacity(capacity);
        }
        config
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mismatch {
    pub index: usize,
    pub got: (f32, f32),
    pub expected: (f32, f32),
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Mismatch at index {}: ({:.2}, {:.2}) vs ({:.2}, {:.2})",
            self.index, self.got.0, self.got.1, self.expected.0, self.expected.1
        )
    }
}

#[derive(Clone, Debug)]
pub struct Timing {
    pub direction: Direction,
    pub domain_size: usize,
    pub elapsed: Duration,
}

impl fmt::Display for Timing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} FFT of size {}: total time {:.6} sec.",
            self.direction,
            self.domain_size,
            self.elapsed.as_secs_f64()
        )
    }
}

#[derive(Clone, Debug)]
pub struct CheckReport {
    pub checked: usize,
    pub mismatches: Vec<Mismatch>,
    pub timings: Vec<Timing>,
}

impl CheckReport {
    pub fn matched(&self) -> usize {
        self.checked - self.mismatches.len()
    }

    pub fn passed(&self) -> bool {
        self.mismatches.is_empty()
    }
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Checked {} elements: {} match and {} mismatched",
            self.checked,
            self.matched(),
            self.mismatches.len()
        )
    }
}

pub fn input_signal(input: CheckInput, n: usize) -> SplitSignal {
    match input {
        CheckInput::Golden => golden_impulse(n),
        CheckInput::Random { seed } => {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut signal = SplitSignal::zeros(n);
            let (re, im) = signal.as_mut_slices();
            for v in re.iter_mut().chain(im.iter_mut()) {
                *v = rng.gen_range(-1.0..1.0);
            }
            signal
        }
    }
}

/// Element-wise comparison of `got` against `expected`.
pub fn compare(got: &SplitSignal, expected: &SplitSignal, tolerance: f32) -> Vec<Mismatch> {
    let scale = expected
        .re()
        .iter()
        .chain(expected.im())
        .fold(1.0f32, |m, v| m.max(v.abs()));
    let limit = tolerance * scale;
    (0..expected.len())
        .filter_map(|i| {
            let e = expected.get(i)?;
            let g = got.get(i).unwrap_or_default();
            let off = (g.re - e.re).abs() > limit || (g.im - e.im).abs() > limit;
            off.then_some(Mismatch {
                index: i,
                got: (g.re, g.im),
                expected: (e.re, e.im),
            })
        })
        .collect()
}

/// Run FORWARD then BACKWARD through a [`MemoryStore`], undo the scaling and
/// compare with the input.
pub fn run_check(options: &CheckOptions) -> Result<CheckReport, PipelineError> {
    let n = options.domain_size;
    let forward = StreamingFft::new(options.config(Direction::Forward))?;
    let backward = StreamingFft::new(options.config(Direction::Backward))?;
    log::info!(
        "checking N={} with chunk size {} and queue capacity {}",
        n,
        forward.config().chunk_size,
        forward.config().queue_capacity
    );

    let original = input_signal(options.input, n);
    let mut store = MemoryStore::new();
    store.insert(SOURCE, original.clone());

    let mut timings = Vec::with_capacity(2);
    for (fft, from, to) in [(&forward, SOURCE, SPECTRUM), (&backward, SPECTRUM, RESULT)] {
        let start = Instant::now();
        fft.run(&mut store, from, to)?;
        timings.push(Timing {
            direction: fft.direction(),
            domain_size: n,
            elapsed: start.elapsed(),
        });
    }

    let mut result = store.read_block(RESULT, n)?;
    // the golden impulse sits on an even index from N = 4 up; the origin
    // shift would flip it for N = 2
    if options.input == CheckInput::Golden && n >= 4 {
        move_origin(&mut result);
    }
    descale(&mut result);

    Ok(CheckReport {
        checked: n,
        mismatches: compare(&result, &original, options.tolerance),
        timings,
    })
}
