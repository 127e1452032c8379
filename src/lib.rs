//! # streamfft - streaming radix-2 FFT pipeline
//!
//! A decimation-in-time FFT over planar (`re[]`, `im[]`) single-precision
//! signals whose butterfly steps are executed by three concurrent stages
//! connected through bounded, fixed-size chunk queues:
//!
//! ```text
//! signal ─▶ reorder ─▶ [data0 | data1 | twiddle] ─▶ compute ─▶ [out0 | out1] ─▶ writeback ─▶ signal'
//! ```
//!
//! Each queue stages at most `queue_capacity` chunks of `chunk_size` scalars,
//! never more than one step's `N/2` values. Default configurations raise
//! `queue_capacity` until a whole step fits, so with a fixed chunk size the
//! staging grows with the domain size. The result is bit-identical for every
//! chunk size.
//!
//! ## Features
//!
//! - **Bounded staging**: every stream is carried in chunks of a configured size
//! - **Strict step barrier**: step `k + 1` never sees partial output of step `k`
//! - **Serial reference**: [`reference::reference_fft`] runs the same arithmetic
//!   without staging
//! - **Block storage**: [`storage::BlockStore`] reads and writes whole signals
//!
//! ## Cargo Features
//!
//! - `std` (default): the concurrent pipeline, queues, storage and planner
//! - `parallel`: transform independent signals on the Rayon pool in
//!   [`StreamingFft::process_batch`]
//!
//! Without `std` the crate still provides the twiddle table, bit reversal,
//! butterfly indexing and arithmetic, post-processing and the serial
//! reference transform on `alloc`.
//!
//! ## Example
//!
//! ```
//! use streamfft::{descale, Direction, PipelineConfig, SplitSignal, StreamingFft};
//!
//! let n = 16;
//! let re: Vec<f32> = (0..n).map(|i| i as f32).collect();
//! let signal = SplitSignal::new(re.clone(), vec![0.0; n]).unwrap();
//!
//! let forward = StreamingFft::new(PipelineConfig::new(n, Direction::Forward)).unwrap();
//! let backward = StreamingFft::new(PipelineConfig::new(n, Direction::Backward)).unwrap();
//! let mut back = backward.process(forward.process(signal).unwrap()).unwrap();
//! descale(&mut back);
//! for (a, b) in back.re().iter().zip(&re) {
//!     assert!((a - b).abs() < 1e-3);
//! }
//! ```
//!
//! ## License
//!
//! Licensed under either of
//! - Apache License, Version 2.0 ([LICENSE-APACHE](LICENSE-APACHE) or https://www.apache.org/licenses/LICENSE-2.0)
//! - MIT license ([LICENSE-MIT](LICENSE-MIT) or https://opensource.org/licenses/MIT)
//!
//! at your option.

#![cfg_attr(not(any(feature = "std", test)), no_std)]
extern crate alloc;

/// Butterfly arithmetic on single-precision complex values.
pub mod butterfly;

/// Bit-reversal permutation.
pub mod bitrev;

/// Pipeline configuration and process-wide staging defaults.
pub mod config;

/// Error taxonomy.
pub mod error;

/// Butterfly index sequence shared by scatter and gather.
pub mod indexer;

/// Complex scalars and planar signals.
pub mod num;

/// Origin shift and descaling applied outside the transform core.
pub mod post;

/// Serial in-place transform with identical arithmetic.
pub mod reference;

/// Twiddle factor table.
pub mod twiddle;

#[cfg(feature = "std")]
pub mod pipeline;
#[cfg(feature = "std")]
pub mod planner;
#[cfg(feature = "std")]
pub mod queue;
#[cfg(feature = "std")]
pub mod stage;
#[cfg(feature = "std")]
pub mod storage;

pub use config::{Direction, PipelineConfig};
pub use error::{BlockId, ConfigError, InvariantViolation, PipelineError, QueueError, StorageError};
pub use num::{Complex32, SplitSignal};
pub use post::{descale, move_origin};
pub use reference::{golden_impulse, reference_fft};
pub use twiddle::TwiddleTable;

#[cfg(feature = "std")]
pub use pipeline::{PipelineState, StreamingFft};
#[cfg(feature = "std")]
pub use planner::PipelinePlanner;
#[cfg(feature = "std")]
pub use storage::{BlockStore, MemoryStore};
