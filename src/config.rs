//! Pipeline configuration.
//!
//! Chunk size and queue capacity default to built-in values and can be
//! overridden process-wide through [`set_default_chunk_size`] /
//! [`set_default_queue_capacity`] or the `STREAMFFT_CHUNK_SIZE` and
//! `STREAMFFT_QUEUE_CAPACITY` environment variables (read once).

use core::sync::atomic::{AtomicUsize, Ordering};

#[cfg(feature = "std")]
use std::sync::OnceLock;

use crate::error::ConfigError;
use crate::indexer::number_of_chunks;

/// Scalars per chunk: one 2048-byte staging page of `f32`.
pub const DEFAULT_CHUNK_SIZE: usize = 512;

/// Minimum number of chunks each queue can hold.
pub const DEFAULT_QUEUE_CAPACITY: usize = 4;

static CHUNK_SIZE_OVERRIDE: AtomicUsize = AtomicUsize::new(0);
static QUEUE_CAPACITY_OVERRIDE: AtomicUsize = AtomicUsize::new(0);

#[cfg(feature = "std")]
static STAGING_ENV: OnceLock<StagingEnv> = OnceLock::new();

#[cfg(feature = "std")]
struct StagingEnv {
    chunk_size: usize,
    queue_capacity: usize,
}

#[cfg(feature = "std")]
fn staging_env() -> &'static StagingEnv {
    STAGING_ENV.get_or_init(|| {
        let chunk_size = std::env::var("STREAMFFT_CHUNK_SIZE")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(0);
        let queue_capacity = std::env::var("STREAMFFT_QUEUE_CAPACITY")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(0);
        StagingEnv {
            chunk_size,
            queue_capacity,
        }
    })
}

/// Override the default chunk size for new configurations. `0` reverts to the
/// environment variable or [`DEFAULT_CHUNK_SIZE`].
pub fn set_default_chunk_size(chunk_size: usize) {
    CHUNK_SIZE_OVERRIDE.store(chunk_size, Ordering::Relaxed);
}

/// Override the minimum default queue capacity for new configurations. `0`
/// reverts to the environment variable or [`DEFAULT_QUEUE_CAPACITY`].
pub fn set_default_queue_capacity(capacity: usize) {
    QUEUE_CAPACITY_OVERRIDE.store(capacity, Ordering::Relaxed);
}

/// Chunk size used by [`PipelineConfig::new`].
pub fn default_chunk_size() -> usize {
    let override_size = CHUNK_SIZE_OVERRIDE.load(Ordering::Relaxed);
    if override_size != 0 {
        return override_size;
    }
    #[cfg(feature = "std")]
    {
        let env = staging_env().chunk_size;
        if env != 0 {
            return env;
        }
    }
    DEFAULT_CHUNK_SIZE
}

/// Lower bound on the queue capacity used by [`PipelineConfig::new`].
pub fn default_queue_capacity() -> usize {
    let override_cap = QUEUE_CAPACITY_OVERRIDE.load(Ordering::Relaxed);
    if override_cap != 0 {
        return override_cap;
    }
    #[cfg(feature = "std")]
    {
        let env = staging_env().queue_capacity;
        if env != 0 {
            return env;
        }
    }
    DEFAULT_QUEUE_CAPACITY
}

/// Transform direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Forward,
    /// Conjugates the input on entry; descale afterwards to invert.
    Backward,
}

impl core::fmt::Display for Direction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Direction::Forward => write!(f, "Forwards"),
            Direction::Backward => write!(f, "Backwards"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    pub domain_size: usize,
    pub direction: Direction,
    /// Scalars per chunk.
    pub chunk_size: usize,
    /// Chunks each queue may hold at once.
    pub queue_capacity: usize,
}

impl PipelineConfig {
    /// Configuration with default staging, sized so one step always fits.
    pub fn new(domain_size: usize, direction: Direction) -> Self {
        Self::with_chunk_size(domain_size, direction, default_chunk_size())
    }

    /// Configuration with an explicit chunk size and a capacity large enough
    /// to stage a whole step.
    pub fn with_chunk_size(domain_size: usize, direction: Direction, chunk_size: usize) -> Self {
        Self {
            domain_size,
            direction,
            chunk_size,
            queue_capacity: number_of_chunks(domain_size, chunk_size).max(default_queue_capacity()),
        }
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Scalars produced per stream in one step.
    pub fn elements_per_step(&self) -> usize {
        self.domain_size / 2
    }

    /// Chunks per stream in one step; zero while `chunk_size` is zero.
    pub fn chunks_per_step(&self) -> usize {
        number_of_chunks(self.domain_size, self.chunk_size)
    }

    /// Chunk buffers each queue actually allocates. A step never has more
    /// than [`chunks_per_step`](Self::chunks_per_step) chunks in flight.
    pub fn allocated_chunks(&self) -> usize {
        self.queue_capacity.min(self.chunks_per_step()).max(1)
    }

    /// Scalars per allocated chunk buffer. A chunk never carries more than
    /// one step's `N/2` values.
    pub fn allocated_chunk_len(&self) -> usize {
        self.chunk_size.min(self.elements_per_step()).max(1)
    }

    /// Check every configuration invariant. Called before any stage starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let n = self.domain_size;
        if n < 2 {
            return Err(ConfigError::DomainTooSmall(n));
        }
        if !n.is_power_of_two() {
            return Err(ConfigError::NotPowerOfTwo(n));
        }
        if self.chunk_size == 0 {
            return Err(ConfigError::ZeroChunkSize);
        }
        if self.queue_capacity == 0 {
            return Err(ConfigError::ZeroQueueCapacity);
        }
        let required = self.elements_per_step();
        let staged = self.queue_capacity.saturating_mul(self.chunk_size);
        if staged < required {
            return Err(ConfigError::InsufficientStaging {
                chunk_size: self.chunk_size,
                queue_capacity: self.queue_capacity,
                required,
            });
        }
        Ok(())
    }
}
