//! Error taxonomy for the streaming pipeline.
//!
//! Every failure is fatal for the run that raised it: configuration problems
//! are reported before any stage starts, storage problems abort the run, and
//! invariant violations are programming defects reported with the step,
//! spectra and point at which they were detected.

use alloc::string::String;
use core::fmt;

/// Identifier of a block in external storage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub u32);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "block #{}", self.0)
    }
}

/// Invalid pipeline configuration, detected before any work is done.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The domain size is not a power of two.
    NotPowerOfTwo(usize),
    /// The domain size is below the two-point minimum.
    DomainTooSmall(usize),
    /// A twiddle table was requested for a size that is not a positive even integer.
    InvalidTwiddleDomain(usize),
    /// Chunks must hold at least one scalar.
    ZeroChunkSize,
    /// Queues must hold at least one chunk.
    ZeroQueueCapacity,
    /// `queue_capacity * chunk_size` cannot hold one step's output.
    InsufficientStaging {
        chunk_size: usize,
        queue_capacity: usize,
        required: usize,
    },
    /// Two buffers that must agree in length do not.
    LengthMismatch { expected: usize, actual: usize },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NotPowerOfTwo(n) => write!(
                f,
                "{} provided as domain size, but this must be a power of two",
                n
            ),
            ConfigError::DomainTooSmall(n) => {
                write!(f, "domain size {} is too small, at least 2 points are required", n)
            }
            ConfigError::InvalidTwiddleDomain(n) => write!(
                f,
                "twiddle table size {} must be a positive even integer",
                n
            ),
            ConfigError::ZeroChunkSize => write!(f, "chunk size must be at least 1"),
            ConfigError::ZeroQueueCapacity => write!(f, "queue capacity must be at least 1"),
            ConfigError::InsufficientStaging {
                chunk_size,
                queue_capacity,
                required,
            } => write!(
                f,
                "queue capacity {} x chunk size {} cannot stage the {} elements of one step",
                queue_capacity, chunk_size, required
            ),
            ConfigError::LengthMismatch { expected, actual } => {
                write!(f, "expected {} elements but got {}", expected, actual)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

/// Failure of the external block storage collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// No block is stored under the requested id.
    MissingBlock(BlockId),
    /// The stored block does not have the requested length; partial reads are not allowed.
    ShapeMismatch {
        block: BlockId,
        expected: usize,
        actual: usize,
    },
    /// Backend-specific I/O failure.
    Io(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::MissingBlock(id) => write!(f, "{} does not exist", id),
            StorageError::ShapeMismatch {
                block,
                expected,
                actual,
            } => write!(
                f,
                "{} holds {} samples but {} were requested",
                block, actual, expected
            ),
            StorageError::Io(msg) => write!(f, "storage I/O failed: {}", msg),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for StorageError {}

/// A broken internal invariant. Always a bug, never retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    pub step: u32,
    pub spectra: usize,
    pub point: usize,
    pub detail: String,
}

impl InvariantViolation {
    pub fn new(step: u32, spectra: usize, point: usize, detail: impl Into<String>) -> Self {
        Self {
            step,
            spectra,
            point,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "internal invariant violated at step={} spectra={} point={}: {}",
            self.step, self.spectra, self.point, self.detail
        )
    }
}

#[cfg(feature = "std")]
impl std::error::Error for InvariantViolation {}

/// Errors raised by a bounded stream queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    /// The queue was shut down because a peer stage failed.
    Closed,
}

impl fmt::Display for QueueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueError::Closed => write!(f, "stream queue closed by a failing peer stage"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for QueueError {}

/// Run-level failure returned by the orchestrator. No partial results accompany it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    Configuration(ConfigError),
    ResourceExhaustion(StorageError),
    Invariant(InvariantViolation),
    /// A stage stopped because a peer closed the queues. Only surfaced when no
    /// root cause was recorded.
    Aborted(QueueError),
}

impl PipelineError {
    /// `true` for the secondary error a stage reports after a peer failed.
    pub fn is_secondary(&self) -> bool {
        matches!(self, PipelineError::Aborted(_))
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Configuration(e) => write!(f, "configuration error: {}", e),
            PipelineError::ResourceExhaustion(e) => write!(f, "resource exhaustion: {}", e),
            PipelineError::Invariant(e) => write!(f, "{}", e),
            PipelineError::Aborted(e) => write!(f, "pipeline aborted: {}", e),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipelineError::Configuration(e) => Some(e),
            PipelineError::ResourceExhaustion(e) => Some(e),
            PipelineError::Invariant(e) => Some(e),
            PipelineError::Aborted(e) => Some(e),
        }
    }
}

impl From<ConfigError> for PipelineError {
    fn from(e: ConfigError) -> Self {
        PipelineError::Configuration(e)
    }
}

impl From<StorageError> for PipelineError {
    fn from(e: StorageError) -> Self {
        PipelineError::ResourceExhaustion(e)
    }
}

impl From<InvariantViolation> for PipelineError {
    fn from(e: InvariantViolation) -> Self {
        PipelineError::Invariant(e)
    }
}

impl From<QueueError> for PipelineError {
    fn from(e: QueueError) -> Self {
        PipelineError::Aborted(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn power_of_two_message_matches_harness_wording() {
        let msg = ConfigError::NotPowerOfTwo(12).to_string();
        assert_eq!(
            msg,
            "12 provided as domain size, but this must be a power of two"
        );
    }

    #[test]
    fn invariant_message_carries_context() {
        let e = InvariantViolation::new(3, 5, 16, "d1 index 40 out of range");
        let msg = PipelineError::from(e).to_string();
        assert!(msg.contains("step=3"));
        assert!(msg.contains("spectra=5"));
        assert!(msg.contains("point=16"));
    }

    #[test]
    fn aborted_is_secondary() {
        assert!(PipelineError::from(QueueError::Closed).is_secondary());
        assert!(!PipelineError::from(ConfigError::ZeroChunkSize).is_secondary());
    }
}
