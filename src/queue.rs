//! Fixed-capacity FIFO of fixed-size chunks with blocking handoff.
//!
//! A queue owns `capacity` chunk buffers of `chunk_size` scalars each,
//! allocated once. They circulate between two bounded channels: the writer
//! takes a buffer from `free`, fills it and sends it on `ready`; the reader
//! receives the oldest one from `ready` and sends it back to `free` when done.
//! Buffers are moved, never shared, so a chunk is only ever reachable from
//! one side at a time.
//!
//! ```text
//!   reserve_for_write ──▶ [WriteChunk] ──commit_write──▶ ready (FIFO)
//!          ▲                                                │
//!        free ◀──release_read── [ReadChunk] ◀──wait_for_read┘
//! ```
//!
//! Each queue has exactly one producer and one consumer. [`close`] drops the
//! sending half of a shutdown channel, which wakes every blocked `select!`.
//!
//! [`close`]: BoundedStreamQueue::close

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;
use std::vec::Vec;

use crossbeam_channel::{bounded, select, Receiver, Sender};

use crate::error::QueueError;

pub struct BoundedStreamQueue<T> {
    name: &'static str,
    chunk_size: usize,
    capacity: usize,
    free_tx: Sender<Vec<T>>,
    free_rx: Receiver<Vec<T>>,
    ready_tx: Sender<(Vec<T>, usize)>,
    ready_rx: Receiver<(Vec<T>, usize)>,
    shutdown_tx: Mutex<Option<Sender<()>>>,
    shutdown_rx: Receiver<()>,
    closed: AtomicBool,
    committed: AtomicU64,
    released: AtomicU64,
}

/// Exclusive write access to one reserved chunk.
#[derive(Debug)]
pub struct WriteChunk<T> {
    buf: Vec<T>,
    len: usize,
}

impl<T: Copy> WriteChunk<T> {
    /// Append `value`. Returns `false` if the chunk is already full.
    #[inline]
    pub fn push(&mut self, value: T) -> bool {
        match self.buf.get_mut(self.len) {
            Some(slot) => {
                *slot = value;
                self.len += 1;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == self.buf.len()
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Mark the first `len` scalars as written and expose them for filling.
    /// `len` is clamped to the chunk size.
    pub fn fill(&mut self, len: usize) -> &mut [T] {
        self.len = len.min(self.buf.len());
        &mut self.buf[..self.len]
    }
}

/// Read access to one committed chunk.
#[derive(Debug)]
pub struct ReadChunk<T> {
    buf: Vec<T>,
    len: usize,
}

impl<T> ReadChunk<T> {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<T> core::ops::Deref for ReadChunk<T> {
    type Target = [T];
    fn deref(&self) -> &[T] {
        &self.buf[..self.len]
    }
}

impl<T: Copy + Default> BoundedStreamQueue<T> {
    /// # Panics
    /// If `capacity` or `chunk_size` is zero; configurations are validated
    /// before queues are built.
    pub fn new(name: &'static str, capacity: usize, chunk_size: usize) -> Self {
        assert!(capacity > 0 && chunk_size > 0);
        let (free_tx, free_rx) = bounded(capacity);
        for _ in 0..capacity {
            let stocked = free_tx.try_send(vec![T::default(); chunk_size]);
            debug_assert!(stocked.is_ok());
        }
        let (ready_tx, ready_rx) = bounded(capacity);
        let (shutdown_tx, shutdown_rx) = bounded(0);
        Self {
            name,
            chunk_size,
            capacity,
            free_tx,
            free_rx,
            ready_tx,
            ready_rx,
            shutdown_tx: Mutex::new(Some(shutdown_tx)),
            shutdown_rx,
            closed: AtomicBool::new(false),
            committed: AtomicU64::new(0),
            released: AtomicU64::new(0),
        }
    }
}

impl<T> BoundedStreamQueue<T> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    // Only the free and ready channels ever hold buffers, and there are
    // `capacity` of them, so neither send can find its channel full.
    fn recycle(&self, buf: Vec<T>) -> bool {
        match self.free_tx.try_send(buf) {
            Ok(()) => true,
            Err(_) => {
                log::warn!("{}: free list rejected a chunk buffer", self.name);
                false
            }
        }
    }

    /// Block until a free chunk exists and take exclusive write access to it.
    pub fn reserve_for_write(&self) -> Result<WriteChunk<T>, QueueError> {
        if self.is_closed() {
            return Err(QueueError::Closed);
        }
        let buf = select! {
            recv(self.free_rx) -> buf => buf.map_err(|_| QueueError::Closed)?,
            recv(self.shutdown_rx) -> _ => return Err(QueueError::Closed),
        };
        if self.is_closed() {
            self.recycle(buf);
            return Err(QueueError::Closed);
        }
        Ok(WriteChunk { buf, len: 0 })
    }

    /// Publish a filled chunk to the reader, preserving FIFO order.
    pub fn commit_write(&self, chunk: WriteChunk<T>) -> Result<(), QueueError> {
        if self.is_closed() {
            self.recycle(chunk.buf);
            return Err(QueueError::Closed);
        }
        let len = chunk.len;
        self.ready_tx
            .send((chunk.buf, len))
            .map_err(|_| QueueError::Closed)?;
        let committed = self.committed.fetch_add(1, Ordering::AcqRel) + 1;
        log::trace!(
            "{}: committed chunk #{} ({} scalars)",
            self.name,
            committed,
            len
        );
        Ok(())
    }

    /// Block until the oldest committed chunk is available.
    pub fn wait_for_read(&self) -> Result<ReadChunk<T>, QueueError> {
        if self.is_closed() {
            return Err(QueueError::Closed);
        }
        let (buf, len) = select! {
            recv(self.ready_rx) -> msg => msg.map_err(|_| QueueError::Closed)?,
            recv(self.shutdown_rx) -> _ => return Err(QueueError::Closed),
        };
        if self.is_closed() {
            self.recycle(buf);
            return Err(QueueError::Closed);
        }
        Ok(ReadChunk { buf, len })
    }

    /// Return a consumed chunk to the free list.
    pub fn release_read(&self, chunk: ReadChunk<T>) {
        if self.recycle(chunk.buf) {
            self.released.fetch_add(1, Ordering::AcqRel);
        }
    }

    /// Wake every blocked caller; all further reserve/commit/wait calls fail
    /// with [`QueueError::Closed`].
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        log::warn!("{}: closed", self.name);
        let sender = self
            .shutdown_tx
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        drop(sender);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// `true` when every committed chunk has been read and released.
    pub fn is_drained(&self) -> bool {
        self.ready_rx.is_empty() && self.free_rx.len() == self.capacity
    }

    /// Committed chunks not yet taken by the reader.
    pub fn pending(&self) -> usize {
        self.ready_rx.len()
    }

    /// Total chunks committed and released so far.
    pub fn counters(&self) -> (u64, u64) {
        (
            self.committed.load(Ordering::Acquire),
            self.released.load(Ordering::Acquire),
        )
    }
}
