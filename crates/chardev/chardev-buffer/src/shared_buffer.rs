//! Fixed-capacity message buffer shared by every open session of the device.
//!
//! The buffer holds one "message": `storage[0..length)` is the current content,
//! anything past `length` is stale. A write replaces the whole message; a read
//! copies a window of it starting at a caller-supplied offset.
//!
//! # Layout
//!
//! ```text
//! ┌──────────────────────────────────────┬────┬──────────────────────┐
//! │  content: storage[0..length)         │ \0 │  stale bytes         │
//! └──────────────────────────────────────┴────┴──────────────────────┘
//!  0                                   length                   CAPACITY
//! ```
//!
//! One byte is always reserved for the terminator, so `length < CAPACITY`.
//!
//! # Locking
//!
//! `storage` and `length` sit behind a single mutex that is held for exactly one
//! `replace` or one `read_into`. Each call therefore observes a single version of
//! the content, but nothing is atomic across calls: a session that reads the
//! message in several chunks may see a write land between two of them and end
//! up with the head of the old message and the tail of the new one.

use crate::outcome::WriteOutcome;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

/// Size of the backing storage in bytes, terminator included.
pub const CAPACITY: usize = 256;

/// Content the buffer starts with.
pub const GREETING: &str = "Hello from kernel!\n";

struct Inner {
    storage: [u8; CAPACITY],
    /// Count of valid bytes in `storage`. Always `< CAPACITY`.
    length: usize,
}

pub struct SharedBuffer {
    inner: Mutex<Inner>,
    /// Number of completed `replace` calls. Bumped while the lock is held.
    generation: AtomicU64,
}

impl SharedBuffer {
    /// Creates a buffer holding [`GREETING`].
    pub fn new() -> Self {
        Self::with_content(GREETING.as_bytes())
    }

    /// Creates a buffer holding `data`, truncated the same way `replace` would.
    ///
    /// The generation starts at 0 regardless of the initial content.
    pub fn with_content(data: &[u8]) -> Self {
        let mut inner = Inner {
            storage: [0u8; CAPACITY],
            length: 0,
        };
        inner.store(data);
        Self {
            inner: Mutex::new(inner),
            generation: AtomicU64::new(0),
        }
    }

    /// Never panics: no critical section can leave `storage`/`length` half
    /// updated, so a poisoned lock still guards consistent data.
    #[inline]
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replaces the content with `data` and returns the number of bytes stored.
    ///
    /// Input of `CAPACITY` bytes or more is silently cut to `CAPACITY - 1`.
    /// Use [`SharedBuffer::replace_checked`] to find out whether that happened.
    pub fn replace(&self, data: &[u8]) -> usize {
        self.replace_checked(data).stored()
    }

    /// Same as [`SharedBuffer::replace`], but reports truncation.
    pub fn replace_checked(&self, data: &[u8]) -> WriteOutcome {
        let outcome = {
            let mut inner = self.lock();
            let outcome = inner.store(data);
            self.generation.fetch_add(1, Ordering::Release);
            outcome
        };

        let content = String::from_utf8_lossy(&data[..outcome.stored()]);
        match outcome {
            WriteOutcome::Truncated { stored, requested } => {
                warn!(stored, requested, %content, "write too long, content truncated");
            }
            WriteOutcome::Stored(n) => debug!(stored = n, %content, "content replaced"),
        }
        outcome
    }

    /// Copies up to `max_len` bytes of content starting at `offset`.
    ///
    /// Returns an empty vector once `offset` has reached the end of the
    /// content; that is the end-of-stream signal.
    pub fn read_at(&self, offset: usize, max_len: usize) -> Vec<u8> {
        let mut out = vec![0u8; max_len.min(CAPACITY)];
        let n = self.read_into(offset, &mut out);
        out.truncate(n);
        out
    }

    /// Copies content starting at `offset` into `buf` and returns the count copied.
    ///
    /// Copies `min(buf.len(), length - offset)` bytes, or nothing when
    /// `offset >= length`.
    pub fn read_into(&self, offset: usize, buf: &mut [u8]) -> usize {
        let inner = self.lock();
        if offset >= inner.length {
            return 0;
        }
        let n = buf.len().min(inner.length - offset);
        buf[..n].copy_from_slice(&inner.storage[offset..offset + n]);
        n
    }

    /// Current content length.
    pub fn len(&self) -> usize {
        self.lock().length
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of the whole current content.
    pub fn contents(&self) -> Vec<u8> {
        let inner = self.lock();
        inner.storage[..inner.length].to_vec()
    }

    /// Number of replaces completed since the buffer was created.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }
}

impl Default for SharedBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SharedBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedBuffer")
            .field("len", &self.len())
            .field("generation", &self.generation())
            .finish()
    }
}

impl Inner {
    fn store(&mut self, data: &[u8]) -> WriteOutcome {
        let (n, outcome) = if data.len() >= CAPACITY {
            let n = CAPACITY - 1;
            (
                n,
                WriteOutcome::Truncated {
                    stored: n,
                    requested: data.len(),
                },
            )
        } else {
            (data.len(), WriteOutcome::Stored(data.len()))
        };

        self.storage[..n].copy_from_slice(&data[..n]);
        self.storage[n] = 0;
        self.length = n;
        outcome
    }
}
