//! One open handle on the device.
//!
//! A session owns a read cursor into the shared content and nothing else.
//! Reads advance the cursor by the number of bytes delivered; writes replace
//! the shared content but leave every cursor alone, including the writer's
//! own. Reopening is the way to start reading from the top again.
//!
//! ```text
//!   open ──► OPEN ──read/write──► OPEN ──close/drop──► (gone)
//! ```
//!
//! `close` takes the session by value, so nothing can be called on it after.

use crate::device::DeviceInner;
use chardev_buffer::WriteOutcome;
use std::fmt;
use std::io;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub struct DeviceSession {
    id: SessionId,
    device: Arc<DeviceInner>,
    /// Offset of the next unread byte. Only `read` moves it.
    cursor: usize,
}

impl DeviceSession {
    pub(crate) fn new(id: SessionId, device: Arc<DeviceInner>) -> Self {
        Self {
            id,
            device,
            cursor: 0,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Reads up to `max_len` bytes from the cursor and advances past them.
    ///
    /// An empty result means end of stream; the cursor is left where it is
    /// and further reads keep returning empty until the content grows past it.
    pub fn read(&mut self, max_len: usize) -> Vec<u8> {
        let out = self.device.buffer.read_at(self.cursor, max_len);
        self.advance(out.len());
        out
    }

    /// Like [`DeviceSession::read`], copying into `buf` instead of allocating.
    pub fn read_into(&mut self, buf: &mut [u8]) -> usize {
        let n = self.device.buffer.read_into(self.cursor, buf);
        self.advance(n);
        n
    }

    #[inline]
    fn advance(&mut self, n: usize) {
        if n == 0 {
            debug!(session = %self.id, cursor = self.cursor, "end of stream");
            return;
        }
        self.cursor += n;
        debug!(session = %self.id, sent = n, cursor = self.cursor, "sent bytes");
    }

    /// Replaces the shared content with `data`; returns the count stored.
    ///
    /// The cursor is not reset.
    pub fn write(&mut self, data: &[u8]) -> usize {
        self.write_checked(data).stored()
    }

    /// Like [`DeviceSession::write`], but reports truncation.
    pub fn write_checked(&mut self, data: &[u8]) -> WriteOutcome {
        let outcome = self.device.buffer.replace_checked(data);
        debug!(session = %self.id, received = outcome.stored(), "received bytes");
        outcome
    }

    /// Releases the session. The shared content is untouched.
    pub fn close(self) {}
}

impl io::Read for DeviceSession {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.read_into(buf))
    }
}

impl Drop for DeviceSession {
    fn drop(&mut self) {
        self.device.session_closed();
        info!(device = %self.device.name, session = %self.id, "device closed");
    }
}

impl fmt::Debug for DeviceSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceSession")
            .field("id", &self.id)
            .field("cursor", &self.cursor)
            .finish()
    }
}
