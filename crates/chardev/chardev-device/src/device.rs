//! The device handle: owns the one shared buffer and hands out sessions.
//!
//! `CharDevice` is cheap to clone; every clone refers to the same buffer and
//! the same session bookkeeping, so it can be moved into worker threads and
//! opened from any of them.

use crate::session::{DeviceSession, SessionId};
use chardev_buffer::SharedBuffer;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use tracing::info;

pub(crate) struct DeviceInner {
    pub(crate) name: String,
    pub(crate) buffer: SharedBuffer,
    next_id: AtomicU64,
    open_sessions: AtomicUsize,
}

impl DeviceInner {
    pub(crate) fn session_closed(&self) {
        self.open_sessions.fetch_sub(1, Ordering::AcqRel);
    }
}

#[derive(Clone)]
pub struct CharDevice {
    inner: Arc<DeviceInner>,
}

impl CharDevice {
    /// Wraps an existing buffer.
    pub fn new(name: impl Into<String>, buffer: SharedBuffer) -> Self {
        Self {
            inner: Arc::new(DeviceInner {
                name: name.into(),
                buffer,
                next_id: AtomicU64::new(1),
                open_sessions: AtomicUsize::new(0),
            }),
        }
    }

    /// A device whose buffer starts out holding the default greeting.
    pub fn with_greeting(name: impl Into<String>) -> Self {
        Self::new(name, SharedBuffer::new())
    }

    /// Opens a new session with its cursor at the start of the content.
    pub fn open(&self) -> DeviceSession {
        let id = SessionId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        let open = self.inner.open_sessions.fetch_add(1, Ordering::AcqRel) + 1;
        info!(device = %self.inner.name, session = %id, open, "device opened");
        DeviceSession::new(id, Arc::clone(&self.inner))
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn buffer(&self) -> &SharedBuffer {
        &self.inner.buffer
    }

    /// Sessions opened and not yet closed or dropped.
    pub fn open_sessions(&self) -> usize {
        self.inner.open_sessions.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for CharDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CharDevice")
            .field("name", &self.inner.name)
            .field("buffer", &self.inner.buffer)
            .field("open_sessions", &self.open_sessions())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_ids_are_unique() {
        let dev = CharDevice::with_greeting("hello_char");
        let a = dev.open();
        let b = dev.open();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn open_sessions_tracks_close_and_drop() {
        let dev = CharDevice::with_greeting("hello_char");
        let a = dev.open();
        let b = dev.open();
        assert_eq!(dev.open_sessions(), 2);
        a.close();
        assert_eq!(dev.open_sessions(), 1);
        drop(b);
        assert_eq!(dev.open_sessions(), 0);
    }

    #[test]
    fn clones_share_the_buffer() {
        let dev = CharDevice::with_greeting("hello_char");
        let other = dev.clone();
        other.open().write(b"shared");
        assert_eq!(dev.buffer().contents(), b"shared");
        assert_eq!(dev.name(), "hello_char");
    }

    #[test]
    fn closing_a_session_keeps_the_content() {
        let dev = CharDevice::new("hello_char", SharedBuffer::with_content(b"kept"));
        let s = dev.open();
        s.close();
        assert_eq!(dev.buffer().contents(), b"kept");
    }
}
