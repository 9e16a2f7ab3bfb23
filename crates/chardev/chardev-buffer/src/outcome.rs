#![forbid(unsafe_code)]

/// Result of replacing the buffer content.
///
/// Oversized input is not a failure: it is stored up to `CAPACITY - 1` bytes
/// and reported as `Truncated` so callers that care can tell the difference.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteOutcome {
    /// All `n` input bytes were stored.
    Stored(usize),
    /// Only `stored` of the `requested` bytes fit.
    Truncated { stored: usize, requested: usize },
}

impl WriteOutcome {
    #[inline]
    pub fn stored(&self) -> usize {
        match *self {
            WriteOutcome::Stored(n) => n,
            WriteOutcome::Truncated { stored, .. } => stored,
        }
    }

    #[inline]
    pub fn is_truncated(&self) -> bool {
        matches!(self, WriteOutcome::Truncated { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_count_ignores_requested_length() {
        let t = WriteOutcome::Truncated {
            stored: 255,
            requested: 300,
        };
        assert_eq!(t.stored(), 255);
        assert!(t.is_truncated());
        assert_eq!(WriteOutcome::Stored(7).stored(), 7);
        assert!(!WriteOutcome::Stored(7).is_truncated());
    }
}
