//! Process-wide count of spawned sessions.

use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic count of sessions created.
///
/// The count is diagnostic only. It is incremented once per spawned
/// [`Session`](crate::Session) and never decremented.
#[derive(Debug, Default)]
pub struct SessionCounter {
    opened: AtomicU64,
}

static GLOBAL: SessionCounter = SessionCounter::new();

impl SessionCounter {
    /// Creates a counter starting at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            opened: AtomicU64::new(0),
        }
    }

    /// The counter shared by every session spawned without an explicit one.
    #[must_use]
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// Number of sessions created so far.
    #[must_use]
    pub fn opened(&self) -> u64 {
        self.opened.load(Ordering::Relaxed)
    }

    /// Records a new session and returns its one-based ordinal.
    pub(crate) fn record(&self) -> u64 {
        self.opened.fetch_add(1, Ordering::Relaxed) + 1
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use rstest::rstest;

    use super::*;

    #[rstest]
    fn records_sequential_ordinals() {
        let counter = SessionCounter::new();

        assert_eq!(counter.record(), 1);
        assert_eq!(counter.record(), 2);
        assert_eq!(counter.opened(), 2);
    }

    #[rstest]
    fn concurrent_records_are_not_lost() {
        let counter = Arc::new(SessionCounter::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let shared = Arc::clone(&counter);
                thread::spawn(move || {
                    for _ in 0..100 {
                        shared.record();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("worker panicked");
        }

        assert_eq!(counter.opened(), 800);
    }
}
