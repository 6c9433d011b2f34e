//! `pthread_once`.

/// A `pthread_once_t`.
#[derive(Debug)]
pub struct Once {
    inner: parking_lot::Once,
}

impl Once {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            inner: parking_lot::Once::new(),
        }
    }

    /// Run `f` if no call on this control has run yet. Concurrent callers
    /// block until the first completes.
    pub fn call(&self, f: impl FnOnce()) -> i32 {
        self.inner.call_once(f);
        0
    }

    #[must_use]
    pub fn is_done(&self) -> bool {
        self.inner.state().done()
    }
}

impl Default for Once {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn runs_exactly_once() {
        static ONCE: Once = Once::new();
        static HITS: AtomicU32 = AtomicU32::new(0);
        let handles: Vec<_> = (0..4)
            .map(|_| {
                std::thread::spawn(|| {
                    ONCE.call(|| {
                        HITS.fetch_add(1, Ordering::SeqCst);
                    })
                })
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), 0);
        }
        assert_eq!(HITS.load(Ordering::SeqCst), 1);
        assert!(ONCE.is_done());
    }
}
