//! Thread creation and join.
//!
//! A thread routine returns an opaque word (the emulated `void*`), handed
//! back through [`Thread::join`]. Both calls report a POSIX status like the
//! rest of the shim; the thread handle and exit value travel through
//! out-parameters.

use std::thread::{Builder, JoinHandle};

use crate::errno::{EAGAIN, ESRCH};

/// A joinable thread (`pthread_t`).
#[derive(Debug)]
pub struct Thread {
    handle: JoinHandle<usize>,
}

impl Thread {
    /// `pthread_create`: start `routine` on a new host thread and store its
    /// handle in `thread`.
    ///
    /// Returns 0, or `EAGAIN` when the host cannot spawn another thread.
    /// `thread` is left untouched on failure.
    pub fn create<F>(thread: &mut Option<Self>, routine: F) -> i32
    where
        F: FnOnce() -> usize + Send + 'static,
    {
        match Builder::new().name("rehost-thread".into()).spawn(routine) {
            Ok(handle) => {
                *thread = Some(Self { handle });
                0
            }
            Err(_) => EAGAIN,
        }
    }

    /// `pthread_join`: wait for the thread in `thread` and store the
    /// routine's value in `ret` when given.
    ///
    /// The slot is emptied, so a second join of the same handle returns
    /// `ESRCH`, as does joining a slot that never held a thread.
    ///
    /// # Panics
    ///
    /// Re-raises a panic from the joined routine.
    pub fn join(thread: &mut Option<Self>, ret: Option<&mut usize>) -> i32 {
        let Some(t) = thread.take() else {
            return ESRCH;
        };
        let value = match t.handle.join() {
            Ok(v) => v,
            Err(payload) => std::panic::resume_unwind(payload),
        };
        if let Some(ret) = ret {
            *ret = value;
        }
        0
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_and_join_report_success() {
        let mut t = None;
        assert_eq!(Thread::create(&mut t, || 42), 0);
        assert!(t.is_some());
        let mut ret = 0usize;
        assert_eq!(Thread::join(&mut t, Some(&mut ret)), 0);
        assert_eq!(ret, 42);
        assert!(t.is_none());
    }

    #[test]
    fn join_without_thread_is_esrch() {
        let mut empty: Option<Thread> = None;
        let mut ret = 7usize;
        assert_eq!(Thread::join(&mut empty, Some(&mut ret)), ESRCH);
        assert_eq!(ret, 7);

        let mut t = None;
        assert_eq!(Thread::create(&mut t, || 1), 0);
        assert_eq!(Thread::join(&mut t, None), 0);
        assert_eq!(Thread::join(&mut t, None), ESRCH);
    }

    #[test]
    fn threads_run_concurrently() {
        let mut threads: Vec<Option<Thread>> = (0..4usize)
            .map(|i| {
                let mut t = None;
                assert_eq!(Thread::create(&mut t, move || i * 10), 0);
                t
            })
            .collect();
        let mut sum = 0usize;
        for t in &mut threads {
            let mut ret = 0usize;
            assert_eq!(Thread::join(t, Some(&mut ret)), 0);
            sum += ret;
        }
        assert_eq!(sum, 60);
    }
}
