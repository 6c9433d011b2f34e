//! POSIX condition variables.

use parking_lot::{Condvar, Mutex as HostMutex};

use super::mutex::Mutex;

/// A `pthread_cond_t`.
///
/// Waiters sleep on a generation counter; signal and broadcast bump it.
/// The counter lock is taken before the caller's mutex is released, so a
/// wakeup issued after `wait` unlocks cannot be lost.
#[derive(Debug, Default)]
pub struct Cond {
    generation: HostMutex<u64>,
    cv: Condvar,
}

impl Cond {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `pthread_cond_init`.
    pub fn init(&self) -> i32 {
        0
    }

    /// `pthread_cond_wait`: release `mutex`, sleep until signalled, then
    /// reacquire it. Returns the unlock status if `mutex` was not held.
    pub fn wait(&self, mutex: &Mutex) -> i32 {
        let mut generation = self.generation.lock();
        let start = *generation;
        let rc = mutex.unlock();
        if rc != 0 {
            return rc;
        }
        while *generation == start {
            self.cv.wait(&mut generation);
        }
        drop(generation);
        mutex.lock()
    }

    /// `pthread_cond_signal`.
    pub fn signal(&self) -> i32 {
        *self.generation.lock() += 1;
        self.cv.notify_one();
        0
    }

    /// `pthread_cond_broadcast`.
    pub fn broadcast(&self) -> i32 {
        *self.generation.lock() += 1;
        self.cv.notify_all();
        0
    }

    /// `pthread_cond_destroy`.
    pub fn destroy(&self) -> i32 {
        0
    }
}
