//! POSIX mutex operations.
//!
//! Lock and unlock are separate calls rather than a guard, as generated code
//! issues them independently. The lock state is a flag under a host mutex
//! with a condition variable for waiters.

use parking_lot::{Condvar, Mutex as HostMutex};

use crate::errno::{EBUSY, EINVAL, EPERM};

pub const PTHREAD_MUTEX_NORMAL: i32 = 0;
pub const PTHREAD_MUTEX_RECURSIVE: i32 = 1;
pub const PTHREAD_MUTEX_ERRORCHECK: i32 = 2;

/// Mutex attributes.
///
/// The recursive type is recorded but not enforced: a recursive mutex
/// locked twice by one thread deadlocks like a normal one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MutexAttr {
    kind: i32,
}

impl MutexAttr {
    /// `pthread_mutexattr_init`.
    pub fn init(&mut self) -> i32 {
        self.kind = PTHREAD_MUTEX_NORMAL;
        0
    }

    /// `pthread_mutexattr_settype`. Unknown types yield `EINVAL`.
    pub fn set_type(&mut self, kind: i32) -> i32 {
        match kind {
            PTHREAD_MUTEX_NORMAL | PTHREAD_MUTEX_RECURSIVE | PTHREAD_MUTEX_ERRORCHECK => {
                self.kind = kind;
                0
            }
            _ => EINVAL,
        }
    }

    #[must_use]
    pub fn kind(&self) -> i32 {
        self.kind
    }

    #[must_use]
    pub fn is_recursive(&self) -> bool {
        self.kind == PTHREAD_MUTEX_RECURSIVE
    }

    /// `pthread_mutexattr_destroy`.
    pub fn destroy(&mut self) -> i32 {
        *self = Self::default();
        0
    }
}

/// A `pthread_mutex_t`.
#[derive(Debug, Default)]
pub struct Mutex {
    locked: HostMutex<bool>,
    released: Condvar,
    attr: HostMutex<MutexAttr>,
}

impl Mutex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `pthread_mutex_init`: adopt `attr` (defaults when absent).
    pub fn init(&self, attr: Option<&MutexAttr>) -> i32 {
        *self.attr.lock() = attr.copied().unwrap_or_default();
        0
    }

    /// The attributes recorded at init.
    #[must_use]
    pub fn attr(&self) -> MutexAttr {
        *self.attr.lock()
    }

    /// `pthread_mutex_lock`: block until the mutex is free, then take it.
    pub fn lock(&self) -> i32 {
        let mut locked = self.locked.lock();
        while *locked {
            self.released.wait(&mut locked);
        }
        *locked = true;
        0
    }

    /// `pthread_mutex_trylock`: `EBUSY` if held.
    pub fn try_lock(&self) -> i32 {
        let mut locked = self.locked.lock();
        if *locked {
            return EBUSY;
        }
        *locked = true;
        0
    }

    /// `pthread_mutex_unlock`: `EPERM` if the mutex is not held.
    pub fn unlock(&self) -> i32 {
        let mut locked = self.locked.lock();
        if !*locked {
            return EPERM;
        }
        *locked = false;
        drop(locked);
        self.released.notify_one();
        0
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        *self.locked.lock()
    }

    /// `pthread_mutex_destroy`: `EBUSY` while held.
    pub fn destroy(&self) -> i32 {
        if self.is_locked() {
            return EBUSY;
        }
        *self.attr.lock() = MutexAttr::default();
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn lock_unlock_cycle() {
        let m = Mutex::new();
        assert_eq!(m.init(None), 0);
        assert_eq!(m.lock(), 0);
        assert!(m.is_locked());
        assert_eq!(m.try_lock(), EBUSY);
        assert_eq!(m.destroy(), EBUSY);
        assert_eq!(m.unlock(), 0);
        assert_eq!(m.unlock(), EPERM);
        assert_eq!(m.try_lock(), 0);
        assert_eq!(m.unlock(), 0);
        assert_eq!(m.destroy(), 0);
    }

    #[test]
    fn attr_records_type() {
        let mut attr = MutexAttr::default();
        assert_eq!(attr.init(), 0);
        assert_eq!(attr.set_type(PTHREAD_MUTEX_RECURSIVE), 0);
        assert!(attr.is_recursive());
        assert_eq!(attr.set_type(7), EINVAL);
        assert_eq!(attr.kind(), PTHREAD_MUTEX_RECURSIVE);

        let m = Mutex::new();
        m.init(Some(&attr));
        assert!(m.attr().is_recursive());
        assert_eq!(attr.destroy(), 0);
        assert_eq!(attr.kind(), PTHREAD_MUTEX_NORMAL);
    }

    #[test]
    fn contended_counter() {
        let m = Arc::new(Mutex::new());
        let count = Arc::new(HostMutex::new(0u32));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let m = Arc::clone(&m);
                let count = Arc::clone(&count);
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        m.lock();
                        *count.lock() += 1;
                        m.unlock();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(*count.lock(), 4000);
        assert!(!m.is_locked());
    }
}
