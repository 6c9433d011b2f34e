//! POSIX threads over host primitives.
//!
//! Every operation reports a POSIX-style `i32` status, 0 on success, using
//! the emulated errno numbering.

pub mod atomic;
pub mod cond;
pub mod mutex;
pub mod once;
pub mod thread;

pub use atomic::{
    fetch_and_add, fetch_and_and, fetch_and_nand, fetch_and_or, fetch_and_sub, fetch_and_xor,
};
pub use cond::Cond;
pub use mutex::{Mutex, MutexAttr, PTHREAD_MUTEX_ERRORCHECK, PTHREAD_MUTEX_NORMAL, PTHREAD_MUTEX_RECURSIVE};
pub use once::Once;
pub use thread::Thread;
