//! GCC `__sync_fetch_and_*` builtins over 32-bit integers.
//!
//! Each returns the value held before the operation.

use std::sync::atomic::{AtomicI32, Ordering};

/// `__sync_fetch_and_add`.
pub fn fetch_and_add(p: &AtomicI32, v: i32) -> i32 {
    let new = p.fetch_add(v, Ordering::SeqCst).wrapping_add(v);
    new.wrapping_sub(v)
}

/// `__sync_fetch_and_sub`.
pub fn fetch_and_sub(p: &AtomicI32, v: i32) -> i32 {
    let new = p.fetch_sub(v, Ordering::SeqCst).wrapping_sub(v);
    new.wrapping_add(v)
}

pub fn fetch_and_or(p: &AtomicI32, v: i32) -> i32 {
    update(p, |old| old | v)
}

pub fn fetch_and_and(p: &AtomicI32, v: i32) -> i32 {
    update(p, |old| old & v)
}

pub fn fetch_and_xor(p: &AtomicI32, v: i32) -> i32 {
    update(p, |old| old ^ v)
}

/// `__sync_fetch_and_nand`: stores `!(old & v)`.
pub fn fetch_and_nand(p: &AtomicI32, v: i32) -> i32 {
    update(p, |old| !(old & v))
}

fn update(p: &AtomicI32, op: impl Fn(i32) -> i32) -> i32 {
    let mut old = p.load(Ordering::SeqCst);
    loop {
        match p.compare_exchange_weak(old, op(old), Ordering::SeqCst, Ordering::SeqCst) {
            Ok(prev) => return prev,
            Err(seen) => old = seen,
        }
    }
}
