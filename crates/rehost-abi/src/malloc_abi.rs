//! `malloc`, `calloc`, `realloc`, `free`.
//!
//! Every buffer carries slack bytes on both sides of its span so that code
//! reading one element past the end does not fault. `malloc` pads with one
//! pointer width, `calloc` with one element.

use std::sync::atomic::Ordering;

use rehost_membrane::{FreeResult, Ptr, WORD_SIZE, global_metrics, global_space};

fn checked_size(func: &str, size: isize) -> usize {
    match usize::try_from(size) {
        Ok(n) if n > 0 => n,
        _ => panic!("{func}: size should be > 0, got {size}"),
    }
}

/// Allocate `size` zeroed bytes.
///
/// # Panics
///
/// Panics if `size <= 0`.
pub fn malloc(size: isize) -> Ptr {
    let size = checked_size("malloc", size);
    global_space().allocate(size, WORD_SIZE)
}

/// Allocate `num` zeroed elements of `size` bytes. `num == 0` yields null.
///
/// # Panics
///
/// Panics if `size <= 0` for a non-empty request, or on overflow.
pub fn calloc(num: isize, size: isize) -> Ptr {
    if num == 0 {
        return Ptr::NULL;
    }
    let size = checked_size("calloc", size);
    let num = usize::try_from(num).unwrap_or_else(|_| panic!("calloc: negative count {num}"));
    let total = num
        .checked_mul(size)
        .unwrap_or_else(|| panic!("calloc: {num} x {size} overflows"));
    global_space().allocate(total, size)
}

/// Move the allocation at `ptr` into a new buffer of `size` bytes.
///
/// The first `min(old, new)` bytes are preserved. Null behaves as
/// [`malloc`].
///
/// # Panics
///
/// Panics if `size <= 0`, or if `ptr` is not the base of a live allocation.
pub fn realloc(ptr: Ptr, size: isize) -> Ptr {
    if ptr.is_null() {
        return malloc(size);
    }
    let size = checked_size("realloc", size);
    let space = global_space();
    let Some(old) = space.allocation(ptr) else {
        if let Some(inner) = space.containing(ptr) {
            global_metrics().interior_frees.fetch_add(1, Ordering::Relaxed);
            panic!("realloc: {ptr} is inside the allocation at {}", inner.base);
        }
        panic!("realloc: {ptr} was not returned by an allocation function");
    };
    let new = space.allocate(size, WORD_SIZE);
    space.copy(new, ptr, old.size.min(size));
    space.release(ptr);
    global_metrics().reallocs.fetch_add(1, Ordering::Relaxed);
    new
}

/// Release the allocation at `ptr`. Null and unknown addresses are ignored.
///
/// # Panics
///
/// Panics if `ptr` points inside a live allocation but is not its base.
pub fn free(ptr: Ptr) {
    if ptr.is_null() {
        return;
    }
    match global_space().release(ptr) {
        FreeResult::Freed { .. } | FreeResult::Foreign => {}
        FreeResult::Interior { base } => {
            global_metrics().interior_frees.fetch_add(1, Ordering::Relaxed);
            panic!("free: {ptr} is inside the allocation at {base}");
        }
    }
}
