//! Sorting and searching.
//!
//! The index-based forms drive callers whose elements live outside a Rust
//! slice; the comparator and swap only ever see element indices.

use std::cmp::Ordering;

// ---------------------------------------------------------------------------
// Index-based
// ---------------------------------------------------------------------------

/// Heapsort over `n` elements addressed by index.
///
/// `compare(i, j)` returns <0, 0 or >0 like a C comparator. Not stable.
pub fn sort_by_index(
    n: usize,
    mut compare: impl FnMut(usize, usize) -> i32,
    mut swap: impl FnMut(usize, usize),
) {
    if n < 2 {
        return;
    }
    for start in (0..n / 2).rev() {
        sift_down(start, n, &mut compare, &mut swap);
    }
    for end in (1..n).rev() {
        swap(0, end);
        sift_down(0, end, &mut compare, &mut swap);
    }
}

fn sift_down(
    mut root: usize,
    end: usize,
    compare: &mut impl FnMut(usize, usize) -> i32,
    swap: &mut impl FnMut(usize, usize),
) {
    loop {
        let mut child = 2 * root + 1;
        if child >= end {
            return;
        }
        if child + 1 < end && compare(child, child + 1) < 0 {
            child += 1;
        }
        if compare(root, child) >= 0 {
            return;
        }
        swap(root, child);
        root = child;
    }
}

/// Binary search over `n` sorted elements.
///
/// `compare_key(i)` compares the key against element `i`. Among equal
/// elements the last one is found.
pub fn search_by_index(n: usize, mut compare_key: impl FnMut(usize) -> i32) -> Option<usize> {
    // First index whose element is greater than the key.
    let (mut lo, mut hi) = (0usize, n);
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if compare_key(mid) < 0 {
            hi = mid;
        } else {
            lo = mid + 1;
        }
    }
    let last = lo.checked_sub(1)?;
    (compare_key(last) == 0).then_some(last)
}

// ---------------------------------------------------------------------------
// Slice-based
// ---------------------------------------------------------------------------

/// `qsort` over `base` viewed as elements of `width` bytes.
///
/// Trailing bytes that do not fill an element are left in place.
pub fn qsort<F>(base: &mut [u8], width: usize, compare: F)
where
    F: Fn(&[u8], &[u8]) -> i32,
{
    if width == 0 {
        return;
    }
    let n = base.len() / width;
    let mut tmp = vec![0u8; width];
    let cell = std::cell::RefCell::new(base);
    sort_by_index(
        n,
        |i, j| {
            let b = cell.borrow();
            compare(&b[i * width..(i + 1) * width], &b[j * width..(j + 1) * width])
        },
        |i, j| {
            let mut b = cell.borrow_mut();
            tmp.copy_from_slice(&b[i * width..(i + 1) * width]);
            b.copy_within(j * width..(j + 1) * width, i * width);
            b[j * width..(j + 1) * width].copy_from_slice(&tmp);
        },
    );
}

/// `bsearch` over sorted `base`; returns the matching element's index.
pub fn bsearch<F>(key: &[u8], base: &[u8], width: usize, compare: F) -> Option<usize>
where
    F: Fn(&[u8], &[u8]) -> i32,
{
    if width == 0 {
        return None;
    }
    search_by_index(base.len() / width, |i| {
        compare(key, &base[i * width..(i + 1) * width])
    })
}

/// C comparator result for an [`Ordering`].
#[must_use]
pub fn ordering_to_int(ord: Ordering) -> i32 {
    ord as i32
}
