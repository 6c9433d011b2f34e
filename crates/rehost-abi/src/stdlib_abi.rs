//! `<stdlib.h>` entry points over opaque addresses.
//!
//! Comparators receive element addresses, as C comparators do.

use parking_lot::Mutex;
use rehost_core::stdlib::{self as core_stdlib, Rng, search_by_index, sort_by_index};
use rehost_membrane::{Ptr, global_space};

use crate::string_abi::cstr_bytes;

pub use rehost_core::stdlib::{RAND_MAX, bool_to_int};

static RNG: Mutex<Rng> = Mutex::new(Rng::new(1));

/// Sorts `num` elements of `size` bytes at `base` in place.
pub fn qsort(base: Ptr, num: usize, size: usize, mut compar: impl FnMut(Ptr, Ptr) -> i32) {
    if num < 2 || size == 0 {
        return;
    }
    let space = global_space();
    let at = |i: usize| base.add(i * size);
    sort_by_index(
        num,
        |i, j| compar(at(i), at(j)),
        |i, j| {
            if i == j {
                return;
            }
            let a = space.read(at(i), size);
            let b = space.read(at(j), size);
            space.write(at(i), &b);
            space.write(at(j), &a);
        },
    );
}

/// Finds `key` among `num` sorted elements at `base`. Null if absent.
pub fn bsearch(
    key: Ptr,
    base: Ptr,
    num: usize,
    size: usize,
    mut compar: impl FnMut(Ptr, Ptr) -> i32,
) -> Ptr {
    search_by_index(num, |i| compar(key, base.add(i * size))).map_or(Ptr::NULL, |i| base.add(i * size))
}

#[must_use]
pub fn atoi(s: Ptr) -> i64 {
    core_stdlib::atoi(&cstr_bytes(s))
}

#[must_use]
pub fn atof(s: Ptr) -> f64 {
    core_stdlib::atof(&cstr_bytes(s))
}

/// Next pseudo-random value in `0..=RAND_MAX`.
pub fn rand() -> i32 {
    RNG.lock().next_rand()
}

pub fn srand(seed: u32) {
    RNG.lock().seed(seed);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::string_abi::{c_string, load_i32, store_i32};

    fn ints(values: &[i32]) -> Ptr {
        let p = global_space().allocate(values.len() * 4, 0);
        for (i, v) in values.iter().enumerate() {
            store_i32(p.add(i * 4), *v);
        }
        p
    }

    fn by_value(a: Ptr, b: Ptr) -> i32 {
        load_i32(a).cmp(&load_i32(b)) as i32
    }

    #[test]
    fn qsort_then_bsearch() {
        let values = [9, -3, 4, 4, 0, 12, -7];
        let base = ints(&values);
        qsort(base, values.len(), 4, by_value);
        let sorted: Vec<i32> = (0..values.len()).map(|i| load_i32(base.add(i * 4))).collect();
        assert_eq!(sorted, [-7, -3, 0, 4, 4, 9, 12]);

        let key = ints(&[9]);
        assert_eq!(bsearch(key, base, values.len(), 4, by_value), base.add(20));
        let missing = ints(&[5]);
        assert!(bsearch(missing, base, values.len(), 4, by_value).is_null());
    }

    #[test]
    fn numeric_conversions() {
        assert_eq!(atoi(c_string("-123")), -123);
        assert_eq!(atoi(c_string("12ab")), 0);
        assert!((atof(c_string("2.5")) - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn rand_stays_in_range() {
        for _ in 0..100 {
            let r = rand();
            assert!((0..=RAND_MAX).contains(&r));
        }
    }
}
