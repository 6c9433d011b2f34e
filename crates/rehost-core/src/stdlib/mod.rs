//! Standard library helpers: sorting, numeric conversion, pseudo-random numbers.

pub mod conversion;
pub mod random;
pub mod sort;

pub use conversion::{atof, atoi, bool_to_int};
pub use random::{RAND_MAX, Rng};
pub use sort::{bsearch, qsort, search_by_index, sort_by_index};
