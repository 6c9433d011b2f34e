//! String and memory operations.
//!
//! Implements the `<string.h>` and `<wchar.h>` primitives as safe Rust
//! operating on slices.

pub mod mem;
pub mod str;
pub mod strtok;
pub mod wide;

pub use mem::{memchr, memcmp, memcpy, memmove, memrchr, memset};
pub use str::{
    as_cstr, strcasecmp, strcat, strchr, strcmp, strcpy, strcspn, strlen, strncasecmp, strncat,
    strncmp, strncpy, strrchr, strspn, strstr,
};
pub use strtok::{Tokenizer, strtok_r};
pub use wide::{
    from_wide, to_wide, wcscasecmp, wcscat, wcschr, wcscmp, wcscpy, wcslen, wcsncpy, wcstol,
    wide_str,
};
