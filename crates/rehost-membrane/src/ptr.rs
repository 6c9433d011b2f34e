//! Opaque addresses handed to re-hosted code.
//!
//! A [`Ptr`] is a plain integer in the runtime's virtual address space. It
//! carries no capacity; bounds come from the [`AddressSpace`](crate::AddressSpace)
//! region that contains it, or from the length a caller declares per call.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Width of a host pointer in bytes. Also the default allocation pad.
pub const WORD_SIZE: usize = std::mem::size_of::<usize>();

/// An opaque address. Arithmetic wraps, like the emulated pointers do.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Ptr(usize);

impl Ptr {
    /// The null address.
    pub const NULL: Self = Self(0);

    #[must_use]
    pub const fn from_addr(addr: usize) -> Self {
        Self(addr)
    }

    #[must_use]
    pub const fn addr(self) -> usize {
        self.0
    }

    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    /// Move forward by `n` bytes.
    #[must_use]
    pub const fn add(self, n: usize) -> Self {
        Self(self.0.wrapping_add(n))
    }

    /// Move by a signed byte offset. Negative offsets step backwards.
    #[must_use]
    pub const fn offset(self, n: isize) -> Self {
        Self(self.0.wrapping_add_signed(n))
    }

    /// `self - base` in bytes.
    #[must_use]
    pub const fn diff(self, base: Self) -> isize {
        self.0.wrapping_sub(base.0) as isize
    }
}

impl From<usize> for Ptr {
    fn from(addr: usize) -> Self {
        Self(addr)
    }
}

impl From<Ptr> for usize {
    fn from(p: Ptr) -> Self {
        p.0
    }
}

impl fmt::Display for Ptr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            f.write_str("(nil)")
        } else {
            write!(f, "{:#x}", self.0)
        }
    }
}

impl fmt::LowerHex for Ptr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}
