//! Padded-buffer address space.
//!
//! Every allocation is an owned, zero-initialized host buffer laid out as
//! `[pad | span | pad]`. The buffer is registered under a virtual address
//! range handed out by a bump counter, so addresses are never reused and two
//! live regions can never overlap. Re-hosted code only ever sees the address
//! of the first span byte.
//!
//! Accesses are resolved by finding the region whose padded range contains
//! the address. Reads and writes that stay inside the padded buffer succeed
//! (this is the tolerated overrun); anything past it is a fault and panics.
//!
//! Thread-safe via a single `parking_lot::RwLock` over an ordered map.

use std::collections::BTreeMap;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;

use crate::metrics::global_metrics;
use crate::ptr::Ptr;

/// First virtual address handed out. Keeps small integers from ever
/// resolving to a live region.
const BASE_ADDR: usize = 0x0001_0000;

/// Region start alignment.
const REGION_ALIGN: usize = 16;

/// Unmapped bytes between consecutive regions.
const GUARD_GAP: usize = 64;

struct Region {
    buf: Box<[u8]>,
    pad: usize,
    size: usize,
}

impl Region {
    fn pad_touched(&self) -> bool {
        let tail = self.pad + self.size;
        self.buf[..self.pad].iter().any(|&b| b != 0) || self.buf[tail..].iter().any(|&b| b != 0)
    }
}

/// Description of one live allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allocation {
    /// Address of the first span byte.
    pub base: Ptr,
    /// Requested span length.
    pub size: usize,
    /// Slack bytes on each side of the span.
    pub pad: usize,
}

impl Allocation {
    /// Lowest address backed by this allocation (start of the leading pad).
    #[must_use]
    pub fn padded_start(&self) -> usize {
        self.base.addr() - self.pad
    }

    /// One past the highest address backed by this allocation.
    #[must_use]
    pub fn padded_end(&self) -> usize {
        self.base.addr() + self.size + self.pad
    }
}

/// Outcome of [`AddressSpace::release`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreeResult {
    /// The base address of a live allocation; the region is gone.
    Freed { size: usize },
    /// The address is not inside any live region.
    Foreign,
    /// The address is inside a live region but is not its base.
    Interior { base: Ptr },
}

/// Thread-safe table of padded buffers keyed by virtual address.
pub struct AddressSpace {
    regions: RwLock<BTreeMap<usize, Region>>,
    next: AtomicUsize,
}

impl AddressSpace {
    /// Create an empty address space.
    #[must_use]
    pub fn new() -> Self {
        Self {
            regions: RwLock::new(BTreeMap::new()),
            next: AtomicUsize::new(BASE_ADDR),
        }
    }

    /// Allocate `size` zeroed bytes with `pad` slack bytes on each side.
    ///
    /// Returns the address of the first span byte.
    ///
    /// # Panics
    ///
    /// Panics if the padded length does not fit in the address space.
    pub fn allocate(&self, size: usize, pad: usize) -> Ptr {
        let total = pad
            .checked_mul(2)
            .and_then(|p| p.checked_add(size))
            .unwrap_or_else(|| panic!("allocation of {size} bytes overflows the address space"));
        let stride = total
            .checked_add(GUARD_GAP + REGION_ALIGN - 1)
            .map(|s| s & !(REGION_ALIGN - 1))
            .unwrap_or_else(|| panic!("allocation of {size} bytes overflows the address space"));
        let raw = self.next.fetch_add(stride, Ordering::Relaxed);

        let region = Region {
            buf: vec![0u8; total].into_boxed_slice(),
            pad,
            size,
        };
        self.regions.write().insert(raw, region);

        let m = global_metrics();
        m.allocations.fetch_add(1, Ordering::Relaxed);
        m.live_bytes.fetch_add(size as u64, Ordering::Relaxed);
        Ptr::from_addr(raw + pad)
    }

    /// Release the allocation whose base is `ptr`.
    ///
    /// Interior and foreign addresses are reported, not acted on.
    pub fn release(&self, ptr: Ptr) -> FreeResult {
        let mut map = self.regions.write();
        let found = locate(&map, ptr.addr()).map(|(raw, r)| (raw, raw + r.pad));
        let Some((raw, base)) = found else {
            drop(map);
            global_metrics().foreign_frees.fetch_add(1, Ordering::Relaxed);
            return FreeResult::Foreign;
        };
        if base != ptr.addr() {
            return FreeResult::Interior {
                base: Ptr::from_addr(base),
            };
        }
        let Some(region) = map.remove(&raw) else {
            return FreeResult::Foreign;
        };
        drop(map);

        let m = global_metrics();
        m.frees.fetch_add(1, Ordering::Relaxed);
        m.live_bytes.fetch_sub(region.size as u64, Ordering::Relaxed);
        if region.pad_touched() {
            m.pad_writes.fetch_add(1, Ordering::Relaxed);
        }
        FreeResult::Freed { size: region.size }
    }

    /// The live allocation whose base is exactly `ptr`.
    #[must_use]
    pub fn allocation(&self, ptr: Ptr) -> Option<Allocation> {
        self.containing(ptr).filter(|a| a.base == ptr)
    }

    /// The live allocation whose padded range contains `ptr`.
    #[must_use]
    pub fn containing(&self, ptr: Ptr) -> Option<Allocation> {
        let map = self.regions.read();
        locate(&map, ptr.addr()).map(|(raw, r)| Allocation {
            base: Ptr::from_addr(raw + r.pad),
            size: r.size,
            pad: r.pad,
        })
    }

    /// Bytes addressable from `ptr` to the end of its padded buffer.
    #[must_use]
    pub fn remaining(&self, ptr: Ptr) -> Option<usize> {
        let map = self.regions.read();
        locate(&map, ptr.addr()).map(|(raw, r)| raw + r.buf.len() - ptr.addr())
    }

    /// Number of live allocations.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.regions.read().len()
    }

    /// All live allocations in address order.
    #[must_use]
    pub fn live(&self) -> Vec<Allocation> {
        self.regions
            .read()
            .iter()
            .map(|(&raw, r)| Allocation {
                base: Ptr::from_addr(raw + r.pad),
                size: r.size,
                pad: r.pad,
            })
            .collect()
    }

    // -----------------------------------------------------------------------
    // Access
    // -----------------------------------------------------------------------

    /// Run `f` over `len` bytes starting at `ptr`.
    ///
    /// `f` must not call back into this address space.
    ///
    /// # Panics
    ///
    /// Panics if the range is not inside one padded buffer.
    pub fn with_bytes<R>(&self, ptr: Ptr, len: usize, f: impl FnOnce(&[u8]) -> R) -> R {
        if len == 0 {
            return f(&[]);
        }
        let map = self.regions.read();
        let Some((raw, region)) = locate(&map, ptr.addr()) else {
            fault("read", ptr, len);
        };
        let off = ptr.addr() - raw;
        if off + len > region.buf.len() {
            fault("read", ptr, len);
        }
        f(&region.buf[off..off + len])
    }

    /// Run `f` over `len` mutable bytes starting at `ptr`.
    ///
    /// `f` must not call back into this address space.
    ///
    /// # Panics
    ///
    /// Panics if the range is not inside one padded buffer.
    pub fn with_bytes_mut<R>(&self, ptr: Ptr, len: usize, f: impl FnOnce(&mut [u8]) -> R) -> R {
        if len == 0 {
            return f(&mut []);
        }
        let mut map = self.regions.write();
        let Some((raw, region)) = locate_mut(&mut map, ptr.addr()) else {
            fault("write", ptr, len);
        };
        let off = ptr.addr() - raw;
        if off + len > region.buf.len() {
            fault("write", ptr, len);
        }
        f(&mut region.buf[off..off + len])
    }

    /// Copy `len` bytes out of the space.
    #[must_use]
    pub fn read(&self, ptr: Ptr, len: usize) -> Vec<u8> {
        self.with_bytes(ptr, len, <[u8]>::to_vec)
    }

    /// Copy `data` into the space at `ptr`.
    pub fn write(&self, ptr: Ptr, data: &[u8]) {
        self.with_bytes_mut(ptr, data.len(), |dst| dst.copy_from_slice(data));
    }

    /// Set `len` bytes at `ptr` to `byte`.
    pub fn fill(&self, ptr: Ptr, byte: u8, len: usize) {
        self.with_bytes_mut(ptr, len, |dst| dst.fill(byte));
    }

    /// Copy `len` bytes from `src` to `dst`. Overlapping ranges behave as if
    /// staged through a temporary buffer.
    pub fn copy(&self, dst: Ptr, src: Ptr, len: usize) {
        if len == 0 {
            return;
        }
        let tmp = self.read(src, len);
        self.write(dst, &tmp);
    }

    /// Offset of the first zero byte at or after `ptr`. Null scans as empty.
    ///
    /// # Panics
    ///
    /// Panics if no zero byte exists before the end of the padded buffer.
    #[must_use]
    pub fn scan_nul(&self, ptr: Ptr) -> usize {
        if ptr.is_null() {
            return 0;
        }
        let map = self.regions.read();
        let found = locate(&map, ptr.addr()).and_then(|(raw, region)| {
            let off = ptr.addr() - raw;
            region.buf[off..].iter().position(|&b| b == 0)
        });
        drop(map);
        found.unwrap_or_else(|| fault("string scan", ptr, 1))
    }

    /// Number of 2-byte units before the first zero unit at or after `ptr`.
    ///
    /// # Panics
    ///
    /// Panics if no zero unit exists before the end of the padded buffer.
    #[must_use]
    pub fn scan_nul_wide(&self, ptr: Ptr) -> usize {
        if ptr.is_null() {
            return 0;
        }
        let map = self.regions.read();
        let found = locate(&map, ptr.addr()).and_then(|(raw, region)| {
            let off = ptr.addr() - raw;
            region.buf[off..]
                .chunks_exact(2)
                .position(|unit| unit == [0, 0])
        });
        drop(map);
        found.unwrap_or_else(|| fault("wide string scan", ptr, 2))
    }

    /// A bounded view of `len` bytes at `ptr`. No copy is made.
    #[must_use]
    pub fn span(&self, ptr: Ptr, len: usize) -> Span<'_> {
        Span {
            space: self,
            ptr,
            len,
        }
    }
}

impl Default for AddressSpace {
    fn default() -> Self {
        Self::new()
    }
}

fn locate(map: &BTreeMap<usize, Region>, addr: usize) -> Option<(usize, &Region)> {
    let (&raw, region) = map.range(..=addr).next_back()?;
    (addr < raw + region.buf.len()).then_some((raw, region))
}

fn locate_mut(map: &mut BTreeMap<usize, Region>, addr: usize) -> Option<(usize, &mut Region)> {
    let (&raw, region) = map.range_mut(..=addr).next_back()?;
    (addr < raw + region.buf.len()).then_some((raw, region))
}

fn fault(op: &str, ptr: Ptr, len: usize) -> ! {
    global_metrics().faults.fetch_add(1, Ordering::Relaxed);
    panic!("{op} of {len} bytes at {ptr} is outside any live allocation");
}

// ---------------------------------------------------------------------------
// Span
// ---------------------------------------------------------------------------

/// A length-bounded view over live memory.
///
/// Reads and writes go to the backing buffer, so mutations through the view
/// are visible through the original address and vice versa.
#[derive(Clone, Copy)]
pub struct Span<'a> {
    space: &'a AddressSpace,
    ptr: Ptr,
    len: usize,
}

impl Span<'_> {
    #[must_use]
    pub fn ptr(&self) -> Ptr {
        self.ptr
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Byte at index `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= len`.
    #[must_use]
    pub fn get(&self, i: usize) -> u8 {
        assert!(i < self.len, "span index {i} out of range for length {}", self.len);
        self.space.with_bytes(self.ptr.add(i), 1, |b| b[0])
    }

    /// Store `byte` at index `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= len`.
    pub fn set(&self, i: usize, byte: u8) {
        assert!(i < self.len, "span index {i} out of range for length {}", self.len);
        self.space.with_bytes_mut(self.ptr.add(i), 1, |b| b[0] = byte);
    }

    /// Narrow the view to `len` bytes.
    #[must_use]
    pub fn truncate(self, len: usize) -> Self {
        Self {
            len: self.len.min(len),
            ..self
        }
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<u8> {
        self.space.read(self.ptr, self.len)
    }

    pub fn with<R>(&self, f: impl FnOnce(&[u8]) -> R) -> R {
        self.space.with_bytes(self.ptr, self.len, f)
    }

    pub fn with_mut<R>(&self, f: impl FnOnce(&mut [u8]) -> R) -> R {
        self.space.with_bytes_mut(self.ptr, self.len, f)
    }
}

impl std::fmt::Debug for Span<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Span")
            .field("ptr", &self.ptr)
            .field("len", &self.len)
            .finish()
    }
}

/// Process-wide address space shared by every runtime entry point.
pub fn global_space() -> &'static AddressSpace {
    static SPACE: OnceLock<AddressSpace> = OnceLock::new();
    SPACE.get_or_init(AddressSpace::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ptr::WORD_SIZE;

    #[test]
    fn allocation_is_zeroed_and_exact() {
        let space = AddressSpace::new();
        let p = space.allocate(10, WORD_SIZE);
        let a = space.allocation(p).unwrap();
        assert_eq!(a.size, 10);
        assert_eq!(a.pad, WORD_SIZE);
        assert_eq!(space.read(p, 10), vec![0; 10]);
    }

    #[test]
    fn pad_absorbs_small_overruns() {
        let space = AddressSpace::new();
        let p = space.allocate(4, WORD_SIZE);
        space.write(p.offset(-1), &[0xAA]);
        space.write(p.add(4), &[0xBB; WORD_SIZE]);
        assert_eq!(space.read(p, 4), vec![0; 4]);
        assert_eq!(space.read(p.add(4), 1), vec![0xBB]);
    }

    #[test]
    #[should_panic(expected = "outside any live allocation")]
    fn access_past_pad_faults() {
        let space = AddressSpace::new();
        let p = space.allocate(4, 2);
        let _ = space.read(p, 7);
    }

    #[test]
    #[should_panic(expected = "outside any live allocation")]
    fn access_to_unmapped_address_faults() {
        let space = AddressSpace::new();
        let _ = space.read(Ptr::from_addr(0x10), 1);
    }

    #[test]
    fn release_classifies_addresses() {
        let space = AddressSpace::new();
        let p = space.allocate(16, WORD_SIZE);
        assert_eq!(
            space.release(p.add(3)),
            FreeResult::Interior { base: p }
        );
        assert_eq!(space.release(Ptr::from_addr(0x42)), FreeResult::Foreign);
        assert_eq!(space.release(p), FreeResult::Freed { size: 16 });
        assert_eq!(space.release(p), FreeResult::Foreign);
        assert!(space.allocation(p).is_none());
    }

    #[test]
    fn addresses_are_never_reused() {
        let space = AddressSpace::new();
        let a = space.allocate(8, WORD_SIZE);
        assert!(matches!(space.release(a), FreeResult::Freed { .. }));
        let b = space.allocate(8, WORD_SIZE);
        assert_ne!(a, b);
    }

    #[test]
    fn copy_handles_overlap() {
        let space = AddressSpace::new();
        let p = space.allocate(6, WORD_SIZE);
        space.write(p, b"abcdef");
        space.copy(p.add(2), p, 4);
        assert_eq!(space.read(p, 6), b"ababcd");
    }

    #[test]
    fn scan_stops_at_first_zero() {
        let space = AddressSpace::new();
        let p = space.allocate(8, WORD_SIZE);
        space.write(p, b"abc\0def");
        assert_eq!(space.scan_nul(p), 3);
        assert_eq!(space.scan_nul(p.add(4)), 3);
        assert_eq!(space.scan_nul(Ptr::NULL), 0);
    }

    #[test]
    fn wide_scan_counts_units() {
        let space = AddressSpace::new();
        let p = space.allocate(8, WORD_SIZE);
        space.write(p, &[b'h', 0, b'i', 0, 0, 0]);
        assert_eq!(space.scan_nul_wide(p), 2);
    }

    #[test]
    fn span_aliases_backing_memory() {
        let space = AddressSpace::new();
        let p = space.allocate(3, WORD_SIZE);
        space.write(p, b"xyz");
        let view = space.span(p, 3);
        view.set(1, b'Y');
        assert_eq!(space.read(p, 3), b"xYz");
        assert_eq!(view.get(2), b'z');
        assert_eq!(view.truncate(1).to_vec(), b"x");
    }

    #[test]
    fn remaining_counts_to_padded_end() {
        let space = AddressSpace::new();
        let p = space.allocate(4, 8);
        assert_eq!(space.remaining(p), Some(12));
        assert_eq!(space.remaining(p.add(11)), Some(1));
        assert_eq!(space.remaining(p.add(12)), None);
    }
}
