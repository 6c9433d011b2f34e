//! Memory operations: memcpy, memmove, memset, memcmp, memchr, memrchr.
//!
//! These operate on explicit-length byte slices. Callers resolve addresses
//! and declared lengths before reaching this module.

/// Copies `n` bytes from `src` to `dest`.
///
/// Only copies `min(n, src.len(), dest.len())` bytes and returns that count.
pub fn memcpy(dest: &mut [u8], src: &[u8], n: usize) -> usize {
    let count = n.min(dest.len()).min(src.len());
    dest[..count].copy_from_slice(&src[..count]);
    count
}

/// Moves `n` bytes inside one buffer from offset `src` to offset `dest`.
///
/// Overlapping ranges are handled. Returns the number of bytes moved.
pub fn memmove(buf: &mut [u8], dest: usize, src: usize, n: usize) -> usize {
    let limit = buf.len().saturating_sub(dest.max(src));
    let count = n.min(limit);
    buf.copy_within(src..src + count, dest);
    count
}

/// Fills the first `n` bytes of `dest` with `value`.
pub fn memset(dest: &mut [u8], value: u8, n: usize) -> usize {
    let count = n.min(dest.len());
    dest[..count].fill(value);
    count
}

/// Compares the first `n` bytes of `a` and `b` as unsigned bytes.
///
/// Returns `-1`, `0` or `1`.
pub fn memcmp(a: &[u8], b: &[u8], n: usize) -> i32 {
    let count = n.min(a.len()).min(b.len());
    a[..count].cmp(&b[..count]) as i32
}

/// Index of the first `needle` within the first `n` bytes of `haystack`.
pub fn memchr(haystack: &[u8], needle: u8, n: usize) -> Option<usize> {
    let count = n.min(haystack.len());
    haystack[..count].iter().position(|&b| b == needle)
}

/// Index of the last `needle` within the first `n` bytes of `haystack`.
pub fn memrchr(haystack: &[u8], needle: u8, n: usize) -> Option<usize> {
    let count = n.min(haystack.len());
    haystack[..count].iter().rposition(|&b| b == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memcpy_partial() {
        let src = b"hello world";
        let mut dest = [0u8; 5];
        assert_eq!(memcpy(&mut dest, src, 5), 5);
        assert_eq!(&dest, b"hello");
    }

    #[test]
    fn test_memmove_overlapping_forward() {
        let mut buf = *b"abcdef\0\0";
        assert_eq!(memmove(&mut buf, 2, 0, 6), 6);
        assert_eq!(&buf, b"ababcdef");
    }

    #[test]
    fn test_memmove_overlapping_backward() {
        let mut buf = *b"xxabcdef";
        memmove(&mut buf, 0, 2, 6);
        assert_eq!(&buf[..6], b"abcdef");
    }

    #[test]
    fn test_memset_partial() {
        let mut buf = [0u8; 8];
        memset(&mut buf, b'X', 3);
        assert_eq!(&buf, b"XXX\0\0\0\0\0");
    }

    #[test]
    fn test_memcmp_sign() {
        assert_eq!(memcmp(b"abc", b"abc", 3), 0);
        assert_eq!(memcmp(b"abc", b"abd", 3), -1);
        assert_eq!(memcmp(b"abd", b"abc", 3), 1);
        assert_eq!(memcmp(b"\xff", b"\x01", 1), 1);
        assert_eq!(memcmp(b"abX", b"abY", 2), 0);
    }

    #[test]
    fn test_memchr_and_memrchr() {
        assert_eq!(memchr(b"hello", b'l', 5), Some(2));
        assert_eq!(memchr(b"hello", b'o', 4), None);
        assert_eq!(memrchr(b"hello", b'l', 5), Some(3));
        assert_eq!(memrchr(b"hello", b'z', 5), None);
    }
}
