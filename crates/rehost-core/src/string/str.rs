//! String operations on NUL-terminated byte strings.
//!
//! Strings are `&[u8]` slices where the first `0x00` marks the logical end.
//! A slice without a NUL is treated as terminated at its end. Comparisons
//! return a normalized sign (`-1`, `0`, `1`).

use std::cmp::Ordering;

/// Length of a NUL-terminated byte string, not counting the NUL.
///
/// Returns the full slice length if no NUL is present.
pub fn strlen(s: &[u8]) -> usize {
    s.iter().position(|&b| b == 0).unwrap_or(s.len())
}

/// The logical bytes of `s`, up to but excluding the first NUL.
pub fn as_cstr(s: &[u8]) -> &[u8] {
    &s[..strlen(s)]
}

fn sign(ord: Ordering) -> i32 {
    ord as i32
}

fn lowered(s: &[u8]) -> impl Iterator<Item = u8> + '_ {
    s.iter().map(u8::to_ascii_lowercase)
}

/// Lexicographic comparison of two NUL-terminated byte strings.
pub fn strcmp(s1: &[u8], s2: &[u8]) -> i32 {
    sign(as_cstr(s1).cmp(as_cstr(s2)))
}

/// Like [`strcmp`], but considers at most `n` bytes of each string.
pub fn strncmp(s1: &[u8], s2: &[u8], n: usize) -> i32 {
    let a = as_cstr(s1);
    let b = as_cstr(s2);
    sign(a[..n.min(a.len())].cmp(&b[..n.min(b.len())]))
}

/// ASCII case-insensitive [`strcmp`].
pub fn strcasecmp(s1: &[u8], s2: &[u8]) -> i32 {
    sign(lowered(as_cstr(s1)).cmp(lowered(as_cstr(s2))))
}

/// ASCII case-insensitive [`strncmp`].
pub fn strncasecmp(s1: &[u8], s2: &[u8], n: usize) -> i32 {
    let a = as_cstr(s1);
    let b = as_cstr(s2);
    sign(lowered(&a[..n.min(a.len())]).cmp(lowered(&b[..n.min(b.len())])))
}

/// Copies a NUL-terminated string from `src` into `dest`, including the NUL.
///
/// Returns the number of bytes written (string length plus one).
///
/// # Panics
///
/// Panics if `dest` is too small to hold the source string plus NUL.
pub fn strcpy(dest: &mut [u8], src: &[u8]) -> usize {
    let src_len = strlen(src);
    assert!(
        dest.len() > src_len,
        "strcpy: destination buffer too small ({} bytes for {} byte string + NUL)",
        dest.len(),
        src_len
    );
    dest[..src_len].copy_from_slice(&src[..src_len]);
    dest[src_len] = 0;
    src_len + 1
}

/// Copies at most `n` bytes from `src` into `dest`.
///
/// If `src` is shorter than `n`, the rest of the first `n` bytes of `dest`
/// is zero-filled. If `src` is `n` bytes or longer, no terminator is
/// written.
///
/// Returns the number of bytes written (`min(n, dest.len())`).
pub fn strncpy(dest: &mut [u8], src: &[u8], n: usize) -> usize {
    let count = n.min(dest.len());
    let copy_len = strlen(src).min(count);
    dest[..copy_len].copy_from_slice(&src[..copy_len]);
    dest[copy_len..count].fill(0);
    count
}

/// Appends `src` to the NUL-terminated string in `dest`.
///
/// Returns the length of the resulting string.
///
/// # Panics
///
/// Panics if `dest` is too small.
pub fn strcat(dest: &mut [u8], src: &[u8]) -> usize {
    strncat(dest, src, usize::MAX)
}

/// Appends at most `n` bytes of `src` to the string in `dest`, then a NUL.
///
/// Returns the length of the resulting string.
///
/// # Panics
///
/// Panics if `dest` is too small.
pub fn strncat(dest: &mut [u8], src: &[u8], n: usize) -> usize {
    let dest_len = strlen(dest);
    let src_len = strlen(src).min(n);
    let total = dest_len + src_len;
    assert!(
        dest.len() > total,
        "strcat: destination buffer too small ({} bytes for {} byte result + NUL)",
        dest.len(),
        total,
    );
    dest[dest_len..total].copy_from_slice(&src[..src_len]);
    dest[total] = 0;
    total
}

/// Index of the first `c` in `s`. Searching for `0` finds the terminator.
pub fn strchr(s: &[u8], c: u8) -> Option<usize> {
    let len = strlen(s);
    if c == 0 {
        return Some(len);
    }
    s[..len].iter().position(|&b| b == c)
}

/// Index of the last `c` in `s`. Searching for `0` finds the terminator.
pub fn strrchr(s: &[u8], c: u8) -> Option<usize> {
    let len = strlen(s);
    if c == 0 {
        return Some(len);
    }
    s[..len].iter().rposition(|&b| b == c)
}

/// Index where `needle` first occurs in `haystack`.
///
/// An empty needle matches at 0.
pub fn strstr(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    let haystack = as_cstr(haystack);
    let needle = as_cstr(needle);
    if needle.is_empty() {
        return Some(0);
    }
    if needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Length of the initial run of `s` made only of bytes in `accept`.
pub fn strspn(s: &[u8], accept: &[u8]) -> usize {
    let accept = as_cstr(accept);
    as_cstr(s)
        .iter()
        .take_while(|b| accept.contains(b))
        .count()
}

/// Length of the initial run of `s` made only of bytes not in `reject`.
pub fn strcspn(s: &[u8], reject: &[u8]) -> usize {
    let reject = as_cstr(reject);
    as_cstr(s)
        .iter()
        .take_while(|b| !reject.contains(b))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strlen() {
        assert_eq!(strlen(b"hello\0"), 5);
        assert_eq!(strlen(b"\0"), 0);
        assert_eq!(strlen(b"ab\0cd\0"), 2);
        assert_eq!(strlen(b"abc"), 3);
    }

    #[test]
    fn test_strcmp_sign_is_normalized() {
        assert_eq!(strcmp(b"abc\0", b"abc\0"), 0);
        assert_eq!(strcmp(b"abc\0", b"abz\0"), -1);
        assert_eq!(strcmp(b"b\0", b"a\0"), 1);
        assert_eq!(strcmp(b"ab\0", b"abc\0"), -1);
        assert_eq!(strcmp(b"abc\0junk", b"abc\0other"), 0);
    }

    #[test]
    fn test_strncmp_limits() {
        assert_eq!(strncmp(b"abcdef\0", b"abcxyz\0", 3), 0);
        assert_eq!(strncmp(b"abcdef\0", b"abcxyz\0", 4), -1);
        assert_eq!(strncmp(b"ab\0", b"abc\0", 5), -1);
        assert_eq!(strncmp(b"x\0", b"y\0", 0), 0);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(strcasecmp(b"HeLLo\0", b"hello\0"), 0);
        assert_eq!(strcasecmp(b"Apple\0", b"banana\0"), -1);
        assert_eq!(strncasecmp(b"ABCd\0", b"abcE\0", 3), 0);
        assert_eq!(strncasecmp(b"ABCd\0", b"abcE\0", 4), -1);
    }

    #[test]
    fn test_strcpy_writes_terminator_only() {
        let mut buf = *b"0000000000\0";
        assert_eq!(strcpy(&mut buf, b"abcded\0"), 7);
        assert_eq!(&buf, b"abcded\x00000\x00");
    }

    #[test]
    #[should_panic(expected = "destination buffer too small")]
    fn test_strcpy_overflow_panics() {
        let mut buf = [0u8; 3];
        strcpy(&mut buf, b"abc\0");
    }

    #[test]
    fn test_strncpy_short_source_pads() {
        let mut buf = *b"XXXXXX";
        assert_eq!(strncpy(&mut buf, b"ab\0", 5), 5);
        assert_eq!(&buf, b"ab\0\0\0X");
    }

    #[test]
    fn test_strncpy_long_source_has_no_terminator() {
        let mut buf = *b"0000000000";
        strncpy(&mut buf, b"abcded\0", 3);
        assert_eq!(&buf, b"abc0000000");
    }

    #[test]
    fn test_strncpy_past_source_zero_fills() {
        let mut buf = *b"0000000000\0";
        strncpy(&mut buf, b"abcded\0", 9);
        assert_eq!(&buf, b"abcded\x00\x00\x000\x00");
    }

    #[test]
    fn test_strcat_and_strncat() {
        let mut buf = *b"1\x00000000000\0";
        assert_eq!(strcat(&mut buf, b"abcded\0"), 7);
        assert_eq!(&buf, b"1abcded\x00000\x00");

        let mut buf = *b"0\x00000000000\0";
        assert_eq!(strncat(&mut buf, b"abcded\0", 3), 4);
        assert_eq!(&buf, b"0abc\x00000000\x00");
    }

    #[test]
    fn test_strchr_family() {
        assert_eq!(strchr(b"hello\0", b'l'), Some(2));
        assert_eq!(strchr(b"hello\0", b'z'), None);
        assert_eq!(strchr(b"hello\0", 0), Some(5));
        assert_eq!(strrchr(b"hello\0", b'l'), Some(3));
    }

    #[test]
    fn test_strstr() {
        assert_eq!(strstr(b"123abc\0", b"3a\0"), Some(2));
        assert_eq!(strstr(b"123abc\0", b"\0"), Some(0));
        assert_eq!(strstr(b"123abc\0", b"cd\0"), None);
        assert_eq!(strstr(b"ab\0", b"abc\0"), None);
    }

    #[test]
    fn test_spans() {
        assert_eq!(strspn(b"123abc\0", b"0123456789\0"), 3);
        assert_eq!(strspn(b"abc\0", b"0123456789\0"), 0);
        assert_eq!(strcspn(b"123abc\0", b"cba\0"), 3);
        assert_eq!(strcspn(b"123\0", b"x\0"), 3);
    }
}
