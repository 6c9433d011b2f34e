//! Wide-character string operations.
//!
//! Wide strings are `u16` slices terminated by a zero unit. Text crosses
//! the host boundary as UTF-16; unpaired surrogates decode to U+FFFD.

use std::cmp::Ordering;

/// Encodes `s` as UTF-16 followed by a zero unit.
#[must_use]
pub fn to_wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

/// Decodes the logical part of a wide string.
#[must_use]
pub fn from_wide(s: &[u16]) -> String {
    char::decode_utf16(wide_str(s).iter().copied())
        .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

/// Length of a zero-terminated wide string in units.
pub fn wcslen(s: &[u16]) -> usize {
    s.iter().position(|&c| c == 0).unwrap_or(s.len())
}

/// The logical units of `s`, up to the first zero.
pub fn wide_str(s: &[u16]) -> &[u16] {
    &s[..wcslen(s)]
}

/// Copies `src` into `dest`, including the terminator.
///
/// Returns the number of units written.
///
/// # Panics
///
/// Panics if `dest` is too small to hold `src` plus the terminator.
pub fn wcscpy(dest: &mut [u16], src: &[u16]) -> usize {
    let src_len = wcslen(src);
    assert!(
        dest.len() > src_len,
        "wcscpy: destination buffer too small ({} units for {} unit string + NUL)",
        dest.len(),
        src_len
    );
    dest[..src_len].copy_from_slice(&src[..src_len]);
    dest[src_len] = 0;
    src_len + 1
}

/// Copies at most `n` units, zero-filling the rest of the first `n`.
///
/// No terminator is written when `src` has `n` or more units.
///
/// # Panics
///
/// Panics if `dest` is smaller than `n`.
pub fn wcsncpy(dest: &mut [u16], src: &[u16], n: usize) {
    assert!(
        dest.len() >= n,
        "wcsncpy: destination buffer too small ({} units for request {})",
        dest.len(),
        n
    );
    let copy_len = wcslen(src).min(n);
    dest[..copy_len].copy_from_slice(&src[..copy_len]);
    dest[copy_len..n].fill(0);
}

/// Index of the first unit equal to `ch`.
///
/// # Panics
///
/// Panics if `ch` is not a 16-bit unit.
pub fn wcschr(s: &[u16], ch: i64) -> Option<usize> {
    let unit = u16::try_from(ch).unwrap_or_else(|_| panic!("wcschr: character {ch} out of range"));
    wide_str(s).iter().position(|&c| c == unit)
}

/// Appends `src` to the wide string in `dest`.
///
/// Returns the length of the result.
///
/// # Panics
///
/// Panics if `dest` is too small.
pub fn wcscat(dest: &mut [u16], src: &[u16]) -> usize {
    let dest_len = wcslen(dest);
    let src = wide_str(src);
    let total = dest_len + src.len();
    assert!(
        dest.len() > total,
        "wcscat: destination buffer too small ({} units for {} unit result + NUL)",
        dest.len(),
        total
    );
    dest[dest_len..total].copy_from_slice(src);
    dest[total] = 0;
    total
}

fn chars(s: &[u16]) -> impl Iterator<Item = char> + '_ {
    char::decode_utf16(wide_str(s).iter().copied()).map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
}

/// Compares two wide strings by code point. Returns `-1`, `0` or `1`.
pub fn wcscmp(a: &[u16], b: &[u16]) -> i32 {
    chars(a).cmp(chars(b)) as i32
}

/// Case-insensitive [`wcscmp`] using full Unicode lowercasing.
pub fn wcscasecmp(a: &[u16], b: &[u16]) -> i32 {
    let cmp: Ordering = chars(a)
        .flat_map(char::to_lowercase)
        .cmp(chars(b).flat_map(char::to_lowercase));
    cmp as i32
}

/// Parses a wide string as a 32-bit signed integer.
///
/// The whole string must be a number: an optional sign, then digits in
/// `base`. Base 0 picks the base from a `0x`, `0o`, `0b` or `0` prefix.
/// Any error (bad digit, overflow, bad base) yields 0.
pub fn wcstol(s: &[u16], base: u32) -> i32 {
    parse_i32(&from_wide(s), base).unwrap_or(0)
}

fn parse_i32(text: &str, base: u32) -> Option<i32> {
    let (negative, rest) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let (radix, digits) = if base == 0 {
        let lower = rest.to_ascii_lowercase();
        if lower.starts_with("0x") {
            (16, &rest[2..])
        } else if lower.starts_with("0o") {
            (8, &rest[2..])
        } else if lower.starts_with("0b") {
            (2, &rest[2..])
        } else if rest.len() > 1 && rest.starts_with('0') {
            (8, &rest[1..])
        } else {
            (10, rest)
        }
    } else {
        (base, rest)
    };
    if !(2..=36).contains(&radix) || digits.is_empty() || digits.starts_with(['+', '-']) {
        return None;
    }
    let magnitude = i64::from(u32::from_str_radix(digits, radix).ok()?);
    let value = if negative { -magnitude } else { magnitude };
    i32::try_from(value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_utf16() {
        for s in ["", "abc", "héllo", "日本語", "a\u{1F600}b"] {
            assert_eq!(from_wide(&to_wide(s)), s);
        }
    }

    #[test]
    fn wcslen_stops_at_zero() {
        assert_eq!(wcslen(&to_wide("abc")), 3);
        assert_eq!(wcslen(&[0x61, 0, 0x62]), 1);
        assert_eq!(wcslen(&[0x61, 0x62]), 2);
    }

    #[test]
    fn wcsncpy_pads_and_truncates() {
        let mut dest = [9u16; 6];
        wcsncpy(&mut dest, &to_wide("ab"), 5);
        assert_eq!(dest, [0x61, 0x62, 0, 0, 0, 9]);

        let mut dest = [9u16; 4];
        wcsncpy(&mut dest, &to_wide("abcdef"), 3);
        assert_eq!(dest, [0x61, 0x62, 0x63, 9]);
    }

    #[test]
    fn wcscpy_and_wcscat() {
        let mut dest = [7u16; 8];
        assert_eq!(wcscpy(&mut dest, &to_wide("ab")), 3);
        assert_eq!(wcscat(&mut dest, &to_wide("cd")), 4);
        assert_eq!(from_wide(&dest), "abcd");
        assert_eq!(dest[4], 0);
    }

    #[test]
    fn wcschr_finds_units() {
        let s = to_wide("hello");
        assert_eq!(wcschr(&s, i64::from(b'l')), Some(2));
        assert_eq!(wcschr(&s, i64::from(b'z')), None);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn wcschr_rejects_wide_values() {
        wcschr(&to_wide("x"), 0x1_0000);
    }

    #[test]
    fn comparisons() {
        assert_eq!(wcscmp(&to_wide("abc"), &to_wide("abc")), 0);
        assert_eq!(wcscmp(&to_wide("abc"), &to_wide("abd")), -1);
        assert_eq!(wcscmp(&to_wide("b"), &to_wide("abc")), 1);
        assert_eq!(wcscasecmp(&to_wide("HeLLo"), &to_wide("hello")), 0);
        assert_eq!(wcscasecmp(&to_wide("ÄB"), &to_wide("äc")), -1);
    }

    #[test]
    fn wcstol_parses_whole_string() {
        assert_eq!(wcstol(&to_wide("123"), 10), 123);
        assert_eq!(wcstol(&to_wide("-42"), 10), -42);
        assert_eq!(wcstol(&to_wide("ff"), 16), 255);
        assert_eq!(wcstol(&to_wide("0x1F"), 0), 31);
        assert_eq!(wcstol(&to_wide("017"), 0), 15);
        assert_eq!(wcstol(&to_wide("12abc"), 10), 0);
        assert_eq!(wcstol(&to_wide(""), 10), 0);
        assert_eq!(wcstol(&to_wide("2147483648"), 10), 0);
        assert_eq!(wcstol(&to_wide("-2147483648"), 10), i32::MIN);
    }
}
