//! `atoi`, `atof` and C truth values.
//!
//! The parsers read the whole string: surrounding spaces or trailing junk make
//! the input invalid, and invalid input converts to 0.

/// C truth value of `v`: 1 or 0.
#[must_use]
pub const fn bool_to_int(v: bool) -> i32 {
    if v { 1 } else { 0 }
}

/// Decimal integer with optional sign. Out-of-range values saturate.
#[must_use]
pub fn atoi(s: &[u8]) -> i64 {
    let (negative, digits) = match s.split_first() {
        Some((b'-', rest)) => (true, rest),
        Some((b'+', rest)) => (false, rest),
        _ => (false, s),
    };
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return 0;
    }
    let mut acc: i64 = 0;
    for &d in digits {
        let digit = i64::from(d - b'0');
        let next = acc
            .checked_mul(10)
            .and_then(|v| if negative { v.checked_sub(digit) } else { v.checked_add(digit) });
        match next {
            Some(v) => acc = v,
            None => return if negative { i64::MIN } else { i64::MAX },
        }
    }
    acc
}

/// Decimal or exponent floating-point literal, `inf` or `nan`.
#[must_use]
pub fn atof(s: &[u8]) -> f64 {
    std::str::from_utf8(s)
        .ok()
        .and_then(|t| t.parse::<f64>().ok())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truth_values() {
        assert_eq!(bool_to_int(true), 1);
        assert_eq!(bool_to_int(false), 0);
    }

    #[test]
    fn atoi_valid() {
        assert_eq!(atoi(b"0"), 0);
        assert_eq!(atoi(b"42"), 42);
        assert_eq!(atoi(b"-17"), -17);
        assert_eq!(atoi(b"+8"), 8);
    }

    #[test]
    fn atoi_invalid_is_zero() {
        assert_eq!(atoi(b""), 0);
        assert_eq!(atoi(b"-"), 0);
        assert_eq!(atoi(b" 12"), 0);
        assert_eq!(atoi(b"12abc"), 0);
        assert_eq!(atoi(b"0x10"), 0);
    }

    #[test]
    fn atoi_saturates() {
        assert_eq!(atoi(b"9223372036854775807"), i64::MAX);
        assert_eq!(atoi(b"99999999999999999999"), i64::MAX);
        assert_eq!(atoi(b"-9223372036854775808"), i64::MIN);
        assert_eq!(atoi(b"-99999999999999999999"), i64::MIN);
    }

    #[test]
    fn atof_values() {
        assert_eq!(atof(b"1.5"), 1.5);
        assert_eq!(atof(b"-2e3"), -2000.0);
        assert_eq!(atof(b"abc"), 0.0);
        assert_eq!(atof(b"1.5x"), 0.0);
        assert!(atof(b"inf").is_infinite());
        assert!(atof(b"nan").is_nan());
    }
}
