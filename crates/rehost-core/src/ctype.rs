//! Character classification and case mapping.
//!
//! Letters and digits are classified over all of Unicode, so the same
//! functions serve `<ctype.h>` and the `<wctype.h>` wide forms. The
//! remaining classes follow the C locale. Negative inputs (including
//! `EOF`) belong to no class.

fn scalar(c: i32) -> Option<char> {
    u32::try_from(c).ok().and_then(char::from_u32)
}

fn ascii(c: i32) -> Option<u8> {
    u8::try_from(c).ok().filter(u8::is_ascii)
}

/// Any Unicode letter.
#[must_use]
pub fn is_alpha(c: i32) -> bool {
    scalar(c).is_some_and(char::is_alphabetic)
}

/// Any Unicode letter or number.
#[must_use]
pub fn is_alnum(c: i32) -> bool {
    scalar(c).is_some_and(|ch| ch.is_alphabetic() || ch.is_numeric())
}

#[must_use]
pub fn is_digit(c: i32) -> bool {
    ascii(c).is_some_and(|b| b.is_ascii_digit())
}

#[must_use]
pub fn is_xdigit(c: i32) -> bool {
    ascii(c).is_some_and(|b| b.is_ascii_hexdigit())
}

/// Space, tab, newline, vertical tab, form feed or carriage return.
#[must_use]
pub fn is_space(c: i32) -> bool {
    ascii(c).is_some_and(|b| matches!(b, b' ' | b'\t' | b'\n' | 0x0B | 0x0C | b'\r'))
}

#[must_use]
pub fn is_upper(c: i32) -> bool {
    scalar(c).is_some_and(char::is_uppercase)
}

#[must_use]
pub fn is_lower(c: i32) -> bool {
    scalar(c).is_some_and(char::is_lowercase)
}

#[must_use]
pub fn is_print(c: i32) -> bool {
    ascii(c).is_some_and(|b| (0x20..=0x7E).contains(&b))
}

#[must_use]
pub fn is_punct(c: i32) -> bool {
    ascii(c).is_some_and(|b| b.is_ascii_punctuation())
}

/// Single-character case mapping; characters whose mapping is not a
/// single character are returned unchanged.
fn map_case<I>(c: i32, f: impl FnOnce(char) -> I) -> i32
where
    I: Iterator<Item = char>,
{
    let Some(ch) = scalar(c) else {
        return c;
    };
    let mut mapped = f(ch);
    match (mapped.next(), mapped.next()) {
        (Some(m), None) => i32::try_from(u32::from(m)).unwrap_or(c),
        _ => c,
    }
}

#[must_use]
pub fn to_upper(c: i32) -> i32 {
    map_case(c, char::to_uppercase)
}

#[must_use]
pub fn to_lower(c: i32) -> i32 {
    map_case(c, char::to_lowercase)
}
