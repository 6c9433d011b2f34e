//! printf rendering engine.
//!
//! Walks the words produced by [`parse_format`], pops one argument per
//! verb from the caller's [`ArgList`], coerces it to the kind the verb
//! needs and renders it with C width/precision/flag rules.
//!
//! Length modifiers (`l`, `ll`) are accepted and ignored: integer values
//! are rendered from their full 64-bit view. Width or precision taken from
//! an argument (`*`) is rejected; callers resolve it beforehand.

use rehost_membrane::AddressSpace;

use super::format::{FormatWord, parse_format};
use crate::stdarg::{ArgList, CoerceError, Value};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A format string and its arguments do not fit together.
///
/// Every variant is a usage error of the calling layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("not enough arguments to print for {verb}")]
    MissingArgument { verb: String },
    #[error("cannot take width or precision from arguments: {verb}")]
    StarIndirection { verb: String },
    #[error("unsupported verb: {verb:?}")]
    UnsupportedVerb { verb: String },
    #[error("{verb}: {source}")]
    Coerce {
        verb: String,
        #[source]
        source: CoerceError,
    },
}

// ---------------------------------------------------------------------------
// Format spec types
// ---------------------------------------------------------------------------

/// Flags parsed from a printf verb.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatFlags {
    pub left_justify: bool, // '-'
    pub force_sign: bool,   // '+'
    pub space_sign: bool,   // ' '
    pub alt_form: bool,     // '#'
    pub zero_pad: bool,     // '0'
}

/// Width specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    None,
    Fixed(usize),
}

/// Precision specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    None,
    Fixed(usize),
}

/// A parsed printf verb.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatSpec {
    pub flags: FormatFlags,
    pub width: Width,
    pub precision: Precision,
    /// Number of `l` modifiers seen.
    pub long: u8,
    pub conversion: u8,
}

impl FormatSpec {
    /// Parses a whole verb word such as `%-08.3lf`.
    pub fn from_verb(verb: &[u8]) -> Result<Self, FormatError> {
        let unsupported = || FormatError::UnsupportedVerb {
            verb: String::from_utf8_lossy(verb).into_owned(),
        };
        let body = verb.strip_prefix(b"%").ok_or_else(unsupported)?;
        if body.contains(&b'*') {
            return Err(FormatError::StarIndirection {
                verb: String::from_utf8_lossy(verb).into_owned(),
            });
        }
        let (&conversion, body) = body.split_last().ok_or_else(unsupported)?;
        let len = body.len();
        let mut pos = 0;

        // --- flags ---
        let mut flags = FormatFlags::default();
        while pos < len {
            match body[pos] {
                b'-' => flags.left_justify = true,
                b'+' => flags.force_sign = true,
                b' ' => flags.space_sign = true,
                b'#' => flags.alt_form = true,
                b'0' => flags.zero_pad = true,
                _ => break,
            }
            pos += 1;
        }
        // '+' overrides ' '; '-' overrides '0'.
        if flags.force_sign {
            flags.space_sign = false;
        }
        if flags.left_justify {
            flags.zero_pad = false;
        }

        // --- width ---
        let start = pos;
        while pos < len && body[pos].is_ascii_digit() {
            pos += 1;
        }
        let width = if pos > start {
            Width::Fixed(parse_decimal(&body[start..pos]))
        } else {
            Width::None
        };

        // --- precision ---
        let precision = if pos < len && body[pos] == b'.' {
            pos += 1;
            let start = pos;
            while pos < len && body[pos].is_ascii_digit() {
                pos += 1;
            }
            Precision::Fixed(parse_decimal(&body[start..pos]))
        } else {
            Precision::None
        };

        // --- length ---
        let mut long = 0u8;
        while pos < len && body[pos] == b'l' {
            long = long.saturating_add(1);
            pos += 1;
        }
        if pos != len || long > 2 {
            return Err(unsupported());
        }

        Ok(Self {
            flags,
            width,
            precision,
            long,
            conversion,
        })
    }
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

/// Renders `format` with values popped from `args`.
///
/// String and wide-string arguments given as addresses are read through
/// `space`. On error nothing is returned; the cursor of `args` may have
/// advanced.
pub fn format(space: &AddressSpace, format: &[u8], args: &mut ArgList) -> Result<Vec<u8>, FormatError> {
    let mut out = Vec::with_capacity(format.len() + 16);
    for word in parse_format(format) {
        if word.verb {
            render_verb(space, &word, args, &mut out)?;
        } else {
            out.extend_from_slice(&word.text);
        }
    }
    Ok(out)
}

fn render_verb(
    space: &AddressSpace,
    word: &FormatWord,
    args: &mut ArgList,
    out: &mut Vec<u8>,
) -> Result<(), FormatError> {
    if word.text == b"%%" {
        out.push(b'%');
        return Ok(());
    }
    let verb = || String::from_utf8_lossy(&word.text).into_owned();
    let mut spec = FormatSpec::from_verb(&word.text)?;
    let coerce = |source| FormatError::Coerce {
        verb: verb(),
        source,
    };
    if !matches!(
        spec.conversion,
        b'd' | b'i' | b'u' | b'o' | b'x' | b'c' | b's' | b'S' | b'p' | b'f' | b'e' | b'g' | b'F'
            | b'E' | b'G'
    ) {
        return Err(FormatError::UnsupportedVerb { verb: verb() });
    }
    let value: Value = args
        .try_arg()
        .ok_or_else(|| FormatError::MissingArgument { verb: verb() })?;

    match spec.conversion {
        b'd' | b'i' => {
            spec.conversion = b'd';
            format_signed(value.as_uint().map_err(coerce)? as i64, &spec, out);
        }
        b'u' | b'o' | b'x' => format_unsigned(value.as_uint().map_err(coerce)?, &spec, out),
        b'c' => format_char(value.as_uint().map_err(coerce)? as u8, &spec, out),
        b's' | b'S' => format_str(&value.as_text(space).map_err(coerce)?, &spec, out),
        b'p' => format_pointer(value.as_addr().map_err(coerce)?.addr(), &spec, out),
        _ => format_float(value.as_float().map_err(coerce)?, &spec, out),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Renderers
// ---------------------------------------------------------------------------

/// Render a signed integer to `buf` according to `spec`.
pub fn format_signed(value: i64, spec: &FormatSpec, buf: &mut Vec<u8>) {
    let negative = value < 0;
    let abs = value.unsigned_abs();

    let (base, uppercase) = int_base(spec.conversion);
    let mut digits = [0u8; 64];
    let digit_count = render_digits(abs, base, uppercase, &mut digits);
    let digit_slice = &digits[64 - digit_count..];

    let sign = sign_byte(negative, spec);

    let precision = match spec.precision {
        Precision::Fixed(p) => p,
        Precision::None => 1,
    };
    let zero_prefix_count = precision.saturating_sub(digit_count);
    let prefix = alt_prefix(spec);

    // Explicit precision 0 with value 0 emits no digits.
    let suppress_zero = value == 0 && spec.precision == Precision::Fixed(0);
    let content_len = usize::from(sign.is_some())
        + prefix.len()
        + if suppress_zero {
            0
        } else {
            zero_prefix_count + digit_count
        };
    let pad_total = resolve_width(spec).saturating_sub(content_len);
    // A precision disables the '0' flag for integers.
    let zero_pad = spec.flags.zero_pad && spec.precision == Precision::None;

    if !spec.flags.left_justify && !zero_pad {
        pad(buf, b' ', pad_total);
    }
    if let Some(s) = sign {
        buf.push(s);
    }
    buf.extend_from_slice(prefix);
    if !spec.flags.left_justify && zero_pad {
        pad(buf, b'0', pad_total);
    }
    if !suppress_zero {
        pad(buf, b'0', zero_prefix_count);
        buf.extend_from_slice(digit_slice);
    }
    if spec.flags.left_justify {
        pad(buf, b' ', pad_total);
    }
}

/// Render an unsigned integer to `buf` according to `spec`.
pub fn format_unsigned(value: u64, spec: &FormatSpec, buf: &mut Vec<u8>) {
    let (base, uppercase) = int_base(spec.conversion);
    let mut digits = [0u8; 64];
    let digit_count = render_digits(value, base, uppercase, &mut digits);
    let digit_slice = &digits[64 - digit_count..];

    let precision = match spec.precision {
        Precision::Fixed(p) => p,
        Precision::None => 1,
    };
    let mut zero_prefix_count = precision.saturating_sub(digit_count);

    let prefix: &[u8] = match spec.conversion {
        // '#' with octal forces a leading zero digit, not a prefix.
        b'o' if spec.flags.alt_form && zero_prefix_count == 0 && value != 0 => {
            zero_prefix_count = 1;
            b""
        }
        _ if value != 0 => alt_prefix(spec),
        _ => b"",
    };

    let suppress_zero =
        value == 0 && spec.precision == Precision::Fixed(0) && !(spec.conversion == b'o' && spec.flags.alt_form);
    let content_len = prefix.len()
        + if suppress_zero {
            0
        } else {
            zero_prefix_count + digit_count
        };
    let pad_total = resolve_width(spec).saturating_sub(content_len);
    let zero_pad = spec.flags.zero_pad && spec.precision == Precision::None;

    if !spec.flags.left_justify && !zero_pad {
        pad(buf, b' ', pad_total);
    }
    buf.extend_from_slice(prefix);
    if !spec.flags.left_justify && zero_pad {
        pad(buf, b'0', pad_total);
    }
    if !suppress_zero {
        pad(buf, b'0', zero_prefix_count);
        buf.extend_from_slice(digit_slice);
    }
    if spec.flags.left_justify {
        pad(buf, b' ', pad_total);
    }
}

/// Render a floating-point value to `buf` according to `spec`.
///
/// Supports `%f`/`%F`, `%e`/`%E` and `%g`/`%G`.
pub fn format_float(value: f64, spec: &FormatSpec, buf: &mut Vec<u8>) {
    let precision = match spec.precision {
        Precision::Fixed(p) => p,
        Precision::None => 6,
    };
    let uppercase = spec.conversion.is_ascii_uppercase();
    let negative = value.is_sign_negative() && !value.is_nan();
    let sign = sign_byte(negative, spec);

    if !value.is_finite() {
        let body: &[u8] = match (value.is_nan(), uppercase) {
            (true, false) => b"nan",
            (true, true) => b"NAN",
            (false, false) => b"inf",
            (false, true) => b"INF",
        };
        let content_len = usize::from(sign.is_some()) + body.len();
        let pad_total = resolve_width(spec).saturating_sub(content_len);
        if !spec.flags.left_justify {
            pad(buf, b' ', pad_total);
        }
        if let Some(s) = sign {
            buf.push(s);
        }
        buf.extend_from_slice(body);
        if spec.flags.left_justify {
            pad(buf, b' ', pad_total);
        }
        return;
    }

    let abs = value.abs();
    let body = match spec.conversion | 0x20 {
        b'e' => format_e(abs, precision, uppercase, spec.flags.alt_form),
        b'g' => format_g(abs, precision, uppercase, spec.flags.alt_form),
        _ => format_f(abs, precision, spec.flags.alt_form),
    };

    let content_len = usize::from(sign.is_some()) + body.len();
    let pad_total = resolve_width(spec).saturating_sub(content_len);

    if !spec.flags.left_justify && !spec.flags.zero_pad {
        pad(buf, b' ', pad_total);
    }
    if let Some(s) = sign {
        buf.push(s);
    }
    if !spec.flags.left_justify && spec.flags.zero_pad {
        pad(buf, b'0', pad_total);
    }
    buf.extend_from_slice(body.as_bytes());
    if spec.flags.left_justify {
        pad(buf, b' ', pad_total);
    }
}

/// Render string bytes to `buf`. Precision truncates.
pub fn format_str(s: &[u8], spec: &FormatSpec, buf: &mut Vec<u8>) {
    let max_len = match spec.precision {
        Precision::Fixed(p) => p,
        Precision::None => s.len(),
    };
    let effective = &s[..s.len().min(max_len)];
    padded(effective, spec, buf);
}

/// Render a single byte to `buf`.
pub fn format_char(c: u8, spec: &FormatSpec, buf: &mut Vec<u8>) {
    padded(&[c], spec, buf);
}

/// Render an address as `0x...` hex, or `(nil)` for null.
pub fn format_pointer(addr: usize, spec: &FormatSpec, buf: &mut Vec<u8>) {
    if addr == 0 {
        padded(b"(nil)", spec, buf);
        return;
    }
    let mut digits = [0u8; 64];
    let count = render_digits(addr as u64, 16, false, &mut digits);
    let mut body = Vec::with_capacity(2 + count);
    body.extend_from_slice(b"0x");
    body.extend_from_slice(&digits[64 - count..]);
    padded(&body, spec, buf);
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn padded(body: &[u8], spec: &FormatSpec, buf: &mut Vec<u8>) {
    let pad_total = resolve_width(spec).saturating_sub(body.len());
    if !spec.flags.left_justify {
        pad(buf, b' ', pad_total);
    }
    buf.extend_from_slice(body);
    if spec.flags.left_justify {
        pad(buf, b' ', pad_total);
    }
}

fn sign_byte(negative: bool, spec: &FormatSpec) -> Option<u8> {
    if negative {
        Some(b'-')
    } else if spec.flags.force_sign {
        Some(b'+')
    } else if spec.flags.space_sign {
        Some(b' ')
    } else {
        None
    }
}

fn parse_decimal(digits: &[u8]) -> usize {
    digits.iter().fold(0usize, |acc, &d| {
        acc.saturating_mul(10).saturating_add(usize::from(d - b'0'))
    })
}

fn resolve_width(spec: &FormatSpec) -> usize {
    match spec.width {
        Width::Fixed(w) => w,
        Width::None => 0,
    }
}

fn int_base(conversion: u8) -> (u64, bool) {
    match conversion {
        b'o' => (8, false),
        b'x' => (16, false),
        b'X' => (16, true),
        _ => (10, false),
    }
}

/// Render `value` in `base` right-aligned into `buf`; returns the digit count.
fn render_digits(mut value: u64, base: u64, uppercase: bool, buf: &mut [u8; 64]) -> usize {
    if value == 0 {
        buf[63] = b'0';
        return 1;
    }
    let alpha = if uppercase { b'A' } else { b'a' };
    let mut pos = 64;
    while value > 0 && pos > 0 {
        pos -= 1;
        let digit = (value % base) as u8;
        buf[pos] = if digit < 10 {
            b'0' + digit
        } else {
            alpha + (digit - 10)
        };
        value /= base;
    }
    64 - pos
}

fn alt_prefix(spec: &FormatSpec) -> &'static [u8] {
    if !spec.flags.alt_form {
        return b"";
    }
    match spec.conversion {
        b'x' => b"0x",
        b'X' => b"0X",
        _ => b"",
    }
}

fn pad(buf: &mut Vec<u8>, byte: u8, count: usize) {
    buf.resize(buf.len() + count, byte);
}

/// `%f`: fixed-point decimal.
fn format_f(value: f64, precision: usize, alt_form: bool) -> String {
    let mut s = format!("{value:.precision$}");
    if precision == 0 && alt_form {
        s.push('.');
    }
    s
}

/// Scientific digits and decimal exponent of `value` at `precision`.
fn sci_parts(value: f64, precision: usize) -> (String, i32) {
    let raw = format!("{value:.precision$e}");
    match raw.split_once('e') {
        Some((mantissa, exp)) => (mantissa.to_owned(), exp.parse().unwrap_or(0)),
        None => (raw, 0),
    }
}

/// `%e`: scientific notation with at least two exponent digits.
fn format_e(value: f64, precision: usize, uppercase: bool, alt_form: bool) -> String {
    let (mut mantissa, exp) = sci_parts(value, precision);
    if precision == 0 && alt_form {
        mantissa.push('.');
    }
    let e_char = if uppercase { 'E' } else { 'e' };
    let sign = if exp < 0 { '-' } else { '+' };
    format!("{mantissa}{e_char}{sign}{:02}", exp.unsigned_abs())
}

/// `%g`: `%e` or `%f` depending on the exponent, trailing zeros removed.
fn format_g(value: f64, precision: usize, uppercase: bool, alt_form: bool) -> String {
    let p = precision.max(1);
    let exp = if value == 0.0 { 0 } else { sci_parts(value, p - 1).1 };

    if exp >= -4 && exp < p as i32 {
        let frac_digits = (p as i32 - 1 - exp).max(0) as usize;
        let mut s = format!("{value:.frac_digits$}");
        if alt_form {
            if !s.contains('.') {
                s.push('.');
            }
        } else {
            strip_trailing_zeros(&mut s);
        }
        s
    } else {
        let s = format_e(value, p - 1, uppercase, alt_form);
        if alt_form {
            return s;
        }
        match s.find(['e', 'E']) {
            Some(e_pos) => {
                let mut mantissa = s[..e_pos].to_string();
                strip_trailing_zeros(&mut mantissa);
                format!("{mantissa}{}", &s[e_pos..])
            }
            None => s,
        }
    }
}

/// Remove trailing zeros after the decimal point.
fn strip_trailing_zeros(s: &mut String) {
    if s.contains('.') {
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
