//! scanf parsing engine.
//!
//! A scan runs in two phases. Planning walks the format words and binds
//! every assigning verb to a destination address popped from the caller's
//! [`ArgList`]. Scanning then reads the input through a [`SpaceReader`] and
//! produces the bytes for each destination. Nothing is written to memory
//! here; the caller commits the returned [`Commit`]s only when the whole
//! scan succeeded.
//!
//! Destination layouts: `%d %i %u %x %o` store 4 bytes (8 with `l`),
//! `%f %e %g` store an `f32` (`f64` with `l`), `%s` stores the word plus a
//! NUL, `%c` stores exactly the requested bytes. All little-endian.

use std::io::{self, Read};

use rehost_membrane::Ptr;

use super::format::parse_format;
use crate::stdarg::{ArgList, CoerceError};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("not enough arguments to scan for {verb}")]
    MissingArgument { verb: String },
    #[error("unsupported scan verb: {verb:?}")]
    UnsupportedVerb { verb: String },
    #[error("{verb}: {source}")]
    Coerce {
        verb: String,
        #[source]
        source: CoerceError,
    },
    #[error("input does not match {expected}")]
    Mismatch { expected: String },
    #[error("unexpected end of input")]
    Eof,
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl ScanError {
    /// True for errors caused by the format or arguments rather than input.
    #[must_use]
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            Self::MissingArgument { .. } | Self::UnsupportedVerb { .. } | Self::Coerce { .. }
        )
    }

    /// Host error view of an input failure, for the error register.
    #[must_use]
    pub fn into_io_error(self) -> io::Error {
        match self {
            Self::Io(e) => e,
            Self::Eof => io::Error::from(io::ErrorKind::UnexpectedEof),
            other => io::Error::new(io::ErrorKind::InvalidData, other.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------------

/// Byte reader that presents `\n` and `\r` as spaces, with one byte of
/// lookahead.
pub struct SpaceReader<R> {
    inner: R,
    lookahead: Option<u8>,
}

impl<R: Read> SpaceReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            lookahead: None,
        }
    }

    /// The next byte without consuming it, newlines shown as spaces.
    pub fn peek(&mut self) -> io::Result<Option<u8>> {
        if self.lookahead.is_none() {
            let mut byte = [0u8; 1];
            loop {
                match self.inner.read(&mut byte) {
                    Ok(0) => return Ok(None),
                    Ok(_) => break,
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e),
                }
            }
            self.lookahead = Some(byte[0]);
        }
        Ok(self.lookahead.map(normalize))
    }

    /// Consumes and returns the next byte.
    pub fn next_byte(&mut self) -> io::Result<Option<u8>> {
        let b = self.peek()?;
        self.lookahead = None;
        Ok(b)
    }

    fn skip_space(&mut self) -> io::Result<()> {
        while let Some(b) = self.peek()? {
            if !b.is_ascii_whitespace() {
                break;
            }
            self.lookahead = None;
        }
        Ok(())
    }

    /// The wrapped reader and the raw byte read ahead but not consumed.
    pub fn into_parts(self) -> (R, Option<u8>) {
        (self.inner, self.lookahead)
    }
}

fn normalize(b: u8) -> u8 {
    match b {
        b'\n' | b'\r' => b' ',
        other => other,
    }
}

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// Bytes to store at one destination once the scan succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub dst: Ptr,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Conv {
    Int { base: u32, signed: bool },
    Float,
    Word,
    Chars,
    Percent,
}

#[derive(Debug)]
struct Directive {
    verb: String,
    conv: Conv,
    width: Option<usize>,
    wide: bool,
    dst: Option<Ptr>,
}

#[derive(Debug)]
enum Step {
    Literal(Vec<u8>),
    Directive(Directive),
}

fn plan(format: &[u8], args: &mut ArgList) -> Result<Vec<Step>, ScanError> {
    let mut steps = Vec::new();
    for word in parse_format(format) {
        if !word.verb {
            steps.push(Step::Literal(word.text));
            continue;
        }
        let verb = String::from_utf8_lossy(&word.text).into_owned();
        let unsupported = || ScanError::UnsupportedVerb { verb: verb.clone() };
        if word.text == b"%%" {
            steps.push(Step::Directive(Directive {
                verb,
                conv: Conv::Percent,
                width: None,
                wide: false,
                dst: None,
            }));
            continue;
        }

        let body = &word.text[1..];
        let (&last, mut body) = body.split_last().ok_or_else(unsupported)?;
        let suppress = body.first() == Some(&b'*');
        if suppress {
            body = &body[1..];
        }
        let digits = body.iter().take_while(|b| b.is_ascii_digit()).count();
        let width = if digits > 0 {
            let text = std::str::from_utf8(&body[..digits]).map_err(|_| unsupported())?;
            Some(text.parse::<usize>().map_err(|_| unsupported())?)
        } else {
            None
        };
        let rest = &body[digits..];
        if !rest.iter().all(|&b| b == b'l') || rest.len() > 2 || width == Some(0) {
            return Err(unsupported());
        }
        let conv = match last {
            b'd' => Conv::Int { base: 10, signed: true },
            b'i' => Conv::Int { base: 0, signed: true },
            b'u' => Conv::Int { base: 10, signed: false },
            b'x' | b'X' => Conv::Int { base: 16, signed: false },
            b'o' => Conv::Int { base: 8, signed: false },
            b'f' | b'e' | b'g' | b'F' | b'E' | b'G' => Conv::Float,
            b's' => Conv::Word,
            b'c' => Conv::Chars,
            _ => return Err(unsupported()),
        };
        let dst = if suppress {
            None
        } else {
            let arg = args
                .try_arg()
                .ok_or_else(|| ScanError::MissingArgument { verb: verb.clone() })?;
            let p = arg.as_addr().map_err(|source| ScanError::Coerce {
                verb: verb.clone(),
                source,
            })?;
            Some(p)
        };
        steps.push(Step::Directive(Directive {
            verb,
            conv,
            width,
            wide: !rest.is_empty(),
            dst,
        }));
    }
    Ok(steps)
}

// ---------------------------------------------------------------------------
// Scan
// ---------------------------------------------------------------------------

/// Scans `reader` according to `format`, binding destinations from `args`.
///
/// Returns the pending writes in format order; their count is the number
/// of assigned conversions. On any error no write is returned.
pub fn scan<R: Read>(
    reader: &mut SpaceReader<R>,
    format: &[u8],
    args: &mut ArgList,
) -> Result<Vec<Commit>, ScanError> {
    let steps = plan(format, args)?;
    let mut commits = Vec::new();
    for step in steps {
        match step {
            Step::Literal(text) => match_literal(reader, &text)?,
            Step::Directive(d) => {
                let bytes = convert(reader, &d)?;
                if let (Some(bytes), Some(dst)) = (bytes, d.dst) {
                    commits.push(Commit { dst, bytes });
                }
            }
        }
    }
    Ok(commits)
}

fn match_literal<R: Read>(reader: &mut SpaceReader<R>, text: &[u8]) -> Result<(), ScanError> {
    for &b in text {
        if b.is_ascii_whitespace() {
            reader.skip_space()?;
            continue;
        }
        match reader.peek()? {
            Some(got) if got == b => {
                reader.next_byte()?;
            }
            Some(_) => {
                return Err(ScanError::Mismatch {
                    expected: format!("{:?}", char::from(b)),
                });
            }
            None => return Err(ScanError::Eof),
        }
    }
    Ok(())
}

fn convert<R: Read>(reader: &mut SpaceReader<R>, d: &Directive) -> Result<Option<Vec<u8>>, ScanError> {
    let mismatch = || ScanError::Mismatch {
        expected: d.verb.clone(),
    };
    match d.conv {
        Conv::Percent => {
            reader.skip_space()?;
            match reader.next_byte()? {
                Some(b'%') => Ok(None),
                Some(_) => Err(mismatch()),
                None => Err(ScanError::Eof),
            }
        }
        Conv::Chars => {
            let n = d.width.unwrap_or(1);
            let mut out = Vec::with_capacity(n);
            for _ in 0..n {
                match reader.next_byte()? {
                    Some(b) => out.push(b),
                    None => return Err(ScanError::Eof),
                }
            }
            Ok(Some(out))
        }
        Conv::Word => {
            reader.skip_space()?;
            let limit = d.width.unwrap_or(usize::MAX);
            let mut out = Vec::new();
            while out.len() < limit {
                match reader.peek()? {
                    Some(b) if !b.is_ascii_whitespace() => {
                        out.push(b);
                        reader.next_byte()?;
                    }
                    _ => break,
                }
            }
            if out.is_empty() {
                return Err(ScanError::Eof);
            }
            out.push(0);
            Ok(Some(out))
        }
        Conv::Int { base, signed } => {
            reader.skip_space()?;
            let token = read_int_token(reader, base, d.width)?;
            let value = parse_int_token(&token, base).ok_or_else(mismatch)?;
            let bytes = match (d.wide, signed) {
                (true, _) => value.to_le_bytes().to_vec(),
                (false, true) => (value as i32).to_le_bytes().to_vec(),
                (false, false) => (value as u32).to_le_bytes().to_vec(),
            };
            Ok(Some(bytes))
        }
        Conv::Float => {
            reader.skip_space()?;
            let token = read_float_token(reader, d.width)?;
            let text = std::str::from_utf8(&token).map_err(|_| mismatch())?;
            let value: f64 = text.parse().map_err(|_| mismatch())?;
            Ok(Some(if d.wide {
                value.to_le_bytes().to_vec()
            } else {
                (value as f32).to_le_bytes().to_vec()
            }))
        }
    }
}

/// Reads the longest prefix that can form an integer in `base`.
fn read_int_token<R: Read>(
    reader: &mut SpaceReader<R>,
    base: u32,
    width: Option<usize>,
) -> Result<Vec<u8>, ScanError> {
    let limit = width.unwrap_or(usize::MAX);
    let mut token = Vec::new();
    take_if(reader, &mut token, limit, |b| b == b'-' || b == b'+')?;
    let mut radix = base;
    if base == 0 || base == 16 {
        if take_if(reader, &mut token, limit, |b| b == b'0')? {
            if take_if(reader, &mut token, limit, |b| b == b'x' || b == b'X')? {
                radix = 16;
            } else if base == 0 {
                radix = 8;
            }
        } else if base == 0 {
            radix = 10;
        }
    }
    while take_if(reader, &mut token, limit, |b| char::from(b).is_digit(radix))? {}
    if token.is_empty() && reader.peek()?.is_none() {
        return Err(ScanError::Eof);
    }
    Ok(token)
}

fn take_if<R: Read>(
    reader: &mut SpaceReader<R>,
    token: &mut Vec<u8>,
    limit: usize,
    ok: impl Fn(u8) -> bool,
) -> io::Result<bool> {
    if token.len() >= limit {
        return Ok(false);
    }
    match reader.peek()? {
        Some(b) if ok(b) => {
            token.push(b);
            reader.next_byte()?;
            Ok(true)
        }
        _ => Ok(false),
    }
}

/// Parses a token from [`read_int_token`]; values wrap like C conversions.
fn parse_int_token(token: &[u8], base: u32) -> Option<u64> {
    let (negative, rest) = match token.first() {
        Some(b'-') => (true, &token[1..]),
        Some(b'+') => (false, &token[1..]),
        _ => (false, token),
    };
    let (radix, digits) = match (base, rest) {
        (0 | 16, [b'0', b'x' | b'X', tail @ ..]) => (16, tail),
        (0, [b'0', tail @ ..]) if !tail.is_empty() => (8, tail),
        (0, _) => (10, rest),
        (b, _) => (b, rest),
    };
    if digits.is_empty() {
        // A lone "0" before a failed hex prefix is still zero.
        return (rest.first() == Some(&b'0')).then_some(0);
    }
    let mut value: u64 = 0;
    for &b in digits {
        let d = char::from(b).to_digit(radix)?;
        value = value.wrapping_mul(u64::from(radix)).wrapping_add(u64::from(d));
    }
    Some(if negative { value.wrapping_neg() } else { value })
}

/// Reads a decimal floating-point token: sign, digits, point, exponent.
fn read_float_token<R: Read>(reader: &mut SpaceReader<R>, width: Option<usize>) -> Result<Vec<u8>, ScanError> {
    let limit = width.unwrap_or(usize::MAX);
    let mut token = Vec::new();
    let mut seen_point = false;
    let mut seen_exp = false;
    while token.len() < limit {
        let Some(b) = reader.peek()? else { break };
        let accept = match b {
            b'0'..=b'9' => true,
            b'+' | b'-' => token.is_empty() || matches!(token.last(), Some(b'e' | b'E')),
            b'.' => !seen_point && !seen_exp,
            b'e' | b'E' => {
                !seen_exp && token.iter().any(u8::is_ascii_digit)
            }
            _ => false,
        };
        if !accept {
            break;
        }
        seen_point |= b == b'.';
        seen_exp |= b == b'e' || b == b'E';
        token.push(b);
        reader.next_byte()?;
    }
    if token.is_empty() && reader.peek()?.is_none() {
        return Err(ScanError::Eof);
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stdarg::Value;

    fn run(input: &str, fmt: &str, dsts: usize) -> Result<Vec<Commit>, ScanError> {
        let mut reader = SpaceReader::new(input.as_bytes());
        let values = (0..dsts)
            .map(|i| Value::Ptr(Ptr::from_addr(0x1000 + i * 0x10)))
            .collect();
        let mut args = ArgList::new(0, values);
        scan(&mut reader, fmt.as_bytes(), &mut args)
    }

    fn bytes(c: &[Commit]) -> Vec<Vec<u8>> {
        c.iter().map(|c| c.bytes.clone()).collect()
    }

    #[test]
    fn reader_rewrites_newlines_and_keeps_raw_lookahead() {
        let mut r = SpaceReader::new(&b"a\nb"[..]);
        assert_eq!(r.next_byte().unwrap(), Some(b'a'));
        assert_eq!(r.peek().unwrap(), Some(b' '));
        let (_, raw) = r.into_parts();
        assert_eq!(raw, Some(b'\n'));
    }

    #[test]
    fn ints_strings_and_floats() {
        let c = run("42 hello 2.5", "%d %s %f", 3).unwrap();
        assert_eq!(c.len(), 3);
        assert_eq!(c[0].dst, Ptr::from_addr(0x1000));
        assert_eq!(
            bytes(&c),
            vec![
                42i32.to_le_bytes().to_vec(),
                b"hello\0".to_vec(),
                2.5f32.to_le_bytes().to_vec(),
            ]
        );
    }

    #[test]
    fn newlines_separate_fields() {
        let c = run("1\n2\r\n3", "%d %d %d", 3).unwrap();
        assert_eq!(c[2].bytes, 3i32.to_le_bytes());
        let c = run("7\n8", "%d%d", 2).unwrap();
        assert_eq!(c[1].bytes, 8i32.to_le_bytes());
    }

    #[test]
    fn long_modifier_widens_destinations() {
        let c = run("-5 1.25", "%ld %lf", 2).unwrap();
        assert_eq!(c[0].bytes, (-5i64).to_le_bytes());
        assert_eq!(c[1].bytes, 1.25f64.to_le_bytes());
    }

    #[test]
    fn bases() {
        let c = run("ff 0x10 017 0x1a 12", "%x %x %i %i %o", 5).unwrap();
        let ints: Vec<u32> = c
            .iter()
            .map(|c| u32::from_le_bytes(c.bytes[..4].try_into().unwrap()))
            .collect();
        assert_eq!(ints, vec![255, 16, 15, 26, 10]);
        let c = run("0", "%i", 1).unwrap();
        assert_eq!(c[0].bytes, 0i32.to_le_bytes());
    }

    #[test]
    fn unsigned_wraps_negative_input() {
        let c = run("-1", "%u", 1).unwrap();
        assert_eq!(c[0].bytes, u32::MAX.to_le_bytes());
    }

    #[test]
    fn widths_limit_fields() {
        let c = run("12345 abcdef", "%2d%3d %3s", 3).unwrap();
        assert_eq!(c[0].bytes, 12i32.to_le_bytes());
        assert_eq!(c[1].bytes, 345i32.to_le_bytes());
        assert_eq!(c[2].bytes, b"abc\0");
    }

    #[test]
    fn chars_do_not_skip_space() {
        let c = run("a b", "%c%c%c", 3).unwrap();
        assert_eq!(bytes(&c), vec![b"a".to_vec(), b" ".to_vec(), b"b".to_vec()]);
        let c = run("xyz", "%2c", 1).unwrap();
        assert_eq!(c[0].bytes, b"xy");
    }

    #[test]
    fn suppression_consumes_without_a_destination() {
        let c = run("skip 9", "%*s %d", 1).unwrap();
        assert_eq!(c.len(), 1);
        assert_eq!(c[0].dst, Ptr::from_addr(0x1000));
        assert_eq!(c[0].bytes, 9i32.to_le_bytes());
    }

    #[test]
    fn literals_and_percent() {
        let c = run("x=3, 50%", "x=%d, %d%%", 2).unwrap();
        assert_eq!(c[1].bytes, 50i32.to_le_bytes());
        assert!(matches!(run("y=3", "x=%d", 1), Err(ScanError::Mismatch { .. })));
    }

    #[test]
    fn failures_return_no_commits() {
        assert!(matches!(run("1 abc", "%d %d", 2), Err(ScanError::Mismatch { .. })));
        assert!(matches!(run("1", "%d %d", 2), Err(ScanError::Eof)));
        assert!(matches!(run("", "%s", 1), Err(ScanError::Eof)));
        assert!(matches!(run("x", "%f", 1), Err(ScanError::Mismatch { .. })));
    }

    #[test]
    fn usage_errors_are_flagged() {
        let err = run("1 2", "%d %d", 1).unwrap_err();
        assert!(matches!(err, ScanError::MissingArgument { .. }));
        assert!(err.is_usage());
        let err = run("1", "%q", 1).unwrap_err();
        assert!(matches!(err, ScanError::UnsupportedVerb { .. }));
        assert!(!ScanError::Eof.is_usage());
        assert_eq!(
            ScanError::Eof.into_io_error().kind(),
            io::ErrorKind::UnexpectedEof
        );
    }

    #[test]
    fn lookahead_survives_for_pushback() {
        let mut reader = SpaceReader::new(&b"12x"[..]);
        let mut args = ArgList::new(0, vec![Value::Ptr(Ptr::from_addr(8))]);
        scan(&mut reader, b"%d", &mut args).unwrap();
        let (_, raw) = reader.into_parts();
        assert_eq!(raw, Some(b'x'));
    }
}
