//! `<wchar.h>` over opaque addresses. Wide characters are 2-byte units.

use parking_lot::Mutex;
use rehost_core::string::{
    Tokenizer, from_wide, to_wide, wcscasecmp, wcscat, wcschr, wcscmp, wcscpy, wcslen, wcsncpy,
    wcstol, wide_str,
};
use rehost_membrane::{Ptr, WORD_SIZE, global_space};

const UNIT: usize = 2;

/// A new zero-terminated wide copy of `s`.
#[must_use]
pub fn c_wstring(s: &str) -> Ptr {
    let units = to_wide(s);
    let space = global_space();
    let p = space.allocate(units.len() * UNIT, WORD_SIZE);
    space.write(p, &encode(&units));
    p
}

/// Host string from the wide string at `p`.
#[must_use]
pub fn go_wstring(p: Ptr) -> String {
    from_wide(&units_with_nul(p))
}

#[must_use]
pub fn wstrlen(p: Ptr) -> usize {
    global_space().scan_nul_wide(p)
}

fn units_with_nul(p: Ptr) -> Vec<u16> {
    if p.is_null() {
        return vec![0];
    }
    let n = wstrlen(p) + 1;
    decode(&global_space().read(p, n * UNIT))
}

fn decode(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks_exact(UNIT)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .collect()
}

fn encode(units: &[u16]) -> Vec<u8> {
    units.iter().flat_map(|u| u.to_le_bytes()).collect()
}

fn with_units_mut<R>(p: Ptr, n: usize, f: impl FnOnce(&mut [u16]) -> R) -> R {
    global_space().with_bytes_mut(p, n * UNIT, |bytes| {
        let mut units = decode(bytes);
        let r = f(&mut units);
        bytes.copy_from_slice(&encode(&units));
        r
    })
}

pub fn wstrcpy(dst: Ptr, src: Ptr) -> Ptr {
    let s = units_with_nul(src);
    with_units_mut(dst, s.len(), |d| wcscpy(d, &s));
    dst
}

pub fn wstrncpy(dst: Ptr, src: Ptr, n: usize) -> Ptr {
    let s = units_with_nul(src);
    with_units_mut(dst, n, |d| wcsncpy(d, &s, n));
    dst
}

/// # Panics
///
/// Panics if `ch` does not fit in one unit.
pub fn wstrchr(s: Ptr, ch: i64) -> Ptr {
    wcschr(&units_with_nul(s), ch).map_or(Ptr::NULL, |i| s.add(i * UNIT))
}

pub fn wstrcat(dst: Ptr, src: Ptr) -> Ptr {
    let s = units_with_nul(src);
    let total = wstrlen(dst) + wcslen(&s) + 1;
    with_units_mut(dst, total, |d| wcscat(d, &s));
    dst
}

pub fn wstrcmp(a: Ptr, b: Ptr) -> i32 {
    wcscmp(&units_with_nul(a), &units_with_nul(b))
}

pub fn wstrcasecmp(a: Ptr, b: Ptr) -> i32 {
    wcscasecmp(&units_with_nul(a), &units_with_nul(b))
}

/// `wcstol`. The whole string must be a number; anything else yields 0.
///
/// # Panics
///
/// Panics if `end` is not null.
pub fn wstrtol(s: Ptr, end: Ptr, base: i32) -> i32 {
    if !end.is_null() {
        not_emulated!("wcstol end pointer");
    }
    u32::try_from(base).map_or(0, |b| wcstol(&units_with_nul(s), b))
}

struct TokState {
    base: Ptr,
    tok: Tokenizer,
}

static WSTRTOK: Mutex<Option<TokState>> = Mutex::new(None);

/// `wcstok` with its own process-wide cursor, separate from `strtok`'s.
pub fn wstrtok(src: Ptr, delim: Ptr) -> Ptr {
    let delims = units_with_nul(delim);
    let delims = wide_str(&delims);
    let mut state = WSTRTOK.lock();
    if !src.is_null() {
        *state = Some(TokState {
            base: src,
            tok: Tokenizer::new(wstrlen(src)),
        });
    }
    let Some(st) = state.as_mut() else {
        return Ptr::NULL;
    };
    let len = st.tok.len();
    let found = with_units_mut(st.base, len, |buf| st.tok.next_token(buf, delims));
    match found {
        Some(start) => {
            let p = st.base.add(start * UNIT);
            if st.tok.is_exhausted() {
                *state = None;
            }
            p
        }
        None => {
            *state = None;
            Ptr::NULL
        }
    }
}
