//! `<string.h>` over opaque addresses, plus the host/C string bridge.
//!
//! Strings are read up to their first zero byte; embedded zeros truncate
//! every derived view. New strings get the same slack as `malloc`.

use parking_lot::Mutex;
use rehost_core::string::{
    self as core_str, Tokenizer, memchr as core_memchr, memcmp as core_memcmp,
};
use rehost_membrane::{Ptr, Span, WORD_SIZE, global_space};

// ---------------------------------------------------------------------------
// Host <-> C strings
// ---------------------------------------------------------------------------

/// A new zero-terminated copy of `s`.
#[must_use]
pub fn c_string(s: &str) -> Ptr {
    c_bytes(s.as_bytes())
}

/// A new zero-terminated copy of `b`.
#[must_use]
pub fn c_bytes(b: &[u8]) -> Ptr {
    let space = global_space();
    let p = space.allocate(b.len() + 1, WORD_SIZE);
    space.write(p, b);
    p
}

/// A null-terminated array of addresses of new copies of `items`.
#[must_use]
pub fn c_string_slice(items: &[&str]) -> Ptr {
    let space = global_space();
    let table = space.allocate((items.len() + 1) * WORD_SIZE, WORD_SIZE);
    for (i, s) in items.iter().enumerate() {
        store_ptr(table.add(i * WORD_SIZE), c_string(s));
    }
    table
}

/// The bytes of the C string at `p`, without the terminator.
#[must_use]
pub fn cstr_bytes(p: Ptr) -> Vec<u8> {
    let len = strlen(p);
    global_space().read(p, len)
}

/// The C string at `p` including its terminator. Null reads as empty.
fn cstr_with_nul(p: Ptr) -> Vec<u8> {
    if p.is_null() {
        return vec![0];
    }
    global_space().read(p, strlen(p) + 1)
}

/// Host string from the C string at `p`. Invalid UTF-8 is replaced with
/// U+FFFD, so this is lossy for non-UTF-8 bytes; [`cstr_bytes`] and
/// [`c_bytes`] give the byte-exact round trip.
#[must_use]
pub fn go_string(p: Ptr) -> String {
    String::from_utf8_lossy(&cstr_bytes(p)).into_owned()
}

/// A view of the C string at `p`, sharing its memory.
#[must_use]
pub fn go_bytes(p: Ptr) -> Span<'static> {
    global_space().span(p, strlen(p))
}

/// Prefix of `s` before its first zero byte.
#[must_use]
pub fn go_bytes_s(s: &[u8]) -> &[u8] {
    core_str::as_cstr(s)
}

#[must_use]
pub fn go_string_s(s: &[u8]) -> String {
    String::from_utf8_lossy(go_bytes_s(s)).into_owned()
}

#[must_use]
pub fn strlen_s(s: &[u8]) -> usize {
    core_str::strlen(s)
}

/// Copy `src` to `dst` with no terminator.
pub fn strcpy_go(dst: Ptr, src: &[u8]) {
    global_space().write(dst, src);
}

/// Copy `src` to `dst` followed by a zero byte.
pub fn strcpy_go_zero(dst: Ptr, src: &[u8]) {
    global_space().with_bytes_mut(dst, src.len() + 1, |d| {
        d[..src.len()].copy_from_slice(src);
        d[src.len()] = 0;
    });
}

// ---------------------------------------------------------------------------
// Memory
// ---------------------------------------------------------------------------

pub fn memcmp(lhs: Ptr, rhs: Ptr, n: usize) -> i32 {
    let space = global_space();
    let a = space.read(lhs, n);
    let b = space.read(rhs, n);
    core_memcmp(&a, &b, n)
}

pub fn memset(p: Ptr, ch: u8, n: usize) -> Ptr {
    global_space().with_bytes_mut(p, n, |d| core_str::memset(d, ch, n));
    p
}

pub fn memcpy(dst: Ptr, src: Ptr, n: usize) -> Ptr {
    let space = global_space();
    let bytes = space.read(src, n);
    space.with_bytes_mut(dst, n, |d| core_str::memcpy(d, &bytes, n));
    dst
}

/// Like [`memcpy`] but correct for overlapping ranges.
pub fn memmove(dst: Ptr, src: Ptr, n: usize) -> Ptr {
    if n == 0 {
        return dst;
    }
    let space = global_space();
    let lo = if dst < src { dst } else { src };
    let hi_end = dst.addr().max(src.addr()) + n;
    let same_buffer = space
        .remaining(lo)
        .is_some_and(|rem| lo.addr() + rem >= hi_end);
    if !same_buffer {
        return memcpy(dst, src, n);
    }
    space.with_bytes_mut(lo, hi_end - lo.addr(), |buf| {
        core_str::memmove(buf, dst.addr() - lo.addr(), src.addr() - lo.addr(), n)
    });
    dst
}

/// First `ch` in the `n` bytes at `p`, or null.
pub fn memchr(p: Ptr, ch: u8, n: usize) -> Ptr {
    global_space()
        .with_bytes(p, n, |b| core_memchr(b, ch, n))
        .map_or(Ptr::NULL, |i| p.add(i))
}

// ---------------------------------------------------------------------------
// Strings
// ---------------------------------------------------------------------------

pub fn strlen(p: Ptr) -> usize {
    global_space().scan_nul(p)
}

pub fn strchr(s: Ptr, ch: u8) -> Ptr {
    core_str::strchr(&cstr_with_nul(s), ch).map_or(Ptr::NULL, |i| s.add(i))
}

pub fn strrchr(s: Ptr, ch: u8) -> Ptr {
    core_str::strrchr(&cstr_with_nul(s), ch).map_or(Ptr::NULL, |i| s.add(i))
}

pub fn strstr(haystack: Ptr, needle: Ptr) -> Ptr {
    core_str::strstr(&cstr_with_nul(haystack), &cstr_with_nul(needle))
        .map_or(Ptr::NULL, |i| haystack.add(i))
}

pub fn strcmp(a: Ptr, b: Ptr) -> i32 {
    core_str::strcmp(&cstr_with_nul(a), &cstr_with_nul(b))
}

pub fn strncmp(a: Ptr, b: Ptr, n: usize) -> i32 {
    core_str::strncmp(&cstr_with_nul(a), &cstr_with_nul(b), n)
}

pub fn strcasecmp(a: Ptr, b: Ptr) -> i32 {
    core_str::strcasecmp(&cstr_with_nul(a), &cstr_with_nul(b))
}

pub fn strncasecmp(a: Ptr, b: Ptr, n: usize) -> i32 {
    core_str::strncasecmp(&cstr_with_nul(a), &cstr_with_nul(b), n)
}

/// # Panics
///
/// Panics if `dst` cannot hold the source string and its terminator.
pub fn strcpy(dst: Ptr, src: Ptr) -> Ptr {
    let s = cstr_with_nul(src);
    global_space().with_bytes_mut(dst, s.len(), |d| core_str::strcpy(d, &s));
    dst
}

/// Copy at most `n` bytes, zero-padding a short source. No terminator is
/// written when the source has `n` or more bytes.
pub fn strncpy(dst: Ptr, src: Ptr, n: usize) -> Ptr {
    if n == 0 {
        return dst;
    }
    let s = cstr_with_nul(src);
    global_space().with_bytes_mut(dst, n, |d| core_str::strncpy(d, &s, n));
    dst
}

pub fn strcat(dst: Ptr, src: Ptr) -> Ptr {
    strncat(dst, src, usize::MAX)
}

/// Append at most `n` bytes of `src` and a terminator.
pub fn strncat(dst: Ptr, src: Ptr, n: usize) -> Ptr {
    let s = cstr_with_nul(src);
    let total = strlen(dst) + core_str::strlen(&s).min(n) + 1;
    global_space().with_bytes_mut(dst, total, |d| core_str::strncat(d, &s, n));
    dst
}

pub fn strspn(s: Ptr, accept: Ptr) -> usize {
    core_str::strspn(&cstr_with_nul(s), &cstr_with_nul(accept))
}

pub fn strcspn(s: Ptr, reject: Ptr) -> usize {
    core_str::strcspn(&cstr_with_nul(s), &cstr_with_nul(reject))
}

#[must_use]
pub fn strdup(s: Ptr) -> Ptr {
    c_bytes(&cstr_bytes(s))
}

struct TokState {
    base: Ptr,
    tok: Tokenizer,
}

static STRTOK: Mutex<Option<TokState>> = Mutex::new(None);

/// `strtok` with one cursor shared by the whole process.
///
/// A non-null `src` restarts tokenizing; null continues the previous
/// string. Delimiters ending a token are overwritten with zero.
pub fn strtok(src: Ptr, delim: Ptr) -> Ptr {
    let delims = cstr_bytes(delim);
    let mut state = STRTOK.lock();
    if !src.is_null() {
        *state = Some(TokState {
            base: src,
            tok: Tokenizer::new(strlen(src)),
        });
    }
    let Some(st) = state.as_mut() else {
        return Ptr::NULL;
    };
    let len = st.tok.len();
    let found = global_space().with_bytes_mut(st.base, len, |buf| st.tok.next_token(buf, &delims));
    match found {
        Some(start) => {
            let p = st.base.add(start);
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

// ---------------------------------------------------------------------------
// Typed access
// ---------------------------------------------------------------------------

macro_rules! typed_access {
    ($($load:ident, $store:ident, $ty:ty);* $(;)?) => {
        $(
            #[doc = concat!("Load a little-endian `", stringify!($ty), "` from `p`.")]
            #[must_use]
            pub fn $load(p: Ptr) -> $ty {
                let mut raw = [0u8; std::mem::size_of::<$ty>()];
                global_space().with_bytes(p, raw.len(), |b| raw.copy_from_slice(b));
                <$ty>::from_le_bytes(raw)
            }

            #[doc = concat!("Store `v` as a little-endian `", stringify!($ty), "` at `p`.")]
            pub fn $store(p: Ptr, v: $ty) {
                global_space().write(p, &v.to_le_bytes());
            }
        )*
    };
}

typed_access! {
    load_u8, store_u8, u8;
    load_u16, store_u16, u16;
    load_i32, store_i32, i32;
    load_u32, store_u32, u32;
    load_i64, store_i64, i64;
    load_u64, store_u64, u64;
    load_f32, store_f32, f32;
    load_f64, store_f64, f64;
    load_word, store_word, usize;
}

#[must_use]
pub fn load_ptr(p: Ptr) -> Ptr {
    Ptr::from_addr(load_word(p))
}

pub fn store_ptr(p: Ptr, v: Ptr) {
    store_word(p, v.addr());
}

/// `a - b` in bytes.
#[must_use]
pub fn pointer_diff(a: Ptr, b: Ptr) -> isize {
    a.diff(b)
}

/// `p + i` for a signed byte offset.
#[must_use]
pub fn index_ptr(p: Ptr, i: isize) -> Ptr {
    p.offset(i)
}
