//! printf and scanf families.
//!
//! Formats arrive as host bytes; arguments as [`Value`]s, either a slice
//! for the direct forms or an [`ArgList`] for the `v` forms, which consume
//! from the list's cursor. Format and argument mistakes are usage errors
//! and panic. Input failures while scanning set the error register (or
//! the stream's error for `fscanf`) and return `-1`; no destination is
//! written unless the whole scan succeeded.

use rehost_core::stdarg::{ArgList, Value};
use rehost_core::stdio::{Commit, ScanError, SpaceReader, format as render_format, scan};
use rehost_membrane::{Ptr, global_space};

use crate::errno_abi::set_err;
use crate::file_abi::{File, stderr, stdin, stdout};
use crate::string_abi::cstr_bytes;

fn render(func: &str, format: &[u8], args: &mut ArgList) -> Vec<u8> {
    render_format(global_space(), format, args).unwrap_or_else(|e| panic!("{func}: {e}"))
}

fn clamp(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

// ---------------------------------------------------------------------------
// printf
// ---------------------------------------------------------------------------

/// `printf` to the process stdout. Bytes written, or `-1`.
pub fn printf(format: &[u8], args: Vec<Value>) -> i32 {
    vprintf(format, &mut ArgList::new(0, args))
}

pub fn vprintf(format: &[u8], args: &mut ArgList) -> i32 {
    let out = render("printf", format, args);
    write_all(&stdout(), &out)
}

/// `fprintf`. A short write records the error on `file` and yields `-1`.
pub fn fprintf(file: &File, format: &[u8], args: Vec<Value>) -> i32 {
    vfprintf(file, format, &mut ArgList::new(0, args))
}

pub fn vfprintf(file: &File, format: &[u8], args: &mut ArgList) -> i32 {
    let out = render("fprintf", format, args);
    write_all(file, &out)
}

fn write_all(file: &File, out: &[u8]) -> i32 {
    let n = file.write_bytes(out);
    if n < out.len() { -1 } else { clamp(n) }
}

/// Debug print to stderr; a newline is added when the output lacks one.
pub fn dprintf(format: &[u8], args: Vec<Value>) -> i32 {
    let mut out = render("dprintf", format, &mut ArgList::new(0, args));
    if out.last() != Some(&b'\n') {
        out.push(b'\n');
    }
    write_all(&stderr(), &out)
}

/// `sprintf`: writes the output and a terminator to `buf`; returns the
/// output length.
pub fn sprintf(buf: Ptr, format: &[u8], args: Vec<Value>) -> i32 {
    vsprintf(buf, format, &mut ArgList::new(0, args))
}

pub fn vsprintf(buf: Ptr, format: &[u8], args: &mut ArgList) -> i32 {
    let mut out = render("sprintf", format, args);
    let n = out.len();
    out.push(0);
    global_space().write(buf, &out);
    clamp(n)
}

/// `snprintf`: copies at most `size` bytes of output and returns the
/// number copied. The terminator is written only when the output is
/// shorter than `size`.
pub fn snprintf(buf: Ptr, size: usize, format: &[u8], args: Vec<Value>) -> i32 {
    vsnprintf(buf, size, format, &mut ArgList::new(0, args))
}

pub fn vsnprintf(buf: Ptr, size: usize, format: &[u8], args: &mut ArgList) -> i32 {
    let mut out = render("snprintf", format, args);
    let n = out.len().min(size);
    if out.len() < size {
        out.push(0);
        global_space().write(buf, &out);
    } else {
        global_space().write(buf, &out[..n]);
    }
    clamp(n)
}

// ---------------------------------------------------------------------------
// scanf
// ---------------------------------------------------------------------------

enum Sink<'a> {
    Register,
    Stream(&'a File),
}

fn finish(func: &str, result: Result<Vec<Commit>, ScanError>, sink: Sink<'_>) -> i32 {
    match result {
        Ok(commits) => {
            let space = global_space();
            for c in &commits {
                space.write(c.dst, &c.bytes);
            }
            clamp(commits.len())
        }
        Err(e) if e.is_usage() => panic!("{func}: {e}"),
        Err(e) => {
            trace_call!("stdio", func, {"error": e.to_string()});
            let err = e.into_io_error();
            match sink {
                Sink::Register => set_err(err),
                Sink::Stream(file) => file.set_err(err),
            }
            -1
        }
    }
}

/// `scanf` from the process stdin. Number of assigned conversions, or
/// `-1` with the error register set.
pub fn scanf(format: &[u8], args: Vec<Value>) -> i32 {
    vscanf(format, &mut ArgList::new(0, args))
}

pub fn vscanf(format: &[u8], args: &mut ArgList) -> i32 {
    let result = stdin().scan(format, args);
    finish("scanf", result, Sink::Register)
}

/// `fscanf`. Failures are recorded on `file`, not in the register.
pub fn fscanf(file: &File, format: &[u8], args: Vec<Value>) -> i32 {
    vfscanf(file, format, &mut ArgList::new(0, args))
}

pub fn vfscanf(file: &File, format: &[u8], args: &mut ArgList) -> i32 {
    let result = file.scan(format, args);
    finish("fscanf", result, Sink::Stream(file))
}

/// `sscanf` over the C string at `s`.
pub fn sscanf(s: Ptr, format: &[u8], args: Vec<Value>) -> i32 {
    vsscanf(s, format, &mut ArgList::new(0, args))
}

pub fn vsscanf(s: Ptr, format: &[u8], args: &mut ArgList) -> i32 {
    let input = cstr_bytes(s);
    let mut reader = SpaceReader::new(input.as_slice());
    let result = scan(&mut reader, format, args);
    finish("sscanf", result, Sink::Register)
}
