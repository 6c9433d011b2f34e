//! `<glob.h>` over the installed [`Filesystem`].
//!
//! A `glob_t` is three words: the match count (`i32`), the address of a
//! null-terminated array of path strings, and the reserved-slot count
//! (`i32`, always 0). Matching runs one path component at a time against
//! directory listings from the provider. Entries starting with `.` only
//! match a component that itself starts with `.`. Results are sorted per
//! directory.

use std::io;

use globset::GlobBuilder;
use rehost_membrane::{Ptr, WORD_SIZE};

use crate::errno_abi::set_err;
use crate::file_abi::fs;
use crate::fs::Filesystem;
use crate::malloc_abi::free;
use crate::string_abi::{c_string_slice, go_string, load_ptr, store_i32, store_ptr};

/// Treat `\` as an ordinary character.
pub const GLOB_NOESCAPE: i32 = 1;

/// Returned when nothing matched or the pattern is malformed.
pub const GLOB_NOMATCH: i32 = 1;

/// Size of a `glob_t`.
pub const GLOB_SIZE: usize = 3 * WORD_SIZE;

const GL_PATHC: usize = 0;
const GL_PATHV: usize = WORD_SIZE;
const GL_OFFS: usize = 2 * WORD_SIZE;

fn has_meta(component: &str) -> bool {
    component.bytes().any(|b| matches!(b, b'*' | b'?' | b'['))
}

fn unescape(component: &str) -> String {
    let mut out = String::with_capacity(component.len());
    let mut chars = component.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.extend(chars.next()),
            _ => out.push(c),
        }
    }
    out
}

/// Braces are literal in POSIX glob; quote them for globset.
fn quote_braces(component: &str) -> String {
    component.replace('{', "[{]").replace('}', "[}]")
}

fn join(base: &str, name: &str) -> String {
    if base.is_empty() {
        name.to_owned()
    } else if base.ends_with('/') {
        format!("{base}{name}")
    } else {
        format!("{base}/{name}")
    }
}

/// Paths on `fs` matching `pattern`.
fn expand(fs: &dyn Filesystem, pattern: &str, noescape: bool) -> Result<Vec<String>, globset::Error> {
    let mut found = vec![if pattern.starts_with('/') { "/".to_owned() } else { String::new() }];
    for component in pattern.split('/').filter(|c| !c.is_empty()) {
        let mut next = Vec::new();
        if has_meta(component) {
            let matcher = GlobBuilder::new(&quote_braces(component))
                .literal_separator(true)
                .backslash_escape(!noescape)
                .build()?
                .compile_matcher();
            let dot_ok = component.starts_with('.');
            for base in &found {
                let dir = if base.is_empty() { "." } else { base.as_str() };
                let Ok(mut names) = fs.read_dir(dir) else {
                    continue;
                };
                names.sort();
                next.extend(
                    names
                        .iter()
                        .filter(|name| dot_ok || !name.starts_with('.'))
                        .filter(|name| matcher.is_match(name.as_str()))
                        .map(|name| join(base, name)),
                );
            }
        } else {
            let literal = if noescape { component.to_owned() } else { unescape(component) };
            next.extend(found.iter().map(|base| join(base, &literal)));
        }
        found = next;
    }
    found.retain(|path| fs.stat(path).is_ok());
    Ok(found)
}

fn clear(pglob: Ptr) {
    store_i32(pglob.add(GL_PATHC), 0);
    store_ptr(pglob.add(GL_PATHV), Ptr::NULL);
    store_i32(pglob.add(GL_OFFS), 0);
}

/// `glob`: fill `pglob` with the paths matching `pattern`.
///
/// Returns 0 with at least one match. Returns [`GLOB_NOMATCH`] with an
/// empty `pglob` when nothing matches, and also for a malformed pattern,
/// which additionally sets the error register.
///
/// # Panics
///
/// An error callback (`errfunc` not null) is not emulated.
pub fn glob(pattern: Ptr, flags: i32, errfunc: Ptr, pglob: Ptr) -> i32 {
    if !errfunc.is_null() {
        not_emulated!("glob with an error callback");
    }
    let pat = go_string(pattern);
    let result = expand(&*fs(), &pat, flags & GLOB_NOESCAPE != 0);
    trace_call!("glob", "glob", {
        "pattern": pat,
        "flags": flags,
        "matches": result.as_ref().map_or(0, Vec::len),
    });
    let paths = match result {
        Ok(paths) if !paths.is_empty() => paths,
        Ok(_) => {
            clear(pglob);
            return GLOB_NOMATCH;
        }
        Err(e) => {
            set_err(io::Error::new(io::ErrorKind::InvalidInput, e));
            clear(pglob);
            return GLOB_NOMATCH;
        }
    };
    let names: Vec<&str> = paths.iter().map(String::as_str).collect();
    store_i32(pglob.add(GL_PATHC), i32::try_from(names.len()).unwrap_or(i32::MAX));
    store_ptr(pglob.add(GL_PATHV), c_string_slice(&names));
    store_i32(pglob.add(GL_OFFS), 0);
    0
}

/// `globfree`: release the path strings and array held by `pglob` and
/// reset it.
pub fn globfree(pglob: Ptr) {
    let table = load_ptr(pglob.add(GL_PATHV));
    if !table.is_null() {
        let mut slot = table;
        loop {
            let path = load_ptr(slot);
            if path.is_null() {
                break;
            }
            free(path);
            slot = slot.add(WORD_SIZE);
        }
        free(table);
    }
    clear(pglob);
}
