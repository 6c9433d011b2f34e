//! Path and descriptor calls: `open`, `chdir`, `rmdir`, `unlink`,
//! `access`, `getcwd`, `lseek`.
//!
//! All of them go through the installed filesystem and report failures via
//! the error register.

use std::io;

use rehost_core::stdio::OpenFlags;
use rehost_membrane::Ptr;

use crate::errno_abi::set_err;
use crate::file_abi::{by_fd, fs, open_with};
use crate::string_abi::{go_string, strcpy_go_zero};

/// `open`: the file is always opened read-only; `flags` are logged and
/// otherwise ignored. Returns the descriptor, or 0 on failure.
pub fn open(path: Ptr, flags: i32) -> usize {
    let path = go_string(path);
    let file = open_with(&path, OpenFlags::READ_ONLY);
    trace_call!("unistd", "open", {
        "path": path,
        "flags": flags,
        "fd": file.as_ref().map(|f| f.fileno()),
    });
    file.map_or(0, |f| f.fileno())
}

pub fn creat(_path: Ptr, _mode: u32) -> usize {
    not_emulated!("creat")
}

pub fn fcntl(_fd: usize, _cmd: i32) -> i32 {
    not_emulated!("fcntl")
}

fn path_call(symbol: &'static str, path: Ptr, op: impl FnOnce(&str) -> io::Result<()>) -> i32 {
    let path = go_string(path);
    let result = op(&path);
    trace_call!("unistd", symbol, {
        "path": path,
        "error": result.as_ref().err().map(ToString::to_string),
    });
    match result {
        Ok(()) => 0,
        Err(e) => {
            set_err(e);
            -1
        }
    }
}

pub fn chdir(path: Ptr) -> i32 {
    path_call("chdir", path, |p| fs().chdir(p))
}

/// `rmdir`: removes the directory and everything in it.
pub fn rmdir(path: Ptr) -> i32 {
    path_call("rmdir", path, |p| fs().rmdir(p))
}

pub fn unlink(path: Ptr) -> i32 {
    path_call("unlink", path, |p| fs().unlink(p))
}

/// `access`: existence only; the requested mode bits are not checked.
pub fn access(path: Ptr, _mode: i32) -> i32 {
    path_call("access", path, |p| fs().stat(p).map(|_| ()))
}

/// `getcwd`: copy the working directory into `buf`.
///
/// Null with `ERANGE` when `size` cannot hold the path and its terminator.
pub fn getcwd(buf: Ptr, size: usize) -> Ptr {
    let dir = match fs().getwd() {
        Ok(dir) => dir,
        Err(e) => {
            set_err(e);
            return Ptr::NULL;
        }
    };
    if dir.len() + 1 > size {
        set_err(io::Error::from_raw_os_error(libc::ERANGE));
        return Ptr::NULL;
    }
    strcpy_go_zero(buf, dir.as_bytes());
    buf
}

/// `lseek`: the new offset, or `u64::MAX` on failure.
pub fn lseek(fd: usize, off: u64, whence: i32) -> u64 {
    let Some(file) = by_fd(fd) else {
        return u64::MAX;
    };
    // The offset is the two's complement image of a signed value.
    match file.seek_to(off as i64, whence) {
        Ok(pos) => pos,
        Err(e) => {
            set_err(e);
            u64::MAX
        }
    }
}
