//! `FILE` streams and the descriptor table.
//!
//! Open files are registered by descriptor in a table guarded by a
//! read/write lock; lookups take the read side, open and close the write
//! side. Each [`File`] keeps one byte of pushback, an end-of-file flag and
//! the last error seen on it.

use std::collections::HashMap;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};
use rehost_core::stdarg::ArgList;
use rehost_core::stdio::{Commit, OpenFlags, ScanError, SpaceReader, parse_mode, scan};
use rehost_membrane::{Ptr, global_space};

use crate::errno_abi::{err_code, set_err};
use crate::fs::{FileHandle, Filesystem, LocalFs};
use crate::string_abi::{cstr_bytes, go_string};

/// End of input from [`File::getc`]. Distinct from `-1`, which reports an
/// I/O error.
pub const EOF: i32 = -2;
pub const SEEK_SET: i32 = 0;
pub const SEEK_CUR: i32 = 1;
pub const SEEK_END: i32 = 2;

const DEFAULT_PERM: u32 = 0o644;

// ---------------------------------------------------------------------------
// Provider and descriptor table
// ---------------------------------------------------------------------------

struct FsState {
    fs: Arc<dyn Filesystem>,
    by_fd: RwLock<HashMap<usize, Arc<File>>>,
    // stdin, stdout, stderr once opened.
    streams: Mutex<[Option<Arc<File>>; 3]>,
}

impl FsState {
    fn new(fs: Arc<dyn Filesystem>) -> Self {
        Self {
            fs,
            by_fd: RwLock::new(HashMap::new()),
            streams: Mutex::new([None, None, None]),
        }
    }
}

static STATE: RwLock<Option<Arc<FsState>>> = RwLock::new(None);

fn state() -> Arc<FsState> {
    if let Some(st) = STATE.read().as_ref() {
        return Arc::clone(st);
    }
    let mut slot = STATE.write();
    Arc::clone(slot.get_or_insert_with(|| Arc::new(FsState::new(Arc::new(LocalFs)))))
}

/// Install `fs` as the process filesystem; `None` restores [`LocalFs`].
///
/// Starts a fresh descriptor table. Files opened before the swap stay
/// usable through their handles but are no longer found by descriptor.
pub fn set_fs(fs: Option<Arc<dyn Filesystem>>) {
    let fs = fs.unwrap_or_else(|| Arc::new(LocalFs));
    *STATE.write() = Some(Arc::new(FsState::new(fs)));
}

/// The installed filesystem.
#[must_use]
pub fn fs() -> Arc<dyn Filesystem> {
    Arc::clone(&state().fs)
}

/// Register an already open handle.
pub fn open_from(handle: Box<dyn FileHandle>) -> Arc<File> {
    let st = state();
    let file = Arc::new(File {
        fd: handle.fd(),
        owner: Arc::downgrade(&st),
        inner: Mutex::new(FileInner {
            handle,
            pushback: None,
            eof: false,
            err: None,
        }),
    });
    st.by_fd.write().insert(file.fd, Arc::clone(&file));
    file
}

/// The open file registered under `fd`. Sets `EBADF` when there is none.
#[must_use]
pub fn by_fd(fd: usize) -> Option<Arc<File>> {
    let found = state().by_fd.read().get(&fd).cloned();
    if found.is_none() {
        set_err(io::Error::from_raw_os_error(libc::EBADF));
    }
    found
}

fn std_stream(index: usize) -> Arc<File> {
    let st = state();
    let mut streams = st.streams.lock();
    if let Some(f) = &streams[index] {
        let live = st
            .by_fd
            .read()
            .get(&f.fd)
            .is_some_and(|entry| Arc::ptr_eq(entry, f));
        if live {
            return Arc::clone(f);
        }
    }
    let handle = match index {
        0 => st.fs.stdin(),
        1 => st.fs.stdout(),
        _ => st.fs.stderr(),
    };
    drop(streams);
    let file = open_from(handle);
    st.streams.lock()[index] = Some(Arc::clone(&file));
    file
}

#[must_use]
pub fn stdin() -> Arc<File> {
    std_stream(0)
}

#[must_use]
pub fn stdout() -> Arc<File> {
    std_stream(1)
}

#[must_use]
pub fn stderr() -> Arc<File> {
    std_stream(2)
}

// ---------------------------------------------------------------------------
// Opening
// ---------------------------------------------------------------------------

fn mode_flags(func: &str, mode: &[u8]) -> OpenFlags {
    parse_mode(mode).unwrap_or_else(|| {
        panic!("{func}: unknown file mode {:?}", String::from_utf8_lossy(mode))
    })
}

/// Open `path` through the installed filesystem. Failures set the error
/// register and yield `None`.
pub fn open_with(path: &str, flags: OpenFlags) -> Option<Arc<File>> {
    let result = fs().open(path, flags, DEFAULT_PERM);
    trace_call!("stdio", "fopen", {
        "path": path,
        "flags": format!("{flags:?}"),
        "error": result.as_ref().err().map(ToString::to_string),
    });
    match result {
        Ok(handle) => Some(open_from(handle)),
        Err(e) => {
            set_err(e);
            None
        }
    }
}

/// `fopen` with host strings.
///
/// # Panics
///
/// Panics on a mode other than `r w a r+ w+ a+` (with optional `b`).
pub fn open_path(path: &str, mode: &[u8]) -> Option<Arc<File>> {
    open_with(path, mode_flags("fopen", mode))
}

/// `fopen`.
///
/// # Panics
///
/// Panics on an unknown mode.
pub fn fopen(path: Ptr, mode: Ptr) -> Option<Arc<File>> {
    open_path(&go_string(path), &cstr_bytes(mode))
}

/// `fdopen`: the stream already registered under `fd`. The mode is
/// validated but the stream keeps its original access.
///
/// # Panics
///
/// Panics on an unknown mode.
pub fn fdopen(fd: usize, mode: Ptr) -> Option<Arc<File>> {
    let mode = cstr_bytes(mode);
    let found = by_fd(fd);
    trace_call!("stdio", "fdopen", {
        "fd": fd,
        "mode": String::from_utf8_lossy(&mode),
        "found": found.is_some(),
    });
    let file = found?;
    mode_flags("fdopen", &mode);
    Some(file)
}

pub fn freopen(_path: Ptr, _mode: Ptr, _file: &File) -> Option<Arc<File>> {
    not_emulated!("freopen")
}

pub fn remove(_path: Ptr) -> i32 {
    not_emulated!("remove")
}

pub fn rename(_from: Ptr, _to: Ptr) -> i32 {
    not_emulated!("rename")
}

// ---------------------------------------------------------------------------
// File
// ---------------------------------------------------------------------------

struct FileInner {
    handle: Box<dyn FileHandle>,
    pushback: Option<u8>,
    eof: bool,
    err: Option<io::Error>,
}

impl FileInner {
    fn record(&mut self, err: io::Error) {
        self.err = Some(err);
    }
}

impl Read for FileInner {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        if let Some(b) = self.pushback.take() {
            buf[0] = b;
            return Ok(1);
        }
        self.handle.read(buf)
    }
}

/// An open stream.
pub struct File {
    fd: usize,
    owner: Weak<FsState>,
    inner: Mutex<FileInner>,
}

impl std::fmt::Debug for File {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("File").field("fd", &self.fd).finish_non_exhaustive()
    }
}

impl File {
    /// `fileno`.
    #[must_use]
    pub fn fileno(&self) -> usize {
        self.fd
    }

    #[must_use]
    pub fn name(&self) -> String {
        self.inner.lock().handle.name()
    }

    pub fn set_err(&self, err: io::Error) {
        self.inner.lock().record(err);
    }

    /// `feof`.
    #[must_use]
    pub fn is_eof(&self) -> i32 {
        i32::from(self.inner.lock().eof)
    }

    /// `ferror`: the code of the last error, 0 if none.
    #[must_use]
    pub fn error(&self) -> i64 {
        self.inner
            .lock()
            .err
            .as_ref()
            .map_or(0, |e| i64::from(err_code(e)))
    }

    /// `clearerr`.
    pub fn clear_err(&self) {
        let mut inner = self.inner.lock();
        inner.err = None;
        inner.eof = false;
    }

    /// `fflush`.
    pub fn flush(&self) -> i32 {
        let mut inner = self.inner.lock();
        match inner.handle.sync() {
            Ok(()) => 0,
            Err(e) => {
                inner.record(e);
                -1
            }
        }
    }

    /// `fclose`: close the handle and drop the descriptor entry.
    pub fn close(&self) -> i32 {
        let rc = {
            let mut inner = self.inner.lock();
            match inner.handle.close() {
                Ok(()) => 0,
                Err(e) => {
                    inner.record(e);
                    -1
                }
            }
        };
        if let Some(st) = self.owner.upgrade() {
            let mut table = st.by_fd.write();
            if table
                .get(&self.fd)
                .is_some_and(|entry| std::ptr::eq(Arc::as_ptr(entry), self))
            {
                table.remove(&self.fd);
            }
        }
        rc
    }

    /// Write `data`; returns the number of bytes accepted.
    pub fn write_bytes(&self, data: &[u8]) -> usize {
        let mut inner = self.inner.lock();
        let mut written = 0;
        while written < data.len() {
            match inner.handle.write(&data[written..]) {
                Ok(0) => {
                    inner.record(io::Error::from(io::ErrorKind::WriteZero));
                    break;
                }
                Ok(n) => written += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => {
                    inner.record(e);
                    break;
                }
            }
        }
        written
    }

    /// `write(fd, p, n)` style: bytes written.
    pub fn write(&self, p: Ptr, n: usize) -> i32 {
        let data = global_space().read(p, n);
        clamp(self.write_bytes(&data))
    }

    /// `fwrite`: whole elements written.
    pub fn write_n(&self, p: Ptr, size: usize, count: usize) -> i32 {
        if size == 0 {
            return 0;
        }
        let Some(total) = self.element_bytes(size, count) else {
            return 0;
        };
        clamp(self.write_bytes(&global_space().read(p, total)) / size)
    }

    /// `size * count`, recording `EOVERFLOW` on the stream when it does not
    /// fit.
    fn element_bytes(&self, size: usize, count: usize) -> Option<usize> {
        let total = size.checked_mul(count);
        if total.is_none() {
            self.set_err(io::Error::from_raw_os_error(libc::EOVERFLOW));
        }
        total
    }

    /// Read up to `n` bytes, stopping early only at end of input or error.
    pub fn read_bytes(&self, n: usize) -> Vec<u8> {
        let mut inner = self.inner.lock();
        let mut buf = vec![0u8; n];
        let mut filled = 0;
        while filled < n {
            match inner.read(&mut buf[filled..]) {
                Ok(0) => {
                    inner.eof = true;
                    break;
                }
                Ok(k) => filled += k,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => {
                    inner.record(e);
                    break;
                }
            }
        }
        buf.truncate(filled);
        buf
    }

    /// `read(fd, p, n)` style: bytes read into `p`.
    pub fn read(&self, p: Ptr, n: usize) -> i32 {
        if n == 0 {
            return 0;
        }
        let data = self.read_bytes(n);
        global_space().write(p, &data);
        clamp(data.len())
    }

    /// `fread`: whole elements read into `p`.
    pub fn read_n(&self, p: Ptr, size: usize, count: usize) -> i32 {
        if size == 0 || count == 0 {
            return 0;
        }
        let Some(total) = self.element_bytes(size, count) else {
            return 0;
        };
        let data = self.read_bytes(total);
        global_space().write(p, &data);
        clamp(data.len() / size)
    }

    /// `fgetc`: the pushback byte if set, else the next byte. [`EOF`] at
    /// end of input, `-1` on error.
    pub fn getc(&self) -> i32 {
        let mut inner = self.inner.lock();
        let mut b = [0u8; 1];
        loop {
            match inner.read(&mut b) {
                Ok(0) => {
                    inner.eof = true;
                    return EOF;
                }
                Ok(_) => return i32::from(b[0]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => {
                    inner.record(e);
                    return -1;
                }
            }
        }
    }

    /// `ungetc`: hold `c` for the next read. One byte deep; a second call
    /// replaces the first. Returns `c`, or [`EOF`] if `c` is not a byte.
    pub fn ungetc(&self, c: i32) -> i32 {
        let Ok(b) = u8::try_from(c) else {
            return EOF;
        };
        let mut inner = self.inner.lock();
        inner.pushback = Some(b);
        inner.eof = false;
        c
    }

    /// `fgets`: read into `buf` until a newline (kept) or `size - 1`
    /// bytes, then zero-terminate.
    ///
    /// Null when nothing could be read.
    pub fn gets(&self, buf: Ptr, size: i32) -> Ptr {
        let Ok(size) = usize::try_from(size) else {
            return Ptr::NULL;
        };
        if size == 0 {
            return Ptr::NULL;
        }
        let mut line = Vec::with_capacity(size);
        while line.len() + 1 < size {
            match self.getc() {
                EOF | -1 => break,
                c => {
                    // getc yields a byte here.
                    let b = c as u8;
                    line.push(b);
                    if b == b'\n' {
                        break;
                    }
                }
            }
        }
        if line.is_empty() && size > 1 {
            trace_call!("stdio", "fgets", {"name": self.name(), "size": size});
            return Ptr::NULL;
        }
        line.push(0);
        global_space().write(buf, &line);
        buf
    }

    /// `fputc`. Returns `c`, or `-1` on error.
    ///
    /// # Panics
    ///
    /// Panics if `c` is not a byte value.
    pub fn putc(&self, c: i32) -> i32 {
        let b = u8::try_from(c).unwrap_or_else(|_| panic!("fputc: character {c} out of range"));
        if self.write_bytes(&[b]) == 1 { c } else { -1 }
    }

    /// `fputs`: bytes written.
    pub fn puts(&self, s: Ptr) -> i32 {
        clamp(self.write_bytes(&cstr_bytes(s)))
    }

    /// `ftell`. `-1` with the error register set on failure.
    pub fn tell(&self) -> i64 {
        let mut inner = self.inner.lock();
        match inner.handle.stream_position() {
            Ok(pos) => {
                let pending = u64::from(inner.pushback.is_some());
                i64::try_from(pos.saturating_sub(pending)).unwrap_or(i64::MAX)
            }
            Err(e) => {
                set_err(duplicate(&e));
                inner.record(e);
                -1
            }
        }
    }

    /// Reposition; returns the new offset. Drops pushback and end-of-file.
    ///
    /// # Errors
    ///
    /// The host error for a failed seek or an unknown `whence`.
    pub fn seek_to(&self, off: i64, whence: i32) -> io::Result<u64> {
        let pos = match whence {
            SEEK_SET => SeekFrom::Start(
                u64::try_from(off).map_err(|_| io::Error::from_raw_os_error(libc::EINVAL))?,
            ),
            SEEK_CUR => SeekFrom::Current(off),
            SEEK_END => SeekFrom::End(off),
            _ => return Err(io::Error::from_raw_os_error(libc::EINVAL)),
        };
        let mut inner = self.inner.lock();
        let pending = inner.pushback.take().is_some();
        let pos = match pos {
            SeekFrom::Current(off) if pending => SeekFrom::Current(off - 1),
            other => other,
        };
        inner.eof = false;
        inner.handle.seek(pos)
    }

    /// `fseek`: 0 on success, `-1` on failure.
    pub fn seek(&self, off: i64, whence: i32) -> i32 {
        match self.seek_to(off, whence) {
            Ok(_) => 0,
            Err(e) => {
                self.set_err(e);
                -1
            }
        }
    }

    /// Run the scanf engine over this stream.
    ///
    /// A byte the scanner looked at but did not consume goes back into
    /// the pushback slot.
    ///
    /// # Errors
    ///
    /// Whatever the engine reports; end of input also sets the EOF flag.
    pub fn scan(&self, format: &[u8], args: &mut ArgList) -> Result<Vec<Commit>, ScanError> {
        let mut inner = self.inner.lock();
        let mut reader = SpaceReader::new(&mut *inner);
        let result = scan(&mut reader, format, args);
        let (_, lookahead) = reader.into_parts();
        if lookahead.is_some() {
            inner.pushback = lookahead;
        }
        if matches!(result, Err(ScanError::Eof)) {
            inner.eof = true;
        }
        result
    }
}

fn duplicate(e: &io::Error) -> io::Error {
    match e.raw_os_error() {
        Some(raw) => io::Error::from_raw_os_error(raw),
        None => io::Error::new(e.kind(), e.to_string()),
    }
}

fn clamp(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}
