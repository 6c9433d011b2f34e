//! Pluggable filesystem provider.
//!
//! Every file operation of the runtime goes through the installed
//! [`Filesystem`]. The default is [`LocalFs`], the host filesystem. Install
//! another provider with [`set_fs`](crate::file_abi::set_fs) before the
//! first file is opened; swapping providers while files are open leaves
//! those files bound to the old one.

use std::fs::OpenOptions;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::os::fd::AsRawFd;

use rehost_core::stdio::OpenFlags;

/// An open file as seen by the runtime.
pub trait FileHandle: Read + Write + Seek + Send {
    /// Descriptor number the file is registered under.
    fn fd(&self) -> usize;

    fn name(&self) -> String;

    /// Flush buffered data to the backing store.
    ///
    /// # Errors
    ///
    /// Returns the host error if the flush fails.
    fn sync(&mut self) -> io::Result<()>;

    /// Release the file. The handle is dropped afterwards either way.
    ///
    /// # Errors
    ///
    /// Returns the host error if closing fails.
    fn close(&mut self) -> io::Result<()> {
        self.flush()
    }
}

/// Result of a `stat` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileStat {
    pub size: u64,
    pub is_dir: bool,
}

/// A source of files and path operations.
pub trait Filesystem: Send + Sync {
    fn stdout(&self) -> Box<dyn FileHandle>;
    fn stderr(&self) -> Box<dyn FileHandle>;
    fn stdin(&self) -> Box<dyn FileHandle>;

    /// # Errors
    ///
    /// Host error when the working directory cannot be determined.
    fn getwd(&self) -> io::Result<String>;

    /// # Errors
    ///
    /// Host error when the directory cannot be entered.
    fn chdir(&self, path: &str) -> io::Result<()>;

    /// Remove `path` and everything below it.
    ///
    /// # Errors
    ///
    /// Host error when removal fails.
    fn rmdir(&self, path: &str) -> io::Result<()>;

    /// # Errors
    ///
    /// Host error when removal fails.
    fn unlink(&self, path: &str) -> io::Result<()>;

    /// Open `path` with `flags`; `mode` gives permissions for created files.
    ///
    /// # Errors
    ///
    /// Host error when the file cannot be opened.
    fn open(&self, path: &str, flags: OpenFlags, mode: u32) -> io::Result<Box<dyn FileHandle>>;

    /// # Errors
    ///
    /// Host error when `path` does not exist or cannot be inspected.
    fn stat(&self, path: &str) -> io::Result<FileStat>;

    /// Names of the entries in directory `path`, without `.` and `..`, in
    /// no particular order.
    ///
    /// # Errors
    ///
    /// Host error when `path` is not a readable directory.
    fn read_dir(&self, path: &str) -> io::Result<Vec<String>>;
}

// ---------------------------------------------------------------------------
// Host filesystem
// ---------------------------------------------------------------------------

/// The host filesystem and standard streams.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFs;

struct LocalFile {
    file: std::fs::File,
    name: String,
}

impl Read for LocalFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

impl Write for LocalFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

impl Seek for LocalFile {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.file.seek(pos)
    }
}

impl FileHandle for LocalFile {
    fn fd(&self) -> usize {
        usize::try_from(self.file.as_raw_fd()).unwrap_or_default()
    }

    fn name(&self) -> String {
        self.name.clone()
    }

    fn sync(&mut self) -> io::Result<()> {
        self.file.sync_all()
    }
}

#[derive(Debug, Clone, Copy)]
enum Stream {
    In,
    Out,
    Err,
}

struct LocalStream(Stream);

fn not_readable() -> io::Error {
    io::Error::from_raw_os_error(libc::EBADF)
}

impl Read for LocalStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.0 {
            Stream::In => io::stdin().read(buf),
            Stream::Out | Stream::Err => Err(not_readable()),
        }
    }
}

impl Write for LocalStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.0 {
            Stream::In => Err(not_readable()),
            Stream::Out => io::stdout().write(buf),
            Stream::Err => io::stderr().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.0 {
            Stream::In => Ok(()),
            Stream::Out => io::stdout().flush(),
            Stream::Err => io::stderr().flush(),
        }
    }
}

impl Seek for LocalStream {
    fn seek(&mut self, _pos: SeekFrom) -> io::Result<u64> {
        Err(io::Error::from_raw_os_error(libc::ESPIPE))
    }
}

impl FileHandle for LocalStream {
    fn fd(&self) -> usize {
        match self.0 {
            Stream::In => 0,
            Stream::Out => 1,
            Stream::Err => 2,
        }
    }

    fn name(&self) -> String {
        match self.0 {
            Stream::In => "/dev/stdin",
            Stream::Out => "/dev/stdout",
            Stream::Err => "/dev/stderr",
        }
        .to_string()
    }

    fn sync(&mut self) -> io::Result<()> {
        self.flush()
    }

    fn close(&mut self) -> io::Result<()> {
        self.flush()
    }
}

impl Filesystem for LocalFs {
    fn stdout(&self) -> Box<dyn FileHandle> {
        Box::new(LocalStream(Stream::Out))
    }

    fn stderr(&self) -> Box<dyn FileHandle> {
        Box::new(LocalStream(Stream::Err))
    }

    fn stdin(&self) -> Box<dyn FileHandle> {
        Box::new(LocalStream(Stream::In))
    }

    fn getwd(&self) -> io::Result<String> {
        Ok(std::env::current_dir()?.to_string_lossy().into_owned())
    }

    fn chdir(&self, path: &str) -> io::Result<()> {
        std::env::set_current_dir(path)
    }

    fn rmdir(&self, path: &str) -> io::Result<()> {
        std::fs::remove_dir_all(path)
    }

    fn unlink(&self, path: &str) -> io::Result<()> {
        std::fs::remove_file(path)
    }

    fn open(&self, path: &str, flags: OpenFlags, mode: u32) -> io::Result<Box<dyn FileHandle>> {
        use std::os::unix::fs::OpenOptionsExt;

        let file = OpenOptions::new()
            .read(flags.readable)
            .write(flags.writable && !flags.append)
            .append(flags.append)
            .truncate(flags.truncate)
            .create(flags.create)
            .mode(mode)
            .open(path)?;
        Ok(Box::new(LocalFile {
            file,
            name: path.to_string(),
        }))
    }

    fn stat(&self, path: &str) -> io::Result<FileStat> {
        let meta = std::fs::metadata(path)?;
        Ok(FileStat {
            size: meta.len(),
            is_dir: meta.is_dir(),
        })
    }

    fn read_dir(&self, path: &str) -> io::Result<Vec<String>> {
        std::fs::read_dir(path)?
            .map(|entry| Ok(entry?.file_name().to_string_lossy().into_owned()))
            .collect()
    }
}
