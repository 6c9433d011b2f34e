//! Error numbers.
//!
//! Two numberings meet here. The `E*` constants are the emulated
//! `<errno.h>` table that generated code compares against. Host errors are
//! classified by [`code_for`], which yields the host OS number so that
//! [`host_description`] recovers the exact host message.

use std::io;

macro_rules! errno_table {
    ($($name:ident = $value:expr),* $(,)?) => {
        $(pub const $name: i32 = $value;)*

        /// Every emulated constant with its name, in table order.
        pub const ERRNO_TABLE: &[(&str, i32)] = &[$((stringify!($name), $value)),*];
    };
}

errno_table! {
    E2BIG = 2,
    EACCES = 3,
    EADDRINUSE = 4,
    EADDRNOTAVAIL = 5,
    EAFNOSUPPORT = 6,
    EAGAIN = 7,
    EALREADY = 8,
    EBADF = 9,
    EBADMSG = 10,
    EBUSY = 11,
    ECANCELED = 12,
    ECHILD = 13,
    ECONNABORTED = 14,
    ECONNREFUSED = 15,
    ECONNRESET = 16,
    EDEADLK = 17,
    EDESTADDRREQ = 18,
    EDOM = 19,
    EDQUOT = 20,
    EEXIST = 21,
    EFAULT = 22,
    EFBIG = 23,
    EHOSTUNREACH = 24,
    EIDRM = 25,
    EILSEQ = 26,
    EINPROGRESS = 27,
    EINTR = 28,
    EINVAL = 29,
    EIO = 30,
    EISCONN = 31,
    EISDIR = 32,
    ELOOP = 33,
    EMFILE = 34,
    EMLINK = 35,
    EMSGSIZE = 36,
    EMULTIHOP = 37,
    ENAMETOOLONG = 38,
    ENETDOWN = 39,
    ENETRESET = 40,
    ENETUNREACH = 41,
    ENFILE = 42,
    ENOBUFS = 43,
    ENODATA = 44,
    ENODEV = 45,
    ENOENT = 46,
    ENOEXEC = 47,
    ENOLCK = 48,
    ENOLINK = 49,
    ENOMEM = 50,
    ENOMSG = 51,
    ENOPROTOOPT = 52,
    ENOSPC = 53,
    ENOSR = 54,
    ENOSTR = 55,
    ENOSYS = 56,
    ENOTCONN = 57,
    ENOTDIR = 58,
    ENOTEMPTY = 59,
    ENOTRECOVERABLE = 60,
    ENOTSOCK = 61,
    ENOTSUP = 62,
    ENOTTY = 63,
    ENXIO = 64,
    EOPNOTSUPP = 65,
    EOVERFLOW = 66,
    EOWNERDEAD = 67,
    EPERM = 68,
    EPIPE = 69,
    EPROTO = 79,
    EPROTONOSUPPORT = 80,
    EPROTOTYPE = 81,
    ERANGE = 82,
    EROFS = 83,
    ESPIPE = 84,
    ESRCH = 85,
    ESTALE = 86,
    ETIME = 87,
    ETIMEDOUT = 88,
    ETXTBSY = 89,
    EWOULDBLOCK = 90,
    EXDEV = 91,
}

/// Host code for permission failures.
pub const HOST_EACCES: i32 = 13;
/// Host code for missing files.
pub const HOST_ENOENT: i32 = 2;
/// Host code for existing files.
pub const HOST_EEXIST: i32 = 17;
/// Code for every unclassified host error.
pub const HOST_EGENERIC: i32 = 1;

/// Value of the emulated constant called `name`.
#[must_use]
pub fn lookup(name: &str) -> Option<i32> {
    ERRNO_TABLE
        .iter()
        .find(|(n, _)| *n == name)
        .map(|&(_, v)| v)
}

/// Name of the emulated constant with `value`.
#[must_use]
pub fn name_of(value: i32) -> Option<&'static str> {
    ERRNO_TABLE
        .iter()
        .find(|(_, v)| *v == value)
        .map(|&(n, _)| n)
}

/// Classifies a host error into its numeric code.
///
/// Permission, not-found and already-exists map to 13, 2 and 17; an error
/// carrying a raw OS code passes it through; anything else is 1.
#[must_use]
pub fn code_for(err: &io::Error) -> i32 {
    match err.kind() {
        io::ErrorKind::PermissionDenied => HOST_EACCES,
        io::ErrorKind::NotFound => HOST_ENOENT,
        io::ErrorKind::AlreadyExists => HOST_EEXIST,
        _ => err.raw_os_error().unwrap_or(HOST_EGENERIC),
    }
}

/// The host's message for `code`, without the trailing `(os error N)`.
#[must_use]
pub fn host_description(code: i32) -> String {
    let text = io::Error::from_raw_os_error(code).to_string();
    match text.rfind(" (os error ") {
        Some(i) => text[..i].to_owned(),
        None => text,
    }
}
