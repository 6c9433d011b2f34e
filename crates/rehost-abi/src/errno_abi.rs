//! The error register.
//!
//! One process-wide cell holds the visible `errno` together with the host
//! error that last set it. While generated code leaves `errno` unchanged,
//! [`str_error`] and [`error`] recover the original host error exactly.
//!
//! The register is shared by all threads, not thread-local: concurrent
//! callers observe each other's errors.

use std::io;
use std::sync::Arc;

use parking_lot::Mutex;
use rehost_core::errno::{code_for, host_description};
use rehost_membrane::Ptr;

use crate::string_abi::c_string;

struct Register {
    errno: i32,
    // Code stored by the last set_err, to detect writes from generated code.
    saved_code: i32,
    saved: Option<Arc<io::Error>>,
}

static REGISTER: Mutex<Register> = Mutex::new(Register {
    errno: 0,
    saved_code: 0,
    saved: None,
});

/// Classify a host error into its numeric code.
#[must_use]
pub fn err_code(err: &io::Error) -> i32 {
    code_for(err)
}

/// Store `err` and its code in the register.
pub fn set_err(err: io::Error) {
    let code = code_for(&err);
    let mut reg = REGISTER.lock();
    reg.errno = code;
    reg.saved_code = code;
    reg.saved = Some(Arc::new(err));
}

/// The visible `errno`.
#[must_use]
pub fn errno() -> i32 {
    REGISTER.lock().errno
}

/// Assignment to `errno` from generated code.
pub fn set_errno(code: i32) {
    REGISTER.lock().errno = code;
}

/// The host error behind `code`.
///
/// The saved error when `code` is what the last [`set_err`] stored,
/// otherwise a host error built from the number. `None` for 0.
#[must_use]
pub fn error_for(code: i32) -> Option<Arc<io::Error>> {
    if code == 0 {
        return None;
    }
    let reg = REGISTER.lock();
    match &reg.saved {
        Some(saved) if reg.saved_code == code => Some(Arc::clone(saved)),
        _ => Some(Arc::new(io::Error::from_raw_os_error(code))),
    }
}

/// The host error for the current `errno`.
#[must_use]
pub fn error() -> Option<Arc<io::Error>> {
    error_for(errno())
}

/// Message text for `code`.
#[must_use]
pub fn str_error_text(code: i32) -> String {
    let Some(err) = error_for(code) else {
        return "Success".to_string();
    };
    // Raw OS errors and the kinds classified by number read as the
    // host's strerror; anything else keeps its own message.
    if let Some(raw) = err.raw_os_error() {
        return host_description(raw);
    }
    let classified = matches!(
        err.kind(),
        io::ErrorKind::PermissionDenied | io::ErrorKind::NotFound | io::ErrorKind::AlreadyExists
    );
    if classified && err.get_ref().is_none() {
        host_description(code)
    } else {
        err.to_string()
    }
}

/// `strerror`: a new C string describing `code`.
#[must_use]
pub fn str_error(code: i32) -> Ptr {
    c_string(&str_error_text(code))
}

/// Clear the register.
pub fn reset() {
    let mut reg = REGISTER.lock();
    reg.errno = 0;
    reg.saved_code = 0;
    reg.saved = None;
}
