use std::io;
use std::sync::atomic::{AtomicBool, Ordering};

use rehost_abi::errno_abi::{err_code, errno, error, reset, set_err, set_errno, str_error};
use rehost_abi::string_abi::go_string;
use rehost_core::errno::host_description;

static TEST_GUARD_HELD: AtomicBool = AtomicBool::new(false);

struct TestGuard;

impl Drop for TestGuard {
    fn drop(&mut self) {
        TEST_GUARD_HELD.store(false, Ordering::Release);
    }
}

fn acquire_test_guard() -> TestGuard {
    loop {
        if TEST_GUARD_HELD
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
        {
            return TestGuard;
        }
        std::thread::yield_now();
    }
}

#[test]
fn permission_error_reads_as_host_text() {
    let _guard = acquire_test_guard();
    reset();
    set_err(io::Error::from(io::ErrorKind::PermissionDenied));
    assert_eq!(errno(), 13);
    assert_eq!(go_string(str_error(errno())), host_description(13));
}

#[test]
fn saved_error_survives_until_errno_changes() {
    let _guard = acquire_test_guard();
    reset();
    set_err(io::Error::other("disk on fire"));
    assert_eq!(errno(), 1);
    assert_eq!(go_string(str_error(1)), "disk on fire");
    assert_eq!(error().unwrap().to_string(), "disk on fire");

    set_errno(2);
    let err = error().unwrap();
    assert_eq!(err.raw_os_error(), Some(2));
    assert_eq!(go_string(str_error(2)), host_description(2));
}

#[test]
fn zero_is_success() {
    let _guard = acquire_test_guard();
    reset();
    assert_eq!(errno(), 0);
    assert!(error().is_none());
    assert_eq!(go_string(str_error(0)), "Success");
}

#[test]
fn raw_codes_pass_through_classification() {
    assert_eq!(err_code(&io::Error::from_raw_os_error(39)), 39);
    assert_eq!(err_code(&io::Error::from(io::ErrorKind::NotFound)), 2);
}
