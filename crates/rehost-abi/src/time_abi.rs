//! `<time.h>` subset.
//!
//! `time_t` is 32 bits wide. A `struct tm` occupies [`TM_SIZE`] bytes:
//! nine `i32` fields, then the zone name address at offset 40 and the UTC
//! offset in seconds (`i32`) at offset 48.

use std::io;
use std::sync::OnceLock;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use rehost_core::time::{self as core_time, BrokenDownTime};
use rehost_membrane::{Ptr, WORD_SIZE, global_space};

use crate::errno_abi::set_err;
use crate::string_abi::{c_string, load_i32, store_i32, store_ptr};

pub use rehost_core::time::CLOCKS_PER_SEC;

/// Size of a `struct tm`.
pub const TM_SIZE: usize = 56;

const TM_SEC: usize = 0;
const TM_MIN: usize = 4;
const TM_HOUR: usize = 8;
const TM_MDAY: usize = 12;
const TM_MON: usize = 16;
const TM_YEAR: usize = 20;
const TM_WDAY: usize = 24;
const TM_YDAY: usize = 28;
const TM_ISDST: usize = 32;
const TM_ZONE: usize = 40;
const TM_GMTOFF: usize = 48;

fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
}

/// Seconds since the Unix epoch, truncated to 32 bits. Also stored at
/// `dst` when it is not null.
pub fn time(dst: Ptr) -> i32 {
    #[allow(clippy::cast_possible_truncation)]
    let t = now_secs() as i32;
    if !dst.is_null() {
        store_i32(dst, t);
    }
    t
}

static CLOCK_START: OnceLock<Instant> = OnceLock::new();

/// Fix the origin of [`clock`]. Later calls keep the first origin.
pub(crate) fn pin_clock_start() -> Instant {
    *CLOCK_START.get_or_init(Instant::now)
}

/// Microseconds elapsed since runtime start.
///
/// The origin is pinned by [`start`](crate::startup_abi::start). A program
/// that never calls it counts from its first `clock` call instead.
pub fn clock() -> i64 {
    i64::try_from(pin_clock_start().elapsed().as_micros()).unwrap_or(i64::MAX)
}

pub fn clock_getres(_clock: i32, _res: Ptr) -> i32 {
    not_emulated!("clock_getres")
}

pub fn clock_gettime(_clock: i32, _tp: Ptr) -> i32 {
    not_emulated!("clock_gettime")
}

pub fn clock_settime(_clock: i32, _tp: Ptr) -> i32 {
    not_emulated!("clock_settime")
}

// ---------------------------------------------------------------------------
// struct tm
// ---------------------------------------------------------------------------

fn load_tm(p: Ptr) -> BrokenDownTime {
    BrokenDownTime {
        sec: load_i32(p.add(TM_SEC)),
        min: load_i32(p.add(TM_MIN)),
        hour: load_i32(p.add(TM_HOUR)),
        mday: load_i32(p.add(TM_MDAY)),
        mon: load_i32(p.add(TM_MON)),
        year: load_i32(p.add(TM_YEAR)),
        wday: load_i32(p.add(TM_WDAY)),
        yday: load_i32(p.add(TM_YDAY)),
        isdst: load_i32(p.add(TM_ISDST)),
    }
}

fn store_tm(p: Ptr, tm: &BrokenDownTime, gmtoff: i32) {
    store_i32(p.add(TM_SEC), tm.sec);
    store_i32(p.add(TM_MIN), tm.min);
    store_i32(p.add(TM_HOUR), tm.hour);
    store_i32(p.add(TM_MDAY), tm.mday);
    store_i32(p.add(TM_MON), tm.mon);
    store_i32(p.add(TM_YEAR), tm.year);
    store_i32(p.add(TM_WDAY), tm.wday);
    store_i32(p.add(TM_YDAY), tm.yday);
    store_i32(p.add(TM_ISDST), tm.isdst);
    store_ptr(p.add(TM_ZONE), Ptr::NULL);
    store_i32(p.add(TM_GMTOFF), gmtoff);
}

fn new_tm(tm: &BrokenDownTime, gmtoff: i32) -> Ptr {
    let p = global_space().allocate(TM_SIZE, WORD_SIZE);
    store_tm(p, tm, gmtoff);
    p
}

fn from_host(tm: &libc::tm) -> BrokenDownTime {
    BrokenDownTime {
        sec: tm.tm_sec,
        min: tm.tm_min,
        hour: tm.tm_hour,
        mday: tm.tm_mday,
        mon: tm.tm_mon,
        year: tm.tm_year,
        wday: tm.tm_wday,
        yday: tm.tm_yday,
        isdst: tm.tm_isdst,
    }
}

/// Host local time for `secs`, with its UTC offset.
fn host_localtime(secs: i64) -> Option<(BrokenDownTime, i32)> {
    let t = libc::time_t::try_from(secs).ok()?;
    // SAFETY: `tm` is plain data; all-zero is a valid value (null zone).
    let mut tm: libc::tm = unsafe { std::mem::zeroed() };
    // SAFETY: both pointers refer to live locals for the whole call.
    let rc = unsafe { libc::localtime_r(&raw const t, &raw mut tm) };
    if rc.is_null() {
        return None;
    }
    let gmtoff = i32::try_from(tm.tm_gmtoff).unwrap_or(0);
    Some((from_host(&tm), gmtoff))
}

fn read_time(func: &str, t: Ptr) -> i64 {
    assert!(!t.is_null(), "{func}: null time pointer");
    i64::from(load_i32(t))
}

/// `localtime`: a new `struct tm` for the `time_t` at `t` in the host zone,
/// or null with the register set when the host cannot convert it.
///
/// # Panics
///
/// Panics if `t` is null.
pub fn localtime(t: Ptr) -> Ptr {
    let secs = read_time("localtime", t);
    match host_localtime(secs) {
        Some((tm, gmtoff)) => new_tm(&tm, gmtoff),
        None => {
            set_err(io::Error::last_os_error());
            Ptr::NULL
        }
    }
}

/// `gmtime`: a new `struct tm` for the `time_t` at `t` in UTC.
///
/// # Panics
///
/// Panics if `t` is null.
pub fn gmtime(t: Ptr) -> Ptr {
    let secs = read_time("gmtime", t);
    new_tm(&core_time::epoch_to_broken_down(secs), 0)
}

/// `mktime`: local broken-down time to `time_t`.
///
/// Out-of-range fields are normalized and written back, with `wday` and
/// `yday` filled in. A null `tm` yields the current time. Returns `-1` with
/// the register set when the result does not fit.
pub fn mktime(tm: Ptr) -> i32 {
    if tm.is_null() {
        return time(Ptr::NULL);
    }
    let fields = load_tm(tm);
    // SAFETY: `tm` is plain data; all-zero is a valid value (null zone).
    let mut host: libc::tm = unsafe { std::mem::zeroed() };
    host.tm_sec = fields.sec;
    host.tm_min = fields.min;
    host.tm_hour = fields.hour;
    host.tm_mday = fields.mday;
    host.tm_mon = fields.mon;
    host.tm_year = fields.year;
    host.tm_isdst = fields.isdst;
    // SAFETY: `host` is a live local for the whole call.
    let t = unsafe { libc::mktime(&raw mut host) };
    let t32 = match i32::try_from(t) {
        Ok(v) if t != -1 => v,
        _ => {
            set_err(io::Error::from_raw_os_error(libc::EOVERFLOW));
            return -1;
        }
    };
    let gmtoff = i32::try_from(host.tm_gmtoff).unwrap_or(0);
    store_tm(tm, &from_host(&host), gmtoff);
    t32
}

/// `asctime`: a new C string such as `"Thu Jan  1 00:00:00 1970\n"`.
/// Fields are normalized first, so the weekday always matches the date.
///
/// # Panics
///
/// Panics if `tm` is null.
pub fn asctime(tm: Ptr) -> Ptr {
    assert!(!tm.is_null(), "asctime: null tm pointer");
    let fields = core_time::normalize(&load_tm(tm));
    c_string(&core_time::asctime(&fields))
}

/// `ctime`: `asctime(localtime(t))`.
pub fn ctime(t: Ptr) -> Ptr {
    let tm = localtime(t);
    if tm.is_null() {
        return Ptr::NULL;
    }
    asctime(tm)
}
