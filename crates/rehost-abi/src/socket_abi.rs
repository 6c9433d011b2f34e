//! `<sys/socket.h>` subset over host sockets.
//!
//! Constants use the numbering generated code was compiled against and are
//! mapped to the host's before each call. Only IPv4 wildcard binds and the
//! broadcast option are emulated.

use std::io;

use rehost_membrane::{Ptr, global_space};

use crate::errno_abi::set_err;

pub const AF_INET: i32 = 2;
pub const SOCK_STREAM: i32 = 1;
pub const SOCK_DGRAM: i32 = 2;
pub const SOL_SOCKET: i32 = 0xffff;
pub const SO_BROADCAST: i32 = 0x20;

fn host_result(rc: libc::c_int) -> i32 {
    if rc < 0 {
        set_err(io::Error::last_os_error());
        return -1;
    }
    rc
}

fn host_family(domain: i32) -> Option<libc::c_int> {
    (domain == AF_INET).then_some(libc::AF_INET)
}

fn host_type(kind: i32) -> Option<libc::c_int> {
    match kind {
        SOCK_STREAM => Some(libc::SOCK_STREAM),
        SOCK_DGRAM => Some(libc::SOCK_DGRAM),
        _ => None,
    }
}

/// New socket descriptor, or `-1` with the register set.
pub fn socket(domain: i32, kind: i32, protocol: i32) -> i32 {
    let (Some(family), Some(ty)) = (host_family(domain), host_type(kind)) else {
        set_err(io::Error::from_raw_os_error(libc::EAFNOSUPPORT));
        return -1;
    };
    trace_call!("socket", "socket", {"domain": domain, "type": kind, "protocol": protocol});
    // SAFETY: socket takes no pointers; any argument values are safe.
    host_result(unsafe { libc::socket(family, ty, protocol) })
}

/// Binds `fd` to the IPv4 wildcard address at the port stored in the
/// `sockaddr_in` at `addr`.
///
/// # Panics
///
/// Panics for a specific (non-zero) IPv4 address, which is not emulated.
pub fn bind(fd: i32, addr: Ptr, len: usize) -> i32 {
    assert!(len >= 8, "bind: address size should be at least 8, got {len}");
    let raw = global_space().read(addr, 8);
    let family = i16::from_le_bytes([raw[0], raw[1]]);
    if i32::from(family) != AF_INET {
        set_err(io::Error::from_raw_os_error(libc::EAFNOSUPPORT));
        return -1;
    }
    let port = u16::from_be_bytes([raw[2], raw[3]]);
    if raw[4..8] != [0; 4] {
        not_emulated!("bind to a specific address");
    }
    trace_call!("socket", "bind", {"fd": fd, "port": port});

    // SAFETY: sockaddr_in is plain old data; all-zero is a valid value.
    let mut sa: libc::sockaddr_in = unsafe { std::mem::zeroed() };
    sa.sin_family = libc::AF_INET as libc::sa_family_t;
    sa.sin_port = port.to_be();
    sa.sin_addr = libc::in_addr {
        s_addr: libc::INADDR_ANY,
    };
    let size = std::mem::size_of::<libc::sockaddr_in>() as libc::socklen_t;
    // SAFETY: `sa` is a valid sockaddr_in for the duration of the call and
    // `size` is its exact size.
    host_result(unsafe { libc::bind(fd, (&raw const sa).cast::<libc::sockaddr>(), size) })
}

/// Sets `SO_BROADCAST` from the `int` at `value`.
///
/// # Panics
///
/// Panics for any other level or option, or when `size` is not 4.
pub fn setsockopt(fd: i32, level: i32, option: i32, value: Ptr, size: usize) -> i32 {
    if level != SOL_SOCKET || option != SO_BROADCAST {
        not_emulated!("setsockopt option");
    }
    assert!(size == 4, "setsockopt: option size should be 4, got {size}");
    let raw = global_space().read(value, 4);
    let flag: libc::c_int = i32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]);
    trace_call!("socket", "setsockopt", {"fd": fd, "broadcast": flag});
    // SAFETY: `flag` lives across the call and the length matches its type.
    host_result(unsafe {
        libc::setsockopt(
            fd,
            libc::SOL_SOCKET,
            libc::SO_BROADCAST,
            (&raw const flag).cast::<libc::c_void>(),
            std::mem::size_of::<libc::c_int>() as libc::socklen_t,
        )
    })
}

/// Copies the host name and its terminator into `buf`. `ENAMETOOLONG`
/// when they do not fit in `size` bytes.
pub fn gethostname(buf: Ptr, size: usize) -> i32 {
    let mut name = [0u8; 256];
    // SAFETY: `name` is writable for its full length.
    let rc = unsafe { libc::gethostname(name.as_mut_ptr().cast::<libc::c_char>(), name.len()) };
    if host_result(rc) < 0 {
        return -1;
    }
    let len = name.iter().position(|&b| b == 0).unwrap_or(name.len() - 1);
    if len + 1 > size {
        set_err(io::Error::from_raw_os_error(libc::ENAMETOOLONG));
        return -1;
    }
    global_space().write(buf, &name[..=len]);
    0
}

pub fn accept(_fd: i32, _addr: Ptr, _len: Ptr) -> i32 {
    not_emulated!("accept")
}

pub fn listen(_fd: i32, _backlog: i32) -> i32 {
    not_emulated!("listen")
}

pub fn shutdown(_fd: i32, _how: i32) -> i32 {
    not_emulated!("shutdown")
}

pub fn send(_fd: i32, _buf: Ptr, _len: usize, _flags: i32) -> isize {
    not_emulated!("send")
}

pub fn sendto(_fd: i32, _buf: Ptr, _len: usize, _flags: i32, _addr: Ptr, _addr_len: usize) -> isize {
    not_emulated!("sendto")
}

pub fn recv(_fd: i32, _buf: Ptr, _len: usize, _flags: i32) -> isize {
    not_emulated!("recv")
}

pub fn recvfrom(_fd: i32, _buf: Ptr, _len: usize, _flags: i32, _addr: Ptr, _addr_len: Ptr) -> isize {
    not_emulated!("recvfrom")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_family_is_rejected() {
        assert_eq!(socket(99, SOCK_STREAM, 0), -1);
    }

    #[test]
    fn hostname_fits_and_is_terminated() {
        let buf = global_space().allocate(256, 0);
        assert_eq!(gethostname(buf, 256), 0);
        let bytes = global_space().read(buf, 256);
        assert!(bytes.contains(&0));
    }

    #[test]
    #[should_panic(expected = "listen: not emulated")]
    fn listen_is_not_emulated() {
        listen(0, 1);
    }
}
