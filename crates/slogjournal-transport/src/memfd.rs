//! Sealed-memfd delivery for entries too large for a single datagram.

use std::fs::File;
use std::io::{self, Write};
use std::os::fd::{AsRawFd, FromRawFd, RawFd};
use std::os::unix::net::UnixDatagram;

use crate::sys::UnixAddr;

/// Seals applied before the descriptor leaves the process. Once set, the
/// contents can be neither modified nor resized, and no further seals added.
pub(crate) const PAYLOAD_SEALS: libc::c_int =
    libc::F_SEAL_SHRINK | libc::F_SEAL_GROW | libc::F_SEAL_WRITE | libc::F_SEAL_SEAL;

/// Seals a receiver must observe before trusting a passed payload.
pub(crate) const REQUIRED_SEALS: libc::c_int =
    libc::F_SEAL_SHRINK | libc::F_SEAL_GROW | libc::F_SEAL_WRITE;

/// Copy `entry` into a fresh anonymous memfd and seal it.
pub(crate) fn sealed_payload(entry: &[u8]) -> io::Result<File> {
    // SAFETY: the name is a NUL-terminated literal and the flags are valid for
    // memfd_create.
    let fd = unsafe {
        libc::memfd_create(
            c"slogjournal-entry".as_ptr(),
            libc::MFD_CLOEXEC | libc::MFD_ALLOW_SEALING,
        )
    };
    if fd < 0 {
        return Err(io::Error::last_os_error());
    }
    // SAFETY: `fd` was just returned by memfd_create and is owned by nothing else.
    let mut file = unsafe { File::from_raw_fd(fd) };

    file.write_all(entry)?;

    // SAFETY: `file` owns an open memfd created with MFD_ALLOW_SEALING.
    let rc = unsafe { libc::fcntl(file.as_raw_fd(), libc::F_ADD_SEALS, PAYLOAD_SEALS) };
    if rc < 0 {
        return Err(io::Error::last_os_error());
    }

    Ok(file)
}

/// Read back the seals currently set on `fd`.
pub(crate) fn seals(fd: RawFd) -> io::Result<libc::c_int> {
    // SAFETY: F_GET_SEALS takes no argument and only inspects the descriptor.
    let rc = unsafe { libc::fcntl(fd, libc::F_GET_SEALS) };
    if rc < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(rc)
    }
}

/// Send an empty datagram to `addr` carrying `fd` as `SCM_RIGHTS`.
pub(crate) fn send_descriptor(socket: &UnixDatagram, addr: &UnixAddr, fd: RawFd) -> io::Result<()> {
    // u64 storage keeps the control buffer aligned for `cmsghdr`.
    let mut control = [0u64; 8];
    let fd_len = std::mem::size_of::<libc::c_int>() as libc::c_uint;

    // SAFETY: every pointer placed in `msg` refers to a local that outlives the
    // sendmsg call; `control` is large enough for one descriptor's CMSG_SPACE
    // and is suitably aligned; CMSG_FIRSTHDR is non-null because
    // msg_controllen covers a full header.
    let rc = unsafe {
        let space = libc::CMSG_SPACE(fd_len) as usize;
        debug_assert!(space <= std::mem::size_of_val(&control));

        let mut msg: libc::msghdr = std::mem::zeroed();
        msg.msg_name = addr.as_ptr() as *mut libc::c_void;
        msg.msg_namelen = addr.len();
        msg.msg_iov = std::ptr::null_mut();
        msg.msg_iovlen = 0;
        msg.msg_control = control.as_mut_ptr().cast::<libc::c_void>();
        msg.msg_controllen = space as _;

        let cmsg = libc::CMSG_FIRSTHDR(&msg);
        (*cmsg).cmsg_level = libc::SOL_SOCKET;
        (*cmsg).cmsg_type = libc::SCM_RIGHTS;
        (*cmsg).cmsg_len = libc::CMSG_LEN(fd_len) as _;
        std::ptr::write_unaligned(libc::CMSG_DATA(cmsg).cast::<libc::c_int>(), fd);

        libc::sendmsg(socket.as_raw_fd(), &msg, libc::MSG_NOSIGNAL)
    };

    if rc < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}
