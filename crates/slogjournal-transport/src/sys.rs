//! Thin wrappers over the socket options and addresses `std` does not expose.

use std::io;
use std::os::fd::AsRawFd;
use std::path::{Path, PathBuf};

use crate::error::{Result, TransportError};

/// Maximum socket path length.
/// Unix `sockaddr_un.sun_path` is typically 108 bytes on Linux, 104 on macOS.
#[cfg(target_os = "linux")]
pub(crate) const MAX_PATH_LEN: usize = 108;
#[cfg(not(target_os = "linux"))]
pub(crate) const MAX_PATH_LEN: usize = 104;

/// Reject paths that cannot fit in `sun_path` (including the trailing NUL).
pub(crate) fn check_path_len(path: &Path) -> Result<()> {
    let len = path.as_os_str().len();
    if len >= MAX_PATH_LEN {
        return Err(TransportError::PathTooLong {
            path: PathBuf::from(path),
            len,
            max: MAX_PATH_LEN,
        });
    }
    Ok(())
}

pub(crate) fn set_send_buffer_size(socket: &impl AsRawFd, size: usize) -> io::Result<()> {
    let value = libc::c_int::try_from(size).unwrap_or(libc::c_int::MAX);
    // SAFETY: `value` lives for the duration of the call and its size is passed
    // alongside; the descriptor is owned by `socket`.
    let rc = unsafe {
        libc::setsockopt(
            socket.as_raw_fd(),
            libc::SOL_SOCKET,
            libc::SO_SNDBUF,
            (&value as *const libc::c_int).cast::<libc::c_void>(),
            std::mem::size_of::<libc::c_int>() as libc::socklen_t,
        )
    };
    if rc == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

pub(crate) fn send_buffer_size(socket: &impl AsRawFd) -> io::Result<usize> {
    let mut value: libc::c_int = 0;
    let mut len = std::mem::size_of::<libc::c_int>() as libc::socklen_t;
    // SAFETY: `value` and `len` are valid writable pointers for the provided sizes,
    // and the descriptor is owned by `socket`.
    let rc = unsafe {
        libc::getsockopt(
            socket.as_raw_fd(),
            libc::SOL_SOCKET,
            libc::SO_SNDBUF,
            (&mut value as *mut libc::c_int).cast::<libc::c_void>(),
            &mut len,
        )
    };
    if rc == 0 {
        Ok(value.max(0) as usize)
    } else {
        Err(io::Error::last_os_error())
    }
}

/// A filesystem `sockaddr_un` ready to hand to `sendmsg`.
#[cfg(target_os = "linux")]
pub(crate) struct UnixAddr {
    addr: libc::sockaddr_un,
    len: libc::socklen_t,
}

#[cfg(target_os = "linux")]
impl UnixAddr {
    pub(crate) fn new(path: &Path) -> Result<Self> {
        use std::os::unix::ffi::OsStrExt;

        check_path_len(path)?;
        let bytes = path.as_os_str().as_bytes();

        // SAFETY: `sockaddr_un` is plain old data; all-zero is a valid value.
        let mut addr: libc::sockaddr_un = unsafe { std::mem::zeroed() };
        addr.sun_family = libc::AF_UNIX as libc::sa_family_t;
        for (dst, src) in addr.sun_path.iter_mut().zip(bytes) {
            *dst = *src as libc::c_char;
        }

        let len = std::mem::offset_of!(libc::sockaddr_un, sun_path) + bytes.len() + 1;
        Ok(Self {
            addr,
            len: len as libc::socklen_t,
        })
    }

    pub(crate) fn as_ptr(&self) -> *const libc::sockaddr_un {
        &self.addr
    }

    pub(crate) fn len(&self) -> libc::socklen_t {
        self.len
    }
}
