use std::io;
use std::os::unix::fs::{FileTypeExt, MetadataExt, PermissionsExt};
use std::os::unix::net::UnixDatagram;
use std::path::{Path, PathBuf};
use std::time::Duration;

use bytes::Bytes;
use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::sys;

/// Default receive buffer: 1 MiB, above the largest inline datagram an
/// unprivileged sender can produce.
pub const DEFAULT_MAX_DATAGRAM: usize = 1024 * 1024;

/// How a received entry travelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The entry was the datagram payload.
    Inline,
    /// The entry was read from a sealed memfd passed with `SCM_RIGHTS`.
    Sealed,
}

/// One entry as received by a [`JournalListener`].
#[derive(Debug, Clone)]
pub struct ReceivedEntry {
    /// The raw encoded entry.
    pub payload: Bytes,
    /// Which delivery path carried it.
    pub delivery: Delivery,
}

/// Receiving end of the journal protocol, bound to a filesystem path.
///
/// Stands in for journald in tests and local development: it accepts inline
/// datagrams and memfd-passed entries alike and hands back the raw bytes.
/// The socket path is removed on drop if it still refers to the socket this
/// listener created.
pub struct JournalListener {
    socket: UnixDatagram,
    path: PathBuf,
    created_inode: Option<(u64, u64)>,
    max_datagram: usize,
}

impl JournalListener {
    /// Default permission mode for created socket paths.
    pub const DEFAULT_SOCKET_MODE: u32 = 0o600;

    /// Bind a datagram socket at `path`.
    ///
    /// If a stale socket already exists at `path` it is removed first; any
    /// other kind of file is left alone and binding fails.
    pub fn bind(path: impl AsRef<Path>) -> Result<Self> {
        Self::bind_with_mode(path, Self::DEFAULT_SOCKET_MODE)
    }

    /// Bind a datagram socket at `path` with an explicit permission mode.
    pub fn bind_with_mode(path: impl AsRef<Path>, mode: u32) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        sys::check_path_len(&path)?;

        if path.exists() {
            let metadata = std::fs::symlink_metadata(&path).map_err(|e| TransportError::Bind {
                path: path.clone(),
                source: e,
            })?;
            if metadata.file_type().is_socket() {
                debug!(?path, "removing stale socket");
                std::fs::remove_file(&path).map_err(|e| TransportError::Bind {
                    path: path.clone(),
                    source: e,
                })?;
            } else {
                return Err(TransportError::Bind {
                    path: path.clone(),
                    source: io::Error::new(
                        io::ErrorKind::AlreadyExists,
                        "existing path is not a unix socket",
                    ),
                });
            }
        }

        let socket = UnixDatagram::bind(&path).map_err(|e| TransportError::Bind {
            path: path.clone(),
            source: e,
        })?;

        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(mode)).map_err(|e| {
            TransportError::Bind {
                path: path.clone(),
                source: e,
            }
        })?;
        let created = std::fs::symlink_metadata(&path).map_err(|e| TransportError::Bind {
            path: path.clone(),
            source: e,
        })?;

        info!(?path, "listening for journal entries");

        Ok(Self {
            socket,
            path,
            created_inode: Some((created.dev(), created.ino())),
            max_datagram: DEFAULT_MAX_DATAGRAM,
        })
    }

    /// The path this listener is bound to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Set a receive timeout. `None` blocks indefinitely.
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.socket.set_read_timeout(timeout).map_err(Into::into)
    }

    /// Largest inline datagram accepted before reporting truncation.
    pub fn set_max_datagram_size(&mut self, size: usize) {
        self.max_datagram = size;
    }

    /// Receive the next entry (blocking).
    pub fn recv(&self) -> Result<ReceivedEntry> {
        #[cfg(target_os = "linux")]
        {
            self.recv_linux()
        }

        #[cfg(not(target_os = "linux"))]
        {
            let mut buf = vec![0u8; self.max_datagram];
            let n = self.socket.recv(&mut buf).map_err(TransportError::Receive)?;
            buf.truncate(n);
            Ok(ReceivedEntry {
                payload: Bytes::from(buf),
                delivery: Delivery::Inline,
            })
        }
    }

    #[cfg(target_os = "linux")]
    fn recv_linux(&self) -> Result<ReceivedEntry> {
        use std::fs::File;
        use std::os::fd::{AsRawFd, FromRawFd};
        use std::os::unix::fs::FileExt;

        let mut buf = vec![0u8; self.max_datagram];
        let mut control = [0u64; 8];
        let mut iov = libc::iovec {
            iov_base: buf.as_mut_ptr().cast::<libc::c_void>(),
            iov_len: buf.len(),
        };

        // SAFETY: all-zero is a valid msghdr; every pointer stored in it refers
        // to a local that outlives the recvmsg call.
        let mut msg: libc::msghdr = unsafe { std::mem::zeroed() };
        msg.msg_iov = &mut iov;
        msg.msg_iovlen = 1;
        msg.msg_control = control.as_mut_ptr().cast::<libc::c_void>();
        msg.msg_controllen = std::mem::size_of_val(&control) as _;

        let n = loop {
            // SAFETY: `msg` is fully initialised above and the socket is open.
            let rc = unsafe {
                libc::recvmsg(self.socket.as_raw_fd(), &mut msg, libc::MSG_CMSG_CLOEXEC)
            };
            if rc >= 0 {
                break rc as usize;
            }
            let err = io::Error::last_os_error();
            if err.kind() != io::ErrorKind::Interrupted {
                return Err(TransportError::Receive(err));
            }
        };

        let fds = received_descriptors(&msg);
        if msg.msg_flags & libc::MSG_TRUNC != 0 {
            close_all(&fds);
            return Err(TransportError::Truncated {
                capacity: self.max_datagram,
            });
        }

        let Some((&fd, rest)) = fds.split_first() else {
            buf.truncate(n);
            return Ok(ReceivedEntry {
                payload: Bytes::from(buf),
                delivery: Delivery::Inline,
            });
        };
        close_all(rest);

        // SAFETY: the kernel installed `fd` in this process for us; nothing
        // else owns it.
        let file = unsafe { File::from_raw_fd(fd) };

        let seals = crate::memfd::seals(file.as_raw_fd()).map_err(TransportError::Receive)?;
        if seals & crate::memfd::REQUIRED_SEALS != crate::memfd::REQUIRED_SEALS {
            return Err(TransportError::Receive(io::Error::new(
                io::ErrorKind::InvalidData,
                "passed descriptor is not sealed",
            )));
        }

        let len = file.metadata().map_err(TransportError::Receive)?.len() as usize;
        let mut payload = vec![0u8; len];
        file.read_exact_at(&mut payload, 0)
            .map_err(TransportError::Receive)?;

        debug!(size = len, "received sealed entry");
        Ok(ReceivedEntry {
            payload: Bytes::from(payload),
            delivery: Delivery::Sealed,
        })
    }
}

#[cfg(target_os = "linux")]
fn received_descriptors(msg: &libc::msghdr) -> Vec<libc::c_int> {
    let mut fds = Vec::new();
    // SAFETY: `msg` was filled by recvmsg, so the CMSG_* walk stays inside the
    // control buffer it describes.
    unsafe {
        let mut cmsg = libc::CMSG_FIRSTHDR(msg);
        while !cmsg.is_null() {
            if (*cmsg).cmsg_level == libc::SOL_SOCKET && (*cmsg).cmsg_type == libc::SCM_RIGHTS {
                let data = libc::CMSG_DATA(cmsg).cast::<libc::c_int>();
                let header = libc::CMSG_LEN(0) as usize;
                let count = ((*cmsg).cmsg_len as usize - header) / std::mem::size_of::<libc::c_int>();
                for i in 0..count {
                    fds.push(std::ptr::read_unaligned(data.add(i)));
                }
            }
            cmsg = libc::CMSG_NXTHDR(msg, cmsg);
        }
    }
    fds
}

#[cfg(target_os = "linux")]
fn close_all(fds: &[libc::c_int]) {
    for &fd in fds {
        // SAFETY: each descriptor was received by this process and is not
        // otherwise owned.
        unsafe {
            libc::close(fd);
        }
    }
}

impl Drop for JournalListener {
    fn drop(&mut self) {
        if let Some((expected_dev, expected_ino)) = self.created_inode {
            if let Ok(metadata) = std::fs::symlink_metadata(&self.path) {
                if metadata.file_type().is_socket()
                    && metadata.dev() == expected_dev
                    && metadata.ino() == expected_ino
                {
                    debug!(path = ?self.path, "cleaning up socket file");
                    let _ = std::fs::remove_file(&self.path);
                } else {
                    debug!(
                        path = ?self.path,
                        "socket path identity changed; skipping cleanup"
                    );
                }
            }
        }
    }
}

impl std::fmt::Debug for JournalListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JournalListener")
            .field("path", &self.path)
            .field("max_datagram", &self.max_datagram)
            .finish()
    }
}
