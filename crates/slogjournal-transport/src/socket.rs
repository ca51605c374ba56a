use std::io;
use std::os::unix::net::UnixDatagram;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, TransportError};
use crate::sys;
use crate::traits::Transport;

/// Well-known journald native-protocol socket.
pub const DEFAULT_SOCKET_PATH: &str = "/run/systemd/journal/socket";

/// Send buffer requested at construction: 8 MiB.
///
/// The kernel clamps this to `net.core.wmem_max` for unprivileged processes;
/// anything above the effective limit takes the memfd path.
pub const DEFAULT_SEND_BUFFER_SIZE: usize = 8 * 1024 * 1024;

/// Configuration for [`JournalSocket`].
#[derive(Debug, Clone)]
pub struct JournalConfig {
    /// Datagram socket entries are delivered to.
    pub socket_path: PathBuf,
    /// `SO_SNDBUF` to request. `None` keeps the kernel default.
    pub send_buffer_size: Option<usize>,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            socket_path: PathBuf::from(DEFAULT_SOCKET_PATH),
            send_buffer_size: Some(DEFAULT_SEND_BUFFER_SIZE),
        }
    }
}

impl JournalConfig {
    /// Default configuration aimed at a different socket path.
    pub fn with_socket_path(path: impl Into<PathBuf>) -> Self {
        Self {
            socket_path: path.into(),
            ..Self::default()
        }
    }
}

/// Unbound datagram socket that delivers entries to the journal.
///
/// Each [`send`](Transport::send) is a single `sendto`. If the kernel rejects
/// the datagram with `EMSGSIZE` or `ENOBUFS`, the entry is copied into a
/// sealed memfd and the descriptor is sent instead. Both paths deliver the
/// whole entry or nothing.
pub struct JournalSocket {
    socket: UnixDatagram,
    path: PathBuf,
    #[cfg(target_os = "linux")]
    addr: sys::UnixAddr,
}

impl JournalSocket {
    /// Open a socket for the default journal path.
    pub fn open() -> Result<Self> {
        Self::with_config(JournalConfig::default())
    }

    /// Open a socket with explicit configuration.
    ///
    /// Fails if the platform has no memfd support or the path cannot be
    /// addressed. The journal itself need not be running yet.
    pub fn with_config(config: JournalConfig) -> Result<Self> {
        #[cfg(not(target_os = "linux"))]
        {
            let _ = config;
            return Err(TransportError::Unsupported);
        }

        #[cfg(target_os = "linux")]
        {
            let path = config.socket_path;
            let addr = sys::UnixAddr::new(&path)?;
            let socket = UnixDatagram::unbound().map_err(TransportError::Socket)?;

            if let Some(size) = config.send_buffer_size {
                if let Err(err) = sys::set_send_buffer_size(&socket, size) {
                    debug!(size, error = %err, "could not raise journal socket send buffer");
                }
            }

            debug!(?path, "opened journal socket");
            Ok(Self { socket, path, addr })
        }
    }

    /// The journal socket path entries are sent to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Request a new `SO_SNDBUF` size.
    ///
    /// Smaller buffers make the memfd fallback engage at smaller entry sizes.
    pub fn set_send_buffer_size(&self, size: usize) -> Result<()> {
        sys::set_send_buffer_size(&self.socket, size).map_err(TransportError::Io)
    }

    /// The effective `SO_SNDBUF` size reported by the kernel.
    pub fn send_buffer_size(&self) -> Result<usize> {
        sys::send_buffer_size(&self.socket).map_err(TransportError::Io)
    }

    #[cfg(target_os = "linux")]
    fn send_sealed(&self, entry: &[u8]) -> Result<()> {
        use std::os::fd::AsRawFd;

        let payload = crate::memfd::sealed_payload(entry).map_err(TransportError::Memfd)?;
        crate::memfd::send_descriptor(&self.socket, &self.addr, payload.as_raw_fd()).map_err(
            |source| TransportError::Send {
                path: self.path.clone(),
                source,
            },
        )
    }

    #[cfg(not(target_os = "linux"))]
    fn send_sealed(&self, _entry: &[u8]) -> Result<()> {
        Err(TransportError::Unsupported)
    }
}

impl std::fmt::Debug for JournalSocket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JournalSocket")
            .field("path", &self.path)
            .finish()
    }
}

/// The kernel refused the datagram because of its size.
fn is_oversize(err: &io::Error) -> bool {
    matches!(err.raw_os_error(), Some(libc::EMSGSIZE) | Some(libc::ENOBUFS))
}

impl Transport for JournalSocket {
    fn send(&self, entry: &[u8]) -> Result<()> {
        match self.socket.send_to(entry, &self.path) {
            Ok(_) => Ok(()),
            Err(err) if is_oversize(&err) => {
                debug!(
                    size = entry.len(),
                    error = %err,
                    "entry exceeds inline datagram limit, passing sealed memfd"
                );
                self.send_sealed(entry)
            }
            Err(source) => Err(TransportError::Send {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn transport_name(&self) -> &'static str {
        "journal-datagram"
    }
}
