use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use slogjournal_transport::{JournalListener, TransportError};
use slogjournal_wire::decode_entry;
use tracing::{info, warn};

use crate::cmd::ListenArgs;
use crate::exit::{transport_error, CliError, CliResult, SUCCESS};
use crate::output::{print_entry, OutputFormat};

// Receive timeout so the loop notices Ctrl-C.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

pub fn run(args: ListenArgs, format: OutputFormat) -> CliResult<i32> {
    let mut listener =
        JournalListener::bind(&args.path).map_err(|err| transport_error("bind failed", err))?;
    listener.set_max_datagram_size(args.max_datagram);
    listener
        .set_read_timeout(Some(POLL_INTERVAL))
        .map_err(|err| transport_error("bind failed", err))?;
    info!(path = %listener.path().display(), "listening for journal entries");

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut printed = 0usize;

    while running.load(Ordering::SeqCst) {
        let received = match listener.recv() {
            Ok(received) => received,
            Err(err) if is_timeout(&err) => continue,
            Err(err @ TransportError::Truncated { .. }) => {
                warn!(error = %err, "dropping entry");
                continue;
            }
            Err(err) => return Err(transport_error("receive failed", err)),
        };

        match decode_entry(&received.payload) {
            Ok(entry) => print_entry(&entry, &received.payload, received.delivery, format),
            Err(err) => {
                warn!(error = %err, size = received.payload.len(), "undecodable entry");
                continue;
            }
        }
        printed = printed.saturating_add(1);

        if let Some(count) = args.count {
            if printed >= count {
                return Ok(SUCCESS);
            }
        }
    }

    Ok(SUCCESS)
}

fn is_timeout(err: &TransportError) -> bool {
    err.io_error().is_some_and(|source| {
        matches!(
            source.kind(),
            std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
        )
    })
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| {
        CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}
