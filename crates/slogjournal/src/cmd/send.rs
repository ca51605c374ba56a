use std::sync::Arc;

use slogjournal_handler::{Attr, HandlerOptions, JournalHandler, Record};
use slogjournal_transport::{JournalConfig, MemoryTransport};
use slogjournal_wire::decode_entry;
use tracing::debug;

use crate::cmd::SendArgs;
use crate::exit::{handler_error, wire_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_entry, OutputFormat};

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let attrs = parse_attrs(&args.attrs)?;

    let mut record = Record::new(args.level, args.message.as_str()).with_attrs(attrs);
    if args.no_timestamp {
        record = record.with_time(None);
    }

    if args.dry_run {
        let handler = scoped(
            JournalHandler::with_transport(HandlerOptions::default(), Arc::new(MemoryTransport::new())),
            &args.groups,
        );
        let raw = handler.encode(&record);
        let entry = decode_entry(&raw).map_err(|err| wire_error("encoded entry invalid", err))?;
        print_entry(&entry, &raw, slogjournal_transport::Delivery::Inline, format);
        return Ok(SUCCESS);
    }

    let config = JournalConfig::with_socket_path(&args.socket);
    let handler = JournalHandler::with_config(HandlerOptions::default(), config)
        .map_err(|err| handler_error("journal socket unavailable", err))?;
    let handler = scoped(handler, &args.groups);

    handler
        .handle(&record)
        .map_err(|err| handler_error("send failed", err))?;
    debug!(socket = %args.socket.display(), level = %args.level, "record sent");

    Ok(SUCCESS)
}

fn scoped(handler: JournalHandler, groups: &[String]) -> JournalHandler {
    groups
        .iter()
        .fold(handler, |handler, group| handler.with_group(group))
}

/// Parse `KEY=VALUE` pairs. Dots in the key nest the value in groups.
fn parse_attrs(raw: &[String]) -> CliResult<Vec<Attr>> {
    raw.iter().map(|pair| parse_attr(pair)).collect()
}

fn parse_attr(pair: &str) -> CliResult<Attr> {
    let Some((key, value)) = pair.split_once('=') else {
        return Err(CliError::new(
            USAGE,
            format!("--attr expects KEY=VALUE, got `{pair}`"),
        ));
    };

    let mut segments = key.rsplit('.');
    let leaf = segments.next().unwrap_or_default();
    if leaf.is_empty() {
        return Err(CliError::new(USAGE, format!("--attr key is empty in `{pair}`")));
    }

    let mut attr = Attr::string(leaf, value);
    for group in segments {
        if group.is_empty() {
            return Err(CliError::new(
                USAGE,
                format!("--attr group name is empty in `{pair}`"),
            ));
        }
        attr = Attr::group(group, [attr]);
    }
    Ok(attr)
}
