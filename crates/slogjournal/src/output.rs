use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use slogjournal_transport::Delivery;
use slogjournal_wire::{Entry, Field};

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    /// The entry bytes exactly as received.
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct FieldOutput<'a> {
    key: &'a str,
    value: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    binary: bool,
}

#[derive(Serialize)]
struct EntryOutput<'a> {
    delivery: &'static str,
    size: usize,
    fields: Vec<FieldOutput<'a>>,
}

pub fn delivery_name(delivery: Delivery) -> &'static str {
    match delivery {
        Delivery::Inline => "inline",
        Delivery::Sealed => "memfd",
    }
}

pub fn print_entry(entry: &Entry, raw: &[u8], delivery: Delivery, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = EntryOutput {
                delivery: delivery_name(delivery),
                size: raw.len(),
                fields: entry
                    .fields()
                    .iter()
                    .map(|field| FieldOutput {
                        key: &field.key,
                        value: value_preview(field),
                        binary: field.value_str().is_none(),
                    })
                    .collect(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FIELD", "VALUE"]);
            for field in entry.fields() {
                table.add_row(vec![field.key.clone(), value_preview(field)]);
            }
            println!(
                "{} entry, {} bytes, {} fields",
                delivery_name(delivery),
                raw.len(),
                entry.len()
            );
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for field in entry.fields() {
                println!("{}={}", field.key, value_preview(field));
            }
            println!();
        }
        OutputFormat::Raw => print_raw(raw),
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn value_preview(field: &Field) -> String {
    match field.value_str() {
        Some(text) => text.to_string(),
        None => format!("<binary {} bytes>", field.value.len()),
    }
}
