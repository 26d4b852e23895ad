use std::io::{IsTerminal, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use ffstp_frame::Message;
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
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
struct MessageOutput<'a> {
    status: &'a str,
    status_kind: &'a str,
    length: usize,
    payload: &'a str,
    peer: &'a str,
    timestamp: String,
}

pub fn print_message(message: &Message<String>, peer: &str, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = MessageOutput {
                status: message.status(),
                status_kind: message.status_as_enum().as_str(),
                length: message.data().chars().count(),
                payload: message.data(),
                peer,
                timestamp: now_unix_seconds(),
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
                .set_header(vec!["STATUS", "LENGTH", "PEER", "PAYLOAD"])
                .add_row(vec![
                    message.status().to_string(),
                    message.data().chars().count().to_string(),
                    peer.to_string(),
                    message.data().clone(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "status={} ({}) length={} peer={} payload={}",
                message.status(),
                message.status_as_enum(),
                message.data().chars().count(),
                peer,
                message.data()
            );
        }
        OutputFormat::Raw => {
            print_raw(message.data().as_bytes());
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}
