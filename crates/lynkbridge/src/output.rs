use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use lynkbridge_config::BridgeConfig;
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
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
struct ConfigOutput<'a> {
    device_id: String,
    mode: String,
    static_dst_id: String,
    baud_rate: u32,
    marker1: String,
    marker2: String,
    source: &'a str,
}

pub fn print_config(cfg: &BridgeConfig, source: &str, format: OutputFormat) {
    let out = ConfigOutput {
        device_id: format!("0x{:02X}", cfg.device_id),
        mode: cfg.mode.to_string(),
        static_dst_id: format!("0x{:02X}", cfg.static_dst_id),
        baud_rate: cfg.baud_rate,
        marker1: format!("0x{:02X}", cfg.marker1),
        marker2: format!("0x{:02X}", cfg.marker2),
        source,
    };

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FIELD", "VALUE"]);
            table.add_row(vec!["device_id", &out.device_id]);
            table.add_row(vec!["mode", &out.mode]);
            table.add_row(vec!["static_dst_id", &out.static_dst_id]);
            table.add_row(vec!["baud_rate", &out.baud_rate.to_string()]);
            table.add_row(vec!["marker1", &out.marker1]);
            table.add_row(vec!["marker2", &out.marker2]);
            table.add_row(vec!["source", out.source]);
            println!("{table}");
        }
    }
}

/// Render bytes as spaced uppercase hex, the way link traces read.
pub fn hex_dump(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}
