use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod config;
pub mod run;
pub mod send;
pub mod version;

/// Default location of the persisted configuration.
pub const DEFAULT_CONFIG_PATH: &str = "lynkbridge.json";

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the bridge between two serial ports.
    Run(RunArgs),
    /// Inspect or change the persisted configuration.
    Config(ConfigArgs),
    /// Encode one frame and write it to a port.
    Send(SendArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Run(args) => run::run(args),
        Command::Config(args) => config::run(args, format),
        Command::Send(args) => send::run(args),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// User-facing serial device (e.g. /dev/ttyUSB0).
    #[arg(long, value_name = "DEV")]
    pub user_port: String,
    /// Module/radio-facing serial device.
    #[arg(long, value_name = "DEV")]
    pub module_port: String,
    /// Configuration file.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Configuration file.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_CONFIG_PATH, global = true)]
    pub file: PathBuf,

    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the stored configuration.
    Show,
    /// Merge a JSON patch into the stored configuration.
    Apply(ApplyArgs),
    /// Restore factory defaults.
    Reset,
}

#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// JSON patch document.
    #[arg(long, conflicts_with = "from_file")]
    pub json: Option<String>,
    /// Read the JSON patch from a file.
    #[arg(long, value_name = "PATH", conflicts_with = "json")]
    pub from_file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Serial device to write to.
    pub port: String,
    /// Destination id (accepts 0x-prefixed hex).
    #[arg(long, value_parser = parse_byte)]
    pub dst: u8,
    /// Frame type byte.
    #[arg(long, default_value = "1", value_parser = parse_byte)]
    pub frame_type: u8,
    /// Payload as a UTF-8 string.
    #[arg(long, conflicts_with = "hex")]
    pub data: Option<String>,
    /// Payload as hex digits (spaces allowed).
    #[arg(long, conflicts_with = "data")]
    pub hex: Option<String>,
    /// Configuration file.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build information.
    #[arg(long)]
    pub extended: bool,
}

/// Parse a byte argument, accepting `0x`-prefixed hex or decimal.
pub fn parse_byte(input: &str) -> Result<u8, String> {
    let input = input.trim();
    let parsed = if let Some(hex) = input.strip_prefix("0x").or_else(|| input.strip_prefix("0X")) {
        u8::from_str_radix(hex, 16)
    } else {
        input.parse()
    };
    parsed.map_err(|_| format!("`{input}` is not a byte value"))
}
