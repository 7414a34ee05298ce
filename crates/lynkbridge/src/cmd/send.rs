use std::io::Write;
use std::time::Duration;

use bytes::BytesMut;
use lynkbridge_config::persist;
use lynkbridge_frame::{encode_frame, Frame};
use tracing::info;

use crate::cmd::SendArgs;
use crate::exit::{
    config_error, frame_error, io_error, serial_error, CliError, CliResult, SUCCESS, USAGE,
};
use crate::output::hex_dump;

pub fn run(args: SendArgs) -> CliResult<i32> {
    let cfg = persist::load(&args.config)
        .map_err(|err| config_error("failed loading configuration", err))?;

    let payload = resolve_payload(&args)?;
    let frame = Frame::new(&cfg, args.frame_type, args.dst, payload);

    let mut wire = BytesMut::new();
    encode_frame(&frame, &cfg, &mut wire).map_err(|err| frame_error("encode failed", err))?;

    let mut port = serialport::new(&args.port, cfg.baud_rate)
        .timeout(Duration::from_secs(1))
        .open()
        .map_err(|err| serial_error(&format!("failed opening {}", args.port), err))?;

    port.write_all(&wire)
        .and_then(|()| port.flush())
        .map_err(|err| io_error("write failed", err))?;

    info!(
        port = %args.port,
        dst = format_args!("0x{:02X}", frame.dst_id),
        len = wire.len(),
        "frame sent"
    );
    println!("{}", hex_dump(&wire));

    Ok(SUCCESS)
}

fn resolve_payload(args: &SendArgs) -> CliResult<Vec<u8>> {
    if let Some(data) = &args.data {
        return Ok(data.as_bytes().to_vec());
    }
    if let Some(hex) = &args.hex {
        return parse_hex(hex);
    }
    Ok(Vec::new())
}

fn parse_hex(input: &str) -> CliResult<Vec<u8>> {
    let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.len() % 2 != 0 {
        return Err(CliError::new(USAGE, "--hex needs an even number of digits"));
    }
    (0..compact.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&compact[i..i + 2], 16)
                .map_err(|_| CliError::new(USAGE, format!("invalid hex near `{}`", &compact[i..i + 2])))
        })
        .collect()
}
