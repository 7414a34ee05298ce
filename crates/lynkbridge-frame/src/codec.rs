use bytes::{BufMut, Bytes, BytesMut};
use lynkbridge_config::BridgeConfig;

use crate::error::{FrameError, Result};

/// Fixed header: marker1 + marker2 + version + frame_type + src + dst + payload_len.
pub const HEADER_SIZE: usize = 7;

/// Trailing CRC-16, little-endian.
pub const CRC_SIZE: usize = 2;

/// Smallest possible frame: full header plus CRC, empty payload.
pub const MIN_FRAME_SIZE: usize = HEADER_SIZE + CRC_SIZE;

/// The payload length field is one byte.
pub const MAX_PAYLOAD: usize = u8::MAX as usize;

/// Largest possible frame on the wire.
pub const MAX_FRAME_SIZE: usize = HEADER_SIZE + MAX_PAYLOAD + CRC_SIZE;

/// Wire protocol version written into every encoded frame. Informational;
/// decode does not check it.
pub const PROTOCOL_VERSION: u8 = 1;

/// One complete protocol message.
///
/// Wire format:
/// ```text
/// ┌─────────┬─────────┬─────────┬────────────┬────────┬────────┬─────────────┬──────────┬────────────┐
/// │ marker1 │ marker2 │ version │ frame_type │ src_id │ dst_id │ payload_len │ payload  │ CRC-16 LE  │
/// │ 1B      │ 1B      │ 1B      │ 1B         │ 1B     │ 1B     │ 1B          │ 0..255B  │ 2B         │
/// └─────────┴─────────┴─────────┴────────────┴────────┴────────┴─────────────┴──────────┴────────────┘
/// ```
/// The CRC covers every byte preceding it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub marker1: u8,
    pub marker2: u8,
    pub version: u8,
    pub frame_type: u8,
    pub src_id: u8,
    pub dst_id: u8,
    pub payload: Bytes,
}

impl Frame {
    /// Create an outbound frame originating from this bridge.
    pub fn new(cfg: &BridgeConfig, frame_type: u8, dst_id: u8, payload: impl Into<Bytes>) -> Self {
        Self {
            marker1: cfg.marker1,
            marker2: cfg.marker2,
            version: PROTOCOL_VERSION,
            frame_type,
            src_id: cfg.device_id,
            dst_id,
            payload: payload.into(),
        }
    }

    /// The total wire size of this frame.
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.payload.len() + CRC_SIZE
    }
}

/// The pinned checksum: CRC-16, reflected polynomial 0xA001, seed 0xFFFF
/// (CRC-16/MODBUS). Applied identically by encode and decode; not negotiable
/// per frame.
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc: u16 = 0xFFFF;
    for &byte in data {
        crc ^= u16::from(byte);
        for _ in 0..8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ 0xA001;
            } else {
                crc >>= 1;
            }
        }
    }
    crc
}

/// Encode a frame into the wire format.
///
/// The markers are taken from `cfg`, not from the frame value — the active
/// configuration decides what delimits frames on the wire. Pure and
/// deterministic.
pub fn encode_frame(frame: &Frame, cfg: &BridgeConfig, dst: &mut BytesMut) -> Result<()> {
    if frame.payload.len() > MAX_PAYLOAD {
        return Err(FrameError::PayloadTooLarge {
            size: frame.payload.len(),
            max: MAX_PAYLOAD,
        });
    }

    let start = dst.len();
    dst.reserve(HEADER_SIZE + frame.payload.len() + CRC_SIZE);
    dst.put_u8(cfg.marker1);
    dst.put_u8(cfg.marker2);
    dst.put_u8(frame.version);
    dst.put_u8(frame.frame_type);
    dst.put_u8(frame.src_id);
    dst.put_u8(frame.dst_id);
    dst.put_u8(frame.payload.len() as u8);
    dst.put_slice(&frame.payload);

    let crc = crc16(&dst[start..]);
    dst.put_u16_le(crc);
    Ok(())
}

/// Decode one complete frame from `buf`.
///
/// Validation is strict and ordered: size, markers, declared length, CRC.
/// Only full success populates a frame.
pub fn decode_frame(buf: &[u8], cfg: &BridgeConfig) -> Result<Frame> {
    if buf.len() < MIN_FRAME_SIZE {
        return Err(FrameError::TooShort { len: buf.len() });
    }

    if buf[0] != cfg.marker1 || buf[1] != cfg.marker2 {
        return Err(FrameError::BadMarker {
            expected: [cfg.marker1, cfg.marker2],
            got: [buf[0], buf[1]],
        });
    }

    let payload_len = buf[6] as usize;
    let expected_total = HEADER_SIZE + payload_len + CRC_SIZE;
    if buf.len() != expected_total {
        return Err(FrameError::LengthMismatch {
            expected: expected_total,
            actual: buf.len(),
        });
    }

    let crc_span = buf.len() - CRC_SIZE;
    let computed = crc16(&buf[..crc_span]);
    let received = u16::from_le_bytes([buf[crc_span], buf[crc_span + 1]]);
    if computed != received {
        return Err(FrameError::ChecksumMismatch { computed, received });
    }

    Ok(Frame {
        marker1: buf[0],
        marker2: buf[1],
        version: buf[2],
        frame_type: buf[3],
        src_id: buf[4],
        dst_id: buf[5],
        payload: Bytes::copy_from_slice(&buf[HEADER_SIZE..HEADER_SIZE + payload_len]),
    })
}
