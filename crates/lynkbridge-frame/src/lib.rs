//! Marker-delimited, checksum-protected framing for the serial bridge.
//!
//! Two layers live here:
//! - [`codec`] — the stateless transform between a [`Frame`] value and its
//!   wire bytes, CRC-16 protected.
//! - [`parser`] — the per-link incremental scanner that turns a raw, possibly
//!   noisy byte stream into discrete decoded frames, resynchronizing after
//!   corruption instead of failing.

pub mod codec;
pub mod error;
pub mod parser;

pub use codec::{
    crc16, decode_frame, encode_frame, Frame, CRC_SIZE, HEADER_SIZE, MAX_FRAME_SIZE, MAX_PAYLOAD,
    MIN_FRAME_SIZE, PROTOCOL_VERSION,
};
pub use error::{FrameError, Result};
pub use parser::{FrameParser, ParserStats};
