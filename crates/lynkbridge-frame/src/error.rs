/// Errors that can occur during frame encoding/decoding.
///
/// Every decode-time variant is recoverable: the stream parser drops the
/// offending span and keeps scanning. Each failure cause is a distinct
/// variant so callers and tests can discriminate.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The buffer is shorter than the smallest possible frame.
    #[error("frame too short ({len} bytes, minimum {})", crate::codec::MIN_FRAME_SIZE)]
    TooShort { len: usize },

    /// The leading bytes do not match the configured markers.
    #[error("bad frame markers (expected {expected:02X?}, got {got:02X?})")]
    BadMarker { expected: [u8; 2], got: [u8; 2] },

    /// The header's declared payload length disagrees with the buffer length.
    #[error("frame length mismatch (header implies {expected} bytes, got {actual})")]
    LengthMismatch { expected: usize, actual: usize },

    /// The recomputed CRC disagrees with the transmitted one.
    #[error("checksum mismatch (computed 0x{computed:04X}, received 0x{received:04X})")]
    ChecksumMismatch { computed: u16, received: u16 },

    /// The payload exceeds the wire format's capacity. Caller error on
    /// encode, never retried.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, FrameError>;
