use bytes::{BufMut, BytesMut};
use lynkbridge_config::BridgeConfig;
use tracing::{debug, trace, warn};

use crate::codec::{decode_frame, Frame, CRC_SIZE, HEADER_SIZE, MAX_FRAME_SIZE, MIN_FRAME_SIZE};

/// Scan position within the incoming byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scan {
    AwaitingMarker1,
    AwaitingMarker2,
    ReadingBody,
}

/// Counters surfaced for observability. Drops are expected on a noisy line
/// and never propagate as errors.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ParserStats {
    /// Complete frames decoded and emitted.
    pub frames_decoded: u64,
    /// Fully accumulated spans that failed decode (almost always CRC).
    pub frames_rejected: u64,
    /// Bytes discarded while hunting for markers.
    pub bytes_dropped: u64,
    /// Times the accumulation buffer hit capacity and was discarded.
    pub overflows: u64,
}

/// Incremental, resynchronizing frame scanner.
///
/// One instance per physical link, owned by exactly one worker. Driven one
/// byte at a time, strictly in arrival order; one frame is fully resolved
/// (emitted or dropped) before the next begins. A malformed span degrades to
/// "drop and keep listening" — nothing here is fatal.
#[derive(Debug)]
pub struct FrameParser {
    state: Scan,
    buf: BytesMut,
    capacity: usize,
    stats: ParserStats,
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameParser {
    /// Parser bounded by the largest legal frame.
    pub fn new() -> Self {
        Self::with_capacity(MAX_FRAME_SIZE)
    }

    /// Parser with an explicit accumulation bound. Frames whose declared
    /// length exceeds the bound can never complete and are swept out by the
    /// overflow guard.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(MIN_FRAME_SIZE);
        Self {
            state: Scan::AwaitingMarker1,
            buf: BytesMut::with_capacity(capacity),
            capacity,
            stats: ParserStats::default(),
        }
    }

    /// Feed one byte; returns a frame when `byte` completes one.
    ///
    /// `cfg` is the caller's configuration snapshot. A swap between calls may
    /// legitimately change how in-flight bytes are interpreted.
    pub fn push(&mut self, byte: u8, cfg: &BridgeConfig) -> Option<Frame> {
        match self.state {
            Scan::AwaitingMarker1 => {
                if byte == cfg.marker1 {
                    self.buf.clear();
                    self.buf.put_u8(byte);
                    self.state = Scan::AwaitingMarker2;
                } else {
                    // Line noise between frames; expected, not an error.
                    self.stats.bytes_dropped += 1;
                    trace!(byte = format_args!("0x{byte:02X}"), "dropped inter-frame byte");
                }
                None
            }

            Scan::AwaitingMarker2 => {
                if byte == cfg.marker2 {
                    self.buf.put_u8(byte);
                    self.state = Scan::ReadingBody;
                } else if byte == cfg.marker1 {
                    // The stored byte was a stray; this one may open the real
                    // frame. Restart accumulation without leaving the state.
                    self.stats.bytes_dropped += 1;
                    self.buf.clear();
                    self.buf.put_u8(byte);
                } else {
                    self.stats.bytes_dropped += 2;
                    self.buf.clear();
                    self.state = Scan::AwaitingMarker1;
                }
                None
            }

            Scan::ReadingBody => {
                if self.buf.len() >= self.capacity {
                    // Never-terminating frame; drop everything and rescan.
                    warn!(
                        discarded = self.buf.len(),
                        capacity = self.capacity,
                        "parser buffer overflow, resetting"
                    );
                    self.stats.overflows += 1;
                    self.stats.bytes_dropped += self.buf.len() as u64 + 1;
                    self.reset();
                    return None;
                }
                self.buf.put_u8(byte);

                let expected = self.expected_total()?;
                if expected > self.capacity || self.buf.len() < expected {
                    return None;
                }

                let result = decode_frame(&self.buf, cfg);
                self.reset();
                match result {
                    Ok(frame) => {
                        self.stats.frames_decoded += 1;
                        trace!(
                            dst_id = format_args!("0x{:02X}", frame.dst_id),
                            payload_len = frame.payload.len(),
                            "frame decoded"
                        );
                        Some(frame)
                    }
                    Err(err) => {
                        // Discard silently; the line stays up.
                        self.stats.frames_rejected += 1;
                        debug!(error = %err, "discarding undecodable frame span");
                        None
                    }
                }
            }
        }
    }

    /// Total frame length implied by the header, once the length field has
    /// arrived.
    fn expected_total(&self) -> Option<usize> {
        if self.buf.len() < HEADER_SIZE {
            return None;
        }
        Some(HEADER_SIZE + self.buf[6] as usize + CRC_SIZE)
    }

    /// Counters accumulated since construction.
    pub fn stats(&self) -> ParserStats {
        self.stats
    }

    fn reset(&mut self) {
        self.buf.clear();
        self.state = Scan::AwaitingMarker1;
    }
}
