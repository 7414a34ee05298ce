use std::sync::{Arc, Mutex};

use bytes::BytesMut;
use lynkbridge_config::ConfigStore;
use lynkbridge_frame::{encode_frame, FrameParser, ParserStats};
use tracing::{error, trace, warn};

use crate::link::Link;
use crate::router::route;
use crate::sink::EgressSink;

/// The bridge core: one parser per ingress link, the shared configuration
/// store, and the injected egress sink.
///
/// Each parser has exactly one driving worker; its mutex exists to make
/// `&self` feeding possible, not to arbitrate contention. Forwarding is a
/// direct synchronous write to the opposite link — no queueing beyond the
/// one in-flight frame. Egress failures are logged and dropped; the
/// processing loop never crashes over a single frame.
pub struct Bridge {
    config: Arc<ConfigStore>,
    sink: Box<dyn EgressSink>,
    user_parser: Mutex<FrameParser>,
    module_parser: Mutex<FrameParser>,
}

impl Bridge {
    pub fn new(config: Arc<ConfigStore>, sink: impl EgressSink + 'static) -> Self {
        Self {
            config,
            sink: Box::new(sink),
            user_parser: Mutex::new(FrameParser::new()),
            module_parser: Mutex::new(FrameParser::new()),
        }
    }

    /// Handle one inbound byte from `link`, in arrival order.
    ///
    /// This is the entry point the I/O drivers call. The configuration is
    /// snapshotted per byte, so a swap takes effect at the next
    /// frame-completion boundary.
    pub fn on_byte_received(&self, link: Link, byte: u8) {
        let cfg = self.config.snapshot();

        let completed = match link {
            Link::User => self.user_parser.lock().unwrap().push(byte, &cfg),
            Link::Module => self.module_parser.lock().unwrap().push(byte, &cfg),
            Link::Wifi => {
                trace!("ignoring byte from reserved wifi ingress");
                None
            }
        };

        let Some(frame) = completed else { return };

        let Some((frame, egress)) = route(frame, link, &cfg) else {
            return;
        };

        let mut wire = BytesMut::new();
        if let Err(err) = encode_frame(&frame, &cfg, &mut wire) {
            // Unreachable for frames that came off the wire, since decode
            // bounds the payload; guard anyway.
            error!(error = %err, "re-encode of forwarded frame failed");
            return;
        }

        trace!(
            ingress = %link,
            egress = %egress,
            dst_id = format_args!("0x{:02X}", frame.dst_id),
            len = wire.len(),
            "forwarding frame"
        );
        if let Err(err) = self.sink.write_to(egress, &wire) {
            warn!(egress = %egress, error = %err, "egress write failed, frame dropped");
        }
    }

    /// Feed a whole received chunk, byte by byte, preserving order.
    pub fn on_bytes_received(&self, link: Link, bytes: &[u8]) {
        for &byte in bytes {
            self.on_byte_received(link, byte);
        }
    }

    /// Parser counters for one ingress link.
    pub fn parser_stats(&self, link: Link) -> ParserStats {
        match link {
            Link::User => self.user_parser.lock().unwrap().stats(),
            Link::Module => self.module_parser.lock().unwrap().stats(),
            Link::Wifi => ParserStats::default(),
        }
    }

    /// The shared configuration store.
    pub fn config(&self) -> &ConfigStore {
        &self.config
    }
}
