use lynkbridge_config::{BridgeConfig, RoutingMode, BROADCAST_ID};
use lynkbridge_frame::Frame;
use tracing::{debug, trace};

use crate::link::Link;

/// Decide where an ingress frame goes, if anywhere.
///
/// Stateless: the decision depends only on the frame, the ingress link, and
/// the configuration snapshot, so independent link workers may call it
/// concurrently.
///
/// - The forwarded frame's `src_id` always becomes this bridge's own id; the
///   bridge presents itself as origin to the next hop.
/// - User-origin frames always go to the module link. In static mode their
///   destination is forced to the configured id; in dynamic mode the sender's
///   choice stands.
/// - Module-origin frames reach the user link only when addressed to this
///   bridge or to broadcast; anything else belongs to another node on the
///   shared medium and is dropped so it cannot leak locally.
pub fn route(mut frame: Frame, ingress: Link, cfg: &BridgeConfig) -> Option<(Frame, Link)> {
    frame.src_id = cfg.device_id;

    match ingress {
        Link::User => {
            if cfg.mode == RoutingMode::Static {
                trace!(
                    from = format_args!("0x{:02X}", frame.dst_id),
                    to = format_args!("0x{:02X}", cfg.static_dst_id),
                    "static mode destination override"
                );
                frame.dst_id = cfg.static_dst_id;
            }
            Some((frame, Link::Module))
        }

        Link::Module => {
            if frame.dst_id == cfg.device_id || frame.dst_id == BROADCAST_ID {
                Some((frame, Link::User))
            } else {
                debug!(
                    dst_id = format_args!("0x{:02X}", frame.dst_id),
                    own_id = format_args!("0x{:02X}", cfg.device_id),
                    "dropping frame addressed to another node"
                );
                None
            }
        }

        // Reserved ingress: never forwards.
        Link::Wifi => None,
    }
}
