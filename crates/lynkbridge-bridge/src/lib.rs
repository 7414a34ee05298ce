//! The bridge core: address-based forwarding between two serial links.
//!
//! Byte streams come in per link, the frame layer turns them into discrete
//! frames, and [`router::route`] decides — from an immutable configuration
//! snapshot — whether each frame crosses to the opposite link. Egress is an
//! injected [`EgressSink`] so production serial ports and test captures plug
//! into the same seam.

pub mod bridge;
pub mod link;
pub mod router;
pub mod sink;
pub mod worker;

pub use bridge::Bridge;
pub use link::Link;
pub use router::route;
pub use sink::{EgressSink, WriterSink};
pub use worker::spawn_link_worker;
