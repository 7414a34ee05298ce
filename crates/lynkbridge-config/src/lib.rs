//! Bridge configuration: the single piece of state shared by every link worker.
//!
//! The configuration is read-mostly and replaced wholesale, never mutated in
//! place. Readers take an immutable snapshot of the entire structure via
//! [`ConfigStore::snapshot`]; writers validate a proposed configuration in
//! full before committing it atomically — a partially applied configuration
//! cannot be observed.

pub mod error;
pub mod persist;
pub mod store;

pub use error::{ConfigError, Result};
pub use store::ConfigStore;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Reserved destination id understood by every node as "for all".
pub const BROADCAST_ID: u8 = 0xFF;

/// Link bit rates the bridge will accept.
pub const SUPPORTED_BAUD_RATES: &[u32] = &[
    1_200, 2_400, 4_800, 9_600, 19_200, 38_400, 57_600, 115_200, 230_400, 460_800, 921_600,
];

/// Routing policy for frames entering from the user-facing link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutingMode {
    /// Every user-origin frame is forced to one fixed destination id.
    Static,
    /// The sender-chosen destination id is preserved.
    Dynamic,
}

impl FromStr for RoutingMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("static") {
            Ok(RoutingMode::Static)
        } else if s.eq_ignore_ascii_case("dynamic") {
            Ok(RoutingMode::Dynamic)
        } else {
            Err(ConfigError::Invalid {
                field: "mode",
                reason: format!("expected \"static\" or \"dynamic\", got {s:?}"),
            })
        }
    }
}

impl fmt::Display for RoutingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutingMode::Static => f.write_str("static"),
            RoutingMode::Dynamic => f.write_str("dynamic"),
        }
    }
}

impl Serialize for RoutingMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for RoutingMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// The complete bridge configuration.
///
/// Equality of two snapshots means the bridge behaves identically under both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BridgeConfig {
    /// This bridge's own id, presented as the origin of every forwarded frame.
    pub device_id: u8,
    /// Routing policy for user-origin frames.
    pub mode: RoutingMode,
    /// Forced destination id in [`RoutingMode::Static`].
    pub static_dst_id: u8,
    /// Bit rate of both serial links.
    pub baud_rate: u32,
    /// First frame delimiter byte.
    pub marker1: u8,
    /// Second frame delimiter byte.
    pub marker2: u8,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            device_id: 0x01,
            mode: RoutingMode::Dynamic,
            static_dst_id: BROADCAST_ID,
            baud_rate: 115_200,
            marker1: 0xA5,
            marker2: 0x5A,
        }
    }
}

impl BridgeConfig {
    /// Validate every field. All-or-nothing: a configuration that fails here
    /// must never become active.
    pub fn validate(&self) -> Result<()> {
        if self.device_id == BROADCAST_ID {
            return Err(ConfigError::Invalid {
                field: "device_id",
                reason: format!("0x{BROADCAST_ID:02X} is the broadcast id"),
            });
        }
        if self.marker1 == self.marker2 {
            return Err(ConfigError::Invalid {
                field: "marker2",
                reason: format!("must differ from marker1 (both 0x{:02X})", self.marker1),
            });
        }
        if !SUPPORTED_BAUD_RATES.contains(&self.baud_rate) {
            return Err(ConfigError::Invalid {
                field: "baud_rate",
                reason: format!("{} is not a supported rate", self.baud_rate),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        BridgeConfig::default().validate().unwrap();
    }

    #[test]
    fn broadcast_device_id_rejected() {
        let cfg = BridgeConfig {
            device_id: BROADCAST_ID,
            ..BridgeConfig::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "device_id", .. }));
    }

    #[test]
    fn identical_markers_rejected() {
        let cfg = BridgeConfig {
            marker1: 0x7E,
            marker2: 0x7E,
            ..BridgeConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn unusual_baud_rate_rejected() {
        let cfg = BridgeConfig {
            baud_rate: 123_456,
            ..BridgeConfig::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "baud_rate", .. }));
    }

    #[test]
    fn mode_parses_case_insensitively() {
        assert_eq!("STATIC".parse::<RoutingMode>().unwrap(), RoutingMode::Static);
        assert_eq!("Dynamic".parse::<RoutingMode>().unwrap(), RoutingMode::Dynamic);
        assert!("broadcast".parse::<RoutingMode>().is_err());
    }

    #[test]
    fn config_json_roundtrip() {
        let cfg = BridgeConfig {
            device_id: 0x42,
            mode: RoutingMode::Static,
            static_dst_id: 0x55,
            ..BridgeConfig::default()
        };
        let json = serde_json::to_string(&cfg).unwrap();
        let back: BridgeConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cfg);
    }

    #[test]
    fn unknown_fields_rejected() {
        let json = r#"{
            "device_id": 1, "mode": "dynamic", "static_dst_id": 255,
            "baud_rate": 115200, "marker1": 165, "marker2": 90,
            "bogus": true
        }"#;
        assert!(serde_json::from_str::<BridgeConfig>(json).is_err());
    }
}
