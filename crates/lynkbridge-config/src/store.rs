use std::sync::{Arc, RwLock};

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{ConfigError, Result};
use crate::{BridgeConfig, RoutingMode};

const PATCH_KEYS: &[&str] = &[
    "device_id",
    "mode",
    "static_dst_id",
    "baud_rate",
    "marker1",
    "marker2",
];

/// Process-wide holder of the active [`BridgeConfig`].
///
/// Readers take whole-structure snapshots; writers install a fully validated
/// replacement. The inner value behind the `Arc` is never mutated, so a
/// snapshot taken before a swap stays coherent for as long as the caller
/// holds it.
#[derive(Debug)]
pub struct ConfigStore {
    active: RwLock<Arc<BridgeConfig>>,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new(BridgeConfig::default())
    }
}

impl ConfigStore {
    /// Create a store with the given initial configuration.
    ///
    /// The initial value is trusted (defaults or a previously persisted
    /// configuration); use [`ConfigStore::apply`] for untrusted input.
    pub fn new(initial: BridgeConfig) -> Self {
        Self {
            active: RwLock::new(Arc::new(initial)),
        }
    }

    /// Take an immutable snapshot of the active configuration.
    pub fn snapshot(&self) -> Arc<BridgeConfig> {
        self.active.read().unwrap().clone()
    }

    /// Validate `proposed` in full and make it the active configuration.
    ///
    /// All-or-nothing: on any validation failure the previous configuration
    /// remains active and untouched.
    pub fn apply(&self, proposed: BridgeConfig) -> Result<Arc<BridgeConfig>> {
        proposed.validate()?;
        let next = Arc::new(proposed);
        *self.active.write().unwrap() = next.clone();
        info!(
            device_id = next.device_id,
            mode = %next.mode,
            "configuration applied"
        );
        Ok(next)
    }

    /// Apply a partial JSON document on top of the active configuration.
    ///
    /// Keys absent from the document keep their current values. Numeric
    /// fields accept JSON numbers or strings (`"0xA5"` works for markers).
    /// The merged result is validated in full before anything is committed.
    pub fn apply_json(&self, json: &str) -> Result<Arc<BridgeConfig>> {
        let doc: Value = serde_json::from_str(json)?;
        let Value::Object(map) = doc else {
            return Err(ConfigError::Invalid {
                field: "root",
                reason: "expected a JSON object".to_string(),
            });
        };

        for key in map.keys() {
            if !PATCH_KEYS.contains(&key.as_str()) {
                warn!(key = %key, "rejecting configuration patch with unknown key");
                return Err(ConfigError::UnknownField(key.clone()));
            }
        }

        let mut merged = (*self.snapshot()).clone();
        if let Some(v) = map.get("device_id") {
            merged.device_id = parse_u8("device_id", v)?;
        }
        if let Some(v) = map.get("mode") {
            merged.mode = parse_mode(v)?;
        }
        if let Some(v) = map.get("static_dst_id") {
            merged.static_dst_id = parse_u8("static_dst_id", v)?;
        }
        if let Some(v) = map.get("baud_rate") {
            merged.baud_rate = parse_u32("baud_rate", v)?;
        }
        if let Some(v) = map.get("marker1") {
            merged.marker1 = parse_u8("marker1", v)?;
        }
        if let Some(v) = map.get("marker2") {
            merged.marker2 = parse_u8("marker2", v)?;
        }

        debug!(keys = map.len(), "configuration patch parsed");
        self.apply(merged)
    }

    /// Replace the active configuration with factory defaults.
    pub fn reset_to_defaults(&self) -> Arc<BridgeConfig> {
        let defaults = Arc::new(BridgeConfig::default());
        *self.active.write().unwrap() = defaults.clone();
        warn!("configuration reset to factory defaults");
        defaults
    }
}

fn parse_mode(value: &Value) -> Result<RoutingMode> {
    match value {
        Value::String(s) => s.parse(),
        _ => Err(ConfigError::Invalid {
            field: "mode",
            reason: "expected a string".to_string(),
        }),
    }
}

/// Accepts a JSON number or a numeric string; `0x`-prefixed strings are hex.
fn parse_number(field: &'static str, value: &Value) -> Result<u64> {
    match value {
        Value::Number(n) => n.as_u64().ok_or_else(|| ConfigError::Invalid {
            field,
            reason: format!("{n} is not a non-negative integer"),
        }),
        Value::String(s) => {
            let s = s.trim();
            let parsed = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
                u64::from_str_radix(hex, 16)
            } else {
                s.parse()
            };
            parsed.map_err(|_| ConfigError::Invalid {
                field,
                reason: format!("{s:?} is not a valid number"),
            })
        }
        _ => Err(ConfigError::Invalid {
            field,
            reason: "expected a number or numeric string".to_string(),
        }),
    }
}

fn parse_u8(field: &'static str, value: &Value) -> Result<u8> {
    let n = parse_number(field, value)?;
    u8::try_from(n).map_err(|_| ConfigError::Invalid {
        field,
        reason: format!("{n} is out of range for a byte"),
    })
}

fn parse_u32(field: &'static str, value: &Value) -> Result<u32> {
    let n = parse_number(field, value)?;
    u32::try_from(n).map_err(|_| ConfigError::Invalid {
        field,
        reason: format!("{n} is out of range"),
    })
}
