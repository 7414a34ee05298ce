//! Durable configuration storage as a JSON file.
//!
//! Stands in for the non-volatile blob storage of the embedded original: a
//! missing file means "first boot, use defaults"; a corrupt file is an error
//! rather than silently falling back, so an operator sees the problem.

use std::fs;
use std::path::Path;

use tracing::{info, warn};

use crate::error::Result;
use crate::BridgeConfig;

/// Load the configuration from `path`.
///
/// A missing file yields factory defaults. An unreadable or invalid file is
/// an error.
pub fn load(path: &Path) -> Result<BridgeConfig> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "no stored configuration, using defaults");
            return Ok(BridgeConfig::default());
        }
        Err(err) => return Err(err.into()),
    };

    let cfg: BridgeConfig = serde_json::from_str(&raw)?;
    cfg.validate()?;
    info!(path = %path.display(), "configuration loaded");
    Ok(cfg)
}

/// Persist the configuration to `path` (write-temp-then-rename).
pub fn save(cfg: &BridgeConfig, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(cfg)?;

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    info!(path = %path.display(), "configuration saved");
    Ok(())
}
