/// Errors raised while validating, applying, or persisting configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A field failed validation. The previously active configuration stays
    /// in effect.
    #[error("invalid configuration field `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },

    /// A patch document contained a key the configuration does not have.
    #[error("unknown configuration key `{0}`")]
    UnknownField(String),

    /// The supplied document is not valid JSON, or has the wrong shape.
    #[error("configuration JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading or writing the persisted configuration file failed.
    #[error("configuration I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
