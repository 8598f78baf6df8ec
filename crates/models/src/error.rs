use thiserror::Error;

/// Error taxonomy for the simulation core.
///
/// Only [`EngineError::ConfigInvalid`] and [`EngineError::StateCorrupt`] abort
/// a whole run; every other variant is confined to the session that raised it
/// and surfaces as a field on that session's summary instead of propagating.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("config invalid: {field} = {value} ({reason})")]
    ConfigInvalid {
        field: String,
        value: String,
        reason: String,
        suggestion: Option<String>,
    },

    #[error("bet invalid: {reason}")]
    BetInvalid { reason: String },

    #[error("oracle exhausted: no qualifying HMAC window for nonce {nonce}")]
    OracleExhausted { nonce: u64 },

    #[error("state corrupt: {reason}")]
    StateCorrupt { reason: String },

    #[error("sink io failed for {path}: {reason}")]
    SinkIo { path: String, reason: String },

    #[error("cancelled")]
    Cancelled,
}

impl EngineError {
    pub fn config_invalid(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::ConfigInvalid {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        if let Self::ConfigInvalid { suggestion: s, .. } = &mut self {
            *s = Some(suggestion.into());
        }
        self
    }

    /// Whether this error should abort the whole runner rather than just the
    /// session that raised it.
    pub fn is_fatal_to_runner(&self) -> bool {
        matches!(self, Self::ConfigInvalid { .. } | Self::StateCorrupt { .. })
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
