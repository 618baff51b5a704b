pub mod explodes;
pub mod subparser;
pub mod types;

use thiserror::Error;

pub use explodes::explode;
pub use subparser::{parse_subscription, ParsedSubscription};
pub use types::DecodeContext;

/// Why a raw item did not become a node.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Unrecognized scheme: {0}")]
    UnknownScheme(String),

    #[error("Invalid base64 in {0}")]
    InvalidBase64(String),

    #[error("Malformed link: {0}")]
    MalformedUri(String),

    #[error("Unsupported credential layout: {0}")]
    InvalidCredential(String),

    #[error("Invalid port: {0}")]
    InvalidPort(String),

    #[error("Invalid JSON payload: {0}")]
    InvalidJson(String),

    #[error("Unknown key `{0}`")]
    UnknownKey(String),

    #[error("Unexpected value for `{key}`: {value}")]
    UnexpectedValue { key: String, value: String },

    /// Provider info pseudo-node; dropped on purpose, not a failure
    #[error("Placeholder node (matched {0:?})")]
    Placeholder(String),

    #[error("Unsupported outbound type: {0}")]
    UnsupportedType(String),
}

impl DecodeError {
    /// Whether the item was dropped on purpose rather than rejected.
    pub fn is_placeholder(&self) -> bool {
        matches!(self, DecodeError::Placeholder(_))
    }
}
