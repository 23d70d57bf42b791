//! Error types for wallet-session.
//!
//! Session operations never wrap backend failures: they surface the
//! backend's own error type to the caller unchanged. The types here cover
//! what this crate itself can get wrong, namely loading a configuration and
//! driving the bundled [`LocalBackend`](crate::local::LocalBackend).

use alloy::primitives::ChainId;

// ============================================================================
// Configuration Errors
// ============================================================================

/// Error type for configuration loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error while reading a configuration file.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error.
    #[error("parse: {0}")]
    Parse(#[from] serde_json::Error),

    /// Missing required field or environment variable.
    #[error("missing: {0}")]
    Missing(String),

    /// Invalid value.
    #[error("invalid: {0}")]
    Invalid(String),

    /// The same chain id was configured twice.
    #[error("duplicate chain id {0}")]
    DuplicateChain(ChainId),

    /// The same connector id was configured twice.
    #[error("duplicate connector '{0}'")]
    DuplicateConnector(String),

    /// A chain's RPC endpoint is not a valid URL.
    #[error("invalid rpc url for chain {chain_id}: {source}")]
    InvalidRpcUrl {
        /// The chain whose endpoint failed to parse.
        chain_id: ChainId,
        /// The underlying parse failure.
        source: url::ParseError,
    },
}

impl ConfigError {
    /// Create a missing field error.
    #[inline]
    pub fn missing(field: impl Into<String>) -> Self {
        Self::Missing(field.into())
    }

    /// Create an invalid value error.
    #[inline]
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// ============================================================================
// Local Backend Errors
// ============================================================================

/// Error type for [`LocalBackend`](crate::local::LocalBackend) operations.
#[derive(Debug, thiserror::Error)]
pub enum LocalError {
    /// The connector needs a browser extension, relay or device.
    #[error("connector '{0}' is not supported by the local backend")]
    UnsupportedConnector(String),

    /// The connector id is not registered with this backend.
    #[error("unknown connector '{0}'")]
    UnknownConnector(String),

    /// The chain is not part of the configuration.
    #[error("chain {0} is not configured")]
    UnsupportedChain(ChainId),

    /// The operation needs an active connection.
    #[error("no wallet connected")]
    NotConnected,

    /// Key derivation or signing failed.
    #[error("signer: {0}")]
    Signer(String),

    /// Configuration error.
    #[error("config: {0}")]
    Config(#[from] ConfigError),
}

impl LocalError {
    /// Create a signer error.
    #[inline]
    pub fn signer(msg: impl Into<String>) -> Self {
        Self::Signer(msg.into())
    }
}

/// Result type for local backend operations.
pub type LocalResult<T> = std::result::Result<T, LocalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_conversion() {
        let err: LocalError = ConfigError::missing("chains").into();
        assert!(matches!(err, LocalError::Config(ConfigError::Missing(_))));
        assert_eq!(err.to_string(), "config: missing: chains");
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            LocalError::UnsupportedChain(137).to_string(),
            "chain 137 is not configured"
        );
        assert_eq!(
            ConfigError::DuplicateConnector("injected".into()).to_string(),
            "duplicate connector 'injected'"
        );
    }
}
