//! Wallet-connection configuration.
//!
//! A [`WalletConfig`] declares the chains a backend serves and the
//! connectors it offers. It can be built in code, loaded from JSON, or
//! assembled from the environment.
//!
//! ```rust,ignore
//! let config = WalletConfig::builder()
//!     .chain(chains::mainnet())
//!     .chain(chains::optimism())
//!     .connector(Connector::injected(true))
//!     .auto_connect(true)
//!     .build()?;
//! ```

use std::collections::HashSet;
use std::path::Path;

use alloy::primitives::ChainId;
use serde::{Deserialize, Serialize, Serializer};

use crate::chain::{Chain, chains};
use crate::connector::{Connector, ConnectorKind, ConnectorOptions};
use crate::error::{ConfigError, ConfigResult};

/// Environment variable holding the WalletConnect project id.
pub const PROJECT_ID_ENV: &str = "WALLETCONNECT_PROJECT_ID";

/// Environment variable holding the application name shown by wallets.
pub const APP_NAME_ENV: &str = "WALLET_APP_NAME";

/// Application name used when none is configured.
pub const DEFAULT_APP_NAME: &str = "wallet-session";

/// Chains and connectors a wallet backend is configured with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletConfig {
    /// Supported chains; the first one is the default.
    pub chains: Vec<Chain>,
    /// Available connectors. Local signer connectors are generated by
    /// their backend and left out when serializing.
    #[serde(default, serialize_with = "serialize_shared_connectors")]
    pub connectors: Vec<Connector>,
    /// Restore the last authorised connection on startup.
    #[serde(default)]
    pub auto_connect: bool,
}

fn serialize_shared_connectors<S: Serializer>(
    connectors: &[Connector],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(
        connectors
            .iter()
            .filter(|connector| connector.kind() != ConnectorKind::Local),
    )
}

impl WalletConfig {
    /// Create a builder.
    #[must_use]
    pub fn builder() -> WalletConfigBuilder {
        WalletConfigBuilder::default()
    }

    /// The standard lineup: every built-in chain, plus injected,
    /// WalletConnect, Coinbase Wallet and Ledger connectors, with
    /// auto-connect enabled.
    #[must_use]
    pub fn standard(project_id: impl Into<String>, app_name: impl Into<String>) -> Self {
        let project_id = project_id.into();
        Self {
            chains: chains::all(),
            connectors: vec![
                Connector::injected(true),
                Connector::wallet_connect(project_id.clone()),
                Connector::coinbase_wallet(app_name),
                Connector::ledger(project_id),
            ],
            auto_connect: true,
        }
    }

    /// Build the standard lineup from `WALLETCONNECT_PROJECT_ID` and the
    /// optional `WALLET_APP_NAME`.
    pub fn from_env() -> ConfigResult<Self> {
        let project_id =
            std::env::var(PROJECT_ID_ENV).map_err(|_| ConfigError::missing(PROJECT_ID_ENV))?;
        let app_name =
            std::env::var(APP_NAME_ENV).unwrap_or_else(|_| DEFAULT_APP_NAME.to_string());
        let config = Self::standard(project_id, app_name);
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Check the configuration for consistency.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.chains.is_empty() {
            return Err(ConfigError::missing("chains"));
        }

        let mut chain_ids = HashSet::new();
        for chain in &self.chains {
            if !chain_ids.insert(chain.id) {
                return Err(ConfigError::DuplicateChain(chain.id));
            }
            chain.parsed_rpc_url()?;
        }

        let mut connector_ids = HashSet::new();
        for connector in &self.connectors {
            if !connector_ids.insert(connector.id()) {
                return Err(ConfigError::DuplicateConnector(connector.id().to_string()));
            }
            match connector.options() {
                ConnectorOptions::WalletConnect { project_id }
                | ConnectorOptions::Ledger { project_id }
                    if project_id.trim().is_empty() =>
                {
                    return Err(ConfigError::invalid(format!(
                        "connector '{}' needs a project id",
                        connector.id()
                    )));
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Look up a configured chain.
    #[must_use]
    pub fn chain(&self, id: ChainId) -> Option<&Chain> {
        self.chains.iter().find(|chain| chain.id == id)
    }

    /// The default chain.
    #[must_use]
    pub fn default_chain(&self) -> Option<&Chain> {
        self.chains.first()
    }

    /// Look up a configured connector.
    #[must_use]
    pub fn connector(&self, id: &str) -> Option<&Connector> {
        self.connectors.iter().find(|connector| connector.id() == id)
    }
}

/// Builder for [`WalletConfig`].
#[derive(Debug, Default)]
pub struct WalletConfigBuilder {
    chains: Vec<Chain>,
    connectors: Vec<Connector>,
    auto_connect: bool,
}

impl WalletConfigBuilder {
    /// Add a chain. The first chain added is the default.
    #[must_use]
    pub fn chain(mut self, chain: Chain) -> Self {
        self.chains.push(chain);
        self
    }

    /// Add several chains.
    #[must_use]
    pub fn chains(mut self, chains: impl IntoIterator<Item = Chain>) -> Self {
        self.chains.extend(chains);
        self
    }

    /// Add a connector.
    #[must_use]
    pub fn connector(mut self, connector: Connector) -> Self {
        self.connectors.push(connector);
        self
    }

    /// Enable or disable auto-connect.
    #[must_use]
    pub const fn auto_connect(mut self, enabled: bool) -> Self {
        self.auto_connect = enabled;
        self
    }

    /// Validate and build the configuration.
    pub fn build(self) -> ConfigResult<WalletConfig> {
        let config = WalletConfig {
            chains: self.chains,
            connectors: self.connectors,
            auto_connect: self.auto_connect,
        };
        config.validate()?;
        Ok(config)
    }
}
