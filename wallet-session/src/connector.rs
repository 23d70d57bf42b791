//! Connector descriptors.
//!
//! A [`Connector`] identifies one way of establishing a wallet session:
//! a browser-injected extension, a WalletConnect relay, Coinbase Wallet, a
//! Ledger device, or a local signer. The session treats it as an opaque,
//! read-only handle and passes it back to the backend on `connect`.

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

/// The connection method a connector uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectorKind {
    /// Browser extension injecting an EIP-1193 provider.
    Injected,
    /// WalletConnect relay.
    WalletConnect,
    /// Coinbase Wallet SDK.
    CoinbaseWallet,
    /// Ledger hardware device.
    Ledger,
    /// Private key held by the process.
    Local,
}

impl ConnectorKind {
    /// Default connector id for this kind.
    #[must_use]
    pub const fn default_id(self) -> &'static str {
        match self {
            Self::Injected => "injected",
            Self::WalletConnect => "walletConnect",
            Self::CoinbaseWallet => "coinbaseWallet",
            Self::Ledger => "ledger",
            Self::Local => "local",
        }
    }

    /// Default display name for this kind.
    #[must_use]
    pub const fn default_name(self) -> &'static str {
        match self {
            Self::Injected => "Injected",
            Self::WalletConnect => "WalletConnect",
            Self::CoinbaseWallet => "Coinbase Wallet",
            Self::Ledger => "Ledger",
            Self::Local => "Local Signer",
        }
    }
}

/// Per-kind connector settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConnectorOptions {
    /// Injected provider settings.
    Injected {
        /// Keep the wallet disconnected across reloads after an explicit
        /// disconnect, even though the extension stays authorised.
        #[serde(default = "default_shim_disconnect")]
        shim_disconnect: bool,
    },
    /// WalletConnect settings.
    WalletConnect {
        /// WalletConnect cloud project id.
        project_id: String,
    },
    /// Coinbase Wallet settings.
    CoinbaseWallet {
        /// Application name shown in the wallet.
        app_name: String,
    },
    /// Ledger settings.
    Ledger {
        /// WalletConnect project id used by Ledger Live.
        project_id: String,
    },
    /// Local signer; key material stays with the backend.
    #[serde(skip)]
    Local {
        /// Address of the signer.
        address: Address,
    },
}

const fn default_shim_disconnect() -> bool {
    true
}

impl ConnectorOptions {
    /// The connection method these options configure.
    #[must_use]
    pub const fn kind(&self) -> ConnectorKind {
        match self {
            Self::Injected { .. } => ConnectorKind::Injected,
            Self::WalletConnect { .. } => ConnectorKind::WalletConnect,
            Self::CoinbaseWallet { .. } => ConnectorKind::CoinbaseWallet,
            Self::Ledger { .. } => ConnectorKind::Ledger,
            Self::Local { .. } => ConnectorKind::Local,
        }
    }
}

/// A read-only connector descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connector {
    id: String,
    name: String,
    #[serde(flatten)]
    options: ConnectorOptions,
}

impl Connector {
    /// Create a connector with the default id and name for its kind.
    #[must_use]
    pub fn new(options: ConnectorOptions) -> Self {
        let kind = options.kind();
        Self {
            id: kind.default_id().to_string(),
            name: kind.default_name().to_string(),
            options,
        }
    }

    /// Injected connector.
    #[must_use]
    pub fn injected(shim_disconnect: bool) -> Self {
        Self::new(ConnectorOptions::Injected { shim_disconnect })
    }

    /// WalletConnect connector.
    #[must_use]
    pub fn wallet_connect(project_id: impl Into<String>) -> Self {
        Self::new(ConnectorOptions::WalletConnect {
            project_id: project_id.into(),
        })
    }

    /// Coinbase Wallet connector.
    #[must_use]
    pub fn coinbase_wallet(app_name: impl Into<String>) -> Self {
        Self::new(ConnectorOptions::CoinbaseWallet {
            app_name: app_name.into(),
        })
    }

    /// Ledger connector.
    #[must_use]
    pub fn ledger(project_id: impl Into<String>) -> Self {
        Self::new(ConnectorOptions::Ledger {
            project_id: project_id.into(),
        })
    }

    /// Local signer connector.
    #[must_use]
    pub fn local(address: Address) -> Self {
        Self::new(ConnectorOptions::Local { address })
    }

    /// Override the connector id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Override the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Connector id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Connection method.
    #[must_use]
    pub const fn kind(&self) -> ConnectorKind {
        self.options.kind()
    }

    /// Per-kind settings.
    #[must_use]
    pub const fn options(&self) -> &ConnectorOptions {
        &self.options
    }
}

impl std::fmt::Display for Connector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.id)
    }
}
