//! EVM chain descriptors.
//!
//! A [`Chain`] names a network and the public RPC endpoint used to build
//! read-only clients for it. The [`chains`] module carries the networks a
//! standard configuration supports.

use alloy::primitives::ChainId;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ConfigError, ConfigResult};

/// Native currency of a chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    /// Display name (e.g., "Ether").
    pub name: String,
    /// Ticker symbol (e.g., "ETH").
    pub symbol: String,
    /// Number of decimals.
    pub decimals: u8,
}

impl NativeCurrency {
    /// Create an 18-decimal native currency.
    #[must_use]
    pub fn new(name: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            decimals: 18,
        }
    }
}

/// An EVM network the session may connect to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chain {
    /// EIP-155 chain id.
    pub id: ChainId,
    /// Human readable name.
    pub name: String,
    /// Native currency.
    pub native_currency: NativeCurrency,
    /// Public JSON-RPC endpoint.
    pub rpc_url: String,
    /// Block explorer, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_explorer: Option<String>,
}

impl Chain {
    /// Create a chain descriptor.
    #[must_use]
    pub fn new(
        id: ChainId,
        name: impl Into<String>,
        native_currency: NativeCurrency,
        rpc_url: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            native_currency,
            rpc_url: rpc_url.into(),
            block_explorer: None,
        }
    }

    /// Set the block explorer URL.
    #[must_use]
    pub fn with_block_explorer(mut self, url: impl Into<String>) -> Self {
        self.block_explorer = Some(url.into());
        self
    }

    /// Parse the RPC endpoint.
    pub fn parsed_rpc_url(&self) -> ConfigResult<Url> {
        Url::parse(&self.rpc_url).map_err(|source| ConfigError::InvalidRpcUrl {
            chain_id: self.id,
            source,
        })
    }
}

impl std::fmt::Display for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// Built-in chain definitions.
pub mod chains {
    use super::{Chain, ChainId, NativeCurrency};

    fn ether() -> NativeCurrency {
        NativeCurrency::new("Ether", "ETH")
    }

    /// Ethereum mainnet.
    #[must_use]
    pub fn mainnet() -> Chain {
        Chain::new(1, "Ethereum", ether(), "https://cloudflare-eth.com")
            .with_block_explorer("https://etherscan.io")
    }

    /// Polygon PoS.
    #[must_use]
    pub fn polygon() -> Chain {
        Chain::new(
            137,
            "Polygon",
            NativeCurrency::new("MATIC", "MATIC"),
            "https://polygon-rpc.com",
        )
        .with_block_explorer("https://polygonscan.com")
    }

    /// OP Mainnet.
    #[must_use]
    pub fn optimism() -> Chain {
        Chain::new(10, "OP Mainnet", ether(), "https://mainnet.optimism.io")
            .with_block_explorer("https://optimistic.etherscan.io")
    }

    /// Avalanche C-Chain.
    #[must_use]
    pub fn avalanche() -> Chain {
        Chain::new(
            43_114,
            "Avalanche",
            NativeCurrency::new("Avalanche", "AVAX"),
            "https://api.avax.network/ext/bc/C/rpc",
        )
        .with_block_explorer("https://snowtrace.io")
    }

    /// Arbitrum One.
    #[must_use]
    pub fn arbitrum() -> Chain {
        Chain::new(42_161, "Arbitrum One", ether(), "https://arb1.arbitrum.io/rpc")
            .with_block_explorer("https://arbiscan.io")
    }

    /// Fantom Opera.
    #[must_use]
    pub fn fantom() -> Chain {
        Chain::new(
            250,
            "Fantom",
            NativeCurrency::new("Fantom", "FTM"),
            "https://rpc.ankr.com/fantom",
        )
        .with_block_explorer("https://ftmscan.com")
    }

    /// BNB Smart Chain.
    #[must_use]
    pub fn bsc() -> Chain {
        Chain::new(
            56,
            "BNB Smart Chain",
            NativeCurrency::new("BNB", "BNB"),
            "https://rpc.ankr.com/bsc",
        )
        .with_block_explorer("https://bscscan.com")
    }

    /// Aurora.
    #[must_use]
    pub fn aurora() -> Chain {
        Chain::new(1_313_161_554, "Aurora", ether(), "https://mainnet.aurora.dev")
            .with_block_explorer("https://aurorascan.dev")
    }

    /// Gnosis.
    #[must_use]
    pub fn gnosis() -> Chain {
        Chain::new(
            100,
            "Gnosis",
            NativeCurrency::new("Gnosis", "xDAI"),
            "https://rpc.gnosischain.com",
        )
        .with_block_explorer("https://gnosisscan.io")
    }

    /// Polygon zkEVM.
    #[must_use]
    pub fn polygon_zkevm() -> Chain {
        Chain::new(1101, "Polygon zkEVM", ether(), "https://zkevm-rpc.com")
            .with_block_explorer("https://zkevm.polygonscan.com")
    }

    /// Every built-in chain, mainnet first.
    #[must_use]
    pub fn all() -> Vec<Chain> {
        vec![
            mainnet(),
            polygon(),
            optimism(),
            avalanche(),
            arbitrum(),
            fantom(),
            bsc(),
            aurora(),
            gnosis(),
            polygon_zkevm(),
        ]
    }

    /// Look up a built-in chain by id.
    #[must_use]
    pub fn by_id(id: ChainId) -> Option<Chain> {
        all().into_iter().find(|chain| chain.id == id)
    }
}
