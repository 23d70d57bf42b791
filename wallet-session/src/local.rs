//! A [`WalletBackend`] backed by private keys held in-process.
//!
//! [`LocalBackend`] exposes one `Local` connector per signer. Public
//! clients are plain HTTP providers for the configured chains; wallet
//! clients add the signer on top. Browser, relay and hardware connectors
//! from the configuration are listed but refused on `connect`.
//!
//! # Key Derivation
//!
//! Signers come from a BIP39 mnemonic ([`kobe`] + [`kobe_eth`], BIP32/44)
//! or a raw hex private key, and are used through [`alloy`]'s
//! `PrivateKeySigner`.
//!
//! # Examples
//!
//! ```rust,ignore
//! let backend = LocalBackend::builder()
//!     .config(WalletConfig::builder().chain(chains::mainnet()).build()?)
//!     .mnemonic("abandon abandon abandon ...")
//!     .build()?;
//!
//! let session = WalletSession::builder(backend).build();
//! let connector = session.connectors()[0].clone();
//! session.connect(&connector, None).await?;
//! ```

use std::collections::HashMap;
use std::sync::Mutex;

use alloy::network::Ethereum;
use alloy::primitives::{Address, ChainId};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer;
use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::backend::{Account, Network, WalletBackend};
use crate::chain::{Chain, chains};
use crate::config::WalletConfig;
use crate::connector::{Connector, ConnectorKind};
use crate::error::{ConfigError, LocalError, LocalResult};

/// Capacity of the account and network notification channels.
const EVENT_CAPACITY: usize = 16;

// ============================================================================
// Client Handles
// ============================================================================

/// Read-only client for one chain.
#[derive(Clone)]
pub struct PublicClient {
    chain_id: ChainId,
    provider: DynProvider<Ethereum>,
}

impl std::fmt::Debug for PublicClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublicClient")
            .field("chain_id", &self.chain_id)
            .finish_non_exhaustive()
    }
}

impl PublicClient {
    fn connect(chain: &Chain) -> LocalResult<Self> {
        let url = chain.parsed_rpc_url()?;
        let provider = ProviderBuilder::new().connect_http(url).erased();
        Ok(Self {
            chain_id: chain.id,
            provider,
        })
    }

    /// Chain this client queries.
    #[must_use]
    pub const fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    /// Underlying provider.
    #[must_use]
    pub const fn provider(&self) -> &DynProvider<Ethereum> {
        &self.provider
    }
}

/// Signing client bound to a connected signer and chain.
#[derive(Clone)]
pub struct WalletClient {
    address: Address,
    chain_id: ChainId,
    signer: PrivateKeySigner,
    provider: DynProvider<Ethereum>,
}

impl std::fmt::Debug for WalletClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletClient")
            .field("address", &self.address)
            .field("chain_id", &self.chain_id)
            .finish_non_exhaustive()
    }
}

impl WalletClient {
    fn connect(signer: &PrivateKeySigner, chain: &Chain) -> LocalResult<Self> {
        let url = chain.parsed_rpc_url()?;
        let mut signer = signer.clone();
        signer.set_chain_id(Some(chain.id));
        let provider = ProviderBuilder::new()
            .wallet(signer.clone())
            .connect_http(url)
            .erased();
        Ok(Self {
            address: signer.address(),
            chain_id: chain.id,
            signer,
            provider,
        })
    }

    /// Signer address.
    #[must_use]
    pub const fn address(&self) -> Address {
        self.address
    }

    /// Chain the signer is bound to.
    #[must_use]
    pub const fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    /// Underlying signer.
    #[must_use]
    pub const fn signer(&self) -> &PrivateKeySigner {
        &self.signer
    }

    /// Underlying provider, with the signer attached.
    #[must_use]
    pub const fn provider(&self) -> &DynProvider<Ethereum> {
        &self.provider
    }

    /// Sign an arbitrary message (EIP-191 personal_sign).
    pub async fn sign_message(&self, message: &[u8]) -> LocalResult<String> {
        let sig = self
            .signer
            .sign_message(message)
            .await
            .map_err(|e| LocalError::signer(format!("message signing failed: {e}")))?;
        Ok(format!(
            "0x{}",
            alloy::primitives::hex::encode(sig.as_bytes())
        ))
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for a [`LocalBackend`].
///
/// ```rust,ignore
/// // From HD mnemonic, two accounts
/// let backend = LocalBackend::builder()
///     .mnemonic("abandon abandon ...")
///     .index(0)
///     .index(1)
///     .build()?;
///
/// // From private key
/// let backend = LocalBackend::builder()
///     .private_key("0xabc...")
///     .build()?;
/// ```
#[derive(Debug, Default)]
pub struct LocalBackendBuilder {
    /// Chains and connectors; defaults to every built-in chain.
    config: Option<WalletConfig>,
    /// BIP39 mnemonic phrase.
    mnemonic: Option<String>,
    /// BIP39 passphrase (optional "25th word").
    passphrase: Option<String>,
    /// HD derivation indices (default `[0]`).
    indices: Vec<u32>,
    /// Raw private key hex strings.
    private_keys: Vec<String>,
    /// Ready-made signers.
    signers: Vec<PrivateKeySigner>,
}

impl LocalBackendBuilder {
    /// Set the chain and connector configuration.
    #[must_use]
    pub fn config(mut self, config: WalletConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the BIP39 mnemonic phrase for HD key derivation.
    #[must_use]
    pub fn mnemonic(mut self, mnemonic: impl Into<String>) -> Self {
        self.mnemonic = Some(mnemonic.into());
        self
    }

    /// Set the BIP39 passphrase.
    #[must_use]
    pub fn passphrase(mut self, passphrase: impl Into<String>) -> Self {
        self.passphrase = Some(passphrase.into());
        self
    }

    /// Derive an account at `index` from the mnemonic.
    #[must_use]
    pub fn index(mut self, index: u32) -> Self {
        self.indices.push(index);
        self
    }

    /// Add a private key (hex string, with or without 0x prefix).
    #[must_use]
    pub fn private_key(mut self, key: impl Into<String>) -> Self {
        self.private_keys.push(key.into());
        self
    }

    /// Add a signer.
    #[must_use]
    pub fn signer(mut self, signer: PrivateKeySigner) -> Self {
        self.signers.push(signer);
        self
    }

    /// Build the backend.
    ///
    /// At least one signer source must be set.
    pub fn build(self) -> LocalResult<LocalBackend> {
        let Self {
            config,
            mnemonic,
            passphrase,
            indices,
            private_keys,
            signers,
        } = self;

        let mut config = match config {
            Some(config) => config,
            None => WalletConfig::builder().chains(chains::all()).build()?,
        };
        config.validate()?;

        let mut signers = signers;
        if let Some(mnemonic) = mnemonic {
            let indices = if indices.is_empty() { vec![0] } else { indices };
            for index in indices {
                signers.push(signer_from_mnemonic(
                    &mnemonic,
                    passphrase.as_deref(),
                    index,
                )?);
            }
        }
        for key in &private_keys {
            signers.push(signer_from_private_key(key)?);
        }
        if signers.is_empty() {
            return Err(ConfigError::missing("either mnemonic, private_key or signer").into());
        }

        let mut keyed = HashMap::new();
        for (i, signer) in signers.into_iter().enumerate() {
            let id = if i == 0 {
                ConnectorKind::Local.default_id().to_string()
            } else {
                format!("{}-{i}", ConnectorKind::Local.default_id())
            };
            let connector = Connector::local(signer.address()).with_id(id.clone());
            config.connectors.push(connector);
            keyed.insert(id, signer);
        }
        config.validate()?;

        let mut public_clients = HashMap::new();
        for chain in &config.chains {
            public_clients.insert(chain.id, PublicClient::connect(chain)?);
        }
        let default_client = config
            .default_chain()
            .and_then(|chain| public_clients.get(&chain.id).cloned())
            .ok_or_else(|| ConfigError::missing("chains"))?;

        let (accounts, _) = broadcast::channel(EVENT_CAPACITY);
        let (networks, _) = broadcast::channel(EVENT_CAPACITY);

        info!(
            signers = keyed.len(),
            chains = config.chains.len(),
            "local wallet backend initialized"
        );

        Ok(LocalBackend {
            config,
            signers: keyed,
            public_clients,
            default_client,
            state: Mutex::new(LocalState::default()),
            accounts,
            networks,
        })
    }
}

/// Derive a signer from a BIP39 mnemonic using kobe.
fn signer_from_mnemonic(
    mnemonic: &str,
    passphrase: Option<&str>,
    index: u32,
) -> LocalResult<PrivateKeySigner> {
    let wallet = kobe::Wallet::from_mnemonic(mnemonic, passphrase)
        .map_err(|e| LocalError::signer(format!("invalid mnemonic: {e}")))?;

    let deriver = kobe_eth::Deriver::new(&wallet);
    let derived = deriver
        .derive(index)
        .map_err(|e| LocalError::signer(format!("key derivation failed: {e}")))?;

    let key_hex = &*derived.private_key_hex;
    key_hex
        .parse::<PrivateKeySigner>()
        .map_err(|e| LocalError::signer(format!("signer creation failed: {e}")))
}

/// Create a signer from a raw private key hex string.
fn signer_from_private_key(key: &str) -> LocalResult<PrivateKeySigner> {
    let key = key.strip_prefix("0x").unwrap_or(key);
    key.parse::<PrivateKeySigner>()
        .map_err(|e| LocalError::signer(format!("invalid private key: {e}")))
}

// ============================================================================
// Backend
// ============================================================================

#[derive(Debug, Default)]
struct LocalState {
    connector: Option<Connector>,
    address: Option<Address>,
    chain_id: Option<ChainId>,
    /// Connector to restore on auto-connect.
    last_connector: Option<String>,
}

/// Wallet backend for in-process signers.
pub struct LocalBackend {
    config: WalletConfig,
    signers: HashMap<String, PrivateKeySigner>,
    public_clients: HashMap<ChainId, PublicClient>,
    default_client: PublicClient,
    state: Mutex<LocalState>,
    accounts: broadcast::Sender<Account>,
    networks: broadcast::Sender<Network>,
}

impl std::fmt::Debug for LocalBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalBackend")
            .field("chains", &self.config.chains.len())
            .field("signers", &self.signers.len())
            .finish_non_exhaustive()
    }
}

impl LocalBackend {
    /// Create a builder.
    #[must_use]
    pub fn builder() -> LocalBackendBuilder {
        LocalBackendBuilder::default()
    }

    /// The configuration, including the generated local connectors.
    #[must_use]
    pub const fn config(&self) -> &WalletConfig {
        &self.config
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LocalState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn configured_chain(&self, chain_id: ChainId) -> LocalResult<&Chain> {
        self.config
            .chain(chain_id)
            .ok_or(LocalError::UnsupportedChain(chain_id))
    }

    fn signer_for(&self, connector: &Connector) -> LocalResult<&PrivateKeySigner> {
        if let Some(signer) = self.signers.get(connector.id()) {
            return Ok(signer);
        }
        if connector.kind() != ConnectorKind::Local && self.config.connector(connector.id()).is_some()
        {
            return Err(LocalError::UnsupportedConnector(connector.id().to_string()));
        }
        Err(LocalError::UnknownConnector(connector.id().to_string()))
    }

    fn emit_account(&self) {
        let _ = self.accounts.send(self.account());
    }

    fn emit_network(&self) {
        let _ = self.networks.send(self.network());
    }
}

#[async_trait]
impl WalletBackend for LocalBackend {
    type PublicClient = PublicClient;
    type WalletClient = WalletClient;
    type Error = LocalError;

    fn connectors(&self) -> Vec<Connector> {
        self.config.connectors.clone()
    }

    async fn connect(&self, connector: &Connector, chain_id: Option<ChainId>) -> LocalResult<()> {
        let signer = self.signer_for(connector)?;
        let chain_id = match chain_id {
            Some(id) => id,
            None => self
                .config
                .default_chain()
                .map(|chain| chain.id)
                .ok_or_else(|| ConfigError::missing("chains"))?,
        };
        self.configured_chain(chain_id)?;

        let address = signer.address();
        {
            let mut state = self.lock();
            state.connector = Some(connector.clone());
            state.address = Some(address);
            state.chain_id = Some(chain_id);
            state.last_connector = Some(connector.id().to_string());
        }

        info!(connector = %connector, address = %address, chain_id, "local signer connected");
        self.emit_account();
        self.emit_network();
        Ok(())
    }

    async fn disconnect(&self) -> LocalResult<()> {
        let was_connected = {
            let mut state = self.lock();
            let was_connected = state.address.is_some();
            *state = LocalState::default();
            was_connected
        };

        if was_connected {
            debug!("local signer disconnected");
            self.emit_account();
            self.emit_network();
        }
        Ok(())
    }

    async fn switch_network(&self, chain_id: ChainId) -> LocalResult<()> {
        self.configured_chain(chain_id)?;
        {
            let mut state = self.lock();
            if state.address.is_none() {
                return Err(LocalError::NotConnected);
            }
            state.chain_id = Some(chain_id);
        }

        debug!(chain_id, "local signer switched network");
        self.emit_network();
        Ok(())
    }

    fn account(&self) -> Account {
        let state = self.lock();
        Account {
            address: state.address,
            connector: state.connector.clone(),
        }
    }

    fn network(&self) -> Network {
        let chain_id = self.lock().chain_id;
        Network {
            chain: chain_id.and_then(|id| self.config.chain(id).cloned()),
            chains: self.config.chains.clone(),
        }
    }

    fn public_client(&self) -> PublicClient {
        let chain_id = self.lock().chain_id;
        chain_id
            .and_then(|id| self.public_clients.get(&id))
            .unwrap_or(&self.default_client)
            .clone()
    }

    async fn wallet_client(&self, chain_id: ChainId) -> LocalResult<Option<WalletClient>> {
        let connector = self.lock().connector.clone();
        let Some(connector) = connector else {
            return Ok(None);
        };
        let signer = self.signer_for(&connector)?;
        let chain = self.configured_chain(chain_id)?;
        WalletClient::connect(signer, chain).map(Some)
    }

    fn watch_account(&self) -> broadcast::Receiver<Account> {
        self.accounts.subscribe()
    }

    fn watch_network(&self) -> broadcast::Receiver<Network> {
        self.networks.subscribe()
    }

    async fn reconnect(&self) -> LocalResult<()> {
        if !self.config.auto_connect {
            return Ok(());
        }
        let last_connector = {
            let state = self.lock();
            if state.address.is_some() {
                return Ok(());
            }
            state.last_connector.clone()
        };

        let connector = last_connector
            .and_then(|id| self.config.connector(&id).cloned())
            .or_else(|| {
                self.config
                    .connectors
                    .iter()
                    .find(|c| c.kind() == ConnectorKind::Local)
                    .cloned()
            });

        match connector {
            Some(connector) => {
                debug!(connector = %connector, "restoring local signer connection");
                self.connect(&connector, None).await
            }
            None => Ok(()),
        }
    }
}
