//! The wallet-connection backend seam.
//!
//! [`WalletBackend`] is everything the session needs from a
//! wallet-connection library: actions, synchronous getters for the current
//! account and network, client handles, and change notifications. Chain
//! configuration, connector implementations and RPC plumbing all live
//! behind it.
//!
//! # Architecture
//!
//! ```text
//! WalletSession<B: WalletBackend>
//!   ├── connect()        → B::disconnect() → B::connect() → refresh()
//!   ├── disconnect()     → B::disconnect() → reset state
//!   ├── switch_network() → B::switch_network()
//!   ├── refresh()        → B::account() / B::network() / B::public_client() / B::wallet_client()
//!   └── watch()          → B::watch_account() + B::watch_network() → refresh()
//! ```

use alloy::primitives::{Address, ChainId};
use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::chain::Chain;
use crate::connector::Connector;

/// The account a backend currently reports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Account {
    /// Connected address, if any.
    pub address: Option<Address>,
    /// Connector that established the connection.
    pub connector: Option<Connector>,
}

impl Account {
    /// An account connected through `connector`.
    #[must_use]
    pub fn connected(address: Address, connector: Connector) -> Self {
        Self {
            address: Some(address),
            connector: Some(connector),
        }
    }

    /// Whether an address is present.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.address.is_some()
    }
}

/// The network a backend currently reports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Network {
    /// Active chain, if connected.
    pub chain: Option<Chain>,
    /// Every configured chain.
    pub chains: Vec<Chain>,
}

impl Network {
    /// Id of the active chain.
    #[must_use]
    pub fn chain_id(&self) -> Option<ChainId> {
        self.chain.as_ref().map(|chain| chain.id)
    }
}

/// A wallet-connection library.
///
/// Implementations own chain configuration and connector logic; the
/// session only caches what the getters report. All methods take `&self`
/// since a backend is shared between the session and its event bridge.
#[async_trait]
pub trait WalletBackend: Send + Sync + 'static {
    /// Read-only RPC client handle.
    type PublicClient: Clone + Send + Sync + 'static;

    /// Signing client handle bound to the connected wallet.
    type WalletClient: Clone + Send + Sync + 'static;

    /// Error raised by the library (user rejection, connector unavailable, ...).
    type Error: std::error::Error + Send + Sync + 'static;

    /// Configured connectors.
    fn connectors(&self) -> Vec<Connector>;

    /// Establish a session through `connector`, optionally on `chain_id`.
    async fn connect(
        &self,
        connector: &Connector,
        chain_id: Option<ChainId>,
    ) -> Result<(), Self::Error>;

    /// Tear down the current session. Succeeds when nothing is connected.
    async fn disconnect(&self) -> Result<(), Self::Error>;

    /// Ask the connected wallet to switch to `chain_id`.
    async fn switch_network(&self, chain_id: ChainId) -> Result<(), Self::Error>;

    /// Current account.
    fn account(&self) -> Account;

    /// Current network.
    fn network(&self) -> Network;

    /// Public client for the current chain, or the default chain when
    /// disconnected.
    fn public_client(&self) -> Self::PublicClient;

    /// Wallet client bound to `chain_id`; `None` when no wallet is connected.
    async fn wallet_client(
        &self,
        chain_id: ChainId,
    ) -> Result<Option<Self::WalletClient>, Self::Error>;

    /// Subscribe to account changes. Dropping the receiver unsubscribes.
    fn watch_account(&self) -> broadcast::Receiver<Account>;

    /// Subscribe to network changes. Dropping the receiver unsubscribes.
    fn watch_network(&self) -> broadcast::Receiver<Network>;

    /// Restore a previously authorised connection, if the backend supports
    /// auto-connect.
    async fn reconnect(&self) -> Result<(), Self::Error> {
        Ok(())
    }
}
