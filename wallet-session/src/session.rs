//! The wallet session.
//!
//! [`WalletSession`] caches the account, chain and client handles a
//! [`WalletBackend`] reports, and publishes them as a [`SessionState`]
//! through a `tokio::sync::watch` channel. UI code subscribes to the
//! channel and drives the session with [`connect`](WalletSession::connect),
//! [`disconnect`](WalletSession::disconnect) and
//! [`switch_network`](WalletSession::switch_network).
//!
//! # Examples
//!
//! ```rust,ignore
//! let session = WalletSession::builder(backend).build();
//! let _watcher = session.watch();
//!
//! let connector = session.connectors()[0].clone();
//! session.connect(&connector, Some(10)).await?;
//!
//! let mut state = session.subscribe();
//! while state.changed().await.is_ok() {
//!     render(&state.borrow());
//! }
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use alloy::primitives::{Address, ChainId};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::backend::WalletBackend;
use crate::connector::Connector;
use crate::state::{SessionState, StateOf};
use crate::watcher::SessionWatcher;

/// Chain used to request a wallet client when no chain is active.
pub const DEFAULT_FALLBACK_CHAIN_ID: ChainId = 1;

/// Builder for a [`WalletSession`].
#[derive(Debug)]
pub struct WalletSessionBuilder<B> {
    backend: B,
    fallback_chain_id: ChainId,
}

impl<B: WalletBackend> WalletSessionBuilder<B> {
    /// Set the chain used to request a wallet client while no chain is
    /// active (default 1, Ethereum mainnet).
    #[must_use]
    pub const fn fallback_chain_id(mut self, chain_id: ChainId) -> Self {
        self.fallback_chain_id = chain_id;
        self
    }

    /// Build the session. The state starts empty; call
    /// [`refresh`](WalletSession::refresh) or
    /// [`restore`](WalletSession::restore) to populate it.
    #[must_use]
    pub fn build(self) -> WalletSession<B> {
        let connectors = self.backend.connectors();
        let (state, _) = watch::channel(SessionState::default());

        WalletSession {
            inner: Arc::new(SessionInner {
                backend: self.backend,
                connectors,
                fallback_chain_id: self.fallback_chain_id,
                state,
                connect_epoch: AtomicU64::new(0),
                refresh_epoch: AtomicU64::new(0),
            }),
        }
    }
}

/// Reactive wallet session over a [`WalletBackend`].
///
/// Cloning is cheap; clones share the same state.
pub struct WalletSession<B: WalletBackend> {
    inner: Arc<SessionInner<B>>,
}

struct SessionInner<B: WalletBackend> {
    backend: B,
    connectors: Vec<Connector>,
    fallback_chain_id: ChainId,
    state: watch::Sender<StateOf<B>>,
    /// Bumped by every connect call; only the latest one clears the
    /// pending flag.
    connect_epoch: AtomicU64,
    /// Bumped together with every disconnect reset; a refresh that started
    /// before the reset does not publish.
    refresh_epoch: AtomicU64,
}

impl<B: WalletBackend> Clone for WalletSession<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B: WalletBackend> std::fmt::Debug for WalletSession<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("WalletSession")
            .field("address", &state.address())
            .field("chain_id", &state.chain_id())
            .field("is_connecting", &state.is_connecting())
            .finish_non_exhaustive()
    }
}

impl<B: WalletBackend> WalletSession<B> {
    /// Create a builder over `backend`.
    #[must_use]
    pub const fn builder(backend: B) -> WalletSessionBuilder<B> {
        WalletSessionBuilder {
            backend,
            fallback_chain_id: DEFAULT_FALLBACK_CHAIN_ID,
        }
    }

    /// Re-read the backend and overwrite the cached state.
    ///
    /// The new snapshot is published in one step once every getter has
    /// returned. A backend failure leaves the previous snapshot in place,
    /// and so does a [`disconnect`](Self::disconnect) that lands while the
    /// getters are running.
    pub async fn refresh(&self) -> Result<(), B::Error> {
        let inner = &self.inner;
        let epoch = inner.refresh_epoch.load(Ordering::SeqCst);
        let address = inner.backend.account().address;
        let chain_id = inner.backend.network().chain_id();
        let public_client = inner.backend.public_client();
        let wallet_client = inner
            .backend
            .wallet_client(chain_id.unwrap_or(inner.fallback_chain_id))
            .await?;

        let published = inner.state.send_if_modified(|state| {
            if inner.refresh_epoch.load(Ordering::SeqCst) != epoch {
                return false;
            }
            state.address = address;
            state.chain_id = chain_id;
            state.public_client = Some(public_client);
            state.wallet_client = wallet_client;
            true
        });

        if published {
            debug!(
                address = ?address,
                chain_id = ?chain_id,
                "session state refreshed"
            );
        } else {
            debug!("session disconnected during refresh, snapshot discarded");
        }
        Ok(())
    }

    /// Connect through `connector`, optionally on `chain_id`.
    ///
    /// Any existing session is disconnected first. The pending flag is set
    /// for the duration of the call and released however it ends, including
    /// when the future is dropped.
    pub async fn connect(
        &self,
        connector: &Connector,
        chain_id: Option<ChainId>,
    ) -> Result<(), B::Error> {
        let _pending = PendingGuard::begin(&self.inner, connector);

        debug!(connector = %connector, chain_id = ?chain_id, "connecting");
        self.inner.backend.disconnect().await?;
        self.inner.backend.connect(connector, chain_id).await?;
        self.refresh().await?;

        info!(
            connector = %connector,
            address = ?self.account(),
            chain_id = ?self.chain_id(),
            "wallet connected"
        );
        Ok(())
    }

    /// Disconnect the wallet.
    ///
    /// The cached state is cleared even when the backend fails; the
    /// backend error is returned afterwards.
    pub async fn disconnect(&self) -> Result<(), B::Error> {
        let result = self.inner.backend.disconnect().await;
        let refresh_epoch = &self.inner.refresh_epoch;
        self.inner.state.send_modify(|state| {
            refresh_epoch.fetch_add(1, Ordering::SeqCst);
            state.reset();
        });
        info!(ok = result.is_ok(), "wallet disconnected");
        result
    }

    /// Ask the wallet to switch chains.
    ///
    /// The cache is not touched here; the change arrives through the
    /// backend's network notification.
    pub async fn switch_network(&self, chain_id: ChainId) -> Result<(), B::Error> {
        self.inner.backend.switch_network(chain_id).await?;
        info!(chain_id, "network switch requested");
        Ok(())
    }

    /// Restore a previously authorised connection, then refresh.
    pub async fn restore(&self) -> Result<(), B::Error> {
        self.inner.backend.reconnect().await?;
        self.refresh().await
    }

    /// Start the event bridge: every account or network notification from
    /// the backend triggers a [`refresh`](Self::refresh) until the returned
    /// watcher is stopped or dropped.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use = "dropping the watcher stops it immediately"]
    pub fn watch(&self) -> SessionWatcher {
        SessionWatcher::spawn(self.clone())
    }

    /// Subscribe to state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<StateOf<B>> {
        self.inner.state.subscribe()
    }

    /// Current snapshot.
    #[must_use]
    pub fn state(&self) -> StateOf<B> {
        self.inner.state.borrow().clone()
    }

    /// Whether a wallet is connected.
    #[must_use]
    pub fn connected(&self) -> bool {
        self.inner.state.borrow().connected()
    }

    /// Connected address.
    #[must_use]
    pub fn account(&self) -> Option<Address> {
        self.inner.state.borrow().address()
    }

    /// Active chain id.
    #[must_use]
    pub fn chain_id(&self) -> Option<ChainId> {
        self.inner.state.borrow().chain_id()
    }

    /// Public client handle.
    #[must_use]
    pub fn client(&self) -> Option<B::PublicClient> {
        self.inner.state.borrow().public_client().cloned()
    }

    /// Wallet client handle.
    #[must_use]
    pub fn wallet_client(&self) -> Option<B::WalletClient> {
        self.inner.state.borrow().wallet_client().cloned()
    }

    /// Whether a connect call is in flight.
    #[must_use]
    pub fn is_connecting(&self) -> bool {
        self.inner.state.borrow().is_connecting()
    }

    /// Connector of the in-flight connect call.
    #[must_use]
    pub fn pending_connector(&self) -> Option<Connector> {
        self.inner.state.borrow().pending_connector().cloned()
    }

    /// Connectors offered by the backend.
    #[must_use]
    pub fn connectors(&self) -> &[Connector] {
        &self.inner.connectors
    }

    /// The underlying backend.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.inner.backend
    }
}

/// Holds the pending flag for one connect call.
struct PendingGuard<'a, B: WalletBackend> {
    inner: &'a SessionInner<B>,
    epoch: u64,
}

impl<'a, B: WalletBackend> PendingGuard<'a, B> {
    fn begin(inner: &'a SessionInner<B>, connector: &Connector) -> Self {
        let mut epoch = 0;
        inner.state.send_modify(|state| {
            epoch = inner.connect_epoch.fetch_add(1, Ordering::SeqCst) + 1;
            state.is_connecting = true;
            state.pending_connector = Some(connector.clone());
        });
        Self { inner, epoch }
    }
}

impl<B: WalletBackend> Drop for PendingGuard<'_, B> {
    fn drop(&mut self) {
        let epoch = self.epoch;
        let connect_epoch = &self.inner.connect_epoch;
        self.inner.state.send_if_modified(|state| {
            if connect_epoch.load(Ordering::SeqCst) != epoch || !state.is_connecting {
                return false;
            }
            state.is_connecting = false;
            state.pending_connector = None;
            true
        });
    }
}
