//! Observable session state.

use alloy::primitives::{Address, ChainId};

use crate::backend::WalletBackend;
use crate::connector::Connector;

/// Snapshot of the last state a backend reported.
///
/// `connected` is derived from `address`, so a snapshot can never claim a
/// connection without an address or the other way around.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState<P, W> {
    pub(crate) address: Option<Address>,
    pub(crate) chain_id: Option<ChainId>,
    pub(crate) public_client: Option<P>,
    pub(crate) wallet_client: Option<W>,
    pub(crate) is_connecting: bool,
    pub(crate) pending_connector: Option<Connector>,
}

/// The state type a session over backend `B` publishes.
pub type StateOf<B> =
    SessionState<<B as WalletBackend>::PublicClient, <B as WalletBackend>::WalletClient>;

impl<P, W> Default for SessionState<P, W> {
    fn default() -> Self {
        Self {
            address: None,
            chain_id: None,
            public_client: None,
            wallet_client: None,
            is_connecting: false,
            pending_connector: None,
        }
    }
}

impl<P, W> SessionState<P, W> {
    /// Whether a wallet is connected.
    #[must_use]
    pub const fn connected(&self) -> bool {
        self.address.is_some()
    }

    /// Connected address.
    #[must_use]
    pub const fn address(&self) -> Option<Address> {
        self.address
    }

    /// Active chain id.
    #[must_use]
    pub const fn chain_id(&self) -> Option<ChainId> {
        self.chain_id
    }

    /// Public client handle.
    #[must_use]
    pub const fn public_client(&self) -> Option<&P> {
        self.public_client.as_ref()
    }

    /// Wallet client handle.
    #[must_use]
    pub const fn wallet_client(&self) -> Option<&W> {
        self.wallet_client.as_ref()
    }

    /// Whether a connect call is in flight.
    #[must_use]
    pub const fn is_connecting(&self) -> bool {
        self.is_connecting
    }

    /// Connector of the in-flight connect call.
    #[must_use]
    pub const fn pending_connector(&self) -> Option<&Connector> {
        self.pending_connector.as_ref()
    }

    /// Clear everything, including the pending flag.
    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_disconnected() {
        let state = SessionState::<(), ()>::default();
        assert!(!state.connected());
        assert!(state.address().is_none());
        assert!(state.public_client().is_none());
        assert!(!state.is_connecting());
    }

    #[test]
    fn test_connected_follows_address() {
        let mut state = SessionState::<(), ()> {
            address: Some(Address::repeat_byte(7)),
            chain_id: Some(1),
            public_client: Some(()),
            wallet_client: Some(()),
            is_connecting: true,
            pending_connector: Some(Connector::injected(true)),
        };
        assert!(state.connected());

        state.reset();
        assert!(!state.connected());
        assert_eq!(state, SessionState::default());
    }
}
