//! Scripted backend for unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use alloy::primitives::{Address, ChainId};
use async_trait::async_trait;
use tokio::sync::{Notify, broadcast};

use crate::backend::{Account, Network, WalletBackend};
use crate::chain::{Chain, chains};
use crate::connector::Connector;
use crate::session::WalletSession;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub(crate) struct MockError(pub String);

impl MockError {
    fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MockPublicClient(pub ChainId);

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MockWalletClient {
    pub address: Address,
    pub chain_id: ChainId,
}

/// Holds a backend call until released.
#[derive(Debug, Default)]
pub(crate) struct Gate {
    entered: Notify,
    release: Notify,
}

impl Gate {
    /// Wait until a call is parked on this gate.
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    async fn pass(&self) {
        self.entered.notify_one();
        self.release.notified().await;
    }

    /// Let the parked call continue.
    pub fn release(&self) {
        self.release.notify_one();
    }
}

#[derive(Debug, Default)]
struct MockState {
    account: Account,
    chain_id: Option<ChainId>,
}

#[derive(Debug)]
pub(crate) struct MockBackend {
    connectors: Vec<Connector>,
    addresses: HashMap<String, Address>,
    chains: Vec<Chain>,
    state: Mutex<MockState>,
    epoch: AtomicU64,
    gates: Mutex<HashMap<String, Arc<Gate>>>,
    wallet_client_gate: Mutex<Option<Arc<Gate>>>,
    fail_connect: AtomicBool,
    fail_disconnect: AtomicBool,
    fail_wallet_client: AtomicBool,
    wallet_client_requests: Mutex<Vec<ChainId>>,
    reconnects: AtomicUsize,
    accounts: broadcast::Sender<Account>,
    networks: broadcast::Sender<Network>,
}

pub(crate) fn c1_address() -> Address {
    Address::repeat_byte(0xc1)
}

pub(crate) fn c2_address() -> Address {
    Address::repeat_byte(0xc2)
}

impl MockBackend {
    /// Backend with connectors `c1` and `c2` on mainnet, optimism and polygon.
    pub fn new() -> Self {
        let c1 = Connector::injected(true).with_id("c1");
        let c2 = Connector::coinbase_wallet("test").with_id("c2");
        let addresses = HashMap::from([
            (c1.id().to_string(), c1_address()),
            (c2.id().to_string(), c2_address()),
        ]);
        let (accounts, _) = broadcast::channel(16);
        let (networks, _) = broadcast::channel(16);

        Self {
            connectors: vec![c1, c2],
            addresses,
            chains: vec![chains::mainnet(), chains::optimism(), chains::polygon()],
            state: Mutex::new(MockState::default()),
            epoch: AtomicU64::new(0),
            gates: Mutex::new(HashMap::new()),
            wallet_client_gate: Mutex::new(None),
            fail_connect: AtomicBool::new(false),
            fail_disconnect: AtomicBool::new(false),
            fail_wallet_client: AtomicBool::new(false),
            wallet_client_requests: Mutex::new(Vec::new()),
            reconnects: AtomicUsize::new(0),
            accounts,
            networks,
        }
    }

    pub fn connector(&self, id: &str) -> Connector {
        self.connectors
            .iter()
            .find(|c| c.id() == id)
            .cloned()
            .unwrap()
    }

    /// Park the next connect call for `connector_id` until released.
    pub fn gate(&self, connector_id: &str) -> Arc<Gate> {
        let gate = Arc::new(Gate::default());
        self.gates
            .lock()
            .unwrap()
            .insert(connector_id.to_string(), Arc::clone(&gate));
        gate
    }

    /// Park the next wallet client request until released. The account is
    /// read before parking, as a library resolving a client would.
    pub fn gate_wallet_client(&self) -> Arc<Gate> {
        let gate = Arc::new(Gate::default());
        *self.wallet_client_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    pub fn fail_connect(&self, fail: bool) {
        self.fail_connect.store(fail, Ordering::SeqCst);
    }

    pub fn fail_disconnect(&self, fail: bool) {
        self.fail_disconnect.store(fail, Ordering::SeqCst);
    }

    pub fn fail_wallet_client(&self, fail: bool) {
        self.fail_wallet_client.store(fail, Ordering::SeqCst);
    }

    pub fn wallet_client_requests(&self) -> Vec<ChainId> {
        self.wallet_client_requests.lock().unwrap().clone()
    }

    pub fn reconnects(&self) -> usize {
        self.reconnects.load(Ordering::SeqCst)
    }

    /// Change the account behind the session's back, as a wallet UI would.
    pub fn set_account(&self, connector_id: &str, chain_id: ChainId) {
        let connector = self.connector(connector_id);
        let address = self.addresses[connector_id];
        {
            let mut state = self.state.lock().unwrap();
            state.account = Account::connected(address, connector);
            state.chain_id = Some(chain_id);
        }
        self.emit_account();
    }

    pub fn emit_account(&self) {
        let _ = self.accounts.send(self.account());
    }

    pub fn emit_network(&self) {
        let _ = self.networks.send(self.network());
    }

    fn take_gate(&self, connector_id: &str) -> Option<Arc<Gate>> {
        self.gates.lock().unwrap().remove(connector_id)
    }
}

#[async_trait]
impl WalletBackend for MockBackend {
    type PublicClient = MockPublicClient;
    type WalletClient = MockWalletClient;
    type Error = MockError;

    fn connectors(&self) -> Vec<Connector> {
        self.connectors.clone()
    }

    async fn connect(
        &self,
        connector: &Connector,
        chain_id: Option<ChainId>,
    ) -> Result<(), MockError> {
        let epoch = self.epoch.load(Ordering::SeqCst);
        if let Some(gate) = self.take_gate(connector.id()) {
            gate.pass().await;
        }
        if self.fail_connect.load(Ordering::SeqCst) {
            return Err(MockError::new("user rejected the request"));
        }
        if self.epoch.load(Ordering::SeqCst) != epoch {
            return Err(MockError::new("connection superseded"));
        }
        let address = self
            .addresses
            .get(connector.id())
            .copied()
            .ok_or_else(|| MockError::new("connector not found"))?;
        {
            let mut state = self.state.lock().unwrap();
            state.account = Account::connected(address, connector.clone());
            state.chain_id = Some(chain_id.unwrap_or(1));
        }
        self.emit_account();
        self.emit_network();
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), MockError> {
        if self.fail_disconnect.load(Ordering::SeqCst) {
            return Err(MockError::new("disconnect failed"));
        }
        self.epoch.fetch_add(1, Ordering::SeqCst);
        let was_connected = {
            let mut state = self.state.lock().unwrap();
            let was_connected = state.account.is_connected();
            *state = MockState::default();
            was_connected
        };
        if was_connected {
            self.emit_account();
        }
        Ok(())
    }

    async fn switch_network(&self, chain_id: ChainId) -> Result<(), MockError> {
        {
            let mut state = self.state.lock().unwrap();
            if !state.account.is_connected() {
                return Err(MockError::new("connector not found"));
            }
            state.chain_id = Some(chain_id);
        }
        self.emit_network();
        Ok(())
    }

    fn account(&self) -> Account {
        self.state.lock().unwrap().account.clone()
    }

    fn network(&self) -> Network {
        let chain_id = self.state.lock().unwrap().chain_id;
        Network {
            chain: chain_id.and_then(|id| self.chains.iter().find(|c| c.id == id).cloned()),
            chains: self.chains.clone(),
        }
    }

    fn public_client(&self) -> MockPublicClient {
        MockPublicClient(self.state.lock().unwrap().chain_id.unwrap_or(1))
    }

    async fn wallet_client(&self, chain_id: ChainId) -> Result<Option<MockWalletClient>, MockError> {
        self.wallet_client_requests.lock().unwrap().push(chain_id);
        let address = self.account().address;
        let gate = self.wallet_client_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.pass().await;
        }
        if self.fail_wallet_client.load(Ordering::SeqCst) {
            return Err(MockError::new("wallet client unavailable"));
        }
        Ok(address.map(|address| MockWalletClient { address, chain_id }))
    }

    fn watch_account(&self) -> broadcast::Receiver<Account> {
        self.accounts.subscribe()
    }

    fn watch_network(&self) -> broadcast::Receiver<Network> {
        self.networks.subscribe()
    }

    async fn reconnect(&self) -> Result<(), MockError> {
        self.reconnects.fetch_add(1, Ordering::SeqCst);
        let connector = self.connector("c1");
        self.connect(&connector, None).await
    }
}

pub(crate) fn mock_session() -> WalletSession<MockBackend> {
    WalletSession::builder(MockBackend::new()).build()
}
