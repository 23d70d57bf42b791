#![cfg_attr(docsrs, feature(doc_cfg))]
//! wallet-session keeps a reactive view of a wallet connection.
//!
//! A [`WalletSession`] sits on top of a [`WalletBackend`] (the
//! wallet-connection library) and caches the connected address, active
//! chain and client handles in an observable [`SessionState`]. It offers
//! `connect`, `disconnect` and `switch_network`, and a [`SessionWatcher`]
//! keeps the cache in sync with account and network notifications.
//!
//! [`LocalBackend`] is a ready-made backend for in-process signers built on
//! `alloy`.

pub mod backend;
pub mod chain;
pub mod config;
pub mod connector;
pub mod error;
pub mod local;
pub mod prelude;
pub mod session;
pub mod state;
pub mod watcher;

#[cfg(test)]
mod test_support;

pub use backend::{Account, Network, WalletBackend};
pub use chain::{Chain, NativeCurrency, chains};
pub use config::{WalletConfig, WalletConfigBuilder};
pub use connector::{Connector, ConnectorKind, ConnectorOptions};
pub use error::{ConfigError, ConfigResult, LocalError, LocalResult};
pub use local::{LocalBackend, LocalBackendBuilder};
pub use session::{WalletSession, WalletSessionBuilder};
pub use state::{SessionState, StateOf};
pub use watcher::SessionWatcher;
