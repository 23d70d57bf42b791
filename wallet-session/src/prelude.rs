//! Common imports.
//!
//! ```rust,ignore
//! use wallet_session::prelude::*;
//! ```

pub use crate::backend::{Account, Network, WalletBackend};
pub use crate::chain::{Chain, chains};
pub use crate::config::WalletConfig;
pub use crate::connector::{Connector, ConnectorKind};
pub use crate::local::LocalBackend;
pub use crate::session::WalletSession;
pub use crate::state::SessionState;
pub use crate::watcher::SessionWatcher;
