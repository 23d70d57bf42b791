use std::time::Duration;

use tracing_subscriber::EnvFilter;
use wallet_session::prelude::*;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = WalletConfig::builder()
        .chain(chains::mainnet())
        .chain(chains::optimism())
        .connector(Connector::injected(true))
        .auto_connect(true)
        .build()?;

    // Well-known development mnemonic; never use it with real funds.
    let backend = LocalBackend::builder()
        .config(config)
        .mnemonic("test test test test test test test test test test test junk")
        .build()?;

    let session = WalletSession::builder(backend).build();
    let watcher = session.watch();

    let mut state = session.subscribe();
    let printer = tokio::spawn(async move {
        while state.changed().await.is_ok() {
            let snapshot = state.borrow_and_update().clone();
            tracing::info!(
                connected = snapshot.connected(),
                address = ?snapshot.address(),
                chain_id = ?snapshot.chain_id(),
                connecting = snapshot.is_connecting(),
                "state changed"
            );
        }
    });

    session.restore().await?;

    session.switch_network(10).await?;
    tokio::time::sleep(Duration::from_millis(50)).await;

    let connector = session
        .connectors()
        .iter()
        .find(|c| c.kind() == ConnectorKind::Injected)
        .cloned();
    if let Some(connector) = connector {
        if let Err(e) = session.connect(&connector, None).await {
            tracing::warn!(error = %e, "injected connector unavailable");
        }
    }

    session.disconnect().await?;
    watcher.stop().await;
    printer.abort();

    Ok(())
}
