use std::sync::Arc;

use anyhow::Result;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use zwave_bridge::events::LoggingListener;
use zwave_bridge::transaction::TimeoutSweeper;
use zwave_bridge::transport::{run_link, SerialConnector, SerialLink, TransportConnector, OUTBOUND_QUEUE};
use zwave_bridge::{BridgeConfig, Dispatcher, EventRouter, NodeRegistry, TransactionTracker};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = BridgeConfig::from_env();
    info!("Z-Wave bridge starting");
    info!("  Serial port: {} @ {} baud", config.serial_port, config.baud_rate);
    info!("  Controller node: {}", config.controller_node);

    // Without the link there is nothing to bridge
    let connector = SerialConnector::new(config.serial_port.clone(), config.baud_rate);
    let stream = connector.connect().await?;
    info!("Connected via {}", connector.name());

    let router = Arc::new(EventRouter::new());
    router.subscribe(Arc::new(LoggingListener));

    let (link, outbound_rx) = SerialLink::channel(OUTBOUND_QUEUE);
    let tracker = Arc::new(TransactionTracker::new(
        Arc::new(link),
        router.clone(),
        config.transaction_timeout,
    ));
    let devices = Arc::new(NodeRegistry::new());
    let dispatcher = Dispatcher::new(devices, tracker.clone(), config.controller_node);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweeper = TimeoutSweeper::new(tracker.clone(), config.sweep_interval);
    let sweeper_task = tokio::spawn(async move { sweeper.run(shutdown_rx).await });

    let mut link_task = tokio::spawn(run_link(stream, outbound_rx, tracker.clone()));

    if let Err(e) = dispatcher.request_network_init().await {
        warn!("Could not request network init data: {}", e);
    }

    match dispatcher.request_controller_version().await {
        Ok(handle) => {
            tokio::spawn(async move {
                if let Some(Err(e)) = handle.outcome().await {
                    warn!("Controller did not report its version: {}", e);
                }
            });
        }
        Err(e) => warn!("Could not request controller version: {}", e),
    }

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown requested");
        }
        result = &mut link_task => match result {
            Ok(Ok(())) => info!("Serial link stopped"),
            Ok(Err(e)) => error!("Serial link failed: {:#}", e),
            Err(e) => error!("Serial link task aborted: {}", e),
        },
    }

    let _ = shutdown_tx.send(true);
    if let Err(e) = sweeper_task.await {
        error!("Timeout sweeper task failed: {}", e);
    }
    link_task.abort();
    router.shutdown();

    info!("Bridge stopped ({} transaction(s) left pending)", tracker.pending_count().await);
    Ok(())
}
