// [apps/fabric-node/src/main.rs]
/*!
 * =================================================================
 * APARATO: FABRIC NODE (COMPOSITION ROOT)
 * CLASIFICACION: APPLICATION BINARY (ESTRATO L0)
 * RESPONSABILIDAD: CABLEAR SUBSISTEMAS SOBRE UN UNICO BUS Y TOKEN
 *
 * Loads `FabricConfig`, builds the message bus binding it names,
 * wires the Tapo polling service, the discovery node, and the
 * automation engine onto that bus, and runs all three under one root
 * `CancellationToken` until SIGINT — every subsystem gets its own
 * child token from `start()` rather than sharing one process-wide
 * shutdown flag.
 * =================================================================
 */

mod bus_adapters;
mod config;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use fabric_domain_automation_engine::AutomationEngine;
use fabric_infra_bus::{InMemoryBus, MessageBus, MqttBus, MqttBusConfig};
use fabric_infra_discovery::DiscoveryNode;
use fabric_infra_polling::{PollingService, ReadingSink, TracingSink};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::bus_adapters::{BusCommandSink, BusReadingSink, BusSensorSource};
use crate::config::{BusSection, FabricConfig};

#[derive(Debug, Parser)]
#[command(name = "fabric-node", about = "Smart-home automation fabric: Tapo polling, LAN discovery, and the sensor-fusion automation engine, all on one message bus.")]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(long, env = "FABRIC_CONFIG", default_value = "fabric.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    fabric_shared_observability::init_tracing("fabric-node");

    let config = FabricConfig::load(&cli.config).with_context(|| format!("loading configuration from {}", cli.config.display()))?;

    let bus: Arc<dyn MessageBus> = match &config.bus {
        BusSection::Memory => Arc::new(InMemoryBus::default()),
        BusSection::Mqtt { host, port, client_id } => Arc::new(
            MqttBus::connect(MqttBusConfig {
                client_id: client_id.clone(),
                host: host.clone(),
                port: *port,
                keep_alive: std::time::Duration::from_secs(30),
            })
            .await
            .context("connecting to MQTT broker")?,
        ),
    };

    let root_cancel = CancellationToken::new();

    let sinks: Vec<Arc<dyn ReadingSink>> = vec![Arc::new(BusReadingSink::new(bus.clone())), Arc::new(TracingSink)];
    let polling = Arc::new(PollingService::new(sinks));
    for device_section in &config.devices {
        polling.add(device_section.into()).context("registering configured device")?;
    }
    polling.start().await;
    info!(device_count = config.devices.len(), "polling service started");

    let engine = Arc::new(AutomationEngine::new((&config.engine).into()));
    for thermostat_section in config.thermostats.clone() {
        engine.thermostats().register(thermostat_section.into_thermostat_config(
            config.engine.default_hysteresis_f,
            config.engine.min_f,
            config.engine.max_f,
        ));
    }
    let sensors = Arc::new(BusSensorSource::new(bus.clone()));
    let commands = Arc::new(BusCommandSink::new(bus.clone()));
    engine.start(sensors, commands).await.context("starting automation engine")?;
    info!("automation engine started");

    let discovery = Arc::new(DiscoveryNode::new((&config.discovery).into()).await.context("binding discovery multicast socket")?);
    let mut discovery_tasks = discovery.clone().start(root_cancel.clone());
    if let Err(err) = discovery.announce().await {
        error!(error = %err, "initial discovery announce failed");
    }
    info!("discovery node started");

    wait_for_shutdown_signal().await;
    info!("shutdown signal received, stopping subsystems");

    root_cancel.cancel();
    polling.stop().await;
    engine.stop().await;
    while discovery_tasks.join_next().await.is_some() {}

    info!("fabric-node shut down cleanly");
    Ok(())
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate()).expect("installing SIGTERM handler");
    let mut sigint = signal(SignalKind::interrupt()).expect("installing SIGINT handler");

    tokio::select! {
        _ = sigterm.recv() => {}
        _ = sigint.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
