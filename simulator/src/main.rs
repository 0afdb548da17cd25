use clap::Parser;
use sensor_simulator::{Args, MqttPublisher, Simulator, SimulatorConfig};
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match SimulatorConfig::try_from(args) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::from(2);
        }
    };

    info!("Starting IoT Sensor Simulator");
    info!(
        "Broker: {}:{}, Sensors: {}, Interval: {:?}",
        config.host, config.port, config.sensor_count, config.interval
    );

    let publisher = match MqttPublisher::connect(&config).await {
        Ok(publisher) => publisher,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Simulator stopped by user");
            signal_token.cancel();
        }
    });

    let rng = config.rng();
    let mut simulator = Simulator::new(config, publisher, rng);
    let outcome = simulator.run(&cancel).await;
    let published = simulator.published();

    if let Err(e) = simulator.into_publisher().disconnect().await {
        warn!("Disconnect failed: {}", e);
    }
    info!("Disconnected from MQTT broker");

    match outcome {
        Ok(ticks) => {
            info!("Ran {} ticks, published {} messages", ticks, published);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Simulation aborted: {}", e);
            ExitCode::FAILURE
        }
    }
}
