use crate::errors::{Error, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rumqttc::QoS;
use std::time::Duration;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 1883;
pub const DEFAULT_SENSORS: usize = 5;
pub const DEFAULT_INTERVAL_SECS: f64 = 1.0;
pub const DEFAULT_KEEP_ALIVE: Duration = Duration::from_secs(60);

/// IoT sensor data simulator
#[derive(Debug, Clone, Parser)]
#[command(name = "sensor-simulator", version, about)]
pub struct Args {
    /// MQTT broker host
    #[arg(long, env = "MQTT_BROKER", default_value = DEFAULT_HOST)]
    pub host: String,

    /// MQTT broker port
    #[arg(long, env = "MQTT_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Number of sensors to simulate
    #[arg(long, env = "SENSORS", default_value_t = DEFAULT_SENSORS)]
    pub sensors: usize,

    /// Interval between readings in seconds
    #[arg(long, env = "INTERVAL", default_value_t = DEFAULT_INTERVAL_SECS)]
    pub interval: f64,

    /// Seed for the random source; omit for a fresh seed per run
    #[arg(long, env = "SEED")]
    pub seed: Option<u64>,

    /// Stop after this many ticks instead of running until interrupted
    #[arg(long)]
    pub ticks: Option<u64>,

    /// QoS level for published readings
    #[arg(long, env = "MQTT_QOS", default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=2))]
    pub qos: u8,

    /// MQTT client identifier
    #[arg(long, env = "MQTT_CLIENT_ID")]
    pub client_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    pub host: String,
    pub port: u16,
    pub sensor_count: usize,
    pub interval: Duration,
    pub seed: Option<u64>,
    pub max_ticks: Option<u64>,
    pub qos: QoS,
    pub client_id: String,
    pub keep_alive: Duration,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            sensor_count: DEFAULT_SENSORS,
            interval: Duration::from_secs_f64(DEFAULT_INTERVAL_SECS),
            seed: None,
            max_ticks: None,
            qos: QoS::AtMostOnce,
            client_id: generate_client_id(),
            keep_alive: DEFAULT_KEEP_ALIVE,
        }
    }
}

impl SimulatorConfig {
    /// Random source for the fleet, seeded when a seed was configured.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

impl TryFrom<Args> for SimulatorConfig {
    type Error = Error;

    fn try_from(args: Args) -> Result<Self> {
        // Rejects negative, NaN and values too large for a Duration
        let interval = Duration::try_from_secs_f64(args.interval).map_err(|e| {
            Error::Config(format!(
                "interval must be a non-negative number of seconds, got {}: {}",
                args.interval, e
            ))
        })?;

        let qos = match args.qos {
            0 => QoS::AtMostOnce,
            1 => QoS::AtLeastOnce,
            2 => QoS::ExactlyOnce,
            other => return Err(Error::Config(format!("invalid QoS level {}", other))),
        };

        Ok(Self {
            host: args.host,
            port: args.port,
            sensor_count: args.sensors,
            interval,
            seed: args.seed,
            max_ticks: args.ticks,
            qos,
            client_id: args.client_id.unwrap_or_else(generate_client_id),
            keep_alive: DEFAULT_KEEP_ALIVE,
        })
    }
}

fn generate_client_id() -> String {
    format!("sim-{}", uuid::Uuid::new_v4())
}
