use crate::config::SimulatorConfig;
use crate::errors::Result;
use crate::publisher::Publish;
use crate::sensor::{initialize_fleet, Sensor};
use crate::telemetry::Reading;
use crate::validate::validate;
use chrono::Utc;
use rand::Rng;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

const PROGRESS_EVERY_TICKS: u64 = 60;

/// Owns the fleet and drives the update/publish/wait loop.
pub struct Simulator<P, R> {
    config: SimulatorConfig,
    sensors: Vec<Sensor>,
    rng: R,
    publisher: P,
    published: u64,
}

impl<P: Publish, R: Rng> Simulator<P, R> {
    pub fn new(config: SimulatorConfig, publisher: P, mut rng: R) -> Self {
        let sensors = initialize_fleet(config.sensor_count, &mut rng);
        info!("Initialized fleet of {} sensors", sensors.len());
        for sensor in &sensors {
            debug!(
                "{} ({}) at {}: initial value {}",
                sensor.id(),
                sensor.sensor_type(),
                sensor.location(),
                sensor.value()
            );
        }

        Self {
            config,
            sensors,
            rng,
            publisher,
            published: 0,
        }
    }

    pub fn sensors(&self) -> &[Sensor] {
        &self.sensors
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    /// Total messages sent since construction.
    pub fn published(&self) -> u64 {
        self.published
    }

    pub fn into_publisher(self) -> P {
        self.publisher
    }

    pub fn update_sensor_values(&mut self) {
        for sensor in self.sensors.iter_mut() {
            sensor.update(&mut self.rng);
        }
    }

    /// Publishes one reading per sensor, all stamped with the same time.
    pub async fn publish_sensor_data(&mut self) -> Result<usize> {
        let timestamp = Utc::now();

        for sensor in &self.sensors {
            let reading = Reading::from_sensor(sensor, timestamp);
            validate(&reading)?;

            let topic = reading.topic();
            let payload = serde_json::to_vec(&reading)?;
            debug!(
                "Published to {}: {}",
                topic,
                String::from_utf8_lossy(&payload)
            );
            self.publisher.publish(&topic, payload).await?;
            self.published += 1;
        }

        Ok(self.sensors.len())
    }

    pub async fn tick(&mut self) -> Result<usize> {
        self.update_sensor_values();
        self.publish_sensor_data().await
    }

    /// Runs ticks until `cancel` fires or the configured tick limit is hit.
    /// Returns the number of completed ticks.
    pub async fn run(&mut self, cancel: &CancellationToken) -> Result<u64> {
        info!(
            "Publishing {} sensors every {:?}",
            self.sensors.len(),
            self.config.interval
        );

        let mut ticks = 0u64;

        loop {
            if cancel.is_cancelled() {
                break;
            }
            if self.config.max_ticks.is_some_and(|max| ticks >= max) {
                info!("Reached tick limit of {}", ticks);
                break;
            }

            self.tick().await?;
            ticks += 1;

            if ticks % PROGRESS_EVERY_TICKS == 0 {
                info!("Completed {} ticks, published {} messages", ticks, self.published);
            }

            if self.config.max_ticks.is_some_and(|max| ticks >= max) {
                continue;
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.config.interval) => {}
            }
        }

        Ok(ticks)
    }
}
