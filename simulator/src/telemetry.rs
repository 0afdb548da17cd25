use crate::sensor::{Sensor, SensorType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sensor value as it appears on the wire.
///
/// Binary sensors report an integer `0`/`1`, continuous sensors a float.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReadingValue {
    State(u8),
    Level(f64),
}

impl ReadingValue {
    pub fn as_f64(self) -> f64 {
        match self {
            ReadingValue::State(state) => f64::from(state),
            ReadingValue::Level(level) => level,
        }
    }
}

/// Snapshot of one sensor published on a single tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reading {
    pub sensor_id: String,
    #[serde(rename = "type")]
    pub sensor_type: SensorType,
    pub location: String,
    pub value: ReadingValue,
    pub unit: String,
    pub timestamp: DateTime<Utc>,
}

impl Reading {
    pub fn from_sensor(sensor: &Sensor, timestamp: DateTime<Utc>) -> Self {
        let value = if sensor.sensor_type().is_binary() {
            ReadingValue::State(if sensor.value() == 0.0 { 0 } else { 1 })
        } else {
            ReadingValue::Level(sensor.value())
        };

        Self {
            sensor_id: sensor.id().to_string(),
            sensor_type: sensor.sensor_type(),
            location: sensor.location().to_string(),
            value,
            unit: sensor.spec().unit.to_string(),
            timestamp,
        }
    }

    pub fn topic(&self) -> String {
        format!("sensors/{}/{}", self.sensor_type, self.sensor_id)
    }
}
