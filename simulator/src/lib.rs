pub mod config;
pub mod errors;
pub mod publisher;
pub mod sensor;
pub mod simulator;
pub mod telemetry;
pub mod validate;

pub use config::{Args, SimulatorConfig};
pub use errors::{Error, Result};
pub use publisher::{MqttPublisher, Publish};
pub use sensor::{Sensor, SensorSpec, SensorType};
pub use simulator::Simulator;
pub use telemetry::{Reading, ReadingValue};
