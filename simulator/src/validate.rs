use crate::errors::{Error, Result};
use crate::telemetry::{Reading, ReadingValue};

/// Checks a reading against the range declared for its sensor type.
pub fn validate(reading: &Reading) -> Result<()> {
    if reading.sensor_id.is_empty() {
        return Err(Error::Validation("Sensor ID cannot be empty".to_string()));
    }

    let spec = reading.sensor_type.spec();

    match reading.value {
        ReadingValue::State(state) if reading.sensor_type.is_binary() => {
            if state > 1 {
                return Err(Error::Validation(format!(
                    "{} state {} is not 0 or 1",
                    reading.sensor_id, state
                )));
            }
        }
        ReadingValue::Level(level) if !reading.sensor_type.is_binary() => {
            if !level.is_finite() || level < spec.min || level > spec.max {
                return Err(Error::Validation(format!(
                    "{} value {} out of range [{}, {}]",
                    reading.sensor_id, level, spec.min, spec.max
                )));
            }
        }
        _ => {
            return Err(Error::Validation(format!(
                "{} value kind does not match sensor type {}",
                reading.sensor_id, reading.sensor_type
            )));
        }
    }

    Ok(())
}
