use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Chance per tick that a motion sensor changes state.
pub const MOTION_FLIP_PROBABILITY: f64 = 0.1;

/// Locations are handed out round-robin by fleet index.
pub const LOCATIONS: [&str; 5] = ["room_1", "room_2", "room_3", "room_4", "room_5"];

/// Static characteristics shared by every sensor of one type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorSpec {
    pub unit: &'static str,
    pub min: f64,
    pub max: f64,
    pub precision: u32,
    pub drift_max: f64,
}

const TEMPERATURE: SensorSpec = SensorSpec {
    unit: "°C",
    min: 15.0,
    max: 35.0,
    precision: 1,
    drift_max: 0.5,
};

const HUMIDITY: SensorSpec = SensorSpec {
    unit: "%",
    min: 30.0,
    max: 80.0,
    precision: 1,
    drift_max: 2.0,
};

const MOTION: SensorSpec = SensorSpec {
    unit: "boolean",
    min: 0.0,
    max: 1.0,
    precision: 0,
    drift_max: 0.0,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorType {
    Temperature,
    Humidity,
    Motion,
}

impl SensorType {
    pub const ALL: [SensorType; 3] = [
        SensorType::Temperature,
        SensorType::Humidity,
        SensorType::Motion,
    ];

    pub fn spec(self) -> &'static SensorSpec {
        match self {
            SensorType::Temperature => &TEMPERATURE,
            SensorType::Humidity => &HUMIDITY,
            SensorType::Motion => &MOTION,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SensorType::Temperature => "temperature",
            SensorType::Humidity => "humidity",
            SensorType::Motion => "motion",
        }
    }

    /// Binary sensors hold 0 or 1 and toggle instead of drifting.
    pub fn is_binary(self) -> bool {
        matches!(self, SensorType::Motion)
    }

    fn random(rng: &mut impl Rng) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

impl fmt::Display for SensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One simulated device in the fleet.
#[derive(Debug, Clone, PartialEq)]
pub struct Sensor {
    id: String,
    sensor_type: SensorType,
    location: String,
    value: f64,
}

impl Sensor {
    /// Builds the sensor at fleet position `index` (0-based).
    pub fn new(index: usize, sensor_type: SensorType, value: f64) -> Self {
        Self {
            id: format!("{}_{}", sensor_type, index + 1),
            sensor_type,
            location: LOCATIONS[index % LOCATIONS.len()].to_string(),
            value,
        }
    }

    fn random(index: usize, rng: &mut impl Rng) -> Self {
        let sensor_type = SensorType::random(rng);
        let spec = sensor_type.spec();

        let value = if sensor_type.is_binary() {
            if rng.gen_bool(0.5) {
                1.0
            } else {
                0.0
            }
        } else {
            round_to(rng.gen_range(spec.min..=spec.max), spec.precision)
        };

        Self::new(index, sensor_type, value)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn sensor_type(&self) -> SensorType {
        self.sensor_type
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn spec(&self) -> &'static SensorSpec {
        self.sensor_type.spec()
    }

    /// Advances the sensor by one tick.
    pub fn update(&mut self, rng: &mut impl Rng) {
        if self.sensor_type.is_binary() {
            if rng.gen_bool(MOTION_FLIP_PROBABILITY) {
                self.value = if self.value == 0.0 { 1.0 } else { 0.0 };
            }
            return;
        }

        let drift_max = self.spec().drift_max;
        let delta = rng.gen_range(-drift_max..=drift_max);
        self.apply_drift(delta);
    }

    /// Adds `delta`, clamps to the type's range and rounds to its precision.
    /// No-op for binary sensors.
    pub fn apply_drift(&mut self, delta: f64) {
        if self.sensor_type.is_binary() {
            return;
        }

        let spec = self.spec();
        let clamped = (self.value + delta).clamp(spec.min, spec.max);
        self.value = round_to(clamped, spec.precision);
    }
}

/// Creates `count` sensors with random types and initial values.
pub fn initialize_fleet(count: usize, rng: &mut impl Rng) -> Vec<Sensor> {
    (0..count).map(|index| Sensor::random(index, rng)).collect()
}

pub fn round_to(value: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn has_precision(value: f64, precision: u32) -> bool {
        (round_to(value, precision) - value).abs() < 1e-9
    }

    fn assert_in_range(sensor: &Sensor) {
        let spec = sensor.spec();
        if sensor.sensor_type().is_binary() {
            assert!(
                sensor.value() == 0.0 || sensor.value() == 1.0,
                "{} holds non-binary value {}",
                sensor.id(),
                sensor.value()
            );
        } else {
            assert!(
                sensor.value() >= spec.min && sensor.value() <= spec.max,
                "{} value {} out of range [{}, {}]",
                sensor.id(),
                sensor.value(),
                spec.min,
                spec.max
            );
        }
    }

    #[test]
    fn test_fleet_ids_and_locations() {
        let mut rng = StdRng::seed_from_u64(7);
        let fleet = initialize_fleet(12, &mut rng);

        assert_eq!(fleet.len(), 12);
        for (i, sensor) in fleet.iter().enumerate() {
            assert_eq!(sensor.id(), format!("{}_{}", sensor.sensor_type(), i + 1));
            assert_eq!(sensor.location(), format!("room_{}", (i % 5) + 1));
        }
    }

    #[test]
    fn test_empty_fleet() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!(initialize_fleet(0, &mut rng).is_empty());
    }

    #[test]
    fn test_seeded_fleets_match() {
        let first = initialize_fleet(20, &mut StdRng::seed_from_u64(42));
        let second = initialize_fleet(20, &mut StdRng::seed_from_u64(42));

        assert_eq!(first.len(), second.len());
        assert_eq!(first, second);
        first.iter().for_each(assert_in_range);
    }

    #[test]
    fn test_fleet_uses_every_type() {
        let mut rng = StdRng::seed_from_u64(3);
        let fleet = initialize_fleet(300, &mut rng);

        for sensor_type in SensorType::ALL {
            assert!(fleet.iter().any(|s| s.sensor_type() == sensor_type));
        }
    }

    #[test]
    fn test_values_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut fleet = initialize_fleet(30, &mut rng);

        for _ in 0..5_000 {
            for sensor in fleet.iter_mut() {
                sensor.update(&mut rng);
                assert_in_range(sensor);
            }
        }
    }

    #[test]
    fn test_updates_respect_precision() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut fleet = initialize_fleet(30, &mut rng);

        for _ in 0..1_000 {
            for sensor in fleet.iter_mut() {
                sensor.update(&mut rng);
                assert!(
                    has_precision(sensor.value(), sensor.spec().precision),
                    "{} has too many decimals: {}",
                    sensor.id(),
                    sensor.value()
                );
            }
        }
    }

    #[test]
    fn test_motion_flip_rate() {
        let mut rng = StdRng::seed_from_u64(99);
        let mut sensor = Sensor::new(0, SensorType::Motion, 0.0);

        const TICKS: usize = 100_000;
        let mut flips = 0;
        for _ in 0..TICKS {
            let before = sensor.value();
            sensor.update(&mut rng);
            if sensor.value() != before {
                flips += 1;
            }
        }

        let rate = flips as f64 / TICKS as f64;
        assert!(
            (rate - MOTION_FLIP_PROBABILITY).abs() < 0.01,
            "flip rate {} too far from {}",
            rate,
            MOTION_FLIP_PROBABILITY
        );
    }

    #[test]
    fn test_clamped_at_max() {
        let max = SensorType::Temperature.spec().max;
        let mut sensor = Sensor::new(0, SensorType::Temperature, max);
        let mut rng = StdRng::seed_from_u64(5);

        for _ in 0..10_000 {
            let delta = rng.gen_range(0.0..=sensor.spec().drift_max);
            sensor.apply_drift(delta);
            assert!(sensor.value() <= max);
        }
        assert_eq!(sensor.value(), max);
    }

    #[test]
    fn test_clamped_at_min() {
        let spec = SensorType::Humidity.spec();
        let mut sensor = Sensor::new(0, SensorType::Humidity, spec.min + 1.0);

        sensor.apply_drift(-spec.drift_max);
        sensor.apply_drift(-spec.drift_max);
        assert_eq!(sensor.value(), spec.min);
    }

    #[test]
    fn test_drift_rounds() {
        let mut sensor = Sensor::new(0, SensorType::Temperature, 20.0);
        sensor.apply_drift(0.337);
        assert_eq!(sensor.value(), 20.3);
    }

    #[test]
    fn test_motion_ignores_drift() {
        let mut sensor = Sensor::new(0, SensorType::Motion, 1.0);
        sensor.apply_drift(0.7);
        assert_eq!(sensor.value(), 1.0);
    }

    #[test]
    fn test_type_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&SensorType::Humidity).unwrap(),
            "\"humidity\""
        );
    }
}
