/// Software stand-in for the BME680-class air sensor
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::SensorError;
use crate::models::{AirSensorSettings, RawMeasurement};
use crate::sensors::air::AirSensorDriver;

// Measurements taken before the gas heater reports stable
const HEATER_WARMUP_SAMPLES: u32 = 3;
// Chance that a cycle produces no new data
const MISSING_DATA_PROBABILITY: f64 = 0.02;

/// Random-walk air sensor with a warming-up gas heater
pub struct SimulatedAirSensor {
    rng: StdRng,
    settings: Option<AirSensorSettings>,
    samples_since_configure: u32,
    temperature: f64,
    pressure: f64,
    humidity: f64,
    gas_resistance: f64,
}

impl SimulatedAirSensor {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        SimulatedAirSensor {
            rng,
            settings: None,
            samples_since_configure: 0,
            temperature: 18.0,
            pressure: 1013.25,
            humidity: 55.0,
            gas_resistance: 50_000.0,
        }
    }

    fn step(value: f64, rng: &mut StdRng, spread: f64, min: f64, max: f64) -> f64 {
        (value + rng.gen_range(-spread..=spread)).clamp(min, max)
    }
}

impl AirSensorDriver for SimulatedAirSensor {
    fn configure(&mut self, settings: &AirSensorSettings) -> Result<(), SensorError> {
        if !(200..=400).contains(&settings.heater_temperature_c) {
            return Err(SensorError::InvalidSetting {
                setting: "heater_temperature_c",
                reason: format!("{} is outside 200..=400", settings.heater_temperature_c),
            });
        }
        if settings.heater_profile > 9 {
            return Err(SensorError::InvalidSetting {
                setting: "heater_profile",
                reason: format!("{} is outside 0..=9", settings.heater_profile),
            });
        }

        self.settings = Some(*settings);
        self.samples_since_configure = 0;
        Ok(())
    }

    fn measure(&mut self) -> Result<Option<RawMeasurement>, SensorError> {
        if self.settings.is_none() {
            return Err(SensorError::NotConfigured);
        }
        if self.rng.gen_bool(MISSING_DATA_PROBABILITY) {
            return Ok(None);
        }

        self.samples_since_configure = self.samples_since_configure.saturating_add(1);
        self.temperature = Self::step(self.temperature, &mut self.rng, 0.05, -40.0, 85.0);
        self.pressure = Self::step(self.pressure, &mut self.rng, 0.1, 300.0, 1100.0);
        self.humidity = Self::step(self.humidity, &mut self.rng, 0.2, 0.0, 100.0);
        self.gas_resistance = Self::step(self.gas_resistance, &mut self.rng, 250.0, 1_000.0, 500_000.0);

        Ok(Some(RawMeasurement {
            temperature: self.temperature,
            pressure: self.pressure,
            humidity: self.humidity,
            gas_resistance: self.gas_resistance,
            heat_stable: self.samples_since_configure > HEATER_WARMUP_SAMPLES,
        }))
    }
}
