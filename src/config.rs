use log::debug;
use std::env;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::models::{AirSensorSettings, FilterSize, Oversampling};

/// Where finished reports are written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkKind {
    Stdout,
    Log,
}

/// Per-pulse physical conversion factors
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PulseConversion {
    /// Rain collected per bucket tip, in millimetres
    pub rain_mm_per_pulse: f64,
    /// Wind speed for one anemometer pulse per second, in km/h
    pub wind_kmh_per_hz: f64,
}

/// Parameters for the simulated hardware used off-device
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationConfig {
    pub seed: Option<u64>,
    pub rain_mean_secs: f64,
    pub wind_mean_ms: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StationConfig {
    pub tick_interval_secs: u32,
    pub rollup_period_minutes: u32,
    pub conversion: PulseConversion,
    pub counter_modulus: u32,
    pub air_sensor: AirSensorSettings,
    pub sink: SinkKind,
    pub simulation: SimulationConfig,
}

impl Default for StationConfig {
    fn default() -> Self {
        StationConfig {
            tick_interval_secs: 10,
            rollup_period_minutes: 5,
            conversion: PulseConversion {
                rain_mm_per_pulse: 0.2794,
                wind_kmh_per_hz: 2.4,
            },
            counter_modulus: 10_000,
            air_sensor: AirSensorSettings::default(),
            sink: SinkKind::Stdout,
            simulation: SimulationConfig {
                seed: None,
                rain_mean_secs: 90.0,
                wind_mean_ms: 700.0,
            },
        }
    }
}

impl StationConfig {
    /// Load configuration from `.env` and the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load environment variables
        dotenv::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    ///
    /// Every variable is optional; missing ones keep the deployed defaults.
    /// Values that are present but malformed are rejected with the name of
    /// the offending variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = StationConfig::default();
        let get = |key: &'static str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .map(|v| (key, v))
        };

        let tick_interval_secs = match get("STATION_TICK_INTERVAL_SECS") {
            Some((key, v)) => divisor_of_sixty(key, &v)?,
            None => defaults.tick_interval_secs,
        };
        let rollup_period_minutes = match get("STATION_ROLLUP_PERIOD_MINUTES") {
            Some((key, v)) => divisor_of_sixty(key, &v)?,
            None => defaults.rollup_period_minutes,
        };

        let rain_mm_per_pulse = match get("RAIN_MM_PER_PULSE") {
            Some((key, v)) => positive_float(key, &v)?,
            None => defaults.conversion.rain_mm_per_pulse,
        };
        let wind_kmh_per_hz = match get("WIND_KMH_PER_HZ") {
            Some((key, v)) => positive_float(key, &v)?,
            None => defaults.conversion.wind_kmh_per_hz,
        };

        let counter_modulus = match get("PULSE_COUNTER_MODULUS") {
            Some((key, v)) => {
                let modulus: u32 = parse(key, &v, "expected an unsigned integer")?;
                if modulus < 2 {
                    return Err(ConfigError::invalid(key, v, "must be at least 2"));
                }
                modulus
            }
            None => defaults.counter_modulus,
        };

        let mut air_sensor = defaults.air_sensor;
        if let Some((key, v)) = get("AIR_OVERSAMPLE_TEMPERATURE") {
            air_sensor.temperature_oversample = oversampling(key, &v)?;
        }
        if let Some((key, v)) = get("AIR_OVERSAMPLE_PRESSURE") {
            air_sensor.pressure_oversample = oversampling(key, &v)?;
        }
        if let Some((key, v)) = get("AIR_OVERSAMPLE_HUMIDITY") {
            air_sensor.humidity_oversample = oversampling(key, &v)?;
        }
        if let Some((key, v)) = get("AIR_FILTER_SIZE") {
            let size: u8 = parse(key, &v, "expected an unsigned integer")?;
            air_sensor.filter_size = FilterSize::new(size)
                .ok_or_else(|| ConfigError::invalid(key, v, "expected 0, 1, 3, 7, 15, 31, 63 or 127"))?;
        }
        if let Some((key, v)) = get("AIR_HEATER_TEMPERATURE_C") {
            air_sensor.heater_temperature_c = parse(key, &v, "expected degrees Celsius")?;
        }
        if let Some((key, v)) = get("AIR_HEATER_DURATION_MS") {
            air_sensor.heater_duration_ms = parse(key, &v, "expected milliseconds")?;
        }
        if let Some((key, v)) = get("AIR_HEATER_PROFILE") {
            air_sensor.heater_profile = parse(key, &v, "expected a profile index")?;
        }

        let sink = match get("REPORT_SINK") {
            Some((key, v)) => match v.to_ascii_lowercase().as_str() {
                "stdout" | "console" => SinkKind::Stdout,
                "log" => SinkKind::Log,
                _ => return Err(ConfigError::invalid(key, v, "expected 'stdout' or 'log'")),
            },
            None => defaults.sink,
        };

        let mut simulation = defaults.simulation;
        if let Some((key, v)) = get("SIM_SEED") {
            simulation.seed = Some(parse(key, &v, "expected an unsigned integer")?);
        }
        if let Some((key, v)) = get("SIM_RAIN_MEAN_SECS") {
            simulation.rain_mean_secs = positive_float(key, &v)?;
        }
        if let Some((key, v)) = get("SIM_WIND_MEAN_MS") {
            simulation.wind_mean_ms = positive_float(key, &v)?;
        }

        let config = StationConfig {
            tick_interval_secs,
            rollup_period_minutes,
            conversion: PulseConversion {
                rain_mm_per_pulse,
                wind_kmh_per_hz,
            },
            counter_modulus,
            air_sensor,
            sink,
            simulation,
        };
        debug!("Loaded configuration: {:?}", config);

        Ok(config)
    }
}

fn parse<T: FromStr>(key: &'static str, value: &str, reason: &'static str) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::invalid(key, value, reason))
}

// Ticks and rollups both align on the minute, so the interval has to tile it.
fn divisor_of_sixty(key: &'static str, value: &str) -> Result<u32, ConfigError> {
    let n: u32 = parse(key, value, "expected an unsigned integer")?;
    if n == 0 || 60 % n != 0 {
        return Err(ConfigError::invalid(key, value, "must divide 60 evenly"));
    }
    Ok(n)
}

fn positive_float(key: &'static str, value: &str) -> Result<f64, ConfigError> {
    let f: f64 = parse(key, value, "expected a number")?;
    if !f.is_finite() || f <= 0.0 {
        return Err(ConfigError::invalid(key, value, "must be a positive number"));
    }
    Ok(f)
}

fn oversampling(key: &'static str, value: &str) -> Result<Oversampling, ConfigError> {
    value
        .parse()
        .map_err(|reason| ConfigError::invalid(key, value, reason))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<StationConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        StationConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn empty_environment_gives_station_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config, StationConfig::default());
        assert_eq!(config.tick_interval_secs, 10);
        assert_eq!(config.rollup_period_minutes, 5);
        assert_eq!(config.counter_modulus, 10_000);
        assert_eq!(config.air_sensor.heater_temperature_c, 320);
    }

    #[test]
    fn overrides_are_applied() {
        let config = load(&[
            ("STATION_TICK_INTERVAL_SECS", "15"),
            ("STATION_ROLLUP_PERIOD_MINUTES", "10"),
            ("RAIN_MM_PER_PULSE", "0.5"),
            ("PULSE_COUNTER_MODULUS", "256"),
            ("AIR_OVERSAMPLE_HUMIDITY", "16x"),
            ("AIR_FILTER_SIZE", "7"),
            ("REPORT_SINK", "log"),
            ("SIM_SEED", "42"),
        ])
        .unwrap();

        assert_eq!(config.tick_interval_secs, 15);
        assert_eq!(config.rollup_period_minutes, 10);
        assert_eq!(config.conversion.rain_mm_per_pulse, 0.5);
        assert_eq!(config.counter_modulus, 256);
        assert_eq!(config.air_sensor.humidity_oversample, Oversampling::X16);
        assert_eq!(config.air_sensor.filter_size.size(), 7);
        assert_eq!(config.sink, SinkKind::Log);
        assert_eq!(config.simulation.seed, Some(42));
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = load(&[("STATION_TICK_INTERVAL_SECS", "  ")]).unwrap();
        assert_eq!(config.tick_interval_secs, 10);
    }

    #[test]
    fn interval_must_tile_the_minute() {
        let err = load(&[("STATION_TICK_INTERVAL_SECS", "7")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { key: "STATION_TICK_INTERVAL_SECS", .. }
        ));
        assert!(load(&[("STATION_ROLLUP_PERIOD_MINUTES", "0")]).is_err());
    }

    #[test]
    fn modulus_below_two_is_rejected() {
        assert!(load(&[("PULSE_COUNTER_MODULUS", "1")]).is_err());
        assert!(load(&[("PULSE_COUNTER_MODULUS", "-3")]).is_err());
    }

    #[test]
    fn conversion_factors_must_be_positive() {
        assert!(load(&[("WIND_KMH_PER_HZ", "0")]).is_err());
        assert!(load(&[("RAIN_MM_PER_PULSE", "abc")]).is_err());
    }

    #[test]
    fn unknown_sink_is_rejected() {
        let err = load(&[("REPORT_SINK", "mqtt")]).unwrap_err();
        assert_eq!(err.to_string(), "REPORT_SINK is not a valid value: 'mqtt' (expected 'stdout' or 'log')");
    }
}
