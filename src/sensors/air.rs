/// Adapter between an air-quality sensor driver and the sampling loop
use log::{debug, info, warn};

use crate::error::SensorError;
use crate::models::{AirReading, AirSensorSettings, RawMeasurement};

/// Driver for a temperature/pressure/humidity/gas sensor
///
/// Implementations perform the bus traffic; they are free to fail, the
/// [`AirSampler`] decides what a failure means for the tick.
pub trait AirSensorDriver {
    /// Apply oversampling, filter and gas heater settings
    fn configure(&mut self, settings: &AirSensorSettings) -> Result<(), SensorError>;

    /// Perform one measurement cycle.
    ///
    /// `Ok(None)` means the sensor had no fresh data for this cycle.
    fn measure(&mut self) -> Result<Option<RawMeasurement>, SensorError>;
}

impl<D: AirSensorDriver + ?Sized> AirSensorDriver for Box<D> {
    fn configure(&mut self, settings: &AirSensorSettings) -> Result<(), SensorError> {
        (**self).configure(settings)
    }

    fn measure(&mut self) -> Result<Option<RawMeasurement>, SensorError> {
        (**self).measure()
    }
}

/// Turns driver measurements into gated [`AirReading`]s, one attempt per tick
pub struct AirSampler<D> {
    driver: D,
    failures: u64,
}

impl<D: AirSensorDriver> AirSampler<D> {
    /// Configure `driver` once and wrap it.
    ///
    /// # Arguments
    /// * `driver` - The sensor driver to sample from
    /// * `settings` - Oversampling, filter and heater settings to apply
    ///
    /// # Returns
    /// The sampler, or the driver's error if it rejected the settings
    pub fn new(mut driver: D, settings: &AirSensorSettings) -> Result<Self, SensorError> {
        driver.configure(settings)?;
        info!(
            "Air sensor configured: T {} / P {} / H {} oversampling, filter {}, heater {}°C for {} ms (profile {})",
            settings.temperature_oversample,
            settings.pressure_oversample,
            settings.humidity_oversample,
            settings.filter_size,
            settings.heater_temperature_c,
            settings.heater_duration_ms,
            settings.heater_profile
        );
        Ok(AirSampler {
            driver,
            failures: 0,
        })
    }

    /// Try one measurement; never retries and never fails the tick.
    pub fn sample(&mut self) -> Option<AirReading> {
        match self.driver.measure() {
            Ok(Some(raw)) => {
                if !raw.heat_stable {
                    debug!("Gas heater not stable, dropping gas resistance");
                }
                Some(AirReading::from(raw))
            }
            Ok(None) => {
                debug!("No fresh air measurement this tick");
                None
            }
            Err(e) => {
                self.failures += 1;
                warn!("Air measurement failed ({} so far): {}", self.failures, e);
                None
            }
        }
    }

    /// Number of measurements that ended in a driver error
    pub fn failures(&self) -> u64 {
        self.failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    struct Scripted {
        configured: bool,
        results: VecDeque<Result<Option<RawMeasurement>, SensorError>>,
    }

    impl AirSensorDriver for Scripted {
        fn configure(&mut self, settings: &AirSensorSettings) -> Result<(), SensorError> {
            if settings.heater_profile > 9 {
                return Err(SensorError::InvalidSetting {
                    setting: "heater_profile",
                    reason: "out of range".into(),
                });
            }
            self.configured = true;
            Ok(())
        }

        fn measure(&mut self) -> Result<Option<RawMeasurement>, SensorError> {
            self.results.pop_front().unwrap_or(Ok(None))
        }
    }

    fn measurement(heat_stable: bool) -> RawMeasurement {
        RawMeasurement {
            temperature: 20.0,
            pressure: 1000.0,
            humidity: 50.0,
            gas_resistance: 4200.0,
            heat_stable,
        }
    }

    #[test]
    fn errors_and_missing_data_become_absent_readings() {
        let driver = Scripted {
            configured: false,
            results: VecDeque::from(vec![
                Ok(Some(measurement(true))),
                Ok(None),
                Err(SensorError::Bus("nack".into())),
                Ok(Some(measurement(false))),
            ]),
        };
        let mut sampler = AirSampler::new(driver, &AirSensorSettings::default()).unwrap();
        assert!(sampler.driver.configured);

        assert_eq!(sampler.sample().unwrap().gas_resistance, Some(4200.0));
        assert!(sampler.sample().is_none());
        assert!(sampler.sample().is_none());
        assert_eq!(sampler.failures(), 1);

        let unstable = sampler.sample().unwrap();
        assert_eq!(unstable.gas_resistance, None);
        assert_eq!(unstable.temperature, 20.0);
    }

    #[test]
    fn rejected_settings_fail_construction() {
        let driver = Scripted {
            configured: false,
            results: VecDeque::new(),
        };
        let settings = AirSensorSettings {
            heater_profile: 12,
            ..AirSensorSettings::default()
        };
        assert!(AirSampler::new(driver, &settings).is_err());
    }
}
