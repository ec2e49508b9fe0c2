/// Running sums across ticks and the averages derived from them
use crate::config::PulseConversion;
use crate::models::AirReading;

/// Everything polled at one tick boundary
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TickSample {
    pub air: Option<AirReading>,
    pub rain_pulses: u32,
    pub wind_pulses: u32,
    /// Wall-clock seconds the pulse counts were gathered over
    pub elapsed_secs: f64,
}

/// Sums and counts for one reporting window.
///
/// Each quantity keeps its own denominator: ticks for pulse rates, valid air
/// samples for temperature/pressure/humidity, heat-stable samples for gas.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Accumulator {
    ticks: u32,
    air_samples: u32,
    gas_samples: u32,
    temperature_sum: f64,
    pressure_sum: f64,
    humidity_sum: f64,
    gas_resistance_sum: f64,
    rain_pulses: u64,
    wind_pulses: u64,
    elapsed_secs: f64,
}

/// Averages and totals for a finished window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub ticks: u32,
    pub air_samples: u32,
    pub gas_samples: u32,
    pub temperature: Option<f64>,
    pub pressure: Option<f64>,
    pub humidity: Option<f64>,
    pub gas_resistance: Option<f64>,
    /// Total rain over the window in millimetres
    pub rain_mm: f64,
    /// Mean wind speed over the window in km/h
    pub wind_kmh: Option<f64>,
    pub rain_pulses: u64,
    pub wind_pulses: u64,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulator holding exactly one tick
    pub fn single(sample: &TickSample) -> Self {
        let mut acc = Self::new();
        acc.record(sample);
        acc
    }

    /// Fold one tick into the running sums.
    ///
    /// Pulses, elapsed time and the tick count are always taken. A missing
    /// air sample adds nothing to the air sums.
    pub fn record(&mut self, sample: &TickSample) {
        self.ticks += 1;
        self.rain_pulses += u64::from(sample.rain_pulses);
        self.wind_pulses += u64::from(sample.wind_pulses);
        self.elapsed_secs += sample.elapsed_secs;

        if let Some(air) = sample.air {
            self.air_samples += 1;
            self.temperature_sum += air.temperature;
            self.pressure_sum += air.pressure;
            self.humidity_sum += air.humidity;

            if let Some(gas) = air.gas_resistance {
                self.gas_samples += 1;
                self.gas_resistance_sum += gas;
            }
        }
    }

    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    /// Compute averages and converted pulse quantities.
    ///
    /// # Arguments
    /// * `conversion` - Per-pulse rain volume and wind speed factors
    ///
    /// # Returns
    /// A summary where any average whose count is zero is `None`. Wind speed
    /// is the pulse rate over the summed tick durations, `None` when no time
    /// has been covered.
    pub fn summarize(&self, conversion: &PulseConversion) -> Summary {
        Summary {
            ticks: self.ticks,
            air_samples: self.air_samples,
            gas_samples: self.gas_samples,
            temperature: mean(self.temperature_sum, self.air_samples),
            pressure: mean(self.pressure_sum, self.air_samples),
            humidity: mean(self.humidity_sum, self.air_samples),
            gas_resistance: mean(self.gas_resistance_sum, self.gas_samples),
            rain_mm: self.rain_pulses as f64 * conversion.rain_mm_per_pulse,
            wind_kmh: (self.elapsed_secs > 0.0).then(|| {
                self.wind_pulses as f64 * conversion.wind_kmh_per_hz / self.elapsed_secs
            }),
            rain_pulses: self.rain_pulses,
            wind_pulses: self.wind_pulses,
        }
    }
}

fn mean(sum: f64, count: u32) -> Option<f64> {
    (count > 0).then(|| sum / f64::from(count))
}
