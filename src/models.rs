use std::fmt;
use std::str::FromStr;

/// One measurement from the air-quality sensor.
///
/// `gas_resistance` is only present when the gas heater was stable for this
/// sample. An unstable heater yields `None`, never `Some(0.0)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AirReading {
    pub temperature: f64,
    pub pressure: f64,
    pub humidity: f64,
    pub gas_resistance: Option<f64>,
}

/// What a driver hands back from one physical measurement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawMeasurement {
    pub temperature: f64,
    pub pressure: f64,
    pub humidity: f64,
    pub gas_resistance: f64,
    pub heat_stable: bool,
}

impl From<RawMeasurement> for AirReading {
    fn from(raw: RawMeasurement) -> Self {
        AirReading {
            temperature: raw.temperature,
            pressure: raw.pressure,
            humidity: raw.humidity,
            gas_resistance: raw.heat_stable.then_some(raw.gas_resistance),
        }
    }
}

/// Oversampling ratio for one measured quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Oversampling {
    Skipped,
    X1,
    X2,
    X4,
    X8,
    X16,
}

impl Oversampling {
    pub fn factor(self) -> u8 {
        match self {
            Oversampling::Skipped => 0,
            Oversampling::X1 => 1,
            Oversampling::X2 => 2,
            Oversampling::X4 => 4,
            Oversampling::X8 => 8,
            Oversampling::X16 => 16,
        }
    }
}

impl FromStr for Oversampling {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "0" | "0x" | "none" | "skip" | "skipped" => Ok(Oversampling::Skipped),
            "1" | "1x" => Ok(Oversampling::X1),
            "2" | "2x" => Ok(Oversampling::X2),
            "4" | "4x" => Ok(Oversampling::X4),
            "8" | "8x" => Ok(Oversampling::X8),
            "16" | "16x" => Ok(Oversampling::X16),
            _ => Err("expected one of 0x, 1x, 2x, 4x, 8x, 16x"),
        }
    }
}

impl fmt::Display for Oversampling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x", self.factor())
    }
}

/// IIR filter coefficient applied to temperature and pressure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterSize(u8);

impl FilterSize {
    const ALLOWED: [u8; 8] = [0, 1, 3, 7, 15, 31, 63, 127];

    pub fn new(size: u8) -> Option<Self> {
        Self::ALLOWED.contains(&size).then_some(FilterSize(size))
    }

    pub fn size(self) -> u8 {
        self.0
    }
}

impl fmt::Display for FilterSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Settings applied once to the air sensor at start-up
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AirSensorSettings {
    pub temperature_oversample: Oversampling,
    pub pressure_oversample: Oversampling,
    pub humidity_oversample: Oversampling,
    pub filter_size: FilterSize,
    pub heater_temperature_c: u16,
    pub heater_duration_ms: u16,
    pub heater_profile: u8,
}

impl Default for AirSensorSettings {
    fn default() -> Self {
        AirSensorSettings {
            temperature_oversample: Oversampling::X8,
            pressure_oversample: Oversampling::X4,
            humidity_oversample: Oversampling::X2,
            filter_size: FilterSize(3),
            heater_temperature_c: 320,
            heater_duration_ms: 150,
            heater_profile: 0,
        }
    }
}
