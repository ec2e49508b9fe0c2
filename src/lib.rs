//! Periodic monitoring loop for an unattended weather station.
//!
//! An air-quality sensor and two pulse sensors (rain tip-bucket and
//! anemometer) are sampled on wall-clock aligned ticks. Each tick yields a
//! fine report; ticks landing on a rollup boundary yield a statistical
//! rollup of the whole window instead.

pub mod aggregate;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod pulse;
pub mod report;
pub mod rollup;
pub mod sensors;
pub mod station;
pub mod utils;

pub use aggregate::{Accumulator, Summary, TickSample};
pub use clock::{Clock, ClockAligner, SystemClock};
pub use config::{SinkKind, StationConfig};
pub use error::{ConfigError, ReportError, SensorError, StationError};
pub use models::{AirReading, AirSensorSettings, RawMeasurement};
pub use pulse::{ManualPulseSource, PulseCounter, PulseSource, SimulatedPulseSource};
pub use report::{Report, ReportKind, ReportSink};
pub use station::Station;
