pub mod air;
pub mod simulated;

pub use air::{AirSampler, AirSensorDriver};
pub use simulated::SimulatedAirSensor;
