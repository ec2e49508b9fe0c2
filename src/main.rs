use log::{error, info};
use std::time::Duration;

use weather_station::clock::{Clock, ClockAligner, SystemClock};
use weather_station::config::{SinkKind, StationConfig};
use weather_station::pulse::{PulseCounter, SimulatedPulseSource};
use weather_station::report::{ConsoleSink, LogSink, ReportSink};
use weather_station::sensors::{AirSampler, SimulatedAirSensor};
use weather_station::station::Station;
use weather_station::utils::format_datetime;

async fn main_loop(config: StationConfig, clock: SystemClock) -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting weather station monitoring loop");

    let sim = config.simulation;
    // Distinct streams per device when a seed is given
    let seed_for = |offset: u64| sim.seed.map(|s| s.wrapping_add(offset));

    let sampler = AirSampler::new(SimulatedAirSensor::new(seed_for(0)), &config.air_sensor)?;

    let mut rain_source =
        SimulatedPulseSource::new("rain", Duration::from_secs_f64(sim.rain_mean_secs), seed_for(1));
    let mut wind_source =
        SimulatedPulseSource::new("wind", Duration::from_secs_f64(sim.wind_mean_ms / 1000.0), seed_for(2));
    let rain = PulseCounter::attach(&mut rain_source, config.counter_modulus)?;
    let wind = PulseCounter::attach(&mut wind_source, config.counter_modulus)?;

    let sink: Box<dyn ReportSink> = match config.sink {
        SinkKind::Stdout => Box::new(ConsoleSink::stdout()),
        SinkKind::Log => Box::new(LogSink),
    };

    let mut aligner = ClockAligner::new(clock, config.tick_interval_secs);
    let mut station = Station::new(&config, sampler, rain, wind, sink);

    station.run(&mut aligner).await;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // The local offset can only be read while the process is single-threaded
    let clock = SystemClock::local();

    // Initialize logging
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .format_timestamp_secs()
        .init();

    // Load configuration
    let config = match StationConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    info!(
        "Local clock offset {}, started at {}",
        clock.offset(),
        format_datetime(&clock.now())
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        // Run main loop or wait for shutdown signal
        tokio::select! {
            result = main_loop(config, clock) => {
                if let Err(e) = result {
                    error!("Fatal error: {}", e);
                    return Err(e);
                }
            }
            signal = tokio::signal::ctrl_c() => {
                match signal {
                    Ok(()) => info!("Program terminated by user. Exiting."),
                    Err(e) => error!("Failed to listen for Ctrl+C: {}", e),
                }
            }
        }
        Ok(())
    })
}
