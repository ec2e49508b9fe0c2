/// The tick loop: poll, aggregate, decide fine vs rollup, report
use log::{debug, info, warn};
use time::OffsetDateTime;

use crate::aggregate::{Accumulator, TickSample};
use crate::clock::{Clock, ClockAligner};
use crate::config::{PulseConversion, StationConfig};
use crate::pulse::PulseCounter;
use crate::report::{Report, ReportSink};
use crate::rollup::RollupSchedule;
use crate::sensors::{AirSampler, AirSensorDriver};

/// Owns the counters, the sampler and both accumulation levels.
///
/// Each tick's sample goes into the open rollup window. A tick landing on a
/// rollup boundary closes the window and produces the rollup report instead
/// of a fine report; every other tick produces a fine report of its own
/// values.
///
/// Pulse rates are taken over the wall-clock time since the previous tick,
/// so a tick that ran long spreads its pulses over the whole stretch.
pub struct Station<D, S> {
    conversion: PulseConversion,
    tick_interval_secs: u32,
    schedule: RollupSchedule,
    sampler: AirSampler<D>,
    rain: PulseCounter,
    wind: PulseCounter,
    rollup: Accumulator,
    open_window: Option<i64>,
    last_closed: Option<i64>,
    last_tick: Option<OffsetDateTime>,
    sink: S,
}

impl<D: AirSensorDriver, S: ReportSink> Station<D, S> {
    pub fn new(
        config: &StationConfig,
        sampler: AirSampler<D>,
        rain: PulseCounter,
        wind: PulseCounter,
        sink: S,
    ) -> Self {
        Station {
            conversion: config.conversion,
            tick_interval_secs: config.tick_interval_secs,
            schedule: RollupSchedule::new(config.rollup_period_minutes),
            sampler,
            rain,
            wind,
            rollup: Accumulator::new(),
            open_window: None,
            last_closed: None,
            last_tick: None,
            sink,
        }
    }

    /// Run forever, one tick per aligned boundary.
    ///
    /// Cancel by dropping the future; partial window state is discarded.
    pub async fn run<C: Clock>(&mut self, aligner: &mut ClockAligner<C>) {
        info!(
            "Sampling every {} s, rolling up every {} min",
            self.tick_interval_secs,
            self.schedule.period_minutes()
        );

        // Discard edges that arrived before the first aligned tick, and time
        // the first tick from here
        self.rain.get();
        self.wind.get();
        self.last_tick = Some(aligner.now());

        loop {
            let t = aligner.wait().await;
            self.tick(t);
        }
    }

    /// Process the tick at boundary `t` and emit its report(s).
    ///
    /// Normally exactly one report comes back. When the previous tick ran
    /// long enough to skip rollup boundaries, every window it skipped is
    /// reported at its own boundary first; windows that saw no ticks come
    /// out with placeholder averages.
    pub fn tick(&mut self, t: OffsetDateTime) -> Vec<Report> {
        let sample = self.poll(t);
        let key = self.schedule.window_key(t);
        let mut reports = Vec::with_capacity(1);

        let first_unreported = self.open_window.or(self.last_closed.map(|k| k + 1));
        if let Some(first) = first_unreported {
            for stale in first..key {
                let closed_at = self.schedule.closing_instant(stale, t);
                warn!(
                    "Tick at {} skipped the rollup boundary at {}",
                    t, closed_at
                );
                reports.push(self.close_window(stale, closed_at));
            }
        }

        self.open_window = Some(key);
        self.rollup.record(&sample);

        if self.schedule.is_boundary(t) {
            reports.push(self.close_window(key, t));
        } else {
            let summary = Accumulator::single(&sample).summarize(&self.conversion);
            reports.push(Report::fine(t, summary));
        }

        for report in &reports {
            if let Err(e) = self.sink.emit(report) {
                warn!("Dropping {:?} report for {}: {}", report.kind, report.at, e);
            }
        }

        reports
    }

    fn poll(&mut self, t: OffsetDateTime) -> TickSample {
        let rain_pulses = self.rain.get();
        let wind_pulses = self.wind.get();
        let air = self.sampler.sample();

        // Without a usable previous tick, assume one nominal interval
        let elapsed_secs = self
            .last_tick
            .map(|last| (t - last).as_seconds_f64())
            .filter(|secs| *secs > 0.0)
            .unwrap_or_else(|| f64::from(self.tick_interval_secs));
        self.last_tick = Some(t);

        debug!(
            "Polled rain={} wind={} air={:?}",
            rain_pulses, wind_pulses, air
        );

        TickSample {
            air,
            rain_pulses,
            wind_pulses,
            elapsed_secs,
        }
    }

    // Totals are taken before the reset
    fn close_window(&mut self, key: i64, at: OffsetDateTime) -> Report {
        let summary = self.rollup.summarize(&self.conversion);
        self.rollup = Accumulator::new();
        self.open_window = None;
        self.last_closed = Some(key);
        Report::rollup(at, summary)
    }

    /// Ticks recorded in the rollup window that is still open
    pub fn pending_ticks(&self) -> u32 {
        self.rollup.ticks()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}
