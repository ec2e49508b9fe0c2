/// Rollover-safe pulse counting for the rain gauge and anemometer
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crate::error::StationError;

/// Callback run once per physical edge, from the source's own context
pub type EdgeHandler = Box<dyn Fn() + Send + Sync + 'static>;

/// Anything that can report edges of a pulse signal
pub trait PulseSource {
    /// Register `handler` to be called for every edge from now on
    fn on_edge(&mut self, handler: EdgeHandler) -> Result<(), StationError>;
}

/// Counts edges modulo `R` and hands out the delta since the last poll.
///
/// The edge side only ever increments a shared atomic, so it never blocks.
/// The polling side is the sole owner of the snapshot, which is why
/// [`PulseCounter::get`] takes `&mut self`.
#[derive(Debug)]
pub struct PulseCounter {
    count: Arc<AtomicU32>,
    modulus: u32,
    last_snapshot: u32,
}

impl PulseCounter {
    /// Create a counter that is not yet connected to any source.
    ///
    /// A modulus below 2 could never tell one edge from none.
    pub fn new(modulus: u32) -> Result<Self, StationError> {
        if modulus < 2 {
            return Err(StationError::InvalidModulus(modulus));
        }
        Ok(PulseCounter {
            count: Arc::new(AtomicU32::new(0)),
            modulus,
            last_snapshot: 0,
        })
    }

    /// Create a counter and subscribe it to `source`
    pub fn attach<S: PulseSource + ?Sized>(source: &mut S, modulus: u32) -> Result<Self, StationError> {
        let counter = PulseCounter::new(modulus)?;
        source.on_edge(counter.edge_handler())?;
        Ok(counter)
    }

    /// Handler that records one edge; safe to call from any thread
    pub fn edge_handler(&self) -> EdgeHandler {
        let count = Arc::clone(&self.count);
        let modulus = self.modulus;
        Box::new(move || increment(&count, modulus))
    }

    /// Record one edge directly
    pub fn increment(&self) {
        increment(&self.count, self.modulus);
    }

    /// Edges seen since the previous call, then move the snapshot forward.
    ///
    /// The raw count is read once; any edge landing after that read is
    /// picked up by the next call. The difference is taken mod `R`, so a wrap
    /// between two polls still gives the small positive delta.
    pub fn get(&mut self) -> u32 {
        let current = self.count.load(Ordering::Acquire);
        let delta = if current >= self.last_snapshot {
            current - self.last_snapshot
        } else {
            current + (self.modulus - self.last_snapshot)
        };
        self.last_snapshot = current;
        delta
    }
}

fn increment(count: &AtomicU32, modulus: u32) {
    // fetch_update retries on contention, so concurrent edges are never lost.
    // The closure always returns Some, so the update cannot fail.
    let _ = count.fetch_update(Ordering::AcqRel, Ordering::Acquire, |c| Some((c + 1) % modulus));
}

/// A pulse source whose edges are fired by hand
#[derive(Clone, Default)]
pub struct ManualPulseSource {
    handlers: Arc<Mutex<Vec<EdgeHandler>>>,
}

impl ManualPulseSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire a single edge
    pub fn pulse(&self) {
        let handlers = self.handlers.lock().unwrap_or_else(|e| e.into_inner());
        for handler in handlers.iter() {
            handler();
        }
    }

    /// Fire `n` edges
    pub fn pulses(&self, n: u32) {
        for _ in 0..n {
            self.pulse();
        }
    }
}

impl PulseSource for ManualPulseSource {
    fn on_edge(&mut self, handler: EdgeHandler) -> Result<(), StationError> {
        self.handlers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(handler);
        Ok(())
    }
}

/// Fires edges from a background thread with exponentially distributed gaps.
///
/// Stands in for a GPIO interrupt line when running away from the hardware.
pub struct SimulatedPulseSource {
    name: &'static str,
    mean_gap: Duration,
    seed: Option<u64>,
}

impl SimulatedPulseSource {
    pub fn new(name: &'static str, mean_gap: Duration, seed: Option<u64>) -> Self {
        SimulatedPulseSource {
            name,
            mean_gap,
            seed,
        }
    }
}

impl PulseSource for SimulatedPulseSource {
    fn on_edge(&mut self, handler: EdgeHandler) -> Result<(), StationError> {
        let mean_secs = self.mean_gap.as_secs_f64();
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        thread::Builder::new()
            .name(format!("{}-pulses", self.name))
            .spawn(move || loop {
                // Inverse transform sampling of an exponential gap
                let u: f64 = rng.gen_range(f64::EPSILON..1.0);
                let gap = Duration::from_secs_f64(-u.ln() * mean_secs);
                thread::sleep(gap);
                handler();
            })
            .map_err(|e| StationError::PulseSource(format!("{}: {}", self.name, e)))?;

        debug!(
            "Simulated {} pulses started, mean gap {:?}",
            self.name, self.mean_gap
        );
        Ok(())
    }
}
