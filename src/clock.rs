/// Wall-clock alignment of ticks
use std::time::Duration;
use time::{OffsetDateTime, UtcOffset};
use tokio::time::sleep;

/// Source of the current wall-clock time
pub trait Clock {
    fn now(&self) -> OffsetDateTime;
}

/// System time shifted into a fixed local offset.
///
/// The offset has to be resolved while the process is still single-threaded,
/// see [`SystemClock::local`].
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    offset: UtcOffset,
}

impl SystemClock {
    /// Capture the local UTC offset, falling back to UTC when it cannot be
    /// determined.
    pub fn local() -> Self {
        SystemClock {
            offset: UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC),
        }
    }

    pub fn offset(&self) -> UtcOffset {
        self.offset
    }
}

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc().to_offset(self.offset)
    }
}

/// Delay until the next instant whose second is a multiple of
/// `interval_secs` and whose sub-second part is zero, with that instant.
///
/// The delay is always in `[0, interval_secs)`: when `now` already sits on a
/// boundary the delay is zero rather than a whole extra interval.
pub fn next_boundary(now: OffsetDateTime, interval_secs: u32) -> (Duration, OffsetDateTime) {
    let interval = i64::from(interval_secs.max(1));
    let rem = i64::from(now.second()) % interval;
    let nanos = now.nanosecond();

    if rem == 0 && nanos == 0 {
        return (Duration::ZERO, now);
    }

    let whole_second = now - time::Duration::nanoseconds(i64::from(nanos));
    let boundary = whole_second + time::Duration::seconds(interval - rem);
    ((boundary - now).unsigned_abs(), boundary)
}

/// Sleeps until the next aligned tick boundary
pub struct ClockAligner<C> {
    clock: C,
    interval_secs: u32,
    last: Option<OffsetDateTime>,
}

impl<C: Clock> ClockAligner<C> {
    pub fn new(clock: C, interval_secs: u32) -> Self {
        ClockAligner {
            clock,
            interval_secs,
            last: None,
        }
    }

    pub fn now(&self) -> OffsetDateTime {
        self.clock.now()
    }

    /// Wait for the next boundary and return its nominal instant.
    ///
    /// The returned time is computed, not re-read after waking, so
    /// consecutive ticks are exactly one interval apart. The delay itself is
    /// recomputed from the clock on every call, so a late tick does not push
    /// the following ones later. A boundary is never handed out twice, even
    /// if the previous tick finished before the clock moved past it.
    pub async fn wait(&mut self) -> OffsetDateTime {
        let now = self.clock.now();
        let (mut delay, mut boundary) = next_boundary(now, self.interval_secs);

        if self.last == Some(boundary) {
            boundary += time::Duration::seconds(i64::from(self.interval_secs));
            delay = (boundary - now).unsigned_abs();
        }

        sleep(delay).await;
        self.last = Some(boundary);
        boundary
    }
}
