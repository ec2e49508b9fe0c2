/// Rollup window boundaries on the local wall clock
use time::{Duration, OffsetDateTime};

/// Splits local time into rollup windows of a fixed number of minutes.
///
/// A window is `(B - P, B]`: the tick landing exactly on boundary `B`
/// belongs to the window that `B` closes. Windows are identified by the
/// boundary that closes them, counted in periods since the local epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollupSchedule {
    period_minutes: u32,
}

impl RollupSchedule {
    /// `period_minutes` is expected to divide 60
    pub fn new(period_minutes: u32) -> Self {
        RollupSchedule {
            period_minutes: period_minutes.max(1),
        }
    }

    pub fn period_minutes(&self) -> u32 {
        self.period_minutes
    }

    fn period_secs(&self) -> i64 {
        i64::from(self.period_minutes) * 60
    }

    /// True when `t` sits exactly on a rollup boundary
    pub fn is_boundary(&self, t: OffsetDateTime) -> bool {
        t.second() == 0 && u32::from(t.minute()) % self.period_minutes == 0
    }

    /// Identifier of the window containing `t`
    pub fn window_key(&self, t: OffsetDateTime) -> i64 {
        let period = self.period_secs();
        let secs = local_seconds(t);
        secs.div_euclid(period) + i64::from(secs.rem_euclid(period) != 0)
    }

    /// The boundary instant closing window `key`, in the offset of `t`
    pub fn closing_instant(&self, key: i64, t: OffsetDateTime) -> OffsetDateTime {
        let shift = key * self.period_secs() - local_seconds(t);
        t + Duration::seconds(shift) - Duration::nanoseconds(i64::from(t.nanosecond()))
    }
}

// Whole seconds of local wall-clock time since the epoch
fn local_seconds(t: OffsetDateTime) -> i64 {
    t.unix_timestamp() + i64::from(t.offset().whole_seconds())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn boundary_needs_zero_seconds_and_period_minute() {
        let schedule = RollupSchedule::new(5);
        assert!(schedule.is_boundary(datetime!(2024-05-01 12:05:00 UTC)));
        assert!(schedule.is_boundary(datetime!(2024-05-01 13:00:00 UTC)));
        assert!(!schedule.is_boundary(datetime!(2024-05-01 12:05:10 UTC)));
        assert!(!schedule.is_boundary(datetime!(2024-05-01 12:06:00 UTC)));
    }

    #[test]
    fn boundary_tick_belongs_to_the_window_it_closes() {
        let schedule = RollupSchedule::new(5);
        let before = schedule.window_key(datetime!(2024-05-01 12:04:50 UTC));
        let on = schedule.window_key(datetime!(2024-05-01 12:05:00 UTC));
        let after = schedule.window_key(datetime!(2024-05-01 12:05:10 UTC));
        assert_eq!(before, on);
        assert_eq!(after, on + 1);
    }

    #[test]
    fn boundary_uses_local_wall_clock() {
        let schedule = RollupSchedule::new(15);
        // 12:15 local at +05:45 is 06:30 UTC
        let t = datetime!(2024-05-01 12:15:00 +05:45);
        assert!(schedule.is_boundary(t));
        assert_eq!(schedule.window_key(t), schedule.window_key(t - Duration::seconds(1)));
        assert_ne!(schedule.window_key(t), schedule.window_key(t + Duration::seconds(1)));
    }

    #[test]
    fn closing_instant_recovers_the_boundary() {
        let schedule = RollupSchedule::new(5);
        let open = schedule.window_key(datetime!(2024-05-01 12:03:30 UTC));
        let late_tick = datetime!(2024-05-01 12:05:20 UTC);
        assert_eq!(
            schedule.closing_instant(open, late_tick),
            datetime!(2024-05-01 12:05:00 UTC)
        );
    }
}
