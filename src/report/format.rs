/// Text rendering of reports
use crate::report::{Report, ReportKind};
use crate::utils::{format_datetime, format_datetime_precise, format_optional};

const ROLLUP_BRACKET: &str = "###";

/// Render a report as a single line.
///
/// Fine reports carry microsecond timestamps. Rollup reports use whole
/// seconds, add their sample counts and are bracketed with `###`.
pub fn format_report(report: &Report) -> String {
    let s = &report.summary;

    let fields = format!(
        "{}°C, {} hPa, {} %RH, {} Ohms, {:7.4} mm, {} km/h",
        format_optional(s.temperature, 6, |v| format!("{:.2}", v)),
        format_optional(s.pressure, 7, |v| format!("{:.2}", v)),
        format_optional(s.humidity, 5, |v| format!("{:.2}", v)),
        format_optional(s.gas_resistance, 6, |v| format!("{:.0}", v)),
        s.rain_mm,
        format_optional(s.wind_kmh, 6, |v| format!("{:.2}", v)),
    );

    match report.kind {
        ReportKind::Fine => format!("{} {}", format_datetime_precise(&report.at), fields),
        ReportKind::Rollup => format!(
            "{bracket} {} {} [{} ticks, {} air, {} gas] {bracket}",
            format_datetime(&report.at),
            fields,
            s.ticks,
            s.air_samples,
            s.gas_samples,
            bracket = ROLLUP_BRACKET
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{Accumulator, TickSample};
    use crate::config::PulseConversion;
    use crate::models::AirReading;
    use time::macros::datetime;

    const CONVERSION: PulseConversion = PulseConversion {
        rain_mm_per_pulse: 0.2794,
        wind_kmh_per_hz: 2.4,
    };

    #[test]
    fn fine_line_matches_field_layout() {
        let sample = TickSample {
            air: Some(AirReading {
                temperature: 21.0,
                pressure: 1001.0,
                humidity: 51.0,
                gas_resistance: Some(5000.4),
            }),
            rain_pulses: 1,
            wind_pulses: 0,
            elapsed_secs: 10.0,
        };
        let report = Report::fine(
            datetime!(2024-05-01 12:00:10 UTC),
            Accumulator::single(&sample).summarize(&CONVERSION),
        );

        assert_eq!(
            format_report(&report),
            "2024-05-01 12:00:10.000000  21.00°C, 1001.00 hPa, 51.00 %RH,   5000 Ohms,  0.2794 mm,   0.00 km/h"
        );
    }

    #[test]
    fn unstable_gas_and_missing_air_show_placeholders() {
        let report = Report::fine(
            datetime!(2024-05-01 12:00:20 UTC),
            Accumulator::single(&TickSample {
                elapsed_secs: 10.0,
                ..TickSample::default()
            })
            .summarize(&CONVERSION),
        );

        assert_eq!(
            format_report(&report),
            "2024-05-01 12:00:20.000000     --°C,      -- hPa,    -- %RH,     -- Ohms,  0.0000 mm,   0.00 km/h"
        );
    }

    #[test]
    fn rollup_line_is_bracketed_with_counts() {
        let mut acc = Accumulator::new();
        acc.record(&TickSample {
            air: Some(AirReading {
                temperature: 20.0,
                pressure: 1000.0,
                humidity: 50.0,
                gas_resistance: None,
            }),
            rain_pulses: 0,
            wind_pulses: 3,
            elapsed_secs: 10.0,
        });
        let report = Report::rollup(
            datetime!(2024-05-01 12:05:00.5 UTC),
            acc.summarize(&CONVERSION),
        );

        let line = format_report(&report);
        assert!(line.starts_with("### 2024-05-01 12:05:00  20.00°C"));
        assert!(line.contains("    -- Ohms"));
        assert!(line.contains("0.72 km/h"));
        assert!(line.ends_with("[1 ticks, 1 air, 0 gas] ###"));
    }
}
