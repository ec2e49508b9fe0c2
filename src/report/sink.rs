/// Destinations for rendered reports
use log::info;
use std::io::{self, Write};

use crate::error::ReportError;
use crate::report::{format_report, Report};

/// Receives every report the station produces
pub trait ReportSink {
    fn emit(&mut self, report: &Report) -> Result<(), ReportError>;
}

/// Writes one line per report to a writer, stdout by default
pub struct ConsoleSink<W: Write> {
    out: W,
}

impl ConsoleSink<io::Stdout> {
    pub fn stdout() -> Self {
        ConsoleSink { out: io::stdout() }
    }
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        ConsoleSink { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ReportSink for ConsoleSink<W> {
    fn emit(&mut self, report: &Report) -> Result<(), ReportError> {
        writeln!(self.out, "{}", format_report(report))?;
        self.out.flush()?;
        Ok(())
    }
}

/// Sends report lines through the `log` facade at info level
#[derive(Debug, Default)]
pub struct LogSink;

impl ReportSink for LogSink {
    fn emit(&mut self, report: &Report) -> Result<(), ReportError> {
        info!("{}", format_report(report));
        Ok(())
    }
}

/// Keeps reports in memory
impl ReportSink for Vec<Report> {
    fn emit(&mut self, report: &Report) -> Result<(), ReportError> {
        self.push(*report);
        Ok(())
    }
}

impl<S: ReportSink + ?Sized> ReportSink for Box<S> {
    fn emit(&mut self, report: &Report) -> Result<(), ReportError> {
        (**self).emit(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{Accumulator, TickSample};
    use crate::config::PulseConversion;
    use time::macros::datetime;

    fn report() -> Report {
        let conversion = PulseConversion {
            rain_mm_per_pulse: 0.2794,
            wind_kmh_per_hz: 2.4,
        };
        Report::fine(
            datetime!(2024-05-01 12:00:10 UTC),
            Accumulator::single(&TickSample::default()).summarize(&conversion),
        )
    }

    #[test]
    fn console_sink_writes_one_line_per_report() {
        let mut sink = ConsoleSink::new(Vec::new());
        sink.emit(&report()).unwrap();
        sink.emit(&report()).unwrap();

        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.lines().all(|l| l.starts_with("2024-05-01 12:00:10.000000")));
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_failures_surface_as_report_errors() {
        let mut sink = ConsoleSink::new(Broken);
        assert!(matches!(sink.emit(&report()), Err(ReportError::Io(_))));
    }
}
