pub mod format;
pub mod sink;

use time::OffsetDateTime;

use crate::aggregate::Summary;

pub use format::format_report;
pub use sink::{ConsoleSink, LogSink, ReportSink};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    /// One tick's own reading
    Fine,
    /// Statistics over a whole rollup window
    Rollup,
}

/// A finished report, ready to be rendered
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Report {
    pub kind: ReportKind,
    pub at: OffsetDateTime,
    pub summary: Summary,
}

impl Report {
    pub fn fine(at: OffsetDateTime, summary: Summary) -> Self {
        Report {
            kind: ReportKind::Fine,
            at,
            summary,
        }
    }

    pub fn rollup(at: OffsetDateTime, summary: Summary) -> Self {
        Report {
            kind: ReportKind::Rollup,
            at,
            summary,
        }
    }

    pub fn is_rollup(&self) -> bool {
        self.kind == ReportKind::Rollup
    }
}
