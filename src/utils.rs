/// Timestamp formatting helpers
use time::macros::format_description;
use time::OffsetDateTime;

/// Format a timestamp as `YYYY-MM-DD HH:MM:SS.ffffff`
///
/// Falls back to the default string representation if formatting fails.
pub fn format_datetime_precise(dt: &OffsetDateTime) -> String {
    let format =
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:6]");
    dt.format(format).unwrap_or_else(|_| dt.to_string())
}

/// Format a timestamp as `YYYY-MM-DD HH:MM:SS`
pub fn format_datetime(dt: &OffsetDateTime) -> String {
    let format = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    dt.format(format).unwrap_or_else(|_| dt.to_string())
}

/// Right-align an optional value in `width` columns, `--` when absent
pub fn format_optional<F>(value: Option<f64>, width: usize, render: F) -> String
where
    F: Fn(f64) -> String,
{
    match value {
        Some(v) => format!("{:>width$}", render(v), width = width),
        None => format!("{:>width$}", "--", width = width),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn precise_format_keeps_microseconds() {
        let t = datetime!(2024-05-01 09:03:10.123456789 UTC);
        assert_eq!(format_datetime_precise(&t), "2024-05-01 09:03:10.123456");
        assert_eq!(format_datetime(&t), "2024-05-01 09:03:10");
    }

    #[test]
    fn missing_values_render_as_placeholder() {
        assert_eq!(format_optional(None, 6, |v| format!("{:.2}", v)), "    --");
        assert_eq!(format_optional(Some(3.14159), 6, |v| format!("{:.2}", v)), "  3.14");
    }
}
