/// Wall-clock capability.
///
/// Tools never read the system time directly; they receive a `Clock` so that
/// tests can pin the instant and assert exact output.

use chrono::{DateTime, FixedOffset, Local, SecondsFormat};

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// Current instant in the server's local offset.
    fn now(&self) -> DateTime<FixedOffset>;

    /// Name of the clock's timezone. Defaults to the offset-derived name.
    fn timezone(&self) -> String {
        timezone_name(&self.now())
    }
}

/// Reads the host's local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().into()
    }

    /// IANA name of the host zone (`Europe/Berlin`), or the offset when the
    /// host does not expose one.
    fn timezone(&self) -> String {
        iana_time_zone::get_timezone().unwrap_or_else(|e| {
            tracing::debug!(error = %e, "host timezone name unavailable");
            timezone_name(&self.now())
        })
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}

/// ISO-8601 rendering with an explicit offset, e.g. `2024-01-01T12:34:56+00:00`.
/// Sub-second digits appear only when the instant has them.
pub fn iso8601(instant: &DateTime<FixedOffset>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::AutoSi, false)
}

/// `YYYY-MM-DD HH:MM:SS` in the instant's own offset.
pub fn readable(instant: &DateTime<FixedOffset>) -> String {
    instant.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Seconds since the Unix epoch, with microsecond precision.
pub fn unix_timestamp(instant: &DateTime<FixedOffset>) -> f64 {
    instant.timestamp() as f64 + f64::from(instant.timestamp_subsec_micros()) / 1_000_000.0
}

/// Name of the instant's timezone: `UTC` for a zero offset, otherwise the
/// offset itself (`+02:00`).
pub fn timezone_name(instant: &DateTime<FixedOffset>) -> String {
    let offset = instant.offset();
    if offset.local_minus_utc() == 0 {
        "UTC".to_string()
    } else {
        offset.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(rfc3339: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(rfc3339).unwrap()
    }

    #[test]
    fn test_fixed_clock_is_stable() {
        let clock = FixedClock(at("2024-01-01T12:34:56+00:00"));
        assert_eq!(clock.now(), clock.now());
    }

    #[test]
    fn test_renderings() {
        let instant = at("2024-01-01T12:34:56+00:00");
        assert_eq!(iso8601(&instant), "2024-01-01T12:34:56+00:00");
        assert_eq!(readable(&instant), "2024-01-01 12:34:56");
        assert_eq!(unix_timestamp(&instant), 1_704_112_496.0);
        assert_eq!(timezone_name(&instant), "UTC");
    }

    #[test]
    fn test_offset_and_fraction() {
        let instant = at("2024-01-01T12:34:56.250+02:00");
        assert_eq!(iso8601(&instant), "2024-01-01T12:34:56.250+02:00");
        assert_eq!(readable(&instant), "2024-01-01 12:34:56");
        assert_eq!(unix_timestamp(&instant), 1_704_105_296.25);
        assert_eq!(timezone_name(&instant), "+02:00");
    }

    #[test]
    fn test_fixed_clock_timezone_follows_offset() {
        assert_eq!(FixedClock(at("2024-01-01T12:34:56+00:00")).timezone(), "UTC");
        assert_eq!(FixedClock(at("2024-01-01T12:34:56-05:00")).timezone(), "-05:00");
    }

    #[test]
    fn test_system_clock_names_a_timezone() {
        assert!(!SystemClock.timezone().is_empty());
    }

    #[test]
    fn test_system_clock_round_trips_through_iso() {
        let now = SystemClock.now();
        let parsed = DateTime::parse_from_rfc3339(&iso8601(&now)).unwrap();
        assert_eq!(parsed, now);
    }
}
