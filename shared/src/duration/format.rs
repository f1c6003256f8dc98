//! Human-scaled duration display.

use chrono::Duration;

/// Formats a duration as a compact human-scaled string.
///
/// The largest non-zero unit prints first, paired with the next-smaller unit
/// at one decimal place: `"2h 15.0m"`, `"20m 30.0s"`, `"45.0 s"`,
/// `"200.0 ms"`, `"95.8 µs"`, `"560 ns"`. A zero duration prints as `"-"`
/// and negative durations prefix `-` to the formatted absolute value.
///
/// # Examples
///
/// ```
/// use shared::duration::format_duration;
/// use chrono::Duration;
///
/// assert_eq!(format_duration(Duration::minutes(90)), "1h 30.0m");
/// assert_eq!(format_duration(Duration::seconds(45)), "45.0 s");
/// assert_eq!(format_duration(Duration::zero()), "-");
/// ```
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    if duration < Duration::zero() {
        return format!("-{}", format_positive(duration.abs()));
    }
    format_positive(duration)
}

#[allow(clippy::cast_precision_loss)]
fn format_positive(duration: Duration) -> String {
    if duration.is_zero() {
        return "-".to_string();
    }

    let total_seconds = duration.num_seconds() as f64 + f64::from(duration.subsec_nanos()) / 1e9;

    // Unit selection uses truncated whole units, so a value under one hour
    // can never print through the hours arm.
    let hours = duration.num_hours();
    if hours > 0 {
        let minutes = total_seconds / 60.0 - (hours * 60) as f64;
        return format!("{hours}h {minutes:.1}m");
    }

    let minutes = duration.num_minutes();
    if minutes > 0 {
        let seconds = total_seconds - (minutes * 60) as f64;
        return format!("{minutes}m {seconds:.1}s");
    }

    if duration.num_seconds() > 0 {
        return format!("{total_seconds:.1} s");
    }

    let nanos = i64::from(duration.subsec_nanos());
    if nanos >= 1_000_000 {
        return format!("{:.1} ms", nanos as f64 / 1e6);
    }
    if nanos >= 1_000 {
        return format!("{:.1} \u{b5}s", nanos as f64 / 1e3);
    }

    // Nanoseconds never carry a fractional part.
    format!("{nanos} ns")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_seconds_f64(seconds: f64) -> Duration {
        #[allow(clippy::cast_possible_truncation)]
        Duration::nanoseconds((seconds * 1_000_000_000.0).round() as i64)
    }

    #[test]
    fn test_format_zero() {
        assert_eq!(format_duration(Duration::zero()), "-");
    }

    #[test]
    fn test_format_seconds() {
        assert_eq!(format_duration(Duration::seconds(1)), "1.0 s");
        assert_eq!(format_duration(Duration::seconds(45)), "45.0 s");
        assert_eq!(format_duration(from_seconds_f64(1.2)), "1.2 s");
        assert_eq!(format_duration(from_seconds_f64(10.923)), "10.9 s");
        assert_eq!(format_duration(from_seconds_f64(5.46)), "5.5 s");
    }

    #[test]
    fn test_format_milliseconds() {
        assert_eq!(format_duration(Duration::milliseconds(50)), "50.0 ms");
        assert_eq!(format_duration(Duration::milliseconds(200)), "200.0 ms");
        assert_eq!(format_duration(Duration::milliseconds(400)), "400.0 ms");
        assert_eq!(format_duration(Duration::milliseconds(440)), "440.0 ms");
        assert_eq!(format_duration(from_seconds_f64(0.100_98)), "101.0 ms");
        assert_eq!(format_duration(from_seconds_f64(0.0042)), "4.2 ms");
    }

    #[test]
    fn test_format_microseconds() {
        assert_eq!(format_duration(Duration::microseconds(2)), "2.0 \u{b5}s");
        assert_eq!(format_duration(Duration::nanoseconds(95_800)), "95.8 \u{b5}s");
        assert_eq!(format_duration(Duration::microseconds(901)), "901.0 \u{b5}s");
    }

    #[test]
    fn test_format_nanoseconds() {
        assert_eq!(format_duration(Duration::nanoseconds(50)), "50 ns");
        assert_eq!(format_duration(Duration::nanoseconds(560)), "560 ns");
    }

    #[test]
    fn test_format_minutes() {
        assert_eq!(format_duration(Duration::minutes(1)), "1m 0.0s");
        assert_eq!(
            format_duration(Duration::minutes(20) + Duration::seconds(30)),
            "20m 30.0s"
        );
        assert_eq!(
            format_duration(Duration::minutes(3) + from_seconds_f64(2.86)),
            "3m 2.9s"
        );
    }

    #[test]
    fn test_format_hours() {
        assert_eq!(format_duration(Duration::hours(1)), "1h 0.0m");
        assert_eq!(
            format_duration(Duration::hours(2) + Duration::minutes(15)),
            "2h 15.0m"
        );
        assert_eq!(format_duration(Duration::minutes(90)), "1h 30.0m");
        assert_eq!(
            format_duration(Duration::hours(1) + from_seconds_f64(30.5 * 60.0)),
            "1h 30.5m"
        );
        assert_eq!(
            format_duration(Duration::hours(10) + from_seconds_f64(10.44 * 60.0)),
            "10h 10.4m"
        );
    }

    #[test]
    fn test_format_negative_prefixes_sign() {
        assert_eq!(format_duration(Duration::seconds(-45)), "-45.0 s");
        assert_eq!(format_duration(-Duration::minutes(90)), "-1h 30.0m");
        assert_eq!(format_duration(Duration::nanoseconds(-560)), "-560 ns");
    }
}
