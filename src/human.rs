//! Compact human-readable formatting for durations and byte counts.

use std::time::Duration;

const NANOS_PER_SEC: u64 = 1_000_000_000;
const NANOS_PER_MIN: u64 = 60 * NANOS_PER_SEC;
const NANOS_PER_HOUR: u64 = 3_600 * NANOS_PER_SEC;

/// Formats a duration compactly: rounds to a precision band chosen by
/// magnitude, then elides trailing zero sub-units, so a value that rounds to
/// a whole number of minutes never prints a trailing "0s".
///
/// Examples: "145ns", "15.2ms", "58.1s", "2m8s", "1h11m", "1012h".
pub fn format_duration(d: Duration) -> String {
    let ns = u64::try_from(d.as_nanos()).unwrap_or(u64::MAX);
    let step = round_step(ns);
    let ns = round_to(ns, step);

    if ns < NANOS_PER_SEC {
        return format_subsecond(ns);
    }

    let secs = ns / NANOS_PER_SEC;
    let frac = ns % NANOS_PER_SEC;
    let hours = secs / 3_600;
    let mins = secs % 3_600 / 60;
    let secs = secs % 60;

    let mut out = String::new();
    if hours > 0 {
        out.push_str(&hours.to_string());
        out.push('h');
    }
    if hours > 0 || mins > 0 {
        out.push_str(&mins.to_string());
        out.push('m');
    }
    out.push_str(&secs.to_string());
    push_fraction(&mut out, frac, 9);
    out.push('s');

    // Rounding to whole minutes (or hours) always lands on zero seconds
    // (and zero minutes), so the literal suffixes are exact.
    if step > NANOS_PER_SEC {
        out.truncate(out.len() - 2); // "0s"
        if step > NANOS_PER_MIN {
            out.truncate(out.len() - 2); // "0m"
        }
    }
    out
}

fn format_subsecond(ns: u64) -> String {
    if ns == 0 {
        return "0s".to_string();
    }
    if ns < 1_000 {
        format!("{}ns", ns)
    } else if ns < 1_000_000 {
        let mut out = (ns / 1_000).to_string();
        push_fraction(&mut out, ns % 1_000, 3);
        out.push_str("µs");
        out
    } else {
        let mut out = (ns / 1_000_000).to_string();
        push_fraction(&mut out, ns % 1_000_000, 6);
        out.push_str("ms");
        out
    }
}

/// Appends ".<frac>" with `digits` places and trailing zeros removed, or
/// nothing when the fraction is zero.
fn push_fraction(out: &mut String, frac: u64, digits: usize) {
    if frac == 0 {
        return;
    }
    let s = format!("{:0width$}", frac, width = digits);
    out.push('.');
    out.push_str(s.trim_end_matches('0'));
}

/// The rounding step for a given magnitude: roughly three significant
/// figures below a second, whole seconds up to an hour, whole minutes up to
/// 1000 hours, whole hours beyond.
fn round_step(ns: u64) -> u64 {
    const US: u64 = 1_000;
    const MS: u64 = 1_000_000;
    match ns {
        n if n < US => 1,
        n if n < 10 * US => 10,
        n if n < 100 * US => 100,
        n if n < MS => US,
        n if n < 10 * MS => 10 * US,
        n if n < 100 * MS => 100 * US,
        n if n < NANOS_PER_SEC => MS,
        n if n < 10 * NANOS_PER_SEC => 10 * MS,
        n if n < NANOS_PER_MIN => 100 * MS,
        n if n < NANOS_PER_HOUR => NANOS_PER_SEC,
        n if n < 1_000 * NANOS_PER_HOUR => NANOS_PER_MIN,
        _ => NANOS_PER_HOUR,
    }
}

/// Rounds to the nearest multiple of `step`, ties away from zero.
fn round_to(ns: u64, step: u64) -> u64 {
    let rem = ns % step;
    if rem * 2 >= step {
        (ns - rem).saturating_add(step)
    } else {
        ns - rem
    }
}

const SIZE_SUFFIXES: [&str; 7] = ["B", "kB", "MB", "GB", "TB", "PB", "EB"];

/// Formats a byte count with base-1000 magnitude suffixes: "512 B",
/// "1.5 MB", "25 MB".
pub fn format_size(bytes: u64) -> String {
    if bytes < 10 {
        return format!("{} B", bytes);
    }
    let e = ((bytes as f64).ln() / 1000f64.ln()).floor() as usize;
    let e = e.min(SIZE_SUFFIXES.len() - 1);
    let val = ((bytes as f64 / 1000f64.powi(e as i32)) * 10.0 + 0.5).floor() / 10.0;
    if val < 10.0 {
        format!("{:.1} {}", val, SIZE_SUFFIXES[e])
    } else {
        format!("{:.0} {}", val, SIZE_SUFFIXES[e])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dur(secs: u64, nanos: u32) -> Duration {
        Duration::new(secs, nanos)
    }

    #[test]
    fn duration_precision_bands() {
        // (input, expected)
        let cases: &[(Duration, &str)] = &[
            (Duration::ZERO, "0s"),
            (Duration::from_nanos(145), "145ns"),
            (Duration::from_nanos(15_000_900), "15ms"),
            (Duration::from_nanos(15_192_000), "15.2ms"),
            (dur(58, 123_400_100), "58.1s"),
            (dur(128, 123_400_100), "2m8s"),
            // 1h10m33.111s rounds up to 1h11m0s, then drops the "0s"
            (dur(4_233, 111_000_000), "1h11m"),
            // 48h33s rounds to 48h1m
            (dur(172_833, 0), "48h1m"),
            // 1011h45m rounds to 1012h
            (dur(3_642_300, 0), "1012h"),
        ];
        for (input, want) in cases {
            assert_eq!(format_duration(*input), *want, "input {:?}", input);
        }
    }

    #[test]
    fn duration_elides_zero_fractions() {
        // Exactly 2 seconds in the sub-10s band must not print "2.00s".
        assert_eq!(format_duration(dur(2, 0)), "2s");
        assert_eq!(format_duration(Duration::from_micros(15)), "15µs");
    }

    #[test]
    fn size_scales_base_1000() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(9), "9 B");
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(999), "999 B");
        assert_eq!(format_size(1_000), "1.0 kB");
        assert_eq!(format_size(9_999), "10 kB");
        assert_eq!(format_size(1_500_000), "1.5 MB");
        assert_eq!(format_size(24_694_784), "25 MB");
        assert_eq!(format_size(3_000_000_000), "3.0 GB");
    }
}
