// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Duration parsing for unit-suffixed duration strings.
//!
//! `K8S_REQUEST_TIMEOUT` is written as a sequence of number+unit pairs
//! (e.g., "10s", "1m30s", "1.5s", "500ms").

use anyhow::{bail, Context, Result};
use std::time::Duration;

const NANOS_PER_MICRO: u128 = 1_000;
const NANOS_PER_MILLI: u128 = 1_000_000;
const NANOS_PER_SECOND: u128 = 1_000_000_000;
const NANOS_PER_MINUTE: u128 = 60 * NANOS_PER_SECOND;
const NANOS_PER_HOUR: u128 = 60 * NANOS_PER_MINUTE;

/// Fractional digits beyond this carry no nanosecond precision.
const MAX_FRACTION_DIGITS: usize = 18;

/// Parse a unit-suffixed duration string into a Rust `Duration`.
///
/// A duration is a sequence of decimal numbers, each with an optional fraction
/// and a unit suffix. Supported units:
/// - `ns`, `us` (or `µs`), `ms`
/// - `s`, `m`, `h`
///
/// The bare string `"0"` is accepted without a unit. Negative durations are
/// rejected since every duration in this crate is a timeout.
///
/// # Examples
///
/// ```
/// use mongo_labeler::duration::parse_duration;
/// use std::time::Duration;
///
/// assert_eq!(parse_duration("7s").unwrap(), Duration::from_secs(7));
/// assert_eq!(parse_duration("1m30s").unwrap(), Duration::from_secs(90));
/// assert_eq!(parse_duration("1.5s").unwrap(), Duration::from_millis(1500));
///
/// assert!(parse_duration("").is_err());
/// assert!(parse_duration("10").is_err());  // Missing unit
/// assert!(parse_duration("10x").is_err()); // Invalid unit
/// ```
///
/// # Errors
///
/// Returns an error if:
/// - The string is empty, negative, or a component is missing its number or unit
/// - A unit is not recognized
/// - The total does not fit in a `Duration` of `u64` nanoseconds
pub fn parse_duration(duration_str: &str) -> Result<Duration> {
    if duration_str.is_empty() {
        bail!("Duration string cannot be empty");
    }

    let mut rest = duration_str;
    if let Some(stripped) = rest.strip_prefix('+') {
        rest = stripped;
    } else if rest.starts_with('-') {
        bail!("Duration '{duration_str}' must not be negative");
    }

    if rest == "0" {
        return Ok(Duration::ZERO);
    }
    if rest.is_empty() {
        bail!("Duration '{duration_str}' has no value");
    }

    let mut total_nanos: u128 = 0;

    while !rest.is_empty() {
        let int_len = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let (int_str, after_int) = rest.split_at(int_len);

        let (frac_str, after_frac) = match after_int.strip_prefix('.') {
            Some(fraction) => {
                let frac_len = fraction
                    .find(|c: char| !c.is_ascii_digit())
                    .unwrap_or(fraction.len());
                fraction.split_at(frac_len)
            }
            None => ("", after_int),
        };

        if int_str.is_empty() && frac_str.is_empty() {
            bail!("Duration '{duration_str}' has a unit without a number");
        }

        let unit_len = after_frac
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(after_frac.len());
        let (unit, remainder) = after_frac.split_at(unit_len);

        if unit.is_empty() {
            bail!("Duration '{duration_str}' is missing a unit (ns, us, ms, s, m, h)");
        }

        let unit_nanos = unit_nanos(unit).with_context(|| {
            format!("Unsupported duration unit '{unit}'. Use ns, us, ms, s, m, or h")
        })?;

        let whole: u128 = if int_str.is_empty() {
            0
        } else {
            int_str
                .parse()
                .context("Duration value too large (overflow)")?
        };

        let mut component = whole
            .checked_mul(unit_nanos)
            .context("Duration value too large (overflow)")?;

        if !frac_str.is_empty() {
            let digits = &frac_str[..frac_str.len().min(MAX_FRACTION_DIGITS)];
            let fraction: u128 = digits
                .parse()
                .context("Duration fraction is not a number")?;
            let scale = 10u128.pow(u32::try_from(digits.len()).unwrap_or(u32::MAX));
            component += fraction * unit_nanos / scale;
        }

        total_nanos = total_nanos
            .checked_add(component)
            .context("Duration value too large (overflow)")?;
        rest = remainder;
    }

    let nanos = u64::try_from(total_nanos).context("Duration value too large (overflow)")?;
    Ok(Duration::from_nanos(nanos))
}

fn unit_nanos(unit: &str) -> Option<u128> {
    match unit {
        "ns" => Some(1),
        // U+00B5 micro sign and U+03BC Greek small letter mu
        "us" | "\u{b5}s" | "\u{3bc}s" => Some(NANOS_PER_MICRO),
        "ms" => Some(NANOS_PER_MILLI),
        "s" => Some(NANOS_PER_SECOND),
        "m" => Some(NANOS_PER_MINUTE),
        "h" => Some(NANOS_PER_HOUR),
        _ => None,
    }
}

#[cfg(test)]
#[path = "duration_tests.rs"]
mod duration_tests;
