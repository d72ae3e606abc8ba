// ISO 8601 duration parsing (designator form, e.g. "P2W2D", "P1DT1M").

use crate::errors::AppError;

const SECS_PER_MINUTE: f64 = 60.0;
const SECS_PER_HOUR: f64 = 3_600.0;
const SECS_PER_DAY: f64 = 86_400.0;
const SECS_PER_WEEK: f64 = 604_800.0;

/// Parses an ISO 8601 duration string into seconds.
///
/// Supports weeks, days, hours, minutes and seconds, with additive
/// combinations and fractional values ('.' or ','). Calendar years and
/// months are rejected: they have no fixed length in seconds.
pub fn parse_duration(input: &str) -> Result<f64, AppError> {
    let invalid = || AppError::InvalidDuration(input.to_string());

    let rest = input.strip_prefix('P').ok_or_else(invalid)?;
    let (date_part, time_part) = match rest.split_once('T') {
        Some((date, time)) => (date, Some(time)),
        None => (rest, None),
    };
    // "PT" with nothing after the designator is not a duration
    if time_part == Some("") {
        return Err(invalid());
    }

    let mut components = 0usize;
    let mut total = parse_segments(
        date_part,
        &[('W', SECS_PER_WEEK), ('D', SECS_PER_DAY)],
        &mut components,
    )
    .ok_or_else(invalid)?;
    if let Some(time) = time_part {
        total += parse_segments(
            time,
            &[
                ('H', SECS_PER_HOUR),
                ('M', SECS_PER_MINUTE),
                ('S', 1.0),
            ],
            &mut components,
        )
        .ok_or_else(invalid)?;
    }

    if components == 0 {
        return Err(invalid());
    }
    Ok(total)
}

/// Whole-second offset for timestamp shifting (fraction truncated).
pub fn parse_offset_secs(input: &str) -> Result<i64, AppError> {
    Ok(parse_duration(input)? as i64)
}

/// Parses "<number><designator>" segments against an ordered designator
/// table. Designators must appear in table order, at most once each.
fn parse_segments(part: &str, designators: &[(char, f64)], components: &mut usize) -> Option<f64> {
    let mut total = 0.0;
    let mut next_designator = 0usize;
    let mut number = String::new();

    for c in part.chars() {
        if c.is_ascii_digit() || c == '.' || c == ',' {
            number.push(if c == ',' { '.' } else { c });
        } else {
            let offset = designators[next_designator..]
                .iter()
                .position(|(d, _)| *d == c)?;
            if number.is_empty() {
                return None;
            }
            let value: f64 = number.parse().ok()?;
            total += value * designators[next_designator + offset].1;
            next_designator += offset + 1;
            *components += 1;
            number.clear();
        }
    }

    // trailing digits without a designator
    if !number.is_empty() {
        return None;
    }
    Some(total)
}
