//! Textual wire formats of the non-JSON-native primitives.
//!
//! - Guid: hyphenated hex, `3fa85f64-5717-4562-b3fc-2c963f66afa6`.
//! - DateTime: RFC 3339 / ISO-8601; a value without offset is taken as UTC.
//! - TimeSpan: ISO-8601 duration, `[-]P[nW][nD][T[nH][nM][n[.f]S]]`.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeDelta, Utc};
use uuid::Uuid;

const GUID_LEN: usize = 36;

pub fn parse_guid(s: &str) -> Option<Uuid> {
    if s.len() != GUID_LEN {
        return None;
    }
    Uuid::try_parse(s).ok()
}

pub fn format_guid(value: &Uuid) -> String {
    value.hyphenated().to_string()
}

pub fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

pub fn format_datetime(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

const SECS_PER_MINUTE: i64 = 60;
const SECS_PER_HOUR: i64 = 60 * SECS_PER_MINUTE;
const SECS_PER_DAY: i64 = 24 * SECS_PER_HOUR;
const SECS_PER_WEEK: i64 = 7 * SECS_PER_DAY;

pub fn parse_timespan(s: &str) -> Option<TimeDelta> {
    let (negative, rest) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let rest = rest.strip_prefix('P')?;
    let (date, time) = match rest.split_once('T') {
        Some((date, time)) => {
            if time.is_empty() {
                return None;
            }
            (date, Some(time))
        }
        None => (rest, None),
    };
    if date.is_empty() && time.is_none() {
        return None;
    }

    let mut secs: i64 = 0;
    let mut nanos: u32 = 0;
    parse_components(date, &[('W', SECS_PER_WEEK), ('D', SECS_PER_DAY)], &mut secs, &mut nanos)?;
    if let Some(time) = time {
        parse_components(
            time,
            &[('H', SECS_PER_HOUR), ('M', SECS_PER_MINUTE), ('S', 1)],
            &mut secs,
            &mut nanos,
        )?;
    }

    let delta = TimeDelta::new(secs, nanos)?;
    Some(if negative { -delta } else { delta })
}

/// Accumulates `<number><designator>` runs. Designators must appear in the
/// order given by `units`, each at most once; only seconds take a fraction.
fn parse_components(
    mut s: &str,
    units: &[(char, i64)],
    secs: &mut i64,
    nanos: &mut u32,
) -> Option<()> {
    let mut next_unit = 0;
    while !s.is_empty() {
        let end = s.find(|c: char| !(c.is_ascii_digit() || c == '.'))?;
        let (number, tail) = s.split_at(end);
        let designator = tail.chars().next()?;
        s = &tail[designator.len_utf8()..];

        let offset = units[next_unit..].iter().position(|(d, _)| *d == designator)?;
        let (_, unit) = units[next_unit + offset];
        next_unit += offset + 1;

        let (whole, fraction) = match number.split_once('.') {
            Some((whole, fraction)) => (whole, Some(fraction)),
            None => (number, None),
        };
        if whole.is_empty() {
            return None;
        }
        let whole: i64 = whole.parse().ok()?;
        *secs = secs.checked_add(whole.checked_mul(unit)?)?;

        if let Some(fraction) = fraction {
            if unit != 1 || fraction.is_empty() || !fraction.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            let digits = &fraction[..fraction.len().min(9)];
            let scale = 10u32.pow(9 - digits.len() as u32);
            *nanos = digits.parse::<u32>().ok()? * scale;
        }
    }
    Some(())
}

pub fn format_timespan(value: &TimeDelta) -> String {
    let negative = *value < TimeDelta::zero();
    let abs = value.abs();
    let total = abs.num_seconds();
    let nanos = abs.subsec_nanos();

    let days = total / SECS_PER_DAY;
    let hours = (total % SECS_PER_DAY) / SECS_PER_HOUR;
    let minutes = (total % SECS_PER_HOUR) / SECS_PER_MINUTE;
    let seconds = total % SECS_PER_MINUTE;

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push('P');
    if days > 0 {
        out.push_str(&format!("{days}D"));
    }
    if hours == 0 && minutes == 0 && seconds == 0 && nanos == 0 {
        if days == 0 {
            out.push_str("T0S");
        }
        return out;
    }
    out.push('T');
    if hours > 0 {
        out.push_str(&format!("{hours}H"));
    }
    if minutes > 0 {
        out.push_str(&format!("{minutes}M"));
    }
    if seconds > 0 || nanos > 0 {
        if nanos > 0 {
            let fraction = format!("{nanos:09}");
            out.push_str(&format!("{seconds}.{}S", fraction.trim_end_matches('0')));
        } else {
            out.push_str(&format!("{seconds}S"));
        }
    }
    out
}
