//! Post date parsing
//!
//! Every accepted spelling is normalised to a `DateTime<FixedOffset>`.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone};
use chrono_tz::Tz;

use crate::error::{Error, Result};

const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

/// Parse a front-matter date.
///
/// Timestamps without an offset are interpreted in `tz`.
pub fn parse_date(s: &str, tz: Tz) -> Result<DateTime<FixedOffset>> {
    let s = s.trim();
    if s.is_empty() {
        return Err(Error::MissingRequiredField("date"));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt);
    }

    // `2024-01-31 14:09:07 UTC+05:30`, `2024-01-31 14:09:07 UTC`
    if let Some(pos) = s.rfind("UTC") {
        let naive = parse_naive(s[..pos].trim()).ok_or_else(|| invalid(s))?;
        let offset = parse_offset(s[pos + 3..].trim()).ok_or_else(|| invalid(s))?;
        return offset
            .from_local_datetime(&naive)
            .single()
            .ok_or_else(|| invalid(s));
    }

    // `2024-01-31 14:09:07 +05:30`
    if let Some((head, tail)) = s.rsplit_once(' ') {
        if tail.starts_with(['+', '-']) {
            if let (Some(naive), Some(offset)) = (parse_naive(head), parse_offset(tail)) {
                return offset
                    .from_local_datetime(&naive)
                    .single()
                    .ok_or_else(|| invalid(s));
            }
        }
    }

    let naive = parse_naive(s).ok_or_else(|| invalid(s))?;
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.fixed_offset())
        .ok_or_else(|| invalid(s))
}

fn parse_naive(s: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Parse `+05:30`, `-0800`, `+5` or the empty string (UTC)
fn parse_offset(s: &str) -> Option<FixedOffset> {
    if s.is_empty() {
        return FixedOffset::east_opt(0);
    }
    let (sign, rest) = match s.as_bytes()[0] {
        b'+' => (1, &s[1..]),
        b'-' => (-1, &s[1..]),
        _ => return None,
    };
    if rest.is_empty() || !rest.bytes().all(|b| b.is_ascii_digit() || b == b':') {
        return None;
    }
    let (hours, minutes) = match rest.split_once(':') {
        Some((h, m)) => (h, m),
        None if rest.len() == 4 => rest.split_at(2),
        None => (rest, "0"),
    };
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

fn invalid(s: &str) -> Error {
    Error::InvalidDate(s.to_string())
}
