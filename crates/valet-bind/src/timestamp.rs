//! Timestamp text parsing.
//!
//! Formats are tried in a fixed order and the first that parses wins:
//!
//! 1. RFC 3339, with or without fractional seconds
//! 2. RFC 822 with a numeric zone (`02 Jan 06 15:04 -0700`)
//! 3. RFC 822 with a zone abbreviation (`02 Jan 06 15:04 MST`)
//! 4. RFC 1123 with a numeric zone (`Mon, 02 Jan 2006 15:04:05 -0700`)
//! 5. RFC 1123 with a zone abbreviation (`Mon, 02 Jan 2006 15:04:05 MST`)
//! 6. Bare date (`2006-01-02`)
//! 7. Date and time with optional fraction (`2006-01-02 15:04:05.123`)
//! 8. Bare time with optional fraction (`15:04:05`), placed on 0000-01-01
//!
//! Zone-less forms are UTC. The RFC 1123 weekday must be a day name but is
//! not checked against the date.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};

const RFC822_NUMERIC: &str = "%d %b %y %H:%M %z";
const RFC822_LOCAL: &str = "%d %b %y %H:%M";
const RFC1123_NUMERIC: &str = "%d %b %Y %H:%M:%S %z";
const RFC1123_LOCAL: &str = "%d %b %Y %H:%M:%S";
const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
const DATE: &str = "%Y-%m-%d";
const DATE_TIME: &str = "%Y-%m-%d %H:%M:%S%.f";
const TIME: &str = "%H:%M:%S%.f";

const SECS_PER_HOUR: i32 = 3600;

/// Parses a timestamp in one of the accepted forms.
///
/// # Errors
///
/// Returns `"unable to parse date/time"` when no form matches.
///
/// # Example
///
/// ```rust
/// use valet_bind::coerce::parse_timestamp;
///
/// let ts = parse_timestamp("2024-03-01T12:00:00+02:00").unwrap();
/// assert_eq!(ts.to_rfc3339(), "2024-03-01T12:00:00+02:00");
///
/// let day = parse_timestamp("2024-03-01").unwrap();
/// assert_eq!(day.to_rfc3339(), "2024-03-01T00:00:00+00:00");
/// ```
pub fn parse_timestamp(text: &str) -> Result<DateTime<FixedOffset>, String> {
    let parsed = DateTime::parse_from_rfc3339(text)
        .ok()
        .or_else(|| DateTime::parse_from_str(text, RFC822_NUMERIC).ok())
        .or_else(|| with_abbreviation(text, RFC822_LOCAL))
        .or_else(|| DateTime::parse_from_str(strip_weekday(text)?, RFC1123_NUMERIC).ok())
        .or_else(|| with_abbreviation(strip_weekday(text)?, RFC1123_LOCAL))
        .or_else(|| {
            NaiveDate::parse_from_str(text, DATE)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(utc)
        })
        .or_else(|| NaiveDateTime::parse_from_str(text, DATE_TIME).ok().map(utc))
        .or_else(|| {
            let time = NaiveTime::parse_from_str(text, TIME).ok()?;
            NaiveDate::from_ymd_opt(0, 1, 1).map(|d| utc(d.and_time(time)))
        });

    parsed.ok_or_else(|| "unable to parse date/time".to_string())
}

fn utc(naive: NaiveDateTime) -> DateTime<FixedOffset> {
    naive.and_utc().fixed_offset()
}

/// Removes a leading `Mon, ` style weekday.
fn strip_weekday(text: &str) -> Option<&str> {
    let (day, rest) = text.split_once(", ")?;
    WEEKDAYS.contains(&day).then_some(rest)
}

/// Parses `text` as `format` followed by a trailing zone abbreviation.
fn with_abbreviation(text: &str, format: &str) -> Option<DateTime<FixedOffset>> {
    let (local, zone) = text.rsplit_once(' ')?;
    let offset = zone_offset(zone)?;
    let naive = NaiveDateTime::parse_from_str(local, format).ok()?;
    naive.and_local_timezone(offset).single()
}

/// Maps a zone abbreviation to its offset. Unknown abbreviations are UTC.
fn zone_offset(zone: &str) -> Option<FixedOffset> {
    if zone.is_empty() || zone.len() > 5 || !zone.bytes().all(|b| b.is_ascii_uppercase()) {
        return None;
    }

    let hours = match zone {
        "EST" | "CDT" => -5,
        "EDT" => -4,
        "CST" | "MDT" => -6,
        "MST" | "PDT" => -7,
        "PST" => -8,
        _ => 0,
    };
    FixedOffset::east_opt(hours * SECS_PER_HOUR)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rfc3339(text: &str) -> String {
        parse_timestamp(text).unwrap().to_rfc3339()
    }

    #[test]
    fn test_rfc3339_forms() {
        assert_eq!(rfc3339("2024-03-01T12:00:00Z"), "2024-03-01T12:00:00+00:00");
        assert_eq!(
            rfc3339("2024-03-01T12:00:00.123456789-05:00"),
            "2024-03-01T12:00:00.123456789-05:00"
        );
    }

    #[test]
    fn test_rfc822_forms() {
        assert_eq!(rfc3339("02 Jan 06 15:04 -0700"), "2006-01-02T15:04:00-07:00");
        assert_eq!(rfc3339("02 Jan 06 15:04 UTC"), "2006-01-02T15:04:00+00:00");
        assert_eq!(rfc3339("02 Jan 06 15:04 PST"), "2006-01-02T15:04:00-08:00");
    }

    #[test]
    fn test_rfc1123_forms() {
        assert_eq!(
            rfc3339("Mon, 02 Jan 2006 15:04:05 +0100"),
            "2006-01-02T15:04:05+01:00"
        );
        assert_eq!(
            rfc3339("Mon, 02 Jan 2006 15:04:05 GMT"),
            "2006-01-02T15:04:05+00:00"
        );
        assert_eq!(
            rfc3339("Mon, 02 Jan 2006 15:04:05 EDT"),
            "2006-01-02T15:04:05-04:00"
        );
    }

    #[test]
    fn test_rfc1123_weekday_not_checked() {
        // 2006-01-02 was a Monday.
        assert_eq!(
            rfc3339("Fri, 02 Jan 2006 15:04:05 +0100"),
            "2006-01-02T15:04:05+01:00"
        );
        assert_eq!(
            rfc3339("Sun, 02 Jan 2006 15:04:05 MST"),
            "2006-01-02T15:04:05-07:00"
        );
        assert!(parse_timestamp("Xyz, 02 Jan 2006 15:04:05 +0100").is_err());
        assert!(parse_timestamp("02 Jan 2006 15:04:05 +0100").is_err());
    }

    #[test]
    fn test_unknown_abbreviation_is_utc() {
        assert_eq!(rfc3339("02 Jan 06 15:04 XYZ"), "2006-01-02T15:04:00+00:00");
    }

    #[test]
    fn test_zone_less_forms() {
        assert_eq!(rfc3339("2024-03-01"), "2024-03-01T00:00:00+00:00");
        assert_eq!(rfc3339("2024-03-01 10:20:30"), "2024-03-01T10:20:30+00:00");
        assert_eq!(
            rfc3339("2024-03-01 10:20:30.25"),
            "2024-03-01T10:20:30.250+00:00"
        );
    }

    #[test]
    fn test_bare_time() {
        let ts = parse_timestamp("10:20:30").unwrap();

        assert_eq!(ts.time(), NaiveTime::from_hms_opt(10, 20, 30).unwrap());
        assert_eq!(ts.date_naive(), NaiveDate::from_ymd_opt(0, 1, 1).unwrap());
    }

    #[test]
    fn test_rejections() {
        for text in ["", "yesterday", "2024-13-01", "24:00:00", "02 Jan 06 15:04 pst"] {
            assert_eq!(
                parse_timestamp(text),
                Err("unable to parse date/time".to_string()),
                "{text}"
            );
        }
    }
}
