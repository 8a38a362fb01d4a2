use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Parse the timestamp shapes the backend produces.
///
/// Accepts RFC 3339, naive ISO-8601 (read as UTC), plain dates and epoch
/// milliseconds. Returns `None` for anything else.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| Utc.from_utc_datetime(&naive));
    }

    if raw.chars().all(|c| c.is_ascii_digit()) {
        return raw.parse::<i64>().ok().and_then(DateTime::from_timestamp_millis);
    }

    None
}

/// Calendar date of a chart label (`YYYY-MM-DD` or any timestamp shape above)
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .ok()
        .or_else(|| parse_timestamp(raw).map(|ts| ts.date_naive()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_shapes() {
        let expected = Utc.with_ymd_and_hms(2025, 1, 5, 10, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2025-01-05T10:30:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2025-01-05T12:30:00+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2025-01-05T10:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2025-01-05T10:30:00.000000"), Some(expected));
        assert_eq!(parse_timestamp("2025-01-05 10:30:00"), Some(expected));
        assert_eq!(parse_timestamp(&expected.timestamp_millis().to_string()), Some(expected));
    }

    #[test]
    fn test_unparseable() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_date("not-a-date"), None);
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2025-03-01"), NaiveDate::from_ymd_opt(2025, 3, 1));
        assert_eq!(parse_date("2025-03-01T23:59:00Z"), NaiveDate::from_ymd_opt(2025, 3, 1));
    }
}
