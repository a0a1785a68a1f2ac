/// Utility functions
use chrono::{DateTime, Duration, Locale, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use chrono_tz::{Europe::Paris, Tz};
use phonenumber::{country, Mode};
use url::Url;

/// Mean Earth radius used for great-circle distances
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Offset-less date-time layouts accepted by the general parser
const LOCAL_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Date-times carrying an offset but no seconds, which RFC 3339 rejects
const OFFSET_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M%:z", "%Y-%m-%d %H:%M%:z"];

/// Calculate distance between two coordinates using Haversine formula
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let rlat1 = lat1.to_radians();
    let rlat2 = lat2.to_radians();
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();
    let a = (dlat / 2.0).sin().powi(2) + rlat1.cos() * rlat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Parse an upstream timestamp into the French calendar.
///
/// The general parser runs first (RFC 3339, then offset-less date-times read
/// as Paris wall-clock time). When it fails, a strict ISO-8601 calendar date
/// (`YYYY-MM-DD`) is tried and pinned to local midnight.
pub fn parse_paris_datetime(raw: &str) -> Option<DateTime<Tz>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    parse_general(raw).or_else(|| parse_iso_date(raw))
}

fn parse_general(raw: &str) -> Option<DateTime<Tz>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Paris));
    }
    if let Some(dt) = OFFSET_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(raw, fmt).ok())
    {
        return Some(dt.with_timezone(&Paris));
    }
    LOCAL_DATETIME_FORMATS.iter().find_map(|fmt| {
        NaiveDateTime::parse_from_str(raw, fmt)
            .ok()
            .and_then(|ndt| localize(&ndt))
    })
}

fn parse_iso_date(raw: &str) -> Option<DateTime<Tz>> {
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    localize(&date.and_time(NaiveTime::MIN))
}

/// Pin a wall-clock time to Paris.
///
/// Ambiguous times (autumn overlap) take the earliest instant. Times inside
/// the spring gap do not exist and are moved forward by the gap's length.
fn localize(ndt: &NaiveDateTime) -> Option<DateTime<Tz>> {
    Paris
        .from_local_datetime(ndt)
        .earliest()
        .or_else(|| Paris.from_local_datetime(&(*ndt + Duration::hours(1))).earliest())
}

/// French long date, e.g. `1 juin 2021`
pub fn format_long_day(dt: &DateTime<Tz>) -> String {
    dt.format_localized("%-d %B %Y", Locale::fr_FR).to_string()
}

/// French short time, e.g. `10:00`
pub fn format_short_time(dt: &DateTime<Tz>) -> String {
    dt.format("%H:%M").to_string()
}

/// Parse a booking link, accepting only absolute http(s) URLs with a host
pub fn parse_web_url(raw: &str) -> Option<Url> {
    let url = Url::parse(raw.trim()).ok()?;
    match url.scheme() {
        "http" | "https" => {}
        _ => return None,
    }
    url.host_str().filter(|host| !host.is_empty())?;
    Some(url)
}

/// Build a `tel:` URL from a raw phone string.
///
/// Visual separators are dropped; any other non-digit character rejects the
/// input.
pub fn parse_phone_url(raw: &str) -> Option<Url> {
    let compact = compact_phone(raw)?;
    let url = Url::parse(&format!("tel:{}", compact)).ok()?;
    (url.scheme() == "tel").then_some(url)
}

/// Reformat a phone number to national display form (`01 23 45 67 89`).
///
/// Numbers without a country code are read as French. Overseas departments
/// keep their own grouping (`0262 12 34 56`). Invalid numbers yield `None`.
pub fn format_french_phone(raw: &str) -> Option<String> {
    let number = phonenumber::parse(Some(country::Id::FR), raw.trim()).ok()?;
    if !phonenumber::is_valid(&number) {
        return None;
    }
    Some(number.format().mode(Mode::National).to_string())
}

fn compact_phone(raw: &str) -> Option<String> {
    let mut compact = String::with_capacity(raw.len());
    for ch in raw.trim().chars() {
        match ch {
            '0'..='9' => compact.push(ch),
            '+' if compact.is_empty() => compact.push(ch),
            ' ' | '.' | '-' | '(' | ')' | '/' | '\u{a0}' => {}
            _ => return None,
        }
    }
    if compact.trim_start_matches('+').is_empty() {
        return None;
    }
    Some(compact)
}

/// Department codes are short alphanumerics such as `01`, `2A` or `971`
pub fn is_department_code(code: &str) -> bool {
    (1..=3).contains(&code.len()) && code.chars().all(|c| c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_haversine_km_zero_distance() {
        let distance = haversine_km(0.0, 0.0, 0.0, 0.0);
        assert_eq!(distance, 0.0);
    }

    #[test]
    fn test_haversine_km_paris_lyon() {
        let distance = haversine_km(48.8566, 2.3522, 45.7640, 4.8357);
        assert!((distance - 392.0).abs() < 1.0);
    }

    #[test]
    fn test_parse_general_datetime() {
        let dt = parse_paris_datetime("2021-06-01T10:00:00").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2021, 6, 1));
        assert_eq!((dt.hour(), dt.minute()), (10, 0));
    }

    #[test]
    fn test_parse_rfc3339_converts_to_paris() {
        let dt = parse_paris_datetime("2021-06-01T08:00:00Z").unwrap();
        assert_eq!(dt.hour(), 10);

        let dt = parse_paris_datetime("2021-04-10T08:00:00+02:00").unwrap();
        assert_eq!(dt.hour(), 8);
    }

    #[test]
    fn test_parse_iso_date_fallback() {
        let dt = parse_paris_datetime("2021-06-01").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2021, 6, 1));
        assert_eq!(dt.hour(), 0);
    }

    #[test]
    fn test_parse_invalid_date() {
        assert!(parse_paris_datetime("not-a-date").is_none());
        assert!(parse_paris_datetime("").is_none());
    }

    #[test]
    fn test_french_day_and_time() {
        let dt = parse_paris_datetime("2021-06-01T10:05:00").unwrap();
        assert_eq!(format_long_day(&dt), "1 juin 2021");
        assert_eq!(format_short_time(&dt), "10:05");
    }

    #[test]
    fn test_web_url_validation() {
        assert!(parse_web_url("https://partners.doctolib.fr/centre?pid=123").is_some());
        assert!(parse_web_url("http://example.org").is_some());
        assert!(parse_web_url("ftp://example.org").is_none());
        assert!(parse_web_url("not a url").is_none());
        assert!(parse_web_url("").is_none());
    }

    #[test]
    fn test_phone_url() {
        let url = parse_phone_url("+33 1 23 45 67 89").unwrap();
        assert_eq!(url.as_str(), "tel:+33123456789");
        assert!(parse_phone_url("call me").is_none());
        assert!(parse_phone_url("   ").is_none());
    }

    #[test]
    fn test_parse_offset_without_seconds() {
        let dt = parse_paris_datetime("2021-06-01T10:00+02:00").unwrap();
        assert_eq!((dt.hour(), dt.minute()), (10, 0));

        let dt = parse_paris_datetime("2021-06-01T08:30+00:00").unwrap();
        assert_eq!((dt.hour(), dt.minute()), (10, 30));
    }

    #[test]
    fn test_parse_spring_gap_moves_forward() {
        // 2021-03-28 02:00 -> 03:00 in Paris
        let dt = parse_paris_datetime("2021-03-28T02:30:00").unwrap();
        assert_eq!((dt.day(), dt.hour(), dt.minute()), (28, 3, 30));
        assert_eq!(format_short_time(&dt), "03:30");
    }

    #[test]
    fn test_parse_autumn_overlap_takes_earliest() {
        let dt = parse_paris_datetime("2021-10-31T02:30:00").unwrap();
        assert_eq!(dt.to_rfc3339(), "2021-10-31T02:30:00+02:00");
    }

    #[test]
    fn test_format_french_phone() {
        assert_eq!(
            format_french_phone("0123456789").as_deref(),
            Some("01 23 45 67 89")
        );
        assert_eq!(
            format_french_phone("+33 1 23 45 67 89").as_deref(),
            Some("01 23 45 67 89")
        );
        assert_eq!(
            format_french_phone("06.12.34.56.78").as_deref(),
            Some("06 12 34 56 78")
        );
    }

    #[test]
    fn test_format_overseas_phone() {
        assert_eq!(
            format_french_phone("+262 262 12 34 56").as_deref(),
            Some("0262 12 34 56")
        );
        assert_eq!(
            format_french_phone("+590 590 12 34 56").as_deref(),
            Some("0590 12 34 56")
        );
        assert_eq!(
            format_french_phone("+596596301234").as_deref(),
            Some("0596 30 12 34")
        );
    }

    #[test]
    fn test_format_french_phone_rejects_garbage() {
        assert!(format_french_phone("12345").is_none());
        assert!(format_french_phone("call me").is_none());
        assert!(format_french_phone("").is_none());
    }

    #[test]
    fn test_department_codes() {
        assert!(is_department_code("75"));
        assert!(is_department_code("2A"));
        assert!(is_department_code("971"));
        assert!(!is_department_code("../etc"));
        assert!(!is_department_code(""));
    }
}
