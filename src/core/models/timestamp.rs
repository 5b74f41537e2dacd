//! ISO-8601 timestamps on the wire.
//!
//! Values are written as RFC 3339 in UTC. Reading also accepts timestamps
//! without an offset, which are taken to be UTC.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Micros, true))
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid ISO-8601 timestamp: {raw}")))
}

pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    raw.parse::<NaiveDateTime>().ok().map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::parse;
    use chrono::{TimeZone, Utc};

    #[test]
    fn accepts_offset_and_naive_forms() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(parse("2024-01-02T03:04:05Z"), Some(expected));
        assert_eq!(parse("2024-01-02T05:04:05+02:00"), Some(expected));
        assert_eq!(parse("2024-01-02T03:04:05"), Some(expected));
        assert!(parse("2024-01-02T03:04:05.250000").is_some());
        assert!(parse("yesterday").is_none());
    }
}
