//! Serde codec for timestamp fields.
//!
//! Persisted snapshots written by older clients store dates either as ISO-8601
//! strings or as epoch milliseconds. Only fields annotated with this module are
//! decoded as dates, so free-form strings elsewhere are never reinterpreted.

use chrono::{DateTime, Duration, SecondsFormat, TimeZone, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Millis(i64),
    Fractional(f64),
    Text(String),
}

impl RawTimestamp {
    fn into_datetime(self) -> Result<DateTime<Utc>, String> {
        match self {
            RawTimestamp::Millis(ms) => from_millis(ms),
            RawTimestamp::Fractional(ms) => from_millis(ms.round() as i64),
            RawTimestamp::Text(raw) => DateTime::parse_from_rfc3339(raw.trim())
                .map(|value| value.with_timezone(&Utc))
                .map_err(|e| format!("invalid timestamp '{}': {}", raw, e)),
        }
    }
}

fn from_millis(ms: i64) -> Result<DateTime<Utc>, String> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .ok_or_else(|| format!("timestamp out of range: {}", ms))
}

fn format(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format(value))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    RawTimestamp::deserialize(deserializer)?
        .into_datetime()
        .map_err(D::Error::custom)
}

pub mod option {
    use super::{format, RawTimestamp};
    use chrono::{DateTime, Utc};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(value) => serializer.serialize_some(&format(value)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<RawTimestamp>::deserialize(deserializer)?
            .map(RawTimestamp::into_datetime)
            .transpose()
            .map_err(D::Error::custom)
    }
}

/// Returns "now", nudged forward when the clock has not moved past `previous`.
pub fn advance(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::milliseconds(1)
    }
}

#[cfg(test)]
mod tests {
    use super::advance;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize)]
    struct Stamped {
        #[serde(with = "super")]
        at: DateTime<Utc>,
        #[serde(default, with = "super::option")]
        seen: Option<DateTime<Utc>>,
        label: String,
    }

    #[test]
    fn decodes_iso_strings_and_epoch_millis() {
        let parsed: Stamped = serde_json::from_str(
            r#"{"at":"2024-03-01T09:30:00.000Z","seen":1709285400000,"label":"2024-03-01T09:30:00.000Z"}"#,
        )
        .expect("decode stamped");

        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        assert_eq!(parsed.at, expected);
        assert_eq!(parsed.seen, Some(expected));
        assert_eq!(parsed.label, "2024-03-01T09:30:00.000Z");
    }

    #[test]
    fn missing_optional_timestamp_is_none() {
        let parsed: Stamped =
            serde_json::from_str(r#"{"at":"2024-03-01T09:30:00+09:00","label":"x"}"#)
                .expect("decode stamped");
        assert!(parsed.seen.is_none());
        assert_eq!(
            parsed.at,
            Utc.with_ymd_and_hms(2024, 3, 1, 0, 30, 0).unwrap()
        );
    }

    #[test]
    fn rejects_garbage_text() {
        let result = serde_json::from_str::<Stamped>(r#"{"at":"yesterday","label":"x"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn full_precision_survives_roundtrip() {
        let original = Stamped {
            at: Utc::now(),
            seen: None,
            label: String::new(),
        };
        let raw = serde_json::to_string(&original).expect("encode");
        let decoded: Stamped = serde_json::from_str(&raw).expect("decode");
        assert_eq!(decoded.at, original.at);
    }

    #[test]
    fn advance_is_strictly_increasing() {
        let future = Utc::now() + Duration::seconds(30);
        assert!(advance(future) > future);
        let past = Utc::now() - Duration::seconds(30);
        assert!(advance(past) > past);
    }
}
