//! Lenient field encodings found in stored ledgers

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(u64),
    Text(String),
}

/// Day-of-month stored as text (`"15"`), also accepted as a bare number
pub mod due_day {
    use super::*;

    pub fn serialize<S: Serializer>(day: &u8, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(day)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
        let raw = match NumberOrText::deserialize(deserializer)? {
            NumberOrText::Number(n) => n,
            NumberOrText::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| serde::de::Error::custom(format!("due day is not a number: {:?}", s)))?,
        };
        match raw {
            1..=31 => Ok(raw as u8),
            _ => Err(serde::de::Error::custom(format!("due day must be 1-31, got {}", raw))),
        }
    }
}

/// Calendar date written as `YYYY-MM-DD`, also accepting full RFC 3339 timestamps
pub mod flexible_date {
    use super::*;

    pub fn parse(raw: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
    }

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format("%Y-%m-%d"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("unrecognised date: {:?}", raw)))
    }

    /// Same encoding for optional fields
    pub mod option {
        use super::*;

        pub fn serialize<S: Serializer>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error> {
            match date {
                Some(date) => super::serialize(date, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                None => Ok(None),
                Some(raw) if raw.is_empty() => Ok(None),
                Some(raw) => parse(&raw)
                    .map(Some)
                    .ok_or_else(|| serde::de::Error::custom(format!("unrecognised date: {:?}", raw))),
            }
        }
    }
}
