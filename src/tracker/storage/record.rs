use chrono::NaiveDate;
use serde::Deserialize;
use serde::Serialize;

/// The single record kept on disk: how much foreground time was collected on `date`. The stored
/// document looks like `{"date":"2025-03-15","totalMs":1234}`.
///
/// A record is only meaningful on the day it was written. Readers compare `date` against the
/// current day and discard mismatches instead of merging them.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
pub struct DailyFocusRecord {
    #[serde(with = "date_key")]
    pub date: NaiveDate,
    #[serde(rename = "totalMs")]
    pub total_ms: u64,
}

mod date_key {
    use chrono::NaiveDate;
    use serde::{self, Deserialize, Deserializer, Serializer};

    use crate::utils::time::{date_to_storage_key, parse_storage_key};

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date_to_storage_key(*date))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let key = String::deserialize(deserializer)?;
        parse_storage_key(&key).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::DailyFocusRecord;

    fn record() -> DailyFocusRecord {
        DailyFocusRecord {
            date: NaiveDate::from_ymd_opt(2025, 3, 15).unwrap(),
            total_ms: 1234,
        }
    }

    #[test]
    fn serializes_to_the_stored_wire_format() {
        assert_eq!(
            serde_json::to_string(&record()).unwrap(),
            r#"{"date":"2025-03-15","totalMs":1234}"#
        );
    }

    #[test]
    fn deserializes_the_stored_wire_format() {
        let parsed: DailyFocusRecord =
            serde_json::from_str(r#"{"date":"2025-03-15","totalMs":1234}"#).unwrap();
        assert_eq!(parsed, record());
    }

    #[test]
    fn rejects_missing_or_wrong_typed_fields() {
        for raw in [
            r#"{"totalMs":1234}"#,
            r#"{"date":"2025-03-15"}"#,
            r#"{"date":"2025-03-15","totalMs":"1234"}"#,
            r#"{"date":"2025-03-15","totalMs":-5}"#,
            r#"{"date":"15/03/2025","totalMs":1234}"#,
            r#"{"date":20250315,"totalMs":1234}"#,
        ] {
            assert!(
                serde_json::from_str::<DailyFocusRecord>(raw).is_err(),
                "{raw} should not parse"
            );
        }
    }
}
