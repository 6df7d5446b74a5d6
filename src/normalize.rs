//! Conversion between the document-native timestamp encoding and plain
//! datetime strings. Documents at rest carry `{"seconds": .., "nanos": ..}`
//! objects wherever a timestamp lives; everything leaving the store goes
//! through [`timestamps_to_dates`] before deserialization.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Value, json};

/// Encodes a datetime in the form the document store keeps at rest.
pub fn wire_timestamp(at: DateTime<Utc>) -> Value {
    json!({
        "seconds": at.timestamp(),
        "nanos": at.timestamp_subsec_nanos(),
    })
}

fn as_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    let map = value.as_object()?;
    if map.len() != 2 {
        return None;
    }
    let seconds = map.get("seconds")?.as_i64()?;
    let nanos = u32::try_from(map.get("nanos")?.as_u64()?).ok()?;
    DateTime::from_timestamp(seconds, nanos)
}

/// Recursively replaces every native timestamp value in `value` with an
/// RFC 3339 string, leaving shape and all other scalars untouched. A
/// timestamp object is a base case; the walk never descends into one.
/// Total over well-formed JSON and idempotent, since the replacement string
/// no longer matches the timestamp shape.
pub fn timestamps_to_dates(value: Value) -> Value {
    if let Some(at) = as_timestamp(&value) {
        return Value::String(at.to_rfc3339_opts(SecondsFormat::AutoSi, true));
    }

    match value {
        Value::Array(items) => Value::Array(items.into_iter().map(timestamps_to_dates).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, nested)| (key, timestamps_to_dates(nested)))
                .collect(),
        ),
        scalar => scalar,
    }
}

#[cfg(test)]
mod normalize_tests {
    use chrono::TimeZone;

    use super::*;

    fn ts() -> Value {
        wire_timestamp(Utc.with_ymd_and_hms(2026, 8, 10, 12, 30, 0).unwrap())
    }

    #[test]
    fn scalars_pass_through() {
        assert_eq!(timestamps_to_dates(json!(42)), json!(42));
        assert_eq!(timestamps_to_dates(json!("hello")), json!("hello"));
        assert_eq!(timestamps_to_dates(Value::Null), Value::Null);
    }

    #[test]
    fn timestamps_become_rfc3339_strings() {
        let converted = timestamps_to_dates(ts());
        assert_eq!(converted, json!("2026-08-10T12:30:00Z"));
    }

    #[test]
    fn nested_structures_are_rewritten_in_place() {
        let doc = json!({
            "title": "hello",
            "createdAt": ts(),
            "answers": [
                { "createdAt": ts(), "score": 3 },
                { "createdAt": ts(), "votes": { "user-1": "up" } },
            ],
        });

        let converted = timestamps_to_dates(doc);

        assert_eq!(converted["title"], json!("hello"));
        assert_eq!(converted["createdAt"], json!("2026-08-10T12:30:00Z"));
        assert_eq!(converted["answers"][0]["score"], json!(3));
        assert_eq!(
            converted["answers"][1]["createdAt"],
            json!("2026-08-10T12:30:00Z")
        );
        assert_eq!(converted["answers"][1]["votes"]["user-1"], json!("up"));
    }

    #[test]
    fn objects_that_merely_resemble_timestamps_survive() {
        // an extra field means this is not the native encoding
        let doc = json!({ "seconds": 5, "nanos": 0, "label": "duration" });
        assert_eq!(timestamps_to_dates(doc.clone()), doc);
    }

    #[test]
    fn conversion_is_idempotent() {
        let doc = json!({
            "createdAt": ts(),
            "nested": [{ "createdAt": ts() }],
            "plain": "2026-08-10",
        });

        let once = timestamps_to_dates(doc);
        let twice = timestamps_to_dates(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn roundtrips_through_chrono() {
        let at = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let converted = timestamps_to_dates(wire_timestamp(at));
        let parsed: DateTime<Utc> = serde_json::from_value(converted).unwrap();
        assert_eq!(parsed, at);
    }
}
