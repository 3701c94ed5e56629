//! CDR field adapter.
//!
//! Field names in the CDR feed are not stable across upstream API revisions:
//! the same logical field shows up as `"Duration"` or `"duration"`,
//! `"Call type"` or `"callType"`, depending on which revision served the
//! request. Every logical-field access goes through an ordered candidate-key
//! probe so a future rename touches this module only.

use serde_json::{Map, Value};

/// One call's worth of upstream metadata, keys as delivered.
pub type CdrRecord = Map<String, Value>;

pub const DURATION_KEYS: &[&str] = &["Duration", "duration", "durationSeconds"];
pub const CALL_TYPE_KEYS: &[&str] = &["Call type", "callType", "Call Type", "type"];
pub const DIRECTION_KEYS: &[&str] = &["Direction", "direction"];
pub const CALLING_LINE_KEYS: &[&str] = &["Calling line ID", "callingLineId"];
pub const CALLED_LINE_KEYS: &[&str] = &["Called line ID", "calledLineId"];
pub const STATUS_KEYS: &[&str] = &["status", "callStatus", "Answered", "result"];
pub const FROM_KEYS: &[&str] = &["from", "fromNumber", "caller"];
pub const TO_KEYS: &[&str] = &["to", "toNumber", "called"];
pub const PERSON_ID_KEYS: &[&str] = &["personId", "Person ID", "userId", "User UUID"];

/// Keys under which some revisions wrap the record list.
const WRAPPER_KEYS: &[&str] = &["items", "data", "calls", "cdr"];

/// First value present under any of the candidate keys.
pub fn probe<'a>(record: &'a CdrRecord, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| record.get(*k))
}

pub fn probe_str<'a>(record: &'a CdrRecord, keys: &[&str]) -> Option<&'a str> {
    probe(record, keys).and_then(Value::as_str)
}

/// Duration in seconds; numeric or stringified-numeric upstream values both
/// occur in the wild.
pub fn probe_duration(record: &CdrRecord) -> Option<i64> {
    match probe(record, DURATION_KEYS)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Flatten whatever shape the feed returned into a list of records.
///
/// Observed shapes: a raw array, a map wrapping the array under one of
/// several keys, or a single bare record. Anything else yields an empty
/// list rather than an error.
pub fn normalize_body(body: Value) -> Vec<CdrRecord> {
    match body {
        Value::Array(values) => collect_records(values),
        Value::Object(map) => {
            for key in WRAPPER_KEYS {
                if let Some(Value::Array(values)) = map.get(*key) {
                    return collect_records(values.clone());
                }
            }
            vec![map]
        }
        _ => Vec::new(),
    }
}

fn collect_records(values: Vec<Value>) -> Vec<CdrRecord> {
    values
        .into_iter()
        .filter_map(|v| match v {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .collect()
}

/// Does this record involve `person_id`?
///
/// The feed has no server-side person filter, so callers filter locally.
/// The id can live on the `from` party, the `to` party, or at the top level.
pub fn matches_person(record: &CdrRecord, person_id: &str) -> bool {
    for party_keys in [FROM_KEYS, TO_KEYS] {
        if let Some(Value::Object(party)) = probe(record, party_keys) {
            if probe_str(party, PERSON_ID_KEYS) == Some(person_id) {
                return true;
            }
        }
    }
    probe_str(record, PERSON_ID_KEYS) == Some(person_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> CdrRecord {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn probe_prefers_earlier_candidates() {
        let rec = record(json!({"Duration": 120, "duration": 999}));
        assert_eq!(probe_duration(&rec), Some(120));
    }

    #[test]
    fn duration_accepts_string_values() {
        let rec = record(json!({"duration": "85"}));
        assert_eq!(probe_duration(&rec), Some(85));
    }

    #[test]
    fn normalize_accepts_all_observed_shapes() {
        let rec = json!({"Call ID": "c1", "Duration": 10});

        let raw = normalize_body(json!([rec]));
        let items = normalize_body(json!({"items": [rec]}));
        let data = normalize_body(json!({"data": [rec]}));
        let calls = normalize_body(json!({"calls": [rec]}));
        let cdr = normalize_body(json!({"cdr": [rec]}));
        let single = normalize_body(rec.clone());

        for shape in [&raw, &items, &data, &calls, &cdr, &single] {
            assert_eq!(shape.len(), 1);
            assert_eq!(shape[0].get("Call ID"), Some(&json!("c1")));
        }
    }

    #[test]
    fn normalize_rejects_unknown_shapes() {
        assert!(normalize_body(json!("not records")).is_empty());
        assert!(normalize_body(json!(42)).is_empty());
        assert!(normalize_body(Value::Null).is_empty());
    }

    #[test]
    fn direction_and_status_probe_both_spellings() {
        let rec = record(json!({"Direction": "ORIGINATING", "callStatus": "answered"}));
        assert_eq!(probe_str(&rec, DIRECTION_KEYS), Some("ORIGINATING"));
        assert_eq!(probe_str(&rec, STATUS_KEYS), Some("answered"));
    }

    #[test]
    fn person_filter_probes_from_to_and_top_level() {
        let by_from = record(json!({"from": {"personId": "p1"}}));
        let by_to = record(json!({"to": {"personId": "p1"}}));
        let by_top = record(json!({"personId": "p1"}));
        let other = record(json!({"from": {"personId": "p2"}, "personId": "p3"}));

        assert!(matches_person(&by_from, "p1"));
        assert!(matches_person(&by_to, "p1"));
        assert!(matches_person(&by_top, "p1"));
        assert!(!matches_person(&other, "p1"));
    }
}
