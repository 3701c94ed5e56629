//! PSTN usage aggregation over normalized CDR records.

use serde::Serialize;
use serde_json::Value;

use crate::client::{Result, WebexClient, WebexError};
use super::records::{
    self, CdrRecord, CALLED_LINE_KEYS, CALLING_LINE_KEYS, CALL_TYPE_KEYS,
};
use super::time::{canonicalize, TimestampEncoding};
use super::CdrQuery;

/// Response payloads are capped at this many sample records.
pub const PSTN_SAMPLE_LIMIT: usize = 100;

/// Line-ID placeholders that carry no routing information.
const PLACEHOLDER_LINE_IDS: &[&str] = &["", "NA", "N/A", "UNKNOWN", "ANONYMOUS"];

/// PSTN usage totals for one reporting window.
#[derive(Debug, Clone, Serialize)]
pub struct PstnSummary {
    #[serde(rename = "personId", skip_serializing_if = "Option::is_none")]
    pub person_id: Option<String>,
    #[serde(rename = "locationId", skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
    #[serde(rename = "startTime")]
    pub start_time: String,
    #[serde(rename = "endTime")]
    pub end_time: String,
    #[serde(rename = "totalPSTNMinutes")]
    pub total_minutes: f64,
    #[serde(rename = "totalPSTNSeconds")]
    pub total_seconds: i64,
    #[serde(rename = "totalPSTNCalls")]
    pub total_calls: usize,
    #[serde(rename = "sampleRecords")]
    pub sample_records: Vec<Value>,
}

/// Running totals before the window context is attached.
#[derive(Debug, Default)]
pub struct PstnTotals {
    pub total_seconds: i64,
    pub total_calls: usize,
    pub sample_records: Vec<Value>,
}

impl PstnTotals {
    pub fn total_minutes(&self) -> f64 {
        (self.total_seconds as f64 / 60.0 * 100.0).round() / 100.0
    }
}

/// Classify and sum PSTN usage. Records with zero duration are unanswered
/// or uncompleted calls and never count toward minute totals.
pub fn aggregate_pstn(records: &[CdrRecord]) -> PstnTotals {
    let mut totals = PstnTotals::default();
    for record in records {
        if !is_pstn(record) {
            continue;
        }
        let duration = records::probe_duration(record).unwrap_or(0);
        if duration <= 0 {
            continue;
        }
        totals.total_seconds += duration;
        totals.total_calls += 1;
        if totals.sample_records.len() < PSTN_SAMPLE_LIMIT {
            totals.sample_records.push(Value::Object(record.clone()));
        }
    }
    totals
}

/// Did this call leave the calling platform for the public network?
///
/// The call-type field is decisive when present: PSTN/TRUNK types are
/// external, ENTERPRISE types are internal. Records without a usable
/// call type fall back to line-ID inspection: two real line IDs where at
/// least one is E.164 (`+`-prefixed) indicate an off-net call.
fn is_pstn(record: &CdrRecord) -> bool {
    if let Some(call_type) = records::probe_str(record, CALL_TYPE_KEYS) {
        let call_type = call_type.to_uppercase();
        if call_type.contains("PSTN") || call_type.contains("TRUNK") {
            return true;
        }
        if call_type.contains("ENTERPRISE") {
            return false;
        }
    }

    let calling = records::probe_str(record, CALLING_LINE_KEYS);
    let called = records::probe_str(record, CALLED_LINE_KEYS);
    match (calling, called) {
        (Some(calling), Some(called)) if is_real_line(calling) && is_real_line(called) => {
            calling.starts_with('+') || called.starts_with('+')
        }
        _ => false,
    }
}

fn is_real_line(line: &str) -> bool {
    !PLACEHOLDER_LINE_IDS.contains(&line.trim().to_uppercase().as_str())
}

impl WebexClient {
    /// Fetch CDRs for the window and reduce them to PSTN totals.
    pub async fn get_pstn_minutes(&self, query: &CdrQuery) -> Result<PstnSummary> {
        let (Some(start), Some(end)) = (&query.start_time, &query.end_time) else {
            return Err(WebexError::InvalidArgument(
                "start_time and end_time are required for PSTN minutes".to_string(),
            ));
        };
        let start_time = canonicalize(start, TimestampEncoding::IsoMs, self.pad_zero_millis);
        let end_time = canonicalize(end, TimestampEncoding::IsoMs, self.pad_zero_millis);

        let records = self.get_call_detail_records(query).await?;
        let totals = aggregate_pstn(&records);

        Ok(PstnSummary {
            person_id: query.person_id.clone(),
            location_id: query.location_id.clone(),
            start_time,
            end_time,
            total_minutes: totals.total_minutes(),
            total_seconds: totals.total_seconds,
            total_calls: totals.total_calls,
            sample_records: totals.sample_records,
        })
    }
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
    fn trunk_call_type_counts_with_duration() {
        let records = vec![record(json!({"Call type": "PSTN_TRUNK", "Duration": 120}))];
        let totals = aggregate_pstn(&records);
        assert_eq!(totals.total_seconds, 120);
        assert_eq!(totals.total_calls, 1);
    }

    #[test]
    fn enterprise_call_type_is_internal_regardless_of_lines() {
        let records = vec![record(json!({
            "Call type": "SIP_ENTERPRISE",
            "Calling line ID": "+14085551234",
            "Called line ID": "+14085555678",
            "Duration": 300,
        }))];
        let totals = aggregate_pstn(&records);
        assert_eq!(totals.total_calls, 0);
        assert_eq!(totals.total_seconds, 0);
    }

    #[test]
    fn zero_duration_is_excluded_regardless_of_classification() {
        let records = vec![record(json!({"callType": "SIP_PSTN", "duration": 0}))];
        let totals = aggregate_pstn(&records);
        assert_eq!(totals.total_calls, 0);
    }

    #[test]
    fn line_id_fallback_requires_real_e164_parties() {
        let external = record(json!({
            "Calling line ID": "+14085551234",
            "Called line ID": "2001",
            "Duration": 60,
        }));
        let placeholder = record(json!({
            "Calling line ID": "NA",
            "Called line ID": "+14085551234",
            "Duration": 60,
        }));
        let internal = record(json!({
            "Calling line ID": "2001",
            "Called line ID": "2002",
            "Duration": 60,
        }));

        assert_eq!(aggregate_pstn(&[external]).total_calls, 1);
        assert_eq!(aggregate_pstn(&[placeholder]).total_calls, 0);
        assert_eq!(aggregate_pstn(&[internal]).total_calls, 0);
    }

    #[test]
    fn minutes_are_rounded_to_two_decimals() {
        let records = vec![
            record(json!({"callType": "SIP_PSTN", "duration": 100})),
            record(json!({"callType": "SIP_PSTN", "duration": 50})),
        ];
        let totals = aggregate_pstn(&records);
        assert_eq!(totals.total_seconds, 150);
        assert_eq!(totals.total_minutes(), 2.5);

        let odd = vec![record(json!({"callType": "SIP_PSTN", "duration": 100}))];
        assert_eq!(aggregate_pstn(&odd).total_minutes(), 1.67);
    }

    #[test]
    fn sample_is_capped() {
        let records: Vec<CdrRecord> = (0..150)
            .map(|i| record(json!({"callType": "SIP_PSTN", "duration": 10, "Call ID": i})))
            .collect();
        let totals = aggregate_pstn(&records);
        assert_eq!(totals.total_calls, 150);
        assert_eq!(totals.sample_records.len(), PSTN_SAMPLE_LIMIT);
    }
}
