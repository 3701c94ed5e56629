//! Call detail record retrieval.
//!
//! The CDR feed lives on the analytics endpoint root, demands
//! millisecond-precision ISO-8601 bounds, and only serves windows between
//! 5 minutes and 48 hours in the past. Its parameter validation is strict
//! and its documentation is not, so a fetch tries an ordered sequence of
//! parameter shapes and stops at the first one the feed accepts.

pub mod analytics;
pub mod records;
pub mod time;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use crate::client::{Result, WebexClient, WebexError};
use records::CdrRecord;
use time::{canonicalize, TimeSpec, TimestampEncoding};

pub const CDR_FEED_ENDPOINT: &str = "/cdr_feed";

/// Feed eligibility window, per upstream documentation: both bounds must be
/// at least this old...
pub const MIN_WINDOW_AGE_MINUTES: i64 = 5;
/// ...and at most this old. Advisory only; the upstream stays authoritative.
pub const MAX_WINDOW_AGE_HOURS: i64 = 48;

/// Requested reporting window.
#[derive(Debug, Clone)]
pub struct TimeWindow {
    pub start: TimeSpec,
    pub end: TimeSpec,
}

impl TimeWindow {
    /// Both bounds in the canonical wire encoding.
    fn wire_bounds(&self, pad_zero_millis: bool) -> (String, String) {
        (
            canonicalize(&self.start, TimestampEncoding::IsoMs, pad_zero_millis),
            canonicalize(&self.end, TimestampEncoding::IsoMs, pad_zero_millis),
        )
    }
}

/// Parameters for a CDR fetch.
#[derive(Debug, Clone)]
pub struct CdrQuery {
    pub start_time: Option<TimeSpec>,
    pub end_time: Option<TimeSpec>,
    pub person_id: Option<String>,
    pub location_id: Option<String>,
    pub max_results: u32,
}

impl Default for CdrQuery {
    fn default() -> Self {
        Self {
            start_time: None,
            end_time: None,
            person_id: None,
            location_id: None,
            max_results: 100,
        }
    }
}

/// One hypothesis about the parameter shape the feed accepts.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RequestVariant {
    pub label: &'static str,
    pub params: Vec<(&'static str, String)>,
}

/// Candidate parameter sets in priority order. Narrow sets fail strict
/// validation less often, so the minimal shape goes first and optional
/// fields are reintroduced progressively. Every variant uses the
/// millisecond ISO encoding: the feed's contract requires it, so variant
/// diversity is about optional-field inclusion, not timestamp format.
pub(crate) fn build_variants(
    start: &str,
    end: &str,
    location_id: Option<&str>,
    max_results: u32,
) -> Vec<RequestVariant> {
    let base = vec![
        ("startTime", start.to_string()),
        ("endTime", end.to_string()),
    ];

    let with_location = |mut params: Vec<(&'static str, String)>| {
        if let Some(location_id) = location_id {
            params.push(("locations", location_id.to_string()));
        }
        params
    };
    let with_max = |mut params: Vec<(&'static str, String)>| {
        params.push(("max", max_results.to_string()));
        params
    };

    let candidates = [
        RequestVariant { label: "minimal", params: base.clone() },
        RequestVariant { label: "full", params: with_max(with_location(base.clone())) },
        RequestVariant { label: "no-max", params: with_location(base.clone()) },
        RequestVariant { label: "no-locations", params: with_max(base) },
    ];

    // Absent optional inputs collapse some candidates into earlier ones.
    let mut variants: Vec<RequestVariant> = Vec::new();
    for candidate in candidates {
        if !variants.iter().any(|v| v.params == candidate.params) {
            variants.push(candidate);
        }
    }
    variants
}

/// Check the requested window against the feed's documented eligibility
/// constraints. Returns one message per independent violation. Advisory
/// only: a passing upstream call is never blocked on this.
pub fn diagnose(window: &TimeWindow, now: DateTime<Utc>) -> Vec<String> {
    let oldest = now - Duration::hours(MAX_WINDOW_AGE_HOURS);
    let newest = now - Duration::minutes(MIN_WINDOW_AGE_MINUTES);

    let mut violations = Vec::new();
    let start = window.start.instant();
    let end = window.end.instant();

    for (bound, name) in [(start, "start"), (end, "end")] {
        let Some(t) = bound else { continue };
        if t < oldest {
            violations.push(format!(
                "{} time {} is more than {} hours in the past",
                name,
                t.to_rfc3339(),
                MAX_WINDOW_AGE_HOURS
            ));
        }
        if t > newest {
            violations.push(format!(
                "{} time {} is less than {} minutes in the past",
                name,
                t.to_rfc3339(),
                MIN_WINDOW_AGE_MINUTES
            ));
        }
    }

    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            violations.push(format!(
                "start time {} is after end time {}",
                start.to_rfc3339(),
                end.to_rfc3339()
            ));
        }
    }

    violations
}

impl WebexClient {
    /// Fetch CDRs for a window, trying each parameter-shape variant in
    /// order. Person filtering happens locally: the feed has no
    /// server-side person filter.
    pub async fn get_call_detail_records(&self, query: &CdrQuery) -> Result<Vec<CdrRecord>> {
        let start = query.start_time.clone().ok_or_else(|| {
            WebexError::InvalidArgument("start_time is required for call detail records".to_string())
        })?;
        let end = query.end_time.clone().ok_or_else(|| {
            WebexError::InvalidArgument("end_time is required for call detail records".to_string())
        })?;
        let window = TimeWindow { start, end };

        let (start_wire, end_wire) = window.wire_bounds(self.pad_zero_millis);
        let variants = build_variants(
            &start_wire,
            &end_wire,
            query.location_id.as_deref(),
            query.max_results,
        );
        let total = variants.len();

        let mut last_rejection: Option<WebexError> = None;
        for (attempt, variant) in variants.iter().enumerate() {
            debug!(
                variant = variant.label,
                attempt = attempt + 1,
                total,
                "Requesting CDR feed"
            );
            match self.analytics_get(CDR_FEED_ENDPOINT, &variant.params).await {
                Ok(body) => {
                    let mut found = records::normalize_body(body);
                    if let Some(person_id) = &query.person_id {
                        found.retain(|r| records::matches_person(r, person_id));
                    }
                    debug!(variant = variant.label, count = found.len(), "CDR feed accepted");
                    return Ok(found);
                }
                Err(e) if e.is_retryable_rejection() => {
                    warn!(variant = variant.label, error = %e, "CDR variant rejected, trying next");
                    last_rejection = Some(e);
                }
                // 401/403/404/429 and non-input 400s are not solved by a
                // different parameter shape.
                Err(e) => return Err(e),
            }
        }

        Err(exhaustion_error(last_rejection, &window, total))
    }
}

fn exhaustion_error(
    last_rejection: Option<WebexError>,
    window: &TimeWindow,
    attempts: usize,
) -> WebexError {
    let last = last_rejection
        .map(|e| e.to_string())
        .unwrap_or_else(|| "no request was attempted".to_string());
    let mut message = format!(
        "All {} CDR request variants were rejected by the analytics endpoint. Last error: {}.",
        attempts, last
    );

    let violations = diagnose(window, Utc::now());
    if violations.is_empty() {
        message.push_str(&format!(
            " The feed only accepts windows between {} minutes and {} hours in the past.",
            MIN_WINDOW_AGE_MINUTES, MAX_WINDOW_AGE_HOURS
        ));
    } else {
        message.push_str(" Requested window is outside the accepted range: ");
        message.push_str(&violations.join("; "));
        message.push('.');
    }

    WebexError::RetryExhausted(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    const START: &str = "2024-01-15T10:00:00.001Z";
    const END: &str = "2024-01-15T12:00:00.001Z";

    #[test]
    fn variant_order_is_stable_with_all_options() {
        let variants = build_variants(START, END, Some("loc-1"), 50);
        let labels: Vec<_> = variants.iter().map(|v| v.label).collect();
        assert_eq!(labels, ["minimal", "full", "no-max", "no-locations"]);

        // The first variant carries nothing but the window bounds.
        let minimal: Vec<_> = variants[0].params.iter().map(|(k, _)| *k).collect();
        assert_eq!(minimal, ["startTime", "endTime"]);
    }

    #[test]
    fn absent_location_collapses_duplicate_variants() {
        let variants = build_variants(START, END, None, 50);
        let labels: Vec<_> = variants.iter().map(|v| v.label).collect();
        // full == no-locations and no-max == minimal without a location.
        assert_eq!(labels, ["minimal", "full"]);
        assert!(variants[1].params.iter().any(|(k, _)| *k == "max"));
    }

    #[test]
    fn every_variant_uses_millisecond_bounds() {
        for variant in build_variants(START, END, Some("loc-1"), 50) {
            let start = variant.params.iter().find(|(k, _)| *k == "startTime").unwrap();
            assert_eq!(start.1, START);
        }
    }

    fn window(start: &str, end: &str) -> TimeWindow {
        TimeWindow {
            start: TimeSpec::from(start),
            end: TimeSpec::from(end),
        }
    }

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-01-17T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn window_inside_range_has_no_violations() {
        let w = window("2024-01-16T12:00:00Z", "2024-01-17T10:00:00Z");
        assert!(diagnose(&w, now()).is_empty());
    }

    #[test]
    fn equal_bounds_are_not_a_violation() {
        let w = window("2024-01-16T12:00:00Z", "2024-01-16T12:00:00Z");
        assert!(diagnose(&w, now()).is_empty());
    }

    #[test]
    fn inverted_bounds_are_flagged() {
        let w = window("2024-01-17T10:00:00Z", "2024-01-16T12:00:00Z");
        let violations = diagnose(&w, now());
        assert_eq!(violations.len(), 1);
        assert!(violations[0].contains("after end time"));
    }

    #[test]
    fn each_constraint_reports_independently() {
        // Start ancient, end too fresh: two separate violations.
        let w = window("2024-01-01T00:00:00Z", "2024-01-17T11:58:00Z");
        let violations = diagnose(&w, now());
        assert_eq!(violations.len(), 2);
        assert!(violations[0].contains("more than 48 hours"));
        assert!(violations[1].contains("less than 5 minutes"));
    }

    #[test]
    fn unparseable_bound_skips_its_checks() {
        let w = window("next tuesday", "2024-01-16T12:00:00Z");
        assert!(diagnose(&w, now()).is_empty());
    }
}
