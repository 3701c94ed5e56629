//! Timestamp canonicalization for the analytics endpoint.
//!
//! The CDR feed is strict about its wire format (`YYYY-MM-DDTHH:MM:SS.mmmZ`,
//! UTC) while callers hand us timestamps in whatever shape their host
//! produced. This module turns either a free-form string or a structured
//! instant into one of the accepted encodings without ever failing: a string
//! we cannot make sense of is cleaned and passed through so the upstream can
//! issue its own rejection.

use chrono::{DateTime, NaiveDateTime, Utc};

/// Wire encodings understood by the upstream analytics API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampEncoding {
    /// ISO-8601 with exactly three fractional digits (canonical).
    IsoMs,
    /// ISO-8601 without fractional seconds.
    Iso,
    /// Integer milliseconds since the Unix epoch.
    EpochMs,
}

/// A caller-supplied point in time.
#[derive(Debug, Clone)]
pub enum TimeSpec {
    Text(String),
    Instant(DateTime<Utc>),
}

impl From<&str> for TimeSpec {
    fn from(s: &str) -> Self {
        TimeSpec::Text(s.to_string())
    }
}

impl From<String> for TimeSpec {
    fn from(s: String) -> Self {
        TimeSpec::Text(s)
    }
}

impl From<DateTime<Utc>> for TimeSpec {
    fn from(t: DateTime<Utc>) -> Self {
        TimeSpec::Instant(t)
    }
}

impl TimeSpec {
    /// Parsed instant, if the value can be interpreted at all.
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        match self {
            TimeSpec::Instant(t) => Some(*t),
            TimeSpec::Text(s) => parse_instant(s.trim()),
        }
    }
}

/// Render `spec` in the requested encoding.
///
/// `pad_zero_millis` substitutes `.001` for an exact-zero millisecond field
/// in `IsoMs` output; the feed has been observed to reject `.000` on some
/// inputs. Toggleable via `CDR_PAD_ZERO_MILLIS` until that behavior is
/// confirmed against the current API revision.
pub fn canonicalize(spec: &TimeSpec, encoding: TimestampEncoding, pad_zero_millis: bool) -> String {
    match spec {
        TimeSpec::Instant(t) => format_instant(*t, encoding, pad_zero_millis),
        TimeSpec::Text(raw) => {
            let cleaned = raw.trim();
            if let Some(t) = parse_instant(cleaned) {
                return format_instant(t, encoding, pad_zero_millis);
            }
            // Best-effort repair: a malformed fractional suffix is the most
            // common breakage. Strip it, reparse, re-emit with 3 digits.
            if encoding == TimestampEncoding::IsoMs {
                if let Some(t) = strip_fraction(cleaned).and_then(|s| parse_instant(&s)) {
                    return format_instant(t, encoding, pad_zero_millis);
                }
            }
            // Lossy fallback: hand the cleaned input to the upstream as-is
            // and let it produce its own rejection.
            cleaned.to_string()
        }
    }
}

/// Permissive parse: trailing `Z`, explicit offsets, optional fractional
/// seconds, `T` or space separator. UTC is assumed when no offset is given.
fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    if raw.is_empty() {
        return None;
    }

    let normalized = if raw.len() > 10 && raw.as_bytes().get(10) == Some(&b' ') {
        let mut s = raw.to_string();
        s.replace_range(10..11, "T");
        s
    } else {
        raw.to_string()
    };

    if let Ok(t) = DateTime::parse_from_rfc3339(&normalized) {
        return Some(t.with_timezone(&Utc));
    }

    // No offset: treat as UTC.
    let naive = normalized.strip_suffix('Z').unwrap_or(&normalized);
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(t) = NaiveDateTime::parse_from_str(naive, fmt) {
            return Some(t.and_utc());
        }
    }

    None
}

/// Drop a fractional-seconds suffix, keeping any trailing `Z`.
fn strip_fraction(raw: &str) -> Option<String> {
    let dot = raw.find('.')?;
    let base = &raw[..dot];
    if raw.ends_with('Z') || raw.ends_with('z') {
        Some(format!("{}Z", base))
    } else {
        Some(base.to_string())
    }
}

fn format_instant(t: DateTime<Utc>, encoding: TimestampEncoding, pad_zero_millis: bool) -> String {
    match encoding {
        TimestampEncoding::IsoMs => {
            let mut millis = t.timestamp_subsec_millis();
            if millis == 0 && pad_zero_millis {
                millis = 1;
            }
            format!("{}.{:03}Z", t.format("%Y-%m-%dT%H:%M:%S"), millis)
        }
        TimestampEncoding::Iso => t.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        TimestampEncoding::EpochMs => t.timestamp_millis().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iso_ms(input: &str) -> String {
        canonicalize(&TimeSpec::from(input), TimestampEncoding::IsoMs, true)
    }

    fn assert_wire_format(s: &str) {
        // YYYY-MM-DDTHH:MM:SS.mmmZ
        assert_eq!(s.len(), 24, "unexpected length: {}", s);
        assert_eq!(&s[10..11], "T");
        assert_eq!(&s[19..20], ".");
        assert!(s.ends_with('Z'));
        assert!(s[20..23].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn accepts_iso_variants() {
        for input in [
            "2024-01-15T10:30:00Z",
            "2024-01-15T10:30:00.250Z",
            "2024-01-15T10:30:00",
            "2024-01-15 10:30:00",
            "2024-01-15T10:30:00+00:00",
            "2024-01-15T12:30:00+02:00",
        ] {
            assert_wire_format(&iso_ms(input));
        }
    }

    #[test]
    fn offset_is_converted_to_utc() {
        assert_eq!(iso_ms("2024-01-15T12:30:00.500+02:00"), "2024-01-15T10:30:00.500Z");
    }

    #[test]
    fn zero_millis_padded_to_one() {
        // Regression guard: the feed rejects an all-zero millisecond field
        // on some inputs, so exact-zero becomes 001.
        assert_eq!(iso_ms("2024-01-15T10:30:00Z"), "2024-01-15T10:30:00.001Z");
    }

    #[test]
    fn zero_millis_kept_when_padding_disabled() {
        let out = canonicalize(
            &TimeSpec::from("2024-01-15T10:30:00Z"),
            TimestampEncoding::IsoMs,
            false,
        );
        assert_eq!(out, "2024-01-15T10:30:00.000Z");
    }

    #[test]
    fn nonzero_millis_preserved() {
        assert_eq!(iso_ms("2024-01-15T10:30:00.250Z"), "2024-01-15T10:30:00.250Z");
    }

    #[test]
    fn malformed_fraction_is_repaired() {
        assert_eq!(iso_ms("2024-01-15T10:30:00.badZ"), "2024-01-15T10:30:00.001Z");
    }

    #[test]
    fn unparseable_input_falls_back_to_cleaned_text() {
        assert_eq!(iso_ms("  next tuesday  "), "next tuesday");
        assert_eq!(iso_ms(""), "");
    }

    #[test]
    fn iso_encoding_has_no_fraction() {
        let out = canonicalize(
            &TimeSpec::from("2024-01-15T10:30:00.250Z"),
            TimestampEncoding::Iso,
            true,
        );
        assert_eq!(out, "2024-01-15T10:30:00Z");
    }

    #[test]
    fn epoch_encoding_is_integer_millis() {
        let out = canonicalize(
            &TimeSpec::from("2024-01-15T00:00:00.000Z"),
            TimestampEncoding::EpochMs,
            true,
        );
        assert_eq!(out, "1705276800000");
    }

    #[test]
    fn instant_input_formats_directly() {
        let t = DateTime::parse_from_rfc3339("2024-01-15T10:30:00.750Z")
            .unwrap()
            .with_timezone(&Utc);
        let out = canonicalize(&TimeSpec::from(t), TimestampEncoding::IsoMs, true);
        assert_eq!(out, "2024-01-15T10:30:00.750Z");
    }
}
