//! Time handling for forecast runs.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::error::FieldError;

/// Compact timestamp used in file names, e.g. `20200201T0000`.
pub const COMPACT_FORMAT: &str = "%Y%m%dT%H%M";

/// Parse a forecast start time.
///
/// Accepts the compact file-name form (`20200201T0000`), RFC 3339, a naive
/// `YYYY-MM-DDTHH:MM:SS` (taken as UTC) or a bare date.
pub fn parse_forecast_start(s: &str) -> Result<DateTime<Utc>, FieldError> {
    let s = s.trim();

    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, COMPACT_FORMAT) {
        return Ok(Utc.from_utc_datetime(&ndt));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Ok(Utc.from_utc_datetime(&ndt));
    }

    for fmt in ["%Y-%m-%d", "%Y%m%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            if let Some(ndt) = date.and_hms_opt(0, 0, 0) {
                return Ok(Utc.from_utc_datetime(&ndt));
            }
        }
    }

    Err(FieldError::InvalidTime {
        value: s.to_string(),
    })
}

/// Whole hours in a lead time, rounding towards negative infinity.
pub fn lead_hours(lead_time: Duration) -> i64 {
    lead_time.num_seconds().div_euclid(3600)
}
