//! Text-to-temporal conversion for data cleaning.

use crate::utils::millis_to_series;
use anyhow::Result;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use polars::prelude::*;
use regex::Regex;

/// Shapes a value must have before any date format is attempted.
static DATE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(
            r"^\d{4}-\d{1,2}-\d{1,2}([ T]\d{1,2}:\d{2}(:\d{2}(\.\d+)?)?)?(Z|[+-]\d{2}:?\d{2})?$",
        )
        .expect("Invalid regex: ISO date/datetime"),
        Regex::new(r"^\d{4}/\d{1,2}/\d{1,2}$").expect("Invalid regex: YYYY/MM/DD"),
        Regex::new(r"^\d{1,2}/\d{1,2}/\d{4}$").expect("Invalid regex: MM/DD/YYYY"),
        Regex::new(r"^\d{1,2}\.\d{1,2}\.\d{4}$").expect("Invalid regex: DD.MM.YYYY"),
    ]
});

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];

/// Outcome of trying to promote a text column to temporal.
#[derive(Debug)]
pub(crate) enum Promotion {
    /// Every value parsed; the series holds the parsed instants.
    Promoted(Series),
    /// At least one value did not parse; the column keeps its representation.
    Retained { first_unparsed: String },
}

/// Parse one text value into epoch milliseconds (UTC).
pub(crate) fn parse_instant(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    if trimmed.is_empty() || !DATE_PATTERNS.iter().any(|p| p.is_match(trimmed)) {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.timestamp_millis());
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt.and_utc().timestamp_millis());
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            return date
                .and_hms_opt(0, 0, 0)
                .map(|dt| dt.and_utc().timestamp_millis());
        }
    }

    None
}

/// Promote a text column to `Datetime(ms)` only if every value parses.
///
/// Missing cells stay missing; an empty column is never promoted.
pub(crate) fn promote_to_temporal(series: &Series) -> Result<Promotion> {
    let str_series = series.str()?;
    if str_series.len() == str_series.null_count() {
        return Ok(Promotion::Retained {
            first_unparsed: String::new(),
        });
    }

    let mut millis: Vec<Option<i64>> = Vec::with_capacity(str_series.len());
    for opt_val in str_series.into_iter() {
        match opt_val {
            Some(val) => match parse_instant(val) {
                Some(ms) => millis.push(Some(ms)),
                None => {
                    return Ok(Promotion::Retained {
                        first_unparsed: val.to_string(),
                    });
                }
            },
            None => millis.push(None),
        }
    }

    Ok(Promotion::Promoted(millis_to_series(
        series.name().clone(),
        millis,
    )?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::{temporal_millis, temporal_storage_dtype};

    const DAY: i64 = 86_400_000;
    const JAN_1_2023: i64 = 1_672_531_200_000;

    // ========================================================================
    // parse_instant() tests
    // ========================================================================

    #[test]
    fn test_parse_iso_date() {
        assert_eq!(parse_instant("2023-01-01"), Some(JAN_1_2023));
        assert_eq!(parse_instant("  2023-01-02 "), Some(JAN_1_2023 + DAY));
    }

    #[test]
    fn test_parse_alternative_date_layouts() {
        assert_eq!(parse_instant("2023/01/01"), Some(JAN_1_2023));
        assert_eq!(parse_instant("01/01/2023"), Some(JAN_1_2023));
        assert_eq!(parse_instant("01.01.2023"), Some(JAN_1_2023));
    }

    #[test]
    fn test_parse_datetimes() {
        assert_eq!(
            parse_instant("2023-01-01 06:00:00"),
            Some(JAN_1_2023 + DAY / 4)
        );
        assert_eq!(
            parse_instant("2023-01-01T06:00:00.500"),
            Some(JAN_1_2023 + DAY / 4 + 500)
        );
        assert_eq!(parse_instant("2023-01-01 06:00"), Some(JAN_1_2023 + DAY / 4));
    }

    #[test]
    fn test_parse_rfc3339_with_offset() {
        assert_eq!(parse_instant("2023-01-01T00:00:00Z"), Some(JAN_1_2023));
        assert_eq!(
            parse_instant("2023-01-01T01:00:00+01:00"),
            Some(JAN_1_2023)
        );
    }

    #[test]
    fn test_parse_rejects_non_dates() {
        assert_eq!(parse_instant(""), None);
        assert_eq!(parse_instant("North"), None);
        assert_eq!(parse_instant("2023"), None);
        assert_eq!(parse_instant("12.5"), None);
        // Right shape, impossible calendar date
        assert_eq!(parse_instant("2023-02-30"), None);
    }

    // ========================================================================
    // promote_to_temporal() tests
    // ========================================================================

    #[test]
    fn test_promote_all_parse() {
        let series = Series::new(
            "date".into(),
            &["2023-01-01", "2023-01-02", "2023-01-03", "2023-01-04"],
        );

        match promote_to_temporal(&series).unwrap() {
            Promotion::Promoted(promoted) => {
                assert_eq!(promoted.dtype(), &temporal_storage_dtype());
                assert_eq!(promoted.name().as_str(), "date");
                let millis = temporal_millis(&promoted).unwrap();
                assert_eq!(millis[0], Some(JAN_1_2023));
                assert_eq!(millis[3], Some(JAN_1_2023 + 3 * DAY));
            }
            other => panic!("expected promotion, got {:?}", other),
        }
    }

    #[test]
    fn test_promote_keeps_missing_cells() {
        let series = Series::new("date".into(), &[Some("2023-01-01"), None]);

        match promote_to_temporal(&series).unwrap() {
            Promotion::Promoted(promoted) => assert_eq!(promoted.null_count(), 1),
            other => panic!("expected promotion, got {:?}", other),
        }
    }

    #[test]
    fn test_no_partial_promotion() {
        let series = Series::new("date".into(), &["2023-01-01", "soon", "2023-01-03"]);

        match promote_to_temporal(&series).unwrap() {
            Promotion::Retained { first_unparsed } => assert_eq!(first_unparsed, "soon"),
            other => panic!("expected retention, got {:?}", other),
        }
    }

    #[test]
    fn test_all_missing_column_is_not_promoted() {
        let series = Series::new("date".into(), &[Option::<&str>::None, None]);
        assert!(matches!(
            promote_to_temporal(&series).unwrap(),
            Promotion::Retained { .. }
        ));
    }

    #[test]
    fn test_promote_requires_text() {
        let series = Series::new("n".into(), &[1i64, 2]);
        assert!(promote_to_temporal(&series).is_err());
    }
}
