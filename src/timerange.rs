//! Time range resolution for `--from` / `--to` flags.
//!
//! A time expression is one of three forms:
//! - relative: digits plus a single lowercase unit letter (`15m`, `4h`, `7d`,
//!   `2w`), always meaning "that long before now";
//! - the literal `now`;
//! - absolute ISO-8601: a date (`2026-02-10`, midnight UTC) or a datetime
//!   with an explicit offset (`2026-02-10T10:00:00Z`). A datetime without an
//!   offset is ambiguous and rejected.
//!
//! Both sides of a range resolve independently against the same `now`; an
//! inverted window is a range error, distinct from a parse error.

use crate::error::TimeRangeError;
use chrono::{DateTime, NaiveDate, Utc};

/// Resolved query bound, `[from, to]` in epoch seconds, `from <= to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub from_epoch: i64,
    pub to_epoch: i64,
}

impl TimeRange {
    /// Start of the window as an RFC 3339 UTC string (v2 API request form).
    pub fn from_rfc3339(&self) -> String {
        epoch_to_rfc3339(self.from_epoch)
    }

    /// End of the window as an RFC 3339 UTC string.
    pub fn to_rfc3339(&self) -> String {
        epoch_to_rfc3339(self.to_epoch)
    }
}

fn epoch_to_rfc3339(epoch: i64) -> String {
    DateTime::<Utc>::from_timestamp(epoch, 0)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| epoch.to_string())
}

/// Relative-expression unit. No calendar-aware month/year units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Minute,
    Hour,
    Day,
    Week,
}

impl Unit {
    fn seconds(self) -> i64 {
        match self {
            Self::Minute => 60,
            Self::Hour => 3_600,
            Self::Day => 86_400,
            Self::Week => 604_800,
        }
    }

    /// Unit letter to unit; lowercase only.
    fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'm' => Some(Self::Minute),
            'h' => Some(Self::Hour),
            'd' => Some(Self::Day),
            'w' => Some(Self::Week),
            _ => None,
        }
    }
}

/// Parsed form of one user-supplied time expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeExpression {
    /// `quantity × unit` before now.
    Relative { quantity: i64, unit: Unit },
    /// The literal `now`.
    Now,
    /// A concrete instant, epoch seconds.
    Absolute(i64),
}

impl TimeExpression {
    /// Parse a single expression without resolving it.
    pub fn parse(expr: &str) -> Result<Self, TimeRangeError> {
        if expr == "now" {
            return Ok(Self::Now);
        }
        if let Some(relative) = parse_relative(expr) {
            return Ok(relative);
        }
        if let Some(epoch) = parse_absolute(expr) {
            return Ok(Self::Absolute(epoch));
        }
        Err(TimeRangeError::Parse(expr.to_string()))
    }

    /// Resolve to epoch seconds against the supplied `now`.
    pub fn resolve(self, now: DateTime<Utc>) -> Result<i64, TimeRangeError> {
        match self {
            Self::Now => Ok(now.timestamp()),
            Self::Absolute(epoch) => Ok(epoch),
            Self::Relative { quantity, unit } => quantity
                .checked_mul(unit.seconds())
                .and_then(|span| now.timestamp().checked_sub(span))
                .ok_or_else(|| {
                    TimeRangeError::Parse(format!("{quantity} is out of range"))
                }),
        }
    }
}

/// Match `digits + one unit letter`, the only relative form accepted.
///
/// No spaces, signs, or decimals; leading zeros are fine; uppercase unit
/// letters are rejected.
fn parse_relative(expr: &str) -> Option<TimeExpression> {
    let letter = expr.chars().last()?;
    let unit = Unit::from_letter(letter)?;
    let digits = &expr[..expr.len() - letter.len_utf8()];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let quantity = digits.parse::<i64>().ok()?;
    Some(TimeExpression::Relative { quantity, unit })
}

/// Parse an absolute ISO-8601 expression.
fn parse_absolute(expr: &str) -> Option<i64> {
    // Date-only resolves to midnight UTC of that date.
    if let Ok(date) = NaiveDate::parse_from_str(expr, "%Y-%m-%d") {
        let midnight = date.and_hms_opt(0, 0, 0)?;
        return Some(midnight.and_utc().timestamp());
    }
    // Datetimes must carry an explicit offset or UTC designator; RFC 3339
    // parsing rejects naive datetimes, which keeps ambiguous input out.
    DateTime::parse_from_rfc3339(expr)
        .ok()
        .map(|dt| dt.timestamp())
}

/// Resolve a `[from, to]` pair of expressions against `now`.
pub fn resolve(
    from_expr: &str,
    to_expr: &str,
    now: DateTime<Utc>,
) -> Result<TimeRange, TimeRangeError> {
    let from_epoch = TimeExpression::parse(from_expr)?.resolve(now)?;
    let to_epoch = TimeExpression::parse(to_expr)?.resolve(now)?;
    if from_epoch > to_epoch {
        return Err(TimeRangeError::Range {
            from: from_epoch,
            to: to_epoch,
        });
    }
    Ok(TimeRange {
        from_epoch,
        to_epoch,
    })
}

/// Resolve against the current wall clock.
pub fn resolve_now(from_expr: &str, to_expr: &str) -> Result<TimeRange, TimeRangeError> {
    resolve(from_expr, to_expr, Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn one_hour_back_to_now() {
        let now = fixed_now();
        let range = resolve("1h", "now", now).unwrap();
        assert_eq!(range.from_epoch, now.timestamp() - 3_600);
        assert_eq!(range.to_epoch, now.timestamp());
    }

    #[test]
    fn each_unit_maps_to_its_second_count() {
        let now = fixed_now();
        for (expr, seconds) in [("3m", 180), ("2h", 7_200), ("1d", 86_400), ("1w", 604_800)] {
            let range = resolve(expr, "now", now).unwrap();
            assert_eq!(
                now.timestamp() - range.from_epoch,
                seconds,
                "expression {expr}"
            );
        }
    }

    #[test]
    fn zero_width_window_is_valid() {
        let now = fixed_now();
        let range = resolve("0m", "now", now).unwrap();
        assert_eq!(range.from_epoch, now.timestamp());
        assert_eq!(range.to_epoch, now.timestamp());
    }

    #[test]
    fn leading_zeros_are_accepted() {
        let now = fixed_now();
        let range = resolve("007h", "now", now).unwrap();
        assert_eq!(range.from_epoch, now.timestamp() - 7 * 3_600);
    }

    #[test]
    fn uppercase_unit_is_a_parse_error() {
        for expr in ["1H", "1M", "2D", "1W", "1Mh"] {
            let err = resolve(expr, "now", fixed_now()).unwrap_err();
            assert!(
                matches!(err, TimeRangeError::Parse(_)),
                "expression {expr} should fail to parse"
            );
        }
    }

    #[test]
    fn malformed_relative_forms_are_rejected() {
        for expr in ["h", "1 h", "-1h", "+1h", "1.5h", "1hh", "", "1y", "now ", "1時"] {
            let err = resolve(expr, "now", fixed_now()).unwrap_err();
            assert!(
                matches!(err, TimeRangeError::Parse(_)),
                "expression {expr:?} should fail to parse"
            );
        }
    }

    #[test]
    fn date_only_resolves_to_midnight_utc() {
        let now = fixed_now();
        let range = resolve("2026-02-01", "now", now).unwrap();
        let midnight = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();
        assert_eq!(range.from_epoch, midnight.timestamp());
    }

    #[test]
    fn datetime_with_offset_or_zulu_is_accepted() {
        let now = fixed_now();
        let range = resolve("2026-02-10T10:00:00Z", "now", now).unwrap();
        let expected = Utc.with_ymd_and_hms(2026, 2, 10, 10, 0, 0).unwrap();
        assert_eq!(range.from_epoch, expected.timestamp());

        let offset = resolve("2026-02-10T11:00:00+01:00", "now", now).unwrap();
        assert_eq!(offset.from_epoch, expected.timestamp());
    }

    #[test]
    fn naive_datetime_is_ambiguous_and_rejected() {
        let err = resolve("2026-02-10T10:00:00", "now", fixed_now()).unwrap_err();
        assert!(matches!(err, TimeRangeError::Parse(_)));
    }

    #[test]
    fn both_sides_resolve_independently_from_now() {
        // from = now-1d is after to = now-2d, so the window is inverted.
        let err = resolve("1d", "2d", fixed_now()).unwrap_err();
        assert!(matches!(err, TimeRangeError::Range { .. }));

        // The other ordering is a valid one-day window ending a day ago.
        let range = resolve("2d", "1d", fixed_now()).unwrap();
        assert_eq!(range.to_epoch - range.from_epoch, 86_400);
    }

    #[test]
    fn equal_bounds_pass_the_range_check() {
        let range = resolve("now", "now", fixed_now()).unwrap();
        assert_eq!(range.from_epoch, range.to_epoch);
    }

    #[test]
    fn rfc3339_projection_for_v2_requests() {
        let now = fixed_now();
        let range = resolve("1h", "now", now).unwrap();
        assert_eq!(range.to_rfc3339(), "2026-02-10T12:00:00+00:00");
        assert_eq!(range.from_rfc3339(), "2026-02-10T11:00:00+00:00");
    }
}
