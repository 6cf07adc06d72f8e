use super::NormalizeError;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// US-style date and 12-hour clock in the configured timezone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalStart {
    /// `MM-DD-YYYY`
    pub date: String,
    /// `hh:mm AM`
    pub time: String,
}

/// Read epoch seconds from a number or numeric string. Fractions are truncated.
pub fn parse_epoch(value: &Value) -> Option<i64> {
    let secs = match value {
        Value::Number(n) => match n.as_i64() {
            Some(i) => return Some(i),
            None => n.as_f64()?,
        },
        Value::String(s) => {
            let s = s.trim();
            if let Ok(i) = s.parse::<i64>() {
                return Some(i);
            }
            s.parse::<f64>().ok()?
        }
        _ => return None,
    };
    (secs.is_finite() && secs.abs() < i64::MAX as f64).then(|| secs.trunc() as i64)
}

/// Interpret a raw upstream value as UTC epoch seconds.
pub fn utc_instant(epoch: Option<&Value>) -> Result<DateTime<Utc>, NormalizeError> {
    let value = epoch.ok_or_else(|| NormalizeError::InvalidTimestamp("missing".to_string()))?;
    parse_epoch(value)
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .ok_or_else(|| NormalizeError::InvalidTimestamp(value.to_string()))
}

pub fn to_local(utc: DateTime<Utc>, tz: Tz) -> LocalStart {
    let local = utc.with_timezone(&tz);
    LocalStart {
        date: local.format("%m-%d-%Y").to_string(),
        time: local.format("%I:%M %p").to_string(),
    }
}

/// Localize UTC epoch seconds to `tz`, formatted as `MM-DD-YYYY` and `hh:mm AM`.
pub fn localize_timestamp(epoch: Option<&Value>, tz: Tz) -> Result<LocalStart, NormalizeError> {
    Ok(to_local(utc_instant(epoch)?, tz))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_epoch_zero_utc() {
        let got = localize_timestamp(Some(&json!(0)), chrono_tz::UTC).unwrap();
        assert_eq!(got.date, "01-01-1970");
        assert_eq!(got.time, "12:00 AM");
    }

    #[test]
    fn test_new_york_afternoon() {
        // 2025-01-31T19:30:00Z is 2:30 PM EST.
        let got = localize_timestamp(Some(&json!(1738351800)), chrono_tz::America::New_York).unwrap();
        assert_eq!(got.date, "01-31-2025");
        assert_eq!(got.time, "02:30 PM");
    }

    #[test]
    fn test_crosses_date_line_backwards() {
        // 02:00 UTC on Jul 4 is still Jul 3 in New York (EDT).
        let got = localize_timestamp(Some(&json!(1751594400)), chrono_tz::America::New_York).unwrap();
        assert_eq!(got.date, "07-03-2025");
        assert_eq!(got.time, "10:00 PM");
    }

    #[test]
    fn test_string_and_float_epochs() {
        let tz = chrono_tz::UTC;
        assert_eq!(localize_timestamp(Some(&json!("0")), tz).unwrap().time, "12:00 AM");
        assert_eq!(localize_timestamp(Some(&json!(3600.9)), tz).unwrap().time, "01:00 AM");
    }

    #[test]
    fn test_invalid_timestamps() {
        let tz = chrono_tz::UTC;
        assert!(matches!(localize_timestamp(None, tz), Err(NormalizeError::InvalidTimestamp(_))));
        assert!(localize_timestamp(Some(&json!("soon")), tz).is_err());
        assert!(localize_timestamp(Some(&Value::Null), tz).is_err());
        assert!(localize_timestamp(Some(&json!(i64::MAX)), tz).is_err());
    }
}
