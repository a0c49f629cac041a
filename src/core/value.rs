//! Cell values held by a [`Dataset`](super::Dataset).

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike};
use std::fmt;

/// Date layouts accepted for text date cells (month-first for slashed dates).
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];

/// Time suffixes tried after each date layout.
const TIME_SUFFIXES: [&str; 4] = [" %H:%M:%S%.f", " %H:%M", "T%H:%M:%S%.f", "T%H:%M"];

/// A single table cell.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Missing value.
    #[default]
    Null,
    /// Numeric value.
    Number(f64),
    /// Free text.
    Text(String),
    /// Calendar date and time (timezone-naive).
    Date(NaiveDateTime),
}

/// Hashable identity of a cell, used for entity grouping and join matching.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupKey {
    Number(u64),
    Text(String),
    Date(NaiveDateTime),
}

impl Value {
    pub fn is_null(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Number(x) => x.is_nan(),
            _ => false,
        }
    }

    /// Numeric content, if any.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(x) => Some(*x),
            _ => None,
        }
    }

    /// Numeric content with missing values mapped to `NaN`.
    pub fn to_f64_or_nan(&self) -> f64 {
        self.as_f64().unwrap_or(f64::NAN)
    }

    pub fn as_date(&self) -> Option<NaiveDateTime> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Interpret this cell as a date/time.
    ///
    /// Dates pass through; text is parsed as RFC 3339 (converted to UTC) or
    /// one of the date layouts with an optional time part. Numbers and
    /// missing values are not dates.
    pub fn to_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Value::Date(d) => Some(*d),
            Value::Text(s) => parse_datetime(s),
            _ => None,
        }
    }

    /// Grouping identity. Missing values have none.
    pub fn group_key(&self) -> Option<GroupKey> {
        match self {
            Value::Null => None,
            Value::Number(x) if x.is_nan() => None,
            // -0.0 and 0.0 must land in the same group
            Value::Number(x) => Some(GroupKey::Number((x + 0.0).to_bits())),
            Value::Text(s) => Some(GroupKey::Text(s.clone())),
            Value::Date(d) => Some(GroupKey::Date(*d)),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Number(x) if x.is_nan() => Ok(()),
            Value::Number(x) => write!(f, "{}", x),
            Value::Text(s) => f.write_str(s),
            Value::Date(d) if d.nanosecond() == 0 => {
                write!(f, "{}", d.format("%Y-%m-%d %H:%M:%S"))
            }
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d %H:%M:%S%.f")),
        }
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Number(x)
    }
}

impl From<i32> for Value {
    fn from(x: i32) -> Self {
        Value::Number(x as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(d: NaiveDateTime) -> Self {
        Value::Date(d)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Parse a textual date/time.
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }

    for date_fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, date_fmt) {
            return date.and_hms_opt(0, 0, 0);
        }
        for time_fmt in TIME_SUFFIXES {
            let layout = format!("{}{}", date_fmt, time_fmt);
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, &layout) {
                return Some(dt);
            }
        }
    }

    None
}
