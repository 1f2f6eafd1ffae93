//! The tagged value tree both parsers produce and the serializer consumes.
//!
//! `Value::String` and `Record` keys hold `Rc<str>` rather than `String`:
//! the text parser's intern caches (`text::intern`) hand out clones of a
//! single shared allocation for repeated tokens, and on an ownership-based
//! runtime that sharing has to be reference-counted to outlive the parser
//! that created it (see Design Notes, spec.md §9).

use std::rc::Rc;

#[cfg(feature = "serde")]
use serde::Serialize;

/// A calendar date with an optional hour, no timezone, no minutes/seconds.
///
/// Month lengths follow the fixed Gregorian table with no leap-year
/// adjustment, matching the Clausewitz engine's own calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Date {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: Option<u8>,
}

const DAYS_IN_MONTH: [u8; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

impl Date {
    /// Builds and validates a date: year in `[1, 9999]`, month in `[1,
    /// 12]`, day in `[1, DaysInMonth]`, hour in `[0, 23]` if present.
    /// Returns `None` if any field is out of range.
    pub fn new(year: u32, month: u32, day: u32, hour: Option<u32>) -> Option<Self> {
        if year == 0 || year > 9999 {
            return None;
        }
        if month == 0 || month > 12 {
            return None;
        }
        let max_day = DAYS_IN_MONTH[(month - 1) as usize] as u32;
        if day == 0 || day > max_day {
            return None;
        }
        let hour = match hour {
            Some(h) if h > 23 => return None,
            Some(h) => Some(h as u8),
            None => None,
        };

        Some(Date {
            year: year as u16,
            month: month as u8,
            day: day as u8,
            hour,
        })
    }
}

/// The tagged sum type produced by both parsers.
///
/// `Record` is an ordered multimap: duplicate keys are preserved verbatim
/// because the format uses repetition instead of arrays for many
/// aggregates (e.g. multiple `army=` blocks in the same object).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum Value {
    Bool(bool),
    Number(f64),
    Date(Date),
    String(Rc<str>),
    Hsv(f64, f64, f64),
    Rgb(u8, u8, u8),
    Array(Vec<Value>),
    Record(Vec<(Rc<str>, Value)>),
}

impl Value {
    /// Convenience constructor that interns nothing; used by callers that
    /// already hold an `Rc<str>` (the parsers) as well as ad-hoc test code.
    pub fn string(s: impl Into<Rc<str>>) -> Value {
        Value::String(s.into())
    }

    pub fn is_record(&self) -> bool {
        matches!(self, Value::Record(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }
}

#[cfg(feature = "serde")]
/// Serializes `value` to a pretty JSON string, or `None` if serialization
/// fails (it cannot fail for any `Value` produced by the parsers, but the
/// type is not restricted to those).
pub fn to_json_string(value: &Value) -> Option<String> {
    serde_json::to_string_pretty(value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_validates_ranges() {
        assert!(Date::new(2015, 8, 32, None).is_none());
        assert!(Date::new(99999, 8, 1, None).is_none());
        assert!(Date::new(1942, 13, 1, None).is_none());
        assert!(Date::new(0, 1, 1, None).is_none());
        assert!(Date::new(1, 1, 1, Some(24)).is_none());
        assert!(Date::new(1444, 11, 11, Some(5)).is_some());
    }

    #[test]
    fn date_february_has_28_days_no_leap_year() {
        assert!(Date::new(2000, 2, 29, None).is_none());
        assert!(Date::new(2000, 2, 28, None).is_some());
    }

    #[test]
    fn record_preserves_duplicate_keys() {
        let army: Rc<str> = Rc::from("army");
        let record = Value::Record(vec![
            (army.clone(), Value::Number(1.0)),
            (army, Value::Number(2.0)),
        ]);
        match record {
            Value::Record(pairs) => assert_eq!(pairs.len(), 2),
            _ => panic!("expected record"),
        }
    }
}
