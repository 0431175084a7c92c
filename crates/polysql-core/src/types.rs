//! Semantic data types and literal values.

use core::fmt;
use core::ops::{BitAnd, BitOr, BitOrAssign};

use chrono::{
    DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike,
};
use serde::{Serialize, Serializer};

/// A bitset describing the semantic type of an expression.
///
/// Composite types are unions of the primitive flags: `NUMBER` is
/// `INTEGER | FLOAT` and `TIMESTAMP` is `DATE | TIME`. An expression whose
/// type cannot be determined without schema knowledge reports `UNDEFINED`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DataType(u16);

impl DataType {
    /// Type is not known.
    pub const UNDEFINED: Self = Self(0);
    /// SQL NULL.
    pub const NULL: Self = Self(0x01);
    /// Boolean.
    pub const BOOLEAN: Self = Self(0x02);
    /// Integral number.
    pub const INTEGER: Self = Self(0x04);
    /// Floating point / decimal number.
    pub const FLOAT: Self = Self(0x08);
    /// Any number.
    pub const NUMBER: Self = Self(0x04 | 0x08);
    /// Character string.
    pub const STRING: Self = Self(0x10);
    /// Byte string.
    pub const BINARY: Self = Self(0x20);
    /// Calendar date.
    pub const DATE: Self = Self(0x40);
    /// Time of day.
    pub const TIME: Self = Self(0x80);
    /// Date and time.
    pub const TIMESTAMP: Self = Self(0x40 | 0x80);
    /// Timezone-aware flag, combined with `TIME` or `TIMESTAMP`.
    pub const TIMEZONE: Self = Self(0x100);

    const NAMES: [(Self, &'static str); 9] = [
        (Self::NULL, "NULL"),
        (Self::BOOLEAN, "BOOLEAN"),
        (Self::INTEGER, "INTEGER"),
        (Self::FLOAT, "FLOAT"),
        (Self::STRING, "STRING"),
        (Self::BINARY, "BINARY"),
        (Self::DATE, "DATE"),
        (Self::TIME, "TIME"),
        (Self::TIMEZONE, "TIMEZONE"),
    ];

    /// Builds a type from raw bits.
    #[must_use]
    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    /// Raw bits.
    #[must_use]
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Returns true if no flag is set.
    #[must_use]
    pub const fn is_undefined(self) -> bool {
        self.0 == 0
    }

    /// Returns true if every flag of `other` is set in `self`.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    /// Returns true if at least one flag of `other` is set in `self`.
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Returns true if the type is exclusively numeric.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        self.0 != 0 && self.0 & !Self::NUMBER.0 == 0
    }

    /// Returns true if the type carries a date and/or time part.
    #[must_use]
    pub const fn is_temporal(self) -> bool {
        self.0 & Self::TIMESTAMP.0 != 0
    }
}

impl BitOr for DataType {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for DataType {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for DataType {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl fmt::Debug for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_undefined() {
            return f.write_str("UNDEFINED");
        }
        let names: Vec<&str> = Self::NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        f.write_str(&names.join(" | "))
    }
}

impl Serialize for DataType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u16(self.0)
    }
}

/// A date and/or time value with an optional UTC offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp {
    /// Calendar date.
    pub date: Option<NaiveDate>,
    /// Time of day.
    pub time: Option<NaiveTime>,
    /// Offset from UTC.
    pub offset: Option<FixedOffset>,
}

impl Timestamp {
    /// Creates a date-only value.
    #[must_use]
    pub const fn date(date: NaiveDate) -> Self {
        Self {
            date: Some(date),
            time: None,
            offset: None,
        }
    }

    /// Creates a time-only value.
    #[must_use]
    pub const fn time(time: NaiveTime) -> Self {
        Self {
            date: None,
            time: Some(time),
            offset: None,
        }
    }

    /// Creates a date and time value.
    #[must_use]
    pub const fn datetime(value: NaiveDateTime) -> Self {
        Self {
            date: Some(value.date()),
            time: Some(value.time()),
            offset: None,
        }
    }

    /// Attaches a UTC offset.
    #[must_use]
    pub const fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Semantic type of this value.
    #[must_use]
    pub fn data_type(&self) -> DataType {
        let mut data_type = DataType::UNDEFINED;
        if self.date.is_some() {
            data_type |= DataType::DATE;
        }
        if self.time.is_some() {
            data_type |= DataType::TIME;
        }
        if self.offset.is_some() {
            data_type |= DataType::TIMEZONE;
        }
        data_type
    }

    /// Returns true if the time part has a non-zero sub-second component.
    #[must_use]
    pub fn has_fraction(&self) -> bool {
        self.time.is_some_and(|t| t.nanosecond() != 0)
    }

    /// Converts a date-time with offset into UTC, dropping the offset.
    ///
    /// Values without both a date and an offset are returned unchanged.
    #[must_use]
    pub fn to_utc(&self) -> Self {
        match (self.date, self.offset) {
            (Some(date), Some(offset)) => {
                let local = date.and_time(self.time.unwrap_or_default());
                match offset.from_local_datetime(&local).single() {
                    Some(dt) => {
                        let utc = dt.naive_utc();
                        Self {
                            date: Some(utc.date()),
                            time: self.time.map(|_| utc.time()),
                            offset: None,
                        }
                    }
                    None => *self,
                }
            }
            _ => *self,
        }
    }

    /// Formats the value as ISO-8601 using `separator` between date and time.
    #[must_use]
    pub fn to_iso(&self, separator: char, with_offset: bool) -> String {
        let mut out = String::new();
        if let Some(date) = self.date {
            out.push_str(&format!(
                "{:04}-{:02}-{:02}",
                date.year(),
                date.month(),
                date.day()
            ));
        }
        if let Some(time) = self.time {
            if self.date.is_some() {
                out.push(separator);
            }
            out.push_str(&time.format("%H:%M:%S%.f").to_string());
        }
        if with_offset {
            if let Some(offset) = self.offset {
                out.push_str(&offset.to_string());
            }
        }
        out
    }
}

impl From<NaiveDate> for Timestamp {
    fn from(value: NaiveDate) -> Self {
        Self::date(value)
    }
}

impl From<NaiveTime> for Timestamp {
    fn from(value: NaiveTime) -> Self {
        Self::time(value)
    }
}

impl From<NaiveDateTime> for Timestamp {
    fn from(value: NaiveDateTime) -> Self {
        Self::datetime(value)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Timestamp {
    fn from(value: DateTime<Tz>) -> Self {
        let fixed = value.fixed_offset();
        Self::datetime(fixed.naive_local()).with_offset(*fixed.offset())
    }
}

/// A literal value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// NULL.
    Null,
    /// Boolean.
    Boolean(bool),
    /// Integer.
    Integer(i64),
    /// Float.
    Float(f64),
    /// Character string.
    String(String),
    /// Byte string.
    Binary(Vec<u8>),
    /// Date and/or time.
    Timestamp(Timestamp),
}

impl Value {
    /// Semantic type inferred from the value itself.
    #[must_use]
    pub fn data_type(&self) -> DataType {
        match self {
            Self::Null => DataType::NULL,
            Self::Boolean(_) => DataType::BOOLEAN,
            Self::Integer(_) => DataType::INTEGER,
            Self::Float(_) => DataType::FLOAT,
            Self::String(_) => DataType::STRING,
            Self::Binary(_) => DataType::BINARY,
            Self::Timestamp(ts) => ts.data_type(),
        }
    }

    /// Coerces a numeric string to an integer or a float.
    ///
    /// A string whose float value round-trips exactly to an integer becomes
    /// an integer (`"12.0"` is `12`), any other number stays a float.
    /// Returns `None` when the string is not numeric.
    #[must_use]
    pub fn from_numeric_str(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() || !text.bytes().any(|b| b.is_ascii_digit()) {
            return None;
        }
        if let Ok(integer) = text.parse::<i64>() {
            return Some(Self::Integer(integer));
        }
        let float = text.parse::<f64>().ok().filter(|f| f.is_finite())?;
        // Both bounds are exclusive: `i64::MAX as f64` rounds up to 2^63, and
        // text that rounds to -2^63 but missed the integer parse is out of range.
        #[allow(clippy::cast_precision_loss)]
        let in_range = float > i64::MIN as f64 && float < i64::MAX as f64;
        if !in_range || float.fract() != 0.0 {
            return Some(Self::Float(float));
        }
        #[allow(clippy::cast_possible_truncation)]
        let integer = float as i64;
        Some(Self::Integer(integer))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(String::from(value))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Self::Binary(value)
    }
}

impl From<Timestamp> for Value {
    fn from(value: Timestamp) -> Self {
        Self::Timestamp(value)
    }
}
