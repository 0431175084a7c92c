//! Compiled token patterns of the expression mini-language.

use std::sync::LazyLock;

use chrono::{Datelike, FixedOffset, NaiveDate, NaiveTime, Utc};
use regex::{Captures, Regex};
use tracing::debug;

use crate::error::EvaluationError;
use crate::types::Timestamp;

const WHITESPACE: &str = r"^\s+";
const IDENTIFIER: &str = r"^[a-zA-Z_][a-zA-Z0-9_.]*";
const PARAMETER: &str = r"^:([a-zA-Z_][a-zA-Z0-9_]*)";
const NUMBER: &str = r"^(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?";
const STRING: &str = r"^'((?:[^']|'')*)'";
const OPERATOR: &str = r"^(?:==|<>|!=|<=|<<|>>|>=|=|<|>|&|\||\^|-|\+|\*|/|%|!|~)";
const TIMESTAMP: &str = r"(?x)
    ^\#
    (?:
        (?P<date>[0-9]{4}-?[0-9]{2}-?[0-9]{2} | [0-9]{4}-[0-9]{2} | --[0-9]{2}-?[0-9]{2})
        (?: [T\x20] (?P<time>[0-9]{2}(?::[0-9]{2}(?::[0-9]{2}(?:\.[0-9]+)?)?)?) )?
      |
        T? (?P<clock>[0-9]{2}:[0-9]{2}(?::[0-9]{2}(?:\.[0-9]+)?)?)
    )
    (?P<zone>Z | [+-][0-9]{2}(?::?[0-9]{2})?)?
    \#";

static SHARED: LazyLock<Grammar> = LazyLock::new(Grammar::new);

/// The compiled lexical grammar.
///
/// Compiling the patterns is the only costly step of evaluation, so a
/// grammar is built once and lent to every [`Evaluator`](super::Evaluator)
/// that needs it. A grammar is immutable and can be shared across threads.
#[derive(Debug, Clone)]
pub struct Grammar {
    whitespace: Regex,
    identifier: Regex,
    parameter: Regex,
    number: Regex,
    string: Regex,
    operator: Regex,
    timestamp: Regex,
}

impl Grammar {
    /// Compiles the grammar.
    #[must_use]
    pub fn new() -> Self {
        let grammar = Self {
            whitespace: compile(WHITESPACE),
            identifier: compile(IDENTIFIER),
            parameter: compile(PARAMETER),
            number: compile(NUMBER),
            string: compile(STRING),
            operator: compile(OPERATOR),
            timestamp: compile(TIMESTAMP),
        };
        debug!("Compiled expression grammar");
        grammar
    }

    /// A process-wide grammar, compiled on first use.
    #[must_use]
    pub fn shared() -> &'static Self {
        &SHARED
    }

    /// Length of the leading whitespace of `input`.
    pub(crate) fn whitespace(&self, input: &str) -> usize {
        self.whitespace.find(input).map_or(0, |m| m.end())
    }

    /// Leading identifier or keyword, dots included.
    pub(crate) fn identifier<'i>(&self, input: &'i str) -> Option<&'i str> {
        self.identifier.find(input).map(|m| m.as_str())
    }

    /// Leading `:name` parameter: (consumed length, name).
    pub(crate) fn parameter<'i>(&self, input: &'i str) -> Option<(usize, &'i str)> {
        let captures = self.parameter.captures(input)?;
        Some((captures.get(0)?.end(), captures.get(1)?.as_str()))
    }

    /// Leading unsigned numeral.
    pub(crate) fn number<'i>(&self, input: &'i str) -> Option<&'i str> {
        self.number.find(input).map(|m| m.as_str())
    }

    /// Leading quoted string: (consumed length, unescaped content).
    pub(crate) fn string(&self, input: &str) -> Option<(usize, String)> {
        let captures = self.string.captures(input)?;
        let content = captures.get(1)?.as_str().replace("''", "'");
        Some((captures.get(0)?.end(), content))
    }

    /// Leading operator symbol, longest spelling first.
    pub(crate) fn operator<'i>(&self, input: &'i str) -> Option<&'i str> {
        self.operator.find(input).map(|m| m.as_str())
    }

    /// Leading `#...#` date/time literal: (consumed length, value).
    ///
    /// Returns `Ok(None)` when the input does not start with a well-formed
    /// literal, and an error when it is well-formed but names an impossible
    /// date or time.
    pub(crate) fn timestamp(
        &self,
        input: &str,
    ) -> Result<Option<(usize, Timestamp)>, EvaluationError> {
        let Some(captures) = self.timestamp.captures(input) else {
            return Ok(None);
        };
        let Some(whole) = captures.get(0) else {
            return Ok(None);
        };
        let literal = whole.as_str();
        let timestamp = timestamp_from(&captures, literal)?;
        Ok(Some((whole.end(), timestamp)))
    }
}

impl Default for Grammar {
    fn default() -> Self {
        Self::new()
    }
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("Invalid grammar pattern")
}

fn timestamp_from(captures: &Captures<'_>, literal: &str) -> Result<Timestamp, EvaluationError> {
    let invalid = || EvaluationError::new("invalid date/time literal", literal);

    let date = captures
        .name("date")
        .map(|m| parse_date(m.as_str()).ok_or_else(invalid))
        .transpose()?;
    let time = captures
        .name("time")
        .or_else(|| captures.name("clock"))
        .map(|m| parse_time(m.as_str()).ok_or_else(invalid))
        .transpose()?;
    let offset = captures
        .name("zone")
        .map(|m| parse_offset(m.as_str()).ok_or_else(invalid))
        .transpose()?;

    let mut timestamp = match (date, time) {
        (Some(date), Some(time)) => Timestamp::datetime(date.and_time(time)),
        (Some(date), None) => Timestamp::date(date),
        (None, Some(time)) => Timestamp::time(time),
        (None, None) => return Err(invalid()),
    };
    if let Some(offset) = offset {
        timestamp = timestamp.with_offset(offset);
    }
    Ok(timestamp)
}

/// `YYYY[-]MM[-]DD`, `YYYY-MM` (first of the month) or `--MM[-]DD`
/// (current year).
fn parse_date(text: &str) -> Option<NaiveDate> {
    if let Some(rest) = text.strip_prefix("--") {
        let digits: String = rest.chars().filter(char::is_ascii_digit).collect();
        let month = digits.get(..2)?.parse().ok()?;
        let day = digits.get(2..4)?.parse().ok()?;
        return NaiveDate::from_ymd_opt(Utc::now().year(), month, day);
    }
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    let year = digits.get(..4)?.parse().ok()?;
    let month = digits.get(4..6)?.parse().ok()?;
    let day = match digits.get(6..8) {
        Some(day) => day.parse().ok()?,
        None => 1,
    };
    NaiveDate::from_ymd_opt(year, month, day)
}

/// `hh[:mm[:ss[.fraction]]]`, fraction truncated to nanoseconds.
fn parse_time(text: &str) -> Option<NaiveTime> {
    let (clock, fraction) = match text.split_once('.') {
        Some((clock, fraction)) => (clock, Some(fraction)),
        None => (text, None),
    };
    let mut parts = clock.split(':');
    let hour = parts.next()?.parse().ok()?;
    let minute = parts.next().map_or(Some(0), |m| m.parse().ok())?;
    let second = parts.next().map_or(Some(0), |s| s.parse().ok())?;
    let nano = match fraction {
        Some(fraction) => {
            let mut digits: String = fraction.chars().take(9).collect();
            while digits.len() < 9 {
                digits.push('0');
            }
            digits.parse().ok()?
        }
        None => 0,
    };
    NaiveTime::from_hms_nano_opt(hour, minute, second, nano)
}

/// `Z` or `±hh[[:]mm]`.
fn parse_offset(text: &str) -> Option<FixedOffset> {
    if text == "Z" {
        return FixedOffset::east_opt(0);
    }
    let sign = if text.starts_with('-') { -1 } else { 1 };
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    let hours: i32 = digits.get(..2)?.parse().ok()?;
    let minutes: i32 = match digits.get(2..4) {
        Some(minutes) => minutes.parse().ok()?,
        None => 0,
    };
    if minutes >= 60 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

#[cfg(test)]
mod tests {
    use chrono::Timelike;

    use super::*;
    use crate::types::DataType;

    fn timestamp(input: &str) -> Timestamp {
        Grammar::shared().timestamp(input).unwrap().unwrap().1
    }

    #[test]
    fn test_token_patterns() {
        let grammar = Grammar::new();
        assert_eq!(grammar.identifier("users.name = 1"), Some("users.name"));
        assert_eq!(grammar.identifier("1abc"), None);
        assert_eq!(grammar.parameter(":p1 + 2"), Some((3, "p1")));
        assert_eq!(grammar.number("1.5e3)"), Some("1.5e3"));
        assert_eq!(grammar.number(".5"), Some(".5"));
        assert_eq!(grammar.string("'it''s' x"), Some((7, String::from("it's"))));
        assert_eq!(grammar.string("'open"), None);
        assert_eq!(grammar.operator("<>1"), Some("<>"));
        assert_eq!(grammar.operator("<<1"), Some("<<"));
        assert_eq!(grammar.operator("<=1"), Some("<="));
        assert_eq!(grammar.whitespace("  \tx"), 3);
    }

    #[test]
    fn test_date_forms() {
        let date = NaiveDate::from_ymd_opt(2010, 4, 5).unwrap();
        assert_eq!(timestamp("#2010-04-05#"), Timestamp::date(date));
        assert_eq!(timestamp("#20100405#"), Timestamp::date(date));
        assert_eq!(
            timestamp("#2010-04#"),
            Timestamp::date(NaiveDate::from_ymd_opt(2010, 4, 1).unwrap())
        );
        let partial = timestamp("#--12-24#");
        assert_eq!(partial.date.unwrap().year(), Utc::now().year());
        assert_eq!(partial.date.unwrap().day(), 24);
    }

    #[test]
    fn test_date_time_and_zone() {
        let value = timestamp("#2010-04-05T12:30:15.25+02:00#");
        assert_eq!(
            value.data_type(),
            DataType::TIMESTAMP | DataType::TIMEZONE
        );
        assert_eq!(value.time.unwrap().nanosecond(), 250_000_000);
        assert_eq!(value.offset.unwrap().local_minus_utc(), 7200);

        let utc = timestamp("#2010-04-05 08Z#");
        assert_eq!(utc.time, NaiveTime::from_hms_opt(8, 0, 0));
        assert_eq!(utc.offset.unwrap().local_minus_utc(), 0);

        let clock = timestamp("#T10:15#");
        assert_eq!(clock.data_type(), DataType::TIME);
    }

    #[test]
    fn test_impossible_date_is_an_error() {
        let err = Grammar::shared().timestamp("#2010-13-05#").unwrap_err();
        assert_eq!(err.fragment, "#2010-13-05#");
    }

    #[test]
    fn test_malformed_literal_does_not_match() {
        assert!(Grammar::shared().timestamp("#2010#").unwrap().is_none());
        assert!(Grammar::shared().timestamp("#2010-04-05").unwrap().is_none());
    }
}
