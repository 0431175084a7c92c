//! Target platforms.
//!
//! Every decision that differs between database systems goes through a
//! [`Platform`]: identifier and string quoting, literal serialization,
//! keyword spelling, join operators, parameter placeholders, column types
//! and capability queries. Statement and expression nodes never hard-code
//! dialect text; they ask the platform reached through the build context.
//!
//! Platforms are immutable once constructed and can be shared across
//! concurrent builds behind an `Arc`.

mod config;
mod generic;
mod mysql;
mod postgresql;
mod sqlite;

use core::fmt;
use std::collections::BTreeMap;

use serde::Serialize;

pub use config::{DialectKind, PlatformConfig};
pub use generic::GenericPlatform;
pub use mysql::MySqlPlatform;
pub use postgresql::PostgreSqlPlatform;
pub use sqlite::SqlitePlatform;

use crate::error::{Error, Result};
use crate::expression::{BinaryOperator, JoinFlags, MetaFunction, UnaryOperator};
use crate::statement::ParameterData;
use crate::structure::ColumnStructure;
use crate::token::{Token, TokenStream, TokenType};
use crate::types::{DataType, Timestamp, Value};

/// Capability paths understood by [`Platform::query_feature`].
pub mod feature {
    /// `CREATE TABLE IF NOT EXISTS`.
    pub const CREATE_TABLE_IF_NOT_EXISTS: &str = "create.table.if-not-exists";
    /// `CREATE TEMPORARY TABLE`.
    pub const CREATE_TABLE_TEMPORARY: &str = "create.table.temporary";
    /// `AUTOINCREMENT` must be spelled inline with `PRIMARY KEY`.
    pub const CREATE_TABLE_INLINE_AUTOINCREMENT: &str = "create.table.inline-autoincrement";
    /// `DROP TABLE IF EXISTS`.
    pub const DROP_TABLE_IF_EXISTS: &str = "drop.table.if-exists";
    /// `DROP TABLE ... CASCADE`.
    pub const DROP_TABLE_CASCADE: &str = "drop.table.cascade";
    /// `INSERT INTO t DEFAULT VALUES`.
    pub const INSERT_DEFAULT_VALUES: &str = "insert.default-values";
    /// `INSERT INTO t () VALUES ()`.
    pub const INSERT_EMPTY_VALUES: &str = "insert.empty-values";
    /// `RIGHT JOIN`.
    pub const JOIN_RIGHT: &str = "join.right";
    /// `FULL JOIN`.
    pub const JOIN_FULL: &str = "join.full";
    /// `NATURAL JOIN`.
    pub const JOIN_NATURAL: &str = "join.natural";
    /// `TRUE` / `FALSE` keywords.
    pub const LITERAL_BOOLEAN_KEYWORDS: &str = "literal.boolean-keywords";
    /// `LIMIT n OFFSET m` instead of `OFFSET m ROWS FETCH FIRST n ROWS ONLY`.
    pub const SELECT_LIMIT_OFFSET: &str = "select.limit-offset";
    /// `RETURNING` clause on INSERT / UPDATE / DELETE.
    pub const STATEMENT_RETURNING: &str = "statement.returning";
}

/// Keywords whose spelling depends on the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordId {
    /// Auto-increment column attribute.
    AutoIncrement,
    /// NULL.
    Null,
    /// TRUE.
    True,
    /// FALSE.
    False,
    /// DEFAULT.
    Default,
    /// CURRENT_TIMESTAMP.
    CurrentTimestamp,
}

/// How a [`MetaFunction`] is spelled on a platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionTranslation {
    /// A bare keyword, rendered without parentheses or arguments.
    Keyword(&'static str),
    /// A function call with this name.
    Call(&'static str),
}

/// A database server version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ServerVersion {
    /// Major version.
    pub major: u32,
    /// Minor version.
    pub minor: u32,
    /// Patch version.
    pub patch: u32,
}

impl ServerVersion {
    /// Creates a version.
    #[must_use]
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parses `major[.minor[.patch]]`, ignoring any leading text before the
    /// first digit and any suffix after the numeric part
    /// (`"PostgreSQL 15.2"`, `"8.0.32-0ubuntu0.22.04.2"`).
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let start = text.find(|c: char| c.is_ascii_digit())?;
        let rest = &text[start..];
        let end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let mut parts = rest[..end]
            .split('.')
            .filter(|p| !p.is_empty())
            .map(str::parse::<u32>);
        let major = parts.next()?.ok()?;
        let minor = parts.next().and_then(std::result::Result::ok).unwrap_or(0);
        let patch = parts.next().and_then(std::result::Result::ok).unwrap_or(0);
        Some(Self::new(major, minor, patch))
    }

    /// Returns true if this version is at least `major.minor`.
    #[must_use]
    pub const fn at_least(&self, major: u32, minor: u32) -> bool {
        self.major > major || (self.major == major && self.minor >= minor)
    }
}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// A fixed map of capability paths to availability.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FeatureSet(BTreeMap<&'static str, bool>);

impl FeatureSet {
    /// Creates an empty feature set.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Sets a feature.
    #[must_use]
    pub fn with(mut self, path: &'static str, enabled: bool) -> Self {
        self.0.insert(path, enabled);
        self
    }

    /// Looks up a feature.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<bool> {
        self.0.get(path).copied()
    }

    /// Iterates over all declared features.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, bool)> + '_ {
        self.0.iter().map(|(path, enabled)| (*path, *enabled))
    }
}

/// Words that force identifier quoting on every platform.
const RESERVED_WORDS: &[&str] = &[
    "ALL",
    "AND",
    "AS",
    "ASC",
    "BETWEEN",
    "BY",
    "CASE",
    "CHECK",
    "COLUMN",
    "CONSTRAINT",
    "CREATE",
    "CROSS",
    "CURRENT_DATE",
    "CURRENT_TIME",
    "CURRENT_TIMESTAMP",
    "DEFAULT",
    "DELETE",
    "DESC",
    "DISTINCT",
    "DROP",
    "ELSE",
    "END",
    "EXISTS",
    "FALSE",
    "FETCH",
    "FOREIGN",
    "FROM",
    "FULL",
    "GROUP",
    "HAVING",
    "IN",
    "INDEX",
    "INNER",
    "INSERT",
    "INTO",
    "IS",
    "JOIN",
    "KEY",
    "LEFT",
    "LIKE",
    "LIMIT",
    "NATURAL",
    "NOT",
    "NULL",
    "OFFSET",
    "ON",
    "OR",
    "ORDER",
    "OUTER",
    "PRIMARY",
    "REFERENCES",
    "RETURNING",
    "RIGHT",
    "SELECT",
    "SET",
    "TABLE",
    "THEN",
    "TO",
    "TRUE",
    "UNION",
    "UNIQUE",
    "UPDATE",
    "USER",
    "USING",
    "VALUES",
    "WHEN",
    "WHERE",
    "WITH",
];

/// Returns true if `name` can be written without quotes: it matches
/// `[A-Za-z_][A-Za-z0-9_]*` and is not a reserved word.
#[must_use]
pub fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let starts_ok = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    starts_ok
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !RESERVED_WORDS.iter().any(|w| w.eq_ignore_ascii_case(name))
}

/// Renders a float so that it always reads back as a float.
pub(crate) fn format_float(platform: &'static str, value: f64) -> Result<String> {
    if !value.is_finite() {
        return Err(Error::unsupported(platform, format!("float literal {value}")));
    }
    let mut text = value.to_string();
    if !text.contains(['.', 'e', 'E']) {
        text.push_str(".0");
    }
    Ok(text)
}

fn hex(bytes: &[u8]) -> String {
    use fmt::Write;

    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut out, b| {
        let _ = write!(out, "{b:02X}");
        out
    })
}

/// One database system's SQL rules.
///
/// The provided methods implement ANSI SQL. Implementations override what
/// their system spells differently.
pub trait Platform: fmt::Debug + Send + Sync {
    /// Platform name (`generic`, `postgresql`, `mysql`, `sqlite`).
    fn name(&self) -> &'static str;

    /// Server version the capabilities were computed for, if known.
    fn server_version(&self) -> Option<ServerVersion> {
        None
    }

    /// Capabilities of this platform.
    fn features(&self) -> &FeatureSet;

    /// Probes a capability, returning `default` for unknown paths.
    fn query_feature(&self, path: &str, default: bool) -> bool {
        self.features().get(path).unwrap_or(default)
    }

    /// Character used to quote identifiers.
    fn identifier_quote(&self) -> char {
        '"'
    }

    /// Quotes an identifier if it is not a plain identifier.
    fn quote_identifier(&self, name: &str) -> String {
        if is_plain_identifier(name) {
            return name.to_string();
        }
        let quote = self.identifier_quote();
        let escaped = name.replace(quote, &format!("{quote}{quote}"));
        format!("{quote}{escaped}{quote}")
    }

    /// Quotes a string literal.
    fn quote_string_value(&self, value: &str) -> String {
        format!("'{}'", value.replace('\'', "''"))
    }

    /// Renders a byte string literal.
    fn quote_binary_data(&self, bytes: &[u8]) -> String {
        format!("X'{}'", hex(bytes))
    }

    /// Renders a date/time literal.
    fn serialize_timestamp(&self, value: &Timestamp) -> String {
        let zoned = value.offset.is_some() && value.time.is_some();
        let prefix = match (value.date.is_some(), zoned) {
            (true, false) if value.time.is_none() => "DATE",
            (true, false) => "TIMESTAMP",
            (true, true) => "TIMESTAMP WITH TIME ZONE",
            (false, false) => "TIME",
            (false, true) => "TIME WITH TIME ZONE",
        };
        format!(
            "{prefix} {}",
            self.quote_string_value(&value.to_iso(' ', zoned))
        )
    }

    /// Renders a value as a literal token, using `hint` to coerce between
    /// compatible representations.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unsupported`] for values with no literal form
    /// (non-finite floats).
    fn serialize_column_data(&self, hint: DataType, value: &Value) -> Result<Token> {
        let token = match value {
            Value::Null => Token::new(self.keyword(KeywordId::Null), TokenType::Keyword),
            Value::Boolean(b) if hint.contains(DataType::STRING) => {
                Token::new(self.quote_string_value(&b.to_string()), TokenType::Literal)
            }
            Value::Boolean(b) => Token::new(
                self.keyword(if *b { KeywordId::True } else { KeywordId::False }),
                TokenType::Keyword,
            ),
            Value::Integer(i) if hint == DataType::BOOLEAN => Token::new(
                self.keyword(if *i == 0 {
                    KeywordId::False
                } else {
                    KeywordId::True
                }),
                TokenType::Keyword,
            ),
            Value::Integer(i) if hint == DataType::STRING => {
                Token::new(self.quote_string_value(&i.to_string()), TokenType::Literal)
            }
            Value::Integer(i) => Token::new(i.to_string(), TokenType::Literal),
            Value::Float(f) => Token::new(format_float(self.name(), *f)?, TokenType::Literal),
            Value::String(s) if hint == DataType::BINARY => {
                Token::new(self.quote_binary_data(s.as_bytes()), TokenType::Literal)
            }
            Value::String(s) => Token::new(self.quote_string_value(s), TokenType::Literal),
            Value::Binary(bytes) => Token::new(self.quote_binary_data(bytes), TokenType::Literal),
            Value::Timestamp(ts) => Token::new(self.serialize_timestamp(ts), TokenType::Literal),
        };
        Ok(token)
    }

    /// Spells a keyword.
    fn keyword(&self, id: KeywordId) -> &'static str {
        match id {
            KeywordId::AutoIncrement => "GENERATED BY DEFAULT AS IDENTITY",
            KeywordId::Null => "NULL",
            KeywordId::True => "TRUE",
            KeywordId::False => "FALSE",
            KeywordId::Default => "DEFAULT",
            KeywordId::CurrentTimestamp => "CURRENT_TIMESTAMP",
        }
    }

    /// Spells a binary operator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unsupported`] if the platform has no such operator.
    fn binary_operator(&self, operator: BinaryOperator) -> Result<&'static str> {
        Ok(operator.as_str())
    }

    /// Spells a unary operator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unsupported`] if the platform has no such operator.
    fn unary_operator(&self, operator: UnaryOperator) -> Result<&'static str> {
        Ok(operator.as_str())
    }

    /// Renders a join operator such as `LEFT OUTER JOIN`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unsupported`] for contradictory flags or join kinds
    /// the platform lacks.
    fn join_operator(&self, flags: JoinFlags) -> Result<String> {
        let unsupported = |what: &str| Err(Error::unsupported(self.name(), what.to_string()));
        if flags.contains(JoinFlags::CROSS) {
            if flags != JoinFlags::CROSS {
                return unsupported("CROSS JOIN combined with other join flags");
            }
            return Ok(String::from("CROSS JOIN"));
        }
        let left = flags.contains(JoinFlags::LEFT);
        let right = flags.contains(JoinFlags::RIGHT);
        if flags.contains(JoinFlags::INNER) && (left || right) {
            return unsupported("INNER JOIN combined with an outer side");
        }
        let mut words: Vec<&str> = Vec::new();
        if flags.contains(JoinFlags::NATURAL) {
            if !self.query_feature(feature::JOIN_NATURAL, true) {
                return unsupported("NATURAL JOIN");
            }
            words.push("NATURAL");
        }
        match (left, right) {
            (true, true) => {
                if !self.query_feature(feature::JOIN_FULL, true) {
                    return unsupported("FULL JOIN");
                }
                words.push("FULL");
            }
            (true, false) => words.push("LEFT"),
            (false, true) => {
                if !self.query_feature(feature::JOIN_RIGHT, true) {
                    return unsupported("RIGHT JOIN");
                }
                words.push("RIGHT");
            }
            (false, false) => {
                if flags.contains(JoinFlags::OUTER) {
                    return unsupported("OUTER JOIN without a side");
                }
                if flags.contains(JoinFlags::INNER) || !flags.contains(JoinFlags::NATURAL) {
                    words.push("INNER");
                }
            }
        }
        if flags.contains(JoinFlags::OUTER) {
            words.push("OUTER");
        }
        words.push("JOIN");
        Ok(words.join(" "))
    }

    /// Translates a portable function.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unsupported`] if the platform has no equivalent.
    fn meta_function(&self, function: MetaFunction) -> Result<FunctionTranslation> {
        Ok(match function {
            MetaFunction::CurrentTimestamp => {
                FunctionTranslation::Keyword(self.keyword(KeywordId::CurrentTimestamp))
            }
            MetaFunction::StringLength => FunctionTranslation::Call("CHAR_LENGTH"),
            MetaFunction::Lower => FunctionTranslation::Call("LOWER"),
            MetaFunction::Upper => FunctionTranslation::Call("UPPER"),
            MetaFunction::Substring => FunctionTranslation::Call("SUBSTRING"),
            MetaFunction::Coalesce => FunctionTranslation::Call("COALESCE"),
            MetaFunction::Random => {
                return Err(Error::unsupported(self.name(), "random number function"))
            }
        })
    }

    /// Renders the placeholder for a parameter occurrence. `assigned`
    /// holds every occurrence already emitted in the statement.
    fn parameter_placeholder(&self, key: &str, assigned: &ParameterData) -> String {
        let _ = (key, assigned);
        String::from("?")
    }

    /// Value written for `LIMIT` when only an offset is requested, for
    /// platforms whose `OFFSET` requires a `LIMIT`.
    fn unbounded_limit(&self) -> Option<&'static str> {
        None
    }

    /// Appends the row limiting clause.
    fn limit(&self, stream: &mut TokenStream, limit: Option<u64>, offset: Option<u64>) {
        if limit.is_none() && offset.is_none() {
            return;
        }
        if self.query_feature(feature::SELECT_LIMIT_OFFSET, false) {
            let limit = limit
                .map(|n| n.to_string())
                .or_else(|| offset.and(self.unbounded_limit()).map(String::from));
            if let Some(limit) = limit {
                stream.space().keyword("LIMIT").space().literal(limit);
            }
            if let Some(offset) = offset {
                stream.space().keyword("OFFSET").space().literal(offset.to_string());
            }
        } else {
            if let Some(offset) = offset {
                stream
                    .space()
                    .keyword("OFFSET")
                    .space()
                    .literal(offset.to_string())
                    .space()
                    .keyword("ROWS");
            }
            if let Some(limit) = limit {
                stream
                    .space()
                    .keyword("FETCH FIRST")
                    .space()
                    .literal(limit.to_string())
                    .space()
                    .keyword("ROWS ONLY");
            }
        }
    }

    /// Largest fractional-seconds precision of time types, `None` if the
    /// platform ignores it.
    fn max_time_precision(&self) -> Option<u16> {
        Some(9)
    }

    /// Renders the SQL type of a column.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unsupported`] if the column's semantic type has no
    /// counterpart on the platform or needs a precision it cannot express.
    fn column_type(&self, column: &ColumnStructure) -> Result<String> {
        let data_type = column.data_type;
        let sized = |base: &str| match column.length {
            Some(length) => format!("{base}({length})"),
            None => base.to_string(),
        };
        let sql = if data_type == DataType::BOOLEAN {
            String::from("BOOLEAN")
        } else if data_type == DataType::INTEGER {
            String::from(if column.length.is_some_and(|l| l > 4) {
                "BIGINT"
            } else {
                "INTEGER"
            })
        } else if data_type == DataType::FLOAT {
            String::from("DOUBLE PRECISION")
        } else if data_type == DataType::NUMBER {
            numeric_type("NUMERIC", column)
        } else if data_type == DataType::STRING {
            match column.length {
                Some(length) => format!("VARCHAR({length})"),
                None => String::from("CLOB"),
            }
        } else if data_type == DataType::BINARY {
            match column.length {
                Some(_) => sized("VARBINARY"),
                None => String::from("BLOB"),
            }
        } else if data_type.is_temporal() {
            temporal_type(self, column, "TIMESTAMP", " WITH TIME ZONE")?
        } else {
            return Err(Error::unsupported(
                self.name(),
                format!("column type {data_type:?} of '{}'", column.name),
            ));
        };
        Ok(sql)
    }
}

/// `BASE(length, scale)` rendering shared by decimal types.
pub(crate) fn numeric_type(base: &str, column: &ColumnStructure) -> String {
    match (column.length, column.scale) {
        (Some(length), Some(scale)) => format!("{base}({length}, {scale})"),
        (Some(length), None) => format!("{base}({length})"),
        _ => base.to_string(),
    }
}

/// Date/time type rendering shared by the platforms. `timestamp` is the
/// name of the date-and-time type, `zone_suffix` marks timezone awareness
/// (empty if the platform cannot express it).
pub(crate) fn temporal_type<P: Platform + ?Sized>(
    platform: &P,
    column: &ColumnStructure,
    timestamp: &str,
    zone_suffix: &str,
) -> Result<String> {
    let data_type = column.data_type;
    let base = if data_type.contains(DataType::TIMESTAMP) {
        timestamp
    } else if data_type.contains(DataType::DATE) {
        return Ok(String::from("DATE"));
    } else {
        "TIME"
    };
    let mut sql = base.to_string();
    if let Some(scale) = column.scale {
        match platform.max_time_precision() {
            Some(max) if scale > max => {
                return Err(Error::unsupported(
                    platform.name(),
                    format!(
                        "fractional seconds precision {scale} on '{}' (maximum {max})",
                        column.name
                    ),
                ));
            }
            Some(_) => sql.push_str(&format!("({scale})")),
            None => {}
        }
    }
    if data_type.contains(DataType::TIMEZONE) {
        sql.push_str(zone_suffix);
    }
    Ok(sql)
}
