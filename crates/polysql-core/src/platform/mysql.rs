//! MySQL / MariaDB platform.

use super::{
    feature, numeric_type, temporal_type, FeatureSet, FunctionTranslation, KeywordId, Platform,
    ServerVersion,
};
use crate::error::{Error, Result};
use crate::expression::MetaFunction;
use crate::structure::ColumnStructure;
use crate::types::{DataType, Timestamp};

/// MySQL and MariaDB.
#[derive(Debug, Clone)]
pub struct MySqlPlatform {
    version: Option<ServerVersion>,
    features: FeatureSet,
}

impl MySqlPlatform {
    /// Creates the platform for a server version (`None` = newest).
    #[must_use]
    pub fn new(version: Option<ServerVersion>) -> Self {
        let features = FeatureSet::new()
            .with(feature::CREATE_TABLE_IF_NOT_EXISTS, true)
            .with(feature::CREATE_TABLE_TEMPORARY, true)
            .with(feature::CREATE_TABLE_INLINE_AUTOINCREMENT, false)
            .with(feature::DROP_TABLE_IF_EXISTS, true)
            .with(feature::DROP_TABLE_CASCADE, true)
            .with(feature::INSERT_DEFAULT_VALUES, false)
            .with(feature::INSERT_EMPTY_VALUES, true)
            .with(feature::JOIN_RIGHT, true)
            .with(feature::JOIN_FULL, false)
            .with(feature::JOIN_NATURAL, true)
            .with(feature::LITERAL_BOOLEAN_KEYWORDS, true)
            .with(feature::SELECT_LIMIT_OFFSET, true)
            .with(feature::STATEMENT_RETURNING, false);
        Self { version, features }
    }
}

impl Platform for MySqlPlatform {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn server_version(&self) -> Option<ServerVersion> {
        self.version
    }

    fn features(&self) -> &FeatureSet {
        &self.features
    }

    fn identifier_quote(&self) -> char {
        '`'
    }

    fn quote_string_value(&self, value: &str) -> String {
        format!("'{}'", value.replace('\\', "\\\\").replace('\'', "''"))
    }

    /// MySQL date/time literals carry no offset: values are converted to
    /// UTC first.
    fn serialize_timestamp(&self, value: &Timestamp) -> String {
        self.quote_string_value(&value.to_utc().to_iso(' ', false))
    }

    fn keyword(&self, id: KeywordId) -> &'static str {
        match id {
            KeywordId::AutoIncrement => "AUTO_INCREMENT",
            KeywordId::Null => "NULL",
            KeywordId::True => "TRUE",
            KeywordId::False => "FALSE",
            KeywordId::Default => "DEFAULT",
            KeywordId::CurrentTimestamp => "CURRENT_TIMESTAMP",
        }
    }

    fn meta_function(&self, function: MetaFunction) -> Result<FunctionTranslation> {
        Ok(match function {
            MetaFunction::CurrentTimestamp => FunctionTranslation::Keyword("CURRENT_TIMESTAMP"),
            MetaFunction::StringLength => FunctionTranslation::Call("CHAR_LENGTH"),
            MetaFunction::Lower => FunctionTranslation::Call("LOWER"),
            MetaFunction::Upper => FunctionTranslation::Call("UPPER"),
            MetaFunction::Substring => FunctionTranslation::Call("SUBSTRING"),
            MetaFunction::Random => FunctionTranslation::Call("RAND"),
            MetaFunction::Coalesce => FunctionTranslation::Call("COALESCE"),
        })
    }

    fn unbounded_limit(&self) -> Option<&'static str> {
        Some("18446744073709551615")
    }

    fn max_time_precision(&self) -> Option<u16> {
        Some(6)
    }

    fn column_type(&self, column: &ColumnStructure) -> Result<String> {
        let data_type = column.data_type;
        let sql = if data_type == DataType::BOOLEAN {
            String::from("BOOLEAN")
        } else if data_type == DataType::INTEGER {
            String::from(match column.length {
                Some(1) => "TINYINT",
                Some(2) => "SMALLINT",
                Some(l) if l > 4 => "BIGINT",
                _ => "INT",
            })
        } else if data_type == DataType::FLOAT {
            String::from("DOUBLE")
        } else if data_type == DataType::NUMBER {
            numeric_type("DECIMAL", column)
        } else if data_type == DataType::STRING {
            match column.length {
                Some(length) if length <= 16_383 => format!("VARCHAR({length})"),
                Some(length) if length > 16_777_215 => String::from("LONGTEXT"),
                Some(length) if length > 65_535 => String::from("MEDIUMTEXT"),
                _ => String::from("TEXT"),
            }
        } else if data_type == DataType::BINARY {
            match column.length {
                Some(length) if length <= 65_535 => format!("VARBINARY({length})"),
                Some(_) => String::from("LONGBLOB"),
                None => String::from("BLOB"),
            }
        } else if data_type.is_temporal() {
            let timestamp = if data_type.contains(DataType::TIMEZONE) {
                "TIMESTAMP"
            } else {
                "DATETIME"
            };
            temporal_type(self, column, timestamp, "")?
        } else {
            return Err(Error::unsupported(
                self.name(),
                format!("column type {data_type:?} of '{}'", column.name),
            ));
        };
        Ok(sql)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, NaiveDate, NaiveTime};

    use super::*;
    use crate::token::TokenStream;

    #[test]
    fn test_backtick_quoting() {
        let platform = MySqlPlatform::new(None);
        assert_eq!(platform.quote_identifier("select"), "`select`");
        assert_eq!(platform.quote_identifier("a`b c"), "`a``b c`");
        assert_eq!(platform.quote_identifier("users"), "users");
    }

    #[test]
    fn test_string_escapes_backslash() {
        let platform = MySqlPlatform::new(None);
        assert_eq!(platform.quote_string_value(r"C:\dir\'x'"), r"'C:\\dir\\''x'''");
    }

    #[test]
    fn test_timestamp_converted_to_utc() {
        let platform = MySqlPlatform::new(None);
        let value = Timestamp::datetime(
            NaiveDate::from_ymd_opt(2020, 6, 1)
                .unwrap()
                .and_time(NaiveTime::from_hms_opt(0, 30, 0).unwrap()),
        )
        .with_offset(FixedOffset::east_opt(2 * 3600).unwrap());
        assert_eq!(platform.serialize_timestamp(&value), "'2020-05-31 22:30:00'");
    }

    #[test]
    fn test_offset_without_limit() {
        let platform = MySqlPlatform::new(None);
        let mut stream = TokenStream::new();
        platform.limit(&mut stream, None, Some(5));
        assert_eq!(stream.to_string(), " LIMIT 18446744073709551615 OFFSET 5");
    }

    #[test]
    fn test_column_types() {
        let platform = MySqlPlatform::new(None);
        let text = ColumnStructure::new("body", DataType::STRING);
        assert_eq!(platform.column_type(&text).unwrap(), "TEXT");
        let name = ColumnStructure::new("name", DataType::STRING).length(64);
        assert_eq!(platform.column_type(&name).unwrap(), "VARCHAR(64)");
        let at = ColumnStructure::new("at", DataType::TIMESTAMP).scale(3);
        assert_eq!(platform.column_type(&at).unwrap(), "DATETIME(3)");
        let price = ColumnStructure::new("price", DataType::NUMBER).length(10).scale(2);
        assert_eq!(platform.column_type(&price).unwrap(), "DECIMAL(10, 2)");
    }
}
