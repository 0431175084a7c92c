//! PostgreSQL platform.

use super::{
    feature, numeric_type, temporal_type, FeatureSet, FunctionTranslation, KeywordId, Platform,
    ServerVersion,
};
use crate::error::{Error, Result};
use crate::expression::{BinaryOperator, MetaFunction};
use crate::statement::ParameterData;
use crate::structure::ColumnStructure;
use crate::types::DataType;

/// PostgreSQL.
#[derive(Debug, Clone)]
pub struct PostgreSqlPlatform {
    version: Option<ServerVersion>,
    features: FeatureSet,
}

impl PostgreSqlPlatform {
    /// Creates the platform for a server version (`None` = newest).
    #[must_use]
    pub fn new(version: Option<ServerVersion>) -> Self {
        let features = FeatureSet::new()
            .with(feature::CREATE_TABLE_IF_NOT_EXISTS, true)
            .with(feature::CREATE_TABLE_TEMPORARY, true)
            .with(feature::CREATE_TABLE_INLINE_AUTOINCREMENT, false)
            .with(feature::DROP_TABLE_IF_EXISTS, true)
            .with(feature::DROP_TABLE_CASCADE, true)
            .with(feature::INSERT_DEFAULT_VALUES, true)
            .with(feature::INSERT_EMPTY_VALUES, false)
            .with(feature::JOIN_RIGHT, true)
            .with(feature::JOIN_FULL, true)
            .with(feature::JOIN_NATURAL, true)
            .with(feature::LITERAL_BOOLEAN_KEYWORDS, true)
            .with(feature::SELECT_LIMIT_OFFSET, true)
            .with(feature::STATEMENT_RETURNING, true);
        Self { version, features }
    }

    /// Identity columns arrived in PostgreSQL 10; older servers use `SERIAL`.
    fn has_identity_columns(&self) -> bool {
        self.version.map_or(true, |v| v.at_least(10, 0))
    }
}

impl Platform for PostgreSqlPlatform {
    fn name(&self) -> &'static str {
        "postgresql"
    }

    fn server_version(&self) -> Option<ServerVersion> {
        self.version
    }

    fn features(&self) -> &FeatureSet {
        &self.features
    }

    fn quote_binary_data(&self, bytes: &[u8]) -> String {
        let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
        format!("'\\x{hex}'")
    }

    fn keyword(&self, id: KeywordId) -> &'static str {
        match id {
            KeywordId::AutoIncrement if !self.has_identity_columns() => "",
            KeywordId::AutoIncrement => "GENERATED BY DEFAULT AS IDENTITY",
            KeywordId::Null => "NULL",
            KeywordId::True => "TRUE",
            KeywordId::False => "FALSE",
            KeywordId::Default => "DEFAULT",
            KeywordId::CurrentTimestamp => "CURRENT_TIMESTAMP",
        }
    }

    fn binary_operator(&self, operator: BinaryOperator) -> Result<&'static str> {
        Ok(match operator {
            BinaryOperator::BitXor => "#",
            other => other.as_str(),
        })
    }

    fn meta_function(&self, function: MetaFunction) -> Result<FunctionTranslation> {
        Ok(match function {
            MetaFunction::CurrentTimestamp => FunctionTranslation::Keyword("CURRENT_TIMESTAMP"),
            MetaFunction::StringLength => FunctionTranslation::Call("CHAR_LENGTH"),
            MetaFunction::Lower => FunctionTranslation::Call("LOWER"),
            MetaFunction::Upper => FunctionTranslation::Call("UPPER"),
            MetaFunction::Substring => FunctionTranslation::Call("SUBSTRING"),
            MetaFunction::Random => FunctionTranslation::Call("RANDOM"),
            MetaFunction::Coalesce => FunctionTranslation::Call("COALESCE"),
        })
    }

    fn parameter_placeholder(&self, key: &str, assigned: &ParameterData) -> String {
        assigned
            .dbms_name_of(key)
            .map_or_else(|| format!("${}", assigned.distinct_count() + 1), String::from)
    }

    fn max_time_precision(&self) -> Option<u16> {
        Some(6)
    }

    fn column_type(&self, column: &ColumnStructure) -> Result<String> {
        let data_type = column.data_type;
        let sql = if column.auto_increment && !self.has_identity_columns() {
            String::from(if column.length.is_some_and(|l| l > 4) {
                "BIGSERIAL"
            } else {
                "SERIAL"
            })
        } else if data_type == DataType::BOOLEAN {
            String::from("BOOLEAN")
        } else if data_type == DataType::INTEGER {
            String::from(match column.length {
                Some(l) if l <= 2 => "SMALLINT",
                Some(l) if l > 4 => "BIGINT",
                _ => "INTEGER",
            })
        } else if data_type == DataType::FLOAT {
            String::from("DOUBLE PRECISION")
        } else if data_type == DataType::NUMBER {
            numeric_type("NUMERIC", column)
        } else if data_type == DataType::STRING {
            match column.length {
                Some(length) => format!("VARCHAR({length})"),
                None => String::from("TEXT"),
            }
        } else if data_type == DataType::BINARY {
            String::from("BYTEA")
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statement::ParameterOccurrence;

    #[test]
    fn test_numbered_placeholders_reuse_key() {
        let platform = PostgreSqlPlatform::new(None);
        let mut assigned = ParameterData::new();
        let first = platform.parameter_placeholder("a", &assigned);
        assigned.push(ParameterOccurrence::new(0, "a", first.clone()));
        let second = platform.parameter_placeholder("b", &assigned);
        assigned.push(ParameterOccurrence::new(1, "b", second.clone()));
        let again = platform.parameter_placeholder("a", &assigned);
        assert_eq!((first.as_str(), second.as_str(), again.as_str()), ("$1", "$2", "$1"));
    }

    #[test]
    fn test_xor_and_bytea() {
        let platform = PostgreSqlPlatform::new(None);
        assert_eq!(platform.binary_operator(BinaryOperator::BitXor).unwrap(), "#");
        assert_eq!(platform.quote_binary_data(&[0x0a, 0xff]), "'\\x0aff'");
    }

    #[test]
    fn test_serial_before_identity_columns() {
        let old = PostgreSqlPlatform::new(ServerVersion::parse("9.6"));
        let column = ColumnStructure::new("id", DataType::INTEGER).auto_increment();
        assert_eq!(old.column_type(&column).unwrap(), "SERIAL");
        assert_eq!(old.keyword(KeywordId::AutoIncrement), "");
        let new = PostgreSqlPlatform::new(None);
        assert_eq!(new.column_type(&column).unwrap(), "INTEGER");
    }
}
