//! SQLite platform.

use super::{feature, FeatureSet, FunctionTranslation, KeywordId, Platform, ServerVersion};
use crate::error::{Error, Result};
use crate::expression::{BinaryOperator, MetaFunction};
use crate::statement::ParameterData;
use crate::structure::ColumnStructure;
use crate::types::{DataType, Timestamp};

/// SQLite.
#[derive(Debug, Clone)]
pub struct SqlitePlatform {
    version: Option<ServerVersion>,
    features: FeatureSet,
}

impl SqlitePlatform {
    /// Creates the platform for a library version (`None` = newest).
    #[must_use]
    pub fn new(version: Option<ServerVersion>) -> Self {
        let since = |major, minor| version.map_or(true, |v| v.at_least(major, minor));
        let features = FeatureSet::new()
            .with(feature::CREATE_TABLE_IF_NOT_EXISTS, true)
            .with(feature::CREATE_TABLE_TEMPORARY, true)
            .with(feature::CREATE_TABLE_INLINE_AUTOINCREMENT, true)
            .with(feature::DROP_TABLE_IF_EXISTS, true)
            .with(feature::DROP_TABLE_CASCADE, false)
            .with(feature::INSERT_DEFAULT_VALUES, true)
            .with(feature::INSERT_EMPTY_VALUES, false)
            .with(feature::JOIN_RIGHT, since(3, 39))
            .with(feature::JOIN_FULL, since(3, 39))
            .with(feature::JOIN_NATURAL, true)
            .with(feature::LITERAL_BOOLEAN_KEYWORDS, since(3, 23))
            .with(feature::SELECT_LIMIT_OFFSET, true)
            .with(feature::STATEMENT_RETURNING, since(3, 35));
        Self { version, features }
    }
}

impl Platform for SqlitePlatform {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn server_version(&self) -> Option<ServerVersion> {
        self.version
    }

    fn features(&self) -> &FeatureSet {
        &self.features
    }

    fn serialize_timestamp(&self, value: &Timestamp) -> String {
        self.quote_string_value(&value.to_iso(' ', true))
    }

    fn keyword(&self, id: KeywordId) -> &'static str {
        let keywords = self.query_feature(feature::LITERAL_BOOLEAN_KEYWORDS, true);
        match id {
            KeywordId::AutoIncrement => "AUTOINCREMENT",
            KeywordId::Null => "NULL",
            KeywordId::True if keywords => "TRUE",
            KeywordId::True => "1",
            KeywordId::False if keywords => "FALSE",
            KeywordId::False => "0",
            KeywordId::Default => "DEFAULT",
            KeywordId::CurrentTimestamp => "CURRENT_TIMESTAMP",
        }
    }

    fn binary_operator(&self, operator: BinaryOperator) -> Result<&'static str> {
        match operator {
            BinaryOperator::BitXor => Err(Error::unsupported(self.name(), "bitwise XOR")),
            other => Ok(other.as_str()),
        }
    }

    fn meta_function(&self, function: MetaFunction) -> Result<FunctionTranslation> {
        Ok(match function {
            MetaFunction::CurrentTimestamp => FunctionTranslation::Keyword("CURRENT_TIMESTAMP"),
            MetaFunction::StringLength => FunctionTranslation::Call("LENGTH"),
            MetaFunction::Lower => FunctionTranslation::Call("LOWER"),
            MetaFunction::Upper => FunctionTranslation::Call("UPPER"),
            MetaFunction::Substring => FunctionTranslation::Call("SUBSTR"),
            MetaFunction::Random => FunctionTranslation::Call("RANDOM"),
            MetaFunction::Coalesce => FunctionTranslation::Call("COALESCE"),
        })
    }

    fn parameter_placeholder(&self, key: &str, _assigned: &ParameterData) -> String {
        format!(":{key}")
    }

    fn unbounded_limit(&self) -> Option<&'static str> {
        Some("-1")
    }

    fn max_time_precision(&self) -> Option<u16> {
        None
    }

    /// Type names follow SQLite's affinity rules.
    fn column_type(&self, column: &ColumnStructure) -> Result<String> {
        let data_type = column.data_type;
        let sql = if data_type == DataType::BOOLEAN || data_type == DataType::INTEGER {
            "INTEGER"
        } else if data_type == DataType::FLOAT {
            "REAL"
        } else if data_type == DataType::NUMBER {
            "NUMERIC"
        } else if data_type == DataType::STRING || data_type.is_temporal() {
            "TEXT"
        } else if data_type == DataType::BINARY {
            "BLOB"
        } else {
            return Err(Error::unsupported(
                self.name(),
                format!("column type {data_type:?} of '{}'", column.name),
            ));
        };
        Ok(sql.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::JoinFlags;

    #[test]
    fn test_version_dependent_features() {
        let old = SqlitePlatform::new(ServerVersion::parse("3.22.0"));
        assert!(!old.query_feature(feature::STATEMENT_RETURNING, true));
        assert!(!old.query_feature(feature::JOIN_RIGHT, true));
        assert_eq!(old.keyword(KeywordId::True), "1");
        assert!(old.join_operator(JoinFlags::RIGHT).is_err());

        let new = SqlitePlatform::new(None);
        assert!(new.query_feature(feature::STATEMENT_RETURNING, false));
        assert_eq!(new.keyword(KeywordId::True), "TRUE");
        assert_eq!(new.join_operator(JoinFlags::RIGHT).unwrap(), "RIGHT JOIN");
    }

    #[test]
    fn test_xor_is_unsupported() {
        let platform = SqlitePlatform::new(None);
        assert!(matches!(
            platform.binary_operator(BinaryOperator::BitXor),
            Err(Error::Unsupported {
                platform: "sqlite",
                ..
            })
        ));
    }

    #[test]
    fn test_named_placeholders() {
        let platform = SqlitePlatform::new(None);
        assert_eq!(
            platform.parameter_placeholder("user_id", &ParameterData::new()),
            ":user_id"
        );
    }
}
