//! Platform selection.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{
    GenericPlatform, MySqlPlatform, Platform, PostgreSqlPlatform, ServerVersion, SqlitePlatform,
};

/// Supported database systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectKind {
    /// ANSI SQL.
    #[default]
    Generic,
    /// PostgreSQL.
    #[serde(alias = "postgres", alias = "pgsql")]
    PostgreSql,
    /// MySQL / MariaDB.
    #[serde(alias = "mariadb")]
    MySql,
    /// SQLite.
    #[serde(alias = "sqlite3")]
    Sqlite,
}

impl DialectKind {
    /// Canonical lowercase name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Generic => "generic",
            Self::PostgreSql => "postgresql",
            Self::MySql => "mysql",
            Self::Sqlite => "sqlite",
        }
    }

    /// Parses a dialect name, accepting the same aliases as deserialization.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "generic" | "ansi" => Some(Self::Generic),
            "postgresql" | "postgres" | "pgsql" => Some(Self::PostgreSql),
            "mysql" | "mariadb" => Some(Self::MySql),
            "sqlite" | "sqlite3" => Some(Self::Sqlite),
            _ => None,
        }
    }
}

/// Which platform to build and for which server version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    /// Target database system.
    pub dialect: DialectKind,
    /// Detected server version, e.g. `"3.35.4"`. Unknown versions assume
    /// the newest capabilities.
    pub server_version: Option<String>,
}

impl PlatformConfig {
    /// Creates a configuration for a dialect with an unknown server version.
    #[must_use]
    pub const fn new(dialect: DialectKind) -> Self {
        Self {
            dialect,
            server_version: None,
        }
    }

    /// Sets the server version.
    #[must_use]
    pub fn server_version(mut self, version: impl Into<String>) -> Self {
        self.server_version = Some(version.into());
        self
    }

    /// Builds the platform.
    #[must_use]
    pub fn build(&self) -> Arc<dyn Platform> {
        let version = self.server_version.as_deref().and_then(ServerVersion::parse);
        match self.dialect {
            DialectKind::Generic => Arc::new(GenericPlatform::new()),
            DialectKind::PostgreSql => Arc::new(PostgreSqlPlatform::new(version)),
            DialectKind::MySql => Arc::new(MySqlPlatform::new(version)),
            DialectKind::Sqlite => Arc::new(SqlitePlatform::new(version)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_config() {
        let config: PlatformConfig =
            serde_json::from_str(r#"{"dialect": "sqlite", "server_version": "3.30.1"}"#).unwrap();
        assert_eq!(config.dialect, DialectKind::Sqlite);
        let platform = config.build();
        assert_eq!(platform.name(), "sqlite");
        assert!(!platform.query_feature(crate::platform::feature::STATEMENT_RETURNING, true));
    }

    #[test]
    fn test_dialect_aliases() {
        let config: PlatformConfig = serde_json::from_str(r#"{"dialect": "postgres"}"#).unwrap();
        assert_eq!(config.dialect, DialectKind::PostgreSql);
        assert_eq!(DialectKind::from_name("MariaDB"), Some(DialectKind::MySql));
        assert_eq!(DialectKind::from_name("oracle"), None);
        assert_eq!(PlatformConfig::default().build().name(), "generic");
    }
}
