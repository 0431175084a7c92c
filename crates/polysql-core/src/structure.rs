//! Schema structure model consulted while resolving identifiers.
//!
//! A [`Datasource`] owns namespaces, which own tables, which own columns and
//! constraints. Every node exposes its name, its parent path and its dotted
//! path. Persistence of the model lives outside this crate.

use core::fmt;
use std::sync::Arc;

use crate::expression::Expression;
use crate::types::DataType;

/// Foreign key referential action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForeignKeyAction {
    /// No action.
    NoAction,
    /// Restrict deletion/update.
    Restrict,
    /// Cascade the operation.
    Cascade,
    /// Set to NULL.
    SetNull,
    /// Set to default value.
    SetDefault,
}

impl ForeignKeyAction {
    /// Returns the SQL representation of the action.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::NoAction => "NO ACTION",
            Self::Restrict => "RESTRICT",
            Self::Cascade => "CASCADE",
            Self::SetNull => "SET NULL",
            Self::SetDefault => "SET DEFAULT",
        }
    }
}

/// A table column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStructure {
    /// Column name.
    pub name: String,
    /// Semantic type.
    pub data_type: DataType,
    /// Maximum length of string / binary columns.
    pub length: Option<u32>,
    /// Fraction digits of decimals, or sub-second digits of times.
    pub scale: Option<u16>,
    /// Whether the column accepts NULL.
    pub nullable: bool,
    /// Whether the column auto-increments.
    pub auto_increment: bool,
    /// Default value expression.
    pub default: Option<Expression>,
}

impl ColumnStructure {
    /// Creates a nullable column.
    #[must_use]
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            length: None,
            scale: None,
            nullable: true,
            auto_increment: false,
            default: None,
        }
    }

    /// Sets the maximum length.
    #[must_use]
    pub const fn length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    /// Sets the scale.
    #[must_use]
    pub const fn scale(mut self, scale: u16) -> Self {
        self.scale = Some(scale);
        self
    }

    /// Sets the column as NOT NULL.
    #[must_use]
    pub const fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Sets the column as auto-incremented.
    #[must_use]
    pub const fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self.nullable = false;
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn default(mut self, expression: Expression) -> Self {
        self.default = Some(expression);
        self
    }
}

/// A table constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// Primary key.
    PrimaryKey {
        /// Optional constraint name.
        name: Option<String>,
        /// Column names.
        columns: Vec<String>,
    },
    /// Unique key.
    Unique {
        /// Optional constraint name.
        name: Option<String>,
        /// Column names.
        columns: Vec<String>,
    },
    /// Foreign key.
    ForeignKey {
        /// Optional constraint name.
        name: Option<String>,
        /// Columns in this table.
        columns: Vec<String>,
        /// Referenced table path.
        references_table: String,
        /// Referenced columns.
        references_columns: Vec<String>,
        /// ON DELETE action.
        on_delete: Option<ForeignKeyAction>,
        /// ON UPDATE action.
        on_update: Option<ForeignKeyAction>,
    },
}

impl Constraint {
    /// Constraint name, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::PrimaryKey { name, .. }
            | Self::Unique { name, .. }
            | Self::ForeignKey { name, .. } => name.as_deref(),
        }
    }

    /// Columns of this table covered by the constraint.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        match self {
            Self::PrimaryKey { columns, .. }
            | Self::Unique { columns, .. }
            | Self::ForeignKey { columns, .. } => columns,
        }
    }
}

/// A table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableStructure {
    name: String,
    namespace: Option<String>,
    columns: Vec<ColumnStructure>,
    constraints: Vec<Constraint>,
}

impl TableStructure {
    /// Creates a table outside of any namespace.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            columns: Vec::new(),
            constraints: Vec::new(),
        }
    }

    /// Places the table in a namespace.
    #[must_use]
    pub fn in_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Adds a column.
    #[must_use]
    pub fn column(mut self, column: ColumnStructure) -> Self {
        self.columns.push(column);
        self
    }

    /// Adds a constraint.
    #[must_use]
    pub fn constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Adds a column in place.
    pub fn push_column(&mut self, column: ColumnStructure) {
        self.columns.push(column);
    }

    /// Table name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the owning namespace.
    #[must_use]
    pub fn parent_path(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Dotted path (`namespace.table` or `table`).
    #[must_use]
    pub fn path(&self) -> String {
        match &self.namespace {
            Some(namespace) => format!("{namespace}.{}", self.name),
            None => self.name.clone(),
        }
    }

    /// Columns in declaration order.
    #[must_use]
    pub fn columns(&self) -> &[ColumnStructure] {
        &self.columns
    }

    /// Looks up a column by name.
    #[must_use]
    pub fn find_column(&self, name: &str) -> Option<&ColumnStructure> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Table constraints.
    #[must_use]
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// The primary key constraint, if any.
    #[must_use]
    pub fn primary_key(&self) -> Option<&Constraint> {
        self.constraints
            .iter()
            .find(|c| matches!(c, Constraint::PrimaryKey { .. }))
    }
}

/// A namespace (schema / database) holding tables.
#[derive(Debug, Clone, PartialEq)]
pub struct NamespaceStructure {
    name: String,
    tables: Vec<Arc<TableStructure>>,
}

impl NamespaceStructure {
    /// Creates an empty namespace.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: Vec::new(),
        }
    }

    /// Adds a table, re-parenting it under this namespace.
    #[must_use]
    pub fn table(mut self, mut table: TableStructure) -> Self {
        table.namespace = Some(self.name.clone());
        self.tables.push(Arc::new(table));
        self
    }

    /// Namespace name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Dotted path.
    #[must_use]
    pub fn path(&self) -> String {
        self.name.clone()
    }

    /// Tables in declaration order.
    #[must_use]
    pub fn tables(&self) -> &[Arc<TableStructure>] {
        &self.tables
    }

    /// Looks up a table by name.
    #[must_use]
    pub fn find_table(&self, name: &str) -> Option<Arc<TableStructure>> {
        self.tables.iter().find(|t| t.name == name).cloned()
    }
}

/// Read access to a structure tree.
pub trait StructureProvider: fmt::Debug + Send + Sync {
    /// Looks up a namespace.
    fn namespace(&self, name: &str) -> Option<Arc<NamespaceStructure>>;

    /// Looks up a table, in `namespace` if given, else in every namespace
    /// starting with the default one.
    fn table(&self, namespace: Option<&str>, name: &str) -> Option<Arc<TableStructure>>;
}

/// The root of a structure tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Datasource {
    namespaces: Vec<Arc<NamespaceStructure>>,
    default_namespace: Option<String>,
}

impl Datasource {
    /// Creates an empty datasource.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a namespace. The first namespace added becomes the default one.
    #[must_use]
    pub fn namespace(mut self, namespace: NamespaceStructure) -> Self {
        if self.default_namespace.is_none() {
            self.default_namespace = Some(namespace.name.clone());
        }
        self.namespaces.push(Arc::new(namespace));
        self
    }

    /// Overrides the default namespace.
    #[must_use]
    pub fn default_namespace(mut self, name: impl Into<String>) -> Self {
        self.default_namespace = Some(name.into());
        self
    }

    /// Namespaces in declaration order.
    #[must_use]
    pub fn namespaces(&self) -> &[Arc<NamespaceStructure>] {
        &self.namespaces
    }
}

impl StructureProvider for Datasource {
    fn namespace(&self, name: &str) -> Option<Arc<NamespaceStructure>> {
        self.namespaces.iter().find(|n| n.name == name).cloned()
    }

    fn table(&self, namespace: Option<&str>, name: &str) -> Option<Arc<TableStructure>> {
        if let Some(namespace) = namespace {
            return self.namespace(namespace)?.find_table(name);
        }
        let default = self
            .default_namespace
            .as_deref()
            .and_then(|n| self.namespace(n))
            .and_then(|n| n.find_table(name));
        default.or_else(|| self.namespaces.iter().find_map(|n| n.find_table(name)))
    }
}

/// A resolved table column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnRef {
    /// Owning table; `None` for virtual columns synthesized without a table.
    pub table: Option<Arc<TableStructure>>,
    /// The column.
    pub column: ColumnStructure,
}

impl ColumnRef {
    /// Column name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.column.name
    }

    /// Dotted path of the owning table.
    #[must_use]
    pub fn parent_path(&self) -> Option<String> {
        self.table.as_ref().map(|t| t.path())
    }

    /// Dotted path.
    #[must_use]
    pub fn path(&self) -> String {
        match &self.table {
            Some(table) => format!("{}.{}", table.path(), self.column.name),
            None => self.column.name.clone(),
        }
    }
}

/// A handle on a node of the structure tree.
#[derive(Debug, Clone, PartialEq)]
pub enum StructureRef {
    /// A namespace.
    Namespace(Arc<NamespaceStructure>),
    /// A table.
    Table(Arc<TableStructure>),
    /// A column.
    Column(ColumnRef),
}

impl StructureRef {
    /// Node name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Namespace(n) => n.name(),
            Self::Table(t) => t.name(),
            Self::Column(c) => c.name(),
        }
    }

    /// Dotted path.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Namespace(n) => n.path(),
            Self::Table(t) => t.path(),
            Self::Column(c) => c.path(),
        }
    }

    /// The table, if this is a table reference.
    #[must_use]
    pub const fn as_table(&self) -> Option<&Arc<TableStructure>> {
        match self {
            Self::Table(t) => Some(t),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Datasource {
        Datasource::new()
            .namespace(
                NamespaceStructure::new("main").table(
                    TableStructure::new("users")
                        .column(ColumnStructure::new("id", DataType::INTEGER).auto_increment())
                        .column(ColumnStructure::new("name", DataType::STRING).length(64)),
                ),
            )
            .namespace(
                NamespaceStructure::new("archive")
                    .table(TableStructure::new("users"))
                    .table(TableStructure::new("events")),
            )
    }

    #[test]
    fn test_paths() {
        let ds = sample();
        let users = ds.table(None, "users").unwrap();
        assert_eq!(users.path(), "main.users");
        assert_eq!(users.parent_path(), Some("main"));
        let column = ColumnRef {
            table: Some(users.clone()),
            column: users.find_column("name").unwrap().clone(),
        };
        assert_eq!(column.path(), "main.users.name");
    }

    #[test]
    fn test_default_namespace_wins() {
        let ds = sample();
        assert_eq!(ds.table(None, "users").unwrap().path(), "main.users");
        assert_eq!(
            ds.table(Some("archive"), "users").unwrap().path(),
            "archive.users"
        );
        assert_eq!(ds.table(None, "events").unwrap().path(), "archive.events");
        assert!(ds.table(Some("main"), "events").is_none());
    }

    #[test]
    fn test_auto_increment_implies_not_null() {
        let column = ColumnStructure::new("id", DataType::INTEGER).auto_increment();
        assert!(!column.nullable);
    }
}
