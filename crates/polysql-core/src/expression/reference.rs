//! Columns, parameters, tables and joins.

use core::fmt;
use core::ops::BitOr;

use crate::context::{ColumnResolution, Context};
use crate::error::{Error, Result};
use crate::platform::Platform;
use crate::structure::ColumnRef;
use crate::token::TokenStream;
use crate::tokenizer::Tokenizable;
use crate::types::DataType;

use super::Expression;

/// Appends a dotted path, quoting each segment.
pub(crate) fn push_path<'a>(
    stream: &mut TokenStream,
    platform: &dyn Platform,
    segments: impl IntoIterator<Item = &'a str>,
) {
    for (index, segment) in segments.into_iter().enumerate() {
        if index > 0 {
            stream.text(".");
        }
        stream.identifier(platform.quote_identifier(segment));
    }
}

/// A column reference such as `name`, `u.name` or `main.users.name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    path: String,
}

impl Column {
    /// Creates a column reference from a dotted path.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// The dotted path as written.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The last path segment.
    #[must_use]
    pub fn name(&self) -> &str {
        self.path.rsplit('.').next().unwrap_or(&self.path)
    }

    /// Tokenizes the column and returns the structure it resolved to, if
    /// it is a table column.
    pub(crate) fn tokenize_resolved(
        &self,
        stream: &mut TokenStream,
        context: &mut Context,
    ) -> Result<Option<ColumnRef>> {
        let resolution = context.find_column(&self.path)?;
        let platform = context.platform();
        match resolution {
            ColumnResolution::Column { column, qualifier } => {
                for segment in &qualifier {
                    stream.identifier(platform.quote_identifier(segment)).text(".");
                }
                stream.identifier(platform.quote_identifier(column.name()));
                Ok(Some(column))
            }
            ColumnResolution::ResultColumn(name) => {
                stream.identifier(platform.quote_identifier(&name));
                Ok(None)
            }
        }
    }
}

impl Tokenizable for Column {
    fn tokenize(&self, stream: &mut TokenStream, context: &mut Context) -> Result<()> {
        self.tokenize_resolved(stream, context).map(|_| ())
    }
}

/// A named parameter. The placeholder text is chosen when the statement is
/// finalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Parameter key.
    pub name: String,
    /// Expected type of the bound value.
    pub data_type: DataType,
}

impl Parameter {
    /// Creates an untyped parameter.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: DataType::UNDEFINED,
        }
    }

    /// Sets the type hint.
    #[must_use]
    pub const fn typed(mut self, data_type: DataType) -> Self {
        self.data_type = data_type;
        self
    }
}

impl Tokenizable for Parameter {
    fn tokenize(&self, stream: &mut TokenStream, _context: &mut Context) -> Result<()> {
        stream.parameter(self.name.clone());
        Ok(())
    }
}

/// A table reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    path: String,
}

impl Table {
    /// Creates a table reference from a dotted path.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// The dotted path as written.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The last path segment.
    #[must_use]
    pub fn name(&self) -> &str {
        self.path.rsplit('.').next().unwrap_or(&self.path)
    }

    /// Binds an alias.
    #[must_use]
    pub fn alias(self, alias: impl Into<String>) -> TableReference {
        TableReference {
            table: self,
            alias: Some(alias.into()),
        }
    }
}

/// Aliases render bare; other tables render the dotted path of the
/// structure they resolve to.
impl Tokenizable for Table {
    fn tokenize(&self, stream: &mut TokenStream, context: &mut Context) -> Result<()> {
        let table = context.find_table(&self.path)?;
        let platform = context.platform().as_ref();
        if !self.path.contains('.') && context.is_alias(&self.path) {
            push_path(stream, platform, [self.path.as_str()]);
        } else {
            push_path(stream, platform, table.path().split('.'));
        }
        Ok(())
    }
}

/// A table in FROM / JOIN position, optionally aliased. Tokenizing it makes
/// the table and its alias visible in the current resolver scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableReference {
    /// The table.
    pub table: Table,
    /// Alias bound with `AS`.
    pub alias: Option<String>,
}

impl TableReference {
    /// Creates an unaliased reference.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            table: Table::new(path),
            alias: None,
        }
    }
}

impl From<Table> for TableReference {
    fn from(table: Table) -> Self {
        Self { table, alias: None }
    }
}

impl From<&str> for TableReference {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl Tokenizable for TableReference {
    fn tokenize(&self, stream: &mut TokenStream, context: &mut Context) -> Result<()> {
        let table = context.find_table(self.table.path())?;
        let path = table.path();
        context.register_table(table, self.alias.as_deref());
        let platform = context.platform();
        push_path(stream, platform.as_ref(), path.split('.'));
        if let Some(alias) = &self.alias {
            stream
                .space()
                .keyword("AS")
                .space()
                .identifier(platform.quote_identifier(alias));
        }
        Ok(())
    }
}

/// Join kind flags, combined with `|`. `LEFT | RIGHT` is a full join.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct JoinFlags(u8);

impl JoinFlags {
    /// Plain (inner) join.
    pub const NONE: Self = Self(0);
    /// NATURAL.
    pub const NATURAL: Self = Self(0x01);
    /// LEFT.
    pub const LEFT: Self = Self(0x02);
    /// RIGHT.
    pub const RIGHT: Self = Self(0x04);
    /// FULL, both sides.
    pub const FULL: Self = Self(0x02 | 0x04);
    /// CROSS.
    pub const CROSS: Self = Self(0x08);
    /// INNER.
    pub const INNER: Self = Self(0x10);
    /// OUTER.
    pub const OUTER: Self = Self(0x20);

    /// Returns true if every flag of `other` is set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    /// Raw bits.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }
}

impl BitOr for JoinFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl fmt::Debug for JoinFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(JoinFlags, &str); 6] = [
            (JoinFlags::NATURAL, "NATURAL"),
            (JoinFlags::LEFT, "LEFT"),
            (JoinFlags::RIGHT, "RIGHT"),
            (JoinFlags::CROSS, "CROSS"),
            (JoinFlags::INNER, "INNER"),
            (JoinFlags::OUTER, "OUTER"),
        ];
        let names: Vec<&str> = NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        if names.is_empty() {
            f.write_str("NONE")
        } else {
            f.write_str(&names.join(" | "))
        }
    }
}

/// A join clause: operator, joined table and ON constraints (AND-ed).
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    /// Join kind.
    pub operator: JoinFlags,
    /// Joined table.
    pub subject: TableReference,
    /// ON constraints.
    pub constraints: Vec<Expression>,
}

impl Join {
    /// Creates a join without constraints.
    #[must_use]
    pub fn new(operator: JoinFlags, subject: impl Into<TableReference>) -> Self {
        Self {
            operator,
            subject: subject.into(),
            constraints: Vec::new(),
        }
    }

    /// Adds an ON constraint.
    #[must_use]
    pub fn on(mut self, constraint: Expression) -> Self {
        self.constraints.push(constraint);
        self
    }
}

impl Tokenizable for Join {
    fn tokenize(&self, stream: &mut TokenStream, context: &mut Context) -> Result<()> {
        let platform = context.platform();
        let operator = platform.join_operator(self.operator)?;
        let unconstrained = self.operator.contains(JoinFlags::NATURAL)
            || self.operator.contains(JoinFlags::CROSS);
        if unconstrained && !self.constraints.is_empty() {
            return Err(Error::unsupported(
                platform.name(),
                format!("ON constraints on {operator}"),
            ));
        }
        stream.keyword(operator).space();
        self.subject.tokenize(stream, context)?;
        if let Some(condition) = Expression::all(self.constraints.iter().cloned()) {
            stream.space().keyword("ON").space();
            stream.expression(&condition, context)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::context::ResolverMode;
    use crate::platform::{GenericPlatform, MySqlPlatform};
    use crate::structure::{ColumnStructure, Datasource, NamespaceStructure, TableStructure};

    fn context() -> Context {
        let mut context = Context::new(Arc::new(GenericPlatform::new()));
        context.push_resolver_context(None);
        context
    }

    #[test]
    fn test_column_qualified_by_alias() {
        let mut context = context();
        let mut stream = TokenStream::new();
        TableReference::new("users")
            .table
            .alias("u")
            .tokenize(&mut stream, &mut context)
            .unwrap();
        assert_eq!(stream.to_string(), "users AS u");

        let mut stream = TokenStream::new();
        Column::new("name").tokenize(&mut stream, &mut context).unwrap();
        assert_eq!(stream.to_string(), "u.name");
    }

    #[test]
    fn test_table_renders_canonical_path() {
        let datasource = Datasource::new().namespace(NamespaceStructure::new("main").table(
            TableStructure::new("users").column(ColumnStructure::new("id", DataType::INTEGER)),
        ));
        let mut context = Context::with_structure(
            Arc::new(GenericPlatform::new()),
            Arc::new(datasource),
            ResolverMode::Strict,
        );
        context.push_resolver_context(None);

        let mut stream = TokenStream::new();
        TableReference::new("users")
            .table
            .alias("u")
            .tokenize(&mut stream, &mut context)
            .unwrap();
        assert_eq!(stream.to_string(), "main.users AS u");

        let mut stream = TokenStream::new();
        Table::new("users").tokenize(&mut stream, &mut context).unwrap();
        assert_eq!(stream.to_string(), "main.users");

        let mut stream = TokenStream::new();
        Table::new("u").tokenize(&mut stream, &mut context).unwrap();
        assert_eq!(stream.to_string(), "u");
    }

    #[test]
    fn test_unresolved_column_renders_bare() {
        let mut context = context();
        let mut stream = TokenStream::new();
        Column::new("column_name")
            .tokenize(&mut stream, &mut context)
            .unwrap();
        assert_eq!(stream.to_string(), "column_name");
    }

    #[test]
    fn test_quoting_per_platform() {
        let mut context = Context::new(Arc::new(MySqlPlatform::new(None)));
        context.push_resolver_context(None);
        let mut stream = TokenStream::new();
        Column::new("order.select")
            .tokenize(&mut stream, &mut context)
            .unwrap();
        assert_eq!(stream.to_string(), "`order`.`select`");
    }

    #[test]
    fn test_join_with_constraints() {
        let mut context = context();
        let mut stream = TokenStream::new();
        TableReference::new("users")
            .tokenize(&mut stream, &mut context)
            .unwrap();
        let join = Join::new(JoinFlags::LEFT, Table::new("orders").alias("o"))
            .on(Expression::column("o.user_id").eq(Expression::column("users.id")))
            .on(Expression::column("o.total").gt(Expression::literal(0)));
        let mut stream = TokenStream::new();
        join.tokenize(&mut stream, &mut context).unwrap();
        assert_eq!(
            stream.to_string(),
            "LEFT JOIN orders AS o ON o.user_id = users.id AND o.total > 0"
        );
    }

    #[test]
    fn test_natural_join_rejects_constraints() {
        let mut context = context();
        let join = Join::new(JoinFlags::NATURAL, "orders")
            .on(Expression::column("a").eq(Expression::column("b")));
        let mut stream = TokenStream::new();
        assert!(matches!(
            join.tokenize(&mut stream, &mut context),
            Err(Error::Unsupported { .. })
        ));
    }

    #[test]
    fn test_join_flags_debug() {
        assert_eq!(format!("{:?}", JoinFlags::FULL | JoinFlags::OUTER), "LEFT | RIGHT | OUTER");
        assert_eq!(format!("{:?}", JoinFlags::NONE), "NONE");
    }
}
