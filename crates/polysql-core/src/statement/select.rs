//! SELECT queries.

use std::sync::Arc;

use crate::context::Context;
use crate::error::{Result, StatementConstructionError};
use crate::expression::{DataTyped, Expression, Join, TableReference};
use crate::structure::ColumnRef;
use crate::token::TokenStream;
use crate::tokenizer::Tokenizable;
use crate::types::DataType;

use super::{and_where, tokenize_comment, tokenize_where, ResultColumn, Statement, StatementType};

/// A select-list entry.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectColumn {
    /// Selected expression.
    pub expression: Expression,
    /// Output alias.
    pub alias: Option<String>,
}

/// An ORDER BY term.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    /// Sort key.
    pub expression: Expression,
    /// Descending order.
    pub descending: bool,
}

/// A SELECT query.
///
/// ```
/// use polysql_core::expression::{Expression, Table};
/// use polysql_core::statement::SelectQuery;
///
/// let query = SelectQuery::new()
///     .column(Expression::column("name"))
///     .from(Table::new("users").alias("u"))
///     .where_clause(Expression::column("active").eq(Expression::literal(true)));
/// assert_eq!(query.columns.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectQuery {
    /// Leading comment.
    pub comment: Option<String>,
    /// SELECT DISTINCT.
    pub distinct: bool,
    /// Select list; empty selects `*`.
    pub columns: Vec<SelectColumn>,
    /// FROM table.
    pub from: Option<TableReference>,
    /// Joins, in order.
    pub joins: Vec<Join>,
    /// WHERE condition.
    pub where_clause: Option<Expression>,
    /// GROUP BY keys.
    pub group_by: Vec<Expression>,
    /// HAVING condition.
    pub having: Option<Expression>,
    /// ORDER BY terms.
    pub order_by: Vec<OrderBy>,
    /// Row limit.
    pub limit: Option<u64>,
    /// Rows skipped.
    pub offset: Option<u64>,
}

impl SelectQuery {
    /// Creates an empty query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a leading comment.
    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Sets DISTINCT.
    #[must_use]
    pub const fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Adds a select-list entry.
    #[must_use]
    pub fn column(mut self, expression: impl Into<Expression>) -> Self {
        self.columns.push(SelectColumn {
            expression: expression.into(),
            alias: None,
        });
        self
    }

    /// Adds an aliased select-list entry.
    #[must_use]
    pub fn column_as(mut self, expression: impl Into<Expression>, alias: impl Into<String>) -> Self {
        self.columns.push(SelectColumn {
            expression: expression.into(),
            alias: Some(alias.into()),
        });
        self
    }

    /// Adds several select-list entries.
    #[must_use]
    pub fn columns(mut self, expressions: impl IntoIterator<Item = Expression>) -> Self {
        self.columns
            .extend(expressions.into_iter().map(|expression| SelectColumn {
                expression,
                alias: None,
            }));
        self
    }

    /// Sets the FROM table.
    #[must_use]
    pub fn from(mut self, table: impl Into<TableReference>) -> Self {
        self.from = Some(table.into());
        self
    }

    /// Adds a join.
    #[must_use]
    pub fn join(mut self, join: Join) -> Self {
        self.joins.push(join);
        self
    }

    /// Adds a WHERE condition, AND-ed with any previous one.
    #[must_use]
    pub fn where_clause(mut self, condition: Expression) -> Self {
        self.where_clause = Some(and_where(self.where_clause.take(), condition));
        self
    }

    /// Adds a GROUP BY key.
    #[must_use]
    pub fn group_by(mut self, key: Expression) -> Self {
        self.group_by.push(key);
        self
    }

    /// Adds a HAVING condition, AND-ed with any previous one.
    #[must_use]
    pub fn having(mut self, condition: Expression) -> Self {
        self.having = Some(and_where(self.having.take(), condition));
        self
    }

    /// Adds an ascending ORDER BY term.
    #[must_use]
    pub fn order_by(mut self, expression: Expression) -> Self {
        self.order_by.push(OrderBy {
            expression,
            descending: false,
        });
        self
    }

    /// Adds a descending ORDER BY term.
    #[must_use]
    pub fn order_by_desc(mut self, expression: Expression) -> Self {
        self.order_by.push(OrderBy {
            expression,
            descending: true,
        });
        self
    }

    /// Limits the number of rows.
    #[must_use]
    pub const fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Skips rows.
    #[must_use]
    pub const fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    fn tokenize_scoped(&self, stream: &mut TokenStream, context: &mut Context) -> Result<()> {
        context.set_statement_type(StatementType::Select);
        if self.from.is_none() && !self.joins.is_empty() {
            return Err(StatementConstructionError::new(
                "JOIN without FROM",
                Statement::Select(self.clone()),
            )
            .into());
        }

        tokenize_comment(stream, self.comment.as_deref());
        stream.keyword("SELECT");
        if self.distinct {
            stream.space().keyword("DISTINCT");
        }
        // The select list is resolved once FROM and JOIN tables are in
        // scope, then spliced in here.
        let columns_at = stream.len();

        if let Some(from) = &self.from {
            stream.space().keyword("FROM").space();
            from.tokenize(stream, context)?;
            for join in &self.joins {
                stream.space();
                join.tokenize(stream, context)?;
            }
        }

        let columns = self.tokenize_columns(context)?;
        stream.stream_at(columns, columns_at);

        tokenize_where(stream, self.where_clause.as_ref(), context)?;
        if !self.group_by.is_empty() {
            stream.space().keyword("GROUP BY").space();
            stream.expressions(&self.group_by, ",", context)?;
        }
        if let Some(having) = &self.having {
            stream.space().keyword("HAVING").space();
            stream.expression(having, context)?;
        }
        if !self.order_by.is_empty() {
            stream.space().keyword("ORDER BY").space();
            for (index, term) in self.order_by.iter().enumerate() {
                if index > 0 {
                    stream.text(",").space();
                }
                stream.expression(&term.expression, context)?;
                if term.descending {
                    stream.space().keyword("DESC");
                }
            }
        }
        context.platform().limit(stream, self.limit, self.offset);
        Ok(())
    }

    fn tokenize_columns(&self, context: &mut Context) -> Result<TokenStream> {
        let mut stream = TokenStream::new();
        stream.space();
        if self.columns.is_empty() {
            stream.text("*");
            describe_wildcard(context, 0);
            return Ok(stream);
        }
        let mut index = 0;
        for (position, column) in self.columns.iter().enumerate() {
            if position > 0 {
                stream.text(",").space();
            }
            index = tokenize_column(&mut stream, column, index, context)?;
        }
        Ok(stream)
    }
}

/// Tokenizes one select-list entry and records its metadata. Returns the
/// index of the next result column.
fn tokenize_column(
    stream: &mut TokenStream,
    column: &SelectColumn,
    index: usize,
    context: &mut Context,
) -> Result<usize> {
    let mut rendered = TokenStream::new();
    let source = match &column.expression {
        Expression::Column(reference) => reference.tokenize_resolved(&mut rendered, context)?,
        Expression::Wildcard if column.alias.is_none() => {
            stream.text("*");
            return Ok(describe_wildcard(context, index));
        }
        expression => {
            rendered.expression(expression, context)?;
            None
        }
    };

    let name = match (&column.alias, &column.expression, &source) {
        (Some(alias), _, _) => alias.clone(),
        (None, _, Some(source)) => source.name().to_string(),
        (None, Expression::Column(reference), None) => reference.name().to_string(),
        (None, _, None) => rendered.to_string(),
    };
    let data_type = source
        .as_ref()
        .map_or_else(|| column.expression.data_type(), |s| s.column.data_type);
    let mut result = ResultColumn::new(index, name, data_type);
    if let Some(source) = source {
        result = result.source(source);
    }
    context.set_result_column(result);

    stream.stream(rendered);
    if let Some(alias) = &column.alias {
        stream
            .space()
            .keyword("AS")
            .space()
            .identifier(context.platform().quote_identifier(alias));
        context.register_result_alias(alias);
    }
    Ok(index + 1)
}

/// Records the known columns of every table in scope for a `*` entry.
fn describe_wildcard(context: &mut Context, start: usize) -> usize {
    let mut index = start;
    for table in context.tables_in_scope() {
        for column in table.columns() {
            let source = ColumnRef {
                table: Some(Arc::clone(&table)),
                column: column.clone(),
            };
            context.set_result_column(
                ResultColumn::new(index, column.name.clone(), column.data_type).source(source),
            );
            index += 1;
        }
    }
    index
}

/// Type of the single selected column; `UNDEFINED` otherwise.
impl DataTyped for SelectQuery {
    fn data_type(&self) -> DataType {
        match self.columns.as_slice() {
            [column] => column.expression.data_type(),
            _ => DataType::UNDEFINED,
        }
    }
}

/// Renders the query inside its own resolver scope.
impl Tokenizable for SelectQuery {
    fn tokenize(&self, stream: &mut TokenStream, context: &mut Context) -> Result<()> {
        context.scoped(None, |context| self.tokenize_scoped(stream, context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::{JoinFlags, Table};
    use crate::platform::{GenericPlatform, MySqlPlatform, Platform, SqlitePlatform};

    fn render_on(platform: Arc<dyn Platform>, query: &SelectQuery) -> Result<String> {
        let mut context = Context::new(platform);
        let mut stream = TokenStream::new();
        query.tokenize(&mut stream, &mut context)?;
        assert_eq!(context.depth(), 0);
        Ok(stream.to_string())
    }

    fn render(query: &SelectQuery) -> String {
        render_on(Arc::new(GenericPlatform::new()), query).unwrap()
    }

    #[test]
    fn test_columns_qualified_after_from() {
        let query = SelectQuery::new()
            .column(Expression::column("name"))
            .from(Table::new("users").alias("u"))
            .where_clause(Expression::column("id").eq(Expression::parameter("id")));
        assert_eq!(
            render(&query),
            "SELECT u.name FROM users AS u WHERE u.id = :id"
        );
    }

    #[test]
    fn test_wildcard_without_columns() {
        let query = SelectQuery::new().from("users");
        assert_eq!(render(&query), "SELECT * FROM users");
    }

    #[test]
    fn test_all_clauses() {
        let query = SelectQuery::new()
            .distinct()
            .column(Expression::column("country"))
            .column_as(
                Expression::function("COUNT", vec![Expression::Wildcard]),
                "total",
            )
            .from("users")
            .group_by(Expression::column("country"))
            .having(
                Expression::function("COUNT", vec![Expression::Wildcard])
                    .gt(Expression::literal(10)),
            )
            .order_by_desc(Expression::column("total"))
            .limit(5);
        assert_eq!(
            render(&query),
            "SELECT DISTINCT users.country, COUNT(*) AS total FROM users \
             GROUP BY users.country HAVING COUNT(*) > 10 ORDER BY total DESC \
             FETCH FIRST 5 ROWS ONLY"
        );
    }

    #[test]
    fn test_limit_per_platform() {
        let query = SelectQuery::new().from("t").offset(10);
        assert_eq!(
            render_on(Arc::new(MySqlPlatform::new(None)), &query).unwrap(),
            "SELECT * FROM t LIMIT 18446744073709551615 OFFSET 10"
        );
        assert_eq!(
            render_on(Arc::new(SqlitePlatform::new(None)), &query).unwrap(),
            "SELECT * FROM t LIMIT -1 OFFSET 10"
        );
    }

    #[test]
    fn test_join_without_from_is_rejected() {
        let query = SelectQuery::new().join(Join::new(JoinFlags::LEFT, "orders"));
        let err = render_on(Arc::new(GenericPlatform::new()), &query).unwrap_err();
        assert!(matches!(err, crate::error::Error::StatementConstruction(_)));
    }

    #[test]
    fn test_sub_select_in_list() {
        let inner = SelectQuery::new()
            .column(Expression::column("user_id"))
            .from("orders");
        let query = SelectQuery::new()
            .column(Expression::column("name"))
            .from("users")
            .where_clause(Expression::column("id").in_list(vec![inner.into()]));
        assert_eq!(
            render(&query),
            "SELECT users.name FROM users WHERE users.id IN \
             (SELECT orders.user_id FROM orders)"
        );
    }

    #[test]
    fn test_comment() {
        let query = SelectQuery::new().comment("report").column(Expression::literal(1));
        assert_eq!(render(&query), "/* report */ SELECT 1");
    }

    #[test]
    fn test_single_column_type() {
        let query = SelectQuery::new().column(Expression::literal(1));
        assert_eq!(query.data_type(), DataType::INTEGER);
        assert_eq!(SelectQuery::new().data_type(), DataType::UNDEFINED);
    }
}
