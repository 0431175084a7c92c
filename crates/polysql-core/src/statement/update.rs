//! UPDATE queries.

use std::sync::Arc;

use crate::context::Context;
use crate::error::{Result, StatementConstructionError};
use crate::expression::{push_path, Expression, Table};
use crate::token::TokenStream;
use crate::tokenizer::Tokenizable;

use super::{
    and_where, tokenize_comment, tokenize_returning, tokenize_where, Statement, StatementType,
};

/// An UPDATE query.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateQuery {
    /// Leading comment.
    pub comment: Option<String>,
    /// Target table.
    pub table: Table,
    /// `column = value` assignments, in order.
    pub assignments: Vec<(String, Expression)>,
    /// WHERE condition.
    pub where_clause: Option<Expression>,
    /// RETURNING list.
    pub returning: Vec<Expression>,
}

impl UpdateQuery {
    /// Creates an UPDATE of `table`.
    #[must_use]
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            comment: None,
            table: Table::new(table),
            assignments: Vec::new(),
            where_clause: None,
            returning: Vec::new(),
        }
    }

    /// Sets a leading comment.
    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Adds an assignment.
    #[must_use]
    pub fn set(mut self, column: impl Into<String>, value: Expression) -> Self {
        self.assignments.push((column.into(), value));
        self
    }

    /// Adds a WHERE condition, AND-ed with any previous one.
    #[must_use]
    pub fn where_clause(mut self, condition: Expression) -> Self {
        self.where_clause = Some(and_where(self.where_clause.take(), condition));
        self
    }

    /// Adds a RETURNING entry.
    #[must_use]
    pub fn returning(mut self, expression: Expression) -> Self {
        self.returning.push(expression);
        self
    }

    fn tokenize_scoped(&self, stream: &mut TokenStream, context: &mut Context) -> Result<()> {
        context.set_statement_type(StatementType::Update);
        if self.assignments.is_empty() {
            return Err(StatementConstructionError::new(
                "UPDATE without assignments",
                Statement::Update(self.clone()),
            )
            .into());
        }
        if let Some((column, _)) = self.assignments.iter().find(|(c, _)| c.contains('.')) {
            return Err(StatementConstructionError::new(
                format!("qualified target column '{column}'"),
                Statement::Update(self.clone()),
            )
            .into());
        }
        let table = context.find_table(self.table.path())?;
        let path = table.path();
        context.register_target_table(table);
        let platform = Arc::clone(context.platform());

        tokenize_comment(stream, self.comment.as_deref());
        stream.keyword("UPDATE").space();
        push_path(stream, platform.as_ref(), path.split('.'));
        stream.space().keyword("SET").space();
        for (index, (column, value)) in self.assignments.iter().enumerate() {
            context.find_column(column)?;
            if index > 0 {
                stream.text(",").space();
            }
            stream
                .identifier(platform.quote_identifier(column))
                .space()
                .text("=")
                .space();
            stream.expression(value, context)?;
        }
        tokenize_where(stream, self.where_clause.as_ref(), context)?;
        tokenize_returning(stream, &self.returning, context)
    }
}

impl Tokenizable for UpdateQuery {
    fn tokenize(&self, stream: &mut TokenStream, context: &mut Context) -> Result<()> {
        context.scoped(None, |context| self.tokenize_scoped(stream, context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::platform::{GenericPlatform, SqlitePlatform};

    fn render(query: &UpdateQuery) -> Result<String> {
        let mut context = Context::new(Arc::new(GenericPlatform::new()));
        let mut stream = TokenStream::new();
        query.tokenize(&mut stream, &mut context)?;
        Ok(stream.to_string())
    }

    #[test]
    fn test_update_renders_bare_columns() {
        let query = UpdateQuery::new("users")
            .set("name", Expression::parameter("name"))
            .set("visits", Expression::column("visits").binary(
                crate::expression::BinaryOperator::Add,
                Expression::literal(1),
            ))
            .where_clause(Expression::column("id").eq(Expression::parameter("id")));
        assert_eq!(
            render(&query).unwrap(),
            "UPDATE users SET name = :name, visits = visits + 1 WHERE id = :id"
        );
    }

    #[test]
    fn test_update_without_assignments() {
        let err = render(&UpdateQuery::new("users")).unwrap_err();
        assert!(matches!(err, Error::StatementConstruction(_)));
    }

    #[test]
    fn test_returning_on_sqlite() {
        let query = UpdateQuery::new("users")
            .set("name", Expression::literal("x"))
            .returning(Expression::column("id"));
        let mut context = Context::new(Arc::new(SqlitePlatform::new(None)));
        let mut stream = TokenStream::new();
        query.tokenize(&mut stream, &mut context).unwrap();
        assert_eq!(stream.to_string(), "UPDATE users SET name = 'x' RETURNING id");
    }
}
