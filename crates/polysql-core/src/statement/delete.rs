//! DELETE queries.

use std::sync::Arc;

use crate::context::Context;
use crate::error::Result;
use crate::expression::{push_path, Expression, Table};
use crate::token::TokenStream;
use crate::tokenizer::Tokenizable;

use super::{and_where, tokenize_comment, tokenize_returning, tokenize_where, StatementType};

/// A DELETE query. Without a WHERE condition every row is deleted.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteQuery {
    /// Leading comment.
    pub comment: Option<String>,
    /// Target table.
    pub table: Table,
    /// WHERE condition.
    pub where_clause: Option<Expression>,
    /// RETURNING list.
    pub returning: Vec<Expression>,
}

impl DeleteQuery {
    /// Creates a DELETE from `table`.
    #[must_use]
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            comment: None,
            table: Table::new(table),
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
}

impl Tokenizable for DeleteQuery {
    fn tokenize(&self, stream: &mut TokenStream, context: &mut Context) -> Result<()> {
        context.scoped(None, |context| {
            context.set_statement_type(StatementType::Delete);
            let table = context.find_table(self.table.path())?;
            let path = table.path();
            context.register_target_table(table);
            let platform = Arc::clone(context.platform());

            tokenize_comment(stream, self.comment.as_deref());
            stream.keyword("DELETE").space().keyword("FROM").space();
            push_path(stream, platform.as_ref(), path.split('.'));
            tokenize_where(stream, self.where_clause.as_ref(), context)?;
            tokenize_returning(stream, &self.returning, context)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ResolverMode;
    use crate::error::Error;
    use crate::platform::GenericPlatform;
    use crate::structure::{ColumnStructure, Datasource, NamespaceStructure, TableStructure};
    use crate::types::DataType;

    #[test]
    fn test_delete_with_where() {
        let query = DeleteQuery::new("sessions")
            .where_clause(Expression::column("expires").lt(Expression::parameter("now")))
            .where_clause(Expression::column("pinned").eq(Expression::literal(false)));
        let mut context = Context::new(Arc::new(GenericPlatform::new()));
        let mut stream = TokenStream::new();
        query.tokenize(&mut stream, &mut context).unwrap();
        assert_eq!(
            stream.to_string(),
            "DELETE FROM sessions WHERE expires < :now AND pinned = FALSE"
        );
    }

    #[test]
    fn test_strict_unknown_column() {
        let datasource = Datasource::new().namespace(NamespaceStructure::new("main").table(
            TableStructure::new("sessions").column(ColumnStructure::new("id", DataType::INTEGER)),
        ));
        let mut context = Context::with_structure(
            Arc::new(GenericPlatform::new()),
            Arc::new(datasource),
            ResolverMode::Strict,
        );
        let query = DeleteQuery::new("sessions")
            .where_clause(Expression::column("owner").eq(Expression::literal(1)));
        let mut stream = TokenStream::new();
        let err = query.tokenize(&mut stream, &mut context).unwrap_err();
        assert!(matches!(err, Error::Resolution(_)));
        assert_eq!(context.depth(), 0);
    }
}
