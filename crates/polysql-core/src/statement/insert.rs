//! INSERT queries.

use std::sync::Arc;

use crate::context::Context;
use crate::error::{Result, StatementConstructionError};
use crate::expression::{push_path, Expression, Table};
use crate::platform::feature;
use crate::token::TokenStream;
use crate::tokenizer::Tokenizable;

use super::{tokenize_comment, tokenize_returning, SelectQuery, Statement, StatementType};

/// An INSERT query, fed by VALUES rows or by a SELECT.
///
/// Without columns and rows the platform's empty-row form is used:
/// `DEFAULT VALUES` or `() VALUES ()`.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertQuery {
    /// Leading comment.
    pub comment: Option<String>,
    /// Target table.
    pub table: Table,
    /// Target columns.
    pub columns: Vec<String>,
    /// VALUES rows, one expression per column.
    pub rows: Vec<Vec<Expression>>,
    /// Source query.
    pub select: Option<Box<SelectQuery>>,
    /// RETURNING list.
    pub returning: Vec<Expression>,
}

impl InsertQuery {
    /// Creates an INSERT into `table`.
    #[must_use]
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            comment: None,
            table: Table::new(table),
            columns: Vec::new(),
            rows: Vec::new(),
            select: None,
            returning: Vec::new(),
        }
    }

    /// Sets a leading comment.
    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Sets the target columns.
    #[must_use]
    pub fn columns<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Adds a VALUES row.
    #[must_use]
    pub fn values(mut self, row: Vec<Expression>) -> Self {
        self.rows.push(row);
        self
    }

    /// Adds a column and its value to a single-row insert.
    #[must_use]
    pub fn value(mut self, column: impl Into<String>, value: Expression) -> Self {
        self.columns.push(column.into());
        match self.rows.first_mut() {
            Some(row) => row.push(value),
            None => self.rows.push(vec![value]),
        }
        self
    }

    /// Inserts the rows of a query.
    #[must_use]
    pub fn select(mut self, query: SelectQuery) -> Self {
        self.select = Some(Box::new(query));
        self
    }

    /// Adds a RETURNING entry.
    #[must_use]
    pub fn returning(mut self, expression: Expression) -> Self {
        self.returning.push(expression);
        self
    }

    fn invalid(&self, message: impl Into<String>) -> StatementConstructionError {
        StatementConstructionError::new(message, Statement::Insert(self.clone()))
    }

    fn tokenize_columns(&self, stream: &mut TokenStream, context: &mut Context) -> Result<()> {
        if self.columns.is_empty() {
            return Ok(());
        }
        stream.space().text("(");
        for (index, column) in self.columns.iter().enumerate() {
            if column.contains('.') {
                return Err(self.invalid(format!("qualified target column '{column}'")).into());
            }
            context.find_column(column)?;
            if index > 0 {
                stream.text(",").space();
            }
            stream.identifier(context.platform().quote_identifier(column));
        }
        stream.text(")");
        Ok(())
    }

    fn tokenize_scoped(&self, stream: &mut TokenStream, context: &mut Context) -> Result<()> {
        context.set_statement_type(StatementType::Insert);
        let table = context.find_table(self.table.path())?;
        let path = table.path();
        context.register_target_table(table);
        let platform = Arc::clone(context.platform());

        tokenize_comment(stream, self.comment.as_deref());
        stream.keyword("INSERT").space().keyword("INTO").space();
        push_path(stream, platform.as_ref(), path.split('.'));

        if let Some(select) = &self.select {
            if !self.rows.is_empty() {
                return Err(self.invalid("INSERT with both VALUES and SELECT").into());
            }
            self.tokenize_columns(stream, context)?;
            stream.space();
            select.tokenize(stream, context)?;
        } else if self.columns.is_empty() && self.rows.iter().all(Vec::is_empty) {
            if platform.query_feature(feature::INSERT_DEFAULT_VALUES, false) {
                stream.space().keyword("DEFAULT VALUES");
            } else if platform.query_feature(feature::INSERT_EMPTY_VALUES, false) {
                stream.space().text("()").space().keyword("VALUES").space().text("()");
            } else {
                return Err(self.invalid("INSERT without values").into());
            }
        } else {
            if self.rows.is_empty() {
                return Err(self.invalid("INSERT columns without values").into());
            }
            if let Some(row) = self.rows.iter().find(|r| r.len() != self.columns.len()) {
                return Err(self
                    .invalid(format!(
                        "row has {} values for {} columns",
                        row.len(),
                        self.columns.len()
                    ))
                    .into());
            }
            self.tokenize_columns(stream, context)?;
            stream.space().keyword("VALUES").space();
            for (index, row) in self.rows.iter().enumerate() {
                if index > 0 {
                    stream.text(",").space();
                }
                stream.text("(");
                stream.expressions(row, ",", context)?;
                stream.text(")");
            }
        }
        tokenize_returning(stream, &self.returning, context)
    }
}

impl Tokenizable for InsertQuery {
    fn tokenize(&self, stream: &mut TokenStream, context: &mut Context) -> Result<()> {
        context.scoped(None, |context| self.tokenize_scoped(stream, context))
    }
}
