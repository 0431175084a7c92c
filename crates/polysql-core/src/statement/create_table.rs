//! CREATE TABLE queries.

use std::sync::Arc;

use tracing::debug;

use crate::context::Context;
use crate::error::{Error, Result, StatementConstructionError};
use crate::expression::push_path;
use crate::platform::{feature, KeywordId, Platform};
use crate::structure::{ColumnStructure, Constraint, TableStructure};
use crate::token::TokenStream;
use crate::tokenizer::Tokenizable;

use super::{tokenize_comment, Statement, StatementType};

/// A CREATE TABLE query built from a table structure: its columns and
/// constraints become the table definition.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTableQuery {
    /// Leading comment.
    pub comment: Option<String>,
    /// Table definition.
    pub table: TableStructure,
    /// CREATE TEMPORARY TABLE.
    pub temporary: bool,
    /// IF NOT EXISTS; dropped on platforms without it.
    pub if_not_exists: bool,
}

impl CreateTableQuery {
    /// Creates the query for `table`.
    #[must_use]
    pub const fn new(table: TableStructure) -> Self {
        Self {
            comment: None,
            table,
            temporary: false,
            if_not_exists: false,
        }
    }

    /// Sets a leading comment.
    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Creates a temporary table.
    #[must_use]
    pub const fn temporary(mut self) -> Self {
        self.temporary = true;
        self
    }

    /// Adds IF NOT EXISTS.
    #[must_use]
    pub const fn if_not_exists(mut self) -> Self {
        self.if_not_exists = true;
        self
    }

    fn invalid(&self, message: impl Into<String>) -> Error {
        StatementConstructionError::new(message, Statement::CreateTable(self.clone())).into()
    }

    /// Column that must carry `PRIMARY KEY AUTOINCREMENT` inline, if the
    /// platform spells auto-increment that way.
    fn inline_primary_key(&self, platform: &dyn Platform) -> Result<Option<&ColumnStructure>> {
        if !platform.query_feature(feature::CREATE_TABLE_INLINE_AUTOINCREMENT, false) {
            return Ok(None);
        }
        let mut auto = self.table.columns().iter().filter(|c| c.auto_increment);
        let Some(column) = auto.next() else {
            return Ok(None);
        };
        if auto.next().is_some() {
            return Err(self.invalid("more than one auto-increment column"));
        }
        match self.table.primary_key() {
            Some(key) if key.columns() != [column.name.clone()] => Err(self.invalid(format!(
                "auto-increment column {} must be the only primary key column",
                column.name
            ))),
            _ => Ok(Some(column)),
        }
    }

    fn tokenize_column(
        stream: &mut TokenStream,
        column: &ColumnStructure,
        inline_primary_key: bool,
        context: &mut Context,
    ) -> Result<()> {
        let platform = Arc::clone(context.platform());
        stream
            .identifier(platform.quote_identifier(&column.name))
            .space()
            .keyword(platform.column_type(column)?);
        if inline_primary_key {
            stream
                .space()
                .keyword("PRIMARY KEY")
                .space()
                .keyword(platform.keyword(KeywordId::AutoIncrement));
            return Ok(());
        }
        if !column.nullable {
            stream.space().keyword("NOT NULL");
        }
        if let Some(default) = &column.default {
            stream.space().keyword("DEFAULT").space();
            stream.expression(default, context)?;
        }
        if column.auto_increment {
            let keyword = platform.keyword(KeywordId::AutoIncrement);
            if !keyword.is_empty() {
                stream.space().keyword(keyword);
            }
        }
        Ok(())
    }

    fn tokenize_scoped(&self, stream: &mut TokenStream, context: &mut Context) -> Result<()> {
        context.set_statement_type(StatementType::CreateTable);
        let platform = Arc::clone(context.platform());
        if self.table.columns().is_empty() {
            return Err(self.invalid("CREATE TABLE without columns"));
        }
        let inline = self.inline_primary_key(platform.as_ref())?;

        tokenize_comment(stream, self.comment.as_deref());
        stream.keyword("CREATE").space();
        if self.temporary {
            if !platform.query_feature(feature::CREATE_TABLE_TEMPORARY, false) {
                return Err(Error::unsupported(platform.name(), "temporary tables"));
            }
            stream.keyword("TEMPORARY").space();
        }
        stream.keyword("TABLE").space();
        if self.if_not_exists {
            if platform.query_feature(feature::CREATE_TABLE_IF_NOT_EXISTS, false) {
                stream.keyword("IF NOT EXISTS").space();
            } else {
                debug!(
                    platform = platform.name(),
                    table = %self.table.path(),
                    "Omitting unsupported IF NOT EXISTS"
                );
            }
        }
        let path = self.table.path();
        push_path(stream, platform.as_ref(), path.split('.'));
        stream.space().text("(");

        for (index, column) in self.table.columns().iter().enumerate() {
            if index > 0 {
                stream.text(",").space();
            }
            let inline_here = inline.is_some_and(|c| c.name == column.name);
            Self::tokenize_column(stream, column, inline_here, context)?;
        }
        for constraint in self.table.constraints() {
            if inline.is_some() && matches!(constraint, Constraint::PrimaryKey { .. }) {
                continue;
            }
            stream.text(",").space();
            tokenize_constraint(stream, constraint, platform.as_ref());
        }
        stream.text(")");
        Ok(())
    }
}

fn push_column_list(stream: &mut TokenStream, platform: &dyn Platform, columns: &[String]) {
    stream.text("(");
    for (index, column) in columns.iter().enumerate() {
        if index > 0 {
            stream.text(",").space();
        }
        stream.identifier(platform.quote_identifier(column));
    }
    stream.text(")");
}

fn tokenize_constraint(stream: &mut TokenStream, constraint: &Constraint, platform: &dyn Platform) {
    if let Some(name) = constraint.name() {
        stream
            .keyword("CONSTRAINT")
            .space()
            .identifier(platform.quote_identifier(name))
            .space();
    }
    match constraint {
        Constraint::PrimaryKey { columns, .. } => {
            stream.keyword("PRIMARY KEY").space();
            push_column_list(stream, platform, columns);
        }
        Constraint::Unique { columns, .. } => {
            stream.keyword("UNIQUE").space();
            push_column_list(stream, platform, columns);
        }
        Constraint::ForeignKey {
            columns,
            references_table,
            references_columns,
            on_delete,
            on_update,
            ..
        } => {
            stream.keyword("FOREIGN KEY").space();
            push_column_list(stream, platform, columns);
            stream.space().keyword("REFERENCES").space();
            push_path(stream, platform, references_table.split('.'));
            stream.space();
            push_column_list(stream, platform, references_columns);
            if let Some(action) = on_delete {
                stream.space().keyword("ON DELETE").space().keyword(action.as_sql());
            }
            if let Some(action) = on_update {
                stream.space().keyword("ON UPDATE").space().keyword(action.as_sql());
            }
        }
    }
}

impl Tokenizable for CreateTableQuery {
    fn tokenize(&self, stream: &mut TokenStream, context: &mut Context) -> Result<()> {
        context.scoped(None, |context| self.tokenize_scoped(stream, context))
    }
}
