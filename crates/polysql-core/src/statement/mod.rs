//! Statement tree and statement building.
//!
//! A [`Statement`] is one of the supported SQL statements. Each statement
//! tokenizes itself inside its own resolver scope;
//! [`StatementBuilder`] turns the resulting token stream into a
//! [`StatementData`] holding the SQL text, the parameter occurrences and
//! the result column metadata.

mod builder;
mod create_table;
mod data;
mod delete;
mod drop_table;
mod insert;
mod select;
mod update;

pub use builder::StatementBuilder;
pub use create_table::CreateTableQuery;
pub use data::{
    ParameterData, ParameterOccurrence, ResultColumn, ResultColumnMap, StatementData,
    StatementType,
};
pub use delete::DeleteQuery;
pub use drop_table::DropTableQuery;
pub use insert::InsertQuery;
pub use select::{OrderBy, SelectColumn, SelectQuery};
pub use update::UpdateQuery;

use crate::context::Context;
use crate::error::{Error, Result};
use crate::expression::Expression;
use crate::platform::feature;
use crate::token::TokenStream;
use crate::tokenizer::Tokenizable;

/// A SQL statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// SELECT.
    Select(SelectQuery),
    /// INSERT.
    Insert(InsertQuery),
    /// UPDATE.
    Update(UpdateQuery),
    /// DELETE.
    Delete(DeleteQuery),
    /// CREATE TABLE.
    CreateTable(CreateTableQuery),
    /// DROP TABLE.
    DropTable(DropTableQuery),
}

impl Statement {
    /// Kind of the statement.
    #[must_use]
    pub const fn statement_type(&self) -> StatementType {
        match self {
            Self::Select(_) => StatementType::Select,
            Self::Insert(_) => StatementType::Insert,
            Self::Update(_) => StatementType::Update,
            Self::Delete(_) => StatementType::Delete,
            Self::CreateTable(_) => StatementType::CreateTable,
            Self::DropTable(_) => StatementType::DropTable,
        }
    }
}

impl Tokenizable for Statement {
    fn tokenize(&self, stream: &mut TokenStream, context: &mut Context) -> Result<()> {
        match self {
            Self::Select(query) => query.tokenize(stream, context),
            Self::Insert(query) => query.tokenize(stream, context),
            Self::Update(query) => query.tokenize(stream, context),
            Self::Delete(query) => query.tokenize(stream, context),
            Self::CreateTable(query) => query.tokenize(stream, context),
            Self::DropTable(query) => query.tokenize(stream, context),
        }
    }
}

macro_rules! impl_from_query {
    ($($query:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$query> for Statement {
                fn from(query: $query) -> Self {
                    Self::$variant(query)
                }
            }
        )*
    };
}

impl_from_query!(
    SelectQuery => Select,
    InsertQuery => Insert,
    UpdateQuery => Update,
    DeleteQuery => Delete,
    CreateTableQuery => CreateTable,
    DropTableQuery => DropTable,
);

/// Appends a leading comment.
pub(crate) fn tokenize_comment(stream: &mut TokenStream, comment: Option<&str>) {
    if let Some(comment) = comment {
        stream.comment(comment).space();
    }
}

/// Appends ` WHERE condition`.
pub(crate) fn tokenize_where(
    stream: &mut TokenStream,
    condition: Option<&Expression>,
    context: &mut Context,
) -> Result<()> {
    if let Some(condition) = condition {
        stream.space().keyword("WHERE").space();
        stream.expression(condition, context)?;
    }
    Ok(())
}

/// Appends ` RETURNING ..`.
///
/// # Errors
///
/// Returns [`Error::Unsupported`] if the platform cannot return rows from
/// data-modifying statements.
pub(crate) fn tokenize_returning(
    stream: &mut TokenStream,
    returning: &[Expression],
    context: &mut Context,
) -> Result<()> {
    if returning.is_empty() {
        return Ok(());
    }
    let platform = context.platform();
    if !platform.query_feature(feature::STATEMENT_RETURNING, false) {
        return Err(Error::unsupported(platform.name(), "RETURNING"));
    }
    stream.space().keyword("RETURNING").space();
    stream.expressions(returning, ",", context)?;
    Ok(())
}

/// ANDs `condition` onto an optional existing one.
pub(crate) fn and_where(existing: Option<Expression>, condition: Expression) -> Expression {
    match existing {
        Some(existing) => existing.and(condition),
        None => condition,
    }
}
