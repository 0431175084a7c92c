//! DROP TABLE queries.

use std::sync::Arc;

use tracing::debug;

use crate::context::Context;
use crate::error::Result;
use crate::expression::{push_path, Table};
use crate::platform::feature;
use crate::token::TokenStream;
use crate::tokenizer::Tokenizable;

use super::{tokenize_comment, StatementType};

/// A DROP TABLE query. IF EXISTS and CASCADE are dropped on platforms
/// without them.
#[derive(Debug, Clone, PartialEq)]
pub struct DropTableQuery {
    /// Leading comment.
    pub comment: Option<String>,
    /// Dropped table.
    pub table: Table,
    /// IF EXISTS.
    pub if_exists: bool,
    /// CASCADE.
    pub cascade: bool,
}

impl DropTableQuery {
    /// Creates a DROP of `table`.
    #[must_use]
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            comment: None,
            table: Table::new(table),
            if_exists: false,
            cascade: false,
        }
    }

    /// Sets a leading comment.
    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Adds IF EXISTS.
    #[must_use]
    pub const fn if_exists(mut self) -> Self {
        self.if_exists = true;
        self
    }

    /// Adds CASCADE.
    #[must_use]
    pub const fn cascade(mut self) -> Self {
        self.cascade = true;
        self
    }

    fn tokenize_scoped(&self, stream: &mut TokenStream, context: &mut Context) -> Result<()> {
        context.set_statement_type(StatementType::DropTable);
        let platform = Arc::clone(context.platform());
        tokenize_comment(stream, self.comment.as_deref());
        stream.keyword("DROP").space().keyword("TABLE").space();
        if self.if_exists {
            if platform.query_feature(feature::DROP_TABLE_IF_EXISTS, false) {
                stream.keyword("IF EXISTS").space();
            } else {
                debug!(
                    platform = platform.name(),
                    table = %self.table.path(),
                    "Omitting unsupported IF EXISTS"
                );
            }
        }
        push_path(stream, platform.as_ref(), self.table.path().split('.'));
        if self.cascade {
            if platform.query_feature(feature::DROP_TABLE_CASCADE, false) {
                stream.space().keyword("CASCADE");
            } else {
                debug!(
                    platform = platform.name(),
                    table = %self.table.path(),
                    "Omitting unsupported CASCADE"
                );
            }
        }
        Ok(())
    }
}

impl Tokenizable for DropTableQuery {
    fn tokenize(&self, stream: &mut TokenStream, context: &mut Context) -> Result<()> {
        context.scoped(None, |context| self.tokenize_scoped(stream, context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{GenericPlatform, Platform, SqlitePlatform};

    fn render_on(platform: Arc<dyn Platform>, query: &DropTableQuery) -> String {
        let mut context = Context::new(platform);
        let mut stream = TokenStream::new();
        query.tokenize(&mut stream, &mut context).unwrap();
        stream.to_string()
    }

    #[test]
    fn test_drop_table() {
        let query = DropTableQuery::new("main.users").if_exists().cascade();
        assert_eq!(
            render_on(Arc::new(GenericPlatform::new()), &query),
            "DROP TABLE IF EXISTS main.users CASCADE"
        );
        assert_eq!(
            render_on(Arc::new(SqlitePlatform::new(None)), &query),
            "DROP TABLE IF EXISTS main.users"
        );
    }
}
