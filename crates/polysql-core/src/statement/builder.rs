//! Statement finalization.

use std::sync::Arc;

use tracing::debug;

use crate::context::{Context, ResolverMode};
use crate::error::Result;
use crate::expression::Expression;
use crate::platform::Platform;
use crate::structure::StructureProvider;
use crate::token::{TokenStream, TokenType};
use crate::tokenizer::Tokenizable;

use super::{ParameterData, ParameterOccurrence, Statement, StatementData};

/// Builds [`StatementData`] for one platform.
///
/// Every build runs against a fresh [`TokenStream`] and [`Context`], so a
/// builder and the statements it builds can be reused freely.
///
/// ```
/// use std::sync::Arc;
///
/// use polysql_core::expression::Expression;
/// use polysql_core::platform::PostgreSqlPlatform;
/// use polysql_core::statement::{SelectQuery, StatementBuilder};
///
/// let builder = StatementBuilder::new(Arc::new(PostgreSqlPlatform::new(None)));
/// let query = SelectQuery::new()
///     .column(Expression::column("name"))
///     .from("users")
///     .where_clause(Expression::column("id").eq(Expression::parameter("id")));
/// let data = builder.build(&query.into()).unwrap();
/// assert_eq!(data.sql(), "SELECT users.name FROM users WHERE users.id = $1");
/// assert_eq!(data.parameters().count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct StatementBuilder {
    platform: Arc<dyn Platform>,
    structure: Option<Arc<dyn StructureProvider>>,
    mode: ResolverMode,
}

impl StatementBuilder {
    /// Creates a builder that resolves identifiers virtually.
    #[must_use]
    pub fn new(platform: Arc<dyn Platform>) -> Self {
        Self {
            platform,
            structure: None,
            mode: ResolverMode::Virtual,
        }
    }

    /// Resolves identifiers against `structure`.
    #[must_use]
    pub fn with_structure(mut self, structure: Arc<dyn StructureProvider>, mode: ResolverMode) -> Self {
        self.structure = Some(structure);
        self.mode = mode;
        self
    }

    /// The target platform.
    #[must_use]
    pub const fn platform(&self) -> &Arc<dyn Platform> {
        &self.platform
    }

    /// A fresh build context.
    #[must_use]
    pub fn context(&self) -> Context {
        let platform = Arc::clone(&self.platform);
        match &self.structure {
            Some(structure) => Context::with_structure(platform, Arc::clone(structure), self.mode),
            None => Context::new(platform).mode(self.mode),
        }
    }

    /// Builds a statement.
    ///
    /// # Errors
    ///
    /// Returns resolution, construction and platform capability errors.
    pub fn build(&self, statement: &Statement) -> Result<StatementData> {
        let mut context = self.context();
        let mut stream = TokenStream::new();
        statement.tokenize(&mut stream, &mut context)?;
        Ok(Self::finalize(&stream, &context))
    }

    /// Builds a standalone expression, such as a condition to embed in
    /// hand-written SQL.
    ///
    /// # Errors
    ///
    /// Returns resolution and platform capability errors.
    pub fn build_expression(&self, expression: &Expression) -> Result<StatementData> {
        let mut context = self.context();
        let mut stream = TokenStream::new();
        context.scoped(None, |context| {
            stream.expression(expression, context).map(|_| ())
        })?;
        Ok(Self::finalize(&stream, &context))
    }

    /// Turns a token stream into SQL text and parameter metadata.
    ///
    /// Parameter tokens are rendered through
    /// [`Platform::parameter_placeholder`] and numbered in stream order;
    /// every other token is copied verbatim. Finalizing the same stream
    /// twice gives identical results.
    #[must_use]
    pub fn finalize(stream: &TokenStream, context: &Context) -> StatementData {
        let platform = context.platform();
        let mut sql = String::new();
        let mut parameters = ParameterData::new();
        for token in stream {
            match token.token_type() {
                TokenType::Parameter => {
                    let key = token.value();
                    let placeholder = platform.parameter_placeholder(key, &parameters);
                    sql.push_str(&placeholder);
                    parameters.push(ParameterOccurrence::new(parameters.count(), key, placeholder));
                }
                _ => sql.push_str(token.value()),
            }
        }
        debug!(
            statement_type = ?context.statement_type(),
            parameters = parameters.count(),
            sql_len = sql.len(),
            "Finalized statement"
        );
        StatementData::new(
            sql,
            parameters,
            context.result_columns().clone(),
            context.statement_type(),
        )
    }
}
