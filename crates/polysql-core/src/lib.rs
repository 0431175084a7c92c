//! # polysql-core
//!
//! A DBMS-agnostic SQL expression compiler.
//!
//! Statements and expressions are described once, in a portable form, and
//! rendered for a specific database through a pluggable [`Platform`]:
//!
//! - An [`Evaluator`] turns loosely typed input (native values, JSON
//!   polish notation or a small text language) into an [`Expression`] tree
//! - Statement nodes ([`SelectQuery`], [`InsertQuery`], ...) assemble
//!   expressions into statements
//! - A [`StatementBuilder`] tokenizes the tree into a dialect-neutral
//!   [`TokenStream`], resolving identifiers through a per-build [`Context`],
//!   and finalizes it into [`StatementData`]
//!
//! ## Rendering one statement for several databases
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use polysql_core::evaluator::Evaluator;
//! use polysql_core::platform::{MySqlPlatform, Platform, PostgreSqlPlatform};
//! use polysql_core::statement::{SelectQuery, StatementBuilder};
//!
//! let evaluator = Evaluator::default();
//! let query = SelectQuery::new()
//!     .column(evaluator.evaluate("name").unwrap())
//!     .from("users")
//!     .where_clause(evaluator.evaluate("age >= :min and age < :max").unwrap());
//! let statement = query.into();
//!
//! let postgres: Arc<dyn Platform> = Arc::new(PostgreSqlPlatform::new(None));
//! let data = StatementBuilder::new(postgres).build(&statement).unwrap();
//! assert_eq!(
//!     data.sql(),
//!     "SELECT users.name FROM users WHERE users.age >= $1 AND users.age < $2"
//! );
//!
//! let mysql: Arc<dyn Platform> = Arc::new(MySqlPlatform::new(None));
//! let data = StatementBuilder::new(mysql).build(&statement).unwrap();
//! assert_eq!(
//!     data.sql(),
//!     "SELECT users.name FROM users WHERE users.age >= ? AND users.age < ?"
//! );
//! assert_eq!(data.parameters().keys(), vec!["min", "max"]);
//! ```
//!
//! ## Parameters
//!
//! Values never reach the SQL text unless written as literals. Named
//! parameters are rendered as the platform's placeholder, and every
//! occurrence is recorded in [`ParameterData`] so callers can bind values
//! positionally.

pub mod context;
pub mod error;
pub mod evaluator;
pub mod expression;
pub mod platform;
pub mod statement;
pub mod structure;
pub mod token;
pub mod tokenizer;
pub mod types;

pub use context::{Context, ResolverMode};
pub use error::{Error, EvaluationError, ResolutionError, Result, StatementConstructionError};
pub use evaluator::{Evaluable, Evaluator, Grammar};
pub use expression::{DataTyped, Expression};
pub use platform::{Platform, PlatformConfig};
pub use statement::{
    InsertQuery, ParameterData, SelectQuery, Statement, StatementBuilder, StatementData,
};
pub use token::TokenStream;
pub use tokenizer::Tokenizable;
pub use types::{DataType, Value};
