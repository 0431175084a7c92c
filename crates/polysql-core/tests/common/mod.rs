#![allow(dead_code)]

use std::sync::Arc;

use polysql_core::evaluator::Evaluator;
use polysql_core::expression::Expression;
use polysql_core::platform::{DialectKind, Platform, PlatformConfig};
use polysql_core::statement::{Statement, StatementBuilder, StatementData};
use polysql_core::structure::{ColumnStructure, Datasource, NamespaceStructure, TableStructure};
use polysql_core::{DataType, Error, EvaluationError, ResolverMode};
use serde_json::Value as Json;

pub fn eval(text: &str) -> Expression {
    Evaluator::default()
        .evaluate(text)
        .unwrap_or_else(|e| panic!("Failed to evaluate: {text}\nError: {e}"))
}

pub fn eval_err(text: &str) -> EvaluationError {
    Evaluator::default()
        .evaluate(text)
        .expect_err(&format!("Expected evaluation error for: {text}"))
}

pub fn eval_json(json: Json) -> Expression {
    let shown = json.to_string();
    Evaluator::default()
        .evaluate(json)
        .unwrap_or_else(|e| panic!("Failed to evaluate: {shown}\nError: {e}"))
}

pub fn eval_json_err(json: Json) -> EvaluationError {
    let shown = json.to_string();
    Evaluator::default()
        .evaluate(json)
        .expect_err(&format!("Expected evaluation error for: {shown}"))
}

pub fn platform(dialect: DialectKind) -> Arc<dyn Platform> {
    PlatformConfig::new(dialect).build()
}

pub fn platform_version(dialect: DialectKind, version: &str) -> Arc<dyn Platform> {
    PlatformConfig::new(dialect).server_version(version).build()
}

/// Renders a standalone expression.
pub fn render(dialect: DialectKind, expression: &Expression) -> String {
    StatementBuilder::new(platform(dialect))
        .build_expression(expression)
        .unwrap_or_else(|e| panic!("Failed to render: {expression:?}\nError: {e}"))
        .sql()
        .to_string()
}

pub fn build_with(builder: &StatementBuilder, statement: impl Into<Statement>) -> StatementData {
    let statement = statement.into();
    builder
        .build(&statement)
        .unwrap_or_else(|e| panic!("Failed to build: {statement:?}\nError: {e}"))
}

pub fn build_err_with(builder: &StatementBuilder, statement: impl Into<Statement>) -> Error {
    let statement = statement.into();
    builder
        .build(&statement)
        .expect_err(&format!("Expected build error for: {statement:?}"))
}

pub fn build(dialect: DialectKind, statement: impl Into<Statement>) -> StatementData {
    build_with(&StatementBuilder::new(platform(dialect)), statement)
}

pub fn build_err(dialect: DialectKind, statement: impl Into<Statement>) -> Error {
    build_err_with(&StatementBuilder::new(platform(dialect)), statement)
}

pub fn sql(dialect: DialectKind, statement: impl Into<Statement>) -> String {
    build(dialect, statement).sql().to_string()
}

/// `main.users` and `main.orders`.
pub fn shop() -> Datasource {
    Datasource::new().namespace(
        NamespaceStructure::new("main")
            .table(
                TableStructure::new("users")
                    .column(ColumnStructure::new("id", DataType::INTEGER).not_null())
                    .column(ColumnStructure::new("name", DataType::STRING).length(64))
                    .column(ColumnStructure::new("age", DataType::INTEGER))
                    .column(ColumnStructure::new("country", DataType::STRING).length(2)),
            )
            .table(
                TableStructure::new("orders")
                    .column(ColumnStructure::new("id", DataType::INTEGER).not_null())
                    .column(ColumnStructure::new("user_id", DataType::INTEGER))
                    .column(ColumnStructure::new("total", DataType::FLOAT))
                    .column(ColumnStructure::new(
                        "created",
                        DataType::TIMESTAMP | DataType::TIMEZONE,
                    )),
            ),
    )
}

pub fn strict(dialect: DialectKind) -> StatementBuilder {
    StatementBuilder::new(platform(dialect)).with_structure(Arc::new(shop()), ResolverMode::Strict)
}

pub fn structured(dialect: DialectKind) -> StatementBuilder {
    StatementBuilder::new(platform(dialect)).with_structure(Arc::new(shop()), ResolverMode::Virtual)
}
