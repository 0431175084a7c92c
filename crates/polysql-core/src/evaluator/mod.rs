//! Turns loosely typed input into expressions.
//!
//! An [`Evaluator`] accepts anything convertible into [`Evaluable`]:
//!
//! - expressions, returned unchanged,
//! - native values and dates, which become literals,
//! - mini-language text such as `"age between 18 and :max"`,
//! - JSON, where single-key objects are [polish notation](polish).
//!
//! The text grammar is compiled once into a [`Grammar`] that evaluators
//! borrow:
//!
//! ```
//! use polysql_core::evaluator::{Evaluator, Grammar};
//! use polysql_core::expression::Expression;
//!
//! let grammar = Grammar::new();
//! let evaluator = Evaluator::new(&grammar);
//! let expression = evaluator.evaluate("id = :id").unwrap();
//! assert_eq!(
//!     expression,
//!     Expression::column("id").eq(Expression::parameter("id"))
//! );
//! ```

mod grammar;
mod lexer;
mod parser;
pub mod polish;

pub use grammar::Grammar;
pub use polish::PolishNode;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use serde_json::Value as Json;
use tracing::trace;

use crate::error::EvaluationError;
use crate::expression::{Expression, Literal};
use crate::types::{Timestamp, Value};

use self::parser::Parser;

/// Input accepted by [`Evaluator::evaluate`].
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluable {
    /// An expression, passed through.
    Expression(Expression),
    /// A native value, turned into a literal of the matching type.
    Value(Value),
    /// Mini-language source. Numeric text is a number literal.
    Text(String),
    /// JSON input.
    Json(Json),
    /// A decoded polish-notation object.
    Polish(PolishNode),
}

impl From<Expression> for Evaluable {
    fn from(value: Expression) -> Self {
        Self::Expression(value)
    }
}

impl From<Value> for Evaluable {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<bool> for Evaluable {
    fn from(value: bool) -> Self {
        Self::Value(Value::Boolean(value))
    }
}

impl From<i32> for Evaluable {
    fn from(value: i32) -> Self {
        Self::Value(Value::from(value))
    }
}

impl From<i64> for Evaluable {
    fn from(value: i64) -> Self {
        Self::Value(Value::Integer(value))
    }
}

impl From<f64> for Evaluable {
    fn from(value: f64) -> Self {
        Self::Value(Value::Float(value))
    }
}

impl From<&str> for Evaluable {
    fn from(value: &str) -> Self {
        Self::Text(String::from(value))
    }
}

impl From<String> for Evaluable {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Timestamp> for Evaluable {
    fn from(value: Timestamp) -> Self {
        Self::Value(Value::Timestamp(value))
    }
}

impl From<NaiveDate> for Evaluable {
    fn from(value: NaiveDate) -> Self {
        Timestamp::from(value).into()
    }
}

impl From<NaiveTime> for Evaluable {
    fn from(value: NaiveTime) -> Self {
        Timestamp::from(value).into()
    }
}

impl From<NaiveDateTime> for Evaluable {
    fn from(value: NaiveDateTime) -> Self {
        Timestamp::from(value).into()
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Evaluable {
    fn from(value: DateTime<Tz>) -> Self {
        Timestamp::from(value).into()
    }
}

impl From<Json> for Evaluable {
    fn from(value: Json) -> Self {
        Self::Json(value)
    }
}

impl From<PolishNode> for Evaluable {
    fn from(value: PolishNode) -> Self {
        Self::Polish(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for Evaluable {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Value(Value::Null), Into::into)
    }
}

/// Evaluates input against a borrowed [`Grammar`].
///
/// Evaluation has no side effects: the same input always gives the same
/// expression, except for `--MM-DD` dates, which take the current year.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'g> {
    grammar: &'g Grammar,
}

impl<'g> Evaluator<'g> {
    /// Creates an evaluator using `grammar`.
    #[must_use]
    pub const fn new(grammar: &'g Grammar) -> Self {
        Self { grammar }
    }

    /// The grammar used for text input.
    #[must_use]
    pub const fn grammar(&self) -> &'g Grammar {
        self.grammar
    }

    /// Evaluates `input` into an expression.
    ///
    /// # Errors
    ///
    /// Returns an [`EvaluationError`] carrying the offending fragment for
    /// malformed text, unknown operators and JSON shapes that have no
    /// expression form.
    pub fn evaluate(&self, input: impl Into<Evaluable>) -> Result<Expression, EvaluationError> {
        match input.into() {
            Evaluable::Expression(expression) => Ok(expression),
            Evaluable::Value(value) => Ok(Expression::Literal(Literal::new(value))),
            Evaluable::Text(text) => self.evaluate_text(&text),
            Evaluable::Json(json) => self.evaluate_json(&json),
            Evaluable::Polish(node) => self.evaluate_polish(&node),
        }
    }

    /// Evaluates every item of `inputs`.
    ///
    /// # Errors
    ///
    /// Returns the first [`EvaluationError`].
    pub fn evaluate_all<I>(&self, inputs: I) -> Result<Vec<Expression>, EvaluationError>
    where
        I: IntoIterator,
        I::Item: Into<Evaluable>,
    {
        inputs.into_iter().map(|input| self.evaluate(input)).collect()
    }

    fn evaluate_text(&self, text: &str) -> Result<Expression, EvaluationError> {
        if let Some(value) = Value::from_numeric_str(text) {
            return Ok(Expression::Literal(Literal::new(value)));
        }
        let expression = Parser::new(text, self.grammar)?.parse()?;
        trace!(input = text, kind = expression.kind(), "Evaluated text");
        Ok(expression)
    }

    fn evaluate_json(&self, json: &Json) -> Result<Expression, EvaluationError> {
        match json {
            Json::Null => Ok(Expression::null()),
            Json::Bool(value) => Ok(Expression::literal(*value)),
            Json::Number(number) => {
                let value = match (number.as_i64(), number.as_f64()) {
                    (Some(integer), _) => Value::Integer(integer),
                    (None, Some(float)) => Value::Float(float),
                    (None, None) => {
                        return Err(EvaluationError::new(
                            "number out of range",
                            number.to_string(),
                        ))
                    }
                };
                Ok(Expression::Literal(Literal::new(value)))
            }
            Json::String(text) => self.evaluate_text(text),
            Json::Array(items) => Ok(Expression::List(self.evaluate_all(items.iter().cloned())?)),
            Json::Object(map) => self.evaluate_polish(&PolishNode::decode(map)?),
        }
    }

    fn evaluate_polish(&self, node: &PolishNode) -> Result<Expression, EvaluationError> {
        match node {
            PolishNode::FieldEquals { field, value } => {
                let field = self.evaluate_text(field)?;
                let value = self.evaluate_json(value)?;
                Ok(field.eq(value))
            }
            PolishNode::OperatorCall { operator, operands } => {
                let operands = self.evaluate_all(operands.iter().cloned())?;
                polish::apply(operator, operands, || node.fragment())
            }
        }
    }
}

impl Default for Evaluator<'static> {
    /// An evaluator over [`Grammar::shared`].
    fn default() -> Self {
        Self::new(Grammar::shared())
    }
}
