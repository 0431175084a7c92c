//! Polish-notation input.
//!
//! A single-key JSON object names an operator (or function) and lists its
//! operands: `{"=": ["age", 18]}`, `{"not": ["active"]}`,
//! `{"lower()": ["name"]}`. When the value is not an array the object is
//! shorthand for an equality: `{"age": 18}` is `age = 18`.

use serde_json::{Map, Value as Json};

use crate::error::EvaluationError;
use crate::expression::{Between, BinaryOperator, Expression, InOperator, UnaryOperator};

/// A decoded polish-notation object.
#[derive(Debug, Clone, PartialEq)]
pub enum PolishNode {
    /// `{operator: [operands...]}`.
    OperatorCall {
        /// Operator symbol, keyword or `name()` function key.
        operator: String,
        /// Raw operands, evaluated by the caller.
        operands: Vec<Json>,
    },
    /// `{field: value}` where `value` is not an array.
    FieldEquals {
        /// Column path.
        field: String,
        /// Raw compared value.
        value: Json,
    },
}

impl PolishNode {
    /// Decodes a JSON object. Only single-key objects are polish notation.
    ///
    /// # Errors
    ///
    /// Returns an [`EvaluationError`] for empty and multi-key objects.
    pub fn decode(map: &Map<String, Json>) -> Result<Self, EvaluationError> {
        let mut entries = map.iter();
        let (Some((key, value)), None) = (entries.next(), entries.next()) else {
            return Err(EvaluationError::new(
                format!("polish notation needs exactly one key, found {}", map.len()),
                Json::Object(map.clone()).to_string(),
            ));
        };
        Ok(match value {
            Json::Array(operands) => Self::OperatorCall {
                operator: key.clone(),
                operands: operands.clone(),
            },
            other => Self::FieldEquals {
                field: key.clone(),
                value: other.clone(),
            },
        })
    }

    /// Compact JSON form, used as the error fragment.
    #[must_use]
    pub fn fragment(&self) -> String {
        let mut map = Map::new();
        match self {
            Self::OperatorCall { operator, operands } => {
                map.insert(operator.clone(), Json::Array(operands.clone()));
            }
            Self::FieldEquals { field, value } => {
                map.insert(field.clone(), value.clone());
            }
        }
        Json::Object(map).to_string()
    }
}

/// Builds the expression for `operator` applied to already evaluated
/// operands.
///
/// The operand count selects the operator table: one operand looks up a
/// unary operator, two a binary one and three `between`/`not between`.
/// `in`/`not in` take any number of candidates after the tested value,
/// `and`/`or` fold two or more operands, and keys ending in `()` always
/// build a function call.
pub(crate) fn apply(
    operator: &str,
    mut operands: Vec<Expression>,
    fragment: impl Fn() -> String,
) -> Result<Expression, EvaluationError> {
    let unknown = |count: usize| {
        EvaluationError::new(format!("unknown operator for {count} operand(s)"), fragment())
    };

    if let Some(name) = operator.strip_suffix("()") {
        if name.is_empty() {
            return Err(EvaluationError::new("missing function name", fragment()));
        }
        return Ok(Expression::function(name, operands));
    }

    let keyword = operator.trim().to_ascii_lowercase();
    match (keyword.as_str(), operands.len()) {
        ("in" | "not in", count) if count >= 2 => {
            let left = operands.remove(0);
            let list = match operands.as_slice() {
                [Expression::List(items)] => items.clone(),
                _ => operands,
            };
            if list.is_empty() {
                return Err(EvaluationError::new("IN needs at least one value", fragment()));
            }
            Ok(Expression::In(InOperator::new(left, list, keyword == "in")))
        }
        ("and" | "or", count) if count >= 2 => {
            let op = if keyword == "and" {
                BinaryOperator::And
            } else {
                BinaryOperator::Or
            };
            Ok(operands
                .into_iter()
                .reduce(|left, right| left.binary(op, right))
                .unwrap_or_else(Expression::null))
        }
        ("between" | "not between", 3) => {
            let mut operands = operands.into_iter();
            match (operands.next(), operands.next(), operands.next()) {
                (Some(left), Some(min), Some(max)) => Ok(Expression::Between(Between::new(
                    left,
                    min,
                    max,
                    keyword == "between",
                ))),
                _ => Err(unknown(3)),
            }
        }
        (_, 1) => {
            let op = UnaryOperator::from_symbol(&keyword).ok_or_else(|| unknown(1))?;
            let operand = operands.remove(0);
            Ok(Expression::unary(op, operand))
        }
        (_, 2) => {
            let op = BinaryOperator::from_symbol(&keyword).ok_or_else(|| unknown(2))?;
            let right = operands.remove(1);
            let left = operands.remove(0);
            Ok(left.binary(op, right))
        }
        (_, count) => Err(unknown(count)),
    }
}
