//! Expression tokenizer.
//!
//! [`Tokenizer::tokenize`] hands a node to its own [`Tokenizable`]
//! implementation when it has one, and otherwise renders it by shape:
//! unary and binary operations, function calls, values, lists, sub-selects
//! and raw identifiers. Operands are parenthesized where operator precedence would
//! otherwise change the meaning of the rendered text.

use crate::context::Context;
use crate::error::{Error, Result};
use crate::expression::{
    BinaryOperation, Expression, FunctionCall, Literal, UnaryOperation, UnaryOperator,
    COMPARISON_PRECEDENCE,
};
use crate::platform::KeywordId;
use crate::token::TokenStream;
use crate::types::Value;

/// Nodes that render themselves into a token stream.
pub trait Tokenizable {
    /// Appends the node's tokens.
    ///
    /// # Errors
    ///
    /// Returns resolution errors and platform capability errors.
    fn tokenize(&self, stream: &mut TokenStream, context: &mut Context) -> Result<()>;
}

impl Tokenizable for KeywordId {
    fn tokenize(&self, stream: &mut TokenStream, context: &mut Context) -> Result<()> {
        stream.keyword(context.platform().keyword(*self));
        Ok(())
    }
}

/// Shape-based expression renderer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Tokenizer;

impl Tokenizer {
    /// Appends the tokens of `expression`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedNode`] for nodes that have no rendering
    /// of their own and no known shape, plus any error of the node.
    pub fn tokenize(
        stream: &mut TokenStream,
        expression: &Expression,
        context: &mut Context,
    ) -> Result<()> {
        if let Some(node) = expression.as_tokenizable() {
            return node.tokenize(stream, context);
        }
        match expression {
            Expression::Unary(operation) => Self::unary(stream, operation, context),
            Expression::Binary(operation) => Self::binary(stream, operation, context),
            Expression::Function(call) => Self::call(stream, call, context),
            Expression::Literal(literal) => Self::value(stream, literal, context),
            Expression::List(items) => Self::set(stream, items, context),
            Expression::SubSelect(select) => {
                stream.text("(");
                select.tokenize(stream, context)?;
                stream.text(")");
                Ok(())
            }
            Expression::Identifier(name) => {
                stream.identifier(context.platform().quote_identifier(name));
                Ok(())
            }
            Expression::Wildcard => {
                stream.text("*");
                Ok(())
            }
            other => Err(Error::UnsupportedNode(other.kind())),
        }
    }

    /// Tokenizes an operand of an operator with precedence `parent`,
    /// parenthesizing it if it binds looser. With `strict`, operands of
    /// equal precedence are parenthesized too.
    ///
    /// # Errors
    ///
    /// Propagates errors of the operand.
    pub fn operand(
        stream: &mut TokenStream,
        expression: &Expression,
        context: &mut Context,
        parent: u8,
        strict: bool,
    ) -> Result<()> {
        let precedence = expression.precedence();
        if precedence < parent || (strict && precedence == parent) {
            stream.text("(");
            Self::tokenize(stream, expression, context)?;
            stream.text(")");
            Ok(())
        } else {
            Self::tokenize(stream, expression, context)
        }
    }

    fn unary(
        stream: &mut TokenStream,
        operation: &UnaryOperation,
        context: &mut Context,
    ) -> Result<()> {
        let operator = context.platform().unary_operator(operation.operator)?;
        let operand = operation.operand.as_ref();
        if operation.operator == UnaryOperator::Not {
            stream.keyword(operator).space();
        } else {
            stream.text(operator);
        }
        // `--` would start a comment.
        if operation.operator == UnaryOperator::Neg && starts_with_minus(operand) {
            stream.text("(");
            Self::tokenize(stream, operand, context)?;
            stream.text(")");
            return Ok(());
        }
        Self::operand(
            stream,
            operand,
            context,
            operation.operator.precedence(),
            false,
        )
    }

    fn binary(
        stream: &mut TokenStream,
        operation: &BinaryOperation,
        context: &mut Context,
    ) -> Result<()> {
        let operator = operation.operator;
        let precedence = operator.precedence();
        let comparison = precedence == COMPARISON_PRECEDENCE;
        let spelled = context.platform().binary_operator(operator)?;

        Self::operand(stream, &operation.left, context, precedence, comparison)?;
        stream.space();
        if operator.is_keyword() {
            stream.keyword(spelled);
        } else {
            stream.text(spelled);
        }
        stream.space();
        let chained = matches!(
            operation.right.as_ref(),
            Expression::Binary(right) if right.operator == operator && operator.is_associative()
        );
        Self::operand(stream, &operation.right, context, precedence, !chained)
    }

    fn call(stream: &mut TokenStream, call: &FunctionCall, context: &mut Context) -> Result<()> {
        stream.identifier(call.name.clone()).text("(");
        stream.expressions(&call.args, ",", context)?;
        stream.text(")");
        Ok(())
    }

    fn value(stream: &mut TokenStream, literal: &Literal, context: &mut Context) -> Result<()> {
        let token = context
            .platform()
            .serialize_column_data(literal.data_type, &literal.value)?;
        stream.push(token);
        Ok(())
    }

    fn set(stream: &mut TokenStream, items: &[Expression], context: &mut Context) -> Result<()> {
        stream.expressions(items, ",", context)?;
        Ok(())
    }
}

fn starts_with_minus(expression: &Expression) -> bool {
    match expression {
        Expression::Unary(op) => op.operator == UnaryOperator::Neg,
        Expression::Literal(Literal {
            value: Value::Integer(i),
            ..
        }) => *i < 0,
        Expression::Literal(Literal {
            value: Value::Float(f),
            ..
        }) => f.is_sign_negative(),
        Expression::Binary(op) => starts_with_minus(&op.left),
        _ => false,
    }
}
