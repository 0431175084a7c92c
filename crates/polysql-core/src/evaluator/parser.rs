//! Pratt parser for the expression mini-language.
//!
//! Binding powers are derived from the operator precedences of the
//! expression model, so a parsed tree renders back without added
//! parentheses.

use crate::error::EvaluationError;
use crate::expression::{
    Between, BinaryOperator, CaseExpression, Expression, InOperator, Literal, UnaryOperator,
    COMPARISON_PRECEDENCE,
};
use crate::types::Value;

use super::lexer::{Keyword, Lexer, Token, TokenKind};
use super::Grammar;

/// Deepest sub-expression nesting accepted.
const MAX_DEPTH: usize = 128;

/// Returns `(left_bp, right_bp)` for an operator of the given precedence.
///
/// Left associative: `left_bp < right_bp`.
const fn binding_power(precedence: u8) -> (u8, u8) {
    (precedence * 2, precedence * 2 + 1)
}

/// An operator found in infix position.
#[derive(Debug, Clone, Copy)]
enum Infix {
    Binary(BinaryOperator),
    /// `toggle` is false for NOT BETWEEN.
    Between { toggle: bool },
    /// `toggle` is false for NOT IN.
    In { toggle: bool },
}

impl Infix {
    const fn precedence(self) -> u8 {
        match self {
            Self::Binary(op) => op.precedence(),
            Self::Between { .. } | Self::In { .. } => COMPARISON_PRECEDENCE,
        }
    }

    /// Number of tokens spelling the operator.
    const fn width(self) -> usize {
        match self {
            Self::Between { toggle: false } | Self::In { toggle: false } => 2,
            _ => 1,
        }
    }
}

/// Parses one mini-language expression.
pub(crate) struct Parser<'a> {
    input: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    /// Tokenizes `input` with `grammar`.
    pub(crate) fn new(input: &'a str, grammar: &Grammar) -> Result<Self, EvaluationError> {
        let tokens = Lexer::new(input, grammar).tokenize()?;
        Ok(Self {
            input,
            tokens,
            pos: 0,
            depth: 0,
        })
    }

    /// Parses the whole input as a single expression.
    pub(crate) fn parse(mut self) -> Result<Expression, EvaluationError> {
        if self.check(&TokenKind::Eof) {
            return Err(EvaluationError::new("empty expression", self.input));
        }
        let expression = self.parse_expression(0)?;
        if !self.check(&TokenKind::Eof) {
            return Err(self.unexpected("end of input"));
        }
        Ok(expression)
    }

    fn parse_expression(&mut self, min_bp: u8) -> Result<Expression, EvaluationError> {
        if self.depth >= MAX_DEPTH {
            let fragment = self.input.get(self.current().offset..).unwrap_or(self.input);
            return Err(EvaluationError::new("expression nested too deeply", fragment));
        }
        self.depth += 1;
        let result = self.parse_operators(min_bp);
        self.depth -= 1;
        result
    }

    fn parse_operators(&mut self, min_bp: u8) -> Result<Expression, EvaluationError> {
        let mut lhs = self.parse_prefix()?;

        loop {
            let Some(infix) = self.infix() else {
                break;
            };
            let (l_bp, r_bp) = binding_power(infix.precedence());
            if l_bp < min_bp {
                break;
            }
            for _ in 0..infix.width() {
                self.advance();
            }

            lhs = match infix {
                Infix::Binary(op) => {
                    let rhs = self.parse_expression(r_bp)?;
                    lhs.binary(op, rhs)
                }
                Infix::Between { toggle } => {
                    let min = self.parse_expression(r_bp)?;
                    self.expect_keyword(Keyword::And)?;
                    let max = self.parse_expression(r_bp)?;
                    Expression::Between(Between::new(lhs, min, max, toggle))
                }
                Infix::In { toggle } => {
                    self.expect(&TokenKind::LeftParen, "'('")?;
                    if self.check(&TokenKind::RightParen) {
                        return Err(self.unexpected("at least one IN value"));
                    }
                    let list = self.parse_expression_list()?;
                    self.expect(&TokenKind::RightParen, "')'")?;
                    Expression::In(InOperator::new(lhs, list, toggle))
                }
            };
        }

        Ok(lhs)
    }

    /// The operator at the current position, if it can continue an
    /// expression.
    fn infix(&self) -> Option<Infix> {
        match &self.current().kind {
            TokenKind::Operator(symbol) => BinaryOperator::from_symbol(symbol).map(Infix::Binary),
            TokenKind::Keyword(keyword @ (Keyword::And | Keyword::Or | Keyword::Like)) => {
                BinaryOperator::from_symbol(keyword.as_str()).map(Infix::Binary)
            }
            TokenKind::Keyword(Keyword::Between) => Some(Infix::Between { toggle: true }),
            TokenKind::Keyword(Keyword::In) => Some(Infix::In { toggle: true }),
            TokenKind::Keyword(Keyword::Not) => match self.peek() {
                TokenKind::Keyword(Keyword::Between) => Some(Infix::Between { toggle: false }),
                TokenKind::Keyword(Keyword::In) => Some(Infix::In { toggle: false }),
                _ => None,
            },
            _ => None,
        }
    }

    fn parse_prefix(&mut self) -> Result<Expression, EvaluationError> {
        if matches!(&self.current().kind, TokenKind::Operator(symbol) if symbol == "*") {
            self.advance();
            return Ok(Expression::Wildcard);
        }
        let operator = match &self.current().kind {
            TokenKind::Operator(symbol) => UnaryOperator::from_symbol(symbol),
            TokenKind::Keyword(Keyword::Not) => Some(UnaryOperator::Not),
            _ => None,
        };
        let Some(operator) = operator else {
            return self.parse_primary();
        };
        self.advance();

        // A minus sign directly before a numeral is part of the literal.
        if operator == UnaryOperator::Neg {
            if let TokenKind::Number(value) = &self.current().kind {
                // Numerals are unsigned, so negation cannot overflow.
                let negated = match value {
                    Value::Integer(n) => Value::Integer(-n),
                    Value::Float(f) => Value::Float(-f),
                    other => other.clone(),
                };
                self.advance();
                return Ok(Expression::Literal(Literal::new(negated)));
            }
        }

        let (bp, _) = binding_power(operator.precedence());
        let operand = self.parse_expression(bp)?;
        Ok(Expression::unary(operator, operand))
    }

    fn parse_primary(&mut self) -> Result<Expression, EvaluationError> {
        let token = self.current().clone();
        let expression = match token.kind {
            TokenKind::Number(value) => Expression::Literal(Literal::new(value)),
            TokenKind::String(text) => Expression::literal(text),
            TokenKind::Timestamp(value) => Expression::literal(value),
            TokenKind::Keyword(Keyword::True) => Expression::literal(true),
            TokenKind::Keyword(Keyword::False) => Expression::literal(false),
            TokenKind::Keyword(Keyword::Null) => Expression::null(),
            TokenKind::Parameter(name) => Expression::parameter(name),
            TokenKind::Keyword(Keyword::Case) => return self.parse_case_expression(),
            TokenKind::LeftParen => {
                self.advance();
                let inner = self.parse_expression(0)?;
                self.expect(&TokenKind::RightParen, "')'")?;
                return Ok(inner.group());
            }
            TokenKind::Identifier(name) => {
                if name.ends_with('.') || name.contains("..") {
                    return Err(EvaluationError::new("malformed identifier", name));
                }
                self.advance();
                if self.check(&TokenKind::LeftParen) {
                    return self.parse_function_call(name);
                }
                return Ok(Expression::column(name));
            }
            _ => return Err(self.unexpected("expression")),
        };
        self.advance();
        Ok(expression)
    }

    /// Parses `(args)` after a function name.
    fn parse_function_call(&mut self, name: String) -> Result<Expression, EvaluationError> {
        self.expect(&TokenKind::LeftParen, "'('")?;
        let args = if self.check(&TokenKind::RightParen) {
            vec![]
        } else {
            self.parse_expression_list()?
        };
        self.expect(&TokenKind::RightParen, "')'")?;
        Ok(Expression::function(name, args))
    }

    /// Parses `CASE [subject] WHEN .. THEN .. [ELSE ..] END`.
    fn parse_case_expression(&mut self) -> Result<Expression, EvaluationError> {
        self.expect_keyword(Keyword::Case)?;

        let subject = if self.check_keyword(Keyword::When) {
            None
        } else {
            Some(self.parse_expression(0)?)
        };
        if !self.check_keyword(Keyword::When) {
            return Err(self.unexpected("WHEN"));
        }

        let mut case = CaseExpression::new(subject);
        while self.check_keyword(Keyword::When) {
            self.advance();
            let when = self.parse_expression(0)?;
            self.expect_keyword(Keyword::Then)?;
            let then = self.parse_expression(0)?;
            case = case.when(when, then);
        }

        if self.check_keyword(Keyword::Else) {
            self.advance();
            case = case.otherwise(self.parse_expression(0)?);
        }

        self.expect_keyword(Keyword::End)?;
        Ok(Expression::Case(case))
    }

    fn parse_expression_list(&mut self) -> Result<Vec<Expression>, EvaluationError> {
        let mut list = vec![self.parse_expression(0)?];
        while self.check(&TokenKind::Comma) {
            self.advance();
            list.push(self.parse_expression(0)?);
        }
        Ok(list)
    }

    // --- Helper methods ---

    fn current(&self) -> &Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[self.pos.min(last)]
    }

    fn peek(&self) -> &TokenKind {
        self.tokens
            .get(self.pos + 1)
            .map_or(&TokenKind::Eof, |token| &token.kind)
    }

    fn advance(&mut self) {
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn check(&self, kind: &TokenKind) -> bool {
        core::mem::discriminant(&self.current().kind) == core::mem::discriminant(kind)
    }

    fn check_keyword(&self, keyword: Keyword) -> bool {
        matches!(&self.current().kind, TokenKind::Keyword(kw) if *kw == keyword)
    }

    fn expect(&mut self, kind: &TokenKind, expected: &str) -> Result<(), EvaluationError> {
        if self.check(kind) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> Result<(), EvaluationError> {
        if self.check_keyword(keyword) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(&keyword.as_str().to_ascii_uppercase()))
        }
    }

    fn unexpected(&self, expected: &str) -> EvaluationError {
        let token = self.current();
        let mut err = EvaluationError::unexpected(expected, self.input, token.offset);
        err.message = format!("{}, found {}", err.message, token.kind.describe());
        err
    }
}
