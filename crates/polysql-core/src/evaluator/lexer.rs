//! Mini-language lexer.

use crate::error::EvaluationError;
use crate::types::{Timestamp, Value};

use super::Grammar;

/// Reserved words of the mini-language, matched case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Keyword {
    And,
    Or,
    Not,
    Like,
    Between,
    In,
    Case,
    When,
    Then,
    Else,
    End,
    True,
    False,
    Null,
}

impl Keyword {
    const ALL: [Self; 14] = [
        Self::And,
        Self::Or,
        Self::Not,
        Self::Like,
        Self::Between,
        Self::In,
        Self::Case,
        Self::When,
        Self::Then,
        Self::Else,
        Self::End,
        Self::True,
        Self::False,
        Self::Null,
    ];

    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
            Self::Not => "not",
            Self::Like => "like",
            Self::Between => "between",
            Self::In => "in",
            Self::Case => "case",
            Self::When => "when",
            Self::Then => "then",
            Self::Else => "else",
            Self::End => "end",
            Self::True => "true",
            Self::False => "false",
            Self::Null => "null",
        }
    }

    fn from_word(word: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|keyword| keyword.as_str().eq_ignore_ascii_case(word))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    Identifier(String),
    Parameter(String),
    String(String),
    Number(Value),
    Timestamp(Timestamp),
    Keyword(Keyword),
    Operator(String),
    LeftParen,
    RightParen,
    Comma,
    Eof,
}

impl TokenKind {
    /// Short description used in error messages.
    pub(crate) fn describe(&self) -> String {
        match self {
            Self::Identifier(name) => format!("identifier {name}"),
            Self::Parameter(name) => format!("parameter :{name}"),
            Self::String(_) => String::from("string"),
            Self::Number(_) => String::from("number"),
            Self::Timestamp(_) => String::from("date/time literal"),
            Self::Keyword(keyword) => keyword.as_str().to_ascii_uppercase(),
            Self::Operator(symbol) => format!("operator {symbol}"),
            Self::LeftParen => String::from("'('"),
            Self::RightParen => String::from("')'"),
            Self::Comma => String::from("','"),
            Self::Eof => String::from("end of input"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    /// Byte offset of the token in the input.
    pub offset: usize,
}

/// Splits mini-language input into tokens using the compiled [`Grammar`].
pub(crate) struct Lexer<'a, 'g> {
    input: &'a str,
    pos: usize,
    grammar: &'g Grammar,
}

impl<'a, 'g> Lexer<'a, 'g> {
    pub(crate) const fn new(input: &'a str, grammar: &'g Grammar) -> Self {
        Self {
            input,
            pos: 0,
            grammar,
        }
    }

    fn rest(&self) -> &'a str {
        self.input.get(self.pos..).unwrap_or_default()
    }

    fn error(&self, message: &str) -> EvaluationError {
        EvaluationError::new(format!("{message} at offset {}", self.pos), self.rest())
    }

    fn token(&mut self, kind: TokenKind, len: usize) -> Token {
        let token = Token {
            kind,
            offset: self.pos,
        };
        self.pos += len;
        token
    }

    /// Scans the next token.
    pub(crate) fn next_token(&mut self) -> Result<Token, EvaluationError> {
        self.pos += self.grammar.whitespace(self.rest());
        let rest = self.rest();
        let Some(first) = rest.chars().next() else {
            return Ok(self.token(TokenKind::Eof, 0));
        };

        match first {
            '(' => return Ok(self.token(TokenKind::LeftParen, 1)),
            ')' => return Ok(self.token(TokenKind::RightParen, 1)),
            ',' => return Ok(self.token(TokenKind::Comma, 1)),
            '\'' => {
                return match self.grammar.string(rest) {
                    Some((len, content)) => Ok(self.token(TokenKind::String(content), len)),
                    None => Err(self.error("unterminated string")),
                };
            }
            '#' => {
                return match self.grammar.timestamp(rest)? {
                    Some((len, value)) => Ok(self.token(TokenKind::Timestamp(value), len)),
                    None => Err(self.error("malformed date/time literal")),
                };
            }
            ':' => {
                return match self.grammar.parameter(rest) {
                    Some((len, name)) => {
                        Ok(self.token(TokenKind::Parameter(String::from(name)), len))
                    }
                    None => Err(self.error("expected parameter name")),
                };
            }
            _ => {}
        }

        if let Some(numeral) = self.grammar.number(rest) {
            let value = Value::from_numeric_str(numeral)
                .ok_or_else(|| self.error("number out of range"))?;
            return Ok(self.token(TokenKind::Number(value), numeral.len()));
        }
        if let Some(word) = self.grammar.identifier(rest) {
            let kind = match Keyword::from_word(word) {
                Some(keyword) => TokenKind::Keyword(keyword),
                None => TokenKind::Identifier(String::from(word)),
            };
            return Ok(self.token(kind, word.len()));
        }
        if let Some(symbol) = self.grammar.operator(rest) {
            return Ok(self.token(TokenKind::Operator(String::from(symbol)), symbol.len()));
        }
        Err(self.error("unexpected character"))
    }

    /// Scans the whole input. The last token is always [`TokenKind::Eof`].
    pub(crate) fn tokenize(mut self) -> Result<Vec<Token>, EvaluationError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }
}
