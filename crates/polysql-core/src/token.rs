//! Dialect-neutral token stream.
//!
//! Statement and expression nodes append typed tokens to a [`TokenStream`];
//! the statement builder later concatenates them into SQL text. Tokens are
//! immutable once appended. Only [`TokenStream::stream_at`] inserts in the
//! middle of a stream.

use core::fmt;

use crate::context::Context;
use crate::error::Result;
use crate::expression::Expression;
use crate::tokenizer::Tokenizer;

/// Token categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    /// SQL keyword, already spelled for the target dialect.
    Keyword,
    /// Identifier, already quoted for the target dialect.
    Identifier,
    /// Literal value, already serialized for the target dialect.
    Literal,
    /// Parameter key; the placeholder is chosen when the statement is finalized.
    Parameter,
    /// Punctuation and operators.
    Text,
    /// Whitespace separator.
    Space,
    /// Comment text.
    Comment,
}

/// A single token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    value: String,
    token_type: TokenType,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub fn new(value: impl Into<String>, token_type: TokenType) -> Self {
        Self {
            value: value.into(),
            token_type,
        }
    }

    /// The token text.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The token category.
    #[must_use]
    pub const fn token_type(&self) -> TokenType {
        self.token_type
    }
}

/// An ordered sequence of tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    /// Creates an empty stream.
    #[must_use]
    pub const fn new() -> Self {
        Self { tokens: Vec::new() }
    }

    /// Appends a token.
    pub fn push(&mut self, token: Token) -> &mut Self {
        self.tokens.push(token);
        self
    }

    /// Appends a single space.
    pub fn space(&mut self) -> &mut Self {
        self.push(Token::new(" ", TokenType::Space))
    }

    /// Appends a keyword.
    pub fn keyword(&mut self, value: impl Into<String>) -> &mut Self {
        self.push(Token::new(value, TokenType::Keyword))
    }

    /// Appends an identifier.
    pub fn identifier(&mut self, value: impl Into<String>) -> &mut Self {
        self.push(Token::new(value, TokenType::Identifier))
    }

    /// Appends a literal.
    pub fn literal(&mut self, value: impl Into<String>) -> &mut Self {
        self.push(Token::new(value, TokenType::Literal))
    }

    /// Appends punctuation or operator text.
    pub fn text(&mut self, value: impl Into<String>) -> &mut Self {
        self.push(Token::new(value, TokenType::Text))
    }

    /// Appends a parameter key.
    pub fn parameter(&mut self, key: impl Into<String>) -> &mut Self {
        self.push(Token::new(key, TokenType::Parameter))
    }

    /// Appends a `/* .. */` comment. A `*/` inside the text is broken up
    /// so the comment cannot end early.
    pub fn comment(&mut self, value: impl AsRef<str>) -> &mut Self {
        let text = value.as_ref().replace("*/", "* /");
        self.push(Token::new(format!("/* {text} */"), TokenType::Comment))
    }

    /// Tokenizes an expression and appends its tokens.
    ///
    /// # Errors
    ///
    /// Propagates tokenization and resolution errors of the expression.
    pub fn expression(&mut self, expression: &Expression, context: &mut Context) -> Result<&mut Self> {
        Tokenizer::tokenize(self, expression, context)?;
        Ok(self)
    }

    /// Tokenizes a list of expressions separated by `separator` and a space.
    ///
    /// # Errors
    ///
    /// Propagates the first tokenization error.
    pub fn expressions<'e>(
        &mut self,
        expressions: impl IntoIterator<Item = &'e Expression>,
        separator: &str,
        context: &mut Context,
    ) -> Result<&mut Self> {
        for (index, expression) in expressions.into_iter().enumerate() {
            if index > 0 {
                self.text(separator).space();
            }
            self.expression(expression, context)?;
        }
        Ok(self)
    }

    /// Appends all tokens of `other`.
    pub fn stream(&mut self, other: Self) -> &mut Self {
        self.tokens.extend(other.tokens);
        self
    }

    /// Inserts all tokens of `other` before the token at `index`.
    ///
    /// An index past the end appends.
    pub fn stream_at(&mut self, other: Self, index: usize) -> &mut Self {
        let index = index.min(self.tokens.len());
        self.tokens.splice(index..index, other.tokens);
        self
    }

    /// Number of tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns true if the stream holds no token.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Iterates over the tokens.
    pub fn iter(&self) -> core::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    /// Returns the token at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }
}

impl<'a> IntoIterator for &'a TokenStream {
    type Item = &'a Token;
    type IntoIter = core::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

/// Debug rendering: parameters are shown as `:key`.
impl fmt::Display for TokenStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in &self.tokens {
            match token.token_type {
                TokenType::Parameter => write!(f, ":{}", token.value)?,
                _ => f.write_str(&token.value)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chained_appends() {
        let mut stream = TokenStream::new();
        stream
            .keyword("SELECT")
            .space()
            .identifier("id")
            .space()
            .keyword("FROM")
            .space()
            .identifier("users");
        assert_eq!(stream.len(), 7);
        assert_eq!(stream.to_string(), "SELECT id FROM users");
        assert_eq!(stream.get(2).map(Token::token_type), Some(TokenType::Identifier));
    }

    #[test]
    fn test_stream_at_splices_in_place() {
        let mut stream = TokenStream::new();
        stream.keyword("SELECT").space().keyword("FROM").space().identifier("t");

        let mut columns = TokenStream::new();
        columns.identifier("a").text(",").space().identifier("b").space();
        stream.stream_at(columns, 2);

        assert_eq!(stream.to_string(), "SELECT a, b FROM t");
    }

    #[test]
    fn test_stream_at_past_end_appends() {
        let mut stream = TokenStream::new();
        stream.keyword("DELETE");
        let mut tail = TokenStream::new();
        tail.space().keyword("FROM");
        stream.stream_at(tail, 42);
        assert_eq!(stream.to_string(), "DELETE FROM");
    }

    #[test]
    fn test_comment_is_formatted_on_append() {
        let mut stream = TokenStream::new();
        stream.comment("nightly */ job");
        assert_eq!(stream.get(0).map(Token::value), Some("/* nightly * / job */"));
        assert_eq!(stream.get(0).map(Token::token_type), Some(TokenType::Comment));
    }

    #[test]
    fn test_display_marks_parameters() {
        let mut stream = TokenStream::new();
        stream.identifier("a").space().text("=").space().parameter("p1");
        assert_eq!(stream.to_string(), "a = :p1");
    }
}
