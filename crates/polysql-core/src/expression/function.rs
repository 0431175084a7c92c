//! Function calls.

use core::fmt;

use crate::context::Context;
use crate::error::{Error, Result};
use crate::platform::FunctionTranslation;
use crate::token::TokenStream;
use crate::tokenizer::Tokenizable;
use crate::types::DataType;

use super::{DataTyped, Expression};

/// A function call rendered with the name as written.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    /// Function name.
    pub name: String,
    /// Arguments.
    pub args: Vec<Expression>,
}

impl FunctionCall {
    /// Creates a call.
    #[must_use]
    pub fn new(name: impl Into<String>, args: Vec<Expression>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }
}

/// Functions whose spelling differs between platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetaFunction {
    /// Current date and time.
    CurrentTimestamp,
    /// Length of a string in characters.
    StringLength,
    /// Lowercase conversion.
    Lower,
    /// Uppercase conversion.
    Upper,
    /// Substring extraction.
    Substring,
    /// Random number.
    Random,
    /// First non-NULL argument.
    Coalesce,
}

impl MetaFunction {
    /// Every meta function.
    pub const ALL: [Self; 7] = [
        Self::CurrentTimestamp,
        Self::StringLength,
        Self::Lower,
        Self::Upper,
        Self::Substring,
        Self::Random,
        Self::Coalesce,
    ];

    /// Portable name, as accepted by [`MetaFunction::from_name`].
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CurrentTimestamp => "current_timestamp",
            Self::StringLength => "string_length",
            Self::Lower => "lower",
            Self::Upper => "upper",
            Self::Substring => "substring",
            Self::Random => "random",
            Self::Coalesce => "coalesce",
        }
    }

    /// Looks up a meta function by portable name, case-insensitively.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(name))
    }

    /// Result type of a call with the given arguments.
    #[must_use]
    pub fn result_type(&self, args: &[Expression]) -> DataType {
        match self {
            Self::CurrentTimestamp => DataType::TIMESTAMP | DataType::TIMEZONE,
            Self::StringLength => DataType::INTEGER,
            Self::Lower | Self::Upper | Self::Substring => DataType::STRING,
            Self::Random => DataType::FLOAT,
            Self::Coalesce => {
                let mut data_type = DataType::UNDEFINED;
                for arg in args {
                    let arg_type = arg.data_type();
                    if arg_type.is_undefined() {
                        return DataType::UNDEFINED;
                    }
                    data_type |= arg_type;
                }
                data_type
            }
        }
    }
}

impl fmt::Display for MetaFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A call of a [`MetaFunction`], translated when tokenized.
#[derive(Debug, Clone, PartialEq)]
pub struct MetaFunctionCall {
    /// The function.
    pub function: MetaFunction,
    /// Arguments.
    pub args: Vec<Expression>,
}

impl MetaFunctionCall {
    /// Creates a call.
    #[must_use]
    pub const fn new(function: MetaFunction, args: Vec<Expression>) -> Self {
        Self { function, args }
    }
}

impl DataTyped for MetaFunctionCall {
    fn data_type(&self) -> DataType {
        self.function.result_type(&self.args)
    }
}

impl Tokenizable for MetaFunctionCall {
    fn tokenize(&self, stream: &mut TokenStream, context: &mut Context) -> Result<()> {
        let platform = context.platform();
        match platform.meta_function(self.function)? {
            FunctionTranslation::Keyword(keyword) => {
                if !self.args.is_empty() {
                    return Err(Error::unsupported(
                        platform.name(),
                        format!("arguments to {keyword}"),
                    ));
                }
                stream.keyword(keyword);
            }
            FunctionTranslation::Call(name) => {
                stream.identifier(name).text("(");
                stream.expressions(&self.args, ",", context)?;
                stream.text(")");
            }
        }
        Ok(())
    }
}
