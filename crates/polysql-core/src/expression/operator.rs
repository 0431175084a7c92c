//! Unary and binary operators.

use crate::types::DataType;

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,

    // Comparison
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,

    // Logical
    And,
    Or,

    // String
    Like,

    // Bitwise
    BitAnd,
    BitOr,
    BitXor,
    LeftShift,
    RightShift,
}

impl BinaryOperator {
    /// All operators, in declaration order.
    pub const ALL: [Self; 19] = [
        Self::Add,
        Self::Sub,
        Self::Mul,
        Self::Div,
        Self::Mod,
        Self::Eq,
        Self::NotEq,
        Self::Lt,
        Self::LtEq,
        Self::Gt,
        Self::GtEq,
        Self::And,
        Self::Or,
        Self::Like,
        Self::BitAnd,
        Self::BitOr,
        Self::BitXor,
        Self::LeftShift,
        Self::RightShift,
    ];

    /// Parses the textual form used by the mini-language and polish notation.
    ///
    /// Several spellings map to one operator (`=`/`==`, `<>`/`!=`). Keyword
    /// operators are matched case-insensitively.
    #[must_use]
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        let op = match symbol {
            "+" => Self::Add,
            "-" => Self::Sub,
            "*" => Self::Mul,
            "/" => Self::Div,
            "%" => Self::Mod,
            "=" | "==" => Self::Eq,
            "<>" | "!=" => Self::NotEq,
            "<" => Self::Lt,
            "<=" => Self::LtEq,
            ">" => Self::Gt,
            ">=" => Self::GtEq,
            "&" => Self::BitAnd,
            "|" => Self::BitOr,
            "^" => Self::BitXor,
            "<<" => Self::LeftShift,
            ">>" => Self::RightShift,
            _ => match symbol.to_ascii_lowercase().as_str() {
                "and" => Self::And,
                "or" => Self::Or,
                "like" => Self::Like,
                _ => return None,
            },
        };
        Some(op)
    }

    /// Returns the ANSI SQL representation of the operator.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Eq => "=",
            Self::NotEq => "<>",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Like => "LIKE",
            Self::BitAnd => "&",
            Self::BitOr => "|",
            Self::BitXor => "^",
            Self::LeftShift => "<<",
            Self::RightShift => ">>",
        }
    }

    /// Returns true if the operator is spelled as a keyword.
    #[must_use]
    pub const fn is_keyword(&self) -> bool {
        matches!(self, Self::And | Self::Or | Self::Like)
    }

    /// Returns the precedence of the operator (higher = binds tighter).
    #[must_use]
    pub const fn precedence(&self) -> u8 {
        match self {
            Self::Or => 1,
            Self::And => 2,
            Self::Eq | Self::NotEq | Self::Lt | Self::LtEq | Self::Gt | Self::GtEq | Self::Like => {
                COMPARISON_PRECEDENCE
            }
            Self::BitOr => 5,
            Self::BitXor => 6,
            Self::BitAnd => 7,
            Self::LeftShift | Self::RightShift => 8,
            Self::Add | Self::Sub => 9,
            Self::Mul | Self::Div | Self::Mod => 10,
        }
    }

    /// Returns true if `(a op b) op c` equals `a op (b op c)`.
    #[must_use]
    pub const fn is_associative(&self) -> bool {
        matches!(
            self,
            Self::Add | Self::Mul | Self::And | Self::Or | Self::BitAnd | Self::BitOr | Self::BitXor
        )
    }

    /// Infers the result type from the operand types.
    #[must_use]
    pub fn result_type(&self, left: DataType, right: DataType) -> DataType {
        match self {
            Self::Eq
            | Self::NotEq
            | Self::Lt
            | Self::LtEq
            | Self::Gt
            | Self::GtEq
            | Self::And
            | Self::Or
            | Self::Like => DataType::BOOLEAN,
            _ if left.is_undefined() || right.is_undefined() => DataType::UNDEFINED,
            Self::BitAnd | Self::BitOr | Self::BitXor | Self::LeftShift | Self::RightShift => {
                DataType::INTEGER
            }
            Self::Add | Self::Sub | Self::Mul | Self::Div | Self::Mod => {
                if left.is_numeric() && right.is_numeric() {
                    if left.intersects(DataType::FLOAT) || right.intersects(DataType::FLOAT) {
                        DataType::FLOAT
                    } else {
                        DataType::INTEGER
                    }
                } else if matches!(self, Self::Add | Self::Sub) && left.is_temporal() {
                    left
                } else {
                    DataType::UNDEFINED
                }
            }
        }
    }
}

/// Precedence shared by comparisons, `BETWEEN` and `IN`.
pub const COMPARISON_PRECEDENCE: u8 = 4;

/// Precedence of prefix `NOT`.
pub const NOT_PRECEDENCE: u8 = 3;

/// Precedence of prefix `-` and `~`.
pub const PREFIX_PRECEDENCE: u8 = 11;

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    /// Negation (-)
    Neg,
    /// Logical NOT
    Not,
    /// Bitwise NOT (~)
    BitNot,
}

impl UnaryOperator {
    /// Parses the textual form (`-`, `not`, `!`, `~`).
    #[must_use]
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "-" => Some(Self::Neg),
            "!" => Some(Self::Not),
            "~" => Some(Self::BitNot),
            _ if symbol.eq_ignore_ascii_case("not") => Some(Self::Not),
            _ => None,
        }
    }

    /// Returns the SQL representation of the operator.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Neg => "-",
            Self::Not => "NOT",
            Self::BitNot => "~",
        }
    }

    /// Returns the precedence of the operator.
    #[must_use]
    pub const fn precedence(&self) -> u8 {
        match self {
            Self::Not => NOT_PRECEDENCE,
            Self::Neg | Self::BitNot => PREFIX_PRECEDENCE,
        }
    }

    /// Infers the result type from the operand type.
    #[must_use]
    pub const fn result_type(&self, operand: DataType) -> DataType {
        match self {
            Self::Not => DataType::BOOLEAN,
            Self::Neg => operand,
            Self::BitNot => {
                if operand.is_undefined() {
                    DataType::UNDEFINED
                } else {
                    DataType::INTEGER
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_op_precedence() {
        assert!(BinaryOperator::Mul.precedence() > BinaryOperator::Add.precedence());
        assert!(BinaryOperator::And.precedence() > BinaryOperator::Or.precedence());
        assert!(BinaryOperator::Eq.precedence() > BinaryOperator::And.precedence());
        assert!(UnaryOperator::Not.precedence() < COMPARISON_PRECEDENCE);
    }

    #[test]
    fn test_symbol_aliases() {
        assert_eq!(BinaryOperator::from_symbol("=="), Some(BinaryOperator::Eq));
        assert_eq!(BinaryOperator::from_symbol("!="), Some(BinaryOperator::NotEq));
        assert_eq!(BinaryOperator::from_symbol("AND"), Some(BinaryOperator::And));
        assert_eq!(BinaryOperator::from_symbol("between"), None);
        assert_eq!(UnaryOperator::from_symbol("Not"), Some(UnaryOperator::Not));
        assert_eq!(UnaryOperator::from_symbol("!"), Some(UnaryOperator::Not));
    }

    #[test]
    fn test_result_type_propagates_undefined() {
        let add = BinaryOperator::Add;
        assert_eq!(
            add.result_type(DataType::INTEGER, DataType::INTEGER),
            DataType::INTEGER
        );
        assert_eq!(
            add.result_type(DataType::INTEGER, DataType::FLOAT),
            DataType::FLOAT
        );
        assert_eq!(
            add.result_type(DataType::INTEGER, DataType::UNDEFINED),
            DataType::UNDEFINED
        );
        assert_eq!(
            BinaryOperator::Lt.result_type(DataType::UNDEFINED, DataType::UNDEFINED),
            DataType::BOOLEAN
        );
    }
}
