//! Expression tree.
//!
//! An [`Expression`] is a closed set of node variants. Nodes carry no build
//! state and can be tokenized any number of times, against any platform.
//! Most variants render themselves through [`Tokenizable`]; the remaining
//! shapes (operations, calls, values, lists, raw identifiers) are rendered
//! by the [`Tokenizer`](crate::tokenizer::Tokenizer).

mod conditional;
mod function;
mod operator;
mod reference;

pub use conditional::{Alternative, Between, CaseExpression, Group, InOperator};
pub use function::{FunctionCall, MetaFunction, MetaFunctionCall};
pub use operator::{
    BinaryOperator, UnaryOperator, COMPARISON_PRECEDENCE, NOT_PRECEDENCE, PREFIX_PRECEDENCE,
};
pub use reference::{Column, Join, JoinFlags, Parameter, Table, TableReference};

pub(crate) use reference::push_path;

use crate::platform::KeywordId;
use crate::statement::SelectQuery;
use crate::tokenizer::Tokenizable;
use crate::types::{DataType, Value};

/// Nodes that know their semantic type.
pub trait DataTyped {
    /// Semantic type of the node, `UNDEFINED` when it depends on schema
    /// knowledge the node does not have.
    fn data_type(&self) -> DataType;
}

/// A literal value with its semantic type.
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    /// The value.
    pub value: Value,
    /// Type used to serialize the value.
    pub data_type: DataType,
}

impl Literal {
    /// Creates a literal typed after its value.
    #[must_use]
    pub fn new(value: impl Into<Value>) -> Self {
        let value = value.into();
        Self {
            data_type: value.data_type(),
            value,
        }
    }

    /// Creates a literal with an explicit type.
    #[must_use]
    pub fn typed(value: impl Into<Value>, data_type: DataType) -> Self {
        Self {
            value: value.into(),
            data_type,
        }
    }
}

/// A prefix operation.
#[derive(Debug, Clone, PartialEq)]
pub struct UnaryOperation {
    /// Operator.
    pub operator: UnaryOperator,
    /// Operand.
    pub operand: Box<Expression>,
}

/// An infix operation.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryOperation {
    /// Operator.
    pub operator: BinaryOperator,
    /// Left operand.
    pub left: Box<Expression>,
    /// Right operand.
    pub right: Box<Expression>,
}

/// An SQL expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// A literal value.
    Literal(Literal),
    /// A column reference.
    Column(Column),
    /// A named parameter.
    Parameter(Parameter),
    /// A prefix operation.
    Unary(UnaryOperation),
    /// An infix operation.
    Binary(BinaryOperation),
    /// `x [NOT] BETWEEN a AND b`.
    Between(Between),
    /// `x [NOT] IN (...)`.
    In(InOperator),
    /// A function call, rendered as written.
    Function(FunctionCall),
    /// A portable function, translated per platform.
    MetaFunction(MetaFunctionCall),
    /// One `WHEN .. THEN ..` branch. Only valid inside a CASE.
    Alternative(Box<Alternative>),
    /// A CASE expression.
    Case(CaseExpression),
    /// A delimited sub-expression.
    Group(Group),
    /// A table reference.
    Table(Table),
    /// A table reference with an optional alias.
    TableReference(TableReference),
    /// A join clause.
    Join(Box<Join>),
    /// A comma separated list.
    List(Vec<Expression>),
    /// A platform keyword.
    Keyword(KeywordId),
    /// A raw identifier, quoted but never resolved.
    Identifier(String),
    /// `*`.
    Wildcard,
    /// A parenthesized sub-select.
    SubSelect(Box<SelectQuery>),
}

impl Expression {
    /// Creates a literal.
    #[must_use]
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(Literal::new(value))
    }

    /// Creates a NULL literal.
    #[must_use]
    pub fn null() -> Self {
        Self::Literal(Literal::new(Value::Null))
    }

    /// Creates a column reference from a dotted path.
    #[must_use]
    pub fn column(path: impl Into<String>) -> Self {
        Self::Column(Column::new(path))
    }

    /// Creates a parameter reference.
    #[must_use]
    pub fn parameter(name: impl Into<String>) -> Self {
        Self::Parameter(Parameter::new(name))
    }

    /// Creates a table reference from a dotted path.
    #[must_use]
    pub fn table(path: impl Into<String>) -> Self {
        Self::Table(Table::new(path))
    }

    /// Creates a function call.
    #[must_use]
    pub fn function(name: impl Into<String>, args: Vec<Self>) -> Self {
        Self::Function(FunctionCall::new(name, args))
    }

    /// Creates a portable function call.
    #[must_use]
    pub const fn meta_function(function: MetaFunction, args: Vec<Self>) -> Self {
        Self::MetaFunction(MetaFunctionCall::new(function, args))
    }

    /// Wraps in parentheses.
    #[must_use]
    pub fn group(self) -> Self {
        Self::Group(Group::new(self))
    }

    /// Creates a prefix operation.
    #[must_use]
    pub fn unary(operator: UnaryOperator, operand: Self) -> Self {
        Self::Unary(UnaryOperation {
            operator,
            operand: Box::new(operand),
        })
    }

    /// Creates an infix operation.
    #[must_use]
    pub fn binary(self, operator: BinaryOperator, right: Self) -> Self {
        Self::Binary(BinaryOperation {
            operator,
            left: Box::new(self),
            right: Box::new(right),
        })
    }

    /// Creates an equality expression.
    #[must_use]
    pub fn eq(self, right: Self) -> Self {
        self.binary(BinaryOperator::Eq, right)
    }

    /// Creates an inequality expression.
    #[must_use]
    pub fn not_eq(self, right: Self) -> Self {
        self.binary(BinaryOperator::NotEq, right)
    }

    /// Creates a less-than expression.
    #[must_use]
    pub fn lt(self, right: Self) -> Self {
        self.binary(BinaryOperator::Lt, right)
    }

    /// Creates a greater-than expression.
    #[must_use]
    pub fn gt(self, right: Self) -> Self {
        self.binary(BinaryOperator::Gt, right)
    }

    /// Creates an AND expression.
    #[must_use]
    pub fn and(self, right: Self) -> Self {
        self.binary(BinaryOperator::And, right)
    }

    /// Creates an OR expression.
    #[must_use]
    pub fn or(self, right: Self) -> Self {
        self.binary(BinaryOperator::Or, right)
    }

    /// Creates a NOT expression.
    #[must_use]
    pub fn not(self) -> Self {
        Self::unary(UnaryOperator::Not, self)
    }

    /// Creates a BETWEEN expression.
    #[must_use]
    pub fn between(self, min: Self, max: Self) -> Self {
        Self::Between(Between::new(self, min, max, true))
    }

    /// Creates a NOT BETWEEN expression.
    #[must_use]
    pub fn not_between(self, min: Self, max: Self) -> Self {
        Self::Between(Between::new(self, min, max, false))
    }

    /// Creates an IN expression.
    #[must_use]
    pub fn in_list(self, list: Vec<Self>) -> Self {
        Self::In(InOperator::new(self, list, true))
    }

    /// Creates a NOT IN expression.
    #[must_use]
    pub fn not_in_list(self, list: Vec<Self>) -> Self {
        Self::In(InOperator::new(self, list, false))
    }

    /// Folds operands with AND. Returns `None` for an empty input.
    #[must_use]
    pub fn all(operands: impl IntoIterator<Item = Self>) -> Option<Self> {
        operands.into_iter().reduce(Self::and)
    }

    /// Name of the variant, used in error messages.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Literal(_) => "Literal",
            Self::Column(_) => "Column",
            Self::Parameter(_) => "Parameter",
            Self::Unary(_) => "UnaryOperation",
            Self::Binary(_) => "BinaryOperation",
            Self::Between(_) => "Between",
            Self::In(_) => "InOperator",
            Self::Function(_) => "FunctionCall",
            Self::MetaFunction(_) => "MetaFunctionCall",
            Self::Alternative(_) => "Alternative",
            Self::Case(_) => "CaseExpression",
            Self::Group(_) => "Group",
            Self::Table(_) => "Table",
            Self::TableReference(_) => "TableReference",
            Self::Join(_) => "Join",
            Self::List(_) => "List",
            Self::Keyword(_) => "Keyword",
            Self::Identifier(_) => "Identifier",
            Self::Wildcard => "Wildcard",
            Self::SubSelect(_) => "SubSelect",
        }
    }

    /// Binding strength of the node when it appears as an operand. Atoms
    /// bind tightest.
    #[must_use]
    pub const fn precedence(&self) -> u8 {
        match self {
            Self::Unary(op) => op.operator.precedence(),
            Self::Binary(op) => op.operator.precedence(),
            Self::Between(_) | Self::In(_) => COMPARISON_PRECEDENCE,
            _ => u8::MAX,
        }
    }

    /// The node's own rendering, for variants that tokenize themselves.
    #[must_use]
    pub fn as_tokenizable(&self) -> Option<&dyn Tokenizable> {
        let node: &dyn Tokenizable = match self {
            Self::Column(node) => node,
            Self::Parameter(node) => node,
            Self::Between(node) => node,
            Self::In(node) => node,
            Self::MetaFunction(node) => node,
            Self::Case(node) => node,
            Self::Group(node) => node,
            Self::Table(node) => node,
            Self::TableReference(node) => node,
            Self::Join(node) => node.as_ref(),
            Self::Keyword(id) => id,
            _ => return None,
        };
        Some(node)
    }
}

impl From<Literal> for Expression {
    fn from(value: Literal) -> Self {
        Self::Literal(value)
    }
}

impl From<Column> for Expression {
    fn from(value: Column) -> Self {
        Self::Column(value)
    }
}

impl From<Parameter> for Expression {
    fn from(value: Parameter) -> Self {
        Self::Parameter(value)
    }
}

impl From<SelectQuery> for Expression {
    fn from(value: SelectQuery) -> Self {
        Self::SubSelect(Box::new(value))
    }
}

impl DataTyped for Literal {
    fn data_type(&self) -> DataType {
        self.data_type
    }
}

impl DataTyped for Expression {
    fn data_type(&self) -> DataType {
        match self {
            Self::Literal(literal) => literal.data_type,
            Self::Parameter(parameter) => parameter.data_type,
            Self::Unary(op) => op.operator.result_type(op.operand.data_type()),
            Self::Binary(op) => op
                .operator
                .result_type(op.left.data_type(), op.right.data_type()),
            Self::Between(_) | Self::In(_) => DataType::BOOLEAN,
            Self::MetaFunction(call) => call.data_type(),
            Self::Alternative(alternative) => alternative.then.data_type(),
            Self::Case(case) => case.data_type(),
            Self::Group(group) => group.inner.data_type(),
            Self::Keyword(KeywordId::Null) => DataType::NULL,
            Self::Keyword(KeywordId::True | KeywordId::False) => DataType::BOOLEAN,
            Self::Keyword(KeywordId::CurrentTimestamp) => DataType::TIMESTAMP,
            Self::SubSelect(select) => select.data_type(),
            Self::Column(_)
            | Self::Function(_)
            | Self::Table(_)
            | Self::TableReference(_)
            | Self::Join(_)
            | Self::List(_)
            | Self::Keyword(_)
            | Self::Identifier(_)
            | Self::Wildcard => DataType::UNDEFINED,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_types() {
        assert_eq!(Expression::literal(12).data_type(), DataType::INTEGER);
        assert_eq!(Expression::literal(1.5).data_type(), DataType::FLOAT);
        assert_eq!(Expression::literal("x").data_type(), DataType::STRING);
        assert_eq!(Expression::null().data_type(), DataType::NULL);
    }

    #[test]
    fn test_undefined_propagates() {
        let sum = Expression::column("a").binary(BinaryOperator::Add, Expression::literal(1));
        assert_eq!(sum.data_type(), DataType::UNDEFINED);
        let typed = Expression::literal(2).binary(BinaryOperator::Mul, Expression::literal(1.5));
        assert_eq!(typed.data_type(), DataType::FLOAT);
        assert_eq!(
            Expression::column("a").eq(Expression::literal(1)).data_type(),
            DataType::BOOLEAN
        );
        assert_eq!(
            Expression::literal(1).group().data_type(),
            DataType::INTEGER
        );
    }

    #[test]
    fn test_fold_all() {
        let folded = Expression::all([
            Expression::column("a"),
            Expression::column("b"),
            Expression::column("c"),
        ])
        .unwrap();
        let Expression::Binary(outer) = folded else {
            panic!("expected binary");
        };
        assert_eq!(outer.operator, BinaryOperator::And);
        assert_eq!(*outer.right, Expression::column("c"));
        assert!(Expression::all(Vec::new()).is_none());
    }

    #[test]
    fn test_self_tokenizing_variants() {
        assert!(Expression::column("a").as_tokenizable().is_some());
        assert!(Expression::literal(1).as_tokenizable().is_none());
        assert!(Expression::Wildcard.as_tokenizable().is_none());
        assert_eq!(Expression::Wildcard.kind(), "Wildcard");
    }
}
