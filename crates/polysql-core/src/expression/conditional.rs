//! BETWEEN, IN, CASE and grouping.

use crate::context::Context;
use crate::error::Result;
use crate::token::TokenStream;
use crate::tokenizer::{Tokenizable, Tokenizer};
use crate::types::DataType;

use super::{DataTyped, Expression, COMPARISON_PRECEDENCE};

/// `left [NOT] BETWEEN min AND max`. `toggle` is false for NOT BETWEEN.
#[derive(Debug, Clone, PartialEq)]
pub struct Between {
    /// Tested expression.
    pub left: Box<Expression>,
    /// Lower bound.
    pub min: Box<Expression>,
    /// Upper bound.
    pub max: Box<Expression>,
    /// False for `NOT BETWEEN`.
    pub toggle: bool,
}

impl Between {
    /// Creates a range test.
    #[must_use]
    pub fn new(left: Expression, min: Expression, max: Expression, toggle: bool) -> Self {
        Self {
            left: Box::new(left),
            min: Box::new(min),
            max: Box::new(max),
            toggle,
        }
    }
}

impl Tokenizable for Between {
    fn tokenize(&self, stream: &mut TokenStream, context: &mut Context) -> Result<()> {
        Tokenizer::operand(stream, &self.left, context, COMPARISON_PRECEDENCE, true)?;
        stream.space();
        if !self.toggle {
            stream.keyword("NOT").space();
        }
        stream.keyword("BETWEEN").space();
        Tokenizer::operand(stream, &self.min, context, COMPARISON_PRECEDENCE, true)?;
        stream.space().keyword("AND").space();
        Tokenizer::operand(stream, &self.max, context, COMPARISON_PRECEDENCE, true)
    }
}

/// `left [NOT] IN (list)`. `toggle` is false for NOT IN.
#[derive(Debug, Clone, PartialEq)]
pub struct InOperator {
    /// Tested expression.
    pub left: Box<Expression>,
    /// Candidate values, or a single sub-select.
    pub list: Vec<Expression>,
    /// False for `NOT IN`.
    pub toggle: bool,
}

impl InOperator {
    /// Creates a membership test.
    #[must_use]
    pub fn new(left: Expression, list: Vec<Expression>, toggle: bool) -> Self {
        Self {
            left: Box::new(left),
            list,
            toggle,
        }
    }
}

impl Tokenizable for InOperator {
    fn tokenize(&self, stream: &mut TokenStream, context: &mut Context) -> Result<()> {
        Tokenizer::operand(stream, &self.left, context, COMPARISON_PRECEDENCE, true)?;
        stream.space();
        if !self.toggle {
            stream.keyword("NOT").space();
        }
        stream.keyword("IN").space();
        // A lone sub-select brings its own parentheses.
        if let [sub @ Expression::SubSelect(_)] = self.list.as_slice() {
            return stream.expression(sub, context).map(|_| ());
        }
        stream.text("(");
        stream.expressions(&self.list, ",", context)?;
        stream.text(")");
        Ok(())
    }
}

/// One `WHEN when THEN then` branch of a CASE.
#[derive(Debug, Clone, PartialEq)]
pub struct Alternative {
    /// Condition, or value compared with the CASE subject.
    pub when: Expression,
    /// Result of the branch.
    pub then: Expression,
}

impl Alternative {
    /// Creates a branch.
    #[must_use]
    pub const fn new(when: Expression, then: Expression) -> Self {
        Self { when, then }
    }
}

/// `CASE [subject] WHEN .. THEN .. [ELSE ..] END`.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseExpression {
    /// Value compared with each branch; `None` for a searched CASE.
    pub subject: Option<Box<Expression>>,
    /// Branches, in declaration order.
    pub alternatives: Vec<Alternative>,
    /// ELSE result.
    pub else_expr: Option<Box<Expression>>,
}

impl CaseExpression {
    /// Creates a CASE without branches.
    #[must_use]
    pub fn new(subject: Option<Expression>) -> Self {
        Self {
            subject: subject.map(Box::new),
            alternatives: Vec::new(),
            else_expr: None,
        }
    }

    /// Appends a branch.
    #[must_use]
    pub fn when(mut self, when: Expression, then: Expression) -> Self {
        self.alternatives.push(Alternative::new(when, then));
        self
    }

    /// Sets the ELSE result.
    #[must_use]
    pub fn otherwise(mut self, else_expr: Expression) -> Self {
        self.else_expr = Some(Box::new(else_expr));
        self
    }
}

/// Union of the branch types, `UNDEFINED` as soon as one branch is.
impl DataTyped for CaseExpression {
    fn data_type(&self) -> DataType {
        let results = self
            .alternatives
            .iter()
            .map(|a| &a.then)
            .chain(self.else_expr.as_deref());
        let mut data_type = DataType::UNDEFINED;
        for result in results {
            let branch = result.data_type();
            if branch.is_undefined() {
                return DataType::UNDEFINED;
            }
            data_type |= branch;
        }
        data_type
    }
}

impl Tokenizable for CaseExpression {
    fn tokenize(&self, stream: &mut TokenStream, context: &mut Context) -> Result<()> {
        stream.keyword("CASE");
        if let Some(subject) = &self.subject {
            stream.space();
            stream.expression(subject, context)?;
        }
        for alternative in &self.alternatives {
            stream.space().keyword("WHEN").space();
            stream.expression(&alternative.when, context)?;
            stream.space().keyword("THEN").space();
            stream.expression(&alternative.then, context)?;
        }
        if let Some(else_expr) = &self.else_expr {
            stream.space().keyword("ELSE").space();
            stream.expression(else_expr, context)?;
        }
        stream.space().keyword("END");
        Ok(())
    }
}

/// A sub-expression between delimiters, `(` and `)` unless overridden.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    /// Wrapped expression.
    pub inner: Box<Expression>,
    /// Opening delimiter.
    pub open: String,
    /// Closing delimiter.
    pub close: String,
}

impl Group {
    /// Wraps in parentheses.
    #[must_use]
    pub fn new(inner: Expression) -> Self {
        Self::delimited(inner, "(", ")")
    }

    /// Wraps in custom delimiters.
    #[must_use]
    pub fn delimited(inner: Expression, open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            inner: Box::new(inner),
            open: open.into(),
            close: close.into(),
        }
    }
}

impl Tokenizable for Group {
    fn tokenize(&self, stream: &mut TokenStream, context: &mut Context) -> Result<()> {
        stream.text(self.open.clone());
        stream.expression(&self.inner, context)?;
        stream.text(self.close.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::platform::GenericPlatform;

    fn render(expression: &Expression) -> String {
        let mut context = Context::new(Arc::new(GenericPlatform::new()));
        context.push_resolver_context(None);
        let mut stream = TokenStream::new();
        stream.expression(expression, &mut context).unwrap();
        stream.to_string()
    }

    #[test]
    fn test_not_between() {
        let expression = Expression::column("peace")
            .not_between(Expression::literal(1940), Expression::literal(1945));
        assert_eq!(render(&expression), "peace NOT BETWEEN 1940 AND 1945");
    }

    #[test]
    fn test_between_groups_logical_bounds() {
        let expression = Expression::column("a").between(
            Expression::column("b").or(Expression::column("c")),
            Expression::literal(2),
        );
        assert_eq!(render(&expression), "a BETWEEN (b OR c) AND 2");
    }

    #[test]
    fn test_in_list() {
        let expression = Expression::column("id").not_in_list(vec![
            Expression::literal(1),
            Expression::literal(2),
        ]);
        assert_eq!(render(&expression), "id NOT IN (1, 2)");
    }

    #[test]
    fn test_case_keeps_branch_order() {
        let case = CaseExpression::new(Some(Expression::column("grade")))
            .when(Expression::literal("A"), Expression::literal(4))
            .when(Expression::literal("B"), Expression::literal(3));
        assert_eq!(
            render(&Expression::Case(case.clone())),
            "CASE grade WHEN 'A' THEN 4 WHEN 'B' THEN 3 END"
        );
        let with_else = case.otherwise(Expression::literal(0));
        assert_eq!(
            render(&Expression::Case(with_else)),
            "CASE grade WHEN 'A' THEN 4 WHEN 'B' THEN 3 ELSE 0 END"
        );
    }

    #[test]
    fn test_case_data_type() {
        let case = CaseExpression::new(None)
            .when(Expression::column("x").gt(Expression::literal(1)), Expression::literal(1))
            .otherwise(Expression::literal(1.5));
        assert_eq!(case.data_type(), DataType::NUMBER);
        let undefined = CaseExpression::new(None)
            .when(Expression::literal(true), Expression::column("y"));
        assert_eq!(undefined.data_type(), DataType::UNDEFINED);
    }

    #[test]
    fn test_custom_group_delimiters() {
        let group = Group::delimited(Expression::literal(1), "[", "]");
        assert_eq!(render(&Expression::Group(group)), "[1]");
    }
}
