mod common;

use common::*;
use polysql_core::evaluator::{Evaluator, PolishNode};
use polysql_core::expression::{BinaryOperator, Expression, UnaryOperator};
use polysql_core::platform::DialectKind;
use serde_json::json;

#[test]
fn operator_with_operands() {
    assert_eq!(
        eval_json(json!({"=": ["column", "'value'"]})),
        Expression::column("column").eq(Expression::literal("value"))
    );
    assert_eq!(
        eval_json(json!({">=": ["age", ":min"]})),
        Expression::column("age").binary(BinaryOperator::GtEq, Expression::parameter("min"))
    );
}

#[test]
fn field_equals_shorthand() {
    assert_eq!(
        eval_json(json!({"age": 18})),
        Expression::column("age").eq(Expression::literal(18))
    );
    assert_eq!(
        eval_json(json!({"name": "'bob'"})),
        Expression::column("name").eq(Expression::literal("bob"))
    );
    assert_eq!(
        eval_json(json!({"deleted": null})),
        Expression::column("deleted").eq(Expression::null())
    );
}

#[test]
fn nested_objects() {
    let expression = eval_json(json!({
        "or": [
            {"active": true},
            {"and": [{">": ["age", 65]}, {"country": "'de'"}]}
        ]
    }));
    assert_eq!(
        render(DialectKind::Generic, &expression),
        "active = TRUE OR age > 65 AND country = 'de'"
    );
}

#[test]
fn variadic_and_folds_left() {
    let expression = eval_json(json!({"and": [{"a": 1}, {"b": 2}, {"c": 3}]}));
    let expected = Expression::column("a")
        .eq(Expression::literal(1))
        .and(Expression::column("b").eq(Expression::literal(2)))
        .and(Expression::column("c").eq(Expression::literal(3)));
    assert_eq!(expression, expected);
}

#[test]
fn arity_selects_unary_or_binary() {
    assert_eq!(
        eval_json(json!({"-": ["x"]})),
        Expression::unary(UnaryOperator::Neg, Expression::column("x"))
    );
    assert_eq!(
        eval_json(json!({"-": ["x", 1]})),
        Expression::column("x").binary(BinaryOperator::Sub, Expression::literal(1))
    );
    assert_eq!(
        eval_json(json!({"NOT": ["done"]})),
        Expression::column("done").not()
    );
}

#[test]
fn between_takes_three_operands() {
    assert_eq!(
        eval_json(json!({"between": ["age", 18, 65]})),
        Expression::column("age").between(Expression::literal(18), Expression::literal(65))
    );
    assert_eq!(
        render(
            DialectKind::Generic,
            &eval_json(json!({"not between": ["age", 18, 65]}))
        ),
        "age NOT BETWEEN 18 AND 65"
    );
}

#[test]
fn in_accepts_list_or_operands() {
    let expected = Expression::column("id")
        .in_list(vec![Expression::literal(1), Expression::literal(2)]);
    assert_eq!(eval_json(json!({"in": ["id", [1, 2]]})), expected);
    assert_eq!(eval_json(json!({"in": ["id", 1, 2]})), expected);
    assert_eq!(
        render(DialectKind::Generic, &eval_json(json!({"not in": ["id", [":a", ":b"]]}))),
        "id NOT IN (?, ?)"
    );
}

#[test]
fn function_keys() {
    assert_eq!(
        eval_json(json!({"lower()": ["name"]})),
        Expression::function("lower", vec![Expression::column("name")])
    );
    assert_eq!(
        render(DialectKind::Generic, &eval_json(json!({"=": [{"lower()": ["name"]}, "'bob'"]}))),
        "lower(name) = 'bob'"
    );
}

#[test]
fn text_operands_use_the_mini_language() {
    assert_eq!(
        eval_json(json!({"and": ["a = 1", "b < :max"]})),
        Expression::column("a")
            .eq(Expression::literal(1))
            .and(Expression::column("b").lt(Expression::parameter("max")))
    );
}

#[test]
fn decoded_node_is_evaluable() {
    let node = PolishNode::OperatorCall {
        operator: String::from("<>"),
        operands: vec![json!("status"), json!("'closed'")],
    };
    assert_eq!(
        Evaluator::default().evaluate(node).unwrap(),
        Expression::column("status").not_eq(Expression::literal("closed"))
    );
}

#[test]
fn error_multiple_keys() {
    let err = eval_json_err(json!({"a": 1, "b": 2}));
    assert_eq!(err.message, "polish notation needs exactly one key, found 2");
}

#[test]
fn error_empty_object() {
    let err = eval_json_err(json!({}));
    assert_eq!(err.fragment, "{}");
}

#[test]
fn error_unknown_operator_keeps_fragment() {
    let err = eval_json_err(json!({"<=>": ["a", "b"]}));
    assert_eq!(err.message, "unknown operator for 2 operand(s)");
    assert_eq!(err.fragment, r#"{"<=>":["a","b"]}"#);
}

#[test]
fn error_wrong_arity() {
    assert!(Evaluator::default().evaluate(json!({"between": ["a", 1]})).is_err());
    assert!(Evaluator::default().evaluate(json!({"*": ["a"]})).is_err());
    assert!(Evaluator::default().evaluate(json!({"in": ["a", []]})).is_err());
}

#[test]
fn error_in_nested_operand_propagates() {
    let err = eval_json_err(json!({"and": [{"a": 1}, "b = 'open"]}));
    assert_eq!(err.fragment, "'open");
}
