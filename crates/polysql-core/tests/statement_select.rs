mod common;

use common::*;
use polysql_core::expression::{Expression, Join, JoinFlags, MetaFunction, Table};
use polysql_core::platform::DialectKind;
use polysql_core::statement::{SelectQuery, StatementType};
use polysql_core::{DataType, Error};

#[test]
fn select_with_evaluated_where() {
    let query = SelectQuery::new()
        .column(eval("name"))
        .from("users")
        .where_clause(eval("age >= :min and age < :max"));
    let data = build(DialectKind::PostgreSql, query);
    assert_eq!(
        data.sql(),
        "SELECT users.name FROM users WHERE users.age >= $1 AND users.age < $2"
    );
    assert_eq!(data.parameters().keys(), vec!["min", "max"]);
    assert_eq!(data.statement_type(), Some(StatementType::Select));
}

#[test]
fn select_star() {
    assert_eq!(
        sql(DialectKind::Generic, SelectQuery::new().from("users")),
        "SELECT * FROM users"
    );
}

#[test]
fn select_without_from() {
    let query = SelectQuery::new().column(eval("1 + 1"));
    assert_eq!(sql(DialectKind::Generic, query), "SELECT 1 + 1");
}

#[test]
fn aliased_table_qualifies_columns() {
    let query = SelectQuery::new()
        .column(eval("name"))
        .from(Table::new("users").alias("u"))
        .where_clause(eval("u.id = :id"));
    assert_eq!(
        sql(DialectKind::Generic, query),
        "SELECT u.name FROM users AS u WHERE u.id = ?"
    );
}

#[test]
fn join_with_constraints() {
    let query = SelectQuery::new()
        .column(eval("u.name"))
        .column(eval("o.total"))
        .from(Table::new("users").alias("u"))
        .join(
            Join::new(JoinFlags::LEFT, Table::new("orders").alias("o"))
                .on(eval("o.user_id = u.id")),
        );
    assert_eq!(
        sql(DialectKind::Generic, query),
        "SELECT u.name, o.total FROM users AS u LEFT JOIN orders AS o ON o.user_id = u.id"
    );
}

#[test]
fn multiple_where_calls_are_anded() {
    let query = SelectQuery::new()
        .from("users")
        .where_clause(eval("age > 18"))
        .where_clause(eval("country = 'de' or country = 'at'"));
    assert_eq!(
        sql(DialectKind::Generic, query),
        "SELECT * FROM users WHERE users.age > 18 AND \
         (users.country = 'de' OR users.country = 'at')"
    );
}

#[test]
fn group_having_order_limit() {
    let count = Expression::function("COUNT", vec![Expression::Wildcard]);
    let query = SelectQuery::new()
        .column(eval("country"))
        .column_as(count.clone(), "total")
        .from("users")
        .group_by(eval("country"))
        .having(count.gt(Expression::literal(10)))
        .order_by_desc(eval("total"))
        .order_by(eval("country"))
        .limit(5)
        .offset(10);
    assert_eq!(
        sql(DialectKind::PostgreSql, query.clone()),
        "SELECT users.country, COUNT(*) AS total FROM users GROUP BY users.country \
         HAVING COUNT(*) > 10 ORDER BY total DESC, users.country LIMIT 5 OFFSET 10"
    );
    assert_eq!(
        sql(DialectKind::Generic, query),
        "SELECT users.country, COUNT(*) AS total FROM users GROUP BY users.country \
         HAVING COUNT(*) > 10 ORDER BY total DESC, users.country \
         OFFSET 10 ROWS FETCH FIRST 5 ROWS ONLY"
    );
}

#[test]
fn distinct_and_comment() {
    let query = SelectQuery::new()
        .comment("dashboard")
        .distinct()
        .column(eval("country"))
        .from("users");
    assert_eq!(
        sql(DialectKind::Generic, query),
        "/* dashboard */ SELECT DISTINCT users.country FROM users"
    );
}

#[test]
fn sub_select_uses_its_own_scope() {
    let inner = SelectQuery::new().column(eval("user_id")).from("orders");
    let query = SelectQuery::new()
        .column(eval("name"))
        .from("users")
        .where_clause(Expression::column("id").in_list(vec![inner.into()]));
    assert_eq!(
        sql(DialectKind::Generic, query),
        "SELECT users.name FROM users WHERE users.id IN (SELECT orders.user_id FROM orders)"
    );
}

#[test]
fn sub_select_as_column() {
    let inner = SelectQuery::new()
        .column(Expression::function("MAX", vec![eval("total")]))
        .from("orders");
    let query = SelectQuery::new()
        .column_as(Expression::SubSelect(Box::new(inner)), "top")
        .from("users");
    let data = build(DialectKind::Generic, query);
    assert_eq!(
        data.sql(),
        "SELECT (SELECT MAX(orders.total) FROM orders) AS top FROM users"
    );
    assert_eq!(data.result_columns().len(), 1);
    assert_eq!(data.result_columns().get(0).unwrap().name, "top");
}

#[test]
fn meta_functions_are_translated() {
    let length = Expression::meta_function(MetaFunction::StringLength, vec![eval("name")]);
    let query = SelectQuery::new().column_as(length, "len").from("users");
    assert_eq!(
        sql(DialectKind::Sqlite, query.clone()),
        "SELECT LENGTH(users.name) AS len FROM users"
    );
    assert_eq!(
        sql(DialectKind::MySql, query),
        "SELECT CHAR_LENGTH(users.name) AS len FROM users"
    );
}

#[test]
fn result_columns_describe_the_select_list() {
    let query = SelectQuery::new()
        .column(eval("id"))
        .column_as(eval("age + 1"), "next_age")
        .column(eval("'x'"))
        .from("users");
    let data = build_with(&strict(DialectKind::Generic), query);
    let columns = data.result_columns();
    assert_eq!(columns.len(), 3);

    let id = columns.get(0).unwrap();
    assert_eq!(id.name, "id");
    assert_eq!(id.data_type, DataType::INTEGER);
    assert_eq!(id.source.as_ref().unwrap().path(), "main.users.id");

    let next_age = columns.by_name("next_age").unwrap();
    assert_eq!(next_age.index, 1);
    assert!(next_age.source.is_none());

    assert_eq!(columns.get(2).unwrap().name, "'x'");
    assert_eq!(columns.get(2).unwrap().data_type, DataType::STRING);
}

#[test]
fn wildcard_expands_known_columns() {
    let data = build_with(&strict(DialectKind::Generic), SelectQuery::new().from("orders"));
    let names: Vec<&str> = data
        .result_columns()
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(names, vec!["id", "user_id", "total", "created"]);
}

#[test]
fn repeated_parameters() {
    let query = SelectQuery::new()
        .from("users")
        .where_clause(eval("name = :q or country = :q or age = :age"));

    let postgres = build(DialectKind::PostgreSql, query.clone());
    assert_eq!(
        postgres.sql(),
        "SELECT * FROM users WHERE users.name = $1 OR users.country = $1 OR users.age = $2"
    );
    assert_eq!(postgres.parameters().count(), 3);
    assert_eq!(postgres.parameters().distinct_count(), 2);
    assert_eq!(postgres.parameters().positions_of("q"), vec![0, 1]);
    assert_eq!(postgres.parameters().dbms_name_of("age"), Some("$2"));

    let sqlite = build(DialectKind::Sqlite, query);
    assert!(sqlite.sql().ends_with("users.name = :q OR users.country = :q OR users.age = :age"));
}

#[test]
fn builds_are_repeatable() {
    let query: polysql_core::Statement = SelectQuery::new()
        .column(eval("name"))
        .from("users")
        .where_clause(eval("id = :id"))
        .into();
    let builder = structured(DialectKind::PostgreSql);
    let first = build_with(&builder, query.clone());
    let second = build_with(&builder, query);
    assert_eq!(first, second);
}

#[test]
fn error_join_without_from() {
    let query = SelectQuery::new().join(Join::new(JoinFlags::LEFT, "orders"));
    let err = build_err(DialectKind::Generic, query);
    assert!(matches!(err, Error::StatementConstruction(_)));
    assert_eq!(err.to_string(), "invalid statement: JOIN without FROM");
}

#[test]
fn error_natural_join_with_constraints() {
    let query = SelectQuery::new()
        .from("users")
        .join(Join::new(JoinFlags::NATURAL, "orders").on(eval("a = b")));
    let err = build_err(DialectKind::Generic, query);
    assert!(matches!(err, Error::Unsupported { .. }));
}
