mod common;

use common::*;
use polysql_core::expression::Expression;
use polysql_core::platform::DialectKind;
use polysql_core::statement::{
    DeleteQuery, InsertQuery, SelectQuery, StatementType, UpdateQuery,
};
use polysql_core::Error;

#[test]
fn insert_values() {
    let query = InsertQuery::new("users")
        .columns(["name", "age"])
        .values(vec![eval(":name"), eval(":age")])
        .values(vec![eval("'bob'"), eval("null")]);
    let data = build(DialectKind::PostgreSql, query);
    assert_eq!(
        data.sql(),
        "INSERT INTO users (name, age) VALUES ($1, $2), ('bob', NULL)"
    );
    assert_eq!(data.statement_type(), Some(StatementType::Insert));
    assert!(data.result_columns().is_empty());
}

#[test]
fn insert_single_values() {
    let query = InsertQuery::new("users")
        .value("name", eval(":name"))
        .value("country", eval("'de'"));
    assert_eq!(
        sql(DialectKind::Sqlite, query),
        "INSERT INTO users (name, country) VALUES (:name, 'de')"
    );
}

#[test]
fn insert_select() {
    let query = InsertQuery::new("archive")
        .columns(["id", "name"])
        .select(
            SelectQuery::new()
                .column(eval("id"))
                .column(eval("name"))
                .from("users")
                .where_clause(eval("age > :age")),
        );
    assert_eq!(
        sql(DialectKind::MySql, query),
        "INSERT INTO archive (id, name) SELECT users.id, users.name FROM users \
         WHERE users.age > ?"
    );
}

#[test]
fn insert_without_values_per_platform() {
    assert_eq!(
        sql(DialectKind::PostgreSql, InsertQuery::new("log")),
        "INSERT INTO log DEFAULT VALUES"
    );
    assert_eq!(
        sql(DialectKind::MySql, InsertQuery::new("log")),
        "INSERT INTO log () VALUES ()"
    );
}

#[test]
fn insert_returning() {
    let query = InsertQuery::new("users")
        .value("name", eval(":name"))
        .returning(eval("id"));
    assert_eq!(
        sql(DialectKind::PostgreSql, query.clone()),
        "INSERT INTO users (name) VALUES ($1) RETURNING id"
    );
    let err = build_err(DialectKind::MySql, query);
    assert!(matches!(
        err,
        Error::Unsupported {
            platform: "mysql",
            ..
        }
    ));
}

#[test]
fn update_with_where() {
    let query = UpdateQuery::new("users")
        .set("name", eval(":name"))
        .set("age", eval("age + 1"))
        .where_clause(eval("id = :id"));
    let data = build(DialectKind::PostgreSql, query);
    assert_eq!(
        data.sql(),
        "UPDATE users SET name = $1, age = age + 1 WHERE id = $2"
    );
    assert_eq!(data.parameters().keys(), vec!["name", "id"]);
    assert_eq!(data.statement_type(), Some(StatementType::Update));
}

#[test]
fn update_quotes_reserved_column() {
    let query = UpdateQuery::new("items").set("order", eval("1"));
    assert_eq!(sql(DialectKind::MySql, query.clone()), "UPDATE items SET `order` = 1");
    assert_eq!(sql(DialectKind::Generic, query), "UPDATE items SET \"order\" = 1");
}

#[test]
fn delete_with_where() {
    let query = DeleteQuery::new("sessions")
        .where_clause(eval("expires < :now"))
        .where_clause(eval("pinned = false"));
    let data = build(DialectKind::Generic, query);
    assert_eq!(
        data.sql(),
        "DELETE FROM sessions WHERE expires < ? AND pinned = FALSE"
    );
    assert_eq!(data.statement_type(), Some(StatementType::Delete));
}

#[test]
fn delete_with_sub_select() {
    let stale = SelectQuery::new()
        .column(eval("id"))
        .from("users")
        .where_clause(eval("age > 120"));
    let query = DeleteQuery::new("orders")
        .where_clause(Expression::column("user_id").in_list(vec![stale.into()]));
    assert_eq!(
        sql(DialectKind::Generic, query),
        "DELETE FROM orders WHERE user_id IN (SELECT users.id FROM users WHERE users.age > 120)"
    );
}

#[test]
fn strict_mode_checks_target_columns() {
    let builder = strict(DialectKind::Generic);
    let ok = UpdateQuery::new("users")
        .set("name", eval(":name"))
        .where_clause(eval("id = :id"));
    assert_eq!(
        build_with(&builder, ok).sql(),
        "UPDATE main.users SET name = ? WHERE id = ?"
    );

    let err = build_err_with(&builder, UpdateQuery::new("users").set("nickname", eval("'x'")));
    assert_eq!(err.to_string(), "unable to resolve column 'nickname'");

    let err = build_err_with(&builder, DeleteQuery::new("accounts"));
    assert_eq!(err.to_string(), "unable to resolve table 'accounts'");
}

#[test]
fn strict_insert_targets_canonical_table() {
    let query = InsertQuery::new("users").value("name", eval(":name"));
    assert_eq!(
        build_with(&strict(DialectKind::Generic), query).sql(),
        "INSERT INTO main.users (name) VALUES (?)"
    );
    assert_eq!(
        build_with(&strict(DialectKind::Generic), DeleteQuery::new("orders")).sql(),
        "DELETE FROM main.orders"
    );
}

#[test]
fn error_qualified_target_column() {
    let err = build_err(DialectKind::Generic, UpdateQuery::new("t").set("t.a", eval("1")));
    assert_eq!(err.to_string(), "invalid statement: qualified target column 't.a'");

    let query = InsertQuery::new("t").columns(["t.a"]).values(vec![eval("1")]);
    let Error::StatementConstruction(err) = build_err(DialectKind::Generic, query) else {
        panic!("expected a construction error");
    };
    assert_eq!(err.message, "qualified target column 't.a'");
}

#[test]
fn error_update_without_assignments() {
    let err = build_err(DialectKind::Generic, UpdateQuery::new("users"));
    assert_eq!(err.to_string(), "invalid statement: UPDATE without assignments");
}

#[test]
fn error_insert_row_width() {
    let query = InsertQuery::new("users")
        .columns(["name", "age"])
        .values(vec![eval("'x'")]);
    let Error::StatementConstruction(err) = build_err(DialectKind::Generic, query) else {
        panic!("expected a construction error");
    };
    assert_eq!(err.message, "row has 1 values for 2 columns");
}

#[test]
fn error_insert_values_and_select() {
    let query = InsertQuery::new("archive")
        .columns(["id"])
        .values(vec![eval("1")])
        .select(SelectQuery::new().column(eval("id")).from("users"));
    let err = build_err(DialectKind::Generic, query);
    assert_eq!(
        err.to_string(),
        "invalid statement: INSERT with both VALUES and SELECT"
    );
}
