use super::*;

fn analyze(sql: &str) -> ParsedStatement {
    analyze_statement(&SqlParser::postgres(), sql)
}

#[test]
fn test_create_table_is_ddl() {
    let stmt = analyze("CREATE TABLE users (id INT PRIMARY KEY)");
    assert_eq!(stmt.kind, StatementKind::Ddl);
    assert_eq!(stmt.table.as_deref(), Some("users"));
}

#[test]
fn test_alter_table() {
    let stmt = analyze("ALTER TABLE users ADD COLUMN email VARCHAR(255)");
    assert_eq!(stmt.kind, StatementKind::Ddl);
    assert_eq!(stmt.table.as_deref(), Some("users"));
}

#[test]
fn test_create_index_resolves_to_indexed_table() {
    let stmt = analyze("CREATE INDEX idx_users_email ON users (email)");
    assert_eq!(stmt.kind, StatementKind::Ddl);
    assert_eq!(stmt.table.as_deref(), Some("users"));
}

#[test]
fn test_drop_table() {
    let stmt = analyze("DROP TABLE users");
    assert_eq!(stmt.kind, StatementKind::Ddl);
    assert_eq!(stmt.table.as_deref(), Some("users"));
}

#[test]
fn test_qualified_table_name() {
    let stmt = analyze("CREATE TABLE app.users (id INT)");
    assert_eq!(stmt.table.as_deref(), Some("app.users"));
}

#[test]
fn test_insert_is_dml() {
    let stmt = analyze("INSERT INTO users (id) VALUES (1)");
    assert_eq!(stmt.kind, StatementKind::Dml);
    assert_eq!(stmt.table.as_deref(), Some("users"));
}

#[test]
fn test_update_is_dml() {
    let stmt = analyze("UPDATE users SET name = 'x' WHERE id = 1");
    assert_eq!(stmt.kind, StatementKind::Dml);
    assert_eq!(stmt.table.as_deref(), Some("users"));
}

#[test]
fn test_delete_is_dml() {
    let stmt = analyze("DELETE FROM users WHERE id = 1");
    assert_eq!(stmt.kind, StatementKind::Dml);
    assert_eq!(stmt.table.as_deref(), Some("users"));
}

#[test]
fn test_truncate_is_dml() {
    let stmt = analyze("TRUNCATE TABLE users");
    assert_eq!(stmt.kind, StatementKind::Dml);
    assert_eq!(stmt.table.as_deref(), Some("users"));
}

#[test]
fn test_select_is_other() {
    let stmt = analyze("SELECT * FROM users");
    assert_eq!(stmt.kind, StatementKind::Other);
    assert_eq!(stmt.table, None);
}

#[test]
fn test_unparseable_is_other_with_no_table() {
    let stmt = analyze("THIS IS NOT SQL AT ALL");
    assert_eq!(stmt.kind, StatementKind::Other);
    assert_eq!(stmt.table, None);
    assert_eq!(stmt.text, "THIS IS NOT SQL AT ALL");
}

#[test]
fn test_create_extension() {
    let stmt = analyze("CREATE EXTENSION IF NOT EXISTS pgcrypto");
    assert_eq!(stmt.kind, StatementKind::Ddl);
    assert_eq!(stmt.table.as_deref(), Some("pgcrypto"));
}

#[test]
fn test_nullable_create_table_columns() {
    let parser = SqlParser::postgres();
    let change = nullability_change(
        &parser,
        "CREATE TABLE users (id INT PRIMARY KEY, email VARCHAR(255), name TEXT NOT NULL)",
    );
    match change {
        Some(NullabilityChange::MakesNullable { table, columns }) => {
            assert_eq!(table, "users");
            assert_eq!(columns, vec!["email"]);
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn test_fully_constrained_create_table_has_no_change() {
    let parser = SqlParser::postgres();
    let change = nullability_change(
        &parser,
        "CREATE TABLE users (id INT PRIMARY KEY, name TEXT NOT NULL)",
    );
    assert_eq!(change, None);
}

#[test]
fn test_add_column_without_not_null_makes_nullable() {
    let parser = SqlParser::postgres();
    let change = nullability_change(&parser, "ALTER TABLE users ADD COLUMN email VARCHAR(255)");
    match change {
        Some(NullabilityChange::MakesNullable { table, columns }) => {
            assert_eq!(table, "users");
            assert_eq!(columns, vec!["email"]);
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn test_drop_not_null_makes_nullable() {
    let parser = SqlParser::postgres();
    let change = nullability_change(&parser, "ALTER TABLE users ALTER COLUMN email DROP NOT NULL");
    assert!(matches!(
        change,
        Some(NullabilityChange::MakesNullable { .. })
    ));
}

#[test]
fn test_set_not_null() {
    let parser = SqlParser::postgres();
    let change = nullability_change(&parser, "ALTER TABLE users ALTER COLUMN email SET NOT NULL");
    match change {
        Some(NullabilityChange::SetsNotNull { table, columns }) => {
            assert_eq!(table, "users");
            assert_eq!(columns, vec!["email"]);
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn test_dml_has_no_nullability_change() {
    let parser = SqlParser::postgres();
    assert_eq!(
        nullability_change(&parser, "UPDATE users SET email = 'x'"),
        None
    );
}
