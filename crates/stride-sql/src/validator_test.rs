use super::*;

fn lint(statements: &[&str]) -> Vec<Finding> {
    let parser = SqlParser::postgres();
    let owned: Vec<String> = statements.iter().map(|s| s.to_string()).collect();
    lint_statements(&parser, &owned)
}

#[test]
fn test_clean_statements_have_no_findings() {
    let findings = lint(&[
        "CREATE TABLE users (id INT PRIMARY KEY, email VARCHAR(255))",
        "INSERT INTO users (id) VALUES (1)",
        "UPDATE users SET email = 'x' WHERE id = 1",
    ]);
    assert!(findings.is_empty(), "unexpected findings: {findings:?}");
}

#[test]
fn test_unparseable_statement_is_flagged() {
    let findings = lint(&["NOT EVEN SQL"]);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].statement_index, 0);
    assert!(findings[0].description.contains("could not be parsed"));
}

#[test]
fn test_keyword_table_name_is_flagged() {
    let findings = lint(&["CREATE TABLE location (id INT)"]);
    assert_eq!(findings.len(), 1);
    assert!(findings[0].description.contains("location"));
    assert!(findings[0].description.contains("keyword"));
}

#[test]
fn test_quoted_keyword_is_not_flagged() {
    let findings = lint(&["CREATE TABLE \"location\" (id INT)"]);
    assert!(findings.is_empty(), "unexpected findings: {findings:?}");
}

#[test]
fn test_keyword_column_name_is_flagged() {
    let findings = lint(&["CREATE TABLE events (id INT, year INT)"]);
    assert_eq!(findings.len(), 1);
    assert!(findings[0].description.contains("year"));
}

#[test]
fn test_added_keyword_column_is_flagged() {
    let findings = lint(&["ALTER TABLE events ADD COLUMN year INT"]);
    assert_eq!(findings.len(), 1);
    assert!(findings[0].description.contains("year"));
}

#[test]
fn test_update_without_where_is_flagged() {
    let findings = lint(&["UPDATE users SET email = 'x'"]);
    assert_eq!(findings.len(), 1);
    assert!(findings[0].description.contains("WHERE"));
}

#[test]
fn test_delete_without_where_is_flagged() {
    let findings = lint(&["DELETE FROM users"]);
    assert_eq!(findings.len(), 1);
    assert!(findings[0].description.contains("WHERE"));
}

#[test]
fn test_findings_keep_statement_order() {
    let findings = lint(&[
        "CREATE TABLE users (id INT)",
        "DELETE FROM users",
        "garbage",
    ]);
    let indexes: Vec<usize> = findings.iter().map(|f| f.statement_index).collect();
    assert_eq!(indexes, vec![1, 2]);
}
