//! Raw statement splitting for migration bodies
//!
//! Migration files carry statements as raw text; the squash engine needs the
//! original text of each statement, not a re-rendered AST. This splitter cuts
//! a section into individual statements on top-level semicolons, honoring
//! single/double quotes, Postgres dollar quoting, and both comment styles.

/// Split a SQL section into individual statement texts.
///
/// Each returned statement is trimmed and keeps its trailing semicolon
/// stripped. Empty fragments (e.g. trailing whitespace after the last
/// semicolon) are discarded.
pub fn split_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let bytes = sql.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        let rest = &sql[i..];

        // Line comment
        if rest.starts_with("--") {
            let end = rest.find('\n').map(|p| i + p + 1).unwrap_or(bytes.len());
            current.push_str(&sql[i..end]);
            i = end;
            continue;
        }

        // Block comment
        if rest.starts_with("/*") {
            let end = rest.find("*/").map(|p| i + p + 2).unwrap_or(bytes.len());
            current.push_str(&sql[i..end]);
            i = end;
            continue;
        }

        // Single-quoted string ('' escapes a quote)
        if rest.starts_with('\'') {
            let end = find_quoted_end(rest, '\'').map(|p| i + p).unwrap_or(bytes.len());
            current.push_str(&sql[i..end]);
            i = end;
            continue;
        }

        // Double-quoted identifier ("" escapes a quote)
        if rest.starts_with('"') {
            let end = find_quoted_end(rest, '"').map(|p| i + p).unwrap_or(bytes.len());
            current.push_str(&sql[i..end]);
            i = end;
            continue;
        }

        // Dollar-quoted string: $tag$ ... $tag$
        if rest.starts_with('$') {
            if let Some(tag_len) = dollar_tag_len(rest) {
                let tag = &rest[..tag_len];
                let body_end = rest[tag_len..]
                    .find(tag)
                    .map(|p| i + tag_len + p + tag_len)
                    .unwrap_or(bytes.len());
                current.push_str(&sql[i..body_end]);
                i = body_end;
                continue;
            }
        }

        if rest.starts_with(';') {
            let stmt = current.trim();
            if !stmt.is_empty() {
                statements.push(stmt.to_string());
            }
            current.clear();
            i += 1;
            continue;
        }

        let ch = rest.chars().next().unwrap_or(';');
        current.push(ch);
        i += ch.len_utf8();
    }

    let stmt = current.trim();
    if !stmt.is_empty() && !is_only_comments(stmt) {
        statements.push(stmt.to_string());
    }

    statements
}

/// Find the byte offset just past the closing quote, treating a doubled quote
/// as an escape. `s` must start with `quote`.
fn find_quoted_end(s: &str, quote: char) -> Option<usize> {
    let mut chars = s.char_indices().skip(1).peekable();
    while let Some((idx, c)) = chars.next() {
        if c == quote {
            if let Some(&(_, next)) = chars.peek() {
                if next == quote {
                    chars.next();
                    continue;
                }
            }
            return Some(idx + c.len_utf8());
        }
    }
    None
}

/// Length of a leading `$tag$` opener (including both dollar signs), or None
/// if `s` does not start a dollar quote. `s` must start with '$'.
fn dollar_tag_len(s: &str) -> Option<usize> {
    let inner_end = s[1..].find('$')? + 1;
    let tag = &s[1..inner_end];
    if tag.chars().all(|c| c.is_alphanumeric() || c == '_') {
        Some(inner_end + 1)
    } else {
        None
    }
}

/// True when every line of `s` is blank or a line comment.
fn is_only_comments(s: &str) -> bool {
    s.lines()
        .all(|line| line.trim().is_empty() || line.trim().starts_with("--"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_two_statements() {
        let stmts = split_statements("CREATE TABLE foo (id INT);\nCREATE TABLE bar (id INT);");
        assert_eq!(
            stmts,
            vec!["CREATE TABLE foo (id INT)", "CREATE TABLE bar (id INT)"]
        );
    }

    #[test]
    fn test_semicolon_inside_string_literal() {
        let stmts = split_statements("INSERT INTO t (v) VALUES ('a;b');");
        assert_eq!(stmts, vec!["INSERT INTO t (v) VALUES ('a;b')"]);
    }

    #[test]
    fn test_escaped_single_quote() {
        let stmts = split_statements("INSERT INTO t (v) VALUES ('it''s; fine');");
        assert_eq!(stmts.len(), 1);
        assert!(stmts[0].contains("it''s; fine"));
    }

    #[test]
    fn test_semicolon_inside_quoted_identifier() {
        let stmts = split_statements("CREATE TABLE \"odd;name\" (id INT);");
        assert_eq!(stmts, vec!["CREATE TABLE \"odd;name\" (id INT)"]);
    }

    #[test]
    fn test_dollar_quoted_function_body() {
        let sql = "CREATE FUNCTION f() RETURNS void AS $$ BEGIN PERFORM 1; END; $$ LANGUAGE plpgsql;\nSELECT 1;";
        let stmts = split_statements(sql);
        assert_eq!(stmts.len(), 2);
        assert!(stmts[0].contains("PERFORM 1;"));
        assert_eq!(stmts[1], "SELECT 1");
    }

    #[test]
    fn test_tagged_dollar_quote() {
        let sql = "CREATE FUNCTION f() RETURNS void AS $body$ SELECT ';'; $body$ LANGUAGE sql;";
        let stmts = split_statements(sql);
        assert_eq!(stmts.len(), 1);
    }

    #[test]
    fn test_line_comment_with_semicolon() {
        let stmts = split_statements("CREATE TABLE foo (\n  id INT -- primary; key\n);");
        assert_eq!(stmts.len(), 1);
        assert!(stmts[0].contains("primary; key"));
    }

    #[test]
    fn test_block_comment_with_semicolon() {
        let stmts = split_statements("/* one; two */ SELECT 1;");
        assert_eq!(stmts.len(), 1);
    }

    #[test]
    fn test_no_trailing_semicolon() {
        let stmts = split_statements("SELECT 1; SELECT 2");
        assert_eq!(stmts, vec!["SELECT 1", "SELECT 2"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(split_statements("").is_empty());
        assert!(split_statements("  \n ;; \n").is_empty());
    }

    #[test]
    fn test_trailing_comment_only_discarded() {
        let stmts = split_statements("SELECT 1;\n-- done\n");
        assert_eq!(stmts, vec!["SELECT 1"]);
    }

    #[test]
    fn test_dollar_followed_by_number_is_not_a_quote() {
        // Positional parameters must not open a dollar quote.
        let stmts = split_statements("SELECT $1; SELECT $2");
        assert_eq!(stmts.len(), 2);
    }
}
