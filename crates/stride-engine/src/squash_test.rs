use super::*;
use crate::decision::scripted::Scripted;
use crate::decision::{AcceptAll, DeclineAll};
use stride_core::parse_sql_migration;

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

fn sql_migration(id: &str, depends: &[&str], apply: &[&str], rollback: &[&str]) -> Migration {
    Migration::sql(
        MigrationId::new(id),
        format!("migration {id}"),
        depends.iter().map(|d| MigrationId::new(*d)).collect(),
        true,
        apply.iter().map(|s| s.to_string()).collect(),
        rollback.iter().map(|s| s.to_string()).collect(),
    )
}

fn set_and_graph(migrations: Vec<Migration>) -> (MigrationSet, DependencyGraph) {
    let mut set = MigrationSet::new();
    for m in migrations {
        set.insert(m).unwrap();
    }
    let graph = DependencyGraph::build(&set).unwrap();
    (set, graph)
}

fn squasher() -> Squasher {
    Squasher::new(SqlParser::postgres())
}

#[test]
fn test_groups_follow_first_discovery_order() {
    let (set, graph) = set_and_graph(vec![
        sql_migration(
            "a",
            &[],
            &["CREATE TABLE users (id INT PRIMARY KEY)"],
            &["DROP TABLE users"],
        ),
        sql_migration(
            "b",
            &["a"],
            &[
                "CREATE TABLE posts (id INT PRIMARY KEY)",
                "ALTER TABLE users ADD COLUMN email VARCHAR(255) NOT NULL",
            ],
            &[
                "ALTER TABLE users DROP COLUMN email",
                "DROP TABLE posts",
            ],
        ),
    ]);

    let outcome = squasher()
        .squash(&set, &graph, date(), &mut AcceptAll)
        .unwrap()
        .unwrap();

    let users_pos = outcome.content.find("-- Squash 'users'").unwrap();
    let posts_pos = outcome.content.find("-- Squash 'posts'").unwrap();
    assert!(users_pos < posts_pos, "users discovered first:\n{}", outcome.content);

    // the users alter lands in the users group, before the posts header
    let alter_pos = outcome.content.find("ADD COLUMN email").unwrap();
    assert!(alter_pos < posts_pos);

    assert_eq!(
        outcome.consumed.iter().map(|id| id.as_str()).collect::<Vec<_>>(),
        vec!["a", "b"]
    );
}

#[test]
fn test_data_group_trails_apply_and_leads_rollback() {
    let (set, graph) = set_and_graph(vec![
        sql_migration(
            "a",
            &[],
            &["CREATE TABLE users (id INT PRIMARY KEY)", "SET search_path TO public"],
            &["SET search_path TO public", "DROP TABLE users"],
        ),
        sql_migration(
            "b",
            &["a"],
            &["INSERT INTO users (id) VALUES (1)"],
            &["DELETE FROM users WHERE id = 1"],
        ),
    ]);

    let outcome = squasher()
        .squash(&set, &graph, date(), &mut AcceptAll)
        .unwrap()
        .unwrap();

    let apply_start = outcome.content.find("-- migrate: apply").unwrap();
    let rollback_start = outcome.content.find("-- migrate: rollback").unwrap();

    let apply_section = &outcome.content[apply_start..rollback_start];
    let rollback_section = &outcome.content[rollback_start..];

    // data group last on apply
    let data_pos = apply_section.find("-- Squash data statements.").unwrap();
    let users_pos = apply_section.find("-- Squash 'users'").unwrap();
    assert!(users_pos < data_pos, "{apply_section}");

    // data group first on rollback
    let data_pos = rollback_section.find("-- Squash data statements.").unwrap();
    let users_pos = rollback_section.find("-- Squash 'users'").unwrap();
    assert!(data_pos < users_pos, "{rollback_section}");
}

#[test]
fn test_rollback_reverses_contributing_migrations() {
    let (set, graph) = set_and_graph(vec![
        sql_migration(
            "a",
            &[],
            &["CREATE TABLE users (id INT PRIMARY KEY)"],
            &["DROP TABLE users"],
        ),
        sql_migration(
            "b",
            &["a"],
            &["ALTER TABLE users ADD COLUMN email VARCHAR(255) NOT NULL"],
            &["ALTER TABLE users DROP COLUMN email"],
        ),
    ]);

    let outcome = squasher()
        .squash(&set, &graph, date(), &mut AcceptAll)
        .unwrap()
        .unwrap();

    let rollback = &outcome.content[outcome.content.find("-- migrate: rollback").unwrap()..];
    let drop_column = rollback.find("DROP COLUMN email").unwrap();
    let drop_table = rollback.find("DROP TABLE users").unwrap();
    assert!(drop_column < drop_table, "b unwinds before a:\n{rollback}");
}

#[test]
fn test_rollback_unwinds_tables_in_reverse_creation_order() {
    // Both drops live in one rollback leg, written child-first. The
    // squashed rollback must still drop the referencing table before the
    // referenced one, which only holds when group order follows the apply
    // walk rather than the rollback legs.
    let (set, graph) = set_and_graph(vec![
        sql_migration(
            "a",
            &[],
            &["CREATE TABLE audit (id INT PRIMARY KEY)"],
            &["DROP TABLE audit"],
        ),
        sql_migration(
            "b",
            &["a"],
            &[
                "CREATE TABLE parent (id INT PRIMARY KEY)",
                "CREATE TABLE child (id INT PRIMARY KEY, parent_id INT REFERENCES parent (id))",
            ],
            &["DROP TABLE child", "DROP TABLE parent"],
        ),
    ]);

    let outcome = squasher()
        .squash(&set, &graph, date(), &mut AcceptAll)
        .unwrap()
        .unwrap();

    let rollback = &outcome.content[outcome.content.find("-- migrate: rollback").unwrap()..];
    let drop_child = rollback.find("DROP TABLE child").unwrap();
    let drop_parent = rollback.find("DROP TABLE parent").unwrap();
    let drop_audit = rollback.find("DROP TABLE audit").unwrap();
    assert!(drop_child < drop_parent, "child unwinds first:\n{rollback}");
    assert!(drop_parent < drop_audit, "audit created first, unwound last:\n{rollback}");
}

#[test]
fn test_squash_id_avoids_loaded_ids() {
    // A same-day squash already sits at sequence 01; the next one must not
    // reuse that id, or writing it and removing the consumed run would
    // destroy the new file.
    let (set, graph) = set_and_graph(vec![
        sql_migration(
            "20240601_01-squash-of-2-migrations",
            &[],
            &["CREATE TABLE old (id INT)"],
            &["DROP TABLE old"],
        ),
        sql_migration(
            "a",
            &["20240601_01-squash-of-2-migrations"],
            &["CREATE TABLE users (id INT PRIMARY KEY)"],
            &["DROP TABLE users"],
        ),
        sql_migration(
            "b",
            &["a"],
            &["ALTER TABLE users ADD COLUMN email VARCHAR(255) NOT NULL"],
            &["ALTER TABLE users DROP COLUMN email"],
        ),
    ]);

    let outcome = squasher()
        .exclude(vec!["20240601_01-squash-of-2-migrations".to_string()])
        .squash(&set, &graph, date(), &mut AcceptAll)
        .unwrap()
        .unwrap();

    assert_eq!(outcome.id.as_str(), "20240601_02-squash-of-2-migrations");
    assert!(!outcome.consumed.contains(&outcome.id));
}

#[test]
fn test_skips_reported_with_reasons() {
    use stride_core::{CodeBody, DynError, SqlExecutor};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct Noop;
    #[async_trait]
    impl CodeBody for Noop {
        async fn apply(&self, _executor: &dyn SqlExecutor) -> Result<(), DynError> {
            Ok(())
        }
        async fn rollback(&self, _executor: &dyn SqlExecutor) -> Result<(), DynError> {
            Ok(())
        }
    }

    let mut concurrent = sql_migration(
        "c",
        &["b"],
        &["CREATE INDEX idx ON users (id)"],
        &["DROP INDEX idx"],
    );
    concurrent.transactional = false;

    let (set, graph) = set_and_graph(vec![
        sql_migration("a", &[], &["CREATE TABLE users (id INT)"], &["DROP TABLE users"]),
        Migration::code(
            MigrationId::new("b"),
            "backfill",
            [MigrationId::new("a")].into_iter().collect(),
            true,
            Arc::new(Noop),
        ),
        concurrent,
        sql_migration(
            "d",
            &["c"],
            &["ALTER TABLE users ADD COLUMN email VARCHAR(255) NOT NULL"],
            &["ALTER TABLE users DROP COLUMN email"],
        ),
        sql_migration(
            "e",
            &["d"],
            &["ALTER TABLE users ADD COLUMN name VARCHAR(255) NOT NULL"],
            &["ALTER TABLE users DROP COLUMN name"],
        ),
    ]);

    let outcome = squasher()
        .exclude(vec!["e".to_string()])
        .squash(&set, &graph, date(), &mut AcceptAll)
        .unwrap()
        .unwrap();

    let skipped: Vec<(&str, SkipReason)> = outcome
        .skipped
        .iter()
        .map(|(id, reason)| (id.as_str(), *reason))
        .collect();
    assert_eq!(
        skipped,
        vec![
            ("b", SkipReason::CodeFormat),
            ("c", SkipReason::NonTransactional),
            ("e", SkipReason::Excluded),
        ]
    );
    assert_eq!(
        outcome.consumed.iter().map(|id| id.as_str()).collect::<Vec<_>>(),
        vec!["a", "d"]
    );
}

#[test]
fn test_too_few_eligible_yields_none() {
    let (set, graph) = set_and_graph(vec![sql_migration(
        "a",
        &[],
        &["CREATE TABLE users (id INT)"],
        &["DROP TABLE users"],
    )]);
    let outcome = squasher()
        .squash(&set, &graph, date(), &mut AcceptAll)
        .unwrap();
    assert!(outcome.is_none());
}

#[test]
fn test_depends_are_external_to_consumed_run() {
    let (set, graph) = set_and_graph(vec![
        sql_migration("base", &[], &["CREATE TABLE t (id INT)"], &["DROP TABLE t"]),
        sql_migration(
            "m1",
            &["base"],
            &["ALTER TABLE t ADD COLUMN a INT NOT NULL"],
            &["ALTER TABLE t DROP COLUMN a"],
        ),
        sql_migration(
            "m2",
            &["m1"],
            &["ALTER TABLE t ADD COLUMN b INT NOT NULL"],
            &["ALTER TABLE t DROP COLUMN b"],
        ),
    ]);

    let outcome = squasher()
        .exclude(vec!["base".to_string()])
        .squash(&set, &graph, date(), &mut AcceptAll)
        .unwrap()
        .unwrap();

    assert_eq!(
        outcome.depends.iter().map(|d| d.as_str()).collect::<Vec<_>>(),
        vec!["base"]
    );
    assert!(outcome.content.contains("-- depends: base"));
}

fn backfill_fixture() -> (MigrationSet, DependencyGraph) {
    set_and_graph(vec![
        sql_migration(
            "a",
            &[],
            &["CREATE TABLE users (id INT PRIMARY KEY, email VARCHAR(255))"],
            &["DROP TABLE users"],
        ),
        sql_migration(
            "b",
            &["a"],
            &["UPDATE users SET email = 'unknown' WHERE email IS NULL"],
            &["SELECT 1"],
        ),
        sql_migration(
            "c",
            &["b"],
            &["ALTER TABLE users ALTER COLUMN email SET NOT NULL"],
            &["ALTER TABLE users ALTER COLUMN email DROP NOT NULL"],
        ),
    ])
}

#[test]
fn test_backfill_between_nullable_add_and_set_not_null_is_elided_on_yes() {
    let (set, graph) = backfill_fixture();
    let mut decider = Scripted::new(vec![Decision::Yes]);
    let outcome = squasher()
        .squash(&set, &graph, date(), &mut decider)
        .unwrap()
        .unwrap();

    assert_eq!(decider.prompts.len(), 1);
    assert!(decider.prompts[0].contains("users"));
    let apply = &outcome.content
        [outcome.content.find("-- migrate: apply").unwrap()
            ..outcome.content.find("-- migrate: rollback").unwrap()];
    assert!(!apply.contains("UPDATE users"), "backfill dropped:\n{apply}");
    assert!(apply.contains("SET NOT NULL"));
}

#[test]
fn test_backfill_kept_on_decline() {
    let (set, graph) = backfill_fixture();
    let outcome = squasher()
        .squash(&set, &graph, date(), &mut DeclineAll)
        .unwrap()
        .unwrap();
    assert!(outcome.content.contains("UPDATE users"));
}

#[test]
fn test_stop_keeps_remaining_candidates_without_prompting() {
    let (set, graph) = backfill_fixture();
    let mut decider = Scripted::new(vec![Decision::Stop]);
    let outcome = squasher()
        .squash(&set, &graph, date(), &mut decider)
        .unwrap()
        .unwrap();
    assert_eq!(decider.prompts.len(), 1);
    assert!(outcome.content.contains("UPDATE users"));
}

#[test]
fn test_statement_outside_window_is_not_offered() {
    let (set, graph) = set_and_graph(vec![
        sql_migration(
            "a",
            &[],
            &["CREATE TABLE users (id INT PRIMARY KEY, email VARCHAR(255) NOT NULL)"],
            &["DROP TABLE users"],
        ),
        sql_migration(
            "b",
            &["a"],
            &["UPDATE users SET email = 'x' WHERE id = 1"],
            &["SELECT 1"],
        ),
    ]);

    let mut decider = Scripted::new(vec![]);
    let outcome = squasher()
        .squash(&set, &graph, date(), &mut decider)
        .unwrap()
        .unwrap();
    assert!(decider.prompts.is_empty());
    assert!(outcome.content.contains("UPDATE users"));
}

#[test]
fn test_output_round_trips_through_the_loader() {
    let (set, graph) = set_and_graph(vec![
        sql_migration(
            "a",
            &[],
            &["CREATE TABLE users (id INT PRIMARY KEY)"],
            &["DROP TABLE users"],
        ),
        sql_migration(
            "b",
            &["a"],
            &["INSERT INTO users (id) VALUES (1)"],
            &["DELETE FROM users WHERE id = 1"],
        ),
    ]);

    let outcome = squasher()
        .annotate_source(true)
        .squash(&set, &graph, date(), &mut AcceptAll)
        .unwrap()
        .unwrap();

    let migration = parse_sql_migration(outcome.id.clone(), &outcome.content).unwrap();
    assert_eq!(migration.message, "squash of 2 migrations");
    assert!(migration.depends.is_empty());
    assert_eq!(migration.apply_statements().unwrap().len(), 2);
    assert_eq!(migration.rollback_statements().unwrap().len(), 2);
    assert!(outcome.content.contains("-- squashed: a"));
    assert!(outcome.content.contains("-- squashed: b"));
    assert!(outcome.content.contains("-- source: a"));
}
