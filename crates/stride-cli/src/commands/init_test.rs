use super::execute;
use crate::cli::InitArgs;
use stride_core::{Config, CONFIG_FILE};

#[tokio::test]
async fn test_init_scaffolds_project() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("app");
    let args = InitArgs {
        directory: target.display().to_string(),
        database: "app.duckdb".to_string(),
    };

    execute(&args).await.unwrap();

    let config = Config::load(&target.join(CONFIG_FILE)).unwrap();
    assert_eq!(config.database.as_deref(), Some("app.duckdb"));
    assert_eq!(config.migrations, "migrations");
    assert!(target.join("migrations").is_dir());
    assert!(target.join(".gitignore").is_file());
}

#[tokio::test]
async fn test_init_refuses_existing_config() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(CONFIG_FILE), "database: x.duckdb\n").unwrap();
    let args = InitArgs {
        directory: dir.path().display().to_string(),
        database: "app.duckdb".to_string(),
    };

    let err = execute(&args).await.unwrap_err();
    assert!(err.to_string().contains("Refusing to overwrite"));
}
