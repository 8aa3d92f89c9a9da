use super::next_sequence;
use chrono::NaiveDate;

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
}

#[test]
fn test_next_sequence_starts_at_one() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(next_sequence(dir.path(), date()).unwrap(), 1);
}

#[test]
fn test_next_sequence_is_max_plus_one() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("20240305_01-init.sql"), "").unwrap();
    std::fs::write(dir.path().join("20240305_03-users.sql"), "").unwrap();
    // Another day's numbering does not interfere
    std::fs::write(dir.path().join("20240304_07-old.sql"), "").unwrap();
    assert_eq!(next_sequence(dir.path(), date()).unwrap(), 4);
}
