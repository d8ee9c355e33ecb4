use std::fs;

use crossing_highscores::{HighScore, HighScoreError, HighScoreTable, TOP_COUNT};
use proptest::prelude::*;
use tempfile::TempDir;

fn table() -> (TempDir, HighScoreTable) {
    let dir = TempDir::new().expect("temporary directory");
    let table = HighScoreTable::new(dir.path().join("highscores.csv"));
    (dir, table)
}

#[test]
fn missing_file_has_no_scores() {
    let (_dir, table) = table();

    assert!(table.load().expect("missing file is empty").is_empty());
}

#[test]
fn appended_rows_come_back_sorted() {
    let (_dir, table) = table();
    for (name, score) in [("ann", 30), ("bob", 90), ("cat", 60)] {
        table
            .append(&HighScore::new(name, score))
            .expect("append succeeds");
    }

    let scores = table.load().expect("file parses");

    assert_eq!(
        scores,
        vec![
            HighScore::new("bob", 90),
            HighScore::new("cat", 60),
            HighScore::new("ann", 30),
        ]
    );
    let raw = fs::read_to_string(table.path()).expect("file exists");
    assert_eq!(raw, "ann,30\nbob,90\ncat,60\n");
}

#[test]
fn top_keeps_the_ten_best() {
    let (_dir, table) = table();
    for score in 0..15 {
        table
            .append(&HighScore::new(&format!("p{score}"), score))
            .expect("append succeeds");
    }

    let top = table.top().expect("file parses");

    assert_eq!(top.len(), TOP_COUNT);
    assert_eq!(top[0].score(), 14);
    assert_eq!(top[TOP_COUNT - 1].score(), 5);
}

#[test]
fn malformed_file_is_fatal() {
    let (_dir, table) = table();
    fs::write(table.path(), "ann,10\nnot a row\n").expect("file written");

    assert!(matches!(
        table.load(),
        Err(HighScoreError::MalformedRow { line: 2, .. })
    ));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn load_orders_by_score_descending(
        entries in prop::collection::vec(("[a-z]{1,8}", 0u32..1_000), 0..24),
    ) {
        let (_dir, table) = table();
        for (name, score) in &entries {
            table.append(&HighScore::new(name, *score)).expect("append succeeds");
        }

        let loaded = table.load().expect("file parses");

        prop_assert_eq!(loaded.len(), entries.len());
        for pair in loaded.windows(2) {
            prop_assert!(pair[0].score() >= pair[1].score());
        }
    }
}
