#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Append-only high-score file.
//!
//! The file holds one `name,score` row per line. New scores are appended;
//! reading parses every row and sorts by score, highest first, keeping file
//! order between equal scores.

use std::{
    fs::{self, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::{debug, info};

/// Number of rows shown on the scoreboard.
pub const TOP_COUNT: usize = 10;

const FIELD_DELIMITER: char = ',';

/// Failures reading or writing the high-score file.
#[derive(Debug, Error)]
pub enum HighScoreError {
    /// The file could not be read or written.
    #[error("high-score file {path} could not be accessed")]
    Io {
        /// File that was accessed.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// A row does not follow the `name,score` layout.
    #[error("high-score row {line} is malformed: {row:?}")]
    MalformedRow {
        /// One-based line number.
        line: usize,
        /// Offending row.
        row: String,
    },
}

/// A recorded score.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HighScore {
    name: String,
    score: u32,
}

impl HighScore {
    /// Creates an entry. Delimiters and line breaks in `name` are replaced by
    /// spaces so the row stays parseable.
    #[must_use]
    pub fn new(name: &str, score: u32) -> Self {
        let name = name
            .chars()
            .map(|c| if c == FIELD_DELIMITER || c.is_control() { ' ' } else { c })
            .collect::<String>()
            .trim()
            .to_owned();
        Self { name, score }
    }

    /// Player name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Score.
    #[must_use]
    pub const fn score(&self) -> u32 {
        self.score
    }

    /// Row written to the file, without the line break.
    #[must_use]
    pub fn to_row(&self) -> String {
        format!("{}{FIELD_DELIMITER}{}", self.name, self.score)
    }
}

/// Parses file contents and orders them for display.
pub fn parse(contents: &str) -> Result<Vec<HighScore>, HighScoreError> {
    let mut scores = Vec::new();
    for (index, row) in contents.lines().enumerate() {
        if row.trim().is_empty() {
            continue;
        }
        let malformed = || HighScoreError::MalformedRow {
            line: index + 1,
            row: row.to_owned(),
        };
        let (name, score) = row.rsplit_once(FIELD_DELIMITER).ok_or_else(malformed)?;
        let score = score.trim().parse::<u32>().map_err(|_| malformed())?;
        scores.push(HighScore {
            name: name.to_owned(),
            score,
        });
    }
    scores.sort_by(|a, b| b.score.cmp(&a.score));
    Ok(scores)
}

/// High-score file at a fixed path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HighScoreTable {
    path: PathBuf,
}

impl HighScoreTable {
    /// Default file name, relative to the working directory.
    pub const DEFAULT_PATH: &'static str = "highscores.csv";

    /// Uses the file at `path`. Nothing is touched until the first access.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends a row, creating the file if needed.
    pub fn append(&self, entry: &HighScore) -> Result<(), HighScoreError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| self.io_error(source))?;
        writeln!(file, "{}", entry.to_row()).map_err(|source| self.io_error(source))?;
        info!(
            name = entry.name(),
            score = entry.score(),
            path = %self.path.display(),
            "high score recorded"
        );
        Ok(())
    }

    /// Every recorded score, highest first. A missing file holds no scores.
    pub fn load(&self) -> Result<Vec<HighScore>, HighScoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no high-score file yet");
                return Ok(Vec::new());
            }
            Err(source) => return Err(self.io_error(source)),
        };
        parse(&contents)
    }

    /// The [`TOP_COUNT`] best scores.
    pub fn top(&self) -> Result<Vec<HighScore>, HighScoreError> {
        let mut scores = self.load()?;
        scores.truncate(TOP_COUNT);
        Ok(scores)
    }

    fn io_error(&self, source: io::Error) -> HighScoreError {
        HighScoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl Default for HighScoreTable {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PATH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ties_keep_file_order() {
        let scores = parse("ann,50\nbob,70\ncat,50\n").expect("rows parse");

        let names: Vec<_> = scores.iter().map(HighScore::name).collect();
        assert_eq!(names, vec!["bob", "ann", "cat"]);
    }

    #[test]
    fn malformed_rows_report_their_line() {
        let error = parse("ann,50\nbob\n").expect_err("row without score");

        assert!(matches!(
            error,
            HighScoreError::MalformedRow { line: 2, ref row } if row == "bob"
        ));
    }

    #[test]
    fn non_numeric_scores_are_malformed() {
        assert!(matches!(
            parse("ann,lots"),
            Err(HighScoreError::MalformedRow { line: 1, .. })
        ));
    }

    #[test]
    fn names_are_sanitised() {
        let entry = HighScore::new(" a,b\nc ", 3);

        assert_eq!(entry.name(), "a b c");
        assert_eq!(entry.to_row(), "a b c,3");
    }
}
