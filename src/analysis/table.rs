//! MutationTable — a parsed per-generation log

use crate::experiment::{LogParseError, LogRecord};
use std::io::BufRead;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationTable {
    pub records: Vec<LogRecord>,
}

impl MutationTable {
    /// Parse a log line by line. Blank lines are skipped.
    pub fn import<R: BufRead>(reader: R) -> Result<Self, LogParseError> {
        let mut records = Vec::new();
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            records.push(LogRecord::parse_line(&line, i + 1)?);
        }
        Ok(Self { records })
    }

    pub fn import_str(text: &str) -> Result<Self, LogParseError> {
        Self::import(text.as_bytes())
    }

    pub fn import_file(path: impl AsRef<Path>) -> Result<Self, LogParseError> {
        let file = std::fs::File::open(path)?;
        Self::import(std::io::BufReader::new(file))
    }

    /// Number of generation steps recorded
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of distinct days present
    pub fn days(&self) -> usize {
        self.records.last().map_or(0, |r| r.day as usize + 1)
    }
}
