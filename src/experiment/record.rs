//! Per-generation log records
//!
//! One line per generation step: `<day>;<step>;<cells>`, where `<cells>` is a
//! comma separated list of `plasmids/mutated/parentMutated` triples, one per
//! daughter cell, in population order. `parentMutated` is the number of
//! mutated copies the mother cell carried before it replicated, which lets
//! readers tell apart mutations that arose from ones that were inherited.
//! Daughters that survive dilution and go on to divide carry a trailing `*`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;

/// Plasmid content of one cell right after division
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellSummary {
    pub plasmids: usize,
    pub mutated: usize,
    pub parent_mutated: usize,
    /// Survived dilution; the next generation descends from this cell
    pub retained: bool,
}

impl CellSummary {
    pub fn carries_mutation(&self) -> bool {
        self.mutated > 0
    }

    pub fn is_fixed(&self) -> bool {
        self.plasmids > 0 && self.mutated == self.plasmids
    }

    /// Mutation present here but absent from the mother before replication
    pub fn gained_mutation(&self) -> bool {
        self.parent_mutated == 0 && self.mutated > 0
    }

    /// Mother carried the mutation, this daughter inherited none of it
    pub fn lost_mutation(&self) -> bool {
        self.parent_mutated > 0 && self.mutated == 0
    }
}

/// All cells produced by one generation step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationSummary {
    pub cells: Vec<CellSummary>,
}

impl GenerationSummary {
    pub fn mutated_copies(&self) -> usize {
        self.cells.iter().map(|c| c.mutated).sum()
    }
}

impl fmt::Display for GenerationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, cell) in self.cells.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}/{}/{}", cell.plasmids, cell.mutated, cell.parent_mutated)?;
            if cell.retained {
                f.write_str("*")?;
            }
        }
        Ok(())
    }
}

/// One parsed log line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    pub day: u32,
    pub step: u32,
    pub summary: GenerationSummary,
}

impl LogRecord {
    pub fn write_to<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "{};{};{}", self.day, self.step, self.summary)
    }

    /// Parse a full log line, reporting errors against `line` (1-based)
    pub fn parse_line(text: &str, line: usize) -> Result<LogRecord, LogParseError> {
        text.parse::<LogRecord>().map_err(|e| e.at_line(line))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LogParseError {
    #[error("line {line}: expected `<day>;<step>;<cells>`")]
    MissingField { line: usize },

    #[error("line {line}: bad number `{value}`")]
    BadNumber { line: usize, value: String },

    #[error("line {line}: bad cell `{cell}`")]
    BadCell { line: usize, cell: String },

    #[error("line {line}: {mutated} mutated copies exceed {plasmids} plasmids")]
    Inconsistent { line: usize, plasmids: usize, mutated: usize },

    #[error("failed to read log: {0}")]
    Io(#[from] io::Error),
}

impl LogParseError {
    fn at_line(self, line: usize) -> Self {
        match self {
            LogParseError::MissingField { .. } => LogParseError::MissingField { line },
            LogParseError::BadNumber { value, .. } => LogParseError::BadNumber { line, value },
            LogParseError::BadCell { cell, .. } => LogParseError::BadCell { line, cell },
            LogParseError::Inconsistent { plasmids, mutated, .. } => {
                LogParseError::Inconsistent { line, plasmids, mutated }
            }
            other => other,
        }
    }
}

fn number<T: FromStr>(value: &str) -> Result<T, LogParseError> {
    value.trim().parse().map_err(|_| LogParseError::BadNumber {
        line: 0,
        value: value.to_string(),
    })
}

impl FromStr for CellSummary {
    type Err = LogParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || LogParseError::BadCell {
            line: 0,
            cell: s.to_string(),
        };
        let s = s.trim();
        let (body, retained) = match s.strip_suffix('*') {
            Some(body) => (body, true),
            None => (s, false),
        };
        let mut parts = body.split('/');
        let (Some(p), Some(m), Some(pm), None) = (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(bad());
        };
        let cell = CellSummary {
            plasmids: number(p).map_err(|_| bad())?,
            mutated: number(m).map_err(|_| bad())?,
            parent_mutated: number(pm).map_err(|_| bad())?,
            retained,
        };
        if cell.mutated > cell.plasmids {
            return Err(LogParseError::Inconsistent {
                line: 0,
                plasmids: cell.plasmids,
                mutated: cell.mutated,
            });
        }
        Ok(cell)
    }
}

impl FromStr for GenerationSummary {
    type Err = LogParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(Self::default());
        }
        let cells = s.split(',').map(str::parse).collect::<Result<Vec<_>, _>>()?;
        Ok(Self { cells })
    }
}

impl FromStr for LogRecord {
    type Err = LogParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut fields = s.splitn(3, ';');
        let (Some(day), Some(step), Some(cells)) = (fields.next(), fields.next(), fields.next()) else {
            return Err(LogParseError::MissingField { line: 0 });
        };
        Ok(Self {
            day: number(day)?,
            step: number(step)?,
            summary: cells.parse()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_format() {
        let record = LogRecord {
            day: 2,
            step: 17,
            summary: GenerationSummary {
                cells: vec![
                    CellSummary { plasmids: 48, mutated: 3, parent_mutated: 5, retained: true },
                    CellSummary { plasmids: 52, mutated: 2, parent_mutated: 5, retained: false },
                ],
            },
        };
        let mut out = Vec::new();
        record.write_to(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "2;17;48/3/5*,52/2/5\n");
        assert_eq!("2;17;48/3/5*,52/2/5".parse::<LogRecord>().unwrap(), record);
    }

    #[test]
    fn test_empty_generation() {
        let record: LogRecord = "0;0;".parse().unwrap();
        assert!(record.summary.cells.is_empty());
    }

    #[test]
    fn test_parse_errors_carry_line() {
        match LogRecord::parse_line("0;x;1/0/0", 4) {
            Err(LogParseError::BadNumber { line, value }) => {
                assert_eq!(line, 4);
                assert_eq!(value, "x");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            LogRecord::parse_line("0;1", 2),
            Err(LogParseError::MissingField { line: 2 })
        ));
        assert!(matches!(
            LogRecord::parse_line("0;1;3/4/0", 9),
            Err(LogParseError::Inconsistent { line: 9, .. })
        ));
        assert!(matches!(
            LogRecord::parse_line("0;1;3/1", 1),
            Err(LogParseError::BadCell { line: 1, .. })
        ));
        assert!(matches!(
            LogRecord::parse_line("0;1;3/1/0**", 3),
            Err(LogParseError::BadCell { line: 3, .. })
        ));
    }

    #[test]
    fn test_gain_and_loss_flags() {
        let gained = CellSummary { plasmids: 10, mutated: 1, parent_mutated: 0, retained: true };
        let lost = CellSummary { plasmids: 10, mutated: 0, parent_mutated: 2, retained: true };
        let fixed = CellSummary { plasmids: 4, mutated: 4, parent_mutated: 4, retained: false };
        assert!(gained.gained_mutation() && !gained.lost_mutation());
        assert!(lost.lost_mutation() && !lost.carries_mutation());
        assert!(fixed.is_fixed() && !fixed.gained_mutation());
    }
}
