//! Display-ready views of produced records.
//!
//! The record shape is static, so projection never inspects record contents beyond whether any
//! exist.

use std::fmt;

use crate::types::ParsedRecord;

/// Column names to display for `records`.
///
/// Empty when there are no records; otherwise the canonical field order `age`, `fib_age`.
pub fn columns(records: &[ParsedRecord]) -> Vec<&'static str> {
    if records.is_empty() {
        return Vec::new();
    }
    ParsedRecord::FIELDS.to_vec()
}

/// Plain-text grid of records, one row per record. Renders with [`fmt::Display`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordTable {
    pub columns: Vec<&'static str>,
    /// Cells in `columns` order; `None` is shown as `null`.
    pub rows: Vec<[Option<u64>; 2]>,
}

impl RecordTable {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn widths(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .map(|(i, name)| {
                self.rows
                    .iter()
                    .map(|row| cell_text(row[i]).len())
                    .fold(name.len(), usize::max)
            })
            .collect()
    }
}

fn cell_text(cell: Option<u64>) -> String {
    cell.map_or_else(|| "null".to_string(), |v| v.to_string())
}

impl fmt::Display for RecordTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.columns.is_empty() {
            return Ok(());
        }
        let widths = self.widths();

        let header: Vec<String> = self
            .columns
            .iter()
            .zip(&widths)
            .map(|(name, w)| format!("{name:>w$}"))
            .collect();
        writeln!(f, "{}", header.join(" | "))?;

        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        writeln!(f, "{}", rule.join("-+-"))?;

        for row in &self.rows {
            let cells: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(cell, w)| format!("{:>w$}", cell_text(*cell)))
                .collect();
            writeln!(f, "{}", cells.join(" | "))?;
        }
        Ok(())
    }
}

/// Tabulate `records` for display.
pub fn to_table(records: &[ParsedRecord]) -> RecordTable {
    RecordTable {
        columns: columns(records),
        rows: records.iter().map(ParsedRecord::fields).collect(),
    }
}
