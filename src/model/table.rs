//! Table types.

use serde::{Deserialize, Serialize};

/// A table of plain-text cells.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Rows in the table, each an ordered list of cell texts
    pub rows: Vec<Vec<String>>,

    /// Number of header rows (0 = no header)
    pub header_rows: usize,
}

impl Table {
    /// Build a table from rows, treating the first row as header when
    /// there is more than one row.
    pub fn from_rows(rows: Vec<Vec<String>>) -> Self {
        let header_rows = if rows.len() > 1 { 1 } else { 0 };
        Self { rows, header_rows }
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get header rows.
    pub fn header(&self) -> &[Vec<String>] {
        &self.rows[..self.header_rows.min(self.rows.len())]
    }

    /// Get body rows (non-header).
    pub fn body(&self) -> &[Vec<String>] {
        &self.rows[self.header_rows.min(self.rows.len())..]
    }

    /// Get plain text representation of the table, one line per row.
    pub fn plain_text(&self) -> String {
        self.rows
            .iter()
            .map(|row| row.join(" | "))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_from_rows_header() {
        let table = Table::from_rows(vec![row(&["Name", "Role"]), row(&["a", "b"])]);
        assert_eq!(table.header_rows, 1);
        assert_eq!(table.header().len(), 1);
        assert_eq!(table.body().len(), 1);
    }

    #[test]
    fn test_single_row_has_no_header() {
        let table = Table::from_rows(vec![row(&["only", "row"])]);
        assert_eq!(table.header_rows, 0);
        assert!(table.header().is_empty());
        assert_eq!(table.plain_text(), "only | row");
    }
}
