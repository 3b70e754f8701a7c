// Tabular data model shared by every dashboard source
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// Canonical name of the key column every sheet is aggregated by
pub const ENTITY_KEY: &str = "Entity";

/// Tokens spreadsheet exports use for a missing value
const NA_TOKENS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

#[derive(Debug, Error, PartialEq)]
pub enum TableError {
    #[error("column '{0}' not found")]
    MissingColumn(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Empty,
}

impl CellValue {
    /// Parse a raw CSV field. Blanks and NA markers become `Empty`.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || NA_TOKENS.contains(&trimmed) {
            return CellValue::Empty;
        }
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_nan() => CellValue::Empty,
            Ok(n) => CellValue::Number(n),
            Err(_) => CellValue::Text(trimmed.to_string()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Empty => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Push a row, padding short rows with empty cells and truncating long ones
    pub fn push_row(&mut self, mut row: Vec<CellValue>) {
        row.resize(self.columns.len(), CellValue::Empty);
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// A table without rows is empty, even if it carries a header
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn rename_column(&mut self, index: usize, name: impl Into<String>) {
        if let Some(column) = self.columns.get_mut(index) {
            *column = name.into();
        }
    }

    pub fn drop_last_row(&mut self) {
        self.rows.pop();
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&CellValue> {
        self.rows.get(row).and_then(|r| r.get(column))
    }

    pub fn number(&self, row: usize, column: &str) -> Option<f64> {
        let idx = self.column_index(column)?;
        self.cell(row, idx).and_then(CellValue::as_f64)
    }

    /// True when every non-empty cell of the column is a number
    pub fn is_numeric_column(&self, index: usize) -> bool {
        self.rows
            .iter()
            .filter_map(|r| r.get(index))
            .all(|c| c.is_empty() || c.as_f64().is_some())
    }

    /// Entity keys in first-seen order, without duplicates
    pub fn entities(&self) -> Vec<String> {
        let Some(idx) = self.column_index(ENTITY_KEY) else {
            return Vec::new();
        };
        let mut seen = HashSet::new();
        self.rows
            .iter()
            .map(|r| r[idx].to_string())
            .filter(|e| seen.insert(e.clone()))
            .collect()
    }

    pub(crate) fn sort_rows_by<F>(&mut self, compare: F)
    where
        F: FnMut(&Vec<CellValue>, &Vec<CellValue>) -> std::cmp::Ordering,
    {
        self.rows.sort_by(compare);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Build a table from string literals, parsing each field like the CSV decoder does
    pub fn table(columns: &[&str], rows: &[&[&str]]) -> Table {
        let mut t = Table::new(columns.iter().map(|c| c.to_string()).collect());
        for row in rows {
            t.push_row(row.iter().map(|v| CellValue::parse(v)).collect());
        }
        t
    }

    #[test]
    fn test_cell_parse() {
        assert_eq!(CellValue::parse(" 12 "), CellValue::Number(12.0));
        assert_eq!(CellValue::parse("-3.5"), CellValue::Number(-3.5));
        assert_eq!(CellValue::parse(""), CellValue::Empty);
        assert_eq!(CellValue::parse("Team A"), CellValue::Text("Team A".to_string()));
    }

    #[test]
    fn test_na_markers_are_empty() {
        for raw in ["#N/A", "N/A", "NA", "NaN", "nan", "-NaN", "null", " None "] {
            assert_eq!(CellValue::parse(raw), CellValue::Empty, "{raw}");
        }
        assert_eq!(CellValue::parse("+nan"), CellValue::Empty);
        assert_eq!(CellValue::parse("#REF!"), CellValue::Text("#REF!".to_string()));
    }

    #[test]
    fn test_push_row_pads_short_rows() {
        let t = table(&["Entity", "Marks", "Notes"], &[&["A", "1"]]);
        assert_eq!(t.rows()[0].len(), 3);
        assert!(t.rows()[0][2].is_empty());
    }

    #[test]
    fn test_header_only_table_is_empty() {
        let t = table(&["Entity", "Marks"], &[]);
        assert!(t.is_empty());
        assert!(t.has_column("Marks"));
    }

    #[test]
    fn test_numeric_column_detection() {
        let t = table(
            &["Entity", "Marks", "Owner", "Blank"],
            &[&["A", "1", "x", ""], &["B", "", "7", ""]],
        );
        assert!(t.is_numeric_column(1));
        assert!(!t.is_numeric_column(2));
        assert!(t.is_numeric_column(3));
    }

    #[test]
    fn test_entities_deduplicated_in_order() {
        let t = table(&["Entity", "Marks"], &[&["B", "1"], &["A", "2"], &["B", "3"]]);
        assert_eq!(t.entities(), vec!["B".to_string(), "A".to_string()]);
    }
}
