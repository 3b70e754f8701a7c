// Total-marks leaderboard
use super::aggregate::aggregate;
use super::table::{CellValue, Table, TableError};
use serde::Serialize;

const RANKED_PLACES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rank(pub u8);

impl Rank {
    pub fn label(&self) -> &'static str {
        match self.0 {
            1 => "🥇",
            2 => "🥈",
            3 => "🥉",
            _ => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedTotals {
    pub table: Table,
    pub ranks: Vec<Option<Rank>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedRow {
    pub entity: String,
    pub values: Vec<CellValue>,
    pub rank: Option<Rank>,
    pub rank_label: Option<&'static str>,
}

impl RankedTotals {
    pub fn rows(&self) -> Vec<RankedRow> {
        self.table
            .rows()
            .iter()
            .zip(&self.ranks)
            .map(|(row, rank)| RankedRow {
                entity: row[0].to_string(),
                values: row[1..].to_vec(),
                rank: *rank,
                rank_label: rank.map(|r| r.label()),
            })
            .collect()
    }
}

/// Remove the grand-total row the totals sheet ends with
pub fn drop_trailer(table: &Table) -> Table {
    let mut trimmed = table.clone();
    trimmed.drop_last_row();
    trimmed
}

/// De-duplicate entities and sort descending by `total_column`, optionally
/// labelling the top three places.
pub fn rank_totals(
    table: &Table,
    total_column: &str,
    rank_labels: bool,
) -> Result<RankedTotals, TableError> {
    let mut deduped = aggregate(table, "")?;
    if deduped.is_empty() {
        return Ok(RankedTotals {
            table: deduped,
            ranks: Vec::new(),
        });
    }

    let idx = deduped
        .column_index(total_column)
        .ok_or_else(|| TableError::MissingColumn(total_column.to_string()))?;

    deduped.sort_rows_by(|a, b| {
        let a = a[idx].as_f64().unwrap_or(0.0);
        let b = b[idx].as_f64().unwrap_or(0.0);
        b.total_cmp(&a)
    });

    let ranks = (0..deduped.row_count())
        .map(|pos| (rank_labels && pos < RANKED_PLACES).then(|| Rank(pos as u8 + 1)))
        .collect();

    Ok(RankedTotals {
        table: deduped,
        ranks,
    })
}

pub fn ranked_totals(
    table: &Table,
    total_column: &str,
    rank_labels: bool,
) -> Result<RankedTotals, TableError> {
    rank_totals(&drop_trailer(table), total_column, rank_labels)
}
