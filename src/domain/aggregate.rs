// Group-by-entity aggregation
use super::table::{CellValue, Table, TableError, ENTITY_KEY};
use std::collections::BTreeMap;

/// Collapse duplicate entities by summing numeric columns, then prefix every
/// surviving column name. Non-numeric columns are dropped and missing values
/// count as zero. Rows with a blank entity are skipped. Rows come out ordered
/// by entity key.
pub fn aggregate(table: &Table, prefix: &str) -> Result<Table, TableError> {
    if table.is_empty() {
        return Ok(Table::empty());
    }

    let key_idx = table
        .column_index(ENTITY_KEY)
        .ok_or_else(|| TableError::MissingColumn(ENTITY_KEY.to_string()))?;

    let numeric: Vec<usize> = (0..table.columns().len())
        .filter(|&idx| idx != key_idx && table.is_numeric_column(idx))
        .collect();

    let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for row in table.rows().iter().filter(|r| !r[key_idx].is_empty()) {
        let sums = groups
            .entry(row[key_idx].to_string())
            .or_insert_with(|| vec![0.0; numeric.len()]);
        for (slot, &idx) in numeric.iter().enumerate() {
            sums[slot] += row[idx].as_f64().unwrap_or(0.0);
        }
    }

    let mut columns = Vec::with_capacity(numeric.len() + 1);
    columns.push(ENTITY_KEY.to_string());
    columns.extend(
        numeric
            .iter()
            .map(|&idx| format!("{}{}", prefix, table.columns()[idx])),
    );

    let mut result = Table::new(columns);
    for (entity, sums) in groups {
        let mut row = Vec::with_capacity(sums.len() + 1);
        row.push(CellValue::Text(entity));
        row.extend(sums.into_iter().map(CellValue::Number));
        result.push_row(row);
    }

    Ok(result)
}
