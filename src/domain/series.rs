// Function-filtered chart series lookup
use super::table::{Table, ENTITY_KEY};
use super::template::prepare_template;
use serde::Serialize;
use std::collections::HashMap;

/// Column-name template such as `CM_i${function} Marks`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnTemplate(String);

impl ColumnTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    pub fn render(&self, function: &str) -> String {
        let vars = HashMap::from([("function".to_string(), function.to_string())]);
        prepare_template(&self.0, &vars)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub entity: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub column: String,
    pub points: Vec<SeriesPoint>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SeriesLookup {
    Found(Series),
    NotFound { column: String },
}

/// Pick the column named by `template` for `function`, indexed by entity.
/// Points keep table order.
pub fn select_series(table: &Table, function: &str, template: &ColumnTemplate) -> SeriesLookup {
    let column = template.render(function);

    let (Some(key_idx), Some(value_idx)) =
        (table.column_index(ENTITY_KEY), table.column_index(&column))
    else {
        return SeriesLookup::NotFound { column };
    };

    let points = table
        .rows()
        .iter()
        .map(|row| SeriesPoint {
            entity: row[key_idx].to_string(),
            value: row[value_idx].as_f64().unwrap_or(0.0),
        })
        .collect();

    SeriesLookup::Found(Series { column, points })
}
