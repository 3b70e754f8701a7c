// Dashboard domain model
use super::ranking::{RankedRow, RankedTotals};
use super::series::Series;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub title: String,
    pub subtitle: String,
    /// User-visible diagnostics, e.g. sources that failed to load
    pub notices: Vec<String>,
    pub totals: Option<TotalsView>,
    pub functions: Vec<String>,
    pub view: ViewState,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TotalsView {
    pub heading: String,
    pub columns: Vec<String>,
    pub rows: Vec<RankedRow>,
}

impl TotalsView {
    pub fn new(heading: String, totals: &RankedTotals) -> Self {
        Self {
            heading,
            columns: totals.table.columns().to_vec(),
            rows: totals.rows(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ViewState {
    NoFunctionSelected {
        /// Prompt to pick a function, shown only when charts can be drawn
        notice: Option<String>,
    },
    FunctionSelected {
        function: String,
        heading: String,
        /// Options for the entity selector; absent when the variant has none
        entities: Option<Vec<String>>,
        /// Echoed back only, nothing is filtered by it
        selected_entity: Option<String>,
        panels: Vec<Panel>,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct Panel {
    pub source: String,
    pub title: String,
    pub lookup: PanelLookup,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PanelLookup {
    Found { series: Series },
    NotFound { column: String, notice: String },
}

impl PanelLookup {
    pub fn not_found(column: String, table_name: &str) -> Self {
        let notice = format!("'{}' not found in {}.", column, table_name);
        PanelLookup::NotFound { column, notice }
    }
}
