// Dashboard service - Use case for building dashboards
use crate::application::sheet_loader::{LoadedSheet, SheetLoader};
use crate::domain::aggregate::aggregate;
use crate::domain::dashboard::{Dashboard, Panel, PanelLookup, TotalsView, ViewState};
use crate::domain::ranking::ranked_totals;
use crate::domain::series::{select_series, ColumnTemplate, SeriesLookup};
use crate::domain::table::Table;
use crate::domain::template::prepare_template;
use crate::infrastructure::config::{DashboardConfig, PanelConfig, VariantConfig, CHART_SOURCES};
use futures::future::join_all;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

const TOTALS_SOURCE: &str = "total";
const TOTALS_HEADING: &str = "Total Marks by Entity";
const SELECT_FUNCTION_NOTICE: &str = "Please select a function from the sidebar to view the graphs.";
const CHARTS_UNAVAILABLE_NOTICE: &str =
    "Function charts are unavailable until every chart source has loaded.";

#[derive(Debug, Error, PartialEq)]
pub enum DashboardError {
    #[error("unknown dashboard '{0}'")]
    UnknownVariant(String),
    #[error("unknown function '{function}' for dashboard '{variant}'")]
    UnknownFunction { variant: String, function: String },
}

/// What the user picked in the dashboard controls
#[derive(Debug, Clone, Default)]
pub struct Selection {
    pub function: Option<String>,
    pub entity: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VariantSummary {
    pub id: String,
    pub title: String,
    pub functions: Vec<String>,
}

#[derive(Clone)]
pub struct DashboardService {
    loader: SheetLoader,
    config: Arc<DashboardConfig>,
}

impl DashboardService {
    pub fn new(loader: SheetLoader, config: Arc<DashboardConfig>) -> Self {
        for variant in &config.variants {
            if variant.has_inconsistent_markers() {
                tracing::warn!(
                    "Dashboard '{}' builds chart columns with differing function markers: {:?}",
                    variant.id,
                    variant.function_markers()
                );
            }
        }

        Self { loader, config }
    }

    pub fn variants(&self) -> Vec<VariantSummary> {
        self.config
            .variants
            .iter()
            .map(|v| VariantSummary {
                id: v.id.clone(),
                title: v.title.clone(),
                functions: v.functions.clone(),
            })
            .collect()
    }

    pub async fn build(
        &self,
        variant_id: &str,
        selection: &Selection,
    ) -> Result<Dashboard, DashboardError> {
        let variant = self
            .config
            .variant(variant_id)
            .ok_or_else(|| DashboardError::UnknownVariant(variant_id.to_string()))?;

        if let Some(function) = &selection.function {
            if !variant.functions.contains(function) {
                return Err(DashboardError::UnknownFunction {
                    variant: variant.id.clone(),
                    function: function.clone(),
                });
            }
        }

        let mut notices = Vec::new();
        let sheets = self.load_sources(&mut notices).await;

        let totals = sheets
            .get(TOTALS_SOURCE)
            .and_then(|table| self.build_totals(variant, table, &mut notices));

        let charts_ready = CHART_SOURCES
            .iter()
            .all(|s| sheets.get(*s).is_some_and(|t| !t.is_empty()));

        let view = match &selection.function {
            // the prompt only makes sense when there are charts to pick
            None => ViewState::NoFunctionSelected {
                notice: charts_ready.then(|| SELECT_FUNCTION_NOTICE.to_string()),
            },
            Some(function) => {
                let panels = if charts_ready {
                    variant
                        .panels
                        .iter()
                        .map(|panel| self.build_panel(panel, &sheets, function, &mut notices))
                        .collect()
                } else {
                    notices.push(CHARTS_UNAVAILABLE_NOTICE.to_string());
                    Vec::new()
                };

                let entities: Option<Vec<String>> = variant.entity_selector.then(|| {
                    totals
                        .as_ref()
                        .map(|t| t.rows.iter().map(|r| r.entity.clone()).collect())
                        .unwrap_or_default()
                });

                ViewState::FunctionSelected {
                    function: function.clone(),
                    heading: format!("Displaying data for function: {}", function),
                    entities,
                    selected_entity: selection.entity.clone().filter(|_| variant.entity_selector),
                    panels,
                }
            }
        };

        Ok(Dashboard {
            title: variant.title.clone(),
            subtitle: variant.subtitle.clone(),
            notices,
            totals,
            functions: variant.functions.clone(),
            view,
            generated_at: chrono::Utc::now(),
        })
    }

    async fn load_sources(&self, notices: &mut Vec<String>) -> HashMap<&'static str, Arc<Table>> {
        let keys: Vec<&'static str> = std::iter::once(TOTALS_SOURCE)
            .chain(CHART_SOURCES.iter().copied())
            .collect();

        let loads = join_all(keys.iter().map(|key| async move {
            match self.config.sources.url(key) {
                Some(url) => self.loader.load(url).await,
                None => LoadedSheet {
                    table: Arc::new(Table::empty()),
                    error: None,
                },
            }
        }))
        .await;

        keys.into_iter()
            .zip(loads)
            .map(|(key, loaded)| {
                if let Some(error) = loaded.error {
                    notices.push(error);
                }
                (key, loaded.table)
            })
            .collect()
    }

    fn build_totals(
        &self,
        variant: &VariantConfig,
        table: &Table,
        notices: &mut Vec<String>,
    ) -> Option<TotalsView> {
        if table.is_empty() {
            return None;
        }

        match ranked_totals(table, &variant.total_column, variant.rank_labels) {
            Ok(ranked) => Some(TotalsView::new(TOTALS_HEADING.to_string(), &ranked)),
            Err(e) => {
                tracing::warn!("Cannot rank totals for '{}': {}", variant.id, e);
                notices.push(format!("Total marks unavailable: {}", e));
                None
            }
        }
    }

    fn build_panel(
        &self,
        panel: &PanelConfig,
        sheets: &HashMap<&'static str, Arc<Table>>,
        function: &str,
        notices: &mut Vec<String>,
    ) -> Panel {
        let raw = sheets
            .get(panel.source.as_str())
            .cloned()
            .unwrap_or_default();

        let aggregated = aggregate(&raw, &panel.prefix).unwrap_or_else(|e| {
            tracing::warn!("Cannot aggregate {}: {}", panel.table_name, e);
            notices.push(format!("{} unavailable: {}", panel.table_name, e));
            Table::empty()
        });

        let vars = HashMap::from([("function".to_string(), function.to_string())]);
        let template = ColumnTemplate::new(panel.column.as_str());

        let lookup = match select_series(&aggregated, function, &template) {
            SeriesLookup::Found(series) => PanelLookup::Found { series },
            SeriesLookup::NotFound { column } => {
                tracing::debug!("Column '{}' missing from {}", column, panel.table_name);
                PanelLookup::not_found(column, &panel.table_name)
            }
        };

        Panel {
            source: panel.source.clone(),
            title: prepare_template(&panel.title, &vars),
            lookup,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::cache::ManualClock;
    use crate::application::sheet_loader::tests::FakeSource;
    use crate::infrastructure::config::tests::parse;
    use std::time::Duration;

    const CONFIG: &str = r#"
[sources]
cm = "http://sheets.test/cm.csv"
mou = "http://sheets.test/mou.csv"
slot = "http://sheets.test/slot.csv"
showcasing = "http://sheets.test/showcasing.csv"
total = "http://sheets.test/total.csv"

[[variants]]
id = "leaderboard"
title = "Performance Dashboard"
subtitle = "A visual summary of marks and openings"
functions = ["GV", "GTa", "GTe"]
entity_selector = true

[[variants.panels]]
source = "cm"
prefix = "CM_"
table_name = "CM_Marks"
title = "CM Marks for i${function}"
column = "CM_i${function} Marks"

[[variants.panels]]
source = "mou"
prefix = "MOU_"
table_name = "MOU_Marks"
title = "MOU Marks for i${function}"
column = "MOU_i${function} Marks"

[[variants.panels]]
source = "slot"
prefix = "Slot_"
table_name = "Slot_Marks"
title = "Slot Marks for ${function}"
column = "Slot_${function}"

[[variants.panels]]
source = "showcasing"
prefix = "Showcasing_"
table_name = "Showcasing_Marks"
title = "Showcasing Marks for i${function}"
column = "Showcasing_i${function} Marks"

[[variants]]
id = "performance"
title = "Entity Leaderboard"
functions = ["iGV", "iGTa", "iGTe"]
rank_labels = true

[[variants.panels]]
source = "cm"
prefix = "CM_"
table_name = "CM_Marks"
title = "CM Marks for ${function}"
column = "CM_${function} Marks"
"#;

    fn source() -> FakeSource {
        FakeSource::default()
            .with(
                "http://sheets.test/cm.csv",
                "Entity Name,iGV Marks,iGTa Marks,Owner\nNorth,10,1,x\nNorth,5,2,y\nSouth,7,,z\n",
            )
            .with("http://sheets.test/mou.csv", "Team,iGTa Marks\nNorth,3\n")
            .with("http://sheets.test/slot.csv", "Team,GV,GTa\nSouth,4,1\nEast,2,2\n")
            .with("http://sheets.test/showcasing.csv", "Team,iGV Marks\nEast,9\n")
            .with(
                "http://sheets.test/total.csv",
                "Team,Total Marks\nNorth,50\nSouth,80\nEast,20\nTotal,150\n",
            )
    }

    fn service(source: Arc<FakeSource>) -> DashboardService {
        let loader = SheetLoader::new(source, Arc::new(ManualClock::new()), Duration::from_secs(600));
        DashboardService::new(loader, Arc::new(parse(CONFIG)))
    }

    fn selection(function: &str) -> Selection {
        Selection {
            function: Some(function.to_string()),
            entity: None,
        }
    }

    #[tokio::test]
    async fn test_no_function_selected() {
        let dashboard = service(Arc::new(source()))
            .build("leaderboard", &Selection::default())
            .await
            .unwrap();

        assert!(dashboard.notices.is_empty());
        match &dashboard.view {
            ViewState::NoFunctionSelected { notice } => {
                assert_eq!(notice.as_deref(), Some(SELECT_FUNCTION_NOTICE));
            }
            other => panic!("unexpected {:?}", other),
        }

        let totals = dashboard.totals.unwrap();
        let entities: Vec<_> = totals.rows.iter().map(|r| r.entity.as_str()).collect();
        assert_eq!(entities, vec!["South", "North", "East"]);
        assert!(totals.rows.iter().all(|r| r.rank.is_none()));
    }

    #[tokio::test]
    async fn test_function_panels_follow_literal_templates() {
        let dashboard = service(Arc::new(source()))
            .build("leaderboard", &selection("GV"))
            .await
            .unwrap();

        let ViewState::FunctionSelected { heading, entities, panels, .. } = dashboard.view else {
            panic!("expected function view");
        };
        assert_eq!(heading, "Displaying data for function: GV");
        assert_eq!(entities.unwrap(), vec!["South", "North", "East"]);
        assert_eq!(panels.len(), 4);

        match &panels[0].lookup {
            PanelLookup::Found { series } => {
                assert_eq!(series.column, "CM_iGV Marks");
                assert_eq!(series.points[0].entity, "North");
                assert_eq!(series.points[0].value, 15.0);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(panels[0].title, "CM Marks for iGV");

        match &panels[1].lookup {
            PanelLookup::NotFound { column, notice } => {
                assert_eq!(column, "MOU_iGV Marks");
                assert_eq!(notice, "'MOU_iGV Marks' not found in MOU_Marks.");
            }
            other => panic!("unexpected {:?}", other),
        }

        // slot uses the bare function code
        match &panels[2].lookup {
            PanelLookup::Found { series } => assert_eq!(series.column, "Slot_GV"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_rank_labels_variant() {
        let dashboard = service(Arc::new(source()))
            .build("performance", &selection("iGV"))
            .await
            .unwrap();

        let totals = dashboard.totals.unwrap();
        let ranks: Vec<_> = totals.rows.iter().map(|r| r.rank.map(|r| r.0)).collect();
        assert_eq!(ranks, vec![Some(1), Some(2), Some(3)]);

        let ViewState::FunctionSelected { entities, panels, .. } = dashboard.view else {
            panic!("expected function view");
        };
        assert!(entities.is_none());
        assert!(matches!(panels[0].lookup, PanelLookup::Found { .. }));
    }

    #[tokio::test]
    async fn test_failed_source_degrades() {
        let source = source();
        source.set("http://sheets.test/mou.csv", "Team,Marks\nA,1,2,3\n");
        let dashboard = service(Arc::new(source))
            .build("leaderboard", &selection("GTa"))
            .await
            .unwrap();

        assert!(dashboard.totals.is_some());
        assert!(dashboard.notices[0].starts_with("Error loading data from URL:"));
        assert!(dashboard.notices.contains(&CHARTS_UNAVAILABLE_NOTICE.to_string()));

        let ViewState::FunctionSelected { panels, .. } = dashboard.view else {
            panic!("expected function view");
        };
        assert!(panels.is_empty());
    }

    #[tokio::test]
    async fn test_no_select_prompt_without_charts() {
        let source = source();
        source.set("http://sheets.test/slot.csv", "Team,GV\n");
        let dashboard = service(Arc::new(source))
            .build("leaderboard", &Selection::default())
            .await
            .unwrap();

        assert!(dashboard.totals.is_some());
        match dashboard.view {
            ViewState::NoFunctionSelected { notice } => assert!(notice.is_none()),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_sources_fetched_once_per_window() {
        let source = Arc::new(source());
        let service = service(source.clone());

        service.build("leaderboard", &selection("GV")).await.unwrap();
        service.build("performance", &Selection::default()).await.unwrap();

        assert_eq!(source.fetches(), 5);
    }

    #[tokio::test]
    async fn test_unknown_variant_and_function() {
        let service = service(Arc::new(source()));

        assert_eq!(
            service.build("missing", &Selection::default()).await.unwrap_err(),
            DashboardError::UnknownVariant("missing".to_string())
        );
        assert_eq!(
            service.build("leaderboard", &selection("iGV")).await.unwrap_err(),
            DashboardError::UnknownFunction {
                variant: "leaderboard".to_string(),
                function: "iGV".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_selected_entity_is_echoed_only() {
        let dashboard = service(Arc::new(source()))
            .build(
                "leaderboard",
                &Selection {
                    function: Some("GTa".to_string()),
                    entity: Some("North".to_string()),
                },
            )
            .await
            .unwrap();

        let ViewState::FunctionSelected { selected_entity, panels, .. } = dashboard.view else {
            panic!("expected function view");
        };
        assert_eq!(selected_entity.as_deref(), Some("North"));
        match &panels[2].lookup {
            PanelLookup::Found { series } => assert_eq!(series.points.len(), 2),
            other => panic!("unexpected {:?}", other),
        }
    }
}
