// HTTP request handlers
use crate::application::dashboard_service::{DashboardError, Selection, VariantSummary};
use crate::domain::dashboard::Dashboard;
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub function: Option<String>,
    pub entity: Option<String>,
}

impl DashboardQuery {
    fn into_selection(self) -> Selection {
        let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        Selection {
            function: non_empty(self.function),
            entity: non_empty(self.entity),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let status = match self {
            DashboardError::UnknownVariant(_) => StatusCode::NOT_FOUND,
            DashboardError::UnknownFunction { .. } => StatusCode::BAD_REQUEST,
        };
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// List the configured dashboard variants
pub async fn list_variants(State(state): State<Arc<AppState>>) -> Json<Vec<VariantSummary>> {
    Json(state.dashboard_service.variants())
}

/// Build a dashboard for the selected function
pub async fn get_dashboard(
    Path(id): Path<String>,
    Query(query): Query<DashboardQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Dashboard>, DashboardError> {
    let selection = query.into_selection();
    tracing::debug!(
        "Building dashboard {} (function={:?}, entity={:?})",
        id,
        selection.function,
        selection.entity
    );

    let dashboard = state.dashboard_service.build(&id, &selection).await?;
    Ok(Json(dashboard))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::cache::ManualClock;
    use crate::application::dashboard_service::DashboardService;
    use crate::application::sheet_loader::tests::FakeSource;
    use crate::application::sheet_loader::SheetLoader;
    use crate::infrastructure::config::tests::{parse, SAMPLE};
    use std::time::Duration;

    fn state() -> Arc<AppState> {
        let source = FakeSource::default()
            .with("http://sheets.test/cm.csv", "Team,iGV Marks\nNorth,1\n")
            .with("http://sheets.test/mou.csv", "Team,iGV Marks\nNorth,1\n")
            .with("http://sheets.test/slot.csv", "Team,GV\nNorth,1\n")
            .with("http://sheets.test/showcasing.csv", "Team,iGV Marks\nNorth,1\n")
            .with("http://sheets.test/total.csv", "Team,Total Marks\nNorth,1\nTotal,1\n");
        let loader = SheetLoader::new(
            Arc::new(source),
            Arc::new(ManualClock::new()),
            Duration::from_secs(600),
        );
        Arc::new(AppState {
            dashboard_service: DashboardService::new(loader, Arc::new(parse(SAMPLE))),
        })
    }

    #[tokio::test]
    async fn test_list_variants() {
        let Json(variants) = list_variants(State(state())).await;
        assert_eq!(variants.len(), 1);
        assert_eq!(variants[0].functions, vec!["GV", "GTa", "GTe"]);
    }

    #[tokio::test]
    async fn test_blank_function_means_no_selection() {
        let query = DashboardQuery {
            function: Some(" ".to_string()),
            entity: None,
        };
        let Json(dashboard) = get_dashboard(Path("leaderboard".to_string()), Query(query), State(state()))
            .await
            .unwrap();

        let json = serde_json::to_value(&dashboard).unwrap();
        assert_eq!(json["view"]["state"], "no_function_selected");
        assert_eq!(json["totals"]["rows"][0]["entity"], "North");
    }

    #[tokio::test]
    async fn test_dashboard_with_function() {
        let query = DashboardQuery {
            function: Some("GV".to_string()),
            entity: Some("North".to_string()),
        };
        let Json(dashboard) = get_dashboard(Path("leaderboard".to_string()), Query(query), State(state()))
            .await
            .unwrap();

        let json = serde_json::to_value(&dashboard).unwrap();
        assert_eq!(json["view"]["state"], "function_selected");
        assert_eq!(json["view"]["selected_entity"], "North");
        assert_eq!(json["view"]["panels"][0]["lookup"]["status"], "found");
        assert_eq!(json["view"]["panels"][1]["lookup"]["series"]["column"], "Slot_GV");
    }

    #[tokio::test]
    async fn test_error_statuses() {
        let missing = get_dashboard(
            Path("nope".to_string()),
            Query(DashboardQuery::default()),
            State(state()),
        )
        .await
        .unwrap_err();
        assert_eq!(missing.into_response().status(), StatusCode::NOT_FOUND);

        let query = DashboardQuery {
            function: Some("XX".to_string()),
            entity: None,
        };
        let bad = get_dashboard(Path("leaderboard".to_string()), Query(query), State(state()))
            .await
            .unwrap_err();
        assert_eq!(bad.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
