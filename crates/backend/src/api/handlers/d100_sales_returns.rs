use axum::{extract::State, http::StatusCode, Json};
use contracts::dashboards::d100_sales_returns::{
    ApiError, DashboardFilters, FilterOptionsResponse, ReloadResponse, SalesDashboardResponse,
};

use crate::dashboards::d100_sales_returns::{service, LoadError};
use crate::routes::AppState;

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

fn error_response(e: LoadError) -> (StatusCode, Json<ApiError>) {
    let status = match e {
        LoadError::NoData => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    tracing::error!("D100 Dashboard: dataset unavailable: {}", e);
    (
        status,
        Json(ApiError {
            message: e.to_string(),
        }),
    )
}

/// POST /api/d100/dashboard
pub async fn get_dashboard(
    State(state): State<AppState>,
    Json(filters): Json<DashboardFilters>,
) -> ApiResult<SalesDashboardResponse> {
    let table = state.cache.get().await.map_err(error_response)?;

    let response = service::aggregate(&table, &filters);
    tracing::info!(
        "D100 Dashboard: {} orders, {} days, {} products in leaderboard",
        response.kpis.order_count,
        response.timeseries.len(),
        response.top_by_revenue.len()
    );
    Ok(Json(response))
}

/// GET /api/d100/filter_options
pub async fn get_filter_options(State(state): State<AppState>) -> ApiResult<FilterOptionsResponse> {
    let table = state.cache.get().await.map_err(error_response)?;
    Ok(Json(service::filter_options(&table)))
}

/// POST /api/d100/reload
pub async fn reload(State(state): State<AppState>) -> ApiResult<ReloadResponse> {
    let table = state.cache.reload().await.map_err(error_response)?;
    tracing::info!("D100 Dashboard: dataset reloaded, {} rows", table.len());
    Ok(Json(ReloadResponse {
        row_count: table.len(),
        synthetic_dates: table.synthetic_dates,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboards::d100_sales_returns::loader::tests::{Outcome, StubSource};
    use crate::dashboards::d100_sales_returns::{DatasetCache, SalesLoader};
    use std::sync::Arc;

    fn state(primary: Outcome, fallback: Outcome) -> AppState {
        let (primary, _) = StubSource::boxed("primary", primary);
        let (fallback, _) = StubSource::boxed("fallback", fallback);
        AppState {
            cache: Arc::new(DatasetCache::new(SalesLoader::new(primary, fallback))),
        }
    }

    #[tokio::test]
    async fn test_no_data_is_not_found() {
        let state = state(Outcome::Unavailable, Outcome::Unavailable);
        let (status, Json(body)) = get_dashboard(State(state), Json(DashboardFilters::default()))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.message.starts_with("No data found"));
    }

    #[tokio::test]
    async fn test_coercion_failure_is_server_error() {
        let state = state(Outcome::Unavailable, Outcome::BadNumber);
        let (status, _) = get_filter_options(State(state)).await.unwrap_err();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_dashboard_and_reload() {
        let state = state(Outcome::Rows(4), Outcome::Unavailable);

        let Json(response) = get_dashboard(State(state.clone()), Json(DashboardFilters::default()))
            .await
            .unwrap();
        assert_eq!(response.kpis.order_count, 4);
        assert_eq!(response.top_by_revenue.len(), 1);

        let Json(reloaded) = reload(State(state)).await.unwrap();
        assert_eq!(reloaded.row_count, 4);
        assert!(!reloaded.synthetic_dates);
    }
}
