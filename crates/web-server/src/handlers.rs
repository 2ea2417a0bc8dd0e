use crate::{AppState, error::AppError};
use analytics::{ChartView, GroupedTotals, aggregate_chart, build_chart, format_number};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::{DateTime, Utc};
use core_types::ChartType;
use datasource::DatasetSummary;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

type QuarterTotals = BTreeMap<String, GroupedTotals>;

#[derive(Debug, Deserialize)]
pub struct FormatQuery {
    value: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FormatResponse {
    pub input: Option<String>,
    pub formatted: String,
}

#[derive(Debug, Serialize)]
pub struct DatasetsResponse {
    pub loaded_at: DateTime<Utc>,
    pub datasets: Vec<DatasetSummary>,
}

fn aggregated(state: &AppState, chart: ChartType) -> Result<Json<QuarterTotals>, AppError> {
    let totals = aggregate_chart(chart, state.repo.records(chart))?;
    Ok(Json(totals))
}

/// # GET /api/customer
/// Quarter totals split into "Existing" and "New" customers.
pub async fn get_customer(State(state): State<Arc<AppState>>) -> Result<Json<QuarterTotals>, AppError> {
    aggregated(&state, ChartType::Customer)
}

/// # GET /api/team
pub async fn get_team(State(state): State<Arc<AppState>>) -> Result<Json<QuarterTotals>, AppError> {
    aggregated(&state, ChartType::Team)
}

/// # GET /api/account_industry
pub async fn get_account_industry(
    State(state): State<Arc<AppState>>,
) -> Result<Json<QuarterTotals>, AppError> {
    aggregated(&state, ChartType::AccountIndustry)
}

/// # GET /api/charts/:chart_type
/// Ordered quarters plus bar, donut and table view models for one chart type.
/// Accepts display names ("Account Industry") and slugs ("account_industry").
pub async fn get_chart(
    Path(chart_type): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<ChartView>, AppError> {
    let chart: ChartType = chart_type.parse()?;
    let view = build_chart(chart, state.repo.records(chart))?;
    Ok(Json(view))
}

/// # GET /api/datasets
pub async fn get_datasets(State(state): State<Arc<AppState>>) -> Json<DatasetsResponse> {
    Json(DatasetsResponse {
        loaded_at: state.repo.loaded_at(),
        datasets: state.repo.summaries(),
    })
}

/// # GET /api/format?value=...
/// Formats a single value the same way chart labels are formatted.
pub async fn format_value(Query(query): Query<FormatQuery>) -> Json<FormatResponse> {
    let formatted = format_number(query.value.clone());
    Json(FormatResponse {
        input: query.value,
        formatted,
    })
}
