//! API route definitions.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{routing::get, Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::warn;

use super::state::AppState;
use crate::dashboard::{assemble, effective_mapping, DashboardQuery, DashboardView};
use crate::matrix::Selection;
use crate::records::extract_project;
use crate::source::dates::DateSelection;
use crate::source::SourceError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    BadDate(String),

    #[error("record source unavailable: {0}")]
    Source(#[from] SourceError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::BadDate(_) => StatusCode::BAD_REQUEST,
            ApiError::Source(_) => StatusCode::SERVICE_UNAVAILABLE,
        };
        if status.is_server_error() {
            warn!(error = %self, "request failed");
        }
        let body = json!({
            "data": null,
            "meta": { "error": self.to_string(), "timestamp": chrono::Utc::now().to_rfc3339() }
        });
        (status, Json(body)).into_response()
    }
}

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/matrix", get(matrix))
        .route("/summary", get(summary))
        .route("/filters", get(filters))
        .route("/projects/extract", get(extract))
}

#[derive(Debug, Default, Deserialize)]
struct ViewParams {
    date: Option<String>,
    project: Option<String>,
    status: Option<String>,
    owner: Option<String>,
    max_rows: Option<usize>,
}

/// Empty query values (`?project=`) are treated as "not given".
fn given(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

impl ViewParams {
    fn query(&self, default_max_rows: usize) -> Result<DashboardQuery, ApiError> {
        let date = DateSelection::parse(self.date.as_deref())
            .map_err(|_| ApiError::BadDate(self.date.clone().unwrap_or_default()))?;
        Ok(DashboardQuery {
            date,
            project: Selection::project(given(self.project.as_deref())),
            status: Selection::status(given(self.status.as_deref())),
            owner: Selection::owner(given(self.owner.as_deref())),
            max_rows: self.max_rows.unwrap_or(default_max_rows),
        })
    }
}

fn envelope(data: Value, meta: Value) -> Json<Value> {
    let mut meta = meta;
    if let Some(obj) = meta.as_object_mut() {
        obj.insert("timestamp".into(), json!(chrono::Utc::now().to_rfc3339()));
        obj.insert("version".into(), json!(env!("CARGO_PKG_VERSION")));
    }
    Json(json!({ "data": data, "meta": meta }))
}

async fn load_view(state: &AppState, params: &ViewParams) -> Result<DashboardView, ApiError> {
    let query = params.query(state.config.matrix.max_rows)?;
    let raw = state.source.fetch().await?;
    let mapping = effective_mapping(&state.mapping, &raw, &state.config.projects);
    Ok(assemble(&raw, &mapping, state.config.normalize_options(), &query))
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    envelope(
        json!({ "status": "ok", "source": state.source.describe(), "mapped_flows": state.mapping.len() }),
        json!({}),
    )
}

async fn matrix(
    State(state): State<AppState>,
    Query(params): Query<ViewParams>,
) -> Result<Json<Value>, ApiError> {
    let view = load_view(&state, &params).await?;
    let meta = json!({ "date": view.date, "rows": view.matrix.keys.len(), "report": view.report });
    Ok(envelope(json!(view.matrix), meta))
}

async fn summary(
    State(state): State<AppState>,
    Query(params): Query<ViewParams>,
) -> Result<Json<Value>, ApiError> {
    let view = load_view(&state, &params).await?;
    Ok(envelope(
        json!(view.summary()),
        json!({ "date": view.date, "report": view.report }),
    ))
}

async fn filters(
    State(state): State<AppState>,
    Query(params): Query<ViewParams>,
) -> Result<Json<Value>, ApiError> {
    // Picker choices never depend on the other filters.
    let only_date = ViewParams {
        date: params.date,
        ..ViewParams::default()
    };
    let view = load_view(&state, &only_date).await?;
    Ok(envelope(json!(view.options), json!({ "date": view.date })))
}

#[derive(Debug, Deserialize)]
struct ExtractParams {
    name: Option<String>,
}

async fn extract(Query(params): Query<ExtractParams>) -> Json<Value> {
    let project = extract_project(params.name.as_deref());
    envelope(json!({ "name": params.name, "project": project }), json!({}))
}
