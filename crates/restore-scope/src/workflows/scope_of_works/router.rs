use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::json;

use crate::error::AppError;

use super::input::ScopeInput;
use super::repository::{RepositoryError, ScopeRepository};
use super::service::{ScopeOfWorksService, ScopeServiceError};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct GenerateParams {
    date: Option<NaiveDate>,
}

/// HTTP endpoints for generating and reading scopes of works.
pub fn scope_router<R>(service: Arc<ScopeOfWorksService<R>>) -> Router
where
    R: ScopeRepository + 'static,
{
    Router::new()
        .route("/api/v1/scope-of-works", post(generate_handler::<R>))
        .route(
            "/api/v1/scope-of-works/:report_id",
            get(latest_handler::<R>),
        )
        .route(
            "/api/v1/scope-of-works/:report_id/versions",
            get(versions_handler::<R>),
        )
        .with_state(service)
}

fn error_response(error: ScopeServiceError) -> Response {
    AppError::from(error).into_response()
}

pub(crate) async fn generate_handler<R>(
    State(service): State<Arc<ScopeOfWorksService<R>>>,
    Query(params): Query<GenerateParams>,
    axum::Json(input): axum::Json<ScopeInput>,
) -> Response
where
    R: ScopeRepository + 'static,
{
    let date = params.date.unwrap_or_else(|| Local::now().date_naive());
    match service.generate(&input, date) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn latest_handler<R>(
    State(service): State<Arc<ScopeOfWorksService<R>>>,
    Path(report_id): Path<String>,
) -> Response
where
    R: ScopeRepository + 'static,
{
    match service.latest(&report_id) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn versions_handler<R>(
    State(service): State<Arc<ScopeOfWorksService<R>>>,
    Path(report_id): Path<String>,
) -> Response
where
    R: ScopeRepository + 'static,
{
    match service.versions(&report_id) {
        Ok(versions) if versions.is_empty() => {
            error_response(ScopeServiceError::Repository(RepositoryError::NotFound))
        }
        Ok(versions) => {
            let payload = json!({
                "reportId": report_id,
                "versions": versions,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}
