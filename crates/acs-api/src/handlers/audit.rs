// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 ACS contributors

use acs_core::types::{AuditFilter, AuditRecord, ExportFormat};
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::dto::{AuditExportQuery, AuditQuery, Envelope, ExportFormatQuery, PurgeRequest};
use crate::error::ApiError;
use crate::handlers::performed_by;
use crate::state::AppState;

fn filter_from(query: AuditQuery) -> AuditFilter {
    AuditFilter {
        entity_id: query.entity_id,
        changed_by: query.changed_by,
        change_type_prefix: query.change_type_prefix,
        since: query.since,
        until: query.until,
        limit: query.limit,
        offset: query.offset,
    }
}

pub async fn query(State(state): State<AppState>, Query(query): Query<AuditQuery>) -> Result<Json<Envelope<Vec<AuditRecord>>>, ApiError> {
    let records = state.engine.query_audit(&filter_from(query)).await?;
    Ok(Json(Envelope::ok(records)))
}

pub async fn export(State(state): State<AppState>, Query(query): Query<AuditExportQuery>) -> Result<Response, ApiError> {
    let format = match query.format {
        ExportFormatQuery::Json => ExportFormat::Json,
        ExportFormatQuery::Csv => ExportFormat::Csv,
    };
    let body = state.engine.export_audit(&AuditFilter::default(), format).await?;
    let content_type = match format {
        ExportFormat::Json => "application/json",
        ExportFormat::Csv => "text/csv",
    };
    Ok(([(header::CONTENT_TYPE, content_type)], body).into_response())
}

pub async fn purge(
    State(state): State<AppState>,
    headers: axum::http::HeaderMap,
    Json(req): Json<PurgeRequest>,
) -> Result<Json<Envelope<acs_core::types::PurgeReport>>, ApiError> {
    let by = performed_by(&headers, req.performed_by);
    let report = state.engine.purge_audit(by).await?;
    Ok(Json(Envelope::ok(report)))
}
