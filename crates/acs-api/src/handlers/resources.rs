// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 ACS contributors

use acs_core::types::{Resource, ResourceId};
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;

use crate::dto::{CreateResourceRequest, DeleteQuery, Envelope};
use crate::error::ApiError;
use crate::handlers::performed_by;
use crate::state::AppState;

pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateResourceRequest>,
) -> Result<Json<Envelope<Resource>>, ApiError> {
    let by = performed_by(&headers, req.performed_by);
    let resource = state.engine.create_resource(req.uri_pattern, req.resource_type, req.parent_resource_id, by).await?;
    Ok(Json(Envelope::ok(resource)))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<ResourceId>) -> Result<Json<Envelope<Resource>>, ApiError> {
    let resource = state.engine.get_resource(id).await?;
    Ok(Json(Envelope::ok(resource)))
}

pub async fn list(State(state): State<AppState>) -> Json<Envelope<Vec<Resource>>> {
    Json(Envelope::ok(state.engine.list_resources().await))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<ResourceId>,
    Query(query): Query<DeleteQuery>,
    headers: HeaderMap,
) -> Result<Json<Envelope<()>>, ApiError> {
    let by = performed_by(&headers, None);
    state.engine.delete_resource(id, query.force, by).await?;
    Ok(Json(Envelope::ok(())))
}
